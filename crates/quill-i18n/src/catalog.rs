//! Several translation tables with a locale fallback chain.
//!
//! # Invariants
//!
//! 1. **Fallback chain terminates**: every lookup walks the requested
//!    locale and then the chain exactly once; `lookup*` finally returns the
//!    source text.
//! 2. **Per-locale plural rules**: a plural lookup answered by a fallback
//!    locale uses that locale's rule, not the requested one.
//! 3. **Thread safety**: `Catalog` is `Send + Sync` (all data is immutable
//!    after construction).
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Missing key | Key not in any locale | `get*` → `None`, `lookup*` → source |
//! | Missing locale | Locale not loaded | Falls through chain |
//! | Empty catalog | No tables added | All lookups return the source |

use std::collections::HashMap;

use crate::table::TranslationTable;

/// Locale identifier (e.g., `"sl"`, `"pt_BR"`).
pub type Locale = String;

/// Translation tables keyed by target language.
///
/// # Example
///
/// ```
/// use quill_i18n::{Catalog, LoadConfig, TranslationTable};
/// use quill_i18n::ts::{TsContext, TsDocument, TsMessage};
///
/// fn table(language: &str, source: &str, text: &str) -> TranslationTable {
///     let mut doc = TsDocument::new(language);
///     let mut ctx = TsContext::new("Window");
///     ctx.messages.push(TsMessage::simple(source, text));
///     doc.contexts.push(ctx);
///     TranslationTable::from_document(&doc, &LoadConfig::default()).unwrap()
/// }
///
/// let mut catalog = Catalog::new();
/// catalog.add_table(table("sl", "Save", "Shrani"));
/// catalog.add_table(table("hr", "Quit", "Izlaz"));
/// catalog.set_fallback_chain(vec!["hr".into()]);
///
/// assert_eq!(catalog.lookup("sl", "Window", "Save"), "Shrani");
/// assert_eq!(catalog.lookup("sl", "Window", "Quit"), "Izlaz");
/// assert_eq!(catalog.lookup("sl", "Window", "Help"), "Help");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: HashMap<Locale, TranslationTable>,
    fallback_chain: Vec<Locale>,
}

impl Catalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table under its own language tag, replacing any previous one.
    pub fn add_table(&mut self, table: TranslationTable) {
        self.tables.insert(table.language().to_string(), table);
    }

    /// Set the fallback chain (tried in order when a key is missing).
    pub fn set_fallback_chain(&mut self, chain: Vec<Locale>) {
        self.fallback_chain = chain;
    }

    /// The table for a locale, if loaded.
    #[must_use]
    pub fn table(&self, locale: &str) -> Option<&TranslationTable> {
        self.tables.get(locale)
    }

    /// All registered locale tags, sorted.
    #[must_use]
    pub fn locales(&self) -> Vec<&str> {
        let mut locales: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        locales.sort_unstable();
        locales
    }

    /// Tables in lookup order for `locale`.
    fn chain<'a>(&'a self, locale: &str) -> impl Iterator<Item = &'a TranslationTable> {
        self.tables.get(locale).into_iter().chain(
            self.fallback_chain
                .iter()
                .filter(move |fallback| fallback.as_str() != locale)
                .filter_map(move |fallback| self.tables.get(fallback.as_str())),
        )
    }

    /// Look up a simple string through the fallback chain.
    #[must_use]
    pub fn get(&self, locale: &str, context: &str, source: &str) -> Option<&str> {
        self.chain(locale).find_map(|t| t.get(context, source))
    }

    /// Look up a plural string through the fallback chain.
    #[must_use]
    pub fn get_plural(&self, locale: &str, context: &str, source: &str, count: i64) -> Option<&str> {
        self.chain(locale)
            .find_map(|t| t.get_plural(context, source, count))
    }

    /// [`get`](Self::get), or `source` unchanged.
    #[must_use]
    pub fn lookup<'a>(&'a self, locale: &str, context: &str, source: &'a str) -> &'a str {
        self.get(locale, context, source).unwrap_or(source)
    }

    /// [`get_plural`](Self::get_plural), or `source` unchanged.
    #[must_use]
    pub fn lookup_plural<'a>(
        &'a self,
        locale: &str,
        context: &str,
        source: &'a str,
        count: i64,
    ) -> &'a str {
        self.get_plural(locale, context, source, count)
            .unwrap_or(source)
    }

    // -----------------------------------------------------------------
    // Coverage
    // -----------------------------------------------------------------

    /// Collect all unique `(context, source)` keys across every table.
    ///
    /// The result is sorted for deterministic output.
    #[must_use]
    pub fn all_keys(&self) -> Vec<(String, String)> {
        let mut keys: Vec<(String, String)> = self
            .tables
            .values()
            .flat_map(|t| t.keys().map(|(c, s)| (c.to_string(), s.to_string())))
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }

    /// Keys from `reference` that no table in `locale`'s chain has.
    ///
    /// Returns the missing keys sorted.
    #[must_use]
    pub fn missing_keys(&self, locale: &str, reference: &[(String, String)]) -> Vec<(String, String)> {
        let mut missing: Vec<(String, String)> = reference
            .iter()
            .filter(|(context, source)| !self.has_key(locale, context, source))
            .cloned()
            .collect();
        missing.sort_unstable();
        missing
    }

    fn has_key(&self, locale: &str, context: &str, source: &str) -> bool {
        self.chain(locale).any(|t| t.contains(context, source))
    }

    /// Generate a coverage report across all locales.
    ///
    /// Uses [`all_keys`](Self::all_keys) as the reference set and checks
    /// each locale (with fallback) for presence.
    #[must_use]
    pub fn coverage_report(&self) -> CoverageReport {
        let reference = self.all_keys();
        let total = reference.len();

        let locales = self
            .locales()
            .into_iter()
            .map(|tag| {
                let missing = self.missing_keys(tag, &reference);
                let present = total.saturating_sub(missing.len());
                let coverage_percent = if total == 0 {
                    100.0
                } else {
                    (present as f32 / total as f32) * 100.0
                };
                LocaleCoverage {
                    locale: tag.to_string(),
                    present,
                    missing,
                    coverage_percent,
                }
            })
            .collect();

        CoverageReport {
            total_keys: total,
            locales,
        }
    }
}

/// Coverage report for a catalog.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CoverageReport {
    /// Total number of unique keys across all locales.
    pub total_keys: usize,
    /// Per-locale coverage data, sorted by locale.
    pub locales: Vec<LocaleCoverage>,
}

/// Per-locale coverage statistics.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LocaleCoverage {
    pub locale: String,
    /// Reference keys present (including via fallback).
    pub present: usize,
    /// `(context, source)` keys missing even after fallback.
    pub missing: Vec<(String, String)>,
    /// Coverage as a percentage (0.0–100.0).
    pub coverage_percent: f32,
}
