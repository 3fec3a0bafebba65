//! Immutable translation table built from one TS document.
//!
//! # Invariants
//!
//! 1. **Lookups never fail**: [`TranslationTable::lookup`] and
//!    [`TranslationTable::lookup_plural`] return the source text when no
//!    translation applies.
//! 2. **Verbatim text**: stored strings are returned byte for byte, markup
//!    and `&` accelerators included. Placeholders are not substituted.
//! 3. **Full numerus sets**: every plural entry holds exactly
//!    `plural_rule().form_count()` forms once built.
//! 4. **Thread safety**: the table is `Send + Sync` and never mutated after
//!    construction.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Missing key | Not in the document, empty, retired or filtered | Source text |
//! | Length variants | `variants="yes"` translation | First variant is stored |
//! | Form count mismatch | Translator supplied too few/many forms | Lenient: warn, pad with last form or truncate. Strict: `NumerusMismatch` |
//! | Empty numerus form | Some forms left blank | Lenient: warn, copy nearest filled form. Strict: `EmptyNumerusForm` |
//! | Duplicate key | Same (source, comment, numerus) twice in a context | Lenient: warn, first wins. Strict: `DuplicateKey` |

use std::collections::HashMap;

use smallvec::SmallVec;
use tracing::{debug_span, info, trace, warn};

use crate::config::{IntegrityPolicy, LoadConfig};
use crate::error::I18nError;
use crate::placeholder::substitute;
use crate::plural::{NumerusForms, PluralRule};
use crate::ts::{Translation, TranslationType, TsDocument, TsMessage, primary_variant};

/// A single translated entry: either a simple string or numerus forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringEntry {
    /// A non-pluralized translation.
    Simple(String),
    /// Numerus forms in plural-rule order.
    Plural(NumerusForms),
}

impl StringEntry {
    fn is_plural(&self) -> bool {
        matches!(self, Self::Plural(_))
    }
}

#[derive(Debug, Clone)]
struct Entry {
    comment: String,
    value: StringEntry,
}

type ContextEntries = HashMap<String, SmallVec<[Entry; 1]>>;

/// Counts collected while building a table, in the spirit of `lrelease`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ReleaseStats {
    /// Finished translations loaded.
    pub finished: usize,
    /// Unfinished translations loaded.
    pub unfinished: usize,
    /// Messages with no translated text.
    pub untranslated: usize,
    /// Unfinished translations left out by configuration.
    pub unfinished_skipped: usize,
    /// Obsolete or vanished messages.
    pub retired: usize,
    /// Translations dropped for matching their source.
    pub identical_removed: usize,
    /// Plural entries whose forms had to be padded, truncated or filled.
    pub numerus_repaired: usize,
    /// Messages ignored because their key was already present.
    pub duplicates_ignored: usize,
}

impl ReleaseStats {
    /// Number of entries that made it into the table.
    #[must_use]
    pub fn loaded(&self) -> usize {
        self.finished + self.unfinished
    }
}

/// Read-only lookup table for one target language.
///
/// # Example
///
/// ```
/// use quill_i18n::{LoadConfig, TranslationTable};
/// use quill_i18n::ts::{TsContext, TsDocument, TsMessage};
///
/// let mut doc = TsDocument::new("sl");
/// let mut alert = TsContext::new("Alert");
/// alert.messages.push(TsMessage::simple("Close (%1)", "Zapri (%1)"));
/// alert.messages.push(TsMessage::numerus(
///     "%n day(s)",
///     ["%n dan", "%n dneva", "%n dnevi", "%n dni"],
/// ));
/// doc.contexts.push(alert);
///
/// let table = TranslationTable::from_document(&doc, &LoadConfig::default()).unwrap();
/// assert_eq!(table.lookup("Alert", "Close (%1)"), "Zapri (%1)");
/// assert_eq!(table.lookup("Alert", "Unknown Source"), "Unknown Source");
/// assert_eq!(table.lookup_plural("Alert", "%n day(s)", 2), "%n dneva");
/// assert_eq!(table.format_plural("Alert", "%n day(s)", 5, &[]), "5 dni");
/// ```
#[derive(Debug, Clone)]
pub struct TranslationTable {
    language: String,
    source_language: Option<String>,
    rule: PluralRule,
    contexts: HashMap<String, ContextEntries>,
    len: usize,
    stats: ReleaseStats,
}

impl Default for TranslationTable {
    fn default() -> Self {
        Self::identity()
    }
}

impl TranslationTable {
    /// A table with no entries: every lookup returns its source text.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            language: String::new(),
            source_language: None,
            rule: PluralRule::English,
            contexts: HashMap::new(),
            len: 0,
            stats: ReleaseStats::default(),
        }
    }

    /// Build a table from a parsed document.
    ///
    /// Either every message is accepted (possibly after lenient repairs)
    /// or an error is returned and nothing is built.
    pub fn from_document(doc: &TsDocument, config: &LoadConfig) -> Result<Self, I18nError> {
        let _span = debug_span!("build_table", language = %doc.language).entered();

        let locale = config.plural_locale.as_deref().unwrap_or(&doc.language);
        let rule = PluralRule::for_locale(locale);
        let mut builder = Builder {
            config,
            rule,
            stats: ReleaseStats::default(),
            contexts: HashMap::new(),
        };
        for context in &doc.contexts {
            for message in &context.messages {
                builder.add(&context.name, message)?;
            }
        }

        let stats = builder.stats;
        info!(
            language = %doc.language,
            rule = ?rule,
            finished = stats.finished,
            unfinished = stats.unfinished,
            untranslated = stats.untranslated,
            retired = stats.retired,
            "translation table built"
        );
        Ok(Self {
            language: doc.language.clone(),
            source_language: doc.source_language.clone(),
            rule,
            contexts: builder.contexts,
            len: stats.loaded(),
            stats,
        })
    }

    /// Target language tag, empty for the identity table.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Source language tag, if the document declared one.
    #[must_use]
    pub fn source_language(&self) -> Option<&str> {
        self.source_language.as_deref()
    }

    /// Plural rule used to select numerus forms.
    #[must_use]
    pub fn plural_rule(&self) -> PluralRule {
        self.rule
    }

    /// Build statistics.
    #[must_use]
    pub fn stats(&self) -> &ReleaseStats {
        &self.stats
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Names of contexts holding at least one entry.
    pub fn contexts(&self) -> impl Iterator<Item = &str> {
        self.contexts.keys().map(String::as_str)
    }

    /// Every `(context, source)` pair with an entry.
    ///
    /// A pair appears once per disambiguation comment and numerus flag.
    pub fn keys(&self) -> impl Iterator<Item = (&str, &str)> {
        self.contexts.iter().flat_map(|(context, sources)| {
            sources.iter().flat_map(move |(source, entries)| {
                entries
                    .iter()
                    .map(move |_| (context.as_str(), source.as_str()))
            })
        })
    }

    /// Whether any entry exists for `(context, source)`.
    #[must_use]
    pub fn contains(&self, context: &str, source: &str) -> bool {
        self.contexts
            .get(context)
            .is_some_and(|sources| sources.contains_key(source))
    }

    /// The raw entry for a key, if present.
    #[must_use]
    pub fn entry(
        &self,
        context: &str,
        source: &str,
        comment: &str,
        plural: bool,
    ) -> Option<&StringEntry> {
        self.contexts
            .get(context)?
            .get(source)?
            .iter()
            .find(|e| e.comment == comment && e.value.is_plural() == plural)
            .map(|e| &e.value)
    }

    /// General lookup with an optional disambiguation comment and count.
    ///
    /// With a count, a plural entry is preferred and a simple entry for the
    /// same source is used otherwise. A disambiguated lookup that misses is
    /// retried without the disambiguation.
    #[must_use]
    pub fn translate(
        &self,
        context: &str,
        source: &str,
        disambiguation: Option<&str>,
        count: Option<i64>,
    ) -> Option<&str> {
        let comment = disambiguation.unwrap_or("");
        self.resolve(context, source, comment, count).or_else(|| {
            if comment.is_empty() {
                None
            } else {
                self.resolve(context, source, "", count)
            }
        })
    }

    fn resolve(&self, context: &str, source: &str, comment: &str, count: Option<i64>) -> Option<&str> {
        if let Some(n) = count
            && let Some(StringEntry::Plural(forms)) = self.entry(context, source, comment, true)
        {
            return forms.select(self.rule, n);
        }
        match self.entry(context, source, comment, false)? {
            StringEntry::Simple(text) => Some(text.as_str()),
            StringEntry::Plural(_) => None,
        }
    }

    /// Look up a non-plural translation.
    #[must_use]
    pub fn get(&self, context: &str, source: &str) -> Option<&str> {
        self.translate(context, source, None, None)
    }

    /// Look up the numerus form for `count`.
    #[must_use]
    pub fn get_plural(&self, context: &str, source: &str, count: i64) -> Option<&str> {
        self.translate(context, source, None, Some(count))
    }

    /// Translation for `(context, source)`, or `source` unchanged.
    #[must_use]
    pub fn lookup<'a>(&'a self, context: &str, source: &'a str) -> &'a str {
        self.get(context, source).unwrap_or_else(|| {
            trace!(context, source, "no translation");
            source
        })
    }

    /// Numerus form of `(context, source)` for `count`, or `source`.
    ///
    /// The untranslated fallback uses the source language's two categories
    /// (singular, other), which share the single source text.
    #[must_use]
    pub fn lookup_plural<'a>(&'a self, context: &str, source: &'a str, count: i64) -> &'a str {
        self.get_plural(context, source, count).unwrap_or_else(|| {
            trace!(context, source, count, "no plural translation");
            source
        })
    }

    /// [`lookup`](Self::lookup) followed by `%1`… substitution.
    #[must_use]
    pub fn format(&self, context: &str, source: &str, args: &[&str]) -> String {
        substitute(self.lookup(context, source), args, None)
    }

    /// [`lookup_plural`](Self::lookup_plural) followed by `%n` and `%1`…
    /// substitution.
    #[must_use]
    pub fn format_plural(&self, context: &str, source: &str, count: i64, args: &[&str]) -> String {
        substitute(self.lookup_plural(context, source, count), args, Some(count))
    }
}

struct Builder<'c> {
    config: &'c LoadConfig,
    rule: PluralRule,
    stats: ReleaseStats,
    contexts: HashMap<String, ContextEntries>,
}

impl Builder<'_> {
    fn add(&mut self, context: &str, message: &TsMessage) -> Result<(), I18nError> {
        if message.translation_type.is_retired() {
            self.stats.retired += 1;
            return Ok(());
        }
        let unfinished = message.translation_type == TranslationType::Unfinished;
        if unfinished && !self.config.include_unfinished {
            self.stats.unfinished_skipped += 1;
            return Ok(());
        }

        let value = match &message.translation {
            Translation::Single(text) => {
                let text = primary_variant(text);
                if text.is_empty() {
                    self.stats.untranslated += 1;
                    return Ok(());
                }
                if self.config.remove_identical && text == message.source {
                    self.stats.identical_removed += 1;
                    return Ok(());
                }
                StringEntry::Simple(text.to_string())
            }
            Translation::Numerus(forms) => {
                let forms: Vec<&str> = forms.iter().map(String::as_str).map(primary_variant).collect();
                if forms.iter().all(|f| f.is_empty()) {
                    self.stats.untranslated += 1;
                    return Ok(());
                }
                if self.config.remove_identical && forms.iter().all(|f| *f == message.source) {
                    self.stats.identical_removed += 1;
                    return Ok(());
                }
                StringEntry::Plural(self.normalize_forms(context, &message.source, &forms)?)
            }
        };

        let comment = message.comment.clone().unwrap_or_default();
        let entries = self
            .contexts
            .entry(context.to_string())
            .or_default()
            .entry(message.source.clone())
            .or_default();
        if entries
            .iter()
            .any(|e| e.comment == comment && e.value.is_plural() == value.is_plural())
        {
            if self.config.policy == IntegrityPolicy::Strict {
                return Err(I18nError::DuplicateKey {
                    context: context.to_string(),
                    source: message.source.clone(),
                });
            }
            warn!(context, source = %message.source, "duplicate message ignored");
            self.stats.duplicates_ignored += 1;
            return Ok(());
        }
        entries.push(Entry { comment, value });

        if unfinished {
            self.stats.unfinished += 1;
        } else {
            self.stats.finished += 1;
        }
        Ok(())
    }

    fn normalize_forms(
        &mut self,
        context: &str,
        source: &str,
        forms: &[&str],
    ) -> Result<NumerusForms, I18nError> {
        let expected = self.rule.form_count();
        let mut repaired = false;
        let mut out: Vec<String> = forms.iter().map(|f| (*f).to_string()).collect();

        if out.len() != expected {
            if self.config.policy == IntegrityPolicy::Strict {
                return Err(I18nError::NumerusMismatch {
                    context: context.to_string(),
                    source: source.to_string(),
                    expected,
                    found: out.len(),
                });
            }
            warn!(
                context,
                source,
                expected,
                found = out.len(),
                "numerus form count mismatch, using nearest form"
            );
            repaired = true;
            let last = out.last().cloned().unwrap_or_default();
            out.resize(expected, last);
        }

        if let Some(index) = out.iter().position(String::is_empty) {
            if self.config.policy == IntegrityPolicy::Strict {
                return Err(I18nError::EmptyNumerusForm {
                    context: context.to_string(),
                    source: source.to_string(),
                    index,
                });
            }
            warn!(context, source, "empty numerus form filled from neighbour");
            repaired = true;
            fill_empty_forms(&mut out);
        }

        if repaired {
            self.stats.numerus_repaired += 1;
        }
        Ok(NumerusForms::new(out))
    }
}

/// Replace empty forms with the closest preceding filled form, or the
/// first filled one when none precedes.
fn fill_empty_forms(forms: &mut [String]) {
    let Some(first) = forms.iter().find(|f| !f.is_empty()).cloned() else {
        return;
    };
    let mut previous = first;
    for form in forms.iter_mut() {
        if form.is_empty() {
            form.clone_from(&previous);
        } else {
            previous.clone_from(form);
        }
    }
}
