//! One-shot, all-or-nothing table loading.
//!
//! [`load`] and [`load_str`] hand back either a complete table or an error.
//! The `*_or_identity` variants are for hosts that must keep running: any
//! failure is logged and replaced by [`TranslationTable::identity`].

use std::path::Path;

use tracing::{debug_span, warn};

use crate::config::LoadConfig;
use crate::error::I18nError;
use crate::table::TranslationTable;
use crate::ts::parse_ts;

/// Parse and build a table from TS text.
pub fn load_str(xml: &str, config: &LoadConfig) -> Result<TranslationTable, I18nError> {
    let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
    let doc = parse_ts(xml)?;
    TranslationTable::from_document(&doc, config)
}

/// Read, parse and build a table from a TS file.
pub fn load(path: impl AsRef<Path>, config: &LoadConfig) -> Result<TranslationTable, I18nError> {
    let path = path.as_ref();
    let _span = debug_span!("load_ts", path = %path.display()).entered();
    let xml = std::fs::read_to_string(path).map_err(|source| I18nError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_str(&xml, config)
}

/// [`load`], falling back to the identity table on any error.
#[must_use]
pub fn load_or_identity(path: impl AsRef<Path>, config: &LoadConfig) -> TranslationTable {
    let path = path.as_ref();
    load(path, config).unwrap_or_else(|err| {
        warn!(path = %path.display(), error = %err, "translations unavailable, using source text");
        TranslationTable::identity()
    })
}

/// [`load_str`], falling back to the identity table on any error.
#[must_use]
pub fn load_str_or_identity(xml: &str, config: &LoadConfig) -> TranslationTable {
    load_str(xml, config).unwrap_or_else(|err| {
        warn!(error = %err, "translations unavailable, using source text");
        TranslationTable::identity()
    })
}
