#![forbid(unsafe_code)]

//! Translation tables for the Quill word processor.
//!
//! Loads Qt Linguist TS resources once at startup into an immutable
//! [`TranslationTable`] and resolves `(context, source)` lookups, with
//! CLDR-style plural-form selection for counted messages. Lookups never
//! fail: a missing translation yields the source text.
//!
//! # Example
//!
//! ```
//! use quill_i18n::{LoadConfig, load_str_or_identity};
//!
//! let xml = r#"<TS version="2.1" language="sl" sourcelanguage="en">
//! <context>
//!     <name>Alert</name>
//!     <message>
//!         <source>Close (%1)</source>
//!         <translation>Zapri (%1)</translation>
//!     </message>
//! </context>
//! </TS>"#;
//!
//! let table = load_str_or_identity(xml, &LoadConfig::default());
//! assert_eq!(table.lookup("Alert", "Close (%1)"), "Zapri (%1)");
//! assert_eq!(table.lookup("Alert", "Unknown Source"), "Unknown Source");
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod load;
pub mod placeholder;
pub mod plural;
pub mod table;
pub mod ts;

pub use catalog::{Catalog, CoverageReport, LocaleCoverage};
pub use config::{ConfigError, IntegrityPolicy, LoadConfig, LoadConfigParse};
pub use error::I18nError;
pub use load::{load, load_or_identity, load_str, load_str_or_identity};
pub use placeholder::substitute;
pub use plural::{NumerusForms, PluralCategory, PluralRule};
pub use table::{ReleaseStats, StringEntry, TranslationTable};
pub use ts::{TsDocument, parse_ts, write_ts};
