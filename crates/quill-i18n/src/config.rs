//! Table loading configuration (deterministic, env-overridable).

use std::env;
use std::fmt;

const ENV_POLICY: &str = "QUILL_I18N_POLICY";
const ENV_INCLUDE_UNFINISHED: &str = "QUILL_I18N_INCLUDE_UNFINISHED";
const ENV_REMOVE_IDENTICAL: &str = "QUILL_I18N_REMOVE_IDENTICAL";
const ENV_PLURAL_LOCALE: &str = "QUILL_I18N_PLURAL_LOCALE";

/// How data-integrity problems in a document are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IntegrityPolicy {
    /// Warn, repair (pad or truncate numerus forms, keep the first of
    /// duplicate keys) and keep loading.
    #[default]
    Lenient,
    /// Reject the whole document on the first problem: a numerus form
    /// count mismatch, an empty numerus form or a duplicate key.
    Strict,
}

impl IntegrityPolicy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lenient" | "warn" => Some(Self::Lenient),
            "strict" | "reject" => Some(Self::Strict),
            _ => None,
        }
    }
}

impl fmt::Display for IntegrityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Lenient => "lenient",
            Self::Strict => "strict",
        })
    }
}

/// Options applied when a document is turned into a table.
///
/// # Environment Variables
/// - `QUILL_I18N_POLICY` = lenient|strict
/// - `QUILL_I18N_INCLUDE_UNFINISHED` (bool)
/// - `QUILL_I18N_REMOVE_IDENTICAL` (bool)
/// - `QUILL_I18N_PLURAL_LOCALE` (locale tag)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadConfig {
    pub policy: IntegrityPolicy,
    /// Load translations still marked `type="unfinished"`.
    pub include_unfinished: bool,
    /// Drop translations identical to their source text.
    pub remove_identical: bool,
    /// Locale used to pick the plural rule instead of the document's
    /// `language` attribute.
    pub plural_locale: Option<String>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            policy: IntegrityPolicy::Lenient,
            include_unfinished: true,
            remove_identical: false,
            plural_locale: None,
        }
    }
}

/// Configuration parse diagnostics (env + validation).
#[derive(Debug, Clone)]
pub struct LoadConfigParse {
    pub config: LoadConfig,
    pub errors: Vec<ConfigError>,
}

/// Configuration error with field context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub field: &'static str,
    pub value: String,
    pub message: String,
}

impl ConfigError {
    fn new(field: &'static str, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} ({})", self.field, self.value, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl LoadConfig {
    /// Parse config from environment variables.
    #[must_use]
    pub fn from_env() -> LoadConfig {
        Self::from_env_with_diagnostics().config
    }

    /// Parse config from environment variables and return diagnostics.
    #[must_use]
    pub fn from_env_with_diagnostics() -> LoadConfigParse {
        from_env_with(|key| env::var(key).ok())
    }

    /// Shorthand for a strict configuration.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            policy: IntegrityPolicy::Strict,
            ..Self::default()
        }
    }

    /// Validate config constraints and return all violations.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();
        if let Some(locale) = &self.plural_locale
            && locale.trim().is_empty()
        {
            errors.push(ConfigError::new(
                "plural_locale",
                locale.clone(),
                "must be a locale tag when set",
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

pub(crate) fn from_env_with<F>(mut get: F) -> LoadConfigParse
where
    F: FnMut(&str) -> Option<String>,
{
    let mut config = LoadConfig::default();
    let mut errors = Vec::new();

    if let Some(value) = get(ENV_POLICY) {
        match IntegrityPolicy::parse(&value) {
            Some(policy) => config.policy = policy,
            None => errors.push(ConfigError::new(
                ENV_POLICY,
                value,
                "expected lenient or strict",
            )),
        }
    }
    if let Some(value) = get(ENV_INCLUDE_UNFINISHED) {
        match parse_bool(&value) {
            Some(flag) => config.include_unfinished = flag,
            None => errors.push(ConfigError::new(
                ENV_INCLUDE_UNFINISHED,
                value,
                "expected a boolean",
            )),
        }
    }
    if let Some(value) = get(ENV_REMOVE_IDENTICAL) {
        match parse_bool(&value) {
            Some(flag) => config.remove_identical = flag,
            None => errors.push(ConfigError::new(
                ENV_REMOVE_IDENTICAL,
                value,
                "expected a boolean",
            )),
        }
    }
    if let Some(value) = get(ENV_PLURAL_LOCALE)
        && !value.trim().is_empty()
    {
        config.plural_locale = Some(value.trim().to_string());
    }

    if let Err(mut invalid) = config.validate() {
        errors.append(&mut invalid);
    }
    LoadConfigParse { config, errors }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
