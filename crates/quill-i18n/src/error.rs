//! Error type shared by the TS reader, table builder and loader.

use std::fmt;
use std::path::PathBuf;

/// Errors from loading or building a translation table.
///
/// None of these ever reach a lookup: callers that cannot tolerate a
/// failed load use [`crate::load_or_identity`] and get an identity table.
#[derive(Debug)]
pub enum I18nError {
    /// The resource file could not be read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The document is not well-formed XML.
    Xml { position: u64, message: String },
    /// The document root is not a `<TS>` element.
    NotTs { found: String },
    /// A required attribute is absent.
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
    /// A required child element is absent.
    MissingElement {
        parent: &'static str,
        element: &'static str,
    },
    /// An element appeared where the schema does not allow it.
    UnexpectedElement {
        parent: &'static str,
        element: String,
    },
    /// Non-whitespace text appeared where only elements are allowed.
    UnexpectedText { parent: &'static str },
    /// A locale string was malformed.
    InvalidLocale(String),
    /// A plural message carries the wrong number of numerus forms.
    NumerusMismatch {
        context: String,
        source: String,
        expected: usize,
        found: usize,
    },
    /// A plural message leaves one of its numerus forms blank.
    EmptyNumerusForm {
        context: String,
        source: String,
        index: usize,
    },
    /// Two messages share a key within one context.
    DuplicateKey { context: String, source: String },
}

impl fmt::Display for I18nError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::Xml { position, message } => {
                write!(f, "malformed XML at byte {position}: {message}")
            }
            Self::NotTs { found } => write!(f, "expected <TS> root element, found <{found}>"),
            Self::MissingAttribute { element, attribute } => {
                write!(f, "<{element}> is missing the '{attribute}' attribute")
            }
            Self::MissingElement { parent, element } => {
                write!(f, "<{parent}> is missing a <{element}> element")
            }
            Self::UnexpectedElement { parent, element } => {
                write!(f, "unexpected <{element}> inside <{parent}>")
            }
            Self::UnexpectedText { parent } => write!(f, "unexpected text inside <{parent}>"),
            Self::InvalidLocale(l) => write!(f, "invalid locale: '{l}'"),
            Self::NumerusMismatch {
                context,
                source,
                expected,
                found,
            } => write!(
                f,
                "'{source}' in context '{context}' has {found} numerus form(s), expected {expected}"
            ),
            Self::EmptyNumerusForm {
                context,
                source,
                index,
            } => write!(
                f,
                "'{source}' in context '{context}' has an empty numerus form at index {index}"
            ),
            Self::DuplicateKey { context, source } => {
                write!(f, "duplicate message '{source}' in context '{context}'")
            }
        }
    }
}

impl std::error::Error for I18nError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn display_messages() {
        let err = I18nError::MissingAttribute {
            element: "TS",
            attribute: "language",
        };
        assert_eq!(err.to_string(), "<TS> is missing the 'language' attribute");

        let err = I18nError::NumerusMismatch {
            context: "DailyProgress".into(),
            source: "%Ln word(s)".into(),
            expected: 4,
            found: 2,
        };
        assert_eq!(
            err.to_string(),
            "'%Ln word(s)' in context 'DailyProgress' has 2 numerus form(s), expected 4"
        );

        let err = I18nError::EmptyNumerusForm {
            context: "DailyProgress".into(),
            source: "%Ln word(s)".into(),
            index: 2,
        };
        assert_eq!(
            err.to_string(),
            "'%Ln word(s)' in context 'DailyProgress' has an empty numerus form at index 2"
        );
    }

    #[test]
    fn io_error_exposes_source() {
        let err = I18nError::Io {
            path: PathBuf::from("missing.ts"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("cannot read missing.ts"));
        assert!(I18nError::InvalidLocale(String::new()).source().is_none());
    }
}
