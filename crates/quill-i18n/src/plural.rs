//! CLDR-style plural categories and per-language rule families.
//!
//! A TS file stores plural translations as an ordered list of numerus
//! forms. The order is fixed per language family, so selecting a form is a
//! two-step process: classify the count into a [`PluralCategory`], then find
//! that category's position in [`PluralRule::categories`].
//!
//! # Invariants
//!
//! 1. **Total**: `categorize` returns a category for every `i64`, and that
//!    category always appears in `categories()`.
//! 2. **Index in range**: `form_index(n) < form_count()` for every `n`.
//! 3. **Sign-blind**: negative counts classify like their absolute value.

use std::fmt;

/// CLDR plural category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralCategory {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
}

impl PluralCategory {
    /// CLDR keyword for this category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Zero => "zero",
            Self::One => "one",
            Self::Two => "two",
            Self::Few => "few",
            Self::Many => "many",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for PluralCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plural rule family.
///
/// Each family fixes both the classification of integers and the order in
/// which the numerus forms of a TS message are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PluralRule {
    /// Japanese, Chinese, Korean, Vietnamese, Thai, Indonesian, ...
    NoPlural,
    /// `one` for exactly 1 (English, German, Dutch, Spanish, Italian, ...).
    #[default]
    English,
    /// `one` for 0 and 1 (French, Brazilian Portuguese).
    French,
    /// Czech and Slovak: `one`, `few` (2..=4), `other`.
    Czech,
    /// Polish: `one`, `few`, `many`.
    Polish,
    /// Russian, Ukrainian, Belarusian and the BCS languages.
    EastSlavic,
    /// Slovenian: `one`, `two`, `few`, `other` keyed on `n % 100`.
    Slovenian,
    /// Lithuanian: `one`, `few`, `other`.
    Lithuanian,
    /// Latvian: `one`, `other`, `zero` (TS order).
    Latvian,
    /// Irish: `one`, `two`, `other`.
    Irish,
    /// Romanian: `one`, `few`, `other`.
    Romanian,
    /// Arabic: all six categories.
    Arabic,
}

impl PluralRule {
    /// Pick the rule for a locale tag such as `"sl"`, `"sl_SI"` or `"pt-BR"`.
    ///
    /// Only the language subtag matters, except for Brazilian Portuguese.
    /// Unknown languages use [`PluralRule::English`].
    #[must_use]
    pub fn for_locale(locale: &str) -> Self {
        let normalized = locale.trim().to_ascii_lowercase().replace('-', "_");
        if normalized == "pt_br" {
            return Self::French;
        }
        let lang = normalized.split('_').next().unwrap_or_default();
        match lang {
            "ja" | "zh" | "ko" | "vi" | "th" | "id" | "ms" | "lo" | "my" | "km" => {
                Self::NoPlural
            }
            "fr" | "br" | "oc" | "fil" | "tl" => Self::French,
            "cs" | "sk" => Self::Czech,
            "pl" => Self::Polish,
            "ru" | "uk" | "be" | "sr" | "hr" | "bs" => Self::EastSlavic,
            "sl" => Self::Slovenian,
            "lt" => Self::Lithuanian,
            "lv" => Self::Latvian,
            "ga" => Self::Irish,
            "ro" | "mo" => Self::Romanian,
            "ar" => Self::Arabic,
            _ => Self::English,
        }
    }

    /// Categories in the order the numerus forms are stored.
    #[must_use]
    pub const fn categories(self) -> &'static [PluralCategory] {
        use PluralCategory::{Few, Many, One, Other, Two, Zero};
        match self {
            Self::NoPlural => &[Other],
            Self::English | Self::French => &[One, Other],
            Self::Czech | Self::Lithuanian | Self::Romanian => &[One, Few, Other],
            Self::Polish | Self::EastSlavic => &[One, Few, Many],
            Self::Slovenian => &[One, Two, Few, Other],
            Self::Latvian => &[One, Other, Zero],
            Self::Irish => &[One, Two, Other],
            Self::Arabic => &[Zero, One, Two, Few, Many, Other],
        }
    }

    /// Number of numerus forms a message in this family must carry.
    #[must_use]
    pub const fn form_count(self) -> usize {
        self.categories().len()
    }

    /// Classify `count` into a plural category.
    #[must_use]
    pub fn categorize(self, count: i64) -> PluralCategory {
        let n = count.unsigned_abs();
        let n10 = n % 10;
        let n100 = n % 100;
        match self {
            Self::NoPlural => PluralCategory::Other,
            Self::English => {
                if n == 1 {
                    PluralCategory::One
                } else {
                    PluralCategory::Other
                }
            }
            Self::French => {
                if n <= 1 {
                    PluralCategory::One
                } else {
                    PluralCategory::Other
                }
            }
            Self::Czech => match n {
                1 => PluralCategory::One,
                2..=4 => PluralCategory::Few,
                _ => PluralCategory::Other,
            },
            Self::Polish => {
                if n == 1 {
                    PluralCategory::One
                } else if (2..=4).contains(&n10) && !(12..=14).contains(&n100) {
                    PluralCategory::Few
                } else {
                    PluralCategory::Many
                }
            }
            Self::EastSlavic => {
                if n10 == 1 && n100 != 11 {
                    PluralCategory::One
                } else if (2..=4).contains(&n10) && !(12..=14).contains(&n100) {
                    PluralCategory::Few
                } else {
                    PluralCategory::Many
                }
            }
            Self::Slovenian => match n100 {
                1 => PluralCategory::One,
                2 => PluralCategory::Two,
                3 | 4 => PluralCategory::Few,
                _ => PluralCategory::Other,
            },
            Self::Lithuanian => {
                if (11..=19).contains(&n100) {
                    PluralCategory::Other
                } else if n10 == 1 {
                    PluralCategory::One
                } else if n10 >= 2 {
                    PluralCategory::Few
                } else {
                    PluralCategory::Other
                }
            }
            Self::Latvian => {
                if n10 == 1 && n100 != 11 {
                    PluralCategory::One
                } else if n != 0 {
                    PluralCategory::Other
                } else {
                    PluralCategory::Zero
                }
            }
            Self::Irish => match n {
                1 => PluralCategory::One,
                2 => PluralCategory::Two,
                _ => PluralCategory::Other,
            },
            Self::Romanian => {
                if n == 1 {
                    PluralCategory::One
                } else if n == 0 || (1..=19).contains(&n100) {
                    PluralCategory::Few
                } else {
                    PluralCategory::Other
                }
            }
            Self::Arabic => match n {
                0 => PluralCategory::Zero,
                1 => PluralCategory::One,
                2 => PluralCategory::Two,
                _ if (3..=10).contains(&n100) => PluralCategory::Few,
                _ if n100 >= 11 => PluralCategory::Many,
                _ => PluralCategory::Other,
            },
        }
    }

    /// Position of `count`'s numerus form in a TS message.
    #[must_use]
    pub fn form_index(self, count: i64) -> usize {
        let category = self.categorize(count);
        self.categories()
            .iter()
            .position(|&c| c == category)
            .unwrap_or(self.form_count() - 1)
    }
}

/// Ordered numerus forms of one plural message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumerusForms {
    forms: Vec<String>,
}

impl NumerusForms {
    /// Wrap already-normalized forms.
    #[must_use]
    pub fn new(forms: Vec<String>) -> Self {
        Self { forms }
    }

    /// Select the form for `count` under `rule`.
    ///
    /// An index past the end resolves to the last stored form; `None` only
    /// when there are no forms at all.
    #[must_use]
    pub fn select(&self, rule: PluralRule, count: i64) -> Option<&str> {
        let idx = rule.form_index(count);
        self.forms
            .get(idx)
            .or_else(|| self.forms.last())
            .map(String::as_str)
    }

    /// All forms in stored order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.forms
    }

    /// Number of stored forms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.forms.len()
    }

    /// Whether no forms are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}
