//! Text normalization applied to flushed words
//!
//! A word made only of digits is read as a number, spelled out in the
//! configured locale. Everything else is spoken as typed.

pub mod english;
pub mod french;

use log::debug;
use std::fmt;

/// Language and regional variant used for spelling numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    /// France: "soixante-dix", "quatre-vingt-dix"
    French,
    /// Switzerland: "septante", "nonante"
    SwissFrench,
    /// Belgium: "septante", "nonante"
    BelgianFrench,
    English,
    /// Any other language: numbers are left to the voice
    Other,
}

impl Locale {
    /// Parse a language tag such as "fr-CH", "fr_BE" or "en"
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim().to_lowercase().replace('_', "-");
        let mut parts = tag.split('-');
        let language = parts.next().unwrap_or_default();
        let region = parts.next().unwrap_or_default();

        match (language, region) {
            ("fr", "ch") => Locale::SwissFrench,
            ("fr", "be") => Locale::BelgianFrench,
            ("fr", _) => Locale::French,
            ("en", _) => Locale::English,
            _ => Locale::Other,
        }
    }

    /// Does this locale replace the 70s and 90s with regional words?
    pub fn regional_numbers(&self) -> bool {
        matches!(self, Locale::SwissFrench | Locale::BelgianFrench)
    }

    /// Spell out `n`, `None` when the locale or the magnitude is unsupported
    pub fn spell_number(&self, n: u64) -> Option<String> {
        match self {
            Locale::French | Locale::SwissFrench | Locale::BelgianFrench => {
                french::cardinal(n).map(|spelled| {
                    if self.regional_numbers() {
                        french::regionalize(&spelled)
                    } else {
                        spelled
                    }
                })
            }
            Locale::English => english::cardinal(n),
            Locale::Other => None,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Locale::French => "fr-FR",
            Locale::SwissFrench => "fr-CH",
            Locale::BelgianFrench => "fr-BE",
            Locale::English => "en",
            Locale::Other => "other",
        };
        f.write_str(tag)
    }
}

/// Normalize a completed word before synthesis
///
/// Numeric words are spelled out; anything that does not parse as a base-10
/// integer, or that the locale cannot spell, is returned unchanged.
pub fn normalize_word(word: &str, locale: Locale) -> String {
    if word.is_empty() || !word.chars().all(|c| c.is_ascii_digit()) {
        return word.to_string();
    }

    match word.parse::<u64>().ok().and_then(|n| locale.spell_number(n)) {
        Some(spelled) => {
            debug!("Number {} read as '{}'", word, spelled);
            spelled
        }
        None => word.to_string(),
    }
}
