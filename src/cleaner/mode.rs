//! Cleaning modes.
//!
//! A mode decides which characters survive the character class filter.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Historical Cyrillic letters (and the combining titlo family) kept by [CleanerMode::OldSlavonic],
/// on top of the modern Cyrillic alphabet.
const OLD_SLAVONIC_CHARS: &str = concat!(
    // omega, yat, iotified e, yus, ksi, psi, fita, izhitsa, uk, round omega, ot, koppa
    "ѠѡѢѣѤѥѦѧѨѩѪѫѬѭѮѯѰѱѲѳѴѵѶѷѸѹѺѻѼѽѾѿҀҁ",
    // titlo, palatalization, dasia/psili pneumata, pokrytie
    "\u{0483}\u{0484}\u{0485}\u{0486}\u{0487}",
    // Cyrillic Extended-B
    "ꙀꙁꙂꙃꙄꙅꙆꙇꙈꙉꙊꙋꙌꙍꙎꙏꙐꙑꙒꙓꙔꙕꙖꙗꙘꙙꙚꙛꙜꙝꙞꙟꙠꙡꙢꙣꙤꙥꙦꙧꙨꙩꙪꙫꙬꙭꙮ",
);

/// Latin script, modern Cyrillic (basic block minus historical letters, plus the
/// extensions used by non-slavic languages), decimal digits, and the combining
/// diacritics (stress marks) these alphabets are written with.
const MODERN_CHARS: &str =
    r"\p{Latin}\x{0400}-\x{045F}\x{048A}-\x{052F}\p{Nd}\x{0300}-\x{036F}";

/// Scripts left out of [CleanerMode::UnicodeLettersAndNumbers].
const LOGOGRAPHIC_SCRIPTS: &str = r"\p{Han}\p{Hangul}\p{Hiragana}\p{Katakana}\p{Bopomofo}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CleanerMode {
    /// Latin and Cyrillic letters of modern languages, digits.
    Modern,
    /// [CleanerMode::Modern] and historical Cyrillic.
    OldSlavonic,
    /// Every letter and number.
    All,
    /// Every letter, no digits.
    UnicodeLetters,
    /// Every letter and number, CJK/Hangul/Kana/Bopomofo excepted.
    #[default]
    UnicodeLettersAndNumbers,
}

impl CleanerMode {
    pub const VARIANTS: [&'static str; 5] = [
        "modern",
        "old_slavonic",
        "all",
        "unicode_letters",
        "unicode_letters_and_numbers",
    ];

    /// Allowed characters, as a regex class body, and optionally the
    /// characters that have to be removed from it.
    ///
    /// Combining marks are allowed so that words written with them stay whole.
    fn classes(&self) -> (String, Option<&'static str>) {
        match self {
            CleanerMode::Modern => (MODERN_CHARS.to_string(), None),
            CleanerMode::OldSlavonic => (format!("{}{}", MODERN_CHARS, OLD_SLAVONIC_CHARS), None),
            CleanerMode::All => (r"\p{L}\p{M}\p{N}".to_string(), None),
            CleanerMode::UnicodeLetters => (r"\p{L}\p{M}".to_string(), None),
            CleanerMode::UnicodeLettersAndNumbers => {
                (r"\p{L}\p{M}\p{N}".to_string(), Some(LOGOGRAPHIC_SCRIPTS))
            }
        }
    }

    /// Pattern matching runs of characters that are *not* allowed by the mode.
    ///
    /// Whitespace is always allowed. `extra` is a regex class body of additional
    /// characters to let through.
    pub fn rejection_pattern(&self, extra: &str) -> String {
        let (allowed, excluded) = self.classes();
        match excluded {
            Some(excluded) => format!(r"[^[{}\s{}]--[{}]]+", allowed, extra, excluded),
            None => format!(r"[^{}\s{}]+", allowed, extra),
        }
    }
}

impl FromStr for CleanerMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "modern" => Ok(CleanerMode::Modern),
            "old_slavonic" => Ok(CleanerMode::OldSlavonic),
            "all" => Ok(CleanerMode::All),
            "unicode_letters" => Ok(CleanerMode::UnicodeLetters),
            "unicode_letters_and_numbers" => Ok(CleanerMode::UnicodeLettersAndNumbers),
            other => Err(Error::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for CleanerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CleanerMode::Modern => "modern",
            CleanerMode::OldSlavonic => "old_slavonic",
            CleanerMode::All => "all",
            CleanerMode::UnicodeLetters => "unicode_letters",
            CleanerMode::UnicodeLettersAndNumbers => "unicode_letters_and_numbers",
        };
        write!(f, "{}", name)
    }
}
