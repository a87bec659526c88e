//! Corrupted text detection.
//!
//! Lines coming out of shards can be badly encoded, contain null bytes or be
//! filled with control/replacement characters (usually leftovers of binary
//! content or of a broken conversion).
use log::debug;
use unic_ucd::GeneralCategory;

use super::Filter;

/// Corruption heuristics.
///
/// Text is flagged when:
/// - it is not valid UTF-8,
/// - it contains a null byte,
/// - more than [Corruption::max_control_ratio] of its characters are control characters
///   (tabs, newlines and carriage returns excepted),
/// - more than [Corruption::max_replacement_ratio] of its characters are `U+FFFD`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corruption {
    max_control_ratio: f64,
    max_replacement_ratio: f64,
}

impl Default for Corruption {
    /// 10% control characters, 5% replacement characters.
    fn default() -> Self {
        Self {
            max_control_ratio: 0.10,
            max_replacement_ratio: 0.05,
        }
    }
}

impl Corruption {
    /// Custom thresholds, as ratios of the character count.
    pub fn with_ratios(max_control_ratio: f64, max_replacement_ratio: f64) -> Self {
        Self {
            max_control_ratio,
            max_replacement_ratio,
        }
    }

    pub fn max_control_ratio(&self) -> f64 {
        self.max_control_ratio
    }

    pub fn max_replacement_ratio(&self) -> f64 {
        self.max_replacement_ratio
    }
}

/// Control characters that carry no layout meaning.
#[inline]
pub fn is_noise_control(c: char) -> bool {
    !matches!(c, '\n' | '\t' | '\r') && GeneralCategory::of(c) == GeneralCategory::Control
}

impl Filter<&str> for Corruption {
    fn detect(&self, text: &str) -> bool {
        if text.contains('\0') {
            debug!("null byte in {:?}", truncate(text));
            return true;
        }

        let mut nb_chars = 0usize;
        let mut nb_control = 0usize;
        let mut nb_replacement = 0usize;
        for c in text.chars() {
            nb_chars += 1;
            if c == char::REPLACEMENT_CHARACTER {
                nb_replacement += 1;
            } else if is_noise_control(c) {
                nb_control += 1;
            }
        }

        if nb_control as f64 > nb_chars as f64 * self.max_control_ratio {
            debug!(
                "{}/{} control characters in {:?}",
                nb_control,
                nb_chars,
                truncate(text)
            );
            return true;
        }

        if nb_replacement as f64 > nb_chars as f64 * self.max_replacement_ratio {
            debug!(
                "{}/{} replacement characters in {:?}",
                nb_replacement,
                nb_chars,
                truncate(text)
            );
            return true;
        }

        false
    }
}

impl Filter<&[u8]> for Corruption {
    fn detect(&self, bytes: &[u8]) -> bool {
        match std::str::from_utf8(bytes) {
            Ok(text) => self.detect(text),
            Err(e) => {
                debug!("invalid utf-8 after {} bytes", e.valid_up_to());
                true
            }
        }
    }
}

/// Checks text (or raw bytes) with the default thresholds.
pub fn is_corrupted<T: AsRef<[u8]>>(text: T) -> bool {
    Corruption::default().detect(text.as_ref())
}

/// keep log lines short
fn truncate(text: &str) -> &str {
    match text.char_indices().nth(100) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
