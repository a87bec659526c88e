//! Text cleaning.
//!
//! The [TextCleaner] trait is what workers hold on to, [Cleaner] being the default implementation.
use std::borrow::Cow;

#[allow(clippy::module_inception)]
mod cleaner;
mod mode;
mod numbers;

pub use cleaner::{CleanOptions, Cleaner, LONG_WORD_THRESHOLD};
pub use mode::CleanerMode;
pub use numbers::{strip_digits, strip_roman_numerals, NumberPreserver};

/// Text normalization, shared between workers.
///
/// Cleaning is total: malformed input yields sanitized (possibly empty) output, never an error.
pub trait TextCleaner: Send + Sync {
    /// Clean `text`, `source` being used to attribute logged tokens.
    fn clean_from(&self, text: &str, source: &str) -> String;

    fn clean(&self, text: &str) -> String {
        self.clean_from(text, "-")
    }

    /// Clean raw bytes, repairing invalid UTF-8 first.
    fn clean_bytes(&self, raw: &[u8], source: &str) -> String {
        self.clean_from(&repair_utf8(raw), source)
    }
}

/// Replace each maximal run of invalid UTF-8 with a single space.
///
/// Borrows when `raw` is valid.
pub fn repair_utf8(raw: &[u8]) -> Cow<'_, str> {
    if let Ok(text) = std::str::from_utf8(raw) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    let mut after_invalid = false;
    loop {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                out.push_str(valid);
                break;
            }
            Err(e) => {
                let (valid, invalid) = rest.split_at(e.valid_up_to());
                if !valid.is_empty() {
                    out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                    after_invalid = false;
                }
                if !after_invalid {
                    out.push(' ');
                    after_invalid = true;
                }
                match e.error_len() {
                    Some(len) => rest = &invalid[len..],
                    // truncated sequence at the end of input
                    None => break,
                }
            }
        }
    }

    Cow::Owned(out)
}
