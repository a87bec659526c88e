//! Default cleaner.
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unic_ucd::GeneralCategory;
use unicode_normalization::UnicodeNormalization;

use super::mode::CleanerMode;
use super::numbers::{self, NumberPreserver, NUMERIC_PUNCTUATION};
use super::TextCleaner;
use crate::error::Error;
use crate::filtering::is_noise_control;
use crate::io::{TokenLevel, TokenLog};

/// Words that long (in chars) are dropped.
pub const LONG_WORD_THRESHOLD: usize = 30;

lazy_static! {
    static ref URL_OR_EMAIL: Regex = Regex::new(
        r"(?i)\b(?:https?|ftp)://\S+|\bwww\.\S+|[\w.+\-]+@[\w\-]+(?:\.[\w\-]+)+"
    )
    .unwrap();
}

/// Cleaning options.
///
/// Defaults keep numbers and roman numerals, normalize Unicode and remove URLs/emails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanOptions {
    pub keep_numbers: bool,
    pub keep_roman_numerals: bool,
    /// `ё` -> `е`
    pub replace_yo: bool,
    pub preserve_dates: bool,
    pub preserve_fractions: bool,
    pub preserve_decimals: bool,
    pub remove_urls: bool,
    /// NFKC normalization
    pub normalize: bool,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            keep_numbers: true,
            keep_roman_numerals: true,
            replace_yo: false,
            preserve_dates: false,
            preserve_fractions: false,
            preserve_decimals: false,
            remove_urls: true,
            normalize: true,
        }
    }
}

/// Multi-stage text cleaner.
///
/// Every stage replaces what it removes with a space, so that two words
/// separated by a removed character never get fused together.
/// The mode filter is compiled once, at construction.
pub struct Cleaner {
    mode: CleanerMode,
    options: CleanOptions,
    rejected: Regex,
    numbers: Option<NumberPreserver>,
    long_words: Option<Arc<TokenLog>>,
}

impl Cleaner {
    pub fn new(mode: CleanerMode, options: CleanOptions) -> Result<Self, Error> {
        let numbers = NumberPreserver::new(
            options.preserve_dates,
            options.preserve_fractions,
            options.preserve_decimals,
        )?;

        let extra = if numbers.is_some() {
            NUMERIC_PUNCTUATION
        } else {
            ""
        };
        let rejected = Regex::new(&mode.rejection_pattern(extra))?;

        Ok(Self {
            mode,
            options,
            rejected,
            numbers,
            long_words: None,
        })
    }

    /// Log elided long words into `log`.
    pub fn with_long_words_log(mut self, log: Arc<TokenLog>) -> Self {
        self.long_words = Some(log);
        self
    }

    pub fn mode(&self) -> CleanerMode {
        self.mode
    }

    pub fn options(&self) -> &CleanOptions {
        &self.options
    }

    /// Keep words under [LONG_WORD_THRESHOLD], collapsing whitespace.
    ///
    /// Combining marks left at the start of a word lost their base character.
    fn join_words(&self, text: &str, source: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for word in text.split_whitespace() {
            let word = word.trim_start_matches(|c| GeneralCategory::of(c).is_mark());
            if word.is_empty() {
                continue;
            }
            if word.chars().count() >= LONG_WORD_THRESHOLD {
                if let Some(log) = &self.long_words {
                    log.log(TokenLevel::Long, source, word);
                }
                continue;
            }
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(word);
        }
        out
    }
}

impl TextCleaner for Cleaner {
    fn clean_from(&self, text: &str, source: &str) -> String {
        let mut text: String = text.chars().filter(|c| *c != '\0').collect();

        if self.options.normalize {
            text = text.nfkc().collect();
        }

        let text: String = text
            .chars()
            .map(|c| {
                if c == char::REPLACEMENT_CHARACTER || is_noise_control(c) {
                    ' '
                } else {
                    c
                }
            })
            .collect();

        let text = if self.options.remove_urls {
            URL_OR_EMAIL.replace_all(&text, " ").into_owned()
        } else {
            text
        };

        let mut text = self.rejected.replace_all(&text, " ").into_owned();

        // on filtered text, so that numerals are only looked for in final words,
        // and before case folding, so that only uppercase roman numerals are seen
        if !self.options.keep_numbers {
            text = numbers::strip_digits(&text).into_owned();
        }
        if !self.options.keep_roman_numerals {
            text = numbers::strip_roman_numerals(&text).into_owned();
        }

        if let Some(numbers) = &self.numbers {
            text = numbers.apply(&text);
        }

        let mut text = text.to_lowercase();
        if self.options.replace_yo {
            text = text.replace('ё', "е");
        }

        self.join_words(&text, source)
    }
}
