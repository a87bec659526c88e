//! Numeric tokens: roman numerals, digits, dates, fractions and decimals.
use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::error::Error;

lazy_static! {
    static ref DIGITS: Regex = Regex::new(r"\d+").unwrap();
    static ref WORD: Regex = Regex::new(r"[\p{L}\p{M}\p{N}]+").unwrap();
    static ref ROMAN: Regex =
        Regex::new(r"^M{0,3}(?:CM|CD|D?C{0,3})(?:XC|XL|L?X{0,3})(?:IX|IV|V?I{0,3})$").unwrap();
}

const ISO_DATE: &str = r"\d{4}-\d{1,2}-\d{1,2}";
const US_DATE: &str = r"\d{1,2}/\d{1,2}/\d{4}";
const EU_DATE: &str = r"\d{1,2}\.\d{1,2}\.\d{4}";
const DECIMAL: &str = r"\d+[.,]\d+";
const FRACTION: &str = r"\d+/\d+";

/// Punctuation that has to survive the mode filter for numeric tokens to be found again.
pub const NUMERIC_PUNCTUATION: &str = r".,/\-";

/// Replace digit runs with a space.
pub fn strip_digits(text: &str) -> Cow<'_, str> {
    DIGITS.replace_all(text, " ")
}

/// Replace uppercase roman numerals with a space.
///
/// Only whole words (runs of letters, marks and numbers) that are valid numerals are removed,
/// so `XIV` goes but `mix` or `Vivid` stay.
pub fn strip_roman_numerals(text: &str) -> Cow<'_, str> {
    WORD.replace_all(text, |caps: &Captures| {
        let word = &caps[0];
        if ROMAN.is_match(word) {
            " ".to_string()
        } else {
            word.to_string()
        }
    })
}

/// Dates, fractions and decimals preservation.
///
/// Operates on already filtered text, where the only punctuation left is [NUMERIC_PUNCTUATION].
/// Recognized tokens are padded with spaces, and any other punctuation is replaced by a space.
pub struct NumberPreserver {
    tokens: Regex,
}

impl NumberPreserver {
    /// Returns [None] if nothing has to be preserved.
    pub fn new(dates: bool, fractions: bool, decimals: bool) -> Result<Option<Self>, Error> {
        // order matters: dates have to be tried before decimals and fractions,
        // or 01.02.2024 would be read as 01.02 followed by .2024
        let mut alternatives = Vec::new();
        if dates {
            alternatives.extend([ISO_DATE, US_DATE, EU_DATE]);
        }
        if decimals {
            alternatives.push(DECIMAL);
        }
        if fractions {
            alternatives.push(FRACTION);
        }

        if alternatives.is_empty() {
            return Ok(None);
        }

        let pattern = format!(r"\b(?:{})\b", alternatives.join("|"));
        Ok(Some(Self {
            tokens: Regex::new(&pattern)?,
        }))
    }

    pub fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 16);
        let mut last = 0;
        for token in self.tokens.find_iter(text) {
            push_scrubbed(&mut out, &text[last..token.start()]);
            out.push(' ');
            // only decimals may hold a comma
            out.push_str(&token.as_str().replace(',', "."));
            out.push(' ');
            last = token.end();
        }
        push_scrubbed(&mut out, &text[last..]);
        out
    }
}

fn push_scrubbed(out: &mut String, text: &str) {
    out.extend(text.chars().map(|c| match c {
        '.' | ',' | '/' | '-' => ' ',
        c => c,
    }));
}
