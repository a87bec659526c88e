//! Analyzer output reassembly.
use itertools::Itertools;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    /// `surface{lemma|alt|...}` or `{lemma??}`
    static ref ANALYSIS: Regex = Regex::new(r"[^\s{}]*\{([^|}]*)[^}]*\}").unwrap();
}

/// Turn analyzer output back into plain text.
///
/// Each analysis group is replaced by its first candidate (without trailing `?` markers),
/// text outside of groups is kept as is. Lines are joined with a space and whitespace is collapsed.
pub fn reassemble(output: &str) -> String {
    let text = output
        .lines()
        .map(|line| {
            ANALYSIS.replace_all(line, |caps: &Captures| {
                format!(" {} ", caps[1].trim_end_matches('?'))
            })
        })
        .join(" ");

    text.split_whitespace().join(" ")
}
