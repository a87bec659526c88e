//! Lemmatization through an external morphological analyzer (such as `mystem`).
//!
//! The analyzer is run once per document, reading text on stdin and writing
//! `surface{lemma|alternatives}` groups on stdout.
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

use log::{debug, warn};

use crate::error::Error;
use crate::io::{TokenLevel, TokenLog};

mod output;
pub use output::reassemble;

/// Default analyzer, looked up on `PATH`.
pub const DEFAULT_ANALYZER: &str = "mystem";

/// Tokens longer than that are logged but still analyzed.
pub const LONG_TOKEN: usize = 30;
/// Tokens longer than that are logged and never sent to the analyzer.
pub const DANGER_TOKEN: usize = 100;

/// Split a flag string into individual flags.
///
/// Each character (dashes excepted) becomes its own flag: `"-ld"` gives `["-l", "-d"]`.
/// An empty string gives the default `-l -d`.
pub fn parse_flags(flags: &str) -> Vec<String> {
    if flags.is_empty() {
        return vec!["-l".to_string(), "-d".to_string()];
    }

    flags
        .chars()
        .filter(|c| *c != '-')
        .map(|c| format!("-{}", c))
        .collect()
}

/// Find the analyzer binary, either from a path or from its name on `PATH`.
pub fn resolve_analyzer(analyzer: &Path) -> Result<PathBuf, Error> {
    let resolved = which::which(analyzer)?;
    debug!("analyzer {:?} resolved to {:?}", analyzer, resolved);
    Ok(resolved)
}

pub struct Lemmatizer {
    analyzer: PathBuf,
    flags: Vec<String>,
    tokens: Option<Arc<TokenLog>>,
}

impl Lemmatizer {
    /// `flags` are passed as is, before the trailing `-` (stdin).
    /// See [parse_flags] to build them from a flag string.
    pub fn new(analyzer: PathBuf, flags: Vec<String>) -> Self {
        Self {
            analyzer,
            flags,
            tokens: None,
        }
    }

    /// Log long/dangerous tokens into `log`.
    pub fn with_token_log(mut self, log: Arc<TokenLog>) -> Self {
        self.tokens = Some(log);
        self
    }

    pub fn analyzer(&self) -> &Path {
        &self.analyzer
    }

    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    fn log_token(&self, level: TokenLevel, source: &str, token: &str) {
        if let Some(log) = &self.tokens {
            log.log(level, source, token);
        }
    }

    /// Drop (and log) tokens the analyzer should not see.
    fn filter_tokens(&self, text: &str, source: &str) -> String {
        let mut kept = String::with_capacity(text.len());
        for token in text.split_whitespace() {
            let nb_chars = token.chars().count();
            if nb_chars > DANGER_TOKEN {
                self.log_token(TokenLevel::Danger, source, token);
                continue;
            }
            if nb_chars > LONG_TOKEN {
                self.log_token(TokenLevel::Long, source, token);
            }
            if !kept.is_empty() {
                kept.push(' ');
            }
            kept.push_str(token);
        }
        kept
    }

    /// Lemmatize `text`.
    ///
    /// `source` is only used to attribute logged tokens.
    /// Errors (launch failure, non-zero exit) are meant to be recoverable:
    /// the caller can carry on with the original text.
    pub fn lemmatize(&self, text: &str, source: &str) -> Result<String, Error> {
        let filtered = self.filter_tokens(text, source);
        if filtered.is_empty() {
            return Ok(String::new());
        }

        let mut child = Command::new(&self.analyzer)
            .args(&self.flags)
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // feed stdin from another thread, so that a full stdout pipe
        // can't block us while writing.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Custom("analyzer stdin is not piped".to_string()))?;
        let feeder = std::thread::spawn(move || stdin.write_all(filtered.as_bytes()));

        let output = child.wait_with_output()?;

        match feeder.join() {
            Ok(Ok(())) => (),
            Ok(Err(e)) if e.kind() == ErrorKind::BrokenPipe => {
                debug!("{}: analyzer closed its input early", source)
            }
            Ok(Err(e)) => warn!("{}: could not write to analyzer: {:?}", source, e),
            Err(_) => warn!("{}: analyzer input thread panicked", source),
        }

        if !output.status.success() {
            return Err(Error::Analyzer {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(reassemble(&String::from_utf8_lossy(&output.stdout)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags() {
        assert_eq!(parse_flags(""), vec!["-l", "-d"]);
        assert_eq!(parse_flags("-ld"), vec!["-l", "-d"]);
        assert_eq!(parse_flags("cgi"), vec!["-c", "-g", "-i"]);
        assert_eq!(parse_flags("-l-d"), vec!["-l", "-d"]);
    }

    #[test]
    fn empty_text_skips_analyzer() {
        // would fail if it was run
        let lem = Lemmatizer::new(PathBuf::from("/nonexistent/analyzer"), vec![]);
        assert_eq!(lem.lemmatize("", "-").unwrap(), "");
        assert_eq!(lem.lemmatize("   ", "-").unwrap(), "");
        assert_eq!(lem.lemmatize(&"x".repeat(101), "-").unwrap(), "");
    }

    #[test]
    fn token_filtering() {
        let dst = tempfile::tempdir().unwrap();
        let path = dst.path().join("tokens.log");
        let log = Arc::new(TokenLog::open(&path).unwrap());
        let lem = Lemmatizer::new(PathBuf::from("unused"), vec![]).with_token_log(log.clone());

        let long = "л".repeat(31);
        let danger = "д".repeat(101);
        let edge = "e".repeat(30);
        let text = format!("a {} {} {} b", long, danger, edge);

        assert_eq!(
            lem.filter_tokens(&text, "1.txt.gz"),
            format!("a {} {} b", long, edge)
        );
        log.flush().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            format!("[LONG] 1.txt.gz: {}\n[DANGER] 1.txt.gz: {}\n", long, danger)
        );
    }

    #[test]
    fn missing_analyzer() {
        assert!(matches!(
            resolve_analyzer(Path::new("surely-not-an-analyzer-on-path")),
            Err(Error::AnalyzerNotFound(_))
        ));
        let lem = Lemmatizer::new(PathBuf::from("/nonexistent/analyzer"), vec![]);
        assert!(matches!(lem.lemmatize("word", "-"), Err(Error::Io(_))));
    }

    #[cfg(unix)]
    mod unix {
        use super::*;

        fn sh(script: &str) -> Lemmatizer {
            Lemmatizer::new(
                PathBuf::from("/bin/sh"),
                vec!["-c".to_string(), script.to_string()],
            )
        }

        #[test]
        fn passthrough() {
            let lem = Lemmatizer::new(PathBuf::from("/bin/cat"), vec![]);
            assert_eq!(
                lem.lemmatize("  hello \n world ", "-").unwrap(),
                "hello world"
            );
        }

        #[test]
        fn analysis() {
            let lem = sh("cat > /dev/null; printf 'бежал{бежать|бежавший}\\n{кот??}\\n'");
            assert_eq!(lem.lemmatize("бежал кот", "-").unwrap(), "бежать кот");
        }

        #[test]
        fn large_payload() {
            let lem = Lemmatizer::new(PathBuf::from("/bin/cat"), vec![]);
            let text = "слово ".repeat(200_000);
            let out = lem.lemmatize(&text, "-").unwrap();
            assert_eq!(out.split(' ').count(), 200_000);
        }

        #[test]
        fn failure() {
            let lem = sh("cat > /dev/null; echo boom >&2; exit 3");
            match lem.lemmatize("word", "-") {
                Err(Error::Analyzer { status, stderr }) => {
                    assert_eq!(status.code(), Some(3));
                    assert_eq!(stderr.trim(), "boom");
                }
                other => panic!("expected analyzer error, got {:?}", other),
            }
        }
    }
}
