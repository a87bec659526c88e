//! Shard to document processing.
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use log::{debug, warn};

use crate::cleaner::TextCleaner;
use crate::error::Error;
use crate::filtering::{Corruption, Filter};
use crate::io::reader::{Shard, MAX_LINE_SIZE};
use crate::lemmatizer::Lemmatizer;

/// Result of the processing of a single shard.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessedFile {
    /// Cleaned (and maybe lemmatized) lines, space-joined. Can be empty.
    pub text: String,
    pub nb_lines: usize,
    pub corrupted_lines: usize,
}

/// Turns a shard into a single document.
///
/// Each line is checked for corruption (flagged lines are still cleaned and kept),
/// cleaned, and the non-empty results are joined.
pub struct FileProcessor {
    cleaner: Arc<dyn TextCleaner>,
    lemmatizer: Option<Arc<Lemmatizer>>,
    detector: Corruption,
    max_line_size: usize,
}

impl FileProcessor {
    pub fn new(cleaner: Arc<dyn TextCleaner>) -> Self {
        Self {
            cleaner,
            lemmatizer: None,
            detector: Corruption::default(),
            max_line_size: MAX_LINE_SIZE,
        }
    }

    pub fn with_lemmatizer(mut self, lemmatizer: Arc<Lemmatizer>) -> Self {
        self.lemmatizer = Some(lemmatizer);
        self
    }

    pub fn with_detector(mut self, detector: Corruption) -> Self {
        self.detector = detector;
        self
    }

    pub fn with_max_line_size(mut self, max_line_size: usize) -> Self {
        self.max_line_size = max_line_size;
        self
    }

    pub fn detector(&self) -> &Corruption {
        &self.detector
    }

    /// Process a gzipped shard.
    pub fn process_file(&self, path: &Path) -> Result<ProcessedFile, Error> {
        let shard = Shard::from_path_gzip(path)?;
        self.process(shard)
    }

    /// Process an already opened shard.
    ///
    /// Any read error (decompression, line too long) fails the whole shard.
    pub fn process<R: BufRead>(&self, shard: Shard<R>) -> Result<ProcessedFile, Error> {
        let shard = shard.with_max_line_size(self.max_line_size);
        let source = source_name(shard.path());

        let mut processed = ProcessedFile::default();
        for line in shard {
            let line = line?;
            processed.nb_lines += 1;

            if self.detector.detect(line.as_slice()) {
                processed.corrupted_lines += 1;
                warn!(
                    "{}: corrupted line {}: {}",
                    source,
                    processed.nb_lines,
                    String::from_utf8_lossy(&line)
                        .chars()
                        .take(100)
                        .collect::<String>()
                );
            }

            let cleaned = self.cleaner.clean_bytes(&line, &source);
            if !cleaned.is_empty() {
                if !processed.text.is_empty() {
                    processed.text.push(' ');
                }
                processed.text.push_str(&cleaned);
            }
        }

        debug!(
            "{}: {} lines, {} corrupted, {} bytes of text",
            source,
            processed.nb_lines,
            processed.corrupted_lines,
            processed.text.len()
        );

        if let Some(lemmatizer) = &self.lemmatizer {
            match lemmatizer.lemmatize(&processed.text, &source) {
                Ok(lemmatized) => processed.text = lemmatized,
                Err(e) => warn!(
                    "{}: lemmatization failed, keeping text as is: {:?}",
                    source, e
                ),
            }
        }

        Ok(processed)
    }
}

/// File name used to attribute logged tokens.
fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
