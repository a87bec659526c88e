//! Shared diagnostic log for suspicious tokens.
//!
//! Both the cleaner (elided long words) and the lemmatizer (long/dangerous tokens)
//! report here. Entries are plain lines: `[LEVEL] source: token`.
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use log::{debug, error};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenLevel {
    /// Long token, still kept (lemmatizer) or elided (cleaner).
    Long,
    /// Token too long to be sent to the analyzer.
    Danger,
}

impl fmt::Display for TokenLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenLevel::Long => write!(f, "LONG"),
            TokenLevel::Danger => write!(f, "DANGER"),
        }
    }
}

/// Append-only, mutex-guarded log file.
///
/// Meant to be wrapped in an [std::sync::Arc] and shared across workers.
/// The underlying buffer is flushed when the last owner drops it.
pub struct TokenLog {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl TokenLog {
    /// Open (or create) `path` in append mode, creating parent folders if needed.
    pub fn open(path: &Path) -> Result<Self, Error> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                debug!("creating log folder {:?}", parent);
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write an entry. Failures are logged and otherwise ignored:
    /// losing a diagnostic line must not stop the run.
    pub fn log(&self, level: TokenLevel, source: &str, token: &str) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(writer, "[{}] {}: {}", level, source, token) {
            error!("could not write to token log {:?}: {:?}", self.path, e);
        }
    }

    pub fn flush(&self) -> Result<(), Error> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.flush()?;
        Ok(())
    }
}
