//! Run configuration.
//!
//! A [Config] can be loaded from a JSON (or YAML, with a `.yaml`/`.yml` extension) file,
//! where every field is optional:
//!
//! ```json
//! {
//!     "workers": 8,
//!     "cleaner": { "mode": "modern", "keep_roman_numerals": false },
//!     "lemmatization": { "enabled": true, "flags": "-ld" },
//!     "logger": { "long_words": true, "path": "logs/long_words.log" }
//! }
//! ```
//!
//! Command line arguments are then applied on top of it (see [crate::cli]).
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::cleaner::{CleanOptions, CleanerMode};
use crate::error::Error;
use crate::filtering::Corruption;
use crate::lemmatizer::DEFAULT_ANALYZER;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// folder holding shards
    pub src: PathBuf,
    /// corpus file
    pub dst: PathBuf,
    /// number of worker threads
    pub workers: usize,
    /// writer buffer capacity, in bytes
    pub buffer_size: usize,
    /// number of files processed by a worker between two progress reports
    pub report_every: usize,
    /// shard extension
    pub extension: String,
    /// append to the corpus file instead of truncating it
    pub append: bool,
    pub corruption: CorruptionConfig,
    pub cleaner: CleanerConfig,
    pub lemmatization: LemmatizationConfig,
    pub logger: LoggerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            src: PathBuf::new(),
            dst: PathBuf::new(),
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            buffer_size: 1024 * 1024,
            report_every: 100,
            extension: "gz".to_string(),
            append: false,
            corruption: CorruptionConfig::default(),
            cleaner: CleanerConfig::default(),
            lemmatization: LemmatizationConfig::default(),
            logger: LoggerConfig::default(),
        }
    }
}

impl Config {
    /// Load a configuration file, read as YAML if its extension says so, JSON otherwise.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        debug!("loading config from {:?}", path);
        let reader = BufReader::new(File::open(path)?);
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| {
                ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml")
            });

        let config = if is_yaml {
            serde_yaml::from_reader(reader)?
        } else {
            serde_json::from_reader(reader)?
        };
        Ok(config)
    }

    /// Check values that would make the run impossible.
    pub fn validate(&self) -> Result<(), Error> {
        if self.workers == 0 {
            return Err(Error::InvalidConfig("workers must be > 0".to_string()));
        }
        if self.buffer_size == 0 {
            return Err(Error::InvalidConfig("buffer_size must be > 0".to_string()));
        }
        if self.report_every == 0 {
            return Err(Error::InvalidConfig("report_every must be > 0".to_string()));
        }
        for (name, ratio) in [
            ("max_control_ratio", self.corruption.max_control_ratio),
            ("max_replacement_ratio", self.corruption.max_replacement_ratio),
        ] {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(Error::InvalidConfig(format!(
                    "{} must be in [0, 1] (got {})",
                    name, ratio
                )));
            }
        }
        Ok(())
    }
}

/// What to do with documents that look corrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CorruptionPolicy {
    /// count and keep
    #[default]
    Lenient,
    /// count and drop the whole document
    Strict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorruptionConfig {
    pub policy: CorruptionPolicy,
    pub max_control_ratio: f64,
    pub max_replacement_ratio: f64,
}

impl Default for CorruptionConfig {
    fn default() -> Self {
        let detector = Corruption::default();
        Self {
            policy: CorruptionPolicy::default(),
            max_control_ratio: detector.max_control_ratio(),
            max_replacement_ratio: detector.max_replacement_ratio(),
        }
    }
}

impl CorruptionConfig {
    pub fn detector(&self) -> Corruption {
        Corruption::with_ratios(self.max_control_ratio, self.max_replacement_ratio)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    pub mode: CleanerMode,
    #[serde(flatten)]
    pub options: CleanOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LemmatizationConfig {
    pub enabled: bool,
    /// analyzer path, or name to look up on `PATH`
    pub analyzer: PathBuf,
    /// see [crate::lemmatizer::parse_flags]
    pub flags: String,
}

impl Default for LemmatizationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            analyzer: PathBuf::from(DEFAULT_ANALYZER),
            flags: "-ld".to_string(),
        }
    }
}

/// Suspicious tokens logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub long_words: bool,
    pub path: PathBuf,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            long_words: false,
            path: PathBuf::from("logs/long_words.log"),
        }
    }
}
