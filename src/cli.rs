//! Command line arguments and parameters management/parsing.
use std::path::PathBuf;

use shelob::cleaner::CleanerMode;
use shelob::config::{Config, CorruptionPolicy};
use shelob::error::Error;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "shelob", about = "shard to corpus cleaning tool.")]
/// Holds every command that is callable by the `shelob` command.
pub enum Shelob {
    #[structopt(about = "Clean shards into a single corpus file")]
    Pipeline(Pipeline),
    #[structopt(about = "Count corrupted lines in shards")]
    Check(Check),
}

#[derive(Debug, StructOpt)]
/// Pipeline command and parameters.
///
/// Options that are set override the ones of the configuration file (if any),
/// that override the defaults.
///
/// ```sh
/// shelob pipeline --mode modern --no-roman -w 8 shards/ corpus.txt
/// ```
pub struct Pipeline {
    #[structopt(parse(from_os_str), help = "source (contains n.txt.gz)")]
    pub src: PathBuf,
    #[structopt(parse(from_os_str), help = "corpus file")]
    pub dst: PathBuf,
    #[structopt(long, parse(from_os_str), help = "JSON (or .yaml) configuration file")]
    pub config: Option<PathBuf>,
    #[structopt(
        short = "w",
        long,
        help = "number of workers. Default is the number of available cores."
    )]
    pub workers: Option<usize>,
    #[structopt(long = "buffer-size", help = "writer buffer size (in bytes)")]
    pub buffer_size: Option<usize>,
    #[structopt(
        long = "report-every",
        help = "number of files processed by a worker between two progress updates"
    )]
    pub report_every: Option<usize>,
    #[structopt(short = "m", long, possible_values = &CleanerMode::VARIANTS, help = "cleaning mode")]
    pub mode: Option<String>,
    #[structopt(long = "no-numbers", help = "remove digits")]
    pub no_numbers: bool,
    #[structopt(long = "no-roman", help = "remove roman numerals")]
    pub no_roman: bool,
    #[structopt(long = "replace-yo", help = "replace ё by е")]
    pub replace_yo: bool,
    #[structopt(long = "preserve-dates")]
    pub preserve_dates: bool,
    #[structopt(long = "preserve-fractions")]
    pub preserve_fractions: bool,
    #[structopt(long = "preserve-decimals")]
    pub preserve_decimals: bool,
    #[structopt(long = "keep-urls", help = "do not remove urls and emails")]
    pub keep_urls: bool,
    #[structopt(long, help = "lemmatize documents with an external analyzer")]
    pub lemmatize: bool,
    #[structopt(long, parse(from_os_str), help = "analyzer path or name. Default is mystem.")]
    pub analyzer: Option<PathBuf>,
    #[structopt(
        long = "analyzer-flags",
        allow_hyphen_values = true,
        help = "analyzer flags, such as -ld"
    )]
    pub analyzer_flags: Option<String>,
    #[structopt(
        long = "long-words-log",
        parse(from_os_str),
        help = "log long/dangerous words into this file"
    )]
    pub long_words_log: Option<PathBuf>,
    #[structopt(long, help = "drop documents from corrupted shards")]
    pub strict: bool,
    #[structopt(long, help = "append to the corpus file instead of overwriting it")]
    pub append: bool,
    #[structopt(long, help = "shard extension. Default is gz.")]
    pub extension: Option<String>,
}

impl Pipeline {
    /// Build the run configuration.
    pub fn into_config(self) -> Result<Config, Error> {
        let mut config = match &self.config {
            Some(path) => Config::from_path(path)?,
            None => Config::default(),
        };

        config.src = self.src;
        config.dst = self.dst;

        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(buffer_size) = self.buffer_size {
            config.buffer_size = buffer_size;
        }
        if let Some(report_every) = self.report_every {
            config.report_every = report_every;
        }
        if let Some(extension) = self.extension {
            config.extension = extension;
        }
        config.append |= self.append;
        if self.strict {
            config.corruption.policy = CorruptionPolicy::Strict;
        }

        let cleaner = &mut config.cleaner;
        if let Some(mode) = &self.mode {
            cleaner.mode = mode.parse()?;
        }
        let options = &mut cleaner.options;
        options.keep_numbers &= !self.no_numbers;
        options.keep_roman_numerals &= !self.no_roman;
        options.remove_urls &= !self.keep_urls;
        options.replace_yo |= self.replace_yo;
        options.preserve_dates |= self.preserve_dates;
        options.preserve_fractions |= self.preserve_fractions;
        options.preserve_decimals |= self.preserve_decimals;

        let lemmatization = &mut config.lemmatization;
        lemmatization.enabled |= self.lemmatize;
        if let Some(analyzer) = self.analyzer {
            lemmatization.analyzer = analyzer;
        }
        if let Some(flags) = self.analyzer_flags {
            lemmatization.flags = flags;
        }

        if let Some(path) = self.long_words_log {
            config.logger.long_words = true;
            config.logger.path = path;
        }

        Ok(config)
    }
}

#[derive(Debug, StructOpt)]
/// Check command and parameters.
pub struct Check {
    #[structopt(parse(from_os_str), help = "source (contains n.txt.gz)")]
    pub src: PathBuf,
    #[structopt(long, default_value = "gz", help = "shard extension")]
    pub extension: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline(args: &[&str]) -> Pipeline {
        let args = ["shelob", "pipeline"].iter().chain(args.iter());
        match Shelob::from_iter_safe(args).unwrap() {
            Shelob::Pipeline(p) => p,
            other => panic!("expected pipeline, got {:?}", other),
        }
    }

    #[test]
    fn defaults() {
        let c = pipeline(&["src", "dst.txt"]).into_config().unwrap();
        assert_eq!(c.src, PathBuf::from("src"));
        assert_eq!(c.dst, PathBuf::from("dst.txt"));
        assert_eq!(c.cleaner, Config::default().cleaner);
        assert!(!c.lemmatization.enabled);
    }

    #[test]
    fn overrides() {
        let c = pipeline(&[
            "-w",
            "3",
            "--mode",
            "old_slavonic",
            "--no-roman",
            "--keep-urls",
            "--lemmatize",
            "--analyzer-flags",
            "-lcd",
            "--long-words-log",
            "logs/words.log",
            "--strict",
            "src",
            "dst.txt",
        ])
        .into_config()
        .unwrap();

        assert_eq!(c.workers, 3);
        assert_eq!(c.cleaner.mode, CleanerMode::OldSlavonic);
        assert!(!c.cleaner.options.keep_roman_numerals);
        assert!(c.cleaner.options.keep_numbers);
        assert!(!c.cleaner.options.remove_urls);
        assert!(c.lemmatization.enabled);
        assert_eq!(c.lemmatization.flags, "-lcd");
        assert!(c.logger.long_words);
        assert_eq!(c.logger.path, PathBuf::from("logs/words.log"));
        assert_eq!(c.corruption.policy, CorruptionPolicy::Strict);
    }

    #[test]
    fn over_config_file() {
        let dst = tempfile::tempdir().unwrap();
        let path = dst.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"workers": 5, "report_every": 7, "cleaner": {"mode": "all"}}"#,
        )
        .unwrap();

        let c = pipeline(&["--config", path.to_str().unwrap(), "-w", "2", "src", "dst"])
            .into_config()
            .unwrap();
        assert_eq!(c.workers, 2);
        assert_eq!(c.report_every, 7);
        assert_eq!(c.cleaner.mode, CleanerMode::All);
    }

    #[test]
    fn unknown_mode() {
        let args = ["shelob", "pipeline", "--mode", "klingon", "src", "dst"];
        assert!(Shelob::from_iter_safe(args.iter()).is_err());
    }
}
