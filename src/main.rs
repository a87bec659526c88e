//! # Shelob
//!
//! 🕷️ Shelob turns folders of gzipped text shards into a single, clean,
//! one-document-per-line corpus, ready for word embedding training.
//!
//! ## Getting started
//!
//! ```sh
//! shelob 0.1.0
//! shard to corpus cleaning tool.
//!
//! USAGE:
//!     shelob <SUBCOMMAND>
//!
//! FLAGS:
//!     -h, --help       Prints help information
//!     -V, --version    Prints version information
//!
//! SUBCOMMANDS:
//!     check       Count corrupted lines in shards
//!     help        Prints this message or the help of the given subcommand(s)
//!     pipeline    Clean shards into a single corpus file
//! ```
//!
//! Logging is controlled with `RUST_LOG`, and defaults to `info` (progress and summary).
use env_logger::Env;
use shelob::filtering::Corruption;
use shelob::pipelines::{CorpusPipeline, Pipeline};
use shelob::processing::check;
use structopt::StructOpt;

#[macro_use]
extern crate log;

mod cli;

/// Logger reading its filter from `env`, at `info` level if unset.
fn logger(env: Env) -> env_logger::Builder {
    env_logger::Builder::from_env(env.default_filter_or("info"))
}

fn main() -> Result<(), shelob::error::Error> {
    logger(Env::default()).init();

    let opt = cli::Shelob::from_args();
    debug!("cli args\n{:#?}", opt);

    match opt {
        cli::Shelob::Pipeline(p) => {
            let config = p.into_config()?;
            debug!("config\n{:#?}", config);
            CorpusPipeline::new(config).run()?;
        }

        cli::Shelob::Check(c) => {
            let summary = check::check(&c.src, &c.extension, &Corruption::default())?;
            for shard in &summary.shards {
                println!(
                    "{}\t{}\t{}",
                    shard.path.display(),
                    shard.nb_lines,
                    shard.corrupted_lines
                );
            }
            for path in &summary.failed {
                println!("{}\terror\terror", path.display());
            }
            info!(
                "{} corrupted lines out of {} in {}/{} shards, {} unreadable",
                summary.corrupted_lines(),
                summary.nb_lines(),
                summary.corrupted_shards(),
                summary.shards.len(),
                summary.failed.len()
            );
        }
    };
    Ok(())
}
