//! Shards to corpus pipeline.
//!
//! Turns a folder of gzipped shards into a single text file, one cleaned document per shard,
//! one document per line.
//!
//! # Processing
//! 1. Shards are listed (and sorted) from the source folder.
//! 1. A feeder thread pushes their paths in a bounded queue.
//! 1. Workers pull paths, read, check and clean each line, optionally lemmatize, then push
//!    the resulting documents in another bounded queue.
//! 1. A single writer thread owns the output file and writes documents as they come.
//! 1. Workers send processed file counts to a progress thread, that also logs progress on a timer.
//!
//! Document order in the corpus is not specified.
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, select, tick, Receiver, Sender};
use log::{debug, error, info, warn};

use crate::cleaner::{Cleaner, TextCleaner};
use crate::config::{Config, CorruptionPolicy};
use crate::error::Error;
use crate::filtering::Filter;
use crate::io::reader::list_shards;
use crate::io::writer::{CorpusWriter, RunStats, Stats};
use crate::io::TokenLog;
use crate::lemmatizer::{self, Lemmatizer};
use crate::pipelines::pipeline::Pipeline;
use crate::processing::FileProcessor;

/// Delay between two progress lines.
const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Listing,
    Running,
    Draining,
    Done,
    Failed,
}

pub struct CorpusPipeline {
    config: Config,
}

impl CorpusPipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    fn transition(state: &mut PipelineState, next: PipelineState) {
        debug!("pipeline: {:?} -> {:?}", state, next);
        *state = next;
    }

    /// Build the (shared) file processor from the configuration.
    ///
    /// Fails if the analyzer can't be found when lemmatization is enabled.
    fn build_processor(&self) -> Result<FileProcessor, Error> {
        let token_log = if self.config.logger.long_words {
            let log = TokenLog::open(&self.config.logger.path)?;
            info!("logging long words into {:?}", log.path());
            Some(Arc::new(log))
        } else {
            None
        };

        let mut cleaner = Cleaner::new(
            self.config.cleaner.mode,
            self.config.cleaner.options.clone(),
        )?;
        if let Some(log) = &token_log {
            cleaner = cleaner.with_long_words_log(log.clone());
        }
        info!("cleaning mode: {}", cleaner.mode());
        debug!("cleaning options: {:?}", cleaner.options());
        let cleaner: Arc<dyn TextCleaner> = Arc::new(cleaner);

        let mut processor =
            FileProcessor::new(cleaner).with_detector(self.config.corruption.detector());

        let lemmatization = &self.config.lemmatization;
        if lemmatization.enabled {
            let analyzer = lemmatizer::resolve_analyzer(&lemmatization.analyzer)?;
            let flags = lemmatizer::parse_flags(&lemmatization.flags);

            let mut lem = Lemmatizer::new(analyzer, flags);
            info!("lemmatizing with {:?} {:?}", lem.analyzer(), lem.flags());
            if let Some(log) = token_log {
                lem = lem.with_token_log(log);
            }
            processor = processor.with_lemmatizer(Arc::new(lem));
        }

        Ok(processor)
    }

    fn run_states(&self, state: &mut PipelineState) -> Result<Stats, Error> {
        self.config.validate()?;

        Self::transition(state, PipelineState::Listing);
        let shards = list_shards(&self.config.src, &self.config.extension)?;
        let nb_shards = shards.len();
        info!("found {} shards in {:?}", nb_shards, self.config.src);

        let processor = Arc::new(self.build_processor()?);
        let stats = Arc::new(RunStats::default());
        let writer = CorpusWriter::create(
            &self.config.dst,
            self.config.buffer_size,
            self.config.append,
            stats.clone(),
        )?;

        Self::transition(state, PipelineState::Running);
        let nb_workers = self.config.workers;
        let (path_tx, path_rx) = bounded::<PathBuf>(2 * nb_workers);
        let (doc_tx, doc_rx) = bounded::<String>(2 * nb_workers);
        let (progress_tx, progress_rx) = bounded::<u64>(nb_workers);

        let writer_handle = thread::Builder::new()
            .name("writer".to_string())
            .spawn(move || writer.run(doc_rx))?;

        let progress_stats = stats.clone();
        let progress_handle = thread::Builder::new()
            .name("progress".to_string())
            .spawn(move || report_progress(progress_rx, progress_stats, nb_shards))?;

        let feeder_handle = thread::Builder::new()
            .name("feeder".to_string())
            .spawn(move || {
                for path in shards {
                    if path_tx.send(path).is_err() {
                        error!("no worker left to process shards");
                        break;
                    }
                }
            })?;

        let workers = (0..nb_workers)
            .map(|id| {
                let worker = Worker {
                    id,
                    processor: processor.clone(),
                    stats: stats.clone(),
                    policy: self.config.corruption.policy,
                    report_every: self.config.report_every,
                };
                let paths = path_rx.clone();
                let documents = doc_tx.clone();
                let progress = progress_tx.clone();
                thread::Builder::new()
                    .name(format!("worker-{}", id))
                    .spawn(move || worker.run(paths, documents, progress))
            })
            .collect::<Result<Vec<JoinHandle<()>>, std::io::Error>>()?;

        // workers hold the remaining ends
        drop(path_rx);
        drop(doc_tx);
        drop(progress_tx);

        if feeder_handle.join().is_err() {
            error!("feeder thread panicked");
        }
        for (id, worker) in workers.into_iter().enumerate() {
            if worker.join().is_err() {
                error!("worker {} panicked", id);
            }
        }

        Self::transition(state, PipelineState::Draining);
        let written = match writer_handle.join() {
            Ok(result) => result.map(|_| ()),
            Err(_) => {
                warn!("writer thread panicked, output may be incomplete");
                Ok(())
            }
        };
        if progress_handle.join().is_err() {
            warn!("progress thread panicked");
        }
        written?;

        let summary = stats.snapshot();
        info!(
            "done in {:.2?}: {} lines, {:.2} MB ({:.2} KB/s), {}/{} files ({} failed), {} corrupted ({} lines)",
            summary.elapsed,
            summary.lines,
            summary.megabytes(),
            summary.throughput(),
            summary.files,
            nb_shards,
            summary.failed,
            summary.corrupted,
            summary.corrupted_lines,
        );
        Ok(summary)
    }
}

impl Pipeline<Stats> for CorpusPipeline {
    fn run(&self) -> Result<Stats, Error> {
        let mut state = PipelineState::Idle;
        match self.run_states(&mut state) {
            Ok(stats) => {
                Self::transition(&mut state, PipelineState::Done);
                Ok(stats)
            }
            Err(e) => {
                error!("pipeline failed while {:?}: {:?}", state, e);
                Self::transition(&mut state, PipelineState::Failed);
                Err(e)
            }
        }
    }
}

struct Worker {
    id: usize,
    processor: Arc<FileProcessor>,
    stats: Arc<RunStats>,
    policy: CorruptionPolicy,
    report_every: usize,
}

impl Worker {
    fn run(self, paths: Receiver<PathBuf>, documents: Sender<String>, progress: Sender<u64>) {
        let mut pending = 0;
        for path in paths.iter() {
            if let Some(document) = self.process(&path) {
                if documents.send(document).is_err() {
                    error!("[{}] writer is gone, dropping {:?}", self.id, path);
                }
            }

            pending += 1;
            if pending >= self.report_every {
                if progress.send(pending as u64).is_err() {
                    debug!("[{}] progress thread is gone", self.id);
                }
                pending = 0;
            }
        }

        if pending > 0 && progress.send(pending as u64).is_err() {
            debug!("[{}] progress thread is gone", self.id);
        }
        debug!("[{}] no more shards", self.id);
    }

    /// Returns the document to be written, if any.
    fn process(&self, path: &Path) -> Option<String> {
        let processed = match self.processor.process_file(path) {
            Ok(processed) => processed,
            Err(e) => {
                error!("[{}] {:?}: {:?}", self.id, path, e);
                self.stats.add_failed_file();
                return None;
            }
        };

        let mut corrupted = processed.corrupted_lines > 0;
        if corrupted {
            self.stats
                .add_corrupted_lines(processed.corrupted_lines as u64);
        }

        let keep = match self.policy {
            CorruptionPolicy::Lenient => true,
            CorruptionPolicy::Strict => {
                corrupted = corrupted || self.processor.detector().detect(processed.text.as_str());
                !corrupted
            }
        };

        if corrupted {
            self.stats.add_corrupted_file();
        }

        if !keep {
            warn!(
                "[{}] {:?}: dropped ({} corrupted lines)",
                self.id, path, processed.corrupted_lines
            );
            return None;
        }

        if processed.text.is_empty() {
            None
        } else {
            Some(processed.text)
        }
    }
}

/// Count processed files and log progress until every worker is done.
fn report_progress(progress: Receiver<u64>, stats: Arc<RunStats>, nb_shards: usize) {
    let ticker = tick(PROGRESS_INTERVAL);
    loop {
        select! {
            recv(progress) -> msg => match msg {
                Ok(nb_files) => stats.add_files(nb_files),
                Err(_) => break,
            },
            recv(ticker) -> _ => {
                let s = stats.snapshot();
                info!(
                    "{}/{} files | {} lines | {:.2} MB | {:.2} KB/s | {} corrupted",
                    s.files,
                    nb_shards,
                    s.lines,
                    s.megabytes(),
                    s.throughput(),
                    s.corrupted
                );
            }
        }
    }
}
