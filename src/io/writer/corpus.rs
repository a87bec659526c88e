//! Single-consumer corpus writer.
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use log::{debug, error, info, warn};

use crate::error::Error;

/// Live run counters.
///
/// Only ever incremented, so that any snapshot is monotonic
/// with respect to the previous ones.
#[derive(Debug)]
pub struct RunStats {
    lines: AtomicU64,
    bytes: AtomicU64,
    corrupted: AtomicU64,
    corrupted_lines: AtomicU64,
    files: AtomicU64,
    failed: AtomicU64,
    start: Instant,
}

impl Default for RunStats {
    fn default() -> Self {
        Self {
            lines: AtomicU64::new(0),
            bytes: AtomicU64::new(0),
            corrupted: AtomicU64::new(0),
            corrupted_lines: AtomicU64::new(0),
            files: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            start: Instant::now(),
        }
    }
}

impl RunStats {
    /// account for `nb_lines` lines of `nb_bytes` bytes (newlines included)
    fn add_lines(&self, nb_lines: u64, nb_bytes: u64) {
        // bytes first: a concurrent snapshot then never sees lines > bytes.
        self.bytes.fetch_add(nb_bytes, Ordering::SeqCst);
        self.lines.fetch_add(nb_lines, Ordering::SeqCst);
    }

    pub fn add_corrupted_file(&self) {
        self.corrupted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_corrupted_lines(&self, nb: u64) {
        self.corrupted_lines.fetch_add(nb, Ordering::Relaxed);
    }

    pub fn add_files(&self, nb: u64) {
        self.files.fetch_add(nb, Ordering::Relaxed);
    }

    pub fn add_failed_file(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Non-blocking snapshot.
    pub fn snapshot(&self) -> Stats {
        let lines = self.lines.load(Ordering::SeqCst);
        let bytes = self.bytes.load(Ordering::SeqCst);
        Stats {
            lines,
            bytes,
            corrupted: self.corrupted.load(Ordering::Relaxed),
            corrupted_lines: self.corrupted_lines.load(Ordering::Relaxed),
            files: self.files.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            elapsed: self.start.elapsed(),
        }
    }
}

/// Point-in-time copy of [RunStats].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub lines: u64,
    pub bytes: u64,
    /// number of corrupted files
    pub corrupted: u64,
    pub corrupted_lines: u64,
    /// number of files processed by workers (errors included)
    pub files: u64,
    /// number of files that could not be read
    pub failed: u64,
    pub elapsed: Duration,
}

impl Stats {
    pub fn megabytes(&self) -> f64 {
        self.bytes as f64 / 1024.0 / 1024.0
    }

    /// Written KiB per second.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.bytes as f64 / 1024.0 / secs
        } else {
            0.0
        }
    }
}

/// Buffered corpus writer.
///
/// Writes one document per line, skipping empty documents.
/// It is meant to be the only owner of the output stream.
///
/// Lines are buffered whole and only accounted for once they reach the
/// inner stream. If the inner stream fails in the middle of a line, the
/// fragment is terminated by a newline so that it never merges with the next
/// document.
pub struct CorpusWriter<W: Write> {
    inner: W,
    buf: Vec<u8>,
    capacity: usize,
    stats: Arc<RunStats>,
}

impl CorpusWriter<File> {
    /// Create the output file (truncating it unless `append` is set).
    pub fn create(
        dst: &Path,
        buffer_size: usize,
        append: bool,
        stats: Arc<RunStats>,
    ) -> Result<Self, Error> {
        let mut options = OpenOptions::new();
        options.create(true);
        if append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }

        info!("creating {:?} (append: {})", dst, append);
        let file = options.open(dst)?;
        Ok(Self::new(file, buffer_size, stats))
    }
}

impl<W: Write> CorpusWriter<W> {
    pub fn new(inner: W, buffer_size: usize, stats: Arc<RunStats>) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(buffer_size),
            capacity: buffer_size,
            stats,
        }
    }

    /// Buffer a single document followed by a newline.
    ///
    /// Returns `false` (and writes nothing) for empty documents.
    /// Errors come from handing the buffer to the inner stream: the lines
    /// that were not fully written are dropped.
    pub fn write_document(&mut self, document: &str) -> Result<bool, Error> {
        if document.is_empty() {
            return Ok(false);
        }

        self.buf.extend_from_slice(document.as_bytes());
        self.buf.push(b'\n');
        if self.buf.len() >= self.capacity {
            self.write_buf()?;
        }
        Ok(true)
    }

    /// Write pending lines and flush the inner stream.
    pub fn flush(&mut self) -> Result<(), Error> {
        self.write_buf()?;
        self.inner.flush()?;
        Ok(())
    }

    /// Hand the buffer to the inner stream, accounting for complete lines.
    fn write_buf(&mut self) -> Result<(), Error> {
        let mut written = 0;
        let res = loop {
            if written == self.buf.len() {
                break Ok(());
            }
            match self.inner.write(&self.buf[written..]) {
                Ok(0) => break Err(std::io::Error::from(ErrorKind::WriteZero)),
                Ok(n) => written += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => break Err(e),
            }
        };

        let complete = self.buf[..written]
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |pos| pos + 1);
        let nb_lines = self.buf[..complete].iter().filter(|&&b| b == b'\n').count();
        self.stats.add_lines(nb_lines as u64, complete as u64);

        if written > complete {
            let fragment = written - complete;
            match self.inner.write_all(b"\n") {
                Ok(()) => {
                    warn!("terminated a {} bytes partial line", fragment);
                    self.stats.add_lines(1, fragment as u64 + 1);
                }
                Err(e) => error!("could not terminate a partial line: {:?}", e),
            }
        }

        if let Err(e) = &res {
            let lost = self.buf[written..].iter().filter(|&&b| b == b'\n').count();
            error!("{} buffered lines dropped: {:?}", lost, e);
        }
        self.buf.clear();
        res.map_err(Error::Io)
    }

    /// Consume documents until every sender is gone, then flush.
    ///
    /// Failed writes are logged and the concerned documents are dropped.
    /// Returns the inner stream.
    pub fn run(mut self, documents: Receiver<String>) -> Result<W, Error> {
        for document in documents.iter() {
            if let Err(e) = self.write_document(&document) {
                error!("could not write document ({} bytes): {:?}", document.len(), e);
            }
        }

        debug!("document queue closed, flushing");
        self.flush()?;
        Ok(self.inner)
    }
}
