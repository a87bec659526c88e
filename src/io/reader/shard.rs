use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::{Path, PathBuf},
};

use flate2::read::MultiGzDecoder;
use glob::{MatchOptions, Pattern};
use log::{debug, error};

use crate::error::Error;

/// Longest accepted line (10MiB).
pub const MAX_LINE_SIZE: usize = 10 * 1024 * 1024;

/// List shards of `src` ending in `.extension` (case insensitive), sorted.
///
/// Not recursive. Errors with [Error::NoInputFiles] if nothing matches.
pub fn list_shards(src: &Path, extension: &str) -> Result<Vec<PathBuf>, Error> {
    let pattern = format!(
        "{}/*.{}",
        Pattern::escape(&src.to_string_lossy()),
        Pattern::escape(extension.trim_start_matches('.'))
    );
    debug!("listing shards matching {}", pattern);

    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::new()
    };
    let mut paths: Vec<PathBuf> = glob::glob_with(&pattern, options)?
        .filter_map(|path| match path {
            Ok(path) if path.is_file() => Some(path),
            Ok(_) => None,
            Err(e) => {
                error!("could not read {:?}: {:?}", e.path(), e.error());
                None
            }
        })
        .collect();

    if paths.is_empty() {
        return Err(Error::NoInputFiles(src.to_path_buf()));
    }

    paths.sort();
    Ok(paths)
}

/// Shard instance, generic over reader type.
///
/// Iterates over raw lines (without their trailing `\n`/`\r\n`).
/// Lines are kept as bytes: deciding what to do with invalid UTF-8
/// is up to the caller.
///
/// A line longer than the size limit ends the iteration with [Error::LineTooLong].
///
/// Be aware that shards can be multi-member gzip files and need
/// a multi gz decoder (such as [MultiGzDecoder]).
pub struct Shard<T> {
    reader: T,
    path: PathBuf,
    max_line_size: usize,
    nb_lines: usize,
    done: bool,
}

/// Shard reader using [MultiGzDecoder] over a [File].
impl Shard<BufReader<MultiGzDecoder<File>>> {
    /// Open a gzipped shard.
    ///
    /// Note that an invalid gzip header is only detected on the first read.
    pub fn from_path_gzip<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let gzip_file = File::open(&path)?;
        let gzip_stream = MultiGzDecoder::new(gzip_file);
        let bufreader = BufReader::new(gzip_stream);

        Ok(Self::new(bufreader, path.as_ref()))
    }
}

impl<T: BufRead> Shard<T> {
    pub fn new(reader: T, path: &Path) -> Self {
        Self {
            reader,
            path: path.to_path_buf(),
            max_line_size: MAX_LINE_SIZE,
            nb_lines: 0,
            done: false,
        }
    }

    /// Set a custom line size limit (in bytes).
    pub fn with_max_line_size(mut self, max_line_size: usize) -> Self {
        self.max_line_size = max_line_size;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

}

impl<R: BufRead> Iterator for Shard<R> {
    type Item = Result<Vec<u8>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        // read at most one byte past the limit to be able to tell
        // a line that exactly fits from a line that overflows.
        let mut line = Vec::new();
        let limit = self.max_line_size as u64 + 1;
        match (&mut self.reader).take(limit).read_until(b'\n', &mut line) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => {
                self.nb_lines += 1;
                if line.last() == Some(&b'\n') {
                    line.pop();
                    if line.last() == Some(&b'\r') {
                        line.pop();
                    }
                } else if line.len() > self.max_line_size {
                    self.done = true;
                    return Some(Err(Error::LineTooLong {
                        path: self.path.clone(),
                        line: self.nb_lines,
                    }));
                }
                Some(Ok(line))
            }
            Err(e) => {
                self.done = true;
                Some(Err(Error::Io(e)))
            }
        }
    }
}
