//! Corruption census.
//!
//! Reads every shard of a folder in parallel and counts corrupted lines, without cleaning or writing anything.
use std::path::{Path, PathBuf};

use log::{error, info};
use rayon::prelude::*;

use crate::error::Error;
use crate::filtering::{Corruption, Filter};
use crate::io::reader::{list_shards, Shard};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardReport {
    pub path: PathBuf,
    pub nb_lines: usize,
    pub corrupted_lines: usize,
}

#[derive(Debug, Default)]
pub struct CheckSummary {
    /// Shards that could be read entirely, sorted by path.
    pub shards: Vec<ShardReport>,
    /// Shards that failed (bad gzip, line too long...)
    pub failed: Vec<PathBuf>,
}

impl CheckSummary {
    pub fn nb_lines(&self) -> usize {
        self.shards.iter().map(|s| s.nb_lines).sum()
    }

    pub fn corrupted_lines(&self) -> usize {
        self.shards.iter().map(|s| s.corrupted_lines).sum()
    }

    /// Number of shards with at least one corrupted line.
    pub fn corrupted_shards(&self) -> usize {
        self.shards.iter().filter(|s| s.corrupted_lines > 0).count()
    }
}

/// Count corrupted lines of a single gzipped shard.
pub fn check_shard(path: &Path, detector: &Corruption) -> Result<ShardReport, Error> {
    let mut report = ShardReport {
        path: path.to_path_buf(),
        nb_lines: 0,
        corrupted_lines: 0,
    };

    for line in Shard::from_path_gzip(path)? {
        let line = line?;
        report.nb_lines += 1;
        if detector.detect(line.as_slice()) {
            report.corrupted_lines += 1;
        }
    }

    Ok(report)
}

/// Run [check_shard] on each shard of `src`.
///
/// Fails only if no shard can be found.
pub fn check(src: &Path, extension: &str, detector: &Corruption) -> Result<CheckSummary, Error> {
    let shards = list_shards(src, extension)?;
    info!("checking {} shards", shards.len());

    let results: Vec<Result<ShardReport, (PathBuf, Error)>> = shards
        .into_par_iter()
        .map(|path| check_shard(&path, detector).map_err(|e| (path, e)))
        .collect();

    let mut summary = CheckSummary::default();
    for result in results {
        match result {
            Ok(report) => summary.shards.push(report),
            Err((path, e)) => {
                error!("{:?}: {:?}", path, e);
                summary.failed.push(path);
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::{write::GzEncoder, Compression};

    use super::*;

    fn write_gz(path: &Path, content: &[u8]) {
        let mut enc = GzEncoder::new(std::fs::File::create(path).unwrap(), Compression::fast());
        enc.write_all(content).unwrap();
        enc.finish().unwrap();
    }

    #[test]
    fn census() {
        let dst = tempfile::tempdir().unwrap();
        write_gz(&dst.path().join("0.txt.gz"), b"clean\nal\x00so\n\xff\xfe\n");
        write_gz(&dst.path().join("1.txt.gz"), b"all\ngood\n");
        std::fs::write(dst.path().join("2.txt.gz"), "not gzip").unwrap();

        let summary = check(dst.path(), "gz", &Corruption::default()).unwrap();

        assert_eq!(summary.failed, vec![dst.path().join("2.txt.gz")]);
        assert_eq!(
            summary.shards,
            vec![
                ShardReport {
                    path: dst.path().join("0.txt.gz"),
                    nb_lines: 3,
                    corrupted_lines: 2,
                },
                ShardReport {
                    path: dst.path().join("1.txt.gz"),
                    nb_lines: 2,
                    corrupted_lines: 0,
                },
            ]
        );
        assert_eq!(summary.nb_lines(), 5);
        assert_eq!(summary.corrupted_lines(), 2);
        assert_eq!(summary.corrupted_shards(), 1);
    }

    #[test]
    fn no_shards() {
        let dst = tempfile::tempdir().unwrap();
        assert!(matches!(
            check(dst.path(), "gz", &Corruption::default()),
            Err(Error::NoInputFiles(_))
        ));
    }
}
