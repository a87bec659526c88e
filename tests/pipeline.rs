use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::{write::GzEncoder, Compression};
use shelob::cleaner::CleanerMode;
use shelob::config::Config;
use shelob::error::Error;
use shelob::pipelines::{CorpusPipeline, Pipeline};

fn write_gz(path: &Path, content: &str) {
    let mut enc = GzEncoder::new(File::create(path).unwrap(), Compression::fast());
    enc.write_all(content.as_bytes()).unwrap();
    enc.finish().unwrap();
}

fn config(src: &Path, dst: PathBuf, workers: usize) -> Config {
    Config {
        src: src.to_path_buf(),
        dst,
        workers,
        report_every: 3,
        ..Default::default()
    }
}

/// line -> number of occurrences
fn multiset(path: &Path) -> HashMap<String, usize> {
    let mut lines = HashMap::new();
    for line in std::fs::read_to_string(path).unwrap().lines() {
        *lines.entry(line.to_string()).or_insert(0) += 1;
    }
    lines
}

#[test_log::test]
fn two_valid_one_invalid() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    write_gz(
        &src.path().join("0.txt.gz"),
        "Привет, мир!\nVisit https://example.com today.\n",
    );
    write_gz(&src.path().join("1.txt.gz"), "Hello@World 北京\n\n42 apples\n");
    std::fs::write(src.path().join("2.txt.gz"), "this is not gzip").unwrap();

    let out = dst.path().join("corpus.txt");
    let stats = CorpusPipeline::new(config(src.path(), out.clone(), 2))
        .run()
        .unwrap();

    let lines = multiset(&out);
    assert_eq!(lines.len(), 2);
    assert!(lines.contains_key("привет мир visit today"));
    assert!(lines.contains_key("hello world 42 apples"));

    assert_eq!(stats.lines, 2);
    assert_eq!(stats.files, 3);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.corrupted, 0);
    assert_eq!(stats.bytes, std::fs::metadata(&out).unwrap().len());
    assert!(stats.bytes >= stats.lines);
}

#[test_log::test]
fn same_output_whatever_the_workers() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    for i in 0..40 {
        let content: String = (0..=i % 7)
            .map(|j| format!("Shard {} line {}: Ёжик, ЁЛКА & Co.\n", i, j))
            .collect();
        write_gz(&src.path().join(format!("{}.txt.gz", i)), &content);
    }
    // empty documents are not written
    write_gz(&src.path().join("empty.txt.gz"), "");
    write_gz(&src.path().join("noise.txt.gz"), "!!! ??? ...\n");

    let mut outputs = Vec::new();
    for workers in [1, 4, 64] {
        let out = dst.path().join(format!("corpus_{}.txt", workers));
        let stats = CorpusPipeline::new(config(src.path(), out.clone(), workers))
            .run()
            .unwrap();
        assert_eq!(stats.lines, 40);
        assert_eq!(stats.files, 42);
        assert_eq!(stats.bytes, std::fs::metadata(&out).unwrap().len());
        outputs.push(multiset(&out));
    }

    assert_eq!(outputs[0].len(), 40);
    assert_eq!(outputs[0], outputs[1]);
    assert_eq!(outputs[0], outputs[2]);
}

#[test_log::test]
fn append_and_truncate() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    write_gz(&src.path().join("0.txt.gz"), "one document\n");

    let out = dst.path().join("corpus.txt");
    std::fs::write(&out, "previous run\n").unwrap();

    let mut c = config(src.path(), out.clone(), 1);
    CorpusPipeline::new(c.clone()).run().unwrap();
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "one document\n");

    c.append = true;
    CorpusPipeline::new(c).run().unwrap();
    assert_eq!(
        std::fs::read_to_string(&out).unwrap(),
        "one document\none document\n"
    );
}

#[test_log::test]
fn modes_and_options() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    write_gz(
        &src.path().join("0.txt.GZ"),
        "Глава XIV, 2024-01-05: ЁЖ и ἀλήθεια\n",
    );

    let out = dst.path().join("corpus.txt");
    let mut c = config(src.path(), out.clone(), 2);
    c.cleaner.mode = CleanerMode::Modern;
    c.cleaner.options.keep_roman_numerals = false;
    c.cleaner.options.replace_yo = true;
    c.cleaner.options.preserve_dates = true;

    CorpusPipeline::new(c).run().unwrap();
    assert_eq!(
        std::fs::read_to_string(&out).unwrap(),
        "глава 2024-01-05 еж и\n"
    );
}

#[test_log::test]
fn long_words_log() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    let long = "z".repeat(35);
    write_gz(
        &src.path().join("7.txt.gz"),
        &format!("short words {} only\n", long),
    );

    let out = dst.path().join("corpus.txt");
    let log = dst.path().join("logs").join("long.log");
    let mut c = config(src.path(), out.clone(), 1);
    c.logger.long_words = true;
    c.logger.path = log.clone();

    CorpusPipeline::new(c).run().unwrap();
    assert_eq!(
        std::fs::read_to_string(&out).unwrap(),
        "short words only\n"
    );
    assert_eq!(
        std::fs::read_to_string(&log).unwrap(),
        format!("[LONG] 7.txt.gz: {}\n", long)
    );
}

#[test_log::test]
fn no_input() {
    let src = tempfile::tempdir().unwrap();
    std::fs::write(src.path().join("notes.txt"), "not a shard").unwrap();

    let res = CorpusPipeline::new(config(src.path(), src.path().join("out.txt"), 1)).run();
    assert!(matches!(res, Err(Error::NoInputFiles(_))));
}

#[cfg(unix)]
#[test_log::test]
fn lemmatization() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    write_gz(&src.path().join("0.txt.gz"), "Кошки бегали\n");

    // fake analyzer: echoes each word as `word{word}`
    let analyzer = dst.path().join("analyzer.sh");
    std::fs::write(
        &analyzer,
        "#!/bin/sh\nsed -E 's/([^ ]+)/\\1{\\1|alt}/g'\n",
    )
    .unwrap();
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&analyzer, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    let out = dst.path().join("corpus.txt");
    let mut c = config(src.path(), out.clone(), 1);
    c.lemmatization.enabled = true;
    c.lemmatization.analyzer = analyzer;

    let stats = CorpusPipeline::new(c).run().unwrap();
    assert_eq!(stats.lines, 1);
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "кошки бегали\n");
}
