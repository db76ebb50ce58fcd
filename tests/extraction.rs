//! End-to-end extraction scenarios against real archives on disk.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use fanzip::{ExtractError, ExtractionEngine, ExtractionSummary, ProgressReporter};
use zip::write::SimpleFileOptions;

fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, data) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

/// Archive whose only entry declares a ZIP64 compressed size of `u64::MAX`
fn write_oversized_zip64(path: &Path) {
    let name = b"huge.bin";
    let mut buf = Vec::new();

    buf.extend_from_slice(b"PK\x03\x04");
    for field in [45u16, 0, 0, 0, 0] {
        buf.extend_from_slice(&field.to_le_bytes());
    }
    buf.extend_from_slice(&[0u8; 12]);
    buf.extend_from_slice(&(name.len() as u16).to_le_bytes());
    buf.extend_from_slice(&0u16.to_le_bytes());
    buf.extend_from_slice(name);
    buf.extend_from_slice(b"tiny");

    let cd_offset = buf.len() as u32;
    buf.extend_from_slice(b"PK\x01\x02");
    for field in [45u16, 45, 0, 0, 0, 0] {
        buf.extend_from_slice(&field.to_le_bytes());
    }
    buf.extend_from_slice(&0u32.to_le_bytes());
    buf.extend_from_slice(&u32::MAX.to_le_bytes());
    buf.extend_from_slice(&u32::MAX.to_le_bytes());
    for field in [name.len() as u16, 20, 0, 0, 0] {
        buf.extend_from_slice(&field.to_le_bytes());
    }
    buf.extend_from_slice(&0u32.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes());
    buf.extend_from_slice(name);
    buf.extend_from_slice(&1u16.to_le_bytes());
    buf.extend_from_slice(&16u16.to_le_bytes());
    buf.extend_from_slice(&u64::MAX.to_le_bytes());
    buf.extend_from_slice(&u64::MAX.to_le_bytes());
    let cd_size = buf.len() as u32 - cd_offset;

    buf.extend_from_slice(b"PK\x05\x06");
    for field in [0u16, 0, 1, 1] {
        buf.extend_from_slice(&field.to_le_bytes());
    }
    buf.extend_from_slice(&cd_size.to_le_bytes());
    buf.extend_from_slice(&cd_offset.to_le_bytes());
    buf.extend_from_slice(&0u16.to_le_bytes());

    std::fs::write(path, buf).unwrap();
}

type Reports = Arc<Mutex<Vec<(usize, usize)>>>;

fn engine_with_reports(out: &Path) -> (ExtractionEngine, Reports) {
    let reports: Reports = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&reports);
    let reporter: Arc<dyn ProgressReporter> = Arc::new(move |completed: usize, total: usize| {
        sink.lock().unwrap().push((completed, total));
    });
    (ExtractionEngine::new(out).with_reporter(reporter), reports)
}

fn subdirectories(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.file_type().unwrap().is_dir())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Relative path -> contents for every file below `root`
fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    let mut files = BTreeMap::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                let relative = path.strip_prefix(root).unwrap().to_path_buf();
                files.insert(relative, std::fs::read(&path).unwrap());
            }
        }
    }
    files
}

#[tokio::test]
async fn extracts_each_archive_into_its_own_directory() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let out_root = out.path().join("out");
    write_zip(&src.path().join("a.zip"), &[("x.txt", "from a")]);
    write_zip(&src.path().join("b.zip"), &[("y/z.txt", "from b")]);

    let (engine, reports) = engine_with_reports(&out_root);
    let summary = engine.extract_directory(src.path()).await.unwrap();

    assert_eq!(summary, ExtractionSummary { archives: 2, files: 2 });
    assert_eq!(
        std::fs::read_to_string(out_root.join("a").join("x.txt")).unwrap(),
        "from a"
    );
    assert_eq!(
        std::fs::read_to_string(out_root.join("b").join("y").join("z.txt")).unwrap(),
        "from b"
    );
    assert_eq!(*reports.lock().unwrap(), vec![(1, 2), (2, 2)]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn creates_one_directory_per_archive() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let mut expected = Vec::new();
    for i in 0..25 {
        let name = format!("part{i:03}");
        write_zip(
            &src.path().join(format!("{name}.zip")),
            &[("data.bin", name.as_str()), ("meta/info.txt", "meta")],
        );
        expected.push(name);
    }

    let (engine, reports) = engine_with_reports(out.path());
    engine.extract_directory(src.path()).await.unwrap();

    assert_eq!(subdirectories(out.path()), expected);
    let counts: Vec<usize> = reports.lock().unwrap().iter().map(|r| r.0).collect();
    assert_eq!(counts, (1..=25).collect::<Vec<_>>());
}

#[tokio::test]
async fn empty_source_directory_succeeds_without_reports() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let out_root = out.path().join("out");
    std::fs::write(src.path().join("README.md"), "not an archive").unwrap();

    let (engine, reports) = engine_with_reports(&out_root);
    let summary = engine.extract_directory(src.path()).await.unwrap();

    assert_eq!(summary, ExtractionSummary { archives: 0, files: 0 });
    assert!(out_root.is_dir());
    assert!(subdirectories(&out_root).is_empty());
    assert!(reports.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_source_directory_is_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let out_root = tmp.path().join("out");

    let (engine, reports) = engine_with_reports(&out_root);
    let err = engine
        .extract_directory(&tmp.path().join("does-not-exist"))
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractError::NotFound { .. }));
    assert!(!out_root.exists());
    assert!(reports.lock().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_archive_fails_after_all_others_complete() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    for name in ["a", "b", "d", "e"] {
        write_zip(&src.path().join(format!("{name}.zip")), &[("f.txt", name)]);
    }
    let broken = src.path().join("c.zip");
    std::fs::write(&broken, b"PK\x03\x04 truncated").unwrap();

    let (engine, reports) = engine_with_reports(out.path());
    let err = engine.extract_directory(src.path()).await.unwrap_err();

    match &err {
        ExtractError::Aggregate { failures, total } => {
            assert_eq!(*total, 5);
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].archive, broken);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("c.zip"));
    for name in ["a", "b", "d", "e"] {
        assert_eq!(
            std::fs::read_to_string(out.path().join(name).join("f.txt")).unwrap(),
            name
        );
    }
    assert_eq!(reports.lock().unwrap().last(), Some(&(5, 5)));
}

#[tokio::test]
async fn repeated_extraction_yields_identical_trees() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_zip(
        &src.path().join("shard.zip"),
        &[("a.txt", "alpha"), ("nested/deeper/b.txt", "beta"), ("c.txt", "")],
    );

    let first = out.path().join("first");
    let second = out.path().join("second");
    ExtractionEngine::new(&first)
        .extract_directory(src.path())
        .await
        .unwrap();
    ExtractionEngine::new(&second)
        .extract_directory(src.path())
        .await
        .unwrap();
    // Re-running into a populated root overwrites in place
    ExtractionEngine::new(&first)
        .extract_directory(src.path())
        .await
        .unwrap();

    assert_eq!(snapshot(&first), snapshot(&second));
    assert_eq!(snapshot(&first).len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn oversized_entry_fails_as_data_while_siblings_extract() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let evil = src.path().join("evil.zip");
    write_oversized_zip64(&evil);
    let mut good = Vec::new();
    for i in 0..8 {
        let name = format!("good{i}");
        write_zip(&src.path().join(format!("{name}.zip")), &[("f.txt", name.as_str())]);
        good.push(name);
    }

    let (engine, reports) = engine_with_reports(out.path());
    let err = engine.extract_directory(src.path()).await.unwrap_err();

    let failures = err.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].archive, evil);
    assert!(format!("{:#}", failures[0].source).contains("past the end of the archive"));
    for name in &good {
        assert_eq!(
            std::fs::read_to_string(out.path().join(name).join("f.txt")).unwrap(),
            *name
        );
    }
    assert_eq!(reports.lock().unwrap().last(), Some(&(9, 9)));
}
