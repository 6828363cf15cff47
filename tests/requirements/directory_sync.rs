//! `fsync_directory` as a standalone primitive.

use std::io::Write;

use posixfs::{fsync_directory, FsOp};

use crate::helpers::TestRoot;

#[test]
fn syncing_a_directory_with_unsynced_file_keeps_contents() {
    let root = TestRoot::new();
    let p = root.join("file.txt");
    {
        let mut f = std::fs::File::create(&p).unwrap();
        f.write_all(b"oi").unwrap();
        f.flush().unwrap();
    }
    fsync_directory(root.path()).unwrap();
    assert_eq!(std::fs::read(&p).unwrap(), b"oi");
    assert_eq!(root.entries(), vec!["file.txt".to_string()]);
}

#[test]
fn concurrent_directory_syncs() {
    let root = TestRoot::new();
    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| fsync_directory(root.path()).unwrap());
        }
    });
}

#[test]
fn missing_directory_reports_open_failure() {
    let root = TestRoot::new();
    let err = fsync_directory(root.join("absent")).unwrap_err();
    assert_eq!(err.op(), Some(FsOp::OpenDir));
    assert!(!err.is_unsupported());
    assert!(err.to_string().contains("absent"));
}
