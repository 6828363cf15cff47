//! Every abnormal exit removes the staging file and leaves the target as it was.

use std::io::{self, Write};

use posixfs::{
    with_atomic_text_writer, with_atomic_writer, AtomicWriter, Error, FsOp, InjectedFault,
    WriteOptions, WriterState,
};

use crate::helpers::{TestEmitter, TestRoot};

fn produce_tail() -> io::Result<Vec<u8>> {
    Err(io::Error::new(io::ErrorKind::InvalidData, "producer failed"))
}

fn failing_session(target: &std::path::Path) -> io::Result<()> {
    let mut w = AtomicWriter::create(target, WriteOptions::default())?;
    w.write_all(b"half of the new ")?;
    // The writer is dropped while this error propagates.
    let tail = produce_tail()?;
    w.write_all(&tail)?;
    w.commit()?;
    Ok(())
}

#[test]
fn error_propagating_through_question_mark_aborts() {
    let root = TestRoot::new();
    let target = root.join("conf");
    std::fs::write(&target, b"old").unwrap();

    let err = failing_session(&target).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    assert_eq!(err.to_string(), "producer failed");
    assert_eq!(std::fs::read(&target).unwrap(), b"old");
    assert!(root.leftovers().is_empty());
}

#[test]
fn closure_error_mid_write_aborts() {
    let root = TestRoot::new();
    let target = root.join("conf");
    let facts = TestEmitter::default();
    let opts = WriteOptions::default().with_facts(facts.arc());

    let res: io::Result<()> = with_atomic_writer(&target, opts, |w| {
        w.write_all(b"partial")?;
        Err(io::Error::other("boom"))
    });
    assert_eq!(res.unwrap_err().to_string(), "boom");
    assert!(!target.exists());
    assert!(root.entries().is_empty());
    assert_eq!(facts.count("rename"), 0);
    assert_eq!(facts.count("abort"), 1);
}

#[test]
fn text_closure_error_aborts() {
    let root = TestRoot::new();
    let target = root.join("notes.txt");
    std::fs::write(&target, "keep me").unwrap();
    let res: Result<(), Error> = with_atomic_text_writer(&target, WriteOptions::default(), |w| {
        w.write_text("replace")?;
        Err(Error::Unencodable {
            encoding: posixfs::Encoding::Latin1,
            character: '\u{2603}',
        })
    });
    assert!(matches!(res, Err(Error::Unencodable { character: '\u{2603}', .. })));
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "keep me");
    assert!(root.leftovers().is_empty());
}

#[test]
fn injected_rename_failure_leaves_target_untouched() {
    let root = TestRoot::new();
    let target = root.join("conf");
    std::fs::write(&target, b"old").unwrap();
    let opts = WriteOptions::durable_preset().with_injected_fault(InjectedFault::Rename);

    let mut w = AtomicWriter::create(&target, opts).unwrap();
    w.write_chunk(b"new").unwrap();
    let err = w.commit().unwrap_err();
    assert_eq!(err.op(), Some(FsOp::Rename));
    assert!(err.cleanup_error().is_none());
    assert!(!err.is_committed());
    assert_eq!(std::fs::read(&target).unwrap(), b"old");
    assert!(root.leftovers().is_empty());
}

#[test]
fn injected_file_sync_failure_aborts() {
    let root = TestRoot::new();
    let target = root.join("conf");
    let facts = TestEmitter::default();
    let opts = WriteOptions::durable_preset()
        .with_facts(facts.arc())
        .with_injected_fault(InjectedFault::FileSync);

    let err = posixfs::atomic_write_with(&target, b"never visible", opts).unwrap_err();
    assert_eq!(err.op(), Some(FsOp::SyncFile));
    assert!(!target.exists());
    assert!(root.entries().is_empty());
    assert_eq!(facts.events(), vec!["temp.create", "file.sync", "abort"]);
}

#[test]
fn dropped_writer_without_commit_aborts() {
    let root = TestRoot::new();
    let target = root.join("conf");
    {
        let mut w = AtomicWriter::create(&target, WriteOptions::default()).unwrap();
        w.write_chunk(b"forgotten").unwrap();
        assert_eq!(w.state(), WriterState::Writing);
        assert_eq!(root.leftovers().len(), 1);
    }
    assert!(!target.exists());
    assert!(root.entries().is_empty());
}

#[test]
fn staging_file_vanishing_is_reported_on_rename() {
    let root = TestRoot::new();
    let target = root.join("conf");
    std::fs::write(&target, b"old").unwrap();
    let mut w = AtomicWriter::create(&target, WriteOptions::default()).unwrap();
    w.write_chunk(b"new").unwrap();
    std::fs::remove_file(w.temp_path().unwrap()).unwrap();

    let err = w.commit().unwrap_err();
    assert_eq!(err.op(), Some(FsOp::Rename));
    match &err {
        Error::FileSystem { source, .. } => assert_eq!(source.kind(), io::ErrorKind::NotFound),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(std::fs::read(&target).unwrap(), b"old");
}

/// Replace the staging file with a non-empty directory so unlinking it fails.
fn pin_staging_name(w: &AtomicWriter) {
    let tmp = w.temp_path().unwrap().to_path_buf();
    std::fs::remove_file(&tmp).unwrap();
    std::fs::create_dir(&tmp).unwrap();
    std::fs::write(tmp.join("pin"), b"").unwrap();
}

#[test]
fn failed_cleanup_never_masks_the_commit_error() {
    let root = TestRoot::new();
    let target = root.join("conf");
    std::fs::write(&target, b"old").unwrap();
    let facts = TestEmitter::default();
    let opts = WriteOptions::default()
        .with_facts(facts.arc())
        .with_injected_fault(InjectedFault::Rename);

    let mut w = AtomicWriter::create(&target, opts).unwrap();
    w.write_chunk(b"new").unwrap();
    pin_staging_name(&w);

    let err = w.commit().unwrap_err();
    assert_eq!(err.op(), Some(FsOp::Rename));
    let cleanup = err.cleanup_error().expect("removal failure attached");
    assert_ne!(cleanup.kind(), io::ErrorKind::NotFound);
    assert_eq!(std::fs::read(&target).unwrap(), b"old");
    assert_eq!(facts.decision_of("abort").as_deref(), Some("warn"));
    assert_eq!(
        facts.field_of("abort", "from_state"),
        Some(serde_json::json!("renaming"))
    );
}

#[test]
fn failed_cleanup_on_explicit_abort_is_a_remove_error() {
    let root = TestRoot::new();
    let target = root.join("conf");
    let mut w = AtomicWriter::create(&target, WriteOptions::default()).unwrap();
    w.write_chunk(b"abandoned").unwrap();
    pin_staging_name(&w);

    let err = w.abort().unwrap_err();
    assert_eq!(err.op(), Some(FsOp::Remove));
    assert!(!target.exists());
}

#[test]
fn abort_fact_records_where_the_writer_stopped() {
    let root = TestRoot::new();
    let target = root.join("conf");
    let facts = TestEmitter::default();
    let opts = WriteOptions::default().with_facts(facts.arc());
    let w = AtomicWriter::create(&target, opts).unwrap();
    assert!(!w.state().is_terminal());
    w.abort().unwrap();
    assert_eq!(facts.field_of("abort", "from_state"), Some(serde_json::json!("open")));
    assert_eq!(facts.decision_of("abort").as_deref(), Some("success"));
}
