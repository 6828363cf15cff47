//! Writers racing on one target: last rename wins, never a blend.

use std::io::Write;
use std::sync::Barrier;

use posixfs::{atomic_write_bytes, open_atomic_writer};

use crate::helpers::TestRoot;

#[test]
fn racing_one_shot_writers_leave_one_full_payload() {
    let root = TestRoot::new();
    let target = root.join("race.bin");
    let x = vec![b'x'; 100_000];
    let y = vec![b'y'; 70_000];

    for durable in [false, true] {
        for _ in 0..20 {
            let barrier = Barrier::new(2);
            std::thread::scope(|s| {
                s.spawn(|| {
                    barrier.wait();
                    atomic_write_bytes(&target, &x, durable).unwrap();
                });
                s.spawn(|| {
                    barrier.wait();
                    atomic_write_bytes(&target, &y, durable).unwrap();
                });
            });
            let got = std::fs::read(&target).unwrap();
            assert!(got == x || got == y, "mixed payload of {} bytes", got.len());
        }
    }
    assert_eq!(root.entries(), vec!["race.bin".to_string()]);
}

#[test]
fn interleaved_scoped_writers_use_separate_staging_files() {
    let root = TestRoot::new();
    let target = root.join("shared");

    let mut first = open_atomic_writer(&target, false).unwrap();
    let mut second = open_atomic_writer(&target, false).unwrap();
    assert_ne!(first.temp_path(), second.temp_path());

    first.write_all(b"first-").unwrap();
    second.write_all(b"second-").unwrap();
    first.write_all(b"payload").unwrap();
    second.write_all(b"payload").unwrap();
    assert_eq!(root.leftovers().len(), 2);

    first.commit().unwrap();
    assert_eq!(std::fs::read(&target).unwrap(), b"first-payload");
    second.commit().unwrap();
    assert_eq!(std::fs::read(&target).unwrap(), b"second-payload");
    assert!(root.leftovers().is_empty());
}

#[test]
fn racing_with_an_empty_payload() {
    let root = TestRoot::new();
    let target = root.join("maybe-empty");
    let full = vec![7u8; 4096];
    for _ in 0..20 {
        std::thread::scope(|s| {
            s.spawn(|| atomic_write_bytes(&target, b"", false).unwrap());
            s.spawn(|| atomic_write_bytes(&target, &full, false).unwrap());
        });
        let got = std::fs::read(&target).unwrap();
        assert!(got.is_empty() || got == full);
    }
}
