// tests/helpers/testroot.rs
// A small helper to provide a per-test unique root with path builders.

use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct TestRoot {
    td: tempfile::TempDir,
}

impl TestRoot {
    pub fn new() -> Self { Self { td: tempfile::TempDir::new().expect("tempdir") } }
    pub fn path(&self) -> &Path { self.td.path() }
    pub fn join<P: AsRef<Path>>(&self, p: P) -> PathBuf { self.path().join(p) }

    /// Names of every entry in the root, sorted.
    pub fn entries(&self) -> Vec<String> {
        let mut v: Vec<String> = std::fs::read_dir(self.path())
            .expect("read_dir")
            .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        v.sort();
        v
    }

    /// Staging files still on disk.
    pub fn leftovers(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|n| n.ends_with(posixfs::constants::TMP_SUFFIX))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn testroot_unique() {
        let a = TestRoot::new();
        let b = TestRoot::new();
        assert_ne!(a.path(), b.path());
        std::fs::write(a.join("app"), b"x").unwrap();
        assert_eq!(a.entries(), vec!["app".to_string()]);
        assert!(b.entries().is_empty());
        assert!(a.leftovers().is_empty());
    }
}
