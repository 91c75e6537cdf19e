//! URL set persistence
//!
//! One URL per line, unique, order irrelevant on read, sorted on write.
//! Required sets (`active.txt`, `ignore.txt`, `profiles.txt`,
//! `collections.txt`) must exist; a missing file indicates operator
//! misconfiguration and stops the run. The owned cache is optional.

use super::{FileStore, StorageError, StorageResult};
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;

impl FileStore {
    /// Loads a URL set that must exist on disk.
    pub fn load_required_set(&self, name: &str) -> StorageResult<BTreeSet<String>> {
        let path = self.path(name);
        let content = fs::read_to_string(&path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                StorageError::MissingInput(path.clone())
            } else {
                Self::io_err(&path, e)
            }
        })?;
        Ok(parse_lines(&content))
    }

    /// Loads a URL set, treating a missing file as empty.
    pub fn load_optional_set(&self, name: &str) -> StorageResult<BTreeSet<String>> {
        let path = self.path(name);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(parse_lines(&content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeSet::new()),
            Err(e) => Err(Self::io_err(&path, e)),
        }
    }

    /// Rewrites a URL set atomically, sorted and deduplicated.
    ///
    /// The set is written to a sibling temp file first and renamed into
    /// place, so a crash mid-write leaves the previous snapshot intact.
    pub fn save_set(&self, name: &str, set: &BTreeSet<String>) -> StorageResult<()> {
        fs::create_dir_all(self.data_dir()).map_err(|e| Self::io_err(self.data_dir(), e))?;

        let path = self.path(name);
        let tmp = self.path(&format!("{}.tmp", name));

        let mut content = String::new();
        for url in set {
            content.push_str(url);
            content.push('\n');
        }

        fs::write(&tmp, content).map_err(|e| Self::io_err(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| Self::io_err(&path, e))?;
        Ok(())
    }
}

fn parse_lines(content: &str) -> BTreeSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, FileStore) {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_save_writes_sorted_unique_lines() {
        let (_dir, store) = store();
        let set: BTreeSet<String> = [
            "https://z.itch.io/last".to_string(),
            "https://a.itch.io/first".to_string(),
        ]
        .into();

        store.save_set("active.txt", &set).unwrap();

        let content = std::fs::read_to_string(store.path("active.txt")).unwrap();
        assert_eq!(content, "https://a.itch.io/first\nhttps://z.itch.io/last\n");
    }

    #[test]
    fn test_roundtrip_drops_blank_lines() {
        let (_dir, store) = store();
        std::fs::write(
            store.path("ignore.txt"),
            "https://a.itch.io/g\n\n  \nhttps://b.itch.io/g\n",
        )
        .unwrap();

        let set = store.load_required_set("ignore.txt").unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_missing_required_set_is_an_error() {
        let (_dir, store) = store();
        let err = store.load_required_set("ignore.txt").unwrap_err();
        assert!(matches!(err, StorageError::MissingInput(_)));
    }

    #[test]
    fn test_missing_optional_set_is_empty() {
        let (_dir, store) = store();
        let set = store.load_optional_set("owned.txt").unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_save_replaces_previous_snapshot() {
        let (_dir, store) = store();
        let first: BTreeSet<String> = ["https://a.itch.io/one".to_string()].into();
        let second: BTreeSet<String> = ["https://a.itch.io/two".to_string()].into();

        store.save_set("active.txt", &first).unwrap();
        store.save_set("active.txt", &second).unwrap();

        let set = store.load_required_set("active.txt").unwrap();
        assert!(set.contains("https://a.itch.io/two"));
        assert!(!set.contains("https://a.itch.io/one"));
    }
}
