//! Resume cursor persistence
//!
//! The cursor is the next unscanned sale id, a single non-negative integer
//! in `resume_index.txt`. It only ever moves forward; a missing file means
//! no prior run, and scanning starts at id 1 (id 0 is not a valid sale).

use super::{FileStore, StorageError, StorageResult, CURSOR_FILE};
use std::fs;
use std::io::ErrorKind;

/// First valid sale id.
pub const CURSOR_START: u64 = 1;

impl FileStore {
    /// Reads the resume cursor, defaulting to the start of the id space.
    pub fn load_cursor(&self) -> StorageResult<u64> {
        let path = self.path(CURSOR_FILE);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(CURSOR_START),
            Err(e) => return Err(Self::io_err(&path, e)),
        };

        content
            .trim()
            .parse()
            .map(|pos: u64| pos.max(CURSOR_START))
            .map_err(|_| StorageError::MalformedCursor {
                path,
                content: content.trim().to_string(),
            })
    }

    /// Persists the advanced cursor.
    pub fn save_cursor(&self, pos: u64) -> StorageResult<()> {
        fs::create_dir_all(self.data_dir()).map_err(|e| Self::io_err(self.data_dir(), e))?;
        let path = self.path(CURSOR_FILE);
        fs::write(&path, format!("{}\n", pos)).map_err(|e| Self::io_err(&path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_cursor_starts_at_one() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.load_cursor().unwrap(), 1);
    }

    #[test]
    fn test_cursor_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        store.save_cursor(123456).unwrap();
        assert_eq!(store.load_cursor().unwrap(), 123456);
    }

    #[test]
    fn test_zero_cursor_is_clamped_to_start() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        std::fs::write(store.path(CURSOR_FILE), "0\n").unwrap();
        assert_eq!(store.load_cursor().unwrap(), 1);
    }

    #[test]
    fn test_malformed_cursor_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        std::fs::write(store.path(CURSOR_FILE), "not-a-number\n").unwrap();
        assert!(matches!(
            store.load_cursor(),
            Err(StorageError::MalformedCursor { .. })
        ));
    }
}
