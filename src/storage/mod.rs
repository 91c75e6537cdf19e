//! Line-oriented file persistence
//!
//! Everything the gleaner persists is plain UTF-8 text, one record per
//! line: URL sets (sorted, deduplicated), the integer resume cursor, and
//! the per-segment crawl logs. Sets are loaded once at run start and
//! rewritten atomically (write-then-rename) at run end; segment logs are
//! append-only and survive a crash mid-run.

mod cursor;
mod logs;
mod sets;

pub use logs::SaleUrlCache;

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Required input file missing: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Malformed cursor file {}: {content:?}", .path.display())]
    MalformedCursor { path: PathBuf, content: String },

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

// Well-known file names under the data directory.
pub const ACTIVE_FILE: &str = "active.txt";
pub const IGNORE_FILE: &str = "ignore.txt";
pub const PROFILES_FILE: &str = "profiles.txt";
pub const COLLECTIONS_FILE: &str = "collections.txt";
pub const OWNED_FILE: &str = "owned.txt";
pub const CURSOR_FILE: &str = "resume_index.txt";
pub const MISS_LOG: &str = "itch-miss.txt";
pub const FUTURE_LOG: &str = "itch-future.txt";
pub const SALES_LOG: &str = "itch-sales.txt";
pub const SALE_URL_CACHE: &str = "sales-url.txt";

/// Handle to the data directory all persisted files live under.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Absolute path of a top-level file in the data directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    /// Directory holding one crawl segment's logs and URL cache.
    pub fn segment_dir(&self, base: u64) -> PathBuf {
        self.data_dir.join("segments").join(base.to_string())
    }

    pub(crate) fn io_err(path: &Path, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
