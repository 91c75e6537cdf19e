//! Segment logs and the resolved-sale-URL cache
//!
//! The sale crawler works the id space in fixed-size segments. Each
//! segment owns a directory holding its miss/future/mismatch logs
//! (append-only, surviving crashes and spanning runs) and a cache of
//! resolved sale URLs, index-aligned to `id - base` within the segment.

use super::{FileStore, StorageResult, SALE_URL_CACHE};
use std::fs;
use std::io::{ErrorKind, Write};

impl FileStore {
    /// Appends lines to a segment log, creating the segment dir on demand.
    pub fn append_segment_log(&self, base: u64, name: &str, lines: &[String]) -> StorageResult<()> {
        if lines.is_empty() {
            return Ok(());
        }

        let dir = self.segment_dir(base);
        fs::create_dir_all(&dir).map_err(|e| Self::io_err(&dir, e))?;

        let path = dir.join(name);
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| Self::io_err(&path, e))?;

        let mut content = String::new();
        for line in lines {
            content.push_str(line);
            content.push('\n');
        }
        file.write_all(content.as_bytes())
            .map_err(|e| Self::io_err(&path, e))
    }

    /// Reads a segment log; `None` when the segment never produced one.
    pub fn read_segment_log(&self, base: u64, name: &str) -> StorageResult<Option<Vec<String>>> {
        let path = self.segment_dir(base).join(name);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(
                content
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_err(&path, e)),
        }
    }

    /// Lists the bases of all segments on disk, ascending.
    pub fn segment_bases(&self) -> StorageResult<Vec<u64>> {
        let root = self.data_dir().join("segments");
        let entries = match fs::read_dir(&root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Self::io_err(&root, e)),
        };

        let mut bases = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Self::io_err(&root, e))?;
            if let Some(base) = entry.file_name().to_str().and_then(|n| n.parse().ok()) {
                bases.push(base);
            }
        }
        bases.sort_unstable();
        Ok(bases)
    }

    /// Loads the resolved-URL cache for a segment.
    pub fn load_sale_url_cache(&self, base: u64) -> StorageResult<SaleUrlCache> {
        let urls = self
            .read_segment_log(base, SALE_URL_CACHE)?
            .unwrap_or_default();
        Ok(SaleUrlCache { base, urls })
    }

    /// Rewrites the resolved-URL cache for a segment.
    pub fn save_sale_url_cache(&self, cache: &SaleUrlCache) -> StorageResult<()> {
        let dir = self.segment_dir(cache.base);
        fs::create_dir_all(&dir).map_err(|e| Self::io_err(&dir, e))?;

        let path = dir.join(SALE_URL_CACHE);
        let mut content = String::new();
        for url in &cache.urls {
            content.push_str(url);
            content.push('\n');
        }
        fs::write(&path, content).map_err(|e| Self::io_err(&path, e))
    }
}

/// Resolved sale URLs for one segment, index-aligned to the sale id.
///
/// Line `i` is the canonical URL of sale `first + i`, where `first` is
/// the first scannable id of the segment (`max(base, 1)` — sale 0 does
/// not exist). The sale crawler scans ids sequentially, so resolutions
/// are recorded in order and the cache never has holes.
#[derive(Debug, Clone)]
pub struct SaleUrlCache {
    pub base: u64,
    urls: Vec<String>,
}

impl SaleUrlCache {
    pub fn empty(base: u64) -> Self {
        Self {
            base,
            urls: Vec::new(),
        }
    }

    fn first_id(&self) -> u64 {
        self.base.max(1)
    }

    /// Returns the cached resolution for a sale id, if any.
    pub fn get(&self, id: u64) -> Option<&str> {
        let index = id.checked_sub(self.first_id())? as usize;
        self.urls.get(index).map(String::as_str)
    }

    /// Records a resolution. Out-of-order ids are ignored; the crawler
    /// only ever appends the id directly after the cached range.
    pub fn record(&mut self, id: u64, url: String) {
        match id.checked_sub(self.first_id()).map(|i| i as usize) {
            Some(index) if index == self.urls.len() => self.urls.push(url),
            Some(index) if index < self.urls.len() => {}
            _ => tracing::debug!("Discarding out-of-order cache entry for sale {}", id),
        }
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_append_and_read_segment_log() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        store
            .append_segment_log(5000, "itch-miss.txt", &["https://itch.io/s/5001".to_string()])
            .unwrap();
        store
            .append_segment_log(5000, "itch-miss.txt", &["https://a.itch.io/g".to_string()])
            .unwrap();

        let lines = store.read_segment_log(5000, "itch-miss.txt").unwrap().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "https://itch.io/s/5001");
    }

    #[test]
    fn test_missing_segment_log_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.read_segment_log(0, "itch-miss.txt").unwrap().is_none());
    }

    #[test]
    fn test_segment_bases_sorted() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        for base in [10000u64, 0, 5000] {
            store
                .append_segment_log(base, "itch-sales.txt", &["x".to_string()])
                .unwrap();
        }
        assert_eq!(store.segment_bases().unwrap(), vec![0, 5000, 10000]);
    }

    #[test]
    fn test_sale_url_cache_alignment() {
        let mut cache = SaleUrlCache::empty(5000);
        cache.record(5000, "https://itch.io/s/5000/a".to_string());
        cache.record(5001, "https://itch.io/s/5001/b".to_string());

        assert_eq!(cache.get(5000), Some("https://itch.io/s/5000/a"));
        assert_eq!(cache.get(5001), Some("https://itch.io/s/5001/b"));
        assert_eq!(cache.get(5002), None);
        assert_eq!(cache.get(4999), None);
    }

    #[test]
    fn test_sale_url_cache_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        let mut cache = SaleUrlCache::empty(0);
        cache.record(1, "https://itch.io/s/1/one".to_string());
        cache.record(2, "https://itch.io/s/2/two".to_string());
        store.save_sale_url_cache(&cache).unwrap();

        let loaded = store.load_sale_url_cache(0).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get(2), Some("https://itch.io/s/2/two"));
    }
}
