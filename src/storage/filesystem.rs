//! Filesystem storage implementation
//!
//! Layout under the base directory:
//!
//! - `cache/<sha256 of url>` - one file per cached payload, replaced on rewrite
//! - `redirects.csv` - `from_url,to_url` rows, append-only
//! - `errors.csv` - one failing URL per row, append-only
//!
//! The two CSV files are read into memory on first use and kept for the
//! lifetime of the backend.

use crate::storage::traits::{Backend, StorageError, StorageResult};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

const CACHE_DIR: &str = "cache";
const REDIRECTS_FILE: &str = "redirects.csv";
const ERRORS_FILE: &str = "errors.csv";

static TMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Filesystem persistence backend
pub struct FilesystemBackend {
    base_path: PathBuf,
    cache_path: PathBuf,
    redirects: Mutex<Option<HashMap<String, String>>>,
    errors: Mutex<Option<HashSet<String>>>,
}

impl FilesystemBackend {
    /// Opens (and creates if needed) a filesystem backend rooted at `base_path`
    ///
    /// # Arguments
    ///
    /// * `base_path` - Directory holding the cache and the CSV files
    ///
    /// # Returns
    ///
    /// * `Ok(FilesystemBackend)` - Directories exist and are ready
    /// * `Err(StorageError)` - Failed to create the directories
    pub fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();
        let cache_path = base_path.join(CACHE_DIR);
        std::fs::create_dir_all(&cache_path)?;

        Ok(Self {
            base_path,
            cache_path,
            redirects: Mutex::new(None),
            errors: Mutex::new(None),
        })
    }

    /// Base directory of this backend
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of the cache file for a key
    pub fn content_path(&self, key: &str) -> PathBuf {
        self.cache_path.join(content_digest(key))
    }

    fn redirects(&self) -> StorageResult<MutexGuard<'_, Option<HashMap<String, String>>>> {
        let mut guard = self
            .redirects
            .lock()
            .map_err(|e| StorageError::Poisoned(e.to_string()))?;

        if guard.is_none() {
            let mut map = HashMap::new();
            for record in read_records(&self.base_path.join(REDIRECTS_FILE))? {
                if let (Some(from), Some(to)) = (record.get(0), record.get(1)) {
                    map.insert(from.to_string(), to.to_string());
                }
            }
            tracing::debug!("Loaded {} redirects from disk", map.len());
            *guard = Some(map);
        }

        Ok(guard)
    }

    fn errors(&self) -> StorageResult<MutexGuard<'_, Option<HashSet<String>>>> {
        let mut guard = self
            .errors
            .lock()
            .map_err(|e| StorageError::Poisoned(e.to_string()))?;

        if guard.is_none() {
            let set: HashSet<String> = read_records(&self.base_path.join(ERRORS_FILE))?
                .iter()
                .filter_map(|record| record.get(0).map(str::to_string))
                .collect();
            tracing::debug!("Loaded {} error URLs from disk", set.len());
            *guard = Some(set);
        }

        Ok(guard)
    }
}

impl Backend for FilesystemBackend {
    // ===== Content Cache =====

    fn save_content(&self, key: &str, bytes: &[u8]) -> StorageResult<()> {
        let path = self.content_path(key);

        // Write under a temporary name so readers never see a partial file;
        // the rename replaces any earlier payload for the key
        let tmp_path = path.with_extension(format!(
            "tmp-{}-{}",
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        std::fs::write(&tmp_path, bytes)?;
        std::fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn load_content(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        match std::fs::read(self.content_path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // ===== Redirect Map =====

    fn add_redirect(&self, from_url: &str, to_url: &str) -> StorageResult<()> {
        if from_url == to_url {
            return Ok(());
        }

        let mut guard = self.redirects()?;
        let map = guard.get_or_insert_with(HashMap::new);
        if map.get(from_url).map(String::as_str) == Some(to_url) {
            return Ok(());
        }

        append_record(&self.base_path.join(REDIRECTS_FILE), &[from_url, to_url])?;
        map.insert(from_url.to_string(), to_url.to_string());
        Ok(())
    }

    fn get_redirect(&self, url: &str) -> StorageResult<String> {
        let guard = self.redirects()?;
        let target = guard
            .as_ref()
            .and_then(|map| map.get(url))
            .cloned()
            .unwrap_or_else(|| url.to_string());
        Ok(target)
    }

    // ===== Error Set =====

    fn add_error(&self, url: &str) -> StorageResult<()> {
        let mut guard = self.errors()?;
        let set = guard.get_or_insert_with(HashSet::new);
        if set.contains(url) {
            return Ok(());
        }

        append_record(&self.base_path.join(ERRORS_FILE), &[url])?;
        set.insert(url.to_string());
        Ok(())
    }

    fn is_error(&self, url: &str) -> StorageResult<bool> {
        let guard = self.errors()?;
        Ok(guard.as_ref().map_or(false, |set| set.contains(url)))
    }
}

/// Hex SHA-256 digest of a key, used as its cache file name
pub fn content_digest(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Reads all rows of a headerless CSV file; a missing file has no rows
fn read_records(path: &Path) -> StorageResult<Vec<csv::StringRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut records = Vec::new();
    for result in reader.records() {
        match result {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!("Skipping unreadable row in {}: {}", path.display(), e),
        }
    }

    Ok(records)
}

/// Appends a single row to a headerless CSV file
fn append_record(path: &Path, fields: &[&str]) -> StorageResult<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.write_record(fields)?;
    writer.flush()?;
    Ok(())
}
