//! File-backed cache for JSON objects
//!
//! Provides a `FileCache` that stores each object as a JSON file named after
//! its (sanitized) identifier, and relies on the filesystem's modification
//! time to decide whether an entry is still fresh.

use chrono::{DateTime, Duration, Utc};
use directories::ProjectDirs;
use std::fs;
use std::io;
use std::path::{Path, PathBuf, MAIN_SEPARATOR_STR};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::debug;

use super::object::{JsonOriginatedObject, JsonSource};

/// Name of the cache directory created under the working directory by default
const DEFAULT_DIR_NAME: &str = "cache";

/// Errors that can occur while saving a cache entry
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache directory is missing and could not be created
    #[error("Failed to create cache directory {}: {source}", .path.display())]
    CacheCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The entry file could not be written
    #[error("Cache entry {} is not writable: {source}", .path.display())]
    CacheNotWritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The object could not be encoded as JSON
    #[error("Failed to encode cache entry: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Stores JSON objects as files in a single flat directory
///
/// Every operation goes straight to the filesystem; nothing is kept in memory
/// between calls. The directory is created lazily by the first `save`.
///
/// There is no locking. Two concurrent `save`s of the same identifier race,
/// and a concurrent `load` may see no file, a partially written file, or
/// either complete version. Callers that share a cache across threads or
/// processes must serialize access themselves.
#[derive(Debug, Clone)]
pub struct FileCache {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl Default for FileCache {
    /// A cache rooted at `<current directory>/cache`
    fn default() -> Self {
        let cache_dir = std::env::current_dir()
            .map(|cwd| cwd.join(DEFAULT_DIR_NAME))
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DIR_NAME));
        Self { cache_dir }
    }
}

impl FileCache {
    /// Creates a cache rooted at `storage_path`, or at `<cwd>/cache` when `None`
    ///
    /// The path is used verbatim and nothing is created on disk yet.
    pub fn new(storage_path: Option<PathBuf>) -> Self {
        match storage_path {
            Some(cache_dir) => Self::with_dir(cache_dir),
            None => Self::default(),
        }
    }

    /// Creates a cache with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Creates a cache in the platform cache directory for an application
    ///
    /// Uses `~/.cache/<name>/` on Linux, or the equivalent on other platforms.
    /// Returns `None` if the directory cannot be determined (e.g., no home directory).
    pub fn for_project(name: &str) -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", name)?;
        Some(Self::with_dir(project_dirs.cache_dir().to_path_buf()))
    }

    /// Directory where cache files are stored
    pub fn root(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path of the cache file for `id`
    ///
    /// Every `.` in the identifier becomes `_`. Identifiers that only differ
    /// in that respect (`v1.2` and `v1_2`) share a single file.
    pub fn cache_path(&self, id: &str) -> PathBuf {
        let mut path = self.cache_dir.clone().into_os_string();
        path.push(MAIN_SEPARATOR_STR);
        path.push(sanitize(id));
        PathBuf::from(path)
    }

    /// Creates the cache directory if it does not exist yet
    ///
    /// Parent directories are not created.
    fn ensure_dir(&self) -> Result<(), CacheError> {
        if self.cache_dir.is_dir() {
            return Ok(());
        }

        match fs::create_dir(&self.cache_dir) {
            Ok(()) => {
                debug!("Created cache directory {}", self.cache_dir.display());
                Ok(())
            }
            // Someone else created it in the meantime
            Err(_) if self.cache_dir.is_dir() => Ok(()),
            Err(source) => Err(CacheError::CacheCreation {
                path: self.cache_dir.clone(),
                source,
            }),
        }
    }

    /// Writes `object` to the cache under `id`, replacing any previous entry
    ///
    /// The previous file is removed first so the new entry always carries a
    /// fresh modification time.
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(CacheError::CacheCreation)` if the cache directory cannot be created
    /// * `Err(CacheError::Encode)` if the object cannot be encoded
    /// * `Err(CacheError::CacheNotWritable)` if the file cannot be written
    pub fn save<T: JsonOriginatedObject>(&self, object: &T, id: &str) -> Result<(), CacheError> {
        self.ensure_dir()?;

        let json = serde_json::to_vec(&object.json())?;
        let path = self.cache_path(id);

        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => debug!("Could not remove previous entry {}: {}", path.display(), e),
        }

        fs::write(&path, json).map_err(|source| CacheError::CacheNotWritable {
            path: path.clone(),
            source,
        })?;

        debug!("Cache created for id {}", id);
        Ok(())
    }

    /// Reads the object cached under `id`
    ///
    /// When `validity` is given, entries older than it are skipped without
    /// being read.
    ///
    /// # Returns
    /// * `Some(T)` if the entry exists, is fresh enough and decodes into a `T`
    /// * `None` if the entry is missing, expired, unreadable, not a JSON object,
    ///   or rejected by `T::from_json`
    pub fn load<T: JsonOriginatedObject>(&self, id: &str, validity: Option<Duration>) -> Option<T> {
        if let Some(validity) = validity {
            if !self.is_cache_valid(id, validity) {
                return None;
            }
        }

        let path = self.cache_path(id);
        let content = match fs::read(&path) {
            Ok(content) => content,
            Err(e) => {
                debug!("No readable cache for id {}: {}", id, e);
                return None;
            }
        };

        let json: JsonSource = match serde_json::from_slice(&content) {
            Ok(json) => json,
            Err(e) => {
                debug!("Cache for id {} is not a JSON object: {}", id, e);
                return None;
            }
        };

        let object = T::from_json(json);
        if object.is_none() {
            debug!("Cache for id {} was rejected on reconstruction", id);
        }
        object
    }

    /// Returns when the entry for `id` was last written
    ///
    /// `None` if the entry does not exist, its metadata cannot be read, or the
    /// timestamp is outside the range `DateTime<Utc>` can represent.
    pub fn modification_date(&self, id: &str) -> Option<DateTime<Utc>> {
        let modified = fs::metadata(self.cache_path(id))
            .and_then(|metadata| metadata.modified())
            .ok()?;
        to_utc(modified)
    }

    /// Whether the entry for `id` exists and is younger than `validity`
    pub fn is_cache_valid(&self, id: &str, validity: Duration) -> bool {
        self.is_cache_valid_at(id, validity, Utc::now())
    }

    fn is_cache_valid_at(&self, id: &str, validity: Duration, now: DateTime<Utc>) -> bool {
        let Some(modified) = self.modification_date(id) else {
            return false;
        };

        let age = now - modified;
        if age < validity {
            debug!("Valid cache for id {} with age {}s", id, age.num_seconds());
            true
        } else {
            debug!("Invalid age {}s for id {}", age.num_seconds(), id);
            false
        }
    }

    /// Removes the entry for `id`
    ///
    /// Fails with the underlying I/O error, including `NotFound` when there is
    /// no such entry.
    pub fn delete(&self, id: &str) -> io::Result<()> {
        fs::remove_file(self.cache_path(id))?;
        debug!("Cache deleted for id {}", id);
        Ok(())
    }

    /// Lists the file names in the cache directory, sorted
    ///
    /// Names are sanitized identifiers; the original identifiers are not
    /// recoverable when they contained `.`.
    pub fn list_cached_files(&self) -> io::Result<Vec<String>> {
        let mut names = fs::read_dir(&self.cache_dir)?
            .map(|entry| entry.map(|entry| entry.file_name().to_string_lossy().into_owned()))
            .collect::<io::Result<Vec<_>>>()?;
        names.sort();
        Ok(names)
    }
}

fn sanitize(id: &str) -> String {
    id.replace('.', "_")
}

/// Pre-epoch and out-of-range times map to `None`.
fn to_utc(time: SystemTime) -> Option<DateTime<Utc>> {
    let since_epoch = time.duration_since(UNIX_EPOCH).ok()?;
    let secs = i64::try_from(since_epoch.as_secs()).ok()?;
    DateTime::<Utc>::from_timestamp(secs, since_epoch.subsec_nanos())
}
