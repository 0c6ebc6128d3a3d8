//! JSON-file-based storage backend.
//!
//! Stores every key in a single JSON object file under a configurable
//! directory (default: `$XDG_DATA_HOME/gofinances-rs/`).

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use crate::error::{FinanceError, Result};

/// Application name used for the XDG data directory.
const APP_NAME: &str = "gofinances-rs";

/// File holding all key-value pairs.
const STORE_FILE: &str = "store.json";
/// Sentinel file used for cross-process file locking.
const LOCK_FILE: &str = "storage.lock";

/// On-disk representation: key → JSON document string.
type Entries = BTreeMap<String, String>;

/// File-backed key-value store.
///
/// All keys live in one `store.json` object, rewritten atomically
/// (write-to-tmp then rename) on every change.
///
/// # Concurrency
///
/// Thread safety within a single process is provided by an in-process
/// [`Mutex`]. Cross-process safety is achieved via an advisory file lock
/// on `storage.lock` (using [`std::fs::File::lock`] /
/// [`std::fs::File::lock_shared`]).
///
/// Read operations acquire a shared lock (allowing concurrent readers),
/// while write operations acquire an exclusive lock.
///
/// # File layout
///
/// ```text
/// <dir>/
///   storage.lock          (cross-process lock sentinel)
///   store.json
/// ```
#[derive(Debug)]
pub struct FileStorage {
    /// Root directory containing the store.
    dir: PathBuf,
    /// Mutex serializing concurrent in-process access.
    lock: Mutex<()>,
    /// Sentinel file for cross-process advisory locking.
    lock_file: fs::File,
}

impl FileStorage {
    /// Creates a new file storage rooted at the given directory.
    ///
    /// Creates the directory (and parents) if it does not exist. Also
    /// opens (or creates) the `storage.lock` sentinel file used for
    /// cross-process advisory locking.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the lock
    /// file cannot be opened.
    #[inline]
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).map_err(storage_io_error)?;
        let lock_file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(dir.join(LOCK_FILE))
            .map_err(storage_io_error)?;
        tracing::debug!(dir = %dir.display(), "opened file storage");
        Ok(Self {
            dir,
            lock: Mutex::new(()),
            lock_file,
        })
    }

    /// Returns the default XDG-compliant data directory for this application.
    ///
    /// On Linux: `$XDG_DATA_HOME/gofinances-rs/` (typically
    /// `~/.local/share/gofinances-rs/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the platform data directory cannot be determined.
    #[inline]
    pub fn default_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|data_path| data_path.join(APP_NAME))
            .ok_or_else(|| {
                FinanceError::Storage("could not determine platform data directory".into())
            })
    }

    // ── Private helpers ─────────────────────────────────────────────

    /// Returns the full path for a given file name.
    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Acquires an in-process mutex guard and a shared (read) file lock,
    /// executes `op`, then releases the file lock.
    fn with_shared_lock<R, F: FnOnce() -> Result<R>>(&self, op: F) -> Result<R> {
        let _guard: MutexGuard<'_, ()> = self.lock.lock().map_err(|err| lock_poison_error(&err))?;
        self.lock_file.lock_shared().map_err(storage_io_error)?;
        let result = op();
        // Only surface the unlock error when the operation succeeded;
        // otherwise the original error is more useful.
        if let Err(err) = self.lock_file.unlock()
            && result.is_ok()
        {
            return Err(storage_io_error(err));
        }
        result
    }

    /// Acquires an in-process mutex guard and an exclusive (write) file
    /// lock, executes `op`, then releases the file lock.
    fn with_exclusive_lock<R, F: FnOnce() -> Result<R>>(&self, op: F) -> Result<R> {
        let _guard: MutexGuard<'_, ()> = self.lock.lock().map_err(|err| lock_poison_error(&err))?;
        self.lock_file.lock().map_err(storage_io_error)?;
        let result = op();
        if let Err(err) = self.lock_file.unlock()
            && result.is_ok()
        {
            return Err(storage_io_error(err));
        }
        result
    }

    /// Reads and deserializes the store. Returns an empty map if the file
    /// does not exist.
    fn read_entries(&self) -> Result<Entries> {
        let path = self.path(STORE_FILE);
        match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(FinanceError::from),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Entries::new()),
            Err(err) => Err(storage_io_error(err)),
        }
    }

    /// Atomically writes the store (write-to-tmp then rename).
    fn write_entries(&self, entries: &Entries) -> Result<()> {
        let path = self.path(STORE_FILE);
        let tmp_path = self.path(&format!("{STORE_FILE}.tmp"));
        let json = serde_json::to_string_pretty(entries).map_err(FinanceError::from)?;
        fs::write(&tmp_path, json).map_err(storage_io_error)?;
        fs::rename(&tmp_path, &path).map_err(storage_io_error)?;
        Ok(())
    }

    /// Reads one key (with lock).
    fn read_key(&self, key: &str) -> Result<Option<String>> {
        self.with_shared_lock(|| {
            let mut entries = self.read_entries()?;
            Ok(entries.remove(key))
        })
    }

    /// Writes one key (with lock).
    fn write_key(&self, key: &str, value: String) -> Result<()> {
        self.with_exclusive_lock(|| {
            let mut entries = self.read_entries()?;
            let _old = entries.insert(key.to_owned(), value);
            self.write_entries(&entries)
        })
    }

    /// Replaces one key with `apply(current)` under a single exclusive
    /// lock. Nothing is written if `apply` fails.
    fn update_key<F>(&self, key: &str, apply: F) -> Result<()>
    where
        F: FnOnce(Option<String>) -> Result<String>,
    {
        self.with_exclusive_lock(|| {
            let mut entries = self.read_entries()?;
            let value = apply(entries.remove(key))?;
            let _old = entries.insert(key.to_owned(), value);
            self.write_entries(&entries)
        })
    }

    /// Removes one key (with lock). Leaves the file untouched if the key
    /// is absent.
    fn remove_key(&self, key: &str) -> Result<()> {
        self.with_exclusive_lock(|| {
            let mut entries = self.read_entries()?;
            if entries.remove(key).is_none() {
                return Ok(());
            }
            self.write_entries(&entries)
        })
    }
}

// ── Free-standing helpers ───────────────────────────────────────────────

/// Wraps an I/O error into a [`FinanceError::Storage`].
fn storage_io_error(err: std::io::Error) -> FinanceError {
    FinanceError::Storage(Box::new(err))
}

/// Wraps a mutex poison error into a [`FinanceError::Storage`].
fn lock_poison_error<T>(err: &std::sync::PoisonError<T>) -> FinanceError {
    FinanceError::Storage(err.to_string().into())
}

// ── BlockingKeyValueStore implementation ────────────────────────────────

impl super::BlockingKeyValueStore for FileStorage {
    #[inline]
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.read_key(key)
    }

    #[inline]
    fn set(&self, key: &str, value: String) -> Result<()> {
        self.write_key(key, value)
    }

    #[inline]
    fn remove(&self, key: &str) -> Result<()> {
        self.remove_key(key)
    }

    #[inline]
    fn update<F>(&self, key: &str, apply: F) -> Result<()>
    where
        F: FnOnce(Option<String>) -> Result<String> + Send,
    {
        self.update_key(key, apply)
    }
}

// ── KeyValueStore (async) implementation ────────────────────────────────

impl super::KeyValueStore for FileStorage {
    #[inline]
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send {
        core::future::ready(self.read_key(key))
    }

    #[inline]
    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<()>> + Send {
        core::future::ready(self.write_key(key, value))
    }

    #[inline]
    fn remove(&self, key: &str) -> impl Future<Output = Result<()>> + Send {
        core::future::ready(self.remove_key(key))
    }

    #[inline]
    fn update<F>(&self, key: &str, apply: F) -> impl Future<Output = Result<()>> + Send
    where
        F: FnOnce(Option<String>) -> Result<String> + Send,
    {
        core::future::ready(self.update_key(key, apply))
    }
}
