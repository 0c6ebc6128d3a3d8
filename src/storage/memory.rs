//! In-memory storage backend for testing.
//!
//! Provides [`InMemoryStorage`], a thread-safe in-memory implementation of
//! the storage traits. Ideal for unit and integration tests where file I/O
//! is undesirable.

use std::collections::HashMap;
use std::sync::Mutex;

use core::future::{self, Future};

use crate::error::{FinanceError, Result};

/// Thread-safe in-memory key-value store.
///
/// This type implements both [`super::KeyValueStore`] (async) and
/// [`super::BlockingKeyValueStore`] (blocking), providing a zero-setup
/// backend for tests.
///
/// # Example
///
/// ```rust
/// use gofinances_rs::storage::{BlockingKeyValueStore, InMemoryStorage};
///
/// let storage = InMemoryStorage::new();
/// storage.set("greeting", "\"olá\"".to_owned()).unwrap();
/// assert_eq!(storage.get("greeting").unwrap().as_deref(), Some("\"olá\""));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    /// All entries behind a single mutex for thread-safe interior mutability.
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryStorage {
    /// Creates a new empty in-memory storage.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock and applies a closure.
    fn with_lock<R>(&self, f: impl FnOnce(&mut HashMap<String, String>) -> R) -> Result<R> {
        let mut entries = self.entries.lock().map_err(|err| lock_error(&err))?;
        Ok(f(&mut entries))
    }

    /// Reads a value.
    fn read(&self, key: &str) -> Result<Option<String>> {
        self.with_lock(|entries| entries.get(key).cloned())
    }

    /// Writes a value.
    fn write(&self, key: &str, value: String) -> Result<()> {
        self.with_lock(|entries| {
            let _old = entries.insert(key.to_owned(), value);
        })
    }

    /// Replaces a value with `apply(current)` under a single lock.
    fn modify<F>(&self, key: &str, apply: F) -> Result<()>
    where
        F: FnOnce(Option<String>) -> Result<String>,
    {
        self.with_lock(|entries| -> Result<()> {
            let value = apply(entries.get(key).cloned())?;
            let _old = entries.insert(key.to_owned(), value);
            Ok(())
        })?
    }

    /// Deletes a value.
    fn delete(&self, key: &str) -> Result<()> {
        self.with_lock(|entries| {
            let _old = entries.remove(key);
        })
    }
}

/// Wraps a mutex poison error.
fn lock_error<T>(err: &std::sync::PoisonError<T>) -> FinanceError {
    FinanceError::Storage(err.to_string().into())
}

// ── BlockingKeyValueStore implementation ────────────────────────────────

impl super::BlockingKeyValueStore for InMemoryStorage {
    #[inline]
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.read(key)
    }

    #[inline]
    fn set(&self, key: &str, value: String) -> Result<()> {
        self.write(key, value)
    }

    #[inline]
    fn remove(&self, key: &str) -> Result<()> {
        self.delete(key)
    }

    #[inline]
    fn update<F>(&self, key: &str, apply: F) -> Result<()>
    where
        F: FnOnce(Option<String>) -> Result<String> + Send,
    {
        self.modify(key, apply)
    }
}

// ── KeyValueStore (async) implementation ────────────────────────────────

impl super::KeyValueStore for InMemoryStorage {
    #[inline]
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send {
        future::ready(self.read(key))
    }

    #[inline]
    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.write(key, value))
    }

    #[inline]
    fn remove(&self, key: &str) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.delete(key))
    }

    #[inline]
    fn update<F>(&self, key: &str, apply: F) -> impl Future<Output = Result<()>> + Send
    where
        F: FnOnce(Option<String>) -> Result<String> + Send,
    {
        future::ready(self.modify(key, apply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod blocking {
        use super::*;
        use crate::storage::BlockingKeyValueStore;

        #[test]
        fn get_absent_is_none() {
            let storage = InMemoryStorage::new();
            assert!(storage.get("missing").unwrap().is_none());
        }

        #[test]
        fn set_then_get() {
            let storage = InMemoryStorage::new();
            storage.set("k", "[1,2]".to_owned()).unwrap();
            assert_eq!(storage.get("k").unwrap().as_deref(), Some("[1,2]"));
        }

        #[test]
        fn set_replaces() {
            let storage = InMemoryStorage::new();
            storage.set("k", "old".to_owned()).unwrap();
            storage.set("k", "new".to_owned()).unwrap();
            assert_eq!(storage.get("k").unwrap().as_deref(), Some("new"));
        }

        #[test]
        fn remove_deletes_and_tolerates_absent() {
            let storage = InMemoryStorage::new();
            storage.set("k", "v".to_owned()).unwrap();
            storage.remove("k").unwrap();
            assert!(storage.get("k").unwrap().is_none());
            storage.remove("k").unwrap();
        }

        #[test]
        fn concurrent_writes_are_safe() {
            use std::sync::Arc;
            use std::thread;

            let storage = Arc::new(InMemoryStorage::new());
            let handles: Vec<_> = (0..8_usize)
                .map(|thread_idx| {
                    let storage = Arc::clone(&storage);
                    thread::spawn(move || {
                        for item_idx in 0..25_usize {
                            storage
                                .set(&format!("t{thread_idx}-{item_idx}"), "x".to_owned())
                                .unwrap();
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }
            assert!(storage.get("t7-24").unwrap().is_some());
            assert_eq!(storage.entries.lock().unwrap().len(), 200);
        }

        #[test]
        fn update_sees_current_value() {
            let storage = InMemoryStorage::new();
            storage
                .update("k", |current| {
                    assert!(current.is_none());
                    Ok("1".to_owned())
                })
                .unwrap();
            storage
                .update("k", |current| Ok(format!("{}+2", current.unwrap_or_default())))
                .unwrap();
            assert_eq!(storage.get("k").unwrap().as_deref(), Some("1+2"));
        }

        #[test]
        fn failed_update_leaves_value() {
            let storage = InMemoryStorage::new();
            storage.set("k", "old".to_owned()).unwrap();
            let result = storage.update("k", |_current| Err(FinanceError::MissingName));
            assert!(matches!(result, Err(FinanceError::MissingName)));
            assert_eq!(storage.get("k").unwrap().as_deref(), Some("old"));
        }

        #[test]
        fn concurrent_updates_are_not_lost() {
            use std::sync::Arc;
            use std::thread;

            let storage = Arc::new(InMemoryStorage::new());
            let handles: Vec<_> = (0..8_usize)
                .map(|_thread_idx| {
                    let storage = Arc::clone(&storage);
                    thread::spawn(move || {
                        for _item_idx in 0..25_usize {
                            storage
                                .update("counter", |current| {
                                    let count: u32 = current.map_or(0, |raw| raw.parse().unwrap());
                                    Ok((count + 1).to_string())
                                })
                                .unwrap();
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }
            assert_eq!(storage.get("counter").unwrap().as_deref(), Some("200"));
        }
    }

    mod async_tests {
        use super::*;
        use crate::storage::KeyValueStore;

        #[tokio::test]
        async fn set_then_get() {
            let storage = InMemoryStorage::new();
            storage.set("k", "v".to_owned()).await.unwrap();
            assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("v"));
        }

        #[tokio::test]
        async fn remove_key() {
            let storage = InMemoryStorage::new();
            storage.set("k", "v".to_owned()).await.unwrap();
            storage.remove("k").await.unwrap();
            assert!(storage.get("k").await.unwrap().is_none());
        }

        #[tokio::test]
        async fn update_then_get() {
            let storage = InMemoryStorage::new();
            storage
                .update("k", |_current| Ok("[]".to_owned()))
                .await
                .unwrap();
            assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("[]"));
        }
    }
}
