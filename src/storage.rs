//! Pluggable key-value storage for the per-user transaction collection
//! and the signed-in user profile.
//!
//! This module defines the [`KeyValueStore`] (async) and
//! [`BlockingKeyValueStore`] (blocking) traits via a shared macro. Values
//! are JSON documents stored as strings.

#[cfg(feature = "storage-file")]
mod file;
mod memory;

#[cfg(feature = "storage-file")]
pub use file::FileStorage;
pub use memory::InMemoryStorage;

use crate::models::UserId;

/// Storage keys used by the library.
pub mod keys {
    /// Key holding the signed-in user profile.
    pub const USER: &str = "@gofinances:user";

    /// Prefix of the per-user transaction collection key.
    pub const TRANSACTIONS_PREFIX: &str = "@gofinances:transactions_user:";
}

/// Returns the key of the transaction collection owned by `user`.
#[inline]
#[must_use]
pub fn transactions_key(user: &UserId) -> String {
    format!("{}{user}", keys::TRANSACTIONS_PREFIX)
}

/// Generates a storage trait (async or blocking) with all key-value methods.
///
/// Uses `@methods` to define the method list once, and `@method` to render
/// each method in async (`impl Future + Send`) or blocking (`fn`) style.
macro_rules! define_storage {
    // ── Entry points ────────────────────────────────────────────────
    (
        trait_name: $trait_name:ident,
        trait_doc: $trait_doc:expr,
        mode: $mode:ident,
    ) => {
        #[doc = $trait_doc]
        pub trait $trait_name: core::fmt::Debug + Send + Sync {
            define_storage!(@methods $mode);
        }
    };

    // ── Single method list (shared between both variants) ───────────
    (@methods $mode:ident) => {
        define_storage!(@method $mode, get,
            "Returns the value stored under `key`.\n\nReturns `Ok(None)` if the key is absent.\n\n# Errors\n\nReturns an error if the storage backend fails to read.",
            key: &str, -> Result<Option<String>>);
        define_storage!(@method $mode, set,
            "Stores `value` under `key`, replacing any previous value.\n\n# Errors\n\nReturns an error if the storage backend fails to write.",
            key: &str, value: String, -> Result<()>);
        define_storage!(@method $mode, remove,
            "Removes `key`. Removing an absent key is not an error.\n\n# Errors\n\nReturns an error if the storage backend fails to write.",
            key: &str, -> Result<()>);
        define_storage!(@update $mode,
            "Atomically replaces the value under `key` with `apply(current)`.\n\nNo other write to the store can interleave between the read and the\nwrite. If `apply` fails, the store is left untouched.\n\n# Errors\n\nReturns the error from `apply`, or an error if the storage backend\nfails to read or write.");
    };

    // ── Read-modify-write renderers ─────────────────────────────────
    (@update blocking, $doc:expr) => {
        #[doc = $doc]
        fn update<F>(&self, key: &str, apply: F) -> Result<()>
        where
            F: FnOnce(Option<String>) -> Result<String> + Send;
    };

    (@update async_mode, $doc:expr) => {
        #[doc = $doc]
        fn update<F>(&self, key: &str, apply: F)
            -> impl core::future::Future<Output = Result<()>> + Send
        where
            F: FnOnce(Option<String>) -> Result<String> + Send;
    };

    // ── Blocking method renderer ────────────────────────────────────
    (@method blocking, $name:ident, $doc:expr,
     $($param:ident: $param_ty:ty,)* -> $ret:ty) => {
        #[doc = $doc]
        fn $name(&self $(, $param: $param_ty)*) -> $ret;
    };

    // ── Async method renderer (returns impl Future + Send) ──────────
    (@method async_mode, $name:ident, $doc:expr,
     $($param:ident: $param_ty:ty,)* -> $ret:ty) => {
        #[doc = $doc]
        fn $name(&self $(, $param: $param_ty)*)
            -> impl core::future::Future<Output = $ret> + Send;
    };
}

mod async_storage {
    //! Async storage trait definition.

    use crate::error::Result;

    define_storage! {
        trait_name: KeyValueStore,
        trait_doc: "Async key-value store holding JSON documents.\n\nAll methods take `&self`; implementations use interior mutability\n(e.g. `Mutex`) for thread-safe mutation.",
        mode: async_mode,
    }
}

mod blocking_storage {
    //! Blocking storage trait definition.

    use crate::error::Result;

    define_storage! {
        trait_name: BlockingKeyValueStore,
        trait_doc: "Blocking key-value store holding JSON documents.\n\nAll methods take `&self`; implementations use interior mutability\n(e.g. `Mutex`) for thread-safe mutation.",
        mode: blocking,
    }
}

pub use async_storage::KeyValueStore;
pub use blocking_storage::BlockingKeyValueStore;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transactions_key_is_scoped_by_user() {
        let key = transactions_key(&UserId::from("117264829374"));
        assert_eq!(key, "@gofinances:transactions_user:117264829374");
    }

    #[test]
    fn user_key_differs_from_collection_prefix() {
        assert!(!keys::USER.starts_with(keys::TRANSACTIONS_PREFIX));
    }
}
