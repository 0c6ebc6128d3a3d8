//! Signed-in user persistence.
//!
//! The identity provider is external; a session only remembers the
//! profile it returned under [`keys::USER`](crate::storage::keys::USER).

use crate::error::Result;
use crate::models::User;

/// Decodes the stored profile; an absent key means nobody is signed in.
fn decode_user(raw: Option<String>) -> Result<Option<User>> {
    raw.map(|json| serde_json::from_str(&json))
        .transpose()
        .map_err(Into::into)
}

/// Generates a session (async or blocking) over a borrowed store.
macro_rules! define_session {
    (
        session_name: $session:ident,
        storage_trait: $storage_trait:ident,
        session_doc: $session_doc:expr,
        $(async_kw: $async_kw:tt,)?
        $(await_kw: $await_ext:tt,)?
    ) => {
        #[doc = $session_doc]
        #[derive(Debug)]
        pub struct $session<'store, S: $storage_trait> {
            /// Store holding the profile.
            storage: &'store S,
        }

        impl<'store, S: $storage_trait> $session<'store, S> {
            /// Creates a session over `storage`.
            #[inline]
            #[must_use]
            pub const fn new(storage: &'store S) -> Self {
                Self { storage }
            }

            /// Returns the signed-in user, or `None` if nobody is signed in.
            ///
            /// # Errors
            ///
            /// Returns an error if the store fails or the stored profile is
            /// not valid JSON.
            pub $($async_kw)? fn current_user(&self) -> Result<Option<User>> {
                let raw = self.storage.get(USER) $( .$await_ext )? ?;
                decode_user(raw)
            }

            /// Persists `user` as the signed-in user, replacing any previous
            /// one.
            ///
            /// # Errors
            ///
            /// Returns an error if the profile cannot be written.
            pub $($async_kw)? fn sign_in(&self, user: &User) -> Result<()> {
                let json = serde_json::to_string(user)?;
                self.storage.set(USER, json) $( .$await_ext )? ?;
                tracing::info!(user = %user.id, "signed in");
                Ok(())
            }

            /// Forgets the signed-in user. Transaction collections are kept.
            ///
            /// # Errors
            ///
            /// Returns an error if the profile cannot be removed.
            pub $($async_kw)? fn sign_out(&self) -> Result<()> {
                self.storage.remove(USER) $( .$await_ext )? ?;
                tracing::info!("signed out");
                Ok(())
            }
        }
    };
}

mod async_session {
    //! Async session.

    use crate::error::Result;
    use crate::models::User;
    use crate::storage::KeyValueStore;
    use crate::storage::keys::USER;

    use super::decode_user;

    define_session! {
        session_name: Session,
        storage_trait: KeyValueStore,
        session_doc: "Async view of the signed-in user stored in a [`KeyValueStore`].",
        async_kw: async,
        await_kw: await,
    }
}

mod blocking_session {
    //! Blocking session.

    use crate::error::Result;
    use crate::models::User;
    use crate::storage::BlockingKeyValueStore;
    use crate::storage::keys::USER;

    use super::decode_user;

    define_session! {
        session_name: SessionBlocking,
        storage_trait: BlockingKeyValueStore,
        session_doc: "Blocking view of the signed-in user stored in a [`BlockingKeyValueStore`].",
    }
}

pub use async_session::Session;
pub use blocking_session::SessionBlocking;
