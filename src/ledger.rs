//! Per-user ledger with integrated storage.
//!
//! Combines a [`KeyValueStore`] / [`BlockingKeyValueStore`] backend with the
//! signed-in user, the category table and the display locale. Every query
//! loads the whole collection from storage and hands the snapshot to
//! [`crate::aggregate`].
//!
//! [`KeyValueStore`]: crate::storage::KeyValueStore
//! [`BlockingKeyValueStore`]: crate::storage::BlockingKeyValueStore

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::{FinanceError, Result};
use crate::models::{Amount, CategoryTable, NewTransaction, Transaction, TransactionId};

/// Validates a form and turns it into a stored transaction.
///
/// Checks run in the order a user fills the form: type, category, name,
/// amount, then whether the category exists in `categories`.
fn build_transaction(
    form: NewTransaction,
    categories: &CategoryTable,
    now: DateTime<Utc>,
) -> Result<Transaction> {
    let polarity = form.polarity.ok_or(FinanceError::MissingPolarity)?;
    let category = form.category.ok_or(FinanceError::MissingCategory)?;
    let name = form.name.trim();
    if name.is_empty() {
        return Err(FinanceError::MissingName);
    }
    if form.amount <= Decimal::ZERO {
        return Err(FinanceError::NonPositiveAmount(form.amount));
    }
    if !categories.contains(&category) {
        return Err(FinanceError::UnknownCategory(category));
    }
    Ok(Transaction {
        id: TransactionId::new(uuid::Uuid::new_v4().to_string()),
        name: name.to_owned(),
        amount: Amount::new(form.amount)?,
        polarity,
        category,
        timestamp: now,
    })
}

/// Decodes a stored collection; an absent key is an empty collection.
fn decode_collection(raw: Option<String>) -> Result<Vec<Transaction>> {
    raw.map_or_else(
        || Ok(Vec::new()),
        |json| serde_json::from_str(&json).map_err(FinanceError::from),
    )
}

/// Appends `transaction` to a stored collection and re-encodes it.
fn append_to_collection(raw: Option<String>, transaction: &Transaction) -> Result<String> {
    let mut transactions = decode_collection(raw)?;
    transactions.push(transaction.clone());
    serde_json::to_string(&transactions).map_err(FinanceError::from)
}

/// Generates a ledger (async or blocking) with its builder.
macro_rules! define_ledger {
    (
        ledger_name: $ledger:ident,
        builder_name: $builder:ident,
        storage_trait: $storage_trait:ident,
        ledger_doc: $ledger_doc:expr,
        builder_doc: $builder_doc:expr,
        $(async_kw: $async_kw:tt,)?
        $(await_kw: $await_ext:tt,)?
    ) => {
        #[doc = $builder_doc]
        #[derive(Debug)]
        pub struct $builder<S: $storage_trait> {
            /// Storage backend.
            storage: Option<S>,
            /// Signed-in user owning the collection.
            user: Option<User>,
            /// Category table override.
            categories: Option<CategoryTable>,
            /// Display locale override.
            locale: Option<Locale>,
        }

        impl<S: $storage_trait> $builder<S> {
            /// Sets the storage backend.
            #[inline]
            #[must_use]
            pub fn storage(mut self, storage: S) -> Self {
                self.storage = Some(storage);
                self
            }

            /// Sets the signed-in user whose collection is used.
            #[inline]
            #[must_use]
            pub fn user(mut self, user: User) -> Self {
                self.user = Some(user);
                self
            }

            /// Replaces the built-in category table.
            #[inline]
            #[must_use]
            pub fn categories(mut self, categories: CategoryTable) -> Self {
                self.categories = Some(categories);
                self
            }

            /// Sets the display locale (default: pt-BR).
            #[inline]
            #[must_use]
            pub const fn locale(mut self, locale: Locale) -> Self {
                self.locale = Some(locale);
                self
            }

            /// Builds the ledger.
            ///
            /// # Errors
            ///
            /// Returns [`FinanceError::Storage`] if no storage was provided.
            /// Returns [`FinanceError::NotSignedIn`] if no user was provided.
            #[inline]
            pub fn build(self) -> Result<$ledger<S>> {
                let storage = self.storage.ok_or_else(|| {
                    FinanceError::Storage("storage backend is required".into())
                })?;
                let user = self.user.ok_or(FinanceError::NotSignedIn)?;
                Ok($ledger {
                    storage,
                    user,
                    categories: self.categories.unwrap_or_default(),
                    locale: self.locale.unwrap_or_default(),
                })
            }
        }

        #[doc = $ledger_doc]
        #[derive(Debug)]
        pub struct $ledger<S: $storage_trait> {
            /// Storage backend.
            storage: S,
            /// Signed-in user owning the collection.
            user: User,
            /// Category table used for validation and the breakdown.
            categories: CategoryTable,
            /// Display locale.
            locale: Locale,
        }

        impl<S: $storage_trait> $ledger<S> {
            /// Creates a new builder for configuring the ledger.
            #[inline]
            #[must_use]
            pub const fn builder() -> $builder<S> {
                $builder {
                    storage: None,
                    user: None,
                    categories: None,
                    locale: None,
                }
            }

            /// Returns the whole transaction collection of the user, in
            /// insertion order.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to read or the
            /// stored collection is not valid JSON.
            pub $($async_kw)? fn transactions(&self) -> Result<Vec<Transaction>> {
                let key = transactions_key(&self.user.id);
                let raw = self.storage.get(&key) $( .$await_ext )? ?;
                let transactions = decode_collection(raw)?;
                tracing::debug!(user = %self.user.id, count = transactions.len(), "loaded transactions");
                Ok(transactions)
            }

            /// Validates the form and appends the new transaction to the
            /// collection in a single atomic storage update, so concurrent
            /// registrations never drop each other.
            ///
            /// Returns the stored transaction, with a fresh UUID and the
            /// current time.
            ///
            /// # Errors
            ///
            /// Returns a validation error ([`FinanceError::MissingPolarity`],
            /// [`FinanceError::MissingCategory`], [`FinanceError::MissingName`],
            /// [`FinanceError::NonPositiveAmount`],
            /// [`FinanceError::UnknownCategory`]) without touching storage, or
            /// a storage/serialization error if the read or write fails.
            #[tracing::instrument(skip_all, fields(user = %self.user.id))]
            pub $($async_kw)? fn register(&self, form: NewTransaction) -> Result<Transaction> {
                let transaction = build_transaction(form, &self.categories, Utc::now())?;
                let key = transactions_key(&self.user.id);
                self.storage.update(&key, |raw| append_to_collection(raw, &transaction))
                    $( .$await_ext )? ?;
                tracing::info!(
                    id = %transaction.id,
                    polarity = ?transaction.polarity,
                    category = %transaction.category,
                    "registered transaction"
                );
                Ok(transaction)
            }

            /// Loads the collection and computes the highlight cards.
            ///
            /// # Errors
            ///
            /// Returns an error if the collection cannot be loaded.
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn highlights(&self) -> Result<HighlightSummary> {
                let transactions = self.transactions() $( .$await_ext )? ?;
                Ok(compute_highlights(&transactions, self.locale))
            }

            /// Loads the collection and computes the outflow per category
            /// for `month`.
            ///
            /// # Errors
            ///
            /// Returns an error if the collection cannot be loaded.
            #[tracing::instrument(skip_all, fields(%month))]
            pub $($async_kw)? fn category_breakdown(
                &self,
                month: ReferenceMonth,
            ) -> Result<Vec<CategorySummary>> {
                let transactions = self.transactions() $( .$await_ext )? ?;
                Ok(compute_category_breakdown(
                    &transactions,
                    month,
                    &self.categories,
                    self.locale,
                ))
            }

            /// Loads the collection and formats it for the dashboard list.
            ///
            /// # Errors
            ///
            /// Returns an error if the collection cannot be loaded.
            pub $($async_kw)? fn listing(&self) -> Result<Vec<ListedTransaction>> {
                let transactions = self.transactions() $( .$await_ext )? ?;
                Ok(list_transactions(&transactions, self.locale))
            }

            /// Returns the user owning this ledger.
            #[inline]
            #[must_use]
            pub const fn user(&self) -> &User {
                &self.user
            }

            /// Returns the category table in use.
            #[inline]
            #[must_use]
            pub const fn categories(&self) -> &CategoryTable {
                &self.categories
            }

            /// Returns the display locale.
            #[inline]
            #[must_use]
            pub const fn locale(&self) -> Locale {
                self.locale
            }

            /// Returns a reference to the storage backend.
            #[inline]
            #[must_use]
            pub const fn storage(&self) -> &S {
                &self.storage
            }
        }
    };
}

// ── Async variant ───────────────────────────────────────────────────────

mod async_ledger {
    //! Async ledger.

    use crate::aggregate::{compute_category_breakdown, compute_highlights, list_transactions};
    use crate::error::{FinanceError, Result};
    use crate::locale::Locale;
    use crate::models::{
        CategorySummary, CategoryTable, HighlightSummary, ListedTransaction, NewTransaction,
        ReferenceMonth, Transaction, User,
    };
    use crate::storage::{KeyValueStore, transactions_key};
    use chrono::Utc;

    use super::{append_to_collection, build_transaction, decode_collection};

    define_ledger! {
        ledger_name: Ledger,
        builder_name: LedgerBuilder,
        storage_trait: KeyValueStore,
        ledger_doc: "Async per-user ledger backed by a key-value store.\n\nUse [`Ledger::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`Ledger`].",
        async_kw: async,
        await_kw: await,
    }
}

// ── Blocking variant ────────────────────────────────────────────────────

mod blocking_ledger {
    //! Blocking ledger.

    use crate::aggregate::{compute_category_breakdown, compute_highlights, list_transactions};
    use crate::error::{FinanceError, Result};
    use crate::locale::Locale;
    use crate::models::{
        CategorySummary, CategoryTable, HighlightSummary, ListedTransaction, NewTransaction,
        ReferenceMonth, Transaction, User,
    };
    use crate::storage::{BlockingKeyValueStore, transactions_key};
    use chrono::Utc;

    use super::{append_to_collection, build_transaction, decode_collection};

    define_ledger! {
        ledger_name: LedgerBlocking,
        builder_name: LedgerBlockingBuilder,
        storage_trait: BlockingKeyValueStore,
        ledger_doc: "Blocking per-user ledger backed by a key-value store.\n\nUse [`LedgerBlocking::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`LedgerBlocking`].",
    }
}

pub use async_ledger::{Ledger, LedgerBuilder};
pub use blocking_ledger::{LedgerBlocking, LedgerBlockingBuilder};
