//! Data models for transactions, categories, users and derived summaries.
//!
//! Stored records keep the field names of the persisted JSON collection
//! (`type`, `date`, `positive`/`negative`) while exposing descriptive Rust
//! names.

mod amount;
mod category;
mod enums;
mod ids;
mod month;
mod summary;
mod transaction;
mod user;

pub use amount::Amount;
pub use category::{Category, CategoryTable};
pub use enums::Polarity;
pub use ids::{CategoryKey, TransactionId, UserId};
pub use month::ReferenceMonth;
pub use summary::{CategorySummary, Highlight, HighlightSummary, ListedTransaction};
pub use transaction::{NewTransaction, Transaction};
pub use user::User;

/// Re-export of [`chrono::NaiveDate`] for date-typed inputs.
pub use chrono::NaiveDate;
