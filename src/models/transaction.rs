//! Transaction model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Amount, CategoryKey, Polarity, TransactionId};

/// A recorded income or expense.
///
/// Transactions are immutable once created: the stored collection is only
/// ever appended to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier (UUID).
    pub id: TransactionId,
    /// Free-text label.
    pub name: String,
    /// Monetary value (never negative).
    pub amount: Amount,
    /// Whether the money came in or went out.
    #[serde(rename = "type")]
    pub polarity: Polarity,
    /// Key into the category table.
    pub category: CategoryKey,
    /// Creation date-time.
    #[serde(rename = "date")]
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Returns `true` if this transaction is money received.
    #[inline]
    #[must_use]
    pub const fn is_incoming(&self) -> bool {
        self.polarity.is_incoming()
    }

    /// Returns `true` if this transaction is money spent.
    #[inline]
    #[must_use]
    pub const fn is_outgoing(&self) -> bool {
        self.polarity.is_outgoing()
    }
}

/// Form input for registering a new transaction.
///
/// Fields are optional the way an unfinished form is: validation happens
/// in [`crate::ledger`] when the transaction is registered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTransaction {
    /// Free-text label.
    pub name: String,
    /// Amount as typed by the user.
    pub amount: Decimal,
    /// Income or outcome, if selected.
    pub polarity: Option<Polarity>,
    /// Category key, if selected.
    pub category: Option<CategoryKey>,
}

impl NewTransaction {
    /// Creates a fully specified form.
    #[inline]
    #[must_use]
    pub fn new<N: Into<String>>(
        name: N,
        amount: Decimal,
        polarity: Polarity,
        category: CategoryKey,
    ) -> Self {
        Self {
            name: name.into(),
            amount,
            polarity: Some(polarity),
            category: Some(category),
        }
    }
}
