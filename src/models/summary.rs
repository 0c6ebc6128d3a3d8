//! Derived summaries produced by [`crate::aggregate`].
//!
//! None of these are persisted; they are recomputed from the transaction
//! collection on every request.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{CategoryKey, Polarity, TransactionId};

/// One highlight card: a total and a caption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Highlight {
    /// Raw total.
    pub total: Decimal,
    /// Total formatted as currency.
    pub formatted_total: String,
    /// Most recent timestamp that contributed, if any.
    pub last_transaction: Option<DateTime<Utc>>,
    /// Day + month label, a date range for the net card, or the
    /// "no transactions" sentinel.
    pub label: String,
}

/// Incoming, outgoing and net highlight cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightSummary {
    /// Money received.
    pub incoming: Highlight,
    /// Money spent.
    pub outgoing: Highlight,
    /// Incoming minus outgoing.
    pub net: Highlight,
}

/// Outflow of a single category within a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    /// Category key.
    pub key: CategoryKey,
    /// Category display name.
    pub name: String,
    /// Category chart color.
    pub color: String,
    /// Sum of outgoing amounts in this category for the month.
    pub total: Decimal,
    /// Total formatted as currency.
    pub formatted_total: String,
    /// Share of the month's outflow, rounded to a whole number.
    pub percent: Decimal,
}

impl CategorySummary {
    /// Share of the month's outflow with a percent sign (e.g. `"60%"`).
    #[inline]
    #[must_use]
    pub fn percent_label(&self) -> String {
        format!("{}%", self.percent)
    }
}

/// A transaction prepared for the dashboard listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedTransaction {
    /// Transaction identifier.
    pub id: TransactionId,
    /// Free-text label.
    pub name: String,
    /// Amount formatted as currency.
    pub formatted_amount: String,
    /// Income or outcome.
    pub polarity: Polarity,
    /// Category key.
    pub category: CategoryKey,
    /// Short date (`dd/mm/yy` or `mm/dd/yy` depending on locale).
    pub date: String,
}
