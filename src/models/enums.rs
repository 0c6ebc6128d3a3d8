//! Enumeration types for constrained values.

use serde::{Deserialize, Serialize};

/// Direction of a transaction.
///
/// Amounts are always non-negative; whether money came in or went out is
/// carried by this value. The persisted names (`positive` / `negative`)
/// match the stored collection format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    /// Money received (income, "entrada").
    #[serde(rename = "positive")]
    Incoming,
    /// Money spent (outcome, "saída").
    #[serde(rename = "negative")]
    Outgoing,
}

impl Polarity {
    /// Returns `true` for [`Polarity::Incoming`].
    #[inline]
    #[must_use]
    pub const fn is_incoming(self) -> bool {
        matches!(self, Self::Incoming)
    }

    /// Returns `true` for [`Polarity::Outgoing`].
    #[inline]
    #[must_use]
    pub const fn is_outgoing(self) -> bool {
        matches!(self, Self::Outgoing)
    }
}
