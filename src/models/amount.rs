//! Non-negative monetary amount.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{FinanceError, Result};

/// A monetary value that is never negative.
///
/// The sign of a transaction lives in [`super::Polarity`]; this wrapper
/// rejects negative values both on construction and when decoding stored
/// JSON. Stored values may be JSON strings (`"40.00"`) or numbers (`40`);
/// they are always written back as strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates an amount, rejecting negative values.
    ///
    /// # Errors
    ///
    /// Returns [`FinanceError::NegativeAmount`] if `value` is below zero.
    #[inline]
    pub fn new(value: Decimal) -> Result<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(FinanceError::NegativeAmount(value));
        }
        Ok(Self(value))
    }

    /// Returns the inner decimal value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }

    /// Returns `true` if the amount is zero.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0.is_zero()
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = FinanceError;

    #[inline]
    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    #[inline]
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl core::fmt::Display for Amount {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}
