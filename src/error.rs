//! Error types for the gofinances library.

use rust_decimal::Decimal;

use crate::models::CategoryKey;

/// All errors that can occur when using the gofinances library.
///
/// The aggregation functions in [`crate::aggregate`] are total and never
/// return this type; it covers storage, decoding and input validation.
#[derive(Debug, thiserror::Error)]
pub enum FinanceError {
    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Key-value storage backend failed.
    #[error("storage error: {0}")]
    Storage(Box<dyn core::error::Error + Send + Sync>),

    /// A monetary amount was negative.
    #[error("amount must not be negative, got {0}")]
    NegativeAmount(Decimal),

    /// A new transaction was registered with a zero or negative amount.
    #[error("amount must be greater than zero, got {0}")]
    NonPositiveAmount(Decimal),

    /// A new transaction was registered without a name.
    #[error("transaction name is required")]
    MissingName,

    /// A new transaction was registered without choosing income or outcome.
    #[error("transaction type (income or outcome) is required")]
    MissingPolarity,

    /// A new transaction was registered without choosing a category.
    #[error("transaction category is required")]
    MissingCategory,

    /// The category key is not present in the category table.
    #[error("unknown category: {0}")]
    UnknownCategory(CategoryKey),

    /// A category table could not be used (empty or duplicated keys).
    #[error("invalid category table: {0}")]
    InvalidCategoryTable(String),

    /// A reference month could not be parsed or is out of range.
    #[error("invalid month: {0}")]
    InvalidMonth(String),

    /// The locale identifier is not supported.
    #[error("unsupported locale: {0}")]
    UnknownLocale(String),

    /// An operation required a signed-in user but none was available.
    #[error("no user is signed in")]
    NotSignedIn,
}

/// Convenience alias for results returned by this crate.
pub type Result<T> = core::result::Result<T, FinanceError>;

#[cfg(test)]
mod tests {
    use super::*;

    use rust_decimal_macros::dec;

    #[test]
    fn error_from_serde_json() {
        let serde_err = serde_json::from_str::<String>("not json").unwrap_err();
        let err = FinanceError::from(serde_err);
        assert!(matches!(err, FinanceError::Serialization(_)));
        let msg = err.to_string();
        assert!(msg.contains("serialization error"));
    }

    #[test]
    fn error_storage_display() {
        let inner = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only fs");
        let err = FinanceError::Storage(Box::new(inner));
        let msg = err.to_string();
        assert!(msg.contains("storage error"));
        assert!(msg.contains("read-only fs"));
    }

    #[test]
    fn error_amount_display_includes_value() {
        assert!(
            FinanceError::NegativeAmount(dec!(-3.50))
                .to_string()
                .contains("-3.50")
        );
        assert!(
            FinanceError::NonPositiveAmount(dec!(0))
                .to_string()
                .contains("greater than zero")
        );
    }

    #[test]
    fn error_unknown_category_display() {
        let err = FinanceError::UnknownCategory(CategoryKey::new("pets".to_owned()));
        assert_eq!(err.to_string(), "unknown category: pets");
    }

    #[test]
    fn error_not_signed_in_display() {
        assert!(FinanceError::NotSignedIn.to_string().contains("signed in"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FinanceError>();
    }
}
