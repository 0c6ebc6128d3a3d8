//! Locale-dependent formatting of amounts, dates and captions.
//!
//! All human-readable strings produced by the aggregator go through a
//! [`Locale`]. Dates are rendered from their UTC calendar fields.

use core::str::FromStr;

use chrono::{DateTime, Datelike as _, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{FinanceError, Result};
use crate::models::{Highlight, Polarity, ReferenceMonth};

/// Long month names, Brazilian Portuguese.
const MONTHS_PT_BR: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// Long month names, US English.
const MONTHS_EN_US: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Supported display locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    /// Brazilian Portuguese, amounts in BRL (`R$ 1.234,56`).
    #[default]
    #[serde(rename = "pt-BR")]
    PtBr,
    /// US English, amounts in USD (`$1,234.56`).
    #[serde(rename = "en-US")]
    EnUs,
}

impl Locale {
    /// BCP 47 tag of this locale.
    #[inline]
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::PtBr => "pt-BR",
            Self::EnUs => "en-US",
        }
    }

    /// Label shown when a highlight has no contributing transactions.
    #[inline]
    #[must_use]
    pub const fn no_transactions(self) -> &'static str {
        match self {
            Self::PtBr => "Não há transações",
            Self::EnUs => "No transactions",
        }
    }

    /// Formats an amount as currency, rounded to cents.
    ///
    /// Negative values get a leading minus sign before the symbol.
    #[must_use]
    pub fn format_currency(self, value: Decimal) -> String {
        let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let digits = format!("{:.2}", rounded.abs());
        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
        match self {
            Self::PtBr => format!(
                "{sign}R$\u{a0}{},{frac_part}",
                group_thousands(int_part, '.')
            ),
            Self::EnUs => format!("{sign}${}.{frac_part}", group_thousands(int_part, ',')),
        }
    }

    /// Long name of a month (`1..=12`); empty for anything else.
    #[inline]
    #[must_use]
    pub fn month_name(self, month: u32) -> &'static str {
        let names = match self {
            Self::PtBr => &MONTHS_PT_BR,
            Self::EnUs => &MONTHS_EN_US,
        };
        month
            .checked_sub(1)
            .and_then(|idx| usize::try_from(idx).ok())
            .and_then(|idx| names.get(idx))
            .copied()
            .unwrap_or_default()
    }

    /// Day of month plus long month name: `10 de maio` / `10 May`.
    #[inline]
    #[must_use]
    pub fn day_month(self, timestamp: &DateTime<Utc>) -> String {
        let day = timestamp.day();
        let month = self.month_name(timestamp.month());
        match self {
            Self::PtBr => format!("{day} de {month}"),
            Self::EnUs => format!("{day} {month}"),
        }
    }

    /// Range from the first of the month up to `until`: `01 a 15 de maio`.
    #[inline]
    #[must_use]
    pub fn date_range(self, until: &str) -> String {
        match self {
            Self::PtBr => format!("01 a {until}"),
            Self::EnUs => format!("01 to {until}"),
        }
    }

    /// Two-digit day, month and year for listings.
    #[inline]
    #[must_use]
    pub fn short_date(self, timestamp: &DateTime<Utc>) -> String {
        let day = timestamp.day();
        let month = timestamp.month();
        let year = timestamp.year().rem_euclid(100);
        match self {
            Self::PtBr => format!("{day:02}/{month:02}/{year:02}"),
            Self::EnUs => format!("{month:02}/{day:02}/{year:02}"),
        }
    }

    /// Caption for the month selector: `maio, 2023` / `May, 2023`.
    #[inline]
    #[must_use]
    pub fn month_caption(self, month: ReferenceMonth) -> String {
        format!("{}, {}", self.month_name(month.month()), month.year())
    }

    /// Caption under an incoming or outgoing highlight card.
    ///
    /// Empty highlights show the sentinel label unchanged.
    #[must_use]
    pub fn last_transaction_caption(self, polarity: Polarity, highlight: &Highlight) -> String {
        if highlight.last_transaction.is_none() {
            return highlight.label.clone();
        }
        let label = &highlight.label;
        match (self, polarity) {
            (Self::PtBr, Polarity::Incoming) => format!("Última entrada dia {label}"),
            (Self::PtBr, Polarity::Outgoing) => format!("Última saída dia {label}"),
            (Self::EnUs, Polarity::Incoming) => format!("Last income on {label}"),
            (Self::EnUs, Polarity::Outgoing) => format!("Last outcome on {label}"),
        }
    }
}

impl FromStr for Locale {
    type Err = FinanceError;

    /// Accepts `pt-BR` / `en-US`, case-insensitive, `_` or `-`.
    #[inline]
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().replace('_', "-").to_ascii_lowercase().as_str() {
            "pt-br" | "pt" => Ok(Self::PtBr),
            "en-us" | "en" => Ok(Self::EnUs),
            _ => Err(FinanceError::UnknownLocale(s.to_owned())),
        }
    }
}

impl core::fmt::Display for Locale {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Inserts `separator` between groups of three digits, from the right.
fn group_thousands(digits: &str, separator: char) -> String {
    let len = digits.chars().count();
    let mut out = String::with_capacity(len.saturating_mul(2));
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}
