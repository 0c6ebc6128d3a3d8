//! Transaction aggregation.
//!
//! Pure functions turning a snapshot of the transaction collection into
//! the derived summaries shown to the user. They perform no I/O, never
//! fail, and take the category table and locale as parameters. Totals
//! saturate at [`Decimal::MAX`].

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::locale::Locale;
use crate::models::{
    CategorySummary, CategoryTable, Highlight, HighlightSummary, ListedTransaction, Polarity,
    ReferenceMonth, Transaction,
};

/// Running total and most recent timestamp for one polarity.
#[derive(Debug, Clone, Copy, Default)]
struct PolarityTotals {
    /// Sum of amounts.
    total: Decimal,
    /// Latest timestamp seen.
    last: Option<DateTime<Utc>>,
}

impl PolarityTotals {
    /// Folds every transaction of `polarity` into a total.
    fn collect(transactions: &[Transaction], polarity: Polarity) -> Self {
        transactions
            .iter()
            .filter(|tx| tx.polarity == polarity)
            .fold(Self::default(), |acc, tx| Self {
                total: saturating_add(acc.total, tx.amount.value()),
                last: acc.last.max(Some(tx.timestamp)),
            })
    }

    /// Renders the totals as a highlight card.
    fn into_highlight(self, locale: Locale) -> Highlight {
        let label = self.last.map_or_else(
            || locale.no_transactions().to_owned(),
            |last| locale.day_month(&last),
        );
        Highlight {
            total: self.total,
            formatted_total: locale.format_currency(self.total),
            last_transaction: self.last,
            label,
        }
    }
}

/// Computes the incoming, outgoing and net highlight cards.
///
/// Totals cover the whole collection regardless of date. The net card's
/// label runs from the first of the month to the last outgoing day, or is
/// the "no transactions" sentinel when nothing has been spent.
#[must_use]
pub fn compute_highlights(transactions: &[Transaction], locale: Locale) -> HighlightSummary {
    let incoming = PolarityTotals::collect(transactions, Polarity::Incoming);
    let outgoing = PolarityTotals::collect(transactions, Polarity::Outgoing);

    let net_total = incoming.total - outgoing.total;
    let net_label = outgoing.last.map_or_else(
        || locale.no_transactions().to_owned(),
        |last| locale.date_range(&locale.day_month(&last)),
    );
    let net = Highlight {
        total: net_total,
        formatted_total: locale.format_currency(net_total),
        last_transaction: outgoing.last,
        label: net_label,
    };

    tracing::debug!(
        count = transactions.len(),
        incoming = %incoming.total,
        outgoing = %outgoing.total,
        "computed highlights"
    );

    HighlightSummary {
        incoming: incoming.into_highlight(locale),
        outgoing: outgoing.into_highlight(locale),
        net,
    }
}

/// Computes per-category outflow for one month.
///
/// Only outgoing transactions dated within `month` count. Categories are
/// visited in table order and only those with a positive sum are returned.
/// Percentages are relative to the month's total outflow and rounded to a
/// whole number, halves away from zero.
#[must_use]
pub fn compute_category_breakdown(
    transactions: &[Transaction],
    month: ReferenceMonth,
    categories: &CategoryTable,
    locale: Locale,
) -> Vec<CategorySummary> {
    let outflows: Vec<&Transaction> = transactions
        .iter()
        .filter(|tx| tx.is_outgoing() && month.contains(&tx.timestamp))
        .collect();
    let monthly_total = outflows
        .iter()
        .map(|tx| tx.amount.value())
        .fold(Decimal::ZERO, saturating_add);

    for tx in outflows.iter().filter(|tx| !categories.contains(&tx.category)) {
        tracing::warn!(id = %tx.id, category = %tx.category, "outflow has unknown category");
    }

    let breakdown: Vec<CategorySummary> = categories
        .iter()
        .filter_map(|category| {
            let sum = outflows
                .iter()
                .filter(|tx| tx.category == category.key)
                .map(|tx| tx.amount.value())
                .fold(Decimal::ZERO, saturating_add);
            // A positive sum implies a positive monthly total.
            if sum <= Decimal::ZERO {
                return None;
            }
            Some(CategorySummary {
                key: category.key.clone(),
                name: category.name.clone(),
                color: category.color.clone(),
                total: sum,
                formatted_total: locale.format_currency(sum),
                percent: percent_of(sum, monthly_total),
            })
        })
        .collect();

    tracing::debug!(
        %month,
        outflows = outflows.len(),
        total = %monthly_total,
        categories = breakdown.len(),
        "computed category breakdown"
    );

    breakdown
}

/// Maps every transaction, in collection order, to a listing row.
#[must_use]
pub fn list_transactions(transactions: &[Transaction], locale: Locale) -> Vec<ListedTransaction> {
    transactions
        .iter()
        .map(|tx| ListedTransaction {
            id: tx.id.clone(),
            name: tx.name.clone(),
            formatted_amount: locale.format_currency(tx.amount.value()),
            polarity: tx.polarity,
            category: tx.category.clone(),
            date: locale.short_date(&tx.timestamp),
        })
        .collect()
}

/// Adds two amounts, saturating at [`Decimal::MAX`] instead of overflowing.
fn saturating_add(total: Decimal, amount: Decimal) -> Decimal {
    total.checked_add(amount).unwrap_or_else(|| {
        tracing::warn!(%total, %amount, "total overflowed, saturating");
        Decimal::MAX
    })
}

/// `part / whole * 100` rounded to a whole number; zero when `whole` is zero.
fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map_or(Decimal::ZERO, |pct| {
            pct.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .normalize()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    use rust_decimal_macros::dec;

    use crate::models::{Amount, CategoryKey, TransactionId};

    fn tx(amount: Decimal, polarity: Polarity, category: &str, date: &str) -> Transaction {
        Transaction {
            id: TransactionId::new(format!("{category}-{date}-{amount}")),
            name: format!("{category} item"),
            amount: Amount::new(amount).unwrap(),
            polarity,
            category: CategoryKey::from(category),
            timestamp: DateTime::parse_from_rfc3339(&format!("{date}T12:00:00Z"))
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    fn may_2023() -> ReferenceMonth {
        ReferenceMonth::new(2023, 5).unwrap()
    }

    fn scenario_a() -> Vec<Transaction> {
        vec![
            tx(dec!(100), Polarity::Incoming, "salary", "2023-05-01"),
            tx(dec!(40), Polarity::Outgoing, "food", "2023-05-10"),
            tx(dec!(20), Polarity::Outgoing, "food", "2023-05-15"),
        ]
    }

    #[test]
    fn highlights_scenario_a() {
        let summary = compute_highlights(&scenario_a(), Locale::PtBr);
        assert_eq!(summary.incoming.total, dec!(100));
        assert_eq!(summary.outgoing.total, dec!(60));
        assert_eq!(summary.net.total, dec!(40));
        assert_eq!(summary.incoming.label, "1 de maio");
        assert_eq!(summary.outgoing.label, "15 de maio");
        assert_eq!(summary.net.label, "01 a 15 de maio");
        assert_eq!(summary.incoming.formatted_total, "R$\u{a0}100,00");
        assert_eq!(summary.outgoing.formatted_total, "R$\u{a0}60,00");
        assert_eq!(summary.net.formatted_total, "R$\u{a0}40,00");
    }

    #[test]
    fn breakdown_scenario_a() {
        let breakdown = compute_category_breakdown(
            &scenario_a(),
            may_2023(),
            &CategoryTable::default(),
            Locale::PtBr,
        );
        assert_eq!(breakdown.len(), 1);
        let food = &breakdown[0];
        assert_eq!(food.key, CategoryKey::from("food"));
        assert_eq!(food.name, "Alimentação");
        assert_eq!(food.total, dec!(60));
        assert_eq!(food.percent_label(), "100%");
    }

    #[test]
    fn highlights_empty_collection() {
        let summary = compute_highlights(&[], Locale::PtBr);
        for card in [&summary.incoming, &summary.outgoing, &summary.net] {
            assert_eq!(card.total, Decimal::ZERO);
            assert_eq!(card.label, "Não há transações");
            assert!(card.last_transaction.is_none());
            assert_eq!(card.formatted_total, "R$\u{a0}0,00");
        }
    }

    #[test]
    fn breakdown_empty_collection() {
        let breakdown =
            compute_category_breakdown(&[], may_2023(), &CategoryTable::default(), Locale::PtBr);
        assert!(breakdown.is_empty());
    }

    #[test]
    fn breakdown_equal_split() {
        let transactions = vec![
            tx(dec!(50), Polarity::Outgoing, "food", "2023-05-03"),
            tx(dec!(50), Polarity::Outgoing, "car", "2023-05-04"),
        ];
        let breakdown = compute_category_breakdown(
            &transactions,
            may_2023(),
            &CategoryTable::default(),
            Locale::EnUs,
        );
        let labels: Vec<(&str, String)> = breakdown
            .iter()
            .map(|c| (c.key.as_inner(), c.percent_label()))
            .collect();
        assert_eq!(
            labels,
            [("food", "50%".to_owned()), ("car", "50%".to_owned())]
        );
    }

    #[test]
    fn breakdown_other_month_is_empty_but_highlights_count_everything() {
        let transactions = scenario_a();
        let june = ReferenceMonth::new(2023, 6).unwrap();
        let breakdown =
            compute_category_breakdown(&transactions, june, &CategoryTable::default(), Locale::PtBr);
        assert!(breakdown.is_empty());
        let summary = compute_highlights(&transactions, Locale::PtBr);
        assert_eq!(summary.outgoing.total, dec!(60));
    }

    #[test]
    fn breakdown_ignores_incoming() {
        let transactions = vec![
            tx(dec!(3000), Polarity::Incoming, "salary", "2023-05-05"),
            tx(dec!(10), Polarity::Incoming, "food", "2023-05-06"),
        ];
        let breakdown = compute_category_breakdown(
            &transactions,
            may_2023(),
            &CategoryTable::default(),
            Locale::PtBr,
        );
        assert!(breakdown.is_empty());
    }

    #[test]
    fn breakdown_follows_table_order_not_magnitude() {
        let transactions = vec![
            tx(dec!(10), Polarity::Outgoing, "studies", "2023-05-02"),
            tx(dec!(500), Polarity::Outgoing, "leisure", "2023-05-02"),
            tx(dec!(90), Polarity::Outgoing, "purchases", "2023-05-20"),
        ];
        let breakdown = compute_category_breakdown(
            &transactions,
            may_2023(),
            &CategoryTable::default(),
            Locale::PtBr,
        );
        let keys: Vec<&str> = breakdown.iter().map(|c| c.key.as_inner()).collect();
        assert_eq!(keys, ["purchases", "leisure", "studies"]);
    }

    #[test]
    fn breakdown_totals_sum_exactly_and_percents_near_hundred() {
        let transactions = vec![
            tx(dec!(33.33), Polarity::Outgoing, "food", "2023-05-01"),
            tx(dec!(33.33), Polarity::Outgoing, "car", "2023-05-02"),
            tx(dec!(33.34), Polarity::Outgoing, "leisure", "2023-05-03"),
            tx(dec!(0.10), Polarity::Outgoing, "food", "2023-05-04"),
            tx(dec!(12.00), Polarity::Outgoing, "food", "2023-04-30"),
        ];
        let breakdown = compute_category_breakdown(
            &transactions,
            may_2023(),
            &CategoryTable::default(),
            Locale::PtBr,
        );
        let total: Decimal = breakdown.iter().map(|c| c.total).sum();
        assert_eq!(total, dec!(100.10));
        let percents: Decimal = breakdown.iter().map(|c| c.percent).sum();
        assert!((percents - dec!(100)).abs() <= dec!(2));
    }

    #[test]
    fn breakdown_rounds_half_up() {
        let transactions = vec![
            tx(dec!(1), Polarity::Outgoing, "food", "2023-05-01"),
            tx(dec!(7), Polarity::Outgoing, "car", "2023-05-01"),
        ];
        let breakdown = compute_category_breakdown(
            &transactions,
            may_2023(),
            &CategoryTable::default(),
            Locale::PtBr,
        );
        // 12.5% and 87.5%
        assert_eq!(breakdown[0].percent, dec!(13));
        assert_eq!(breakdown[1].percent, dec!(88));
    }

    #[test]
    fn breakdown_skips_unknown_categories_but_counts_them() {
        let transactions = vec![
            tx(dec!(75), Polarity::Outgoing, "food", "2023-05-01"),
            tx(dec!(25), Polarity::Outgoing, "pets", "2023-05-01"),
        ];
        let breakdown = compute_category_breakdown(
            &transactions,
            may_2023(),
            &CategoryTable::default(),
            Locale::PtBr,
        );
        assert_eq!(breakdown.len(), 1);
        assert_eq!(breakdown[0].percent, dec!(75));
    }

    #[test]
    fn zero_amount_outflows_are_omitted() {
        let transactions = vec![tx(dec!(0), Polarity::Outgoing, "food", "2023-05-01")];
        let breakdown = compute_category_breakdown(
            &transactions,
            may_2023(),
            &CategoryTable::default(),
            Locale::PtBr,
        );
        assert!(breakdown.is_empty());
    }

    #[test]
    fn net_is_incoming_minus_outgoing() {
        let transactions = vec![
            tx(dec!(10.10), Polarity::Incoming, "salary", "2023-01-01"),
            tx(dec!(250.35), Polarity::Outgoing, "car", "2023-02-11"),
            tx(dec!(0.05), Polarity::Incoming, "salary", "2023-03-01"),
        ];
        let summary = compute_highlights(&transactions, Locale::EnUs);
        assert_eq!(
            summary.net.total,
            summary.incoming.total - summary.outgoing.total
        );
        assert_eq!(summary.net.total, dec!(-240.20));
        assert_eq!(summary.net.formatted_total, "-$240.20");
    }

    #[test]
    fn last_transaction_is_max_not_last_inserted() {
        let transactions = vec![
            tx(dec!(1), Polarity::Outgoing, "food", "2023-05-20"),
            tx(dec!(1), Polarity::Outgoing, "food", "2023-05-02"),
        ];
        let summary = compute_highlights(&transactions, Locale::EnUs);
        assert_eq!(summary.outgoing.label, "20 May");
        assert_eq!(summary.net.label, "01 to 20 May");
    }

    #[test]
    fn net_label_is_sentinel_without_outflows() {
        let transactions = vec![tx(dec!(100), Polarity::Incoming, "salary", "2023-05-01")];
        let summary = compute_highlights(&transactions, Locale::EnUs);
        assert_eq!(summary.incoming.label, "1 May");
        assert_eq!(summary.outgoing.label, "No transactions");
        assert_eq!(summary.net.label, "No transactions");
        assert_eq!(summary.net.total, dec!(100));
    }

    #[test]
    fn listing_keeps_collection_order() {
        let rows = list_transactions(&scenario_a(), Locale::PtBr);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].date, "01/05/23");
        assert_eq!(rows[1].formatted_amount, "R$\u{a0}40,00");
        assert_eq!(rows[2].polarity, Polarity::Outgoing);
    }

    #[test]
    fn percent_of_zero_whole_is_zero() {
        assert_eq!(percent_of(dec!(5), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn oversized_amounts_saturate_instead_of_overflowing() {
        let transactions = vec![
            tx(Decimal::MAX, Polarity::Outgoing, "food", "2023-05-10"),
            tx(Decimal::MAX, Polarity::Outgoing, "car", "2023-05-11"),
            tx(Decimal::MAX, Polarity::Incoming, "salary", "2023-05-01"),
            tx(Decimal::MAX, Polarity::Incoming, "salary", "2023-05-02"),
        ];
        let summary = compute_highlights(&transactions, Locale::EnUs);
        assert_eq!(summary.incoming.total, Decimal::MAX);
        assert_eq!(summary.outgoing.total, Decimal::MAX);
        assert_eq!(summary.net.total, Decimal::ZERO);

        let breakdown = compute_category_breakdown(
            &transactions,
            may_2023(),
            &CategoryTable::default(),
            Locale::EnUs,
        );
        assert_eq!(breakdown.len(), 2);
        assert!(breakdown.iter().all(|entry| entry.total == Decimal::MAX));
        assert!(breakdown.iter().all(|entry| entry.percent == dec!(100)));
    }

    #[test]
    fn saturating_add_adds_normally_below_max() {
        assert_eq!(saturating_add(dec!(1.5), dec!(2.25)), dec!(3.75));
        assert_eq!(saturating_add(Decimal::MAX, dec!(1)), Decimal::MAX);
    }
}
