//! Property-based integration tests for FIFO lot aggregation.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use tallyfolio_core::holdings::{aggregate_holdings, PositionDirection};
use tallyfolio_core::{Transaction, TransactionKind};

// =============================================================================
// Generators
// =============================================================================

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// (quantity, price in cents) pairs with positive values.
fn arb_fills(max_count: usize) -> impl Strategy<Value = Vec<(i64, i64)>> {
    proptest::collection::vec((1i64..1_000, 1i64..10_000_000), 1..=max_count)
}

/// Builds one transaction per fill, one minute apart in list order.
fn transactions(ticker: &str, fills: &[(TransactionKind, i64, i64)]) -> Vec<Transaction> {
    fills
        .iter()
        .enumerate()
        .map(|(i, (kind, quantity, cents))| {
            let quantity = Decimal::from(*quantity);
            let price = Decimal::new(*cents, 2);
            Transaction {
                occurred_at: base_time() + Duration::minutes(i as i64),
                kind: *kind,
                ticker: ticker.to_string(),
                security_name: ticker.to_string(),
                quantity,
                price,
                amount: quantity * price,
                fees: None,
                asset_type: None,
            }
        })
        .collect()
}

/// Buys and sells of the same total size, interleaved in random order.
fn arb_balanced_trades() -> impl Strategy<Value = Vec<(TransactionKind, i64, i64)>> {
    arb_fills(20)
        .prop_flat_map(|buys| {
            let sells: Vec<(TransactionKind, i64, i64)> = buys
                .iter()
                .map(|(q, p)| (TransactionKind::Sell, *q, *p))
                .collect();
            let mut all: Vec<(TransactionKind, i64, i64)> = buys
                .iter()
                .map(|(q, p)| (TransactionKind::Buy, *q, *p))
                .collect();
            all.extend(sells);
            Just(all).prop_shuffle()
        })
}

fn arb_mixed_trades() -> impl Strategy<Value = Vec<(TransactionKind, i64, i64)>> {
    proptest::collection::vec(
        (
            prop_oneof![Just(TransactionKind::Buy), Just(TransactionKind::Sell)],
            1i64..500,
            1i64..1_000_000,
        ),
        0..40,
    )
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Buys only: quantity is the sum and average cost the weighted mean.
    #[test]
    fn prop_buys_only_weighted_mean(fills in arb_fills(30)) {
        let trades: Vec<_> = fills.iter().map(|(q, p)| (TransactionKind::Buy, *q, *p)).collect();
        let holdings = aggregate_holdings(&transactions("AAPL", &trades)).unwrap();

        let total_quantity: Decimal = fills.iter().map(|(q, _)| Decimal::from(*q)).sum();
        let total_cost: Decimal = fills
            .iter()
            .map(|(q, p)| Decimal::from(*q) * Decimal::new(*p, 2))
            .sum();

        prop_assert_eq!(holdings.len(), 1);
        prop_assert_eq!(holdings[0].quantity, total_quantity);
        prop_assert_eq!(holdings[0].total_cost_basis, total_cost);
        prop_assert_eq!(holdings[0].average_cost, total_cost / total_quantity);
        prop_assert_eq!(holdings[0].position_direction, PositionDirection::Long);
    }

    /// Selling exactly what was bought, in any order, leaves no holding.
    #[test]
    fn prop_balanced_trades_close_out(trades in arb_balanced_trades()) {
        let holdings = aggregate_holdings(&transactions("XYZ", &trades)).unwrap();

        prop_assert!(holdings.is_empty());
    }

    /// The held quantity is the absolute net of buys and sells, with the
    /// direction taken from its sign.
    #[test]
    fn prop_quantity_is_absolute_net(trades in arb_mixed_trades()) {
        let holdings = aggregate_holdings(&transactions("XYZ", &trades)).unwrap();
        let net: Decimal = trades
            .iter()
            .map(|(kind, q, _)| match kind {
                TransactionKind::Sell => -Decimal::from(*q),
                _ => Decimal::from(*q),
            })
            .sum();

        if net.is_zero() {
            prop_assert!(holdings.is_empty());
        } else {
            prop_assert_eq!(holdings.len(), 1);
            prop_assert_eq!(holdings[0].quantity, net.abs());
            prop_assert!(holdings[0].quantity > Decimal::ZERO);
            let expected = if net.is_sign_negative() {
                PositionDirection::Short
            } else {
                PositionDirection::Long
            };
            prop_assert_eq!(holdings[0].position_direction, expected);
        }
    }

    /// Aggregating the same transactions twice gives identical holdings.
    #[test]
    fn prop_aggregation_is_idempotent(trades in arb_mixed_trades()) {
        let input = transactions("XYZ", &trades);

        prop_assert_eq!(
            aggregate_holdings(&input).unwrap(),
            aggregate_holdings(&input).unwrap()
        );
    }
}
