use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::assets::AssetType;
use crate::brokers::{Transaction, TransactionKind};
use crate::holdings::{aggregate_holdings, AggregatedHolding, PositionDirection};

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap()
}

fn tx(
    d: u32,
    kind: TransactionKind,
    ticker: &str,
    quantity: Decimal,
    price: Decimal,
) -> Transaction {
    Transaction {
        occurred_at: day(d),
        kind,
        ticker: ticker.to_string(),
        security_name: ticker.to_string(),
        quantity,
        price,
        amount: quantity.saturating_mul(price),
        fees: None,
        asset_type: None,
    }
}

fn aggregate(transactions: &[Transaction]) -> Vec<AggregatedHolding> {
    aggregate_holdings(transactions).unwrap()
}

fn buy(d: u32, ticker: &str, quantity: Decimal, price: Decimal) -> Transaction {
    tx(d, TransactionKind::Buy, ticker, quantity, price)
}

fn sell(d: u32, ticker: &str, quantity: Decimal, price: Decimal) -> Transaction {
    tx(d, TransactionKind::Sell, ticker, quantity, price)
}

#[test]
fn test_buys_only_give_weighted_average() {
    let holdings = aggregate(&[
        buy(1, "AAPL", dec!(10), dec!(100)),
        buy(2, "AAPL", dec!(30), dec!(120)),
    ]);

    assert_eq!(holdings.len(), 1);
    let aapl = &holdings[0];
    assert_eq!(aapl.quantity, dec!(40));
    assert_eq!(aapl.total_cost_basis, dec!(4600));
    assert_eq!(aapl.average_cost, dec!(115));
    assert_eq!(aapl.position_direction, PositionDirection::Long);
    assert_eq!(aapl.opened_at, Some(day(1)));
}

#[test]
fn test_fifo_sells_oldest_lot_first() {
    let holdings = aggregate(&[
        buy(1, "XYZ", dec!(10), dec!(1)),
        buy(2, "XYZ", dec!(10), dec!(3)),
        sell(3, "XYZ", dec!(10), dec!(5)),
    ]);

    let xyz = &holdings[0];
    assert_eq!(xyz.quantity, dec!(10));
    assert_eq!(xyz.average_cost, dec!(3));
    assert_eq!(xyz.total_cost_basis, dec!(30));
    assert_eq!(xyz.opened_at, Some(day(2)));
}

#[test]
fn test_oversell_becomes_short_at_sell_price() {
    let holdings = aggregate(&[
        buy(1, "XYZ", dec!(5), dec!(10)),
        sell(2, "XYZ", dec!(8), dec!(12)),
    ]);

    let xyz = &holdings[0];
    assert_eq!(xyz.position_direction, PositionDirection::Short);
    assert_eq!(xyz.quantity, dec!(3));
    assert_eq!(xyz.average_cost, dec!(12));
    assert_eq!(xyz.total_cost_basis, dec!(36));
}

#[test]
fn test_sell_without_history_opens_short() {
    let holdings = aggregate(&[sell(1, "GME", dec!(4), dec!(25))]);

    assert_eq!(holdings[0].position_direction, PositionDirection::Short);
    assert_eq!(holdings[0].quantity, dec!(4));
    assert_eq!(holdings[0].average_cost, dec!(25));
}

#[test]
fn test_buy_after_short_keeps_short_lot_cost() {
    let holdings = aggregate(&[
        sell(1, "XYZ", dec!(5), dec!(10)),
        buy(2, "XYZ", dec!(3), dec!(12)),
    ]);

    let xyz = &holdings[0];
    assert_eq!(xyz.position_direction, PositionDirection::Short);
    assert_eq!(xyz.quantity, dec!(2));
    assert_eq!(xyz.total_cost_basis, dec!(50));
    assert_eq!(xyz.average_cost, dec!(25));
    assert_eq!(xyz.opened_at, Some(day(1)));
}

#[test]
fn test_consecutive_sells_merge_into_one_short() {
    let holdings = aggregate(&[
        sell(1, "XYZ", dec!(5), dec!(10)),
        sell(2, "XYZ", dec!(3), dec!(12)),
    ]);

    let xyz = &holdings[0];
    assert_eq!(xyz.quantity, dec!(8));
    assert_eq!(xyz.average_cost, dec!(12));
    assert_eq!(xyz.total_cost_basis, dec!(96));
    assert_eq!(xyz.opened_at, Some(day(2)));
}

#[test]
fn test_flat_ticker_is_dropped() {
    let holdings = aggregate(&[
        buy(1, "AAPL", dec!(5), dec!(100)),
        sell(2, "AAPL", dec!(2), dec!(110)),
        sell(3, "AAPL", dec!(3), dec!(120)),
        buy(1, "MSFT", dec!(1), dec!(300)),
    ]);

    let tickers: Vec<&str> = holdings.iter().map(|h| h.ticker.as_str()).collect();
    assert_eq!(tickers, vec!["MSFT"]);
}

#[test]
fn test_input_order_does_not_matter_when_dated() {
    let holdings = aggregate(&[
        sell(3, "XYZ", dec!(10), dec!(5)),
        buy(2, "XYZ", dec!(10), dec!(3)),
        buy(1, "XYZ", dec!(10), dec!(1)),
    ]);

    assert_eq!(holdings[0].average_cost, dec!(3));
}

#[test]
fn test_same_timestamp_keeps_input_order() {
    let holdings = aggregate(&[
        buy(1, "XYZ", dec!(10), dec!(1)),
        buy(1, "XYZ", dec!(10), dec!(3)),
        sell(1, "XYZ", dec!(10), dec!(5)),
    ]);

    assert_eq!(holdings[0].quantity, dec!(10));
    assert_eq!(holdings[0].average_cost, dec!(3));
}

#[test]
fn test_results_sorted_by_ticker() {
    let holdings = aggregate(&[
        buy(1, "TSLA", dec!(1), dec!(200)),
        buy(1, "AAPL", dec!(1), dec!(150)),
        buy(1, "MSFT", dec!(1), dec!(300)),
    ]);

    let tickers: Vec<&str> = holdings.iter().map(|h| h.ticker.as_str()).collect();
    assert_eq!(tickers, vec!["AAPL", "MSFT", "TSLA"]);
}

#[test]
fn test_non_trade_kinds_do_not_move_lots() {
    let mut dividend = tx(2, TransactionKind::Dividend, "AAPL", dec!(0), dec!(0));
    dividend.amount = dec!(12);
    let holdings = aggregate(&[
        buy(1, "AAPL", dec!(10), dec!(100)),
        dividend,
        tx(3, TransactionKind::Deposit, "AAPL", dec!(5), dec!(0)),
    ]);

    assert_eq!(holdings[0].quantity, dec!(10));
    assert_eq!(holdings[0].average_cost, dec!(100));
}

#[test]
fn test_only_non_trade_kinds_produce_no_holding() {
    let holdings = aggregate(&[tx(1, TransactionKind::Deposit, "USDC", dec!(100), dec!(1))]);

    assert!(holdings.is_empty());
}

#[test]
fn test_name_and_type_come_from_latest_transaction() {
    let mut first = buy(1, "BTC", dec!(1), dec!(20000));
    first.security_name = "Bitcoin (old)".to_string();
    let mut last = buy(2, "BTC", dec!(1), dec!(30000));
    last.security_name = "Bitcoin".to_string();
    last.asset_type = Some(AssetType::Crypto);

    let holdings = aggregate(&[last, first]);

    assert_eq!(holdings[0].security_name, "Bitcoin");
    assert_eq!(holdings[0].asset_type, Some(AssetType::Crypto));
}

#[test]
fn test_aggregation_is_idempotent() {
    let transactions = vec![
        buy(1, "AAPL", dec!(10), dec!(100)),
        sell(2, "AAPL", dec!(4), dec!(110)),
        sell(3, "TSLA", dec!(2), dec!(250)),
    ];

    assert_eq!(aggregate(&transactions), aggregate(&transactions));
}

#[test]
fn test_overflowing_cost_basis_is_an_error() {
    let result = aggregate_holdings(&[buy(1, "XYZ", Decimal::MAX, Decimal::MAX)]);

    assert!(result.is_err());
}

#[test]
fn test_empty_input() {
    assert!(aggregate(&[]).is_empty());
}
