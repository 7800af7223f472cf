//! Robinhood account activity export.
//!
//! Trades are identified by a side/type column ("Trans Code" in current
//! exports). Only buys and sells are kept; every other code is skipped.

use super::columns::{cell, optional_cell, ColumnSpec, HeaderIndex};
use super::values::{normalize_ticker, parse_decimal};
use super::{
    ensure_transactions, occurred_at, trade_amount, Broker, NormalizedTransactions, RowResult,
};
use super::{Transaction, TransactionKind};
use crate::errors::Result;

const BROKER: Broker = Broker::Robinhood;

const DATE: ColumnSpec =
    ColumnSpec::new("date", &["activity date", "trade date", "process date", "date"]);
const SIDE: ColumnSpec = ColumnSpec::new(
    "side",
    &["trans code", "transaction type", "side", "action", "type"],
);
const TICKER: ColumnSpec = ColumnSpec::new("ticker", &["instrument", "symbol", "ticker"]);
const NAME: ColumnSpec = ColumnSpec::new("name", &["description", "security name", "name"]);
const QUANTITY: ColumnSpec = ColumnSpec::new("quantity", &["quantity", "qty", "shares"]);
const PRICE: ColumnSpec = ColumnSpec::new("price", &["price"]);
const AMOUNT: ColumnSpec = ColumnSpec::new("amount", &["amount", "total", "value"]);

struct Columns {
    date: Option<usize>,
    side: usize,
    ticker: usize,
    name: Option<usize>,
    quantity: usize,
    price: usize,
    amount: Option<usize>,
}

impl Columns {
    fn resolve(index: &HeaderIndex) -> Result<Self> {
        Ok(Self {
            date: index.find(&DATE),
            side: index.require(BROKER, &SIDE)?,
            ticker: index.require(BROKER, &TICKER)?,
            name: index.find(&NAME),
            quantity: index.require(BROKER, &QUANTITY)?,
            price: index.require(BROKER, &PRICE)?,
            amount: index.find(&AMOUNT),
        })
    }

    fn parse_row(&self, row: &[String], row_number: usize) -> RowResult<Transaction> {
        let side = cell(row, self.side).to_lowercase();
        let kind = if side.contains("buy") {
            TransactionKind::Buy
        } else if side.contains("sell") {
            TransactionKind::Sell
        } else {
            return Err(format!("unrecognized side '{}'", cell(row, self.side)));
        };

        let ticker = normalize_ticker(cell(row, self.ticker));
        if ticker.is_empty() {
            return Err("missing ticker".to_string());
        }

        let quantity = parse_decimal(cell(row, self.quantity))
            .ok_or_else(|| format!("invalid quantity '{}'", cell(row, self.quantity)))?
            .abs();
        let price = parse_decimal(cell(row, self.price))
            .ok_or_else(|| format!("invalid price '{}'", cell(row, self.price)))?
            .abs();
        let amount = match optional_cell(row, self.amount).and_then(parse_decimal) {
            Some(amount) => amount.abs(),
            None => trade_amount(quantity, price)?,
        };

        let security_name = optional_cell(row, self.name)
            .map(str::to_string)
            .unwrap_or_else(|| ticker.clone());

        Ok(Transaction {
            occurred_at: occurred_at(optional_cell(row, self.date), BROKER, row_number),
            kind,
            ticker,
            security_name,
            quantity,
            price,
            amount,
            fees: None,
            asset_type: None,
        })
    }
}

pub(crate) fn normalize(rows: &[Vec<String>]) -> Result<NormalizedTransactions> {
    let mut result = NormalizedTransactions::default();
    let Some((header, data)) = rows.split_first() else {
        return ensure_transactions(BROKER, result);
    };

    let columns = Columns::resolve(&HeaderIndex::new(header))?;

    for (offset, row) in data.iter().enumerate() {
        let row_number = offset + 2;
        result.rows_read += 1;
        match columns.parse_row(row, row_number) {
            Ok(transaction) => result.transactions.push(transaction),
            Err(reason) => result.skip(row_number, reason),
        }
    }

    ensure_transactions(BROKER, result)
}
