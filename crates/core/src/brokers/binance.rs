//! Binance spot trade history.
//!
//! Symbols are combined pairs (`BTCUSDT`) and numeric cells may carry a unit
//! suffix (`0.5BTC`, `10000USDT`). All trades are tagged as crypto.

use super::columns::{cell, optional_cell, ColumnSpec, HeaderIndex};
use super::values::{parse_decimal, strip_quote_suffix, strip_unit_suffix};
use super::{
    ensure_transactions, occurred_at, trade_amount, Broker, NormalizedTransactions, RowResult,
};
use super::{Transaction, TransactionKind};
use crate::assets::AssetType;
use crate::errors::Result;

const BROKER: Broker = Broker::Binance;

const DATE: ColumnSpec = ColumnSpec::new("date", &["date(utc)", "date", "time"]);
const PAIR: ColumnSpec = ColumnSpec::new("pair", &["pair", "market", "symbol"]);
const SIDE: ColumnSpec = ColumnSpec::new("side", &["side", "type"]);
const PRICE: ColumnSpec = ColumnSpec::new("price", &["price"]);
const QUANTITY: ColumnSpec =
    ColumnSpec::new("quantity", &["executed", "filled", "quantity", "qty"]).excluding(&["quote"]);
const TOTAL: ColumnSpec = ColumnSpec::new("total", &["amount", "total", "quote quantity"]);
const FEE: ColumnSpec = ColumnSpec::new("fee", &["fee"]).excluding(&["coin", "asset"]);

struct Columns {
    date: Option<usize>,
    pair: usize,
    side: usize,
    price: usize,
    quantity: usize,
    total: Option<usize>,
    fee: Option<usize>,
}

impl Columns {
    fn resolve(index: &HeaderIndex) -> Result<Self> {
        Ok(Self {
            date: index.find(&DATE),
            pair: index.require(BROKER, &PAIR)?,
            side: index.require(BROKER, &SIDE)?,
            price: index.require(BROKER, &PRICE)?,
            quantity: index.require(BROKER, &QUANTITY)?,
            total: index.find(&TOTAL),
            fee: index.find(&FEE),
        })
    }

    fn parse_row(&self, row: &[String], row_number: usize) -> RowResult<Transaction> {
        let side = cell(row, self.side).to_lowercase();
        let kind = match side.as_str() {
            s if s.contains("buy") => TransactionKind::Buy,
            s if s.contains("sell") => TransactionKind::Sell,
            _ => return Err(format!("unrecognized side '{}'", cell(row, self.side))),
        };

        let ticker = strip_quote_suffix(cell(row, self.pair));
        if ticker.is_empty() {
            return Err("missing pair".to_string());
        }

        let number = |idx: usize| parse_decimal(strip_unit_suffix(cell(row, idx)));
        let quantity = number(self.quantity)
            .ok_or_else(|| format!("invalid quantity '{}'", cell(row, self.quantity)))?
            .abs();
        let price = number(self.price)
            .ok_or_else(|| format!("invalid price '{}'", cell(row, self.price)))?
            .abs();
        let amount = match self.total.and_then(number) {
            Some(total) => total.abs(),
            None => trade_amount(quantity, price)?,
        };
        let fees = self.fee.and_then(number).map(|f| f.abs());

        Ok(Transaction {
            occurred_at: occurred_at(optional_cell(row, self.date), BROKER, row_number),
            kind,
            security_name: ticker.clone(),
            ticker,
            quantity,
            price,
            amount,
            fees,
            asset_type: Some(AssetType::Crypto),
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
