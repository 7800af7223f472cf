//! Interactive Brokers activity statement.
//!
//! Statements are sectioned: a row whose first cell is `Trades` opens a trade
//! table and the row right after it is that table's header. A row starting
//! with `Total`, `Summary` or `Notes` closes the table. Anything outside an
//! open table is ignored. Files without any `Trades` marker are read as one
//! flat table.
//!
//! Native statements repeat the section name in the first cell of every row:
//! `Trades,Header,...` carries the columns and `Trades,Data,...` the records.
//! Only data rows discriminated as `Order` (or without a discriminator) are
//! trades; subtotal and total rows are skipped.
//!
//! There is no side column; the sign of the quantity decides buy vs. sell.

use super::broker_constants::{
    IBKR_DATA_ROW, IBKR_HEADER_ROW, IBKR_ORDER_DISCRIMINATOR, IBKR_SECTION_TERMINATORS,
    IBKR_TRADES_MARKER,
};
use super::columns::{cell, optional_cell, ColumnSpec, HeaderIndex};
use super::values::{normalize_ticker, parse_decimal};
use super::{
    ensure_transactions, occurred_at, trade_amount, Broker, NormalizedTransactions, RowResult,
};
use super::{Transaction, TransactionKind};
use crate::assets::AssetType;
use crate::errors::Result;

const BROKER: Broker = Broker::InteractiveBrokers;

const SYMBOL: ColumnSpec = ColumnSpec::new("symbol", &["symbol", "ticker"]);
const QUANTITY: ColumnSpec = ColumnSpec::new("quantity", &["quantity", "qty"]);
const PRICE: ColumnSpec =
    ColumnSpec::new("price", &["t. price", "trade price", "price"]).excluding(&["c. price", "close"]);
const DATE: ColumnSpec = ColumnSpec::new("date", &["date/time", "trade date", "date"]);
const PROCEEDS: ColumnSpec = ColumnSpec::new("proceeds", &["proceeds", "amount"]);
const FEE: ColumnSpec = ColumnSpec::new("fee", &["comm/fee", "commission", "fee"]);
const ASSET_CATEGORY: ColumnSpec =
    ColumnSpec::new("asset category", &["asset category", "asset class"]);
const DESCRIPTION: ColumnSpec = ColumnSpec::new("description", &["description"]);
const DISCRIMINATOR: ColumnSpec = ColumnSpec::new("discriminator", &["datadiscriminator"]);

struct Columns {
    symbol: usize,
    quantity: usize,
    price: usize,
    date: Option<usize>,
    proceeds: Option<usize>,
    fee: Option<usize>,
    asset_category: Option<usize>,
    description: Option<usize>,
    discriminator: Option<usize>,
}

impl Columns {
    fn resolve(header: &[String]) -> Result<Self> {
        let index = HeaderIndex::new(header);
        Ok(Self {
            symbol: index.require(BROKER, &SYMBOL)?,
            quantity: index.require(BROKER, &QUANTITY)?,
            price: index.require(BROKER, &PRICE)?,
            date: index.find(&DATE),
            proceeds: index.find(&PROCEEDS),
            fee: index.find(&FEE),
            asset_category: index.find(&ASSET_CATEGORY),
            description: index.find(&DESCRIPTION),
            discriminator: index.find(&DISCRIMINATOR),
        })
    }

    fn is_order(&self, row: &[String]) -> bool {
        optional_cell(row, self.discriminator)
            .map_or(true, |value| value.eq_ignore_ascii_case(IBKR_ORDER_DISCRIMINATOR))
    }

    fn parse_row(&self, row: &[String], row_number: usize) -> RowResult<Transaction> {
        let ticker = normalize_ticker(cell(row, self.symbol));
        if ticker.is_empty() {
            return Err("missing symbol".to_string());
        }

        let signed_quantity = parse_decimal(cell(row, self.quantity))
            .ok_or_else(|| format!("invalid quantity '{}'", cell(row, self.quantity)))?;
        if signed_quantity.is_zero() {
            return Err("zero quantity".to_string());
        }
        let kind = if signed_quantity.is_sign_negative() {
            TransactionKind::Sell
        } else {
            TransactionKind::Buy
        };
        let quantity = signed_quantity.abs();

        let price = parse_decimal(cell(row, self.price))
            .ok_or_else(|| format!("invalid price '{}'", cell(row, self.price)))?
            .abs();
        let amount = match optional_cell(row, self.proceeds).and_then(parse_decimal) {
            Some(proceeds) => proceeds.abs(),
            None => trade_amount(quantity, price)?,
        };
        let fees = optional_cell(row, self.fee)
            .and_then(parse_decimal)
            .map(|f| f.abs());

        Ok(Transaction {
            occurred_at: occurred_at(optional_cell(row, self.date), BROKER, row_number),
            kind,
            security_name: optional_cell(row, self.description)
                .map(str::to_string)
                .unwrap_or_else(|| ticker.clone()),
            ticker,
            quantity,
            price,
            amount,
            fees,
            asset_type: optional_cell(row, self.asset_category).and_then(AssetType::from_label),
        })
    }
}

fn first_cell(row: &[String]) -> &str {
    row.first().map(|c| c.trim()).unwrap_or("")
}

fn is_trades_marker(row: &[String]) -> bool {
    first_cell(row).eq_ignore_ascii_case(IBKR_TRADES_MARKER)
        && row.iter().skip(1).all(|c| c.trim().is_empty())
}

/// Row type of a native `Trades` row (`header`, `data`, `subtotal`, ...).
fn native_row_type(row: &[String]) -> Option<&str> {
    if !first_cell(row).eq_ignore_ascii_case(IBKR_TRADES_MARKER) {
        return None;
    }
    row.get(1).map(|c| c.trim())
}

fn is_native_header(row: &[String]) -> bool {
    native_row_type(row).is_some_and(|kind| kind.eq_ignore_ascii_case(IBKR_HEADER_ROW))
}

fn is_section_end(row: &[String]) -> bool {
    let first = first_cell(row).to_lowercase();
    IBKR_SECTION_TERMINATORS
        .iter()
        .any(|terminator| first.starts_with(terminator))
}

pub(crate) fn normalize(rows: &[Vec<String>]) -> Result<NormalizedTransactions> {
    let mut result = NormalizedTransactions::default();

    if rows.iter().any(|row| is_native_header(row)) {
        normalize_native(rows, &mut result)?;
    } else if rows.iter().any(|row| is_trades_marker(row)) {
        normalize_sections(rows, &mut result)?;
    } else if let Some((header, data)) = rows.split_first() {
        let columns = Columns::resolve(header)?;
        for (offset, row) in data.iter().enumerate() {
            parse_into(&columns, row, offset + 2, &mut result);
        }
    }

    ensure_transactions(BROKER, result)
}

enum SectionState {
    Closed,
    AwaitingHeader,
    Open(Columns),
}

fn normalize_sections(rows: &[Vec<String>], result: &mut NormalizedTransactions) -> Result<()> {
    let mut state = SectionState::Closed;

    for (idx, row) in rows.iter().enumerate() {
        let row_number = idx + 1;

        if is_trades_marker(row) {
            state = SectionState::AwaitingHeader;
            continue;
        }

        state = match state {
            SectionState::Closed => SectionState::Closed,
            SectionState::AwaitingHeader => SectionState::Open(Columns::resolve(row)?),
            SectionState::Open(columns) => {
                if is_section_end(row) {
                    SectionState::Closed
                } else {
                    parse_into(&columns, row, row_number, result);
                    SectionState::Open(columns)
                }
            }
        };
    }

    Ok(())
}

fn normalize_native(rows: &[Vec<String>], result: &mut NormalizedTransactions) -> Result<()> {
    let mut columns: Option<Columns> = None;

    for (idx, row) in rows.iter().enumerate() {
        let Some(row_type) = native_row_type(row) else {
            continue;
        };
        let cells = row.get(2..).unwrap_or_default();

        if row_type.eq_ignore_ascii_case(IBKR_HEADER_ROW) {
            columns = Some(Columns::resolve(cells)?);
        } else if row_type.eq_ignore_ascii_case(IBKR_DATA_ROW) {
            match &columns {
                Some(columns) if columns.is_order(cells) => {
                    parse_into(columns, cells, idx + 1, result)
                }
                Some(_) => {}
                None => {
                    result.rows_read += 1;
                    result.skip(idx + 1, "trade row before its header".to_string());
                }
            }
        }
    }

    Ok(())
}

fn parse_into(
    columns: &Columns,
    row: &[String],
    row_number: usize,
    result: &mut NormalizedTransactions,
) {
    result.rows_read += 1;
    match columns.parse_row(row, row_number) {
        Ok(transaction) => result.transactions.push(transaction),
        Err(reason) => result.skip(row_number, reason),
    }
}
