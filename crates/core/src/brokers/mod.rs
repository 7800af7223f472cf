//! Broker export normalizers.
//!
//! Each supported broker has one fixed normalizer that maps its column layout
//! onto canonical [`Transaction`]s. The caller always names the broker; there
//! is no format sniffing.

mod binance;
pub(crate) mod broker_constants;
mod broker_model;
mod coinbase;
pub(crate) mod columns;
mod holdings_parser;
mod interactive_brokers;
mod robinhood;
pub(crate) mod values;

pub use broker_model::{Broker, NormalizedTransactions, RowWarning, Transaction, TransactionKind};
pub use holdings_parser::{parse_holdings, ParsedHoldings};
pub use values::{normalize_ticker, strip_quote_suffix};

use chrono::{DateTime, Utc};
use log::debug;
use rust_decimal::Decimal;

use crate::errors::{ImportError, Result};
use crate::imports::ImportMode;

/// Outcome of parsing a single data row; the error is the skip reason.
pub(crate) type RowResult<T> = std::result::Result<T, String>;

/// Maps tokenized rows from `broker` onto canonical transactions.
///
/// Structural problems (missing columns, nothing usable) are errors. Rows that
/// cannot be parsed are skipped and reported in the returned warnings.
pub fn normalize_transactions(
    broker: Broker,
    rows: &[Vec<String>],
) -> Result<NormalizedTransactions> {
    let normalized = match broker {
        Broker::Robinhood => robinhood::normalize(rows)?,
        Broker::InteractiveBrokers => interactive_brokers::normalize(rows)?,
        Broker::Coinbase => coinbase::normalize(rows)?,
        Broker::Binance => binance::normalize(rows)?,
        Broker::Manual => {
            return Err(ImportError::UnsupportedBroker {
                broker,
                mode: ImportMode::Transactions,
            }
            .into())
        }
    };

    debug!(
        "Normalized {} transactions from {} rows of {} export ({} skipped)",
        normalized.transactions.len(),
        normalized.rows_read,
        broker,
        normalized.warnings.len()
    );
    Ok(normalized)
}

/// `quantity * price`, or a skip reason when the product does not fit.
pub(crate) fn trade_amount(quantity: Decimal, price: Decimal) -> RowResult<Decimal> {
    quantity
        .checked_mul(price)
        .ok_or_else(|| format!("amount overflow for {} at {}", quantity, price))
}

/// Resolves a row's timestamp, falling back to the undated placeholder.
pub(crate) fn occurred_at(raw: Option<&str>, broker: Broker, row_number: usize) -> DateTime<Utc> {
    match raw {
        None => values::undated(),
        Some(value) => values::parse_timestamp(value).unwrap_or_else(|| {
            debug!(
                "{} row {}: unrecognized date '{}', treating as undated",
                broker, row_number, value
            );
            values::undated()
        }),
    }
}

/// Fails with `NoValidRows` when nothing survived normalization.
pub(crate) fn ensure_transactions(
    broker: Broker,
    result: NormalizedTransactions,
) -> Result<NormalizedTransactions> {
    if result.transactions.is_empty() {
        return Err(ImportError::NoValidRows { broker }.into());
    }
    Ok(result)
}
