//! Coinbase transaction history report.
//!
//! Spot price is often blank for sends, conversions and some sells; the unit
//! price is then derived from the subtotal (or total) divided by quantity.
//! Every transaction is tagged as crypto.

use rust_decimal::Decimal;

use super::columns::{cell, optional_cell, ColumnSpec, HeaderIndex};
use super::values::{normalize_ticker, parse_decimal};
use super::{
    ensure_transactions, occurred_at, trade_amount, Broker, NormalizedTransactions, RowResult,
};
use super::{Transaction, TransactionKind};
use crate::assets::AssetType;
use crate::errors::{ImportError, Result};

const BROKER: Broker = Broker::Coinbase;

const TIMESTAMP: ColumnSpec = ColumnSpec::new("timestamp", &["timestamp", "date", "time"]);
const SIDE: ColumnSpec = ColumnSpec::new("side", &["transaction type", "type", "side"]);
const ASSET: ColumnSpec = ColumnSpec::new("asset", &["asset", "symbol", "ticker", "product"]);
const QUANTITY: ColumnSpec = ColumnSpec::new(
    "quantity",
    &["quantity transacted", "quantity", "amount", "size"],
);
const SPOT_PRICE: ColumnSpec = ColumnSpec::new(
    "price",
    &["spot price at transaction", "price at transaction", "spot price", "price"],
)
.excluding(&["currency"]);
const SUBTOTAL: ColumnSpec = ColumnSpec::new("subtotal", &["subtotal"]);
const TOTAL: ColumnSpec = ColumnSpec::new("total", &["total"]).excluding(&["subtotal"]);
const FEES: ColumnSpec =
    ColumnSpec::new("fees", &["fees and/or spread", "fees", "fee"]).excluding(&["total"]);

struct Columns {
    timestamp: Option<usize>,
    side: usize,
    asset: usize,
    quantity: usize,
    spot_price: Option<usize>,
    subtotal: Option<usize>,
    total: Option<usize>,
    fees: Option<usize>,
}

impl Columns {
    fn resolve(index: &HeaderIndex) -> Result<Self> {
        let columns = Self {
            timestamp: index.find(&TIMESTAMP),
            side: index.require(BROKER, &SIDE)?,
            asset: index.require(BROKER, &ASSET)?,
            quantity: index.require(BROKER, &QUANTITY)?,
            spot_price: index.find(&SPOT_PRICE),
            subtotal: index.find(&SUBTOTAL),
            total: index.find(&TOTAL),
            fees: index.find(&FEES),
        };

        if columns.spot_price.is_none() && columns.subtotal.is_none() && columns.total.is_none() {
            return Err(ImportError::MissingColumn {
                broker: BROKER,
                column: SPOT_PRICE.name.to_string(),
            }
            .into());
        }

        Ok(columns)
    }

    fn parse_row(&self, row: &[String], row_number: usize) -> RowResult<Transaction> {
        let kind = transaction_kind(cell(row, self.side))
            .ok_or_else(|| format!("unrecognized transaction type '{}'", cell(row, self.side)))?;

        let ticker = normalize_ticker(cell(row, self.asset));
        if ticker.is_empty() {
            return Err("missing asset".to_string());
        }

        let quantity = parse_decimal(cell(row, self.quantity))
            .ok_or_else(|| format!("invalid quantity '{}'", cell(row, self.quantity)))?
            .abs();

        let number = |idx: Option<usize>| {
            optional_cell(row, idx)
                .and_then(parse_decimal)
                .map(|v| v.abs())
        };
        let subtotal = number(self.subtotal);
        let total = number(self.total);

        let spot = number(self.spot_price).filter(|p| !p.is_zero());
        let derived = match subtotal.or(total) {
            Some(value) if !quantity.is_zero() => Some(
                value
                    .checked_div(quantity)
                    .ok_or_else(|| format!("price overflow dividing {} by {}", value, quantity))?,
            ),
            _ => None,
        };
        let price = match spot.or(derived) {
            Some(price) => price,
            // Non-trade rows are kept for the record even without a price.
            None if !kind.is_trade() => Decimal::ZERO,
            None => return Err("no spot price and no total to derive one".to_string()),
        };

        Ok(Transaction {
            occurred_at: occurred_at(optional_cell(row, self.timestamp), BROKER, row_number),
            kind,
            security_name: ticker.clone(),
            ticker,
            quantity,
            price,
            amount: match total.or(subtotal) {
                Some(amount) => amount,
                None => trade_amount(quantity, price)?,
            },
            fees: number(self.fees),
            asset_type: Some(AssetType::Crypto),
        })
    }
}

/// Maps Coinbase's transaction type labels onto canonical kinds.
fn transaction_kind(raw: &str) -> Option<TransactionKind> {
    let label = raw.to_lowercase();
    let has = |terms: &[&str]| terms.iter().any(|term| label.contains(term));

    if has(&["buy"]) {
        Some(TransactionKind::Buy)
    } else if has(&["sell"]) {
        Some(TransactionKind::Sell)
    } else if has(&["deposit", "receive"]) {
        Some(TransactionKind::Deposit)
    } else if has(&["withdraw", "send"]) {
        Some(TransactionKind::Withdrawal)
    } else if has(&["reward", "income", "staking", "interest", "earn"]) {
        Some(TransactionKind::Dividend)
    } else if has(&["fee"]) {
        Some(TransactionKind::Fee)
    } else {
        None
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imports::{tokenize, ImportConfig};
    use rust_decimal_macros::dec;

    fn parse(content: &str) -> Result<NormalizedTransactions> {
        normalize(&tokenize(content, &ImportConfig::default()))
    }

    #[test]
    fn test_price_derived_from_total_when_spot_missing() {
        let result = parse(
            "Transaction Type,Asset,Quantity Transacted,Spot Price at Transaction,Total\n\
             Buy,BTC,0.5,20000,10000\n\
             Sell,BTC,0.2,,5000",
        )
        .unwrap();

        assert_eq!(result.transactions.len(), 2);
        let sell = &result.transactions[1];
        assert_eq!(sell.kind, TransactionKind::Sell);
        assert_eq!(sell.price, dec!(25000));
        assert_eq!(sell.amount, dec!(5000));
        assert!(result
            .transactions
            .iter()
            .all(|t| t.asset_type == Some(AssetType::Crypto)));
    }

    #[test]
    fn test_zero_spot_price_is_treated_as_missing() {
        let result = parse(
            "Transaction Type,Asset,Quantity Transacted,Spot Price at Transaction,Total\n\
             Buy,ETH,2,0,4000",
        )
        .unwrap();

        assert_eq!(result.transactions[0].price, dec!(2000));
    }

    #[test]
    fn test_full_report_layout() {
        let result = parse(
            "Timestamp,Transaction Type,Asset,Quantity Transacted,Spot Price Currency,Spot Price at Transaction,Subtotal,Total (inclusive of fees and/or spread),Fees and/or Spread,Notes\n\
             2024-01-05T14:30:00Z,Buy,SOL,10,USD,100.00,$1000.00,$1014.90,$14.90,Bought 10 SOL\n\
             2024-01-06T09:00:00Z,Staking Income,SOL,0.01,USD,101.00,$1.01,$1.01,$0.00,\n\
             2024-01-07T09:00:00Z,Send,SOL,1,USD,,,,,\n\
             2024-01-08T09:00:00Z,Convert,SOL,1,USD,105.00,$105.00,$105.00,$0.00,",
        )
        .unwrap();

        let kinds: Vec<TransactionKind> = result.transactions.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TransactionKind::Buy,
                TransactionKind::Dividend,
                TransactionKind::Withdrawal
            ]
        );

        let buy = &result.transactions[0];
        assert_eq!(buy.price, dec!(100));
        assert_eq!(buy.amount, dec!(1014.90));
        assert_eq!(buy.fees, Some(dec!(14.90)));
        assert_eq!(result.transactions[2].price, Decimal::ZERO);

        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].row_number, 5);
    }

    #[test]
    fn test_trade_without_any_price_is_skipped() {
        let result = parse(
            "Transaction Type,Asset,Quantity Transacted,Spot Price at Transaction,Total\n\
             Buy,BTC,1,,\n\
             Buy,BTC,1,30000,30000",
        )
        .unwrap();

        assert_eq!(result.transactions.len(), 1);
        assert_eq!(result.warnings[0].row_number, 2);
    }

    #[test]
    fn test_missing_price_and_total_columns_fails() {
        let err = parse("Transaction Type,Asset,Quantity Transacted\nBuy,BTC,1").unwrap_err();

        assert_eq!(
            err.as_import_error(),
            Some(&ImportError::MissingColumn {
                broker: Broker::Coinbase,
                column: "price".to_string(),
            })
        );
    }

    #[test]
    fn test_transaction_kind_labels() {
        assert_eq!(transaction_kind("Advanced Trade Buy"), Some(TransactionKind::Buy));
        assert_eq!(transaction_kind("Receive"), Some(TransactionKind::Deposit));
        assert_eq!(transaction_kind("Withdrawal"), Some(TransactionKind::Withdrawal));
        assert_eq!(transaction_kind("Rewards Income"), Some(TransactionKind::Dividend));
        assert_eq!(transaction_kind("Convert"), None);
    }
}
