//! FIFO lot aggregation from canonical transactions to net holdings.

use log::debug;
use std::collections::BTreeMap;

use super::{AggregatedHolding, LotBook};
use crate::brokers::{Transaction, TransactionKind};
use crate::errors::Result;

#[derive(Default)]
struct TickerState<'a> {
    book: LotBook,
    latest: Option<&'a Transaction>,
}

/// Folds `transactions` into one holding per ticker with open exposure.
///
/// Transactions are replayed oldest first; ties keep their input order. Only
/// buys and sells move lots, but every kind counts as the ticker's latest
/// transaction for the name and asset type. Tickers that net to zero produce
/// no holding. The result is sorted by ticker.
///
/// Fails only when lot arithmetic overflows.
pub fn aggregate_holdings(transactions: &[Transaction]) -> Result<Vec<AggregatedHolding>> {
    let mut ordered: Vec<&Transaction> = transactions.iter().collect();
    ordered.sort_by_key(|transaction| transaction.occurred_at);

    let mut tickers: BTreeMap<&str, TickerState> = BTreeMap::new();

    for transaction in ordered {
        let state = tickers.entry(transaction.ticker.as_str()).or_default();
        state.latest = Some(transaction);

        let signed_quantity = match transaction.kind {
            TransactionKind::Buy => transaction.quantity,
            TransactionKind::Sell => -transaction.quantity,
            _ => continue,
        };

        let opened = state
            .book
            .apply(signed_quantity, transaction.price, transaction.occurred_at)?;
        if opened.is_sign_negative() && !opened.is_zero() {
            debug!(
                "Sell of {} {} exceeded open lots; opened short lot of {}",
                transaction.quantity,
                transaction.ticker,
                opened.abs()
            );
        }
    }

    let mut holdings = Vec::with_capacity(tickers.len());
    for (ticker, state) in tickers {
        let (Some(summary), Some(latest)) = (state.book.summarize()?, state.latest) else {
            continue;
        };
        holdings.push(AggregatedHolding {
            ticker: ticker.to_string(),
            security_name: if latest.security_name.trim().is_empty() {
                ticker.to_string()
            } else {
                latest.security_name.clone()
            },
            quantity: summary.quantity,
            position_direction: summary.direction,
            average_cost: summary.average_cost,
            total_cost_basis: summary.total_cost_basis,
            asset_type: latest.asset_type,
            opened_at: Some(summary.opened_at),
        });
    }

    Ok(holdings)
}
