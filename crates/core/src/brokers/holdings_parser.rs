//! Pass-through parser for files that already list current positions.
//!
//! Used for `manual` uploads and for any broker's positions export. No lots are
//! tracked: each row is taken as a finished holding.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::columns::{cell, optional_cell, ColumnSpec, HeaderIndex};
use super::values::{normalize_ticker, parse_decimal, parse_timestamp};
use super::{Broker, RowResult, RowWarning};
use crate::assets::AssetType;
use crate::errors::{ImportError, Result};
use crate::holdings::{AggregatedHolding, HoldingKey, PositionDirection};

const TICKER: ColumnSpec = ColumnSpec::new("ticker", &["ticker", "symbol", "instrument"]);
const QUANTITY: ColumnSpec = ColumnSpec::new("quantity", &["quantity", "qty", "shares", "units"]);
const NAME: ColumnSpec = ColumnSpec::new("name", &["security name", "name", "description"]);
const AVERAGE_COST: ColumnSpec = ColumnSpec::new(
    "average cost",
    &["average cost", "average_cost", "avg cost", "average price", "avg price", "cost per"],
);
const TOTAL_COST: ColumnSpec = ColumnSpec::new(
    "total cost",
    &["total cost", "total_cost_basis", "cost basis", "book value"],
)
.excluding(&["per", "average", "avg"]);
const ASSET_TYPE: ColumnSpec = ColumnSpec::new(
    "asset type",
    &["asset type", "asset_type", "asset class", "category", "type"],
)
.excluding(&["direction"]);
const DIRECTION: ColumnSpec = ColumnSpec::new(
    "direction",
    &["position direction", "position_direction", "direction", "long/short", "side"],
);
const OPENED_AT: ColumnSpec =
    ColumnSpec::new("opened at", &["opened at", "opened_at", "open date", "acquired"]);

/// Holdings read from a positions file plus the rows that were skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedHoldings {
    pub holdings: Vec<AggregatedHolding>,
    pub warnings: Vec<RowWarning>,
    pub rows_read: usize,
}

struct Columns {
    ticker: usize,
    quantity: usize,
    name: Option<usize>,
    average_cost: Option<usize>,
    total_cost: Option<usize>,
    asset_type: Option<usize>,
    direction: Option<usize>,
    opened_at: Option<usize>,
}

impl Columns {
    fn resolve(broker: Broker, index: &HeaderIndex) -> Result<Self> {
        Ok(Self {
            ticker: index.require(broker, &TICKER)?,
            quantity: index.require(broker, &QUANTITY)?,
            name: index.find(&NAME),
            average_cost: index.find(&AVERAGE_COST),
            total_cost: index.find(&TOTAL_COST),
            asset_type: index.find(&ASSET_TYPE),
            direction: index.find(&DIRECTION),
            opened_at: index.find(&OPENED_AT),
        })
    }

    fn parse_row(&self, row: &[String]) -> RowResult<AggregatedHolding> {
        let ticker = normalize_ticker(cell(row, self.ticker));
        if ticker.is_empty() {
            return Err("missing ticker".to_string());
        }

        let signed_quantity = parse_decimal(cell(row, self.quantity))
            .ok_or_else(|| format!("invalid quantity '{}'", cell(row, self.quantity)))?;
        if signed_quantity.is_zero() {
            return Err("zero quantity".to_string());
        }
        let quantity = signed_quantity.abs();

        let marked_short = optional_cell(row, self.direction)
            .map(|d| d.to_lowercase().contains("short"))
            .unwrap_or(false);
        let position_direction = if marked_short || signed_quantity.is_sign_negative() {
            PositionDirection::Short
        } else {
            PositionDirection::Long
        };

        let number = |idx: Option<usize>| {
            optional_cell(row, idx)
                .and_then(parse_decimal)
                .map(|v| v.abs())
        };
        let (average_cost, total_cost_basis) =
            match (number(self.average_cost), number(self.total_cost)) {
                (Some(average), Some(total)) => (average, total),
                (Some(average), None) => (
                    average,
                    average
                        .checked_mul(quantity)
                        .ok_or_else(|| "cost basis overflow".to_string())?,
                ),
                (None, Some(total)) => (
                    total
                        .checked_div(quantity)
                        .ok_or_else(|| "average cost overflow".to_string())?,
                    total,
                ),
                (None, None) => (Decimal::ZERO, Decimal::ZERO),
            };

        Ok(AggregatedHolding {
            security_name: optional_cell(row, self.name)
                .map(str::to_string)
                .unwrap_or_else(|| ticker.clone()),
            ticker,
            quantity,
            position_direction,
            average_cost,
            total_cost_basis,
            asset_type: optional_cell(row, self.asset_type).and_then(AssetType::from_label),
            opened_at: optional_cell(row, self.opened_at).and_then(parse_timestamp),
        })
    }
}

/// Reads already-aggregated holdings from tokenized rows.
///
/// Rows repeating a ticker and direction are merged: quantities and cost
/// bases add up and the average is recomputed.
pub fn parse_holdings(broker: Broker, rows: &[Vec<String>]) -> Result<ParsedHoldings> {
    let mut result = ParsedHoldings::default();
    let Some((header, data)) = rows.split_first() else {
        return Err(ImportError::NoValidRows { broker }.into());
    };

    let columns = Columns::resolve(broker, &HeaderIndex::new(header))?;
    let mut positions: HashMap<HoldingKey, usize> = HashMap::new();

    for (offset, row) in data.iter().enumerate() {
        let row_number = offset + 2;
        result.rows_read += 1;

        let holding = match columns.parse_row(row) {
            Ok(holding) => holding,
            Err(reason) => {
                let warning = RowWarning {
                    row_number,
                    message: reason,
                };
                log::warn!("Skipping {}", warning);
                result.warnings.push(warning);
                continue;
            }
        };

        match positions.get(&holding.key()) {
            Some(&idx) => {
                if let Err(reason) = merge_into(&mut result.holdings[idx], holding) {
                    let warning = RowWarning {
                        row_number,
                        message: reason,
                    };
                    log::warn!("Skipping {}", warning);
                    result.warnings.push(warning);
                }
            }
            None => {
                positions.insert(holding.key(), result.holdings.len());
                result.holdings.push(holding);
            }
        }
    }

    if result.holdings.is_empty() {
        return Err(ImportError::NoValidRows { broker }.into());
    }
    Ok(result)
}

/// Folds a duplicate row into `existing`; on overflow `existing` is left as is.
fn merge_into(existing: &mut AggregatedHolding, other: AggregatedHolding) -> RowResult<()> {
    log::debug!(
        "Merging duplicate {} {} row into existing holding",
        other.ticker,
        other.position_direction
    );
    let overflow = || format!("merging duplicate {} row overflows", other.ticker);
    let quantity = existing
        .quantity
        .checked_add(other.quantity)
        .ok_or_else(overflow)?;
    let total_cost_basis = existing
        .total_cost_basis
        .checked_add(other.total_cost_basis)
        .ok_or_else(overflow)?;
    let average_cost = total_cost_basis
        .checked_div(quantity)
        .ok_or_else(overflow)?;

    existing.quantity = quantity;
    existing.total_cost_basis = total_cost_basis;
    existing.average_cost = average_cost;
    existing.security_name = other.security_name;
    existing.asset_type = other.asset_type.or(existing.asset_type);
    existing.opened_at = match (existing.opened_at, other.opened_at) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    };
    Ok(())
}
