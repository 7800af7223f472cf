use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::assets::AssetType;
use crate::errors::{Error, ValidationError};

/// Long (owned) or short (borrowed and sold) exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionDirection {
    Long,
    Short,
}

impl PositionDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            PositionDirection::Long => "long",
            PositionDirection::Short => "short",
        }
    }

    /// Direction implied by the sign of a net lot quantity.
    pub fn from_signed(quantity: Decimal) -> Self {
        if quantity.is_sign_negative() {
            PositionDirection::Short
        } else {
            PositionDirection::Long
        }
    }
}

impl fmt::Display for PositionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PositionDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "long" => Ok(PositionDirection::Long),
            "short" => Ok(PositionDirection::Short),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown position direction '{}'",
                other
            ))
            .into()),
        }
    }
}

/// Identity of a holding for reconciliation: one row per ticker and direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HoldingKey {
    pub ticker: String,
    pub direction: PositionDirection,
}

/// Net position for one ticker produced by an import, before persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedHolding {
    pub ticker: String,
    pub security_name: String,
    /// Absolute size of the position; direction is carried separately.
    pub quantity: Decimal,
    pub position_direction: PositionDirection,
    pub average_cost: Decimal,
    pub total_cost_basis: Decimal,
    pub asset_type: Option<AssetType>,
    /// Timestamp of the oldest lot still contributing to the position.
    pub opened_at: Option<DateTime<Utc>>,
}

impl AggregatedHolding {
    pub fn key(&self) -> HoldingKey {
        HoldingKey {
            ticker: self.ticker.clone(),
            direction: self.position_direction,
        }
    }
}

/// A persisted holding row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub id: String,
    pub user_id: String,
    pub ticker: String,
    pub security_name: String,
    pub quantity: Decimal,
    pub position_direction: PositionDirection,
    pub average_cost: Decimal,
    pub total_cost_basis: Decimal,
    pub asset_type: AssetType,
    /// Broker identifier of the import that last wrote this row.
    pub broker_source: String,
    pub batch_id: String,
    pub opened_at: Option<DateTime<Utc>>,
    pub imported_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Holding {
    pub fn key(&self) -> HoldingKey {
        HoldingKey {
            ticker: self.ticker.clone(),
            direction: self.position_direction,
        }
    }

    /// Overwrites the position figures with a fresh import and re-tags the row
    /// with the importing source.
    pub fn apply_import(&mut self, fresh: &AggregatedHolding, stamp: &ImportStamp) {
        self.security_name = fresh.security_name.clone();
        self.quantity = fresh.quantity;
        self.average_cost = fresh.average_cost;
        self.total_cost_basis = fresh.total_cost_basis;
        self.asset_type = fresh.asset_type.unwrap_or(self.asset_type);
        self.opened_at = fresh.opened_at.or(self.opened_at);
        self.broker_source = stamp.broker_source.clone();
        self.batch_id = stamp.batch_id.clone();
        self.imported_at = stamp.imported_at;
        self.updated_at = stamp.imported_at;
    }
}

/// Provenance written onto every row touched by one import batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportStamp {
    pub user_id: String,
    pub broker_source: String,
    pub batch_id: String,
    pub imported_at: DateTime<Utc>,
}

/// Input model for inserting a holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHolding {
    pub id: Option<String>,
    pub user_id: String,
    pub ticker: String,
    pub security_name: String,
    pub quantity: Decimal,
    pub position_direction: PositionDirection,
    pub average_cost: Decimal,
    pub total_cost_basis: Decimal,
    pub asset_type: AssetType,
    pub broker_source: String,
    pub batch_id: String,
    pub opened_at: Option<DateTime<Utc>>,
    pub imported_at: DateTime<Utc>,
}

impl NewHolding {
    pub fn from_aggregated(holding: &AggregatedHolding, stamp: &ImportStamp) -> Self {
        Self {
            id: None,
            user_id: stamp.user_id.clone(),
            ticker: holding.ticker.clone(),
            security_name: holding.security_name.clone(),
            quantity: holding.quantity,
            position_direction: holding.position_direction,
            average_cost: holding.average_cost,
            total_cost_basis: holding.total_cost_basis,
            asset_type: holding.asset_type.unwrap_or(AssetType::Other),
            broker_source: stamp.broker_source.clone(),
            batch_id: stamp.batch_id.clone(),
            opened_at: holding.opened_at,
            imported_at: stamp.imported_at,
        }
    }
}

/// Market valuation of one stored holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingValuation {
    pub holding_id: String,
    pub ticker: String,
    pub position_direction: PositionDirection,
    pub quantity: Decimal,
    pub average_cost: Decimal,
    pub total_cost_basis: Decimal,
    /// `None` when the price source had no quote for the ticker.
    pub price: Option<Decimal>,
    /// Position-level change since the previous close, signed for direction.
    pub day_change: Option<Decimal>,
    pub market_value: Option<Decimal>,
    pub unrealized_gain: Option<Decimal>,
    pub unrealized_gain_pct: Option<Decimal>,
}
