//! Database models for holdings.

use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use tallyfolio_core::assets::AssetType;
use tallyfolio_core::holdings::{Holding, NewHolding, PositionDirection};

use crate::errors::StorageError;

/// Database model for holdings. Decimal columns are stored as text.
#[derive(Queryable, Identifiable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::holdings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct HoldingDB {
    pub id: String,
    pub user_id: String,
    pub ticker: String,
    pub security_name: String,
    pub quantity: String,
    pub position_direction: String,
    pub average_cost: String,
    pub total_cost_basis: String,
    pub asset_type: String,
    pub broker_source: String,
    pub batch_id: String,
    pub opened_at: Option<NaiveDateTime>,
    pub imported_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::holdings)]
pub struct NewHoldingDB {
    pub id: String,
    pub user_id: String,
    pub ticker: String,
    pub security_name: String,
    pub quantity: String,
    pub position_direction: String,
    pub average_cost: String,
    pub total_cost_basis: String,
    pub asset_type: String,
    pub broker_source: String,
    pub batch_id: String,
    pub opened_at: Option<NaiveDateTime>,
    pub imported_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

fn parse_decimal(column: &str, raw: &str) -> Result<Decimal, StorageError> {
    Decimal::from_str(raw)
        .map_err(|e| StorageError::InvalidValue(format!("{} '{}': {}", column, raw, e)))
}

impl TryFrom<HoldingDB> for Holding {
    type Error = StorageError;

    fn try_from(db: HoldingDB) -> Result<Self, Self::Error> {
        let position_direction = PositionDirection::from_str(&db.position_direction)
            .map_err(|e| StorageError::InvalidValue(e.to_string()))?;

        Ok(Self {
            quantity: parse_decimal("quantity", &db.quantity)?,
            average_cost: parse_decimal("average_cost", &db.average_cost)?,
            total_cost_basis: parse_decimal("total_cost_basis", &db.total_cost_basis)?,
            asset_type: AssetType::from_label(&db.asset_type).unwrap_or(AssetType::Other),
            position_direction,
            id: db.id,
            user_id: db.user_id,
            ticker: db.ticker,
            security_name: db.security_name,
            broker_source: db.broker_source,
            batch_id: db.batch_id,
            opened_at: db.opened_at.map(|t| t.and_utc()),
            imported_at: db.imported_at.and_utc(),
            created_at: db.created_at.and_utc(),
            updated_at: db.updated_at.and_utc(),
        })
    }
}

impl From<Holding> for HoldingDB {
    fn from(domain: Holding) -> Self {
        Self {
            id: domain.id,
            user_id: domain.user_id,
            ticker: domain.ticker,
            security_name: domain.security_name,
            quantity: domain.quantity.to_string(),
            position_direction: domain.position_direction.as_str().to_string(),
            average_cost: domain.average_cost.to_string(),
            total_cost_basis: domain.total_cost_basis.to_string(),
            asset_type: domain.asset_type.as_str().to_string(),
            broker_source: domain.broker_source,
            batch_id: domain.batch_id,
            opened_at: domain.opened_at.map(|t| t.naive_utc()),
            imported_at: domain.imported_at.naive_utc(),
            created_at: domain.created_at.naive_utc(),
            updated_at: domain.updated_at.naive_utc(),
        }
    }
}

impl From<NewHolding> for NewHoldingDB {
    fn from(domain: NewHolding) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: domain
                .id
                .unwrap_or_else(|| uuid::Uuid::now_v7().to_string()),
            user_id: domain.user_id,
            ticker: domain.ticker,
            security_name: domain.security_name,
            quantity: domain.quantity.to_string(),
            position_direction: domain.position_direction.as_str().to_string(),
            average_cost: domain.average_cost.to_string(),
            total_cost_basis: domain.total_cost_basis.to_string(),
            asset_type: domain.asset_type.as_str().to_string(),
            broker_source: domain.broker_source,
            batch_id: domain.batch_id,
            opened_at: domain.opened_at.map(|t| t.naive_utc()),
            imported_at: domain.imported_at.naive_utc(),
            created_at: now,
            updated_at: now,
        }
    }
}
