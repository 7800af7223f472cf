use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;
use tallyfolio_core::errors::{DatabaseError, Error, Result};
use tallyfolio_core::holdings::{Holding, HoldingRepositoryTrait, NewHolding};
use tallyfolio_core::imports::{AppliedPlan, ReconciliationPlan};

use super::model::{HoldingDB, NewHoldingDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::holdings;
use crate::schema::holdings::dsl::*;

pub struct HoldingRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

fn to_domain(rows: Vec<HoldingDB>) -> Result<Vec<Holding>> {
    rows.into_iter()
        .map(|row| Holding::try_from(row).map_err(Error::from))
        .collect()
}

impl HoldingRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        HoldingRepository { pool, writer }
    }

    pub fn get_holdings_impl(&self, owner: &str) -> Result<Vec<Holding>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = holdings
            .filter(user_id.eq(owner))
            .order((ticker.asc(), position_direction.asc()))
            .select(HoldingDB::as_select())
            .load::<HoldingDB>(&mut conn)
            .map_err(StorageError::from)?;
        to_domain(rows)
    }

    fn insert_impl(conn: &mut SqliteConnection, rows: Vec<NewHolding>) -> Result<Vec<Holding>> {
        let mut inserted = Vec::with_capacity(rows.len());
        for row in rows {
            let row_db: NewHoldingDB = row.into();
            let stored = diesel::insert_into(holdings::table)
                .values(&row_db)
                .returning(HoldingDB::as_returning())
                .get_result(conn)
                .map_err(StorageError::from)?;
            inserted.push(stored);
        }
        to_domain(inserted)
    }

    fn update_impl(conn: &mut SqliteConnection, rows: Vec<Holding>) -> Result<Vec<Holding>> {
        let mut updated = Vec::with_capacity(rows.len());
        for row in rows {
            let row_id = row.id.clone();
            let row_db: HoldingDB = row.into();
            let stored = diesel::update(holdings.find(&row_id))
                .set(&row_db)
                .returning(HoldingDB::as_returning())
                .get_result(conn)
                .optional()
                .map_err(StorageError::from)?
                .ok_or_else(|| DatabaseError::NotFound(format!("Holding {}", row_id)))?;
            updated.push(stored);
        }
        to_domain(updated)
    }

    fn delete_impl(
        conn: &mut SqliteConnection,
        owner: &str,
        holding_ids: &[String],
    ) -> Result<usize> {
        if holding_ids.is_empty() {
            return Ok(0);
        }
        let removed = diesel::delete(
            holdings
                .filter(user_id.eq(owner))
                .filter(id.eq_any(holding_ids)),
        )
        .execute(conn)
        .map_err(StorageError::from)?;
        debug!("Deleted {} holdings for user {}", removed, owner);
        Ok(removed)
    }
}

#[async_trait]
impl HoldingRepositoryTrait for HoldingRepository {
    fn get_holdings(&self, owner: &str) -> Result<Vec<Holding>> {
        self.get_holdings_impl(owner)
    }

    async fn insert_holdings(&self, rows: Vec<NewHolding>) -> Result<Vec<Holding>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        self.writer
            .exec(move |conn: &mut SqliteConnection| Self::insert_impl(conn, rows))
            .await
    }

    async fn update_holdings(&self, rows: Vec<Holding>) -> Result<Vec<Holding>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        self.writer
            .exec(move |conn: &mut SqliteConnection| Self::update_impl(conn, rows))
            .await
    }

    async fn delete_holdings(&self, owner: &str, holding_ids: Vec<String>) -> Result<usize> {
        if holding_ids.is_empty() {
            return Ok(0);
        }
        let owner = owner.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| {
                Self::delete_impl(conn, &owner, &holding_ids)
            })
            .await
    }

    async fn apply_plan(&self, owner: &str, plan: ReconciliationPlan) -> Result<AppliedPlan> {
        let owner = owner.to_string();
        // One writer job, so one immediate transaction for the whole plan.
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<AppliedPlan> {
                let removed = Self::delete_impl(conn, &owner, &plan.removals)?;
                let updated = Self::update_impl(conn, plan.updates)?;
                let inserted = Self::insert_impl(conn, plan.inserts)?;
                debug!(
                    "Applied plan for user {}: {} removed, {} updated, {} inserted",
                    owner,
                    removed,
                    updated.len(),
                    inserted.len()
                );
                Ok(AppliedPlan {
                    removed,
                    updated,
                    inserted,
                })
            })
            .await
    }

    async fn delete_holdings_by_source(&self, owner: &str, source: &str) -> Result<usize> {
        let owner = owner.to_string();
        let source = source.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let removed = diesel::delete(
                    holdings
                        .filter(user_id.eq(&owner))
                        .filter(broker_source.eq(&source)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                debug!(
                    "Deleted {} '{}' holdings for user {}",
                    removed, source, owner
                );
                Ok(removed)
            })
            .await
    }
}
