use async_trait::async_trait;

use super::{Holding, NewHolding};
use crate::errors::Result;
use crate::imports::{AppliedPlan, ReconciliationPlan};

/// Persistence boundary for holdings.
#[async_trait]
pub trait HoldingRepositoryTrait: Send + Sync {
    /// All holdings of a user, any broker source.
    fn get_holdings(&self, user_id: &str) -> Result<Vec<Holding>>;

    async fn insert_holdings(&self, holdings: Vec<NewHolding>) -> Result<Vec<Holding>>;

    /// Replaces rows matched by id with the given values.
    async fn update_holdings(&self, holdings: Vec<Holding>) -> Result<Vec<Holding>>;

    /// Deletes the given ids of one user, returning the number of rows removed.
    async fn delete_holdings(&self, user_id: &str, holding_ids: Vec<String>) -> Result<usize>;

    /// Writes removals, updates and inserts of `plan` for one user as a single
    /// unit. Either every write lands or none does.
    async fn apply_plan(&self, user_id: &str, plan: ReconciliationPlan) -> Result<AppliedPlan>;

    async fn delete_holdings_by_source(&self, user_id: &str, broker_source: &str)
        -> Result<usize>;
}
