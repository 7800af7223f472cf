use async_trait::async_trait;

use super::{ImportPreview, ImportRequest, ImportResult};
use crate::brokers::Broker;
use crate::errors::Result;

#[async_trait]
pub trait ImportServiceTrait: Send + Sync {
    /// Computes what an import would produce without writing anything.
    fn preview(&self, request: &ImportRequest) -> Result<ImportPreview>;

    /// Runs an import and replaces the importing source's holdings.
    async fn import(&self, request: ImportRequest) -> Result<ImportResult>;

    /// Removes every holding the user has under `broker`.
    async fn clear_broker_source(&self, user_id: &str, broker: Broker) -> Result<usize>;
}
