use async_trait::async_trait;
use log::{debug, error, info};
use std::sync::Arc;

use super::reconciliation::reconcile;
use super::row_tokenizer::tokenize;
use super::{
    AppliedPlan, ComputedHoldings, ImportBatch, ImportBatchStatus, ImportConfig, ImportMode, ImportPreview,
    ImportRequest, ImportResult, ImportServiceTrait,
};
use crate::assets::resolve_asset_type;
use crate::brokers::{normalize_transactions, parse_holdings, Broker};
use crate::errors::{ImportError, Result};
use crate::holdings::{aggregate_holdings, HoldingRepositoryTrait, ImportStamp};

/// Runs the pure part of an import: tokenize, normalize, aggregate and fill in
/// missing asset types.
pub fn compute_holdings(
    broker: Broker,
    mode: ImportMode,
    content: &str,
    config: &ImportConfig,
) -> Result<ComputedHoldings> {
    let rows = tokenize(content, config);
    if rows.is_empty() {
        return Err(ImportError::EmptyPayload.into());
    }

    let mut computed = match mode {
        ImportMode::Transactions => {
            let normalized = normalize_transactions(broker, &rows)?;
            ComputedHoldings {
                holdings: aggregate_holdings(&normalized.transactions)?,
                transactions: normalized.transactions,
                warnings: normalized.warnings,
                rows_read: normalized.rows_read,
            }
        }
        ImportMode::Holdings => {
            let parsed = parse_holdings(broker, &rows)?;
            ComputedHoldings {
                holdings: parsed.holdings,
                transactions: Vec::new(),
                warnings: parsed.warnings,
                rows_read: parsed.rows_read,
            }
        }
    };

    for holding in computed.holdings.iter_mut() {
        holding.asset_type = Some(resolve_asset_type(
            holding.asset_type,
            &holding.ticker,
            &holding.security_name,
        ));
    }

    debug!(
        "{} {} import computed {} holdings from {} rows",
        broker,
        mode,
        computed.holdings.len(),
        computed.rows_read
    );
    Ok(computed)
}

pub struct ImportService {
    holding_repository: Arc<dyn HoldingRepositoryTrait>,
}

impl ImportService {
    pub fn new(holding_repository: Arc<dyn HoldingRepositoryTrait>) -> Self {
        Self { holding_repository }
    }

    fn compute(&self, request: &ImportRequest) -> Result<ComputedHoldings> {
        compute_holdings(
            request.broker,
            request.mode,
            &request.content,
            &request.config,
        )
        .map_err(|e| {
            error!(
                "{} import for user {} failed: {}",
                request.broker, request.user_id, e
            );
            e
        })
    }
}

#[async_trait]
impl ImportServiceTrait for ImportService {
    fn preview(&self, request: &ImportRequest) -> Result<ImportPreview> {
        let mut batch = ImportBatch::new(&request.user_id, request.broker, request.mode);
        let computed = self.compute(request)?;

        batch.record_computed(&computed);
        batch.finish(ImportBatchStatus::DryRun);

        Ok(ImportPreview {
            batch,
            holdings: computed.holdings,
            transactions: computed.transactions,
        })
    }

    async fn import(&self, request: ImportRequest) -> Result<ImportResult> {
        let mut batch = ImportBatch::new(&request.user_id, request.broker, request.mode);
        let computed = self.compute(&request)?;
        batch.record_computed(&computed);

        let existing = self.holding_repository.get_holdings(&request.user_id)?;
        let stamp = ImportStamp {
            user_id: request.user_id.clone(),
            broker_source: request.broker.as_str().to_string(),
            batch_id: batch.id.clone(),
            imported_at: batch.started_at,
        };
        let plan = reconcile(&computed.holdings, &existing, request.broker, &stamp);

        let applied = if plan.is_empty() {
            AppliedPlan::default()
        } else {
            self.holding_repository
                .apply_plan(&request.user_id, plan)
                .await
                .map_err(|e| {
                    error!(
                        "Writing {} import batch {} for user {} failed, nothing was applied: {}",
                        request.broker, batch.id, request.user_id, e
                    );
                    e
                })?
        };
        batch.summary.removed = applied.removed;
        batch.summary.updated = applied.updated.len();
        batch.summary.inserted = applied.inserted.len();

        let mut holdings = applied.updated;
        holdings.extend(applied.inserted);
        holdings.sort_by(|a, b| a.key().cmp(&b.key()));

        batch.finish(ImportBatchStatus::Applied);
        info!(
            "Imported {} holdings from {} for user {} (batch {}): {} inserted, {} updated, {} removed, {} rows skipped",
            batch.summary.holdings,
            request.broker,
            request.user_id,
            batch.id,
            batch.summary.inserted,
            batch.summary.updated,
            batch.summary.removed,
            batch.summary.rows_skipped
        );

        Ok(ImportResult { batch, holdings })
    }

    async fn clear_broker_source(&self, user_id: &str, broker: Broker) -> Result<usize> {
        let removed = self
            .holding_repository
            .delete_holdings_by_source(user_id, broker.as_str())
            .await?;
        info!(
            "Cleared {} {} holdings for user {}",
            removed, broker, user_id
        );
        Ok(removed)
    }
}
