use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::ImportConfig;
use crate::brokers::{Broker, RowWarning, Transaction};
use crate::holdings::{AggregatedHolding, Holding};

/// How rows of an import payload are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    /// Trade history, aggregated into holdings through FIFO lots.
    Transactions,
    /// Current positions, taken as already aggregated.
    Holdings,
}

impl ImportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportMode::Transactions => "transactions",
            ImportMode::Holdings => "holdings",
        }
    }
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One file to import for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    pub user_id: String,
    pub broker: Broker,
    pub mode: ImportMode,
    pub content: String,
    #[serde(default)]
    pub config: ImportConfig,
}

/// Holdings computed from a payload, before any reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedHoldings {
    pub holdings: Vec<AggregatedHolding>,
    /// Canonical transactions behind the holdings; empty in holdings mode.
    pub transactions: Vec<Transaction>,
    pub warnings: Vec<RowWarning>,
    pub rows_read: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportBatchStatus {
    /// Holdings were written.
    Applied,
    /// Computed only; nothing was written.
    DryRun,
}

/// Counters for one import batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBatchSummary {
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub transactions: usize,
    pub holdings: usize,
    pub inserted: usize,
    pub updated: usize,
    pub removed: usize,
}

/// Audit record of one import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBatch {
    pub id: String,
    pub user_id: String,
    pub broker: Broker,
    pub mode: ImportMode,
    pub status: ImportBatchStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub summary: ImportBatchSummary,
    pub warnings: Vec<RowWarning>,
}

impl ImportBatch {
    pub fn new(user_id: &str, broker: Broker, mode: ImportMode) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            user_id: user_id.to_string(),
            broker,
            mode,
            status: ImportBatchStatus::DryRun,
            started_at: Utc::now(),
            finished_at: None,
            summary: ImportBatchSummary::default(),
            warnings: Vec::new(),
        }
    }

    /// Records what was computed from the payload.
    pub fn record_computed(&mut self, computed: &ComputedHoldings) {
        self.summary.rows_read = computed.rows_read;
        self.summary.rows_skipped = computed.warnings.len();
        self.summary.transactions = computed.transactions.len();
        self.summary.holdings = computed.holdings.len();
        self.warnings = computed.warnings.clone();
    }

    pub fn finish(&mut self, status: ImportBatchStatus) {
        self.status = status;
        self.finished_at = Some(Utc::now());
    }
}

/// Outcome of an applied import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub batch: ImportBatch,
    /// Rows inserted or updated by this batch, sorted by ticker.
    pub holdings: Vec<Holding>,
}

/// Outcome of a dry run: what an import would compute and change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPreview {
    pub batch: ImportBatch,
    pub holdings: Vec<AggregatedHolding>,
    pub transactions: Vec<Transaction>,
}
