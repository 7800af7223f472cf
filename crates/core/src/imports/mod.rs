//! Import pipeline: tokenize, normalize, aggregate, reconcile, persist.

mod import_model;
mod import_service;
mod import_traits;
mod reconciliation;
mod row_tokenizer;


pub use import_model::{
    ComputedHoldings, ImportBatch, ImportBatchStatus, ImportBatchSummary, ImportMode,
    ImportPreview, ImportRequest, ImportResult,
};
pub use import_service::{compute_holdings, ImportService};
pub use import_traits::ImportServiceTrait;
pub use reconciliation::{reconcile, AppliedPlan, ReconciliationPlan};
pub use row_tokenizer::{tokenize, ImportConfig};
