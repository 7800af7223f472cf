//! Tallyfolio Core - broker import pipeline and holdings engine.
//!
//! This crate turns broker export files into current holdings with FIFO cost
//! basis. It is database-agnostic and defines the repository and price source
//! traits implemented elsewhere (see the `storage-sqlite` crate).

pub mod assets;
pub mod brokers;
pub mod constants;
pub mod errors;
pub mod holdings;
pub mod imports;
pub mod market_data;

pub use brokers::{Broker, Transaction, TransactionKind};
pub use holdings::{AggregatedHolding, Holding, NewHolding, PositionDirection};
pub use imports::{ImportMode, ImportRequest, ImportService, ImportServiceTrait};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
