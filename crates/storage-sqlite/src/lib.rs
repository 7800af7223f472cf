//! SQLite storage implementation for Tallyfolio.
//!
//! Implements the holdings repository trait from `tallyfolio-core` with Diesel
//! over SQLite:
//! - Connection pooling and a single serialized writer
//! - Embedded Diesel migrations
//! - Database row models (decimals stored as text)
//!
//! ```text
//! core (domain, traits)
//!         │
//!         ▼
//! storage-sqlite (this crate)
//!         │
//!         ▼
//!     SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod holdings;
pub mod schema;

pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};
pub use errors::{IntoCore, StorageError};
pub use holdings::HoldingRepository;

pub use tallyfolio_core::errors::{DatabaseError, Error, Result};
