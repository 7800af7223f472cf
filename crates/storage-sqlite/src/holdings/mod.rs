//! SQLite storage implementation for holdings.

mod model;
mod repository;

#[cfg(test)]
mod repository_tests;

pub use model::{HoldingDB, NewHoldingDB};
pub use repository::HoldingRepository;
