//! Holdings: FIFO lot aggregation, stored holdings and valuation.

mod holdings_model;
mod holdings_traits;
mod holdings_valuation_service;
mod lot_aggregator;
mod lots_model;

#[cfg(test)]
mod lot_aggregator_tests;

pub use holdings_model::{
    AggregatedHolding, Holding, HoldingKey, HoldingValuation, ImportStamp, NewHolding,
    PositionDirection,
};
pub use holdings_traits::HoldingRepositoryTrait;
pub use holdings_valuation_service::{
    value_holding, HoldingsValuationService, HoldingsValuationServiceTrait,
};
pub use lot_aggregator::aggregate_holdings;
pub use lots_model::{LotBook, LotSummary, PurchaseLot};
