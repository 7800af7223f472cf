use async_trait::async_trait;

use super::PriceQuote;
use crate::errors::Result;

/// External source of latest prices.
///
/// The import pipeline never calls this; it is consumed by valuation.
#[async_trait]
pub trait PriceSourceTrait: Send + Sync {
    async fn price_for(&self, ticker: &str) -> Result<PriceQuote>;
}
