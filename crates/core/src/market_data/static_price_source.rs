use async_trait::async_trait;
use std::collections::HashMap;

use super::{PriceQuote, PriceSourceTrait};
use crate::brokers::normalize_ticker;
use crate::errors::{Error, Result};

/// Price source backed by a fixed ticker → quote map, e.g. loaded from a file.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceSource {
    quotes: HashMap<String, PriceQuote>,
}

impl StaticPriceSource {
    /// Builds the source, normalizing tickers the same way imports do.
    pub fn new(quotes: HashMap<String, PriceQuote>) -> Self {
        Self {
            quotes: quotes
                .into_iter()
                .map(|(ticker, quote)| (normalize_ticker(&ticker), quote))
                .collect(),
        }
    }
}

#[async_trait]
impl PriceSourceTrait for StaticPriceSource {
    async fn price_for(&self, ticker: &str) -> Result<PriceQuote> {
        self.quotes
            .get(&normalize_ticker(ticker))
            .copied()
            .ok_or_else(|| Error::MarketData(format!("No quote available for {}", ticker)))
    }
}
