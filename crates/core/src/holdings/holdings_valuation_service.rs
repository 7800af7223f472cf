use async_trait::async_trait;
use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use super::{Holding, HoldingValuation, PositionDirection};
use crate::errors::Result;
use crate::market_data::{PriceQuote, PriceSourceTrait};

#[async_trait]
pub trait HoldingsValuationServiceTrait: Send + Sync {
    async fn value_holdings(&self, holdings: &[Holding]) -> Result<Vec<HoldingValuation>>;
}

#[derive(Clone)]
pub struct HoldingsValuationService {
    price_source: Arc<dyn PriceSourceTrait>,
}

impl HoldingsValuationService {
    pub fn new(price_source: Arc<dyn PriceSourceTrait>) -> Self {
        Self { price_source }
    }

    // One lookup per distinct ticker; failures are logged and left out.
    async fn fetch_quotes(&self, holdings: &[Holding]) -> HashMap<String, PriceQuote> {
        let mut quotes = HashMap::new();
        for holding in holdings {
            if quotes.contains_key(&holding.ticker) {
                continue;
            }
            match self.price_source.price_for(&holding.ticker).await {
                Ok(quote) => {
                    quotes.insert(holding.ticker.clone(), quote);
                }
                Err(e) => {
                    warn!("No price for {}: {}. Leaving it unvalued.", holding.ticker, e);
                }
            }
        }
        quotes
    }
}

/// Values one holding against a quote. Shorts gain when the price falls.
/// A figure that overflows is left as `None`.
pub fn value_holding(holding: &Holding, quote: Option<&PriceQuote>) -> HoldingValuation {
    let mut valuation = HoldingValuation {
        holding_id: holding.id.clone(),
        ticker: holding.ticker.clone(),
        position_direction: holding.position_direction,
        quantity: holding.quantity,
        average_cost: holding.average_cost,
        total_cost_basis: holding.total_cost_basis,
        price: None,
        day_change: None,
        market_value: None,
        unrealized_gain: None,
        unrealized_gain_pct: None,
    };

    let Some(quote) = quote else {
        return valuation;
    };

    let quantity = holding.quantity;
    let per_unit_gain = match holding.position_direction {
        PositionDirection::Long => quote.price.checked_sub(holding.average_cost),
        PositionDirection::Short => holding.average_cost.checked_sub(quote.price),
    };
    let day_change = match holding.position_direction {
        PositionDirection::Long => quote.change,
        PositionDirection::Short => -quote.change,
    };
    let unrealized_gain = per_unit_gain.and_then(|gain| gain.checked_mul(quantity));

    valuation.price = Some(quote.price);
    valuation.day_change = day_change.checked_mul(quantity);
    valuation.market_value = quote.price.checked_mul(quantity);
    valuation.unrealized_gain = unrealized_gain;
    valuation.unrealized_gain_pct = unrealized_gain
        .filter(|_| !holding.total_cost_basis.is_zero())
        .and_then(|gain| gain.checked_div(holding.total_cost_basis))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED));

    if valuation.market_value.is_none() || valuation.unrealized_gain.is_none() {
        warn!(
            "Valuation of {} overflowed; affected figures left empty",
            holding.ticker
        );
    }
    valuation
}

#[async_trait]
impl HoldingsValuationServiceTrait for HoldingsValuationService {
    async fn value_holdings(&self, holdings: &[Holding]) -> Result<Vec<HoldingValuation>> {
        let quotes = self.fetch_quotes(holdings).await;
        debug!(
            "Valuing {} holdings with {} quotes",
            holdings.len(),
            quotes.len()
        );

        Ok(holdings
            .iter()
            .map(|holding| value_holding(holding, quotes.get(&holding.ticker)))
            .collect())
    }
}
