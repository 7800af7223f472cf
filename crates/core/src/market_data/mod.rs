//! Price source boundary used by holdings valuation.

mod market_data_model;
mod market_data_traits;
mod static_price_source;

pub use market_data_model::PriceQuote;
pub use market_data_traits::PriceSourceTrait;
pub use static_price_source::StaticPriceSource;
