use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Latest price for a ticker as reported by a price source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub price: Decimal,
    /// Per-unit change since the previous close.
    #[serde(default)]
    pub change: Decimal,
}
