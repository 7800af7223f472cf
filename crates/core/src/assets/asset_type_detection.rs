//! Best-effort asset type detection from a ticker and security name.

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use super::assets_constants::{
    CRYPTO_PAIR_MIN_BASE_LEN, CRYPTO_PAIR_SUFFIXES, KNOWN_CRYPTO_TICKERS, KNOWN_ETF_TICKERS,
};
use super::AssetType;
use crate::brokers::{normalize_ticker, strip_quote_suffix};

lazy_static! {
    /// Plain exchange ticker: one to five uppercase letters.
    static ref PLAIN_TICKER_REGEX: Regex =
        Regex::new(r"^[A-Z]{1,5}$").expect("Invalid regex pattern");
}

/// Name keywords checked in order; the first hit wins.
const NAME_KEYWORDS: [(&str, AssetType); 5] = [
    ("BOND", AssetType::Bond),
    ("TREASURY", AssetType::Bond),
    ("ETF", AssetType::Etf),
    ("INDEX", AssetType::Index),
    ("FUND", AssetType::MutualFund),
];

fn is_known_crypto(symbol: &str) -> bool {
    KNOWN_CRYPTO_TICKERS.contains(&symbol)
}

fn is_crypto_pair(symbol: &str) -> bool {
    CRYPTO_PAIR_SUFFIXES.iter().any(|suffix| {
        symbol
            .strip_suffix(suffix)
            .is_some_and(|base| base.len() >= CRYPTO_PAIR_MIN_BASE_LEN)
    })
}

/// Guesses an asset type for `ticker`, using `security_name` for keyword hints.
///
/// The ticker is normalized first, so `BTC-USD` and `BTCUSD` are the same.
///
/// Rules, first match wins:
/// 1. crypto pair or perpetual suffix
/// 2. base ticker in the known crypto set
/// 3. well-known ETF ticker
/// 4. name keywords (bond, treasury, ETF, index, fund)
/// 5. plain 1-5 letter ticker is a stock
/// 6. anything else is `Other`
pub fn detect_asset_type(ticker: &str, security_name: &str) -> AssetType {
    let symbol = normalize_ticker(ticker);

    if is_crypto_pair(&symbol)
        || is_known_crypto(&symbol)
        || is_known_crypto(&strip_quote_suffix(&symbol))
    {
        return AssetType::Crypto;
    }

    if KNOWN_ETF_TICKERS.contains(&symbol.as_str()) {
        return AssetType::Etf;
    }

    let name = security_name.to_uppercase();
    if let Some((_, asset_type)) = NAME_KEYWORDS
        .iter()
        .find(|(keyword, _)| name.contains(keyword))
    {
        return *asset_type;
    }

    if PLAIN_TICKER_REGEX.is_match(&symbol) {
        return AssetType::Stock;
    }

    debug!("No asset type rule matched '{}', using Other", ticker);
    AssetType::Other
}

/// Returns the explicit type when present, otherwise a detected one.
pub fn resolve_asset_type(
    explicit: Option<AssetType>,
    ticker: &str,
    security_name: &str,
) -> AssetType {
    explicit.unwrap_or_else(|| detect_asset_type(ticker, security_name))
}
