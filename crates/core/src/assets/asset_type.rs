use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse asset classification attached to transactions and holdings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    Stock,
    Etf,
    MutualFund,
    Bond,
    Index,
    Crypto,
    Other,
}

impl AssetType {
    /// Stable identifier used for persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Stock => "stock",
            AssetType::Etf => "etf",
            AssetType::MutualFund => "mutual_fund",
            AssetType::Bond => "bond",
            AssetType::Index => "index",
            AssetType::Crypto => "crypto",
            AssetType::Other => "other",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AssetType::Stock => "Stock",
            AssetType::Etf => "ETF",
            AssetType::MutualFund => "Mutual Fund",
            AssetType::Bond => "Bond",
            AssetType::Index => "Index",
            AssetType::Crypto => "Crypto",
            AssetType::Other => "Other",
        }
    }

    /// Reads a broker- or user-supplied label.
    ///
    /// Matching is lenient: case, `_` and `-` are ignored and common plurals
    /// and synonyms are accepted. Any other non-empty label maps to `Other`;
    /// blank labels return `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_lowercase().replace(['_', '-'], " ");
        let asset_type = match normalized.as_str() {
            "" => return None,
            "stock" | "stocks" | "equity" | "equities" | "common stock" | "share" | "shares" => {
                AssetType::Stock
            }
            "etf" | "etfs" | "exchange traded fund" => AssetType::Etf,
            "mutual fund" | "mutual funds" | "mutualfund" | "fund" | "funds" => {
                AssetType::MutualFund
            }
            "bond" | "bonds" | "fixed income" | "treasury" => AssetType::Bond,
            "index" => AssetType::Index,
            "crypto" | "cryptocurrency" | "cryptocurrencies" | "digital asset" => {
                AssetType::Crypto
            }
            _ => AssetType::Other,
        };
        Some(asset_type)
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label_is_lenient() {
        assert_eq!(AssetType::from_label("Stocks"), Some(AssetType::Stock));
        assert_eq!(AssetType::from_label("EQUITY"), Some(AssetType::Stock));
        assert_eq!(AssetType::from_label("mutual_fund"), Some(AssetType::MutualFund));
        assert_eq!(AssetType::from_label("Fixed-Income"), Some(AssetType::Bond));
        assert_eq!(AssetType::from_label("Cryptocurrency"), Some(AssetType::Crypto));
        assert_eq!(AssetType::from_label("Options"), Some(AssetType::Other));
        assert_eq!(AssetType::from_label("  "), None);
    }

    #[test]
    fn test_persisted_id_round_trips() {
        for asset_type in [
            AssetType::Stock,
            AssetType::Etf,
            AssetType::MutualFund,
            AssetType::Bond,
            AssetType::Index,
            AssetType::Crypto,
            AssetType::Other,
        ] {
            assert_eq!(AssetType::from_label(asset_type.as_str()), Some(asset_type));
        }
    }
}
