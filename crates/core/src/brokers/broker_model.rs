use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::assets::AssetType;
use crate::constants::MANUAL_BROKER_SOURCE;
use crate::errors::ImportError;

/// Origin system of an import payload.
///
/// The set is closed: each variant selects one fixed normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Broker {
    /// Hand-entered or already aggregated holdings. Holdings mode only.
    Manual,
    Robinhood,
    InteractiveBrokers,
    Coinbase,
    Binance,
}

impl Broker {
    pub const ALL: [Broker; 5] = [
        Broker::Manual,
        Broker::Robinhood,
        Broker::InteractiveBrokers,
        Broker::Coinbase,
        Broker::Binance,
    ];

    /// Stable identifier used as the persisted broker source.
    pub fn as_str(&self) -> &'static str {
        match self {
            Broker::Manual => MANUAL_BROKER_SOURCE,
            Broker::Robinhood => "robinhood",
            Broker::InteractiveBrokers => "interactive_brokers",
            Broker::Coinbase => "coinbase",
            Broker::Binance => "binance",
        }
    }

    /// Human-readable broker name for messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Broker::Manual => "Manual",
            Broker::Robinhood => "Robinhood",
            Broker::InteractiveBrokers => "Interactive Brokers",
            Broker::Coinbase => "Coinbase",
            Broker::Binance => "Binance",
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self, Broker::Manual)
    }
}

impl fmt::Display for Broker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Broker {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match key.as_str() {
            "manual" => Ok(Broker::Manual),
            "robinhood" => Ok(Broker::Robinhood),
            "interactivebrokers" | "ibkr" | "ib" => Ok(Broker::InteractiveBrokers),
            "coinbase" => Ok(Broker::Coinbase),
            "binance" => Ok(Broker::Binance),
            _ => Err(ImportError::UnknownBroker(s.trim().to_string())),
        }
    }
}

/// Economic event type of a canonical transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Buy,
    Sell,
    Deposit,
    Withdrawal,
    Dividend,
    Fee,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Buy => "buy",
            TransactionKind::Sell => "sell",
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
            TransactionKind::Dividend => "dividend",
            TransactionKind::Fee => "fee",
        }
    }

    /// Whether the lot aggregator consumes this kind.
    pub fn is_trade(&self) -> bool {
        matches!(self, TransactionKind::Buy | TransactionKind::Sell)
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One economic event for one ticker, in canonical form.
///
/// Quantities and amounts are magnitudes; direction lives in `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub occurred_at: DateTime<Utc>,
    pub kind: TransactionKind,
    pub ticker: String,
    pub security_name: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub amount: Decimal,
    #[serde(default)]
    pub fees: Option<Decimal>,
    #[serde(default)]
    pub asset_type: Option<AssetType>,
}

/// A data row that was skipped during normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowWarning {
    /// 1-based position of the row in the tokenized payload (header included).
    pub row_number: usize,
    pub message: String,
}

impl fmt::Display for RowWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.row_number, self.message)
    }
}

/// Output of a broker normalizer: the usable transactions plus every row that
/// was skipped on the way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTransactions {
    pub transactions: Vec<Transaction>,
    pub warnings: Vec<RowWarning>,
    /// Number of data rows inspected (headers and section markers excluded).
    pub rows_read: usize,
}

impl NormalizedTransactions {
    pub(crate) fn skip(&mut self, row_number: usize, message: impl Into<String>) {
        let warning = RowWarning {
            row_number,
            message: message.into(),
        };
        log::warn!("Skipping {}", warning);
        self.warnings.push(warning);
    }
}
