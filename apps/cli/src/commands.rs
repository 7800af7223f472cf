use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tallyfolio_core::holdings::{HoldingsValuationService, HoldingsValuationServiceTrait};
use tallyfolio_core::imports::ImportConfig;
use tallyfolio_core::market_data::{PriceQuote, StaticPriceSource};
use tallyfolio_core::{Broker, ImportMode, ImportRequest};

use crate::main_lib::AppState;

#[derive(Parser, Debug)]
#[command(
    name = "tallyfolio-cli",
    about = "Import broker exports into FIFO cost-basis holdings.",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Import a broker export file and replace that broker's holdings
    Import {
        /// manual, robinhood, interactive_brokers, coinbase or binance
        broker: String,
        file: PathBuf,
        /// Treat the file as a positions list instead of transaction history
        #[arg(long)]
        holdings: bool,
        /// Compute and print holdings without saving anything
        #[arg(long)]
        dry_run: bool,
        /// Field delimiter: ",", ";", "\t" or "auto"
        #[arg(long)]
        delimiter: Option<String>,
    },
    /// Remove every holding imported from one broker
    Clear { broker: String },
    /// Print stored holdings
    List,
    /// Value stored holdings against a JSON file of `{ "TICKER": { "price", "change" } }`
    Value { prices: PathBuf },
}

/// Manual uploads are positions lists; other brokers default to history.
fn import_mode(broker: Broker, holdings: bool) -> ImportMode {
    if holdings || broker.is_manual() {
        ImportMode::Holdings
    } else {
        ImportMode::Transactions
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn run(command: Command, state: &AppState) -> Result<()> {
    match command {
        Command::Import {
            broker,
            file,
            holdings,
            dry_run,
            delimiter,
        } => {
            let broker: Broker = broker.parse()?;
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let request = ImportRequest {
                user_id: state.user_id.clone(),
                broker,
                mode: import_mode(broker, holdings),
                content,
                config: ImportConfig {
                    delimiter,
                    ..ImportConfig::default()
                },
            };

            if dry_run {
                print_json(&state.import_service.preview(&request)?)
            } else {
                print_json(&state.import_service.import(request).await?)
            }
        }
        Command::Clear { broker } => {
            let broker: Broker = broker.parse()?;
            let removed = state
                .import_service
                .clear_broker_source(&state.user_id, broker)
                .await?;
            tracing::info!("Removed {} {} holdings", removed, broker);
            print_json(&serde_json::json!({ "broker": broker, "removed": removed }))
        }
        Command::List => print_json(&state.holding_repository.get_holdings(&state.user_id)?),
        Command::Value { prices } => {
            let raw = std::fs::read_to_string(&prices)
                .with_context(|| format!("reading {}", prices.display()))?;
            let quotes: HashMap<String, PriceQuote> = serde_json::from_str(&raw)
                .with_context(|| format!("parsing {}", prices.display()))?;

            let holdings = state.holding_repository.get_holdings(&state.user_id)?;
            let valuation = HoldingsValuationService::new(Arc::new(StaticPriceSource::new(quotes)));
            print_json(&valuation.value_holdings(&holdings).await?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_import_flags() {
        let cli = Cli::try_parse_from([
            "tallyfolio-cli",
            "import",
            "robinhood",
            "export.csv",
            "--dry-run",
            "--delimiter",
            ";",
        ])
        .unwrap();

        assert_eq!(
            cli.command,
            Command::Import {
                broker: "robinhood".to_string(),
                file: PathBuf::from("export.csv"),
                holdings: false,
                dry_run: true,
                delimiter: Some(";".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_clear_and_list() {
        let clear = Cli::try_parse_from(["tallyfolio-cli", "clear", "coinbase"]).unwrap();
        assert_eq!(
            clear.command,
            Command::Clear {
                broker: "coinbase".to_string()
            }
        );

        let list = Cli::try_parse_from(["tallyfolio-cli", "list"]).unwrap();
        assert_eq!(list.command, Command::List);
    }

    #[test]
    fn test_manual_always_imports_holdings() {
        assert_eq!(import_mode(Broker::Manual, false), ImportMode::Holdings);
        assert_eq!(import_mode(Broker::Binance, true), ImportMode::Holdings);
        assert_eq!(import_mode(Broker::Binance, false), ImportMode::Transactions);
    }
}
