use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use std::sync::Arc;
use tallyfolio_core::assets::AssetType;
use tallyfolio_core::holdings::{
    Holding, HoldingRepositoryTrait, NewHolding, PositionDirection,
};
use tallyfolio_core::imports::{ImportService, ReconciliationPlan};
use tallyfolio_core::{Broker, ImportMode, ImportRequest, ImportServiceTrait};
use tempfile::{tempdir, TempDir};

use super::HoldingRepository;
use crate::db::{create_pool, init, run_migrations, spawn_writer};

fn create_test_repository() -> (HoldingRepository, TempDir) {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("nested").join("test.db");
    let db_path = init(&db_path.to_string_lossy()).expect("Failed to init database");

    let pool = create_pool(&db_path).expect("Failed to create pool");
    run_migrations(&pool).expect("Failed to run migrations");
    let writer = spawn_writer((*pool).clone());

    (HoldingRepository::new(Arc::clone(&pool), writer), temp_dir)
}

fn new_holding(user: &str, ticker: &str, source: &str) -> NewHolding {
    NewHolding {
        id: None,
        user_id: user.to_string(),
        ticker: ticker.to_string(),
        security_name: format!("{} Inc", ticker),
        quantity: dec!(15),
        position_direction: PositionDirection::Long,
        average_cost: dec!(113.333333333333333333),
        total_cost_basis: dec!(1700),
        asset_type: AssetType::Stock,
        broker_source: source.to_string(),
        batch_id: "batch-1".to_string(),
        opened_at: Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()),
        imported_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
    }
}

#[tokio::test]
async fn test_insert_round_trips_decimals_and_enums() {
    let (repo, _temp_dir) = create_test_repository();

    let mut short = new_holding("user-1", "TSLA", "robinhood");
    short.position_direction = PositionDirection::Short;
    short.asset_type = AssetType::MutualFund;
    short.opened_at = None;

    let inserted = repo
        .insert_holdings(vec![new_holding("user-1", "AAPL", "robinhood"), short])
        .await
        .unwrap();
    assert_eq!(inserted.len(), 2);
    assert!(!inserted[0].id.is_empty());

    let stored = repo.get_holdings("user-1").unwrap();
    let aapl = &stored[0];
    assert_eq!(aapl.ticker, "AAPL");
    assert_eq!(aapl.quantity, dec!(15));
    assert_eq!(aapl.average_cost, dec!(113.333333333333333333));
    assert_eq!(
        aapl.opened_at,
        Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap())
    );

    let tsla = &stored[1];
    assert_eq!(tsla.position_direction, PositionDirection::Short);
    assert_eq!(tsla.asset_type, AssetType::MutualFund);
    assert_eq!(tsla.opened_at, None);
}

#[tokio::test]
async fn test_get_holdings_is_scoped_to_user() {
    let (repo, _temp_dir) = create_test_repository();
    repo.insert_holdings(vec![
        new_holding("user-1", "AAPL", "robinhood"),
        new_holding("user-2", "MSFT", "robinhood"),
    ])
    .await
    .unwrap();

    let stored = repo.get_holdings("user-2").unwrap();

    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].ticker, "MSFT");
}

#[tokio::test]
async fn test_update_replaces_values() {
    let (repo, _temp_dir) = create_test_repository();
    let inserted = repo
        .insert_holdings(vec![new_holding("user-1", "AAPL", "manual")])
        .await
        .unwrap();

    let mut changed: Holding = inserted[0].clone();
    changed.quantity = dec!(3);
    changed.broker_source = "robinhood".to_string();
    repo.update_holdings(vec![changed]).await.unwrap();

    let stored = repo.get_holdings("user-1").unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, inserted[0].id);
    assert_eq!(stored[0].quantity, dec!(3));
    assert_eq!(stored[0].broker_source, "robinhood");
}

#[tokio::test]
async fn test_update_of_unknown_id_fails_without_partial_write() {
    let (repo, _temp_dir) = create_test_repository();
    let inserted = repo
        .insert_holdings(vec![new_holding("user-1", "AAPL", "manual")])
        .await
        .unwrap();

    let mut known = inserted[0].clone();
    known.quantity = dec!(99);
    let mut unknown = inserted[0].clone();
    unknown.id = "missing".to_string();

    assert!(repo.update_holdings(vec![known, unknown]).await.is_err());

    let stored = repo.get_holdings("user-1").unwrap();
    assert_eq!(stored[0].quantity, dec!(15));
}

#[tokio::test]
async fn test_delete_by_ids_and_by_source() {
    let (repo, _temp_dir) = create_test_repository();
    let inserted = repo
        .insert_holdings(vec![
            new_holding("user-1", "AAPL", "robinhood"),
            new_holding("user-1", "MSFT", "robinhood"),
            new_holding("user-1", "BTC", "coinbase"),
            new_holding("user-2", "NVDA", "robinhood"),
        ])
        .await
        .unwrap();

    // Ids of another user are ignored.
    let removed = repo
        .delete_holdings("user-1", vec![inserted[0].id.clone(), inserted[3].id.clone()])
        .await
        .unwrap();
    assert_eq!(removed, 1);

    let removed = repo
        .delete_holdings_by_source("user-1", "robinhood")
        .await
        .unwrap();
    assert_eq!(removed, 1);

    let remaining: Vec<String> = repo
        .get_holdings("user-1")
        .unwrap()
        .into_iter()
        .map(|h| h.ticker)
        .collect();
    assert_eq!(remaining, vec!["BTC"]);
    assert_eq!(repo.get_holdings("user-2").unwrap().len(), 1);
}

#[tokio::test]
async fn test_apply_plan_writes_every_step() {
    let (repo, _temp_dir) = create_test_repository();
    let inserted = repo
        .insert_holdings(vec![
            new_holding("user-1", "AAPL", "robinhood"),
            new_holding("user-1", "MSFT", "robinhood"),
        ])
        .await
        .unwrap();

    let mut aapl = inserted[0].clone();
    aapl.quantity = dec!(20);
    let plan = ReconciliationPlan {
        updates: vec![aapl],
        inserts: vec![new_holding("user-1", "NVDA", "robinhood")],
        removals: vec![inserted[1].id.clone()],
    };

    let applied = repo.apply_plan("user-1", plan).await.unwrap();

    assert_eq!(applied.removed, 1);
    assert_eq!(applied.updated.len(), 1);
    assert_eq!(applied.inserted.len(), 1);
    let tickers: Vec<String> = repo
        .get_holdings("user-1")
        .unwrap()
        .into_iter()
        .map(|h| h.ticker)
        .collect();
    assert_eq!(tickers, vec!["AAPL", "NVDA"]);
}

#[tokio::test]
async fn test_apply_plan_rolls_back_removals_on_failure() {
    let (repo, _temp_dir) = create_test_repository();
    let inserted = repo
        .insert_holdings(vec![
            new_holding("user-1", "AAPL", "robinhood"),
            new_holding("user-1", "MSFT", "robinhood"),
        ])
        .await
        .unwrap();

    let mut unknown = inserted[0].clone();
    unknown.id = "missing".to_string();
    let plan = ReconciliationPlan {
        updates: vec![unknown],
        inserts: vec![new_holding("user-1", "NVDA", "robinhood")],
        removals: vec![inserted[0].id.clone(), inserted[1].id.clone()],
    };

    assert!(repo.apply_plan("user-1", plan).await.is_err());

    let stored = repo.get_holdings("user-1").unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].id, inserted[0].id);
    assert_eq!(stored[1].id, inserted[1].id);
}

#[tokio::test]
async fn test_import_service_against_sqlite() {
    let (repo, _temp_dir) = create_test_repository();
    let service = ImportService::new(Arc::new(repo));
    let request = ImportRequest {
        user_id: "user-1".to_string(),
        broker: Broker::Robinhood,
        mode: ImportMode::Transactions,
        content: "Activity Date,Instrument,Trans Code,Quantity,Price\n\
                  1/02/2024,AAPL,Buy,10,100\n\
                  1/03/2024,AAPL,Buy,10,120\n\
                  1/04/2024,AAPL,Sell,5,130"
            .to_string(),
        config: Default::default(),
    };

    let first = service.import(request.clone()).await.unwrap();
    let second = service.import(request).await.unwrap();

    assert_eq!(first.batch.summary.inserted, 1);
    assert_eq!(second.batch.summary.updated, 1);
    assert_eq!(second.holdings.len(), 1);
    assert_eq!(second.holdings[0].id, first.holdings[0].id);
    assert_eq!(second.holdings[0].quantity, dec!(15));
    assert_eq!(second.holdings[0].average_cost, dec!(1700) / dec!(15));
}
