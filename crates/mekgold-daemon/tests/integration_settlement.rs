// crates/mekgold-daemon/tests/integration_settlement.rs
//
// End-to-end income tests over a RocksDB store.
//
// Exercises rate evaluation, assignment, accrual, settlement and reporting
// through the same components the daemon wires together. The daemon is a
// binary crate with no lib.rs, so these tests use the public APIs of the
// library crates and the RPC server's in-process `handle`.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use mekgold_core::{
    CurveType, Gold, IncomeStore, JobSlot, LedgerTransaction, Mek, RateCurveConfig, SlotKey,
    SlotRef, UserAccount,
};
use mekgold_income::{AggregateReporter, CheckpointCollector, IncomeError, IncomePolicy};
use mekgold_rpc::{JsonRpcRequest, MekGoldRpcServer, RpcConfig};
use mekgold_store::RocksStore;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const OWNER: &str = "stake1u8integration";

/// Create a temporary directory path using UUID to avoid conflicts.
fn temp_db_path(label: &str) -> String {
    let dir = std::env::temp_dir();
    let path = dir.join(format!("mekgold_test_{}_{}", label, Uuid::now_v7()));
    path.to_string_lossy().to_string()
}

async fn open_store(label: &str) -> Arc<RocksStore> {
    let store = Arc::new(RocksStore::open(&temp_db_path(label)).unwrap());
    store.put_account(&UserAccount::new(OWNER)).await.unwrap();
    store
}

async fn add_mek(store: &RocksStore, asset_id: &str, rate: Option<f64>, rank: Option<u32>) {
    let mut mek = Mek::new(asset_id, OWNER, &format!("Mekanism {}", asset_id));
    mek.base_daily_rate = rate.map(Gold::from_gold);
    mek.rarity_rank = rank;
    store.put_mek(&mek).await.unwrap();
}

/// Write a slot that has been accruing since `since`, as if assigned back then.
async fn backdate_slot(
    store: &RocksStore,
    key: &SlotKey,
    asset_id: &str,
    since: DateTime<Utc>,
    level: u32,
    tenure_days: u32,
) {
    let mut slot = JobSlot::new_assigned(key, asset_id, since);
    slot.slot_level = level;
    slot.tenure_days = tenure_days;
    store
        .commit(
            LedgerTransaction::new()
                .put_slot(slot, None)
                .set_mek_assignment(
                    asset_id,
                    None,
                    Some(SlotRef {
                        slot_type: key.slot_type.clone(),
                        slot_index: key.slot_index,
                    }),
                ),
        )
        .await
        .unwrap();
}

async fn balance(store: &RocksStore) -> Gold {
    store.get_account(OWNER).await.unwrap().unwrap().gold
}

fn rpc(method: &str, params: serde_json::Value) -> JsonRpcRequest {
    JsonRpcRequest {
        method: method.to_string(),
        params,
    }
}

// ---------------------------------------------------------------------------
// Settlement
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_settlement_math_on_rocksdb() {
    let store = open_store("settle").await;
    let now = Utc::now();
    let key = SlotKey::new(OWNER, "miner", 0);
    add_mek(&store, "mek-1", Some(100.0), None).await;
    backdate_slot(&store, &key, "mek-1", now - Duration::days(2), 3, 20).await;

    let collector = CheckpointCollector::new(store.clone());
    let receipt = collector.collect_one(&key, now).await.unwrap();

    assert_eq!(receipt.collected, Gold::from_cents(22_440));
    assert_eq!(receipt.new_balance, Gold::from_cents(22_440));
    assert_eq!(receipt.experience_gained, 22);

    let slot = store.get_slot(&key).await.unwrap().unwrap();
    assert_eq!(slot.last_checkpoint, Some(now));
    assert_eq!(slot.revision, 1);
    let mek = store.get_mek("mek-1").await.unwrap().unwrap();
    assert_eq!(mek.lifetime_earnings_total, Gold::from_cents(22_440));
}

#[tokio::test]
async fn test_spam_guard_leaves_balance_unchanged() {
    let store = open_store("spam").await;
    let now = Utc::now();
    let key = SlotKey::new(OWNER, "miner", 0);
    add_mek(&store, "mek-1", Some(100.0), None).await;
    backdate_slot(&store, &key, "mek-1", now - Duration::days(1), 1, 0).await;

    let collector = CheckpointCollector::new(store.clone());
    collector.collect_one(&key, now).await.unwrap();
    let after_first = balance(&store).await;
    assert_eq!(after_first, Gold::from_whole(100));

    let err = collector
        .collect_one(&key, now + Duration::seconds(30))
        .await
        .unwrap_err();
    assert!(matches!(err, IncomeError::TooSoon { .. }));
    assert_eq!(balance(&store).await, after_first);

    // Past the threshold the slot pays again, for the new interval only.
    let receipt = collector
        .collect_one(&key, now + Duration::hours(6))
        .await
        .unwrap();
    assert_eq!(receipt.collected, Gold::from_whole(25));
    assert_eq!(balance(&store).await, Gold::from_whole(125));
}

#[tokio::test]
async fn test_zero_elapsed_preview_is_zero() {
    let store = open_store("zero").await;
    let now = Utc::now();
    let key = SlotKey::new(OWNER, "miner", 0);
    add_mek(&store, "mek-1", Some(2400.0), None).await;
    backdate_slot(&store, &key, "mek-1", now, 50, 100).await;

    let reporter = AggregateReporter::new(store.clone());
    let preview = reporter.preview_pending(&key, now).await.unwrap();
    assert!(preview.accrual.pending.is_zero());
}

#[tokio::test]
async fn test_collect_all_tolerates_missing_mek() {
    let store = open_store("batch").await;
    let now = Utc::now();
    for (idx, id) in ["mek-a", "mek-b", "mek-c"].iter().enumerate() {
        add_mek(&store, id, Some(100.0), None).await;
        let key = SlotKey::new(OWNER, "miner", idx as u32);
        backdate_slot(&store, &key, id, now - Duration::days(1), 1, 0).await;
    }
    store.delete_mek("mek-b").await.unwrap();

    let collector = CheckpointCollector::new(store.clone());
    let summary = collector.collect_all(OWNER, now).await.unwrap();
    assert_eq!(summary.slots_collected, 2);
    assert_eq!(summary.total_collected, Gold::from_whole(200));
    assert_eq!(balance(&store).await, Gold::from_whole(200));
}

#[tokio::test]
async fn test_state_survives_reopen() {
    let path = temp_db_path("reopen");
    let now = Utc::now();
    let key = SlotKey::new(OWNER, "miner", 0);
    {
        let store = Arc::new(RocksStore::open(&path).unwrap());
        store.put_account(&UserAccount::new(OWNER)).await.unwrap();
        add_mek(&store, "mek-1", Some(100.0), None).await;
        backdate_slot(&store, &key, "mek-1", now - Duration::days(1), 1, 0).await;
        CheckpointCollector::new(store.clone())
            .collect_one(&key, now)
            .await
            .unwrap();
    }

    let store = RocksStore::open(&path).unwrap();
    assert_eq!(balance(&store).await, Gold::from_whole(100));
    let slot = store.get_slot(&key).await.unwrap().unwrap();
    assert_eq!(slot.last_checkpoint, Some(now));
    assert_eq!(slot.slot_xp, 10);
}

// ---------------------------------------------------------------------------
// Assignment
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_assign_uses_published_curve() {
    let store = open_store("curve").await;
    store
        .put_rate_config(&RateCurveConfig::new(CurveType::Linear, 10.0, 100.0, 10))
        .await
        .unwrap();
    add_mek(&store, "mek-top", None, Some(1)).await;
    add_mek(&store, "mek-low", None, Some(10)).await;

    let collector = CheckpointCollector::new(store.clone());
    let now = Utc::now();
    collector
        .assign(&SlotKey::new(OWNER, "miner", 0), "mek-top", now)
        .await
        .unwrap();
    collector
        .assign(&SlotKey::new(OWNER, "miner", 1), "mek-low", now)
        .await
        .unwrap();

    let top = store.get_mek("mek-top").await.unwrap().unwrap();
    let low = store.get_mek("mek-low").await.unwrap().unwrap();
    assert_eq!(top.base_daily_rate, Some(Gold::from_whole(2400)));
    assert_eq!(low.base_daily_rate, Some(Gold::from_whole(240)));

    let reporter = AggregateReporter::new(store.clone());
    let summary = reporter.total_daily_rate(OWNER).await.unwrap();
    assert_eq!(summary.total_daily_rate, Gold::from_whole(2640));
    assert_eq!(summary.active_slots, 2);
}

#[tokio::test]
async fn test_reassignment_policy() {
    for settle in [false, true] {
        let store = open_store("reassign").await;
        let now = Utc::now();
        let key = SlotKey::new(OWNER, "miner", 0);
        add_mek(&store, "mek-1", Some(100.0), None).await;
        add_mek(&store, "mek-2", Some(100.0), None).await;
        backdate_slot(&store, &key, "mek-1", now - Duration::days(1), 1, 0).await;

        let collector = CheckpointCollector::new(store.clone()).with_policy(IncomePolicy {
            settle_on_reassign: settle,
        });
        let change = collector.assign(&key, "mek-2", now).await.unwrap();

        let expected = if settle {
            Gold::from_whole(100)
        } else {
            Gold::zero()
        };
        assert_eq!(balance(&store).await, expected);
        assert_eq!(change.settled.is_some(), settle);

        let slot = store.get_slot(&key).await.unwrap().unwrap();
        assert_eq!(slot.assigned_mek_id.as_deref(), Some("mek-2"));
        assert_eq!(slot.last_checkpoint, Some(now));
        assert!(!store.get_mek("mek-1").await.unwrap().unwrap().is_assigned());
    }
}

// ---------------------------------------------------------------------------
// RPC
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_rpc_round_trip() {
    let store = open_store("rpc").await;
    add_mek(&store, "mek-1", None, Some(1)).await;
    let server = MekGoldRpcServer::new(RpcConfig::default(), store.clone());

    let resp = server
        .handle(rpc(
            "rates/evaluate",
            json!({"meks": [{"asset_id": "a", "rarity_rank": 1}, {"asset_id": "b", "rarity_rank": 4500}, {"asset_id": "c"}]}),
        ))
        .await;
    let rates = resp.result.unwrap()["rates"].clone();
    assert_eq!(rates[0]["daily_rate"], json!(2400.0));
    assert_eq!(rates[1]["daily_rate"], json!(240.0));
    assert_eq!(rates[2]["daily_rate"], json!(1320.27));

    let resp = server
        .handle(rpc(
            "slots/assign",
            json!({"stake_address": OWNER, "slot_type": "miner", "slot_index": 0, "asset_id": "mek-1"}),
        ))
        .await;
    assert_eq!(resp.result.unwrap()["success"], json!(true));

    // Immediately after assignment there is nothing to collect yet.
    let resp = server
        .handle(rpc(
            "income/collect",
            json!({"stake_address": OWNER, "slot_type": "miner", "slot_index": 0}),
        ))
        .await;
    let result = resp.result.unwrap();
    assert_eq!(result["success"], json!(false));
    assert_eq!(result["error_kind"], json!("too_soon"));

    let resp = server
        .handle(rpc("income/daily_rate", json!({"stake_address": OWNER})))
        .await;
    let result = resp.result.unwrap();
    assert_eq!(result["total_daily_rate"], json!(2400.0));
    assert_eq!(result["active_slots"], json!(1));
    assert_eq!(result["total_slots"], json!(1));

    let resp = server
        .handle(rpc("income/pending", json!({"stake_address": OWNER})))
        .await;
    let result = resp.result.unwrap();
    assert_eq!(result["slots"][0]["asset_id"], json!("mek-1"));

    let resp = server
        .handle(rpc(
            "slots/unassign",
            json!({"stake_address": OWNER, "slot_type": "miner", "slot_index": 0}),
        ))
        .await;
    assert_eq!(resp.result.unwrap()["success"], json!(true));

    let resp = server
        .handle(rpc("income/collect_all", json!({"stake_address": OWNER})))
        .await;
    let result = resp.result.unwrap();
    assert_eq!(result["success"], json!(true));
    assert_eq!(result["slots_collected"], json!(0));
}
