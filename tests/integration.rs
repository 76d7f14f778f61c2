//! End-to-end flows: store to deployment to fan-in to gate decision, plus
//! timeout recovery with a live monitor task.
mod common;
use ahash::{AHashMap, AHashSet};
use common::*;
use flowgate::hash::hash_definition;
use flowgate::prelude::*;
use serde_json::{json, Value};
use std::time::Duration;

fn job(entity: &str, hash: &GraphHash, data: &[(&str, Value)]) -> SyncJob {
    SyncJob {
        entity_id: entity.to_string(),
        script_id: "script-42".to_string(),
        script_code: "target.push(transform(sources))".to_string(),
        script_language: "javascript".to_string(),
        expected_graph_hash: hash.clone(),
        source_data: data
            .iter()
            .map(|(name, document)| (name.to_string(), document.clone()))
            .collect(),
    }
}

#[test]
fn test_store_round_trip() {
    let store = MemoryGraphStore::new();
    let definition = change_detection_definition();

    let id = store.persist("order-sync", definition.clone()).unwrap();
    assert!(matches!(
        store.persist("order-sync", definition.clone()),
        Err(flowgate::error::StoreError::DuplicateName(_))
    ));

    let by_id = store.find_by_id(id).unwrap();
    let by_name = store.find_by_name("order-sync").unwrap();
    assert_eq!(by_id, by_name);
    assert_eq!(by_id.definition, definition);

    // The stored definition hashes identically to the original.
    assert_eq!(
        hash_definition(&by_id.definition).unwrap(),
        hash_definition(&definition).unwrap()
    );

    assert!(store.delete(id));
    assert!(!store.delete(id));
    assert!(store.find_by_name("order-sync").is_none());
}

#[test]
fn test_hash_is_stable_across_node_order() {
    let definition = change_detection_definition();
    let mut shuffled = definition.clone();
    shuffled.nodes.reverse();

    assert_eq!(
        hash_definition(&definition).unwrap(),
        hash_definition(&shuffled).unwrap()
    );

    let mut different = definition.clone();
    different.nodes.push(constant(99, json!(false)));
    assert_ne!(
        hash_definition(&definition).unwrap(),
        hash_definition(&different).unwrap()
    );
}

#[tokio::test]
async fn test_change_detection_over_multiple_rounds() {
    let engine = GateEngine::new();
    let definition = change_detection_definition();
    let required: AHashSet<String> = ["orders".to_string()].into_iter().collect();
    let hash = engine.deploy("entity-1", &definition, required).unwrap();

    // Round 1: nothing remembered yet, the gate stays closed.
    let round = engine
        .submit(job("entity-1", &hash, &[("orders", json!({"status": "OPEN"}))]))
        .await
        .unwrap()
        .unwrap();
    assert!(!round.gate);
    assert_eq!(
        round.snapshot.unwrap().get("status"),
        Some(&json!("OPEN"))
    );

    // Round 2: status flipped, the gate opens and the caller would now run
    // the script stage.
    let round = engine
        .submit(job("entity-1", &hash, &[("orders", json!({"status": "SHIPPED"}))]))
        .await
        .unwrap()
        .unwrap();
    assert!(round.gate);

    // Round 3: no change, closed again.
    let round = engine
        .submit(job("entity-1", &hash, &[("orders", json!({"status": "SHIPPED"}))]))
        .await
        .unwrap()
        .unwrap();
    assert!(!round.gate);

    let snapshot = engine.cached_snapshot("entity-1").await.unwrap();
    assert_eq!(snapshot.get("status"), Some(&json!("SHIPPED")));
}

#[tokio::test]
async fn test_fan_in_across_two_source_pollers() {
    let engine = GateEngine::new();
    // Gate on data from both sources: orders total above the inventory floor.
    let definition = definition(vec![
        provider(1, "orders", "total"),
        provider(2, "inventory", "floor"),
        logic(3, "GREATER_THAN", &[1, 2]),
    ]);
    let required: AHashSet<String> = ["orders".to_string(), "inventory".to_string()]
        .into_iter()
        .collect();
    let hash = engine.deploy("entity-1", &definition, required).unwrap();

    let waiting = engine
        .submit(job("entity-1", &hash, &[("orders", json!({"total": 70}))]))
        .await
        .unwrap();
    assert!(waiting.is_none());

    let round = engine
        .submit(job("entity-1", &hash, &[("inventory", json!({"floor": 50}))]))
        .await
        .unwrap()
        .unwrap();
    assert!(round.gate);

    // The consumed round cleared the fan-in; a lone arrival waits again.
    let waiting = engine
        .submit(job("entity-1", &hash, &[("orders", json!({"total": 80}))]))
        .await
        .unwrap();
    assert!(waiting.is_none());
}

#[tokio::test]
async fn test_monitor_recovers_a_stalled_transformation() {
    let engine = GateEngine::new();
    let definition = gt_definition();
    let required: AHashSet<String> = ["orders".to_string(), "inventory".to_string()]
        .into_iter()
        .collect();
    let hash = engine.deploy("entity-1", &definition, required).unwrap();

    // One source reports, the other never does.
    engine
        .submit(job("entity-1", &hash, &[("orders", json!({"total": 250}))]))
        .await
        .unwrap();
    assert_eq!(engine.phase("entity-1").await, Some(Phase::Collecting));

    let config = RuntimeConfig {
        collect_timeout_secs: 0,
        monitor_interval_secs: 1,
    };
    let monitor = TimeoutMonitor::new(engine.dispatcher(), config).spawn();

    // Give the monitor time for at least one sweep after the data went
    // stale.
    tokio::time::sleep(Duration::from_millis(1300)).await;
    monitor.abort();

    assert_eq!(engine.phase("entity-1").await, Some(Phase::Empty));
    assert_eq!(
        engine.collected_data("entity-1").await,
        Some(AHashMap::new())
    );
}
