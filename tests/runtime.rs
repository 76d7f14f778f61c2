//! Tests for the fan-in dispatcher, the stateful graph cache, and the
//! timeout recovery path.
mod common;
use ahash::{AHashMap, AHashSet};
use common::*;
use flowgate::error::EngineError;
use flowgate::hash::hash_definition;
use flowgate::prelude::*;
use flowgate::runtime::TransformationState;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn sources(names: &[&str]) -> AHashSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn batch(entries: &[(&str, Value)]) -> AHashMap<String, Value> {
    entries
        .iter()
        .map(|(name, document)| (name.to_string(), document.clone()))
        .collect()
}

#[test]
fn test_transformation_state_lifecycle() {
    let mut state = TransformationState::new("entity-1", sources(&["arc-1", "arc-2"]));
    assert_eq!(state.phase(), Phase::Empty);

    state.record("arc-1", json!({"a": 1}));
    assert_eq!(state.phase(), Phase::Collecting);

    state.record("arc-2", json!({"b": 2}));
    assert_eq!(state.phase(), Phase::Ready);

    state.reset();
    assert_eq!(state.phase(), Phase::Empty);
    assert!(state.collected().is_empty());

    // Re-arrival after reset starts a fresh round; nothing resurrects.
    state.record("arc-1", json!({"a": 9}));
    assert_eq!(state.phase(), Phase::Collecting);
    assert_eq!(state.collected().len(), 1);
    assert_eq!(state.collected()["arc-1"], json!({"a": 9}));
}

#[test]
fn test_transformation_state_arrivals_are_idempotent() {
    let mut state = TransformationState::new("entity-1", sources(&["arc-1", "arc-2"]));
    state.record("arc-1", json!({"first": true}));
    state.record("arc-1", json!({"first": false}));
    assert_eq!(state.phase(), Phase::Collecting);
    // Set semantics: the re-arrival is a no-op.
    assert_eq!(state.collected()["arc-1"], json!({"first": true}));

    // Sources outside the required set never make the round ready.
    state.record("arc-9", json!({}));
    assert_eq!(state.phase(), Phase::Collecting);
}

#[test]
fn test_staleness_rules() {
    let timeout = Duration::from_secs(60);
    let mut state = TransformationState::new("entity-1", sources(&["arc-1", "arc-2"]));
    let long_after = Instant::now() + Duration::from_secs(3600);

    // Empty states hold nothing to discard.
    assert!(!state.is_stale(timeout, long_after));

    state.record("arc-1", json!({}));
    assert!(!state.is_stale(timeout, Instant::now()));
    assert!(state.is_stale(timeout, long_after));

    // Ready states are exempt; they are about to be consumed.
    state.record("arc-2", json!({}));
    assert!(!state.is_stale(timeout, long_after));
}

#[tokio::test]
async fn test_dispatcher_fires_once_when_fan_in_completes() {
    let dispatcher = Dispatcher::new();
    let required = sources(&["arc-1", "arc-2"]);

    let first = dispatcher
        .dispatch("entity-1", &required, batch(&[("arc-1", json!(1))]), |_| async {
            unreachable!("round is not ready yet");
        })
        .await;
    assert!(first.is_none());
    assert_eq!(dispatcher.phase("entity-1").await, Some(Phase::Collecting));

    let second = dispatcher
        .dispatch(
            "entity-1",
            &required,
            batch(&[("arc-2", json!(2))]),
            |data| async move { data },
        )
        .await
        .expect("fan-in is complete");
    assert_eq!(second.len(), 2);
    assert_eq!(second["arc-1"], json!(1));
    assert_eq!(second["arc-2"], json!(2));

    // Consumption reset the state back to Empty.
    assert_eq!(dispatcher.phase("entity-1").await, Some(Phase::Empty));
    assert_eq!(
        dispatcher.collected_data("entity-1").await,
        Some(AHashMap::new())
    );
}

#[tokio::test]
async fn test_dispatcher_tracks_entities_independently() {
    let dispatcher = Dispatcher::new();
    let required = sources(&["arc-1"]);

    let done = dispatcher
        .dispatch("entity-a", &required, batch(&[("arc-1", json!(1))]), |_| async { true })
        .await;
    assert_eq!(done, Some(true));
    assert_eq!(dispatcher.phase("entity-b").await, None);
}

#[tokio::test]
async fn test_expire_stale_resets_only_idle_collecting_states() {
    let dispatcher = Dispatcher::new();
    let required = sources(&["arc-1", "arc-2"]);

    dispatcher
        .dispatch("entity-1", &required, batch(&[("arc-1", json!(1))]), |_| async {})
        .await;

    // Fresh Collecting entries survive a sweep with a generous timeout.
    assert_eq!(dispatcher.expire_stale(Duration::from_secs(300)).await, 0);
    assert_eq!(dispatcher.phase("entity-1").await, Some(Phase::Collecting));

    // With a zero timeout any idle Collecting entry is stale.
    tokio::time::sleep(Duration::from_millis(5)).await;
    assert_eq!(dispatcher.expire_stale(Duration::ZERO).await, 1);
    assert_eq!(dispatcher.phase("entity-1").await, Some(Phase::Empty));

    // Re-arrival of a source after the reset starts from scratch.
    let outcome = dispatcher
        .dispatch("entity-1", &required, batch(&[("arc-2", json!(2))]), |_| async {})
        .await;
    assert!(outcome.is_none());
    let collected = dispatcher.collected_data("entity-1").await.unwrap();
    assert_eq!(collected.len(), 1);
    assert!(collected.contains_key("arc-2"));
}

#[tokio::test]
async fn test_cache_snapshot_survives_rounds_and_failed_rounds() {
    let cache = GraphCache::new();
    let definition = change_detection_definition();
    let graph = Arc::new(deploy(&definition));
    let hash = hash_definition(&definition).unwrap();

    // Round 1: no prior snapshot, gate closed, status remembered.
    let outcome = cache
        .evaluate("entity-1", &graph, &hash, batch(&[("orders", json!({"status": "OPEN"}))]))
        .await
        .unwrap();
    assert!(!outcome.final_result);

    // Round 2: status changed, gate opens.
    let outcome = cache
        .evaluate("entity-1", &graph, &hash, batch(&[("orders", json!({"status": "SHIPPED"}))]))
        .await
        .unwrap();
    assert!(outcome.final_result);

    // A failed round must leave the last successful snapshot untouched.
    let error = cache
        .evaluate("entity-1", &graph, &hash, AHashMap::new())
        .await
        .unwrap_err();
    assert!(matches!(error, flowgate::error::EvalError::SourceMissing { .. }));
    let snapshot = cache.snapshot("entity-1").await.unwrap();
    assert_eq!(snapshot.get("status"), Some(&json!("SHIPPED")));

    // Round 3: unchanged status, gate closed again.
    let outcome = cache
        .evaluate("entity-1", &graph, &hash, batch(&[("orders", json!({"status": "SHIPPED"}))]))
        .await
        .unwrap();
    assert!(!outcome.final_result);
}

#[tokio::test]
async fn test_cache_rebuilds_stale_instance_on_hash_mismatch() {
    let cache = GraphCache::new();
    let definition = change_detection_definition();
    let graph = Arc::new(deploy(&definition));
    let hash = hash_definition(&definition).unwrap();

    cache
        .evaluate("entity-1", &graph, &hash, batch(&[("orders", json!({"status": "OPEN"}))]))
        .await
        .unwrap();
    assert!(!cache.snapshot("entity-1").await.unwrap().is_empty());

    // A new authoritative hash invalidates the instance and its memory.
    let mut changed = definition.canonical();
    changed.nodes.push(common_extra_constant());
    let new_hash = hash_definition(&changed).unwrap();
    assert_ne!(hash, new_hash);

    cache
        .evaluate("entity-1", &graph, &new_hash, batch(&[("orders", json!({"status": "OPEN"}))]))
        .await
        .unwrap();
    let snapshot = cache.snapshot("entity-1").await.unwrap();
    // The rebuilt instance started from an empty snapshot before this round.
    assert_eq!(snapshot.get("status"), Some(&json!("OPEN")));
}

#[tokio::test]
async fn test_cache_invalidate() {
    let cache = GraphCache::new();
    let definition = change_detection_definition();
    let graph = Arc::new(deploy(&definition));
    let hash = hash_definition(&definition).unwrap();

    assert!(!cache.invalidate("entity-1"));
    cache
        .evaluate("entity-1", &graph, &hash, batch(&[("orders", json!({"status": "OPEN"}))]))
        .await
        .unwrap();
    assert!(cache.invalidate("entity-1"));
    assert!(cache.snapshot("entity-1").await.is_none());
}

#[tokio::test]
async fn test_entities_evaluate_in_parallel_without_interference() {
    let cache = Arc::new(GraphCache::new());
    let definition = change_detection_definition();
    let graph = Arc::new(deploy(&definition));
    let hash = hash_definition(&definition).unwrap();

    let mut handles = Vec::new();
    for entity in 0..8 {
        let cache = cache.clone();
        let graph = graph.clone();
        let hash = hash.clone();
        handles.push(tokio::spawn(async move {
            let entity_id = format!("entity-{entity}");
            for round in 0..10 {
                let status = format!("state-{round}");
                cache
                    .evaluate(
                        &entity_id,
                        &graph,
                        &hash,
                        batch(&[("orders", json!({"status": status}))]),
                    )
                    .await
                    .unwrap();
            }
            cache.snapshot(&entity_id).await.unwrap()
        }));
    }

    for handle in handles {
        let snapshot = handle.await.unwrap();
        assert_eq!(snapshot.get("status"), Some(&json!("state-9")));
    }
}

#[tokio::test]
async fn test_engine_round_trip() {
    let engine = GateEngine::new();
    let definition = gt_definition();
    let hash = engine
        .deploy("entity-1", &definition, sources(&["orders"]))
        .unwrap();

    let job = SyncJob {
        entity_id: "entity-1".to_string(),
        script_id: "script-1".to_string(),
        script_code: "push()".to_string(),
        script_language: "javascript".to_string(),
        expected_graph_hash: hash,
        source_data: batch(&[("orders", json!({"total": 250}))]),
    };

    let round = engine.submit(job).await.unwrap().expect("round complete");
    assert!(round.gate);
    assert_eq!(round.entity_id, "entity-1");
}

#[tokio::test]
async fn test_engine_waits_for_fan_in() {
    let engine = GateEngine::new();
    let definition = gt_definition();
    let hash = engine
        .deploy("entity-1", &definition, sources(&["orders", "inventory"]))
        .unwrap();

    let partial = SyncJob {
        entity_id: "entity-1".to_string(),
        script_id: "script-1".to_string(),
        script_code: "push()".to_string(),
        script_language: "javascript".to_string(),
        expected_graph_hash: hash.clone(),
        source_data: batch(&[("orders", json!({"total": 250}))]),
    };
    assert!(engine.submit(partial).await.unwrap().is_none());

    // Monitoring endpoint shows the partially collected data.
    let collected = engine.collected_data("entity-1").await.unwrap();
    assert!(collected.contains_key("orders"));
    assert_eq!(engine.phase("entity-1").await, Some(Phase::Collecting));
    assert!(engine.collected_data("entity-9").await.is_none());

    let completing = SyncJob {
        entity_id: "entity-1".to_string(),
        script_id: "script-1".to_string(),
        script_code: "push()".to_string(),
        script_language: "javascript".to_string(),
        expected_graph_hash: hash,
        source_data: batch(&[("inventory", json!({}))]),
    };
    let round = engine.submit(completing).await.unwrap().unwrap();
    assert!(round.gate);
}

#[tokio::test]
async fn test_engine_rejects_unknown_entity_and_stale_hash() {
    let engine = GateEngine::new();
    let definition = gt_definition();
    let hash = engine
        .deploy("entity-1", &definition, sources(&["orders"]))
        .unwrap();

    let unknown = SyncJob {
        entity_id: "entity-9".to_string(),
        script_id: "script-1".to_string(),
        script_code: "push()".to_string(),
        script_language: "javascript".to_string(),
        expected_graph_hash: hash,
        source_data: batch(&[("orders", json!({}))]),
    };
    assert!(matches!(
        engine.submit(unknown).await.unwrap_err(),
        EngineError::UnknownEntity(entity) if entity == "entity-9"
    ));

    let other_hash = hash_definition(&change_detection_definition()).unwrap();
    let stale = SyncJob {
        entity_id: "entity-1".to_string(),
        script_id: "script-1".to_string(),
        script_code: "push()".to_string(),
        script_language: "javascript".to_string(),
        expected_graph_hash: other_hash,
        source_data: batch(&[("orders", json!({}))]),
    };
    assert!(matches!(
        engine.submit(stale).await.unwrap_err(),
        EngineError::GraphOutdated { .. }
    ));
}

#[tokio::test]
async fn test_engine_rejects_invalid_deployment() {
    let engine = GateEngine::new();
    let result = engine.deploy("entity-1", &cyclic_definition(), sources(&["orders"]));
    assert!(matches!(
        result,
        Err(flowgate::error::DeployError::Invalid(issues)) if !issues.is_empty()
    ));
}

fn common_extra_constant() -> NodeDefinition {
    constant(99, json!(true))
}
