//! Reconciler scenarios from spec §8: manager filtering (4) and GC on
//! vanish (5), plus the cross-cycle idempotence/preservation properties
//! P6 and P8.

use std::sync::Arc;

use quartermaster::domain::models::{Node, NodeRole};
use quartermaster::domain::ports::SwarmTaskInfo;
use quartermaster::ledger::InventoryLedger;
use quartermaster::reconcile::{NodeReconciler, ServiceReconciler};
use quartermaster::swarm::MockSwarmClient;

fn node(id: &str, role: NodeRole, available: u64) -> Node {
    Node {
        id: id.to_string(),
        hostname: format!("host-{id}"),
        platform_os: "linux".into(),
        platform_arch: "x86_64".into(),
        status: "active".into(),
        state: "ready".into(),
        role,
        capacity_bytes: 1024,
        available_bytes: available,
        cpu_count: 2,
        version: 1,
    }
}

/// Scenario 4: the swarm reports one manager and one worker; only the
/// worker should ever enter the ledger.
#[tokio::test]
async fn manager_is_filtered_worker_is_admitted() {
    let swarm = Arc::new(MockSwarmClient::new());
    swarm.seed_node(node("manager-1", NodeRole::Manager, 1024)).await;
    swarm.seed_node(node("worker-1", NodeRole::Worker, 1024)).await;

    let ledger = Arc::new(InventoryLedger::new());
    let reconciler = NodeReconciler::new(ledger.clone(), swarm);
    reconciler.reconcile_once().await;

    let nodes = ledger.list_nodes().await;
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].id, "worker-1");
}

/// Scenario 5: a ledger task whose swarm task has vanished is garbage
/// collected and its memory is returned to the node.
#[tokio::test]
async fn vanished_task_is_gced_and_memory_returned() {
    let ledger = Arc::new(InventoryLedger::new());
    ledger.upsert_node(node("n1", NodeRole::Worker, 1024)).await;
    ledger.reserve(512).await;
    ledger
        .add_task(quartermaster::domain::models::Task {
            id: "t1".into(),
            name: "svc-t1".into(),
            memory_bytes: 512,
            image: "x".into(),
            command: vec!["sleep".into()],
            node_id: "n1".into(),
            replicas: 1,
            placement: quartermaster::domain::models::PlacementDescriptor::for_node("n1"),
        })
        .await;

    let swarm = Arc::new(MockSwarmClient::new()); // no task seeded: t1 has vanished
    let reconciler = ServiceReconciler::new(ledger.clone(), swarm);
    reconciler.reconcile_once().await;

    assert!(ledger.get_task("t1").await.is_none());
    assert_eq!(ledger.get_node("n1").await.unwrap().available_bytes, 1024);
}

/// P5: after a reconciler cycle, every surviving ledger task corresponds
/// to a swarm task reported as "running".
#[tokio::test]
async fn surviving_tasks_all_have_a_running_swarm_counterpart() {
    let ledger = Arc::new(InventoryLedger::new());
    ledger.upsert_node(node("n1", NodeRole::Worker, 512)).await;
    ledger
        .add_task(quartermaster::domain::models::Task {
            id: "t1".into(),
            name: "svc-t1".into(),
            memory_bytes: 512,
            image: "x".into(),
            command: vec!["sleep".into()],
            node_id: "n1".into(),
            replicas: 1,
            placement: quartermaster::domain::models::PlacementDescriptor::for_node("n1"),
        })
        .await;

    let swarm = Arc::new(MockSwarmClient::new());
    swarm
        .seed_task(SwarmTaskInfo {
            id: "swarm-t1".into(),
            service_id: "t1".into(),
            node_id: "n1".into(),
            state: "running".into(),
            message: "started".into(),
        })
        .await;

    let reconciler = ServiceReconciler::new(ledger.clone(), swarm.clone());
    reconciler.reconcile_once().await;

    let tracked = ledger.list_tasks().await;
    assert_eq!(tracked.len(), 1);
    let running_ids: Vec<String> = swarm
        .list_tasks()
        .await
        .unwrap()
        .into_iter()
        .filter(|t| t.state == "running")
        .map(|t| t.service_id)
        .collect();
    assert!(tracked.iter().all(|t| running_ids.contains(&t.id)));
}

/// P6 / P8: available memory is preserved across consecutive node
/// reconciler cycles with no cluster change, and the cycles are idempotent.
#[tokio::test]
async fn consecutive_cycles_with_no_change_are_idempotent() {
    let swarm = Arc::new(MockSwarmClient::new());
    swarm.seed_node(node("n1", NodeRole::Worker, 1024)).await;

    let ledger = Arc::new(InventoryLedger::new());
    let reconciler = NodeReconciler::new(ledger.clone(), swarm);
    reconciler.reconcile_once().await;
    ledger.reserve(300).await;

    let before = ledger.get_node("n1").await.unwrap();
    reconciler.reconcile_once().await;
    reconciler.reconcile_once().await;
    let after = ledger.get_node("n1").await.unwrap();

    assert_eq!(before.available_bytes, after.available_bytes);
    assert_eq!(ledger.list_nodes().await.len(), 1);
}
