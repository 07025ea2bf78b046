//! End-to-end placement scenarios from spec §8, driven through
//! `Controller::run`/`stop` and the real `Scheduler`/`MockSwarmClient` pair
//! rather than unit-level calls, so the admission → queue → scheduler path
//! is exercised together.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use quartermaster::config::ControllerConfig;
use quartermaster::controller::Controller;
use quartermaster::domain::models::{Node, NodeRole, RunRequest};
use quartermaster::ledger::InventoryLedger;
use quartermaster::scheduler::{PlacementQueue, Scheduler};
use quartermaster::swarm::MockSwarmClient;
use tokio::sync::broadcast;

fn worker(id: &str, available: u64) -> Node {
    Node {
        id: id.to_string(),
        hostname: format!("host-{id}"),
        platform_os: "linux".into(),
        platform_arch: "x86_64".into(),
        status: "active".into(),
        state: "ready".into(),
        role: NodeRole::Worker,
        capacity_bytes: 1024,
        available_bytes: available,
        cpu_count: 2,
        version: 1,
    }
}

fn run_request(memory: i64) -> RunRequest {
    RunRequest {
        token: "secret".into(),
        command: "sleep 1".into(),
        image: "x".into(),
        name: "demo".into(),
        auth: None,
        labels: HashMap::new(),
        memory,
    }
}

struct Harness {
    controller: Arc<Controller>,
    ledger: Arc<InventoryLedger>,
    swarm: Arc<MockSwarmClient>,
    _shutdown: broadcast::Sender<()>,
    scheduler_handle: tokio::task::JoinHandle<()>,
}

impl Harness {
    async fn new(retry: Duration) -> Self {
        let ledger = Arc::new(InventoryLedger::new());
        let swarm = Arc::new(MockSwarmClient::new());
        let (queue, rx) = PlacementQueue::new(10);
        let (shutdown, _) = broadcast::channel(1);

        let scheduler = Arc::new(Scheduler::new(ledger.clone(), swarm.clone(), retry, None));
        let scheduler_handle = scheduler.spawn(rx, shutdown.subscribe());

        let config = ControllerConfig {
            token: "secret".into(),
            ..ControllerConfig::default()
        };
        let controller = Arc::new(Controller::new(ledger.clone(), swarm.clone(), queue, config));

        Self {
            controller,
            ledger,
            swarm,
            _shutdown: shutdown,
            scheduler_handle,
        }
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.scheduler_handle.abort();
    }
}

/// Scenario 1: basic placement onto the single ready node.
#[tokio::test]
async fn basic_placement() {
    let harness = Harness::new(Duration::from_millis(10)).await;
    harness.ledger.upsert_node(worker("n1", 1024)).await;

    let id = harness.controller.run(run_request(512)).await.unwrap();

    // Give the scheduler a moment to drain the queue.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let task = harness.ledger.get_task(&id).await.expect("task should be placed");
    assert_eq!(task.node_id, "n1");
    assert_eq!(
        task.placement.0,
        vec!["node.role == worker".to_string(), "node.id == n1".to_string()]
    );
    assert_eq!(harness.ledger.get_node("n1").await.unwrap().available_bytes, 512);

    let info = harness.swarm.inspect_service(&id).await.unwrap();
    assert_eq!(info.replicas, 1);
}

/// Scenario 2: two requests that each fit on a different node both place.
#[tokio::test]
async fn two_requests_place_on_separate_nodes() {
    let harness = Harness::new(Duration::from_millis(10)).await;
    harness.ledger.upsert_node(worker("n1", 256)).await;
    harness.ledger.upsert_node(worker("n2", 256)).await;

    let id_a = harness.controller.run(run_request(200)).await.unwrap();
    let id_b = harness.controller.run(run_request(200)).await.unwrap();

    tokio::time::sleep(Duration::from_millis(80)).await;

    let task_a = harness.ledger.get_task(&id_a).await.expect("a placed");
    let task_b = harness.ledger.get_task(&id_b).await.expect("b placed");
    assert_ne!(task_a.node_id, task_b.node_id, "each node only had room for one");
}

/// Scenario 3: a task that can't fit waits until a Stop frees capacity.
#[tokio::test]
async fn queued_task_places_once_capacity_is_released() {
    let harness = Harness::new(Duration::from_millis(20)).await;

    // N1 has capacity 500, with a 400-MiB task already placed on it,
    // leaving 100 available — matching the scenario's starting point.
    let mut n1 = worker("n1", 100);
    n1.capacity_bytes = 500;
    harness.ledger.upsert_node(n1).await;
    harness
        .ledger
        .add_task(quartermaster::domain::models::Task {
            id: "placed-earlier".into(),
            name: "earlier".into(),
            memory_bytes: 400,
            image: "x".into(),
            command: vec!["sleep".into()],
            node_id: "n1".into(),
            replicas: 1,
            placement: quartermaster::domain::models::PlacementDescriptor::for_node("n1"),
        })
        .await;

    let waiting_id = harness.controller.run(run_request(500)).await.unwrap();

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(
        harness.ledger.get_task(&waiting_id).await.is_none(),
        "task should still be waiting for capacity"
    );

    harness.controller.stop("placed-earlier").await.unwrap();

    tokio::time::sleep(Duration::from_millis(80)).await;

    assert!(
        harness.ledger.get_task(&waiting_id).await.is_some(),
        "waiting task should place once capacity frees up"
    );
}

/// Scenario 6: wrong token yields an error and no swarm call takes place.
/// The bearer-token check happens at the HTTP layer, not inside
/// `Controller`, so this goes through the `api::handlers::run` handler.
#[tokio::test]
async fn auth_failure_has_no_side_effects() {
    let harness = Harness::new(Duration::from_millis(10)).await;
    harness.ledger.upsert_node(worker("n1", 1024)).await;

    let mut req = run_request(128);
    req.token = "wrong".into();

    let result = quartermaster::api::handlers::run(
        axum::extract::State(harness.controller.clone()),
        axum::Json(req),
    )
    .await;

    assert!(result.is_err());
    assert!(harness.swarm.list_services().await.unwrap().is_empty());
}
