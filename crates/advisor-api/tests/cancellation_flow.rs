//! End-to-end tests for the recommendation and cancellation endpoints.
//!
//! These spin up a real server on a random port with a scripted LLM
//! provider and a temp-dir inventory, then drive it over HTTP the way the
//! dashboard does — including the cancel-before-create race and a cancel
//! landing mid-run.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Notify};

use advisor::{
    FileInventory, GenerateOptions, LlmError, LlmProvider, LlmResponse, ProviderRegistry,
    RecommendationCache, TaskRegistry, TokenUsage,
};
use advisor_api::{routes::build_router, AppState, Config};

const VALID_ANSWER: &str = r#"{
    "recommendations": {
        "effective_recommendation": {"text": "Move cold blobs to Archive", "saving_pct": 22.0},
        "base_of_recommendations": ["UsedCapacity (GiB): 118.2"]
    },
    "cost_forecasting": {"monthly": 316.04, "annually": 3792.35},
    "anomalies": [],
    "contract_deal": {"assessment": "unknown", "reason": "no contract price"}
}"#;

// =============================================================================
// Scripted provider
// =============================================================================

/// Provider that counts calls and can gate them on a test-controlled
/// handshake, so a cancel can be injected deterministically mid-run.
struct ScriptedProvider {
    calls: AtomicUsize,
    /// Sends once per call as it begins, when set.
    started: Option<mpsc::UnboundedSender<()>>,
    /// Each call waits here before answering, when set.
    gate: Option<Arc<Notify>>,
}

impl ScriptedProvider {
    fn immediate() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            started: None,
            gate: None,
        }
    }

    fn gated() -> (Self, mpsc::UnboundedReceiver<()>, Arc<Notify>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let gate = Arc::new(Notify::new());
        let provider = Self {
            calls: AtomicUsize::new(0),
            started: Some(tx),
            gate: Some(gate.clone()),
        };
        (provider, rx, gate)
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }
    fn api_key_env_var(&self) -> &'static str {
        "SCRIPTED_KEY"
    }
    fn is_configured(&self) -> bool {
        true
    }

    async fn generate(
        &self,
        model: &str,
        _system: &str,
        _prompt: &str,
        _options: &GenerateOptions,
    ) -> Result<LlmResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(started) = &self.started {
            let _ = started.send(());
        }
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        Ok(LlmResponse {
            text: VALID_ANSWER.to_string(),
            model: model.to_string(),
            usage: TokenUsage::default(),
        })
    }
}

// =============================================================================
// Server harness
// =============================================================================

fn test_config(inventory_root: &Path) -> Config {
    Config {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        database_url: "sqlite::memory:".to_string(),
        inventory_root: inventory_root.to_path_buf(),
        provider: "scripted".to_string(),
        model: "test-model".to_string(),
        platform: "azure".to_string(),
        max_tokens: None,
    }
}

async fn start_server(
    provider: Arc<dyn LlmProvider>,
    inventory_root: &Path,
) -> (String, Arc<AppState>) {
    let providers = ProviderRegistry::new();
    providers.register(provider);

    let state = Arc::new(AppState {
        registry: Arc::new(TaskRegistry::new()),
        providers: Arc::new(providers),
        inventory: Arc::new(FileInventory::new(inventory_root)),
        cache: RecommendationCache::in_memory().await.unwrap(),
        config: test_config(inventory_root),
    });

    let app = build_router(state.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), state)
}

fn write_inventory(root: &Path, project_id: &str, resource_type: &str, count: usize) {
    let resources: Vec<serde_json::Value> = (0..count)
        .map(|i| {
            serde_json::json!({
                "resource_id": format!("res-{i}"),
                "billed_cost": 311.7,
                "duration_days": 30,
                "sku": "Standard_LRS",
                "access_tier": "Hot",
                "metric_UsedCapacity (GiB)_Avg": 118.2
            })
        })
        .collect();

    let dir = root.join(project_id);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join(format!("{resource_type}.json")),
        serde_json::to_string(&resources).unwrap(),
    )
    .unwrap();
}

fn recommendation_body(resource_id: Option<&str>) -> serde_json::Value {
    let mut body = serde_json::json!({
        "resource_type": "storage",
        "start_date": "2026-07-01",
        "end_date": "2026-07-31"
    });
    if let Some(id) = resource_id {
        body["resource_id"] = serde_json::json!(id);
    }
    body
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_health() {
    let dir = tempfile::tempdir().unwrap();
    let (base, _state) = start_server(Arc::new(ScriptedProvider::immediate()), dir.path()).await;

    let response = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_recommendations_return_array_for_project_scope() {
    let dir = tempfile::tempdir().unwrap();
    write_inventory(dir.path(), "proj-1", "storage", 2);
    let provider = Arc::new(ScriptedProvider::immediate());
    let (base, state) = start_server(provider.clone(), dir.path()).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/llm/projects/proj-1/recommendations"))
        .json(&recommendation_body(None))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "completed");
    assert_eq!(body["message"], "Processed 2/2");
    assert!(body["results"].is_array());
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
    assert_eq!(provider.call_count(), 2);

    // The task is finished and visible through the status endpoint.
    let task_id = body["task_id"].as_str().unwrap();
    let task: serde_json::Value = reqwest::get(format!("{base}/llm/tasks/{task_id}"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(task["status"], "completed");
    assert!(state.registry.active_tasks().is_empty());
}

#[tokio::test]
async fn test_recommendations_return_single_object_for_one_resource() {
    let dir = tempfile::tempdir().unwrap();
    write_inventory(dir.path(), "proj-1", "storage", 3);
    let provider = Arc::new(ScriptedProvider::immediate());
    let (base, _state) = start_server(provider.clone(), dir.path()).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/llm/projects/proj-1/recommendations"))
        .json(&recommendation_body(Some("res-1")))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["results"].is_object());
    assert_eq!(body["results"]["resource_id"], "res-1");
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_cancel_before_create_pre_cancels_the_next_task() {
    let dir = tempfile::tempdir().unwrap();
    write_inventory(dir.path(), "proj-1", "storage", 5);
    let provider = Arc::new(ScriptedProvider::immediate());
    let (base, _state) = start_server(provider.clone(), dir.path()).await;
    let client = reqwest::Client::new();

    // Reset fired before the analysis request ever reached the server.
    let cancel: serde_json::Value = client
        .post(format!("{base}/cancel-tasks/proj-1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cancel["cancelled_count"], 0);
    assert_eq!(cancel["project_id"], "proj-1");

    // The analysis request that was still in flight now lands: its task is
    // born cancelled and no external calls happen.
    let body: serde_json::Value = client
        .post(format!("{base}/llm/projects/proj-1/recommendations"))
        .json(&recommendation_body(None))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "cancelled");
    assert_eq!(body["message"], "Processed 0/5");
    assert_eq!(body["results"].as_array().unwrap().len(), 0);
    assert_eq!(provider.call_count(), 0);

    // The pending entry was consumed: the next request runs normally.
    let body: serde_json::Value = client
        .post(format!("{base}/llm/projects/proj-1/recommendations"))
        .json(&recommendation_body(None))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "completed");
    assert_eq!(provider.call_count(), 5);
}

#[tokio::test]
async fn test_cancel_mid_run_reports_partial_progress() {
    let dir = tempfile::tempdir().unwrap();
    write_inventory(dir.path(), "proj-1", "storage", 3);
    let (provider, mut started, gate) = ScriptedProvider::gated();
    let provider = Arc::new(provider);
    let (base, _state) = start_server(provider.clone(), dir.path()).await;
    let client = reqwest::Client::new();

    let request = tokio::spawn({
        let client = client.clone();
        let url = format!("{base}/llm/projects/proj-1/recommendations");
        async move {
            client
                .post(url)
                .json(&recommendation_body(None))
                .send()
                .await
                .unwrap()
                .json::<serde_json::Value>()
                .await
                .unwrap()
        }
    });

    // Wait until the first provider call is underway, then hit the fast
    // cancel path while it is blocked.
    started.recv().await.unwrap();
    let cancel: serde_json::Value = client
        .post(format!("{base}/cancel-tasks/proj-1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cancel["cancelled_count"], 1);

    // Release the in-flight call; the loop must stop before resource 2.
    gate.notify_one();
    let body = request.await.unwrap();
    assert_eq!(body["status"], "cancelled");
    assert_eq!(body["message"], "Processed 1/3");
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_double_cancel_is_idempotent_and_does_not_poison_later_tasks() {
    let dir = tempfile::tempdir().unwrap();
    write_inventory(dir.path(), "proj-1", "storage", 1);
    let provider = Arc::new(ScriptedProvider::immediate());
    let (base, state) = start_server(provider.clone(), dir.path()).await;
    let client = reqwest::Client::new();

    state.registry.create("proj-1", "llm_analysis");

    // Authenticated-variant route, then the fast path again.
    let first: serde_json::Value = client
        .post(format!("{base}/llm/projects/proj-1/cancel-tasks"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first["cancelled_count"], 1);

    let second: serde_json::Value = client
        .post(format!("{base}/cancel-tasks/proj-1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(second["cancelled_count"], 0);

    // The repeated cancel must not leave a pending entry behind.
    let body: serde_json::Value = client
        .post(format!("{base}/llm/projects/proj-1/recommendations"))
        .json(&recommendation_body(None))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "completed");
    assert_eq!(body["message"], "Processed 1/1");
}

#[tokio::test]
async fn test_cancel_single_task_by_id() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(ScriptedProvider::immediate());
    let (base, state) = start_server(provider, dir.path()).await;
    let client = reqwest::Client::new();

    let task_id = state.registry.create("proj-1", "llm_analysis");

    let response = client
        .post(format!("{base}/llm/tasks/{task_id}/cancel"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["cancelled"], true);
    assert_eq!(body["task_status"], "cancelled");

    // Cancelling again is a no-op, not an error.
    let body: serde_json::Value = client
        .post(format!("{base}/llm/tasks/{task_id}/cancel"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["cancelled"], false);
    assert_eq!(body["task_status"], "cancelled");
}

#[tokio::test]
async fn test_unknown_task_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(ScriptedProvider::immediate());
    let (base, _state) = start_server(provider, dir.path()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/llm/tasks/no-such-task/cancel"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    let response = reqwest::get(format!("{base}/llm/tasks/no-such-task"))
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_invalid_date_range_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(ScriptedProvider::immediate());
    let (base, _state) = start_server(provider, dir.path()).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/llm/projects/proj-1/recommendations"))
        .json(&serde_json::json!({
            "resource_type": "storage",
            "start_date": "2026-07-31",
            "end_date": "2026-07-01"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_repeat_request_is_served_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    write_inventory(dir.path(), "proj-1", "storage", 2);
    let provider = Arc::new(ScriptedProvider::immediate());
    let (base, _state) = start_server(provider.clone(), dir.path()).await;
    let client = reqwest::Client::new();

    for _ in 0..2 {
        let body: serde_json::Value = client
            .post(format!("{base}/llm/projects/proj-1/recommendations"))
            .json(&recommendation_body(None))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "completed");
        assert_eq!(body["results"].as_array().unwrap().len(), 2);
    }

    // Second pass hit the cache; the provider saw only the first two calls.
    assert_eq!(provider.call_count(), 2);
}
