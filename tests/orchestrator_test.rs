use grocery_scan::client::orchestrator::{LogKind, OrchestratorConfig, ScriptStep};
use grocery_scan::client::{BackendClient, BackendConfig, ScanOrchestrator, ScanState};
use grocery_scan::core::Catalog;
use grocery_scan::ScanError;
use httpmock::prelude::*;
use std::time::{Duration, Instant};

fn catalog_body() -> serde_json::Value {
    serde_json::json!({
        "markets": [{"id": "m1", "name": "Bim", "color": "bg-red-700"}],
        "products": [{"id": 1, "name": "Milk", "category": "Dairy", "icon": "🥛",
                      "prices": [{"marketId": "m1", "price": 10.12}]}],
        "lastUpdated": "14.10.2026"
    })
}

fn backend(base_url: String) -> BackendClient {
    BackendClient::new(BackendConfig {
        base_url,
        status_timeout: Duration::from_secs(2),
        scan_timeout: Duration::from_secs(5),
    })
    .unwrap()
}

#[tokio::test]
async fn test_successful_scan_delivers_catalog() {
    let server = MockServer::start();
    let status_mock = server.mock(|when, then| {
        when.method(GET).path("/api/status");
        then.status(200)
            .json_body(serde_json::json!({"status": "online", "port": 3001, "uptime": 12.5}));
    });
    let scan_mock = server.mock(|when, then| {
        when.method(GET).path("/api/scan");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(catalog_body());
    });

    let mut orchestrator =
        ScanOrchestrator::new(backend(server.base_url()), OrchestratorConfig::instant());
    assert_eq!(orchestrator.state(), ScanState::Idle);

    let mut delivered: Option<Catalog> = None;
    let state = orchestrator
        .start_scan(|catalog| delivered = Some(catalog))
        .await
        .unwrap();

    assert_eq!(state, ScanState::Success);
    assert_eq!(orchestrator.state(), ScanState::Success);
    assert_eq!(orchestrator.progress(), 100);
    status_mock.assert();
    scan_mock.assert();

    let catalog = delivered.expect("callback should receive the catalog");
    assert_eq!(catalog.products()[0].prices()[0].price, 10.12);
    assert_eq!(catalog.last_updated.as_deref(), Some("14.10.2026"));

    let logs = orchestrator.logs();
    assert_eq!(logs.first().unwrap().kind, LogKind::System);
    assert_eq!(logs.last().unwrap().kind, LogKind::System);
    assert!(logs.iter().any(|l| l.kind == LogKind::Success));
    assert!(!logs.iter().any(|l| l.kind == LogKind::Error));
}

#[tokio::test]
async fn test_status_failure_goes_to_error_without_scanning() {
    let server = MockServer::start();
    let status_mock = server.mock(|when, then| {
        when.method(GET).path("/api/status");
        then.status(503);
    });
    let scan_mock = server.mock(|when, then| {
        when.method(GET).path("/api/scan");
        then.status(200).json_body(catalog_body());
    });

    let mut orchestrator =
        ScanOrchestrator::new(backend(server.base_url()), OrchestratorConfig::instant());
    let mut called = false;
    let state = orchestrator.start_scan(|_| called = true).await.unwrap();

    assert_eq!(state, ScanState::Error);
    assert!(orchestrator.can_retry());
    assert!(!called);
    status_mock.assert();
    assert_eq!(scan_mock.hits(), 0);
    assert!(orchestrator.logs().iter().any(|l| l.kind == LogKind::Error));
    assert!(orchestrator.logs().iter().any(|l| l.kind == LogKind::Warning));
}

#[tokio::test]
async fn test_unreachable_host_errors_promptly() {
    // port 9 (discard) is not listening on loopback in test environments
    let mut orchestrator = ScanOrchestrator::new(
        backend("http://127.0.0.1:9".to_string()),
        OrchestratorConfig::instant(),
    );

    let started = Instant::now();
    let state = tokio::time::timeout(Duration::from_secs(10), orchestrator.start_scan(|_| {}))
        .await
        .expect("orchestrator must not hang")
        .unwrap();

    assert_eq!(state, ScanState::Error);
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_scan_http_error_goes_to_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/status");
        then.status(200)
            .json_body(serde_json::json!({"status": "online", "port": 3005, "uptime": 1.0}));
    });
    let scan_mock = server.mock(|when, then| {
        when.method(GET).path("/api/scan");
        then.status(500);
    });

    let mut orchestrator =
        ScanOrchestrator::new(backend(server.base_url()), OrchestratorConfig::instant());
    let state = orchestrator.start_scan(|_| {}).await.unwrap();

    assert_eq!(state, ScanState::Error);
    scan_mock.assert();
    let last = orchestrator.logs().last().unwrap();
    assert_eq!(last.kind, LogKind::Error);
    assert!(last.message.contains("500"));
}

#[tokio::test]
async fn test_retry_from_error_and_guard_after_success() {
    let server = MockServer::start();
    let mut failing_status = server.mock(|when, then| {
        when.method(GET).path("/api/status");
        then.status(500);
    });

    let mut orchestrator =
        ScanOrchestrator::new(backend(server.base_url()), OrchestratorConfig::instant());
    assert_eq!(orchestrator.start_scan(|_| {}).await.unwrap(), ScanState::Error);

    failing_status.delete();
    server.mock(|when, then| {
        when.method(GET).path("/api/status");
        then.status(200)
            .json_body(serde_json::json!({"status": "online", "port": 3001, "uptime": 2.0}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/scan");
        then.status(200).json_body(catalog_body());
    });

    assert_eq!(orchestrator.start_scan(|_| {}).await.unwrap(), ScanState::Success);

    // no button is offered once a scan has succeeded
    match orchestrator.start_scan(|_| {}).await {
        Err(ScanError::InvalidTransition { state }) => assert_eq!(state, "success"),
        other => panic!("unexpected: {:?}", other),
    }

    orchestrator.reset();
    assert_eq!(orchestrator.state(), ScanState::Idle);
    assert!(orchestrator.logs().is_empty());
}

#[tokio::test]
async fn test_script_steps_drive_progress_and_delays() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/status");
        then.status(200)
            .json_body(serde_json::json!({"status": "online", "port": 3001, "uptime": 2.0}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/scan");
        then.status(200).json_body(catalog_body());
    });

    let config = OrchestratorConfig {
        script: vec![
            ScriptStep::new("step one", 40, 30),
            ScriptStep::new("step two", 40, 60),
        ],
        settle_delay: Duration::from_millis(20),
    };
    let mut orchestrator = ScanOrchestrator::new(backend(server.base_url()), config);

    let started = Instant::now();
    orchestrator.start_scan(|_| {}).await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(100));

    let messages: Vec<&str> = orchestrator
        .logs()
        .iter()
        .filter(|l| l.kind == LogKind::Info)
        .map(|l| l.message.as_str())
        .collect();
    assert!(messages.contains(&"step one"));
    assert!(messages.contains(&"step two"));
}

async fn scan_with_status_body(body: &str) -> ScanState {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/status");
        then.status(200)
            .header("Content-Type", "application/json")
            .body(body);
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/scan");
        then.status(200).json_body(catalog_body());
    });

    let mut orchestrator =
        ScanOrchestrator::new(backend(server.base_url()), OrchestratorConfig::instant());
    orchestrator.start_scan(|_| {}).await.unwrap()
}

#[tokio::test]
async fn test_port_only_status_body_counts_as_online() {
    let state = scan_with_status_body(r#"{"status":"online","port":3005}"#).await;
    assert_eq!(state, ScanState::Success);
}

#[tokio::test]
async fn test_uptime_only_status_body_counts_as_online() {
    let state = scan_with_status_body(r#"{"status":"online","uptime":42.0}"#).await;
    assert_eq!(state, ScanState::Success);
}

#[tokio::test]
async fn test_any_2xx_status_counts_as_online() {
    let state = scan_with_status_body("ok").await;
    assert_eq!(state, ScanState::Success);
}
