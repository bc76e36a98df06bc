use grocery_scan::config::ServerConfig;
use grocery_scan::core::catalog::SnapshotPolicy;
use grocery_scan::core::stages::{StageKind, StageSpec};
use grocery_scan::core::{Catalog, StatusReport};
use grocery_scan::server;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use tokio::net::TcpListener;

const CATALOG: &str = r#"{
    "markets": [
        {"id": "m1", "name": "Esenlik", "color": "bg-red-500"},
        {"id": "m2", "name": "Migros", "color": "bg-orange-500"}
    ],
    "products": [
        {"id": 1, "name": "Milk", "category": "Dairy", "icon": "🥛",
         "prices": [{"marketId": "m1", "price": 10.0}, {"marketId": "m2", "price": 12.4}]},
        {"id": 2, "name": "Bread", "category": "Bakery", "icon": "🍞",
         "prices": [{"marketId": "m2", "price": 7.5}]}
    ],
    "lastUpdated": "01.01.2025"
}"#;

fn catalog_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn test_config(catalog_path: &str, stages: Vec<StageSpec>) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.catalog.path = catalog_path.to_string();
    config.jitter.low = 0.95;
    config.jitter.high = 1.05;
    config.scan.stages = stages;
    config
}

fn instant_stages() -> Vec<StageSpec> {
    vec![
        StageSpec::new(StageKind::Connect, 0),
        StageSpec::new(StageKind::Authenticate, 0),
        StageSpec::new(StageKind::Enumerate, 0),
        StageSpec::new(StageKind::Extract, 0),
    ]
}

async fn spawn_server(config: ServerConfig) -> SocketAddr {
    let scanner = Arc::new(server::build_scan_service(&config).await.unwrap());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        server::serve(listener, scanner).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn test_status_reports_online_with_port() {
    let file = catalog_file(CATALOG);
    let addr = spawn_server(test_config(file.path().to_str().unwrap(), instant_stages())).await;

    let response = reqwest::get(format!("http://{}/api/status", addr)).await.unwrap();
    assert_eq!(response.status(), 200);

    let report: StatusReport = response.json().await.unwrap();
    assert!(report.is_online());
    assert_eq!(report.port, Some(addr.port()));
    assert!(report.uptime.is_some_and(|u| u >= 0.0));
}

#[tokio::test]
async fn test_scan_returns_jittered_catalog() {
    let file = catalog_file(CATALOG);
    let addr = spawn_server(test_config(file.path().to_str().unwrap(), instant_stages())).await;
    let original = Catalog::from_json_str(CATALOG).unwrap();

    for _ in 0..5 {
        let response = reqwest::get(format!("http://{}/api/scan", addr)).await.unwrap();
        assert_eq!(response.status(), 200);
        let scanned: Catalog = response.json().await.unwrap();

        assert_eq!(scanned.markets, original.markets);
        assert_eq!(scanned.market_ids(), scanned.referenced_market_ids());
        assert_ne!(scanned.last_updated.as_deref(), Some("01.01.2025"));

        // fresh policy: each scan lands within one band of the loaded price
        for (before, after) in original.products().iter().zip(scanned.products()) {
            assert_eq!(before.id, after.id);
            for (b, a) in before.prices().iter().zip(after.prices()) {
                assert_eq!(b.market_id, a.market_id);
                assert!(a.price >= b.price * 0.95 - 1e-9, "{} vs {}", a.price, b.price);
                assert!(a.price <= b.price * 1.05 + 1e-9, "{} vs {}", a.price, b.price);
            }
        }
    }
}

#[tokio::test]
async fn test_scan_waits_for_configured_stages() {
    let file = catalog_file(CATALOG);
    let stages = vec![
        StageSpec::new(StageKind::Connect, 100),
        StageSpec::new(StageKind::Extract, 50),
    ];
    let addr = spawn_server(test_config(file.path().to_str().unwrap(), stages)).await;

    let started = Instant::now();
    let response = reqwest::get(format!("http://{}/api/scan", addr)).await.unwrap();
    assert_eq!(response.status(), 200);
    assert!(started.elapsed() >= Duration::from_millis(150));
}

#[tokio::test]
async fn test_missing_catalog_serves_empty_document() {
    let addr = spawn_server(test_config("/no/such/catalog.json", instant_stages())).await;

    let status = reqwest::get(format!("http://{}/api/status", addr)).await.unwrap();
    assert_eq!(status.status(), 200);

    let response = reqwest::get(format!("http://{}/api/scan", addr)).await.unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({}));
}

#[tokio::test]
async fn test_cumulative_policy_drifts_between_scans() {
    let file = catalog_file(CATALOG);
    let mut config = test_config(file.path().to_str().unwrap(), instant_stages());
    config.jitter.low = 0.5;
    config.jitter.high = 0.5;
    config.jitter.policy = SnapshotPolicy::Cumulative;
    let addr = spawn_server(config).await;

    let first: Catalog = reqwest::get(format!("http://{}/api/scan", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let second: Catalog = reqwest::get(format!("http://{}/api/scan", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(first.products()[0].prices()[0].price, 5.0);
    assert_eq!(second.products()[0].prices()[0].price, 2.5);
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let file = catalog_file(CATALOG);
    let addr = spawn_server(test_config(file.path().to_str().unwrap(), instant_stages())).await;

    let response = reqwest::Client::new()
        .get(format!("http://{}/api/status", addr))
        .header("Origin", "http://localhost:5173")
        .send()
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let file = catalog_file(CATALOG);
    let addr = spawn_server(test_config(file.path().to_str().unwrap(), instant_stages())).await;

    let response = reqwest::get(format!("http://{}/api/prices", addr)).await.unwrap();
    assert_eq!(response.status(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "NOT_FOUND");
    assert_eq!(body["code"], 404);
}
