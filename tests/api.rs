use axum::http::StatusCode;
use axum::body::Body;
use http_body_util::BodyExt;
use tower::ServiceExt;
use serde_json::{json, Value};
use exploitdb::api::{build_router, AppState};
use exploitdb::db::{ExploitStore, KvStore, MemoryHashStore, RdbStore, REDIS_BACKEND};
use exploitdb::models::Exploit;
use std::sync::Arc;

fn seed() -> Vec<Exploit> {
    vec![
        Exploit::awesome_poc("CVE-2014-6271", "Shellshock", "https://example.com/shellshock"),
        Exploit::github_repository("CVE-2014-6271", "bash poc", "https://github.com/a/shellshock", 12, 3),
        Exploit::github_repository("CVE-2019-0708", "BlueKeep", "https://github.com/b/bluekeep", 400, 90),
    ]
}

async fn sqlite_state() -> AppState {
    let store = RdbStore::in_memory().unwrap();
    store.insert_exploits(&seed()).await.unwrap();
    AppState { store: Arc::new(store) }
}

async fn kv_state() -> AppState {
    let store = KvStore::new(REDIS_BACKEND, MemoryHashStore::new("memory://api"));
    store.insert_exploits(&seed()).await.unwrap();
    AppState { store: Arc::new(store) }
}

fn make_request(method: &str, uri: &str, body: Option<Value>) -> axum::http::Request<Body> {
    let builder = axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");

    match body {
        Some(b) => builder.body(Body::from(serde_json::to_string(&b).unwrap())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn response_json(response: axum::http::Response<Body>) -> Value {
    let (parts, body) = response.into_parts();
    let bytes = body.collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        panic!("Empty response body. Status: {}, Headers: {:?}", parts.status, parts.headers);
    }
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("JSON parse error: {}. Body: {:?}", e, String::from_utf8_lossy(&bytes)))
}

#[tokio::test]
async fn test_health_endpoint() {
    let state = sqlite_state().await;
    let response = build_router(state).oneshot(make_request("GET", "/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_get_by_cve_id() {
    for state in [sqlite_state().await, kv_state().await] {
        let response = build_router(state)
            .oneshot(make_request("GET", "/cves/CVE-2014-6271", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response_json(response).await;
        let records = body.as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r["cve_id"] == "CVE-2014-6271"));
    }
}

#[tokio::test]
async fn test_get_by_cve_id_not_found_is_empty() {
    let state = sqlite_state().await;
    let response = build_router(state)
        .oneshot(make_request("GET", "/cves/CVE-1999-0001", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await, json!([]));
}

#[tokio::test]
async fn test_get_by_unique_id() {
    let state = kv_state().await;
    let response = build_router(state)
        .oneshot(make_request("GET", "/id/GitHubRepository-https:%2F%2Fgithub.com%2Fb%2Fbluekeep", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body[0]["cve_id"], "CVE-2019-0708");
    assert_eq!(body[0]["github_repository"]["star"], 400);
}

#[tokio::test]
async fn test_post_multi_cve() {
    let state = sqlite_state().await;
    let req = make_request("POST", "/cves", Some(json!({
        "cve_ids": ["CVE-2019-0708", "CVE-2000-0000"]
    })));
    let response = build_router(state).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["CVE-2019-0708"].as_array().unwrap().len(), 1);
    assert_eq!(body["CVE-2000-0000"], json!([]));
}

#[tokio::test]
async fn test_get_all_relational() {
    let state = sqlite_state().await;
    let response = build_router(state).oneshot(make_request("GET", "/exploits", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_get_all_keyvalue_not_implemented() {
    let state = kv_state().await;
    let response = build_router(state).oneshot(make_request("GET", "/exploits", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);

    let body = response_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("not supported"));
}

#[tokio::test]
async fn test_unknown_route() {
    let state = sqlite_state().await;
    let response = build_router(state).oneshot(make_request("GET", "/nope", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_requests_are_written_to_access_log() {
    use exploitdb::utils::logging::{build_filter, file_layers, ACCESS_LOG_FILE, APP_LOG_FILE};
    use tracing_subscriber::layer::SubscriberExt;

    let dir = tempfile::tempdir().unwrap();
    let subscriber = tracing_subscriber::registry().with(file_layers(dir.path(), build_filter("info")).unwrap());
    let guard = tracing::subscriber::set_default(subscriber);

    let app = build_router(sqlite_state().await);
    let response = app.oneshot(make_request("GET", "/cves/CVE-2019-0708", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    drop(guard);

    let access = std::fs::read_to_string(dir.path().join(ACCESS_LOG_FILE)).unwrap();
    assert!(access.contains("GET"));
    assert!(access.contains("/cves/CVE-2019-0708"));
    assert!(access.contains("status=200"));
    let app_log = std::fs::read_to_string(dir.path().join(APP_LOG_FILE)).unwrap();
    assert!(!app_log.contains("/cves/CVE-2019-0708"));
}
