//! `DocumentsClient` against a live server and a deliberately slow mock.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use docrelay_api::auth::StaticTokenAuthenticator;
use docrelay_api::{AppState, Server, ServerConfig};
use docrelay_sdk::{ClientConfig, ClientError, DocumentChanges, DocumentQuery, DocumentsClient, NewDocument};
use serde_json::{json, Value};
use tokio::net::TcpListener;

const TOKEN: &str = "token-carol";

async fn spawn_server() -> String {
    let auth = StaticTokenAuthenticator::default().with_token(TOKEN, "user-carol");
    let state = AppState::in_memory(Arc::new(auth));
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    let server = Server::new(ServerConfig::default(), state);
    tokio::spawn(server.serve(listener, std::future::pending()));
    format!("http://{addr}")
}

#[derive(Clone, Default)]
struct SlowState {
    gets: Arc<AtomicUsize>,
    posts: Arc<AtomicUsize>,
}

async fn slow_list(State(state): State<SlowState>) -> Json<Value> {
    state.gets.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(2)).await;
    Json(json!([]))
}

async fn slow_create(State(state): State<SlowState>) -> (StatusCode, Json<Value>) {
    state.posts.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(2)).await;
    (StatusCode::OK, Json(json!({})))
}

async fn spawn_slow() -> (String, SlowState) {
    let state = SlowState::default();
    let app = Router::new()
        .route("/api/documents", get(slow_list).post(slow_create))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), state)
}

#[tokio::test]
async fn test_health() {
    let base = spawn_server().await;
    let client = DocumentsClient::new(ClientConfig::new(base)).expect("client");

    let health = client.health().await.expect("health");
    assert_eq!(health["status"], "healthy");
    assert!(health["realtime"]["active_connections"].is_u64());
}

#[tokio::test]
async fn test_list_documents_pages_and_filters() {
    let base = spawn_server().await;
    let client = DocumentsClient::with_token(base, TOKEN).expect("client");

    for (title, body) in [
        ("Launch plan", "draft"),
        ("Hiring", "LAUNCH checklist"),
        ("Budget", "numbers"),
    ] {
        client
            .create_document(&NewDocument::new(title, body, "project-1"))
            .await
            .expect("create");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let all = client
        .list_documents(&DocumentQuery::default())
        .await
        .expect("list");
    let titles: Vec<&str> = all.iter().map(|d| d.title.as_str()).collect();
    assert_eq!(titles, vec!["Budget", "Hiring", "Launch plan"]);

    let matching = client
        .list_documents(&DocumentQuery::default().search("launch"))
        .await
        .expect("search");
    let titles: Vec<&str> = matching.iter().map(|d| d.title.as_str()).collect();
    assert_eq!(titles, vec!["Hiring", "Launch plan"]);

    let page = client
        .list_documents(&DocumentQuery::default().page(1, 1))
        .await
        .expect("page");
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].title, "Hiring");
}

#[tokio::test]
async fn test_update_document_with_reserved_characters() {
    let base = spawn_server().await;
    let client = DocumentsClient::with_token(base, TOKEN).expect("client");

    let result = client
        .update_document("../documents?x=1", &DocumentChanges::default().title("X"))
        .await;
    assert!(matches!(result, Err(ClientError::NotFound(message)) if message == "Document not found"));
}

#[tokio::test]
async fn test_list_without_token_is_unauthorized() {
    let base = spawn_server().await;
    let client = DocumentsClient::new(ClientConfig::new(base)).expect("client");

    let result = client.list_documents(&DocumentQuery::default()).await;
    assert!(matches!(result, Err(ClientError::Unauthorized)));
}

#[tokio::test]
async fn test_timeouts_retry_only_idempotent_requests() {
    let (base, state) = spawn_slow().await;
    let client = DocumentsClient::new(
        ClientConfig::new(base)
            .with_timeout(Duration::from_millis(100))
            .with_max_retries(2),
    )
    .expect("client");

    let result = client.list_documents(&DocumentQuery::default()).await;
    assert!(matches!(result, Err(ClientError::Timeout)));
    assert_eq!(state.gets.load(Ordering::SeqCst), 3);

    let result = client
        .create_document(&NewDocument::new("Roadmap", "Q3", "project-1"))
        .await;
    assert!(matches!(result, Err(ClientError::Timeout)));
    assert_eq!(state.posts.load(Ordering::SeqCst), 1);
}
