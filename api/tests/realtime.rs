//! End-to-end realtime tests over a real listener.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use docrelay_api::auth::StaticTokenAuthenticator;
use docrelay_api::ws::DocumentId;
use docrelay_api::{AppState, Server, ServerConfig};
use docrelay_sdk::{DocumentChanges, DocumentsClient, LiveClient, NewDocument, ServerEvent, WsError};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

const TOKEN: &str = "token-bob";
const USER: &str = "user-bob";
const WAIT: Duration = Duration::from_secs(5);
const QUIET: Duration = Duration::from_millis(200);

struct TestApp {
    addr: SocketAddr,
    state: AppState,
    shutdown: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<std::io::Result<()>>,
}

impl TestApp {
    async fn spawn() -> Self {
        let auth = StaticTokenAuthenticator::default().with_token(TOKEN, USER);
        let state = AppState::in_memory(Arc::new(auth));
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");

        let (tx, rx) = oneshot::channel::<()>();
        let server = Server::new(ServerConfig::default(), state.clone());
        let handle = tokio::spawn(server.serve(listener, async {
            let _ = rx.await;
        }));

        Self {
            addr,
            state,
            shutdown: Some(tx),
            handle,
        }
    }

    async fn live(&self) -> LiveClient {
        let client = LiveClient::with_url(format!("ws://{}/ws", self.addr)).expect("live client");
        client.connect().await.expect("connect");
        client
    }

    fn rest(&self) -> DocumentsClient {
        DocumentsClient::with_token(format!("http://{}", self.addr), TOKEN).expect("rest client")
    }

    async fn subscribe(&self, client: &LiveClient, doc_id: &str, expected: usize) {
        client.subscribe_document(doc_id).await.expect("subscribe");
        let doc = DocumentId::from(doc_id);
        let subscriptions = Arc::clone(&self.state.ws.subscriptions);
        wait_until(|| {
            let subscriptions = Arc::clone(&subscriptions);
            let doc = doc.clone();
            async move { subscriptions.subscriber_count(&doc).await >= expected }
        })
        .await;
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let result = tokio::time::timeout(WAIT, self.handle)
            .await
            .expect("server stopped")
            .expect("join");
        assert!(result.is_ok());
    }
}

async fn wait_until<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + WAIT;
    while !condition().await {
        assert!(tokio::time::Instant::now() < deadline, "condition not met in time");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn test_live_update_reaches_only_subscribers() {
    let app = TestApp::spawn().await;
    let a = app.live().await;
    let b = app.live().await;
    let c = app.live().await;

    app.subscribe(&a, "doc-42", 1).await;
    app.subscribe(&b, "doc-42", 2).await;
    app.subscribe(&c, "doc-7", 1).await;

    a.send_document_update("doc-42", json!({"body": "hello"}), json!("t1"))
        .await
        .expect("send");

    for client in [&a, &b] {
        match client.next_event(WAIT).await.expect("event") {
            ServerEvent::LiveUpdate { content, timestamp } => {
                assert_eq!(content, json!({"body": "hello"}));
                assert_eq!(timestamp, json!("t1"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
    assert!(matches!(c.next_event(QUIET).await, Err(WsError::Timeout(_))));

    app.stop().await;
}

#[tokio::test]
async fn test_live_updates_arrive_in_order() {
    let app = TestApp::spawn().await;
    let writer = app.live().await;
    let reader = app.live().await;
    app.subscribe(&reader, "doc-1", 1).await;

    for i in 0..20 {
        writer
            .send_document_update("doc-1", json!(i), json!(i))
            .await
            .expect("send");
    }

    for i in 0..20 {
        match reader.next_event(WAIT).await.expect("event") {
            ServerEvent::LiveUpdate { content, .. } => assert_eq!(content, json!(i)),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    app.stop().await;
}

#[tokio::test]
async fn test_disconnect_removes_subscriptions() {
    let app = TestApp::spawn().await;
    let a = app.live().await;
    let c = app.live().await;
    app.subscribe(&a, "doc-42", 1).await;
    app.subscribe(&c, "doc-7", 1).await;
    app.subscribe(&c, "doc-42", 2).await;

    c.close().await.expect("close");

    let state = app.state.clone();
    wait_until(|| {
        let state = state.clone();
        async move { state.ws.registry.len().await == 1 }
    })
    .await;

    assert_eq!(
        app.state
            .ws
            .subscriptions
            .subscriber_count(&DocumentId::from("doc-7"))
            .await,
        0
    );
    assert_eq!(
        app.state
            .ws
            .subscriptions
            .subscriber_count(&DocumentId::from("doc-42"))
            .await,
        1
    );

    a.send_document_update("doc-42", json!("still here"), json!(1))
        .await
        .expect("send");
    assert!(a.next_event(WAIT).await.is_ok());

    app.stop().await;
}

#[tokio::test]
async fn test_rest_writes_are_broadcast() {
    let app = TestApp::spawn().await;
    let rest = app.rest();
    let watcher = app.live().await;
    app.subscribe(&watcher, "project-9", 1).await;

    let doc = rest
        .create_document(&NewDocument::new("Roadmap", "v1", "project-9"))
        .await
        .expect("create");

    match watcher.next_event(WAIT).await.expect("event") {
        ServerEvent::DocumentCreated { document } => assert_eq!(document.id, doc.id),
        other => panic!("unexpected event: {other:?}"),
    }

    app.subscribe(&watcher, &doc.id, 1).await;
    rest.update_document(&doc.id, &DocumentChanges::default().body("v2"))
        .await
        .expect("update");

    match watcher.next_event(WAIT).await.expect("event") {
        ServerEvent::DocumentUpdated {
            document,
            updated_by,
        } => {
            assert_eq!(document.body, "v2");
            assert_eq!(updated_by, USER);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    app.stop().await;
}

#[tokio::test]
async fn test_update_without_subscribers_keeps_connection() {
    let app = TestApp::spawn().await;
    let client = app.live().await;

    client
        .send_document_update("doc-x", json!(null), json!(null))
        .await
        .expect("send");
    app.subscribe(&client, "doc-5", 1).await;
    client
        .send_document_update("doc-5", json!("ok"), json!(2))
        .await
        .expect("send");
    assert!(client.next_event(WAIT).await.is_ok());

    app.stop().await;
}

#[tokio::test]
async fn test_shutdown_closes_live_connections() {
    let app = TestApp::spawn().await;
    let client = app.live().await;
    app.subscribe(&client, "doc-1", 1).await;

    let state = app.state.clone();
    app.stop().await;

    assert!(state.ws.registry.is_empty().await);
    assert!(matches!(client.next_event(WAIT).await, Err(WsError::Closed)));
}
