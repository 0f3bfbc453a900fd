//! Watch and log streaming against a mock API server

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kubewire::models::{Pod, WatchEventType};
use kubewire::services::LogRequest;
use kubewire::{Flow, Query};

mod common;
use common::{client_for, pod_json};

fn watch_body(lines: &[&str]) -> String {
    let mut body = lines.join("\n");
    body.push('\n');
    body
}

#[tokio::test]
async fn test_watch_delivers_each_event() {
    let server = MockServer::start().await;
    let body = watch_body(&[
        r#"{"type":"ADDED","object":{"kind":"Pod","metadata":{"name":"web-1"}}}"#,
        r#"{"type":"MODIFIED","object":{"kind":"Pod","metadata":{"name":"web-1"}}}"#,
        r#"{"type":"DELETED","object":{"kind":"Pod","metadata":{"name":"web-1"}}}"#,
    ]);
    Mock::given(method("GET"))
        .and(path("/api/v1/watch/namespaces/default/pods"))
        .and(query_param("watch", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    client
        .kind::<Pod>()
        .watch(Query::new(), move |event| {
            sink.lock().unwrap().push(event.event_type);
            Flow::Continue
        })
        .await
        .unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        [
            WatchEventType::Added,
            WatchEventType::Modified,
            WatchEventType::Deleted
        ]
    );
}

#[tokio::test]
async fn test_watch_stop_ends_after_first_event() {
    let server = MockServer::start().await;
    let body = watch_body(&[
        r#"{"type":"ADDED","object":{}}"#,
        r#"{"type":"MODIFIED","object":{}}"#,
        r#"{"type":"DELETED","object":{}}"#,
    ]);
    Mock::given(method("GET"))
        .and(path("/api/v1/watch/namespaces/default/pods"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    client
        .kind::<Pod>()
        .watch(Query::new(), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Flow::Stop
        })
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_watch_all_uses_cluster_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/watch/pods"))
        .and(query_param("watch", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            watch_body(&[r#"{"type":"BOOKMARK","object":{}}"#]),
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .kind::<Pod>()
        .watch_all(Query::new(), |_| Flow::Continue)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_watch_event_object_parses_into_pod() {
    let server = MockServer::start().await;
    let body = format!(
        "{}\n",
        serde_json::json!({"type": "ADDED", "object": pod_json("web", "default")})
    );
    Mock::given(method("GET"))
        .and(path("/api/v1/watch/namespaces/default/pods"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let name = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&name);
    client
        .kind::<Pod>()
        .watch(Query::new(), move |event| {
            let pod: Pod = event.parse_object().unwrap();
            *sink.lock().unwrap() = pod.metadata.and_then(|m| m.name);
            Flow::Stop
        })
        .await
        .unwrap();

    assert_eq!(name.lock().unwrap().as_deref(), Some("web"));
}

#[tokio::test]
async fn test_log_read_returns_raw_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/namespaces/default/pods/web/log"))
        .and(query_param("container", "app"))
        .and(query_param("tailLines", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("line 1\nline 2\n", "text/plain"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let log = LogRequest::new("web")
        .container("app")
        .tail_lines(10)
        .read(&client)
        .await
        .unwrap();
    assert_eq!(log, "line 1\nline 2\n");
}

#[tokio::test]
async fn test_log_follow_stop_ends_after_first_chunk() {
    let server = MockServer::start().await;
    // Large enough that the body arrives in more than one chunk.
    let body = "x".repeat(1024 * 1024);
    Mock::given(method("GET"))
        .and(path("/api/v1/namespaces/default/pods/web/log"))
        .and(query_param("follow", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.clone(), "text/plain"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let calls = Arc::new(AtomicUsize::new(0));
    let received = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let bytes = Arc::clone(&received);
    LogRequest::new("web")
        .follow(&client, move |chunk| {
            counter.fetch_add(1, Ordering::SeqCst);
            bytes.fetch_add(chunk.len(), Ordering::SeqCst);
            Flow::Stop
        })
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(received.load(Ordering::SeqCst) < body.len());
}

#[tokio::test]
async fn test_log_follow_streams_chunks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/namespaces/app-ns/pods/web/log"))
        .and(query_param("follow", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("streamed output", "text/plain"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let collected = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&collected);
    LogRequest::new("web")
        .namespace("app-ns")
        .follow(&client, move |chunk| {
            sink.lock().unwrap().extend_from_slice(chunk);
            Flow::Continue
        })
        .await
        .unwrap();

    assert_eq!(collected.lock().unwrap().as_slice(), b"streamed output");
}
