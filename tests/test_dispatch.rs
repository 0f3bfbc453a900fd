//! Metadata-driven dispatch against a mock API server

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kubewire::models::{DeleteOptions, Pod};
use kubewire::{JsonPatch, KubewireError, MergePatch, Query, Resource};

mod common;
use common::{client_for, pod_json, TEST_TOKEN};

#[tokio::test]
async fn test_read_resolves_path_and_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/namespaces/default/pods/web"))
        .and(header("authorization", format!("Bearer {TEST_TOKEN}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(pod_json("web", "default")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let pod = client.kind::<Pod>().read("web").await.unwrap();
    assert_eq!(pod.name(), Some("web"));
    assert_eq!(pod.kind.as_deref(), Some("Pod"));
}

#[tokio::test]
async fn test_create_posts_serialized_instance() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/namespaces/default/pods"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "metadata": {"name": "web", "namespace": "default"}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(pod_json("web", "default")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let pod = Pod::named("web", "default");
    let created = client.kind::<Pod>().create(&pod).await.unwrap();
    assert_eq!(created.name(), Some("web"));
}

#[tokio::test]
async fn test_instance_namespace_overrides_default() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/namespaces/staging/pods"))
        .respond_with(ResponseTemplate::new(201).set_body_json(pod_json("web", "staging")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let pod = Pod::named("web", "staging");
    client.kind::<Pod>().create(&pod).await.unwrap();
}

#[tokio::test]
async fn test_explicit_scope_beats_instance_namespace() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/namespaces/override-ns/pods"))
        .respond_with(ResponseTemplate::new(201).set_body_json(pod_json("web", "override-ns")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    // The instance carries its own namespace, but an explicit scope
    // wins over it.
    let pod = Pod::named("web", "instance-ns");
    client
        .kind::<Pod>()
        .within("override-ns")
        .create(&pod)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_within_rescopes_dispatcher() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/namespaces/kube-system/pods/dns"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pod_json("dns", "kube-system")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let pod = client
        .kind::<Pod>()
        .within("kube-system")
        .read("dns")
        .await
        .unwrap();
    assert_eq!(pod.namespace(), Some("kube-system"));
}

#[tokio::test]
async fn test_json_patch_content_type_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/namespaces/default/pods/web"))
        .and(header("content-type", "application/json-patch+json"))
        .and(body_json(json!([
            {"op": "replace", "path": "/spec/containers/0/image", "value": "nginx:1.28"}
        ])))
        .respond_with(ResponseTemplate::new(200).set_body_json(pod_json("web", "default")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let patch = JsonPatch::new().replace("/spec/containers/0/image", json!("nginx:1.28"));
    client.kind::<Pod>().patch("web", &patch).await.unwrap();
}

#[tokio::test]
async fn test_merge_patch_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/namespaces/default/pods/web"))
        .and(header("content-type", "application/merge-patch+json"))
        .and(body_json(json!({"metadata": {"labels": {"tier": "web"}}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(pod_json("web", "default")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let patch = MergePatch::new(json!({"metadata": {"labels": {"tier": "web"}}}));
    client.kind::<Pod>().merge_patch("web", &patch).await.unwrap();
}

#[tokio::test]
async fn test_delete_returns_status_payload() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/namespaces/default/pods/web"))
        .and(query_param("gracePeriodSeconds", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "Status", "status": "Success", "code": 200
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut query = Query::new();
    query.push("gracePeriodSeconds", 5);
    let status = client.kind::<Pod>().delete("web", query).await.unwrap();
    assert_eq!(status.status.as_deref(), Some("Success"));
    assert_eq!(status.code, Some(200));
}

#[tokio::test]
async fn test_delete_with_options_sends_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/namespaces/default/pods/web"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "gracePeriodSeconds": 0,
            "propagationPolicy": "Foreground"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "Status", "status": "Success", "code": 200
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let delete_options = DeleteOptions {
        grace_period_seconds: Some(0),
        propagation_policy: Some("Foreground".to_string()),
        ..Default::default()
    };
    let status = client
        .kind::<Pod>()
        .delete_with("web", &delete_options, Query::new())
        .await
        .unwrap();
    assert_eq!(status.status.as_deref(), Some("Success"));
}

#[tokio::test]
async fn test_list_forwards_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/namespaces/default/pods"))
        .and(query_param("labelSelector", "app=web"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "PodList",
            "items": [pod_json("web-1", "default"), pod_json("web-2", "default")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut query = Query::new();
    query.push("labelSelector", "app=web");
    let list = client.kind::<Pod>().list(query).await.unwrap();
    assert_eq!(list.items.len(), 2);
    assert_eq!(list.items[0].name(), Some("web-1"));
}

#[tokio::test]
async fn test_list_all_skips_namespace_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/pods"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"kind": "PodList", "items": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let list = client.kind::<Pod>().list_all(Query::new()).await.unwrap();
    assert!(list.items.is_empty());
}

#[tokio::test]
async fn test_status_subresource_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/namespaces/default/pods/web/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pod_json("web", "default")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.kind::<Pod>().get_status("web").await.unwrap();
}

#[tokio::test]
async fn test_proxy_returns_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/namespaces/default/pods/web/proxy/healthz"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let body = client
        .kind::<Pod>()
        .proxy("web", "healthz", Query::new())
        .await
        .unwrap();
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_json_error_body_becomes_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/namespaces/default/pods/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "kind": "Status",
            "status": "Failure",
            "message": "pods \"missing\" not found",
            "reason": "NotFound",
            "code": 404
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.kind::<Pod>().read("missing").await.unwrap_err();
    assert_eq!(err.status_code(), Some(404));
    let status = err.api_status().expect("API error carries Status");
    assert_eq!(status.reason.as_deref(), Some("NotFound"));
    assert!(err.to_string().contains("not found"));
}

#[tokio::test]
async fn test_server_error_preserves_status_message_and_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/namespaces/default/pods/web"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "message": "Fail.",
            "code": 500
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.kind::<Pod>().read("web").await.unwrap_err();
    let status = err.api_status().expect("API error carries Status");
    assert_eq!(status.message.as_deref(), Some("Fail."));
    assert_eq!(status.code, Some(500));
}

#[tokio::test]
async fn test_non_json_error_body_becomes_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/namespaces/default/pods/web"))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_raw("<html>upstream down</html>", "text/html"),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.kind::<Pod>().read("web").await.unwrap_err();
    match err {
        KubewireError::Transport { status, reason } => {
            assert_eq!(status, 503);
            assert_eq!(reason, "Service Unavailable");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_replace_requires_name() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let err = client.kind::<Pod>().replace(&Pod::default()).await.unwrap_err();
    assert!(matches!(err, KubewireError::Argument(_)));
}
