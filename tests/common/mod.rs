//! Shared fixtures for integration tests

// Not every test binary uses every helper.
#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::MockServer;

use kubewire::{Client, ClientConfig};

/// Bearer token every test client sends
pub const TEST_TOKEN: &str = "test-token";

/// Client pointed at the mock server, default namespace `default`
pub fn client_for(server: &MockServer) -> Client {
    let config = ClientConfig::builder(server.uri())
        .bearer_token(TEST_TOKEN)
        .build()
        .expect("valid test config");
    Client::new(config).expect("client construction")
}

/// Minimal pod body in the shape the API server returns
pub fn pod_json(name: &str, namespace: &str) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": {"name": name, "namespace": namespace},
        "spec": {"containers": [{"name": "app", "image": "nginx:1.27"}]}
    })
}
