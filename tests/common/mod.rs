#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use spec_dispatch::config::{ApiConfig, AuthConfig};
use spec_dispatch::device::UserAgentFingerprint;
use spec_dispatch::dispatch::{Dispatcher, Query};
use spec_dispatch::executor::{DataExecutor, ExecutionError};
use spec_dispatch::handlers::{self, AppState};
use spec_dispatch::spec::{ResourceDefinition, SpecStore};

pub const FIREFOX_LINUX: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";

/// Default tree: users (with nested orders), a read-only items list and a protected account.
pub fn root_document() -> Value {
    json!({
        "paths": {
            "users": {
                "operations": "CRUD",
                "fields": {
                    "id": { "name": "id", "is_required": true },
                    "name": { "name": "name", "is_required": true },
                    "age": { "name": "age", "type": "integer" }
                },
                "paths": {
                    "orders": {
                        "operations": ["R"],
                        "fields": {
                            "id": { "name": "id" },
                            "total": { "name": "total" }
                        }
                    }
                }
            },
            "items": {
                "operations": ["R"],
                "fields": {
                    "id": { "name": "id" },
                    "label": { "name": "label" }
                }
            },
            "account": {
                "protected": true,
                "operations": "RU",
                "fields": {
                    "id": { "name": "id" },
                    "email": { "name": "email" }
                }
            }
        }
    })
}

/// The `sde` mount group; its `items` are unrelated to the default tree's.
pub fn sde_document() -> Value {
    json!({
        "paths": {
            "items": {
                "operations": "R",
                "table": "inv_types",
                "fields": {
                    "id": { "name": "typeID" },
                    "group": { "name": "groupID" }
                }
            }
        }
    })
}

pub fn store() -> SpecStore {
    let root: ResourceDefinition =
        serde_json::from_value(root_document()).expect("root fixture parses");
    let sde: ResourceDefinition =
        serde_json::from_value(sde_document()).expect("sde fixture parses");

    SpecStore::new(root)
        .with_mount("sde", sde)
        .expect("sde mount is valid")
}

pub fn dispatcher() -> Dispatcher {
    Dispatcher::new(Arc::new(store()), Arc::new(UserAgentFingerprint::new()))
}

/// Records the last query it was handed and answers with a canned payload.
pub struct RecordingExecutor {
    pub last: Mutex<Option<Value>>,
    pub response: Value,
}

impl RecordingExecutor {
    pub fn new(response: Value) -> Self {
        Self {
            last: Mutex::new(None),
            response,
        }
    }

    pub fn last_query(&self) -> Value {
        self.last
            .lock()
            .unwrap()
            .clone()
            .expect("executor was never called")
    }

    pub fn was_called(&self) -> bool {
        self.last.lock().unwrap().is_some()
    }
}

#[async_trait]
impl DataExecutor for RecordingExecutor {
    async fn execute(&self, query: &Query<'_>) -> Result<Value, ExecutionError> {
        let recorded =
            serde_json::to_value(query).map_err(|e| ExecutionError::Rejected(e.to_string()))?;
        *self.last.lock().unwrap() = Some(recorded);
        Ok(self.response.clone())
    }
}

/// Always refuses, the way a backend reports a bad query.
pub struct RejectingExecutor(pub &'static str);

#[async_trait]
impl DataExecutor for RejectingExecutor {
    async fn execute(&self, _query: &Query<'_>) -> Result<Value, ExecutionError> {
        Err(ExecutionError::Rejected(self.0.to_string()))
    }
}

pub fn api_config() -> ApiConfig {
    ApiConfig {
        port: 0,
        cors_origins: vec!["*".to_string()],
        max_request_size_bytes: 1024 * 1024,
    }
}

pub fn app(executor: Arc<dyn DataExecutor>) -> Router {
    let state = AppState::new(dispatcher(), executor, AuthConfig::default());
    handlers::router(state, &api_config())
}

/// Drive one request through the router in-process.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body collects");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body is JSON")
    };
    (status, headers, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
