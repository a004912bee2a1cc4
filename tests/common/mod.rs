#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use dashmap::DashMap;
use http::{Method, Request, Response};
use regex::Regex;
use sqlx::SqlitePool;
use tower::ServiceExt;

use lobbywarden::db;
use lobbywarden::host::{HostError, HostGateway, ResolvedUser};
use lobbywarden::monitor::{MembershipMonitor, MonitorConfig};
use lobbywarden::routes;
use lobbywarden::state::AppState;

pub const SPACE_ID: &str = "153566829380370432";
pub const OPERATOR_ID: &str = "100";

static POOL_SEQ: AtomicUsize = AtomicUsize::new(0);

/// Fresh named in-memory database so parallel tests stay isolated while every
/// pool connection still sees the same data.
pub async fn test_pool() -> SqlitePool {
    let n = POOL_SEQ.fetch_add(1, Ordering::SeqCst);
    let url = format!("sqlite:file:warden_test_{n}?mode=memory&cache=shared");
    db::create_pool(&url).await.expect("failed to create test pool")
}

/// In-process stand-in for the host chat client.
pub struct MockHost {
    operator_id: String,
    users: DashMap<String, ResolvedUser>,
    occupants: Mutex<HashMap<String, Vec<String>>>,
    submissions: Mutex<Vec<(Vec<String>, String)>>,
    pub fail_submissions: AtomicBool,
    pub fail_operator: AtomicBool,
}

impl MockHost {
    pub fn new() -> Arc<Self> {
        let host = Arc::new(Self {
            operator_id: OPERATOR_ID.to_string(),
            users: DashMap::new(),
            occupants: Mutex::new(HashMap::new()),
            submissions: Mutex::new(Vec::new()),
            fail_submissions: AtomicBool::new(false),
            fail_operator: AtomicBool::new(false),
        });
        host.add_user(OPERATOR_ID, "operator", Some("Operator"));
        host
    }

    pub fn add_user(&self, id: &str, username: &str, global_name: Option<&str>) {
        self.users.insert(
            id.to_string(),
            ResolvedUser {
                id: id.to_string(),
                username: username.to_string(),
                global_name: global_name.map(|s| s.to_string()),
                avatar_url: format!("https://cdn.example/avatars/{id}.png"),
            },
        );
    }

    pub fn set_occupants(&self, channel_id: &str, user_ids: &[&str]) {
        self.occupants.lock().unwrap().insert(
            channel_id.to_string(),
            user_ids.iter().map(|s| s.to_string()).collect(),
        );
    }

    pub fn submissions(&self) -> Vec<(Vec<String>, String)> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl HostGateway for MockHost {
    async fn resolve_user(&self, user_id: &str) -> Result<Option<ResolvedUser>, HostError> {
        Ok(self.users.get(user_id).map(|u| u.clone()))
    }

    async fn list_occupants(&self, channel_id: &str) -> Result<Vec<String>, HostError> {
        Ok(self
            .occupants
            .lock()
            .unwrap()
            .get(channel_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn current_operator_id(&self) -> Result<String, HostError> {
        if self.fail_operator.load(Ordering::SeqCst) {
            return Err(HostError::NoSession);
        }
        Ok(self.operator_id.clone())
    }

    async fn submit_ban(&self, user_ids: &[String], space_id: &str) -> Result<(), HostError> {
        if self.fail_submissions.load(Ordering::SeqCst) {
            return Err(HostError::Api {
                status: 500,
                body: "interaction failed".to_string(),
            });
        }
        self.submissions
            .lock()
            .unwrap()
            .push((user_ids.to_vec(), space_id.to_string()));
        Ok(())
    }
}

pub fn monitor_config() -> MonitorConfig {
    MonitorConfig {
        space_id: SPACE_ID.to_string(),
        channel_pattern: Regex::new("LFG[🟢🔵]").unwrap(),
        liveness_window: Duration::from_secs(30),
        sampler_interval: Duration::from_millis(100),
    }
}

/// Test server owning an isolated in-memory store and a mock host gateway.
pub struct TestServer {
    pub state: AppState,
    pub host: Arc<MockHost>,
}

impl TestServer {
    pub async fn new() -> Self {
        Self::with_monitor_config(monitor_config()).await
    }

    pub async fn with_monitor_config(config: MonitorConfig) -> Self {
        let pool = test_pool().await;
        let host = MockHost::new();
        let gateway: Arc<dyn HostGateway> = host.clone();
        let monitor = MembershipMonitor::new(pool.clone(), gateway.clone(), config);

        let state = AppState {
            db: pool,
            host: gateway,
            monitor,
            space_id: SPACE_ID.to_string(),
        };
        Self { state, host }
    }

    pub fn router(&self) -> axum::Router {
        routes::router(self.state.clone())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.state.db
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(path);
        let request = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                builder.body(Body::from(json.to_string())).unwrap()
            }
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router().oneshot(request).await.unwrap()
    }
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
