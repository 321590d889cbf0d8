use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

use linkdeck::auth::jwt::{encode_token, Claims};
use linkdeck::config::{Config, RegistrarConfig};
use linkdeck::db::{MemoryStore, ProjectStore, StoreError};
use linkdeck::models::{AuditEvent, NewProject, Project, ProjectMembership};
use linkdeck::registrar::{DomainRegistrar, RegistrarError};

pub const JWT_SECRET: &str = "test-jwt-secret-that-is-long-enough";

/// Registrar double that records every call and can be told to refuse.
#[derive(Default)]
pub struct RecordingRegistrar {
    reject_with: Mutex<Option<String>>,
    unreachable: AtomicBool,
    fail_release: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl RecordingRegistrar {
    pub fn reject_with(&self, message: &str) {
        *self.reject_with.lock().unwrap() = Some(message.to_string());
    }

    /// Every add fails as if the registrar could not be reached.
    pub fn go_offline(&self) {
        self.unreachable.store(true, Ordering::SeqCst);
    }

    pub fn fail_releases(&self) {
        self.fail_release.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DomainRegistrar for RecordingRegistrar {
    async fn add_domain(&self, domain: &str) -> Result<Value, RegistrarError> {
        self.calls.lock().unwrap().push(format!("add {domain}"));
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(RegistrarError::Transport("connection refused".to_string()));
        }
        match self.reject_with.lock().unwrap().clone() {
            Some(message) => Err(RegistrarError::Rejected(message)),
            None => Ok(json!({ "name": domain, "verified": false })),
        }
    }

    async fn remove_domain(&self, domain: &str) -> Result<(), RegistrarError> {
        self.calls.lock().unwrap().push(format!("remove {domain}"));
        if self.fail_release.load(Ordering::SeqCst) {
            Err(RegistrarError::Transport("connection reset".to_string()))
        } else {
            Ok(())
        }
    }
}

/// In-memory store whose project writes fail with a non-conflict error.
pub struct WriteFailingStore {
    inner: Arc<MemoryStore>,
}

#[async_trait]
impl ProjectStore for WriteFailingStore {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Project>, StoreError> {
        self.inner.list_for_user(user_id).await
    }

    async fn find_by_slug_for_user(
        &self,
        slug: &str,
        user_id: Uuid,
    ) -> Result<Option<Project>, StoreError> {
        self.inner.find_by_slug_for_user(slug, user_id).await
    }

    async fn create_with_owner(&self, _: &NewProject, _: Uuid) -> Result<Project, StoreError> {
        Err(StoreError::Internal("disk full".to_string()))
    }

    async fn list_members(&self, project_id: Uuid) -> Result<Vec<ProjectMembership>, StoreError> {
        self.inner.list_members(project_id).await
    }

    async fn log_event(
        &self,
        user_id: Option<Uuid>,
        action: &str,
        resource_type: &str,
        resource_id: Option<Uuid>,
        details: Option<Value>,
    ) -> Result<(), StoreError> {
        self.inner
            .log_event(user_id, action, resource_type, resource_id, details)
            .await
    }

    async fn recent_events(&self, limit: i64) -> Result<Vec<AuditEvent>, StoreError> {
        self.inner.recent_events(limit).await
    }
}

/// A running test server backed by the in-memory store.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub store: Arc<MemoryStore>,
    pub registrar: Arc<RecordingRegistrar>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Session token for a user id.
    pub fn token_for(&self, user_id: Uuid) -> String {
        encode_token(
            &Claims::new(user_id, chrono::Duration::minutes(15)),
            JWT_SECRET,
        )
        .unwrap()
    }

    /// Fresh user with a valid session token.
    pub fn login(&self) -> (Uuid, String) {
        let user_id = Uuid::now_v7();
        (user_id, self.token_for(user_id))
    }

    /// Create a project, return (body, status).
    pub async fn create_project(
        &self,
        token: &str,
        name: &str,
        slug: &str,
        domain: &str,
    ) -> (Value, StatusCode) {
        self.post_auth(
            "/api/v1/projects",
            token,
            &json!({ "name": name, "slug": slug, "domain": domain }),
        )
        .await
    }

    /// Make an authenticated GET request.
    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated POST request with JSON body.
    pub async fn post_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: None,
        jwt_secret: JWT_SECRET.to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        max_body_size: 65_536,
        log_level: "warn".to_string(),
        root_domain: "dub.sh".to_string(),
        reserved_slugs: vec!["internal".to_string()],
        registrar: RegistrarConfig {
            base_url: "http://127.0.0.1:0".to_string(),
            token: "unused".to_string(),
            project_id: "unused".to_string(),
            team_id: None,
            timeout_secs: 5,
        },
    }
}

/// Spawn the app on a random port with an empty in-memory store.
pub async fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    serve(store.clone(), store).await
}

/// Like [`spawn_app`], but every project write fails. Reads and audit events
/// still go to `TestApp::store`.
pub async fn spawn_app_with_failing_writes() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let failing = Arc::new(WriteFailingStore {
        inner: store.clone(),
    });
    serve(failing, store).await
}

async fn serve(backend: Arc<dyn ProjectStore>, store: Arc<MemoryStore>) -> TestApp {
    let registrar = Arc::new(RecordingRegistrar::default());

    let app = linkdeck::build_app(test_config(), backend, registrar.clone());

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    // Spawn server in background
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        client,
        store,
        registrar,
    }
}
