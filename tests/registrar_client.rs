use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use linkdeck::config::RegistrarConfig;
use linkdeck::registrar::{DomainRegistrar, HttpRegistrar, RegistrarError};

/// What the stub registrar saw: (method, path-ish summary, query, authorization).
type Seen = Arc<Mutex<Vec<(String, String, Option<String>, Option<String>)>>>;

fn auth(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn add(
    State(seen): State<Seen>,
    Path(project): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let name = body["name"].as_str().unwrap_or_default().to_string();
    seen.lock()
        .unwrap()
        .push(("POST".to_string(), format!("{project}/{name}"), query, auth(&headers)));

    match name.as_str() {
        "taken.com" => (
            StatusCode::CONFLICT,
            Json(json!({ "error": { "code": "domain_taken", "message": "Domain is already in use" } })),
        ),
        "broken.com" => (StatusCode::BAD_GATEWAY, Json(json!({}))),
        _ => (StatusCode::OK, Json(json!({ "name": name, "verified": false }))),
    }
}

async fn remove(
    State(seen): State<Seen>,
    Path((project, domain)): Path<(String, String)>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    seen.lock()
        .unwrap()
        .push(("DELETE".to_string(), format!("{project}/{domain}"), query, auth(&headers)));

    if domain == "unknown.com" {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": { "code": "not_found", "message": "Domain not found" } })),
        )
    } else {
        (StatusCode::OK, Json(json!({})))
    }
}

async fn spawn_stub() -> (SocketAddr, Seen) {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route("/v9/projects/{project}/domains", post(add))
        .route("/v9/projects/{project}/domains/{domain}", delete(remove))
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server failed");
    });
    (addr, seen)
}

fn client(addr: SocketAddr, team_id: Option<&str>) -> HttpRegistrar {
    HttpRegistrar::new(&RegistrarConfig {
        base_url: format!("http://{addr}"),
        token: "secret-token".to_string(),
        project_id: "prj_123".to_string(),
        team_id: team_id.map(str::to_string),
        timeout_secs: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn add_domain_returns_confirmation() {
    let (addr, seen) = spawn_stub().await;
    let registrar = client(addr, Some("team_1"));

    let confirmation = registrar.add_domain("acme.com").await.unwrap();
    assert_eq!(confirmation["name"], "acme.com");

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].0, "POST");
    assert_eq!(seen[0].1, "prj_123/acme.com");
    assert_eq!(seen[0].2.as_deref(), Some("teamId=team_1"));
    assert_eq!(seen[0].3.as_deref(), Some("Bearer secret-token"));
}

#[tokio::test]
async fn add_domain_surfaces_registrar_message() {
    let (addr, _) = spawn_stub().await;
    let registrar = client(addr, None);

    let err = registrar.add_domain("taken.com").await.unwrap_err();
    assert_eq!(err, RegistrarError::Rejected("Domain is already in use".to_string()));
}

#[tokio::test]
async fn add_domain_server_error_is_transport_failure() {
    let (addr, _) = spawn_stub().await;
    let registrar = client(addr, None);

    let err = registrar.add_domain("broken.com").await.unwrap_err();
    assert!(matches!(err, RegistrarError::Transport(_)));
}

#[tokio::test]
async fn unreachable_registrar_is_transport_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(addr, None).add_domain("acme.com").await.unwrap_err();
    assert!(matches!(err, RegistrarError::Transport(_)));
}

#[tokio::test]
async fn remove_domain() {
    let (addr, seen) = spawn_stub().await;
    let registrar = client(addr, None);

    registrar.remove_domain("acme.com").await.unwrap();
    let err = registrar.remove_domain("unknown.com").await.unwrap_err();
    assert_eq!(err, RegistrarError::Rejected("Domain not found".to_string()));

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].0, "DELETE");
    assert_eq!(seen[0].1, "prj_123/acme.com");
    assert_eq!(seen[0].2, None);
}
