use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use paracord_client::transport::MAX_ATTEMPTS_CAP;
use paracord_client::{Client, ClientConfig, HttpTransport, Transport, TransportError};
use paracord_models::ChannelPayload;
use serde_json::{json, Value};
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct Counters {
    flaky: Arc<AtomicUsize>,
    forbidden: Arc<AtomicUsize>,
    broken: Arc<AtomicUsize>,
}

async fn list_messages(
    Path(channel_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<Value> {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    Json(json!({ "channel": channel_id, "limit": query.get("limit"), "auth": auth }))
}

async fn create_message(Path(channel_id): Path<String>, Json(body): Json<Value>) -> Json<Value> {
    Json(json!({
        "id": "500",
        "channel_id": channel_id,
        "author": { "id": "2", "username": "ada" },
        "content": body["content"],
        "timestamp": "2024-03-01T12:00:00Z"
    }))
}

async fn edit_channel(Path(channel_id): Path<String>, Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "id": channel_id, "patched": body }))
}

async fn flaky(State(counters): State<Counters>) -> (StatusCode, Json<Value>) {
    let attempt = counters.flaky.fetch_add(1, Ordering::SeqCst);
    if attempt < 2 {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "boom" })))
    } else {
        (StatusCode::OK, Json(json!({ "ok": true })))
    }
}

async fn forbidden(State(counters): State<Counters>) -> (StatusCode, &'static str) {
    counters.forbidden.fetch_add(1, Ordering::SeqCst);
    (StatusCode::FORBIDDEN, "nope")
}

async fn broken(State(counters): State<Counters>) -> StatusCode {
    counters.broken.fetch_add(1, Ordering::SeqCst);
    StatusCode::BAD_GATEWAY
}

async fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn spawn_server() -> anyhow::Result<(String, Counters)> {
    let counters = Counters::default();
    let app = Router::new()
        .route(
            "/channels/{channel_id}/messages",
            get(list_messages).post(create_message),
        )
        .route("/channels/{channel_id}", axum::routing::patch(edit_channel))
        .route("/flaky", get(flaky))
        .route("/forbidden", get(forbidden))
        .route("/broken", get(broken).post(broken))
        .route("/empty", post(no_content))
        .with_state(counters.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), counters))
}

fn config_for(base_url: &str) -> ClientConfig {
    let mut config = ClientConfig::default();
    config.api.base_url = format!("{base_url}/");
    config.api.token = Some("secret".into());
    config.api.user_id = "2".into();
    config.http.retry_base_delay_ms = 1;
    config
}

#[tokio::test]
async fn get_sends_query_and_bot_token() -> anyhow::Result<()> {
    let (base_url, _) = spawn_server().await?;
    let transport = HttpTransport::new(&config_for(&base_url))?;

    let body = transport
        .get("/channels/10/messages", &[("limit", "25".to_string())])
        .await?;
    assert_eq!(body["channel"], "10");
    assert_eq!(body["limit"], "25");
    assert_eq!(body["auth"], "Bot secret");
    Ok(())
}

#[tokio::test]
async fn patch_sends_json_body() -> anyhow::Result<()> {
    let (base_url, _) = spawn_server().await?;
    let transport = HttpTransport::new(&config_for(&base_url))?;

    let body = transport
        .patch("/channels/10", Some(json!({ "name": "general" })))
        .await?;
    assert_eq!(body["patched"]["name"], "general");
    Ok(())
}

#[tokio::test]
async fn server_errors_are_retried() -> anyhow::Result<()> {
    let (base_url, counters) = spawn_server().await?;
    let transport = HttpTransport::new(&config_for(&base_url))?;

    let body = transport.get("/flaky", &[]).await?;
    assert_eq!(body["ok"], true);
    assert_eq!(counters.flaky.load(Ordering::SeqCst), 3);
    Ok(())
}

#[tokio::test]
async fn retries_stop_after_max_attempts() -> anyhow::Result<()> {
    let (base_url, counters) = spawn_server().await?;
    let mut config = config_for(&base_url);
    config.http.max_attempts = 2;
    let transport = HttpTransport::new(&config)?;

    let err = transport.get("/flaky", &[]).await.unwrap_err();
    assert!(matches!(err, TransportError::Status { status: 500, .. }));
    assert_eq!(counters.flaky.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn client_errors_are_not_retried() -> anyhow::Result<()> {
    let (base_url, counters) = spawn_server().await?;
    let transport = HttpTransport::new(&config_for(&base_url))?;

    match transport.get("/forbidden", &[]).await {
        Err(TransportError::Status { path, status, body }) => {
            assert_eq!(path, "/forbidden");
            assert_eq!(status, 403);
            assert_eq!(body, "nope");
        }
        other => panic!("expected a 403 status error, got {other:?}"),
    }
    assert_eq!(counters.forbidden.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn empty_body_decodes_to_null() -> anyhow::Result<()> {
    let (base_url, _) = spawn_server().await?;
    let transport = HttpTransport::new(&config_for(&base_url))?;

    assert_eq!(transport.post("/empty", None).await?, Value::Null);
    Ok(())
}

#[tokio::test]
async fn client_sends_message_over_http() -> anyhow::Result<()> {
    let (base_url, _) = spawn_server().await?;
    let client = Client::from_config(&config_for(&base_url))?;
    let channel = client.create_channel(ChannelPayload {
        id: "20".into(),
        ..ChannelPayload::default()
    });

    let message = channel.send_message("over the wire").await?;
    assert_eq!(message.id, "500");
    assert_eq!(message.channel_id, "20");
    assert_eq!(message.content, "over the wire");
    Ok(())
}

#[tokio::test]
async fn configured_attempts_are_capped() -> anyhow::Result<()> {
    let (base_url, counters) = spawn_server().await?;
    let mut config = config_for(&base_url);
    config.http.max_attempts = 40;
    config.http.retry_base_delay_ms = 0;
    let transport = HttpTransport::new(&config)?;

    let err = transport.get("/broken", &[]).await.unwrap_err();
    assert!(matches!(err, TransportError::Status { status: 502, .. }));
    assert_eq!(
        counters.broken.load(Ordering::SeqCst),
        MAX_ATTEMPTS_CAP as usize
    );
    Ok(())
}

#[tokio::test]
async fn post_is_not_retried_after_server_error() -> anyhow::Result<()> {
    let (base_url, counters) = spawn_server().await?;
    let transport = HttpTransport::new(&config_for(&base_url))?;

    let err = transport
        .post("/broken", Some(json!({ "content": "once" })))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Status { status: 502, .. }));
    assert_eq!(counters.broken.load(Ordering::SeqCst), 1);
    Ok(())
}
