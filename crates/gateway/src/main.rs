//! Webhook gateway binary.
//!
//! Exposes the channel provider's webhook endpoint plus a small ops surface
//! for catalog link maintenance, and wires configuration, the database, the
//! channel clients, the sync queue, and the engine together.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use catalog::{CatalogSync, SyncQueue};
use database::Database;
use llm_reply::{LlmConfig, LlmReplyGenerator};
use orchestrator::{Engine, SqlKnowledgeSearch, SqlListingSearch, WhatsAppSender};
use whatsapp_api::{CatalogClient, MessageClient, WebhookEvent};

type AppEngine = Engine<LlmReplyGenerator, SqlListingSearch, SqlKnowledgeSearch, WhatsAppSender>;

#[derive(Clone)]
struct AppState {
    engine: Arc<AppEngine>,
    catalog_sync: CatalogSync,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Ack {
    ok: bool,
    received_at: String,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
struct Health {
    status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkEntry {
    catalog_id: i64,
    product_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResyncRequest {
    property_ids: Vec<String>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let addr = env::var("GATEWAY_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let db_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:fincas.db?mode=rwc".to_string());

    let db = match Database::connect(&db_url).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = db.migrate().await {
        error!("Failed to run migrations: {}", e);
        std::process::exit(1);
    }

    let state = match build_state(&db) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize: {}", e);
            std::process::exit(1);
        }
    };

    let app = router(state);

    let addr: SocketAddr = match addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Invalid GATEWAY_ADDR {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    info!("Gateway listening on {}", addr);
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Wire the clients, queue, and engine. Channel and catalog credentials are
/// validated at call time, so missing values only disable the calls that
/// need them.
fn build_state(db: &Database) -> Result<AppState, whatsapp_api::WhatsAppError> {
    let message_client = MessageClient::from_env()?;
    let catalog_client = CatalogClient::from_env()?;
    if !catalog_client.has_token() {
        warn!("CATALOG_ACCESS_TOKEN not set; remote catalog sync will log and drop");
    }

    let generator = match LlmReplyGenerator::from_env() {
        Ok(generator) => generator,
        Err(e) => {
            warn!("Reply generation not fully configured: {}", e);
            // Calls will fail and be logged per-message; inbound
            // bookkeeping keeps working.
            LlmReplyGenerator::new(LlmConfig::default()).map_err(|e| {
                whatsapp_api::WhatsAppError::Config(e.to_string())
            })?
        }
    };

    let (queue, _worker) = SyncQueue::start(catalog_client, db.pool().clone());
    let catalog_sync = CatalogSync::new(db.pool().clone(), queue);

    let engine = Engine::new(
        db.pool().clone(),
        generator,
        SqlListingSearch::new(db.pool().clone()),
        SqlKnowledgeSearch::new(db.pool().clone()),
        WhatsAppSender::new(message_client),
    );

    Ok(AppState {
        engine: Arc::new(engine),
        catalog_sync,
    })
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", post(receive_webhook).get(webhook_check))
        .route("/health", get(health))
        .route("/catalog/resync", post(schedule_resync))
        .route("/listings/:id/catalog-links", post(replace_links))
        .with_state(state)
}

/// POST /webhook - the channel provider delivers events here.
///
/// Malformed JSON is the only client error; everything else acknowledges
/// 200 so the provider does not retry on our internal failures.
async fn receive_webhook(State(state): State<AppState>, body: String) -> Response {
    let value: serde_json::Value = match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: "Invalid JSON".to_string(),
                }),
            )
                .into_response();
        }
    };

    let event: WebhookEvent = match serde_json::from_value(value) {
        Ok(event) => event,
        Err(e) => {
            warn!("Unrecognized webhook payload shape: {}", e);
            WebhookEvent::Unknown
        }
    };

    let message = match state.engine.handle_event(event).await {
        Ok(outcome) => outcome.summary(),
        Err(e) => {
            error!("Webhook processing failed: {}", e);
            "error logged".to_string()
        }
    };

    (
        StatusCode::OK,
        Json(Ack {
            ok: true,
            received_at: Utc::now().to_rfc3339(),
            message,
        }),
    )
        .into_response()
}

/// GET /webhook - static acknowledgement for the provider's health checks.
async fn webhook_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "active" }))
}

/// GET /health - gateway liveness.
async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
    })
}

/// POST /listings/:id/catalog-links - replace a listing's full catalog set.
async fn replace_links(
    State(state): State<AppState>,
    Path(listing_id): Path<String>,
    Json(entries): Json<Vec<LinkEntry>>,
) -> Response {
    let pairs: Vec<(i64, String)> = entries
        .into_iter()
        .map(|e| (e.catalog_id, e.product_id))
        .collect();

    match state.catalog_sync.replace_all_links(&listing_id, &pairs).await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "ok": true }))).into_response(),
        Err(e) => {
            error!(listing_id = %listing_id, "Failed to replace catalog links: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// POST /catalog/resync - schedule a background re-push of listing payloads.
async fn schedule_resync(
    State(state): State<AppState>,
    Json(request): Json<ResyncRequest>,
) -> Response {
    state.catalog_sync.schedule_resync(request.property_ids);
    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "ok": true })),
    )
        .into_response()
}
