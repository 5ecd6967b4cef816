//! Control API for webproxy.
//!
//! The control server binds to `127.0.0.1:8080` by default and exposes:
//!
//! - `GET|POST /toggle?opr={on|off}` — switch the proxy on or off
//! - `GET      /status`              — current master switch as a JSON boolean
//! - `GET      /info`                — full policy snapshot
//!
//! [`toggle`], [`status`] and [`info`] are the operations behind those
//! routes; they are usable without HTTP framing.

use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use serde::Deserialize;
use tracing::info;

use crate::error::{Result, WebProxyError};
use crate::policy::store::{PolicySnapshot, PolicyStore};

/// Requested position of the master switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleCommand {
    On,
    Off,
}

impl FromStr for ToggleCommand {
    type Err = WebProxyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "on" => Ok(ToggleCommand::On),
            "off" => Ok(ToggleCommand::Off),
            other => Err(WebProxyError::InvalidCommand(other.to_string())),
        }
    }
}

/// Set the master switch from a raw `opr` value and return the new state.
///
/// The store is left untouched unless the command is exactly `on` or `off`.
pub fn toggle(store: &PolicyStore, command: Option<&str>) -> Result<bool> {
    let command: ToggleCommand = command.ok_or(WebProxyError::MissingCommand)?.parse()?;
    let enabled = command == ToggleCommand::On;
    store.set_enabled(enabled);
    info!("Proxy switched {}", if enabled { "on" } else { "off" });
    Ok(enabled)
}

pub fn status(store: &PolicyStore) -> bool {
    store.is_enabled()
}

pub fn info(store: &PolicyStore) -> PolicySnapshot {
    store.get()
}

/// Build the axum router with all control endpoints.
pub fn router(store: Arc<PolicyStore>) -> Router {
    Router::new()
        .route("/toggle", get(toggle_handler).post(toggle_handler))
        .route("/status", get(status_handler))
        .route("/info", get(info_handler))
        .with_state(store)
}

/// Start the control server on the given address.
pub async fn start(listen_addr: &str, store: Arc<PolicyStore>) -> Result<()> {
    let app = router(store);
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    info!("Control API listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .await
        .map_err(|e| WebProxyError::Proxy(e.to_string()))?;
    Ok(())
}

/// Query parameters for `/toggle`.
#[derive(Debug, Deserialize)]
pub struct ToggleQuery {
    pub opr: Option<String>,
}

/// `GET|POST /toggle` — `"OK"` on success, `{"error": ...}` with 400 otherwise.
async fn toggle_handler(
    State(store): State<Arc<PolicyStore>>,
    Query(params): Query<ToggleQuery>,
) -> Response {
    match toggle(&store, params.opr.as_deref()) {
        Ok(_) => Json("OK").into_response(),
        Err(e) => {
            let code = if e.is_validation() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            let message = match e {
                WebProxyError::InvalidCommand(_) => "Invalid opr given".to_string(),
                other => other.to_string(),
            };
            (code, Json(serde_json::json!({ "error": message }))).into_response()
        }
    }
}

/// `GET /status` — master switch as a JSON boolean.
async fn status_handler(State(store): State<Arc<PolicyStore>>) -> Json<bool> {
    Json(status(&store))
}

/// `GET /info` — `{enabled, allowList, denyList}`.
async fn info_handler(State(store): State<Arc<PolicyStore>>) -> Json<PolicySnapshot> {
    Json(info(&store))
}
