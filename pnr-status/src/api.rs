use crate::config::Listener as ListenerConfig;
use crate::counter;
use crate::errors::{self, GatewayError};
use crate::handler;
use crate::metrics_defs::PNR_CHECK_REQUESTS;
use crate::upstream::StatusProvider;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Clone)]
struct AppState {
    provider: Arc<dyn StatusProvider>,
}

pub fn router(provider: Arc<dyn StatusProvider>) -> Router {
    Router::new()
        .route("/check-pnr", post(check_pnr))
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(AppState { provider })
}

/// Serves the gateway until `shutdown` resolves. In-flight requests are
/// allowed to finish.
pub async fn serve<F>(
    listener: &ListenerConfig,
    provider: Arc<dyn StatusProvider>,
    shutdown: F,
) -> Result<(), ApiError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = format!("{}:{}", listener.host, listener.port);
    let tcp_listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, provider = provider.name(), "PNR gateway listening");

    axum::serve(tcp_listener, router(provider))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

#[derive(Deserialize, Debug)]
struct CheckPnrRequest {
    #[serde(default)]
    pnr: Option<String>,
}

async fn check_pnr(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let response = match respond(&state, body).await {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(e) => {
            let status = e.status_code();
            if status.is_server_error() {
                tracing::error!(%status, error = %e, "PNR check failed");
            } else {
                tracing::info!(%status, error = %e, "PNR check rejected");
            }
            e.into_response()
        }
    };

    counter!(PNR_CHECK_REQUESTS, "status" => response.status().as_u16().to_string()).increment(1);
    response
}

async fn respond(
    state: &AppState,
    body: Result<Bytes, BytesRejection>,
) -> errors::Result<Map<String, Value>> {
    let body = body.map_err(|rejection| {
        GatewayError::BodyRejected(rejection.status(), rejection.body_text())
    })?;
    let request = parse_request(&body)?;
    let raw_pnr = request.pnr.as_deref().unwrap_or_default();

    handler::check_pnr(state.provider.as_ref(), raw_pnr).await
}

/// Renders a panic inside request handling as a 500 `{error}` response.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    };

    let error = GatewayError::Unclassified(message);
    tracing::error!(error = %error, "PNR check panicked");
    counter!(PNR_CHECK_REQUESTS, "status" => error.status_code().as_u16().to_string())
        .increment(1);
    error.into_response()
}

/// The body must be a JSON object; a missing `pnr` is treated as empty.
fn parse_request(body: &[u8]) -> Result<CheckPnrRequest, GatewayError> {
    let bad_request = |e: serde_json::Error| GatewayError::BadRequest(e.to_string());

    let value: Value = serde_json::from_slice(body).map_err(bad_request)?;
    if !value.is_object() {
        return Err(GatewayError::BadRequest("expected a JSON object".into()));
    }
    serde_json::from_value(value).map_err(bad_request)
}
