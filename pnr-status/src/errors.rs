use crate::normalize::NormalizeError;
use crate::pnr::ValidationError;
use crate::upstream::UpstreamError;
use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T, E = GatewayError> = std::result::Result<T, E>;

/// Every way a status check can fail. Matched once, in `status_code`.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Invalid request body: {0}")]
    BadRequest(String),

    /// The body could not be read at all, e.g. it exceeded the size limit.
    #[error("Invalid request body: {1}")]
    BodyRejected(StatusCode, String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error("An unexpected error occurred: {0}")]
    Unclassified(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) | GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::BodyRejected(status, _) => *status,
            GatewayError::Upstream(UpstreamError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Normalize(NormalizeError::NotFound(_)) => StatusCode::NOT_FOUND,
            GatewayError::Normalize(_) | GatewayError::Unclassified(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct ApiErrorResponse {
    error: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorResponse {
            error: self.to_string(),
        });

        (self.status_code(), body).into_response()
    }
}
