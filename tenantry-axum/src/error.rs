use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tenantry_core::errors::TenantryError;

/// Detail sent for failures that carry no structured error. The real cause
/// is only logged.
pub const INTERNAL_ERROR: &str = "Internal server error.";

#[derive(Debug)]
pub struct TenantryAxumError(pub anyhow::Error);

impl From<anyhow::Error> for TenantryAxumError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<TenantryError> for TenantryAxumError {
    fn from(e: TenantryError) -> Self {
        Self(e.into_anyhow())
    }
}

impl IntoResponse for TenantryAxumError {
    fn into_response(self) -> Response {
        // Keep structured errors even when wrapped in anyhow contexts.
        let safe = match TenantryError::from_anyhow(&self.0) {
            Some(e) => e.sanitize_for_client(),
            None => TenantryError::general_error(INTERNAL_ERROR),
        };

        let status = StatusCode::from_u16(safe.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = ?self.0, code = safe.code(), "request failed");
        }
        (status, Json(safe.to_json())).into_response()
    }
}
