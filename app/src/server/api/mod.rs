//! REST API handlers grouped by domain.

pub mod qr;
pub mod settings;

use axum::Json;
use axum::http::StatusCode;
use image_engine::EngineError;
use serde_json::{Value, json};

pub type ApiError = (StatusCode, Json<Value>);

/// Standard error response.
pub fn err_json(status: u16, message: &str) -> ApiError {
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(json!({ "status": "error", "error": message })),
    )
}

/// Map an engine failure to 400 (caller input) or 500 (everything else).
pub fn engine_err(e: &EngineError) -> ApiError {
    let status = if e.is_client_error() { 400 } else { 500 };
    err_json(status, &e.to_string())
}
