use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde_json::json;

use stockledger_core::DomainError;
use stockledger_inventory::AdjustmentAction;
use stockledger_store::{StoreError, WriteError};

/// Error body is `{ "message": … }` across the whole surface.
pub fn json_message(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::InvalidInput(msg) => json_message(StatusCode::BAD_REQUEST, msg),
        DomainError::InvalidOperation(msg) => json_message(StatusCode::BAD_REQUEST, msg),
        DomainError::InvalidId(msg) => json_message(StatusCode::BAD_REQUEST, msg),
        DomainError::NotFound => json_message(StatusCode::NOT_FOUND, "product not found"),
        DomainError::Conflict(msg) => json_message(StatusCode::CONFLICT, msg),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::Conflict(_) => json_message(
            StatusCode::CONFLICT,
            "the product changed since it was read; retry the adjustment",
        ),
        StoreError::NotFound(_) => json_message(StatusCode::NOT_FOUND, "product not found"),
        StoreError::Backend(msg) => {
            tracing::error!("store backend error: {msg}");
            json_message(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

pub fn write_error_to_response(err: WriteError) -> axum::response::Response {
    match err {
        WriteError::Domain(e) => domain_error_to_response(e),
        WriteError::Store(e) => store_error_to_response(e),
    }
}

pub fn parse_action(s: &str) -> Result<AdjustmentAction, axum::response::Response> {
    s.parse::<AdjustmentAction>()
        .map_err(domain_error_to_response)
}

/// Accepts an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (read as
/// midnight UTC).
pub fn parse_date(value: &str, field: &str) -> Result<DateTime<Utc>, axum::response::Response> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    Err(json_message(
        StatusCode::BAD_REQUEST,
        format!("{field} must be an RFC 3339 timestamp or a YYYY-MM-DD date"),
    ))
}
