use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use shelfwatch_infra::ServiceError;
use shelfwatch_inventory::Record;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::InvalidInput(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_input", msg),
        ServiceError::DuplicateSku(existing) => (
            StatusCode::CONFLICT,
            axum::Json(json!({
                "error": "duplicate_sku",
                "message": format!("sku {} already exists", existing.sku()),
                "existing": existing,
            })),
        )
            .into_response(),
        ServiceError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        ServiceError::NotFound(what) => json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found")),
        ServiceError::StorageUnavailable(detail) => {
            tracing::error!(%detail, "storage failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal server error",
            )
        }
    }
}

/// 409 for a batch withheld by the duplicate guard. The client resubmits with
/// `confirm_duplicate: true` to store it anyway.
pub fn duplicate_record(existing: &Record) -> axum::response::Response {
    (
        StatusCode::CONFLICT,
        axum::Json(json!({
            "error": "duplicate_record",
            "message": format!("a batch {} already exists", existing.key()),
            "existing": existing,
        })),
    )
        .into_response()
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
