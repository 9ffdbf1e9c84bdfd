use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};

use crate::app::{dto, errors, services::AppServices};
use crate::context::AccountContext;

pub fn router() -> Router {
    Router::new()
        .route("/purge-expired", post(purge_expired))
        .route("/reset", post(reset_account))
        .route("/seed", post(seed_sample_catalog))
}

pub async fn purge_expired(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(account): Extension<AccountContext>,
    Query(query): Query<dto::PurgeQuery>,
) -> axum::response::Response {
    let today = match query.today() {
        Ok(pinned) => services.today(pinned),
        Err(resp) => return resp,
    };
    let retention_days = query.retention_days.unwrap_or(services.retention_days());

    match services
        .maintenance()
        .purge_expired(account.account_id(), today, retention_days)
        .await
    {
        Ok(removed) => (StatusCode::OK, Json(serde_json::json!({ "removed": removed }))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn reset_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(account): Extension<AccountContext>,
) -> axum::response::Response {
    match services.maintenance().reset_account(account.account_id()).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn seed_sample_catalog(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(account): Extension<AccountContext>,
) -> axum::response::Response {
    match services.maintenance().seed_sample_catalog(account.account_id()).await {
        Ok(created) => (StatusCode::OK, Json(serde_json::json!({ "created": created }))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
