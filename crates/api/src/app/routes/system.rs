use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::context::AccountContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(account): Extension<AccountContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "account_id": account.account_id().to_string(),
    }))
}
