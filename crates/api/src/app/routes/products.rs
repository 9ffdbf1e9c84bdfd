use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use shelfwatch_products::Sku;

use crate::app::{dto, errors, services::AppServices};
use crate::context::AccountContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/:sku", get(get_product).put(update_product).delete(delete_product))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(account): Extension<AccountContext>,
) -> axum::response::Response {
    match services.engine().catalog(account.account_id()).await {
        Ok(products) => (StatusCode::OK, Json(products)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// `200 null` for an unknown SKU; a malformed SKU cannot exist, so it is unknown too.
pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(account): Extension<AccountContext>,
    Path(sku): Path<String>,
) -> axum::response::Response {
    let Ok(sku) = Sku::parse(&sku) else {
        return (StatusCode::OK, Json(serde_json::Value::Null)).into_response();
    };
    match services.catalog().get(account.account_id(), &sku).await {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(account): Extension<AccountContext>,
    payload: Result<Json<dto::CreateProductRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match dto::json_body(payload) {
        Ok(body) => body,
        Err(resp) => return resp,
    };
    match services.catalog().create(account.account_id(), body).await {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Returns the merged product, or `null` when the SKU is unknown.
pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(account): Extension<AccountContext>,
    Path(sku): Path<String>,
    payload: Result<Json<dto::UpdateProductRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match dto::json_body(payload) {
        Ok(body) => body,
        Err(resp) => return resp,
    };
    let Ok(sku) = Sku::parse(&sku) else {
        return (StatusCode::OK, Json(serde_json::Value::Null)).into_response();
    };
    match services.catalog().update(account.account_id(), &sku, body).await {
        Ok(updated) => (StatusCode::OK, Json(updated)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(account): Extension<AccountContext>,
    Path(sku): Path<String>,
) -> axum::response::Response {
    let removed = match Sku::parse(&sku) {
        Ok(sku) => match services.catalog().delete(account.account_id(), &sku).await {
            Ok(removed) => removed,
            Err(e) => return errors::service_error_to_response(e),
        },
        Err(_) => false,
    };
    (StatusCode::OK, Json(serde_json::json!({ "removed": removed }))).into_response()
}
