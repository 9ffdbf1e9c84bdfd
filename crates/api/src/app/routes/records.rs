use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
};

use shelfwatch_core::CalendarDate;
use shelfwatch_infra::CreateOutcome;
use shelfwatch_inventory::annotate;
use shelfwatch_products::Sku;

use crate::app::{dto, errors, services::AppServices};
use crate::context::AccountContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_records).post(create_record))
        .route("/expiring", get(list_expiring))
        .route("/by-sku/:sku", get(list_by_sku))
        .route("/:sku/:production_date", delete(delete_record))
}

/// All batches, annotated for `today` and in listing order. `?sku=` narrows to one product.
pub async fn list_records(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(account): Extension<AccountContext>,
    Query(query): Query<dto::ListQuery>,
) -> axum::response::Response {
    let today = match query.today() {
        Ok(pinned) => services.today(pinned),
        Err(resp) => return resp,
    };

    if let Some(sku) = query.sku.as_deref() {
        return by_sku(&services, account, sku, today).await;
    }

    match services.engine().all_records(account.account_id(), today).await {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_expiring(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(account): Extension<AccountContext>,
    Query(query): Query<dto::ListQuery>,
) -> axum::response::Response {
    let today = match query.today() {
        Ok(pinned) => services.today(pinned),
        Err(resp) => return resp,
    };

    match services.engine().expiring(account.account_id(), today).await {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_by_sku(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(account): Extension<AccountContext>,
    Path(sku): Path<String>,
    Query(query): Query<dto::ListQuery>,
) -> axum::response::Response {
    let today = match query.today() {
        Ok(pinned) => services.today(pinned),
        Err(resp) => return resp,
    };
    by_sku(&services, account, &sku, today).await
}

async fn by_sku(
    services: &AppServices,
    account: AccountContext,
    sku: &str,
    today: CalendarDate,
) -> axum::response::Response {
    let Ok(sku) = Sku::parse(sku) else {
        return (StatusCode::OK, Json(Vec::<serde_json::Value>::new())).into_response();
    };
    match services.ledger().list_by_sku(account.account_id(), &sku).await {
        Ok(records) => (StatusCode::OK, Json(annotate(records, today))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Log a batch. Without `confirm_duplicate` an existing `(sku, production_date)`
/// yields 409 with the existing batch and nothing is stored.
pub async fn create_record(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(account): Extension<AccountContext>,
    payload: Result<Json<dto::CreateRecordRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match dto::json_body(payload) {
        Ok(body) => body,
        Err(resp) => return resp,
    };
    let (new, confirm_duplicate) = match body.into_new_record() {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    if confirm_duplicate {
        return match services.ledger().confirm_duplicate(account.account_id(), new).await {
            Ok(record) => (StatusCode::OK, Json(record)).into_response(),
            Err(e) => errors::service_error_to_response(e),
        };
    }

    match services.ledger().create(account.account_id(), new).await {
        Ok(CreateOutcome::Created(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(CreateOutcome::Duplicate(existing)) => errors::duplicate_record(&existing),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Idempotent: deleting a batch that is not there still answers 200. A
/// malformed SKU or date names a batch that cannot exist, so it is a no-op too.
pub async fn delete_record(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(account): Extension<AccountContext>,
    Path((sku, production_date)): Path<(String, String)>,
) -> axum::response::Response {
    let removed = match (Sku::parse(&sku), production_date.parse::<CalendarDate>()) {
        (Ok(sku), Ok(production_date)) => match services
            .ledger()
            .delete(account.account_id(), &sku, production_date)
            .await
        {
            Ok(removed) => removed,
            Err(e) => return errors::service_error_to_response(e),
        },
        _ => false,
    };
    (StatusCode::OK, Json(serde_json::json!({ "removed": removed }))).into_response()
}
