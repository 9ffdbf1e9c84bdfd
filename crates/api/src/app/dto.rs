use axum::{Json, extract::rejection::JsonRejection, http::StatusCode};
use serde::Deserialize;

use shelfwatch_core::CalendarDate;
use shelfwatch_inventory::NewRecord;
use shelfwatch_products::Sku;

use crate::app::errors;

pub use shelfwatch_products::{ProductDraft as CreateProductRequest, ProductPatch as UpdateProductRequest};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateRecordRequest {
    pub sku: String,
    pub production_date: String,
    #[serde(default)]
    pub location: Option<String>,
    /// Second phase of the duplicate protocol: store even if the batch exists.
    #[serde(default)]
    pub confirm_duplicate: bool,
}

impl CreateRecordRequest {
    pub fn into_new_record(self) -> Result<(NewRecord, bool), axum::response::Response> {
        let sku = parse_sku(&self.sku)?;
        let production_date = parse_date("production_date", &self.production_date)?;
        Ok((
            NewRecord {
                sku,
                production_date,
                location: self.location,
            },
            self.confirm_duplicate,
        ))
    }
}

/// `?today=YYYY-MM-DD` plus the optional `?sku=` filter of `GET /records`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub today: Option<String>,
    pub sku: Option<String>,
}

impl ListQuery {
    pub fn today(&self) -> Result<Option<CalendarDate>, axum::response::Response> {
        self.today.as_deref().map(|raw| parse_date("today", raw)).transpose()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PurgeQuery {
    pub today: Option<String>,
    /// Overrides the configured retention window.
    pub retention_days: Option<u32>,
}

impl PurgeQuery {
    pub fn today(&self) -> Result<Option<CalendarDate>, axum::response::Response> {
        self.today.as_deref().map(|raw| parse_date("today", raw)).transpose()
    }
}

// -------------------------
// Parsing helpers
// -------------------------

/// Unwrap a JSON body, turning axum's rejection (bad syntax, missing field,
/// wrong type, wrong content type) into the usual `invalid_input` 400.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, axum::response::Response> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| errors::json_error(StatusCode::BAD_REQUEST, "invalid_input", rejection.body_text()))
}

pub fn parse_sku(raw: &str) -> Result<Sku, axum::response::Response> {
    Sku::parse(raw).map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "invalid_input", e.to_string()))
}

pub fn parse_date(field: &'static str, raw: &str) -> Result<CalendarDate, axum::response::Response> {
    raw.parse::<CalendarDate>().map_err(|_| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_input",
            format!("{field} must be a YYYY-MM-DD date"),
        )
    })
}
