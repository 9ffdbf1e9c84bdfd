use axum::{Router, routing::get};

pub mod maintenance;
pub mod products;
pub mod records;
pub mod system;

/// Router for all authenticated (account-scoped) endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/products", products::router())
        .nest("/records", records::router())
        .nest("/maintenance", maintenance::router())
}
