//! Infrastructure layer: storage adapters, account-scoped services and config.

pub mod catalog;
pub mod config;
pub mod error;
pub mod ledger;
pub mod maintenance;
pub mod query;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use catalog::TenantCatalog;
pub use config::{AppConfig, ConfigError};
pub use error::{ServiceError, ServiceResult};
pub use ledger::{CreateOutcome, TenantLedger};
pub use maintenance::{LedgerMaintenance, ResetSummary};
pub use query::InventoryQueryEngine;
