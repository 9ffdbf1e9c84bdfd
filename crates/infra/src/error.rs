//! Service-level error taxonomy.

use thiserror::Error;

use shelfwatch_core::DomainError;
use shelfwatch_products::Product;

use crate::store::StoreError;

/// Error returned by catalog, ledger, query and maintenance operations.
///
/// Lookups that find nothing are not errors: they return `Ok(None)` or an
/// empty list. `NotFound` is reserved for writes that need something to exist
/// (e.g. logging a batch of an unknown SKU).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Caller-correctable input problem.
    #[error("{0}")]
    InvalidInput(String),

    /// The SKU is already taken in this account.
    #[error("sku {} already exists", .0.sku())]
    DuplicateSku(Box<Product>),

    /// Any other uniqueness conflict.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("{0} not found")]
    NotFound(String),

    /// The persistence collaborator failed. Not retried here.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => ServiceError::InvalidInput(msg),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(msg) => ServiceError::Conflict(msg),
            StoreError::Unavailable(msg) => ServiceError::StorageUnavailable(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_are_invalid_input() {
        assert_eq!(
            ServiceError::from(DomainError::validation("shelf_life_days must be positive")),
            ServiceError::InvalidInput("shelf_life_days must be positive".into())
        );
        assert_eq!(
            ServiceError::from(DomainError::invalid_id("AccountId: bad")),
            ServiceError::InvalidInput("AccountId: bad".into())
        );
    }

    #[test]
    fn store_errors_keep_their_kind() {
        assert!(matches!(
            ServiceError::from(StoreError::UniqueViolation("x".into())),
            ServiceError::Conflict(_)
        ));
        assert!(matches!(
            ServiceError::from(StoreError::Unavailable("x".into())),
            ServiceError::StorageUnavailable(_)
        ));
    }
}
