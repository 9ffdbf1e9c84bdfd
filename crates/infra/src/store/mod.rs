//! Account-partitioned storage for product templates and batch records.
//!
//! Every method takes the `AccountId` explicitly and only ever touches rows of
//! that account. Uniqueness of `(account, sku)` and of the first copy of
//! `(account, sku, production_date)` is enforced here, at the storage layer,
//! not by a read in the service above.

pub mod in_memory;
pub mod partition;
pub mod postgres;

use std::sync::Arc;

use thiserror::Error;

use shelfwatch_core::{AccountId, CalendarDate};
use shelfwatch_inventory::{Record, RecordKey};
use shelfwatch_products::{Product, Sku};

pub use in_memory::{InMemoryAccountStore, InMemoryProductStore, InMemoryRecordStore};
pub use partition::AccountPartitions;
pub use postgres::{PostgresAccountStore, PostgresProductStore, PostgresRecordStore};

/// Storage operation error.
///
/// Infrastructure errors only; domain validation never gets this far.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// The backing store failed or is unreachable.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result of a conditional (phase-1) record insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// Nothing was written; this record already holds the key.
    Existing(Record),
}

/// Row counts removed by [`AccountStore::clear_account`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct ResetSummary {
    pub products_removed: u64,
    pub records_removed: u64,
}

#[async_trait::async_trait]
pub trait ProductStore: Send + Sync {
    /// All products of the account, ordered by SKU.
    async fn list(&self, account: AccountId) -> Result<Vec<Product>, StoreError>;

    async fn get(&self, account: AccountId, sku: &Sku) -> Result<Option<Product>, StoreError>;

    /// Insert a new product; `UniqueViolation` if the SKU is taken in that account.
    async fn insert(&self, product: Product) -> Result<(), StoreError>;

    /// Overwrite an existing product. `Ok(false)` when there is nothing to overwrite.
    async fn replace(&self, product: Product) -> Result<bool, StoreError>;

    async fn delete(&self, account: AccountId, sku: &Sku) -> Result<bool, StoreError>;
}

#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    async fn list(&self, account: AccountId) -> Result<Vec<Record>, StoreError>;

    async fn list_by_sku(&self, account: AccountId, sku: &Sku) -> Result<Vec<Record>, StoreError>;

    /// Insert only if no record holds `(account, sku, production_date)` yet.
    ///
    /// Atomic: of two concurrent callers for the same key exactly one gets
    /// `Inserted`, the other gets `Existing`.
    async fn insert_unique(&self, record: Record) -> Result<InsertOutcome, StoreError>;

    /// Append another copy regardless of existing records for the key.
    async fn insert_duplicate(&self, record: Record) -> Result<(), StoreError>;

    /// Remove the most recently logged copy for the key, if any.
    async fn delete_one(&self, account: AccountId, key: &RecordKey) -> Result<bool, StoreError>;

    /// Remove records whose expiry date is strictly before `cutoff`.
    async fn delete_expired_before(&self, account: AccountId, cutoff: CalendarDate) -> Result<u64, StoreError>;
}

/// Operations spanning both tables of one account.
#[async_trait::async_trait]
pub trait AccountStore: Send + Sync {
    /// Remove every product and record of the account as one atomic step.
    async fn clear_account(&self, account: AccountId) -> Result<ResetSummary, StoreError>;
}

#[async_trait::async_trait]
impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    async fn list(&self, account: AccountId) -> Result<Vec<Product>, StoreError> {
        (**self).list(account).await
    }

    async fn get(&self, account: AccountId, sku: &Sku) -> Result<Option<Product>, StoreError> {
        (**self).get(account, sku).await
    }

    async fn insert(&self, product: Product) -> Result<(), StoreError> {
        (**self).insert(product).await
    }

    async fn replace(&self, product: Product) -> Result<bool, StoreError> {
        (**self).replace(product).await
    }

    async fn delete(&self, account: AccountId, sku: &Sku) -> Result<bool, StoreError> {
        (**self).delete(account, sku).await
    }
}

#[async_trait::async_trait]
impl<S> RecordStore for Arc<S>
where
    S: RecordStore + ?Sized,
{
    async fn list(&self, account: AccountId) -> Result<Vec<Record>, StoreError> {
        (**self).list(account).await
    }

    async fn list_by_sku(&self, account: AccountId, sku: &Sku) -> Result<Vec<Record>, StoreError> {
        (**self).list_by_sku(account, sku).await
    }

    async fn insert_unique(&self, record: Record) -> Result<InsertOutcome, StoreError> {
        (**self).insert_unique(record).await
    }

    async fn insert_duplicate(&self, record: Record) -> Result<(), StoreError> {
        (**self).insert_duplicate(record).await
    }

    async fn delete_one(&self, account: AccountId, key: &RecordKey) -> Result<bool, StoreError> {
        (**self).delete_one(account, key).await
    }

    async fn delete_expired_before(&self, account: AccountId, cutoff: CalendarDate) -> Result<u64, StoreError> {
        (**self).delete_expired_before(account, cutoff).await
    }
}

#[async_trait::async_trait]
impl<S> AccountStore for Arc<S>
where
    S: AccountStore + ?Sized,
{
    async fn clear_account(&self, account: AccountId) -> Result<ResetSummary, StoreError> {
        (**self).clear_account(account).await
    }
}
