//! Account-scoped ledger of dated batches, with the duplicate guard.
//!
//! Logging a batch is a two-phase protocol:
//!
//! 1. [`TenantLedger::create`] inserts the batch only if no batch with the same
//!    `(sku, production_date)` exists in the account. The check and the insert
//!    are one atomic storage operation.
//! 2. If one did exist, the caller gets [`CreateOutcome::Duplicate`] and
//!    nothing is written. Only an explicit [`TenantLedger::confirm_duplicate`]
//!    stores an additional copy.

use serde::Serialize;
use tracing::{info, instrument, warn};

use shelfwatch_core::{AccountId, CalendarDate};
use shelfwatch_inventory::{NewRecord, Record, RecordKey};
use shelfwatch_products::{Product, Sku};

use crate::catalog::TenantCatalog;
use crate::error::{ServiceError, ServiceResult};
use crate::store::{InsertOutcome, ProductStore, RecordStore};

/// Result of the first phase of logging a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "record", rename_all = "snake_case")]
pub enum CreateOutcome {
    Created(Record),
    /// A batch with the same key already exists; nothing was written.
    Duplicate(Record),
}

#[derive(Debug, Clone)]
pub struct TenantLedger<P, R> {
    catalog: TenantCatalog<P>,
    records: R,
}

impl<P, R> TenantLedger<P, R>
where
    P: ProductStore,
    R: RecordStore,
{
    pub fn new(catalog: TenantCatalog<P>, records: R) -> Self {
        Self { catalog, records }
    }

    pub fn catalog(&self) -> &TenantCatalog<P> {
        &self.catalog
    }

    /// Phase 1: log a batch unless `(sku, production_date)` is already present.
    #[instrument(skip(self, new), fields(sku = %new.sku, production_date = %new.production_date), err)]
    pub async fn create(&self, account: AccountId, new: NewRecord) -> ServiceResult<CreateOutcome> {
        let record = self.snapshot(account, new).await?;

        match self.records.insert_unique(record.clone()).await? {
            InsertOutcome::Inserted => {
                info!(%account, key = %record.key(), "record created");
                Ok(CreateOutcome::Created(record))
            }
            InsertOutcome::Existing(existing) => {
                warn!(%account, key = %existing.key(), "duplicate record withheld");
                Ok(CreateOutcome::Duplicate(existing))
            }
        }
    }

    /// Phase 2: store another copy of a batch the caller knows is a duplicate.
    ///
    /// The template is looked up again, so the copy reflects the product as it
    /// is now rather than when phase 1 ran.
    #[instrument(skip(self, new), fields(sku = %new.sku, production_date = %new.production_date), err)]
    pub async fn confirm_duplicate(&self, account: AccountId, new: NewRecord) -> ServiceResult<Record> {
        let record = self.snapshot(account, new).await?;
        self.records.insert_duplicate(record.clone()).await?;
        info!(%account, key = %record.key(), "duplicate record confirmed");
        Ok(record)
    }

    /// Remove one batch. Removing a batch that is not there returns `false`.
    ///
    /// When confirmed duplicates exist, the most recently logged copy goes first.
    #[instrument(skip(self), err)]
    pub async fn delete(
        &self,
        account: AccountId,
        sku: &Sku,
        production_date: CalendarDate,
    ) -> ServiceResult<bool> {
        let key = RecordKey::new(sku.clone(), production_date);
        let removed = self.records.delete_one(account, &key).await?;
        if removed {
            info!(%account, %key, "record deleted");
        }
        Ok(removed)
    }

    #[instrument(skip(self), err)]
    pub async fn list_all(&self, account: AccountId) -> ServiceResult<Vec<Record>> {
        Ok(self.records.list(account).await?)
    }

    #[instrument(skip(self), err)]
    pub async fn list_by_sku(&self, account: AccountId, sku: &Sku) -> ServiceResult<Vec<Record>> {
        Ok(self.records.list_by_sku(account, sku).await?)
    }

    pub(crate) fn records(&self) -> &R {
        &self.records
    }

    async fn template(&self, account: AccountId, sku: &Sku) -> ServiceResult<Product> {
        self.catalog
            .get(account, sku)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("product {sku}")))
    }

    async fn snapshot(&self, account: AccountId, new: NewRecord) -> ServiceResult<Record> {
        let product = self.template(account, &new.sku).await?;
        Ok(Record::from_product(&product, new.production_date, new.location)?)
    }
}
