//! Read-side views over an account's ledger.

use tracing::instrument;

use shelfwatch_core::{AccountId, CalendarDate};
use shelfwatch_inventory::{InventoryEntry, annotate, expiring_only};
use shelfwatch_products::Product;

use crate::error::ServiceResult;
use crate::ledger::TenantLedger;
use crate::store::{ProductStore, RecordStore};

/// Annotated listings for one account and one "today".
///
/// `today` is always an input; the engine never reads the clock, so the same
/// stored data and the same `today` always yield the same listing.
#[derive(Debug, Clone)]
pub struct InventoryQueryEngine<P, R> {
    ledger: TenantLedger<P, R>,
}

impl<P, R> InventoryQueryEngine<P, R>
where
    P: ProductStore,
    R: RecordStore,
{
    pub fn new(ledger: TenantLedger<P, R>) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &TenantLedger<P, R> {
        &self.ledger
    }

    /// Every batch, sorted expired first, then warning, then normal.
    #[instrument(skip(self), err)]
    pub async fn all_records(&self, account: AccountId, today: CalendarDate) -> ServiceResult<Vec<InventoryEntry>> {
        let records = self.ledger.list_all(account).await?;
        Ok(annotate(records, today))
    }

    /// The expired and warning batches of [`Self::all_records`], same order.
    #[instrument(skip(self), err)]
    pub async fn expiring(&self, account: AccountId, today: CalendarDate) -> ServiceResult<Vec<InventoryEntry>> {
        Ok(expiring_only(self.all_records(account, today).await?))
    }

    /// Product templates, ordered by SKU.
    #[instrument(skip(self), err)]
    pub async fn catalog(&self, account: AccountId) -> ServiceResult<Vec<Product>> {
        self.ledger.catalog().list(account).await
    }
}
