//! Account housekeeping: purging stale batches, resetting and seeding.

use tracing::{info, instrument, warn};

use shelfwatch_core::{AccountId, CalendarDate};
use shelfwatch_products::sample_catalog;

use crate::error::{ServiceError, ServiceResult};
use crate::ledger::TenantLedger;
use crate::store::{AccountStore, ProductStore, RecordStore};

pub use crate::store::ResetSummary;

#[derive(Debug, Clone)]
pub struct LedgerMaintenance<P, R, A> {
    ledger: TenantLedger<P, R>,
    accounts: A,
}

impl<P, R, A> LedgerMaintenance<P, R, A>
where
    P: ProductStore,
    R: RecordStore,
    A: AccountStore,
{
    /// `accounts` must be backed by the same storage as `ledger`.
    pub fn new(ledger: TenantLedger<P, R>, accounts: A) -> Self {
        Self { ledger, accounts }
    }

    /// Remove batches that expired more than `retention_days` before `today`.
    #[instrument(skip(self), err)]
    pub async fn purge_expired(
        &self,
        account: AccountId,
        today: CalendarDate,
        retention_days: u32,
    ) -> ServiceResult<u64> {
        let cutoff = today.add_days(-i64::from(retention_days));
        let removed = self.ledger.records().delete_expired_before(account, cutoff).await?;
        info!(%account, %cutoff, removed, "expired records purged");
        Ok(removed)
    }

    /// Remove every product and batch of the account.
    #[instrument(skip(self), err)]
    pub async fn reset_account(&self, account: AccountId) -> ServiceResult<ResetSummary> {
        let summary = self.accounts.clear_account(account).await?;
        warn!(
            %account,
            products_removed = summary.products_removed,
            records_removed = summary.records_removed,
            "account reset"
        );
        Ok(summary)
    }

    /// Load the demo catalog into the account. SKUs already present are skipped.
    ///
    /// Returns the number of products created.
    #[instrument(skip(self), err)]
    pub async fn seed_sample_catalog(&self, account: AccountId) -> ServiceResult<usize> {
        let mut created = 0;
        for draft in sample_catalog() {
            match self.ledger.catalog().create(account, draft).await {
                Ok(_) => created += 1,
                Err(ServiceError::DuplicateSku(_)) | Err(ServiceError::Conflict(_)) => {}
                Err(e) => return Err(e),
            }
        }
        info!(%account, created, "sample catalog seeded");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TenantCatalog;
    use std::sync::Arc;

    use crate::store::{InMemoryAccountStore, InMemoryProductStore, InMemoryRecordStore};
    use shelfwatch_inventory::NewRecord;
    use shelfwatch_products::Sku;

    fn d(s: &str) -> CalendarDate {
        s.parse().unwrap()
    }

    type Maintenance =
        LedgerMaintenance<Arc<InMemoryProductStore>, Arc<InMemoryRecordStore>, InMemoryAccountStore>;

    fn setup() -> Maintenance {
        let products = Arc::new(InMemoryProductStore::new());
        let records = Arc::new(InMemoryRecordStore::new());
        LedgerMaintenance::new(
            TenantLedger::new(TenantCatalog::new(products.clone()), records.clone()),
            InMemoryAccountStore::new(products, records),
        )
    }

    async fn log(m: &Maintenance, account: AccountId, sku: &str, produced: &str) {
        m.ledger
            .create(
                account,
                NewRecord {
                    sku: Sku::parse(sku).unwrap(),
                    production_date: d(produced),
                    location: None,
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn seeding_twice_creates_nothing_new() {
        let m = setup();
        let a = AccountId::new();
        let first = m.seed_sample_catalog(a).await.unwrap();
        assert_eq!(first, sample_catalog().len());
        assert_eq!(m.seed_sample_catalog(a).await.unwrap(), 0);
        assert_eq!(m.ledger.catalog().list(a).await.unwrap().len(), first);
    }

    #[tokio::test]
    async fn purge_respects_retention() {
        let m = setup();
        let a = AccountId::new();
        m.seed_sample_catalog(a).await.unwrap();
        // 13607 has a 180 day shelf life: 2024-01-01 expires 2024-06-29.
        log(&m, a, "13607", "2024-01-01").await;

        assert_eq!(m.purge_expired(a, d("2024-07-29"), 30).await.unwrap(), 0);
        assert_eq!(m.purge_expired(a, d("2024-07-30"), 30).await.unwrap(), 1);
        assert!(m.ledger.list_all(a).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reset_only_touches_one_account() {
        let m = setup();
        let a = AccountId::new();
        let b = AccountId::new();
        for account in [a, b] {
            m.seed_sample_catalog(account).await.unwrap();
            log(&m, account, "13607", "2024-01-01").await;
        }

        let summary = m.reset_account(a).await.unwrap();
        assert_eq!(summary.records_removed, 1);
        assert_eq!(summary.products_removed, sample_catalog().len() as u64);

        assert!(m.ledger.catalog().list(a).await.unwrap().is_empty());
        assert_eq!(m.ledger.list_all(b).await.unwrap().len(), 1);
        assert_eq!(m.ledger.catalog().list(b).await.unwrap().len(), sample_catalog().len());
    }
}
