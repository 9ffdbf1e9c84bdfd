use std::collections::BTreeMap;
use std::sync::Arc;

use shelfwatch_core::{AccountId, CalendarDate};
use shelfwatch_inventory::{Record, RecordKey};
use shelfwatch_products::{Product, Sku};

use super::partition::poisoned;
use super::{AccountPartitions, AccountStore, InsertOutcome, ProductStore, RecordStore, ResetSummary, StoreError};

/// In-memory product store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    partitions: AccountPartitions<BTreeMap<Sku, Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ProductStore for InMemoryProductStore {
    async fn list(&self, account: AccountId) -> Result<Vec<Product>, StoreError> {
        Ok(self
            .partitions
            .read(account, |products| products.values().cloned().collect())?
            .unwrap_or_default())
    }

    async fn get(&self, account: AccountId, sku: &Sku) -> Result<Option<Product>, StoreError> {
        Ok(self
            .partitions
            .read(account, |products| products.get(sku).cloned())?
            .flatten())
    }

    async fn insert(&self, product: Product) -> Result<(), StoreError> {
        self.partitions.write(product.account_id(), |products| {
            if products.contains_key(product.sku()) {
                return Err(StoreError::UniqueViolation(format!(
                    "product {} already exists",
                    product.sku()
                )));
            }
            products.insert(product.sku().clone(), product);
            Ok(())
        })?
    }

    async fn replace(&self, product: Product) -> Result<bool, StoreError> {
        Ok(self
            .partitions
            .update(product.account_id(), |products| match products.get_mut(product.sku()) {
                Some(slot) => {
                    *slot = product;
                    true
                }
                None => false,
            })?
            .unwrap_or(false))
    }

    async fn delete(&self, account: AccountId, sku: &Sku) -> Result<bool, StoreError> {
        Ok(self
            .partitions
            .update(account, |products| products.remove(sku).is_some())?
            .unwrap_or(false))
    }
}

/// In-memory record store for tests/dev.
///
/// Copies of the same batch are kept in logging order under one key.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    partitions: AccountPartitions<BTreeMap<RecordKey, Vec<Record>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn list(&self, account: AccountId) -> Result<Vec<Record>, StoreError> {
        Ok(self
            .partitions
            .read(account, |records| records.values().flatten().cloned().collect())?
            .unwrap_or_default())
    }

    async fn list_by_sku(&self, account: AccountId, sku: &Sku) -> Result<Vec<Record>, StoreError> {
        Ok(self
            .partitions
            .read(account, |records| {
                records
                    .iter()
                    .filter(|(key, _)| &key.sku == sku)
                    .flat_map(|(_, copies)| copies.iter().cloned())
                    .collect()
            })?
            .unwrap_or_default())
    }

    async fn insert_unique(&self, record: Record) -> Result<InsertOutcome, StoreError> {
        self.partitions.write(record.account_id, |records| {
            let copies = records.entry(record.key()).or_default();
            match copies.first() {
                Some(existing) => InsertOutcome::Existing(existing.clone()),
                None => {
                    copies.push(record);
                    InsertOutcome::Inserted
                }
            }
        })
    }

    async fn insert_duplicate(&self, record: Record) -> Result<(), StoreError> {
        self.partitions.write(record.account_id, |records| {
            records.entry(record.key()).or_default().push(record);
        })
    }

    async fn delete_one(&self, account: AccountId, key: &RecordKey) -> Result<bool, StoreError> {
        Ok(self
            .partitions
            .update(account, |records| {
                let Some(copies) = records.get_mut(key) else {
                    return false;
                };
                let removed = copies.pop().is_some();
                if copies.is_empty() {
                    records.remove(key);
                }
                removed
            })?
            .unwrap_or(false))
    }

    async fn delete_expired_before(&self, account: AccountId, cutoff: CalendarDate) -> Result<u64, StoreError> {
        Ok(self
            .partitions
            .update(account, |records| {
                let mut removed = 0u64;
                records.retain(|_, copies| {
                    let before = copies.len();
                    copies.retain(|r| r.expiry_date() >= cutoff);
                    removed += (before - copies.len()) as u64;
                    !copies.is_empty()
                });
                removed
            })?
            .unwrap_or(0))
    }
}

/// Account-wide operations over a pair of in-memory stores.
#[derive(Debug, Clone)]
pub struct InMemoryAccountStore {
    products: Arc<InMemoryProductStore>,
    records: Arc<InMemoryRecordStore>,
}

impl InMemoryAccountStore {
    pub fn new(products: Arc<InMemoryProductStore>, records: Arc<InMemoryRecordStore>) -> Self {
        Self { products, records }
    }
}

#[async_trait::async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn clear_account(&self, account: AccountId) -> Result<ResetSummary, StoreError> {
        let products = self.products.partitions.existing(account)?;
        let records = self.records.partitions.existing(account)?;

        // Lock order: products, then records. Nothing else holds both.
        let mut products = products
            .as_ref()
            .map(|p| p.lock())
            .transpose()
            .map_err(|_| poisoned())?;
        let mut records = records
            .as_ref()
            .map(|r| r.lock())
            .transpose()
            .map_err(|_| poisoned())?;

        Ok(ResetSummary {
            products_removed: products
                .as_deref_mut()
                .map_or(0, |p| std::mem::take(p).len() as u64),
            records_removed: records.as_deref_mut().map_or(0, |r| {
                std::mem::take(r)
                    .values()
                    .map(|copies| copies.len() as u64)
                    .sum()
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfwatch_products::ProductDraft;

    fn d(s: &str) -> CalendarDate {
        s.parse().unwrap()
    }

    fn product(account: AccountId, sku: &str) -> Product {
        ProductDraft {
            sku: sku.into(),
            name: format!("item {sku}"),
            shelf_life_days: 30,
            reminder_days: 5,
            location: "A1".into(),
        }
        .validate(account)
        .unwrap()
    }

    fn record(account: AccountId, sku: &str, produced: &str) -> Record {
        Record::from_product(&product(account, sku), d(produced), None).unwrap()
    }

    #[tokio::test]
    async fn product_insert_rejects_same_sku_in_same_account_only() {
        let store = InMemoryProductStore::new();
        let a = AccountId::new();
        let b = AccountId::new();

        store.insert(product(a, "10001")).await.unwrap();
        let err = store.insert(product(a, "10001")).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));

        store.insert(product(b, "10001")).await.unwrap();
        assert_eq!(store.list(a).await.unwrap().len(), 1);
        assert_eq!(store.list(b).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn products_list_in_sku_order() {
        let store = InMemoryProductStore::new();
        let a = AccountId::new();
        for sku in ["30001", "10002", "20001"] {
            store.insert(product(a, sku)).await.unwrap();
        }
        let skus: Vec<String> = store
            .list(a)
            .await
            .unwrap()
            .iter()
            .map(|p| p.sku().to_string())
            .collect();
        assert_eq!(skus, vec!["10002", "20001", "30001"]);
    }

    #[tokio::test]
    async fn replace_only_touches_existing_rows() {
        let store = InMemoryProductStore::new();
        let a = AccountId::new();
        assert!(!store.replace(product(a, "10001")).await.unwrap());
        assert!(store.get(a, &Sku::parse("10001").unwrap()).await.unwrap().is_none());
        assert!(!store.partitions.contains(a));
    }

    #[tokio::test]
    async fn insert_unique_reports_existing_copy() {
        let store = InMemoryRecordStore::new();
        let a = AccountId::new();

        let first = record(a, "10001", "2024-01-01");
        assert_eq!(store.insert_unique(first.clone()).await.unwrap(), InsertOutcome::Inserted);
        assert_eq!(
            store.insert_unique(first.clone()).await.unwrap(),
            InsertOutcome::Existing(first.clone())
        );
        assert_eq!(store.list(a).await.unwrap().len(), 1);

        store.insert_duplicate(first.clone()).await.unwrap();
        assert_eq!(store.list(a).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_one_removes_a_single_copy() {
        let store = InMemoryRecordStore::new();
        let a = AccountId::new();
        let r = record(a, "10001", "2024-01-01");
        store.insert_unique(r.clone()).await.unwrap();
        store.insert_duplicate(r.clone()).await.unwrap();

        assert!(store.delete_one(a, &r.key()).await.unwrap());
        assert_eq!(store.list(a).await.unwrap().len(), 1);
        assert!(store.delete_one(a, &r.key()).await.unwrap());
        assert!(!store.delete_one(a, &r.key()).await.unwrap());
        assert!(store.list(a).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_expired_before_uses_expiry_date() {
        let store = InMemoryRecordStore::new();
        let a = AccountId::new();
        // 30 day shelf life: expires 2024-01-31 and 2024-02-10.
        store.insert_unique(record(a, "10001", "2024-01-01")).await.unwrap();
        store.insert_unique(record(a, "10001", "2024-01-11")).await.unwrap();

        assert_eq!(store.delete_expired_before(a, d("2024-01-31")).await.unwrap(), 0);
        assert_eq!(store.delete_expired_before(a, d("2024-02-01")).await.unwrap(), 1);
        assert_eq!(store.list(a).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_phase_one_inserts_have_one_winner() {
        const WRITERS: usize = 16;
        let store = Arc::new(InMemoryRecordStore::new());
        let a = AccountId::new();
        let r = record(a, "10001", "2024-01-01");
        let start = Arc::new(tokio::sync::Barrier::new(WRITERS));

        let mut handles = Vec::new();
        for _ in 0..WRITERS {
            let store = store.clone();
            let r = r.clone();
            let start = start.clone();
            handles.push(tokio::spawn(async move {
                start.wait().await;
                store.insert_unique(r).await.unwrap()
            }));
        }

        let mut inserted = 0;
        for h in handles {
            if h.await.unwrap() == InsertOutcome::Inserted {
                inserted += 1;
            }
        }
        assert_eq!(inserted, 1);
        assert_eq!(store.list(a).await.unwrap().len(), 1);
    }

    fn account_store() -> (Arc<InMemoryProductStore>, Arc<InMemoryRecordStore>, InMemoryAccountStore) {
        let products = Arc::new(InMemoryProductStore::new());
        let records = Arc::new(InMemoryRecordStore::new());
        let accounts = InMemoryAccountStore::new(products.clone(), records.clone());
        (products, records, accounts)
    }

    #[tokio::test]
    async fn clear_account_empties_both_tables_of_one_account() {
        let (products, records, accounts) = account_store();
        let a = AccountId::new();
        let b = AccountId::new();
        for account in [a, b] {
            products.insert(product(account, "10001")).await.unwrap();
            records.insert_unique(record(account, "10001", "2024-01-01")).await.unwrap();
        }
        records.insert_duplicate(record(a, "10001", "2024-01-01")).await.unwrap();

        let summary = accounts.clear_account(a).await.unwrap();
        assert_eq!(
            summary,
            ResetSummary {
                products_removed: 1,
                records_removed: 2,
            }
        );
        assert!(products.list(a).await.unwrap().is_empty());
        assert!(records.list(a).await.unwrap().is_empty());
        assert_eq!(products.list(b).await.unwrap().len(), 1);
        assert_eq!(records.list(b).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn clear_account_clears_records_whose_template_is_gone() {
        let (products, records, accounts) = account_store();
        let a = AccountId::new();
        records.insert_unique(record(a, "10001", "2024-01-01")).await.unwrap();

        let summary = accounts.clear_account(a).await.unwrap();
        assert_eq!(summary.products_removed, 0);
        assert_eq!(summary.records_removed, 1);
        assert!(!products.partitions.contains(a));
    }

    #[tokio::test]
    async fn removals_on_an_unknown_account_leave_no_partition() {
        let products = InMemoryProductStore::new();
        let records = InMemoryRecordStore::new();
        let a = AccountId::new();
        let key = record(a, "10001", "2024-01-01").key();

        assert!(!products.delete(a, &key.sku).await.unwrap());
        assert!(!records.delete_one(a, &key).await.unwrap());
        assert_eq!(records.delete_expired_before(a, d("2030-01-01")).await.unwrap(), 0);
        let accounts = InMemoryAccountStore::new(Arc::new(products), Arc::new(records));
        assert_eq!(accounts.clear_account(a).await.unwrap(), ResetSummary::default());

        assert!(!accounts.products.partitions.contains(a));
        assert!(!accounts.records.partitions.contains(a));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Create { on_b: bool, sku: usize, day: i64 },
            Confirm { on_b: bool, sku: usize, day: i64 },
            Delete { on_b: bool, sku: usize, day: i64 },
        }

        fn arb_op() -> impl Strategy<Value = Op> {
            (0u8..3, any::<bool>(), 0usize..3, 0i64..4).prop_map(|(kind, on_b, sku, day)| match kind {
                0 => Op::Create { on_b, sku, day },
                1 => Op::Confirm { on_b, sku, day },
                _ => Op::Delete { on_b, sku, day },
            })
        }

        const SKUS: [&str; 3] = ["10001", "10002", "20001"];

        proptest! {
            /// Property: replaying only account A's operations yields the same
            /// records for A as the interleaved run over both accounts.
            #[test]
            fn interleaved_accounts_do_not_interfere(ops in prop::collection::vec(arb_op(), 0..40)) {
                let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
                let a = AccountId::new();
                let b = AccountId::new();

                let run = |ops: Vec<Op>| {
                    rt.block_on(async {
                        let store = InMemoryRecordStore::new();
                        for op in ops {
                            let (on_b, sku, day) = match op {
                                Op::Create { on_b, sku, day }
                                | Op::Confirm { on_b, sku, day }
                                | Op::Delete { on_b, sku, day } => (on_b, sku, day),
                            };
                            let account = if on_b { b } else { a };
                            let produced = d("2024-01-01").add_days(day).to_string();
                            let r = record(account, SKUS[sku], &produced);
                            match op {
                                Op::Create { .. } => { store.insert_unique(r).await.unwrap(); }
                                Op::Confirm { .. } => store.insert_duplicate(r).await.unwrap(),
                                Op::Delete { .. } => { store.delete_one(account, &r.key()).await.unwrap(); }
                            }
                        }
                        store.list(a).await.unwrap()
                    })
                };

                let only_a: Vec<Op> = ops
                    .iter()
                    .filter(|op| !matches!(op, Op::Create { on_b: true, .. } | Op::Confirm { on_b: true, .. } | Op::Delete { on_b: true, .. }))
                    .cloned()
                    .collect();

                prop_assert_eq!(run(ops), run(only_a));
            }
        }
    }
}
