use core::cmp::Ordering;

use serde::Serialize;

use shelfwatch_core::CalendarDate;
use shelfwatch_expiry::{ExpiryStatus, ExpiryWindow, SortKey};

use crate::record::Record;

/// A record together with its date-derived fields for one "today".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryEntry {
    #[serde(flatten)]
    pub record: Record,
    #[serde(flatten)]
    pub window: ExpiryWindow,
}

impl InventoryEntry {
    pub fn new(record: Record, today: CalendarDate) -> Self {
        let window = record.window(today);
        Self { record, window }
    }

    pub fn status(&self) -> ExpiryStatus {
        self.window.status
    }

    pub fn remaining_days(&self) -> i64 {
        self.window.remaining_days
    }

    pub fn sort_key(&self) -> SortKey {
        SortKey::new(self.window.status, self.window.remaining_days)
    }

    /// Listing order: status rank, remaining days, then `(sku, production_date)`.
    pub fn listing_order(&self, other: &Self) -> Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then_with(|| self.record.sku.cmp(&other.record.sku))
            .then_with(|| self.record.production_date.cmp(&other.record.production_date))
    }
}

/// Annotate every record for `today` and sort into listing order.
///
/// The sort is stable, so confirmed duplicates keep their storage order.
pub fn annotate(records: impl IntoIterator<Item = Record>, today: CalendarDate) -> Vec<InventoryEntry> {
    let mut entries: Vec<InventoryEntry> = records
        .into_iter()
        .map(|record| InventoryEntry::new(record, today))
        .collect();
    entries.sort_by(InventoryEntry::listing_order);
    entries
}

/// Keep only expired and warning entries, preserving order.
pub fn expiring_only(entries: Vec<InventoryEntry>) -> Vec<InventoryEntry> {
    entries
        .into_iter()
        .filter(|e| e.status().needs_attention())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfwatch_core::AccountId;
    use shelfwatch_products::Sku;

    fn d(s: &str) -> CalendarDate {
        s.parse().unwrap()
    }

    fn record(account: AccountId, sku: &str, produced: &str, shelf: u32, reminder: u32) -> Record {
        Record {
            account_id: account,
            sku: Sku::parse(sku).unwrap(),
            name: format!("item {sku}"),
            production_date: d(produced),
            shelf_life_days: shelf,
            reminder_days: reminder,
            location: "A1".into(),
        }
    }

    #[test]
    fn orders_expired_then_warning_then_normal() {
        let a = AccountId::new();
        let today = d("2024-06-28");
        let entries = annotate(
            vec![
                record(a, "30001", "2024-06-01", 365, 30), // normal
                record(a, "10001", "2024-01-01", 180, 7),  // warning, 1 day left
                record(a, "10002", "2024-06-01", 21, 3),   // expired 6 days ago
                record(a, "10003", "2024-06-20", 10, 5),   // warning, 2 days left
                record(a, "10004", "2024-06-18", 10, 5),   // expired today
            ],
            today,
        );

        let skus: Vec<&str> = entries.iter().map(|e| e.record.sku.as_str()).collect();
        assert_eq!(skus, vec!["10002", "10004", "10001", "10003", "30001"]);
        assert_eq!(entries[0].status(), ExpiryStatus::Expired);
        assert_eq!(entries[1].remaining_days(), 0);
        assert_eq!(entries[4].status(), ExpiryStatus::Normal);
    }

    #[test]
    fn ties_break_on_sku_then_production_date() {
        let a = AccountId::new();
        let today = d("2024-01-01");
        // Same shelf life and production date: identical sort keys.
        let entries = annotate(
            vec![
                record(a, "20002", "2023-12-01", 100, 10),
                record(a, "20001", "2023-12-01", 100, 10),
            ],
            today,
        );
        assert_eq!(entries[0].record.sku.as_str(), "20001");

        // Same sku, same expiry via different shelf life: production date decides.
        let entries = annotate(
            vec![
                record(a, "20001", "2023-12-02", 99, 10),
                record(a, "20001", "2023-12-01", 100, 10),
            ],
            today,
        );
        assert_eq!(entries[0].record.production_date, d("2023-12-01"));
    }

    #[test]
    fn expiring_only_drops_normal_entries() {
        let a = AccountId::new();
        let entries = annotate(
            vec![
                record(a, "10001", "2024-01-01", 180, 7),
                record(a, "30001", "2024-06-01", 365, 30),
            ],
            d("2024-06-28"),
        );
        let expiring = expiring_only(entries);
        assert_eq!(expiring.len(), 1);
        assert_eq!(expiring[0].record.sku.as_str(), "10001");
    }

    #[test]
    fn serializes_record_and_derived_fields_flat() {
        let a = AccountId::new();
        let entry = InventoryEntry::new(record(a, "10001", "2024-01-01", 180, 7), d("2024-06-28"));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["sku"], "10001");
        assert_eq!(json["production_date"], "2024-01-01");
        assert_eq!(json["expiry_date"], "2024-06-29");
        assert_eq!(json["reminder_date"], "2024-06-22");
        assert_eq!(json["remaining_days"], 1);
        assert_eq!(json["status"], "warning");
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_record(account: AccountId) -> impl Strategy<Value = Record> {
            (
                prop::sample::select(vec!["10001", "10002", "20001", "AB123"]),
                -400i64..400,
                (1u32..=400).prop_flat_map(|shelf| (Just(shelf), 0..=shelf)),
            )
                .prop_map(move |(sku, offset, (shelf, reminder))| Record {
                    account_id: account,
                    sku: Sku::parse(sku).unwrap(),
                    name: sku.to_string(),
                    production_date: d("2024-01-01").add_days(offset),
                    shelf_life_days: shelf,
                    reminder_days: reminder,
                    location: "A1".into(),
                })
        }

        proptest! {
            /// Property: the expiring view is a prefix of the full listing.
            #[test]
            fn expiring_is_a_prefix_of_all(
                records in prop::collection::vec(arb_record(AccountId::from_uuid(Default::default())), 0..40),
                today_offset in -400i64..800
            ) {
                let today = d("2024-01-01").add_days(today_offset);
                let all = annotate(records, today);
                let expiring = expiring_only(all.clone());

                prop_assert_eq!(&all[..expiring.len()], &expiring[..]);
                prop_assert!(all[expiring.len()..].iter().all(|e| e.status() == ExpiryStatus::Normal));
            }

            /// Property: listing order is non-decreasing in the sort key.
            #[test]
            fn listing_is_sorted(
                records in prop::collection::vec(arb_record(AccountId::from_uuid(Default::default())), 0..40),
                today_offset in -400i64..800
            ) {
                let today = d("2024-01-01").add_days(today_offset);
                let all = annotate(records, today);
                prop_assert!(all.windows(2).all(|w| w[0].listing_order(&w[1]) != Ordering::Greater));
            }
        }
    }
}
