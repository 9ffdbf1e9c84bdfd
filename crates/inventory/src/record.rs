use serde::{Deserialize, Serialize};

use shelfwatch_core::{AccountId, CalendarDate, DomainError, DomainResult};
use shelfwatch_expiry::{ExpiryWindow, expiry_date};
use shelfwatch_products::{Product, Sku};

/// Uniqueness key of a batch inside one account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    pub sku: Sku,
    pub production_date: CalendarDate,
}

impl RecordKey {
    pub fn new(sku: Sku, production_date: CalendarDate) -> Self {
        Self {
            sku,
            production_date,
        }
    }
}

impl core::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}@{}", self.sku, self.production_date)
    }
}

/// Request to log a batch of an existing product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    pub sku: Sku,
    pub production_date: CalendarDate,
    /// Overrides the product's default storage location when present.
    #[serde(default)]
    pub location: Option<String>,
}

/// A dated batch: a snapshot of its product template plus a production date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub account_id: AccountId,
    pub sku: Sku,
    pub name: String,
    pub production_date: CalendarDate,
    pub shelf_life_days: u32,
    pub reminder_days: u32,
    pub location: String,
}

impl Record {
    /// Snapshot `product` into a new batch.
    pub fn from_product(
        product: &Product,
        production_date: CalendarDate,
        location: Option<String>,
    ) -> DomainResult<Self> {
        let location = match location.map(|l| l.trim().to_string()) {
            Some(l) if !l.is_empty() => l,
            Some(_) => return Err(DomainError::validation("location cannot be empty")),
            None => product.location().to_string(),
        };

        Ok(Self {
            account_id: product.account_id(),
            sku: product.sku().clone(),
            name: product.name().to_string(),
            production_date,
            shelf_life_days: product.shelf_life_days(),
            reminder_days: product.reminder_days(),
            location,
        })
    }

    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.sku.clone(), self.production_date)
    }

    pub fn expiry_date(&self) -> CalendarDate {
        expiry_date(self.production_date, self.shelf_life_days)
    }

    pub fn window(&self, today: CalendarDate) -> ExpiryWindow {
        ExpiryWindow::evaluate(
            self.production_date,
            self.shelf_life_days,
            self.reminder_days,
            today,
        )
    }
}
