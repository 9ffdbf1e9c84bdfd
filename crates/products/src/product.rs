use serde::{Deserialize, Serialize};

use shelfwatch_core::{AccountId, DomainError, DomainResult};

use crate::sku::Sku;

/// Catalog template for one SKU within one account.
///
/// Only constructible through validation, so a `Product` value always
/// satisfies `shelf_life_days > 0` and `reminder_days <= shelf_life_days`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    account_id: AccountId,
    sku: Sku,
    name: String,
    shelf_life_days: u32,
    reminder_days: u32,
    location: String,
}

impl Product {
    pub fn new(
        account_id: AccountId,
        sku: Sku,
        name: impl Into<String>,
        shelf_life_days: i64,
        reminder_days: i64,
        location: impl Into<String>,
    ) -> DomainResult<Self> {
        let name = required_text("name", name.into())?;
        let location = required_text("location", location.into())?;
        let (shelf_life_days, reminder_days) = validate_windows(shelf_life_days, reminder_days)?;

        Ok(Self {
            account_id,
            sku,
            name,
            shelf_life_days,
            reminder_days,
            location,
        })
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shelf_life_days(&self) -> u32 {
        self.shelf_life_days
    }

    pub fn reminder_days(&self) -> u32 {
        self.reminder_days
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Merge a partial update and re-validate the result.
    ///
    /// Account and SKU are identity and never change.
    pub fn apply_patch(&self, patch: ProductPatch) -> DomainResult<Product> {
        Product::new(
            self.account_id,
            self.sku.clone(),
            patch.name.unwrap_or_else(|| self.name.clone()),
            patch
                .shelf_life_days
                .unwrap_or(i64::from(self.shelf_life_days)),
            patch.reminder_days.unwrap_or(i64::from(self.reminder_days)),
            patch.location.unwrap_or_else(|| self.location.clone()),
        )
    }
}

/// Unvalidated input for creating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub sku: String,
    pub name: String,
    pub shelf_life_days: i64,
    pub reminder_days: i64,
    pub location: String,
}

impl ProductDraft {
    pub fn validate(self, account_id: AccountId) -> DomainResult<Product> {
        let sku = Sku::parse(&self.sku)?;
        Product::new(
            account_id,
            sku,
            self.name,
            self.shelf_life_days,
            self.reminder_days,
            self.location,
        )
    }
}

/// Partial update of a product; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub shelf_life_days: Option<i64>,
    pub reminder_days: Option<i64>,
    pub location: Option<String>,
}

fn required_text(field: &str, value: String) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

fn validate_windows(shelf_life_days: i64, reminder_days: i64) -> DomainResult<(u32, u32)> {
    if shelf_life_days <= 0 {
        return Err(DomainError::validation("shelf_life_days must be positive"));
    }
    if reminder_days < 0 {
        return Err(DomainError::validation("reminder_days cannot be negative"));
    }
    if reminder_days > shelf_life_days {
        return Err(DomainError::validation(
            "reminder_days cannot exceed shelf_life_days",
        ));
    }
    let shelf = u32::try_from(shelf_life_days)
        .map_err(|_| DomainError::validation("shelf_life_days is too large"))?;
    // reminder_days <= shelf_life_days, so this cannot fail once shelf fits.
    let reminder = u32::try_from(reminder_days)
        .map_err(|_| DomainError::validation("reminder_days is too large"))?;
    Ok((shelf, reminder))
}
