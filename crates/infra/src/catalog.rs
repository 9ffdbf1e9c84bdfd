//! Account-scoped product catalog.

use tracing::{info, instrument, warn};

use shelfwatch_core::AccountId;
use shelfwatch_products::{Product, ProductDraft, ProductPatch, Sku};

use crate::error::{ServiceError, ServiceResult};
use crate::store::{ProductStore, StoreError};

/// Product templates of each account. Every call is confined to one account.
#[derive(Debug, Clone)]
pub struct TenantCatalog<P> {
    products: P,
}

impl<P: ProductStore> TenantCatalog<P> {
    pub fn new(products: P) -> Self {
        Self { products }
    }

    /// All products of the account, ordered by SKU.
    #[instrument(skip(self), err)]
    pub async fn list(&self, account: AccountId) -> ServiceResult<Vec<Product>> {
        Ok(self.products.list(account).await?)
    }

    #[instrument(skip(self), err)]
    pub async fn get(&self, account: AccountId, sku: &Sku) -> ServiceResult<Option<Product>> {
        Ok(self.products.get(account, sku).await?)
    }

    /// Create a product. Fails with `DuplicateSku` carrying the existing
    /// template when the SKU is already taken in this account.
    #[instrument(skip(self, draft), fields(sku = %draft.sku), err)]
    pub async fn create(&self, account: AccountId, draft: ProductDraft) -> ServiceResult<Product> {
        let product = draft.validate(account)?;

        match self.products.insert(product.clone()).await {
            Ok(()) => {
                info!(%account, sku = %product.sku(), "product created");
                Ok(product)
            }
            Err(StoreError::UniqueViolation(_)) => {
                warn!(%account, sku = %product.sku(), "duplicate sku rejected");
                match self.products.get(account, product.sku()).await? {
                    Some(existing) => Err(ServiceError::DuplicateSku(Box::new(existing))),
                    // Deleted between the failed insert and the lookup.
                    None => Err(ServiceError::Conflict(format!(
                        "sku {} was modified concurrently",
                        product.sku()
                    ))),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Merge `patch` into the stored product. `Ok(None)` when the SKU is unknown.
    #[instrument(skip(self, patch), err)]
    pub async fn update(
        &self,
        account: AccountId,
        sku: &Sku,
        patch: ProductPatch,
    ) -> ServiceResult<Option<Product>> {
        let Some(current) = self.products.get(account, sku).await? else {
            return Ok(None);
        };

        let updated = current.apply_patch(patch)?;
        if !self.products.replace(updated.clone()).await? {
            return Ok(None);
        }

        info!(%account, %sku, "product updated");
        Ok(Some(updated))
    }

    /// Remove a product. Deleting an unknown SKU is a no-op that returns `false`.
    ///
    /// Batches already logged keep their snapshot of the template.
    #[instrument(skip(self), err)]
    pub async fn delete(&self, account: AccountId, sku: &Sku) -> ServiceResult<bool> {
        let removed = self.products.delete(account, sku).await?;
        if removed {
            info!(%account, %sku, "product deleted");
        }
        Ok(removed)
    }
}
