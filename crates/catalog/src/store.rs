use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use stockroom_core::{CatalogError, CatalogResult, ProductId};

use crate::product::{Product, ProductKind};

/// Owned collection of products keyed by unique id.
///
/// The catalog exclusively owns its products; queries hand out references
/// for immediate consumption, mutations go through the id-based methods.
/// Iteration is sorted by id, so query results and saves are deterministic
/// within and across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    products: BTreeMap<ProductId, Product>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a product. Fails with `DuplicateId` if the id is taken;
    /// the catalog is untouched on failure.
    pub fn add(&mut self, product: Product) -> CatalogResult<()> {
        if self.products.contains_key(product.id()) {
            return Err(CatalogError::DuplicateId(product.id().clone()));
        }
        debug!(id = %product.id(), kind = %product.kind(), "product added");
        self.products.insert(product.id().clone(), product);
        Ok(())
    }

    /// Remove a product by id, returning it.
    pub fn remove(&mut self, id: &ProductId) -> CatalogResult<Product> {
        self.products
            .remove(id)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }

    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.get(id)
    }

    /// Sell `quantity` units of the identified product. Product-level
    /// failures (`InsufficientStock`, `InvalidArgument`) propagate unchanged.
    pub fn sell(&mut self, id: &ProductId, quantity: i64) -> CatalogResult<()> {
        self.products
            .get_mut(id)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))?
            .sell(quantity)
    }

    /// Restock `amount` units of the identified product.
    pub fn restock(&mut self, id: &ProductId, amount: i64) -> CatalogResult<()> {
        self.products
            .get_mut(id)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))?
            .restock(amount)
    }

    /// Exact, case-sensitive name match. An empty result is not an error.
    pub fn search_by_name(&self, name: &str) -> Vec<&Product> {
        self.products
            .values()
            .filter(|p| p.name() == name)
            .collect()
    }

    pub fn search_by_kind(&self, kind: ProductKind) -> Vec<&Product> {
        self.products
            .values()
            .filter(|p| p.kind() == kind)
            .collect()
    }

    /// All products in iteration order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Sum of per-product stock value; zero for an empty catalog.
    pub fn total_value(&self) -> Decimal {
        self.products.values().map(Product::total_value).sum()
    }

    /// Remove every grocery product whose expiry date is strictly before
    /// `today`; returns the count removed. Other kinds are never touched.
    pub fn remove_expired(&mut self, today: NaiveDate) -> usize {
        // Fix the removal set before mutating anything.
        let expired: Vec<ProductId> = self
            .products
            .values()
            .filter(|p| p.is_expired(today))
            .map(|p| p.id().clone())
            .collect();
        for id in &expired {
            self.products.remove(id);
        }
        if !expired.is_empty() {
            debug!(count = expired.len(), "expired products removed");
        }
        expired.len()
    }
}
