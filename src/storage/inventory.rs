//! Inventory ledger: keeps product stock consistent with live usage records.
//!
//! The invariant: at any point, a product's `stock_quantity` equals its
//! initial stock minus the sum of live usage quantities against it (plus
//! any explicit restocks through a product patch). Recording usage
//! decrements stock, deleting usage restores it, and a same-product
//! quantity adjustment shifts stock by the delta.
//!
//! One deliberate exception, carried over from the system this replaces:
//! when an adjustment moves a usage to a *different* product, the old
//! product is not restocked and the new product is not decremented - only
//! the new product's sufficiency is checked. See DESIGN.md.

use chrono::Utc;

use crate::models::patch::{ProductPatch, ProductUsagePatch};
use crate::models::{NewProduct, NewProductUsage, Product, ProductUsage};
use crate::{Error, Result};

use super::Storage;

impl Storage {
    // ---- Products ----

    /// Create a product and return the stored record.
    pub fn create_product(&mut self, new: NewProduct) -> Product {
        let id = self.ids.products.next();
        let product = Product::new(id, new);
        self.products.insert(id, product.clone());
        product
    }

    /// Look up a product by id.
    pub fn get_product(&self, id: i64) -> Option<Product> {
        self.products.get(&id).cloned()
    }

    /// All products in id order.
    pub fn list_products(&self) -> Vec<Product> {
        self.products.values().cloned().collect()
    }

    /// Apply a patch to a product, bumping `updated_at`.
    pub fn update_product(&mut self, id: i64, patch: ProductPatch) -> Option<Product> {
        let product = self.products.get_mut(&id)?;
        if let Some(name) = patch.name {
            product.name = name;
        }
        if let Some(sku) = patch.sku {
            product.sku = sku;
        }
        if let Some(description) = patch.description {
            product.description = Some(description);
        }
        if let Some(unit_price) = patch.unit_price {
            product.unit_price = unit_price;
        }
        if let Some(stock_quantity) = patch.stock_quantity {
            product.stock_quantity = stock_quantity;
        }
        if let Some(threshold) = patch.low_stock_threshold {
            product.low_stock_threshold = threshold;
        }
        if let Some(category) = patch.category {
            product.category = Some(category);
        }
        product.updated_at = Utc::now();
        Some(product.clone())
    }

    /// Delete a product. Returns whether a record existed.
    pub fn delete_product(&mut self, id: i64) -> bool {
        self.products.remove(&id).is_some()
    }

    // ---- Usage ledger ----

    /// Usage records against a task, in id order.
    pub fn task_product_usage(&self, task_id: i64) -> Vec<ProductUsage> {
        self.usage
            .values()
            .filter(|u| u.task_id == task_id)
            .cloned()
            .collect()
    }

    /// Look up a usage record by id.
    pub fn get_usage(&self, id: i64) -> Option<ProductUsage> {
        self.usage.get(&id).cloned()
    }

    /// Record material usage against a task, decrementing product stock.
    ///
    /// Fails with `InsufficientStock` (carrying the available quantity)
    /// when the request exceeds current stock, without mutating anything.
    pub fn record_usage(&mut self, new: NewProductUsage) -> Result<ProductUsage> {
        if new.quantity <= 0 {
            return Err(Error::InvalidInput(
                "usage quantity must be a positive integer".to_string(),
            ));
        }
        let product = self
            .products
            .get_mut(&new.product_id)
            .ok_or(Error::not_found("product", new.product_id))?;
        if product.stock_quantity < new.quantity {
            return Err(Error::InsufficientStock {
                product_id: product.id,
                available: product.stock_quantity,
            });
        }
        // Floor at zero as a guard; under the check above it never engages
        product.stock_quantity = (product.stock_quantity - new.quantity).max(0);
        product.updated_at = Utc::now();

        let id = self.ids.usage.next();
        let usage = ProductUsage::new(id, new);
        self.usage.insert(id, usage.clone());
        Ok(usage)
    }

    /// Adjust a usage record, shifting stock by the quantity delta.
    ///
    /// Increasing the quantity depletes stock further and is checked for
    /// sufficiency; decreasing it restores stock. A product change only
    /// validates the new product's sufficiency (no stock moves on either
    /// side). `used_at` is re-stamped.
    pub fn adjust_usage(&mut self, id: i64, patch: ProductUsagePatch) -> Result<ProductUsage> {
        let current = self
            .usage
            .get(&id)
            .cloned()
            .ok_or(Error::not_found("product usage", id))?;

        let new_product_id = patch.product_id.unwrap_or(current.product_id);
        let new_quantity = patch.quantity.unwrap_or(current.quantity);
        if new_quantity <= 0 {
            return Err(Error::InvalidInput(
                "usage quantity must be a positive integer".to_string(),
            ));
        }

        let product = self
            .products
            .get(&new_product_id)
            .ok_or(Error::not_found("product", new_product_id))?;

        if new_product_id == current.product_id {
            let delta = new_quantity - current.quantity;
            if delta > 0 && product.stock_quantity < delta {
                return Err(Error::InsufficientStock {
                    product_id: product.id,
                    available: product.stock_quantity,
                });
            }
            if delta != 0 {
                if let Some(product) = self.products.get_mut(&new_product_id) {
                    product.stock_quantity = (product.stock_quantity - delta).max(0);
                    product.updated_at = Utc::now();
                }
            }
        } else if product.stock_quantity < new_quantity {
            return Err(Error::InsufficientStock {
                product_id: product.id,
                available: product.stock_quantity,
            });
        }

        let usage = self
            .usage
            .get_mut(&id)
            .ok_or(Error::not_found("product usage", id))?;
        usage.product_id = new_product_id;
        usage.quantity = new_quantity;
        usage.used_at = Utc::now();
        Ok(usage.clone())
    }

    /// Delete a usage record, restoring its quantity to the product's stock.
    ///
    /// Returns whether a record existed. The restore is unconditional: it
    /// applies even if the product was restocked in the meantime.
    pub fn release_usage(&mut self, id: i64) -> bool {
        let Some(usage) = self.usage.remove(&id) else {
            return false;
        };
        if let Some(product) = self.products.get_mut(&usage.product_id) {
            product.stock_quantity += usage.quantity;
            product.updated_at = Utc::now();
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product(sku: &str, stock: i64) -> NewProduct {
        NewProduct {
            name: format!("Product {sku}"),
            sku: sku.to_string(),
            description: None,
            unit_price: 9.99,
            stock_quantity: stock,
            low_stock_threshold: 5,
            category: None,
        }
    }

    fn usage_of(product_id: i64, quantity: i64) -> NewProductUsage {
        NewProductUsage {
            task_id: 1,
            product_id,
            quantity,
        }
    }

    /// Live usage against a product, for checking the ledger invariant.
    fn live_usage_total(storage: &Storage, product_id: i64) -> i64 {
        storage
            .usage
            .values()
            .filter(|u| u.product_id == product_id)
            .map(|u| u.quantity)
            .sum()
    }

    #[test]
    fn test_record_usage_decrements_stock() {
        let mut storage = Storage::new();
        let product = storage.create_product(new_product("THR-001", 15));
        storage.record_usage(usage_of(product.id, 2)).unwrap();
        assert_eq!(storage.get_product(product.id).unwrap().stock_quantity, 13);
    }

    #[test]
    fn test_record_usage_insufficient_stock_mutates_nothing() {
        let mut storage = Storage::new();
        let product = storage.create_product(new_product("HVF-001", 2));

        let result = storage.record_usage(usage_of(product.id, 3));
        match result {
            Err(Error::InsufficientStock {
                product_id,
                available,
            }) => {
                assert_eq!(product_id, product.id);
                assert_eq!(available, 2);
            }
            other => panic!("expected InsufficientStock, got {:?}", other),
        }
        // Neither stock nor the usage collection changed
        assert_eq!(storage.get_product(product.id).unwrap().stock_quantity, 2);
        assert!(storage.task_product_usage(1).is_empty());
    }

    #[test]
    fn test_record_usage_rejects_nonpositive_quantity() {
        let mut storage = Storage::new();
        let product = storage.create_product(new_product("WRC-001", 5));
        assert!(matches!(
            storage.record_usage(usage_of(product.id, 0)),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            storage.record_usage(usage_of(product.id, -2)),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_record_usage_unknown_product() {
        let mut storage = Storage::new();
        assert!(matches!(
            storage.record_usage(usage_of(42, 1)),
            Err(Error::NotFound { entity: "product", id: 42 })
        ));
    }

    #[test]
    fn test_release_usage_restores_exact_quantity() {
        let mut storage = Storage::new();
        let product = storage.create_product(new_product("CPF-001", 10));
        let usage = storage.record_usage(usage_of(product.id, 4)).unwrap();
        assert_eq!(storage.get_product(product.id).unwrap().stock_quantity, 6);

        assert!(storage.release_usage(usage.id));
        assert_eq!(storage.get_product(product.id).unwrap().stock_quantity, 10);
        assert!(!storage.release_usage(usage.id));
    }

    #[test]
    fn test_adjust_usage_increase_depletes_stock() {
        let mut storage = Storage::new();
        let product = storage.create_product(new_product("CPF-001", 10));
        let usage = storage.record_usage(usage_of(product.id, 2)).unwrap();

        let adjusted = storage
            .adjust_usage(
                usage.id,
                ProductUsagePatch {
                    quantity: Some(5),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(adjusted.quantity, 5);
        assert_eq!(storage.get_product(product.id).unwrap().stock_quantity, 5);
    }

    #[test]
    fn test_adjust_usage_decrease_restores_stock() {
        let mut storage = Storage::new();
        let product = storage.create_product(new_product("CPF-001", 10));
        let usage = storage.record_usage(usage_of(product.id, 6)).unwrap();

        storage
            .adjust_usage(
                usage.id,
                ProductUsagePatch {
                    quantity: Some(1),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(storage.get_product(product.id).unwrap().stock_quantity, 9);
    }

    #[test]
    fn test_adjust_usage_increase_beyond_stock_rejected() {
        let mut storage = Storage::new();
        let product = storage.create_product(new_product("CPF-001", 4));
        let usage = storage.record_usage(usage_of(product.id, 3)).unwrap();

        // Stock is now 1; increasing usage by 2 needs more than that
        let result = storage.adjust_usage(
            usage.id,
            ProductUsagePatch {
                quantity: Some(5),
                ..Default::default()
            },
        );
        assert!(matches!(
            result,
            Err(Error::InsufficientStock { available: 1, .. })
        ));
        // Nothing changed
        assert_eq!(storage.get_usage(usage.id).unwrap().quantity, 3);
        assert_eq!(storage.get_product(product.id).unwrap().stock_quantity, 1);
    }

    #[test]
    fn test_adjust_usage_product_change_moves_no_stock() {
        // Preserved behavior: switching products validates the new product's
        // sufficiency but does not touch stock on either side.
        let mut storage = Storage::new();
        let old = storage.create_product(new_product("OLD-001", 10));
        let new = storage.create_product(new_product("NEW-001", 10));
        let usage = storage.record_usage(usage_of(old.id, 4)).unwrap();
        assert_eq!(storage.get_product(old.id).unwrap().stock_quantity, 6);

        let adjusted = storage
            .adjust_usage(
                usage.id,
                ProductUsagePatch {
                    product_id: Some(new.id),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(adjusted.product_id, new.id);
        assert_eq!(storage.get_product(old.id).unwrap().stock_quantity, 6);
        assert_eq!(storage.get_product(new.id).unwrap().stock_quantity, 10);
    }

    #[test]
    fn test_adjust_usage_product_change_checks_new_product() {
        let mut storage = Storage::new();
        let old = storage.create_product(new_product("OLD-001", 10));
        let new = storage.create_product(new_product("NEW-001", 2));
        let usage = storage.record_usage(usage_of(old.id, 4)).unwrap();

        let result = storage.adjust_usage(
            usage.id,
            ProductUsagePatch {
                product_id: Some(new.id),
                ..Default::default()
            },
        );
        assert!(matches!(
            result,
            Err(Error::InsufficientStock { available: 2, .. })
        ));
        assert_eq!(storage.get_usage(usage.id).unwrap().product_id, old.id);
    }

    #[test]
    fn test_stock_invariant_across_usage_lifecycle() {
        // stock == initial - sum(live usage quantities), for any sequence
        // of create/adjust/delete on the same product
        let mut storage = Storage::new();
        let initial = 20;
        let product = storage.create_product(new_product("INV-001", initial));

        let u1 = storage.record_usage(usage_of(product.id, 3)).unwrap();
        let u2 = storage.record_usage(usage_of(product.id, 5)).unwrap();
        storage
            .adjust_usage(
                u1.id,
                ProductUsagePatch {
                    quantity: Some(7),
                    ..Default::default()
                },
            )
            .unwrap();
        storage.release_usage(u2.id);
        let _u3 = storage.record_usage(usage_of(product.id, 2)).unwrap();

        let stock = storage.get_product(product.id).unwrap().stock_quantity;
        assert_eq!(stock, initial - live_usage_total(&storage, product.id));
        assert_eq!(stock, 11);
    }

    #[test]
    fn test_low_stock_scenario() {
        // A product already below threshold stays listed; a well-stocked one
        // does not appear even after usage
        let mut storage = Storage::new();
        let low = storage.create_product(NewProduct {
            stock_quantity: 2,
            low_stock_threshold: 5,
            ..new_product("HVF-001", 2)
        });
        let stocked = storage.create_product(NewProduct {
            stock_quantity: 15,
            low_stock_threshold: 3,
            ..new_product("THR-001", 15)
        });

        storage.record_usage(usage_of(stocked.id, 2)).unwrap();

        let low_stock: Vec<i64> = storage.low_stock_products().iter().map(|p| p.id).collect();
        assert!(low_stock.contains(&low.id));
        assert!(!low_stock.contains(&stocked.id));
        assert_eq!(storage.get_product(stocked.id).unwrap().stock_quantity, 13);
    }
}
