//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - Name/barcode search
//! - CRUD operations
//! - Restock and sale-decrement stock updates
//!
//! ## Stock Underflow Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Sale Decrement: Clamp, Never Negative                   │
//! │                                                                         │
//! │  current_stock = 3, sale of 5                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  new_stock = max(0, 3 - 5) = 0                                         │
//! │       │                                                                 │
//! │       ├──► UPDATE products SET current_stock = 0                       │
//! │       └──► warn!(product, shortfall = 2, "stock clamped at zero")      │
//! │                                                                         │
//! │  The sale itself still completes; the shelf count was simply wrong     │
//! │  and the warning tells the owner to recount. The schema's              │
//! │  CHECK (current_stock >= 0) backs this up.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use sari_core::validation::{
    validate_minimum_stock, validate_price, validate_product_name, validate_restock_quantity,
};
use sari_core::Product;

/// All columns of the products table, in struct field order.
const PRODUCT_COLUMNS: &str = "id, name, barcode, unit_price_centavos, cost_price_centavos, \
     current_stock, minimum_stock, category_id, is_active, created_at, updated_at";

// =============================================================================
// Input Types
// =============================================================================

/// Fields required to create a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub barcode: Option<String>,
    pub unit_price_centavos: i64,
    pub cost_price_centavos: i64,
    pub current_stock: i64,
    pub minimum_stock: i64,
    pub category_id: Option<String>,
}

// =============================================================================
// Product Repository
// =============================================================================

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let results = repo.search("coke", 20).await?;
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Searches active products by name or barcode.
    ///
    /// ## Arguments
    /// * `query` - Search term (can be partial; empty returns all active)
    /// * `limit` - Maximum results to return
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching products");

        if query.is_empty() {
            return self.list_active(limit).await;
        }

        let pattern = format!("%{query}%");
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS}
             FROM products
             WHERE is_active = 1 AND (name LIKE ?1 OR barcode LIKE ?1)
             ORDER BY name
             LIMIT ?2"
        ))
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Lists active products sorted by name.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS}
             FROM products
             WHERE is_active = 1
             ORDER BY name
             LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Creates a product after validating its fields.
    ///
    /// Validation failures reject the insert before any mutation
    /// (no partial state change).
    pub async fn create(&self, new: NewProduct, now: DateTime<Utc>) -> DbResult<Product> {
        validate_product_name(&new.name)?;
        validate_price("unit price", new.unit_price_centavos)?;
        validate_price("cost price", new.cost_price_centavos)?;
        validate_minimum_stock(new.minimum_stock)?;

        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            barcode: new.barcode,
            unit_price_centavos: new.unit_price_centavos,
            cost_price_centavos: new.cost_price_centavos,
            current_stock: new.current_stock.max(0),
            minimum_stock: new.minimum_stock,
            category_id: new.category_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, name = %product.name, "Creating product");

        sqlx::query(
            "INSERT INTO products (
                id, name, barcode, unit_price_centavos, cost_price_centavos,
                current_stock, minimum_stock, category_id, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.barcode)
        .bind(product.unit_price_centavos)
        .bind(product.cost_price_centavos)
        .bind(product.current_stock)
        .bind(product.minimum_stock)
        .bind(&product.category_id)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Updates a product's editable fields (price, thresholds, category).
    ///
    /// Stock is NOT written here; it moves only through [`Self::restock`]
    /// and sale decrements so the two mutation paths stay auditable.
    pub async fn update(&self, product: &Product, now: DateTime<Utc>) -> DbResult<()> {
        validate_product_name(&product.name)?;
        validate_price("unit price", product.unit_price_centavos)?;
        validate_price("cost price", product.cost_price_centavos)?;
        validate_minimum_stock(product.minimum_stock)?;

        let result = sqlx::query(
            "UPDATE products SET
                name = ?2, barcode = ?3, unit_price_centavos = ?4,
                cost_price_centavos = ?5, minimum_stock = ?6, category_id = ?7,
                is_active = ?8, updated_at = ?9
             WHERE id = ?1",
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.barcode)
        .bind(product.unit_price_centavos)
        .bind(product.cost_price_centavos)
        .bind(product.minimum_stock)
        .bind(&product.category_id)
        .bind(product.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }
        Ok(())
    }

    /// Adds stock from a restock delivery.
    ///
    /// A quantity of zero or less is rejected before mutation.
    pub async fn restock(&self, id: &str, quantity: i64, now: DateTime<Utc>) -> DbResult<Product> {
        validate_restock_quantity(quantity)?;

        let result = sqlx::query(
            "UPDATE products
             SET current_stock = current_stock + ?2, updated_at = ?3
             WHERE id = ?1",
        )
        .bind(id)
        .bind(quantity)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        debug!(id = %id, quantity = %quantity, "Restocked product");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Decrements stock for a sale, clamping at zero.
    pub async fn decrement_stock(
        &self,
        id: &str,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        apply_stock_decrement(&mut *conn, id, quantity, now).await
    }

    /// Lists active products at or below their restock threshold.
    pub async fn list_low_stock(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS}
             FROM products
             WHERE is_active = 1 AND current_stock <= minimum_stock
             ORDER BY current_stock - minimum_stock"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }
}

/// Applies a clamped stock decrement on an open connection.
///
/// Shared between the standalone repository method and the checkout
/// transaction in the sale repository. Returns the new stock level.
pub(crate) async fn apply_stock_decrement(
    conn: &mut sqlx::SqliteConnection,
    product_id: &str,
    quantity: i64,
    now: DateTime<Utc>,
) -> DbResult<i64> {
    let current: Option<i64> =
        sqlx::query_scalar("SELECT current_stock FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&mut *conn)
            .await?;

    let current = current.ok_or_else(|| DbError::not_found("Product", product_id))?;
    let new_stock = (current - quantity).max(0);

    if current < quantity {
        warn!(
            product_id = %product_id,
            current = %current,
            requested = %quantity,
            shortfall = %(quantity - current),
            "Sale exceeds recorded stock; clamping at zero"
        );
    }

    sqlx::query("UPDATE products SET current_stock = ?2, updated_at = ?3 WHERE id = ?1")
        .bind(product_id)
        .bind(new_stock)
        .bind(now)
        .execute(&mut *conn)
        .await?;

    Ok(new_stock)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Database;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 1, 8, 0, 0).unwrap()
    }

    fn sample(name: &str, stock: i64, min: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            barcode: None,
            unit_price_centavos: 2500,
            cost_price_centavos: 2000,
            current_stock: stock,
            minimum_stock: min,
            category_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.products();

        let created = repo.create(sample("Coca-Cola 350ml", 50, 10), now()).await.unwrap();
        let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();

        assert_eq!(fetched.name, "Coca-Cola 350ml");
        assert_eq!(fetched.current_stock, 50);
        assert_eq!(fetched.unit_price_centavos, 2500);
        assert!(fetched.is_active);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.products();

        assert!(repo.create(sample("", 10, 0), now()).await.is_err());

        let mut negative_price = sample("Sprite 350ml", 10, 0);
        negative_price.unit_price_centavos = -5;
        assert!(repo.create(negative_price, now()).await.is_err());
    }

    #[tokio::test]
    async fn test_search_by_name() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.products();
        repo.create(sample("Coca-Cola 350ml", 50, 10), now()).await.unwrap();
        repo.create(sample("Sprite 350ml", 45, 10), now()).await.unwrap();
        repo.create(sample("Lucky Me Pancit Canton", 60, 15), now()).await.unwrap();

        let results = repo.search("cola", 20).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Coca-Cola 350ml");

        // Empty query returns everything active
        let all = repo.search("", 20).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_restock_adds_stock() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.products();
        let p = repo.create(sample("Nova Multigrain", 5, 10), now()).await.unwrap();

        let updated = repo.restock(&p.id, 40, now()).await.unwrap();
        assert_eq!(updated.current_stock, 45);
    }

    #[tokio::test]
    async fn test_restock_rejects_non_positive() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.products();
        let p = repo.create(sample("Nova Multigrain", 5, 10), now()).await.unwrap();

        assert!(repo.restock(&p.id, 0, now()).await.is_err());
        assert!(repo.restock(&p.id, -3, now()).await.is_err());
        // Stock unchanged after rejection
        assert_eq!(repo.get_by_id(&p.id).await.unwrap().unwrap().current_stock, 5);
    }

    #[tokio::test]
    async fn test_decrement_clamps_at_zero() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.products();
        let p = repo.create(sample("Piattos Cheese", 3, 0), now()).await.unwrap();

        let new_stock = repo.decrement_stock(&p.id, 5, now()).await.unwrap();
        assert_eq!(new_stock, 0);
        assert_eq!(repo.get_by_id(&p.id).await.unwrap().unwrap().current_stock, 0);
    }

    #[tokio::test]
    async fn test_list_low_stock() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.products();
        repo.create(sample("Safeguard Soap 90g", 2, 5), now()).await.unwrap();
        repo.create(sample("Tide Powder 35g", 50, 15), now()).await.unwrap();

        let low = repo.list_low_stock().await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Safeguard Soap 90g");
    }

    #[tokio::test]
    async fn test_unknown_product_not_found() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.products();

        assert!(repo.get_by_id("ghost").await.unwrap().is_none());
        assert!(matches!(
            repo.restock("ghost", 5, now()).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }
}
