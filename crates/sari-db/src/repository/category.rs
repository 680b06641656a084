//! # Category Repository
//!
//! Lookup and creation of product categories. Categories are a weak
//! reference target: products point at them, and a category may exist
//! with zero products.

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use sari_core::Category;

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists all categories sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Gets a category by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name FROM categories WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Gets a category by exact name.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name FROM categories WHERE name = ?1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Creates a category, returning the stored row.
    pub async fn create(&self, name: &str) -> DbResult<Category> {
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
        };

        debug!(id = %category.id, name = %category.name, "Creating category");

        sqlx::query("INSERT INTO categories (id, name) VALUES (?1, ?2)")
            .bind(&category.id)
            .bind(&category.name)
            .execute(&self.pool)
            .await?;

        Ok(category)
    }

    /// Returns the category with this name, creating it if missing.
    ///
    /// Used by seeding and product import flows.
    pub async fn get_or_create(&self, name: &str) -> DbResult<Category> {
        if let Some(existing) = self.get_by_name(name.trim()).await? {
            return Ok(existing);
        }
        self.create(name).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::Database;

    #[tokio::test]
    async fn test_create_and_lookup() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.categories();

        let bev = repo.create("Beverages").await.unwrap();
        assert_eq!(repo.get_by_id(&bev.id).await.unwrap().unwrap().name, "Beverages");
        assert!(repo.get_by_name("Snacks").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.categories();

        let first = repo.get_or_create("Snacks").await.unwrap();
        let second = repo.get_or_create("Snacks").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.categories();

        repo.create("Household").await.unwrap();
        let err = repo.create("Household").await.unwrap_err();
        assert!(matches!(err, crate::DbError::UniqueViolation { .. }));
    }
}
