//! # Customer Repository
//!
//! CRUD for customers who may carry utang. Credit limits are validated
//! before any write; a negative limit never reaches the database.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use sari_core::validation::{validate_credit_limit, validate_customer_name};
use sari_core::Customer;

const CUSTOMER_COLUMNS: &str = "id, name, phone, address, credit_limit_centavos, created_at";

/// Fields required to create a customer.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub credit_limit_centavos: i64,
}

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Creates a customer after validating name and credit limit.
    pub async fn create(&self, new: NewCustomer, now: DateTime<Utc>) -> DbResult<Customer> {
        validate_customer_name(&new.name)?;
        validate_credit_limit(new.credit_limit_centavos)?;

        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            phone: new.phone,
            address: new.address,
            credit_limit_centavos: new.credit_limit_centavos,
            created_at: now,
        };

        debug!(id = %customer.id, name = %customer.name, "Creating customer");

        sqlx::query(
            "INSERT INTO customers (id, name, phone, address, credit_limit_centavos, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(customer.credit_limit_centavos)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Gets a customer by exact name.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE name = ?1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists all customers sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Searches customers by partial name.
    pub async fn search(&self, term: &str, limit: u32) -> DbResult<Vec<Customer>> {
        let pattern = format!("%{}%", term.trim());
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS}
             FROM customers
             WHERE name LIKE ?1
             ORDER BY name
             LIMIT ?2"
        ))
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Updates a customer's credit limit.
    pub async fn update_credit_limit(&self, id: &str, credit_limit_centavos: i64) -> DbResult<()> {
        validate_credit_limit(credit_limit_centavos)?;

        let result = sqlx::query("UPDATE customers SET credit_limit_centavos = ?2 WHERE id = ?1")
            .bind(id)
            .bind(credit_limit_centavos)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }
        Ok(())
    }
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

    fn maria() -> NewCustomer {
        NewCustomer {
            name: "Maria Santos".to_string(),
            phone: Some("09123456789".to_string()),
            address: Some("Brgy. San Jose".to_string()),
            credit_limit_centavos: 50_000,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.customers();

        let created = repo.create(maria(), now()).await.unwrap();
        let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Maria Santos");
        assert_eq!(fetched.credit_limit_centavos, 50_000);

        assert!(repo.get_by_name("Maria Santos").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_negative_credit_limit_rejected() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.customers();

        let mut bad = maria();
        bad.credit_limit_centavos = -100;
        assert!(repo.create(bad, now()).await.is_err());
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.customers();
        repo.create(maria(), now()).await.unwrap();

        let mut juan = maria();
        juan.name = "Juan Dela Cruz".to_string();
        repo.create(juan, now()).await.unwrap();

        let results = repo.search("santos", 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Maria Santos");
    }

    #[tokio::test]
    async fn test_update_credit_limit() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.customers();
        let c = repo.create(maria(), now()).await.unwrap();

        repo.update_credit_limit(&c.id, 100_000).await.unwrap();
        assert_eq!(
            repo.get_by_id(&c.id).await.unwrap().unwrap().credit_limit_centavos,
            100_000
        );

        assert!(repo.update_credit_limit(&c.id, -1).await.is_err());
        assert!(repo.update_credit_limit("ghost", 100).await.is_err());
    }
}
