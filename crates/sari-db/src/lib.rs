//! # sari-db: Database Layer for SariSense
//!
//! This crate provides database access for the SariSense system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       SariSense Data Flow                               │
//! │                                                                         │
//! │  API layer (checkout, inventory, utang, dashboard)                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     sari-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ product, sale │    │  (embedded)  │  │   │
//! │  │   │               │    │ customer,     │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ credit,       │    │ 001_init.sql │  │   │
//! │  │   │ WAL mode      │    │ category      │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (one store, one database)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sari_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/sarisense.db")).await?;
//!
//! let products = db.products().search("coke", 20).await?;
//! let rows = db.sales().fetch_sale_rows(100).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::credit::{CreditRepository, NewObligation};
pub use repository::customer::{CustomerRepository, NewCustomer};
pub use repository::product::{NewProduct, ProductRepository};
pub use repository::sale::{CheckoutOutcome, SaleRepository};
