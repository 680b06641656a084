//! # sari-core: Pure Business Logic for SariSense
//!
//! This crate is the **heart** of SariSense. It contains all business
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       SariSense Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web Frontend (React)                         │   │
//! │  │    POS UI ──► Inventory UI ──► Utang UI ──► Dashboard          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON + ts-rs bindings                  │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ sari-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │   rules   │  │   │
//! │  │   │  Customer │  │  centavos │  │ checkout  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────────────────────────────────────────────────────┐  │   │
//! │  │   │                      analytics                          │  │   │
//! │  │   │   aggregate ──► recommend          credit               │  │   │
//! │  │   │   (buckets)     (advisories)       (risk tiers)         │  │   │
//! │  │   └─────────────────────────────────────────────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        sari-db (SQLite) + sari-analytics (refresh actor)        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in centavos (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//! 5. **No Clock**: "now"/"today" always arrive as parameters, never from the system
//!
//! ## Example Usage
//!
//! ```rust
//! use sari_core::analytics::{aggregate, recommend, SaleRow};
//!
//! // Raw rows fetched by the store layer
//! let rows: Vec<SaleRow> = vec![];
//!
//! // Bucket them and generate advisories
//! let summaries = aggregate(&rows);
//! let advisories = recommend(
//!     &summaries.daily,
//!     &summaries.by_product,
//!     &summaries.by_category,
//!     &[],
//! );
//! assert!(advisories.len() <= sari_core::analytics::MAX_RECOMMENDATIONS);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod analytics;
pub mod cart;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use sari_core::Money` instead of
// `use sari_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct items allowed in a single cart
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable transaction sizes.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single item in cart
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;
