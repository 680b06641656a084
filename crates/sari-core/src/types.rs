//! # Domain Types
//!
//! Core domain types used throughout SariSense.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌───────────────────┐     │
//! │  │    Product      │   │      Sale       │   │ CreditObligation  │     │
//! │  │  ─────────────  │   │  ─────────────  │   │  ───────────────  │     │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)        │     │
//! │  │  name           │   │  total_amount   │   │  customer_id (FK) │     │
//! │  │  unit_price     │   │  created_at     │   │  amount, status   │     │
//! │  │  current_stock  │   │  items: [...]   │   │  due_date         │     │
//! │  └─────────────────┘   └─────────────────┘   └───────────────────┘     │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌───────────────────┐     │
//! │  │    Category     │   │    Customer     │   │ ObligationStatus  │     │
//! │  │  ─────────────  │   │  ─────────────  │   │  ───────────────  │     │
//! │  │  id, name       │   │  id, name       │   │  Pending          │     │
//! │  └─────────────────┘   │  credit_limit   │   │  Paid / Overdue   │     │
//! │                        └─────────────────┘   │  Cancelled        │     │
//! │                                              └───────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has a UUID v4 `id` used for database relations. Sales are
//! append-only: once recorded at checkout they are never mutated, which is
//! what lets the analytics engine treat them as an immutable ledger.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Category
// =============================================================================

/// A product category (Beverages, Snacks, Instant Noodles, ...).
///
/// Products hold a weak reference to a category; a category may exist
/// with zero products.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, unique per store.
    pub name: String,
}

// =============================================================================
// Product
// =============================================================================

/// A product on the store shelf.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown at the register and on the dashboard.
    pub name: String,

    /// Barcode (EAN-13, UPC-A, etc.), if the item carries one.
    pub barcode: Option<String>,

    /// Selling price in centavos.
    pub unit_price_centavos: i64,

    /// Acquisition cost in centavos (for margin reporting).
    pub cost_price_centavos: i64,

    /// Current stock level. Never negative: sale decrements clamp at zero.
    pub current_stock: i64,

    /// Restock threshold. At or below this level the product is flagged.
    pub minimum_stock: i64,

    /// Category this product belongs to, if assigned.
    pub category_id: Option<String>,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    /// When the product was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the selling price as a Money type.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_centavos(self.unit_price_centavos)
    }

    /// Returns the cost price as a Money type.
    #[inline]
    pub fn cost_price(&self) -> Money {
        Money::from_centavos(self.cost_price_centavos)
    }

    /// Margin per unit (selling price minus cost).
    #[inline]
    pub fn margin(&self) -> Money {
        self.unit_price() - self.cost_price()
    }

    /// True when the product is at or below its restock threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.minimum_stock
    }

    /// Checks whether `quantity` units can be sold without clamping.
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.current_stock >= quantity
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A store customer who may carry utang (informal credit).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Customer name, unique per store.
    pub name: String,

    /// Contact number, if known.
    pub phone: Option<String>,

    /// Home address, barangay-level is enough.
    pub address: Option<String>,

    /// Maximum credit the store extends to this customer, in centavos.
    /// Always ≥ 0.
    pub credit_limit_centavos: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Returns the credit limit as Money.
    #[inline]
    pub fn credit_limit(&self) -> Money {
        Money::from_centavos(self.credit_limit_centavos)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A completed sale transaction.
///
/// Sales are append-only ledger entries: created at checkout, never
/// mutated afterwards. The stored total is trusted independently of the
/// line items (the aggregation engine sums `total_amount_centavos` for
/// daily totals and line totals for product/category revenue).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    /// Grand total in centavos.
    pub total_amount_centavos: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the total as Money.
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_centavos(self.total_amount_centavos)
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Quantity sold. Always positive.
    pub quantity: i64,
    /// Unit price in centavos at time of sale (frozen).
    pub unit_price_centavos: i64,
    /// Line total (unit_price × quantity).
    pub line_total_centavos: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_centavos(self.unit_price_centavos)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_centavos(self.line_total_centavos)
    }
}

// =============================================================================
// Obligation Status
// =============================================================================

/// Lifecycle of a credit obligation (utang).
///
/// ## State Machine
/// ```text
/// ┌─────────────────────────────────────────────────────────────┐
/// │                                                             │
/// │   Pending ──────► Paid        (settled)                     │
/// │      │  │                                                   │
/// │      │  └───────► Cancelled   (written off)                 │
/// │      ▼                                                      │
/// │   Overdue ──────► Paid                                      │
/// │      │                                                      │
/// │      └──────────► Cancelled                                 │
/// │                                                             │
/// │   Paid and Cancelled are terminal. A settled obligation     │
/// │   is never reopened.                                        │
/// └─────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ObligationStatus {
    /// Obligation recorded, not yet due or paid.
    Pending,
    /// Fully settled.
    Paid,
    /// Past its due date without payment.
    Overdue,
    /// Written off by the store owner.
    Cancelled,
}

impl ObligationStatus {
    /// True for statuses that still count towards the customer's balance.
    #[inline]
    pub fn is_outstanding(&self) -> bool {
        matches!(self, ObligationStatus::Pending | ObligationStatus::Overdue)
    }

    /// True for terminal statuses.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, ObligationStatus::Paid | ObligationStatus::Cancelled)
    }

    /// Checks whether a transition to `next` is legal.
    pub fn can_transition_to(&self, next: ObligationStatus) -> bool {
        use ObligationStatus::*;
        match (self, next) {
            (Pending, Paid) | (Pending, Overdue) | (Pending, Cancelled) => true,
            (Overdue, Paid) | (Overdue, Cancelled) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for ObligationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObligationStatus::Pending => write!(f, "pending"),
            ObligationStatus::Paid => write!(f, "paid"),
            ObligationStatus::Overdue => write!(f, "overdue"),
            ObligationStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

// =============================================================================
// Obligation Kind
// =============================================================================

/// What the customer owes for: goods taken home or cash borrowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ObligationKind {
    /// Goods purchased on credit.
    Goods,
    /// Cash handed over as a small loan.
    CashLoan,
}

// =============================================================================
// Credit Obligation
// =============================================================================

/// A single utang entry against a customer.
///
/// Owned by its customer (one-to-many). Status transitions are the only
/// mutation path; amount and linkage are frozen at creation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CreditObligation {
    pub id: String,
    pub customer_id: String,
    /// The sale this obligation came from, when it was a goods checkout.
    /// Cash loans have no sale.
    pub sale_id: Option<String>,
    /// Amount owed in centavos. Always positive.
    pub amount_centavos: i64,
    pub kind: ObligationKind,
    pub status: ObligationStatus,
    /// Agreed payback date, if one was set.
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
    /// Free-form note ("will pay next week").
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl CreditObligation {
    /// Returns the amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_centavos(self.amount_centavos)
    }

    /// True when this obligation still counts towards the balance.
    #[inline]
    pub fn is_outstanding(&self) -> bool {
        self.status.is_outstanding()
    }

    /// True when the obligation is past its due date on `today`.
    pub fn is_past_due(&self, today: NaiveDate) -> bool {
        match self.due_date {
            Some(due) => self.status == ObligationStatus::Pending && due < today,
            None => false,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
