//! # Sale Repository
//!
//! Transactional checkout writes and the joined row feed that powers the
//! analytics engine.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Checkout Transaction                               │
//! │                                                                         │
//! │  1. VALIDATE (before any write)                                        │
//! │     └── cart.validate_checkout(kind)                                   │
//! │     └── utang: customer exists, credit limit honored                   │
//! │                                                                         │
//! │  2. WRITE (single transaction)                                         │
//! │     └── INSERT sales row (append-only ledger entry)                    │
//! │     └── INSERT sale_items (frozen product snapshots)                   │
//! │     └── UPDATE products stock (clamped at zero, warn on clamp)         │
//! │     └── utang: INSERT credit_obligations row (status: pending)         │
//! │                                                                         │
//! │  3. COMMIT                                                             │
//! │     └── any failure above rolls the whole transaction back:            │
//! │         prior state retained, nothing partial survives                 │
//! │                                                                         │
//! │  A pure cash loan ("pahiram") writes ONLY the obligation - there is    │
//! │  no sale and no stock movement.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! After the commit the caller hands the recorded sale to the analytics
//! engine as a `SaleRecorded` event; this repository does not talk to
//! channels itself.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::product::apply_stock_decrement;
use sari_core::analytics::{LineItemRow, ProductRef, SaleRow};
use sari_core::cart::{Cart, CheckoutKind};
use sari_core::{
    CoreError, CreditObligation, Customer, ObligationKind, ObligationStatus, Sale, SaleItem,
};

// =============================================================================
// Checkout Outcome
// =============================================================================

/// What a completed checkout wrote.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    /// The recorded sale; absent for a pure cash loan.
    pub sale: Option<Sale>,
    /// Line items written with the sale.
    pub items: Vec<SaleItem>,
    /// The utang entry; absent for a cash checkout.
    pub obligation: Option<CreditObligation>,
}

impl CheckoutOutcome {
    /// The recorded sale reshaped as an analytics feed row.
    ///
    /// This is what gets published as a `SaleRecorded` event so the
    /// dashboard can merge the sale without refetching.
    pub fn as_sale_row(&self, products: &dyn Fn(&str) -> Option<ProductRef>) -> Option<SaleRow> {
        let sale = self.sale.as_ref()?;
        Some(SaleRow {
            id: sale.id.clone(),
            created_at: Some(sale.created_at),
            total_amount_centavos: sale.total_amount_centavos,
            items: self
                .items
                .iter()
                .map(|item| LineItemRow {
                    product_id: Some(item.product_id.clone()),
                    quantity: item.quantity,
                    unit_price_centavos: item.unit_price_centavos,
                    line_total_centavos: item.line_total_centavos,
                    product: products(&item.product_id),
                })
                .collect(),
        })
    }
}

// =============================================================================
// Sale Repository
// =============================================================================

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Records a checkout in one transaction.
    ///
    /// ## Arguments
    /// * `cart` - validated against `kind` before any write
    /// * `kind` - cash, or utang with the owing customer
    /// * `notes` - free-form note stored on the utang entry
    ///
    /// ## Errors
    /// Returns a [`DbError::Domain`] and leaves the store untouched when
    /// the cart is empty, the payment kind is illegal for the cart, the
    /// customer is unknown, or the utang would exceed the credit limit.
    pub async fn record_checkout(
        &self,
        cart: &Cart,
        kind: &CheckoutKind,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> DbResult<CheckoutOutcome> {
        cart.validate_checkout(kind).map_err(DbError::Domain)?;

        let total_centavos = cart.total_centavos();
        let mut tx = self.pool.begin().await?;

        // Utang preconditions run before any write so a rejection
        // cannot leave partial state behind
        let customer = match kind {
            CheckoutKind::Utang { customer_id, .. } => {
                let customer = fetch_customer(&mut tx, customer_id).await?;
                let outstanding: Option<i64> = sqlx::query_scalar(
                    "SELECT SUM(amount_centavos) FROM credit_obligations
                     WHERE customer_id = ?1 AND status IN ('pending', 'overdue')",
                )
                .bind(customer_id)
                .fetch_one(&mut *tx)
                .await?;

                let would_owe = outstanding.unwrap_or(0) + total_centavos;
                if would_owe > customer.credit_limit_centavos {
                    return Err(DbError::Domain(CoreError::CreditLimitExceeded {
                        customer: customer.name.clone(),
                        limit_centavos: customer.credit_limit_centavos,
                        would_owe_centavos: would_owe,
                    }));
                }
                Some(customer)
            }
            CheckoutKind::Cash => None,
        };

        // Goods portion: sale row + items + stock decrements
        let (sale, items) = if cart.items.is_empty() {
            (None, Vec::new())
        } else {
            let goods_total: i64 = cart.items.iter().map(|i| i.line_total_centavos()).sum();
            let sale = Sale {
                id: Uuid::new_v4().to_string(),
                total_amount_centavos: goods_total,
                created_at: now,
            };

            sqlx::query(
                "INSERT INTO sales (id, total_amount_centavos, created_at)
                 VALUES (?1, ?2, ?3)",
            )
            .bind(&sale.id)
            .bind(sale.total_amount_centavos)
            .bind(sale.created_at)
            .execute(&mut *tx)
            .await?;

            let mut items = Vec::with_capacity(cart.items.len());
            for cart_item in &cart.items {
                let item = SaleItem {
                    id: Uuid::new_v4().to_string(),
                    sale_id: sale.id.clone(),
                    product_id: cart_item.product_id.clone(),
                    name_snapshot: cart_item.name.clone(),
                    quantity: cart_item.quantity,
                    unit_price_centavos: cart_item.unit_price_centavos,
                    line_total_centavos: cart_item.line_total_centavos(),
                    created_at: now,
                };

                sqlx::query(
                    "INSERT INTO sale_items (
                        id, sale_id, product_id, name_snapshot,
                        quantity, unit_price_centavos, line_total_centavos, created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                )
                .bind(&item.id)
                .bind(&item.sale_id)
                .bind(&item.product_id)
                .bind(&item.name_snapshot)
                .bind(item.quantity)
                .bind(item.unit_price_centavos)
                .bind(item.line_total_centavos)
                .bind(item.created_at)
                .execute(&mut *tx)
                .await?;

                apply_stock_decrement(&mut *tx, &cart_item.product_id, cart_item.quantity, now)
                    .await?;

                items.push(item);
            }

            (Some(sale), items)
        };

        // Utang portion: one obligation covering goods + any cash borrow
        let obligation = match (kind, customer) {
            (CheckoutKind::Utang { customer_id, due_date }, Some(_)) => {
                let kind = if cart.items.is_empty() {
                    ObligationKind::CashLoan
                } else {
                    ObligationKind::Goods
                };
                let obligation = CreditObligation {
                    id: Uuid::new_v4().to_string(),
                    customer_id: customer_id.clone(),
                    sale_id: sale.as_ref().map(|s| s.id.clone()),
                    amount_centavos: total_centavos,
                    kind,
                    status: ObligationStatus::Pending,
                    due_date: *due_date,
                    notes,
                    created_at: now,
                };

                sqlx::query(
                    "INSERT INTO credit_obligations (
                        id, customer_id, sale_id, amount_centavos, kind,
                        status, due_date, notes, created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                )
                .bind(&obligation.id)
                .bind(&obligation.customer_id)
                .bind(&obligation.sale_id)
                .bind(obligation.amount_centavos)
                .bind(obligation.kind)
                .bind(obligation.status)
                .bind(obligation.due_date)
                .bind(&obligation.notes)
                .bind(obligation.created_at)
                .execute(&mut *tx)
                .await?;

                Some(obligation)
            }
            _ => None,
        };

        tx.commit().await?;

        info!(
            sale_id = sale.as_ref().map(|s| s.id.as_str()).unwrap_or("-"),
            total = %total_centavos,
            items = items.len(),
            utang = obligation.is_some(),
            "Checkout recorded"
        );

        Ok(CheckoutOutcome {
            sale,
            items,
            obligation,
        })
    }

    /// Gets the most recent sales, newest first.
    pub async fn fetch_recent(&self, limit: u32) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            "SELECT id, total_amount_centavos, created_at
             FROM sales
             ORDER BY created_at DESC
             LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Gets all items for a sale.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            "SELECT id, sale_id, product_id, name_snapshot,
                    quantity, unit_price_centavos, line_total_centavos, created_at
             FROM sale_items
             WHERE sale_id = ?1
             ORDER BY created_at",
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Fetches the most recent sales as joined analytics rows.
    ///
    /// Each row carries its line items with product and category fields
    /// joined on. Deleted products and missing categories surface as
    /// nulls; the aggregation engine skips what it cannot resolve.
    /// Rows come back in chronological order.
    pub async fn fetch_sale_rows(&self, limit: u32) -> DbResult<Vec<SaleRow>> {
        let flat = sqlx::query_as::<_, JoinedSaleItemRow>(
            "SELECT s.id AS sale_id,
                    s.created_at AS sale_created_at,
                    s.total_amount_centavos,
                    si.product_id,
                    si.quantity,
                    si.unit_price_centavos,
                    si.line_total_centavos,
                    p.name AS product_name,
                    p.category_id,
                    c.name AS category_name
             FROM sales s
             LEFT JOIN sale_items si ON si.sale_id = s.id
             LEFT JOIN products p ON p.id = si.product_id
             LEFT JOIN categories c ON c.id = p.category_id
             WHERE s.id IN (SELECT id FROM sales ORDER BY created_at DESC LIMIT ?1)
             ORDER BY s.created_at, s.id",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(rows = flat.len(), "Fetched joined sale rows");

        // Fold consecutive flat rows back into nested SaleRows
        let mut rows: Vec<SaleRow> = Vec::new();
        for flat_row in flat {
            let needs_new = rows
                .last()
                .map(|r: &SaleRow| r.id != flat_row.sale_id)
                .unwrap_or(true);
            if needs_new {
                rows.push(SaleRow {
                    id: flat_row.sale_id.clone(),
                    created_at: flat_row.sale_created_at,
                    total_amount_centavos: flat_row.total_amount_centavos,
                    items: Vec::new(),
                });
            }

            // A sale with no items yields one flat row of all-null item
            // columns; quantity is the tell
            if let Some(quantity) = flat_row.quantity {
                let current = rows.last_mut().expect("row pushed above");
                current.items.push(LineItemRow {
                    product_id: flat_row.product_id,
                    quantity,
                    unit_price_centavos: flat_row.unit_price_centavos.unwrap_or(0),
                    line_total_centavos: flat_row.line_total_centavos.unwrap_or(0),
                    product: flat_row.product_name.map(|name| ProductRef {
                        name,
                        category_id: flat_row.category_id,
                        category_name: flat_row.category_name,
                    }),
                });
            }
        }

        Ok(rows)
    }
}

/// One flat row of the sales ⋈ items ⋈ products ⋈ categories join.
#[derive(Debug, sqlx::FromRow)]
struct JoinedSaleItemRow {
    sale_id: String,
    sale_created_at: Option<DateTime<Utc>>,
    total_amount_centavos: i64,
    product_id: Option<String>,
    quantity: Option<i64>,
    unit_price_centavos: Option<i64>,
    line_total_centavos: Option<i64>,
    product_name: Option<String>,
    category_id: Option<String>,
    category_name: Option<String>,
}

async fn fetch_customer(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    customer_id: &str,
) -> DbResult<Customer> {
    let customer = sqlx::query_as::<_, Customer>(
        "SELECT id, name, phone, address, credit_limit_centavos, created_at
         FROM customers
         WHERE id = ?1",
    )
    .bind(customer_id)
    .fetch_optional(&mut **tx)
    .await?;

    customer.ok_or_else(|| DbError::Domain(CoreError::CustomerNotFound(customer_id.to_string())))
}

// =============================================================================
// Unit Tests
// =============================================================================
