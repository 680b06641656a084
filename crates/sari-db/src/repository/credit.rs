//! # Credit Repository
//!
//! The utang ledger: obligations, balances, and batch settlement.
//!
//! ## Settlement Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Batch Settlement ("bayad na")                        │
//! │                                                                         │
//! │  Payment recording is not itemized per obligation. The customer        │
//! │  hands over what they owe and the whole slate clears at once:          │
//! │                                                                         │
//! │  UPDATE credit_obligations SET status = 'paid'                         │
//! │  WHERE customer_id = ? AND status IN ('pending', 'overdue')            │
//! │                                                                         │
//! │  Terminal rows (paid, cancelled) are never touched; the state          │
//! │  machine in sari-core guards every transition this repository          │
//! │  is asked to perform.                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use sari_core::{
    CoreError, CreditObligation, Customer, Money, ObligationKind, ObligationStatus,
    ValidationError,
};

const OBLIGATION_COLUMNS: &str = "id, customer_id, sale_id, amount_centavos, kind, status, \
     due_date, notes, created_at";

/// Fields required to record an obligation outside of checkout
/// (e.g. migrating a paper listahan into the system).
#[derive(Debug, Clone)]
pub struct NewObligation {
    pub customer_id: String,
    pub sale_id: Option<String>,
    pub amount_centavos: i64,
    pub kind: ObligationKind,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Repository for the credit obligation ledger.
#[derive(Debug, Clone)]
pub struct CreditRepository {
    pool: SqlitePool,
}

impl CreditRepository {
    /// Creates a new CreditRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CreditRepository { pool }
    }

    /// Records a new pending obligation.
    pub async fn insert_obligation(
        &self,
        new: NewObligation,
        now: DateTime<Utc>,
    ) -> DbResult<CreditObligation> {
        if new.amount_centavos <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "amount".to_string(),
            }
            .into());
        }

        let obligation = CreditObligation {
            id: Uuid::new_v4().to_string(),
            customer_id: new.customer_id,
            sale_id: new.sale_id,
            amount_centavos: new.amount_centavos,
            kind: new.kind,
            status: ObligationStatus::Pending,
            due_date: new.due_date,
            notes: new.notes,
            created_at: now,
        };

        debug!(
            id = %obligation.id,
            customer_id = %obligation.customer_id,
            amount = %obligation.amount_centavos,
            "Recording obligation"
        );

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
        .execute(&self.pool)
        .await?;

        Ok(obligation)
    }

    /// Lists a customer's obligations, newest first.
    pub async fn list_obligations(&self, customer_id: &str) -> DbResult<Vec<CreditObligation>> {
        let obligations = sqlx::query_as::<_, CreditObligation>(&format!(
            "SELECT {OBLIGATION_COLUMNS}
             FROM credit_obligations
             WHERE customer_id = ?1
             ORDER BY created_at DESC"
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(obligations)
    }

    /// Sums a customer's outstanding (pending + overdue) obligations.
    pub async fn outstanding_balance(&self, customer_id: &str) -> DbResult<Money> {
        let total: Option<i64> = sqlx::query_scalar(
            "SELECT SUM(amount_centavos) FROM credit_obligations
             WHERE customer_id = ?1 AND status IN ('pending', 'overdue')",
        )
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Money::from_centavos(total.unwrap_or(0)))
    }

    /// Moves every obligation of a customer matching `from_statuses` to
    /// `to_status` in one statement.
    ///
    /// Each requested transition is checked against the status machine
    /// first; an illegal one (e.g. reopening a paid obligation) rejects
    /// the whole batch before any write.
    ///
    /// Returns the number of obligations updated.
    pub async fn update_obligations_status(
        &self,
        customer_id: &str,
        from_statuses: &[ObligationStatus],
        to_status: ObligationStatus,
    ) -> DbResult<u64> {
        for from in from_statuses {
            if !from.can_transition_to(to_status) {
                return Err(DbError::Domain(CoreError::InvalidStatusTransition {
                    id: customer_id.to_string(),
                    from: *from,
                    to: to_status,
                }));
            }
        }
        if from_statuses.is_empty() {
            return Ok(0);
        }

        let placeholders = (0..from_statuses.len())
            .map(|i| format!("?{}", i + 3))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE credit_obligations SET status = ?1
             WHERE customer_id = ?2 AND status IN ({placeholders})"
        );

        let mut query = sqlx::query(&sql).bind(to_status).bind(customer_id);
        for from in from_statuses {
            query = query.bind(*from);
        }

        let updated = query.execute(&self.pool).await?.rows_affected();
        Ok(updated)
    }

    /// Marks everything a customer owes as paid in one batch.
    ///
    /// Returns the number of obligations settled.
    pub async fn settle_customer(&self, customer_id: &str) -> DbResult<u64> {
        let settled = self
            .update_obligations_status(
                customer_id,
                &[ObligationStatus::Pending, ObligationStatus::Overdue],
                ObligationStatus::Paid,
            )
            .await?;

        info!(customer_id = %customer_id, settled = %settled, "Customer settled utang");
        Ok(settled)
    }

    /// Flips pending obligations whose due date has passed to overdue.
    ///
    /// Run from the analytics refresh (or a scheduled sweep) so the risk
    /// classifier sees honest statuses.
    pub async fn mark_overdue(&self, today: NaiveDate) -> DbResult<u64> {
        let flipped = sqlx::query(
            "UPDATE credit_obligations SET status = 'overdue'
             WHERE status = 'pending' AND due_date IS NOT NULL AND due_date < ?1",
        )
        .bind(today)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if flipped > 0 {
            info!(count = %flipped, "Marked obligations overdue");
        }
        Ok(flipped)
    }

    /// Fetches every customer that has credit history, with their full
    /// obligation list. Input shape for the risk classifier.
    pub async fn customers_with_history(&self) -> DbResult<Vec<(Customer, Vec<CreditObligation>)>> {
        let customers = sqlx::query_as::<_, Customer>(
            "SELECT id, name, phone, address, credit_limit_centavos, created_at
             FROM customers c
             WHERE EXISTS (
                 SELECT 1 FROM credit_obligations o WHERE o.customer_id = c.id
             )
             ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::with_capacity(customers.len());
        for customer in customers {
            let obligations = self.list_obligations(&customer.id).await?;
            result.push((customer, obligations));
        }

        Ok(result)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
