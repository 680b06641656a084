//! # Credit Risk Classifier
//!
//! Assigns a Low/Medium/High risk tier to each customer carrying utang,
//! from elapsed time since their last activity and their outstanding
//! balance.
//!
//! ## Decision Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Risk Tier Decision                                   │
//! │                                                                         │
//! │  overdue_days = max(0, today − last obligation date)                    │
//! │  balance      = Σ pending/overdue obligation amounts                    │
//! │                                                                         │
//! │  overdue_days > 14  OR  balance > ₱1,000  ──►  High                     │
//! │  overdue_days > 7   OR  balance > ₱500    ──►  Medium                   │
//! │  otherwise                                ──►  Low                      │
//! │                                                                         │
//! │  Evaluated in that precedence; the High check always runs first,        │
//! │  so 20 days overdue with a ₱100 balance is still High.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Thresholds are heuristic store policy, not statistics; they are
//! configurable through [`RiskThresholds`] with the defaults above.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{CreditObligation, Customer, ObligationStatus};

// =============================================================================
// Risk Level
// =============================================================================

/// Customer risk tier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}

// =============================================================================
// Thresholds
// =============================================================================

/// Tier thresholds, overridable per store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Days since last activity beyond which a customer is High risk.
    pub high_overdue_days: i64,
    /// Outstanding balance beyond which a customer is High risk.
    pub high_balance: Money,
    /// Days since last activity beyond which a customer is Medium risk.
    pub medium_overdue_days: i64,
    /// Outstanding balance beyond which a customer is Medium risk.
    pub medium_balance: Money,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        RiskThresholds {
            high_overdue_days: 14,
            high_balance: Money::from_pesos(1000),
            medium_overdue_days: 7,
            medium_balance: Money::from_pesos(500),
        }
    }
}

// =============================================================================
// Credit Risk
// =============================================================================

/// Risk assessment for one customer, rebuilt on each analytics refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreditRisk {
    pub customer_id: String,
    pub customer_name: String,
    /// Outstanding balance (pending + overdue obligations).
    pub total_credit: Money,
    /// Days since the customer's most recent obligation.
    pub overdue_days: i64,
    pub risk_level: RiskLevel,
    /// Advisory text for store staff.
    pub recommendation: String,
}

// =============================================================================
// Classification
// =============================================================================

/// Classifies one customer with the default thresholds.
pub fn classify_risk(
    customer: &Customer,
    obligations: &[CreditObligation],
    today: NaiveDate,
) -> CreditRisk {
    classify_risk_with(&RiskThresholds::default(), customer, obligations, today)
}

/// Classifies one customer against explicit thresholds.
///
/// `overdue_days` counts from the most recent obligation regardless of
/// its status: a customer whose last entry was settled months ago has a
/// large day count but usually a zero balance, and lands on Low.
pub fn classify_risk_with(
    thresholds: &RiskThresholds,
    customer: &Customer,
    obligations: &[CreditObligation],
    today: NaiveDate,
) -> CreditRisk {
    let total_credit: Money = obligations
        .iter()
        .filter(|o| o.is_outstanding())
        .map(|o| o.amount())
        .sum();

    let overdue_days = obligations
        .iter()
        .map(|o| o.created_at.date_naive())
        .max()
        .map(|last| (today - last).num_days().max(0))
        .unwrap_or(0);

    // Precedence matters: High is checked before Medium, first match wins
    let risk_level = if overdue_days > thresholds.high_overdue_days
        || total_credit > thresholds.high_balance
    {
        RiskLevel::High
    } else if overdue_days > thresholds.medium_overdue_days
        || total_credit > thresholds.medium_balance
    {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    let recommendation = advisory_for(risk_level).to_string();

    CreditRisk {
        customer_id: customer.id.clone(),
        customer_name: customer.name.clone(),
        total_credit,
        overdue_days,
        risk_level,
        recommendation,
    }
}

/// Classifies every customer with credit history, High risk first.
///
/// Customers with no obligations at all are left out — there is nothing
/// to assess.
pub fn classify_customers(
    customers: &[(Customer, Vec<CreditObligation>)],
    today: NaiveDate,
) -> Vec<CreditRisk> {
    let thresholds = RiskThresholds::default();
    let mut risks: Vec<CreditRisk> = customers
        .iter()
        .filter(|(_, obligations)| !obligations.is_empty())
        .map(|(customer, obligations)| {
            classify_risk_with(&thresholds, customer, obligations, today)
        })
        .collect();

    // Stable: equal tiers keep customer order from the input
    risks.sort_by_key(|r| std::cmp::Reverse(r.risk_level));
    risks
}

fn advisory_for(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::High => {
            "Contact immediately - consider suspending further credit until payment"
        }
        RiskLevel::Medium => "Follow up on payment within the week",
        RiskLevel::Low => "Within safe credit limits",
    }
}

// =============================================================================
// Batch Settlement
// =============================================================================

/// Marks every outstanding obligation as paid, in place.
///
/// Payment recording is not itemized per obligation: the customer hands
/// over what they owe and the whole slate is cleared in one batch.
/// Terminal obligations (paid, cancelled) are left untouched.
///
/// Returns how many obligations were settled.
pub fn settle_all_outstanding(obligations: &mut [CreditObligation]) -> usize {
    let mut settled = 0;
    for obligation in obligations.iter_mut() {
        if obligation.status.can_transition_to(ObligationStatus::Paid) {
            obligation.status = ObligationStatus::Paid;
            settled += 1;
        }
    }
    settled
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ObligationKind;
    use chrono::{TimeZone, Utc};

    fn customer(id: &str) -> Customer {
        Customer {
            id: id.to_string(),
            name: "Maria Santos".to_string(),
            phone: Some("09123456789".to_string()),
            address: Some("123 Barangay Street".to_string()),
            credit_limit_centavos: 50_000,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn obligation(
        amount_pesos: i64,
        status: ObligationStatus,
        created: NaiveDate,
    ) -> CreditObligation {
        CreditObligation {
            id: uuid::Uuid::new_v4().to_string(),
            customer_id: "c1".to_string(),
            sale_id: None,
            amount_centavos: amount_pesos * 100,
            kind: ObligationKind::Goods,
            status,
            due_date: None,
            notes: None,
            created_at: created.and_hms_opt(12, 0, 0).unwrap().and_utc(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 21).unwrap()
    }

    fn days_ago(n: i64) -> NaiveDate {
        today() - chrono::Duration::days(n)
    }

    #[test]
    fn test_overdue_days_dominate() {
        // 20 days since last activity, only ₱100 owed → still High
        let obligations = vec![obligation(100, ObligationStatus::Pending, days_ago(20))];
        let risk = classify_risk(&customer("c1"), &obligations, today());

        assert_eq!(risk.overdue_days, 20);
        assert_eq!(risk.total_credit, Money::from_pesos(100));
        assert_eq!(risk.risk_level, RiskLevel::High);
        assert!(risk.recommendation.contains("Contact immediately"));
    }

    #[test]
    fn test_balance_dominates() {
        // 1 day since activity but ₱600 owed → Medium
        let obligations = vec![obligation(600, ObligationStatus::Pending, days_ago(1))];
        let risk = classify_risk(&customer("c1"), &obligations, today());

        assert_eq!(risk.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_clean_customer_is_low() {
        let risk = classify_risk(&customer("c1"), &[], today());
        assert_eq!(risk.overdue_days, 0);
        assert_eq!(risk.total_credit, Money::zero());
        assert_eq!(risk.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_high_balance_is_high_regardless_of_days() {
        let obligations = vec![obligation(1500, ObligationStatus::Pending, days_ago(0))];
        let risk = classify_risk(&customer("c1"), &obligations, today());
        assert_eq!(risk.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_settled_obligations_do_not_count_towards_balance() {
        let obligations = vec![
            obligation(800, ObligationStatus::Paid, days_ago(3)),
            obligation(200, ObligationStatus::Cancelled, days_ago(3)),
            obligation(100, ObligationStatus::Pending, days_ago(3)),
        ];
        let risk = classify_risk(&customer("c1"), &obligations, today());

        assert_eq!(risk.total_credit, Money::from_pesos(100));
        assert_eq!(risk.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_overdue_status_counts_towards_balance() {
        let obligations = vec![
            obligation(400, ObligationStatus::Overdue, days_ago(2)),
            obligation(300, ObligationStatus::Pending, days_ago(2)),
        ];
        let risk = classify_risk(&customer("c1"), &obligations, today());

        assert_eq!(risk.total_credit, Money::from_pesos(700));
        assert_eq!(risk.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_custom_thresholds() {
        let strict = RiskThresholds {
            high_overdue_days: 3,
            high_balance: Money::from_pesos(200),
            medium_overdue_days: 1,
            medium_balance: Money::from_pesos(50),
        };
        let obligations = vec![obligation(100, ObligationStatus::Pending, days_ago(2))];
        let risk = classify_risk_with(&strict, &customer("c1"), &obligations, today());

        assert_eq!(risk.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_classify_customers_sorted_high_first() {
        let customers = vec![
            (customer("low"), vec![obligation(50, ObligationStatus::Pending, days_ago(1))]),
            (customer("high"), vec![obligation(2000, ObligationStatus::Pending, days_ago(1))]),
            (customer("none"), vec![]),
            (customer("medium"), vec![obligation(600, ObligationStatus::Pending, days_ago(1))]),
        ];

        let risks = classify_customers(&customers, today());
        assert_eq!(risks.len(), 3); // customer with no history is skipped
        assert_eq!(risks[0].customer_id, "high");
        assert_eq!(risks[1].customer_id, "medium");
        assert_eq!(risks[2].customer_id, "low");
    }

    #[test]
    fn test_settle_all_outstanding() {
        let mut obligations = vec![
            obligation(100, ObligationStatus::Pending, days_ago(3)),
            obligation(200, ObligationStatus::Overdue, days_ago(10)),
            obligation(300, ObligationStatus::Paid, days_ago(30)),
            obligation(400, ObligationStatus::Cancelled, days_ago(30)),
        ];

        let settled = settle_all_outstanding(&mut obligations);
        assert_eq!(settled, 2);
        assert_eq!(obligations[0].status, ObligationStatus::Paid);
        assert_eq!(obligations[1].status, ObligationStatus::Paid);
        // Terminal entries untouched
        assert_eq!(obligations[2].status, ObligationStatus::Paid);
        assert_eq!(obligations[3].status, ObligationStatus::Cancelled);
    }
}
