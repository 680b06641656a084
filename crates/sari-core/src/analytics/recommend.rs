//! # Recommendation Engine
//!
//! Consumes aggregated summaries plus live stock levels and produces a
//! ranked, capped list of advisory messages for store staff.
//!
//! ## Rule Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Recommendation Engine                                │
//! │                                                                         │
//! │  ProductSummary ──► stock_recommendations()                             │
//! │  + live Product      ├── depletion projection   (High, ≤3 days left)   │
//! │    stock levels      └── critical stock alert   (High, at minimum)     │
//! │                                                                         │
//! │  DailySummary ────► sales_trend_recommendations()                       │
//! │                      ├── weekend uplift         (Medium, >1.15×)        │
//! │                      └── 3v3 trend windows      (Medium, ±10%)          │
//! │                                                                         │
//! │  CategorySummary ─► category_recommendations()                          │
//! │                      └── top category insight   (Low, ≥2 categories)    │
//! │                                                                         │
//! │  All rules ──► stable sort by priority desc ──► truncate to top 6       │
//! │                                                                         │
//! │  Pure function of its inputs. Never errors: zero history simply         │
//! │  yields zero or few recommendations.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::analytics::aggregate::{CategorySummary, DailySummary, ProductSummary};
use crate::money::Money;
use crate::types::Product;

// =============================================================================
// Constants
// =============================================================================

/// Maximum recommendations surfaced per refresh.
pub const MAX_RECOMMENDATIONS: usize = 6;

/// Emit a depletion warning when projected days-to-empty is at most this.
pub const DEPLETION_WARNING_DAYS: i64 = 3;

/// Relative change beyond which a trend counts as growing/declining.
pub const TREND_THRESHOLD: f64 = 0.10;

/// Weekend mean must exceed the all-days mean by this factor.
pub const WEEKEND_UPLIFT_FACTOR: f64 = 1.15;

/// Trend rules need at least a week of daily buckets.
const MIN_TREND_HISTORY_DAYS: usize = 7;

/// Points per trend comparison window (recent 3 days vs the 3 before).
const TREND_WINDOW: usize = 3;

// =============================================================================
// Output Types
// =============================================================================

/// Advisory priority. Ordering matters: High sorts before Medium before Low.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub enum Priority {
    Low = 1,
    Medium = 2,
    High = 3,
}

/// Icon variant resolved by the presentation layer.
///
/// The core stays free of rendering concerns; the frontend maps each tag
/// to whatever glyph set it ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum IconTag {
    Package,
    Users,
    TrendingUp,
    TrendingDown,
    Target,
    AlertTriangle,
}

/// Which rule produced a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    StockPrediction,
    StockAlert,
    SalesForecast,
    GrowthOpportunity,
    SalesAlert,
    CategoryInsight,
}

/// A generated, non-binding suggestion surfaced to store staff.
///
/// Ephemeral: regenerated on each analytics refresh, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub message: String,
    pub priority: Priority,
    pub icon: IconTag,
}

/// Direction of a daily-totals series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Trend {
    Growing,
    Stable,
    Declining,
}

// =============================================================================
// Entry Point
// =============================================================================

/// Generates all recommendations, ranked and capped.
///
/// Concatenates the stock, sales-trend, and category rules, stable-sorts
/// descending by priority (ties keep rule order), and truncates to
/// [`MAX_RECOMMENDATIONS`].
pub fn recommend(
    daily: &[DailySummary],
    by_product: &[ProductSummary],
    by_category: &[CategorySummary],
    products: &[Product],
) -> Vec<Recommendation> {
    let mut all = stock_recommendations(by_product, products);
    all.extend(sales_trend_recommendations(daily));
    all.extend(category_recommendations(by_category));

    // Vec::sort_by_key is stable: equal priorities keep insertion order
    all.sort_by_key(|r| std::cmp::Reverse(r.priority));
    all.truncate(MAX_RECOMMENDATIONS);
    all
}

// =============================================================================
// Stock Rules
// =============================================================================

/// Projects stock depletion per product and flags critical stock levels.
///
/// Only products with at least one day of sales history are considered;
/// the per-day quantities come from the (product, date) buckets. The two
/// checks are independent and may both fire for the same product.
pub fn stock_recommendations(
    by_product: &[ProductSummary],
    products: &[Product],
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    // Daily quantity history per product, in bucket order.
    // BTreeMap keeps product iteration deterministic.
    let mut history: BTreeMap<&str, Vec<i64>> = BTreeMap::new();
    for summary in by_product {
        history
            .entry(summary.product_id.as_str())
            .or_default()
            .push(summary.quantity_sold);
    }

    for (product_id, daily_sales) in &history {
        let product = match products.iter().find(|p| p.id == *product_id) {
            Some(p) => p,
            None => continue,
        };

        if let Some(days) = predict_stock_depletion(
            product.current_stock,
            daily_sales,
            product.minimum_stock,
        ) {
            if days > 0 && days <= DEPLETION_WARNING_DAYS {
                recommendations.push(Recommendation {
                    kind: RecommendationKind::StockPrediction,
                    message: format!(
                        "{} will run out in {} days based on current sales trend",
                        product.name, days
                    ),
                    priority: Priority::High,
                    icon: IconTag::Package,
                });
            }
        }

        if product.current_stock <= product.minimum_stock {
            recommendations.push(Recommendation {
                kind: RecommendationKind::StockAlert,
                message: format!(
                    "{} is at critical stock level - immediate restocking needed",
                    product.name
                ),
                priority: Priority::High,
                icon: IconTag::AlertTriangle,
            });
        }
    }

    recommendations
}

/// Projects how many days until stock falls to the minimum threshold.
///
/// Returns `Some(0)` when stock is already at or below the minimum,
/// `None` when there is no history or no sales velocity (nothing to
/// project from).
pub fn predict_stock_depletion(
    current_stock: i64,
    daily_sales: &[i64],
    minimum_stock: i64,
) -> Option<i64> {
    if daily_sales.is_empty() {
        return None;
    }
    if current_stock <= minimum_stock {
        return Some(0);
    }

    let total: i64 = daily_sales.iter().sum();
    let avg_daily = total as f64 / daily_sales.len() as f64;
    if avg_daily <= 0.0 {
        return None;
    }

    let stock_to_deplete = (current_stock - minimum_stock) as f64;
    Some((stock_to_deplete / avg_daily).ceil() as i64)
}

// =============================================================================
// Sales Trend Rules
// =============================================================================

/// Weekend-uplift forecast plus up/down trend alerts over daily totals.
///
/// Requires at least a week of daily buckets; with fewer the rule stays
/// silent rather than reading noise as signal.
pub fn sales_trend_recommendations(daily: &[DailySummary]) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if daily.len() < MIN_TREND_HISTORY_DAYS {
        return recommendations;
    }

    let daily_sales: Vec<f64> = daily
        .iter()
        .map(|d| d.total_sales.centavos() as f64)
        .collect();

    // Weekend uplift: weekend mean vs the mean over every day in the window
    let weekend_sales: Vec<f64> = daily
        .iter()
        .filter(|d| {
            let weekday = chrono::Datelike::weekday(&d.date);
            weekday == chrono::Weekday::Sat || weekday == chrono::Weekday::Sun
        })
        .map(|d| d.total_sales.centavos() as f64)
        .collect();

    if !weekend_sales.is_empty() {
        let avg_weekend = mean(&weekend_sales);
        let avg_all = mean(&daily_sales);

        if avg_all > 0.0 && avg_weekend > avg_all * WEEKEND_UPLIFT_FACTOR {
            let uplift_pct = ((avg_weekend / avg_all - 1.0) * 100.0).round() as i64;
            recommendations.push(Recommendation {
                kind: RecommendationKind::SalesForecast,
                message: format!(
                    "Weekend sales expected to increase by {uplift_pct}% - prepare extra inventory"
                ),
                priority: Priority::Medium,
                icon: IconTag::TrendingUp,
            });
        }
    }

    match detect_trend(&daily_sales) {
        Trend::Growing => recommendations.push(Recommendation {
            kind: RecommendationKind::GrowthOpportunity,
            message: "Sales are trending upward - consider expanding popular product lines"
                .to_string(),
            priority: Priority::Medium,
            icon: IconTag::TrendingUp,
        }),
        Trend::Declining => recommendations.push(Recommendation {
            kind: RecommendationKind::SalesAlert,
            message: "Sales are declining - review pricing and marketing strategies".to_string(),
            priority: Priority::Medium,
            icon: IconTag::TrendingDown,
        }),
        Trend::Stable => {}
    }

    recommendations
}

/// Classifies a chronological series by comparing the most recent
/// 3-point window against the 3 points before it.
///
/// Fewer than 6 points cannot fill both windows and yield `Stable`.
pub fn detect_trend(values: &[f64]) -> Trend {
    if values.len() < TREND_WINDOW * 2 {
        return Trend::Stable;
    }

    let recent = &values[values.len() - TREND_WINDOW..];
    let older = &values[values.len() - TREND_WINDOW * 2..values.len() - TREND_WINDOW];

    let recent_avg = mean(recent);
    let older_avg = mean(older);

    if older_avg == 0.0 {
        // No base to compare against; any recent activity reads as growth
        return if recent_avg > 0.0 {
            Trend::Growing
        } else {
            Trend::Stable
        };
    }

    let change = (recent_avg - older_avg) / older_avg;
    if change > TREND_THRESHOLD {
        Trend::Growing
    } else if change < -TREND_THRESHOLD {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

// =============================================================================
// Category Rules
// =============================================================================

/// Names the top-performing category when there is a real ranking to
/// report (at least two distinct categories).
pub fn category_recommendations(by_category: &[CategorySummary]) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    // Total sales per category across all dates
    let mut totals: BTreeMap<&str, (&str, Money)> = BTreeMap::new();
    for summary in by_category {
        let entry = totals
            .entry(summary.category_id.as_str())
            .or_insert((summary.category_name.as_str(), Money::zero()));
        entry.1 += summary.total_sales;
    }

    if totals.len() < 2 {
        return recommendations;
    }

    if let Some((_, (name, _))) = totals.iter().max_by_key(|(_, (_, total))| *total) {
        recommendations.push(Recommendation {
            kind: RecommendationKind::CategoryInsight,
            message: format!(
                "{name} is your top performing category - consider expanding this product line"
            ),
            priority: Priority::Low,
            icon: IconTag::Target,
        });
    }

    recommendations
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, d).unwrap()
    }

    fn daily(d: u32, sales_centavos: i64) -> DailySummary {
        DailySummary {
            date: date(d),
            total_sales: Money::from_centavos(sales_centavos),
            total_items: sales_centavos / 1000,
            total_transactions: 1,
        }
    }

    fn product_summary(product_id: &str, d: u32, qty: i64) -> ProductSummary {
        ProductSummary {
            product_id: product_id.to_string(),
            product_name: format!("Product {product_id}"),
            date: date(d),
            quantity_sold: qty,
            revenue: Money::from_centavos(qty * 2000),
        }
    }

    fn category_summary(category_id: &str, d: u32, sales: i64) -> CategorySummary {
        CategorySummary {
            category_id: category_id.to_string(),
            category_name: format!("Category {category_id}"),
            date: date(d),
            total_sales: Money::from_centavos(sales),
            total_items: 1,
        }
    }

    fn product(id: &str, stock: i64, min: i64) -> Product {
        use chrono::TimeZone;
        let ts = chrono::Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            barcode: None,
            unit_price_centavos: 2000,
            cost_price_centavos: 1500,
            current_stock: stock,
            minimum_stock: min,
            category_id: None,
            is_active: true,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn test_depletion_projection_boundary() {
        // stock 9, min 0, history [3, 3, 3] → exactly 3 days → must fire
        assert_eq!(predict_stock_depletion(9, &[3, 3, 3], 0), Some(3));

        let summaries = vec![
            product_summary("p1", 1, 3),
            product_summary("p1", 2, 3),
            product_summary("p1", 3, 3),
        ];
        let products = vec![product("p1", 9, 0)];

        let recs = stock_recommendations(&summaries, &products);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].kind, RecommendationKind::StockPrediction);
        assert_eq!(recs[0].priority, Priority::High);
        assert!(recs[0].message.contains("3 days"));
    }

    #[test]
    fn test_depletion_beyond_warning_window_silent() {
        // stock 40, min 0, avg 3/day → 14 days out, no warning
        let summaries = vec![product_summary("p1", 1, 3), product_summary("p1", 2, 3)];
        let products = vec![product("p1", 40, 0)];

        assert!(stock_recommendations(&summaries, &products).is_empty());
    }

    #[test]
    fn test_stock_alert_at_minimum_prediction_above() {
        // At minimum stock: depletion is immediate (days 0 → no prediction)
        // but the critical-stock alert fires
        let summaries = vec![product_summary("p1", 1, 3)];
        let products = vec![product("p1", 5, 5)];

        let recs = stock_recommendations(&summaries, &products);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].kind, RecommendationKind::StockAlert);

        // Slightly above minimum with fast sales: both checks can coexist
        let products = vec![product("p1", 6, 5)];
        let recs = stock_recommendations(&summaries, &products);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].kind, RecommendationKind::StockPrediction);
    }

    #[test]
    fn test_no_history_no_stock_recommendation() {
        let products = vec![product("p1", 0, 5)];
        assert!(stock_recommendations(&[], &products).is_empty());
    }

    #[test]
    fn test_unknown_product_skipped() {
        let summaries = vec![product_summary("ghost", 1, 3)];
        assert!(stock_recommendations(&summaries, &[]).is_empty());
    }

    #[test]
    fn test_detect_trend_needs_six_points() {
        assert_eq!(detect_trend(&[100.0, 200.0]), Trend::Stable);
        assert_eq!(detect_trend(&[100.0, 200.0, 300.0, 400.0, 500.0]), Trend::Stable);
    }

    #[test]
    fn test_detect_trend_growing_and_declining() {
        // older window mean 100, recent window mean 150 → +50%
        assert_eq!(
            detect_trend(&[100.0, 100.0, 100.0, 150.0, 150.0, 150.0]),
            Trend::Growing
        );
        // older 150, recent 100 → −33%
        assert_eq!(
            detect_trend(&[150.0, 150.0, 150.0, 100.0, 100.0, 100.0]),
            Trend::Declining
        );
        // ±10% is the boundary: +5% is stable
        assert_eq!(
            detect_trend(&[100.0, 100.0, 100.0, 105.0, 105.0, 105.0]),
            Trend::Stable
        );
    }

    #[test]
    fn test_weekend_uplift_fires_with_rounded_percent() {
        // 2025-07-01 is a Tuesday; 5th and 6th are Sat/Sun.
        // Weekdays ₱1,000/day, weekend ₱2,000/day:
        // all-days mean = (5×1000 + 2×2000) / 7 = ₱1,285.71
        // weekend/all = 1.5556 > 1.15 → fires, round(55.56) = 56%
        let summaries: Vec<DailySummary> = (1..=7)
            .map(|d| {
                let sales = if d == 5 || d == 6 { 200_000 } else { 100_000 };
                daily(d, sales)
            })
            .collect();

        let recs = sales_trend_recommendations(&summaries);
        let forecast = recs
            .iter()
            .find(|r| r.kind == RecommendationKind::SalesForecast)
            .expect("weekend forecast should fire");
        assert_eq!(forecast.priority, Priority::Medium);
        assert!(forecast.message.contains("56%"));
    }

    #[test]
    fn test_weekend_uplift_below_threshold_silent() {
        // Weekend barely above weekdays: 1100 vs 1000 → ratio ≈ 1.07 < 1.15
        let summaries: Vec<DailySummary> = (1..=7)
            .map(|d| {
                let sales = if d == 5 || d == 6 { 110_000 } else { 100_000 };
                daily(d, sales)
            })
            .collect();

        let recs = sales_trend_recommendations(&summaries);
        assert!(recs
            .iter()
            .all(|r| r.kind != RecommendationKind::SalesForecast));
    }

    #[test]
    fn test_trend_rules_gate_on_week_of_history() {
        let summaries: Vec<DailySummary> = (1..=6).map(|d| daily(d, 100_000)).collect();
        assert!(sales_trend_recommendations(&summaries).is_empty());
    }

    #[test]
    fn test_category_leader_needs_two_categories() {
        let single = vec![category_summary("bev", 1, 50_000)];
        assert!(category_recommendations(&single).is_empty());

        let two = vec![
            category_summary("bev", 1, 50_000),
            category_summary("bev", 2, 30_000),
            category_summary("noodles", 1, 90_000),
        ];
        let recs = category_recommendations(&two);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].priority, Priority::Low);
        assert!(recs[0].message.contains("Category noodles"));
    }

    #[test]
    fn test_recommend_caps_at_six_sorted_by_priority() {
        // Seven products all at critical stock → seven High alerts,
        // plus a Low category insight that must be squeezed out
        let summaries: Vec<ProductSummary> = (0..7)
            .map(|i| product_summary(&format!("p{i}"), 1, 2))
            .collect();
        let products: Vec<Product> = (0..7).map(|i| product(&format!("p{i}"), 0, 5)).collect();
        let categories = vec![
            category_summary("bev", 1, 50_000),
            category_summary("noodles", 1, 90_000),
        ];

        let recs = recommend(&[], &summaries, &categories, &products);
        assert_eq!(recs.len(), MAX_RECOMMENDATIONS);
        assert!(recs.iter().all(|r| r.priority == Priority::High));

        // Stable order among equal priorities: products in deterministic order
        assert!(recs[0].message.starts_with("Product p0"));
        assert!(recs[1].message.starts_with("Product p1"));
    }

    #[test]
    fn test_recommend_priority_ordering() {
        let product_summaries = vec![
            product_summary("p1", 1, 3),
            product_summary("p1", 2, 3),
            product_summary("p1", 3, 3),
        ];
        let products = vec![product("p1", 9, 0)]; // High stock prediction
        let categories = vec![
            category_summary("bev", 1, 50_000),
            category_summary("noodles", 1, 90_000),
        ]; // Low insight
        let dailies: Vec<DailySummary> = (1..=7)
            .map(|d| {
                let sales = if d == 5 || d == 6 { 200_000 } else { 100_000 };
                daily(d, sales)
            })
            .collect(); // Medium forecast

        let recs = recommend(&dailies, &product_summaries, &categories, &products);

        let priorities: Vec<Priority> = recs.iter().map(|r| r.priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort_by_key(|p| std::cmp::Reverse(*p));
        assert_eq!(priorities, sorted);
        assert_eq!(priorities.first(), Some(&Priority::High));
        assert_eq!(priorities.last(), Some(&Priority::Low));
    }

    #[test]
    fn test_recommend_empty_inputs() {
        let recs = recommend(&[], &[], &[], &[]);
        assert!(recs.is_empty());
    }
}
