//! # Analytics Engines
//!
//! The three pure computation stages behind the dashboard:
//!
//! - [`aggregate`] - raw sale rows → daily / product / category buckets
//! - [`recommend`] - buckets + live stock → ranked advisory messages
//! - [`credit`] - customers + obligations → risk tiers
//!
//! ```text
//! store rows ──► aggregate ──► summaries ──► recommend ──► advisories
//!                                  │
//! customers + obligations ─────────┴──────► credit ─────► risk tiers
//! ```
//!
//! Everything here is synchronous and side-effect-free; the async fetch
//! and refresh choreography lives in the `sari-analytics` crate.

pub mod aggregate;
pub mod credit;
pub mod recommend;

pub use aggregate::{
    aggregate, aggregate_by_category, aggregate_by_product, aggregate_daily, merge_sale,
    AnalyticsSummaries, CategorySummary, DailySummary, LineItemRow, ProductRef, ProductSummary,
    SaleRow,
};
pub use credit::{
    classify_customers, classify_risk, classify_risk_with, settle_all_outstanding, CreditRisk,
    RiskLevel, RiskThresholds,
};
pub use recommend::{
    category_recommendations, detect_trend, predict_stock_depletion, recommend,
    sales_trend_recommendations, stock_recommendations, IconTag, Priority, Recommendation,
    RecommendationKind, Trend, MAX_RECOMMENDATIONS,
};
