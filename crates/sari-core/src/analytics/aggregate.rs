//! # Aggregation Engine
//!
//! Converts raw flat sale rows into time-bucketed summaries: daily sales,
//! per-product sales, and per-category sales.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Aggregation Engine                                 │
//! │                                                                         │
//! │  SaleRow { id, created_at, total_amount, items: [LineItemRow] }        │
//! │       │                                                                 │
//! │       ├──► aggregate_daily()       group by UTC calendar date          │
//! │       │         └── DailySummary { date, sales, items, transactions }  │
//! │       │                                                                 │
//! │       ├──► aggregate_by_product()  flatten items, group by             │
//! │       │         │                  (date, product_id)                  │
//! │       │         └── ProductSummary { product, date, qty, revenue }     │
//! │       │                                                                 │
//! │       └──► aggregate_by_category() flatten items, group by             │
//! │                 │                  (date, category_id)                 │
//! │                 └── CategorySummary { category, date, sales, items }   │
//! │                                                                         │
//! │  All three passes are independent pure functions of the input.         │
//! │  Calling twice with the same rows yields identical output.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Defensive Skips (best-effort policy, intentional)
//! - Rows without a timestamp are skipped
//! - Rows repeating an already-seen sale id are skipped (a refetch that
//!   overlaps a previous page cannot double-count)
//! - Line items with negative quantity are skipped
//! - The product pass skips items whose product reference is unresolved
//! - The category pass skips items whose product has no category
//!
//! ## Timezone Policy
//! Bucket keys are the **UTC** calendar date of `created_at`. The store
//! backend records UTC timestamps; using the same fixed zone here keeps
//! bucket keys identical across deployments.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Input Rows
// =============================================================================

/// Product fields joined onto a line item by the store query.
///
/// The store can return partially-null joins (a product deleted after the
/// sale, a product with no category); the engine tolerates all of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRef {
    pub name: String,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
}

/// A raw sale line item as fetched from the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemRow {
    /// May be null when the product lookup failed upstream.
    pub product_id: Option<String>,
    pub quantity: i64,
    pub unit_price_centavos: i64,
    pub line_total_centavos: i64,
    /// Joined product fields; null when the join found nothing.
    pub product: Option<ProductRef>,
}

/// A raw sale row with nested line items as fetched from the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleRow {
    pub id: String,
    /// May be null for malformed rows; such rows are skipped.
    pub created_at: Option<DateTime<Utc>>,
    pub total_amount_centavos: i64,
    pub items: Vec<LineItemRow>,
}

// =============================================================================
// Summary Buckets
// =============================================================================

/// One calendar day of sales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailySummary {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub total_sales: Money,
    pub total_items: i64,
    pub total_transactions: i64,
}

/// One (product, day) bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductSummary {
    pub product_id: String,
    /// Name snapshot from the first line item seen for this bucket.
    pub product_name: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub quantity_sold: i64,
    pub revenue: Money,
}

/// One (category, day) bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategorySummary {
    pub category_id: String,
    /// "Unknown" when the category join returned no name.
    pub category_name: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub total_sales: Money,
    pub total_items: i64,
}

/// The three summary collections one aggregation pass produces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AnalyticsSummaries {
    pub daily: Vec<DailySummary>,
    pub by_product: Vec<ProductSummary>,
    pub by_category: Vec<CategorySummary>,
}

// =============================================================================
// Aggregation Passes
// =============================================================================

/// Runs all three aggregation passes over one row set.
pub fn aggregate(rows: &[SaleRow]) -> AnalyticsSummaries {
    AnalyticsSummaries {
        daily: aggregate_daily(rows),
        by_product: aggregate_by_product(rows),
        by_category: aggregate_by_category(rows),
    }
}

/// Groups sale rows by UTC calendar date.
///
/// Output is sorted ascending by date, one entry per date — exactly the
/// shape the trend detector consumes.
pub fn aggregate_daily(rows: &[SaleRow]) -> Vec<DailySummary> {
    let mut buckets: BTreeMap<NaiveDate, DailySummary> = BTreeMap::new();

    for (row, date) in valid_rows(rows) {
        let items: i64 = row
            .items
            .iter()
            .filter(|i| i.quantity >= 0)
            .map(|i| i.quantity)
            .sum();

        let bucket = buckets.entry(date).or_insert_with(|| DailySummary {
            date,
            total_sales: Money::zero(),
            total_items: 0,
            total_transactions: 0,
        });
        bucket.total_sales += Money::from_centavos(row.total_amount_centavos);
        bucket.total_items += items;
        bucket.total_transactions += 1;
    }

    buckets.into_values().collect()
}

/// Flattens line items and groups them by (date, product).
///
/// Items whose owning product cannot be resolved are skipped.
/// Output is sorted ascending by (date, product_id).
pub fn aggregate_by_product(rows: &[SaleRow]) -> Vec<ProductSummary> {
    let mut buckets: BTreeMap<(NaiveDate, String), ProductSummary> = BTreeMap::new();

    for (row, date) in valid_rows(rows) {
        for item in &row.items {
            if item.quantity < 0 {
                continue;
            }
            let (product_id, product) = match (&item.product_id, &item.product) {
                (Some(id), Some(p)) => (id.clone(), p),
                _ => continue,
            };

            match buckets.entry((date, product_id)) {
                Entry::Occupied(mut e) => {
                    let bucket = e.get_mut();
                    bucket.quantity_sold += item.quantity;
                    bucket.revenue += Money::from_centavos(item.line_total_centavos);
                }
                Entry::Vacant(e) => {
                    let product_id = e.key().1.clone();
                    e.insert(ProductSummary {
                        product_id,
                        product_name: product.name.clone(),
                        date,
                        quantity_sold: item.quantity,
                        revenue: Money::from_centavos(item.line_total_centavos),
                    });
                }
            }
        }
    }

    buckets.into_values().collect()
}

/// Flattens line items and groups them by (date, category).
///
/// Items whose product has no category are skipped. Output is sorted
/// ascending by (date, category_id).
pub fn aggregate_by_category(rows: &[SaleRow]) -> Vec<CategorySummary> {
    let mut buckets: BTreeMap<(NaiveDate, String), CategorySummary> = BTreeMap::new();

    for (row, date) in valid_rows(rows) {
        for item in &row.items {
            if item.quantity < 0 {
                continue;
            }
            let product = match &item.product {
                Some(p) => p,
                None => continue,
            };
            let category_id = match &product.category_id {
                Some(id) => id.clone(),
                None => continue,
            };
            let category_name = product
                .category_name
                .clone()
                .unwrap_or_else(|| "Unknown".to_string());

            match buckets.entry((date, category_id)) {
                Entry::Occupied(mut e) => {
                    let bucket = e.get_mut();
                    bucket.total_sales += Money::from_centavos(item.line_total_centavos);
                    bucket.total_items += item.quantity;
                }
                Entry::Vacant(e) => {
                    let category_id = e.key().1.clone();
                    e.insert(CategorySummary {
                        category_id,
                        category_name,
                        date,
                        total_sales: Money::from_centavos(item.line_total_centavos),
                        total_items: item.quantity,
                    });
                }
            }
        }
    }

    buckets.into_values().collect()
}

/// Filters rows down to the ones the passes agree to count: a timestamp
/// present and a sale id not seen earlier in the slice.
fn valid_rows(rows: &[SaleRow]) -> impl Iterator<Item = (&SaleRow, NaiveDate)> + '_ {
    let mut seen: HashSet<&str> = HashSet::with_capacity(rows.len());
    rows.iter().filter_map(move |row| {
        let created_at = row.created_at?;
        if !seen.insert(row.id.as_str()) {
            return None;
        }
        Some((row, created_at.date_naive()))
    })
}

// =============================================================================
// Incremental Merge
// =============================================================================

/// Applies one newly recorded sale to existing summaries in place.
///
/// Used by the refresh service when a new-sale notification arrives, so
/// the dashboard updates without refetching the whole window.
///
/// ## Precondition
/// The sale must not already be part of `summaries` — the caller tracks
/// notified sale ids. Given that, the result is identical to a full
/// recompute over the original rows plus this one (tested property).
pub fn merge_sale(summaries: &mut AnalyticsSummaries, row: &SaleRow) {
    let date = match row.created_at {
        Some(ts) => ts.date_naive(),
        None => return,
    };

    // Daily bucket
    let items: i64 = row
        .items
        .iter()
        .filter(|i| i.quantity >= 0)
        .map(|i| i.quantity)
        .sum();

    let idx = summaries.daily.partition_point(|d| d.date < date);
    if summaries.daily.get(idx).map(|d| d.date) == Some(date) {
        let bucket = &mut summaries.daily[idx];
        bucket.total_sales += Money::from_centavos(row.total_amount_centavos);
        bucket.total_items += items;
        bucket.total_transactions += 1;
    } else {
        summaries.daily.insert(
            idx,
            DailySummary {
                date,
                total_sales: Money::from_centavos(row.total_amount_centavos),
                total_items: items,
                total_transactions: 1,
            },
        );
    }

    // Product and category buckets
    for item in &row.items {
        if item.quantity < 0 {
            continue;
        }

        if let (Some(product_id), Some(product)) = (&item.product_id, &item.product) {
            let key = (date, product_id.as_str());
            let idx = summaries
                .by_product
                .partition_point(|p| (p.date, p.product_id.as_str()) < key);
            let found = summaries
                .by_product
                .get(idx)
                .map(|p| (p.date, p.product_id.as_str()) == key)
                .unwrap_or(false);
            if found {
                let bucket = &mut summaries.by_product[idx];
                bucket.quantity_sold += item.quantity;
                bucket.revenue += Money::from_centavos(item.line_total_centavos);
            } else {
                summaries.by_product.insert(
                    idx,
                    ProductSummary {
                        product_id: product_id.clone(),
                        product_name: product.name.clone(),
                        date,
                        quantity_sold: item.quantity,
                        revenue: Money::from_centavos(item.line_total_centavos),
                    },
                );
            }
        }

        if let Some(product) = &item.product {
            if let Some(category_id) = &product.category_id {
                let key = (date, category_id.as_str());
                let idx = summaries
                    .by_category
                    .partition_point(|c| (c.date, c.category_id.as_str()) < key);
                let found = summaries
                    .by_category
                    .get(idx)
                    .map(|c| (c.date, c.category_id.as_str()) == key)
                    .unwrap_or(false);
                if found {
                    let bucket = &mut summaries.by_category[idx];
                    bucket.total_sales += Money::from_centavos(item.line_total_centavos);
                    bucket.total_items += item.quantity;
                } else {
                    summaries.by_category.insert(
                        idx,
                        CategorySummary {
                            category_id: category_id.clone(),
                            category_name: product
                                .category_name
                                .clone()
                                .unwrap_or_else(|| "Unknown".to_string()),
                            date,
                            total_sales: Money::from_centavos(item.line_total_centavos),
                            total_items: item.quantity,
                        },
                    );
                }
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
