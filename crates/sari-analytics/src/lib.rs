//! # sari-analytics: Analytics Refresh Service
//!
//! The asynchronous boundary between the store and the pure analytics
//! engines in `sari-core`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    SariSense Analytics Pipeline                         │
//! │                                                                         │
//! │  sari-db (SQLite)                                                      │
//! │       │ fetch_sale_rows / fetch_products        [SalesFeed]            │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 sari-analytics (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   EventBus ──► AnalyticsEngine (actor) ──► watch channel        │   │
//! │  │   (checkout     │                           (snapshots)         │   │
//! │  │    events)      │ calls sari-core:                              │   │
//! │  │                 │   aggregate / merge_sale / recommend          │   │
//! │  └─────────────────┼───────────────────────────────────────────────┘   │
//! │                    ▼                                                    │
//! │  Dashboard subscribers (charts, advisories, KPI tiles)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Consistency Model
//!
//! All computation is a pure function of store state. The engine applies
//! commands strictly in arrival order, merges are equivalent to a full
//! recompute, and any failure or missed event is healed by the next full
//! refresh. Nothing here can lose an update or deadlock: there is exactly
//! one writer (the actor) and any number of read-only subscribers.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sari_analytics::{AnalyticsConfig, AnalyticsEngine, DbSalesFeed, EventBus, StoreEvent};
//! use std::sync::Arc;
//!
//! let feed = Arc::new(DbSalesFeed::new(db.clone()));
//! let (analytics, _task) = AnalyticsEngine::spawn(feed, AnalyticsConfig::default());
//!
//! // Checkout path publishes events; the engine keeps itself current
//! let bus = EventBus::default();
//! let _forwarder = analytics.attach_bus(&bus);
//!
//! // UI side: subscribe once, re-render on every change
//! let mut snapshots = analytics.subscribe();
//! while snapshots.changed().await.is_ok() {
//!     render(snapshots.borrow().clone());
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod engine;
pub mod error;
pub mod feed;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::AnalyticsConfig;
pub use engine::{AnalyticsEngine, AnalyticsHandle, AnalyticsSnapshot};
pub use error::{AnalyticsError, AnalyticsResult};
pub use feed::{DbSalesFeed, EventBus, SalesFeed, StoreEvent};
