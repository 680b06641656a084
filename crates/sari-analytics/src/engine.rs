//! # Analytics Engine
//!
//! The refresh actor behind the dashboard. Owns the latest analytics
//! snapshot, consumes new-sale notifications, and publishes every
//! change over a `watch` channel.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Analytics Engine                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Message Flow                                  │   │
//! │  │                                                                 │   │
//! │  │  checkout ──┐                                                   │   │
//! │  │             │ SaleRecorded(row)                                 │   │
//! │  │  UI ────────┼────────────────▶ ┌─────────────────┐              │   │
//! │  │   Refresh   │                  │                 │              │   │
//! │  │             │                  │  Engine (actor) │              │   │
//! │  │  bus ───────┘                  │                 │              │   │
//! │  │                                │  summaries      │              │   │
//! │  │                                │  seen sale ids  │              │   │
//! │  │                                │  live products  │              │   │
//! │  │                                └────────┬────────┘              │   │
//! │  │                                         │ watch::send           │   │
//! │  │                                         ▼                       │   │
//! │  │                            AnalyticsSnapshot (latest)           │   │
//! │  │                         subscribers see every publish           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  Serialization guarantee:                                              │
//! │  ─────────────────────────                                             │
//! │  • One command at a time, in arrival order - two near-simultaneous     │
//! │    new-sale notifications can never interleave or lose an update       │
//! │  • A full refresh rereads the store, so any missed event reconverges   │
//! │  • Duplicate notifications (same sale id) are dropped                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use ts_rs::TS;

use crate::config::AnalyticsConfig;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::feed::{EventBus, SalesFeed, StoreEvent};
use sari_core::analytics::{aggregate, merge_sale, recommend, AnalyticsSummaries, Recommendation,
    SaleRow};
use sari_core::Product;

// =============================================================================
// Snapshot
// =============================================================================

/// Everything the dashboard needs, in one immutable value.
///
/// Published on every change; subscribers clone it out of the watch
/// channel and never share mutable state with the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AnalyticsSnapshot {
    pub summaries: AnalyticsSummaries,
    pub recommendations: Vec<Recommendation>,
    /// When this snapshot was computed; `None` until the first refresh.
    #[ts(as = "Option<String>")]
    pub generated_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Commands
// =============================================================================

/// Commands for the engine actor.
enum EngineCommand {
    /// Refetch everything and rebuild the snapshot.
    Refresh {
        ack: Option<oneshot::Sender<AnalyticsResult<()>>>,
    },
    /// Merge one newly recorded sale into the snapshot.
    SaleRecorded(SaleRow),
    /// Stop the engine.
    Shutdown,
}

// =============================================================================
// Handle
// =============================================================================

/// Handle for talking to a running engine. Cheap to clone.
#[derive(Clone)]
pub struct AnalyticsHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    snapshot_rx: watch::Receiver<AnalyticsSnapshot>,
}

impl AnalyticsHandle {
    /// Requests a full refresh and waits for it to complete.
    pub async fn refresh(&self) -> AnalyticsResult<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.cmd_tx
            .send(EngineCommand::Refresh { ack: Some(ack_tx) })
            .await
            .map_err(|_| AnalyticsError::EngineStopped)?;
        ack_rx.await.map_err(|_| AnalyticsError::EngineStopped)?
    }

    /// Notifies the engine of a newly recorded sale.
    ///
    /// Fire-and-forget: the merge happens in the engine task, strictly
    /// after any previously queued command.
    pub async fn notify_sale(&self, row: SaleRow) -> AnalyticsResult<()> {
        self.cmd_tx
            .send(EngineCommand::SaleRecorded(row))
            .await
            .map_err(|_| AnalyticsError::EngineStopped)
    }

    /// Subscribes to snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<AnalyticsSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Returns the latest published snapshot.
    pub fn latest(&self) -> AnalyticsSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Asks the engine to stop after draining queued commands.
    pub async fn shutdown(&self) -> AnalyticsResult<()> {
        self.cmd_tx
            .send(EngineCommand::Shutdown)
            .await
            .map_err(|_| AnalyticsError::EngineStopped)
    }

    /// Forwards store events from a bus into this engine.
    ///
    /// A lagged subscription (more events than the bus buffers) falls
    /// back to a full refresh, which reconverges on store state.
    pub fn attach_bus(&self, bus: &EventBus) -> JoinHandle<()> {
        let mut events = bus.subscribe();
        let handle = self.clone();

        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(StoreEvent::SaleRecorded(row)) => {
                        if handle.notify_sale(row).await.is_err() {
                            break;
                        }
                    }
                    // Obligations don't move any sales bucket
                    Ok(StoreEvent::ObligationRecorded { .. }) => {}
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed = %missed, "Event bus lagged; running full refresh");
                        if handle.refresh().await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            debug!("Event forwarder stopped");
        })
    }
}

// =============================================================================
// Engine
// =============================================================================

/// The analytics refresh actor.
pub struct AnalyticsEngine {
    feed: Arc<dyn SalesFeed>,
    config: AnalyticsConfig,
    snapshot_tx: watch::Sender<AnalyticsSnapshot>,

    // Actor-private state: only the run loop touches these
    summaries: AnalyticsSummaries,
    products: Vec<Product>,
    seen_sales: HashSet<String>,
}

impl AnalyticsEngine {
    /// Spawns the engine task.
    ///
    /// Returns the handle plus the task's join handle.
    pub fn spawn(
        feed: Arc<dyn SalesFeed>,
        config: AnalyticsConfig,
    ) -> (AnalyticsHandle, JoinHandle<()>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(config.command_buffer);
        let (snapshot_tx, snapshot_rx) = watch::channel(AnalyticsSnapshot::default());

        let engine = AnalyticsEngine {
            feed,
            config,
            snapshot_tx,
            summaries: AnalyticsSummaries::default(),
            products: Vec::new(),
            seen_sales: HashSet::new(),
        };

        let join = tokio::spawn(engine.run(cmd_rx));

        (
            AnalyticsHandle {
                cmd_tx,
                snapshot_rx,
            },
            join,
        )
    }

    /// The actor loop: one command at a time, in arrival order.
    async fn run(mut self, mut cmd_rx: mpsc::Receiver<EngineCommand>) {
        info!("Analytics engine started");

        if self.config.refresh_on_start {
            if let Err(e) = self.full_refresh().await {
                error!(error = %e, "Initial refresh failed; starting with empty snapshot");
            }
        }

        while let Some(command) = cmd_rx.recv().await {
            match command {
                EngineCommand::Refresh { ack } => {
                    let result = self.full_refresh().await;
                    if let Err(e) = &result {
                        error!(error = %e, "Refresh failed; previous snapshot retained");
                    }
                    if let Some(ack) = ack {
                        let _ = ack.send(result);
                    }
                }
                EngineCommand::SaleRecorded(row) => {
                    if let Err(e) = self.apply_sale(row).await {
                        error!(error = %e, "Failed to merge sale; previous snapshot retained");
                    }
                }
                EngineCommand::Shutdown => break,
            }
        }

        info!("Analytics engine stopped");
    }

    /// Refetches rows and products and rebuilds everything.
    async fn full_refresh(&mut self) -> AnalyticsResult<()> {
        let rows = self.feed.fetch_sale_rows(self.config.fetch_limit).await?;
        let products = self.feed.fetch_products().await?;

        self.seen_sales = rows.iter().map(|r| r.id.clone()).collect();
        self.summaries = aggregate(&rows);
        self.products = products;
        self.publish();

        debug!(
            sales = self.seen_sales.len(),
            daily_buckets = self.summaries.daily.len(),
            "Full refresh complete"
        );
        Ok(())
    }

    /// Merges one new sale and refreshes the stock picture.
    ///
    /// Identical to a full recompute over the previous rows plus this
    /// one; duplicate notifications for an already-counted sale are
    /// dropped so an event replay cannot double-count.
    async fn apply_sale(&mut self, row: SaleRow) -> AnalyticsResult<()> {
        if !self.seen_sales.insert(row.id.clone()) {
            debug!(sale_id = %row.id, "Duplicate sale notification ignored");
            return Ok(());
        }

        merge_sale(&mut self.summaries, &row);

        // The sale moved stock; recommendations read live levels
        self.products = self.feed.fetch_products().await?;
        self.publish();

        debug!(sale_id = %row.id, "Merged sale into snapshot");
        Ok(())
    }

    /// Publishes the current state as a new snapshot.
    fn publish(&self) {
        let recommendations = recommend(
            &self.summaries.daily,
            &self.summaries.by_product,
            &self.summaries.by_category,
            &self.products,
        );

        self.snapshot_tx.send_replace(AnalyticsSnapshot {
            summaries: self.summaries.clone(),
            recommendations,
            generated_at: Some(Utc::now()),
        });
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sari_core::analytics::{LineItemRow, ProductRef};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// In-memory feed fixture. `fail` simulates a store outage.
    struct MemoryFeed {
        rows: Mutex<Vec<SaleRow>>,
        products: Mutex<Vec<Product>>,
        fail: AtomicBool,
    }

    impl MemoryFeed {
        fn new(rows: Vec<SaleRow>) -> Arc<Self> {
            Arc::new(MemoryFeed {
                rows: Mutex::new(rows),
                products: Mutex::new(Vec::new()),
                fail: AtomicBool::new(false),
            })
        }

        fn push_row(&self, row: SaleRow) {
            self.rows.lock().unwrap().push(row);
        }
    }

    #[async_trait::async_trait]
    impl SalesFeed for MemoryFeed {
        async fn fetch_sale_rows(&self, _limit: u32) -> AnalyticsResult<Vec<SaleRow>> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(AnalyticsError::Feed("store unavailable".to_string()));
            }
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn fetch_products(&self) -> AnalyticsResult<Vec<Product>> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(AnalyticsError::Feed("store unavailable".to_string()));
            }
            Ok(self.products.lock().unwrap().clone())
        }
    }

    fn sale_row(id: &str, day: u32, qty: i64) -> SaleRow {
        let ts = Utc.with_ymd_and_hms(2025, 7, day, 12, 0, 0).unwrap();
        SaleRow {
            id: id.to_string(),
            created_at: Some(ts),
            total_amount_centavos: qty * 2500,
            items: vec![LineItemRow {
                product_id: Some("p1".to_string()),
                quantity: qty,
                unit_price_centavos: 2500,
                line_total_centavos: qty * 2500,
                product: Some(ProductRef {
                    name: "Coca-Cola 350ml".to_string(),
                    category_id: Some("bev".to_string()),
                    category_name: Some("Beverages".to_string()),
                }),
            }],
        }
    }

    fn test_config() -> AnalyticsConfig {
        AnalyticsConfig::default().refresh_on_start(false)
    }

    #[tokio::test]
    async fn test_refresh_publishes_snapshot() {
        let feed = MemoryFeed::new(vec![sale_row("s1", 1, 2), sale_row("s2", 2, 3)]);
        let (handle, _join) = AnalyticsEngine::spawn(feed, test_config());

        assert!(handle.latest().generated_at.is_none());

        handle.refresh().await.unwrap();

        let snapshot = handle.latest();
        assert!(snapshot.generated_at.is_some());
        assert_eq!(snapshot.summaries.daily.len(), 2);
        assert_eq!(snapshot.summaries.by_product.len(), 2);
    }

    #[tokio::test]
    async fn test_notify_sale_matches_full_recompute() {
        let initial = vec![sale_row("s1", 1, 2)];
        let feed = MemoryFeed::new(initial.clone());
        let (handle, _join) = AnalyticsEngine::spawn(feed.clone(), test_config());
        handle.refresh().await.unwrap();

        let new_sale = sale_row("s2", 2, 5);
        let mut rx = handle.subscribe();
        rx.borrow_and_update();
        handle.notify_sale(new_sale.clone()).await.unwrap();
        rx.changed().await.unwrap();

        let merged = handle.latest().summaries;

        // Reconverge via full recompute and compare
        feed.push_row(new_sale);
        handle.refresh().await.unwrap();
        assert_eq!(merged, handle.latest().summaries);
    }

    #[tokio::test]
    async fn test_duplicate_notification_dropped() {
        let feed = MemoryFeed::new(vec![]);
        let (handle, _join) = AnalyticsEngine::spawn(feed, test_config());
        handle.refresh().await.unwrap();

        let row = sale_row("s1", 1, 2);
        let mut rx = handle.subscribe();
        rx.borrow_and_update();

        handle.notify_sale(row.clone()).await.unwrap();
        rx.changed().await.unwrap();

        // Replay of the same event, then a distinct sale
        handle.notify_sale(row.clone()).await.unwrap();
        handle.notify_sale(sale_row("s2", 1, 3)).await.unwrap();
        rx.changed().await.unwrap();

        let daily = &handle.latest().summaries.daily;
        assert_eq!(daily.len(), 1);
        // 2 + 3 items; a double-counted s1 would show 7
        assert_eq!(daily[0].total_items, 5);
        assert_eq!(daily[0].total_transactions, 2);
    }

    #[tokio::test]
    async fn test_feed_failure_retains_previous_snapshot() {
        let feed = MemoryFeed::new(vec![sale_row("s1", 1, 2)]);
        let (handle, _join) = AnalyticsEngine::spawn(feed.clone(), test_config());
        handle.refresh().await.unwrap();
        let before = handle.latest();

        feed.fail.store(true, Ordering::SeqCst);
        assert!(handle.refresh().await.is_err());

        let after = handle.latest();
        assert_eq!(after.generated_at, before.generated_at);
        assert_eq!(after.summaries, before.summaries);
    }

    #[tokio::test]
    async fn test_notifications_apply_in_order() {
        let feed = MemoryFeed::new(vec![]);
        let (handle, _join) = AnalyticsEngine::spawn(feed.clone(), test_config());
        handle.refresh().await.unwrap();

        let rows: Vec<SaleRow> = (1..=5).map(|i| sale_row(&format!("s{i}"), i as u32, i)).collect();
        for row in &rows {
            handle.notify_sale(row.clone()).await.unwrap();
        }

        // A queued refresh runs after every queued notification
        for row in rows {
            feed.push_row(row);
        }
        handle.refresh().await.unwrap();

        let summaries = handle.latest().summaries;
        assert_eq!(summaries.daily.len(), 5);
        let expected: i64 = (1..=5).sum();
        let total: i64 = summaries.daily.iter().map(|d| d.total_items).sum();
        assert_eq!(total, expected);
    }

    #[tokio::test]
    async fn test_attach_bus_forwards_sales() {
        let feed = MemoryFeed::new(vec![]);
        let (handle, _join) = AnalyticsEngine::spawn(feed, test_config());
        handle.refresh().await.unwrap();

        let bus = EventBus::new(8);
        let _forwarder = handle.attach_bus(&bus);

        let mut rx = handle.subscribe();
        rx.borrow_and_update();

        bus.publish(StoreEvent::SaleRecorded(sale_row("s1", 3, 4)));
        // Obligation events are ignored by the engine
        bus.publish(StoreEvent::ObligationRecorded {
            customer_id: "c1".to_string(),
            amount_centavos: 100,
        });

        rx.changed().await.unwrap();
        let snapshot = handle.latest();
        assert_eq!(snapshot.summaries.daily.len(), 1);
        assert_eq!(snapshot.summaries.daily[0].total_items, 4);
    }

    #[tokio::test]
    async fn test_shutdown_stops_engine() {
        let feed = MemoryFeed::new(vec![]);
        let (handle, join) = AnalyticsEngine::spawn(feed, test_config());

        handle.shutdown().await.unwrap();
        join.await.unwrap();

        assert!(matches!(
            handle.refresh().await,
            Err(AnalyticsError::EngineStopped)
        ));
    }
}
