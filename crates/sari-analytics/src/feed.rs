//! # Store Feed & Event Bus
//!
//! The two ways data reaches the analytics engine:
//!
//! - [`SalesFeed`] - the pull side: fetch recent sale rows and live
//!   product stock from the store. `sari-db` provides the real
//!   implementation; tests inject an in-memory one.
//! - [`EventBus`] - the push side: checkout publishes a [`StoreEvent`]
//!   and every interested consumer (analytics engine, utang view)
//!   receives its own copy over a broadcast channel.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cross-Component Handoff                            │
//! │                                                                         │
//! │  checkout ──publish──► EventBus (broadcast)                            │
//! │                           ├──► analytics engine (merges the sale)      │
//! │                           └──► utang view (new obligation banner)      │
//! │                                                                         │
//! │  No shared mutable queue anywhere: each consumer owns a receiver        │
//! │  and events arrive in publish order.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::{AnalyticsError, AnalyticsResult};
use sari_core::analytics::SaleRow;
use sari_core::Product;
use sari_db::Database;

// =============================================================================
// Store Events
// =============================================================================

/// A change notification from the store write path.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// A sale was committed at checkout.
    SaleRecorded(SaleRow),
    /// An utang entry was recorded for a customer.
    ObligationRecorded {
        customer_id: String,
        amount_centavos: i64,
    },
}

// =============================================================================
// Event Bus
// =============================================================================

/// Broadcast fan-out for store events.
///
/// Cheap to clone; all clones publish into the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    /// Creates a bus holding up to `capacity` undelivered events per
    /// subscriber before the slowest subscriber starts lagging.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        EventBus { tx }
    }

    /// Publishes an event to all current subscribers.
    ///
    /// Returns the number of subscribers that received it. Zero
    /// subscribers is not an error; events are best-effort signals and
    /// a full refresh always reconverges.
    pub fn publish(&self, event: StoreEvent) -> usize {
        match self.tx.send(event) {
            Ok(received_by) => received_by,
            Err(_) => {
                debug!("Store event published with no subscribers");
                0
            }
        }
    }

    /// Creates a new subscription receiving every event published
    /// after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        EventBus::new(64)
    }
}

// =============================================================================
// Sales Feed Port
// =============================================================================

/// Read access to the store, as the analytics engine sees it.
///
/// Injected into the engine so tests run against an in-memory fixture
/// and production runs against SQLite.
#[async_trait]
pub trait SalesFeed: Send + Sync + 'static {
    /// Fetches the most recent sales as joined analytics rows,
    /// chronologically ordered.
    async fn fetch_sale_rows(&self, limit: u32) -> AnalyticsResult<Vec<SaleRow>>;

    /// Fetches live products (current stock, minimum stock, names).
    async fn fetch_products(&self) -> AnalyticsResult<Vec<Product>>;
}

/// The production feed: SQLite through sari-db.
#[derive(Debug, Clone)]
pub struct DbSalesFeed {
    db: Database,
}

impl DbSalesFeed {
    /// Wraps a database handle as a sales feed.
    pub fn new(db: Database) -> Self {
        DbSalesFeed { db }
    }
}

#[async_trait]
impl SalesFeed for DbSalesFeed {
    async fn fetch_sale_rows(&self, limit: u32) -> AnalyticsResult<Vec<SaleRow>> {
        self.db
            .sales()
            .fetch_sale_rows(limit)
            .await
            .map_err(AnalyticsError::from)
    }

    async fn fetch_products(&self) -> AnalyticsResult<Vec<Product>> {
        self.db
            .products()
            .list_active(10_000)
            .await
            .map_err(AnalyticsError::from)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bus_delivers_to_all_subscribers() {
        let bus = EventBus::new(8);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        let delivered = bus.publish(StoreEvent::ObligationRecorded {
            customer_id: "c1".to_string(),
            amount_centavos: 45_000,
        });
        assert_eq!(delivered, 2);

        for rx in [&mut first, &mut second] {
            match rx.recv().await.unwrap() {
                StoreEvent::ObligationRecorded { customer_id, amount_centavos } => {
                    assert_eq!(customer_id, "c1");
                    assert_eq!(amount_centavos, 45_000);
                }
                other => panic!("unexpected event: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_fine() {
        let bus = EventBus::new(8);
        let delivered = bus.publish(StoreEvent::ObligationRecorded {
            customer_id: "c1".to_string(),
            amount_centavos: 100,
        });
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn test_events_arrive_in_publish_order() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        for amount in [100, 200, 300] {
            bus.publish(StoreEvent::ObligationRecorded {
                customer_id: "c1".to_string(),
                amount_centavos: amount,
            });
        }

        let mut seen = Vec::new();
        for _ in 0..3 {
            if let StoreEvent::ObligationRecorded { amount_centavos, .. } = rx.recv().await.unwrap()
            {
                seen.push(amount_centavos);
            }
        }
        assert_eq!(seen, vec![100, 200, 300]);
    }
}
