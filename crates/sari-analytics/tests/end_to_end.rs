//! End-to-end pipeline test: SQLite store → sales feed → analytics
//! engine → published snapshot.
//!
//! Uses an in-memory database, real repositories, and the real engine
//! actor; the only thing faked is the clock, which arrives as explicit
//! timestamps.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use sari_analytics::{
    AnalyticsConfig, AnalyticsEngine, DbSalesFeed, EventBus, StoreEvent,
};
use sari_core::analytics::{Priority, RecommendationKind};
use sari_core::cart::{Cart, CheckoutKind};
use sari_core::Money;
use sari_db::{Database, NewCustomer, NewProduct};

fn ts(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, day, hour, 0, 0).unwrap()
}

async fn seed_store(db: &Database) -> (sari_core::Product, sari_core::Customer) {
    let category = db.categories().get_or_create("Beverages").await.unwrap();
    let product = db
        .products()
        .create(
            NewProduct {
                name: "Coca-Cola 350ml".to_string(),
                barcode: None,
                unit_price_centavos: Money::from_pesos(25).centavos(),
                cost_price_centavos: Money::from_pesos(20).centavos(),
                current_stock: 9,
                minimum_stock: 0,
                category_id: Some(category.id),
            },
            ts(1, 8),
        )
        .await
        .unwrap();

    let customer = db
        .customers()
        .create(
            NewCustomer {
                name: "Maria Santos".to_string(),
                phone: Some("09123456789".to_string()),
                address: Some("Brgy. San Jose".to_string()),
                credit_limit_centavos: Money::from_pesos(500).centavos(),
            },
            ts(1, 8),
        )
        .await
        .unwrap();

    (product, customer)
}

#[tokio::test]
async fn checkout_to_snapshot_via_event_bus() {
    let db = Database::in_memory().await.unwrap();
    let (product, _) = seed_store(&db).await;

    // Three days of history: 3 bottles a day out of a stock of 9
    for day in 1..=3 {
        let now = ts(day, 12);
        let mut cart = Cart::new(now);
        cart.add_item(&product, 3, now).unwrap();
        db.sales()
            .record_checkout(&cart, &CheckoutKind::Cash, None, now)
            .await
            .unwrap();
    }

    let feed = Arc::new(DbSalesFeed::new(db.clone()));
    let (analytics, _task) = AnalyticsEngine::spawn(
        feed,
        AnalyticsConfig::default().refresh_on_start(false),
    );
    analytics.refresh().await.unwrap();

    let snapshot = analytics.latest();
    assert_eq!(snapshot.summaries.daily.len(), 3);
    assert_eq!(snapshot.summaries.by_product.len(), 3);

    // Stock is at zero after 9 sold: the stock alert must be on the board
    assert!(snapshot
        .recommendations
        .iter()
        .any(|r| r.kind == RecommendationKind::StockAlert && r.priority == Priority::High));

    // A new checkout flows through the bus without an explicit refresh
    let bus = EventBus::default();
    let _forwarder = analytics.attach_bus(&bus);
    let mut snapshots = analytics.subscribe();
    snapshots.borrow_and_update();

    let now = ts(4, 10);
    let restocked = db.products().restock(&product.id, 20, now).await.unwrap();
    assert_eq!(restocked.current_stock, 20);

    let mut cart = Cart::new(now);
    cart.add_item(&product, 2, now).unwrap();
    let outcome = db
        .sales()
        .record_checkout(&cart, &CheckoutKind::Cash, None, now)
        .await
        .unwrap();

    let lookup = |id: &str| {
        if id == product.id {
            Some(sari_core::analytics::ProductRef {
                name: product.name.clone(),
                category_id: product.category_id.clone(),
                category_name: Some("Beverages".to_string()),
            })
        } else {
            None
        }
    };
    let row = outcome.as_sale_row(&lookup).expect("sale was recorded");
    bus.publish(StoreEvent::SaleRecorded(row));

    snapshots.changed().await.unwrap();
    let updated = analytics.latest();
    assert_eq!(updated.summaries.daily.len(), 4);

    // Merged snapshot must agree with a full recompute from the store
    analytics.refresh().await.unwrap();
    assert_eq!(updated.summaries, analytics.latest().summaries);
}

#[tokio::test]
async fn utang_checkout_reaches_credit_dashboard() {
    let db = Database::in_memory().await.unwrap();
    let (product, customer) = seed_store(&db).await;

    let bus = EventBus::default();
    let mut credit_view = bus.subscribe();

    let now = ts(2, 15);
    let mut cart = Cart::new(now);
    cart.add_item(&product, 4, now).unwrap();
    let outcome = db
        .sales()
        .record_checkout(
            &cart,
            &CheckoutKind::Utang {
                customer_id: customer.id.clone(),
                due_date: Some(ts(9, 0).date_naive()),
            },
            Some("will pay next week".to_string()),
            now,
        )
        .await
        .unwrap();

    let obligation = outcome.obligation.as_ref().expect("utang recorded");
    bus.publish(StoreEvent::ObligationRecorded {
        customer_id: obligation.customer_id.clone(),
        amount_centavos: obligation.amount_centavos,
    });

    // The utang view gets the handoff through the bus, not a global queue
    match credit_view.recv().await.unwrap() {
        StoreEvent::ObligationRecorded { customer_id, amount_centavos } => {
            assert_eq!(customer_id, customer.id);
            assert_eq!(amount_centavos, Money::from_pesos(100).centavos());
        }
        other => panic!("unexpected event: {other:?}"),
    }

    // And the risk classifier sees the balance through the ledger
    let history = db.credit().customers_with_history().await.unwrap();
    let risks = sari_core::analytics::classify_customers(&history, ts(3, 0).date_naive());
    assert_eq!(risks.len(), 1);
    assert_eq!(risks[0].customer_id, customer.id);
    assert_eq!(risks[0].total_credit, Money::from_pesos(100));
}
