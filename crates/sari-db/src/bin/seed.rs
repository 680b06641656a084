//! # Seed Data Generator
//!
//! Populates the database with demo data for development: the product
//! catalog of a typical sari-sari store, a few suki customers, and a
//! spread of historical sales so the dashboard has something to chew on.
//!
//! ## Usage
//! ```bash
//! # Seed the default database file
//! cargo run -p sari-db --bin seed
//!
//! # Specify database path and days of sales history
//! cargo run -p sari-db --bin seed -- --db ./data/sarisense.db --days 14
//! ```

use chrono::{Duration, Utc};
use std::env;

use sari_core::cart::{Cart, CheckoutKind};
use sari_core::Money;
use sari_db::{Database, DbConfig, NewCustomer, NewProduct};

/// Catalog of a typical sari-sari store: (name, category, unit ₱, cost ₱,
/// stock, minimum stock).
const CATALOG: &[(&str, &str, i64, i64, i64, i64)] = &[
    ("Coca-Cola 350ml", "Beverages", 25, 20, 50, 10),
    ("Sprite 350ml", "Beverages", 25, 20, 45, 10),
    ("Royal 350ml", "Beverages", 22, 18, 30, 8),
    ("Mineral Water 500ml", "Beverages", 15, 12, 80, 20),
    ("Chicharon ni Mang Juan", "Snacks", 12, 9, 25, 5),
    ("Nova Multigrain", "Snacks", 8, 6, 40, 10),
    ("Piattos Cheese", "Snacks", 35, 28, 20, 5),
    ("Lucky Me Pancit Canton", "Instant Noodles", 18, 15, 60, 15),
    ("Nissin Cup Noodles", "Instant Noodles", 22, 18, 35, 8),
    ("Safeguard Soap 90g", "Personal Care", 28, 22, 15, 5),
    ("Colgate Toothpaste 25g", "Personal Care", 15, 12, 25, 8),
    ("Tide Powder 35g", "Household", 8, 6, 50, 15),
    ("Joy Dishwashing Liquid 250ml", "Household", 45, 35, 12, 3),
];

/// Suki customers: (name, phone, address, credit limit ₱).
const CUSTOMERS: &[(&str, &str, &str, i64)] = &[
    ("Maria Santos", "09123456789", "Brgy. San Jose", 500),
    ("Juan Dela Cruz", "09234567890", "Brgy. Poblacion", 1000),
    ("Ana Reyes", "09345678901", "Brgy. Riverside", 750),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let db_path = arg_value(&args, "--db").unwrap_or_else(|| "./sarisense.db".to_string());
    let history_days: i64 = arg_value(&args, "--days")
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);

    tracing::info!(db = %db_path, days = %history_days, "Seeding SariSense demo data");

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let now = Utc::now();

    // Categories and products
    let mut products = Vec::new();
    for (name, category_name, unit, cost, stock, min_stock) in CATALOG {
        let category = db.categories().get_or_create(category_name).await?;
        let product = db
            .products()
            .create(
                NewProduct {
                    name: name.to_string(),
                    barcode: None,
                    unit_price_centavos: Money::from_pesos(*unit).centavos(),
                    cost_price_centavos: Money::from_pesos(*cost).centavos(),
                    current_stock: *stock,
                    minimum_stock: *min_stock,
                    category_id: Some(category.id),
                },
                now,
            )
            .await?;
        products.push(product);
    }
    tracing::info!(count = products.len(), "Products seeded");

    // Customers
    let mut customers = Vec::new();
    for (name, phone, address, limit) in CUSTOMERS {
        let customer = db
            .customers()
            .create(
                NewCustomer {
                    name: name.to_string(),
                    phone: Some(phone.to_string()),
                    address: Some(address.to_string()),
                    credit_limit_centavos: Money::from_pesos(*limit).centavos(),
                },
                now,
            )
            .await?;
        customers.push(customer);
    }
    tracing::info!(count = customers.len(), "Customers seeded");

    // Historical sales: a deterministic spread across the window, with
    // busier weekends so the dashboard's uplift rule has signal
    let mut sales = 0u32;
    for day_offset in (0..history_days).rev() {
        let day = now - Duration::days(day_offset);
        let weekday = chrono::Datelike::weekday(&day.date_naive());
        let is_weekend =
            weekday == chrono::Weekday::Sat || weekday == chrono::Weekday::Sun;
        let transactions: usize = if is_weekend { 6 } else { 4 };

        for txn in 0..transactions {
            let ts = day - Duration::hours(12 - txn as i64);
            let mut cart = Cart::new(ts);
            // Rotate through the catalog so every product moves
            for pick in 0..2usize {
                let product = &products[(sales as usize + txn + pick) % products.len()];
                cart.add_item(product, 1 + (txn as i64 % 3), ts)?;
            }
            db.sales()
                .record_checkout(&cart, &CheckoutKind::Cash, None, ts)
                .await?;
            sales += 1;
        }
    }
    tracing::info!(count = %sales, "Sales history seeded");

    // A little utang so the risk dashboard is not empty
    let maria = &customers[0];
    let mut cart = Cart::new(now);
    cart.add_item(&products[0], 2, now)?;
    cart.add_item(&products[7], 5, now)?;
    db.sales()
        .record_checkout(
            &cart,
            &CheckoutKind::Utang {
                customer_id: maria.id.clone(),
                due_date: Some((now + Duration::days(7)).date_naive()),
            },
            Some("Will pay next week".to_string()),
            now,
        )
        .await?;

    let juan = &customers[1];
    let mut cart = Cart::new(now);
    cart.set_cash_borrow(Money::from_pesos(400))?;
    db.sales()
        .record_checkout(
            &cart,
            &CheckoutKind::Utang {
                customer_id: juan.id.clone(),
                due_date: None,
            },
            Some("Emergency cash loan".to_string()),
            now,
        )
        .await?;

    tracing::info!("Utang entries seeded");
    tracing::info!("Done");

    db.close().await;
    Ok(())
}

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
