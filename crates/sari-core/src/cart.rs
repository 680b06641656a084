//! # Cart Module
//!
//! Pure cart math and checkout validation.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cart Operations                                    │
//! │                                                                         │
//! │  Frontend Action            Cart State Change                           │
//! │  ───────────────            ─────────────────                           │
//! │  Tap Product ─────────────► add_item()        items.push / qty += n     │
//! │  Change Quantity ─────────► update_quantity() items[i].qty = n          │
//! │  Tap Remove ──────────────► remove_item()     items.remove(i)           │
//! │  "Pahiram ng pera" ───────► set_cash_borrow() cash_borrow = Some(₱)     │
//! │  Checkout ────────────────► validate_checkout(kind) then hand the       │
//! │                             cart to sari-db's transactional write       │
//! │                                                                         │
//! │  The cart itself performs NO persistence; it is a value type the        │
//! │  caller owns. Totals are exact integer centavo sums.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Item
// =============================================================================

/// An item in the cart.
///
/// ## Price Freezing
/// `unit_price_centavos` is captured when the item is added. If the
/// product price changes in the database afterwards, this cart retains
/// the price the customer saw.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartItem {
    /// Product ID (UUID)
    pub product_id: String,

    /// Product name at time of adding (frozen)
    pub name: String,

    /// Price in centavos at time of adding (frozen)
    pub unit_price_centavos: i64,

    /// Quantity in cart
    pub quantity: i64,

    /// When this item was added to cart
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Creates a new cart item from a product and quantity.
    pub fn from_product(product: &Product, quantity: i64, added_at: DateTime<Utc>) -> Self {
        CartItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price_centavos: product.unit_price_centavos,
            quantity,
            added_at,
        }
    }

    /// Calculates the line total (unit price × quantity).
    #[inline]
    pub fn line_total_centavos(&self) -> i64 {
        self.unit_price_centavos * self.quantity
    }

    /// Line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_centavos(self.line_total_centavos())
    }
}

// =============================================================================
// Checkout Kind
// =============================================================================

/// How the customer settles the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CheckoutKind {
    /// Paid in full at the register.
    Cash,
    /// Taken on utang: a credit obligation is recorded for the customer.
    Utang {
        customer_id: String,
        #[ts(as = "Option<String>")]
        due_date: Option<NaiveDate>,
    },
}

// =============================================================================
// Cart
// =============================================================================

/// The register cart.
///
/// ## Invariants
/// - Items are unique by `product_id` (adding the same product merges
///   quantities)
/// - Quantity is always > 0 (updating to 0 removes the item)
/// - At most `MAX_CART_ITEMS` distinct items, `MAX_ITEM_QUANTITY` per item
/// - `cash_borrow` is the original's "cash loan" line: money handed over
///   at the register, only payable on utang
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    /// Items in the cart
    pub items: Vec<CartItem>,

    /// Cash handed to the customer as a loan, if any.
    pub cash_borrow_centavos: Option<i64>,

    /// When the cart was created/last cleared
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Cart {
            items: Vec::new(),
            cash_borrow_centavos: None,
            created_at,
        }
    }

    /// Adds a product to the cart or increases quantity if already present.
    pub fn add_item(
        &mut self,
        product: &Product,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        crate::validation::validate_quantity(quantity)?;

        // Merge with an existing line for the same product
        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            let new_qty = item.quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            item.quantity = new_qty;
            return Ok(());
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.items.push(CartItem::from_product(product, quantity, now));
        Ok(())
    }

    /// Updates the quantity of an item in the cart.
    ///
    /// ## Behavior
    /// - If quantity is 0: removes the item
    /// - If product not found: returns error
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_item(product_id);
        }

        if quantity < 0 || quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) => {
                item.quantity = quantity;
                Ok(())
            }
            None => Err(CoreError::ProductNotFound(product_id.to_string())),
        }
    }

    /// Removes an item from the cart by product ID.
    pub fn remove_item(&mut self, product_id: &str) -> CoreResult<()> {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);

        if self.items.len() == before {
            return Err(CoreError::ProductNotFound(product_id.to_string()));
        }
        Ok(())
    }

    /// Records a cash-borrow line ("pahiram"), replacing any previous one.
    pub fn set_cash_borrow(&mut self, amount: Money) -> CoreResult<()> {
        if !amount.is_positive() {
            return Err(CoreError::InvalidCheckout {
                reason: "cash borrow amount must be positive".to_string(),
            });
        }
        self.cash_borrow_centavos = Some(amount.centavos());
        Ok(())
    }

    /// Clears the cart back to empty.
    pub fn clear(&mut self, now: DateTime<Utc>) {
        self.items.clear();
        self.cash_borrow_centavos = None;
        self.created_at = now;
    }

    /// True when there is nothing to check out.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.cash_borrow_centavos.is_none()
    }

    /// Total quantity across all lines.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Grand total: goods line totals plus any cash borrow.
    pub fn total_centavos(&self) -> i64 {
        let goods: i64 = self.items.iter().map(|i| i.line_total_centavos()).sum();
        goods + self.cash_borrow_centavos.unwrap_or(0)
    }

    /// Grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_centavos(self.total_centavos())
    }

    /// Validates the cart against the chosen checkout kind.
    ///
    /// ## Rules
    /// - An empty cart cannot be checked out
    /// - A cart carrying a cash-borrow line must be settled on utang;
    ///   there is no such thing as paying cash for borrowed cash
    pub fn validate_checkout(&self, kind: &CheckoutKind) -> CoreResult<()> {
        if self.is_empty() {
            return Err(CoreError::InvalidCheckout {
                reason: "cart is empty".to_string(),
            });
        }

        if matches!(kind, CheckoutKind::Cash) && self.cash_borrow_centavos.is_some() {
            return Err(CoreError::InvalidCheckout {
                reason: "cash payment cannot settle a cash-borrow line".to_string(),
            });
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
