//! # Validation Module
//!
//! Input validation utilities for SariSense.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (TypeScript)                                        │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (Rust)                                           │
//! │  ├── Business rule validation                                          │
//! │  └── Rejected BEFORE any mutation runs — no partial state change       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE constraints                                     │
//! │  └── CHECK (current_stock >= 0), CHECK (quantity > 0)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use sari_core::validation::{validate_quantity, validate_restock_quantity};
//!
//! validate_quantity(5).unwrap();
//! assert!(validate_restock_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 200 characters
///
/// ## Example
/// ```rust
/// use sari_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Lucky Me Pancit Canton").is_ok());
/// assert!(validate_product_name("  ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a customer name.
///
/// Same rules as product names; customer names key the utang ledger so
/// an empty name would make a balance unreachable.
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "customer name".to_string(),
        });
    }

    if name.len() > 120 {
        return Err(ValidationError::TooLong {
            field: "customer name".to_string(),
            max: 120,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a sale/cart quantity.
///
/// ## Rules
/// - Must be positive
/// - Must not exceed `MAX_ITEM_QUANTITY`
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if quantity > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a restock quantity.
///
/// A restock of zero or less is rejected before any stock mutation
/// (error taxonomy (c) — user-visible message, no partial state change).
pub fn validate_restock_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "restock quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a unit or cost price in centavos.
pub fn validate_price(field: &str, centavos: i64) -> ValidationResult<()> {
    if centavos < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a customer credit limit in centavos.
///
/// Zero is allowed (customer exists but gets no credit); negative is not.
pub fn validate_credit_limit(centavos: i64) -> ValidationResult<()> {
    if centavos < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "credit limit".to_string(),
        });
    }

    Ok(())
}

/// Validates a minimum-stock threshold.
pub fn validate_minimum_stock(minimum_stock: i64) -> ValidationResult<()> {
    if minimum_stock < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "minimum stock".to_string(),
        });
    }

    Ok(())
}

/// Validates a cart size before adding another distinct item.
pub fn validate_cart_size(current_len: usize) -> ValidationResult<()> {
    if current_len >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Coca-Cola 350ml").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"x".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_restock_quantity() {
        assert!(validate_restock_quantity(24).is_ok());
        assert!(validate_restock_quantity(0).is_err());
        assert!(validate_restock_quantity(-5).is_err());
    }

    #[test]
    fn test_validate_credit_limit() {
        assert!(validate_credit_limit(0).is_ok());
        assert!(validate_credit_limit(100_000).is_ok());
        assert!(validate_credit_limit(-1).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price("unit price", 2500).is_ok());
        assert!(validate_price("unit price", 0).is_ok());
        assert!(validate_price("cost price", -100).is_err());
    }
}
