//! # Validation Module
//!
//! Input validation for everything that crosses the REST boundary.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Admin front-end                                              │
//! │  └── Immediate feedback (empty fields, obvious typos)                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (serde deserialization)                         │
//! │  └── THIS MODULE: field-level rules                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Order aggregate (CoreError)                                  │
//! │  └── State-dependent business rules                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: SQLite                                                       │
//! │  └── NOT NULL / UNIQUE / version checks                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use hearth_core::validation::{validate_item_name, validate_quantity};
//!
//! validate_item_name("Paneer Tikka").unwrap();
//! validate_quantity(2).unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Discount, FULL_RATE_BPS};
use crate::{MAX_ITEM_QUANTITY, MAX_ORDER_LINES, MAX_ORDER_SUBTOTAL, MAX_UNIT_PRICE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest free-text field (notes, void reasons, payment references).
pub const MAX_TEXT_LEN: usize = 500;

/// Highest table number a floor plan may use.
pub const MAX_TABLE_NUMBER: u32 = 9_999;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a menu item name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates an optional free-text field and returns the trimmed value.
///
/// Empty input collapses to `None`.
pub fn validate_optional_text(field: &str, text: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };

    if text.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        });
    }

    Ok(Some(text.to_string()))
}

/// Validates a required free-text field (void reason, NC reason, support reason).
pub fn validate_reason(field: &str, text: &str) -> ValidationResult<String> {
    validate_optional_text(field, Some(text))?.ok_or_else(|| ValidationError::Required {
        field: field.to_string(),
    })
}

/// Validates an order number of the form `ORD-DDMM-NNNN`.
///
/// ## Example
/// ```rust
/// use hearth_core::validation::validate_order_number;
///
/// assert!(validate_order_number("ORD-1503-0042").is_ok());
/// assert!(validate_order_number("ORD-15-42").is_err());
/// ```
pub fn validate_order_number(number: &str) -> ValidationResult<()> {
    let invalid = || ValidationError::InvalidFormat {
        field: "order_number".to_string(),
        reason: "expected ORD-DDMM-NNNN".to_string(),
    };

    let mut parts = number.split('-');
    let (Some("ORD"), Some(date), Some(seq), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };

    let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if date.len() != 4 || !digits(date) || seq.len() < 4 || !digits(seq) {
        return Err(invalid());
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity for a new or incremented line.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// `set_quantity` uses its own rules: zero removes the line and
/// negatives are a [`crate::CoreError::NegativeQuantity`].
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a menu, variant or modifier price.
///
/// Zero is allowed (complimentary items). At most [`MAX_UNIT_PRICE`].
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    validate_amount(field, price, MAX_UNIT_PRICE)
}

fn validate_amount(field: &str, amount: Money, max: Money) -> ValidationResult<()> {
    if amount.is_negative() || amount > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: max.paise(),
        });
    }

    Ok(())
}

/// Validates a tendered payment amount.
pub fn validate_payment_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "payment amount".to_string(),
        });
    }

    Ok(())
}

/// Validates a rate in basis points (0% to 100%).
pub fn validate_rate_bps(field: &str, bps: u32) -> ValidationResult<()> {
    if bps > FULL_RATE_BPS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: FULL_RATE_BPS as i64,
        });
    }

    Ok(())
}

/// Validates a percentage coming from configuration (`5.0` = 5%).
pub fn validate_percentage(field: &str, pct: f64) -> ValidationResult<()> {
    if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

/// Validates a discount as entered.
///
/// Percentages above 100% and negative fixed amounts are rejected here;
/// a fixed amount above the subtotal is accepted and clamped by the
/// calculator.
pub fn validate_discount(discount: &Discount) -> ValidationResult<()> {
    match discount {
        Discount::Percentage(rate) => validate_rate_bps("discount", rate.bps()),
        Discount::Fixed(amount) => validate_amount("discount", *amount, MAX_ORDER_SUBTOTAL),
    }
}

/// Validates a table number.
pub fn validate_table_number(number: u32) -> ValidationResult<()> {
    if number == 0 || number > MAX_TABLE_NUMBER {
        return Err(ValidationError::OutOfRange {
            field: "table number".to_string(),
            min: 1,
            max: MAX_TABLE_NUMBER as i64,
        });
    }

    Ok(())
}

/// Validates table seating capacity.
pub fn validate_capacity(capacity: u32) -> ValidationResult<()> {
    if capacity == 0 || capacity > 50 {
        return Err(ValidationError::OutOfRange {
            field: "capacity".to_string(),
            min: 1,
            max: 50,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates that one more line fits on the order.
pub fn validate_order_size(current_lines: usize) -> ValidationResult<()> {
    if current_lines >= MAX_ORDER_LINES {
        return Err(ValidationError::OutOfRange {
            field: "order lines".to_string(),
            min: 0,
            max: MAX_ORDER_LINES as i64,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use hearth_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
