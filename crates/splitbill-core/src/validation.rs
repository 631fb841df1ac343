//! # Validation Module
//!
//! Input validation and boundary sanitization.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (TypeScript)                                        │
//! │  ├── Basic format checks (empty, numeric)                              │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (Rust)                                           │
//! │  ├── sanitize_amount: raw numbers coerced before the engine            │
//! │  └── validate_*: mutation preconditions (typed rejections)             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: The session boundary                                         │
//! │  └── Rejected mutations become no-ops; the UI redisplays the           │
//! │      last good AllocationResult                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::{MAX_ITEM_QUANTITY, MAX_NAME_LEN};

// =============================================================================
// Boundary Sanitization
// =============================================================================

/// Coerces a raw numeric amount to a safe value.
///
/// Non-finite (NaN/∞) or negative input becomes 0. Raw UI text parses to
/// whatever `parseFloat`-style logic produced it; the engine must never
/// see anything it can't divide by or sum safely.
///
/// ## Example
/// ```rust
/// use splitbill_core::validation::sanitize_amount;
///
/// assert_eq!(sanitize_amount(12.5), 12.5);
/// assert_eq!(sanitize_amount(-3.0), 0.0);
/// assert_eq!(sanitize_amount(f64::NAN), 0.0);
/// ```
pub fn sanitize_amount(amount: f64) -> f64 {
    if amount.is_finite() && amount > 0.0 {
        amount
    } else {
        0.0
    }
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates and trims a display name (participant or item).
///
/// ## Rules
/// - Must not be blank after trimming
/// - Must be at most [`MAX_NAME_LEN`] characters
///
/// ## Returns
/// The trimmed name.
///
/// ## Example
/// ```rust
/// use splitbill_core::validation::validate_name;
///
/// assert_eq!(validate_name("  Sam ", "name").unwrap(), "Sam");
/// assert!(validate_name("   ", "name").is_err());
/// ```
pub fn validate_name(name: &str, field: &'static str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required { field });
    }

    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a unit price.
///
/// ## Rules
/// - Must be finite and strictly positive
///
/// Zero-priced items can exist in the data model (the engine handles a
/// zero subtotal), but the add-item operation rejects them: a free line
/// item is a UI mistake, not a bill entry.
pub fn validate_unit_price(price: f64) -> ValidationResult<()> {
    if !price.is_finite() || price <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "unit price",
        });
    }

    Ok(())
}

/// Validates an item quantity.
///
/// ## Rules
/// - Must be at least 1
/// - Must not exceed [`MAX_ITEM_QUANTITY`]
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 1 {
        return Err(ValidationError::MustBePositive { field: "quantity" });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity",
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
