//! # Validation Module
//!
//! Field-level input checks for Kitchen POS commands.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: THIS MODULE (stateless)                                      │
//! │  ├── names: non-blank, bounded length                                  │
//! │  └── quantities: at least 1                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: menu / table / order modules (need loaded entities)          │
//! │  ├── composition price, grouping, status machine                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL, CHECK and foreign key constraints                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kitchenpos_core::validation::{validate_name, validate_quantity};
//!
//! validate_name("name", "후라이드").unwrap();
//! validate_quantity("quantity", 2).unwrap();
//! assert!(validate_quantity("quantity", 0).is_err());
//! ```

use crate::error::ValidationError;
use crate::MAX_NAME_LENGTH;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (product, menu group, menu).
///
/// ## Rules
/// - Must not be blank
/// - At most [`MAX_NAME_LENGTH`] characters
///
/// Returns the trimmed name.
pub fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    // Korean menu names are multi-byte, count characters not bytes
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(name.to_string())
}

/// Validates an entity id supplied by a caller.
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a menu product or order line item quantity.
///
/// Must be at least 1; there is no upper bound.
///
/// ## Example
/// ```rust
/// use kitchenpos_core::validation::validate_quantity;
///
/// assert!(validate_quantity("quantity", 1).is_ok());
/// assert!(validate_quantity("quantity", 1000).is_ok());
/// assert!(validate_quantity("quantity", 0).is_err());
/// assert!(validate_quantity("quantity", -1).is_err());
/// ```
pub fn validate_quantity(field: &str, quantity: i64) -> ValidationResult<()> {
    if quantity < 1 {
        return Err(ValidationError::BelowMinimum {
            field: field.to_string(),
            min: 1,
            value: quantity,
        });
    }
    Ok(())
}

/// Validates that a list has at least one entry.
pub fn validate_not_empty<T>(field: &str, items: &[T]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::Empty {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
