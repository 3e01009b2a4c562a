//! # Error Types
//!
//! Domain error taxonomy for kitchenpos-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kitchenpos-core errors (this file)                                    │
//! │  ├── ValidationError  - Malformed input (price, name, quantity)        │
//! │  └── CoreError        - Violated domain rule                           │
//! │                                                                         │
//! │  kitchenpos-db errors (separate crate)                                 │
//! │  └── DbError          - Store failures, wraps CoreError                │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → Transport status        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every error is raised before any mutation is applied. None are retried.
//! The transport maps [`CoreError::code`] to a user-facing status.

use thiserror::Error;

use crate::price::Price;
use crate::types::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Domain rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed monetary value, name or count.
    #[error("Invalid value: {0}")]
    InvalidValue(#[from] ValidationError),

    /// A foreign key points at nothing (menu group, product, table).
    #[error("{entity} referenced by id {id} does not exist")]
    InvalidReference { entity: &'static str, id: String },

    /// A menu costs more than the products it bundles.
    ///
    /// ## Example
    /// ```text
    /// 후라이드 16000 × 2 = 32000
    /// Menu "후라이드+후라이드" at 33000
    ///      │
    ///      ▼
    /// PriceExceedsComposition { price: 33000, composition: 32000 }
    /// ```
    #[error("Menu price {price} exceeds the sum of its products {composition}")]
    PriceExceedsComposition { price: Price, composition: Price },

    /// Fewer than two tables were requested for a group.
    #[error("A table group needs at least {min} tables, got {requested}")]
    InsufficientTables { requested: usize, min: usize },

    /// Requested ids were duplicated or do not exist.
    #[error("Requested {requested} tables but {found} distinct existing tables matched")]
    UnknownTable { requested: usize, found: usize },

    /// A table being grouped is occupied.
    #[error("Table {table_id} is occupied and cannot be grouped")]
    TableNotEmpty { table_id: String },

    /// A table being grouped already belongs to a group.
    #[error("Table {table_id} already belongs to table group {table_group_id}")]
    AlreadyGrouped {
        table_id: String,
        table_group_id: String,
    },

    /// A grouped table's empty flag only changes through group/ungroup.
    #[error("Table {table_id} belongs to table group {table_group_id}; its empty flag cannot be changed")]
    GroupedTableImmutable {
        table_id: String,
        table_group_id: String,
    },

    /// An order is still COOKING or MEAL.
    ///
    /// ## When This Occurs
    /// - Toggling the empty flag of a table with an unfinished order
    /// - Ungrouping a table group whose tables have unfinished orders
    #[error("Order {order_id} on table {table_id} is still {status}")]
    OpenOrderExists {
        order_id: String,
        table_id: String,
        status: OrderStatus,
    },

    /// Guest count of an empty table cannot change.
    #[error("Table {table_id} is empty; its number of guests cannot be changed")]
    TableIsEmpty { table_id: String },

    /// Guest count is negative.
    #[error("Number of guests cannot be negative, got {requested}")]
    InvalidGuestCount { requested: i32 },

    /// Orders cannot be placed on an empty table.
    #[error("Table {table_id} is empty; orders cannot be placed on it")]
    EmptyTable { table_id: String },

    /// An order needs at least one line item.
    #[error("An order needs at least one line item")]
    EmptyLineItems,

    /// An order line item references a menu that does not exist.
    #[error("Menu not found: {menu_id}")]
    UnknownMenu { menu_id: String },

    /// Status change that is not COOKING → MEAL or MEAL → COMPLETION.
    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidTransition {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// COMPLETION is terminal.
    #[error("Order {order_id} is already completed")]
    OrderAlreadyCompleted { order_id: String },

    /// Id lookup miss.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Creates an InvalidReference error for a dangling foreign key.
    pub fn invalid_reference(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::InvalidReference {
            entity,
            id: id.into(),
        }
    }

    /// Machine-readable code the transport maps to a status.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::InvalidValue(_) => "INVALID_VALUE",
            CoreError::InvalidReference { .. } => "INVALID_REFERENCE",
            CoreError::PriceExceedsComposition { .. } => "PRICE_EXCEEDS_COMPOSITION",
            CoreError::InsufficientTables { .. } => "INSUFFICIENT_TABLES",
            CoreError::UnknownTable { .. } => "UNKNOWN_TABLE",
            CoreError::TableNotEmpty { .. } => "TABLE_NOT_EMPTY",
            CoreError::AlreadyGrouped { .. } => "ALREADY_GROUPED",
            CoreError::GroupedTableImmutable { .. } => "GROUPED_TABLE_IMMUTABLE",
            CoreError::OpenOrderExists { .. } => "OPEN_ORDER_EXISTS",
            CoreError::TableIsEmpty { .. } => "TABLE_IS_EMPTY",
            CoreError::InvalidGuestCount { .. } => "INVALID_GUEST_COUNT",
            CoreError::EmptyTable { .. } => "EMPTY_TABLE",
            CoreError::EmptyLineItems => "EMPTY_LINE_ITEMS",
            CoreError::UnknownMenu { .. } => "UNKNOWN_MENU",
            CoreError::InvalidTransition { .. } => "INVALID_TRANSITION",
            CoreError::OrderAlreadyCompleted { .. } => "ORDER_ALREADY_COMPLETED",
            CoreError::NotFound { .. } => "NOT_FOUND",
        }
    }

    /// True for id lookup misses (not-found rather than bad-request).
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::NotFound { .. })
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when a command payload is malformed, before any rule that
/// needs stored entities runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is below its minimum.
    #[error("{field} must be at least {min}, got {value}")]
    BelowMinimum { field: String, min: i64, value: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative, got {value}")]
    Negative { field: String, value: String },

    /// Arithmetic left the representable range.
    #[error("{field} overflowed")]
    Overflow { field: String },

    /// A list that must have entries is empty.
    #[error("{field} must not be empty")]
    Empty { field: String },

    /// Payload could not be parsed.
    #[error("malformed payload: {reason}")]
    Malformed { reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_error_messages() {
        let err = CoreError::PriceExceedsComposition {
            price: Price::new(Decimal::from(33000)).unwrap(),
            composition: Price::new(Decimal::from(32000)).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Menu price 33000 exceeds the sum of its products 32000"
        );

        let err = CoreError::OpenOrderExists {
            order_id: "o-1".to_string(),
            table_id: "t-1".to_string(),
            status: OrderStatus::Meal,
        };
        assert_eq!(err.to_string(), "Order o-1 on table t-1 is still MEAL");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "price".to_string(),
        };
        assert_eq!(err.to_string(), "price is required");

        let err = ValidationError::Negative {
            field: "price".to_string(),
            value: "-1".to_string(),
        };
        assert_eq!(err.to_string(), "price must not be negative, got -1");
    }

    #[test]
    fn test_validation_converts_to_invalid_value() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::InvalidValue(_)));
        assert_eq!(core_err.code(), "INVALID_VALUE");
    }

    #[test]
    fn test_not_found_is_distinguished() {
        assert!(CoreError::not_found("Order", "o-1").is_not_found());
        assert!(!CoreError::invalid_reference("MenuGroup", "g-1").is_not_found());
        assert_eq!(CoreError::EmptyLineItems.code(), "EMPTY_LINE_ITEMS");
    }
}
