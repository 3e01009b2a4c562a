//! # Repository Module
//!
//! Store operations for Kitchen POS. Each public repository method is one
//! use case and one unit of work.
//!
//! ## Unit of Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One Operation, One Transaction                       │
//! │                                                                         │
//! │  db.table_groups().create(ids)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  pool.begin() ─────────────────────────────────────────────┐           │
//! │       │                                                     │           │
//! │       │  1. load     fetch_tables_by_ids(&mut *tx, ids)     │           │
//! │       │  2. validate kitchenpos_core::table::validate_*     │  rollback │
//! │       │  3. mutate   UPDATE ... WHERE <precondition>        │  on any   │
//! │       │              rows_affected() == 1 or Conflict       │  error    │
//! │       ▼                                                     │           │
//! │  tx.commit() ◄─────────────────────────────────────────────┘           │
//! │                                                                         │
//! │  Validation finishes before the first write.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `fetch_*` helpers take a `&mut SqliteConnection` so they run inside
//! the caller's transaction. Never reach for the pool while a transaction is
//! open: the in-memory database has a single connection.
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Products
//! - [`MenuGroupRepository`](menu_group::MenuGroupRepository) - Menu groups
//! - [`MenuRepository`](menu::MenuRepository) - Menus and their products
//! - [`OrderTableRepository`](order_table::OrderTableRepository) - Tables, empty flag, guests
//! - [`TableGroupRepository`](table_group::TableGroupRepository) - Grouping and ungrouping
//! - [`OrderRepository`](order::OrderRepository) - Orders and status changes

pub mod menu;
pub mod menu_group;
pub mod order;
pub mod order_table;
pub mod product;
pub mod table_group;

use kitchenpos_core::Price;
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteQueryResult;
use std::str::FromStr;
use tracing::warn;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// Generates a new entity id.
pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// `?, ?, ?` for an `IN (...)` list.
pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Reads a stored price back through the validating constructor.
pub(crate) fn decode_price(entity: &str, id: &str, raw: &str) -> DbResult<Price> {
    let corrupt = |reason: String| DbError::CorruptRow {
        entity: entity.to_string(),
        id: id.to_string(),
        reason,
    };
    let value = Decimal::from_str(raw).map_err(|e| corrupt(e.to_string()))?;
    Price::new(value).map_err(|e| corrupt(e.to_string()))
}

/// Checks a compare-and-set UPDATE hit exactly one row.
pub(crate) fn expect_one_row(
    result: SqliteQueryResult,
    entity: &'static str,
    id: &str,
) -> DbResult<()> {
    if result.rows_affected() != 1 {
        warn!(entity, id = %id, "Precondition no longer holds, rejecting write");
        return Err(DbError::conflict(entity, id));
    }
    Ok(())
}

// =============================================================================
// Test Fixtures
// =============================================================================


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?, ?, ?");
    }

    #[test]
    fn test_decode_price_rejects_corrupt_rows() {
        assert_eq!(
            decode_price("Product", "p-1", "16000").unwrap().value(),
            Decimal::from(16000)
        );
        assert!(matches!(
            decode_price("Product", "p-1", "-5"),
            Err(DbError::CorruptRow { .. })
        ));
        assert!(matches!(
            decode_price("Product", "p-1", "abc"),
            Err(DbError::CorruptRow { .. })
        ));
    }
}
