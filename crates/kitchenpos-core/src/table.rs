//! # Table Module
//!
//! Rules for order tables and table groups.
//!
//! ## Grouping Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     createTableGroup([T1, T2])                          │
//! │                                                                         │
//! │  1. at least 2 ids ────────────────────── InsufficientTables           │
//! │  2. every id distinct and found ───────── UnknownTable                 │
//! │  3. every table empty ─────────────────── TableNotEmpty                │
//! │  4. no table already grouped ──────────── AlreadyGrouped               │
//! │  5. group_by(): table_group_id = G, empty = false                      │
//! │                                                                         │
//! │                     ungroupTable(G)                                     │
//! │                                                                         │
//! │  1. no COOKING / MEAL order on any member ─ OpenOrderExists            │
//! │  2. ungroup(): table_group_id = None (empty unchanged)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use crate::error::{CoreError, CoreResult};
use crate::types::{Order, OrderTable};
use crate::MIN_GROUP_TABLES;

// =============================================================================
// Single Table Rules
// =============================================================================

/// Fails when any order is still COOKING or MEAL.
fn ensure_no_open_order(orders: &[Order]) -> CoreResult<()> {
    if let Some(open) = orders.iter().find(|o| o.order_status.is_open()) {
        return Err(CoreError::OpenOrderExists {
            order_id: open.id.clone(),
            table_id: open.order_table_id.clone(),
            status: open.order_status,
        });
    }
    Ok(())
}

/// Checks whether the table's empty flag may be toggled.
///
/// `orders` are all orders placed on this table.
pub fn validate_can_change_empty(table: &OrderTable, orders: &[Order]) -> CoreResult<()> {
    if let Some(group_id) = &table.table_group_id {
        return Err(CoreError::GroupedTableImmutable {
            table_id: table.id.clone(),
            table_group_id: group_id.clone(),
        });
    }
    ensure_no_open_order(orders)
}

/// Checks a requested guest count for a new table.
pub fn validate_number_of_guests(requested: i32) -> CoreResult<()> {
    if requested < 0 {
        return Err(CoreError::InvalidGuestCount { requested });
    }
    Ok(())
}

impl OrderTable {
    /// Sets the empty flag after [`validate_can_change_empty`] passes.
    pub fn change_empty(&mut self, empty: bool, orders: &[Order]) -> CoreResult<()> {
        validate_can_change_empty(self, orders)?;
        self.empty = empty;
        Ok(())
    }

    /// Replaces the guest count of an occupied table.
    pub fn change_number_of_guests(&mut self, number_of_guests: i32) -> CoreResult<()> {
        if self.empty {
            return Err(CoreError::TableIsEmpty {
                table_id: self.id.clone(),
            });
        }
        validate_number_of_guests(number_of_guests)?;
        self.number_of_guests = number_of_guests;
        Ok(())
    }

    /// Joins a table group. Grouped tables are seated.
    pub fn group_by(&mut self, table_group_id: &str) {
        self.table_group_id = Some(table_group_id.to_string());
        self.empty = false;
    }

    /// Leaves the current table group.
    pub fn ungroup(&mut self) {
        self.table_group_id = None;
    }
}

// =============================================================================
// Table Group Rules
// =============================================================================

/// Checks the requested id count before any lookup.
pub fn validate_table_count(requested_ids: &[String]) -> CoreResult<()> {
    if requested_ids.len() < MIN_GROUP_TABLES {
        return Err(CoreError::InsufficientTables {
            requested: requested_ids.len(),
            min: MIN_GROUP_TABLES,
        });
    }
    Ok(())
}

/// Checks whether the found tables may form a new group.
///
/// `tables` is whatever the Store resolved for `requested_ids`; duplicate or
/// unknown ids show up as a size mismatch.
pub fn validate_table_group(requested_ids: &[String], tables: &[OrderTable]) -> CoreResult<()> {
    validate_table_count(requested_ids)?;

    let distinct: HashSet<&str> = requested_ids.iter().map(String::as_str).collect();
    let found = tables
        .iter()
        .filter(|t| distinct.contains(t.id.as_str()))
        .map(|t| t.id.as_str())
        .collect::<HashSet<_>>()
        .len();
    if found != requested_ids.len() {
        return Err(CoreError::UnknownTable {
            requested: requested_ids.len(),
            found,
        });
    }

    if let Some(occupied) = tables.iter().find(|t| !t.empty) {
        return Err(CoreError::TableNotEmpty {
            table_id: occupied.id.clone(),
        });
    }

    if let Some(grouped) = tables.iter().find(|t| t.is_grouped()) {
        return Err(CoreError::AlreadyGrouped {
            table_id: grouped.id.clone(),
            table_group_id: grouped.table_group_id.clone().unwrap_or_default(),
        });
    }

    Ok(())
}

/// Checks whether a group may be dissolved.
///
/// `orders` are all orders placed on any member table.
pub fn validate_can_ungroup(orders: &[Order]) -> CoreResult<()> {
    ensure_no_open_order(orders)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderStatus;
    use chrono::Utc;

    fn table(id: &str, empty: bool, group: Option<&str>) -> OrderTable {
        OrderTable {
            id: id.to_string(),
            table_group_id: group.map(str::to_string),
            number_of_guests: 0,
            empty,
        }
    }

    fn order(table_id: &str, status: OrderStatus) -> Order {
        Order {
            id: format!("o-{table_id}"),
            order_table_id: table_id.to_string(),
            order_status: status,
            ordered_time: Utc::now(),
            order_line_items: Vec::new(),
        }
    }

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_change_empty_on_grouped_table_fails() {
        let mut t = table("t-1", false, Some("g-1"));
        let err = t.change_empty(true, &[]).unwrap_err();
        assert!(matches!(err, CoreError::GroupedTableImmutable { .. }));
        assert!(!t.empty);
    }

    #[test]
    fn test_change_empty_with_open_order_fails() {
        let mut t = table("t-1", false, None);
        for status in [OrderStatus::Cooking, OrderStatus::Meal] {
            let err = t.change_empty(true, &[order("t-1", status)]).unwrap_err();
            assert!(matches!(err, CoreError::OpenOrderExists { .. }));
        }
        assert!(!t.empty);

        t.change_empty(true, &[order("t-1", OrderStatus::Completion)]).unwrap();
        assert!(t.empty);
    }

    #[test]
    fn test_change_number_of_guests() {
        let mut empty = table("t-1", true, None);
        assert!(matches!(
            empty.change_number_of_guests(4),
            Err(CoreError::TableIsEmpty { .. })
        ));

        let mut seated = table("t-2", false, None);
        assert!(matches!(
            seated.change_number_of_guests(-1),
            Err(CoreError::InvalidGuestCount { requested: -1 })
        ));
        seated.change_number_of_guests(4).unwrap();
        assert_eq!(seated.number_of_guests, 4);
    }

    #[test]
    fn test_empty_table_is_checked_before_guest_count() {
        let mut empty = table("t-1", true, None);
        assert!(matches!(
            empty.change_number_of_guests(-1),
            Err(CoreError::TableIsEmpty { .. })
        ));
    }

    #[test]
    fn test_group_requires_two_tables() {
        let err = validate_table_group(&ids(&["t-1"]), &[table("t-1", true, None)]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientTables { requested: 1, min: 2 }
        ));
        assert!(validate_table_count(&[]).is_err());
    }

    #[test]
    fn test_group_rejects_unknown_and_duplicate_ids() {
        let tables = vec![table("t-1", true, None)];
        let err = validate_table_group(&ids(&["t-1", "t-404"]), &tables).unwrap_err();
        assert!(matches!(err, CoreError::UnknownTable { requested: 2, found: 1 }));

        let err = validate_table_group(&ids(&["t-1", "t-1"]), &tables).unwrap_err();
        assert!(matches!(err, CoreError::UnknownTable { requested: 2, found: 1 }));
    }

    #[test]
    fn test_group_rejects_occupied_or_grouped_tables() {
        let err = validate_table_group(
            &ids(&["t-1", "t-2"]),
            &[table("t-1", true, None), table("t-2", false, None)],
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::TableNotEmpty { table_id } if table_id == "t-2"));

        let err = validate_table_group(
            &ids(&["t-1", "t-2"]),
            &[table("t-1", true, Some("g-1")), table("t-2", true, None)],
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::AlreadyGrouped { table_id, .. } if table_id == "t-1"));
    }

    #[test]
    fn test_group_accepts_empty_ungrouped_tables() {
        let mut tables = vec![table("t-1", true, None), table("t-2", true, None)];
        validate_table_group(&ids(&["t-1", "t-2"]), &tables).unwrap();

        for t in &mut tables {
            t.group_by("g-1");
        }
        assert!(tables
            .iter()
            .all(|t| t.table_group_id.as_deref() == Some("g-1") && !t.empty));
    }

    #[test]
    fn test_ungroup_requires_all_orders_completed() {
        assert!(validate_can_ungroup(&[]).is_ok());
        assert!(validate_can_ungroup(&[
            order("t-1", OrderStatus::Completion),
            order("t-2", OrderStatus::Completion),
        ])
        .is_ok());

        let err = validate_can_ungroup(&[
            order("t-1", OrderStatus::Meal),
            order("t-2", OrderStatus::Completion),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            CoreError::OpenOrderExists { status: OrderStatus::Meal, .. }
        ));
    }

    #[test]
    fn test_ungroup_keeps_empty_flag() {
        let mut t = table("t-1", true, None);
        t.group_by("g-1");
        t.ungroup();
        assert!(t.table_group_id.is_none());
        assert!(!t.empty);
    }
}
