//! # Order Module
//!
//! Order creation rule and the order status machine.
//!
//! ## Status Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌─────────┐        ┌─────────┐        ┌────────────┐                 │
//! │   │ COOKING │ ─────► │  MEAL   │ ─────► │ COMPLETION │  (terminal)     │
//! │   └─────────┘        └─────────┘        └────────────┘                 │
//! │                                                                         │
//! │   from COMPLETION ............ OrderAlreadyCompleted                   │
//! │   any other pair ............. InvalidTransition                        │
//! │     (self-transitions, MEAL → COOKING, COOKING → COMPLETION)           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::error::{CoreError, CoreResult};
use crate::types::{Order, OrderLineItem, OrderStatus, OrderTable};

// =============================================================================
// Status Machine
// =============================================================================

impl OrderStatus {
    /// True for COOKING and MEAL.
    #[inline]
    pub fn is_open(&self) -> bool {
        !matches!(self, OrderStatus::Completion)
    }

    /// The only legal successor, if any.
    pub const fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Cooking => Some(OrderStatus::Meal),
            OrderStatus::Meal => Some(OrderStatus::Completion),
            OrderStatus::Completion => None,
        }
    }

    /// True when `self → to` is a legal transition.
    pub fn can_transition_to(&self, to: OrderStatus) -> bool {
        self.next() == Some(to)
    }
}

impl Order {
    /// Advances the order to `to`.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::Utc;
    /// use kitchenpos_core::{CoreError, Order, OrderStatus};
    ///
    /// let mut order = Order {
    ///     id: "o-1".to_string(),
    ///     order_table_id: "t-1".to_string(),
    ///     order_status: OrderStatus::Cooking,
    ///     ordered_time: Utc::now(),
    ///     order_line_items: vec![],
    /// };
    ///
    /// order.change_status(OrderStatus::Meal).unwrap();
    /// order.change_status(OrderStatus::Completion).unwrap();
    ///
    /// let err = order.change_status(OrderStatus::Completion).unwrap_err();
    /// assert!(matches!(err, CoreError::OrderAlreadyCompleted { .. }));
    /// ```
    pub fn change_status(&mut self, to: OrderStatus) -> CoreResult<()> {
        validate_transition(&self.id, self.order_status, to)?;
        self.order_status = to;
        Ok(())
    }
}

/// Checks a status change without mutating anything.
pub fn validate_transition(order_id: &str, from: OrderStatus, to: OrderStatus) -> CoreResult<()> {
    if from == OrderStatus::Completion {
        return Err(CoreError::OrderAlreadyCompleted {
            order_id: order_id.to_string(),
        });
    }
    if !from.can_transition_to(to) {
        return Err(CoreError::InvalidTransition {
            order_id: order_id.to_string(),
            from,
            to,
        });
    }
    Ok(())
}

// =============================================================================
// Order Creation
// =============================================================================

/// A validated-but-not-persisted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub order_table_id: String,
    pub order_line_items: Vec<OrderLineItem>,
}

impl OrderDraft {
    /// Distinct menu ids referenced by the draft.
    pub fn menu_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.order_line_items
            .iter()
            .filter(|item| seen.insert(item.menu_id.as_str()))
            .map(|item| item.menu_id.clone())
            .collect()
    }

    /// Validates the draft and places it as a new COOKING order.
    pub fn place(
        self,
        id: String,
        ordered_time: DateTime<Utc>,
        table: &OrderTable,
        existing_menu_ids: &HashSet<String>,
    ) -> CoreResult<Order> {
        validate_new_order(&self, table, existing_menu_ids)?;
        Ok(Order {
            id,
            order_table_id: self.order_table_id,
            order_status: OrderStatus::Cooking,
            ordered_time,
            order_line_items: self.order_line_items,
        })
    }
}

/// Checks a new order against its table and the menus that exist.
///
/// ## Order of Checks
/// 1. Table must be occupied (`EmptyTable`)
/// 2. At least one line item (`EmptyLineItems`)
/// 3. Every menu id must exist (`UnknownMenu`)
pub fn validate_new_order(
    draft: &OrderDraft,
    table: &OrderTable,
    existing_menu_ids: &HashSet<String>,
) -> CoreResult<()> {
    if table.empty {
        return Err(CoreError::EmptyTable {
            table_id: table.id.clone(),
        });
    }

    if draft.order_line_items.is_empty() {
        return Err(CoreError::EmptyLineItems);
    }

    if let Some(missing) = draft
        .order_line_items
        .iter()
        .find(|item| !existing_menu_ids.contains(&item.menu_id))
    {
        return Err(CoreError::UnknownMenu {
            menu_id: missing.menu_id.clone(),
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

    const ALL: [OrderStatus; 3] = [OrderStatus::Cooking, OrderStatus::Meal, OrderStatus::Completion];

    fn order(status: OrderStatus) -> Order {
        Order {
            id: "o-1".to_string(),
            order_table_id: "t-1".to_string(),
            order_status: status,
            ordered_time: Utc::now(),
            order_line_items: vec![],
        }
    }

    fn seated() -> OrderTable {
        OrderTable {
            id: "t-1".to_string(),
            table_group_id: None,
            number_of_guests: 2,
            empty: false,
        }
    }

    fn draft(menu_ids: &[&str]) -> OrderDraft {
        OrderDraft {
            order_table_id: "t-1".to_string(),
            order_line_items: menu_ids
                .iter()
                .map(|id| OrderLineItem {
                    menu_id: id.to_string(),
                    quantity: 1,
                })
                .collect(),
        }
    }

    fn menus(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_only_forward_transitions_succeed() {
        for from in ALL {
            for to in ALL {
                let legal = matches!(
                    (from, to),
                    (OrderStatus::Cooking, OrderStatus::Meal)
                        | (OrderStatus::Meal, OrderStatus::Completion)
                );
                let mut o = order(from);
                let result = o.change_status(to);
                assert_eq!(result.is_ok(), legal, "{from} -> {to}");
                if legal {
                    assert_eq!(o.order_status, to);
                } else {
                    assert_eq!(o.order_status, from);
                }
            }
        }
    }

    #[test]
    fn test_completed_order_reports_already_completed() {
        for to in ALL {
            let err = order(OrderStatus::Completion).change_status(to).unwrap_err();
            assert!(matches!(err, CoreError::OrderAlreadyCompleted { .. }));
        }
    }

    #[test]
    fn test_skipping_or_reversing_is_invalid_transition() {
        let err = order(OrderStatus::Cooking)
            .change_status(OrderStatus::Completion)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));

        let err = order(OrderStatus::Meal)
            .change_status(OrderStatus::Cooking)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));

        let err = order(OrderStatus::Meal)
            .change_status(OrderStatus::Meal)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
    }

    #[test]
    fn test_is_open() {
        assert!(OrderStatus::Cooking.is_open());
        assert!(OrderStatus::Meal.is_open());
        assert!(!OrderStatus::Completion.is_open());
    }

    #[test]
    fn test_new_order_on_empty_table_fails() {
        let mut table = seated();
        table.empty = true;
        let err = validate_new_order(&draft(&["m-1"]), &table, &menus(&["m-1"])).unwrap_err();
        assert!(matches!(err, CoreError::EmptyTable { .. }));
    }

    #[test]
    fn test_new_order_without_items_fails() {
        let err = validate_new_order(&draft(&[]), &seated(), &menus(&["m-1"])).unwrap_err();
        assert!(matches!(err, CoreError::EmptyLineItems));
    }

    #[test]
    fn test_new_order_with_unknown_menu_fails() {
        let err = validate_new_order(&draft(&["m-1", "m-404"]), &seated(), &menus(&["m-1"]))
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownMenu { menu_id } if menu_id == "m-404"));
    }

    #[test]
    fn test_place_starts_cooking() {
        let d = draft(&["m-1", "m-1"]);
        assert_eq!(d.menu_ids(), vec!["m-1".to_string()]);

        let placed = d
            .place("o-9".to_string(), Utc::now(), &seated(), &menus(&["m-1"]))
            .unwrap();
        assert_eq!(placed.order_status, OrderStatus::Cooking);
        assert_eq!(placed.order_line_items.len(), 2);
    }
}
