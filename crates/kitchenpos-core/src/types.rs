//! # Domain Types
//!
//! Core domain types used throughout Kitchen POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Catalog (created once, never mutated)                                  │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   MenuGroup     │   │      Menu       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name           │   │  name           │   │  price          │       │
//! │  │  price          │   └────────▲────────┘   │  menu_group_id ─┼──┐    │
//! │  └────────▲────────┘            └────────────┼─────────────────┘  │    │
//! │           └───────── MenuProduct ◄───────────┘  menu_products     │    │
//! │                                                                   │    │
//! │  Floor (mutated in place)                                         │    │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐  │    │
//! │  │   OrderTable    │   │   TableGroup    │   │     Order       │  │    │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │  │    │
//! │  │  guests, empty  │   │  created_date   │   │  order_status   │  │    │
//! │  │  table_group_id─┼──►│  member ids     │   │  order_table_id─┼─►│    │
//! │  └─────────────────┘   └─────────────────┘   │  line items ────┼──┘    │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity id is a UUID v4 string assigned by the Store. Entities refer
//! to each other by id only; there are no object back-pointers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::price::Price;

// =============================================================================
// Product
// =============================================================================

/// A sellable item with a fixed price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, e.g. "후라이드".
    pub name: String,

    #[ts(as = "String")]
    pub price: Price,
}

// =============================================================================
// Menu Group
// =============================================================================

/// A named category of menus, e.g. "두마리메뉴".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MenuGroup {
    pub id: String,
    pub name: String,
}

// =============================================================================
// Menu
// =============================================================================

/// One product line inside a menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MenuProduct {
    pub product_id: String,
    pub quantity: i64,
}

/// A priced bundle of products.
///
/// The price never exceeds the sum of its products' prices at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub id: String,
    pub name: String,
    #[ts(as = "String")]
    pub price: Price,
    pub menu_group_id: String,
    /// Products in the order they were submitted.
    pub menu_products: Vec<MenuProduct>,
}

// =============================================================================
// Order Table
// =============================================================================

/// A physical table on the floor.
///
/// ## State
/// ```text
///   empty=true, no group ──group──► empty=false, table_group_id=Some
///          ▲                                      │
///          └──────── change_empty ◄──── ungroup ──┘ (empty unchanged)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderTable {
    pub id: String,
    /// Group this table currently belongs to.
    pub table_group_id: Option<String>,
    pub number_of_guests: i32,
    /// True when no party is seated.
    pub empty: bool,
}

impl OrderTable {
    /// True when the table belongs to a table group.
    #[inline]
    pub fn is_grouped(&self) -> bool {
        self.table_group_id.is_some()
    }
}

// =============================================================================
// Table Group
// =============================================================================

/// Two or more tables billed together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TableGroup {
    pub id: String,
    #[ts(as = "String")]
    pub created_date: DateTime<Utc>,
    /// Member tables at the time the group was assembled.
    pub order_table_ids: Vec<String>,
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of an order.
///
/// ```text
/// COOKING ──► MEAL ──► COMPLETION (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// The kitchen is preparing the order.
    Cooking,
    /// Food has been served.
    Meal,
    /// The order is closed.
    Completion,
}

impl OrderStatus {
    /// Wire / storage representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Cooking => "COOKING",
            OrderStatus::Meal => "MEAL",
            OrderStatus::Completion => "COMPLETION",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Cooking
    }
}

// =============================================================================
// Order
// =============================================================================

/// One menu line on an order. Repeated menu ids are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    pub menu_id: String,
    pub quantity: i64,
}

/// A customer order against one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub order_table_id: String,
    pub order_status: OrderStatus,
    #[ts(as = "String")]
    pub ordered_time: DateTime<Utc>,
    pub order_line_items: Vec<OrderLineItem>,
}

// =============================================================================
// Unit Tests
// =============================================================================
