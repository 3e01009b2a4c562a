//! # kitchenpos-core: Pure Domain Rules for Kitchen POS
//!
//! This crate is the **invariant layer** of Kitchen POS. It decides whether a
//! price is valid, whether a menu may be created, whether an order may advance,
//! whether a table may toggle its empty flag, and whether tables may be grouped
//! or ungrouped. It performs no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Kitchen POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                Transport (JSON payloads)                        │   │
//! │  │    CreateMenuRequest, CreateTableGroupRequest, ...              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ into_draft()                           │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ kitchenpos-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   price   │  │   menu    │  │   table   │  │   order   │  │   │
//! │  │   │   Price   │  │ composit- │  │  empty /  │  │  status   │  │   │
//! │  │   │           │  │ ion rule  │  │  grouping │  │  machine  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                kitchenpos-db (the Store)                        │   │
//! │  │     loads entities → asks validators → writes in one tx         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`price`] - Non-negative decimal `Price`
//! - [`types`] - Entities (Product, Menu, OrderTable, TableGroup, Order, ...)
//! - [`menu`] - Menu composition rule
//! - [`table`] - Empty-flag, guest count and table grouping rules
//! - [`order`] - Order creation rule and status machine
//! - [`command`] - Inbound command payloads and their validation
//! - [`validation`] - Field-level input checks
//! - [`error`] - Domain error taxonomy
//!
//! ## Example Usage
//!
//! ```rust
//! use kitchenpos_core::Price;
//! use rust_decimal::Decimal;
//!
//! let fried = Price::new(Decimal::from(16000)).unwrap();
//! let two = fried.multiply(2).unwrap();
//! assert_eq!(two, Price::new(Decimal::from(32000)).unwrap());
//!
//! assert!(Price::new(Decimal::from(-1)).is_err());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod command;
pub mod error;
pub mod menu;
pub mod order;
pub mod price;
pub mod table;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use price::Price;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Minimum number of tables in a table group.
pub const MIN_GROUP_TABLES: usize = 2;

/// Maximum length of product, menu group and menu names.
pub const MAX_NAME_LENGTH: usize = 255;
