//! # kitchenpos-db: The Store for Kitchen POS
//!
//! This crate persists the Kitchen POS aggregates in SQLite and runs every
//! use case as one transaction. Domain rules come from `kitchenpos-core`;
//! this crate loads what the rules need, applies them, and writes.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kitchen POS Data Flow                            │
//! │                                                                         │
//! │  Caller (HTTP handler, CLI, test)                                      │
//! │       │  CreateOrderRequest, ChangeEmptyRequest, ...                   │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  kitchenpos-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ product, menu │    │  (embedded)  │  │   │
//! │  │   │               │    │ order_table   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ table_group   │    │ 001_initial  │  │   │
//! │  │   │               │    │ order, ...    │    │              │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │ validate                      │   │
//! │  │                                ▼                               │   │
//! │  │                         kitchenpos-core                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (path from KitchenPosConfig)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Configuration file, environment overrides, tracing setup
//! - [`pool`] - Connection pool creation and repository accessors
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - One repository per aggregate
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kitchenpos_db::{Database, KitchenPosConfig};
//!
//! let config = KitchenPosConfig::load(None)?;
//! let db = Database::new(config.to_db_config()).await?;
//!
//! let table = db.order_tables().create(request).await?;
//! let order = db.orders().create(order_request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{init_tracing, KitchenPosConfig};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::menu::MenuRepository;
pub use repository::menu_group::MenuGroupRepository;
pub use repository::order::OrderRepository;
pub use repository::order_table::OrderTableRepository;
pub use repository::product::ProductRepository;
pub use repository::table_group::TableGroupRepository;
