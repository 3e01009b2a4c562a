//! # Order Repository
//!
//! Database operations for orders.
//!
//! ## Order Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create ──► COOKING ──change_status──► MEAL ──change_status──► COMPLETION │
//! │                                                                         │
//! │  create:         INSERT ... SELECT ... WHERE table is still occupied    │
//! │  change_status:  UPDATE ... WHERE order_status = <status that was read> │
//! │                                                                         │
//! │  Either guard matching 0 rows means another request got there first.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use kitchenpos_core::command::{ChangeOrderStatusRequest, CreateOrderRequest};
use kitchenpos_core::{CoreError, Order, OrderLineItem, OrderStatus};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::{debug, info};

use super::menu::fetch_existing_menu_ids;
use super::order_table::fetch_table_by_id;
use super::{expect_one_row, new_id, placeholders};
use crate::error::DbResult;

#[derive(Debug, FromRow)]
struct OrderRow {
    id: String,
    order_table_id: String,
    order_status: OrderStatus,
    ordered_time: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct OrderLineItemRow {
    order_id: String,
    menu_id: String,
    quantity: i64,
}

const SELECT_ORDER: &str = "SELECT id, order_table_id, order_status, ordered_time FROM orders";

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Places a new order in COOKING.
    ///
    /// ## Errors
    /// - `InvalidValue` for a blank id or a quantity below 1
    /// - `InvalidReference` when the table does not exist
    /// - `EmptyTable` when the table is marked empty
    /// - `EmptyLineItems` when no line items were given
    /// - `UnknownMenu` when a line item names a missing menu
    /// - `Conflict` when the table was emptied between the read and the write
    pub async fn create(&self, request: CreateOrderRequest) -> DbResult<Order> {
        let draft = request.into_draft()?;

        let mut tx = self.pool.begin().await?;

        let table = fetch_table_by_id(&mut tx, &draft.order_table_id)
            .await?
            .ok_or_else(|| CoreError::invalid_reference("OrderTable", &draft.order_table_id))?;
        let existing = fetch_existing_menu_ids(&mut tx, &draft.menu_ids()).await?;
        let order = draft.place(new_id(), Utc::now(), &table, &existing)?;

        debug!(id = %order.id, order_table_id = %order.order_table_id, "Inserting order");

        insert_order(&mut tx, &order).await?;

        tx.commit().await?;

        info!(
            id = %order.id,
            order_table_id = %order.order_table_id,
            items = order.order_line_items.len(),
            "Order placed"
        );
        Ok(order)
    }

    /// Lists all orders with their line items, oldest first.
    pub async fn list(&self) -> DbResult<Vec<Order>> {
        let mut conn = self.pool.acquire().await?;

        let sql = format!("{SELECT_ORDER} ORDER BY ordered_time, rowid");
        let rows: Vec<OrderRow> = sqlx::query_as(&sql).fetch_all(&mut *conn).await?;

        let item_rows: Vec<OrderLineItemRow> = sqlx::query_as(
            "SELECT order_id, menu_id, quantity FROM order_line_items ORDER BY order_id, position",
        )
        .fetch_all(&mut *conn)
        .await?;

        Ok(attach_line_items(rows, item_rows))
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let mut conn = self.pool.acquire().await?;
        fetch_order_by_id(&mut conn, id).await
    }

    /// Moves an order to the requested status.
    ///
    /// ## Errors
    /// - `NotFound` when the order does not exist
    /// - `OrderAlreadyCompleted` when the order is in COMPLETION
    /// - `InvalidTransition` for any other step that is not forward by one
    /// - `Conflict` when the status changed between the read and the write
    pub async fn change_status(
        &self,
        order_id: &str,
        request: ChangeOrderStatusRequest,
    ) -> DbResult<Order> {
        let mut tx = self.pool.begin().await?;

        let mut order = fetch_order_by_id(&mut tx, order_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Order", order_id))?;
        let from = order.order_status;

        order.change_status(request.order_status)?;

        write_status(&mut tx, &order, from).await?;

        tx.commit().await?;

        info!(id = %order.id, %from, to = %order.order_status, "Order status changed");
        Ok(order)
    }
}

// =============================================================================
// Guarded writes
// =============================================================================

/// Inserts an order and its line items while its table is still occupied.
async fn insert_order(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        INSERT INTO orders (id, order_table_id, order_status, ordered_time)
        SELECT ?1, ?2, ?3, ?4
        WHERE EXISTS (SELECT 1 FROM order_tables WHERE id = ?2 AND empty = 0)
        "#,
    )
    .bind(&order.id)
    .bind(&order.order_table_id)
    .bind(order.order_status)
    .bind(order.ordered_time)
    .execute(&mut *conn)
    .await?;
    expect_one_row(result, "OrderTable", &order.order_table_id)?;

    for (position, item) in order.order_line_items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO order_line_items (order_id, position, menu_id, quantity)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&order.id)
        .bind(position as i64)
        .bind(&item.menu_id)
        .bind(item.quantity)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Stores the new status only if the order is still in `from`.
async fn write_status(conn: &mut SqliteConnection, order: &Order, from: OrderStatus) -> DbResult<()> {
    let result = sqlx::query("UPDATE orders SET order_status = ?2 WHERE id = ?1 AND order_status = ?3")
        .bind(&order.id)
        .bind(order.order_status)
        .bind(from)
        .execute(&mut *conn)
        .await?;

    expect_one_row(result, "Order", &order.id)
}

// =============================================================================
// Lookups (run inside the caller's transaction)
// =============================================================================

async fn fetch_order_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Order>> {
    let sql = format!("{SELECT_ORDER} WHERE id = ?1");
    let Some(row) = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
    else {
        return Ok(None);
    };

    let item_rows: Vec<OrderLineItemRow> = sqlx::query_as(
        "SELECT order_id, menu_id, quantity FROM order_line_items WHERE order_id = ?1 ORDER BY position",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(attach_line_items(vec![row], item_rows).pop())
}

/// Loads every order placed on any of the given tables, with line items.
pub(crate) async fn fetch_orders_by_table_ids(
    conn: &mut SqliteConnection,
    table_ids: &[String],
) -> DbResult<Vec<Order>> {
    if table_ids.is_empty() {
        return Ok(Vec::new());
    }

    let marks = placeholders(table_ids.len());

    let sql = format!("{SELECT_ORDER} WHERE order_table_id IN ({marks}) ORDER BY ordered_time, rowid");
    let mut query = sqlx::query_as::<_, OrderRow>(&sql);
    for id in table_ids {
        query = query.bind(id);
    }
    let rows = query.fetch_all(&mut *conn).await?;

    let sql = format!(
        r#"
        SELECT li.order_id, li.menu_id, li.quantity
        FROM order_line_items li
        JOIN orders o ON o.id = li.order_id
        WHERE o.order_table_id IN ({marks})
        ORDER BY li.order_id, li.position
        "#
    );
    let mut query = sqlx::query_as::<_, OrderLineItemRow>(&sql);
    for id in table_ids {
        query = query.bind(id);
    }
    let item_rows = query.fetch_all(&mut *conn).await?;

    debug!(tables = table_ids.len(), orders = rows.len(), "Loaded orders for tables");
    Ok(attach_line_items(rows, item_rows))
}

fn attach_line_items(rows: Vec<OrderRow>, item_rows: Vec<OrderLineItemRow>) -> Vec<Order> {
    let mut items: HashMap<String, Vec<OrderLineItem>> = HashMap::new();
    for row in item_rows {
        items.entry(row.order_id).or_default().push(OrderLineItem {
            menu_id: row.menu_id,
            quantity: row.quantity,
        });
    }

    rows.into_iter()
        .map(|row| Order {
            order_line_items: items.remove(&row.id).unwrap_or_default(),
            id: row.id,
            order_table_id: row.order_table_id,
            order_status: row.order_status,
            ordered_time: row.ordered_time,
        })
        .collect()
}
