//! # Order Table Repository
//!
//! Database operations for order tables: creation, the empty flag, and the
//! guest count. Group membership changes live in
//! [`TableGroupRepository`](super::table_group::TableGroupRepository).
//!
//! ## Concurrency
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Request A: change_empty(T1, true)     Request B: createOrder(T1)       │
//! │                                                                         │
//! │  read T1, orders(T1) = []                                              │
//! │  validate ✅                            INSERT order (COOKING)  commit  │
//! │  UPDATE order_tables SET empty = 1                                     │
//! │   WHERE id = T1                                                        │
//! │     AND table_group_id IS NULL                                         │
//! │     AND NOT EXISTS (open order on T1)  ← 0 rows → Conflict, rollback   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use kitchenpos_core::command::{
    ChangeEmptyRequest, ChangeNumberOfGuestsRequest, CreateOrderTableRequest,
};
use kitchenpos_core::{CoreError, OrderTable};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::order::fetch_orders_by_table_ids;
use super::{expect_one_row, new_id, placeholders};
use crate::error::DbResult;

#[derive(Debug, FromRow)]
struct OrderTableRow {
    id: String,
    table_group_id: Option<String>,
    number_of_guests: i32,
    empty: bool,
}

impl From<OrderTableRow> for OrderTable {
    fn from(row: OrderTableRow) -> Self {
        OrderTable {
            id: row.id,
            table_group_id: row.table_group_id,
            number_of_guests: row.number_of_guests,
            empty: row.empty,
        }
    }
}

const SELECT_TABLE: &str = "SELECT id, table_group_id, number_of_guests, empty FROM order_tables";

/// Repository for order table database operations.
#[derive(Debug, Clone)]
pub struct OrderTableRepository {
    pool: SqlitePool,
}

impl OrderTableRepository {
    /// Creates a new OrderTableRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderTableRepository { pool }
    }

    /// Registers a table.
    ///
    /// ## Errors
    /// - `InvalidGuestCount` when the initial guest count is negative
    pub async fn create(&self, request: CreateOrderTableRequest) -> DbResult<OrderTable> {
        request.validate()?;

        let table = OrderTable {
            id: new_id(),
            table_group_id: None,
            number_of_guests: request.number_of_guests,
            empty: request.empty,
        };

        sqlx::query(
            r#"
            INSERT INTO order_tables (id, table_group_id, number_of_guests, empty, created_at)
            VALUES (?1, NULL, ?2, ?3, ?4)
            "#,
        )
        .bind(&table.id)
        .bind(table.number_of_guests)
        .bind(table.empty)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        info!(id = %table.id, empty = table.empty, "Order table created");
        Ok(table)
    }

    /// Lists all tables in registration order.
    pub async fn list(&self) -> DbResult<Vec<OrderTable>> {
        let sql = format!("{SELECT_TABLE} ORDER BY created_at, rowid");
        let rows: Vec<OrderTableRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(OrderTable::from).collect())
    }

    /// Gets a table by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<OrderTable>> {
        let mut conn = self.pool.acquire().await?;
        fetch_table_by_id(&mut conn, id).await
    }

    /// Marks a table empty or occupied.
    ///
    /// ## Errors
    /// - `NotFound` when the table does not exist
    /// - `GroupedTableImmutable` when the table belongs to a group
    /// - `OpenOrderExists` when an order on the table is COOKING or MEAL
    pub async fn change_empty(&self, id: &str, request: ChangeEmptyRequest) -> DbResult<OrderTable> {
        let mut tx = self.pool.begin().await?;

        let mut table = fetch_table_by_id(&mut tx, id)
            .await?
            .ok_or_else(|| CoreError::not_found("OrderTable", id))?;
        let orders = fetch_orders_by_table_ids(&mut tx, std::slice::from_ref(&table.id)).await?;

        table.change_empty(request.empty, &orders)?;

        debug!(id = %table.id, empty = request.empty, "Updating empty flag");

        write_empty(&mut tx, &table).await?;

        tx.commit().await?;

        info!(id = %table.id, empty = table.empty, "Order table empty flag changed");
        Ok(table)
    }

    /// Replaces the guest count of an occupied table.
    ///
    /// ## Errors
    /// - `NotFound` when the table does not exist
    /// - `TableIsEmpty` when the table is empty
    /// - `InvalidGuestCount` when the count is negative
    pub async fn change_number_of_guests(
        &self,
        id: &str,
        request: ChangeNumberOfGuestsRequest,
    ) -> DbResult<OrderTable> {
        let mut tx = self.pool.begin().await?;

        let mut table = fetch_table_by_id(&mut tx, id)
            .await?
            .ok_or_else(|| CoreError::not_found("OrderTable", id))?;

        table.change_number_of_guests(request.number_of_guests)?;

        write_number_of_guests(&mut tx, &table).await?;

        tx.commit().await?;

        info!(
            id = %table.id,
            number_of_guests = table.number_of_guests,
            "Order table guest count changed"
        );
        Ok(table)
    }
}

// =============================================================================
// Guarded writes
// =============================================================================

/// Stores the empty flag while the table is still ungrouped and has no
/// open order.
async fn write_empty(conn: &mut SqliteConnection, table: &OrderTable) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE order_tables SET empty = ?2
        WHERE id = ?1
          AND table_group_id IS NULL
          AND NOT EXISTS (
              SELECT 1 FROM orders
              WHERE order_table_id = ?1 AND order_status IN ('COOKING', 'MEAL')
          )
        "#,
    )
    .bind(&table.id)
    .bind(table.empty)
    .execute(&mut *conn)
    .await?;

    expect_one_row(result, "OrderTable", &table.id)
}

/// Stores the guest count while the table is still occupied.
async fn write_number_of_guests(conn: &mut SqliteConnection, table: &OrderTable) -> DbResult<()> {
    let result =
        sqlx::query("UPDATE order_tables SET number_of_guests = ?2 WHERE id = ?1 AND empty = 0")
            .bind(&table.id)
            .bind(table.number_of_guests)
            .execute(&mut *conn)
            .await?;

    expect_one_row(result, "OrderTable", &table.id)
}

// =============================================================================
// Lookups (run inside the caller's transaction)
// =============================================================================

pub(crate) async fn fetch_table_by_id(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<OrderTable>> {
    let sql = format!("{SELECT_TABLE} WHERE id = ?1");
    let row: Option<OrderTableRow> = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.map(OrderTable::from))
}

/// Loads the tables with the given ids. Unknown ids are skipped.
pub(crate) async fn fetch_tables_by_ids(
    conn: &mut SqliteConnection,
    ids: &[String],
) -> DbResult<Vec<OrderTable>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!("{SELECT_TABLE} WHERE id IN ({})", placeholders(ids.len()));
    let mut query = sqlx::query_as::<_, OrderTableRow>(&sql);
    for id in ids {
        query = query.bind(id);
    }

    let rows = query.fetch_all(&mut *conn).await?;
    Ok(rows.into_iter().map(OrderTable::from).collect())
}

/// Loads the current members of a table group.
pub(crate) async fn fetch_tables_by_group_id(
    conn: &mut SqliteConnection,
    table_group_id: &str,
) -> DbResult<Vec<OrderTable>> {
    let sql = format!("{SELECT_TABLE} WHERE table_group_id = ?1 ORDER BY created_at, rowid");
    let rows: Vec<OrderTableRow> = sqlx::query_as(&sql)
        .bind(table_group_id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(rows.into_iter().map(OrderTable::from).collect())
}
