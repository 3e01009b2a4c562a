//! # Table Group Repository
//!
//! Grouping merges two or more empty, ungrouped tables so a party can sit
//! across them. Ungrouping releases every member once no order on any of
//! them is still open.
//!
//! ## Lifecycle
//! ```text
//!   T1 (empty, no group) ─┐                        ┌─► T1 (group = NULL)
//!                          ├─ create ─► G1 ─ ungroup ┤
//!   T2 (empty, no group) ─┘   empty = 0            └─► T2 (group = NULL)
//!                             group = G1
//! ```
//!
//! The `table_groups` row and its `table_group_members` rows outlive an
//! ungroup; they record which tables were merged and when.

use chrono::{DateTime, Utc};
use kitchenpos_core::command::CreateTableGroupRequest;
use kitchenpos_core::table::{validate_can_ungroup, validate_table_count, validate_table_group};
use kitchenpos_core::{CoreError, OrderTable, TableGroup};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::order::fetch_orders_by_table_ids;
use super::order_table::{fetch_tables_by_group_id, fetch_tables_by_ids};
use super::{expect_one_row, new_id};
use crate::error::DbResult;

#[derive(Debug, FromRow)]
struct TableGroupRow {
    id: String,
    created_date: DateTime<Utc>,
}

/// Repository for table group database operations.
#[derive(Debug, Clone)]
pub struct TableGroupRepository {
    pool: SqlitePool,
}

impl TableGroupRepository {
    /// Creates a new TableGroupRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TableGroupRepository { pool }
    }

    /// Groups the requested tables.
    ///
    /// ## Errors
    /// - `InsufficientTables` for fewer than two ids
    /// - `UnknownTable` when an id is unknown or repeated
    /// - `TableNotEmpty` when a table is occupied
    /// - `AlreadyGrouped` when a table already belongs to a group
    /// - `Conflict` when a table changed between the read and the write
    pub async fn create(&self, request: CreateTableGroupRequest) -> DbResult<TableGroup> {
        let requested = request.order_table_ids;
        validate_table_count(&requested)?;

        let mut tx = self.pool.begin().await?;

        let mut tables = fetch_tables_by_ids(&mut tx, &requested).await?;
        validate_table_group(&requested, &tables)?;

        let group = TableGroup {
            id: new_id(),
            created_date: Utc::now(),
            order_table_ids: requested,
        };

        debug!(id = %group.id, tables = group.order_table_ids.len(), "Inserting table group");

        sqlx::query("INSERT INTO table_groups (id, created_date) VALUES (?1, ?2)")
            .bind(&group.id)
            .bind(group.created_date)
            .execute(&mut *tx)
            .await?;

        for table in tables.iter_mut() {
            table.group_by(&group.id);
            join_group(&mut tx, &table.id, &group.id).await?;
        }

        for (position, table_id) in group.order_table_ids.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO table_group_members (table_group_id, order_table_id, position)
                VALUES (?1, ?2, ?3)
                "#,
            )
            .bind(&group.id)
            .bind(table_id)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(id = %group.id, tables = ?group.order_table_ids, "Table group created");
        Ok(group)
    }

    /// Releases every table of a group and returns them.
    ///
    /// ## Errors
    /// - `NotFound` when the group does not exist
    /// - `OpenOrderExists` when an order on any member is COOKING or MEAL
    /// - `Conflict` when an order was placed between the read and the write
    pub async fn ungroup(&self, table_group_id: &str) -> DbResult<Vec<OrderTable>> {
        let mut tx = self.pool.begin().await?;

        if fetch_group_row(&mut tx, table_group_id).await?.is_none() {
            return Err(CoreError::not_found("TableGroup", table_group_id).into());
        }

        let mut tables = fetch_tables_by_group_id(&mut tx, table_group_id).await?;
        let table_ids: Vec<String> = tables.iter().map(|t| t.id.clone()).collect();
        let orders = fetch_orders_by_table_ids(&mut tx, &table_ids).await?;

        validate_can_ungroup(&orders)?;

        for table in tables.iter_mut() {
            table.ungroup();
            leave_group(&mut tx, &table.id, table_group_id).await?;
        }

        tx.commit().await?;

        info!(id = %table_group_id, tables = tables.len(), "Table group dissolved");
        Ok(tables)
    }

    /// Gets a table group with the ids it was created from.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<TableGroup>> {
        let mut conn = self.pool.acquire().await?;

        let Some(row) = fetch_group_row(&mut conn, id).await? else {
            return Ok(None);
        };

        let order_table_ids: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT order_table_id FROM table_group_members
            WHERE table_group_id = ?1
            ORDER BY position
            "#,
        )
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(Some(TableGroup {
            id: row.id,
            created_date: row.created_date,
            order_table_ids,
        }))
    }
}

/// Links an empty, ungrouped table to a group and seats it.
async fn join_group(conn: &mut SqliteConnection, table_id: &str, table_group_id: &str) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE order_tables SET table_group_id = ?2, empty = 0
        WHERE id = ?1 AND table_group_id IS NULL AND empty = 1
        "#,
    )
    .bind(table_id)
    .bind(table_group_id)
    .execute(&mut *conn)
    .await?;

    expect_one_row(result, "OrderTable", table_id)
}

/// Unlinks a member table while none of its orders is open.
async fn leave_group(conn: &mut SqliteConnection, table_id: &str, table_group_id: &str) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE order_tables SET table_group_id = NULL
        WHERE id = ?1
          AND table_group_id = ?2
          AND NOT EXISTS (
              SELECT 1 FROM orders
              WHERE order_table_id = ?1 AND order_status IN ('COOKING', 'MEAL')
          )
        "#,
    )
    .bind(table_id)
    .bind(table_group_id)
    .execute(&mut *conn)
    .await?;

    expect_one_row(result, "OrderTable", table_id)
}

async fn fetch_group_row(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<TableGroupRow>> {
    let row = sqlx::query_as("SELECT id, created_date FROM table_groups WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures;
    use crate::{Database, DbError};
    use kitchenpos_core::command::{ChangeEmptyRequest, ChangeOrderStatusRequest};
    use kitchenpos_core::OrderStatus;

    async fn group(db: &Database, ids: &[&str]) -> DbResult<TableGroup> {
        db.table_groups()
            .create(CreateTableGroupRequest {
                order_table_ids: ids.iter().map(|id| id.to_string()).collect(),
            })
            .await
    }

    #[tokio::test]
    async fn test_group_marks_tables_occupied() {
        let db = fixtures::db().await;
        let t1 = fixtures::table(&db, true).await;
        let t2 = fixtures::table(&db, true).await;

        let created = group(&db, &[&t1.id, &t2.id]).await.unwrap();
        assert_eq!(created.order_table_ids, vec![t1.id.clone(), t2.id.clone()]);

        for id in [&t1.id, &t2.id] {
            let table = db.order_tables().get_by_id(id).await.unwrap().unwrap();
            assert_eq!(table.table_group_id.as_deref(), Some(created.id.as_str()));
            assert!(!table.empty);
        }

        let loaded = db.table_groups().get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, created.id);
        assert_eq!(loaded.order_table_ids, created.order_table_ids);
    }

    #[tokio::test]
    async fn test_group_rejects_occupied_table() {
        let db = fixtures::db().await;
        let t1 = fixtures::table(&db, true).await;
        let t2 = fixtures::table(&db, false).await;

        let err = group(&db, &[&t1.id, &t2.id]).await.unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(CoreError::TableNotEmpty { table_id }) if *table_id == t2.id
        ));

        let t1 = db.order_tables().get_by_id(&t1.id).await.unwrap().unwrap();
        assert!(t1.table_group_id.is_none());
        assert!(t1.empty);
    }

    #[tokio::test]
    async fn test_group_rejects_bad_id_lists() {
        let db = fixtures::db().await;
        let t1 = fixtures::table(&db, true).await;

        let err = group(&db, &[&t1.id]).await.unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(CoreError::InsufficientTables { requested: 1, min: 2 })
        ));

        let err = group(&db, &[&t1.id, "missing"]).await.unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(CoreError::UnknownTable { requested: 2, found: 1 })
        ));

        let err = group(&db, &[&t1.id, &t1.id]).await.unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(CoreError::UnknownTable { .. })
        ));
    }

    #[tokio::test]
    async fn test_table_cannot_join_two_groups() {
        let db = fixtures::db().await;
        let t1 = fixtures::table(&db, true).await;
        let t2 = fixtures::table(&db, true).await;
        let t3 = fixtures::table(&db, true).await;

        group(&db, &[&t1.id, &t2.id]).await.unwrap();

        // Grouping clears the empty flag, so the occupied check fires first.
        let err = group(&db, &[&t2.id, &t3.id]).await.unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(CoreError::TableNotEmpty { .. })
        ));

        let t3 = db.order_tables().get_by_id(&t3.id).await.unwrap().unwrap();
        assert!(t3.table_group_id.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_grouping_of_same_tables() {
        let db = fixtures::db().await;
        let t1 = fixtures::table(&db, true).await;
        let t2 = fixtures::table(&db, true).await;

        let ids = [t1.id.as_str(), t2.id.as_str()];
        let (a, b) = tokio::join!(group(&db, &ids), group(&db, &ids));

        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);

        let winner = a.or(b).unwrap();
        for id in ids {
            let table = db.order_tables().get_by_id(id).await.unwrap().unwrap();
            assert_eq!(table.table_group_id.as_deref(), Some(winner.id.as_str()));
        }
    }

    #[tokio::test]
    async fn test_join_conflicts_with_table_seated_after_read() {
        let db = fixtures::db().await;
        let t1 = fixtures::table(&db, true).await;
        let t2 = fixtures::table(&db, true).await;
        let ids = vec![t1.id.clone(), t2.id.clone()];

        let tables = db.order_tables().list().await.unwrap();
        validate_table_group(&ids, &tables).unwrap();

        db.order_tables()
            .change_empty(&t2.id, ChangeEmptyRequest { empty: false })
            .await
            .unwrap();

        {
            let mut tx = db.pool().begin().await.unwrap();
            sqlx::query("INSERT INTO table_groups (id, created_date) VALUES (?1, ?2)")
                .bind("g-stale")
                .bind(Utc::now())
                .execute(&mut *tx)
                .await
                .unwrap();

            join_group(&mut tx, &t1.id, "g-stale").await.unwrap();
            let err = join_group(&mut tx, &t2.id, "g-stale").await.unwrap_err();
            assert!(matches!(err, DbError::Conflict { ref id, .. } if *id == t2.id));
        }

        assert_eq!(db.order_tables().get_by_id(&t1.id).await.unwrap(), Some(t1));
        assert!(db.table_groups().get_by_id("g-stale").await.unwrap().is_none());
        let t2 = db.order_tables().get_by_id(&t2.id).await.unwrap().unwrap();
        assert!(t2.table_group_id.is_none());
    }

    #[tokio::test]
    async fn test_ungroup_releases_tables() {
        let db = fixtures::db().await;
        let t1 = fixtures::table(&db, true).await;
        let t2 = fixtures::table(&db, true).await;
        let created = group(&db, &[&t1.id, &t2.id]).await.unwrap();

        let released = db.table_groups().ungroup(&created.id).await.unwrap();
        assert_eq!(released.len(), 2);
        assert!(released.iter().all(|t| t.table_group_id.is_none()));

        for id in [&t1.id, &t2.id] {
            let table = db.order_tables().get_by_id(id).await.unwrap().unwrap();
            assert!(table.table_group_id.is_none());
            assert!(!table.empty);
        }

        // Membership history survives.
        let loaded = db.table_groups().get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(loaded.order_table_ids.len(), 2);
    }

    #[tokio::test]
    async fn test_ungroup_blocked_by_open_order() {
        let db = fixtures::db().await;
        let menu = fixtures::menu(&db).await;
        let t1 = fixtures::table(&db, true).await;
        let t2 = fixtures::table(&db, true).await;
        let created = group(&db, &[&t1.id, &t2.id]).await.unwrap();

        let order = fixtures::order(&db, &t1.id, &menu.id).await;
        db.orders()
            .change_status(&order.id, ChangeOrderStatusRequest { order_status: OrderStatus::Meal })
            .await
            .unwrap();

        let err = db.table_groups().ungroup(&created.id).await.unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(CoreError::OpenOrderExists { .. })
        ));
        for id in [&t1.id, &t2.id] {
            let table = db.order_tables().get_by_id(id).await.unwrap().unwrap();
            assert_eq!(table.table_group_id.as_deref(), Some(created.id.as_str()));
        }

        db.orders()
            .change_status(
                &order.id,
                ChangeOrderStatusRequest { order_status: OrderStatus::Completion },
            )
            .await
            .unwrap();

        let released = db.table_groups().ungroup(&created.id).await.unwrap();
        assert_eq!(released.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_group() {
        let db = fixtures::db().await;

        let err = db.table_groups().ungroup("missing").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(err, DbError::Domain(CoreError::NotFound { .. })));

        assert!(db.table_groups().get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_leave_conflicts_with_order_placed_after_read() {
        let db = fixtures::db().await;
        let menu = fixtures::menu(&db).await;
        let t1 = fixtures::table(&db, true).await;
        let t2 = fixtures::table(&db, true).await;
        let created = group(&db, &[&t1.id, &t2.id]).await.unwrap();

        validate_can_ungroup(&[]).unwrap();

        fixtures::order(&db, &t1.id, &menu.id).await;

        {
            let mut tx = db.pool().begin().await.unwrap();
            leave_group(&mut tx, &t2.id, &created.id).await.unwrap();
            let err = leave_group(&mut tx, &t1.id, &created.id).await.unwrap_err();
            assert!(matches!(err, DbError::Conflict { ref id, .. } if *id == t1.id));
        }

        for id in [&t1.id, &t2.id] {
            let table = db.order_tables().get_by_id(id).await.unwrap().unwrap();
            assert_eq!(table.table_group_id.as_deref(), Some(created.id.as_str()));
        }
    }
}
