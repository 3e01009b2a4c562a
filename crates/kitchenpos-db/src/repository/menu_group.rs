//! # Menu Group Repository
//!
//! Database operations for menu groups.

use chrono::Utc;
use kitchenpos_core::command::CreateMenuGroupRequest;
use kitchenpos_core::MenuGroup;
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::info;

use super::new_id;
use crate::error::DbResult;

#[derive(Debug, FromRow)]
struct MenuGroupRow {
    id: String,
    name: String,
}

impl From<MenuGroupRow> for MenuGroup {
    fn from(row: MenuGroupRow) -> Self {
        MenuGroup {
            id: row.id,
            name: row.name,
        }
    }
}

/// Repository for menu group database operations.
#[derive(Debug, Clone)]
pub struct MenuGroupRepository {
    pool: SqlitePool,
}

impl MenuGroupRepository {
    /// Creates a new MenuGroupRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MenuGroupRepository { pool }
    }

    /// Registers a menu group.
    pub async fn create(&self, request: CreateMenuGroupRequest) -> DbResult<MenuGroup> {
        let group = MenuGroup {
            id: new_id(),
            name: request.into_draft()?,
        };

        sqlx::query("INSERT INTO menu_groups (id, name, created_at) VALUES (?1, ?2, ?3)")
            .bind(&group.id)
            .bind(&group.name)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        info!(id = %group.id, name = %group.name, "Menu group created");
        Ok(group)
    }

    /// Lists all menu groups in registration order.
    pub async fn list(&self) -> DbResult<Vec<MenuGroup>> {
        let rows: Vec<MenuGroupRow> =
            sqlx::query_as("SELECT id, name FROM menu_groups ORDER BY created_at, rowid")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(MenuGroup::from).collect())
    }
}

/// Loads one menu group, if it exists.
pub(crate) async fn fetch_menu_group_by_id(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<MenuGroup>> {
    let row: Option<MenuGroupRow> = sqlx::query_as("SELECT id, name FROM menu_groups WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.map(MenuGroup::from))
}
