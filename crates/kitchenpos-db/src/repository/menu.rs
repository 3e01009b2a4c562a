//! # Menu Repository
//!
//! Database operations for menus.
//!
//! ## Create Flow
//! ```text
//! CreateMenuRequest
//!      │ into_draft()                 name, price, quantities
//!      ▼
//! BEGIN
//!      │ fetch_menu_group_by_id       ─┐
//!      │ fetch_products_by_ids         ├─ MenuDraft::assemble()
//!      │                              ─┘   InvalidReference / PriceExceedsComposition
//!      │ INSERT menus
//!      │ INSERT menu_products (position keeps submitted order)
//!      ▼
//! COMMIT
//! ```

use chrono::Utc;
use kitchenpos_core::command::CreateMenuRequest;
use kitchenpos_core::{Menu, MenuProduct};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use super::menu_group::fetch_menu_group_by_id;
use super::product::fetch_products_by_ids;
use super::{decode_price, new_id, placeholders};
use crate::error::DbResult;

#[derive(Debug, FromRow)]
struct MenuRow {
    id: String,
    name: String,
    price: String,
    menu_group_id: String,
}

#[derive(Debug, FromRow)]
struct MenuProductRow {
    menu_id: String,
    product_id: String,
    quantity: i64,
}

/// Repository for menu database operations.
#[derive(Debug, Clone)]
pub struct MenuRepository {
    pool: SqlitePool,
}

impl MenuRepository {
    /// Creates a new MenuRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MenuRepository { pool }
    }

    /// Registers a menu.
    ///
    /// ## Errors
    /// - `InvalidValue` for a blank name, missing/negative price, empty
    ///   product list or a quantity below 1
    /// - `InvalidReference` when the menu group or a product does not exist
    /// - `PriceExceedsComposition` when the price is above the product sum
    pub async fn create(&self, request: CreateMenuRequest) -> DbResult<Menu> {
        let draft = request.into_draft()?;

        let mut tx = self.pool.begin().await?;

        let group = fetch_menu_group_by_id(&mut tx, &draft.menu_group_id).await?;
        let products = fetch_products_by_ids(&mut tx, &draft.product_ids()).await?;
        let menu = draft.assemble(new_id(), group.as_ref(), &products)?;

        debug!(id = %menu.id, name = %menu.name, "Inserting menu");

        sqlx::query(
            r#"
            INSERT INTO menus (id, name, price, menu_group_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&menu.id)
        .bind(&menu.name)
        .bind(menu.price.value().to_string())
        .bind(&menu.menu_group_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        for (position, line) in menu.menu_products.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO menu_products (menu_id, position, product_id, quantity)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(&menu.id)
            .bind(position as i64)
            .bind(&line.product_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            id = %menu.id,
            menu_group_id = %menu.menu_group_id,
            price = %menu.price,
            products = menu.menu_products.len(),
            "Menu created"
        );
        Ok(menu)
    }

    /// Lists all menus with their products, in registration order.
    pub async fn list(&self) -> DbResult<Vec<Menu>> {
        let mut conn = self.pool.acquire().await?;

        let rows: Vec<MenuRow> = sqlx::query_as(
            "SELECT id, name, price, menu_group_id FROM menus ORDER BY created_at, rowid",
        )
        .fetch_all(&mut *conn)
        .await?;

        let product_rows: Vec<MenuProductRow> = sqlx::query_as(
            "SELECT menu_id, product_id, quantity FROM menu_products ORDER BY menu_id, position",
        )
        .fetch_all(&mut *conn)
        .await?;

        let mut lines: HashMap<String, Vec<MenuProduct>> = HashMap::new();
        for row in product_rows {
            lines.entry(row.menu_id).or_default().push(MenuProduct {
                product_id: row.product_id,
                quantity: row.quantity,
            });
        }

        rows.into_iter()
            .map(|row| {
                let price = decode_price("Menu", &row.id, &row.price)?;
                let menu_products = lines.remove(&row.id).unwrap_or_default();
                Ok(Menu {
                    id: row.id,
                    name: row.name,
                    price,
                    menu_group_id: row.menu_group_id,
                    menu_products,
                })
            })
            .collect()
    }

    /// Counts menus (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM menus")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Returns which of `ids` name an existing menu.
pub(crate) async fn fetch_existing_menu_ids(
    conn: &mut SqliteConnection,
    ids: &[String],
) -> DbResult<HashSet<String>> {
    if ids.is_empty() {
        return Ok(HashSet::new());
    }

    let sql = format!("SELECT id FROM menus WHERE id IN ({})", placeholders(ids.len()));
    let mut query = sqlx::query_scalar::<_, String>(&sql);
    for id in ids {
        query = query.bind(id);
    }

    Ok(query.fetch_all(&mut *conn).await?.into_iter().collect())
}
