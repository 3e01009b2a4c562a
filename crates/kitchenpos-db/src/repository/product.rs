//! # Product Repository
//!
//! Database operations for products.
//!
//! Products are written once and never updated. Their price is stored as
//! decimal TEXT and re-validated on every read.

use chrono::Utc;
use kitchenpos_core::command::CreateProductRequest;
use kitchenpos_core::Product;
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::{decode_price, new_id, placeholders};
use crate::error::DbResult;

#[derive(Debug, FromRow)]
struct ProductRow {
    id: String,
    name: String,
    price: String,
}

impl ProductRow {
    fn into_product(self) -> DbResult<Product> {
        let price = decode_price("Product", &self.id, &self.price)?;
        Ok(Product {
            id: self.id,
            name: self.name,
            price,
        })
    }
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Registers a product.
    ///
    /// ## Errors
    /// - `InvalidValue` when the name is blank or the price is missing or negative
    pub async fn create(&self, request: CreateProductRequest) -> DbResult<Product> {
        let draft = request.into_draft()?;
        let product = Product {
            id: new_id(),
            name: draft.name,
            price: draft.price,
        };

        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, name, price, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.price.value().to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        info!(id = %product.id, price = %product.price, "Product created");
        Ok(product)
    }

    /// Lists all products in registration order.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            "SELECT id, name, price FROM products ORDER BY created_at, rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let row: Option<ProductRow> =
            sqlx::query_as("SELECT id, name, price FROM products WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(ProductRow::into_product).transpose()
    }

    /// Counts products (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Loads the products with the given ids. Unknown ids are skipped.
pub(crate) async fn fetch_products_by_ids(
    conn: &mut SqliteConnection,
    ids: &[String],
) -> DbResult<Vec<Product>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!(
        "SELECT id, name, price FROM products WHERE id IN ({})",
        placeholders(ids.len())
    );
    let mut query = sqlx::query_as::<_, ProductRow>(&sql);
    for id in ids {
        query = query.bind(id);
    }

    let rows = query.fetch_all(&mut *conn).await?;
    rows.into_iter().map(ProductRow::into_product).collect()
}
