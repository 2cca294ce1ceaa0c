//! # Product Repository
//!
//! Catalog rows plus the inventory ledger.
//!
//! ## Stock Updates Are Deltas
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                                │
//! │                                                                         │
//! │  ❌ WRONG: Absolute update (loses concurrent sales)                    │
//! │     UPDATE products SET stock = 7 WHERE id = ?                         │
//! │                                                                         │
//! │  ✅ CORRECT: Guarded delta update                                      │
//! │     UPDATE products SET stock = stock - 3                              │
//! │     WHERE id = ? AND stock >= 3                                        │
//! │                                                                         │
//! │  Two handlers selling the same product cannot observe each other's     │
//! │  reads; the guard keeps the non-negative invariant regardless of       │
//! │  interleaving, and zero rows affected tells the caller it lost.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Enforcing "stock never goes negative on a sale" is the sale unit of
//! work's job, so the failure is reported before anything else in the same
//! sale commits; this repository only offers the guarded primitives.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use comercio_core::error::CoreError;
use comercio_core::{NewProduct, Product};

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

    /// Lists all products, sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, code, name, description, stock, cost_cents, price_cents, category, created_at
            FROM products
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, code, name, description, stock, cost_cents, price_cents, category, created_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its business code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, code, name, description, stock, cost_cents, price_cents, category, created_at
            FROM products
            WHERE code = ?1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product and returns it with its generated id.
    pub async fn insert(&self, new: &NewProduct) -> DbResult<Product> {
        debug!(name = %new.name, "Inserting product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO products (code, name, description, stock, cost_cents, price_cents, category, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&new.code)
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.stock)
        .bind(new.cost_cents)
        .bind(new.price_cents)
        .bind(&new.category)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Product {
            id: result.last_insert_rowid(),
            code: new.code.clone(),
            name: new.name.clone(),
            description: new.description.clone(),
            stock: new.stock,
            cost_cents: new.cost_cents,
            price_cents: new.price_cents,
            category: new.category.clone(),
            created_at: now,
        })
    }

    /// Updates an existing product's catalog fields.
    ///
    /// Does NOT touch `stock`; stock only moves via [`Self::adjust_stock`]
    /// or the sale unit of work.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                code = ?2,
                name = ?3,
                description = ?4,
                cost_cents = ?5,
                price_cents = ?6,
                category = ?7
            WHERE id = ?1
            "#,
        )
        .bind(product.id)
        .bind(&product.code)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.cost_cents)
        .bind(product.price_cents)
        .bind(&product.category)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product.id));
        }

        Ok(())
    }

    /// Deletes a product.
    ///
    /// Fails with a foreign-key violation if historical sale lines
    /// reference it.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Reads the current stock level.
    pub async fn stock(&self, id: i64) -> DbResult<i64> {
        let stock: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        stock.ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Adjusts stock by a delta (positive for restocking, negative for
    /// corrections).
    ///
    /// The guarded update refuses to drive stock negative; in that case the
    /// fresh stock level is reported in the error.
    pub async fn adjust_stock(&self, id: i64, delta: i64) -> DbResult<()> {
        debug!(id, delta, "Adjusting stock");

        let mut tx = self.pool.begin().await?;

        let stock: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let available = stock.ok_or_else(|| DbError::not_found("Product", id))?;

        if available + delta < 0 {
            return Err(CoreError::InsufficientStock {
                product_id: id,
                available,
                requested: -delta,
            }
            .into());
        }

        let result = sqlx::query(
            "UPDATE products SET stock = stock + ?2 WHERE id = ?1 AND stock + ?2 >= 0",
        )
        .bind(id)
        .bind(delta)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Another writer moved the stock between our read and update.
            return Err(DbError::conflict("Product", id));
        }

        tx.commit().await?;

        Ok(())
    }

    /// Counts products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
