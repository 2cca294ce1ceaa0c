//! # Sale Repository
//!
//! The sale unit of work: one transaction that records the sale header and
//! lines, moves stock, and (for credit sales) opens the receivable and
//! raises the client's debt.
//!
//! ## Unit of Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       create() - one transaction                        │
//! │                                                                         │
//! │  0. VALIDATE request (no mutation yet)                                 │
//! │     └── lines, totals, credit terms, client credit standing            │
//! │                                                                         │
//! │  1. INSERT sale header ──► generated sale id                           │
//! │                                                                         │
//! │  2. Per line, in order:                                                │
//! │     ├── read stock (fresh, inside the transaction)                     │
//! │     ├── INSERT sale_lines row                                          │
//! │     └── UPDATE products SET stock = stock - qty                        │
//! │              WHERE id = ? AND stock >= qty   ◄── guard                 │
//! │         insufficient stock ⇒ InsufficientStock, whole sale rolls back  │
//! │                                                                         │
//! │  3. Credit sale with client:                                           │
//! │     ├── resolve credit days (request → client → engine default)        │
//! │     ├── INSERT receivables row (amount = total, pending)               │
//! │     └── UPDATE clients SET debt = debt + total                         │
//! │                                                                         │
//! │  4. COMMIT - or nothing happened                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Duplicate submissions are the caller's responsibility; nothing here is
//! retried.

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use comercio_core::error::CoreError;
use comercio_core::validation::validate_new_sale;
use comercio_core::{EngineConfig, Money, NewSale, PaymentMethod, Sale, SaleLine};

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
    engine: EngineConfig,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool, engine: EngineConfig) -> Self {
        SaleRepository { pool, engine }
    }

    /// Records a sale as one atomic unit of work.
    ///
    /// See the module docs for the exact step order. Any failure - bad
    /// input, unknown product or client, insufficient stock, refused
    /// credit, store error - aborts the whole transaction; no partial
    /// stock change, line, receivable or debt movement is ever observable.
    ///
    /// ## Errors
    /// - `ValidationError` variants for malformed requests
    /// - `CreditSaleRequiresClient` for credit sales without a client
    /// - `CreditNotAllowed` / `CreditLimitExceeded` per the client record
    /// - `InsufficientStock` when a line would drive stock negative
    /// - `NotFound` for unknown products/clients
    /// - `ConcurrencyConflict` when a concurrent writer races a guard
    pub async fn create(&self, req: &NewSale) -> DbResult<Sale> {
        validate_new_sale(req).map_err(CoreError::from)?;

        let is_credit = req.payment_method == PaymentMethod::Credit;
        if is_credit && req.client_id.is_none() {
            // Accepting these would leave no receivable and no audit trail
            // of the unpaid amount.
            return Err(CoreError::CreditSaleRequiresClient.into());
        }

        let now = Utc::now();
        let total = Money::from_cents(req.total_cents);

        let mut tx = self.pool.begin().await?;

        // Pre-mutation credit checks, on fresh in-transaction reads.
        let mut credit_days: i64 = 0;
        if is_credit {
            let client_id = req.client_id.unwrap_or_default();
            let row: Option<(bool, i64, i64, i64)> = sqlx::query_as(
                r#"
                SELECT allow_credit, credit_limit_cents, default_credit_days, debt_cents
                FROM clients
                WHERE id = ?1
                "#,
            )
            .bind(client_id)
            .fetch_optional(&mut *tx)
            .await?;

            let (allow_credit, limit_cents, client_default_days, debt_cents) =
                row.ok_or_else(|| DbError::not_found("Client", client_id))?;

            if !allow_credit {
                return Err(CoreError::CreditNotAllowed { client_id }.into());
            }
            if limit_cents > 0 && debt_cents + req.total_cents > limit_cents {
                return Err(CoreError::CreditLimitExceeded {
                    client_id,
                    debt_cents,
                    sale_cents: req.total_cents,
                    limit_cents,
                }
                .into());
            }

            credit_days = self
                .engine
                .resolve_credit_days(req.credit_days, client_default_days)
                as i64;
        }

        // 1. Sale header.
        let result = sqlx::query(
            r#"
            INSERT INTO sales (client_id, total_cents, payment_method, credit_days, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(req.client_id)
        .bind(req.total_cents)
        .bind(req.payment_method)
        .bind(credit_days)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        let sale_id = result.last_insert_rowid();

        // 2. Lines and stock, in request order.
        for line in &req.lines {
            let stock: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
                .bind(line.product_id)
                .fetch_optional(&mut *tx)
                .await?;
            let available = stock.ok_or_else(|| DbError::not_found("Product", line.product_id))?;

            if available < line.quantity {
                return Err(CoreError::InsufficientStock {
                    product_id: line.product_id,
                    available,
                    requested: line.quantity,
                }
                .into());
            }

            sqlx::query(
                r#"
                INSERT INTO sale_lines (sale_id, product_id, quantity, unit_price_cents)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(sale_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .execute(&mut *tx)
            .await?;

            let updated = sqlx::query(
                "UPDATE products SET stock = stock - ?2 WHERE id = ?1 AND stock >= ?2",
            )
            .bind(line.product_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                // The guard re-checks what we just read; losing here means
                // another writer moved the stock in between.
                return Err(DbError::conflict("Product", line.product_id));
            }

            debug!(
                sale_id,
                product_id = line.product_id,
                quantity = line.quantity,
                "Sale line recorded"
            );
        }

        // 3. Receivable + balance aggregate for credit sales.
        if is_credit {
            let client_id = req.client_id.unwrap_or_default();
            let due_date = now + Duration::days(credit_days);
            let description = format!("Sale #{sale_id}");

            sqlx::query(
                r#"
                INSERT INTO receivables
                    (client_id, sale_id, amount_cents, initial_amount_cents,
                     due_date, status, description, created_at)
                VALUES (?1, ?2, ?3, ?3, ?4, 'pending', ?5, ?6)
                "#,
            )
            .bind(client_id)
            .bind(sale_id)
            .bind(req.total_cents)
            .bind(due_date)
            .bind(&description)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            sqlx::query("UPDATE clients SET debt_cents = debt_cents + ?2 WHERE id = ?1")
                .bind(client_id)
                .bind(req.total_cents)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        info!(
            sale_id,
            total = %total,
            method = ?req.payment_method,
            lines = req.lines.len(),
            "Sale committed"
        );

        Ok(Sale {
            id: sale_id,
            client_id: req.client_id,
            total_cents: req.total_cents,
            payment_method: req.payment_method,
            credit_days,
            created_at: now,
        })
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, client_id, total_cents, payment_method, credit_days, created_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Lists sales, newest first.
    pub async fn list(&self) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, client_id, total_cents, payment_method, credit_days, created_at
            FROM sales
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Gets all lines for a sale, in insertion order.
    pub async fn lines(&self, sale_id: i64) -> DbResult<Vec<SaleLine>> {
        let lines = sqlx::query_as::<_, SaleLine>(
            r#"
            SELECT id, sale_id, product_id, quantity, unit_price_cents
            FROM sale_lines
            WHERE sale_id = ?1
            ORDER BY id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }
}
