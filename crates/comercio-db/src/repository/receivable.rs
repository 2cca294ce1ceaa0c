//! # Receivable Repository
//!
//! The FIFO payment allocator plus ledger/audit reads.
//!
//! ## Allocation Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │            apply_client_payment() - one transaction                     │
//! │                                                                         │
//! │  1. Load client (fresh debt) ── NotFound if absent                     │
//! │  2. Load pending receivables ORDER BY created_at, id                   │
//! │  3. plan_fifo() in comercio-core decides the split (pure, no I/O)      │
//! │  4. Per plan entry:                                                    │
//! │     ├── UPDATE receivables SET amount = new, status = ...              │
//! │     │        WHERE id = ? AND amount = previous AND status='pending'   │
//! │     │   zero rows ⇒ a concurrent payment touched the same row:        │
//! │     │   ConcurrencyConflict, whole transaction rolls back             │
//! │     └── INSERT receivable_payments audit row                          │
//! │  5. UPDATE clients SET debt = debt - total_paid                        │
//! │  6. COMMIT                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The guard in step 4 is optimistic per-row versioning with the remaining
//! amount acting as the version: two allocators racing on the same client
//! cannot both win, so an obligation can never be double-spent. The loser
//! surfaces `ConcurrencyConflict`; retrying is the caller's decision.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use comercio_core::allocation::{plan_fifo, Outstanding};
use comercio_core::error::CoreError;
use comercio_core::validation::validate_payment_amount;
use comercio_core::{
    EngineConfig, Money, ObligationStatus, PaymentOutcome, Receivable, ReceivablePayment,
};

/// Repository for receivable database operations.
#[derive(Debug, Clone)]
pub struct ReceivableRepository {
    pool: SqlitePool,
    engine: EngineConfig,
}

impl ReceivableRepository {
    /// Creates a new ReceivableRepository.
    pub fn new(pool: SqlitePool, engine: EngineConfig) -> Self {
        ReceivableRepository { pool, engine }
    }

    /// Applies a client payment across their pending receivables, oldest
    /// first.
    ///
    /// Decrements the client's debt by the amount actually allocated
    /// (`total_paid`), never by the requested amount. Under the default
    /// [`Reject`](comercio_core::OverpaymentPolicy::Reject) policy a payment
    /// exceeding the outstanding total fails before any mutation; under
    /// `Absorb` the excess is dropped and `total_paid` reports the
    /// difference - with nothing pending that is a zero-allocation success.
    pub async fn apply_client_payment(
        &self,
        client_id: i64,
        amount_cents: i64,
    ) -> DbResult<PaymentOutcome> {
        validate_payment_amount(amount_cents).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM clients WHERE id = ?1")
            .bind(client_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(DbError::not_found("Client", client_id));
        }

        // Oldest first; row ids are monotonic so the tie-break is stable.
        let pending: Vec<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT id, amount_cents
            FROM receivables
            WHERE client_id = ?1 AND status = 'pending'
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(client_id)
        .fetch_all(&mut *tx)
        .await?;

        let outstanding: Vec<Outstanding> = pending
            .iter()
            .map(|&(id, cents)| Outstanding::new(id, Money::from_cents(cents)))
            .collect();

        let plan = plan_fifo(
            &outstanding,
            Money::from_cents(amount_cents),
            self.engine.overpayment_policy,
        )?;

        let now = Utc::now();

        for entry in &plan.entries {
            let status = if entry.settled {
                ObligationStatus::Paid
            } else {
                ObligationStatus::Pending
            };

            let updated = sqlx::query(
                r#"
                UPDATE receivables
                SET amount_cents = ?2, status = ?3
                WHERE id = ?1 AND amount_cents = ?4 AND status = 'pending'
                "#,
            )
            .bind(entry.obligation_id)
            .bind(entry.remaining.cents())
            .bind(status)
            .bind(entry.previous().cents())
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                return Err(DbError::conflict("Receivable", entry.obligation_id));
            }

            sqlx::query(
                r#"
                INSERT INTO receivable_payments (receivable_id, amount_cents, created_at)
                VALUES (?1, ?2, ?3)
                "#,
            )
            .bind(entry.obligation_id)
            .bind(entry.pay.cents())
            .bind(now)
            .execute(&mut *tx)
            .await?;

            debug!(
                receivable_id = entry.obligation_id,
                paid = %entry.pay,
                remaining = %entry.remaining,
                settled = entry.settled,
                "Receivable allocation applied"
            );
        }

        if plan.total_paid.is_positive() {
            sqlx::query("UPDATE clients SET debt_cents = debt_cents - ?2 WHERE id = ?1")
                .bind(client_id)
                .bind(plan.total_paid.cents())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        info!(
            client_id,
            requested = %Money::from_cents(amount_cents),
            total_paid = %plan.total_paid,
            settled = plan.settled(),
            "Client payment allocated"
        );

        Ok(PaymentOutcome {
            total_paid_cents: plan.total_paid.cents(),
            settled: plan.settled(),
            touched: plan.entries.len() as u32,
        })
    }

    /// Lists all receivables, oldest first.
    pub async fn list(&self) -> DbResult<Vec<Receivable>> {
        let receivables = sqlx::query_as::<_, Receivable>(
            r#"
            SELECT id, client_id, sale_id, amount_cents, initial_amount_cents,
                   due_date, status, description, created_at
            FROM receivables
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(receivables)
    }

    /// Lists one client's receivables, oldest first.
    pub async fn list_for_client(&self, client_id: i64) -> DbResult<Vec<Receivable>> {
        let receivables = sqlx::query_as::<_, Receivable>(
            r#"
            SELECT id, client_id, sale_id, amount_cents, initial_amount_cents,
                   due_date, status, description, created_at
            FROM receivables
            WHERE client_id = ?1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(receivables)
    }

    /// Payment history for one receivable, newest first.
    pub async fn payment_history(&self, receivable_id: i64) -> DbResult<Vec<ReceivablePayment>> {
        let payments = sqlx::query_as::<_, ReceivablePayment>(
            r#"
            SELECT id, receivable_id, amount_cents, created_at
            FROM receivable_payments
            WHERE receivable_id = ?1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(receivable_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }
}
