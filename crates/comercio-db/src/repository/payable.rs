//! # Payable Repository
//!
//! Manual payable entries and the direct (non-FIFO) payment allocator.
//!
//! Unlike the receivable side, a payment targets one specific obligation,
//! so there is no cross-row coordination: the guarded amount update and its
//! audit-log insert just have to commit together.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use comercio_core::allocation::plan_direct;
use comercio_core::error::CoreError;
use comercio_core::validation::{validate_new_payable, validate_payment_amount};
use comercio_core::{
    EngineConfig, Money, NewPayable, ObligationStatus, Payable, PayableOutcome, PayablePayment,
};

/// Repository for payable database operations.
#[derive(Debug, Clone)]
pub struct PayableRepository {
    pool: SqlitePool,
    engine: EngineConfig,
}

impl PayableRepository {
    /// Creates a new PayableRepository.
    pub fn new(pool: SqlitePool, engine: EngineConfig) -> Self {
        PayableRepository { pool, engine }
    }

    /// Registers a payable obligation (manual entry).
    ///
    /// The remaining and initial amounts start equal; only the allocator
    /// moves the remaining amount afterwards.
    pub async fn create(&self, new: &NewPayable) -> DbResult<Payable> {
        validate_new_payable(new).map_err(CoreError::from)?;

        debug!(description = %new.description, "Creating payable");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO payables
                (supplier_id, payee, description, amount_cents, initial_amount_cents,
                 kind, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?4, ?5, 'pending', ?6)
            "#,
        )
        .bind(new.supplier_id)
        .bind(&new.payee)
        .bind(&new.description)
        .bind(new.amount_cents)
        .bind(new.kind)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Payable {
            id: result.last_insert_rowid(),
            supplier_id: new.supplier_id,
            payee: new.payee.clone(),
            description: new.description.clone(),
            amount_cents: new.amount_cents,
            initial_amount_cents: new.amount_cents,
            kind: new.kind,
            status: ObligationStatus::Pending,
            created_at: now,
        })
    }

    /// Applies a payment directly to one payable.
    ///
    /// One transaction: the guarded amount/status update and the audit-log
    /// insert commit together or not at all. A payment reaching the
    /// remaining amount settles the obligation (amount 0, status paid);
    /// beyond it the engine's overpayment policy decides between rejection
    /// (default) and absorption.
    ///
    /// ## Errors
    /// - `ValidationError` for non-positive amounts
    /// - `NotFound` when the payable is absent or already paid
    /// - `Overpayment` under the Reject policy
    /// - `ConcurrencyConflict` when a concurrent payment won the row
    pub async fn apply_payment(
        &self,
        payable_id: i64,
        amount_cents: i64,
    ) -> DbResult<PayableOutcome> {
        validate_payment_amount(amount_cents).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        let row: Option<(i64, ObligationStatus)> =
            sqlx::query_as("SELECT amount_cents, status FROM payables WHERE id = ?1")
                .bind(payable_id)
                .fetch_optional(&mut *tx)
                .await?;

        let (outstanding_cents, status) =
            row.ok_or_else(|| DbError::not_found("Payable", payable_id))?;

        if status == ObligationStatus::Paid {
            // Paid obligations are immutable; there is nothing to pay.
            return Err(DbError::not_found("Payable (pending)", payable_id));
        }

        let alloc = plan_direct(
            Money::from_cents(outstanding_cents),
            Money::from_cents(amount_cents),
            self.engine.overpayment_policy,
        )?;

        let new_status = if alloc.settled {
            ObligationStatus::Paid
        } else {
            ObligationStatus::Pending
        };

        let now = Utc::now();

        let updated = sqlx::query(
            r#"
            UPDATE payables
            SET amount_cents = ?2, status = ?3
            WHERE id = ?1 AND amount_cents = ?4 AND status = 'pending'
            "#,
        )
        .bind(payable_id)
        .bind(alloc.remaining.cents())
        .bind(new_status)
        .bind(outstanding_cents)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(DbError::conflict("Payable", payable_id));
        }

        sqlx::query(
            r#"
            INSERT INTO payable_payments (payable_id, amount_cents, created_at)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(payable_id)
        .bind(alloc.pay.cents())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            payable_id,
            paid = %alloc.pay,
            remaining = %alloc.remaining,
            settled = alloc.settled,
            "Payable payment applied"
        );

        Ok(PayableOutcome {
            status: new_status,
            remaining_cents: alloc.remaining.cents(),
        })
    }

    /// Gets a payable by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Payable>> {
        let payable = sqlx::query_as::<_, Payable>(
            r#"
            SELECT id, supplier_id, payee, description, amount_cents,
                   initial_amount_cents, kind, status, created_at
            FROM payables
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payable)
    }

    /// Lists all payables, oldest first.
    pub async fn list(&self) -> DbResult<Vec<Payable>> {
        let payables = sqlx::query_as::<_, Payable>(
            r#"
            SELECT id, supplier_id, payee, description, amount_cents,
                   initial_amount_cents, kind, status, created_at
            FROM payables
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(payables)
    }

    /// Payment history for one payable, newest first.
    pub async fn payment_history(&self, payable_id: i64) -> DbResult<Vec<PayablePayment>> {
        let payments = sqlx::query_as::<_, PayablePayment>(
            r#"
            SELECT id, payable_id, amount_cents, created_at
            FROM payable_payments
            WHERE payable_id = ?1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(payable_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }
}
