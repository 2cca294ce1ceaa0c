//! # Client Repository
//!
//! Client directory records plus reads of the debt balance aggregate.
//!
//! The `debt_cents` column is a cache of the sum of the client's pending
//! receivable amounts. This repository never moves it: the increment
//! belongs to the sale unit of work and the decrement to the FIFO
//! allocator, each inside its own transaction. What lives here are the
//! directory CRUD and fresh reads of the aggregate.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use comercio_core::{Client, Money, NewClient};

/// Repository for client database operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    /// Creates a new ClientRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ClientRepository { pool }
    }

    /// Lists all clients, sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, name, email, phone, address, credit_limit_cents,
                   allow_credit, default_credit_days, debt_cents, created_at
            FROM clients
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }

    /// Gets a client by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, name, email, phone, address, credit_limit_cents,
                   allow_credit, default_credit_days, debt_cents, created_at
            FROM clients
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(client)
    }

    /// Inserts a new client and returns it with its generated id.
    pub async fn insert(&self, new: &NewClient) -> DbResult<Client> {
        debug!(name = %new.name, "Inserting client");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO clients (name, email, phone, address, credit_limit_cents,
                                 allow_credit, default_credit_days, debt_cents, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8)
            "#,
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.address)
        .bind(new.credit_limit_cents)
        .bind(new.allow_credit)
        .bind(new.default_credit_days)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Client {
            id: result.last_insert_rowid(),
            name: new.name.clone(),
            email: new.email.clone(),
            phone: new.phone.clone(),
            address: new.address.clone(),
            credit_limit_cents: new.credit_limit_cents,
            allow_credit: new.allow_credit,
            default_credit_days: new.default_credit_days,
            debt_cents: 0,
            created_at: now,
        })
    }

    /// Updates a client's directory fields.
    ///
    /// `debt_cents` is deliberately excluded; the balance aggregate only
    /// moves inside the owning transactions.
    pub async fn update(&self, client: &Client) -> DbResult<()> {
        debug!(id = client.id, "Updating client");

        let result = sqlx::query(
            r#"
            UPDATE clients SET
                name = ?2,
                email = ?3,
                phone = ?4,
                address = ?5,
                credit_limit_cents = ?6,
                allow_credit = ?7,
                default_credit_days = ?8
            WHERE id = ?1
            "#,
        )
        .bind(client.id)
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.address)
        .bind(client.credit_limit_cents)
        .bind(client.allow_credit)
        .bind(client.default_credit_days)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Client", client.id));
        }

        Ok(())
    }

    /// Reads the client's current debt (fresh, never cached in-process).
    pub async fn debt(&self, id: i64) -> DbResult<Money> {
        let debt: Option<i64> = sqlx::query_scalar("SELECT debt_cents FROM clients WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        debt.map(Money::from_cents)
            .ok_or_else(|| DbError::not_found("Client", id))
    }

    /// Sums the client's pending receivable amounts.
    ///
    /// Diagnostic companion to [`Self::debt`]: the two must agree after
    /// every committed operation.
    pub async fn pending_receivable_total(&self, id: i64) -> DbResult<Money> {
        let total: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT SUM(amount_cents)
            FROM receivables
            WHERE client_id = ?1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Money::from_cents(total.unwrap_or(0)))
    }
}
