//! # comercio-db: Database Layer for Comercio POS
//!
//! This crate provides database access for the Comercio POS backend and
//! owns every transaction boundary of the ledger engine. It uses SQLite
//! for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Comercio POS Data Flow                             │
//! │                                                                         │
//! │  HTTP layer (createSale, applyReceivablePayment, ...)                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    comercio-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  sale (UoW)   │    │  (embedded)  │  │   │
//! │  │   │               │◄───│  receivable   │    │ 001_init.sql │  │   │
//! │  │   │ SqlitePool    │    │  payable ...  │    │              │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │ pure planners                 │   │
//! │  │                        comercio-core                           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (WAL mode, foreign keys on)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (sale, receivable, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use comercio_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/comercio.db")).await?;
//!
//! let sale = db.sales().create(&new_sale).await?;
//! let outcome = db.receivables().apply_client_payment(client_id, 15_000).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::DbError;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::client::ClientRepository;
pub use repository::payable::PayableRepository;
pub use repository::product::ProductRepository;
pub use repository::receivable::ReceivableRepository;
pub use repository::sale::SaleRepository;
pub use repository::supplier::SupplierRepository;
