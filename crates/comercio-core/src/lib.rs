//! # comercio-core: Pure Business Logic for Comercio POS
//!
//! This crate is the **heart** of Comercio POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Comercio POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 HTTP/UI Layer (separate repository)             │   │
//! │  │    catalog CRUD ──► sale capture ──► ledger screens            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ comercio-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐ │   │
//! │  │   │   types   │  │   money   │  │ allocation │  │ validation│ │   │
//! │  │   │   Sale    │  │   Money   │  │ FIFO plan  │  │   rules   │ │   │
//! │  │   │ Receivable│  │  (cents)  │  │ direct plan│  │  checks   │ │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  comercio-db (Database Layer)                   │   │
//! │  │        SQLite queries, migrations, transactional engine         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, Receivable, Payable, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`allocation`] - Pure payment-allocation planners (FIFO and direct)
//! - [`config`] - Engine policy configuration (credit days, overpayment)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocation;
pub mod config;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use comercio_core::Money` instead of
// `use comercio_core::money::Money`

pub use allocation::{AllocationEntry, AllocationPlan, DirectAllocation};
pub use config::{EngineConfig, OverpaymentPolicy};
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed in a single sale
///
/// ## Business Reason
/// Prevents runaway requests and ensures reasonable transaction sizes.
/// Can be made configurable per-store in future versions.
pub const MAX_SALE_LINES: usize = 100;

/// Maximum quantity of a single line item
///
/// ## Business Reason
/// Prevents accidental over-selling (e.g., typing 1000 instead of 10)
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Upper bound for credit terms, in days (10 years)
///
/// Anything above this is a typo, not a credit agreement.
pub const MAX_CREDIT_DAYS: u32 = 3650;
