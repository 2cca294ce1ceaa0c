//! # Error Types
//!
//! Domain-specific error types for comercio-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  comercio-core errors (this file)                                      │
//! │  ├── CoreError        - Business-rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  comercio-db errors (separate crate)                                   │
//! │  └── DbError          - Store failures, not-found, conflicts           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → HTTP layer              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (ids, amounts)
//! 3. Errors are enum variants, never String
//! 4. Every failure aborts its whole transaction; nothing partially commits

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. They are raised before
/// (or instead of) a commit; the db layer translates them into a full
/// rollback of the active unit of work.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Insufficient stock to complete a sale.
    ///
    /// ## When This Occurs
    /// A sale line would drive the product's stock below zero. Raised
    /// inside the sale unit of work so that nothing else in the same sale
    /// is observable afterwards.
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: i64,
        available: i64,
        requested: i64,
    },

    /// A credit sale was submitted without an identified client.
    ///
    /// The alternative - accepting the sale with no receivable and no audit
    /// trail of the unpaid amount - loses money silently, so it is rejected.
    #[error("Credit sales require an identified client")]
    CreditSaleRequiresClient,

    /// The client's directory record does not allow buying on credit.
    #[error("Client {client_id} is not allowed to buy on credit")]
    CreditNotAllowed { client_id: i64 },

    /// The sale would push the client past their credit limit.
    #[error("Credit limit exceeded for client {client_id}: debt {debt_cents} + sale {sale_cents} > limit {limit_cents}")]
    CreditLimitExceeded {
        client_id: i64,
        debt_cents: i64,
        sale_cents: i64,
        limit_cents: i64,
    },

    /// Payment exceeds the outstanding amount and the engine is configured
    /// to reject rather than absorb the excess.
    ///
    /// See [`crate::config::OverpaymentPolicy`].
    #[error("Payment of {requested_cents} exceeds outstanding {outstanding_cents}")]
    Overpayment {
        requested_cents: i64,
        outstanding_cents: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when a request value doesn't meet requirements. Raised
/// before any mutation runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Too many entries in a collection field.
    #[error("{field} must have at most {max} entries")]
    TooMany { field: String, max: usize },

    /// The declared sale total does not match the sum of its lines.
    #[error("Declared total {declared_cents} does not match line sum {computed_cents}")]
    TotalMismatch {
        declared_cents: i64,
        computed_cents: i64,
    },

    /// Arithmetic overflow while checking a request (absurd quantities).
    #[error("{field} overflows money arithmetic")]
    Overflow { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
