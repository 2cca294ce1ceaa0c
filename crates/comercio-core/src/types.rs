//! # Domain Types
//!
//! Core domain types used throughout Comercio POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Catalog side                  Transaction side                         │
//! │  ┌─────────────┐               ┌──────────┐   ┌──────────────┐         │
//! │  │   Product   │◄──────────────│ SaleLine │◄──│     Sale     │         │
//! │  │  stock ≥ 0  │   decrements  └──────────┘   │  immutable   │         │
//! │  └─────────────┘                              └──────┬───────┘         │
//! │                                                      │ credit sales    │
//! │  ┌─────────────┐               ┌──────────────┐      │                 │
//! │  │   Client    │◄──────────────│  Receivable  │◄─────┘                 │
//! │  │ debt cache  │  Σ(pending)   │ FIFO-settled │                        │
//! │  └─────────────┘               └──────┬───────┘                        │
//! │                                       │ append-only                    │
//! │  ┌─────────────┐               ┌──────▼────────────┐                   │
//! │  │  Supplier   │◄─── Payable ──│ ReceivablePayment │                   │
//! │  └─────────────┘               │  PayablePayment   │                   │
//! │                                └───────────────────┘                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity carries a store-generated `i64` row id. Row ids are
//! monotonic per table, so `ORDER BY created_at, id` is a total, stable
//! ordering - exactly what the FIFO allocator needs for its tie-break.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was settled at the counter.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Paid in full at the counter.
    Cash,
    /// Sold on credit terms; opens a receivable against the client.
    Credit,
}

// =============================================================================
// Obligation Status
// =============================================================================

/// Lifecycle of a credit obligation (receivable or payable).
///
/// A `Pending` obligation carries a positive remaining amount and can be
/// reduced by the allocator. Once `Paid` it is immutable.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObligationStatus {
    Pending,
    Paid,
}

impl Default for ObligationStatus {
    fn default() -> Self {
        ObligationStatus::Pending
    }
}

// =============================================================================
// Payable Kind
// =============================================================================

/// What a payable obligation represents.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayableKind {
    /// A supplier invoice to be settled over time.
    Invoice,
    /// A one-off operating expense.
    Expense,
}

impl Default for PayableKind {
    fn default() -> Self {
        PayableKind::Invoice
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
///
/// The `stock` counter is the inventory ledger: it is only ever moved by
/// delta updates, and a committed sale must never drive it negative.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,

    /// Optional business code (barcode / internal reference).
    pub code: Option<String>,

    /// Display name shown to the cashier and on receipts.
    pub name: String,

    pub description: Option<String>,

    /// Current stock level. Invariant: never negative after a committed sale.
    pub stock: i64,

    /// Acquisition cost in cents (for margin reporting).
    pub cost_cents: i64,

    /// Sale price in cents.
    pub price_cents: i64,

    /// Free-text category label (the catalog directory owns the taxonomy).
    pub category: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Returns the sale price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the acquisition cost as Money.
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }
}

// =============================================================================
// Client
// =============================================================================

/// A known client with optional credit terms.
///
/// `debt_cents` is the balance aggregate: a cached running total that must
/// equal the sum of this client's pending receivable amounts after every
/// committed operation. Only the sale unit of work (increment) and the FIFO
/// allocator (decrement) may touch it.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,

    /// Credit ceiling in cents; 0 means no limit is enforced.
    pub credit_limit_cents: i64,

    /// Whether this client may buy on credit at all.
    pub allow_credit: bool,

    /// Client-specific credit terms; 0 falls through to the engine default.
    pub default_credit_days: i64,

    /// Cached outstanding balance. Derived; see the struct docs.
    pub debt_cents: i64,

    pub created_at: DateTime<Utc>,
}

impl Client {
    /// Returns the outstanding balance as Money.
    #[inline]
    pub fn debt(&self) -> Money {
        Money::from_cents(self.debt_cents)
    }

    /// Returns the credit limit as Money.
    #[inline]
    pub fn credit_limit(&self) -> Money {
        Money::from_cents(self.credit_limit_cents)
    }
}

// =============================================================================
// Supplier
// =============================================================================

/// A supplier in the directory. Payables may reference one.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale transaction. Immutable once committed.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: i64,

    /// Absent for walk-in customers.
    pub client_id: Option<i64>,

    pub total_cents: i64,
    pub payment_method: PaymentMethod,

    /// Effective credit terms in days; 0 for cash sales.
    pub credit_days: i64,

    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the sale total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Sale Line
// =============================================================================

/// A line item of a sale. Immutable, created only inside the sale
/// unit of work. The unit price is a snapshot taken at sale time.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLine {
    pub id: i64,
    pub sale_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

impl SaleLine {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Receivable
// =============================================================================

/// An amount owed to the business by a client, tied to an originating sale.
///
/// Created atomically with its sale; `amount_cents` is the *remaining*
/// amount and is reduced by the FIFO allocator until it reaches zero, at
/// which point the row is marked paid and becomes immutable.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receivable {
    pub id: i64,
    pub client_id: i64,
    pub sale_id: i64,

    /// Remaining amount in cents.
    pub amount_cents: i64,

    /// Original amount, frozen at creation.
    pub initial_amount_cents: i64,

    pub due_date: DateTime<Utc>,
    pub status: ObligationStatus,

    /// Human-readable reference to the originating sale ("Sale #42").
    pub description: String,

    pub created_at: DateTime<Utc>,
}

impl Receivable {
    /// Returns the remaining amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

/// Append-only audit record of a payment applied to a receivable.
/// Never mutated or deleted.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceivablePayment {
    pub id: i64,
    pub receivable_id: i64,
    pub amount_cents: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Payable
// =============================================================================

/// An amount owed by the business to a supplier or other payee.
///
/// Created standalone (manual entry); `amount_cents` is the remaining
/// amount, reduced by the direct allocator.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payable {
    pub id: i64,

    /// Supplier reference, when the payee is a known supplier.
    pub supplier_id: Option<i64>,

    /// Free-text payee for obligations outside the supplier directory.
    pub payee: Option<String>,

    pub description: String,

    /// Remaining amount in cents.
    pub amount_cents: i64,

    /// Original amount, frozen at creation.
    pub initial_amount_cents: i64,

    pub kind: PayableKind,
    pub status: ObligationStatus,
    pub created_at: DateTime<Utc>,
}

impl Payable {
    /// Returns the remaining amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

/// Append-only audit record of a payment applied to a payable.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayablePayment {
    pub id: i64,
    pub payable_id: i64,
    pub amount_cents: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Request Values
// =============================================================================
// Core operations take self-contained request values, never shared mutable
// state. The UI's cart is its own concern; by the time a request reaches
// the engine it is a plain value.

/// Request to record a sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSale {
    /// Absent means a walk-in customer (cash only).
    pub client_id: Option<i64>,

    /// Ordered line items.
    pub lines: Vec<NewSaleLine>,

    /// Declared total in cents; must equal the sum of the lines.
    pub total_cents: i64,

    pub payment_method: PaymentMethod,

    /// Explicit credit terms. `None` resolves through the client's default
    /// and then the engine default, in exactly one place.
    pub credit_days: Option<u32>,
}

/// One line of a [`NewSale`] request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSaleLine {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

impl NewSaleLine {
    /// Returns the line total, or `None` on arithmetic overflow.
    #[inline]
    pub fn line_total(&self) -> Option<Money> {
        Money::from_cents(self.unit_price_cents).checked_multiply_quantity(self.quantity)
    }
}

/// Request to register a payable obligation (manual entry).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPayable {
    pub supplier_id: Option<i64>,
    pub payee: Option<String>,
    pub description: String,
    pub amount_cents: i64,
    pub kind: PayableKind,
}

/// Request to create a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub code: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub stock: i64,
    pub cost_cents: i64,
    pub price_cents: i64,
    pub category: Option<String>,
}

/// Request to create a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClient {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub credit_limit_cents: i64,
    pub allow_credit: bool,
    pub default_credit_days: i64,
}

/// Request to create a supplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSupplier {
    pub name: String,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

// =============================================================================
// Operation Outcomes
// =============================================================================

/// Result of a client payment run through the FIFO allocator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PaymentOutcome {
    /// Amount actually allocated (never more than was outstanding).
    pub total_paid_cents: i64,

    /// Receivables driven to zero and marked paid.
    pub settled: u32,

    /// Receivables touched by the allocation (settled or reduced).
    pub touched: u32,
}

/// Result of a direct payment against a single payable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PayableOutcome {
    pub status: ObligationStatus,
    pub remaining_cents: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_obligation_status_default() {
        assert_eq!(ObligationStatus::default(), ObligationStatus::Pending);
    }

    #[test]
    fn test_payable_kind_default() {
        assert_eq!(PayableKind::default(), PayableKind::Invoice);
    }

    #[test]
    fn test_sale_line_total() {
        let line = SaleLine {
            id: 1,
            sale_id: 1,
            product_id: 7,
            quantity: 3,
            unit_price_cents: 250,
        };
        assert_eq!(line.line_total().cents(), 750);
    }

    #[test]
    fn test_new_sale_line_total_overflow() {
        let line = NewSaleLine {
            product_id: 1,
            quantity: i64::MAX,
            unit_price_cents: 2,
        };
        assert!(line.line_total().is_none());
    }

    #[test]
    fn test_payment_method_serde() {
        let json = serde_json::to_string(&PaymentMethod::Credit).unwrap();
        assert_eq!(json, "\"credit\"");
        let back: PaymentMethod = serde_json::from_str("\"cash\"").unwrap();
        assert_eq!(back, PaymentMethod::Cash);
    }
}
