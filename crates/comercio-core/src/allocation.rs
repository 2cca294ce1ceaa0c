//! # Payment Allocation Planners
//!
//! Pure functions that decide how an incoming payment is spread across
//! outstanding obligations. The db layer loads the obligations, calls a
//! planner, and applies the resulting plan inside one transaction - the
//! arithmetic itself never touches I/O and is exhaustively unit-tested here.
//!
//! ## FIFO Allocation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Client pays 120                                                        │
//! │                                                                         │
//! │  Pending receivables (oldest first):                                   │
//! │    R1: amount 100  ──► pay 100 ──► remaining   0 ──► PAID              │
//! │    R2: amount  50  ──► pay  20 ──► remaining  30 ──► still pending     │
//! │    R3: amount  80  ──► untouched                                       │
//! │                                                                         │
//! │  total_paid = 120, client debt -= 120                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ordering is the caller's contract: the outstanding slice must already be
//! sorted oldest-first (creation date ascending, ties broken by ascending
//! id). Row ids are monotonic, so that ordering is total and stable.

use crate::config::OverpaymentPolicy;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;

// =============================================================================
// Plan Types
// =============================================================================

/// An outstanding obligation as seen by the planner: just its id and
/// remaining amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outstanding {
    pub id: i64,
    pub amount: Money,
}

impl Outstanding {
    pub const fn new(id: i64, amount: Money) -> Self {
        Outstanding { id, amount }
    }
}

/// One step of an allocation plan: apply `pay` to the obligation, leaving
/// `remaining`; `settled` means the obligation is to be marked paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationEntry {
    pub obligation_id: i64,

    /// Amount applied to this obligation (always positive).
    pub pay: Money,

    /// Remaining amount after applying `pay`.
    pub remaining: Money,

    /// True when `remaining` hit zero.
    pub settled: bool,
}

impl AllocationEntry {
    /// The obligation's amount before this entry is applied.
    ///
    /// The db layer uses this as the optimistic-versioning guard in its
    /// UPDATE (`WHERE amount = previous AND status = 'pending'`).
    #[inline]
    pub fn previous(&self) -> Money {
        self.remaining + self.pay
    }
}

/// A complete FIFO allocation: entries in application order plus the total
/// actually allocated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationPlan {
    pub entries: Vec<AllocationEntry>,
    pub total_paid: Money,
}

impl AllocationPlan {
    /// Number of obligations fully settled by this plan.
    pub fn settled(&self) -> u32 {
        self.entries.iter().filter(|e| e.settled).count() as u32
    }
}

/// Outcome of the single-row payable planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectAllocation {
    /// Amount applied to the obligation.
    pub pay: Money,

    /// Remaining amount after payment.
    pub remaining: Money,

    /// True when the obligation is fully settled.
    pub settled: bool,
}

// =============================================================================
// FIFO Planner
// =============================================================================

/// Plans the FIFO allocation of `payment` across `outstanding`.
///
/// Greedily consumes the payment oldest-first: for each obligation,
/// `pay = min(remaining_payment, obligation.amount)`. An obligation driven
/// to zero is marked settled. The plan's `total_paid` is the amount
/// actually allocated - with an empty outstanding set and an absorbing
/// policy it is zero.
///
/// ## Errors
/// - `ValidationError::MustBePositive` when `payment <= 0`
/// - `CoreError::Overpayment` when the payment exceeds the total
///   outstanding and `policy` is [`OverpaymentPolicy::Reject`]
///
/// ## Example
/// ```rust
/// use comercio_core::allocation::{plan_fifo, Outstanding};
/// use comercio_core::config::OverpaymentPolicy;
/// use comercio_core::money::Money;
///
/// let pending = [
///     Outstanding::new(1, Money::from_cents(100)),
///     Outstanding::new(2, Money::from_cents(50)),
/// ];
/// let plan = plan_fifo(&pending, Money::from_cents(120), OverpaymentPolicy::Reject).unwrap();
/// assert_eq!(plan.total_paid.cents(), 120);
/// assert!(plan.entries[0].settled);
/// assert_eq!(plan.entries[1].remaining.cents(), 30);
/// ```
pub fn plan_fifo(
    outstanding: &[Outstanding],
    payment: Money,
    policy: OverpaymentPolicy,
) -> CoreResult<AllocationPlan> {
    if !payment.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        }
        .into());
    }

    let total_outstanding = outstanding
        .iter()
        .fold(Money::zero(), |acc, o| acc + o.amount);

    if policy == OverpaymentPolicy::Reject && payment > total_outstanding {
        return Err(CoreError::Overpayment {
            requested_cents: payment.cents(),
            outstanding_cents: total_outstanding.cents(),
        });
    }

    let mut remaining_payment = payment;
    let mut entries = Vec::new();
    let mut total_paid = Money::zero();

    for obligation in outstanding {
        if !remaining_payment.is_positive() {
            break;
        }
        // Obligations at zero should not exist while pending, but a plan
        // must never emit a zero-amount entry for one.
        if !obligation.amount.is_positive() {
            continue;
        }

        let pay = remaining_payment.min(obligation.amount);
        let remaining = obligation.amount - pay;

        entries.push(AllocationEntry {
            obligation_id: obligation.id,
            pay,
            remaining,
            settled: remaining.is_zero(),
        });

        remaining_payment -= pay;
        total_paid += pay;
    }

    Ok(AllocationPlan {
        entries,
        total_paid,
    })
}

// =============================================================================
// Direct Planner
// =============================================================================

/// Plans a direct payment against a single obligation (payables).
///
/// `new_amount = outstanding - payment`; at or below zero the obligation is
/// settled with amount clamped to 0. The same overpayment policy applies at
/// single-row scope.
///
/// ## Errors
/// - `ValidationError::MustBePositive` when `payment <= 0`
/// - `CoreError::Overpayment` when `payment > outstanding` under
///   [`OverpaymentPolicy::Reject`]
pub fn plan_direct(
    outstanding: Money,
    payment: Money,
    policy: OverpaymentPolicy,
) -> CoreResult<DirectAllocation> {
    if !payment.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        }
        .into());
    }

    if policy == OverpaymentPolicy::Reject && payment > outstanding {
        return Err(CoreError::Overpayment {
            requested_cents: payment.cents(),
            outstanding_cents: outstanding.cents(),
        });
    }

    let pay = payment.min(outstanding);
    let remaining = outstanding - pay;

    Ok(DirectAllocation {
        pay,
        remaining,
        settled: remaining.is_zero(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn cents(v: i64) -> Money {
        Money::from_cents(v)
    }

    #[test]
    fn test_fifo_settles_oldest_first() {
        let pending = [
            Outstanding::new(1, cents(100)),
            Outstanding::new(2, cents(50)),
        ];

        let plan = plan_fifo(&pending, cents(120), OverpaymentPolicy::Reject).unwrap();

        assert_eq!(plan.total_paid, cents(120));
        assert_eq!(plan.entries.len(), 2);

        assert_eq!(plan.entries[0].obligation_id, 1);
        assert_eq!(plan.entries[0].pay, cents(100));
        assert_eq!(plan.entries[0].remaining, cents(0));
        assert!(plan.entries[0].settled);

        assert_eq!(plan.entries[1].obligation_id, 2);
        assert_eq!(plan.entries[1].pay, cents(20));
        assert_eq!(plan.entries[1].remaining, cents(30));
        assert!(!plan.entries[1].settled);

        assert_eq!(plan.settled(), 1);
    }

    #[test]
    fn test_fifo_partial_on_first() {
        let pending = [Outstanding::new(5, cents(200))];

        let plan = plan_fifo(&pending, cents(150), OverpaymentPolicy::Reject).unwrap();

        assert_eq!(plan.total_paid, cents(150));
        assert_eq!(plan.entries.len(), 1);
        assert_eq!(plan.entries[0].remaining, cents(50));
        assert!(!plan.entries[0].settled);
        assert_eq!(plan.entries[0].previous(), cents(200));
    }

    #[test]
    fn test_fifo_exact_payment_settles_everything() {
        let pending = [
            Outstanding::new(1, cents(100)),
            Outstanding::new(2, cents(50)),
            Outstanding::new(3, cents(25)),
        ];

        let plan = plan_fifo(&pending, cents(175), OverpaymentPolicy::Reject).unwrap();

        assert_eq!(plan.total_paid, cents(175));
        assert_eq!(plan.settled(), 3);
        assert!(plan.entries.iter().all(|e| e.settled));
    }

    #[test]
    fn test_fifo_leaves_later_obligations_untouched() {
        let pending = [
            Outstanding::new(1, cents(100)),
            Outstanding::new(2, cents(50)),
            Outstanding::new(3, cents(80)),
        ];

        let plan = plan_fifo(&pending, cents(100), OverpaymentPolicy::Reject).unwrap();

        // R3 never appears in the plan.
        assert_eq!(plan.entries.len(), 1);
        assert_eq!(plan.entries[0].obligation_id, 1);
    }

    #[test]
    fn test_fifo_overpayment_rejected() {
        let pending = [Outstanding::new(1, cents(100))];

        let err = plan_fifo(&pending, cents(150), OverpaymentPolicy::Reject).unwrap_err();

        match err {
            CoreError::Overpayment {
                requested_cents,
                outstanding_cents,
            } => {
                assert_eq!(requested_cents, 150);
                assert_eq!(outstanding_cents, 100);
            }
            other => panic!("expected Overpayment, got {other:?}"),
        }
    }

    #[test]
    fn test_fifo_overpayment_absorbed() {
        let pending = [Outstanding::new(1, cents(100))];

        let plan = plan_fifo(&pending, cents(150), OverpaymentPolicy::Absorb).unwrap();

        // Only the outstanding amount is allocated; the excess is dropped
        // and visible to the caller as total_paid < requested.
        assert_eq!(plan.total_paid, cents(100));
        assert_eq!(plan.settled(), 1);
    }

    #[test]
    fn test_fifo_empty_outstanding_absorb_is_noop() {
        let plan = plan_fifo(&[], cents(100), OverpaymentPolicy::Absorb).unwrap();
        assert_eq!(plan.total_paid, Money::zero());
        assert!(plan.entries.is_empty());
    }

    #[test]
    fn test_fifo_empty_outstanding_reject_errors() {
        let err = plan_fifo(&[], cents(100), OverpaymentPolicy::Reject).unwrap_err();
        assert!(matches!(err, CoreError::Overpayment { .. }));
    }

    #[test]
    fn test_fifo_zero_payment_invalid() {
        let pending = [Outstanding::new(1, cents(100))];
        let err = plan_fifo(&pending, Money::zero(), OverpaymentPolicy::Absorb).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_direct_partial() {
        let alloc = plan_direct(cents(300), cents(120), OverpaymentPolicy::Reject).unwrap();
        assert_eq!(alloc.pay, cents(120));
        assert_eq!(alloc.remaining, cents(180));
        assert!(!alloc.settled);
    }

    #[test]
    fn test_direct_exact_settles() {
        let alloc = plan_direct(cents(300), cents(300), OverpaymentPolicy::Reject).unwrap();
        assert_eq!(alloc.remaining, Money::zero());
        assert!(alloc.settled);
    }

    #[test]
    fn test_direct_overpayment_policies() {
        let err = plan_direct(cents(100), cents(150), OverpaymentPolicy::Reject).unwrap_err();
        assert!(matches!(err, CoreError::Overpayment { .. }));

        let alloc = plan_direct(cents(100), cents(150), OverpaymentPolicy::Absorb).unwrap();
        assert_eq!(alloc.pay, cents(100));
        assert_eq!(alloc.remaining, Money::zero());
        assert!(alloc.settled);
    }
}
