//! # Validation Module
//!
//! Request validation for the ledger engine. Runs before any mutation, so a
//! failed check never leaves partial state behind.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP layer (outside this workspace)                          │
//! │  ├── Shape checks, auth, casing adaptation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - request-value validation                       │
//! │  ├── Positive quantities/amounts, total integrity, credit terms        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / FOREIGN KEY constraints, guarded updates               │
//! │                                                                         │
//! │  Defense in depth: each layer catches different errors                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{NewPayable, NewSale};
use crate::{MAX_CREDIT_DAYS, MAX_LINE_QUANTITY, MAX_SALE_LINES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Sale Validation
// =============================================================================

/// Validates a sale request before the unit of work touches the store.
///
/// ## Rules
/// - at least one line, at most [`MAX_SALE_LINES`]
/// - every quantity in `1..=MAX_LINE_QUANTITY`, every unit price >= 0
/// - total positive and equal to the sum of the lines (the engine owns
///   arithmetic integrity; discounts belong to the outer layer)
/// - explicit credit days, when present, in `1..=MAX_CREDIT_DAYS`
pub fn validate_new_sale(sale: &NewSale) -> ValidationResult<()> {
    if sale.lines.is_empty() {
        return Err(ValidationError::Required {
            field: "lines".to_string(),
        });
    }

    if sale.lines.len() > MAX_SALE_LINES {
        return Err(ValidationError::TooMany {
            field: "lines".to_string(),
            max: MAX_SALE_LINES,
        });
    }

    let mut computed = Money::zero();
    for line in &sale.lines {
        if line.quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            });
        }
        if line.quantity > MAX_LINE_QUANTITY {
            return Err(ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 1,
                max: MAX_LINE_QUANTITY,
            });
        }
        if line.unit_price_cents < 0 {
            return Err(ValidationError::MustBePositive {
                field: "unitPrice".to_string(),
            });
        }

        let line_total = line.line_total().ok_or_else(|| ValidationError::Overflow {
            field: "quantity".to_string(),
        })?;
        computed = computed
            .checked_add(line_total)
            .ok_or_else(|| ValidationError::Overflow {
                field: "total".to_string(),
            })?;
    }

    if sale.total_cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "total".to_string(),
        });
    }

    if computed.cents() != sale.total_cents {
        return Err(ValidationError::TotalMismatch {
            declared_cents: sale.total_cents,
            computed_cents: computed.cents(),
        });
    }

    if let Some(days) = sale.credit_days {
        validate_credit_days(days)?;
    }

    Ok(())
}

/// Validates explicit credit terms.
///
/// A missing value falls through to configured defaults; a present but
/// out-of-range value is an error, never silently replaced.
pub fn validate_credit_days(days: u32) -> ValidationResult<()> {
    if days == 0 || days > MAX_CREDIT_DAYS {
        return Err(ValidationError::OutOfRange {
            field: "creditDays".to_string(),
            min: 1,
            max: MAX_CREDIT_DAYS as i64,
        });
    }
    Ok(())
}

// =============================================================================
// Payment Validation
// =============================================================================

/// Validates a payment amount (receivable and payable allocators).
pub fn validate_payment_amount(amount_cents: i64) -> ValidationResult<()> {
    if amount_cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Payable Validation
// =============================================================================

/// Validates a manual payable entry.
pub fn validate_new_payable(payable: &NewPayable) -> ValidationResult<()> {
    if payable.description.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "description".to_string(),
        });
    }

    if payable.amount_cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewSaleLine, PaymentMethod};

    fn sale(lines: Vec<NewSaleLine>, total: i64) -> NewSale {
        NewSale {
            client_id: None,
            lines,
            total_cents: total,
            payment_method: PaymentMethod::Cash,
            credit_days: None,
        }
    }

    fn line(qty: i64, price: i64) -> NewSaleLine {
        NewSaleLine {
            product_id: 1,
            quantity: qty,
            unit_price_cents: price,
        }
    }

    #[test]
    fn test_valid_sale() {
        assert!(validate_new_sale(&sale(vec![line(2, 100)], 200)).is_ok());
    }

    #[test]
    fn test_empty_lines_rejected() {
        let err = validate_new_sale(&sale(vec![], 0)).unwrap_err();
        assert!(matches!(err, ValidationError::Required { .. }));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let err = validate_new_sale(&sale(vec![line(0, 100)], 0)).unwrap_err();
        assert!(matches!(err, ValidationError::MustBePositive { .. }));
    }

    #[test]
    fn test_total_mismatch_rejected() {
        let err = validate_new_sale(&sale(vec![line(2, 100)], 150)).unwrap_err();
        match err {
            ValidationError::TotalMismatch {
                declared_cents,
                computed_cents,
            } => {
                assert_eq!(declared_cents, 150);
                assert_eq!(computed_cents, 200);
            }
            other => panic!("expected TotalMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_overflowing_line_rejected() {
        let err = validate_new_sale(&sale(vec![line(999, i64::MAX / 2)], 100)).unwrap_err();
        assert!(matches!(err, ValidationError::Overflow { .. }));
    }

    #[test]
    fn test_credit_days_bounds() {
        assert!(validate_credit_days(1).is_ok());
        assert!(validate_credit_days(30).is_ok());
        assert!(validate_credit_days(MAX_CREDIT_DAYS).is_ok());
        assert!(validate_credit_days(0).is_err());
        assert!(validate_credit_days(MAX_CREDIT_DAYS + 1).is_err());
    }

    #[test]
    fn test_payment_amount() {
        assert!(validate_payment_amount(1).is_ok());
        assert!(validate_payment_amount(0).is_err());
        assert!(validate_payment_amount(-5).is_err());
    }

    #[test]
    fn test_new_payable() {
        let ok = NewPayable {
            supplier_id: None,
            payee: Some("Electric Co".to_string()),
            description: "July electricity".to_string(),
            amount_cents: 12_000,
            kind: crate::types::PayableKind::Expense,
        };
        assert!(validate_new_payable(&ok).is_ok());

        let blank = NewPayable {
            description: "   ".to_string(),
            ..ok.clone()
        };
        assert!(validate_new_payable(&blank).is_err());

        let free = NewPayable {
            amount_cents: 0,
            ..ok
        };
        assert!(validate_new_payable(&free).is_err());
    }
}
