//! # Engine Configuration
//!
//! Policy knobs for the ledger engine. The original system buried two
//! different credit-day defaults in two layers and silently swallowed
//! overpayments; both behaviors are now a single explicit configuration
//! value each, resolved in exactly one place.

use serde::{Deserialize, Serialize};

// =============================================================================
// Overpayment Policy
// =============================================================================

/// What to do when a payment exceeds the outstanding amount.
///
/// Applies to both the client-side FIFO allocator (against the client's
/// whole pending set) and the payable allocator (against one row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverpaymentPolicy {
    /// Fail with [`crate::error::CoreError::Overpayment`] before any
    /// mutation. The default: an excess payment is almost always a typo.
    Reject,

    /// Allocate up to the outstanding total and drop the excess. This is
    /// the historical behavior; the caller can detect the shortfall by
    /// comparing `total_paid` with the requested amount.
    Absorb,
}

impl Default for OverpaymentPolicy {
    fn default() -> Self {
        OverpaymentPolicy::Reject
    }
}

// =============================================================================
// Engine Config
// =============================================================================

/// Ledger engine configuration.
///
/// ## Example
/// ```rust
/// use comercio_core::config::{EngineConfig, OverpaymentPolicy};
///
/// let config = EngineConfig::default()
///     .default_credit_days(45)
///     .overpayment_policy(OverpaymentPolicy::Absorb);
/// assert_eq!(config.default_credit_days, 45);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Credit terms applied when neither the sale request nor the client
    /// record specifies one. The single canonical default.
    pub default_credit_days: u32,

    /// See [`OverpaymentPolicy`].
    pub overpayment_policy: OverpaymentPolicy,
}

impl EngineConfig {
    /// Sets the default credit days.
    pub fn default_credit_days(mut self, days: u32) -> Self {
        self.default_credit_days = days;
        self
    }

    /// Sets the overpayment policy.
    pub fn overpayment_policy(mut self, policy: OverpaymentPolicy) -> Self {
        self.overpayment_policy = policy;
        self
    }

    /// Resolves the effective credit terms for a sale.
    ///
    /// Resolution order, first positive value wins:
    /// 1. the explicit request value (validated upstream),
    /// 2. the client's `default_credit_days`,
    /// 3. this config's `default_credit_days`.
    pub fn resolve_credit_days(&self, requested: Option<u32>, client_default: i64) -> u32 {
        if let Some(days) = requested {
            return days;
        }
        if client_default > 0 {
            return client_default as u32;
        }
        self.default_credit_days
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            default_credit_days: 30,
            overpayment_policy: OverpaymentPolicy::default(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.default_credit_days, 30);
        assert_eq!(config.overpayment_policy, OverpaymentPolicy::Reject);
    }

    #[test]
    fn test_resolve_credit_days_precedence() {
        let config = EngineConfig::default();

        // Explicit request wins over everything.
        assert_eq!(config.resolve_credit_days(Some(7), 60), 7);

        // Client default wins over the engine default.
        assert_eq!(config.resolve_credit_days(None, 60), 60);

        // Engine default is the last resort.
        assert_eq!(config.resolve_credit_days(None, 0), 30);
    }
}
