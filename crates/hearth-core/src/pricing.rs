//! # Pricing Policy
//!
//! The single source of tax, service charge and rounding rules.
//!
//! A policy is configured per tenant and a copy is frozen onto every order
//! when it opens, so changing the live rates never moves an open bill.
//!
//! ```text
//!   AppConfig ──► live PricingPolicy ──clone──► Order.policy ──► BillCalculator
//!                        ▲
//!                 PUT /config/pricing
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{OrderType, Rate};
use crate::validation::{validate_rate_bps, ValidationResult};

/// Default GST on restaurant service (5%).
pub const DEFAULT_TAX_BPS: u32 = 500;

/// Default service charge (5%).
pub const DEFAULT_SERVICE_CHARGE_BPS: u32 = 500;

/// Default ISO currency code.
pub const DEFAULT_CURRENCY: &str = "INR";

// =============================================================================
// Rounding Mode
// =============================================================================

/// How the grand total is rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum RoundingMode {
    /// Nearest whole major unit, half-up.
    NearestMajor,
    /// Keep paise as calculated.
    None,
}

impl RoundingMode {
    pub fn apply(&self, amount: Money) -> Money {
        match self {
            RoundingMode::NearestMajor => amount.round_to_major(),
            RoundingMode::None => amount,
        }
    }
}

impl Default for RoundingMode {
    fn default() -> Self {
        RoundingMode::NearestMajor
    }
}

// =============================================================================
// Pricing Policy
// =============================================================================

/// Tenant pricing rules consumed by [`crate::bill::BillCalculator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricingPolicy {
    pub tax_rate: Rate,
    pub service_charge_rate: Rate,
    /// Order types that attract a service charge.
    pub service_charge_order_types: Vec<OrderType>,
    /// Menu prices already include tax.
    pub tax_inclusive: bool,
    /// Tax the service charge as well as the discounted base.
    pub tax_on_service_charge: bool,
    pub rounding: RoundingMode,
    pub currency: String,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            tax_rate: Rate::from_bps(DEFAULT_TAX_BPS),
            service_charge_rate: Rate::from_bps(DEFAULT_SERVICE_CHARGE_BPS),
            service_charge_order_types: vec![OrderType::DineIn],
            tax_inclusive: false,
            tax_on_service_charge: true,
            rounding: RoundingMode::NearestMajor,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl PricingPolicy {
    /// Whether `order_type` pays a service charge under this policy.
    pub fn applies_service_charge(&self, order_type: OrderType) -> bool {
        !self.service_charge_rate.is_zero() && self.service_charge_order_types.contains(&order_type)
    }

    /// Checks rates and currency before the policy goes live.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_rate_bps("tax rate", self.tax_rate.bps())?;
        validate_rate_bps("service charge rate", self.service_charge_rate.bps())?;

        let currency = self.currency.trim();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ValidationError::InvalidFormat {
                field: "currency".to_string(),
                reason: "must be a 3-letter ISO code".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = PricingPolicy::default();
        assert_eq!(policy.tax_rate.bps(), 500);
        assert!(policy.applies_service_charge(OrderType::DineIn));
        assert!(!policy.applies_service_charge(OrderType::Takeaway));
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_zero_service_rate_never_applies() {
        let policy = PricingPolicy {
            service_charge_rate: Rate::zero(),
            ..PricingPolicy::default()
        };
        assert!(!policy.applies_service_charge(OrderType::DineIn));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let policy = PricingPolicy {
            tax_rate: Rate::from_bps(20_000),
            ..PricingPolicy::default()
        };
        assert!(policy.validate().is_err());

        let policy = PricingPolicy {
            currency: "rupee".to_string(),
            ..PricingPolicy::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_rounding_modes() {
        let amount = Money::from_paise(83_349);
        assert_eq!(RoundingMode::NearestMajor.apply(amount).paise(), 83_300);
        assert_eq!(RoundingMode::None.apply(amount), amount);
    }
}
