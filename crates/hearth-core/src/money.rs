//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In the browser:                                                        │
//! │    793.8 * 0.05 = 39.690000000000005  ❌                                │
//! │                                                                         │
//! │  OUR SOLUTION: Integer paise                                            │
//! │    79380 paise × 500 bps = 3969 paise  (exact)                          │
//! │    Rounding happens once, explicitly, at the grand total                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use hearth_core::money::Money;
//!
//! let price = Money::from_major_minor(420, 0); // ₹420.00
//! let line = price * 2;                         // ₹840.00
//! assert_eq!(line.paise(), 84_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use crate::types::Rate;

/// Minor units per major unit (100 paise = ₹1).
pub const MINOR_PER_MAJOR: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (paise for INR).
///
/// ## Design Decisions
/// - **i64 (signed)**: rounding adjustments and refunds can be negative
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - Serializes as a bare integer so the front-end receives paise
///
/// ## Where Money Flows
/// ```text
/// MenuItemRef.price ──► OrderItem.line_total ──► BillTotals.subtotal
///                                                     │
///                         discount / service / tax ◄──┘
///                                                     │
///                          BillTotals.grand_total ──► PaymentCollector
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    ///
    /// ## Example
    /// ```rust
    /// use hearth_core::money::Money;
    ///
    /// let price = Money::from_paise(42_050); // ₹420.50
    /// assert_eq!(price.paise(), 42_050);
    /// ```
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from rupees and paise.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -₹5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * MINOR_PER_MAJOR - minor)
        } else {
            Money(major * MINOR_PER_MAJOR + minor)
        }
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion (truncated toward zero).
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / MINOR_PER_MAJOR
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % MINOR_PER_MAJOR).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Clamps the value into `[min, max]`.
    ///
    /// Used for discount bounds and payment clamping. If `min > max`
    /// the lower bound wins.
    pub fn clamp_to(self, min: Money, max: Money) -> Money {
        if self.0 > max.0 {
            Money(max.0.max(min.0))
        } else if self.0 < min.0 {
            min
        } else {
            self
        }
    }

    /// Calculates `rate` of this amount, rounding half-up to the paisa.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`. The +5000 provides
    /// rounding (5000/10000 = 0.5). Negative amounts round symmetrically.
    ///
    /// ## Example
    /// ```rust
    /// use hearth_core::money::Money;
    /// use hearth_core::types::Rate;
    ///
    /// let base = Money::from_paise(79_380); // ₹793.80
    /// let tax = base.percent_of(Rate::from_bps(500)); // 5%
    /// assert_eq!(tax.paise(), 3_969); // ₹39.69
    /// ```
    pub fn percent_of(&self, rate: Rate) -> Money {
        let product = self.0 as i128 * rate.bps() as i128;
        let rounded = if product >= 0 {
            (product + 5_000) / 10_000
        } else {
            (product - 5_000) / 10_000
        };
        Money(rounded as i64)
    }

    /// Backs the tax component out of a tax-inclusive amount.
    ///
    /// `tax = amount × r / (1 + r)`, i.e. `amount × bps / (10000 + bps)`,
    /// rounded half-up to the paisa.
    ///
    /// ## Example
    /// ```rust
    /// use hearth_core::money::Money;
    /// use hearth_core::types::Rate;
    ///
    /// // ₹105.00 including 5% tax carries ₹5.00 of tax
    /// let tax = Money::from_paise(10_500).included_tax(Rate::from_bps(500));
    /// assert_eq!(tax.paise(), 500);
    /// ```
    pub fn included_tax(&self, rate: Rate) -> Money {
        if rate.is_zero() {
            return Money::zero();
        }
        let divisor = 10_000_i128 + rate.bps() as i128;
        let numerator = self.0 as i128 * rate.bps() as i128;
        let rounded = if numerator >= 0 {
            (numerator * 2 + divisor) / (divisor * 2)
        } else {
            (numerator * 2 - divisor) / (divisor * 2)
        };
        Money(rounded as i64)
    }

    /// Rounds to the nearest whole rupee, half-up (away from zero).
    ///
    /// ## Example
    /// ```rust
    /// use hearth_core::money::Money;
    ///
    /// assert_eq!(Money::from_paise(83_349).round_to_major().paise(), 83_300);
    /// assert_eq!(Money::from_paise(83_350).round_to_major().paise(), 83_400);
    /// ```
    pub fn round_to_major(&self) -> Money {
        let half = MINOR_PER_MAJOR / 2;
        let rounded = if self.0 >= 0 {
            (self.0 + half) / MINOR_PER_MAJOR
        } else {
            (self.0 - half) / MINOR_PER_MAJOR
        };
        Money(rounded * MINOR_PER_MAJOR)
    }

    /// Multiplies by a quantity, `None` on overflow.
    #[inline]
    pub const fn checked_mul(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }

    /// Adds, `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly rendering. The front-end formats with the tenant currency.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.rupees().abs(), self.paise_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paise() {
        let money = Money::from_paise(42_050);
        assert_eq!(money.paise(), 42_050);
        assert_eq!(money.rupees(), 420);
        assert_eq!(money.paise_part(), 50);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(10, 99).paise(), 1_099);
        assert_eq!(Money::from_major_minor(-5, 50).paise(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_paise(83_300).to_string(), "₹833.00");
        assert_eq!(Money::from_paise(-49).to_string(), "-₹0.49");
        assert_eq!(Money::zero().to_string(), "₹0.00");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_paise(1_000);
        let b = Money::from_paise(500);

        assert_eq!((a + b).paise(), 1_500);
        assert_eq!((a - b).paise(), 500);
        assert_eq!((a * 3).paise(), 3_000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.paise(), 2_000);
    }

    #[test]
    fn test_percent_of_rounds_half_up() {
        // ₹756.00 at 5% = ₹37.80
        assert_eq!(Money::from_paise(75_600).percent_of(Rate::from_bps(500)).paise(), 3_780);
        // 1 paisa at 50% = 0.5 paisa → 1
        assert_eq!(Money::from_paise(1).percent_of(Rate::from_bps(5_000)).paise(), 1);
        // Symmetric for negative amounts
        assert_eq!(Money::from_paise(-1).percent_of(Rate::from_bps(5_000)).paise(), -1);
    }

    #[test]
    fn test_included_tax() {
        assert_eq!(Money::from_paise(10_500).included_tax(Rate::from_bps(500)).paise(), 500);
        assert_eq!(Money::from_paise(10_000).included_tax(Rate::zero()).paise(), 0);
        // ₹100 incl. 5% → 4.7619 → ₹4.76
        assert_eq!(Money::from_paise(10_000).included_tax(Rate::from_bps(500)).paise(), 476);
    }

    #[test]
    fn test_round_to_major() {
        assert_eq!(Money::from_paise(83_349).round_to_major().paise(), 83_300);
        assert_eq!(Money::from_paise(83_350).round_to_major().paise(), 83_400);
        assert_eq!(Money::from_paise(-150).round_to_major().paise(), -200);
        assert_eq!(Money::zero().round_to_major(), Money::zero());
    }

    #[test]
    fn test_clamp_to() {
        let lo = Money::zero();
        let hi = Money::from_paise(500);
        assert_eq!(Money::from_paise(700).clamp_to(lo, hi), hi);
        assert_eq!(Money::from_paise(-10).clamp_to(lo, hi), lo);
        assert_eq!(Money::from_paise(250).clamp_to(lo, hi).paise(), 250);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());
        assert!(Money::from_paise(-1).is_negative());
        assert_eq!(Money::from_paise(-550).abs().paise(), 550);
    }

    #[test]
    fn test_checked_arithmetic() {
        let price = Money::from_paise(42_000);
        assert_eq!(price.checked_mul(3), Some(Money::from_paise(126_000)));
        assert_eq!(price.checked_add(price), Some(Money::from_paise(84_000)));
        assert_eq!(Money::from_paise(i64::MAX / 2).checked_mul(3), None);
        assert_eq!(Money::from_paise(i64::MAX).checked_add(Money::from_paise(1)), None);
    }
}
