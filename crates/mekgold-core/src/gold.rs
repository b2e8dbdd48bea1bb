// crates/mekgold-core/src/gold.rs
//
// Fixed-point gold amount.
//
// Gold is tracked in hundredths ("cents"). Rates are configured with at most
// two decimals and settlements are floored to two decimals, so every value the
// engine persists is exact in cents. Accrual math runs on integer cents to
// avoid drift across many small collections.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// Number of cents in one gold.
pub const CENTS_PER_GOLD: u64 = 100;

/// An amount of gold, stored as integer cents.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Gold {
    /// Amount in hundredths of a gold.
    pub cents: u64,
}

impl Gold {
    /// Create an amount from a gold value, rounded to the nearest cent.
    ///
    /// Negative and non-finite inputs map to zero.
    ///
    /// # Example
    /// ```
    /// use mekgold_core::gold::Gold;
    /// let amount = Gold::from_gold(224.4);
    /// assert_eq!(amount.cents, 22_440);
    /// ```
    pub fn from_gold(amount: f64) -> Self {
        if !amount.is_finite() || amount <= 0.0 {
            return Self::zero();
        }
        Self {
            cents: (amount * CENTS_PER_GOLD as f64).round() as u64,
        }
    }

    /// Create an amount from whole gold.
    pub fn from_whole(gold: u64) -> Self {
        Self {
            cents: gold.saturating_mul(CENTS_PER_GOLD),
        }
    }

    /// Create an amount from cents.
    pub fn from_cents(cents: u64) -> Self {
        Self { cents }
    }

    /// Convert to gold as a floating-point value (for display and JSON).
    pub fn to_gold(&self) -> f64 {
        self.cents as f64 / CENTS_PER_GOLD as f64
    }

    /// Whole gold contained in this amount, fraction discarded.
    pub fn whole(&self) -> u64 {
        self.cents / CENTS_PER_GOLD
    }

    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }
}

impl Add for Gold {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            cents: self.cents.saturating_add(rhs.cents),
        }
    }
}

impl AddAssign for Gold {
    fn add_assign(&mut self, rhs: Self) {
        self.cents = self.cents.saturating_add(rhs.cents);
    }
}

impl Sub for Gold {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            cents: self.cents.saturating_sub(rhs.cents),
        }
    }
}

impl std::iter::Sum for Gold {
    fn sum<I: Iterator<Item = Gold>>(iter: I) -> Self {
        iter.fold(Gold::zero(), |acc, g| acc + g)
    }
}

impl fmt::Display for Gold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.cents / CENTS_PER_GOLD;
        let frac = self.cents % CENTS_PER_GOLD;
        if frac == 0 {
            write!(f, "{} gold", whole)
        } else {
            let frac_str = format!("{:02}", frac);
            write!(f, "{}.{} gold", whole, frac_str.trim_end_matches('0'))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_gold_rounds_to_cent() {
        assert_eq!(Gold::from_gold(1.0).cents, 100);
        assert_eq!(Gold::from_gold(2399.46).cents, 239_946);
        assert_eq!(Gold::from_gold(0.005).cents, 1);
    }

    #[test]
    fn test_from_gold_rejects_negative_and_nan() {
        assert!(Gold::from_gold(-5.0).is_zero());
        assert!(Gold::from_gold(f64::NAN).is_zero());
        assert!(Gold::from_gold(f64::INFINITY).is_zero());
    }

    #[test]
    fn test_to_gold() {
        let amount = Gold::from_cents(22_440);
        assert!((amount.to_gold() - 224.4).abs() < 1e-9);
        assert_eq!(amount.whole(), 224);
    }

    #[test]
    fn test_add_and_sum() {
        let total: Gold = [Gold::from_cents(150), Gold::from_whole(2), Gold::from_cents(5)]
            .into_iter()
            .sum();
        assert_eq!(total.cents, 355);

        let mut acc = Gold::zero();
        acc += Gold::from_cents(u64::MAX);
        acc += Gold::from_cents(1);
        assert_eq!(acc.cents, u64::MAX); // saturating
    }

    #[test]
    fn test_sub_saturating() {
        let c = Gold::from_whole(1) - Gold::from_whole(2);
        assert!(c.is_zero());
    }

    #[test]
    fn test_display() {
        assert_eq!(Gold::from_whole(42).to_string(), "42 gold");
        assert_eq!(Gold::from_cents(22_440).to_string(), "224.4 gold");
        assert_eq!(Gold::from_cents(5).to_string(), "0.05 gold");
        assert_eq!(Gold::zero().to_string(), "0 gold");
    }
}
