use std::{
    fmt,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};

/// Signed money amount represented as **integer minor units** (cents).
///
/// Use this type for **all** monetary values in the engine (expense totals,
/// owed shares, balances, transfer amounts) to avoid floating-point drift.
///
/// The value is signed:
/// - positive = is owed money (creditor)
/// - negative = owes money (debtor)
///
/// # Examples
///
/// ```rust
/// use engine::MoneyMinor;
///
/// let amount = MoneyMinor::new(12_34);
/// assert_eq!(amount.minor(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(transparent)]
pub struct MoneyMinor(i64);

impl MoneyMinor {
    pub const ZERO: MoneyMinor = MoneyMinor(0);

    /// Creates a new amount from integer minor units.
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Absolute value.
    #[must_use]
    pub const fn abs(self) -> MoneyMinor {
        MoneyMinor(self.0.abs())
    }

    /// Smaller of two amounts.
    #[must_use]
    pub fn min(self, other: MoneyMinor) -> MoneyMinor {
        MoneyMinor(self.0.min(other.0))
    }

    /// One equal share of this amount among `n` participants.
    ///
    /// Truncating integer division: the rounding remainder is **not**
    /// redistributed, so for `n` shares the aggregate may drift below the
    /// total by up to `n - 1` minor units.
    #[must_use]
    pub const fn split_equal(self, n: u32) -> MoneyMinor {
        MoneyMinor(self.0 / n as i64)
    }

    /// Applies a fixed-point ratio expressed in basis points
    /// (10_000 = 100%), truncating towards zero.
    #[must_use]
    pub fn apply_ratio_bp(self, ratio_bp: i64) -> MoneyMinor {
        let scaled = i128::from(self.0) * i128::from(ratio_bp) / 10_000;
        MoneyMinor(scaled as i64)
    }
}

impl fmt::Display for MoneyMinor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl From<i64> for MoneyMinor {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyMinor> for i64 {
    fn from(value: MoneyMinor) -> Self {
        value.0
    }
}

impl Add for MoneyMinor {
    type Output = MoneyMinor;

    fn add(self, rhs: MoneyMinor) -> Self::Output {
        MoneyMinor(self.0 + rhs.0)
    }
}

impl AddAssign for MoneyMinor {
    fn add_assign(&mut self, rhs: MoneyMinor) {
        self.0 += rhs.0;
    }
}

impl Sub for MoneyMinor {
    type Output = MoneyMinor;

    fn sub(self, rhs: MoneyMinor) -> Self::Output {
        MoneyMinor(self.0 - rhs.0)
    }
}

impl SubAssign for MoneyMinor {
    fn sub_assign(&mut self, rhs: MoneyMinor) {
        self.0 -= rhs.0;
    }
}

impl Neg for MoneyMinor {
    type Output = MoneyMinor;

    fn neg(self) -> Self::Output {
        MoneyMinor(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_two_decimals() {
        assert_eq!(MoneyMinor::new(0).to_string(), "0.00");
        assert_eq!(MoneyMinor::new(1).to_string(), "0.01");
        assert_eq!(MoneyMinor::new(10).to_string(), "0.10");
        assert_eq!(MoneyMinor::new(1050).to_string(), "10.50");
        assert_eq!(MoneyMinor::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn split_equal_truncates() {
        assert_eq!(MoneyMinor::new(3000).split_equal(3).minor(), 1000);
        // 10.00 over 3 participants: 3.33 each, 0.01 drift left over.
        assert_eq!(MoneyMinor::new(1000).split_equal(3).minor(), 333);
    }

    #[test]
    fn ratio_bp_is_fixed_point() {
        assert_eq!(MoneyMinor::new(1000).apply_ratio_bp(2500).minor(), 250);
        assert_eq!(MoneyMinor::new(1000).apply_ratio_bp(10_000).minor(), 1000);
        assert_eq!(MoneyMinor::new(999).apply_ratio_bp(3333).minor(), 332);
        assert_eq!(MoneyMinor::new(1000).apply_ratio_bp(0).minor(), 0);
    }
}
