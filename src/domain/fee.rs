//! Donation fee fraction and its integer arithmetic.
//!
//! The fee is a reduced rational `numerator / denominator` in `[0, 1)`. All
//! operations truncate toward zero and never overflow on the deduction side,
//! so a quoted amount is never over-promised.

use crate::domain::error::CharitySwapError;
use alloy_primitives::U256;
use std::fmt;
use std::str::FromStr;

/// Parts-per-million scale used by the on-chain CharitySwap contract.
pub const PPM: u64 = 1_000_000;

/// Donation share used when no fee is configured: 5%.
pub const DEFAULT_FEE_PPM: u64 = 50_000;

/// Fraction of every trade redirected to charity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DonationFee {
    numerator: u64,
    denominator: u64,
}

impl DonationFee {
    pub fn new(numerator: u64, denominator: u64) -> Result<Self, CharitySwapError> {
        if denominator == 0 || numerator >= denominator {
            return Err(CharitySwapError::InvalidFee {
                numerator,
                denominator,
            });
        }
        let divisor = gcd(numerator, denominator);
        Ok(Self {
            numerator: numerator / divisor,
            denominator: denominator / divisor,
        })
    }

    pub fn from_ppm(ppm: u64) -> Result<Self, CharitySwapError> {
        Self::new(ppm, PPM)
    }

    pub fn zero() -> Self {
        Self {
            numerator: 0,
            denominator: 1,
        }
    }

    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    pub fn denominator(&self) -> u64 {
        self.denominator
    }

    pub fn is_zero(&self) -> bool {
        self.numerator == 0
    }

    /// True when this fee equals `ppm` parts per million exactly.
    pub fn matches_ppm(&self, ppm: u64) -> bool {
        u128::from(self.numerator) * u128::from(PPM) == u128::from(ppm) * u128::from(self.denominator)
    }

    /// `floor(amount * (1 - F))`: what is left after the donation is taken.
    pub fn deduct(&self, amount: U256) -> U256 {
        let kept = self.denominator - self.numerator;
        mul_frac_floor(amount, kept, self.denominator)
    }

    /// `floor(amount * F)`: the donation carved out of `amount`.
    pub fn donation_on(&self, amount: U256) -> U256 {
        mul_frac_floor(amount, self.numerator, self.denominator)
    }

    /// `floor(amount / (1 - F))`: the gross amount whose deduction nets `amount`.
    ///
    /// Returns `None` when the result does not fit in 256 bits.
    pub fn gross_up(&self, amount: U256) -> Option<U256> {
        let kept = U256::from(self.denominator - self.numerator);
        let denominator = U256::from(self.denominator);
        let whole = (amount / kept).checked_mul(denominator)?;
        let part = (amount % kept) * denominator / kept;
        whole.checked_add(part)
    }
}

impl Default for DonationFee {
    fn default() -> Self {
        Self {
            numerator: 1,
            denominator: 20,
        }
    }
}

impl fmt::Display for DonationFee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Accepts `n/d` (`1/200`) or a percentage (`5%`, `0.5%`).
impl FromStr for DonationFee {
    type Err = CharitySwapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = |reason: &str| CharitySwapError::InvalidAmount {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        if let Some((num, den)) = s.split_once('/') {
            let numerator = num
                .trim()
                .parse::<u64>()
                .map_err(|_| invalid("numerator is not an unsigned integer"))?;
            let denominator = den
                .trim()
                .parse::<u64>()
                .map_err(|_| invalid("denominator is not an unsigned integer"))?;
            return Self::new(numerator, denominator);
        }

        if let Some(pct) = s.strip_suffix('%') {
            let pct = pct.trim();
            let (whole, frac) = pct.split_once('.').unwrap_or((pct, ""));
            if whole.is_empty() && frac.is_empty() {
                return Err(invalid("empty percentage"));
            }
            if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
                return Err(invalid("percentage must be a decimal number"));
            }
            if frac.len() > 6 {
                return Err(invalid("at most 6 fractional digits"));
            }
            let scale = 10u64.pow(frac.len() as u32);
            let whole: u64 = if whole.is_empty() {
                0
            } else {
                whole.parse().map_err(|_| invalid("percentage out of range"))?
            };
            let frac: u64 = if frac.is_empty() { 0 } else { frac.parse().unwrap_or(0) };
            let numerator = whole
                .checked_mul(scale)
                .and_then(|w| w.checked_add(frac))
                .ok_or_else(|| invalid("percentage out of range"))?;
            return Self::new(numerator, 100 * scale);
        }

        Err(invalid("expected a fraction like 1/200 or a percentage like 5%"))
    }
}

/// `floor(amount * num / den)` without widening, for `num <= den`.
fn mul_frac_floor(amount: U256, num: u64, den: u64) -> U256 {
    let num = U256::from(num);
    let den = U256::from(den);
    (amount / den) * num + (amount % den) * num / den
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}
