use std::fmt::{Debug, Display, Formatter};

use derive_more::Into;
use serde::Serialize;

/// Whole percent in `0..=100`.
#[must_use]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Into, Serialize)]
#[serde(into = "u8")]
pub struct Percent(u8);

impl Percent {
    pub const MIN: Self = Self(0);
    pub const MAX: Self = Self(100);

    /// Clamp the integer into the valid range in a `const` context.
    pub const fn saturating_const(value: u8) -> Self {
        if value > 100 { Self::MAX } else { Self(value) }
    }

    /// Clamp the integer into the valid range.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn saturating_from(value: i64) -> Self {
        Self(value.clamp(0, 100) as u8)
    }

    /// Drop the fractional part (toward zero) and clamp into the valid range. Never rounds.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn truncating_from(value: f64) -> Self {
        Self(value.trunc().clamp(0.0, 100.0) as u8)
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Display for Percent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl Debug for Percent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_toward_zero() {
        assert_eq!(Percent::truncating_from(59.99), Percent(59));
        assert_eq!(Percent::truncating_from(0.5), Percent(0));
        assert_eq!(Percent::truncating_from(-0.9), Percent(0));
    }

    #[test]
    fn clamps() {
        assert_eq!(Percent::truncating_from(-10.0), Percent::MIN);
        assert_eq!(Percent::truncating_from(130.0), Percent::MAX);
        assert_eq!(Percent::saturating_from(-1), Percent::MIN);
        assert_eq!(Percent::saturating_from(101), Percent::MAX);
    }

    #[test]
    fn serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Percent(42)).unwrap(), "42");
    }
}
