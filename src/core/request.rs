use std::fmt::{Display, Formatter};

use crate::{
    core::error::InvalidInput,
    quantity::{power::Kilowatts, time::Hours},
};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Direction {
    Charge,
    Discharge,
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Charge => write!(f, "charge"),
            Self::Discharge => write!(f, "discharge"),
        }
    }
}

/// Requested power applied for a duration.
///
/// Positive power charges the battery, negative power discharges it.
#[must_use]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ChargeRequest {
    power: Kilowatts,
    duration: Hours,
}

impl ChargeRequest {
    pub fn try_new(power: Kilowatts, duration: Hours) -> Result<Self, InvalidInput> {
        if !duration.is_finite() || duration <= Hours::ZERO {
            return Err(InvalidInput::NonPositiveDuration { duration });
        }
        if !power.is_finite() || power == Kilowatts::ZERO {
            return Err(InvalidInput::InvalidPower { power });
        }
        Ok(Self { power, duration })
    }

    /// Build the request from a duration in minutes, the unit the fleet API speaks.
    pub fn from_minutes(power: Kilowatts, minutes: f64) -> Result<Self, InvalidInput> {
        Self::try_new(power, Hours::from_minutes(minutes))
    }

    pub const fn power(self) -> Kilowatts {
        self.power
    }

    pub const fn duration(self) -> Hours {
        self.duration
    }

    pub fn direction(self) -> Direction {
        if self.power > Kilowatts::ZERO { Direction::Charge } else { Direction::Discharge }
    }
}
