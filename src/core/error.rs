use derive_more::{Display, Error};

use crate::quantity::{energy::KilowattHours, power::Kilowatts, time::Hours};

/// Input rejected by the battery model.
///
/// These are never coerced into something valid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, Error)]
pub enum InvalidInput {
    #[display("battery ID must not be empty")]
    EmptyId,

    #[display("capacity must be positive, got {capacity}")]
    NonPositiveCapacity { capacity: KilowattHours },

    #[display("maximum power must be positive, got {max_power}")]
    NonPositiveMaxPower { max_power: Kilowatts },

    #[display("cycle count must be non-negative, got {cycles}")]
    NegativeCycles { cycles: ordered_float::OrderedFloat<f64> },

    #[display("duration must be positive, got {duration}")]
    NonPositiveDuration { duration: Hours },

    #[display("power must be non-zero and finite, got {power}")]
    InvalidPower { power: Kilowatts },

    #[display("charging requires positive power, got {power}")]
    NotCharging { power: Kilowatts },

    #[display("discharging requires negative power, got {power}")]
    NotDischarging { power: Kilowatts },
}
