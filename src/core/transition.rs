use chrono::{DateTime, Local};

use crate::core::{
    battery::BatteryState,
    error::InvalidInput,
    request::ChargeRequest,
    warning::Warning,
};

/// Outcome of applying a request to a battery snapshot.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    /// Replacement for the stored record.
    pub state: BatteryState,

    pub warning: Option<Warning>,
}

impl Transition {
    pub fn try_new(
        state: &BatteryState,
        request: ChargeRequest,
        now: DateTime<Local>,
    ) -> Result<Self, InvalidInput> {
        let state = state.apply(request)?;
        let warning = Warning::detect(state.state_of_charge, now);
        Ok(Self { state, warning })
    }
}
