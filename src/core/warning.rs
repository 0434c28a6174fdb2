use std::fmt::{Display, Formatter};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::quantity::percent::Percent;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningKind {
    /// State-of-charge is above the safe band.
    High,

    /// State-of-charge is below the safe band.
    Low,
}

impl WarningKind {
    const HIGH_THRESHOLD: Percent = Percent::saturating_const(90);
    const LOW_THRESHOLD: Percent = Percent::saturating_const(10);

    /// Classify the state-of-charge. Both thresholds are exclusive.
    pub fn classify(state_of_charge: Percent) -> Option<Self> {
        if state_of_charge > Self::HIGH_THRESHOLD {
            Some(Self::High)
        } else if state_of_charge < Self::LOW_THRESHOLD {
            Some(Self::Low)
        } else {
            None
        }
    }
}

impl Display for WarningKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// State-of-charge left the safe band.
#[must_use]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Warning {
    pub kind: WarningKind,
    pub state_of_charge: Percent,
    pub detected_at: DateTime<Local>,
}

impl Warning {
    pub fn detect(state_of_charge: Percent, now: DateTime<Local>) -> Option<Self> {
        WarningKind::classify(state_of_charge).map(|kind| Self {
            kind,
            state_of_charge,
            detected_at: now,
        })
    }
}

impl Display for Warning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            WarningKind::High => {
                write!(f, "Current State of charge is over 90%: {}", self.state_of_charge)
            }
            WarningKind::Low => {
                write!(f, "Current State of charge is below 10%: {}", self.state_of_charge)
            }
        }
    }
}
