use chrono::{DateTime, Local};
use serde::Serialize;

use crate::core::warning::Warning;

/// JSON body of a warning message.
#[derive(Serialize)]
pub struct WarningPayload {
    pub warning: String,
    pub timestamp: DateTime<Local>,
}

impl From<&Warning> for WarningPayload {
    fn from(warning: &Warning) -> Self {
        Self { warning: warning.to_string(), timestamp: warning.detected_at }
    }
}
