mod channel;
pub mod mqtt;
mod payload;

use std::time::Duration;

use tokio::time::timeout;

#[cfg(test)]
pub use self::channel::RecordingChannel;
pub use self::{
    channel::{Channel, LogChannel},
    payload::WarningPayload,
};
use crate::{
    core::{battery::BatteryId, warning::Warning},
    prelude::*,
};

/// Delivers state-of-charge warnings to the per-battery topic.
///
/// Delivery is best-effort: nothing here ever fails the caller.
pub struct WarningNotifier<C> {
    channel: C,
    publish_timeout: Duration,
}

impl<C: Channel> WarningNotifier<C> {
    pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(3);

    pub const fn new(channel: C) -> Self {
        Self { channel, publish_timeout: Self::DEFAULT_PUBLISH_TIMEOUT }
    }

    #[must_use]
    pub const fn with_publish_timeout(mut self, publish_timeout: Duration) -> Self {
        self.publish_timeout = publish_timeout;
        self
    }

    pub const fn channel(&self) -> &C {
        &self.channel
    }

    /// Needed to re-establish the connection.
    pub const fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    pub fn topic(battery_id: &BatteryId) -> String {
        format!("/warnings/{battery_id}")
    }

    #[instrument(skip_all, fields(battery_id = %battery_id, kind = %warning.kind))]
    pub async fn publish(&self, battery_id: &BatteryId, warning: &Warning) {
        if !self.channel.is_connected() {
            error!("the channel is not connected, dropping the warning");
            return;
        }
        match self.publish_fallible(battery_id, warning).await {
            Ok(()) => info!(%warning, "submitted"),
            Err(error) => warn!("failed to publish the warning: {error:#}"),
        }
    }

    async fn publish_fallible(&self, battery_id: &BatteryId, warning: &Warning) -> Result {
        let payload = serde_json::to_vec(&WarningPayload::from(warning))?;
        timeout(self.publish_timeout, self.channel.publish(&Self::topic(battery_id), payload))
            .await
            .context("timed out publishing the warning")?
    }
}
