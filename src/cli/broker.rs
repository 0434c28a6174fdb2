use clap::Parser;

use crate::{
    notify::{
        Channel,
        WarningNotifier,
        mqtt::{BrokerConfig, MqttChannel},
    },
    prelude::*,
};

#[derive(Parser)]
pub struct BrokerArgs {
    /// Do not connect to the broker: log the warnings instead of publishing them.
    #[clap(long)]
    pub dry_run: bool,

    #[clap(long = "broker-hostname", env = "OCTAVE_HOSTNAME", required_unless_present = "dry_run")]
    hostname: Option<String>,

    #[clap(long = "broker-port", env = "OCTAVE_PORT", default_value = "1883")]
    port: u16,

    #[clap(long = "broker-username", env = "OCTAVE_USERNAME", required_unless_present = "dry_run")]
    username: Option<String>,

    #[clap(
        long = "broker-password",
        env = "OCTAVE_PASSWORD",
        hide_env_values = true,
        required_unless_present = "dry_run"
    )]
    password: Option<String>,

    /// MQTT client ID, random by default.
    #[clap(long = "broker-client-id", env = "OCTAVE_CLIENT_ID")]
    client_id: Option<String>,

    #[clap(long, env = "BROKER_CONNECT_TIMEOUT", default_value = "10s")]
    connect_timeout: humantime::Duration,

    /// Give up on a single warning after this long.
    #[clap(long, env = "PUBLISH_TIMEOUT", default_value = "3s")]
    publish_timeout: humantime::Duration,
}

impl BrokerArgs {
    pub fn config(&self) -> Result<BrokerConfig> {
        Ok(BrokerConfig::builder()
            .hostname(self.hostname.clone().context("the broker hostname is required")?)
            .port(self.port)
            .username(self.username.clone().context("the broker username is required")?)
            .password(self.password.clone().context("the broker password is required")?)
            .maybe_client_id(self.client_id.clone())
            .connect_timeout(self.connect_timeout.into())
            .build())
    }

    /// Build the MQTT notifier and try to connect.
    ///
    /// Connection failure is not fatal: the notifier keeps working without delivering anything.
    pub async fn connect(&self) -> Result<WarningNotifier<MqttChannel>> {
        let mut channel = MqttChannel::new(self.config()?);
        if let Err(error) = channel.connect().await {
            error!("warnings will not be delivered: {error:#}");
        }
        Ok(self.wrap(channel))
    }

    pub fn wrap<C: Channel>(&self, channel: C) -> WarningNotifier<C> {
        WarningNotifier::new(channel).with_publish_timeout(self.publish_timeout.into())
    }
}
