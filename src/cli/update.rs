use chrono::Local;
use clap::Parser;

use crate::{
    cli::BrokerArgs,
    core::{
        battery::{BatteryId, BatteryState},
        request::ChargeRequest,
        transition::Transition,
        warning::Warning,
    },
    notify::{Channel, LogChannel, WarningNotifier},
    prelude::*,
    quantity::{energy::KilowattHours, power::Kilowatts},
    tables::build_batteries_table,
};

#[derive(Parser)]
pub struct UpdateArgs {
    #[clap(long = "battery-id", env = "BATTERY_ID")]
    battery_id: BatteryId,

    #[clap(long = "capacity-kwh")]
    capacity: KilowattHours,

    #[clap(long = "max-power-kw")]
    max_power: Kilowatts,

    /// Current state-of-charge percent.
    #[clap(long = "soc-percent", default_value = "50", allow_hyphen_values = true)]
    state_of_charge: i64,

    #[clap(long, default_value = "0")]
    cycles: f64,

    /// Requested power: positive to charge, negative to discharge.
    #[clap(long = "power-kw", allow_hyphen_values = true)]
    power: Kilowatts,

    #[clap(long = "duration-minutes")]
    duration_minutes: f64,

    /// Print the resulting state as JSON instead of a table.
    #[clap(long)]
    json: bool,

    #[clap(flatten)]
    broker: BrokerArgs,
}

impl UpdateArgs {
    pub async fn run(&self) -> Result {
        let battery = BatteryState::builder()
            .id(self.battery_id.clone())
            .capacity(self.capacity)
            .max_power(self.max_power)
            .state_of_charge(self.state_of_charge)
            .cycles(self.cycles)
            .build()?;

        let state = if self.broker.dry_run {
            self.apply(battery, &self.broker.wrap(LogChannel)).await?
        } else {
            let mut notifier = self.broker.connect().await?;
            let result = self.apply(battery, &notifier).await;
            notifier.channel_mut().disconnect().await;
            result?
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&state)?);
        } else {
            println!("{}", build_batteries_table(&[state]));
        }
        Ok(())
    }

    #[instrument(skip_all, fields(id = %battery.id))]
    async fn apply<C: Channel>(
        &self,
        battery: BatteryState,
        notifier: &WarningNotifier<C>,
    ) -> Result<BatteryState> {
        if self.power == Kilowatts::ZERO {
            info!("zero power requested, checking the current state only");
            if let Some(warning) = Warning::detect(battery.state_of_charge, Local::now()) {
                notifier.publish(&battery.id, &warning).await;
            }
            return Ok(battery);
        }
        let request = ChargeRequest::from_minutes(self.power, self.duration_minutes)?;
        let transition = Transition::try_new(&battery, request, Local::now())?;
        info!(
            before = %battery.state_of_charge,
            after = %transition.state.state_of_charge,
            direction = %request.direction(),
            "applied",
        );
        if let Some(warning) = &transition.warning {
            notifier.publish(&transition.state.id, warning).await;
        }
        Ok(transition.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{notify::RecordingChannel, quantity::percent::Percent};

    fn args(power_kw: &str) -> UpdateArgs {
        UpdateArgs::try_parse_from([
            "update",
            "--battery-id=b-1",
            "--capacity-kwh=10",
            "--max-power-kw=1",
            "--power-kw",
            power_kw,
            "--duration-minutes=60",
            "--dry-run",
        ])
        .unwrap()
    }

    fn battery(state_of_charge: i64) -> BatteryState {
        BatteryState::builder()
            .id("b-1")
            .capacity(KilowattHours(10.0))
            .max_power(Kilowatts(1.0))
            .state_of_charge(state_of_charge)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn charge_into_high_band_warns() {
        let notifier = WarningNotifier::new(RecordingChannel::connected());
        let state = args("1").apply(battery(85), &notifier).await.unwrap();
        assert_eq!(state.state_of_charge, Percent::saturating_from(95));
        let messages = notifier.channel().messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, "/warnings/b-1");
    }

    #[tokio::test]
    async fn zero_power_keeps_state_and_still_warns() {
        let notifier = WarningNotifier::new(RecordingChannel::connected());
        let battery = battery(5);
        let state = args("0").apply(battery.clone(), &notifier).await.unwrap();
        assert_eq!(state, battery);
        assert_eq!(notifier.channel().messages().len(), 1);
    }

    #[tokio::test]
    async fn zero_power_within_band_is_silent() {
        let notifier = WarningNotifier::new(RecordingChannel::connected());
        args("0").apply(battery(50), &notifier).await.unwrap();
        assert!(notifier.channel().messages().is_empty());
    }
}
