use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::Local;
use clap::Parser;
use itertools::Itertools;
use serde::Deserialize;
use tokio::task::JoinSet;

use crate::{
    cli::BrokerArgs,
    core::{
        battery::{BatteryId, BatteryState},
        request::ChargeRequest,
        warning::Warning,
    },
    fleet::Fleet,
    notify::{Channel, LogChannel, WarningNotifier},
    prelude::*,
    quantity::{energy::KilowattHours, power::Kilowatts},
    tables::build_batteries_table,
};

#[derive(Parser)]
pub struct ReplayArgs {
    /// Scenario TOML file with `[[batteries]]` and `[[events]]`.
    #[clap(env = "SCENARIO_PATH")]
    scenario: PathBuf,

    #[clap(flatten)]
    broker: BrokerArgs,
}

impl ReplayArgs {
    pub async fn run(&self) -> Result {
        let scenario = Scenario::read(&self.scenario)?;
        let fleet = Arc::new(Fleet::default());
        scenario.register(&fleet).await?;

        let n_rejected = if self.broker.dry_run {
            replay(&fleet, scenario.events, Arc::new(self.broker.wrap(LogChannel))).await?
        } else {
            let notifier = Arc::new(self.broker.connect().await?);
            let n_rejected = replay(&fleet, scenario.events, Arc::clone(&notifier)).await?;
            if let Some(mut notifier) = Arc::into_inner(notifier) {
                notifier.channel_mut().disconnect().await;
            }
            n_rejected
        };

        println!("{}", build_batteries_table(&fleet.snapshot().await));
        if n_rejected != 0 {
            warn!(n_rejected, "some events were rejected");
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct Scenario {
    #[serde(default)]
    batteries: Vec<BatteryRecord>,

    #[serde(default)]
    events: Vec<Event>,
}

impl Scenario {
    #[instrument(skip_all, fields(path = %path.display()))]
    fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).context("failed to read the scenario")?;
        let scenario: Self = toml::from_str(&contents).context("failed to parse the scenario")?;
        info!(
            n_batteries = scenario.batteries.len(),
            n_events = scenario.events.len(),
            "loaded the scenario",
        );
        Ok(scenario)
    }

    async fn register(&self, fleet: &Fleet) -> Result {
        for record in &self.batteries {
            let state = BatteryState::builder()
                .id(record.id.clone().unwrap_or_else(BatteryId::random))
                .capacity(record.capacity_kwh)
                .max_power(record.max_power_kw)
                .maybe_state_of_charge(record.soc_percent)
                .cycles(record.cycles)
                .build()?;
            fleet.insert(state).await?;
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct BatteryRecord {
    /// Random, when omitted.
    id: Option<BatteryId>,

    capacity_kwh: KilowattHours,
    max_power_kw: Kilowatts,
    soc_percent: Option<i64>,

    #[serde(default)]
    cycles: f64,
}

#[derive(Deserialize)]
struct Event {
    battery_id: BatteryId,
    power_kw: Kilowatts,
    duration_minutes: f64,
}

/// Apply the events and publish the warnings, returning the number of rejected events.
///
/// Events of a single battery are applied in order, different batteries run concurrently.
async fn replay<C: Channel + 'static>(
    fleet: &Arc<Fleet>,
    events: Vec<Event>,
    notifier: Arc<WarningNotifier<C>>,
) -> Result<usize> {
    let events_by_battery = events.into_iter().into_group_map_by(|event| event.battery_id.clone());
    let mut tasks = JoinSet::new();
    for (battery_id, events) in events_by_battery {
        let fleet = Arc::clone(fleet);
        let notifier = Arc::clone(&notifier);
        tasks.spawn(async move {
            let mut n_rejected = 0_usize;
            for event in events {
                if let Err(error) = apply(&fleet, &notifier, &event).await {
                    warn!(%battery_id, "rejected: {error:#}");
                    n_rejected += 1;
                }
            }
            n_rejected
        });
    }

    let mut n_rejected = 0;
    while let Some(result) = tasks.join_next().await {
        n_rejected += result?;
    }
    Ok(n_rejected)
}

async fn apply<C: Channel>(
    fleet: &Fleet,
    notifier: &WarningNotifier<C>,
    event: &Event,
) -> Result {
    let warning = if event.power_kw == Kilowatts::ZERO {
        info!(
            battery_id = %event.battery_id,
            "zero power requested, checking the current state only",
        );
        let state = fleet.get(&event.battery_id).await?;
        Warning::detect(state.state_of_charge, Local::now())
    } else {
        let request = ChargeRequest::from_minutes(event.power_kw, event.duration_minutes)?;
        fleet.update(&event.battery_id, request).await?.warning
    };
    if let Some(warning) = &warning {
        notifier.publish(&event.battery_id, warning).await;
    }
    Ok(())
}
