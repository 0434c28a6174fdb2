use std::{collections::BTreeMap, sync::Arc};

use chrono::Local;
use derive_more::{Display, Error};
use tokio::sync::{Mutex, RwLock};

use crate::{
    core::{
        battery::{BatteryId, BatteryState},
        request::ChargeRequest,
        transition::Transition,
    },
    prelude::*,
    quantity::{energy::KilowattHours, power::Kilowatts},
};

#[derive(Debug, Display, Error)]
#[display("battery `{_0}` is not found")]
pub struct NotFound(#[error(not(source))] pub BatteryId);

/// In-memory battery records.
///
/// Each record sits behind its own lock, so updates of the same battery are applied one
/// after another while different batteries are updated concurrently.
#[derive(Default)]
pub struct Fleet {
    records: RwLock<BTreeMap<BatteryId, Arc<Mutex<BatteryState>>>>,
}

impl Fleet {
    /// Register a new battery with a random ID and the initial state-of-charge.
    #[instrument(skip_all, fields(capacity = %capacity, max_power = %max_power))]
    pub async fn register(
        &self,
        capacity: KilowattHours,
        max_power: Kilowatts,
    ) -> Result<BatteryState> {
        let state = BatteryState::builder()
            .id(BatteryId::random())
            .capacity(capacity)
            .max_power(max_power)
            .build()?;
        self.insert(state.clone()).await?;
        Ok(state)
    }

    #[instrument(skip_all, fields(id = %state.id))]
    pub async fn insert(&self, state: BatteryState) -> Result {
        state.validate()?;
        let mut records = self.records.write().await;
        ensure!(!records.contains_key(&state.id), "battery `{}` is already registered", state.id);
        info!(soc = %state.state_of_charge, "registered");
        records.insert(state.id.clone(), Arc::new(Mutex::new(state)));
        Ok(())
    }

    pub async fn get(&self, id: &BatteryId) -> Result<BatteryState> {
        let record = self.record(id).await?;
        let state = record.lock().await.clone();
        Ok(state)
    }

    #[instrument(skip_all, fields(id = %id))]
    pub async fn remove(&self, id: &BatteryId) -> Result<BatteryState> {
        let record =
            self.records.write().await.remove(id).ok_or_else(|| NotFound(id.clone()))?;
        let state = record.lock().await.clone();
        info!("removed");
        Ok(state)
    }

    /// All batteries ordered by ID.
    pub async fn snapshot(&self) -> Vec<BatteryState> {
        let records: Vec<_> = self.records.read().await.values().cloned().collect();
        let mut states = Vec::with_capacity(records.len());
        for record in records {
            states.push(record.lock().await.clone());
        }
        states
    }

    /// Apply the request to the stored battery and replace the record with the outcome.
    ///
    /// The record stays locked for the whole read-modify-write.
    #[instrument(skip_all, fields(id = %id, power = %request.power(), duration = %request.duration()))]
    pub async fn update(&self, id: &BatteryId, request: ChargeRequest) -> Result<Transition> {
        let record = self.record(id).await?;
        let mut state = record.lock().await;
        let transition = Transition::try_new(&state, request, Local::now())?;
        debug!(
            before = %state.state_of_charge,
            after = %transition.state.state_of_charge,
            cycles = transition.state.cycles,
            "updated",
        );
        *state = transition.state.clone();
        drop(state);
        Ok(transition)
    }

    async fn record(&self, id: &BatteryId) -> Result<Arc<Mutex<BatteryState>>> {
        let record = self.records.read().await.get(id).cloned();
        record.ok_or_else(|| NotFound(id.clone()).into())
    }
}
