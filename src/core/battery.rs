use bon::bon;
use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    core::{
        error::InvalidInput,
        request::{ChargeRequest, Direction},
        warning::WarningKind,
    },
    quantity::{energy::KilowattHours, percent::Percent, power::Kilowatts, time::Hours},
};

/// Opaque battery identifier, stable for the battery's lifetime.
#[derive(
    Clone,
    Debug,
    Display,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    From,
    Into,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct BatteryId(String);

impl BatteryId {
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BatteryId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Snapshot of a battery.
///
/// Transitions never mutate a snapshot: they return a fresh one which replaces
/// the stored record as a whole.
#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BatteryState {
    pub id: BatteryId,
    pub capacity: KilowattHours,

    /// Power ceiling in either direction.
    pub max_power: Kilowatts,

    pub state_of_charge: Percent,

    /// Accumulated full-cycle equivalents.
    pub cycles: f64,
}

#[bon]
impl BatteryState {
    /// State-of-charge of a newly registered battery.
    pub const INITIAL_STATE_OF_CHARGE: Percent = Percent::saturating_const(50);

    /// Validate the persisted values, clamping the state-of-charge into `0..=100`.
    #[builder]
    pub fn new(
        #[builder(into)] id: BatteryId,
        capacity: KilowattHours,
        max_power: Kilowatts,
        #[builder(default = i64::from(BatteryState::INITIAL_STATE_OF_CHARGE.get()))]
        state_of_charge: i64,
        #[builder(default)] cycles: f64,
    ) -> Result<Self, InvalidInput> {
        let this = Self {
            id,
            capacity,
            max_power,
            state_of_charge: Percent::saturating_from(state_of_charge),
            cycles,
        };
        this.validate()?;
        Ok(this)
    }

    pub fn validate(&self) -> Result<(), InvalidInput> {
        if self.id.as_str().is_empty() {
            return Err(InvalidInput::EmptyId);
        }
        if !self.capacity.is_finite() || self.capacity <= KilowattHours::ZERO {
            return Err(InvalidInput::NonPositiveCapacity { capacity: self.capacity });
        }
        if !self.max_power.is_finite() || self.max_power <= Kilowatts::ZERO {
            return Err(InvalidInput::NonPositiveMaxPower { max_power: self.max_power });
        }
        if !self.cycles.is_finite() || self.cycles < 0.0 {
            return Err(InvalidInput::NegativeCycles { cycles: self.cycles.into() });
        }
        Ok(())
    }

    /// Requested power limited by the battery's power ceiling, sign preserved.
    pub fn applied_power(&self, requested: Kilowatts) -> Kilowatts {
        requested.min(self.max_power).max(-self.max_power)
    }

    /// Charge with the positive power for the duration.
    ///
    /// Cycle count stays unchanged.
    pub fn charge(&self, power: Kilowatts, duration: Hours) -> Result<Self, InvalidInput> {
        let request = ChargeRequest::try_new(power, duration)?;
        if request.direction() != Direction::Charge {
            return Err(InvalidInput::NotCharging { power });
        }
        self.validate()?;

        let energy_added = self.applied_power(power) * request.duration();
        Ok(Self { state_of_charge: self.state_of_charge_after(energy_added), ..self.clone() })
    }

    /// Discharge with the negative power for the duration.
    ///
    /// Every percent actually drained adds one hundredth of a cycle.
    pub fn discharge(&self, power: Kilowatts, duration: Hours) -> Result<Self, InvalidInput> {
        let request = ChargeRequest::try_new(power, duration)?;
        if request.direction() != Direction::Discharge {
            return Err(InvalidInput::NotDischarging { power });
        }
        self.validate()?;

        let energy_consumed = self.applied_power(power) * request.duration();
        let state_of_charge = self.state_of_charge_after(energy_consumed);
        let drained = i32::from(self.state_of_charge.get()) - i32::from(state_of_charge.get());
        Ok(Self {
            state_of_charge,
            cycles: self.cycles + f64::from(drained) / 100.0,
            ..self.clone()
        })
    }

    /// Charge or discharge depending on the requested power sign.
    pub fn apply(&self, request: ChargeRequest) -> Result<Self, InvalidInput> {
        match request.direction() {
            Direction::Charge => self.charge(request.power(), request.duration()),
            Direction::Discharge => self.discharge(request.power(), request.duration()),
        }
    }

    pub fn warning_kind(&self) -> Option<WarningKind> {
        WarningKind::classify(self.state_of_charge)
    }

    /// The fractional part of the new state-of-charge is dropped, not rounded.
    fn state_of_charge_after(&self, energy: KilowattHours) -> Percent {
        let delta_percent = energy / self.capacity * 100.0;
        Percent::truncating_from(f64::from(self.state_of_charge.get()) + delta_percent)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn battery(capacity: f64, max_power: f64, state_of_charge: i64) -> BatteryState {
        BatteryState::builder()
            .id("test")
            .capacity(KilowattHours(capacity))
            .max_power(Kilowatts(max_power))
            .state_of_charge(state_of_charge)
            .build()
            .unwrap()
    }

    #[test]
    fn charge_one_hour() {
        let battery = battery(10.0, 1.0, 50);
        let charged = battery.charge(Kilowatts(1.0), Hours(1.0)).unwrap();
        assert_eq!(charged.state_of_charge, Percent::saturating_from(60));
        assert_abs_diff_eq!(charged.cycles, 0.0);
        assert_eq!(charged.id, battery.id);
        assert_eq!(charged.capacity, battery.capacity);
    }

    #[test]
    fn discharge_clamps_at_empty() {
        let battery = battery(10.0, 5.0, 50);
        let discharged = battery.discharge(Kilowatts(-1.0), Hours(6.0)).unwrap();
        assert_eq!(discharged.state_of_charge, Percent::MIN);
        assert_abs_diff_eq!(discharged.cycles, 0.5);
    }

    #[test]
    fn charge_clamps_at_full() {
        let battery = battery(10.0, 1.0, 50);
        let charged = battery.charge(Kilowatts(1.0), Hours(300.0)).unwrap();
        assert_eq!(charged.state_of_charge, Percent::MAX);
        assert_eq!(charged.warning_kind(), Some(WarningKind::High));
    }

    #[test]
    fn charge_power_is_limited() {
        let battery = battery(10.0, 1.0, 50);
        assert_eq!(
            battery.charge(Kilowatts(10.0), Hours(1.0)).unwrap(),
            battery.charge(Kilowatts(1.0), Hours(1.0)).unwrap(),
        );
    }

    #[test]
    fn discharge_power_is_limited() {
        let battery = battery(10.0, 1.0, 50);
        let discharged = battery.discharge(Kilowatts(-10.0), Hours(1.0)).unwrap();
        assert_eq!(discharged.state_of_charge, Percent::saturating_from(40));
        assert_abs_diff_eq!(discharged.cycles, 0.1);
    }

    #[test]
    fn applied_power_never_exceeds_ceiling() {
        let battery = battery(10.0, 2.5, 50);
        for requested in [-100.0, -2.5, -1.0, 1.0, 2.5, 100.0] {
            let applied = battery.applied_power(Kilowatts(requested));
            assert!(applied.0.abs() <= 2.5, "{requested} → {applied}");
        }
    }

    #[test]
    fn truncates_instead_of_rounding() {
        // 0.95 kWh on 10 kWh is 9.5 percent:
        let battery = battery(10.0, 5.0, 50);
        let charged = battery.charge(Kilowatts(0.95), Hours(1.0)).unwrap();
        assert_eq!(charged.state_of_charge, Percent::saturating_from(59));
        let discharged = battery.discharge(Kilowatts(-0.95), Hours(1.0)).unwrap();
        assert_eq!(discharged.state_of_charge, Percent::saturating_from(40));
        assert_abs_diff_eq!(discharged.cycles, 0.1);
    }

    #[test]
    fn charge_is_monotonic() {
        for state_of_charge in [0, 1, 37, 89, 99, 100] {
            for duration in [0.01, 0.5, 1.0, 24.0] {
                let battery = battery(13.5, 5.0, state_of_charge);
                let charged = battery.charge(Kilowatts(3.0), Hours(duration)).unwrap();
                assert!(charged.state_of_charge >= battery.state_of_charge);
                assert_abs_diff_eq!(charged.cycles, battery.cycles);
            }
        }
    }

    #[test]
    fn discharge_cycle_increment_matches_drain() {
        for state_of_charge in [0, 1, 37, 89, 100] {
            for duration in [0.01, 0.5, 1.0, 24.0] {
                let battery = BatteryState { cycles: 3.25, ..battery(13.5, 5.0, state_of_charge) };
                let discharged = battery.discharge(Kilowatts(-3.0), Hours(duration)).unwrap();
                let drained = f64::from(battery.state_of_charge.get())
                    - f64::from(discharged.state_of_charge.get());
                assert!(drained >= 0.0);
                assert_abs_diff_eq!(
                    discharged.cycles - battery.cycles,
                    drained / 100.0,
                    epsilon = 1e-9,
                );
            }
        }
    }

    #[test]
    fn discharge_at_empty_adds_no_cycles() {
        let battery = battery(10.0, 5.0, 0);
        let discharged = battery.discharge(Kilowatts(-5.0), Hours(1.0)).unwrap();
        assert_eq!(discharged.state_of_charge, Percent::MIN);
        assert_abs_diff_eq!(discharged.cycles, 0.0);
    }

    #[test]
    fn apply_dispatches_on_sign() {
        let battery = battery(10.0, 1.0, 50);
        let request = ChargeRequest::try_new(Kilowatts(-1.0), Hours(1.0)).unwrap();
        assert_eq!(battery.apply(request).unwrap().state_of_charge, Percent::saturating_from(40));
        let request = ChargeRequest::try_new(Kilowatts(1.0), Hours(1.0)).unwrap();
        assert_eq!(battery.apply(request).unwrap().state_of_charge, Percent::saturating_from(60));
    }

    #[test]
    fn rejects_wrong_sign() {
        let battery = battery(10.0, 1.0, 50);
        assert_eq!(
            battery.charge(Kilowatts(-1.0), Hours(1.0)),
            Err(InvalidInput::NotCharging { power: Kilowatts(-1.0) }),
        );
        assert_eq!(
            battery.discharge(Kilowatts(1.0), Hours(1.0)),
            Err(InvalidInput::NotDischarging { power: Kilowatts(1.0) }),
        );
        assert!(battery.charge(Kilowatts::ZERO, Hours(1.0)).is_err());
        assert!(battery.charge(Kilowatts(1.0), Hours::ZERO).is_err());
    }

    #[test]
    fn rejects_invalid_battery() {
        let result = BatteryState::builder()
            .id("test")
            .capacity(KilowattHours::ZERO)
            .max_power(Kilowatts(1.0))
            .build();
        assert_eq!(result, Err(InvalidInput::NonPositiveCapacity { capacity: KilowattHours::ZERO }));

        let result = BatteryState::builder()
            .id("test")
            .capacity(KilowattHours(1.0))
            .max_power(Kilowatts(-1.0))
            .build();
        assert!(result.is_err());

        let battery = BatteryState { max_power: Kilowatts::ZERO, ..battery(10.0, 1.0, 50) };
        assert!(battery.charge(Kilowatts(1.0), Hours(1.0)).is_err());
    }

    #[test]
    fn clamps_loaded_state_of_charge() {
        assert_eq!(battery(10.0, 1.0, 150).state_of_charge, Percent::MAX);
        assert_eq!(battery(10.0, 1.0, -5).state_of_charge, Percent::MIN);
    }

    #[test]
    fn serializes_clamped_state() {
        let json = serde_json::to_value(battery(10.0, 1.0, 150)).unwrap();
        assert_eq!(json["state_of_charge"], 100);
        assert_eq!(json["capacity"], 10.0);
    }

    #[test]
    fn defaults() {
        let battery = BatteryState::builder()
            .id(BatteryId::random())
            .capacity(KilowattHours(10.0))
            .max_power(Kilowatts(1.0))
            .build()
            .unwrap();
        assert_eq!(battery.state_of_charge, BatteryState::INITIAL_STATE_OF_CHARGE);
        assert_abs_diff_eq!(battery.cycles, 0.0);
    }
}
