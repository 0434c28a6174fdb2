use std::ops::Mul;

use crate::quantity::{energy::KilowattHours, time::Hours};

quantity!(Kilowatts, "kW", 3);

impl Mul<Hours> for Kilowatts {
    type Output = KilowattHours;

    fn mul(self, hours: Hours) -> Self::Output {
        KilowattHours(self.0 * hours.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn energy_from_power() {
        assert_eq!(Kilowatts(1.5) * Hours(2.0), KilowattHours(3.0));
        assert_eq!(Kilowatts(-1.0) * Hours(6.0), KilowattHours(-6.0));
    }

    #[test]
    fn ordering() {
        assert_eq!(Kilowatts(10.0).min(Kilowatts(1.0)), Kilowatts(1.0));
        assert_eq!(Kilowatts(-10.0).max(-Kilowatts(5.0)), Kilowatts(-5.0));
    }

    #[test]
    fn display() {
        assert_eq!(Kilowatts(1.25).to_string(), "1.250 kW");
    }
}
