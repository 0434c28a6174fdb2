use std::ops::Div;

quantity!(KilowattHours, "kWh", 3);

/// Energy relative to a capacity.
impl Div for KilowattHours {
    type Output = f64;

    fn div(self, capacity: Self) -> Self::Output {
        self.0 / capacity.0
    }
}
