use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::core::{battery::BatteryState, warning::WarningKind};

pub fn build_batteries_table(batteries: &[BatteryState]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table.set_header(vec!["ID", "Capacity", "Max power", "SoC", "Cycles"]);
    for battery in batteries {
        table.add_row(vec![
            Cell::new(&battery.id).add_attribute(Attribute::Dim),
            Cell::new(battery.capacity).set_alignment(CellAlignment::Right),
            Cell::new(battery.max_power).set_alignment(CellAlignment::Right),
            Cell::new(battery.state_of_charge).set_alignment(CellAlignment::Right).fg(
                match battery.warning_kind() {
                    Some(WarningKind::High) => Color::DarkYellow,
                    Some(WarningKind::Low) => Color::Red,
                    None => Color::Green,
                },
            ),
            Cell::new(format!("{:.2}", battery.cycles)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::{energy::KilowattHours, power::Kilowatts};

    #[test]
    fn renders_batteries() {
        let battery = BatteryState::builder()
            .id("b-42")
            .capacity(KilowattHours(13.5))
            .max_power(Kilowatts(5.0))
            .state_of_charge(42)
            .cycles(1.5)
            .build()
            .unwrap();
        let rendered = build_batteries_table(&[battery]).to_string();
        assert!(rendered.contains("b-42"));
        assert!(rendered.contains("42%"));
        assert!(rendered.contains("13.500 kWh"));
        assert!(rendered.contains("1.50"));
    }
}
