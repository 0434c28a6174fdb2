quantity!(Hours, "h", 2);

impl Hours {
    pub fn from_minutes(minutes: f64) -> Self {
        Self(minutes / 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_minutes() {
        assert_eq!(Hours::from_minutes(90.0), Hours(1.5));
        assert_eq!(Hours::from_minutes(60.0), Hours(1.0));
    }
}
