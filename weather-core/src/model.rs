use chrono::{DateTime, Utc};

/// Current conditions plus the remaining hours of the first forecast day
/// for one location query.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub location_name: String,
    pub country: String,
    pub temperature_c: f64,
    pub condition: String,
    /// Hours of the first forecast day, in the order the provider returned them.
    pub hours: Vec<HourlyForecast>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourlyForecast {
    pub time: DateTime<Utc>,
    pub temperature_c: f64,
    /// 0..=100
    pub rain_chance_pct: f64,
    pub condition: String,
}
