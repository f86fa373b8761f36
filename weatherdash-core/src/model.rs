use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A geocoded place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn display_name(&self) -> String {
        match &self.country {
            Some(country) => format!("{}, {}", self.name, country),
            None => self.name.clone(),
        }
    }
}

/// The weather fields the AQI estimator reads.
///
/// Numeric fields are optional: the forecast API omits (or nulls) values it
/// has no data for.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub wind_speed_kmh: Option<f64>,
    pub relative_humidity_pct: Option<f64>,
    pub cloud_cover_pct: Option<f64>,
    pub visibility_m: Option<f64>,
    pub weather_code: i32,
    pub is_day: bool,
}

/// Current conditions at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// Observation time in the location's local time.
    pub time: NaiveDateTime,
    pub temperature_c: Option<f64>,
    pub apparent_temperature_c: Option<f64>,
    pub wind_direction_deg: Option<f64>,
    pub observation: WeatherObservation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyPoint {
    /// Local time at the location.
    pub time: NaiveDateTime,
    pub temperature_c: f64,
    pub weather_code: i32,
    pub is_day: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub timezone: String,
    pub utc_offset_seconds: i32,
    pub current: CurrentWeather,
    pub hourly: Vec<HourlyPoint>,
}
