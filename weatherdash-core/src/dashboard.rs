//! Everything the dashboard view shows, derived from one forecast.
//!
//! Building a [`Dashboard`] is pure: the caller supplies the wall-clock time
//! at the location, so the same forecast and time always give the same view.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::{
    aqi::{self, AqiResult},
    conditions,
    config::CommuteConfig,
    model::{Forecast, HourlyPoint},
};

pub const TREND_HOURS: usize = 6;
pub const HOURLY_HOURS: usize = 12;

/// kg CO₂ per km.
pub const CAR_EMISSIONS: f64 = 0.404;
pub const BIKE_EMISSIONS: f64 = 0.016;
pub const WALK_EMISSIONS: f64 = 0.008;

const COMPASS_POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Headline {
    pub location: String,
    pub condition: String,
    pub icon: String,
    pub temperature_c: Option<i64>,
    pub feels_like_c: Option<i64>,
    pub humidity_pct: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    pub visibility_km: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQuality {
    pub reading: AqiResult,
    pub gauge_width_pct: u8,
    pub gauge_color: String,
    pub wind: Wind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub direction: String,
    pub speed_kmh: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendBar {
    pub time: NaiveDateTime,
    pub temperature_c: f64,
    /// Bar height relative to the coolest (0) and warmest (100) hour.
    pub height_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TempClass {
    Hot,
    Warm,
    Cool,
    Cold,
}

impl TempClass {
    pub fn from_celsius(temp: f64) -> Self {
        if temp >= 25.0 {
            TempClass::Hot
        } else if temp >= 20.0 {
            TempClass::Warm
        } else if temp >= 15.0 {
            TempClass::Cool
        } else {
            TempClass::Cold
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlySlot {
    /// "Now" for the current hour, otherwise e.g. "3 PM".
    pub label: String,
    pub icon: String,
    pub temperature_c: i64,
    pub class: TempClass,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarbonSavings {
    pub bike_kg: f64,
    pub walk_kg: f64,
    pub total_kg: f64,
}

impl CarbonSavings {
    /// CO₂ avoided by cycling and walking the commute instead of driving it.
    pub fn for_commute(commute: &CommuteConfig) -> Self {
        let bike_kg = (CAR_EMISSIONS - BIKE_EMISSIONS) * commute.bike_km;
        let walk_kg = (CAR_EMISSIONS - WALK_EMISSIONS) * commute.walk_km;

        Self {
            bike_kg,
            walk_kg,
            total_kg: bike_kg + walk_kg,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub updated_at: NaiveDateTime,
    pub headline: Headline,
    pub air_quality: AirQuality,
    pub trend: Vec<TrendBar>,
    pub hourly: Vec<HourlySlot>,
    pub savings: CarbonSavings,
}

impl Dashboard {
    pub fn build(
        location: &str,
        forecast: &Forecast,
        now: NaiveDateTime,
        commute: &CommuteConfig,
    ) -> Self {
        let current = &forecast.current;
        let obs = &current.observation;

        let headline = Headline {
            location: location.to_string(),
            condition: conditions::description(obs.weather_code).to_string(),
            icon: conditions::icon(obs.weather_code, obs.is_day).to_string(),
            temperature_c: current.temperature_c.map(round_i64),
            feels_like_c: current.apparent_temperature_c.map(round_i64),
            humidity_pct: obs.relative_humidity_pct,
            wind_speed_kmh: obs.wind_speed_kmh,
            visibility_km: obs.visibility_m.map(|m| m / 1000.0),
        };

        let reading = aqi::estimate(obs, now.hour());
        let air_quality = AirQuality {
            gauge_width_pct: reading.category.gauge_width_pct(),
            gauge_color: reading.category.color_hex().to_string(),
            wind: wind(obs.wind_speed_kmh, current.wind_direction_deg),
            reading,
        };

        let this_hour = start_of_hour(now);
        let upcoming = upcoming_hours(&forecast.hourly, this_hour);

        Self {
            updated_at: now,
            headline,
            air_quality,
            trend: temperature_trend(&upcoming[..upcoming.len().min(TREND_HOURS)]),
            hourly: hourly_slots(&upcoming[..upcoming.len().min(HOURLY_HOURS)], this_hour),
            savings: CarbonSavings::for_commute(commute),
        }
    }
}

/// Eight-point compass direction for a bearing in degrees.
pub fn compass_point(degrees: f64) -> &'static str {
    let sector = (degrees / 45.0).round().rem_euclid(8.0) as usize;
    COMPASS_POINTS.get(sector).copied().unwrap_or("N")
}

fn wind(speed_kmh: Option<f64>, direction_deg: Option<f64>) -> Wind {
    let speed = speed_kmh.filter(|v| v.is_finite()).unwrap_or(0.0);
    let direction = direction_deg.filter(|v| v.is_finite()).unwrap_or(0.0);

    Wind {
        direction: compass_point(direction).to_string(),
        speed_kmh: round_i64(speed),
    }
}

fn start_of_hour(now: NaiveDateTime) -> NaiveDateTime {
    now.with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}

/// Hourly points from `this_hour` onwards.
fn upcoming_hours(hourly: &[HourlyPoint], this_hour: NaiveDateTime) -> &[HourlyPoint] {
    let start = hourly
        .iter()
        .position(|p| p.time >= this_hour)
        .unwrap_or(hourly.len());

    &hourly[start..]
}

pub fn temperature_trend(points: &[HourlyPoint]) -> Vec<TrendBar> {
    let min = points.iter().map(|p| p.temperature_c).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.temperature_c).fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    points
        .iter()
        .map(|p| TrendBar {
            time: p.time,
            temperature_c: p.temperature_c,
            height_pct: if range > 0.0 {
                (p.temperature_c - min) / range * 100.0
            } else {
                0.0
            },
        })
        .collect()
}

/// Forecast strip entries. Only the point at `this_hour` is labelled "Now";
/// the series may have a gap there.
pub fn hourly_slots(points: &[HourlyPoint], this_hour: NaiveDateTime) -> Vec<HourlySlot> {
    points
        .iter()
        .map(|p| HourlySlot {
            label: if p.time == this_hour {
                "Now".to_string()
            } else {
                p.time.format("%-I %p").to_string()
            },
            icon: conditions::icon(p.weather_code, p.is_day).to_string(),
            temperature_c: round_i64(p.temperature_c),
            class: TempClass::from_celsius(p.temperature_c),
        })
        .collect()
}

fn round_i64(value: f64) -> i64 {
    value.round() as i64
}
