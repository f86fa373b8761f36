//! Synthetic Air Quality Index estimated from weather proxies.
//!
//! There is no pollutant data behind this number. Wind, humidity, cloud cover
//! and visibility are normalized, weighted into a 0–100 base score, scaled by
//! time-of-day and weather-condition multipliers, and mapped onto the familiar
//! 0–500 AQI scale and its categories.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{conditions, error::AqiError, model::WeatherObservation};

pub const MAX_INDEX: u16 = 500;

/// Reading used when the estimate cannot be computed.
pub const FALLBACK_INDEX: u16 = 50;

const WIND_WEIGHT: f64 = 0.3;
const HUMIDITY_WEIGHT: f64 = 0.2;
const CLOUD_WEIGHT: f64 = 0.2;
const VISIBILITY_WEIGHT: f64 = 0.3;

const WIND_DOMAIN_KMH: (f64, f64) = (0.0, 30.0);
const HUMIDITY_DOMAIN_PCT: (f64, f64) = (0.0, 100.0);
const CLOUD_DOMAIN_PCT: (f64, f64) = (0.0, 100.0);
const VISIBILITY_DOMAIN_KM: (f64, f64) = (0.0, 10.0);

const PEAK_MULTIPLIER: f64 = 1.2;
const NIGHT_MULTIPLIER: f64 = 0.8;

/// Rescales the 0–100 base score onto 0–500.
const SCALE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    /// Category for an index, by inclusive upper thresholds.
    pub fn from_index(index: u16) -> Self {
        match index {
            0..=50 => AqiCategory::Good,
            51..=100 => AqiCategory::Moderate,
            101..=150 => AqiCategory::UnhealthyForSensitiveGroups,
            151..=200 => AqiCategory::Unhealthy,
            201..=300 => AqiCategory::VeryUnhealthy,
            _ => AqiCategory::Hazardous,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good - Air quality is satisfactory",
            AqiCategory::Moderate => "Moderate - Air quality is acceptable",
            AqiCategory::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => {
                "Unhealthy - Everyone may begin to experience health effects"
            }
            AqiCategory::VeryUnhealthy => {
                "Very Unhealthy - Health warnings of emergency conditions"
            }
            AqiCategory::Hazardous => {
                "Hazardous - Health alert: everyone may experience more serious health effects"
            }
        }
    }

    /// Share of the gauge filled for this category, in percent.
    pub fn gauge_width_pct(&self) -> u8 {
        match self {
            AqiCategory::Good => 20,
            AqiCategory::Moderate => 40,
            AqiCategory::UnhealthyForSensitiveGroups => 60,
            AqiCategory::Unhealthy => 80,
            AqiCategory::VeryUnhealthy => 90,
            AqiCategory::Hazardous => 100,
        }
    }

    /// Gauge colour as `#RRGGBB`.
    pub fn color_hex(&self) -> &'static str {
        match self {
            AqiCategory::Good => "#4CAF50",
            AqiCategory::Moderate => "#FFC107",
            AqiCategory::UnhealthyForSensitiveGroups => "#FF9800",
            AqiCategory::Unhealthy => "#F44336",
            AqiCategory::VeryUnhealthy => "#9C27B0",
            AqiCategory::Hazardous => "#7D0000",
        }
    }
}

impl std::fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AqiResult {
    pub index: u16,
    pub category: AqiCategory,
    pub description: String,
}

impl AqiResult {
    pub fn from_index(index: u16) -> Self {
        let index = index.min(MAX_INDEX);
        let category = AqiCategory::from_index(index);

        Self {
            index,
            category,
            description: category.description().to_string(),
        }
    }

    /// The reading reported when estimation fails.
    pub fn fallback() -> Self {
        Self::from_index(FALLBACK_INDEX)
    }
}

/// Estimate the AQI for `observation` at local hour `hour` (0–23).
///
/// Never fails: a computation fault is logged and yields
/// [`AqiResult::fallback`].
pub fn estimate(observation: &WeatherObservation, hour: u32) -> AqiResult {
    match try_estimate(observation, hour) {
        Ok(result) => result,
        Err(err) => {
            warn!(error = %err, "AQI estimation failed, using fallback reading");
            AqiResult::fallback()
        }
    }
}

/// Fallible core of [`estimate`].
pub fn try_estimate(observation: &WeatherObservation, hour: u32) -> Result<AqiResult, AqiError> {
    let base = base_score(observation)?;
    let time = time_multiplier(observation.is_day, hour);
    let weather = conditions::pollution_multiplier(observation.weather_code);

    // Finite, bounded inputs and constant multipliers keep this finite.
    let score = (base * time * weather * SCALE).round();

    debug!(base, time, weather, score, "estimated AQI");

    let index = score.clamp(0.0, f64::from(MAX_INDEX)) as u16;
    Ok(AqiResult::from_index(index))
}

/// Weighted 0–100 score before the multipliers are applied.
pub fn base_score(observation: &WeatherObservation) -> Result<f64, AqiError> {
    let (wind_min, wind_max) = WIND_DOMAIN_KMH;
    let (hum_min, hum_max) = HUMIDITY_DOMAIN_PCT;
    let (cloud_min, cloud_max) = CLOUD_DOMAIN_PCT;
    let (vis_min, vis_max) = VISIBILITY_DOMAIN_KM;

    let wind = normalize("wind speed", observation.wind_speed_kmh, wind_min, wind_max)?;
    let humidity = normalize(
        "relative humidity",
        observation.relative_humidity_pct,
        hum_min,
        hum_max,
    )?;
    let cloud = normalize("cloud cover", observation.cloud_cover_pct, cloud_min, cloud_max)?;
    let visibility = normalize(
        "visibility",
        observation.visibility_m.map(|m| m / 1000.0),
        vis_min,
        vis_max,
    )?;

    // Wind and visibility improve air quality, so they are inverted. Humidity
    // counts by its distance from the 50% optimum.
    let score = (1.0 - wind) * WIND_WEIGHT * 100.0
        + (humidity - 0.5).abs() * HUMIDITY_WEIGHT * 100.0
        + cloud * CLOUD_WEIGHT * 100.0
        + (1.0 - visibility) * VISIBILITY_WEIGHT * 100.0;

    Ok(score)
}

/// Min–max normalize `value` into [0, 1]. Absent values sit at 0.5.
pub fn normalize(
    field: &'static str,
    value: Option<f64>,
    min: f64,
    max: f64,
) -> Result<f64, AqiError> {
    let Some(value) = value else {
        return Ok(0.5);
    };

    if !value.is_finite() {
        return Err(AqiError::NonFiniteInput { field, value });
    }

    let span = max - min;
    if span == 0.0 || !span.is_finite() {
        return Err(AqiError::DegenerateDomain { field, min, max });
    }

    Ok(((value - min) / span).clamp(0.0, 1.0))
}

/// Commute peaks (08–10 and 16–19) raise daytime readings; nights are calmer.
pub fn time_multiplier(is_day: bool, hour: u32) -> f64 {
    if !is_day {
        return NIGHT_MULTIPLIER;
    }

    match hour {
        8..=10 | 16..=19 => PEAK_MULTIPLIER,
        _ => 1.0,
    }
}
