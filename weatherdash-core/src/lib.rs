//! Core library for the `weatherdash` terminal dashboard.
//!
//! This crate defines:
//! - Configuration handling
//! - The synthetic Air Quality Index estimator
//! - Weather-code lookup tables
//! - Dashboard derivation and plain-text rendering
//! - The Open-Meteo provider behind a small async trait
//!
//! It is used by `weatherdash-cli`, but the estimator and dashboard are pure
//! and can be reused without any network access.

pub mod aqi;
pub mod conditions;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod provider;
pub mod render;

pub use aqi::{AqiCategory, AqiResult, estimate};
pub use config::{CommuteConfig, Config};
pub use dashboard::Dashboard;
pub use error::AqiError;
pub use model::{CurrentWeather, Forecast, HourlyPoint, Location, WeatherObservation};
pub use provider::{WeatherProvider, provider_from_config};
pub use render::{DashboardView, RenderOptions, render};
