use crate::{
    Config,
    model::{Forecast, Location},
    provider::open_meteo::OpenMeteoProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod open_meteo;

/// Source of locations and forecasts.
///
/// Each call is a single request with no retry; a failure is reported to the
/// caller as-is.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Resolve a free-text place name to its best match.
    async fn geocode(&self, query: &str) -> anyhow::Result<Location>;

    /// Current conditions and hourly forecast for a location.
    async fn forecast(&self, location: &Location) -> anyhow::Result<Forecast>;
}

/// Construct the provider described by `config`.
pub fn provider_from_config(config: &Config) -> Box<dyn WeatherProvider> {
    Box::new(OpenMeteoProvider::with_endpoints(
        config.geocoding_url().to_owned(),
        config.forecast_url().to_owned(),
    ))
}
