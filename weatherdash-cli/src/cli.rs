use std::io::IsTerminal;

use anyhow::Context;
use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Timelike, Utc};
use clap::{Args, Parser, Subcommand};
use inquire::{CustomType, Text};
use tracing::{info, warn};
use weatherdash_core::{
    Config, Dashboard, DashboardView, Location, RenderOptions, WeatherObservation,
    WeatherProvider, aqi, provider_from_config,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weatherdash",
    version,
    about = "Terminal weather dashboard with an estimated air quality index"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, Default, Args)]
pub struct OutputArgs {
    /// Print the dashboard as JSON instead of text.
    #[arg(long)]
    pub json: bool,

    /// Disable ANSI colours in text output.
    #[arg(long)]
    pub no_color: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the dashboard for a city.
    Show {
        /// City name; defaults to the configured default location.
        city: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show the dashboard for explicit coordinates.
    Coords {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Label shown in place of a city name.
        #[arg(long, default_value = "Your Location")]
        name: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Estimate the air quality index from weather readings.
    Aqi {
        /// Wind speed in km/h.
        #[arg(long)]
        wind: Option<f64>,

        /// Relative humidity in percent.
        #[arg(long)]
        humidity: Option<f64>,

        /// Cloud cover in percent.
        #[arg(long)]
        cloud: Option<f64>,

        /// Visibility in metres.
        #[arg(long)]
        visibility: Option<f64>,

        /// WMO weather code.
        #[arg(long, default_value_t = 0)]
        code: i32,

        /// Treat the reading as night-time.
        #[arg(long)]
        night: bool,

        /// Hour of day (0-23); defaults to the local clock.
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..24))]
        hour: Option<u32>,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Interactively set the default city and commute distances.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, output } => {
                let config = Config::load()?;
                let provider = provider_from_config(&config);
                let city = city.unwrap_or_else(|| config.default_location().to_string());

                let dashboard = city_dashboard(provider.as_ref(), &config, &city).await?;
                print_dashboard(&dashboard, output)
            }
            Command::Coords { lat, lon, name, output } => {
                let config = Config::load()?;
                let provider = provider_from_config(&config);
                let location = Location {
                    name,
                    country: None,
                    latitude: lat,
                    longitude: lon,
                };

                let dashboard = coords_dashboard(provider.as_ref(), &config, &location).await?;
                print_dashboard(&dashboard, output)
            }
            Command::Aqi {
                wind,
                humidity,
                cloud,
                visibility,
                code,
                night,
                hour,
                json,
            } => {
                let observation = WeatherObservation {
                    wind_speed_kmh: wind,
                    relative_humidity_pct: humidity,
                    cloud_cover_pct: cloud,
                    visibility_m: visibility,
                    weather_code: code,
                    is_day: !night,
                };
                let hour = hour.unwrap_or_else(|| Local::now().hour());
                let result = aqi::estimate(&observation, hour);

                if json {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                } else {
                    println!("AQI {} ({})", result.index, result.category);
                    println!("{}", result.description);
                }
                Ok(())
            }
        }
    }
}

/// Dashboard for explicit coordinates, falling back once to the configured
/// default city when the coordinates cannot be served.
async fn coords_dashboard(
    provider: &dyn WeatherProvider,
    config: &Config,
    location: &Location,
) -> anyhow::Result<Dashboard> {
    match location_dashboard(provider, config, &location.name, location).await {
        Ok(dashboard) => Ok(dashboard),
        Err(err) => {
            warn!(error = %err, "Lookup by coordinates failed, using default city");
            city_dashboard(provider, config, config.default_location()).await
        }
    }
}

async fn city_dashboard(
    provider: &dyn WeatherProvider,
    config: &Config,
    city: &str,
) -> anyhow::Result<Dashboard> {
    let location = provider.geocode(city).await?;
    info!(name = %location.name, lat = location.latitude, lon = location.longitude, "resolved location");

    location_dashboard(provider, config, &location.display_name(), &location).await
}

async fn location_dashboard(
    provider: &dyn WeatherProvider,
    config: &Config,
    label: &str,
    location: &Location,
) -> anyhow::Result<Dashboard> {
    let forecast = provider.forecast(location).await?;
    let now = local_time(Utc::now(), forecast.utc_offset_seconds);

    Ok(Dashboard::build(label, &forecast, now, &config.commute))
}

fn print_dashboard(dashboard: &Dashboard, output: OutputArgs) -> anyhow::Result<()> {
    if output.json {
        let json = serde_json::to_string_pretty(dashboard)
            .context("Failed to serialize dashboard to JSON")?;
        println!("{json}");
    } else {
        let view = DashboardView {
            dashboard,
            options: RenderOptions {
                color: !output.no_color && std::io::stdout().is_terminal(),
            },
        };
        print!("{view}");
    }

    Ok(())
}

/// Wall-clock time at a location `utc_offset_seconds` away from UTC.
fn local_time(now: DateTime<Utc>, utc_offset_seconds: i32) -> NaiveDateTime {
    match FixedOffset::east_opt(utc_offset_seconds) {
        Some(offset) => now.with_timezone(&offset).naive_local(),
        None => now.naive_utc(),
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let city = Text::new("Default city:")
        .with_default(config.default_location())
        .prompt()?;
    config.set_default_location(&city)?;

    let bike_km = CustomType::<f64>::new("Daily distance by bike (km):")
        .with_default(config.commute.bike_km)
        .with_error_message("Please type a valid number")
        .prompt()?;
    let walk_km = CustomType::<f64>::new("Daily distance on foot (km):")
        .with_default(config.commute.walk_km)
        .with_error_message("Please type a valid number")
        .prompt()?;
    config.set_commute(bike_km, walk_km)?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}
