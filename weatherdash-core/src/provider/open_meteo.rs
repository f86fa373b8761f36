use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    config::{DEFAULT_FORECAST_URL, DEFAULT_GEOCODING_URL},
    model::{CurrentWeather, Forecast, HourlyPoint, Location, WeatherObservation},
};

use super::WeatherProvider;

const CURRENT_FIELDS: &str = "temperature_2m,apparent_temperature,weather_code,\
relative_humidity_2m,cloud_cover,wind_speed_10m,wind_direction_10m,visibility,is_day";
const HOURLY_FIELDS: &str = "temperature_2m,weather_code,is_day";

/// Open-Meteo reports local times without seconds or offset.
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    geocoding_url: String,
    forecast_url: String,
    http: Client,
}

impl Default for OpenMeteoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenMeteoProvider {
    pub fn new() -> Self {
        Self::with_endpoints(
            DEFAULT_GEOCODING_URL.to_string(),
            DEFAULT_FORECAST_URL.to_string(),
        )
    }

    pub fn with_endpoints(geocoding_url: String, forecast_url: String) -> Self {
        Self {
            geocoding_url,
            forecast_url,
            http: Client::new(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        what: &str,
    ) -> Result<T> {
        debug!(url, what, "requesting Open-Meteo");

        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to send request to Open-Meteo ({what})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read Open-Meteo {what} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "Open-Meteo {} request failed with status {}: {}",
                what,
                status,
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse Open-Meteo {what} JSON"))
    }
}

#[derive(Debug, Deserialize)]
struct OmGeocodingResponse {
    #[serde(default)]
    results: Vec<OmPlace>,
}

#[derive(Debug, Deserialize)]
struct OmPlace {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    time: String,
    temperature_2m: Option<f64>,
    apparent_temperature: Option<f64>,
    weather_code: Option<i32>,
    relative_humidity_2m: Option<f64>,
    cloud_cover: Option<f64>,
    wind_speed_10m: Option<f64>,
    wind_direction_10m: Option<f64>,
    visibility: Option<f64>,
    is_day: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct OmHourly {
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
    weather_code: Vec<Option<i32>>,
    is_day: Vec<Option<u8>>,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    #[serde(default)]
    timezone: String,
    #[serde(default)]
    utc_offset_seconds: i32,
    current: OmCurrent,
    hourly: OmHourly,
}

impl OmForecastResponse {
    fn into_forecast(self) -> Result<Forecast> {
        let c = self.current;

        let current = CurrentWeather {
            time: parse_time(&c.time)?,
            temperature_c: c.temperature_2m,
            apparent_temperature_c: c.apparent_temperature,
            wind_direction_deg: c.wind_direction_10m,
            observation: WeatherObservation {
                wind_speed_kmh: c.wind_speed_10m,
                relative_humidity_pct: c.relative_humidity_2m,
                cloud_cover_pct: c.cloud_cover,
                visibility_m: c.visibility,
                weather_code: c.weather_code.unwrap_or(-1),
                is_day: c.is_day == Some(1),
            },
        };

        let h = self.hourly;
        let mut hourly = Vec::with_capacity(h.time.len());
        for (i, time) in h.time.iter().enumerate() {
            // Hours without a temperature can't be plotted.
            let Some(temperature_c) = h.temperature_2m.get(i).copied().flatten() else {
                continue;
            };

            hourly.push(HourlyPoint {
                time: parse_time(time)?,
                temperature_c,
                weather_code: h.weather_code.get(i).copied().flatten().unwrap_or(-1),
                is_day: h.is_day.get(i).copied().flatten() == Some(1),
            });
        }

        Ok(Forecast {
            timezone: self.timezone,
            utc_offset_seconds: self.utc_offset_seconds,
            current,
            hourly,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    async fn geocode(&self, query: &str) -> Result<Location> {
        let query = query.trim();
        if query.is_empty() {
            return Err(anyhow!("Please enter a city name"));
        }

        let parsed: OmGeocodingResponse = self
            .get_json(
                &self.geocoding_url,
                &[
                    ("name", query.to_string()),
                    ("count", "1".to_string()),
                    ("language", "en".to_string()),
                    ("format", "json".to_string()),
                ],
                "geocoding",
            )
            .await?;

        let place = parsed
            .results
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Location not found. Please try a different city name."))?;

        Ok(Location {
            name: place.name,
            country: place.country,
            latitude: place.latitude,
            longitude: place.longitude,
        })
    }

    async fn forecast(&self, location: &Location) -> Result<Forecast> {
        let parsed: OmForecastResponse = self
            .get_json(
                &self.forecast_url,
                &[
                    ("latitude", location.latitude.to_string()),
                    ("longitude", location.longitude.to_string()),
                    ("current", CURRENT_FIELDS.to_string()),
                    ("hourly", HOURLY_FIELDS.to_string()),
                    ("timezone", "auto".to_string()),
                ],
                "forecast",
            )
            .await?;

        parsed.into_forecast().context("Weather data not found")
    }
}

fn parse_time(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIME_FORMAT)
        .with_context(|| format!("Invalid Open-Meteo timestamp '{s}'"))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    const FORECAST_JSON: &str = r#"{
        "latitude": 51.5,
        "longitude": -0.12,
        "utc_offset_seconds": 3600,
        "timezone": "Europe/London",
        "current": {
            "time": "2024-05-14T09:15",
            "interval": 900,
            "temperature_2m": 18.6,
            "apparent_temperature": 17.2,
            "weather_code": 3,
            "relative_humidity_2m": 71,
            "cloud_cover": 100,
            "wind_speed_10m": 12.4,
            "wind_direction_10m": 225,
            "visibility": null,
            "is_day": 1
        },
        "hourly": {
            "time": ["2024-05-14T00:00", "2024-05-14T01:00", "2024-05-14T02:00"],
            "temperature_2m": [11.2, null, 10.4],
            "weather_code": [2, 3, null],
            "is_day": [0, 0, 0]
        }
    }"#;

    const GEOCODING_JSON: &str = r#"{
        "results": [
            {"id": 2643743, "name": "London", "latitude": 51.50853, "longitude": -0.12574,
             "country": "United Kingdom", "timezone": "Europe/London"}
        ],
        "generationtime_ms": 0.5
    }"#;

    /// Answer exactly one HTTP request with `status` and `body`; returns the
    /// base URL and a handle resolving to the raw request head.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");

            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.expect("read");
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.expect("write");
            socket.shutdown().await.ok();

            String::from_utf8_lossy(&request).into_owned()
        });

        (format!("http://{addr}"), handle)
    }

    fn london() -> Location {
        Location {
            name: "London".into(),
            country: Some("United Kingdom".into()),
            latitude: 51.5,
            longitude: -0.12,
        }
    }

    #[test]
    fn parses_forecast_payload() {
        let parsed: OmForecastResponse = serde_json::from_str(FORECAST_JSON).expect("valid json");
        let forecast = parsed.into_forecast().expect("convertible");

        assert_eq!(forecast.timezone, "Europe/London");
        assert_eq!(forecast.utc_offset_seconds, 3600);

        let current = &forecast.current;
        assert_eq!(current.time.hour(), 9);
        assert_eq!(current.time.minute(), 15);
        assert_eq!(current.wind_direction_deg, Some(225.0));

        let obs = current.observation;
        assert_eq!(obs.weather_code, 3);
        assert_eq!(obs.relative_humidity_pct, Some(71.0));
        assert_eq!(obs.visibility_m, None);
        assert!(obs.is_day);

        // the 01:00 entry has no temperature and is dropped
        assert_eq!(forecast.hourly.len(), 2);
        assert_eq!(forecast.hourly[1].time.hour(), 2);
        assert_eq!(forecast.hourly[1].weather_code, -1);
        assert!(!forecast.hourly[0].is_day);
    }

    #[test]
    fn null_current_code_maps_to_unknown() {
        let json = FORECAST_JSON
            .replace(r#""weather_code": 3,"#, r#""weather_code": null,"#)
            .replace(r#""is_day": 1"#, r#""is_day": null"#);
        let parsed: OmForecastResponse = serde_json::from_str(&json).expect("valid json");
        let forecast = parsed.into_forecast().expect("convertible");

        let obs = forecast.current.observation;
        assert_eq!(obs.weather_code, -1);
        assert!(!obs.is_day);
        assert_eq!(crate::conditions::description(obs.weather_code), "Unknown");
        assert_eq!(crate::conditions::pollution_multiplier(obs.weather_code), 1.0);
    }

    #[test]
    fn rejects_malformed_timestamps() {
        let json = FORECAST_JSON.replace("2024-05-14T09:15", "yesterday");
        let parsed: OmForecastResponse = serde_json::from_str(&json).expect("valid json");
        let err = parsed.into_forecast().unwrap_err();
        assert!(err.to_string().contains("Invalid Open-Meteo timestamp 'yesterday'"));
    }

    #[test]
    fn geocoding_without_results_field_parses_empty() {
        let parsed: OmGeocodingResponse =
            serde_json::from_str(r#"{"generationtime_ms": 0.3}"#).expect("valid json");
        assert!(parsed.results.is_empty());
    }

    #[test]
    fn truncate_body_limits_length() {
        assert_eq!(truncate_body("short"), "short");

        let long = "é".repeat(150);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert!(cut.len() <= 203);
    }

    #[tokio::test]
    async fn geocode_returns_first_match() {
        let (base, request) = serve_once("200 OK", GEOCODING_JSON).await;
        let provider =
            OpenMeteoProvider::with_endpoints(format!("{base}/v1/search"), String::new());

        let location = provider.geocode("  London ").await.expect("geocode");
        assert_eq!(location.name, "London");
        assert_eq!(location.country.as_deref(), Some("United Kingdom"));
        assert_eq!(location.display_name(), "London, United Kingdom");

        let head = request.await.expect("server task");
        assert!(head.starts_with("GET /v1/search?name=London&count=1&language=en&format=json"));
    }

    #[tokio::test]
    async fn geocode_reports_unknown_place() {
        let (base, _request) = serve_once("200 OK", r#"{"generationtime_ms": 0.3}"#).await;
        let provider = OpenMeteoProvider::with_endpoints(base, String::new());

        let err = provider.geocode("Atlantis").await.unwrap_err();
        assert!(err.to_string().contains("Location not found"));
    }

    #[tokio::test]
    async fn geocode_rejects_blank_query_without_request() {
        let provider = OpenMeteoProvider::with_endpoints(
            "http://127.0.0.1:1".into(),
            "http://127.0.0.1:1".into(),
        );
        let err = provider.geocode("   ").await.unwrap_err();
        assert_eq!(err.to_string(), "Please enter a city name");
    }

    #[tokio::test]
    async fn forecast_requests_fields_and_parses() {
        let (base, request) = serve_once("200 OK", FORECAST_JSON).await;
        let provider =
            OpenMeteoProvider::with_endpoints(String::new(), format!("{base}/v1/forecast"));

        let forecast = provider.forecast(&london()).await.expect("forecast");
        assert_eq!(forecast.current.observation.weather_code, 3);

        let head = request.await.expect("server task");
        assert!(head.starts_with("GET /v1/forecast?latitude=51.5&longitude=-0.12&current="));
        assert!(head.contains("timezone=auto"));
    }

    #[tokio::test]
    async fn forecast_surfaces_http_errors() {
        let (base, _request) =
            serve_once("400 Bad Request", r#"{"error":true,"reason":"Latitude must be in range"}"#)
                .await;
        let provider = OpenMeteoProvider::with_endpoints(String::new(), base);

        let err = provider.forecast(&london()).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Open-Meteo forecast request failed with status 400 Bad Request"));
        assert!(msg.contains("Latitude must be in range"));
    }
}
