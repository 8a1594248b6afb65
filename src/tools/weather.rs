//! Current weather lookup using the Open-Meteo geocoding and forecast APIs.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::Result;

use super::utils::{fetch_json, require_text};
use super::{ToolHandler, ToolKind};

const GEOCODING_BASE_URL: &str = "https://geocoding-api.open-meteo.com";
const FORECAST_BASE_URL: &str = "https://api.open-meteo.com";
const GEOCODING_PATH: &str = "/v1/search";
const FORECAST_PATH: &str = "/v1/forecast";
const CURRENT_FIELDS: &str = "temperature_2m,apparent_temperature,relative_humidity_2m,wind_speed_10m,weather_code";

#[derive(Debug, Deserialize)]
struct WeatherArgs {
    location: String,
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<Place>,
}

#[derive(Debug, Deserialize)]
struct Place {
    name: String,
    country: Option<String>,
    latitude: f64,
    longitude: f64,
}

impl Place {
    fn label(&self) -> String {
        match &self.country {
            Some(country) => format!("{}, {country}", self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentWeather,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature_2m: f64,
    apparent_temperature: Option<f64>,
    relative_humidity_2m: Option<f64>,
    wind_speed_10m: Option<f64>,
    weather_code: u8,
}

pub struct Weather {
    client: Client,
    geocoding_base_url: String,
    forecast_base_url: String,
}

impl Weather {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            geocoding_base_url: GEOCODING_BASE_URL.to_string(),
            forecast_base_url: FORECAST_BASE_URL.to_string(),
        }
    }

    /// Point both Open-Meteo APIs at another host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.geocoding_base_url.clone_from(&base_url);
        self.forecast_base_url = base_url;
        self
    }
}

/// Human-readable label for a WMO weather interpretation code.
fn describe_weather_code(code: u8) -> &'static str {
    match code {
        0 => "clear sky",
        1 => "mainly clear",
        2 => "partly cloudy",
        3 => "overcast",
        45 | 48 => "foggy",
        51 | 53 | 55 => "drizzle",
        56 | 57 => "freezing drizzle",
        61 | 63 | 65 => "rain",
        66 | 67 => "freezing rain",
        71 | 73 | 75 => "snow",
        77 => "snow grains",
        80..=82 => "rain showers",
        85 | 86 => "snow showers",
        95 => "thunderstorm",
        96 | 99 => "thunderstorm with hail",
        _ => "unknown conditions",
    }
}

fn format_report(place: &Place, current: &CurrentWeather) -> String {
    let mut report = format!(
        "The weather in {} is {:.1}°C and {}",
        place.label(),
        current.temperature_2m,
        describe_weather_code(current.weather_code)
    );
    if let Some(feels_like) = current.apparent_temperature {
        report.push_str(&format!(", feels like {feels_like:.1}°C"));
    }
    if let Some(humidity) = current.relative_humidity_2m {
        report.push_str(&format!(", humidity {humidity:.0}%"));
    }
    if let Some(wind) = current.wind_speed_10m {
        report.push_str(&format!(", wind {wind:.1} km/h"));
    }
    report.push('.');
    report
}

#[async_trait]
impl ToolHandler for Weather {
    fn kind(&self) -> ToolKind {
        ToolKind::Weather
    }

    fn description(&self) -> &'static str {
        "Get the current weather for a given location"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "City or place name to get the weather for, e.g. 'Paris'"
                }
            },
            "required": ["location"]
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String> {
        let args: WeatherArgs = serde_json::from_str(arguments)?;
        let location = require_text(&args.location, "location")?;

        debug!("Geocoding location: {location}");
        let geocoding: GeocodingResponse = fetch_json(
            self.client
                .get(format!("{}{GEOCODING_PATH}", self.geocoding_base_url))
                .query(&[("name", location), ("count", "1"), ("format", "json")]),
        )
        .await?;

        let Some(place) = geocoding.results.into_iter().next() else {
            return Ok(format!("Could not find a place called '{location}'"));
        };

        debug!(
            "Fetching weather for {} ({}, {})",
            place.label(),
            place.latitude,
            place.longitude
        );
        let url = format!("{}{FORECAST_PATH}", self.forecast_base_url);
        let forecast: ForecastResponse = fetch_json(self.client.get(url).query(&[
            ("latitude", place.latitude.to_string()),
            ("longitude", place.longitude.to_string()),
            ("current", CURRENT_FIELDS.to_string()),
        ]))
        .await?;

        Ok(format_report(&place, &forecast.current))
    }
}
