use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{
    error::FetchError,
    model::{HourlyForecast, Snapshot},
};

use super::WeatherProvider;

/// Client for the WeatherAPI.com `forecast.json` endpoint.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    /// `base_url` is everything before `/forecast.json`, e.g. `https://api.weatherapi.com/v1`.
    pub fn with_base_url(
        api_key: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let http = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self { api_key, base_url, http })
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn fetch(&self, location: &str) -> Result<Snapshot, FetchError> {
        let url = format!("{}/forecast.json", self.base_url);
        debug!(%url, location, "requesting forecast");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", location),
                ("days", "1"),
                ("aqi", "no"),
                ("alerts", "no"),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if status != StatusCode::OK {
            warn!(%status, "WeatherAPI forecast request failed");
            debug!(body = %truncate_body(&body), "WeatherAPI error body");
            return Err(FetchError::ServiceUnavailable);
        }

        parse_forecast(&body)
    }
}

/// Decode a `forecast.json` body into a [`Snapshot`].
pub fn parse_forecast(body: &str) -> Result<Snapshot, FetchError> {
    let parsed: WaForecastResponse = serde_json::from_str(body)?;
    parsed.into_snapshot()
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaForecastHour {
    #[serde(with = "chrono::serde::ts_seconds")]
    time_epoch: DateTime<Utc>,
    temp_c: f64,
    chance_of_rain: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    hour: Vec<WaForecastHour>,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    location: WaLocation,
    current: WaCurrent,
    forecast: WaForecast,
}

impl WaForecastResponse {
    fn into_snapshot(self) -> Result<Snapshot, FetchError> {
        let day =
            self.forecast.forecastday.into_iter().next().ok_or(FetchError::MissingForecast)?;

        let hours = day
            .hour
            .into_iter()
            .map(|h| HourlyForecast {
                time: h.time_epoch,
                temperature_c: h.temp_c,
                rain_chance_pct: h.chance_of_rain,
                condition: h.condition.text,
            })
            .collect();

        Ok(Snapshot {
            location_name: self.location.name,
            country: self.location.country,
            temperature_c: self.current.temp_c,
            condition: self.current.condition.text,
            hours,
        })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
