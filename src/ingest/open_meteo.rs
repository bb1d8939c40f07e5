// src/ingest/open_meteo.rs
//! Open-Meteo marine + forecast APIs → swell and wind readings.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Timelike, Utc};
use serde::Deserialize;

use crate::error::FetchError;
use crate::ingest::http;
use crate::ingest::types::{Location, SourceProvider};
use crate::model::{RawQuantity, RawReading, RawValue, SourceKind};

pub const MARINE_BASE_URL: &str = "https://marine-api.open-meteo.com";
pub const FORECAST_BASE_URL: &str = "https://api.open-meteo.com";

/// Hourly values are read at the first hour of the first day at or after this.
pub const READING_HOUR: u32 = 7;

#[derive(Debug, Default, Deserialize)]
struct Series {
    #[serde(default)]
    time: Vec<String>,
    #[serde(flatten)]
    columns: HashMap<String, Vec<Option<f64>>>,
}

impl Series {
    fn value(&self, column: &str, idx: usize) -> Option<f64> {
        self.columns.get(column)?.get(idx).copied().flatten()
    }
}

#[derive(Debug, Default, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    hourly_units: HashMap<String, String>,
    #[serde(default)]
    hourly: Series,
    #[serde(default)]
    daily_units: HashMap<String, String>,
    #[serde(default)]
    daily: Series,
}

impl ApiResponse {
    fn hourly_quantity(&self, column: &str, idx: usize, default_unit: &str) -> Option<RawQuantity> {
        let v = self.hourly.value(column, idx)?;
        let unit = self
            .hourly_units
            .get(column)
            .map(String::as_str)
            .unwrap_or(default_unit);
        Some(RawQuantity::number(v, unit))
    }

    fn daily_quantity(&self, column: &str, default_unit: &str) -> Option<RawQuantity> {
        let v = self.daily.value(column, 0)?;
        let unit = self
            .daily_units
            .get(column)
            .map(String::as_str)
            .unwrap_or(default_unit);
        Some(RawQuantity::number(v, unit))
    }
}

/// Index of the first hourly slot on the first day at or after `hour`.
/// Falls back to 0 when the times cannot be parsed.
pub fn reading_index(times: &[String], hour: u32) -> usize {
    let parsed: Vec<Option<NaiveDateTime>> = times
        .iter()
        .map(|t| NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M").ok())
        .collect();
    let Some(first_day) = parsed.iter().flatten().next().map(|t| t.date()) else {
        return 0;
    };
    parsed
        .iter()
        .position(|t| matches!(t, Some(t) if t.date() == first_day && t.hour() >= hour))
        .unwrap_or(0)
}

pub struct OpenMeteoProvider {
    client: reqwest::Client,
    marine_url: String,
    forecast_url: String,
}

impl OpenMeteoProvider {
    pub fn new(location: &Location, timeout: Duration) -> Self {
        Self::with_base_urls(location, timeout, MARINE_BASE_URL, FORECAST_BASE_URL)
    }

    pub fn with_base_urls(location: &Location, timeout: Duration, marine_base: &str, forecast_base: &str) -> Self {
        let marine_url = format!(
            "{}/v1/marine?latitude={}&longitude={}&hourly=wave_height,wave_direction,wave_period&daily=wave_height_max&timezone={}",
            marine_base.trim_end_matches('/'),
            location.latitude,
            location.longitude,
            location.timezone
        );
        let forecast_url = format!(
            "{}/v1/forecast?latitude={}&longitude={}&hourly=temperature_2m,wind_speed_10m,wind_direction_10m,precipitation_probability&wind_speed_unit=ms&timezone={}",
            forecast_base.trim_end_matches('/'),
            location.latitude,
            location.longitude,
            location.timezone
        );
        Self {
            client: http::client(timeout),
            marine_url,
            forecast_url,
        }
    }

    fn swell_reading(marine: Result<ApiResponse, FetchError>) -> RawReading {
        let now = Utc::now();
        let resp = match marine {
            Ok(r) => r,
            Err(e) => return RawReading::error(SourceKind::Swell, now, e.to_string()),
        };
        let idx = reading_index(&resp.hourly.time, READING_HOUR);
        let height = resp
            .daily_quantity("wave_height_max", "m")
            .or_else(|| resp.hourly_quantity("wave_height", idx, "m"));
        match height {
            Some(height) => RawReading::present(
                RawValue::Swell {
                    height,
                    period: resp.hourly_quantity("wave_period", idx, "s"),
                },
                now,
            ),
            None => RawReading::absent(SourceKind::Swell, now),
        }
    }

    fn wind_reading(forecast: Result<ApiResponse, FetchError>) -> RawReading {
        let now = Utc::now();
        let resp = match forecast {
            Ok(r) => r,
            Err(e) => return RawReading::error(SourceKind::Wind, now, e.to_string()),
        };
        let idx = reading_index(&resp.hourly.time, READING_HOUR);
        match resp.hourly_quantity("wind_speed_10m", idx, "m/s") {
            Some(speed) => RawReading::present(
                RawValue::Wind {
                    speed,
                    direction: resp.hourly_quantity("wind_direction_10m", idx, "°"),
                    precipitation: resp.hourly_quantity("precipitation_probability", idx, "%"),
                },
                now,
            ),
            None => RawReading::absent(SourceKind::Wind, now),
        }
    }
}

#[async_trait]
impl SourceProvider for OpenMeteoProvider {
    fn name(&self) -> &'static str {
        "open-meteo"
    }

    fn kinds(&self) -> &'static [SourceKind] {
        &[SourceKind::Swell, SourceKind::Wind]
    }

    async fn fetch(&self) -> Result<Vec<RawReading>, FetchError> {
        let (marine, forecast) = tokio::join!(
            http::fetch_json::<ApiResponse>(&self.client, &self.marine_url),
            http::fetch_json::<ApiResponse>(&self.client, &self.forecast_url),
        );
        Ok(vec![Self::swell_reading(marine), Self::wind_reading(forecast)])
    }
}
