// src/ingest/metservice.rs
//! MetService local forecast → forecast-text reading.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use crate::error::FetchError;
use crate::ingest::http;
use crate::ingest::types::SourceProvider;
use crate::model::{RawReading, RawValue, SourceKind};

pub const KAIKOURA_FORECAST_URL: &str =
    "https://www.metservice.com/publicData/localForecastKaikoura";

#[derive(Debug, Deserialize)]
struct LocalForecast {
    #[serde(default)]
    days: Vec<Day>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Day {
    #[serde(default)]
    forecast_word: Option<String>,
    #[serde(default)]
    forecast: Option<String>,
}

pub struct MetServiceProvider {
    client: reqwest::Client,
    url: String,
}

impl MetServiceProvider {
    pub fn new(timeout: Duration) -> Self {
        Self::with_url(KAIKOURA_FORECAST_URL, timeout)
    }

    pub fn with_url(url: &str, timeout: Duration) -> Self {
        Self {
            client: http::client(timeout),
            url: url.to_string(),
        }
    }
}

fn reading_from(doc: LocalForecast) -> RawReading {
    let now = Utc::now();
    let Some(today) = doc.days.into_iter().next() else {
        return RawReading::absent(SourceKind::Forecast, now);
    };
    match today.forecast_word.filter(|w| !w.trim().is_empty()) {
        Some(phrase) => RawReading::present(
            RawValue::Forecast {
                phrase,
                detail: today.forecast,
            },
            now,
        ),
        None => RawReading::absent(SourceKind::Forecast, now),
    }
}

#[async_trait]
impl SourceProvider for MetServiceProvider {
    fn name(&self) -> &'static str {
        "metservice"
    }

    fn kinds(&self) -> &'static [SourceKind] {
        &[SourceKind::Forecast]
    }

    async fn fetch(&self) -> Result<Vec<RawReading>, FetchError> {
        let doc: LocalForecast = http::fetch_json(&self.client, &self.url).await?;
        Ok(vec![reading_from(doc)])
    }
}
