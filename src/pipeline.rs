//! # Pipeline
//! fetch → convert/score → aggregate → notify, for one cycle.
//!
//! `Pipeline::rate` has no side effects beyond the provider fetches and is
//! what the interactive surface calls. `Cycle` adds delivery and is what the
//! scheduler runs.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use metrics::{counter, gauge};
use serde::Serialize;

use crate::aggregate;
use crate::config::{AppConfig, ScoringConfig};
use crate::ingest::{self, SourceProvider};
use crate::model::{DailyRating, RawReading};
use crate::notify::{self, Message, NotifierMux};
use crate::scheduler::CycleRunner;
use crate::score;

pub struct Pipeline {
    providers: Vec<Arc<dyn SourceProvider>>,
    scoring: Arc<ScoringConfig>,
    fetch_timeout: Duration,
}

impl Pipeline {
    pub fn new(
        providers: Vec<Arc<dyn SourceProvider>>,
        scoring: Arc<ScoringConfig>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            providers,
            scoring,
            fetch_timeout,
        }
    }

    /// Kaikoura providers with the configured timeout.
    pub fn from_config(cfg: &AppConfig, scoring: Arc<ScoringConfig>) -> Self {
        Self::new(
            ingest::default_providers(cfg.fetch_timeout),
            scoring,
            cfg.fetch_timeout,
        )
    }

    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    /// Pure part of the cycle: readings → rating.
    pub fn evaluate(&self, readings: &[RawReading]) -> DailyRating {
        let scored = score::score_all(readings, &self.scoring);
        for s in scored.iter().filter(|s| !s.score.is_available()) {
            counter!("source_unavailable_total", "source" => s.source.label()).increment(1);
        }
        aggregate::aggregate(scored, Utc::now())
    }

    pub async fn rate(&self) -> DailyRating {
        let readings = ingest::collect_readings(&self.providers, self.fetch_timeout).await;
        self.evaluate(&readings)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub rating: DailyRating,
    pub message: Message,
    /// Channels that failed, with the error text.
    pub delivery_failures: Vec<(String, String)>,
}

/// Scheduled unit of work: rate, format, deliver.
pub struct Cycle {
    pipeline: Arc<Pipeline>,
    notifier: NotifierMux,
}

impl Cycle {
    pub fn new(pipeline: Arc<Pipeline>, notifier: NotifierMux) -> Self {
        Self { pipeline, notifier }
    }

    pub async fn run(&self) -> CycleReport {
        let rating = self.pipeline.rate().await;
        let message = notify::format_message(&rating);

        // Delivery errors end here; the rating is still reported.
        let delivery_failures = self
            .notifier
            .notify(&message)
            .await
            .into_iter()
            .map(|f| (f.channel.to_string(), f.error.to_string()))
            .collect();

        counter!("cycles_total").increment(1);
        gauge!("last_cycle_ts").set(Utc::now().timestamp() as f64);
        if let Some(v) = rating.overall {
            gauge!("last_overall_score").set(f64::from(v));
        }

        tracing::info!(
            target: "cycle",
            overall = ?rating.overall,
            available = rating.sources.iter().filter(|s| s.score.is_available()).count(),
            "cycle complete"
        );

        CycleReport {
            rating,
            message,
            delivery_failures,
        }
    }
}

#[async_trait::async_trait]
impl CycleRunner for Cycle {
    async fn run_cycle(&self) -> anyhow::Result<CycleReport> {
        Ok(self.run().await)
    }
}
