// src/ingest/mod.rs
pub mod http;
pub mod metservice;
pub mod open_meteo;
pub mod types;
pub mod webcam;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use tokio::task::JoinSet;

use crate::error::FetchError;
use crate::model::{Availability, RawReading, SourceKind};

pub use types::{Location, SourceProvider, KAIKOURA};

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("provider_errors_total", "Provider fetch errors and timeouts.");
        describe_counter!(
            "source_unavailable_total",
            "Sources that ended a cycle without a score."
        );
        describe_counter!("cycles_total", "Completed fetch-score-notify cycles.");
        describe_counter!("cycle_failures_total", "Cycles that failed or panicked.");
        describe_counter!("delivery_failures_total", "Notification delivery failures.");
        describe_histogram!("provider_fetch_ms", "Provider fetch time in milliseconds.");
        describe_gauge!("last_overall_score", "Overall score of the last cycle.");
        describe_gauge!("last_cycle_ts", "Unix ts of the last completed cycle.");
    });
}

/// Default providers for Kaikoura.
pub fn default_providers(timeout: Duration) -> Vec<Arc<dyn SourceProvider>> {
    vec![
        Arc::new(open_meteo::OpenMeteoProvider::new(&KAIKOURA, timeout)),
        Arc::new(metservice::MetServiceProvider::new(timeout)),
        Arc::new(webcam::WebcamProvider::kaikoura(timeout)),
    ]
}

async fn fetch_with_timeout(
    provider: Arc<dyn SourceProvider>,
    timeout: Duration,
) -> Result<Vec<RawReading>, FetchError> {
    let t0 = std::time::Instant::now();
    let res = match tokio::time::timeout(timeout, provider.fetch()).await {
        Ok(res) => res,
        Err(_) => Err(FetchError::Timeout {
            provider: provider.name(),
            secs: timeout.as_secs(),
        }),
    };
    histogram!("provider_fetch_ms", "provider" => provider.name())
        .record(t0.elapsed().as_secs_f64() * 1_000.0);
    res
}

fn mark_failed(by_kind: &mut BTreeMap<SourceKind, RawReading>, kinds: &[SourceKind], reason: &str) {
    let now = Utc::now();
    for kind in kinds {
        by_kind.insert(*kind, RawReading::error(*kind, now, reason));
    }
}

/// Fetch every provider concurrently, each bounded by `timeout`, and wait for
/// all of them to settle.
///
/// Always returns exactly one reading per source kind, in display order. A
/// provider error, timeout or panic marks all of its kinds as errors; kinds nobody
/// reported are absent. Dropping the returned future aborts in-flight fetches.
pub async fn collect_readings(providers: &[Arc<dyn SourceProvider>], timeout: Duration) -> Vec<RawReading> {
    ensure_metrics_described();

    let mut set = JoinSet::new();
    for (idx, p) in providers.iter().enumerate() {
        let p = Arc::clone(p);
        set.spawn(async move { (idx, fetch_with_timeout(p, timeout).await) });
    }

    let mut settled = vec![false; providers.len()];
    let mut by_kind: BTreeMap<SourceKind, RawReading> = BTreeMap::new();
    while let Some(joined) = set.join_next().await {
        let (idx, res) = match joined {
            Ok(v) => v,
            Err(e) => {
                // panicked; marked through `settled` below
                tracing::error!(target: "ingest", error = %e, "provider task failed");
                continue;
            }
        };
        settled[idx] = true;
        let provider = &providers[idx];
        match res {
            Ok(readings) => {
                for r in readings {
                    if let Availability::Error(e) = &r.availability {
                        tracing::warn!(target: "ingest", provider = provider.name(), source = %r.source, error = %e, "source fetch failed");
                    }
                    by_kind.insert(r.source, r);
                }
            }
            Err(e) => {
                tracing::warn!(target: "ingest", provider = provider.name(), error = %e, "provider error");
                counter!("provider_errors_total", "provider" => provider.name()).increment(1);
                mark_failed(&mut by_kind, provider.kinds(), &e.to_string());
            }
        }
    }

    for (provider, _) in providers.iter().zip(&settled).filter(|(_, done)| !**done) {
        counter!("provider_errors_total", "provider" => provider.name()).increment(1);
        let reason = format!("{}: provider panicked", provider.name());
        mark_failed(&mut by_kind, provider.kinds(), &reason);
    }

    let now = Utc::now();
    SourceKind::ALL
        .iter()
        .map(|k| by_kind.remove(k).unwrap_or_else(|| RawReading::absent(*k, now)))
        .collect()
}
