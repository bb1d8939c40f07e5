//! Notifications: format a `DailyRating` and fan it out to delivery channels.
//!
//! Formatting is pure. Channels implement [`Notifier`]; failures are logged and
//! returned to the caller but never abort a cycle.

pub mod display;
pub mod email;

use std::fmt::Write as _;

use metrics::counter;
use serde::Serialize;

use crate::config::AppConfig;
use crate::error::DeliveryError;
use crate::model::{DailyRating, SourceScore};

pub use display::DisplayNotifier;
pub use email::EmailNotifier;

pub const SUBJECT: &str = "Spearfishing update";
pub const LOCATION: &str = "Kaikoura";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub subject: String,
    pub body: String,
}

/// Human-readable summary. Unavailable sources say "no data", never 0.
pub fn format_message(rating: &DailyRating) -> Message {
    let mut body = String::new();
    let _ = writeln!(
        body,
        "Spearfishing conditions for {LOCATION} ({})",
        rating
            .computed_at
            .with_timezone(&chrono::Local)
            .format("%a %d %b %Y %H:%M")
    );
    match rating.overall {
        Some(v) => {
            let _ = writeln!(body, "Overall rating: {v}/100");
        }
        None => {
            let _ = writeln!(body, "Overall rating: no data available");
        }
    }

    for s in &rating.sources {
        let extra = if s.counts_toward_overall {
            ""
        } else {
            " [not averaged]"
        };
        let _ = match &s.score {
            SourceScore::Available(v) => {
                writeln!(body, "  {}: {v}/100 ({}){extra}", s.source, s.display)
            }
            SourceScore::Unavailable(reason) => {
                writeln!(body, "  {}: no data ({reason})", s.source)
            }
        };
    }

    let reasons: Vec<String> = rating
        .sources
        .iter()
        .flat_map(|s| s.notes.iter().cloned())
        .collect();
    if !reasons.is_empty() {
        let _ = writeln!(body, "Reasons:");
        for r in reasons {
            let _ = writeln!(body, "  - {r}");
        }
    }

    Message {
        subject: SUBJECT.to_string(),
        body,
    }
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;
    async fn send(&self, msg: &Message) -> Result<(), DeliveryError>;
}

#[derive(Debug)]
pub struct DeliveryFailure {
    pub channel: &'static str,
    pub error: DeliveryError,
}

/// Sends to every configured channel.
#[derive(Default)]
pub struct NotifierMux {
    channels: Vec<Box<dyn Notifier>>,
}

impl NotifierMux {
    pub fn new() -> Self {
        Self::default()
    }

    /// Display always; email only when credentials are configured.
    pub fn from_config(cfg: &AppConfig) -> Self {
        let mut mux = Self::new().with(DisplayNotifier::stdout());
        match &cfg.email {
            Some(email_cfg) => match EmailNotifier::new(email_cfg) {
                Ok(n) => mux = mux.with(n),
                Err(e) => {
                    tracing::warn!(target: "notify", error = %e, "email disabled: bad configuration")
                }
            },
            None => tracing::info!(target: "notify", "email not configured; display-only mode"),
        }
        mux
    }

    pub fn with<N: Notifier + 'static>(mut self, n: N) -> Self {
        self.channels.push(Box::new(n));
        self
    }

    pub fn channel_names(&self) -> Vec<&'static str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    pub async fn notify(&self, msg: &Message) -> Vec<DeliveryFailure> {
        let mut failures = Vec::new();
        for ch in &self.channels {
            match ch.send(msg).await {
                Ok(()) => tracing::debug!(target: "notify", channel = ch.name(), "delivered"),
                Err(error) => {
                    tracing::warn!(target: "notify", channel = ch.name(), error = %error, "delivery failed");
                    counter!("delivery_failures_total", "channel" => ch.name()).increment(1);
                    failures.push(DeliveryFailure {
                        channel: ch.name(),
                        error,
                    });
                }
            }
        }
        failures
    }
}
