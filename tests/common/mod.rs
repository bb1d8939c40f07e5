// tests/common/mod.rs
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use spearfishing_conditions::error::{DeliveryError, FetchError};
use spearfishing_conditions::ingest::SourceProvider;
use spearfishing_conditions::model::{RawQuantity, RawReading, RawValue, SourceKind};
use spearfishing_conditions::notify::{Message, Notifier};
use spearfishing_conditions::{Pipeline, ScoringConfig};

/// Provider that returns canned readings.
pub struct Canned {
    pub name: &'static str,
    pub kinds: &'static [SourceKind],
    pub readings: Vec<RawReading>,
}

#[async_trait::async_trait]
impl SourceProvider for Canned {
    fn name(&self) -> &'static str {
        self.name
    }
    fn kinds(&self) -> &'static [SourceKind] {
        self.kinds
    }
    async fn fetch(&self) -> Result<Vec<RawReading>, FetchError> {
        Ok(self.readings.clone())
    }
}

/// Provider that always fails with an HTTP status.
pub struct Failing {
    pub kinds: &'static [SourceKind],
}

#[async_trait::async_trait]
impl SourceProvider for Failing {
    fn name(&self) -> &'static str {
        "failing"
    }
    fn kinds(&self) -> &'static [SourceKind] {
        self.kinds
    }
    async fn fetch(&self) -> Result<Vec<RawReading>, FetchError> {
        Err(FetchError::Status {
            url: "http://upstream.test/".into(),
            status: 503,
        })
    }
}

pub fn calm_marine() -> Canned {
    let now = Utc::now();
    Canned {
        name: "marine",
        kinds: &[SourceKind::Swell, SourceKind::Wind],
        readings: vec![
            // 0.5 m @ 14 s → 100
            RawReading::present(
                RawValue::Swell {
                    height: RawQuantity::number(0.5, "m"),
                    period: Some(RawQuantity::number(14.0, "s")),
                },
                now,
            ),
            // 7.7 m/s offshore → 60
            RawReading::present(
                RawValue::Wind {
                    speed: RawQuantity::number(7.7, "m/s"),
                    direction: Some(RawQuantity::text("NW", "°")),
                    precipitation: Some(RawQuantity::number(10.0, "%")),
                },
                now,
            ),
        ],
    }
}

pub fn fine_forecast() -> Canned {
    Canned {
        name: "forecast",
        kinds: &[SourceKind::Forecast],
        readings: vec![RawReading::present(
            RawValue::Forecast {
                phrase: "Fine".into(),
                detail: Some("Fine. Light winds.".into()),
            },
            Utc::now(),
        )],
    }
}

pub fn webcams_up() -> Canned {
    Canned {
        name: "webcams",
        kinds: &[SourceKind::Webcam],
        readings: vec![RawReading::present(
            RawValue::Webcam {
                image_sizes: vec![51_200, 48_000],
                attempted: 3,
            },
            Utc::now(),
        )],
    }
}

pub fn pipeline(providers: Vec<Arc<dyn SourceProvider>>) -> Pipeline {
    Pipeline::new(
        providers,
        Arc::new(ScoringConfig::default()),
        Duration::from_secs(5),
    )
}

pub fn healthy_pipeline() -> Pipeline {
    pipeline(vec![
        Arc::new(calm_marine()),
        Arc::new(fine_forecast()),
        Arc::new(webcams_up()),
    ])
}

/// Notifier that records subjects.
#[derive(Clone, Default)]
pub struct Recorder(pub Arc<Mutex<Vec<Message>>>);

#[async_trait::async_trait]
impl Notifier for Recorder {
    fn name(&self) -> &'static str {
        "recorder"
    }
    async fn send(&self, msg: &Message) -> Result<(), DeliveryError> {
        self.0.lock().unwrap().push(msg.clone());
        Ok(())
    }
}

/// Notifier that always fails like an SMTP server refusing the login.
pub struct SmtpDown;

#[async_trait::async_trait]
impl Notifier for SmtpDown {
    fn name(&self) -> &'static str {
        "email"
    }
    async fn send(&self, _msg: &Message) -> Result<(), DeliveryError> {
        Err(DeliveryError::Smtp("535 authentication failed".into()))
    }
}
