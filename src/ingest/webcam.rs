// src/ingest/webcam.rs
//! Webcam image endpoints → availability reading.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::task::JoinSet;

use crate::error::FetchError;
use crate::ingest::http;
use crate::ingest::types::SourceProvider;
use crate::model::{RawReading, RawValue, SourceKind};

/// (name, url) pairs. These endpoints move around and often fail.
pub const KAIKOURA_WEBCAMS: [(&str, &str); 3] = [
    ("kutai", "https://www.kutai.cam/current.jpg"),
    ("tascam", "https://tascam.example.com/latest.jpg"),
    ("cawthron-eye", "https://coastalcams.cawthron.org.nz/current.jpg"),
];

pub struct WebcamProvider {
    client: reqwest::Client,
    cams: Vec<(String, String)>,
}

impl WebcamProvider {
    pub fn kaikoura(timeout: Duration) -> Self {
        Self::new(
            KAIKOURA_WEBCAMS
                .iter()
                .map(|(n, u)| (n.to_string(), u.to_string()))
                .collect(),
            timeout,
        )
    }

    /// Cameras are fetched concurrently; each request gets a share of
    /// `timeout` so a hanging camera gives up before the provider does.
    pub fn new(cams: Vec<(String, String)>, timeout: Duration) -> Self {
        Self {
            client: http::client(per_camera_timeout(timeout)),
            cams,
        }
    }
}

pub fn per_camera_timeout(provider_timeout: Duration) -> Duration {
    provider_timeout.mul_f64(0.8)
}

#[async_trait]
impl SourceProvider for WebcamProvider {
    fn name(&self) -> &'static str {
        "webcams"
    }

    fn kinds(&self) -> &'static [SourceKind] {
        &[SourceKind::Webcam]
    }

    async fn fetch(&self) -> Result<Vec<RawReading>, FetchError> {
        let mut set = JoinSet::new();
        for (idx, (_, url)) in self.cams.iter().enumerate() {
            let client = self.client.clone();
            let url = url.clone();
            set.spawn(async move { (idx, http::fetch_bytes(&client, &url).await) });
        }

        let mut results = Vec::with_capacity(self.cams.len());
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(r) => results.push(r),
                Err(e) => tracing::warn!(target: "ingest", error = %e, "webcam task failed"),
            }
        }
        // camera order, not completion order
        results.sort_by_key(|(idx, _)| *idx);

        let mut sizes = Vec::with_capacity(self.cams.len());
        let mut last_error = None;
        for (idx, res) in results {
            let name = &self.cams[idx].0;
            match res {
                Ok(bytes) if !bytes.is_empty() => {
                    tracing::debug!(target: "ingest", cam = %name, bytes = bytes.len(), "webcam image");
                    sizes.push(bytes.len());
                }
                Ok(_) => {
                    tracing::debug!(target: "ingest", cam = %name, "empty webcam image");
                    last_error = Some(format!("{name}: empty image"));
                }
                Err(e) => {
                    tracing::debug!(target: "ingest", cam = %name, error = %e, "webcam fetch failed");
                    last_error = Some(format!("{name}: {e}"));
                }
            }
        }

        let now = Utc::now();
        let reading = if sizes.is_empty() {
            let reason = last_error.unwrap_or_else(|| "no webcams configured".to_string());
            RawReading::error(SourceKind::Webcam, now, reason)
        } else {
            RawReading::present(
                RawValue::Webcam {
                    image_sizes: sizes,
                    attempted: self.cams.len(),
                },
                now,
            )
        };
        Ok(vec![reading])
    }
}
