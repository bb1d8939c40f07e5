// src/ingest/http.rs
//! Single-attempt GET helpers shared by the providers.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::FetchError;

pub const USER_AGENT: &str = concat!("spearfishing-conditions/", env!("CARGO_PKG_VERSION"));

/// Client with a per-request timeout. No retries.
pub fn client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(target: "ingest", error = %e, "falling back to default HTTP client");
            reqwest::Client::new()
        })
}

fn transport(url: &str, e: reqwest::Error) -> FetchError {
    FetchError::Transport {
        url: url.to_string(),
        source: e,
    }
}

async fn get_ok(client: &reqwest::Client, url: &str) -> Result<reqwest::Response, FetchError> {
    let resp = client.get(url).send().await.map_err(|e| transport(url, e))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(resp)
}

pub async fn fetch_json<T: DeserializeOwned>(client: &reqwest::Client, url: &str) -> Result<T, FetchError> {
    let body = get_ok(client, url)
        .await?
        .text()
        .await
        .map_err(|e| transport(url, e))?;
    serde_json::from_str(&body).map_err(|e| FetchError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

pub async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, FetchError> {
    let bytes = get_ok(client, url)
        .await?
        .bytes()
        .await
        .map_err(|e| transport(url, e))?;
    Ok(bytes.to_vec())
}
