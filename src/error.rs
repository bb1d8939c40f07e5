//! Error taxonomy for the rating pipeline.
//!
//! Per-source errors (`FetchError`, `ConversionError`) never abort a cycle:
//! the pipeline turns them into an unavailable source. `DeliveryError` stops
//! at the notifier boundary. `ConfigError` is logged and replaced by a default.

use thiserror::Error;

use crate::model::SourceKind;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{url}: request failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url}: HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{provider}: timed out after {secs}s")]
    Timeout { provider: &'static str, secs: u64 },

    #[error("{url}: unexpected payload: {reason}")]
    Decode { url: String, reason: String },
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConversionError {
    #[error("value {0:?} is not numeric")]
    NotNumeric(String),

    #[error("value {0} is not finite")]
    NotFinite(f64),

    #[error("unit {0:?} is not recognized")]
    UnknownUnit(String),

    #[error("unit {unit:?} does not measure {expected}")]
    WrongDimension { unit: String, expected: &'static str },

    #[error("text is empty")]
    EmptyText,

    #[error("reading does not match source {0}")]
    MismatchedSource(SourceKind),
}

/// Scorers are total; this only surfaces a misconfigured curve.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScoringError {
    #[error("curve has no breakpoints")]
    EmptyCurve,

    #[error("curve breakpoints are not sorted by x")]
    UnsortedCurve,
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("invalid address {address:?}: {reason}")]
    Address { address: String, reason: String },

    #[error("building message: {0}")]
    Build(String),

    #[error("smtp: {0}")]
    Smtp(String),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("EMAIL_FREQUENCY={0:?} is not one of daily|weekly")]
    InvalidFrequency(String),

    #[error("{var}={value:?} is not a valid {expected}")]
    InvalidValue {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}
