//! Source scorers: raw reading → converted measure → 0–100 score.
//!
//! `score_reading` is total: missing data, fetch errors and conversion errors
//! all come back as an unavailable `ScoredSource` instead of an error.

pub mod curve;
pub mod forecast;
pub mod swell;
pub mod webcam;
pub mod wind;

use tracing::debug;

use crate::config::ScoringConfig;
use crate::convert;
use crate::error::ConversionError;
use crate::model::{Availability, RawReading, RawValue, ScoredSource, SourceKind};

use self::swell::SwellMeasure;
use self::webcam::WebcamMeasure;
use self::wind::WindMeasure;

pub fn score_reading(reading: &RawReading, cfg: &ScoringConfig) -> ScoredSource {
    let scored = match &reading.availability {
        Availability::Absent => ScoredSource::unavailable(reading.source, "not reported"),
        Availability::Error(e) => ScoredSource::unavailable(reading.source, e.clone()),
        Availability::Present(value) if value.kind() != reading.source => {
            let e = ConversionError::MismatchedSource(reading.source);
            ScoredSource::unavailable(reading.source, e.to_string())
        }
        Availability::Present(value) => match score_value(value, cfg) {
            Ok(scored) => scored,
            Err(e) => ScoredSource::unavailable(reading.source, e.to_string()),
        },
    };

    debug!(
        target: "score",
        source = %scored.source,
        score = ?scored.score,
        display = %scored.display,
        "scored source"
    );
    scored
}

fn score_value(value: &RawValue, cfg: &ScoringConfig) -> Result<ScoredSource, ConversionError> {
    let scored = match value {
        RawValue::Swell { height, period } => {
            let m = SwellMeasure {
                height_m: convert::to_meters(height)?,
                period_s: period.as_ref().map(convert::to_seconds).transpose()?,
            };
            let s = ScoredSource::new(
                SourceKind::Swell,
                swell::score_swell(&m, &cfg.swell),
                swell::describe(&m),
            );
            s.with_notes(swell::note(&m, &cfg.swell))
        }
        RawValue::Wind {
            speed,
            direction,
            precipitation,
        } => {
            let m = WindMeasure {
                speed_ms: convert::to_meters_per_second(speed)?,
                direction_deg: direction.as_ref().map(convert::to_degrees).transpose()?,
                precipitation_pct: precipitation.as_ref().map(convert::to_percent).transpose()?,
            };
            ScoredSource::new(
                SourceKind::Wind,
                wind::score_wind(&m, &cfg.wind),
                wind::describe(&m),
            )
            .with_notes(wind::notes(&m, &cfg.wind))
        }
        RawValue::Forecast { phrase, detail } => {
            let normalized = convert::normalize_phrase(phrase)?;
            let s = ScoredSource::new(
                SourceKind::Forecast,
                forecast::score_forecast(&normalized, &cfg.forecast),
                normalized,
            );
            let detail = detail
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string);
            s.with_notes(detail)
        }
        RawValue::Webcam {
            image_sizes,
            attempted,
        } => {
            let m = WebcamMeasure::from_sizes(image_sizes, *attempted);
            let s = ScoredSource::new(
                SourceKind::Webcam,
                webcam::score_webcam(&m, &cfg.webcam),
                webcam::describe(&m),
            );
            if cfg.webcam.include_in_overall {
                s
            } else {
                s.supplementary()
            }
        }
    };
    Ok(scored)
}

/// Scores every reading and returns them in display order.
pub fn score_all(readings: &[RawReading], cfg: &ScoringConfig) -> Vec<ScoredSource> {
    let mut out: Vec<ScoredSource> = readings.iter().map(|r| score_reading(r, cfg)).collect();
    out.sort_by_key(|s| s.source);
    out
}
