//! model.rs — readings, per-source scores and the daily rating.
//!
//! Everything here is cycle-local: created on a fetch, consumed by the
//! notifier and dropped. Nothing is persisted.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One external provider of a single measurable condition.
///
/// The derived `Ord` is the fixed display order: swell, wind, forecast, webcam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Swell,
    Wind,
    Forecast,
    Webcam,
}

impl SourceKind {
    pub const ALL: [SourceKind; 4] = [
        SourceKind::Swell,
        SourceKind::Wind,
        SourceKind::Forecast,
        SourceKind::Webcam,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SourceKind::Swell => "Swell",
            SourceKind::Wind => "Wind",
            SourceKind::Forecast => "Forecast",
            SourceKind::Webcam => "Webcam",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A raw scalar as the provider delivered it. Some providers send numbers as
/// strings or compass labels, so text is kept until conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawScalar {
    Number(f64),
    Text(String),
}

impl fmt::Display for RawScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawScalar::Number(n) => write!(f, "{n}"),
            RawScalar::Text(t) => f.write_str(t),
        }
    }
}

/// A raw scalar together with the unit string the provider declared for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawQuantity {
    pub value: RawScalar,
    pub unit: String,
}

impl RawQuantity {
    pub fn number(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value: RawScalar::Number(value),
            unit: unit.into(),
        }
    }

    pub fn text(value: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            value: RawScalar::Text(value.into()),
            unit: unit.into(),
        }
    }
}

impl fmt::Display for RawQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// Raw payload for one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawValue {
    Swell {
        height: RawQuantity,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        period: Option<RawQuantity>,
    },
    Wind {
        speed: RawQuantity,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        direction: Option<RawQuantity>,
        /// Chance of rain from the same hourly forecast.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        precipitation: Option<RawQuantity>,
    },
    Forecast {
        /// Short forecast word/phrase, e.g. "Fine" or "Showers".
        phrase: String,
        /// Longer forecast sentence, shown as a reason only.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    Webcam {
        /// Byte size of every image that was retrieved; failed cameras are absent.
        image_sizes: Vec<usize>,
        attempted: usize,
    },
}

impl RawValue {
    pub fn kind(&self) -> SourceKind {
        match self {
            RawValue::Swell { .. } => SourceKind::Swell,
            RawValue::Wind { .. } => SourceKind::Wind,
            RawValue::Forecast { .. } => SourceKind::Forecast,
            RawValue::Webcam { .. } => SourceKind::Webcam,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Availability {
    Present(RawValue),
    /// The provider answered but did not include this source.
    Absent,
    /// The fetch for this source failed.
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    pub source: SourceKind,
    pub fetched_at: DateTime<Utc>,
    pub availability: Availability,
}

impl RawReading {
    pub fn present(value: RawValue, fetched_at: DateTime<Utc>) -> Self {
        Self {
            source: value.kind(),
            fetched_at,
            availability: Availability::Present(value),
        }
    }

    pub fn absent(source: SourceKind, fetched_at: DateTime<Utc>) -> Self {
        Self {
            source,
            fetched_at,
            availability: Availability::Absent,
        }
    }

    pub fn error(source: SourceKind, fetched_at: DateTime<Utc>, reason: impl Into<String>) -> Self {
        Self {
            source,
            fetched_at,
            availability: Availability::Error(reason.into()),
        }
    }
}

/// Score of one source: a value in [0,100] or an explicit "unknown".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum SourceScore {
    Available(u8),
    Unavailable(String),
}

impl SourceScore {
    /// Builds an available score, clamping to [0,100] and rounding half up.
    pub fn from_f64(raw: f64) -> Self {
        if !raw.is_finite() {
            return SourceScore::Unavailable(format!("score {raw} is not finite"));
        }
        let clamped = raw.clamp(0.0, 100.0);
        SourceScore::Available((clamped + 0.5).floor() as u8)
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        SourceScore::Unavailable(reason.into())
    }

    pub fn value(&self) -> Option<u8> {
        match self {
            SourceScore::Available(v) => Some(*v),
            SourceScore::Unavailable(_) => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, SourceScore::Available(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredSource {
    pub source: SourceKind,
    pub score: SourceScore,
    /// Contributing raw value, human-readable.
    pub display: String,
    /// Short reasons, e.g. "Swell 1.4 m" or "Chance of rain".
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    /// False for supplementary evidence that is shown but not averaged.
    pub counts_toward_overall: bool,
}

impl ScoredSource {
    pub fn new(source: SourceKind, score: SourceScore, display: impl Into<String>) -> Self {
        Self {
            source,
            score,
            display: display.into(),
            notes: Vec::new(),
            counts_toward_overall: true,
        }
    }

    pub fn unavailable(source: SourceKind, reason: impl Into<String>) -> Self {
        Self::new(source, SourceScore::unavailable(reason), "no data")
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_notes(mut self, notes: impl IntoIterator<Item = String>) -> Self {
        self.notes.extend(notes);
        self
    }

    pub fn supplementary(mut self) -> Self {
        self.counts_toward_overall = false;
        self
    }

    /// Score that takes part in the overall mean, if any.
    pub fn counted_value(&self) -> Option<u8> {
        if self.counts_toward_overall {
            self.score.value()
        } else {
            None
        }
    }
}

/// Aggregate of one cycle. `overall == None` is the "no data" flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRating {
    pub overall: Option<u8>,
    pub sources: Vec<ScoredSource>,
    pub computed_at: DateTime<Utc>,
}

impl DailyRating {
    pub fn is_no_data(&self) -> bool {
        self.overall.is_none()
    }

    pub fn source(&self, kind: SourceKind) -> Option<&ScoredSource> {
        self.sources.iter().find(|s| s.source == kind)
    }
}
