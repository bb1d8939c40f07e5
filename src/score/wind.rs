//! Wind scorer: calm is best; onshore wind above the calm threshold costs a
//! fixed penalty, and so does a high chance of rain in the same forecast.

use crate::config::scoring::WindThresholds;
use crate::model::SourceScore;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindMeasure {
    pub speed_ms: f64,
    /// Direction the wind blows from, degrees in [0,360).
    pub direction_deg: Option<f64>,
    /// Chance of rain, percent.
    pub precipitation_pct: Option<f64>,
}

pub fn score_wind(m: &WindMeasure, t: &WindThresholds) -> SourceScore {
    if !m.speed_ms.is_finite() || m.speed_ms < 0.0 {
        return SourceScore::unavailable(format!("invalid wind speed {}", m.speed_ms));
    }
    let mut score = t.speed_curve.eval(m.speed_ms);
    if is_onshore(m, t) {
        score -= t.onshore_penalty;
    }
    if is_rainy(m, t) {
        score -= t.rain_penalty;
    }
    SourceScore::from_f64(score)
}

pub fn is_rainy(m: &WindMeasure, t: &WindThresholds) -> bool {
    m.precipitation_pct
        .is_some_and(|p| p.is_finite() && p > t.rain_threshold_pct)
}

/// Onshore only counts once the wind is above the calm threshold.
pub fn is_onshore(m: &WindMeasure, t: &WindThresholds) -> bool {
    if m.speed_ms <= t.calm_threshold_ms {
        return false;
    }
    m.direction_deg
        .filter(|d| d.is_finite())
        .map(|d| angular_distance(d, t.shore_bearing_deg) <= t.onshore_sector_deg)
        .unwrap_or(false)
}

/// Smallest angle between two bearings, in [0,180].
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

pub fn describe(m: &WindMeasure) -> String {
    let mut out = match m.direction_deg {
        Some(d) => format!("{:.1} m/s from {:.0}°", m.speed_ms, d),
        None => format!("{:.1} m/s", m.speed_ms),
    };
    if let Some(p) = m.precipitation_pct {
        out.push_str(&format!(", rain {p:.0}%"));
    }
    out
}

pub fn notes(m: &WindMeasure, t: &WindThresholds) -> Vec<String> {
    let mut notes = Vec::new();
    match (m.speed_ms > t.note_above_ms, is_onshore(m, t)) {
        (true, true) => notes.push(format!("Wind {:.1} m/s onshore", m.speed_ms)),
        (true, false) => notes.push(format!("Wind {:.1} m/s", m.speed_ms)),
        (false, true) => notes.push("Onshore wind".to_string()),
        (false, false) => {}
    }
    if is_rainy(m, t) {
        notes.push("Chance of rain".to_string());
    }
    notes
}
