//! Swell scorer: small waves with a long period score highest.

use crate::config::scoring::SwellThresholds;
use crate::model::SourceScore;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwellMeasure {
    pub height_m: f64,
    pub period_s: Option<f64>,
}

pub fn score_swell(m: &SwellMeasure, t: &SwellThresholds) -> SourceScore {
    if !m.height_m.is_finite() || m.height_m < 0.0 {
        return SourceScore::unavailable(format!("invalid wave height {}", m.height_m));
    }
    let height = t.height_curve.eval(m.height_m);

    let blended = match m.period_s.filter(|p| p.is_finite() && *p >= 0.0) {
        Some(period) => {
            let w_sum = (t.height_weight + t.period_weight).max(1e-9);
            (height * t.height_weight + t.period_curve.eval(period) * t.period_weight) / w_sum
        }
        None => height,
    };
    SourceScore::from_f64(blended)
}

pub fn describe(m: &SwellMeasure) -> String {
    match m.period_s {
        Some(p) => format!("{:.1} m @ {:.0} s", m.height_m, p),
        None => format!("{:.1} m", m.height_m),
    }
}

pub fn note(m: &SwellMeasure, t: &SwellThresholds) -> Option<String> {
    (m.height_m > t.note_above_m).then(|| format!("Swell {:.1} m", m.height_m))
}
