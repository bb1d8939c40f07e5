//! Webcam availability scorer.

use crate::config::scoring::WebcamPolicy;
use crate::model::SourceScore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebcamMeasure {
    /// Cameras that returned a non-empty image.
    pub retrieved: usize,
    pub attempted: usize,
}

impl WebcamMeasure {
    pub fn from_sizes(image_sizes: &[usize], attempted: usize) -> Self {
        Self {
            retrieved: image_sizes.iter().filter(|s| **s > 0).count(),
            attempted,
        }
    }
}

pub fn score_webcam(m: &WebcamMeasure, policy: &WebcamPolicy) -> SourceScore {
    if m.retrieved == 0 {
        return SourceScore::unavailable(format!("no image from {} webcam(s)", m.attempted));
    }
    SourceScore::from_f64(f64::from(policy.available_score))
}

pub fn describe(m: &WebcamMeasure) -> String {
    format!("{}/{} images", m.retrieved, m.attempted)
}
