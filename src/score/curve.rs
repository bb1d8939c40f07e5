//! Piecewise-linear score curves.

use serde::{Deserialize, Serialize};

use crate::error::ScoringError;

/// Breakpoints `(x, score)` sorted by `x`.
///
/// Below the first breakpoint the first score applies, above the last one the
/// last score applies; values in between are interpolated linearly. Output is
/// always clamped to [0,100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Curve(Vec<(f64, f64)>);

impl Curve {
    pub fn new(points: Vec<(f64, f64)>) -> Result<Self, ScoringError> {
        let curve = Curve(points);
        curve.validate()?;
        Ok(curve)
    }

    /// Used for the built-in defaults, which are known to be valid.
    pub(crate) fn from_static(points: &[(f64, f64)]) -> Self {
        Curve(points.to_vec())
    }

    pub fn validate(&self) -> Result<(), ScoringError> {
        if self.0.is_empty() {
            return Err(ScoringError::EmptyCurve);
        }
        let finite = self.0.iter().all(|(x, y)| x.is_finite() && y.is_finite());
        let sorted = self.0.windows(2).all(|w| w[0].0 <= w[1].0);
        if !finite || !sorted {
            return Err(ScoringError::UnsortedCurve);
        }
        Ok(())
    }

    /// True when no breakpoint scores higher than the one before it.
    pub fn is_non_increasing(&self) -> bool {
        self.0.windows(2).all(|w| w[1].1 <= w[0].1)
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.0
    }

    /// Evaluates the curve at `x`. An empty curve scores 0.
    pub fn eval(&self, x: f64) -> f64 {
        let pts = &self.0;
        let Some(&(x0, y0)) = pts.first() else {
            return 0.0;
        };
        if x.is_nan() {
            return 0.0;
        }
        if x <= x0 {
            return y0.clamp(0.0, 100.0);
        }
        for w in pts.windows(2) {
            let (xa, ya) = w[0];
            let (xb, yb) = w[1];
            if x <= xb {
                let y = if xb > xa {
                    ya + (yb - ya) * (x - xa) / (xb - xa)
                } else {
                    yb
                };
                return y.clamp(0.0, 100.0);
            }
        }
        // past the last breakpoint
        pts.last().map_or(0.0, |&(_, y)| y.clamp(0.0, 100.0))
    }
}
