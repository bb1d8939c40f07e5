// src/config/scoring.rs
//! Scoring thresholds. Every breakpoint is configuration; the defaults below
//! are the documented product choice and can be overridden from TOML:
//!
//! ```toml
//! [swell]
//! height_curve = [[0.0, 100.0], [0.5, 100.0], [1.0, 70.0], [1.5, 40.0], [2.5, 0.0]]
//! period_curve = [[0.0, 40.0], [6.0, 60.0], [10.0, 90.0], [14.0, 100.0]]
//!
//! [wind]
//! calm_threshold_ms = 3.0
//! shore_bearing_deg = 120.0
//!
//! [forecast]
//! vocabulary = [["gale warning", 0], ["rain", 30], ["fine", 90]]
//!
//! [webcam]
//! include_in_overall = false
//! ```
//!
//! Sections or keys that are missing keep their defaults.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::score::curve::Curve;

pub const ENV_SCORING_CONFIG_PATH: &str = "SCORING_CONFIG_PATH";
pub const DEFAULT_SCORING_CONFIG_PATH: &str = "config/scoring.toml";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub swell: SwellThresholds,
    pub wind: WindThresholds,
    pub forecast: ForecastVocabulary,
    pub webcam: WebcamPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwellThresholds {
    /// Wave height in metres → score.
    pub height_curve: Curve,
    /// Wave period in seconds → score.
    pub period_curve: Curve,
    pub height_weight: f64,
    pub period_weight: f64,
    /// Heights above this add a reason line.
    pub note_above_m: f64,
}

impl Default for SwellThresholds {
    fn default() -> Self {
        Self {
            height_curve: Curve::from_static(&[
                (0.0, 100.0),
                (0.5, 100.0),
                (1.0, 70.0),
                (1.5, 40.0),
                (2.5, 0.0),
            ]),
            period_curve: Curve::from_static(&[
                (0.0, 40.0),
                (6.0, 60.0),
                (10.0, 90.0),
                (14.0, 100.0),
            ]),
            height_weight: 0.7,
            period_weight: 0.3,
            note_above_m: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindThresholds {
    /// Wind speed in m/s → score.
    pub speed_curve: Curve,
    /// At or below this speed the direction is ignored.
    pub calm_threshold_ms: f64,
    /// Seaward bearing of the coast; wind blowing from around here is onshore.
    pub shore_bearing_deg: f64,
    /// Half-width of the onshore sector.
    pub onshore_sector_deg: f64,
    pub onshore_penalty: f64,
    /// Speeds above this add a reason line.
    pub note_above_ms: f64,
    /// Chance of rain (percent) above which `rain_penalty` applies.
    pub rain_threshold_pct: f64,
    pub rain_penalty: f64,
}

impl Default for WindThresholds {
    fn default() -> Self {
        Self {
            speed_curve: Curve::from_static(&[
                (0.0, 100.0),
                (3.0, 100.0),
                (7.7, 60.0),
                (12.0, 20.0),
                (15.0, 0.0),
            ]),
            calm_threshold_ms: 3.0,
            shore_bearing_deg: 120.0,
            onshore_sector_deg: 60.0,
            onshore_penalty: 15.0,
            note_above_ms: 7.7,
            rain_threshold_pct: 50.0,
            rain_penalty: 30.0,
        }
    }
}

/// Ordered `(phrase, score)` list, most severe first. First match wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastVocabulary {
    pub vocabulary: Vec<(String, u8)>,
}

impl Default for ForecastVocabulary {
    fn default() -> Self {
        let entries: [(&str, u8); 17] = [
            ("gale warning", 0),
            ("gale", 5),
            ("storm", 5),
            ("thunder", 10),
            ("heavy rain", 15),
            ("rain", 30),
            ("showers", 30),
            ("shower", 30),
            ("drizzle", 40),
            ("windy", 45),
            ("fog", 50),
            ("cloudy", 60),
            ("cloud", 60),
            ("overcast", 60),
            ("fine", 90),
            ("clear", 90),
            ("sunny", 90),
        ];
        Self {
            vocabulary: entries
                .iter()
                .map(|(p, s)| (p.to_string(), *s))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebcamPolicy {
    /// Score given when at least one non-empty image was retrieved.
    pub available_score: u8,
    /// When false the webcam is shown but not averaged.
    pub include_in_overall: bool,
}

impl Default for WebcamPolicy {
    fn default() -> Self {
        Self {
            available_score: 80,
            include_in_overall: true,
        }
    }
}

impl ScoringConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: ScoringConfig = toml::from_str(s).context("parsing scoring TOML")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading scoring config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("invalid scoring config {}", path.display()))
    }

    /// Load using env var + fallbacks:
    /// 1) $SCORING_CONFIG_PATH (must exist)
    /// 2) config/scoring.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_SCORING_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!(
                    "{ENV_SCORING_CONFIG_PATH} points to non-existent path {}",
                    pb.display()
                ));
            }
            return Self::load_from(&pb);
        }
        let p = PathBuf::from(DEFAULT_SCORING_CONFIG_PATH);
        if p.exists() {
            return Self::load_from(&p);
        }
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<()> {
        self.swell
            .height_curve
            .validate()
            .context("swell.height_curve")?;
        self.swell
            .period_curve
            .validate()
            .context("swell.period_curve")?;
        self.wind.speed_curve.validate().context("wind.speed_curve")?;
        if !self.wind.speed_curve.is_non_increasing() {
            return Err(anyhow!("wind.speed_curve scores must not rise with speed"));
        }
        let w = &self.swell;
        if !(w.height_weight >= 0.0 && w.period_weight >= 0.0)
            || !(w.height_weight + w.period_weight > 0.0)
            || !(w.height_weight + w.period_weight).is_finite()
        {
            return Err(anyhow!("swell weights must be finite, non-negative, with a positive sum"));
        }
        for (name, v) in [
            ("swell.note_above_m", self.swell.note_above_m),
            ("wind.calm_threshold_ms", self.wind.calm_threshold_ms),
            ("wind.shore_bearing_deg", self.wind.shore_bearing_deg),
            ("wind.onshore_sector_deg", self.wind.onshore_sector_deg),
            ("wind.note_above_ms", self.wind.note_above_ms),
            ("wind.rain_threshold_pct", self.wind.rain_threshold_pct),
        ] {
            if !v.is_finite() {
                return Err(anyhow!("{name} must be a finite number"));
            }
        }
        for (name, v) in [
            ("wind.onshore_penalty", self.wind.onshore_penalty),
            ("wind.rain_penalty", self.wind.rain_penalty),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(anyhow!("{name} must be finite and non-negative"));
            }
        }
        if self.forecast.vocabulary.iter().any(|(p, s)| p.trim().is_empty() || *s > 100) {
            return Err(anyhow!("forecast vocabulary needs non-empty phrases with scores <= 100"));
        }
        if self.webcam.available_score > 100 {
            return Err(anyhow!("webcam.available_score must be <= 100"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn defaults_are_valid() {
        ScoringConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg = ScoringConfig::from_toml_str(
            r#"
[wind]
calm_threshold_ms = 4.0

[webcam]
include_in_overall = false
"#,
        )
        .unwrap();
        assert_eq!(cfg.wind.calm_threshold_ms, 4.0);
        assert_eq!(cfg.wind.shore_bearing_deg, 120.0);
        assert!(!cfg.webcam.include_in_overall);
        assert_eq!(cfg.webcam.available_score, 80);
        assert_eq!(cfg.swell, SwellThresholds::default());
    }

    #[test]
    fn rejects_unsorted_curve() {
        let err = ScoringConfig::from_toml_str("[swell]\nheight_curve = [[2.0, 0.0], [1.0, 50.0]]")
            .unwrap_err();
        assert!(format!("{err:#}").contains("swell.height_curve"));
    }

    #[test]
    fn rejects_rising_wind_curve() {
        let err = ScoringConfig::from_toml_str("[wind]\nspeed_curve = [[0.0, 0.0], [15.0, 100.0]]")
            .unwrap_err();
        assert!(format!("{err:#}").contains("must not rise"), "{err:#}");

        // flat then falling is fine
        ScoringConfig::from_toml_str("[wind]\nspeed_curve = [[0.0, 90.0], [5.0, 90.0], [10.0, 0.0]]")
            .unwrap();
    }

    #[test]
    fn rejects_nan_weights_and_penalties() {
        for toml in [
            "[wind]\nonshore_penalty = nan",
            "[wind]\nrain_penalty = nan",
            "[wind]\ncalm_threshold_ms = nan",
            "[swell]\nheight_weight = nan",
            "[swell]\nperiod_weight = inf",
        ] {
            assert!(ScoringConfig::from_toml_str(toml).is_err(), "{toml} accepted");
        }
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        env::remove_var(ENV_SCORING_CONFIG_PATH);

        // nothing on disk → built-in defaults
        assert_eq!(ScoringConfig::load_default().unwrap(), ScoringConfig::default());

        let p = tmp.path().join("thresholds.toml");
        fs::write(&p, "[webcam]\navailable_score = 65\n").unwrap();
        env::set_var(ENV_SCORING_CONFIG_PATH, p.display().to_string());
        assert_eq!(ScoringConfig::load_default().unwrap().webcam.available_score, 65);

        env::set_var(ENV_SCORING_CONFIG_PATH, tmp.path().join("missing.toml"));
        assert!(ScoringConfig::load_default().is_err());

        env::remove_var(ENV_SCORING_CONFIG_PATH);
        env::set_current_dir(&old).unwrap();
    }
}
