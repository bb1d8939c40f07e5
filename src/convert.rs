//! Unit conversion from provider units to the canonical units the scorers use.
//!
//! Canonical units: metres, metres per second, degrees in [0,360), seconds,
//! percent.

use once_cell::sync::OnceCell;
use regex::Regex;

use crate::error::ConversionError;
use crate::model::{RawQuantity, RawScalar};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Length,
    Speed,
    Angle,
    Duration,
    Ratio,
}

impl Dimension {
    fn name(self) -> &'static str {
        match self {
            Dimension::Length => "length",
            Dimension::Speed => "speed",
            Dimension::Angle => "angle",
            Dimension::Duration => "duration",
            Dimension::Ratio => "ratio",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Meters,
    Feet,
    MetersPerSecond,
    KilometersPerHour,
    Knots,
    MilesPerHour,
    Degrees,
    Seconds,
    Minutes,
    Percent,
}

impl Unit {
    /// Parses a provider unit string (Open-Meteo `*_units` style).
    pub fn parse(s: &str) -> Result<Self, ConversionError> {
        let unit = match s.trim().to_ascii_lowercase().as_str() {
            "m" | "metre" | "meter" | "metres" | "meters" => Unit::Meters,
            "ft" | "feet" => Unit::Feet,
            "m/s" | "ms" => Unit::MetersPerSecond,
            "km/h" | "kmh" | "kph" => Unit::KilometersPerHour,
            "kn" | "kt" | "kts" | "knots" => Unit::Knots,
            "mph" | "mp/h" => Unit::MilesPerHour,
            "°" | "deg" | "degrees" | "°n" => Unit::Degrees,
            "s" | "sec" | "secs" | "seconds" => Unit::Seconds,
            "min" | "mins" | "minutes" => Unit::Minutes,
            "%" | "percent" => Unit::Percent,
            _ => return Err(ConversionError::UnknownUnit(s.to_string())),
        };
        Ok(unit)
    }

    pub fn dimension(self) -> Dimension {
        match self {
            Unit::Meters | Unit::Feet => Dimension::Length,
            Unit::MetersPerSecond | Unit::KilometersPerHour | Unit::Knots | Unit::MilesPerHour => {
                Dimension::Speed
            }
            Unit::Degrees => Dimension::Angle,
            Unit::Seconds | Unit::Minutes => Dimension::Duration,
            Unit::Percent => Dimension::Ratio,
        }
    }

    fn to_canonical(self, v: f64) -> f64 {
        match self {
            Unit::Meters | Unit::MetersPerSecond | Unit::Seconds | Unit::Percent => v,
            Unit::Feet => v * 0.3048,
            Unit::KilometersPerHour => v / 3.6,
            Unit::Knots => v * 1852.0 / 3600.0,
            Unit::MilesPerHour => v * 0.44704,
            Unit::Minutes => v * 60.0,
            Unit::Degrees => v.rem_euclid(360.0),
        }
    }
}

/// Converts a quantity into the canonical unit of `expected`.
pub fn convert(q: &RawQuantity, expected: Dimension) -> Result<f64, ConversionError> {
    let unit = Unit::parse(&q.unit)?;
    if unit.dimension() != expected {
        return Err(ConversionError::WrongDimension {
            unit: q.unit.clone(),
            expected: expected.name(),
        });
    }

    let raw = match &q.value {
        RawScalar::Number(n) => *n,
        RawScalar::Text(t) => match t.trim().parse::<f64>() {
            Ok(n) => n,
            Err(_) if expected == Dimension::Angle => compass_to_degrees(t)
                .ok_or_else(|| ConversionError::NotNumeric(t.clone()))?,
            Err(_) => return Err(ConversionError::NotNumeric(t.clone())),
        },
    };
    if !raw.is_finite() {
        return Err(ConversionError::NotFinite(raw));
    }
    Ok(unit.to_canonical(raw))
}

pub fn to_meters(q: &RawQuantity) -> Result<f64, ConversionError> {
    convert(q, Dimension::Length)
}

pub fn to_meters_per_second(q: &RawQuantity) -> Result<f64, ConversionError> {
    convert(q, Dimension::Speed)
}

pub fn to_degrees(q: &RawQuantity) -> Result<f64, ConversionError> {
    convert(q, Dimension::Angle)
}

pub fn to_seconds(q: &RawQuantity) -> Result<f64, ConversionError> {
    convert(q, Dimension::Duration)
}

pub fn to_percent(q: &RawQuantity) -> Result<f64, ConversionError> {
    convert(q, Dimension::Ratio)
}

const COMPASS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// 16-point compass label to degrees ("NW" → 315).
pub fn compass_to_degrees(label: &str) -> Option<f64> {
    let l = label.trim().to_ascii_uppercase();
    COMPASS
        .iter()
        .position(|p| *p == l)
        .map(|i| i as f64 * 22.5)
}

/// Normalize forecast text: decode entities, strip tags, collapse whitespace,
/// drop trailing punctuation and lowercase.
pub fn normalize_phrase(s: &str) -> Result<String, ConversionError> {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_lowercase();

    while let Some(last) = out.chars().last() {
        if matches!(last, '!' | '?' | '.' | ',' | ';') || last.is_whitespace() {
            out.pop();
        } else {
            break;
        }
    }

    if out.is_empty() {
        return Err(ConversionError::EmptyText);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn speed_units_convert_to_meters_per_second() {
        assert!(approx(to_meters_per_second(&RawQuantity::number(36.0, "km/h")).unwrap(), 10.0));
        assert!(approx(to_meters_per_second(&RawQuantity::number(7.7, "m/s")).unwrap(), 7.7));
        let kn = to_meters_per_second(&RawQuantity::number(10.0, "kn")).unwrap();
        assert!((kn - 5.1444).abs() < 1e-3);
    }

    #[test]
    fn length_and_duration_units() {
        assert!(approx(to_meters(&RawQuantity::number(10.0, "ft")).unwrap(), 3.048));
        assert!(approx(to_seconds(&RawQuantity::number(2.0, "min")).unwrap(), 120.0));
        assert!(approx(to_percent(&RawQuantity::number(65.0, "%")).unwrap(), 65.0));
        assert!(to_percent(&RawQuantity::number(65.0, "s")).is_err());
    }

    #[test]
    fn numeric_text_is_accepted() {
        assert!(approx(to_meters(&RawQuantity::text(" 1.5 ", "m")).unwrap(), 1.5));
    }

    #[test]
    fn compass_labels_become_degrees() {
        assert!(approx(to_degrees(&RawQuantity::text("nw", "°")).unwrap(), 315.0));
        assert!(approx(to_degrees(&RawQuantity::number(-90.0, "°")).unwrap(), 270.0));
        assert_eq!(compass_to_degrees("SSE"), Some(157.5));
        assert_eq!(compass_to_degrees("up"), None);
    }

    #[test]
    fn errors_for_bad_input() {
        assert_eq!(
            to_meters(&RawQuantity::text("calm", "m")),
            Err(ConversionError::NotNumeric("calm".into()))
        );
        assert_eq!(
            to_meters(&RawQuantity::number(1.0, "fathoms")),
            Err(ConversionError::UnknownUnit("fathoms".into()))
        );
        assert!(matches!(
            to_meters(&RawQuantity::number(1.0, "m/s")),
            Err(ConversionError::WrongDimension { .. })
        ));
        assert_eq!(
            to_meters(&RawQuantity::number(f64::INFINITY, "m")),
            Err(ConversionError::NotFinite(f64::INFINITY))
        );
    }

    #[test]
    fn normalize_phrase_cleans_markup() {
        assert_eq!(
            normalize_phrase("  <b>Few&nbsp;Showers</b>. ").unwrap(),
            "few showers"
        );
        assert_eq!(normalize_phrase(" <br/> "), Err(ConversionError::EmptyText));
    }
}
