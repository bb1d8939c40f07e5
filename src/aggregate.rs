//! Aggregator: per-source scores → one `DailyRating`.

use chrono::{DateTime, Utc};

use crate::model::{DailyRating, ScoredSource};

/// Mean of the available, counted scores, rounded half up.
///
/// Returns `None` when nothing is available. Integer arithmetic keeps the
/// result independent of input order.
pub fn overall_score(sources: &[ScoredSource]) -> Option<u8> {
    let (sum, n) = sources
        .iter()
        .filter_map(ScoredSource::counted_value)
        .fold((0u64, 0u64), |(sum, n), v| (sum + u64::from(v), n + 1));
    if n == 0 {
        return None;
    }
    // round(sum / n) half up == floor((2 * sum + n) / (2 * n))
    let rounded = (2 * sum + n) / (2 * n);
    Some(rounded.min(100) as u8)
}

pub fn aggregate(sources: Vec<ScoredSource>, computed_at: DateTime<Utc>) -> DailyRating {
    let overall = overall_score(&sources);
    let mut sources = sources;
    sources.sort_by_key(|s| s.source);
    DailyRating {
        overall,
        sources,
        computed_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SourceKind, SourceScore};

    fn src(kind: SourceKind, v: Option<u8>) -> ScoredSource {
        let score = match v {
            Some(v) => SourceScore::Available(v),
            None => SourceScore::unavailable("down"),
        };
        ScoredSource::new(kind, score, "x")
    }

    fn sample() -> Vec<ScoredSource> {
        vec![
            src(SourceKind::Swell, Some(80)),
            src(SourceKind::Wind, Some(60)),
            src(SourceKind::Forecast, Some(100)),
            src(SourceKind::Webcam, None),
        ]
    }

    #[test]
    fn mean_of_available_sources_only() {
        assert_eq!(overall_score(&sample()), Some(80));
    }

    #[test]
    fn no_available_sources_is_no_data() {
        let none: Vec<_> = SourceKind::ALL.iter().map(|k| src(*k, None)).collect();
        let rating = aggregate(none, Utc::now());
        assert!(rating.is_no_data());
        assert_eq!(rating.sources.len(), 4);
        assert_eq!(overall_score(&[]), None);
    }

    #[test]
    fn ties_round_half_up() {
        let v = vec![src(SourceKind::Swell, Some(70)), src(SourceKind::Wind, Some(71))];
        assert_eq!(overall_score(&v), Some(71));
        let v = vec![src(SourceKind::Swell, Some(0)), src(SourceKind::Wind, Some(1))];
        assert_eq!(overall_score(&v), Some(1));
    }

    #[test]
    fn order_does_not_matter() {
        let base = sample();
        let expected = aggregate(base.clone(), DateTime::<Utc>::UNIX_EPOCH);
        let mut rotated = base.clone();
        for _ in 0..rotated.len() {
            rotated.rotate_left(1);
            let got = aggregate(rotated.clone(), DateTime::<Utc>::UNIX_EPOCH);
            assert_eq!(got, expected);
        }
        let mut reversed = base;
        reversed.reverse();
        assert_eq!(aggregate(reversed, DateTime::<Utc>::UNIX_EPOCH), expected);
    }

    #[test]
    fn supplementary_sources_are_excluded() {
        let v = vec![
            src(SourceKind::Swell, Some(40)),
            src(SourceKind::Webcam, Some(100)).supplementary(),
        ];
        assert_eq!(overall_score(&v), Some(40));
    }
}
