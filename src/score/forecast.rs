//! Forecast-text scorer: fixed vocabulary lookup.

use once_cell::sync::OnceCell;
use regex::Regex;

use crate::config::scoring::ForecastVocabulary;
use crate::model::SourceScore;

/// Scores an already normalized (lowercase) phrase.
///
/// Entries are tried in vocabulary order and the first one whose words appear
/// contiguously in the phrase wins. Unknown text is unavailable, never zero.
pub fn score_forecast(phrase: &str, vocab: &ForecastVocabulary) -> SourceScore {
    match matched_entry(phrase, vocab) {
        Some((_, score)) => SourceScore::from_f64(f64::from(score)),
        None => SourceScore::unavailable(format!("unrecognized forecast {phrase:?}")),
    }
}

pub fn matched_entry<'a>(phrase: &str, vocab: &'a ForecastVocabulary) -> Option<(&'a str, u8)> {
    let words = tokenize(phrase);
    vocab.vocabulary.iter().find_map(|(entry, score)| {
        let lowered = entry.to_lowercase();
        let needle = tokenize(&lowered);
        contains_words(&words, &needle).then_some((entry.as_str(), *score))
    })
}

fn tokenize(s: &str) -> Vec<&str> {
    static RE_WORD: OnceCell<Regex> = OnceCell::new();
    let re = RE_WORD.get_or_init(|| Regex::new(r"[\p{L}\p{N}]+").unwrap());
    re.find_iter(s).map(|m| m.as_str()).collect()
}

fn contains_words(haystack: &[&str], needle: &[&str]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}
