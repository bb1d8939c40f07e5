// tests/pipeline_e2e.rs
//
// Whole pipeline with canned providers: fetch → score → aggregate → notify.

mod common;

use std::sync::Arc;

use common::*;
use spearfishing_conditions::ingest::SourceProvider;
use spearfishing_conditions::model::{Availability, RawQuantity, RawReading, RawValue, SourceKind};
use spearfishing_conditions::{Cycle, NotifierMux, SourceScore};

#[tokio::test]
async fn healthy_sources_average_to_overall() {
    let rating = healthy_pipeline().rate().await;

    let scores: Vec<_> = rating.sources.iter().map(|s| s.score.value()).collect();
    assert_eq!(scores, vec![Some(100), Some(60), Some(90), Some(80)]);
    // (100 + 60 + 90 + 80) / 4 = 82.5 → 83
    assert_eq!(rating.overall, Some(83));
}

#[tokio::test]
async fn one_failed_source_still_yields_rating_from_the_rest() {
    let p = pipeline(vec![
        Arc::new(calm_marine()),
        Arc::new(Failing {
            kinds: &[SourceKind::Forecast],
        }),
        Arc::new(webcams_up()),
    ]);
    let rating = p.rate().await;

    let forecast = rating.source(SourceKind::Forecast).unwrap();
    assert!(matches!(&forecast.score, SourceScore::Unavailable(r) if r.contains("503")));
    // (100 + 60 + 80) / 3 = 80
    assert_eq!(rating.overall, Some(80));
}

#[tokio::test]
async fn nothing_available_is_no_data() {
    let p = pipeline(vec![Arc::new(Failing {
        kinds: &[
            SourceKind::Swell,
            SourceKind::Wind,
            SourceKind::Forecast,
            SourceKind::Webcam,
        ],
    })]);
    let rating = p.rate().await;
    assert!(rating.is_no_data());
    assert_eq!(rating.sources.len(), 4);
    assert!(rating.sources.iter().all(|s| !s.score.is_available()));
}

#[tokio::test]
async fn no_providers_at_all_is_no_data_with_all_sources_listed() {
    let rating = pipeline(Vec::<Arc<dyn SourceProvider>>::new()).rate().await;
    assert!(rating.is_no_data());
    let kinds: Vec<_> = rating.sources.iter().map(|s| s.source).collect();
    assert_eq!(kinds, SourceKind::ALL.to_vec());
}

#[tokio::test]
async fn webcam_excluded_when_configured_as_supplementary() {
    let mut scoring = spearfishing_conditions::ScoringConfig::default();
    scoring.webcam.include_in_overall = false;
    let p = spearfishing_conditions::Pipeline::new(
        vec![
            Arc::new(calm_marine()),
            Arc::new(fine_forecast()),
            Arc::new(webcams_up()),
        ],
        Arc::new(scoring),
        std::time::Duration::from_secs(5),
    );
    let rating = p.rate().await;
    // (100 + 60 + 90) / 3 = 83.33 → 83
    assert_eq!(rating.overall, Some(83));
    assert_eq!(
        rating.source(SourceKind::Webcam).unwrap().score,
        SourceScore::Available(80)
    );
}

#[tokio::test]
async fn cycle_delivers_formatted_message() {
    let rec = Recorder::default();
    let cycle = Cycle::new(
        Arc::new(healthy_pipeline()),
        NotifierMux::new().with(rec.clone()),
    );
    let report = cycle.run().await;

    assert!(report.delivery_failures.is_empty());
    let sent = rec.0.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Spearfishing update");
    assert!(sent[0].body.contains("Overall rating: 83/100"));
    assert!(sent[0].body.contains("Forecast: 90/100 (fine)"));
    assert!(sent[0].body.contains("  - Fine. Light winds."));
}

#[tokio::test]
async fn rainy_day_costs_wind_points_and_is_given_as_a_reason() {
    let mut marine = calm_marine();
    if let Some(RawReading {
        availability: Availability::Present(RawValue::Wind { precipitation, .. }),
        ..
    }) = marine.readings.get_mut(1)
    {
        *precipitation = Some(RawQuantity::number(80.0, "%"));
    }
    let rec = Recorder::default();
    let cycle = Cycle::new(
        Arc::new(pipeline(vec![
            Arc::new(marine),
            Arc::new(fine_forecast()),
            Arc::new(webcams_up()),
        ])),
        NotifierMux::new().with(rec.clone()),
    );
    let report = cycle.run().await;

    // wind 60 - 30 = 30; (100 + 30 + 90 + 80) / 4 = 75
    assert_eq!(
        report.rating.source(SourceKind::Wind).unwrap().score,
        SourceScore::Available(30)
    );
    assert_eq!(report.rating.overall, Some(75));
    let sent = rec.0.lock().unwrap();
    assert!(sent[0].body.contains("  - Chance of rain"), "{}", sent[0].body);
}

#[tokio::test]
async fn delivery_failure_is_reported_not_fatal() {
    let rec = Recorder::default();
    let cycle = Cycle::new(
        Arc::new(healthy_pipeline()),
        NotifierMux::new().with(SmtpDown).with(rec.clone()),
    );
    let report = cycle.run().await;

    assert_eq!(report.rating.overall, Some(83));
    assert_eq!(report.delivery_failures.len(), 1);
    assert_eq!(report.delivery_failures[0].0, "email");
    assert_eq!(rec.0.lock().unwrap().len(), 1);
}
