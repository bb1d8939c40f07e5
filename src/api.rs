//! Interactive HTTP surface. Runs next to the scheduler and stays responsive
//! while a scheduled cycle is in progress.
//!
//! `GET /rating` runs a fresh, display-only cycle: it fetches and scores but
//! never sends email, and nothing is cached between requests.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{NaiveDateTime, NaiveTime, Weekday};
use serde::Serialize;

use crate::model::DailyRating;
use crate::notify::format_message;
use crate::pipeline::Pipeline;
use crate::scheduler::{Clock, Frequency, ScheduleConfig};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub schedule: ScheduleConfig,
    pub email_enabled: bool,
    pub clock: Arc<dyn Clock>,
    pub metrics: Option<Arc<crate::metrics::Metrics>>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/rating", get(rating_json))
        .route("/rating/text", get(rating_text))
        .route("/schedule", get(schedule))
        .route("/metrics", get(metrics))
        .with_state(state)
}

async fn rating_json(State(state): State<AppState>) -> Json<DailyRating> {
    Json(state.pipeline.rate().await)
}

async fn rating_text(State(state): State<AppState>) -> String {
    let rating = state.pipeline.rate().await;
    format_message(&rating).body
}

#[derive(Debug, Serialize)]
struct ScheduleResp {
    frequency: Frequency,
    trigger_time: NaiveTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    weekday: Option<Weekday>,
    next_trigger: NaiveDateTime,
    email_enabled: bool,
}

async fn schedule(State(state): State<AppState>) -> Json<ScheduleResp> {
    let cfg = state.schedule;
    Json(ScheduleResp {
        frequency: cfg.frequency,
        trigger_time: cfg.trigger_time,
        weekday: (cfg.frequency == Frequency::Weekly).then_some(cfg.weekday),
        next_trigger: cfg.next_trigger_after(state.clock.now()),
        email_enabled: state.email_enabled,
    })
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(m) => (StatusCode::OK, m.render()),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed".to_string()),
    }
}
