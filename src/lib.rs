// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod aggregate;
pub mod api;
pub mod config;
pub mod convert;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod model;
pub mod notify;
pub mod pipeline;
pub mod scheduler;
pub mod score;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::config::{AppConfig, ScoringConfig};
pub use crate::model::{DailyRating, ScoredSource, SourceKind, SourceScore};
pub use crate::notify::{format_message, Message, NotifierMux};
pub use crate::pipeline::{Cycle, CycleReport, Pipeline};
pub use crate::scheduler::{Frequency, ScheduleConfig, Scheduler, SystemClock};
