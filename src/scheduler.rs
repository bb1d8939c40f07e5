//! # Scheduler
//! Two-state timer (`Idle` → `Running` → `Idle`) that runs one cycle at each
//! trigger: every day at 07:00 local time, or Fridays at 07:00 in weekly mode.
//!
//! - Clock and cycle are injected (`Clock`, `CycleRunner`), so tests can
//!   drive it deterministically with `ManualClock`.
//! - Cycles never overlap: the loop awaits each cycle before looking at the
//!   clock again. Triggers that pass while a cycle runs are coalesced.
//! - A cycle that errors or panics is logged and the scheduler goes back to
//!   `Idle` with a fresh next trigger.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{Datelike, Local, NaiveDateTime, NaiveTime, Weekday};
use metrics::counter;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::error::ConfigError;
use crate::pipeline::CycleReport;

/// Longest single sleep; the clock is re-read at least this often.
pub const MAX_POLL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
}

impl Frequency {
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            _ => Err(ConfigError::InvalidFrequency(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduleConfig {
    pub frequency: Frequency,
    pub trigger_time: NaiveTime,
    /// Only used in weekly mode.
    pub weekday: Weekday,
}

impl ScheduleConfig {
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            trigger_time: NaiveTime::from_hms_opt(7, 0, 0).unwrap_or(NaiveTime::MIN),
            weekday: Weekday::Fri,
        }
    }

    /// First trigger strictly after `now`.
    pub fn next_trigger_after(&self, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.date();
        for offset in 0..=7 {
            let Some(day) = today.checked_add_days(chrono::Days::new(offset)) else {
                break;
            };
            if self.frequency == Frequency::Weekly && day.weekday() != self.weekday {
                continue;
            }
            let candidate = day.and_time(self.trigger_time);
            if candidate > now {
                return candidate;
            }
        }
        // unreachable for real dates; keep the scheduler alive anyway
        now + chrono::Duration::days(1)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self::new(Frequency::Daily)
    }
}

/// Local wall-clock source.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock(Arc<Mutex<NaiveDateTime>>);

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self(Arc::new(Mutex::new(start)))
    }

    pub fn set(&self, t: NaiveDateTime) {
        *self.0.lock().unwrap_or_else(|p| p.into_inner()) = t;
    }

    pub fn advance(&self, d: chrono::Duration) {
        let mut g = self.0.lock().unwrap_or_else(|p| p.into_inner());
        *g += d;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.0.lock().unwrap_or_else(|p| p.into_inner())
    }
}

/// One fetch → score → notify execution.
#[async_trait::async_trait]
pub trait CycleRunner: Send + Sync {
    async fn run_cycle(&self) -> anyhow::Result<CycleReport>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SchedulerState {
    Idle { next_trigger: NaiveDateTime },
    Running,
}

#[derive(Debug)]
pub enum CycleOutcome {
    Completed(Box<CycleReport>),
    Failed(String),
}

struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

pub struct Scheduler<C: Clock> {
    config: ScheduleConfig,
    clock: C,
    state: SchedulerState,
}

impl<C: Clock> Scheduler<C> {
    pub fn new(config: ScheduleConfig, clock: C) -> Self {
        let next_trigger = config.next_trigger_after(clock.now());
        Self {
            config,
            clock,
            state: SchedulerState::Idle { next_trigger },
        }
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    pub fn next_trigger(&self) -> Option<NaiveDateTime> {
        match self.state {
            SchedulerState::Idle { next_trigger } => Some(next_trigger),
            SchedulerState::Running => None,
        }
    }

    pub fn is_due(&self) -> bool {
        matches!(self.state, SchedulerState::Idle { next_trigger } if self.clock.now() >= next_trigger)
    }

    fn time_until_next(&self) -> Duration {
        self.next_trigger()
            .and_then(|t| (t - self.clock.now()).to_std().ok())
            .unwrap_or(Duration::ZERO)
    }

    /// Runs one cycle if the trigger time has been reached.
    ///
    /// The cycle runs on its own task so a panic is contained. Whatever
    /// happens, the scheduler ends `Idle` with the next trigger strictly
    /// after the current clock time.
    pub async fn run_pending<R>(&mut self, runner: &Arc<R>) -> Option<CycleOutcome>
    where
        R: CycleRunner + ?Sized + 'static,
    {
        if !self.is_due() {
            return None;
        }
        self.state = SchedulerState::Running;
        info!(target: "scheduler", at = %self.clock.now(), "cycle started");

        let r = Arc::clone(runner);
        let mut task = AbortOnDrop(tokio::spawn(async move { r.run_cycle().await }));
        let outcome = match (&mut task.0).await {
            Ok(Ok(report)) => {
                if !report.delivery_failures.is_empty() {
                    warn!(target: "scheduler", failures = report.delivery_failures.len(), "cycle completed with delivery failures");
                }
                CycleOutcome::Completed(Box::new(report))
            }
            Ok(Err(e)) => {
                error!(target: "scheduler", error = %format!("{e:#}"), "cycle failed");
                counter!("cycle_failures_total").increment(1);
                CycleOutcome::Failed(format!("{e:#}"))
            }
            Err(join) => {
                error!(target: "scheduler", error = %join, "cycle panicked");
                counter!("cycle_failures_total").increment(1);
                CycleOutcome::Failed(join.to_string())
            }
        };

        let next_trigger = self.config.next_trigger_after(self.clock.now());
        self.state = SchedulerState::Idle { next_trigger };
        info!(target: "scheduler", next = %next_trigger, "scheduler idle");
        Some(outcome)
    }

    /// Loop until `shutdown` flips to true (or its sender is dropped). An
    /// in-flight cycle is aborted on shutdown.
    pub async fn run<R>(mut self, runner: Arc<R>, mut shutdown: watch::Receiver<bool>)
    where
        R: CycleRunner + ?Sized + 'static,
    {
        info!(
            target: "scheduler",
            frequency = ?self.config.frequency,
            next = ?self.next_trigger(),
            "scheduler started"
        );
        loop {
            if *shutdown.borrow() {
                break;
            }
            if self.is_due() {
                tokio::select! {
                    _ = self.run_pending(&runner) => {}
                    _ = shutdown.changed() => {
                        warn!(target: "scheduler", "shutdown during cycle; aborting it");
                        break;
                    }
                }
                continue;
            }
            let wait = self.time_until_next().min(MAX_POLL);
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = shutdown.changed() => break,
            }
        }
        info!(target: "scheduler", "scheduler stopped");
    }
}

impl<C: Clock + 'static> Scheduler<C> {
    /// Runs the loop on a background task.
    pub fn spawn<R>(self, runner: Arc<R>, shutdown: watch::Receiver<bool>) -> JoinHandle<()>
    where
        R: CycleRunner + ?Sized + 'static,
    {
        tokio::spawn(self.run(runner, shutdown))
    }
}
