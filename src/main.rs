//! Spearfishing conditions — binary entrypoint.
//!
//! Default: start the scheduler in the background and serve the HTTP surface
//! until Ctrl-C. `--once` runs a single cycle (with delivery) and exits;
//! `--show` prints the current rating without sending email.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use spearfishing_conditions::{
    api, metrics::Metrics, AppConfig, Cycle, NotifierMux, Pipeline, Scheduler, ScoringConfig,
    SystemClock,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Serve,
    Once,
    Show,
}

fn parse_mode() -> Result<Mode> {
    let mut mode = Mode::Serve;
    for arg in std::env::args().skip(1) {
        mode = match arg.as_str() {
            "--once" => Mode::Once,
            "--show" => Mode::Show,
            "-h" | "--help" => {
                println!("usage: spearfishing-conditions [--once | --show]");
                std::process::exit(0);
            }
            other => anyhow::bail!("unknown argument {other:?} (try --help)"),
        };
    }
    Ok(mode)
}

/// Library events use short targets rather than module paths.
const DEFAULT_LOG_FILTER: &str =
    "spearfishing_conditions=info,scheduler=info,cycle=info,ingest=info,notify=info,config=info,score=warn,warn";

/// Compact logs by default; `LOG_FORMAT=json` for JSON lines.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let mode = parse_mode()?;
    let cfg = AppConfig::from_env();
    let scoring = Arc::new(ScoringConfig::load_default().context("loading scoring thresholds")?);
    let pipeline = Arc::new(Pipeline::from_config(&cfg, scoring));

    tracing::info!(
        ?mode,
        frequency = ?cfg.schedule.frequency,
        email = cfg.email_enabled(),
        "starting"
    );

    match mode {
        Mode::Show => {
            let rating = pipeline.rate().await;
            println!("{}", spearfishing_conditions::format_message(&rating).body);
            Ok(())
        }
        Mode::Once => {
            let report = Cycle::new(pipeline, NotifierMux::from_config(&cfg)).run().await;
            for (channel, error) in &report.delivery_failures {
                tracing::warn!(channel = %channel, error = %error, "delivery failed");
            }
            Ok(())
        }
        Mode::Serve => serve(cfg, pipeline).await,
    }
}

async fn serve(cfg: AppConfig, pipeline: Arc<Pipeline>) -> Result<()> {
    let metrics = match Metrics::install() {
        Ok(m) => Some(Arc::new(m)),
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "metrics disabled");
            None
        }
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let cycle = Arc::new(Cycle::new(
        Arc::clone(&pipeline),
        NotifierMux::from_config(&cfg),
    ));
    let scheduler = Scheduler::new(cfg.schedule, SystemClock);
    let scheduler_task = scheduler.spawn(cycle, shutdown_rx.clone());

    let state = api::AppState {
        pipeline,
        schedule: cfg.schedule,
        email_enabled: cfg.email_enabled(),
        clock: Arc::new(SystemClock),
        metrics,
    };
    let listener = tokio::net::TcpListener::bind(cfg.api_addr)
        .await
        .with_context(|| format!("binding {}", cfg.api_addr))?;
    tracing::info!(addr = %cfg.api_addr, "serving");

    let mut api_shutdown = shutdown_rx;
    let server = axum::serve(listener, api::router(state)).with_graceful_shutdown(async move {
        let _ = api_shutdown.changed().await;
    });

    let server_task = tokio::spawn(async move { server.await });

    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl-C")?;
    tracing::info!("shutdown requested");
    let _ = shutdown_tx.send(true);

    if let Err(e) = scheduler_task.await {
        tracing::error!(error = %e, "scheduler task ended abnormally");
    }
    match server_task.await {
        Ok(res) => res.context("http server")?,
        Err(e) => tracing::error!(error = %e, "server task ended abnormally"),
    }
    Ok(())
}
