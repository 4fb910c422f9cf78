//! Render-pass entry point: read feed snapshots, compose a layout, emit it
//! as JSON for the presentation adapter.

use std::env;
use std::fs;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use paperdash_core::{compose, FeedInput, LayoutConfig};

/// Snapshot file locations, overridable through the environment.
#[derive(Debug, Clone)]
struct RenderConfig {
    calendar_path: String,
    forecast_hourly_path: String,
    forecast_daily_path: String,
    tasks_path: String,
    current_path: String,
}

impl RenderConfig {
    fn from_env() -> Self {
        Self {
            calendar_path: env_or("PAPERDASH_CALENDAR", "feeds/calendar.json"),
            forecast_hourly_path: env_or(
                "PAPERDASH_FORECAST_HOURLY",
                "feeds/forecast_hourly.json",
            ),
            forecast_daily_path: env_or("PAPERDASH_FORECAST_DAILY", "feeds/forecast_daily.json"),
            tasks_path: env_or("PAPERDASH_TASKS", "feeds/tasks.json"),
            current_path: env_or("PAPERDASH_CURRENT", "feeds/current.json"),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

// A missing snapshot is a degraded pass, not a failed one.
fn read_feed(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(path, error = %e, "Feed snapshot unreadable, rendering without it");
            String::new()
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("paperdash=info".parse()?))
        .init();

    let config = RenderConfig::from_env();
    info!(?config, "Paperdash render pass starting");

    let feeds = FeedInput {
        calendar: read_feed(&config.calendar_path),
        forecast_hourly: read_feed(&config.forecast_hourly_path),
        forecast_daily: read_feed(&config.forecast_daily_path),
        tasks: read_feed(&config.tasks_path),
        current: read_feed(&config.current_path),
    };

    // The single wall-clock sample for this pass.
    let now = chrono::Local::now();
    let layout = compose(&feeds, now, &LayoutConfig::default());

    println!("{}", serde_json::to_string_pretty(&layout)?);
    Ok(())
}
