use anyhow::{Result, anyhow};
use chrono::NaiveDateTime;
use clap::Parser;
use std::path::PathBuf;

use surfmon_service::alert::state::StateStore;
use surfmon_service::config::ServiceConfig;
use surfmon_service::cycle::{CycleOptions, run_cycle};
use surfmon_service::dev_mode::{DevMode, parse_fixed_now};
use surfmon_service::ingest::forecast::load_forecast_file;
use surfmon_service::logging::{self, Component, LogLevel};
use surfmon_service::model::LocationForecast;
use surfmon_service::report::{CycleReport, OutputMode};

#[derive(Parser, Debug)]
#[command(
    name = "surfmon",
    about = "Evaluate a surf forecast and report new alerts",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    /// What to print: new alerts only, every decision, or the full report as JSON
    #[arg(short, long, value_enum, ignore_case = true, default_value = "cron")]
    mode: OutputMode,

    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Forecast document to evaluate (overrides `forecast_file`)
    #[arg(short, long)]
    forecast: Option<String>,

    /// Evaluate as if the local time were this (YYYY-MM-DDTHH:MM)
    #[arg(long, value_parser = parse_now)]
    now: Option<NaiveDateTime>,

    /// Shift the wall clock back by this many days
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    days_offset: i64,

    /// Evaluate and report without touching the state file
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn dev_mode(&self) -> DevMode {
        DevMode {
            fixed_now: self.now,
            days_offset: self.days_offset,
        }
    }
}

fn parse_now(text: &str) -> Result<NaiveDateTime, String> {
    parse_fixed_now(text).ok_or_else(|| format!("expected YYYY-MM-DDTHH:MM, got '{}'", text))
}

/// Restricts the forecast to configured locations, when any are configured.
fn watched(forecasts: Vec<LocationForecast>, config: &ServiceConfig) -> Vec<LocationForecast> {
    if config.locations.is_empty() {
        return forecasts;
    }
    forecasts
        .into_iter()
        .filter_map(|mut f| {
            let configured = config.locations.iter().find(|l| l.id == f.location.id)?;
            f.location.name = configured.name.clone();
            Some(f)
        })
        .collect()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ServiceConfig::load(cli.config.as_deref())?;

    logging::init_logger(
        LogLevel::parse(&config.log_level),
        config.log_file.as_deref(),
        cli.mode != OutputMode::Cron,
    )
    .map_err(|e| anyhow!("could not initialize logging: {}", e))?;

    for warning in config.alert.sanity_warnings() {
        logging::warn(Component::Config, None, &warning);
    }

    let forecast_path = cli
        .forecast
        .clone()
        .or_else(|| config.forecast_file.clone())
        .ok_or_else(|| anyhow!("no forecast file given (--forecast or forecast_file)"))?;
    let forecasts = watched(load_forecast_file(&PathBuf::from(&forecast_path))?, &config);

    let dev_mode = cli.dev_mode();
    let clock = dev_mode.now();
    if dev_mode.is_active() {
        logging::info(
            Component::System,
            None,
            &format!("Dev mode: evaluating as of {}", clock.local),
        );
    }

    let store = StateStore::new(&config.state_file);
    let options = CycleOptions {
        dry_run: cli.dry_run,
    };
    let outcome = match run_cycle(&forecasts, &config.alert, &store, clock, options) {
        Ok(outcome) => outcome,
        Err(e) => {
            logging::error(Component::State, None, &format!("Check cycle failed: {}", e));
            return Err(e.into());
        }
    };

    let report = CycleReport::from_outcome(&outcome, clock);
    if let Some(text) = report.render(cli.mode, clock)? {
        print!("{}", text);
    }

    Ok(())
}
