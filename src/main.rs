mod api;
mod cli;
mod config;
mod models;
mod prayer_times;
mod relay;
mod tui;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::runtime::Runtime;

use api::{PrayerTimesSource, QuranClient, build_http_client};
use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;
use models::Location;
use tui::app::LayoutMode;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Loading config")?;
    let location = resolve_location(&cli, &config);
    let rt = Runtime::new().context("Starting async runtime")?;

    match cli.command {
        Some(Commands::Init { force }) => handlers::handle_init(force)?,
        Some(Commands::Serve { bind }) => rt.block_on(handlers::handle_serve(&config, bind))?,
        Some(Commands::Quran { action }) => {
            let client = QuranClient::new(build_http_client()?, &config.quran);
            rt.block_on(handlers::handle_quran(&client, &action))?;
        }
        Some(Commands::Times { at, layout, json }) => {
            let source = prayer_source(&config)?;
            rt.block_on(handlers::handle_times(&source, &location, at.as_deref(), layout, json))?;
        }
        Some(Commands::Board { layout }) => run_board(&rt, &config, location, layout)?,

        // No subcommand → launch board
        None => run_board(&rt, &config, location, LayoutMode::Auto)?,
    }

    Ok(())
}

/// Device coordinates when both flags are given, otherwise the configured city.
fn resolve_location(cli: &Cli, config: &AppConfig) -> Location {
    match (cli.lat, cli.lon) {
        (Some(lat), Some(lon)) => Location::from_coordinates(lat, lon).or_default(),
        (None, None) => config.location.to_location(),
        _ => {
            log::warn!("Both --lat and --lon are needed; using configured location");
            config.location.to_location()
        }
    }
}

fn prayer_source(config: &AppConfig) -> Result<PrayerTimesSource> {
    PrayerTimesSource::new(build_http_client()?, &config.prayer)
        .context("Setting up prayer-time source")
}

fn run_board(rt: &Runtime, config: &AppConfig, location: Location, layout: LayoutMode) -> Result<()> {
    let source = Arc::new(prayer_source(config)?);
    let initial = rt.block_on(source.get(&location));
    tui::app::run(
        rt,
        source,
        location,
        initial,
        config.prayer.refetch_interval(),
        layout,
    )
}
