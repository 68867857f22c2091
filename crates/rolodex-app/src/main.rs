use std::path::Path;

use clap::Parser;
use rolodex_core::config::load_config;
use rolodex_db::Store;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

mod cli;
mod snapshot;

fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    let args = cli::Cli::parse();

    let settings = load_config()?;

    tracing::debug!(settings = ?settings, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(settings.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %settings.logging.level, "Invalid log level in config, keeping info");
    }

    let mut store = Store::open(Path::new(&settings.database.path))?;

    cli::run(args.command, &mut store, &settings)
}
