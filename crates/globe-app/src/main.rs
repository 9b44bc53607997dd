//! The globe viewer binary.

use std::path::PathBuf;

use clap::Parser;
use globe_config::{CliArgs, Config, default_config_dir};
use tracing::{error, info, warn};

fn main() {
    let args = CliArgs::parse();

    let config_dir = args
        .config
        .clone()
        .or_else(default_config_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    // Logging is not up yet; report config problems once it is.
    let (mut config, config_error) = match Config::load_or_create(&config_dir) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    globe_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    if let Some(e) = config_error {
        warn!(
            "Could not load config from {}: {e}; using defaults",
            config_dir.display()
        );
    }
    info!(
        config = %config_dir.display(),
        textures = %config.assets.texture_dir.display(),
        "Starting globe viewer"
    );

    if let Err(e) = globe_app::run(config) {
        error!("Event loop failed: {e}");
        std::process::exit(1);
    }
}
