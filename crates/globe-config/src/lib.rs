//! Configuration for the globe viewer.
//!
//! Settings persist to disk as RON, tolerate missing or unknown fields, and
//! can be overridden from the command line via clap.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    APP_DIR_NAME, AssetConfig, CONFIG_FILE_NAME, Config, ControlsConfig, DebugConfig, EarthConfig,
    RenderConfig, StarfieldSettings, WindowConfig, default_config_dir,
};
pub use error::ConfigError;
