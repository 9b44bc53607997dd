//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Directory name used under the OS config directory.
pub const APP_DIR_NAME: &str = "globe";

/// File name of the persisted configuration.
pub const CONFIG_FILE_NAME: &str = "config.ron";

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Camera and mesh settings.
    pub render: RenderConfig,
    /// Background starfield settings.
    pub starfield: StarfieldSettings,
    /// Earth group settings: tilt, spin rates, sun.
    pub earth: EarthConfig,
    /// Orbit camera controls.
    pub controls: ControlsConfig,
    /// Texture asset location.
    pub assets: AssetConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Start in fullscreen mode.
    pub fullscreen: bool,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
}

/// Camera projection and sphere tessellation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance. Must exceed the starfield radius plus camera distance.
    pub far: f32,
    /// Icosphere detail: every icosahedron edge is split into `detail + 1` segments.
    pub sphere_detail: u32,
}

/// Procedural starfield parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StarfieldSettings {
    /// Number of stars to generate.
    pub star_count: u32,
    /// Fixed seed for reproducible skies. `None` draws fresh randomness every run.
    pub seed: Option<u64>,
    /// Radius of the star shell.
    pub radius: f32,
    /// On-screen size of each star in physical pixels.
    pub point_size: f32,
    /// Rotation applied about Y every frame, in radians.
    pub spin_per_frame: f32,
}

/// Earth group configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EarthConfig {
    /// Axial tilt in degrees (applied about Z, negated).
    pub axial_tilt_degrees: f32,
    /// Spin of the surface, lights and glow layers, radians per frame.
    pub spin_per_frame: f32,
    /// Spin of the cloud layer, radians per frame.
    pub cloud_spin_per_frame: f32,
    /// Cloud layer opacity in [0, 1].
    pub cloud_opacity: f32,
    /// Sun position; the light shines from here toward the origin.
    pub sun_position: [f32; 3],
    /// Sun intensity multiplier.
    pub sun_intensity: f32,
}

/// Orbit controls configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControlsConfig {
    /// Radians of orbit per logical pixel of drag.
    pub rotate_speed: f32,
    /// Dolly factor base per scroll line.
    pub zoom_speed: f32,
    /// Damping factor in (0, 1]; 1.0 disables inertia.
    pub damping: f32,
    /// Closest allowed camera distance to the target.
    pub min_distance: f32,
    /// Farthest allowed camera distance to the target.
    pub max_distance: f32,
    /// Initial camera distance to the target.
    pub start_distance: f32,
}

/// Texture asset configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory containing the Earth texture maps.
    pub texture_dir: PathBuf,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Log a frame-rate summary every N frames (0 = never).
    pub fps_log_interval: u32,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
            title: "Globe".to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 4000.0,
            sphere_detail: 12,
        }
    }
}

impl Default for StarfieldSettings {
    fn default() -> Self {
        Self {
            star_count: 2000,
            seed: None,
            radius: 1500.0,
            point_size: 2.0,
            spin_per_frame: -0.0002,
        }
    }
}

impl Default for EarthConfig {
    fn default() -> Self {
        Self {
            axial_tilt_degrees: 23.4,
            spin_per_frame: 0.002,
            cloud_spin_per_frame: 0.0023,
            cloud_opacity: 0.8,
            sun_position: [-2.0, 0.5, 1.5],
            sun_intensity: 2.0,
        }
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            rotate_speed: 0.005,
            zoom_speed: 0.95,
            damping: 1.0,
            min_distance: 1.5,
            max_distance: 50.0,
            start_distance: 5.0,
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            texture_dir: PathBuf::from("assets/textures"),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            fps_log_interval: 600,
        }
    }
}

/// The default config directory: `<os config dir>/globe`.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME))
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
