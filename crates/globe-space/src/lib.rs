//! The sky behind the globe: starfield generation and its point-sprite renderer.

pub mod renderer;
pub mod starfield;

pub use renderer::{StarUniform, StarfieldRenderer};
pub use starfield::{
    DEFAULT_RADIUS, DEFAULT_STAR_COUNT, Starfield, StarfieldConfig, generate, generate_with,
};
