//! Starfield generation: a shell of white points around the scene.
//!
//! Positions are drawn uniformly from a cube and pushed out onto a sphere of
//! fixed radius. The projection leaves slightly more stars towards the cube
//! corners; for a background sky that bias is invisible and accepted.

use glam::{Mat4, Quat, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Default number of stars.
pub const DEFAULT_STAR_COUNT: u32 = 2000;

/// Default shell radius and sampling half-extent.
pub const DEFAULT_RADIUS: f32 = 1500.0;

/// Samples shorter than this cannot be normalized reliably and are redrawn.
const MIN_SAMPLE_LENGTH: f32 = 1e-6;

/// Largest sampling half-extent; keeps the inclusive range width finite.
const MAX_HALF_EXTENT: f32 = f32::MAX / 4.0;

/// Parameters for [`generate`].
#[derive(Clone, Debug, PartialEq)]
pub struct StarfieldConfig {
    /// Number of stars.
    pub star_count: u32,
    /// Distance of every star from the origin.
    pub radius: f32,
    /// Half the side of the sampling cube.
    pub half_extent: f32,
    /// On-screen size of each star in pixels.
    pub point_size: f32,
    /// Shared linear RGB color.
    pub color: [f32; 3],
    /// Fixed seed for reproducible output. `None` draws fresh OS-seeded randomness.
    pub seed: Option<u64>,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            star_count: DEFAULT_STAR_COUNT,
            radius: DEFAULT_RADIUS,
            half_extent: DEFAULT_RADIUS,
            point_size: 2.0,
            color: [1.0, 1.0, 1.0],
            seed: None,
        }
    }
}

/// A generated point cloud: positions, shared appearance, and a whole-object
/// rotation owned by the caller.
#[derive(Clone, Debug)]
pub struct Starfield {
    positions: Vec<Vec3>,
    pub color: [f32; 3],
    pub point_size: f32,
    /// Whole-object orientation. Starts at identity.
    pub rotation: Quat,
}

impl Starfield {
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Positions as a flat `x0 y0 z0 x1 y1 z1 ...` buffer.
    pub fn flat_positions(&self) -> Vec<f32> {
        self.positions.iter().flat_map(|p| p.to_array()).collect()
    }

    /// Rotate the whole cloud about the world Y axis.
    pub fn rotate_y(&mut self, angle: f32) {
        self.rotation = (Quat::from_rotation_y(angle) * self.rotation).normalize();
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.rotation)
    }
}

/// Generate a starfield. Unseeded configs produce a different sky every call.
pub fn generate(config: &StarfieldConfig) -> Starfield {
    match config.seed {
        Some(seed) => generate_with(config, &mut ChaCha8Rng::seed_from_u64(seed)),
        None => generate_with(config, &mut rand::rng()),
    }
}

/// Generate a starfield from the given random source.
pub fn generate_with<R: Rng + ?Sized>(config: &StarfieldConfig, rng: &mut R) -> Starfield {
    // A zero-sized cube would only ever yield the origin; an unbounded one
    // has no finite sampling range.
    let half = if config.half_extent.is_finite() {
        config.half_extent.abs().clamp(1.0, MAX_HALF_EXTENT)
    } else {
        MAX_HALF_EXTENT
    };
    let mut positions = Vec::with_capacity(config.star_count as usize);

    while positions.len() < config.star_count as usize {
        let sample = Vec3::new(
            rng.random_range(-half..=half),
            rng.random_range(-half..=half),
            rng.random_range(-half..=half),
        );
        // Normalize in unit-cube coordinates so large extents cannot overflow
        // the length computation.
        let unit = sample / half;
        if unit.length() < MIN_SAMPLE_LENGTH {
            continue;
        }
        let Some(direction) = unit.try_normalize() else {
            continue;
        };
        positions.push(direction * config.radius);
    }

    log::debug!(
        "Generated {} stars at radius {}",
        positions.len(),
        config.radius
    );

    Starfield {
        positions,
        color: config.color,
        point_size: config.point_size,
        rotation: Quat::IDENTITY,
    }
}
