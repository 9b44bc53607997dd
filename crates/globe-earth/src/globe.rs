//! Globe state: axial tilt, per-layer spin and the sun.

use glam::{Mat4, Vec3};

use crate::layer::Layer;

/// Tunables for the Earth group.
#[derive(Clone, Debug, PartialEq)]
pub struct GlobeSettings {
    /// Tilt of the spin axis in degrees. Applied about Z, negated.
    pub axial_tilt_degrees: f32,
    /// Spin per update step for surface, lights and glow, in radians.
    pub spin_per_frame: f32,
    /// Spin per update step for the cloud shell. Slightly faster so clouds drift.
    pub cloud_spin_per_frame: f32,
    pub cloud_opacity: f32,
    /// Position of the directional light; the light shines from here towards the origin.
    pub sun_position: Vec3,
    pub sun_intensity: f32,
}

impl Default for GlobeSettings {
    fn default() -> Self {
        Self {
            axial_tilt_degrees: 23.4,
            spin_per_frame: 0.002,
            cloud_spin_per_frame: 0.0023,
            cloud_opacity: 0.8,
            sun_position: Vec3::new(-2.0, 0.5, 1.5),
            sun_intensity: 2.0,
        }
    }
}

/// The spinning Earth group.
#[derive(Clone, Debug)]
pub struct Globe {
    pub settings: GlobeSettings,
    angles: [f32; 4],
}

impl Globe {
    pub fn new(settings: GlobeSettings) -> Self {
        Self {
            settings,
            angles: [0.0; 4],
        }
    }

    /// Spin rate of one layer.
    pub fn spin(&self, layer: Layer) -> f32 {
        match layer {
            Layer::Clouds => self.settings.cloud_spin_per_frame,
            Layer::Surface | Layer::Lights | Layer::Glow => self.settings.spin_per_frame,
        }
    }

    /// Advance every layer by one update step.
    pub fn tick(&mut self) {
        for layer in Layer::ALL {
            // Wrap to keep precision over long sessions.
            self.angles[layer.index()] =
                (self.angles[layer.index()] + self.spin(layer)).rem_euclid(std::f32::consts::TAU);
        }
    }

    /// Current spin angle of a layer in radians, in `[0, 2π)`.
    pub fn angle(&self, layer: Layer) -> f32 {
        self.angles[layer.index()]
    }

    /// Rotation of the whole group about Z.
    pub fn tilt_matrix(&self) -> Mat4 {
        Mat4::from_rotation_z(-self.settings.axial_tilt_degrees.to_radians())
    }

    /// `tilt · rot_y(angle) · scale` for one layer.
    pub fn model_matrix(&self, layer: Layer) -> Mat4 {
        self.tilt_matrix()
            * Mat4::from_rotation_y(self.angle(layer))
            * Mat4::from_scale(Vec3::splat(layer.scale()))
    }

    /// Unit vector from the origin towards the sun.
    pub fn sun_direction(&self) -> Vec3 {
        self.settings.sun_position.try_normalize().unwrap_or(Vec3::Z)
    }
}

impl Default for Globe {
    fn default() -> Self {
        Self::new(GlobeSettings::default())
    }
}
