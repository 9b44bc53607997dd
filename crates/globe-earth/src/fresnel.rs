//! Fresnel rim glow.
//!
//! The glow shell is brightest where the view ray grazes the sphere and black
//! where it hits head-on. [`fresnel_factor`] mirrors the shader so the falloff
//! can be checked on the CPU.

use glam::Vec3;

/// Glow parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FresnelParams {
    /// Linear RGB at the rim.
    pub rim_color: Vec3,
    /// Linear RGB where the surface faces the viewer.
    pub facing_color: Vec3,
    pub bias: f32,
    pub scale: f32,
    pub power: f32,
}

impl Default for FresnelParams {
    fn default() -> Self {
        Self {
            rim_color: srgb_hex_to_linear(0x0088ff),
            facing_color: Vec3::ZERO,
            bias: 0.1,
            scale: 1.0,
            power: 4.0,
        }
    }
}

impl FresnelParams {
    /// Glow color and alpha for a surface point.
    pub fn shade(&self, point: Vec3, normal: Vec3, camera: Vec3) -> (Vec3, f32) {
        let f = fresnel_factor(self, point, normal, camera);
        (self.facing_color.lerp(self.rim_color, f), f)
    }
}

/// `bias + scale * (1 + dot(normalize(P - C), N))^power`, clamped to `[0, 1]`.
pub fn fresnel_factor(params: &FresnelParams, point: Vec3, normal: Vec3, camera: Vec3) -> f32 {
    let incident = (point - camera).normalize_or_zero();
    let facing = (1.0 + incident.dot(normal.normalize_or_zero())).max(0.0);
    (params.bias + params.scale * facing.powf(params.power)).clamp(0.0, 1.0)
}

/// Convert a `0xRRGGBB` sRGB color to linear RGB.
pub fn srgb_hex_to_linear(hex: u32) -> Vec3 {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
    Vec3::new(channel(16), channel(8), channel(0))
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = FresnelParams::default();
        assert_eq!(params.bias, 0.1);
        assert_eq!(params.scale, 1.0);
        assert_eq!(params.power, 4.0);
        assert_eq!(params.facing_color, Vec3::ZERO);
        // 0x0088ff: no red, some green, full blue.
        assert_eq!(params.rim_color.x, 0.0);
        assert!(params.rim_color.y > 0.2 && params.rim_color.y < 0.3);
        assert!((params.rim_color.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_head_on_is_bias_only() {
        let params = FresnelParams::default();
        let camera = Vec3::new(0.0, 0.0, 5.0);
        let f = fresnel_factor(&params, Vec3::Z, Vec3::Z, camera);
        assert!((f - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_grazing_is_full_glow() {
        let params = FresnelParams::default();
        // View ray perpendicular to the normal.
        let f = fresnel_factor(&params, Vec3::X, Vec3::X, Vec3::new(1.0, 0.0, 5.0));
        assert!((f - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_factor_increases_towards_the_limb() {
        let params = FresnelParams::default();
        let camera = Vec3::new(0.0, 0.0, 5.0);
        let mut previous = 0.0;
        for step in 0..=8 {
            let angle = step as f32 / 8.0 * 1.2;
            let n = Vec3::new(angle.sin(), 0.0, angle.cos());
            let f = fresnel_factor(&params, n, n, camera);
            assert!(f >= previous, "glow fell from {previous} to {f}");
            previous = f;
        }
    }

    #[test]
    fn test_factor_is_clamped() {
        let params = FresnelParams {
            bias: 2.0,
            ..Default::default()
        };
        assert_eq!(fresnel_factor(&params, Vec3::Z, Vec3::Z, Vec3::Z * 5.0), 1.0);
        let params = FresnelParams {
            bias: -1.0,
            ..Default::default()
        };
        assert_eq!(fresnel_factor(&params, Vec3::Z, Vec3::Z, Vec3::Z * 5.0), 0.0);
    }

    #[test]
    fn test_shade_mixes_colors_by_factor() {
        let params = FresnelParams::default();
        let (color, alpha) = params.shade(Vec3::Z, Vec3::Z, Vec3::Z * 5.0);
        assert!((alpha - 0.1).abs() < 1e-6);
        assert!((color - params.rim_color * 0.1).length() < 1e-6);
    }

    #[test]
    fn test_srgb_conversion_endpoints() {
        assert_eq!(srgb_hex_to_linear(0x000000), Vec3::ZERO);
        let white = srgb_hex_to_linear(0xffffff);
        assert!((white - Vec3::ONE).length() < 1e-6);
    }
}
