//! The four concentric shells that make up the globe.

use globe_render::DepthMode;

/// One shell of the globe. All share the unit icosphere.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Lit day map with specular and bump maps.
    Surface,
    /// City lights on the night side.
    Lights,
    /// Lit cloud cover just above the surface.
    Clouds,
    /// Fresnel rim glow.
    Glow,
}

/// `src * src_alpha + dst`: lights, clouds and glow only ever brighten.
pub const ADDITIVE_BLEND: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

impl Layer {
    /// Draw order. The opaque surface goes first so the others can test against its depth.
    pub const ALL: [Layer; 4] = [Layer::Surface, Layer::Lights, Layer::Clouds, Layer::Glow];

    pub fn index(self) -> usize {
        match self {
            Layer::Surface => 0,
            Layer::Lights => 1,
            Layer::Clouds => 2,
            Layer::Glow => 3,
        }
    }

    /// Radius relative to the surface.
    pub fn scale(self) -> f32 {
        match self {
            Layer::Surface | Layer::Lights => 1.0,
            Layer::Clouds => 1.003,
            Layer::Glow => 1.01,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Layer::Surface => "surface",
            Layer::Lights => "lights",
            Layer::Clouds => "clouds",
            Layer::Glow => "glow",
        }
    }

    pub fn blend(self) -> Option<wgpu::BlendState> {
        match self {
            Layer::Surface => None,
            Layer::Lights | Layer::Clouds | Layer::Glow => Some(ADDITIVE_BLEND),
        }
    }

    /// Only the surface writes depth.
    pub fn depth_mode(self) -> DepthMode {
        match self {
            Layer::Surface => DepthMode::Opaque,
            Layer::Lights | Layer::Clouds | Layer::Glow => DepthMode::TestOnly,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_follow_draw_order() {
        for (i, layer) in Layer::ALL.iter().enumerate() {
            assert_eq!(layer.index(), i);
        }
        assert_eq!(Layer::ALL[0], Layer::Surface);
    }

    #[test]
    fn test_shell_scales() {
        assert_eq!(Layer::Surface.scale(), 1.0);
        assert_eq!(Layer::Lights.scale(), 1.0);
        assert_eq!(Layer::Clouds.scale(), 1.003);
        assert_eq!(Layer::Glow.scale(), 1.01);
    }

    #[test]
    fn test_only_surface_is_opaque() {
        assert!(Layer::Surface.blend().is_none());
        assert_eq!(Layer::Surface.depth_mode(), DepthMode::Opaque);
        for layer in [Layer::Lights, Layer::Clouds, Layer::Glow] {
            assert_eq!(layer.blend(), Some(ADDITIVE_BLEND));
            assert!(!layer.depth_mode().state().depth_write_enabled);
        }
    }

    #[test]
    fn test_additive_blend_factors() {
        assert_eq!(ADDITIVE_BLEND.color.src_factor, wgpu::BlendFactor::SrcAlpha);
        assert_eq!(ADDITIVE_BLEND.color.dst_factor, wgpu::BlendFactor::One);
    }
}
