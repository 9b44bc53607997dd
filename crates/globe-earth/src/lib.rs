//! The layered Earth: icosphere geometry, spin and tilt, texture maps and the
//! four-shell renderer (surface, city lights, clouds, Fresnel glow).

pub mod fresnel;
pub mod globe;
pub mod layer;
pub mod mesh;
pub mod renderer;
pub mod textures;

pub use fresnel::{FresnelParams, fresnel_factor, srgb_hex_to_linear};
pub use globe::{Globe, GlobeSettings};
pub use layer::{ADDITIVE_BLEND, Layer};
pub use mesh::{DEFAULT_DETAIL, SphereMesh, icosphere, sphere_uv};
pub use renderer::{EarthRenderer, LayerUniform};
pub use textures::{
    EarthMap, EarthTextureError, EarthTextures, MapImage, fallback_map, load_earth_textures,
    load_map,
};
