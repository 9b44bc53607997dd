//! wgpu plumbing shared by the globe viewer: device and surface setup, the
//! reverse-Z camera and depth buffer, buffers, textures and frame encoding.

pub mod buffer;
pub mod camera;
pub mod depth;
pub mod gpu;
pub mod pass;
pub mod shader;
pub mod surface;
pub mod texture;

pub use buffer::{MeshBuffer, UniformBuffer, VertexPositionNormalUv, create_vertex_buffer};
pub use camera::{Camera, CameraUniform};
pub use depth::{DepthBuffer, DepthMode};
pub use gpu::{
    RenderContext, RenderContextError, SurfaceError, init_render_context_blocking,
    request_headless_device,
};
pub use pass::{FrameEncoder, RenderPassBuilder, SPACE_BLACK};
pub use shader::ShaderLibrary;
pub use surface::{PhysicalSize, SurfaceResize, SurfaceTracker};
pub use texture::{
    ManagedTexture, TextureError, TextureManager, TextureSource, mip_level_count,
    sampler_layout_entry, texture_layout_entry,
};
