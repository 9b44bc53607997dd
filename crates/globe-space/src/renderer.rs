//! GPU renderer for the starfield: one screen-aligned square per star.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use globe_render::{CameraUniform, DepthMode, UniformBuffer, create_vertex_buffer};

use crate::starfield::Starfield;

/// WGSL source for instanced star sprites.
const STARFIELD_SHADER: &str = r#"
struct StarUniforms {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
    // rgb color, w = point size in pixels
    color_size: vec4<f32>,
    // xy = viewport size in pixels
    viewport: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> stars: StarUniforms;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
};

const CORNERS = array<vec2<f32>, 6>(
    vec2<f32>(-1.0, -1.0),
    vec2<f32>( 1.0, -1.0),
    vec2<f32>( 1.0,  1.0),
    vec2<f32>(-1.0, -1.0),
    vec2<f32>( 1.0,  1.0),
    vec2<f32>(-1.0,  1.0),
);

@vertex
fn vs_star(@builtin(vertex_index) idx: u32, @location(0) position: vec3<f32>) -> VertexOutput {
    var out: VertexOutput;
    let clip = stars.view_proj * stars.model * vec4<f32>(position, 1.0);
    // Half the point size, converted from pixels to NDC, scaled by w so the
    // offset survives the perspective divide.
    let half_ndc = stars.color_size.w / stars.viewport.xy;
    let offset = CORNERS[idx] * half_ndc * clip.w;
    out.clip_position = vec4<f32>(clip.xy + offset, clip.z, clip.w);
    return out;
}

@fragment
fn fs_star(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(stars.color_size.rgb, 1.0);
}
"#;

/// Vertices drawn per star instance (two triangles).
const VERTICES_PER_STAR: u32 = 6;

/// Per-frame uniform for the star pipeline.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct StarUniform {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub color_size: [f32; 4],
    pub viewport: [f32; 4],
}

impl StarUniform {
    pub fn new(camera: &CameraUniform, starfield: &Starfield, viewport: (u32, u32)) -> Self {
        let [r, g, b] = starfield.color;
        Self {
            view_proj: camera.view_proj,
            model: starfield.model_matrix().to_cols_array_2d(),
            color_size: [r, g, b, starfield.point_size],
            viewport: [viewport.0.max(1) as f32, viewport.1.max(1) as f32, 0.0, 0.0],
        }
    }
}

impl Default for StarUniform {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            model: Mat4::IDENTITY.to_cols_array_2d(),
            color_size: [1.0, 1.0, 1.0, 2.0],
            viewport: [1.0, 1.0, 0.0, 0.0],
        }
    }
}

/// Draws a [`Starfield`] behind everything else in the pass.
pub struct StarfieldRenderer {
    pipeline: wgpu::RenderPipeline,
    instance_buffer: wgpu::Buffer,
    uniform: UniformBuffer<StarUniform>,
    bind_group: wgpu::BindGroup,
    star_count: u32,
}

impl StarfieldRenderer {
    /// Per-instance layout: one `vec3<f32>` position.
    const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 1] =
        wgpu::vertex_attr_array![0 => Float32x3];

    /// Upload the star positions and build the pipeline for `color_format`.
    pub fn new(device: &wgpu::Device, color_format: wgpu::TextureFormat, starfield: &Starfield) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("starfield-shader"),
            source: wgpu::ShaderSource::Wgsl(STARFIELD_SHADER.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("starfield-bgl"),
            entries: &[UniformBuffer::<StarUniform>::layout_entry(
                0,
                wgpu::ShaderStages::VERTEX_FRAGMENT,
            )],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("starfield-layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("starfield-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_star"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &Self::INSTANCE_ATTRIBUTES,
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(DepthMode::Background.state()),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_star"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        // Zero-sized vertex buffers cannot be bound; an empty sky keeps one
        // unused slot and draws nothing.
        let mut positions = starfield.flat_positions();
        if positions.is_empty() {
            positions.extend_from_slice(&[0.0; 3]);
        }
        let instance_buffer = create_vertex_buffer(device, "starfield-instances", &positions);

        let uniform = UniformBuffer::new(device, "starfield-uniform", &StarUniform::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("starfield-bg"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.binding(),
            }],
        });

        log::info!("Starfield renderer initialized ({} stars)", starfield.len());

        Self {
            pipeline,
            instance_buffer,
            uniform,
            bind_group,
            star_count: starfield.len() as u32,
        }
    }

    /// Write this frame's camera, rotation and viewport.
    pub fn update(
        &self,
        queue: &wgpu::Queue,
        camera: &CameraUniform,
        starfield: &Starfield,
        viewport: (u32, u32),
    ) {
        self.uniform
            .write(queue, &StarUniform::new(camera, starfield, viewport));
    }

    /// Draw the stars. Call first in the scene pass.
    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.star_count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
        pass.draw(0..VERTICES_PER_STAR, 0..self.star_count);
    }

    pub fn star_count(&self) -> u32 {
        self.star_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::starfield::{StarfieldConfig, generate};
    use globe_render::{Camera, request_headless_device};

    #[test]
    fn test_star_uniform_size() {
        assert_eq!(std::mem::size_of::<StarUniform>(), 160);
    }

    #[test]
    fn test_uniform_carries_rotation_and_size() {
        let mut stars = generate(&StarfieldConfig {
            star_count: 4,
            point_size: 3.0,
            ..Default::default()
        });
        stars.rotate_y(0.5);
        let uniform = StarUniform::new(&Camera::default().to_uniform(), &stars, (1280, 720));
        assert_eq!(uniform.color_size, [1.0, 1.0, 1.0, 3.0]);
        assert_eq!(uniform.viewport[..2], [1280.0, 720.0]);
        assert_eq!(uniform.model, stars.model_matrix().to_cols_array_2d());
    }

    #[test]
    fn test_zero_viewport_is_clamped() {
        let stars = generate(&StarfieldConfig {
            star_count: 1,
            ..Default::default()
        });
        let uniform = StarUniform::new(&Camera::default().to_uniform(), &stars, (0, 0));
        assert_eq!(uniform.viewport[..2], [1.0, 1.0]);
    }

    #[test]
    fn test_renderer_counts_stars() {
        let Some((device, _queue)) = request_headless_device() else {
            return;
        };
        let stars = generate(&StarfieldConfig {
            star_count: 64,
            seed: Some(1),
            ..Default::default()
        });
        let renderer =
            StarfieldRenderer::new(&device, wgpu::TextureFormat::Bgra8UnormSrgb, &stars);
        assert_eq!(renderer.star_count(), 64);
    }

    #[test]
    fn test_empty_starfield_renderer() {
        let Some((device, _queue)) = request_headless_device() else {
            return;
        };
        let stars = generate(&StarfieldConfig {
            star_count: 0,
            ..Default::default()
        });
        let renderer =
            StarfieldRenderer::new(&device, wgpu::TextureFormat::Bgra8UnormSrgb, &stars);
        assert_eq!(renderer.star_count(), 0);
    }
}
