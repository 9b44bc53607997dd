//! GPU renderer for the layered globe.
//!
//! All four layers draw the same icosphere with their own model matrix,
//! pipeline and bind group. Group 0 holds the camera, group 1 the layer
//! uniform, the shared sampler and the layer's maps.

use bytemuck::{Pod, Zeroable};

use globe_render::{
    CameraUniform, MeshBuffer, ShaderLibrary, UniformBuffer, VertexPositionNormalUv,
    sampler_layout_entry, texture_layout_entry,
};

use crate::fresnel::FresnelParams;
use crate::globe::Globe;
use crate::layer::Layer;
use crate::mesh::SphereMesh;
use crate::textures::{EarthMap, EarthTextures};

const SURFACE_SHADER: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/surface.wgsl")
);
const LIGHTS_SHADER: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/lights.wgsl")
);
const CLOUDS_SHADER: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/clouds.wgsl")
);
const GLOW_SHADER: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/glow.wgsl")
);

/// Height-map scale for the surface bump.
pub const BUMP_SCALE: f32 = 0.04;

/// Blinn-Phong exponent for the oceans.
pub const SHININESS: f32 = 30.0;

/// Per-layer uniform. Layout matches `Layer` in `common.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct LayerUniform {
    pub model: [[f32; 4]; 4],
    /// xyz towards the sun, w intensity.
    pub sun: [f32; 4],
    /// opacity, bump scale, shininess, fresnel power.
    pub material: [f32; 4],
    /// Rim color and fresnel bias.
    pub rim_bias: [f32; 4],
    /// Facing color and fresnel scale.
    pub facing_scale: [f32; 4],
}

impl LayerUniform {
    pub fn new(layer: Layer, globe: &Globe, fresnel: &FresnelParams) -> Self {
        let sun = globe.sun_direction();
        let opacity = match layer {
            Layer::Clouds => globe.settings.cloud_opacity,
            Layer::Surface | Layer::Lights | Layer::Glow => 1.0,
        };
        Self {
            model: globe.model_matrix(layer).to_cols_array_2d(),
            sun: [sun.x, sun.y, sun.z, globe.settings.sun_intensity],
            material: [opacity, BUMP_SCALE, SHININESS, fresnel.power],
            rim_bias: fresnel.rim_color.extend(fresnel.bias).to_array(),
            facing_scale: fresnel.facing_color.extend(fresnel.scale).to_array(),
        }
    }
}

impl Layer {
    /// Maps bound at group 1 from binding 2 upwards, in order.
    pub fn maps(self) -> &'static [EarthMap] {
        match self {
            Layer::Surface => &[EarthMap::Day, EarthMap::Specular, EarthMap::Bump],
            Layer::Lights => &[EarthMap::Lights],
            Layer::Clouds => &[EarthMap::Clouds, EarthMap::CloudAlpha],
            Layer::Glow => &[],
        }
    }

    fn shader_source(self) -> &'static str {
        match self {
            Layer::Surface => SURFACE_SHADER,
            Layer::Lights => LIGHTS_SHADER,
            Layer::Clouds => CLOUDS_SHADER,
            Layer::Glow => GLOW_SHADER,
        }
    }
}

struct LayerPass {
    layer: Layer,
    pipeline: wgpu::RenderPipeline,
    uniform: UniformBuffer<LayerUniform>,
    bind_group: wgpu::BindGroup,
}

/// Draws the surface, city lights, clouds and glow.
pub struct EarthRenderer {
    mesh: MeshBuffer,
    camera: UniformBuffer<CameraUniform>,
    camera_bind_group: wgpu::BindGroup,
    layers: Vec<LayerPass>,
    pub fresnel: FresnelParams,
}

impl EarthRenderer {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        sphere: &SphereMesh,
        textures: &EarthTextures,
        sampler: &wgpu::Sampler,
        shaders: &mut ShaderLibrary,
    ) -> Self {
        let mesh = MeshBuffer::new(device, "globe-sphere", &sphere.vertices, &sphere.indices);

        let camera_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globe-camera-bgl"),
            entries: &[UniformBuffer::<CameraUniform>::layout_entry(
                0,
                wgpu::ShaderStages::VERTEX_FRAGMENT,
            )],
        });
        let camera = UniformBuffer::new(device, "globe-camera", &CameraUniform::zeroed());
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globe-camera-bg"),
            layout: &camera_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera.binding(),
            }],
        });

        let fresnel = FresnelParams::default();
        let globe = Globe::default();
        let layers = Layer::ALL
            .into_iter()
            .map(|layer| {
                let uniform = UniformBuffer::new(
                    device,
                    &format!("globe-{}-uniform", layer.label()),
                    &LayerUniform::new(layer, &globe, &fresnel),
                );
                let (layout, bind_group) =
                    layer_bind_group(device, layer, &uniform, textures, sampler);
                let module = shaders.get_or_load(device, layer.label(), layer.shader_source());
                let pipeline =
                    layer_pipeline(device, layer, &module, &[&camera_bgl, &layout], color_format);
                LayerPass {
                    layer,
                    pipeline,
                    uniform,
                    bind_group,
                }
            })
            .collect();

        log::info!(
            "Earth renderer initialized ({} triangles, {} layers)",
            sphere.triangle_count(),
            Layer::ALL.len()
        );

        Self {
            mesh,
            camera,
            camera_bind_group,
            layers,
            fresnel,
        }
    }

    /// Write this frame's camera and every layer's transform.
    pub fn update(&self, queue: &wgpu::Queue, camera: &CameraUniform, globe: &Globe) {
        self.camera.write(queue, camera);
        for pass in &self.layers {
            pass.uniform
                .write(queue, &LayerUniform::new(pass.layer, globe, &self.fresnel));
        }
    }

    /// Draw all layers. Call after the starfield in the same pass.
    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) {
        self.mesh.bind(pass);
        pass.set_bind_group(0, &self.camera_bind_group, &[]);
        for layer in &self.layers {
            pass.set_pipeline(&layer.pipeline);
            pass.set_bind_group(1, &layer.bind_group, &[]);
            self.mesh.draw(pass);
        }
    }
}

fn layer_bind_group(
    device: &wgpu::Device,
    layer: Layer,
    uniform: &UniformBuffer<LayerUniform>,
    textures: &EarthTextures,
    sampler: &wgpu::Sampler,
) -> (wgpu::BindGroupLayout, wgpu::BindGroup) {
    let maps = layer.maps();

    let mut layout_entries = vec![UniformBuffer::<LayerUniform>::layout_entry(
        0,
        wgpu::ShaderStages::VERTEX_FRAGMENT,
    )];
    let mut entries = vec![wgpu::BindGroupEntry {
        binding: 0,
        resource: uniform.binding(),
    }];
    if !maps.is_empty() {
        layout_entries.push(sampler_layout_entry(1));
        entries.push(wgpu::BindGroupEntry {
            binding: 1,
            resource: wgpu::BindingResource::Sampler(sampler),
        });
    }
    for (i, map) in maps.iter().enumerate() {
        let binding = 2 + i as u32;
        layout_entries.push(texture_layout_entry(binding));
        entries.push(wgpu::BindGroupEntry {
            binding,
            resource: wgpu::BindingResource::TextureView(textures.view(*map)),
        });
    }

    let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(&format!("globe-{}-bgl", layer.label())),
        entries: &layout_entries,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("globe-{}-bg", layer.label())),
        layout: &layout,
        entries: &entries,
    });
    (layout, bind_group)
}

fn layer_pipeline(
    device: &wgpu::Device,
    layer: Layer,
    module: &wgpu::ShaderModule,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    color_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let label = format!("globe-{}-pipeline", layer.label());
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&label),
        bind_group_layouts,
        immediate_size: 0,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some("vs_main"),
            buffers: &[VertexPositionNormalUv::layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(layer.depth_mode().state()),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: layer.blend(),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview_mask: None,
        cache: None,
    })
}
