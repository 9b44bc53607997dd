//! GPU texture creation, caching and mipmap generation.
//!
//! [`TextureManager`] uploads RGBA8 images once, generates their mip chains
//! with a blit pass, and hands out [`Arc<ManagedTexture>`]s by name. Pipelines
//! build their own bind groups from the texture views and the shared
//! [`TextureManager::sampler`], since each globe layer samples several maps.

use std::collections::HashMap;
use std::sync::Arc;

/// A GPU texture with its default view and metadata.
pub struct ManagedTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    /// Width and height in texels.
    pub dimensions: (u32, u32),
    pub format: wgpu::TextureFormat,
    /// Number of mip levels (1 if mipmaps were not generated).
    pub mip_level_count: u32,
}

/// Pixel data and layout for one 2D texture upload.
#[derive(Clone, Copy, Debug)]
pub struct TextureSource<'a> {
    /// Cache key and debug label.
    pub name: &'a str,
    /// Tightly packed rows, top row first.
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
    pub generate_mipmaps: bool,
}

/// Errors that can occur during texture creation.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    /// Pixel data length doesn't match the expected size for the given dimensions and format.
    #[error(
        "texture data size ({actual}) does not match expected ({expected}) for {width}x{height} {format:?}"
    )]
    DataSizeMismatch {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    },

    /// Width or height is zero.
    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },
}

/// Number of mip levels for the given dimensions.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Bind group layout entry for a filterable 2D texture visible to fragments.
pub fn texture_layout_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

/// Bind group layout entry for a filtering sampler visible to fragments.
pub fn sampler_layout_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

/// WGSL shader for mipmap generation via fullscreen blit.
const BLIT_SHADER_SOURCE: &str = r#"
@group(0) @binding(0) var src_texture: texture_2d<f32>;
@group(0) @binding(1) var src_sampler: sampler;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) idx: u32) -> VertexOutput {
    let uv = vec2<f32>(f32((idx << 1u) & 2u), f32(idx & 2u));
    var out: VertexOutput;
    out.position = vec4<f32>(uv * 2.0 - 1.0, 0.0, 1.0);
    out.uv = vec2<f32>(uv.x, 1.0 - uv.y);
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(src_texture, src_sampler, in.uv);
}
"#;

/// Texture cache with a shared sampler and a mipmap blitter.
pub struct TextureManager {
    textures: HashMap<String, Arc<ManagedTexture>>,
    sampler: wgpu::Sampler,
    blit_shader: wgpu::ShaderModule,
    blit_pipeline_layout: wgpu::PipelineLayout,
    blit_bind_group_layout: wgpu::BindGroupLayout,
    blit_sampler: wgpu::Sampler,
    /// One blit pipeline per target format, built on first use.
    blit_pipelines: HashMap<wgpu::TextureFormat, wgpu::RenderPipeline>,
}

impl TextureManager {
    pub fn new(device: &wgpu::Device) -> Self {
        // Equirectangular maps wrap around the globe horizontally and clamp at the poles.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("globe-sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            anisotropy_clamp: 1,
            ..Default::default()
        });

        let blit_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("blit-bind-group-layout"),
                entries: &[texture_layout_entry(0), sampler_layout_entry(1)],
            });

        let blit_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blit-shader"),
            source: wgpu::ShaderSource::Wgsl(BLIT_SHADER_SOURCE.into()),
        });

        let blit_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("blit-pipeline-layout"),
            bind_group_layouts: &[&blit_bind_group_layout],
            immediate_size: 0,
        });

        let blit_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("blit-sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            textures: HashMap::new(),
            sampler,
            blit_shader,
            blit_pipeline_layout,
            blit_bind_group_layout,
            blit_sampler,
            blit_pipelines: HashMap::new(),
        }
    }

    /// Upload a 2D texture, or return the cached one with the same name.
    pub fn create_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        source: &TextureSource<'_>,
    ) -> Result<Arc<ManagedTexture>, TextureError> {
        if let Some(existing) = self.textures.get(source.name) {
            return Ok(Arc::clone(existing));
        }

        let TextureSource {
            name,
            data,
            width,
            height,
            format,
            generate_mipmaps,
        } = *source;

        validate_dimensions(width, height)?;
        validate_data_size(data, width, height, format)?;

        let mip_levels = if generate_mipmaps {
            mip_level_count(width, height)
        } else {
            1
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(name),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: mip_levels,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row(width, format)),
                rows_per_image: None,
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        if mip_levels > 1 {
            self.generate_mipmaps(device, queue, &texture, format, mip_levels);
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let managed = Arc::new(ManagedTexture {
            texture,
            view,
            dimensions: (width, height),
            format,
            mip_level_count: mip_levels,
        });

        self.textures.insert(name.to_string(), Arc::clone(&managed));
        log::debug!("Created texture '{name}' ({width}x{height}, {mip_levels} mips)");
        Ok(managed)
    }

    pub fn get(&self, name: &str) -> Option<Arc<ManagedTexture>> {
        self.textures.get(name).cloned()
    }

    /// Remove a texture from the cache. Returns `true` if it existed.
    pub fn remove(&mut self, name: &str) -> bool {
        self.textures.remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Trilinear sampler that wraps horizontally.
    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    fn blit_pipeline(
        &mut self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
    ) -> &wgpu::RenderPipeline {
        let shader = &self.blit_shader;
        let layout = &self.blit_pipeline_layout;
        self.blit_pipelines.entry(format).or_insert_with(|| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("mipmap-pipeline"),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: Some("vs_main"),
                    buffers: &[],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                multiview_mask: None,
                cache: None,
            })
        })
    }

    /// Fill mip levels 1.. by repeatedly downsampling the previous level.
    fn generate_mipmaps(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture: &wgpu::Texture,
        format: wgpu::TextureFormat,
        mip_count: u32,
    ) {
        // Build the pipeline before borrowing the bind group layout and sampler.
        self.blit_pipeline(device, format);
        let Some(pipeline) = self.blit_pipelines.get(&format) else {
            return;
        };

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("mipmap-encoder"),
        });

        for level in 1..mip_count {
            let src_view = texture.create_view(&wgpu::TextureViewDescriptor {
                base_mip_level: level - 1,
                mip_level_count: Some(1),
                ..Default::default()
            });
            let dst_view = texture.create_view(&wgpu::TextureViewDescriptor {
                base_mip_level: level,
                mip_level_count: Some(1),
                ..Default::default()
            });

            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("mipmap-bind-group"),
                layout: &self.blit_bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&src_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.blit_sampler),
                    },
                ],
            });

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("mipmap-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &dst_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        queue.submit(std::iter::once(encoder.finish()));
    }
}

fn expected_byte_size(width: u32, height: u32, format: wgpu::TextureFormat) -> usize {
    let bpp = format.block_copy_size(None).unwrap_or(4) as usize;
    width as usize * height as usize * bpp
}

fn bytes_per_row(width: u32, format: wgpu::TextureFormat) -> u32 {
    width * format.block_copy_size(None).unwrap_or(4)
}

fn validate_dimensions(width: u32, height: u32) -> Result<(), TextureError> {
    if width == 0 || height == 0 {
        return Err(TextureError::ZeroDimensions { width, height });
    }
    Ok(())
}

fn validate_data_size(
    data: &[u8],
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
) -> Result<(), TextureError> {
    let expected = expected_byte_size(width, height, format);
    if data.len() != expected {
        return Err(TextureError::DataSizeMismatch {
            actual: data.len(),
            expected,
            width,
            height,
            format,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::request_headless_device;

    fn rgba_source<'a>(name: &'a str, data: &'a [u8], width: u32, mips: bool) -> TextureSource<'a> {
        let height = (data.len() / 4) as u32 / width;
        TextureSource {
            name,
            data,
            width,
            height,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            generate_mipmaps: mips,
        }
    }

    #[test]
    fn test_mipmap_level_count_calculation() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 2), 2);
        assert_eq!(mip_level_count(4, 4), 3);
        assert_eq!(mip_level_count(256, 256), 9);
        assert_eq!(mip_level_count(512, 256), 10);
        assert_eq!(mip_level_count(2048, 1024), 12);
        assert_eq!(mip_level_count(0, 0), 1);
    }

    #[test]
    fn test_validation_rejects_zero_dimensions() {
        assert!(matches!(
            validate_dimensions(0, 16),
            Err(TextureError::ZeroDimensions { width: 0, height: 16 })
        ));
        assert!(validate_dimensions(1, 1).is_ok());
    }

    #[test]
    fn test_validation_rejects_short_data() {
        let result = validate_data_size(&[0u8; 32], 4, 4, wgpu::TextureFormat::Rgba8Unorm);
        assert!(matches!(
            result,
            Err(TextureError::DataSizeMismatch {
                actual: 32,
                expected: 64,
                ..
            })
        ));
    }

    #[test]
    fn test_create_texture_with_valid_dimensions() {
        let Some((device, queue)) = request_headless_device() else {
            return;
        };
        let mut manager = TextureManager::new(&device);
        let data = vec![255u8; 64];
        let tex = manager
            .create_texture(&device, &queue, &rgba_source("test-4x4", &data, 4, false))
            .unwrap();
        assert_eq!(tex.dimensions, (4, 4));
        assert_eq!(tex.format, wgpu::TextureFormat::Rgba8UnormSrgb);
    }

    #[test]
    fn test_texture_cache_deduplicates() {
        let Some((device, queue)) = request_headless_device() else {
            return;
        };
        let mut manager = TextureManager::new(&device);
        let data = vec![255u8; 16];
        let tex1 = manager
            .create_texture(&device, &queue, &rgba_source("shared", &data, 2, false))
            .unwrap();
        let tex2 = manager
            .create_texture(&device, &queue, &rgba_source("shared", &data, 2, false))
            .unwrap();
        assert!(Arc::ptr_eq(&tex1, &tex2));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_mipmap_generation_sets_correct_mip_count() {
        let Some((device, queue)) = request_headless_device() else {
            return;
        };
        let mut manager = TextureManager::new(&device);
        // Equirectangular 2:1 map: the chain follows the longer side.
        let data = vec![255u8; 512 * 256 * 4];
        let tex = manager
            .create_texture(&device, &queue, &rgba_source("day-map", &data, 512, true))
            .unwrap();
        assert_eq!(tex.dimensions, (512, 256));
        assert_eq!(tex.mip_level_count, 10);
    }

    #[test]
    fn test_linear_and_srgb_share_blitter_per_format() {
        let Some((device, queue)) = request_headless_device() else {
            return;
        };
        let mut manager = TextureManager::new(&device);
        let data = vec![0u8; 16 * 16 * 4];
        manager
            .create_texture(&device, &queue, &rgba_source("a", &data, 16, true))
            .unwrap();
        manager
            .create_texture(&device, &queue, &rgba_source("b", &data, 16, true))
            .unwrap();
        let linear = TextureSource {
            format: wgpu::TextureFormat::Rgba8Unorm,
            ..rgba_source("c", &data, 16, true)
        };
        manager.create_texture(&device, &queue, &linear).unwrap();
        assert_eq!(manager.blit_pipelines.len(), 2);
    }

    #[test]
    fn test_removed_map_can_be_reuploaded() {
        let Some((device, queue)) = request_headless_device() else {
            return;
        };
        let mut manager = TextureManager::new(&device);
        let data = vec![0u8; 8 * 4 * 4];
        let first = manager
            .create_texture(&device, &queue, &rgba_source("clouds", &data, 8, false))
            .unwrap();
        assert!(manager.remove("clouds"));
        assert!(!manager.remove("clouds"));
        assert!(manager.is_empty());

        let second = manager
            .create_texture(&device, &queue, &rgba_source("clouds", &data, 8, false))
            .unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.dimensions, (8, 4));
    }
}
