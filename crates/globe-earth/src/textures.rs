//! Earth texture maps: loading from disk, procedural fallbacks, GPU upload.
//!
//! A missing file is not fatal; the viewer substitutes a small procedural map
//! for that role and logs a warning. A file that exists but fails to decode
//! is reported as an error.

use std::f32::consts::PI;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use globe_render::{ManagedTexture, TextureError, TextureManager, TextureSource};

/// Errors raised while loading Earth textures.
#[derive(Debug, thiserror::Error)]
pub enum EarthTextureError {
    /// The file exists but could not be decoded.
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// GPU upload rejected the decoded image.
    #[error(transparent)]
    Texture(#[from] TextureError),
}

/// The six maps the globe samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EarthMap {
    Day,
    Bump,
    Specular,
    Lights,
    Clouds,
    CloudAlpha,
}

impl EarthMap {
    pub const ALL: [EarthMap; 6] = [
        EarthMap::Day,
        EarthMap::Bump,
        EarthMap::Specular,
        EarthMap::Lights,
        EarthMap::Clouds,
        EarthMap::CloudAlpha,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            EarthMap::Day => "00_earthmap1k.jpg",
            EarthMap::Bump => "01_earthbump1k.jpg",
            EarthMap::Specular => "02_earthspec1k.jpg",
            EarthMap::Lights => "03_earthlights1k.jpg",
            EarthMap::Clouds => "04_earthcloudmap.jpg",
            EarthMap::CloudAlpha => "05_earthcloudmaptrans.jpg",
        }
    }

    /// Color maps are sRGB-encoded; data maps are sampled as-is.
    pub fn format(self) -> wgpu::TextureFormat {
        match self {
            EarthMap::Day | EarthMap::Lights | EarthMap::Clouds => {
                wgpu::TextureFormat::Rgba8UnormSrgb
            }
            EarthMap::Bump | EarthMap::Specular | EarthMap::CloudAlpha => {
                wgpu::TextureFormat::Rgba8Unorm
            }
        }
    }

    fn index(self) -> usize {
        match self {
            EarthMap::Day => 0,
            EarthMap::Bump => 1,
            EarthMap::Specular => 2,
            EarthMap::Lights => 3,
            EarthMap::Clouds => 4,
            EarthMap::CloudAlpha => 5,
        }
    }
}

/// Decoded RGBA8 pixels for one map.
#[derive(Clone, Debug)]
pub struct MapImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    /// True when the pixels were generated instead of loaded.
    pub procedural: bool,
}

/// Load one map from `dir`, falling back to a procedural map when the file is missing.
pub fn load_map(dir: &Path, map: EarthMap) -> Result<MapImage, EarthTextureError> {
    let path = dir.join(map.file_name());
    if !path.is_file() {
        log::warn!(
            "Texture {} not found, using procedural {map:?} map",
            path.display()
        );
        return Ok(fallback_map(map));
    }

    // Sniff the content; the extension alone is not trusted.
    let image = image::ImageReader::open(&path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(image::ImageError::IoError)
        .and_then(|reader| reader.decode())
        .map_err(|source| EarthTextureError::Decode {
            path: path.clone(),
            source,
        })?
        .to_rgba8();
    let (width, height) = image.dimensions();
    log::debug!("Loaded {} ({width}x{height})", path.display());
    Ok(MapImage {
        width,
        height,
        pixels: image.into_raw(),
        procedural: false,
    })
}

/// Width of the generated maps. Height is half of it, as for any equirectangular map.
pub const FALLBACK_WIDTH: u32 = 128;

/// Generate a stand-in for a missing map.
///
/// The day, bump and specular fallbacks share one land mask so oceans are
/// blue, flat and shiny together.
pub fn fallback_map(map: EarthMap) -> MapImage {
    let width = FALLBACK_WIDTH;
    let height = FALLBACK_WIDTH / 2;
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);

    for y in 0..height {
        let v = (y as f32 + 0.5) / height as f32;
        for x in 0..width {
            let u = (x as f32 + 0.5) / width as f32;
            let land = is_land(u, v);
            let polar = !(0.08..=0.92).contains(&v);
            let rgba = match map {
                EarthMap::Day if polar => [235, 240, 245, 255],
                EarthMap::Day if land => [70, 110, 50, 255],
                EarthMap::Day => [12, 40, 95, 255],
                EarthMap::Bump if land || polar => [140, 140, 140, 255],
                EarthMap::Bump => [0, 0, 0, 255],
                EarthMap::Specular if land || polar => [0, 0, 0, 255],
                EarthMap::Specular => [255, 255, 255, 255],
                EarthMap::Lights if land && !polar && city_hash(x, y) => [255, 200, 120, 255],
                EarthMap::Lights => [0, 0, 0, 255],
                EarthMap::Clouds => [255, 255, 255, 255],
                EarthMap::CloudAlpha => {
                    let a = (cloud_density(u, v) * 255.0) as u8;
                    [a, a, a, 255]
                }
            };
            pixels.extend_from_slice(&rgba);
        }
    }

    MapImage {
        width,
        height,
        pixels,
        procedural: true,
    }
}

/// Blobby continents from a few low-frequency waves.
fn is_land(u: f32, v: f32) -> bool {
    let lon = u * 2.0 * PI;
    let lat = (v - 0.5) * PI;
    let h = (lon * 2.0).sin() * (lat * 3.0).cos()
        + 0.5 * (lon * 5.0 + 1.3).sin() * (lat * 4.0).sin();
    h > 0.45
}

/// Sparse deterministic speckle for city lights.
fn city_hash(x: u32, y: u32) -> bool {
    (x.wrapping_mul(73_856_093) ^ y.wrapping_mul(19_349_663)) % 7 == 0
}

/// Banded cloud cover in `[0, 1]`.
fn cloud_density(u: f32, v: f32) -> f32 {
    let lat = (v - 0.5) * PI;
    let bands = (lat * 9.0).sin() * 0.5 + 0.5;
    let swirl = ((u * 2.0 * PI * 3.0) + lat * 4.0).sin() * 0.5 + 0.5;
    (bands * swirl).clamp(0.0, 1.0)
}

/// The six uploaded maps.
pub struct EarthTextures {
    /// Indexed by [`EarthMap`] order.
    maps: Vec<Arc<ManagedTexture>>,
}

impl EarthTextures {
    pub fn get(&self, map: EarthMap) -> &Arc<ManagedTexture> {
        &self.maps[map.index()]
    }

    pub fn view(&self, map: EarthMap) -> &wgpu::TextureView {
        &self.get(map).view
    }
}

/// Load every map from `dir` and upload it with mipmaps.
pub fn load_earth_textures(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    manager: &mut TextureManager,
    dir: &Path,
) -> Result<EarthTextures, EarthTextureError> {
    let mut maps = Vec::with_capacity(EarthMap::ALL.len());
    let mut fallbacks = 0;
    for map in EarthMap::ALL {
        let image = load_map(dir, map)?;
        fallbacks += usize::from(image.procedural);
        maps.push(upload_map(device, queue, manager, map, &image)?);
    }

    if fallbacks > 0 {
        log::warn!("{fallbacks} of 6 Earth maps are procedural stand-ins");
    } else {
        log::info!("Loaded Earth textures from {}", dir.display());
    }
    Ok(EarthTextures { maps })
}

fn upload_map(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    manager: &mut TextureManager,
    map: EarthMap,
    image: &MapImage,
) -> Result<Arc<ManagedTexture>, TextureError> {
    manager.create_texture(
        device,
        queue,
        &TextureSource {
            name: map.file_name(),
            data: &image.pixels,
            width: image.width,
            height: image.height,
            format: map.format(),
            generate_mipmaps: true,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use globe_render::request_headless_device;

    #[test]
    fn test_file_names_are_ordered() {
        let names: Vec<_> = EarthMap::ALL.iter().map(|m| m.file_name()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), 6);
    }

    #[test]
    fn test_color_maps_are_srgb() {
        assert!(EarthMap::Day.format().is_srgb());
        assert!(EarthMap::Lights.format().is_srgb());
        assert!(EarthMap::Clouds.format().is_srgb());
        assert!(!EarthMap::Bump.format().is_srgb());
        assert!(!EarthMap::Specular.format().is_srgb());
        assert!(!EarthMap::CloudAlpha.format().is_srgb());
    }

    #[test]
    fn test_fallback_maps_have_full_size() {
        for map in EarthMap::ALL {
            let image = fallback_map(map);
            assert!(image.procedural);
            assert_eq!(image.width, FALLBACK_WIDTH);
            assert_eq!(image.height, FALLBACK_WIDTH / 2);
            assert_eq!(image.pixels.len(), (image.width * image.height * 4) as usize);
        }
    }

    #[test]
    fn test_fallback_ocean_is_shiny_and_flat() {
        let spec = fallback_map(EarthMap::Specular);
        let bump = fallback_map(EarthMap::Bump);
        let shiny = spec.pixels.chunks(4).filter(|p| p[0] == 255).count();
        assert!(shiny > 0, "fallback has no ocean");
        for (s, b) in spec.pixels.chunks(4).zip(bump.pixels.chunks(4)) {
            if s[0] == 255 {
                assert_eq!(b[0], 0);
            }
        }
    }

    #[test]
    fn test_missing_file_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let image = load_map(dir.path(), EarthMap::Day).unwrap();
        assert!(image.procedural);
    }

    #[test]
    fn test_existing_file_is_decoded() {
        let dir = tempfile::tempdir().unwrap();
        // The extension says jpg; the content is PNG and gets sniffed.
        let path = dir.path().join(EarthMap::Clouds.file_name());
        let mut img = image::RgbaImage::new(8, 4);
        img.put_pixel(1, 2, image::Rgba([10, 20, 30, 255]));
        img.save_with_format(&path, image::ImageFormat::Png).unwrap();

        let image = load_map(dir.path(), EarthMap::Clouds).unwrap();
        assert!(!image.procedural);
        assert_eq!((image.width, image.height), (8, 4));
        let offset = ((2 * 8 + 1) * 4) as usize;
        assert_eq!(&image.pixels[offset..offset + 4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(EarthMap::Bump.file_name()), b"not an image").unwrap();
        let result = load_map(dir.path(), EarthMap::Bump);
        assert!(matches!(result, Err(EarthTextureError::Decode { .. })));
    }

    #[test]
    fn test_upload_all_fallbacks() {
        let Some((device, queue)) = request_headless_device() else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let mut manager = TextureManager::new(&device);
        let textures = load_earth_textures(&device, &queue, &mut manager, dir.path()).unwrap();
        assert_eq!(manager.len(), 6);
        assert_eq!(
            textures.get(EarthMap::Day).format,
            wgpu::TextureFormat::Rgba8UnormSrgb
        );
        assert_eq!(textures.get(EarthMap::Bump).mip_level_count, 8);
    }
}
