//! Named cache of compiled WGSL modules.

use log::debug;
use std::{collections::HashMap, sync::Arc};
use wgpu::{ShaderModuleDescriptor, ShaderSource};

/// Compiled shader modules keyed by name.
///
/// Several pipelines share a module (every globe layer uses the same vertex
/// stage), so compilation happens once per name.
#[derive(Default)]
pub struct ShaderLibrary {
    modules: HashMap<String, Arc<wgpu::ShaderModule>>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the module called `name`, compiling `source` on first request.
    pub fn get_or_load(
        &mut self,
        device: &wgpu::Device,
        name: &str,
        source: &str,
    ) -> Arc<wgpu::ShaderModule> {
        if let Some(module) = self.modules.get(name) {
            return Arc::clone(module);
        }
        debug!("Compiling shader '{name}'");
        let module = Arc::new(device.create_shader_module(ShaderModuleDescriptor {
            label: Some(name),
            source: ShaderSource::Wgsl(source.into()),
        }));
        self.modules.insert(name.to_string(), Arc::clone(&module));
        module
    }

    pub fn get(&self, name: &str) -> Option<Arc<wgpu::ShaderModule>> {
        self.modules.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::request_headless_device;

    const TRIVIAL: &str = r#"
@vertex
fn vs_main(@builtin(vertex_index) i: u32) -> @builtin(position) vec4<f32> {
    return vec4<f32>(f32(i), 0.0, 0.0, 1.0);
}
"#;

    #[test]
    fn test_empty_library() {
        let library = ShaderLibrary::new();
        assert!(library.is_empty());
        assert!(library.get("missing").is_none());
    }

    #[test]
    fn test_get_or_load_compiles_once() {
        let Some((device, _queue)) = request_headless_device() else {
            return;
        };
        let mut library = ShaderLibrary::new();
        let first = library.get_or_load(&device, "trivial", TRIVIAL);
        let second = library.get_or_load(&device, "trivial", "not even wgsl");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(library.len(), 1);
    }
}
