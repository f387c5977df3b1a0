// Shader module loading and management
//
// Vulkan consumes SPIR-V bytecode. A ShaderModule owns exactly one module
// handle and destroys it once, either on release() or when dropped.

use ash::vk;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use super::gpu::GpuDevice;
use crate::error::{PipelineError, PipelineResult};

pub struct ShaderModule {
    device: Arc<dyn GpuDevice>,
    handle: vk::ShaderModule,
}

impl ShaderModule {
    /// Read a compiled SPIR-V file and create a module from it
    pub fn load(device: Arc<dyn GpuDevice>, path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let code = std::fs::read(path).map_err(|source| PipelineError::ShaderIo {
            path: path.to_path_buf(),
            source,
        })?;

        log::debug!("Read shader {:?} ({} bytes)", path, code.len());

        Self::from_code(device, &code)
    }

    /// Create a module from raw SPIR-V bytes
    pub fn from_code(device: Arc<dyn GpuDevice>, code: &[u8]) -> PipelineResult<Self> {
        if code.is_empty() {
            return Err(PipelineError::EmptyShaderCode);
        }
        if code.len() % 4 != 0 {
            return Err(PipelineError::MisalignedShaderCode { len: code.len() });
        }

        // read_spv copies into u32 storage, so the byte slice alignment does not matter
        let words = ash::util::read_spv(&mut Cursor::new(code)).map_err(|_| {
            PipelineError::MisalignedShaderCode { len: code.len() }
        })?;

        let handle = device
            .create_shader_module(&words)
            .map_err(PipelineError::ShaderModuleCreation)?;

        Ok(Self { device, handle })
    }

    pub fn handle(&self) -> vk::ShaderModule {
        self.handle
    }

    pub fn is_released(&self) -> bool {
        self.handle == vk::ShaderModule::null()
    }

    /// Destroy the module now. Later calls (and Drop) do nothing.
    pub fn release(&mut self) {
        let handle = std::mem::replace(&mut self.handle, vk::ShaderModule::null());
        if handle != vk::ShaderModule::null() {
            self.device.destroy_shader_module(handle);
        }
    }
}

impl Drop for ShaderModule {
    fn drop(&mut self) {
        self.release();
    }
}
