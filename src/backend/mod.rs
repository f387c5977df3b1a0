// Backend module - Vulkan abstraction layer
//
// Design: Thin owning wrappers around ash. Every handle has one owner and is
// released exactly once.

pub mod device;
pub mod gpu;
pub mod instance;
pub mod pipeline;
pub mod pipeline_config;
pub mod render_pass;
pub mod shader;

#[cfg(test)]
pub(crate) mod mock;

pub use device::VulkanDevice;
pub use gpu::{GpuDevice, InstanceLoader};
pub use pipeline::GraphicsPipeline;
pub use pipeline_config::{default_configuration, PipelineConfig};
pub use shader::ShaderModule;
