// GPU capabilities consumed by the instance, shader and pipeline code
//
// The instance factory only needs three loader entry points and the pipeline
// builder only needs four from a logical device. Keeping them behind traits
// lets the resource lifecycle be exercised without a GPU.

use ash::prelude::VkResult;
use ash::vk;

/// Loader entry points used to bring an instance up and down
pub trait InstanceLoader {
    type Instance: Clone + Send + 'static;

    /// Packed version the loader supports. `None` means a 1.0 loader.
    fn instance_version(&self) -> VkResult<Option<u32>>;

    fn create_instance(&self, create_info: &vk::InstanceCreateInfo<'_>) -> VkResult<Self::Instance>;

    fn destroy_instance(instance: &Self::Instance);
}

impl InstanceLoader for ash::Entry {
    type Instance = ash::Instance;

    fn instance_version(&self) -> VkResult<Option<u32>> {
        unsafe { self.try_enumerate_instance_version() }
    }

    fn create_instance(&self, create_info: &vk::InstanceCreateInfo<'_>) -> VkResult<ash::Instance> {
        unsafe { ash::Entry::create_instance(self, create_info, None) }
    }

    fn destroy_instance(instance: &ash::Instance) {
        unsafe { instance.destroy_instance(None) }
    }
}

pub trait GpuDevice: Send + Sync {
    /// Wrap SPIR-V words in a shader module
    fn create_shader_module(&self, code: &[u32]) -> VkResult<vk::ShaderModule>;

    fn destroy_shader_module(&self, module: vk::ShaderModule);

    /// Issue a single graphics pipeline creation call
    fn create_graphics_pipeline(
        &self,
        create_info: &vk::GraphicsPipelineCreateInfo<'_>,
    ) -> VkResult<vk::Pipeline>;

    fn destroy_pipeline(&self, pipeline: vk::Pipeline);
}
