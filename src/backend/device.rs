// Vulkan Device - Core GPU interface
//
// Responsibilities:
// - Physical device selection (prefer discrete GPU)
// - Logical device + graphics queue creation
// - The GpuDevice entry points used by shaders and pipelines

use anyhow::{Context, Result};
use ash::prelude::VkResult;
use ash::vk;
use std::ffi::CStr;
use std::sync::Arc;

use super::gpu::GpuDevice;

/// Surface the graphics queue must be able to present to
pub type PresentTarget<'a> = (&'a ash::khr::surface::Instance, vk::SurfaceKHR);

/// Logical device wrapper with automatic cleanup.
///
/// Every object created from this device must be destroyed before it drops;
/// holders keep an `Arc` to guarantee that.
pub struct VulkanDevice {
    pub device: ash::Device,
    pub physical_device: vk::PhysicalDevice,

    pub graphics_queue: vk::Queue,
    pub graphics_queue_family: u32,

    pub properties: vk::PhysicalDeviceProperties,
}

impl VulkanDevice {
    pub fn new(instance: &ash::Instance, present: Option<PresentTarget<'_>>) -> Result<Arc<Self>> {
        let (physical_device, graphics_queue_family) = Self::pick_physical_device(instance, present)?;

        let (device, graphics_queue) =
            Self::create_logical_device(instance, physical_device, graphics_queue_family)?;

        let properties = unsafe { instance.get_physical_device_properties(physical_device) };

        log::info!(
            "Selected GPU: {}",
            properties
                .device_name_as_c_str()
                .map(CStr::to_string_lossy)
                .unwrap_or_default()
        );
        log::info!(
            "API Version: {}.{}.{}",
            vk::api_version_major(properties.api_version),
            vk::api_version_minor(properties.api_version),
            vk::api_version_patch(properties.api_version)
        );

        Ok(Arc::new(Self {
            device,
            physical_device,
            graphics_queue,
            graphics_queue_family,
            properties,
        }))
    }

    fn pick_physical_device(
        instance: &ash::Instance,
        present: Option<PresentTarget<'_>>,
    ) -> Result<(vk::PhysicalDevice, u32)> {
        let devices = unsafe { instance.enumerate_physical_devices() }
            .context("Failed to enumerate physical devices")?;

        if devices.is_empty() {
            anyhow::bail!("No Vulkan-capable GPU found");
        }

        let mut best_device = None;
        let mut best_score = 0;

        for device in devices {
            let props = unsafe { instance.get_physical_device_properties(device) };
            let Some(graphics_family) = Self::find_graphics_family(instance, device, present)? else {
                continue;
            };

            let score = device_score(props.device_type);
            if score > best_score {
                best_score = score;
                best_device = Some((device, graphics_family));
            }
        }

        best_device.context("No suitable GPU found")
    }

    /// First queue family with graphics support that can also present, if a
    /// surface was given
    fn find_graphics_family(
        instance: &ash::Instance,
        device: vk::PhysicalDevice,
        present: Option<PresentTarget<'_>>,
    ) -> Result<Option<u32>> {
        let queue_families =
            unsafe { instance.get_physical_device_queue_family_properties(device) };

        for (index, family) in queue_families.iter().enumerate() {
            let index = index as u32;
            if !family.queue_flags.contains(vk::QueueFlags::GRAPHICS) {
                continue;
            }

            let can_present = match present {
                Some((loader, surface)) => unsafe {
                    loader.get_physical_device_surface_support(device, index, surface)
                }
                .context("Failed to query surface support")?,
                None => true,
            };

            if can_present {
                return Ok(Some(index));
            }
        }

        Ok(None)
    }

    fn create_logical_device(
        instance: &ash::Instance,
        physical_device: vk::PhysicalDevice,
        graphics_queue_family: u32,
    ) -> Result<(ash::Device, vk::Queue)> {
        let queue_priorities = [1.0];
        let queue_create_info = vk::DeviceQueueCreateInfo::default()
            .queue_family_index(graphics_queue_family)
            .queue_priorities(&queue_priorities);

        let extensions = [ash::khr::swapchain::NAME.as_ptr()];

        let create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(std::slice::from_ref(&queue_create_info))
            .enabled_extension_names(&extensions);

        let device = unsafe { instance.create_device(physical_device, &create_info, None) }
            .context("Failed to create logical device")?;

        let graphics_queue = unsafe { device.get_device_queue(graphics_queue_family, 0) };

        Ok((device, graphics_queue))
    }

    /// Wait for device to be idle (e.g., before cleanup)
    pub fn wait_idle(&self) -> Result<()> {
        unsafe { self.device.device_wait_idle() }?;
        Ok(())
    }
}

/// Discrete GPUs win over integrated ones, anything else is a last resort
pub fn device_score(device_type: vk::PhysicalDeviceType) -> u32 {
    match device_type {
        vk::PhysicalDeviceType::DISCRETE_GPU => 1000,
        vk::PhysicalDeviceType::INTEGRATED_GPU => 100,
        _ => 1,
    }
}

impl GpuDevice for VulkanDevice {
    fn create_shader_module(&self, code: &[u32]) -> VkResult<vk::ShaderModule> {
        let create_info = vk::ShaderModuleCreateInfo::default().code(code);
        unsafe { self.device.create_shader_module(&create_info, None) }
    }

    fn destroy_shader_module(&self, module: vk::ShaderModule) {
        unsafe { self.device.destroy_shader_module(module, None) }
    }

    fn create_graphics_pipeline(
        &self,
        create_info: &vk::GraphicsPipelineCreateInfo<'_>,
    ) -> VkResult<vk::Pipeline> {
        let pipelines = unsafe {
            self.device.create_graphics_pipelines(
                vk::PipelineCache::null(),
                std::slice::from_ref(create_info),
                None,
            )
        }
        .map_err(|(_, e)| e)?;

        pipelines.into_iter().next().ok_or(vk::Result::ERROR_UNKNOWN)
    }

    fn destroy_pipeline(&self, pipeline: vk::Pipeline) {
        unsafe { self.device.destroy_pipeline(pipeline, None) }
    }
}

impl Drop for VulkanDevice {
    fn drop(&mut self) {
        log::info!("Destroying Vulkan device...");

        let _ = self.wait_idle();

        unsafe {
            self.device.destroy_device(None);
        }
    }
}
