// Renderer - owns every GPU object of the scaffold
//
// Creation order: entry, instance, surface, device, render pass, layout,
// pipeline. Field order below is the teardown order (Rust drops fields top to
// bottom), which is the reverse of creation. The instance and surface live in
// the deletion queue, so they go after the device.

use anyhow::{Context, Result};
use ash::vk;
use std::sync::Arc;

use crate::backend::instance::create_instance;
use crate::backend::render_pass::{PipelineLayout, RenderPass};
use crate::backend::{GraphicsPipeline, VulkanDevice};
use crate::config::Config;
use crate::deletion_queue::DeletionQueue;
use crate::diagnostics::Diagnostics;
use crate::window::{SurfaceGuard, SurfaceProvider};

/// Until a swapchain picks one, the render pass targets the common sRGB format
const COLOR_FORMAT: vk::Format = vk::Format::B8G8R8A8_SRGB;
const DEPTH_FORMAT: vk::Format = vk::Format::D32_SFLOAT;

pub struct Renderer {
    pipeline: GraphicsPipeline,
    // Borrowed by the pipeline, so released after it
    _layout: PipelineLayout,
    _render_pass: RenderPass,
    device: Arc<VulkanDevice>,
    // Instance and surface guards, released after the device
    _deletion_queue: DeletionQueue,
    // Keeps the Vulkan library loaded until everything above is gone
    _entry: ash::Entry,
}

impl Renderer {
    pub fn new<W>(window: &W, config: &Config, diagnostics: Arc<dyn Diagnostics>) -> Result<Self>
    where
        W: SurfaceProvider + ?Sized,
    {
        log::info!("Initializing Vulkan...");

        let entry = unsafe { ash::Entry::load() }
            .context("Failed to load Vulkan library. Is Vulkan installed?")?;
        let mut deletion_queue = DeletionQueue::new();

        let extensions = window.required_extensions()?;
        let instance = create_instance(
            &entry,
            &config.window.title,
            &extensions,
            &diagnostics,
            &mut deletion_queue,
        )
        .context("Vulkan instance creation failed")?;

        let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);
        let surface = window.create_surface(&entry, &instance)?;
        deletion_queue.push(SurfaceGuard::new(surface_loader.clone(), surface, diagnostics.clone()));

        let device = VulkanDevice::new(&instance, Some((&surface_loader, surface)))?;

        let render_pass = RenderPass::new(device.clone(), COLOR_FORMAT, DEPTH_FORMAT)?;
        let layout = PipelineLayout::empty(device.clone())?;

        let pipeline_config = config
            .pipeline_configuration()
            .with_targets(layout.handle(), render_pass.handle(), 0);

        let pipeline = GraphicsPipeline::new(
            device.clone(),
            &config.shaders.vertex,
            &config.shaders.fragment,
            &pipeline_config,
        )
        .context("Failed to build graphics pipeline")?;

        log::info!("Vulkan initialized successfully!");

        Ok(Self {
            pipeline,
            _layout: layout,
            _render_pass: render_pass,
            device,
            _deletion_queue: deletion_queue,
            _entry: entry,
        })
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        log::info!("Cleaning up Vulkan resources...");

        // Nothing may be destroyed while the GPU still uses it
        if let Err(e) = self.device.wait_idle() {
            log::error!("wait_idle failed during teardown: {:?}", e);
        }

        self.pipeline.destroy();
        // Remaining fields drop in declaration order after this
    }
}
