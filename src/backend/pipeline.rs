// Graphics pipeline creation and management
//
// A GraphicsPipeline bundles two shader modules with the fixed-function state
// of a PipelineConfig into one immutable VkPipeline. Construction is atomic:
// either all three handles exist afterwards or none do. Teardown releases the
// pipeline, then the fragment module, then the vertex module.

use ash::vk;
use std::path::Path;
use std::sync::Arc;

use super::gpu::GpuDevice;
use super::pipeline_config::PipelineConfig;
use super::shader::ShaderModule;
use crate::error::{PipelineError, PipelineResult};

/// Entry point used by both shader stages
const SHADER_ENTRY_POINT: &std::ffi::CStr = c"main";

pub struct GraphicsPipeline {
    // Field order is release order: handle (see destroy), fragment, vertex
    handle: vk::Pipeline,
    fragment: ShaderModule,
    vertex: ShaderModule,
    device: Arc<dyn GpuDevice>,
}

impl GraphicsPipeline {
    /// Build a pipeline from two SPIR-V files and a configuration.
    ///
    /// Fails before touching the file system or the device if the config has
    /// no pipeline layout or render pass. Any module created before a later
    /// step fails is destroyed before the error is returned.
    pub fn new(
        device: Arc<dyn GpuDevice>,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
        config: &PipelineConfig,
    ) -> PipelineResult<Self> {
        Self::validate(config)?;

        let vertex_path = vertex_path.as_ref();
        let fragment_path = fragment_path.as_ref();
        log::debug!(
            "Building graphics pipeline ({:?}, {:?})",
            vertex_path,
            fragment_path
        );

        let vertex = ShaderModule::load(device.clone(), vertex_path)?;
        // `vertex` is dropped (and destroyed) if this fails
        let fragment = ShaderModule::load(device.clone(), fragment_path)?;

        // On failure both locals drop in reverse declaration order: fragment, then vertex
        let handle = Self::create_handle(&*device, &vertex, &fragment, config)?;

        log::debug!("Graphics pipeline ready: {:?}", handle);

        Ok(Self {
            handle,
            fragment,
            vertex,
            device,
        })
    }

    fn validate(config: &PipelineConfig) -> PipelineResult<()> {
        if config.pipeline_layout == vk::PipelineLayout::null() {
            return Err(PipelineError::MissingPipelineLayout);
        }
        if config.render_pass == vk::RenderPass::null() {
            return Err(PipelineError::MissingRenderPass);
        }
        Ok(())
    }

    fn create_handle(
        device: &dyn GpuDevice,
        vertex: &ShaderModule,
        fragment: &ShaderModule,
        config: &PipelineConfig,
    ) -> PipelineResult<vk::Pipeline> {
        // Shader stages
        let shader_stages = [
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::VERTEX)
                .module(vertex.handle())
                .name(SHADER_ENTRY_POINT),
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::FRAGMENT)
                .module(fragment.handle())
                .name(SHADER_ENTRY_POINT),
        ];

        // Vertex positions are generated in the shader, so no bindings or attributes yet
        let vertex_input = vk::PipelineVertexInputStateCreateInfo::default();

        let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::default()
            .topology(config.topology)
            .primitive_restart_enable(config.primitive_restart);

        let viewports = [vk::Viewport::from(config.viewport)];
        let scissors = [vk::Rect2D::from(config.scissor)];
        let viewport_state = vk::PipelineViewportStateCreateInfo::default()
            .viewports(&viewports)
            .scissors(&scissors);

        let raster = &config.rasterization;
        let rasterization = vk::PipelineRasterizationStateCreateInfo::default()
            .depth_clamp_enable(raster.depth_clamp)
            .rasterizer_discard_enable(raster.rasterizer_discard)
            .polygon_mode(raster.polygon_mode)
            .line_width(raster.line_width)
            .cull_mode(raster.cull_mode)
            .front_face(raster.front_face)
            .depth_bias_enable(raster.depth_bias.enable)
            .depth_bias_constant_factor(raster.depth_bias.constant_factor)
            .depth_bias_clamp(raster.depth_bias.clamp)
            .depth_bias_slope_factor(raster.depth_bias.slope_factor);

        let ms = &config.multisample;
        let multisample = vk::PipelineMultisampleStateCreateInfo::default()
            .rasterization_samples(ms.samples)
            .sample_shading_enable(ms.sample_shading)
            .min_sample_shading(ms.min_sample_shading)
            .alpha_to_coverage_enable(ms.alpha_to_coverage)
            .alpha_to_one_enable(ms.alpha_to_one);

        let color_blend_attachments = [vk::PipelineColorBlendAttachmentState::from(
            config.color_blend_attachment,
        )];
        let color_blend = vk::PipelineColorBlendStateCreateInfo::default()
            .logic_op_enable(config.color_blend.logic_op_enable)
            .logic_op(config.color_blend.logic_op)
            .attachments(&color_blend_attachments)
            .blend_constants(config.color_blend.blend_constants);

        let ds = &config.depth_stencil;
        let depth_stencil = vk::PipelineDepthStencilStateCreateInfo::default()
            .depth_test_enable(ds.depth_test)
            .depth_write_enable(ds.depth_write)
            .depth_compare_op(ds.compare_op)
            .depth_bounds_test_enable(ds.depth_bounds_test)
            .min_depth_bounds(ds.min_depth_bounds)
            .max_depth_bounds(ds.max_depth_bounds)
            .stencil_test_enable(ds.stencil_test)
            .front(ds.front.into())
            .back(ds.back.into());

        // No pipeline derivation
        let pipeline_info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&shader_stages)
            .vertex_input_state(&vertex_input)
            .input_assembly_state(&input_assembly)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization)
            .multisample_state(&multisample)
            .color_blend_state(&color_blend)
            .depth_stencil_state(&depth_stencil)
            .layout(config.pipeline_layout)
            .render_pass(config.render_pass)
            .subpass(config.subpass)
            .base_pipeline_handle(vk::Pipeline::null())
            .base_pipeline_index(-1);

        device.create_graphics_pipeline(&pipeline_info).map_err(|e| {
            log::error!("Graphics pipeline creation failed: {:?}", e);
            PipelineError::PipelineCreation(e)
        })
    }

    pub fn handle(&self) -> vk::Pipeline {
        self.handle
    }

    pub fn vertex_module(&self) -> vk::ShaderModule {
        self.vertex.handle()
    }

    pub fn fragment_module(&self) -> vk::ShaderModule {
        self.fragment.handle()
    }

    pub fn is_destroyed(&self) -> bool {
        self.handle == vk::Pipeline::null()
    }

    /// Release the pipeline, then the fragment module, then the vertex module.
    ///
    /// Idempotent: handles already released are skipped, so a later call or
    /// the final drop never releases anything twice.
    pub fn destroy(&mut self) {
        let handle = std::mem::replace(&mut self.handle, vk::Pipeline::null());
        if handle != vk::Pipeline::null() {
            log::debug!("Destroying graphics pipeline {:?}", handle);
            self.device.destroy_pipeline(handle);
        }
        self.fragment.release();
        self.vertex.release();
    }
}

impl Drop for GraphicsPipeline {
    fn drop(&mut self) {
        self.destroy();
    }
}
