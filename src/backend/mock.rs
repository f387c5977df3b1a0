// Mock loader and GPU device for unit tests (no GPU required)
//
// Hands out fake handles, tracks which ones are alive, and records the order
// in which they are destroyed.

use ash::prelude::VkResult;
use ash::vk::{self, Handle};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::ffi::CStr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::gpu::{GpuDevice, InstanceLoader};

/// Smallest byte stream `read_spv` accepts: a little-endian SPIR-V header
pub const SPIRV_HEADER: [u8; 20] = [
    0x03, 0x02, 0x23, 0x07, // Magic number
    0x00, 0x00, 0x01, 0x00, // Version 1.0
    0x00, 0x00, 0x00, 0x00, // Generator
    0x01, 0x00, 0x00, 0x00, // Bound
    0x00, 0x00, 0x00, 0x00, // Schema
];

/// Write `bytes` to a unique file under the temp dir
pub fn shader_file(name: &str, bytes: &[u8]) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let id = COUNTER.fetch_add(1, Ordering::Relaxed);
    let path = std::env::temp_dir().join(format!(
        "emberlight-{}-{}-{}.spv",
        name,
        std::process::id(),
        id
    ));
    std::fs::write(&path, bytes).expect("write temp shader");
    path
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Released {
    ShaderModule(vk::ShaderModule),
    Pipeline(vk::Pipeline),
}

/// What the device saw in the last pipeline creation call
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSnapshot {
    pub stages: Vec<(vk::ShaderStageFlags, vk::ShaderModule, String)>,
    pub vertex_bindings: u32,
    pub vertex_attributes: u32,
    pub topology: vk::PrimitiveTopology,
    pub viewport_extent: (f32, f32),
    pub cull_mode: vk::CullModeFlags,
    pub blend_attachments: u32,
    pub depth_compare_op: vk::CompareOp,
    pub layout: vk::PipelineLayout,
    pub render_pass: vk::RenderPass,
    pub subpass: u32,
    pub base_pipeline_handle: vk::Pipeline,
    pub base_pipeline_index: i32,
}

#[derive(Default)]
pub struct MockDevice {
    next_handle: AtomicUsize,
    live: Mutex<HashSet<u64>>,
    destroyed: Mutex<Vec<Released>>,
    shader_module_calls: AtomicUsize,
    pipeline_calls: AtomicUsize,
    last_shader_words: AtomicUsize,
    shader_module_budget: Mutex<Option<usize>>,
    reject_pipeline: Mutex<bool>,
    last_pipeline: Mutex<Option<PipelineSnapshot>>,
}

impl MockDevice {
    /// Accept `count` more shader modules, then reject every following one
    pub fn reject_shader_module_after(&self, count: usize) {
        *self.shader_module_budget.lock() = Some(count);
    }

    pub fn reject_pipeline(&self) {
        *self.reject_pipeline.lock() = true;
    }

    pub fn live_handles(&self) -> usize {
        self.live.lock().len()
    }

    pub fn is_live(&self, raw: u64) -> bool {
        self.live.lock().contains(&raw)
    }

    pub fn shader_module_calls(&self) -> usize {
        self.shader_module_calls.load(Ordering::SeqCst)
    }

    pub fn pipeline_calls(&self) -> usize {
        self.pipeline_calls.load(Ordering::SeqCst)
    }

    pub fn last_shader_word_count(&self) -> usize {
        self.last_shader_words.load(Ordering::SeqCst)
    }

    pub fn destroyed(&self) -> Vec<Released> {
        self.destroyed.lock().clone()
    }

    pub fn last_pipeline(&self) -> Option<PipelineSnapshot> {
        self.last_pipeline.lock().clone()
    }

    fn allocate(&self) -> u64 {
        // Raw value 0 is the null handle
        let raw = self.next_handle.fetch_add(1, Ordering::SeqCst) as u64 + 1;
        self.live.lock().insert(raw);
        raw
    }

    fn free(&self, raw: u64, released: Released) {
        assert!(self.live.lock().remove(&raw), "handle {raw:#x} released twice or never created");
        self.destroyed.lock().push(released);
    }
}

impl GpuDevice for MockDevice {
    fn create_shader_module(&self, code: &[u32]) -> VkResult<vk::ShaderModule> {
        self.shader_module_calls.fetch_add(1, Ordering::SeqCst);
        self.last_shader_words.store(code.len(), Ordering::SeqCst);

        let mut budget = self.shader_module_budget.lock();
        if let Some(remaining) = budget.as_mut() {
            if *remaining == 0 {
                return Err(vk::Result::ERROR_INVALID_SHADER_NV);
            }
            *remaining -= 1;
        }

        Ok(vk::ShaderModule::from_raw(self.allocate()))
    }

    fn destroy_shader_module(&self, module: vk::ShaderModule) {
        self.free(module.as_raw(), Released::ShaderModule(module));
    }

    fn create_graphics_pipeline(
        &self,
        create_info: &vk::GraphicsPipelineCreateInfo<'_>,
    ) -> VkResult<vk::Pipeline> {
        self.pipeline_calls.fetch_add(1, Ordering::SeqCst);

        // SAFETY: every pointer in the create info outlives this call
        let snapshot = unsafe {
            let stages = std::slice::from_raw_parts(create_info.p_stages, create_info.stage_count as usize)
                .iter()
                .map(|stage| {
                    let name = CStr::from_ptr(stage.p_name).to_string_lossy().into_owned();
                    (stage.stage, stage.module, name)
                })
                .collect();
            let vertex_input = &*create_info.p_vertex_input_state;
            let input_assembly = &*create_info.p_input_assembly_state;
            let viewport_state = &*create_info.p_viewport_state;
            let viewport = &*viewport_state.p_viewports;
            let rasterization = &*create_info.p_rasterization_state;
            let color_blend = &*create_info.p_color_blend_state;
            let depth_stencil = &*create_info.p_depth_stencil_state;

            PipelineSnapshot {
                stages,
                vertex_bindings: vertex_input.vertex_binding_description_count,
                vertex_attributes: vertex_input.vertex_attribute_description_count,
                topology: input_assembly.topology,
                viewport_extent: (viewport.width, viewport.height),
                cull_mode: rasterization.cull_mode,
                blend_attachments: color_blend.attachment_count,
                depth_compare_op: depth_stencil.depth_compare_op,
                layout: create_info.layout,
                render_pass: create_info.render_pass,
                subpass: create_info.subpass,
                base_pipeline_handle: create_info.base_pipeline_handle,
                base_pipeline_index: create_info.base_pipeline_index,
            }
        };
        *self.last_pipeline.lock() = Some(snapshot);

        if *self.reject_pipeline.lock() {
            return Err(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY);
        }

        Ok(vk::Pipeline::from_raw(self.allocate()))
    }

    fn destroy_pipeline(&self, pipeline: vk::Pipeline) {
        self.free(pipeline.as_raw(), Released::Pipeline(pipeline));
    }
}

/// What the loader saw in the last instance creation call
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceRequest {
    pub application_name: String,
    pub application_version: u32,
    pub engine_name: String,
    pub engine_version: u32,
    pub api_version: u32,
    pub layer_count: u32,
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MockInstance {
    pub raw: u64,
    destroyed: Arc<Mutex<Vec<u64>>>,
}

pub struct MockLoader {
    version: Option<u32>,
    reject_creation: Mutex<bool>,
    create_calls: AtomicUsize,
    last_request: Mutex<Option<InstanceRequest>>,
    destroyed: Arc<Mutex<Vec<u64>>>,
}

impl MockLoader {
    pub fn new(version: Option<u32>) -> Self {
        Self {
            version,
            reject_creation: Mutex::new(false),
            create_calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
            destroyed: Arc::default(),
        }
    }

    pub fn reject_creation(&self) {
        *self.reject_creation.lock() = true;
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<InstanceRequest> {
        self.last_request.lock().clone()
    }

    pub fn destroyed(&self) -> Vec<u64> {
        self.destroyed.lock().clone()
    }
}

impl InstanceLoader for MockLoader {
    type Instance = MockInstance;

    fn instance_version(&self) -> VkResult<Option<u32>> {
        Ok(self.version)
    }

    fn create_instance(&self, create_info: &vk::InstanceCreateInfo<'_>) -> VkResult<MockInstance> {
        let calls = self.create_calls.fetch_add(1, Ordering::SeqCst);

        // SAFETY: every pointer in the create info outlives this call
        let request = unsafe {
            let app = &*create_info.p_application_info;
            let extensions = std::slice::from_raw_parts(
                create_info.pp_enabled_extension_names,
                create_info.enabled_extension_count as usize,
            )
            .iter()
            .map(|&name| CStr::from_ptr(name).to_string_lossy().into_owned())
            .collect();

            InstanceRequest {
                application_name: CStr::from_ptr(app.p_application_name).to_string_lossy().into_owned(),
                application_version: app.application_version,
                engine_name: CStr::from_ptr(app.p_engine_name).to_string_lossy().into_owned(),
                engine_version: app.engine_version,
                api_version: app.api_version,
                layer_count: create_info.enabled_layer_count,
                extensions,
            }
        };
        *self.last_request.lock() = Some(request);

        if *self.reject_creation.lock() {
            return Err(vk::Result::ERROR_INCOMPATIBLE_DRIVER);
        }

        Ok(MockInstance {
            raw: calls as u64 + 1,
            destroyed: self.destroyed.clone(),
        })
    }

    fn destroy_instance(instance: &MockInstance) {
        instance.destroyed.lock().push(instance.raw);
    }
}
