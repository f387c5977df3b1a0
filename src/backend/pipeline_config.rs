// Fixed-function state for a graphics pipeline
//
// PipelineConfig is plain data: no owned handles and no internal pointers,
// so copies never alias. The Vulkan create-info structs are assembled from it
// at build time (see pipeline.rs).

use ash::vk;

/// Viewport in pixels. Origin is the top-left corner; the full normalized
/// device range always maps onto this rectangle, whatever its aspect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl From<Viewport> for vk::Viewport {
    fn from(v: Viewport) -> Self {
        vk::Viewport {
            x: v.x,
            y: v.y,
            width: v.width,
            height: v.height,
            min_depth: v.min_depth,
            max_depth: v.max_depth,
        }
    }
}

/// Scissor rectangle; fragments outside it are discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scissor {
    pub offset: [i32; 2],
    pub extent: [u32; 2],
}

impl From<Scissor> for vk::Rect2D {
    fn from(s: Scissor) -> Self {
        vk::Rect2D {
            offset: vk::Offset2D { x: s.offset[0], y: s.offset[1] },
            extent: vk::Extent2D { width: s.extent[0], height: s.extent[1] },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthBias {
    pub enable: bool,
    pub constant_factor: f32,
    pub clamp: f32,
    pub slope_factor: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterizationState {
    /// Clamp fragment depth into [0, 1] instead of clipping
    pub depth_clamp: bool,
    /// Drop all primitives before rasterization
    pub rasterizer_discard: bool,
    pub polygon_mode: vk::PolygonMode,
    pub line_width: f32,
    pub cull_mode: vk::CullModeFlags,
    pub front_face: vk::FrontFace,
    pub depth_bias: DepthBias,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultisampleState {
    pub samples: vk::SampleCountFlags,
    pub sample_shading: bool,
    pub min_sample_shading: f32,
    pub alpha_to_coverage: bool,
    pub alpha_to_one: bool,
}

/// Blending for the single colour attachment.
///
/// rgb = (src_color * new.rgb) <color_op> (dst_color * old.rgb)
/// a   = (src_alpha * new.a)   <alpha_op> (dst_alpha * old.a)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorBlendAttachment {
    pub write_mask: vk::ColorComponentFlags,
    pub blend_enable: bool,
    pub src_color: vk::BlendFactor,
    pub dst_color: vk::BlendFactor,
    pub color_op: vk::BlendOp,
    pub src_alpha: vk::BlendFactor,
    pub dst_alpha: vk::BlendFactor,
    pub alpha_op: vk::BlendOp,
}

impl From<ColorBlendAttachment> for vk::PipelineColorBlendAttachmentState {
    fn from(a: ColorBlendAttachment) -> Self {
        vk::PipelineColorBlendAttachmentState {
            blend_enable: a.blend_enable.into(),
            src_color_blend_factor: a.src_color,
            dst_color_blend_factor: a.dst_color,
            color_blend_op: a.color_op,
            src_alpha_blend_factor: a.src_alpha,
            dst_alpha_blend_factor: a.dst_alpha,
            alpha_blend_op: a.alpha_op,
            color_write_mask: a.write_mask,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorBlendState {
    pub logic_op_enable: bool,
    pub logic_op: vk::LogicOp,
    pub blend_constants: [f32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilFace {
    pub fail_op: vk::StencilOp,
    pub pass_op: vk::StencilOp,
    pub depth_fail_op: vk::StencilOp,
    pub compare_op: vk::CompareOp,
    pub compare_mask: u32,
    pub write_mask: u32,
    pub reference: u32,
}

impl Default for StencilFace {
    fn default() -> Self {
        Self {
            fail_op: vk::StencilOp::KEEP,
            pass_op: vk::StencilOp::KEEP,
            depth_fail_op: vk::StencilOp::KEEP,
            compare_op: vk::CompareOp::NEVER,
            compare_mask: 0,
            write_mask: 0,
            reference: 0,
        }
    }
}

impl From<StencilFace> for vk::StencilOpState {
    fn from(s: StencilFace) -> Self {
        vk::StencilOpState {
            fail_op: s.fail_op,
            pass_op: s.pass_op,
            depth_fail_op: s.depth_fail_op,
            compare_op: s.compare_op,
            compare_mask: s.compare_mask,
            write_mask: s.write_mask,
            reference: s.reference,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthStencilState {
    pub depth_test: bool,
    pub depth_write: bool,
    pub compare_op: vk::CompareOp,
    pub depth_bounds_test: bool,
    pub min_depth_bounds: f32,
    pub max_depth_bounds: f32,
    pub stencil_test: bool,
    pub front: StencilFace,
    pub back: StencilFace,
}

/// Everything a graphics pipeline needs besides its shaders
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    pub topology: vk::PrimitiveTopology,
    pub primitive_restart: bool,
    pub viewport: Viewport,
    pub scissor: Scissor,
    pub rasterization: RasterizationState,
    pub multisample: MultisampleState,
    pub color_blend_attachment: ColorBlendAttachment,
    pub color_blend: ColorBlendState,
    pub depth_stencil: DepthStencilState,

    // Borrowed from the swapchain / render pass owner. Must be non-null
    // before a pipeline is built.
    pub pipeline_layout: vk::PipelineLayout,
    pub render_pass: vk::RenderPass,
    pub subpass: u32,
}

impl PipelineConfig {
    pub fn with_targets(
        mut self,
        pipeline_layout: vk::PipelineLayout,
        render_pass: vk::RenderPass,
        subpass: u32,
    ) -> Self {
        self.pipeline_layout = pipeline_layout;
        self.render_pass = render_pass;
        self.subpass = subpass;
        self
    }
}

/// Opinionated baseline for a `width` x `height` target.
///
/// Pure: allocates nothing on the GPU and touches no global state.
pub fn default_configuration(width: u32, height: u32) -> PipelineConfig {
    PipelineConfig {
        topology: vk::PrimitiveTopology::TRIANGLE_LIST,
        primitive_restart: false,
        viewport: Viewport {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        },
        // Same rectangle as the viewport: no clipping
        scissor: Scissor {
            offset: [0, 0],
            extent: [width, height],
        },
        rasterization: RasterizationState {
            depth_clamp: false,
            rasterizer_discard: false,
            polygon_mode: vk::PolygonMode::FILL,
            line_width: 1.0,
            cull_mode: vk::CullModeFlags::NONE,
            front_face: vk::FrontFace::CLOCKWISE,
            depth_bias: DepthBias {
                enable: false,
                constant_factor: 0.0,
                clamp: 0.0,
                slope_factor: 0.0,
            },
        },
        multisample: MultisampleState {
            samples: vk::SampleCountFlags::TYPE_1,
            sample_shading: false,
            min_sample_shading: 1.0,
            alpha_to_coverage: false,
            alpha_to_one: false,
        },
        color_blend_attachment: ColorBlendAttachment {
            write_mask: vk::ColorComponentFlags::RGBA,
            blend_enable: false,
            src_color: vk::BlendFactor::ONE,
            dst_color: vk::BlendFactor::ZERO,
            color_op: vk::BlendOp::ADD,
            src_alpha: vk::BlendFactor::ONE,
            dst_alpha: vk::BlendFactor::ZERO,
            alpha_op: vk::BlendOp::ADD,
        },
        color_blend: ColorBlendState {
            logic_op_enable: false,
            logic_op: vk::LogicOp::COPY,
            blend_constants: [0.0; 4],
        },
        depth_stencil: DepthStencilState {
            depth_test: true,
            depth_write: true,
            compare_op: vk::CompareOp::LESS,
            depth_bounds_test: false,
            min_depth_bounds: 0.0,
            max_depth_bounds: 1.0,
            stencil_test: false,
            front: StencilFace::default(),
            back: StencilFace::default(),
        },
        pipeline_layout: vk::PipelineLayout::null(),
        render_pass: vk::RenderPass::null(),
        subpass: 0,
    }
}
