// =============================================================================
// EMBERLIGHT - Vulkan renderer scaffold
// =============================================================================
//
// GPU object lifecycle backbone: instance and device creation, shader module
// and graphics pipeline construction from a declarative configuration, and
// ordered teardown of every handle.
//
// LAYERS:
// ┌─────────────────────────────────────────────────────────────────┐
// │  RenderThread (worker owning the renderer)                      │
// │    └── Renderer                                                 │
// │          ├── DeletionQueue (instance, surface)                  │
// │          ├── VulkanDevice                                       │
// │          └── GraphicsPipeline ← ShaderModule ×2 + PipelineConfig │
// └─────────────────────────────────────────────────────────────────┘
//
// =============================================================================

pub mod backend;
pub mod config;
pub mod deletion_queue;
pub mod diagnostics;
pub mod error;
pub mod render_thread;
pub mod renderer;
pub mod window;

pub use backend::{default_configuration, GraphicsPipeline, PipelineConfig, ShaderModule};
pub use config::Config;
pub use deletion_queue::DeletionQueue;
pub use diagnostics::{ApiVersion, Diagnostics, LogDiagnostics};
pub use error::{PipelineError, PipelineResult};
pub use render_thread::RenderThread;
pub use renderer::Renderer;
