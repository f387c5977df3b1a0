// Errors raised while building shader modules and graphics pipelines
//
// Every variant is fatal for the operation that produced it. Nothing in the
// backend retries: shader binaries are build artifacts and GPU object
// creation failures are not transient.

use ash::vk;
use std::path::PathBuf;
use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The configuration carries a null pipeline layout
    #[error("Cannot create graphics pipeline: no pipeline layout provided in config")]
    MissingPipelineLayout,

    /// The configuration carries a null render pass
    #[error("Cannot create graphics pipeline: no render pass provided in config")]
    MissingRenderPass,

    #[error("Shader code is empty")]
    EmptyShaderCode,

    /// SPIR-V is a stream of 4-byte words
    #[error("Shader code size {len} is not a multiple of 4 bytes")]
    MisalignedShaderCode { len: usize },

    #[error("Failed to read shader file {path:?}")]
    ShaderIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create shader module: {0}")]
    ShaderModuleCreation(#[source] vk::Result),

    #[error("Failed to create graphics pipeline: {0}")]
    PipelineCreation(#[source] vk::Result),
}
