// =============================================================================
// CONFIGURATION - Load settings from config.toml
// =============================================================================
//
// Provides sensible defaults if the config file is missing or has errors.
// Pipeline overrides are applied on top of default_configuration().

use anyhow::{Context, Result};
use ash::vk;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::backend::pipeline_config::{default_configuration, PipelineConfig};

/// Root configuration structure
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub shaders: ShaderConfig,
    pub pipeline: PipelineOverrides,
    pub debug: DebugConfig,
}

/// Window settings
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Emberlight".to_string(),
            width: 800,
            height: 600,
        }
    }
}

/// Compiled SPIR-V inputs
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ShaderConfig {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            vertex: PathBuf::from("shaders/simple_shader.vert.spv"),
            fragment: PathBuf::from("shaders/simple_shader.frag.spv"),
        }
    }
}

/// Fixed-function overrides, by name
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PipelineOverrides {
    pub topology: String,
    pub polygon_mode: String,
    pub cull_mode: String,
    pub front_face: String,
    pub depth_test: bool,
    pub line_width: f32,
}

impl Default for PipelineOverrides {
    fn default() -> Self {
        Self {
            topology: "triangle_list".to_string(),
            polygon_mode: "fill".to_string(),
            cull_mode: "none".to_string(),
            front_face: "clockwise".to_string(),
            depth_test: true,
            line_width: 1.0,
        }
    }
}

/// Debug settings
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from config.toml, falling back to defaults
    pub fn load() -> Self {
        Self::load_from_path("config.toml").unwrap_or_else(|e| {
            log::warn!("Failed to load config.toml: {:#}. Using defaults.", e);
            Config::default()
        })
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        log::info!("Loaded configuration from {:?}", path);
        log::debug!("Config: {:?}", config);

        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Baseline pipeline state for the configured window with overrides applied.
    ///
    /// Unknown names log a warning and keep the baseline value.
    pub fn pipeline_configuration(&self) -> PipelineConfig {
        let mut config = default_configuration(self.window.width, self.window.height);
        let overrides = &self.pipeline;

        config.topology = parse_or_default("topology", &overrides.topology, parse_topology, config.topology);
        config.rasterization.polygon_mode = parse_or_default(
            "polygon_mode",
            &overrides.polygon_mode,
            parse_polygon_mode,
            config.rasterization.polygon_mode,
        );
        config.rasterization.cull_mode = parse_or_default(
            "cull_mode",
            &overrides.cull_mode,
            parse_cull_mode,
            config.rasterization.cull_mode,
        );
        config.rasterization.front_face = parse_or_default(
            "front_face",
            &overrides.front_face,
            parse_front_face,
            config.rasterization.front_face,
        );
        config.rasterization.line_width = overrides.line_width;
        config.depth_stencil.depth_test = overrides.depth_test;
        config.depth_stencil.depth_write = overrides.depth_test;

        config
    }

    pub fn log_level(&self) -> log::LevelFilter {
        self.debug.log_level.parse().unwrap_or_else(|_| {
            log::warn!("Unknown log level '{}', defaulting to info", self.debug.log_level);
            log::LevelFilter::Info
        })
    }
}

fn parse_or_default<T: Copy>(key: &str, value: &str, parse: fn(&str) -> Option<T>, default: T) -> T {
    parse(value).unwrap_or_else(|| {
        log::warn!("Unknown {} '{}', keeping default", key, value);
        default
    })
}

pub fn parse_topology(name: &str) -> Option<vk::PrimitiveTopology> {
    match name.to_lowercase().as_str() {
        "point_list" => Some(vk::PrimitiveTopology::POINT_LIST),
        "line_list" => Some(vk::PrimitiveTopology::LINE_LIST),
        "line_strip" => Some(vk::PrimitiveTopology::LINE_STRIP),
        "triangle_list" => Some(vk::PrimitiveTopology::TRIANGLE_LIST),
        "triangle_strip" => Some(vk::PrimitiveTopology::TRIANGLE_STRIP),
        "triangle_fan" => Some(vk::PrimitiveTopology::TRIANGLE_FAN),
        _ => None,
    }
}

pub fn parse_polygon_mode(name: &str) -> Option<vk::PolygonMode> {
    match name.to_lowercase().as_str() {
        "fill" => Some(vk::PolygonMode::FILL),
        "line" => Some(vk::PolygonMode::LINE),
        "point" => Some(vk::PolygonMode::POINT),
        _ => None,
    }
}

pub fn parse_cull_mode(name: &str) -> Option<vk::CullModeFlags> {
    match name.to_lowercase().as_str() {
        "none" => Some(vk::CullModeFlags::NONE),
        "front" => Some(vk::CullModeFlags::FRONT),
        "back" => Some(vk::CullModeFlags::BACK),
        "front_and_back" => Some(vk::CullModeFlags::FRONT_AND_BACK),
        _ => None,
    }
}

pub fn parse_front_face(name: &str) -> Option<vk::FrontFace> {
    match name.to_lowercase().as_str() {
        "clockwise" => Some(vk::FrontFace::CLOCKWISE),
        "counter_clockwise" => Some(vk::FrontFace::COUNTER_CLOCKWISE),
        _ => None,
    }
}
