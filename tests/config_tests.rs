//! Tests for config.toml parsing and pipeline overrides

use ash::vk;
use emberlight::config::{parse_cull_mode, parse_topology};
use emberlight::{default_configuration, Config};
use std::path::Path;

#[test]
fn test_empty_file_gives_defaults() {
    let config = Config::parse("").unwrap();

    assert_eq!(config, Config::default());
    assert_eq!(config.window.width, 800);
    assert_eq!(config.window.height, 600);
    assert_eq!(config.pipeline_configuration(), default_configuration(800, 600));
}

#[test]
fn test_partial_sections_keep_other_defaults() {
    let config = Config::parse(
        r#"
        [window]
        width = 1280

        [shaders]
        vertex = "custom.vert.spv"
        "#,
    )
    .unwrap();

    assert_eq!(config.window.width, 1280);
    assert_eq!(config.window.height, 600);
    assert_eq!(config.shaders.vertex, Path::new("custom.vert.spv"));
    assert_eq!(config.shaders.fragment, Path::new("shaders/simple_shader.frag.spv"));
}

#[test]
fn test_pipeline_overrides_apply() {
    let config = Config::parse(
        r#"
        [window]
        width = 640
        height = 480

        [pipeline]
        topology = "LINE_LIST"
        polygon_mode = "line"
        cull_mode = "back"
        front_face = "counter_clockwise"
        depth_test = false
        line_width = 2.0
        "#,
    )
    .unwrap();

    let pipeline = config.pipeline_configuration();

    assert_eq!(pipeline.viewport.width, 640.0);
    assert_eq!(pipeline.topology, vk::PrimitiveTopology::LINE_LIST);
    assert_eq!(pipeline.rasterization.polygon_mode, vk::PolygonMode::LINE);
    assert_eq!(pipeline.rasterization.cull_mode, vk::CullModeFlags::BACK);
    assert_eq!(pipeline.rasterization.front_face, vk::FrontFace::COUNTER_CLOCKWISE);
    assert_eq!(pipeline.rasterization.line_width, 2.0);
    assert!(!pipeline.depth_stencil.depth_test);
    assert!(!pipeline.depth_stencil.depth_write);
}

#[test]
fn test_unknown_names_keep_defaults() {
    let config = Config::parse(
        r#"
        [pipeline]
        topology = "hexagon_soup"
        cull_mode = "sideways"
        "#,
    )
    .unwrap();

    let pipeline = config.pipeline_configuration();

    assert_eq!(pipeline.topology, vk::PrimitiveTopology::TRIANGLE_LIST);
    assert_eq!(pipeline.rasterization.cull_mode, vk::CullModeFlags::NONE);
}

#[test]
fn test_invalid_toml_is_an_error() {
    assert!(Config::parse("[window\nwidth = ").is_err());
    assert!(Config::parse("[window]\nwidth = \"wide\"").is_err());
}

#[test]
fn test_missing_file_gives_defaults() {
    let config = Config::load_from_path("definitely/not/here/config.toml").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_log_level() {
    let mut config = Config::default();
    assert_eq!(config.log_level(), log::LevelFilter::Info);

    config.debug.log_level = "debug".to_string();
    assert_eq!(config.log_level(), log::LevelFilter::Debug);

    config.debug.log_level = "chatty".to_string();
    assert_eq!(config.log_level(), log::LevelFilter::Info);
}

#[test]
fn test_name_parsers() {
    assert_eq!(parse_topology("point_list"), Some(vk::PrimitiveTopology::POINT_LIST));
    assert_eq!(parse_topology("Triangle_Strip"), Some(vk::PrimitiveTopology::TRIANGLE_STRIP));
    assert_eq!(parse_topology(""), None);
    assert_eq!(parse_cull_mode("front_and_back"), Some(vk::CullModeFlags::FRONT_AND_BACK));
    assert_eq!(parse_cull_mode("left"), None);
}

#[test]
fn test_shipped_config_parses() {
    let content = std::fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml")).unwrap();
    let config = Config::parse(&content).unwrap();

    assert_eq!(config.pipeline_configuration(), default_configuration(800, 600));
}
