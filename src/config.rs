use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::sdk::{
    BodyFormat, BodyTrackingModel, BodyTrackingParameters, BodyTrackingRuntimeParameters,
    CommunicationParameters, CoordinateSystem, DepthMode, InitParameters,
    PositionalTrackingParameters, Resolution, Unit, LOCAL_NETWORK_BROADCAST,
};

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub positional_tracking: PositionalTrackingConfig,
    #[serde(default)]
    pub body_tracking: BodyTrackingConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub publishing: PublishingConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct CameraConfig {
    /// Overridden by a resolution name on the command line.
    #[serde(default)]
    pub resolution: Resolution,
    #[serde(default)]
    pub depth_mode: DepthMode,
    #[serde(default)]
    pub coordinate_system: CoordinateSystem,
    #[serde(default)]
    pub coordinate_units: Unit,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PositionalTrackingConfig {
    #[serde(default)]
    pub set_as_static: bool,
    #[serde(default)]
    pub set_floor_as_origin: bool,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct BodyTrackingConfig {
    #[serde(default)]
    pub enable_tracking: bool,
    #[serde(default)]
    pub enable_body_fitting: bool,
    #[serde(default)]
    pub body_format: BodyFormat,
    /// Unset picks the model for the current platform.
    #[serde(default)]
    pub detection_model: Option<BodyTrackingModel>,
    #[serde(default)]
    pub allow_reduced_precision_inference: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RuntimeConfig {
    #[serde(default = "default_confidence_threshold")]
    pub detection_confidence_threshold: f32,
    #[serde(default = "default_skeleton_smoothing")]
    pub skeleton_smoothing: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PublishingConfig {
    #[serde(default = "default_publishing_port")]
    pub port: u16,
    #[serde(default = "default_destination")]
    pub destination: String,
}

/// Settings of the simulated camera backend.
#[derive(Debug, Deserialize, Clone)]
pub struct SimulationConfig {
    /// Live input fails to open when false.
    #[serde(default = "default_device_available")]
    pub device_available: bool,
    /// Frame rate the grab loop is paced to. 0 disables pacing.
    #[serde(default = "default_fps")]
    pub fps: f32,
    /// Length of a simulated SVO recording in frames.
    #[serde(default = "default_svo_frames")]
    pub svo_frames: u64,
    #[serde(default = "default_body_count")]
    pub body_count: usize,
    /// Grab reports the camera as unplugged after this many frames.
    #[serde(default)]
    pub disconnect_after: Option<u64>,
}

fn default_confidence_threshold() -> f32 { 40.0 }
fn default_skeleton_smoothing() -> f32 { 0.7 }
fn default_publishing_port() -> u16 { 3000 }
fn default_destination() -> String { LOCAL_NETWORK_BROADCAST.to_string() }
fn default_device_available() -> bool { true }
fn default_fps() -> f32 { 30.0 }
fn default_svo_frames() -> u64 { 600 }
fn default_body_count() -> usize { 2 }

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            detection_confidence_threshold: default_confidence_threshold(),
            skeleton_smoothing: default_skeleton_smoothing(),
        }
    }
}

impl Default for PublishingConfig {
    fn default() -> Self {
        Self {
            port: default_publishing_port(),
            destination: default_destination(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            device_available: default_device_available(),
            fps: default_fps(),
            svo_frames: default_svo_frames(),
            body_count: default_body_count(),
            disconnect_after: None,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Missing file means defaults; a file that fails to parse is reported
    /// and defaults are used as well.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                log::info!("loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("failed to load {}: {e:#}, using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn init_parameters(&self) -> InitParameters {
        InitParameters {
            camera_resolution: self.camera.resolution,
            depth_mode: self.camera.depth_mode,
            coordinate_system: self.camera.coordinate_system,
            coordinate_units: self.camera.coordinate_units,
            ..Default::default()
        }
    }

    pub fn positional_tracking_parameters(&self) -> PositionalTrackingParameters {
        PositionalTrackingParameters {
            set_as_static: self.positional_tracking.set_as_static,
            set_floor_as_origin: self.positional_tracking.set_floor_as_origin,
        }
    }

    pub fn body_tracking_parameters(&self) -> BodyTrackingParameters {
        let bt = &self.body_tracking;
        BodyTrackingParameters {
            enable_tracking: bt.enable_tracking,
            enable_body_fitting: bt.enable_body_fitting,
            body_format: bt.body_format,
            detection_model: bt.detection_model.unwrap_or_else(BodyTrackingModel::platform_default),
            allow_reduced_precision_inference: bt.allow_reduced_precision_inference,
        }
    }

    pub fn runtime_parameters(&self) -> BodyTrackingRuntimeParameters {
        BodyTrackingRuntimeParameters {
            detection_confidence_threshold: self.runtime.detection_confidence_threshold,
            skeleton_smoothing: self.runtime.skeleton_smoothing,
        }
    }

    pub fn communication_parameters(&self) -> CommunicationParameters {
        CommunicationParameters::for_local_network(self.publishing.port)
            .with_ip_address(self.publishing.destination.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.camera.resolution, Resolution::Auto);
        assert_eq!(config.camera.depth_mode, DepthMode::Neural);
        assert_eq!(config.camera.coordinate_system, CoordinateSystem::RightHandedYUp);
        assert_eq!(config.body_tracking.body_format, BodyFormat::Body38);
        assert!(!config.body_tracking.enable_tracking);
        assert!(!config.body_tracking.enable_body_fitting);
        assert_eq!(config.runtime.detection_confidence_threshold, 40.0);
        assert_eq!(config.runtime.skeleton_smoothing, 0.7);
        assert_eq!(config.publishing.port, 3000);
        assert_eq!(config.simulation.svo_frames, 600);
    }

    #[test]
    fn test_partial_section() {
        let config: Config = toml::from_str(
            r#"
            [body_tracking]
            enable_tracking = true
            detection_model = "HUMAN_BODY_MEDIUM"

            [publishing]
            destination = "127.0.0.1"
            "#,
        )
        .unwrap();
        let bt = config.body_tracking_parameters();
        assert!(bt.enable_tracking);
        assert_eq!(bt.detection_model, BodyTrackingModel::HumanBodyMedium);
        assert_eq!(bt.body_format, BodyFormat::Body38);

        let comm = config.communication_parameters();
        assert_eq!(comm.endpoint(), "127.0.0.1:3000");
    }

    #[test]
    fn test_detection_model_defaults_to_platform() {
        let config = Config::default();
        assert_eq!(
            config.body_tracking_parameters().detection_model,
            BodyTrackingModel::platform_default()
        );
    }

    #[test]
    fn test_init_parameters_from_camera_section() {
        let config: Config = toml::from_str(
            r#"
            [camera]
            resolution = "HD2K"
            depth_mode = "ULTRA"
            coordinate_units = "METER"
            "#,
        )
        .unwrap();
        let init = config.init_parameters();
        assert_eq!(init.camera_resolution, Resolution::Hd2k);
        assert_eq!(init.depth_mode, DepthMode::Ultra);
        assert_eq!(init.coordinate_units, Unit::Meter);
        assert_eq!(init.input, crate::sdk::InputType::Live);
    }

    #[test]
    fn test_example_config_parses() {
        let config: Config =
            toml::from_str(include_str!("../camera_edge_publisher.example.toml")).unwrap();
        assert_eq!(config.camera.coordinate_units, Unit::Millimeter);
        assert_eq!(config.publishing.destination, LOCAL_NETWORK_BROADCAST);
        assert_eq!(config.simulation.body_count, 2);
        assert_eq!(config.simulation.disconnect_after, None);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("definitely/not/here.toml");
        assert_eq!(config.publishing.port, 3000);
    }

    #[test]
    fn test_load_or_default_broken_file() {
        let path = std::env::temp_dir().join("camera_edge_publisher_broken_config.toml");
        fs::write(&path, "[runtime\nskeleton_smoothing = ").unwrap();
        let config = Config::load_or_default(&path);
        assert_eq!(config.runtime.skeleton_smoothing, 0.7);
        let _ = fs::remove_file(&path);
    }
}
