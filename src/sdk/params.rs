//! Configuration values handed to the camera SDK.
//!
//! All of these are plain data: they are filled once before the matching
//! open/enable call and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Port used by network stream inputs when the command line gives only an IP.
pub const DEFAULT_STREAM_PORT: u16 = 30000;

/// Destination used for local network publishing unless overridden.
pub const LOCAL_NETWORK_BROADCAST: &str = "255.255.255.255";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "HD2K")]
    Hd2k,
    #[serde(rename = "HD1200")]
    Hd1200,
    #[serde(rename = "HD1080")]
    Hd1080,
    #[serde(rename = "HD720")]
    Hd720,
    #[serde(rename = "SVGA")]
    Svga,
    #[serde(rename = "VGA")]
    Vga,
    #[default]
    #[serde(rename = "AUTO")]
    Auto,
}

impl Resolution {
    /// Names matched against the command line, in priority order.
    ///
    /// `SVGA` is listed before `VGA` because the latter is a substring of it.
    pub const OVERRIDES: [Resolution; 6] = [
        Resolution::Hd2k,
        Resolution::Hd1200,
        Resolution::Hd1080,
        Resolution::Hd720,
        Resolution::Svga,
        Resolution::Vga,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Hd2k => "HD2K",
            Resolution::Hd1200 => "HD1200",
            Resolution::Hd1080 => "HD1080",
            Resolution::Hd720 => "HD720",
            Resolution::Svga => "SVGA",
            Resolution::Vga => "VGA",
            Resolution::Auto => "AUTO",
        }
    }

    /// Per-eye image size in pixels. `Auto` resolves to HD720.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Resolution::Hd2k => (2208, 1242),
            Resolution::Hd1200 => (1920, 1200),
            Resolution::Hd1080 => (1920, 1080),
            Resolution::Hd720 | Resolution::Auto => (1280, 720),
            Resolution::Svga => (960, 600),
            Resolution::Vga => (672, 376),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DepthMode {
    None,
    Performance,
    Quality,
    Ultra,
    NeuralLight,
    #[default]
    Neural,
    NeuralPlus,
}

/// Axis convention for every 3D value the SDK returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoordinateSystem {
    /// X right, Y down, Z forward.
    Image,
    /// X right, Y up, Z forward.
    LeftHandedYUp,
    /// X right, Y up, Z backward.
    #[default]
    RightHandedYUp,
    /// X right, Y forward, Z up.
    RightHandedZUp,
    /// X forward, Y right, Z up.
    LeftHandedZUp,
    /// X forward, Y left, Z up.
    RightHandedZUpXFwd,
}

impl CoordinateSystem {
    /// Re-expresses a point given in `RightHandedYUp` in this system.
    pub fn from_right_handed_y_up(&self, p: [f32; 3]) -> [f32; 3] {
        let [x, y, z] = p;
        match self {
            CoordinateSystem::Image => [x, -y, -z],
            CoordinateSystem::LeftHandedYUp => [x, y, -z],
            CoordinateSystem::RightHandedYUp => [x, y, z],
            CoordinateSystem::RightHandedZUp => [x, -z, y],
            CoordinateSystem::LeftHandedZUp => [-z, x, y],
            CoordinateSystem::RightHandedZUpXFwd => [-z, -x, y],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Unit {
    #[default]
    Millimeter,
    Centimeter,
    Meter,
    Inch,
    Foot,
}

impl Unit {
    /// Number of this unit in one meter.
    pub fn per_meter(&self) -> f32 {
        match self {
            Unit::Millimeter => 1000.0,
            Unit::Centimeter => 100.0,
            Unit::Meter => 1.0,
            Unit::Inch => 39.370_08,
            Unit::Foot => 3.280_84,
        }
    }
}

/// Where frames come from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputType {
    /// First camera attached to the host.
    #[default]
    Live,
    /// Recorded SVO file played back frame by frame.
    Svo(PathBuf),
    /// Camera streamed by another host.
    Stream { ip: String, port: u16 },
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputType::Live => f.write_str("live camera"),
            InputType::Svo(path) => write!(f, "SVO file {}", path.display()),
            InputType::Stream { ip, port } => write!(f, "stream {}:{}", ip, port),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct InitParameters {
    pub camera_resolution: Resolution,
    pub depth_mode: DepthMode,
    pub coordinate_system: CoordinateSystem,
    pub coordinate_units: Unit,
    pub input: InputType,
}

impl InitParameters {
    pub fn set_from_svo_file(&mut self, path: impl Into<PathBuf>) {
        self.input = InputType::Svo(path.into());
    }

    pub fn set_from_stream(&mut self, ip: impl Into<String>, port: u16) {
        self.input = InputType::Stream {
            ip: ip.into(),
            port,
        };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PositionalTrackingParameters {
    /// Camera does not move; skips motion estimation.
    pub set_as_static: bool,
    pub set_floor_as_origin: bool,
}

/// Skeleton layout of a detected body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BodyFormat {
    #[serde(rename = "BODY_18")]
    Body18,
    #[serde(rename = "BODY_34")]
    Body34,
    #[default]
    #[serde(rename = "BODY_38")]
    Body38,
}

impl BodyFormat {
    pub fn keypoint_count(&self) -> usize {
        match self {
            BodyFormat::Body18 => 18,
            BodyFormat::Body34 => 34,
            BodyFormat::Body38 => 38,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BodyFormat::Body18 => "BODY_18",
            BodyFormat::Body34 => "BODY_34",
            BodyFormat::Body38 => "BODY_38",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BodyTrackingModel {
    HumanBodyFast,
    HumanBodyMedium,
    HumanBodyAccurate,
}

impl BodyTrackingModel {
    /// Embedded aarch64 Linux boards get the fast model, everything else the
    /// accurate one.
    pub fn platform_default() -> Self {
        if cfg!(all(target_arch = "aarch64", target_os = "linux")) {
            BodyTrackingModel::HumanBodyFast
        } else {
            BodyTrackingModel::HumanBodyAccurate
        }
    }
}

impl Default for BodyTrackingModel {
    fn default() -> Self {
        Self::platform_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BodyTrackingParameters {
    /// Keep body identities across frames.
    pub enable_tracking: bool,
    /// Fit a full skeleton, filling keypoints that were not observed.
    pub enable_body_fitting: bool,
    pub body_format: BodyFormat,
    pub detection_model: BodyTrackingModel,
    pub allow_reduced_precision_inference: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyTrackingRuntimeParameters {
    /// Bodies below this confidence (0..100) are dropped.
    pub detection_confidence_threshold: f32,
    /// 0 means raw keypoints, values close to 1 smooth heavily.
    pub skeleton_smoothing: f32,
}

impl Default for BodyTrackingRuntimeParameters {
    fn default() -> Self {
        Self {
            detection_confidence_threshold: 40.0,
            skeleton_smoothing: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunicationParameters {
    pub ip_address: String,
    pub port: u16,
}

impl CommunicationParameters {
    pub fn for_local_network(port: u16) -> Self {
        Self {
            ip_address: LOCAL_NETWORK_BROADCAST.to_string(),
            port,
        }
    }

    pub fn with_ip_address(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = ip.into();
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.ip_address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_overrides_check_svga_before_vga() {
        let svga = Resolution::OVERRIDES.iter().position(|r| *r == Resolution::Svga);
        let vga = Resolution::OVERRIDES.iter().position(|r| *r == Resolution::Vga);
        assert!(svga < vga);
    }

    #[test]
    fn test_auto_resolution_dimensions() {
        assert_eq!(Resolution::Auto.dimensions(), Resolution::Hd720.dimensions());
    }

    #[test]
    fn test_coordinate_system_identity() {
        let p = [1.0, 2.0, 3.0];
        assert_eq!(CoordinateSystem::RightHandedYUp.from_right_handed_y_up(p), p);
    }

    #[test]
    fn test_coordinate_system_forward_axis() {
        // One meter in front of a right handed Y-up camera is -Z.
        let ahead = [0.0, 0.0, -1.0];
        assert_eq!(CoordinateSystem::Image.from_right_handed_y_up(ahead), [0.0, -0.0, 1.0]);
        assert_eq!(CoordinateSystem::RightHandedZUp.from_right_handed_y_up(ahead), [0.0, 1.0, 0.0]);
        assert_eq!(
            CoordinateSystem::RightHandedZUpXFwd.from_right_handed_y_up(ahead),
            [1.0, -0.0, 0.0]
        );
    }

    #[test]
    fn test_body_format_keypoint_count() {
        assert_eq!(BodyFormat::Body18.keypoint_count(), 18);
        assert_eq!(BodyFormat::Body34.keypoint_count(), 34);
        assert_eq!(BodyFormat::Body38.keypoint_count(), 38);
    }

    #[test]
    fn test_local_network_endpoint() {
        let comm = CommunicationParameters::for_local_network(3000);
        assert_eq!(comm.endpoint(), "255.255.255.255:3000");
        let comm = comm.with_ip_address("127.0.0.1");
        assert_eq!(comm.endpoint(), "127.0.0.1:3000");
    }

    #[test]
    fn test_serde_names() {
        #[derive(Deserialize)]
        struct Names {
            resolution: Resolution,
            format: BodyFormat,
            model: BodyTrackingModel,
            coords: CoordinateSystem,
        }
        let names: Names = toml::from_str(
            r#"
            resolution = "HD1200"
            format = "BODY_18"
            model = "HUMAN_BODY_MEDIUM"
            coords = "RIGHT_HANDED_Z_UP_X_FWD"
            "#,
        )
        .unwrap();
        assert_eq!(names.resolution, Resolution::Hd1200);
        assert_eq!(names.format, BodyFormat::Body18);
        assert_eq!(names.model, BodyTrackingModel::HumanBodyMedium);
        assert_eq!(names.coords, CoordinateSystem::RightHandedZUpXFwd);
    }
}
