use serde::{Deserialize, Serialize};

use super::params::BodyFormat;

/// BODY_38 keypoint indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Body38Part {
    Pelvis = 0,
    Spine1 = 1,
    Spine2 = 2,
    Spine3 = 3,
    Neck = 4,
    Nose = 5,
    LeftEye = 6,
    RightEye = 7,
    LeftEar = 8,
    RightEar = 9,
    LeftClavicle = 10,
    RightClavicle = 11,
    LeftShoulder = 12,
    RightShoulder = 13,
    LeftElbow = 14,
    RightElbow = 15,
    LeftWrist = 16,
    RightWrist = 17,
    LeftHip = 18,
    RightHip = 19,
    LeftKnee = 20,
    RightKnee = 21,
    LeftAnkle = 22,
    RightAnkle = 23,
    LeftBigToe = 24,
    RightBigToe = 25,
    LeftSmallToe = 26,
    RightSmallToe = 27,
    LeftHeel = 28,
    RightHeel = 29,
    LeftHandThumb4 = 30,
    RightHandThumb4 = 31,
    LeftHandIndex1 = 32,
    RightHandIndex1 = 33,
    LeftHandMiddle4 = 34,
    RightHandMiddle4 = 35,
    LeftHandPinky1 = 36,
    RightHandPinky1 = 37,
}

impl Body38Part {
    pub const COUNT: usize = 38;

    pub const ALL: [Body38Part; Self::COUNT] = [
        Self::Pelvis,
        Self::Spine1,
        Self::Spine2,
        Self::Spine3,
        Self::Neck,
        Self::Nose,
        Self::LeftEye,
        Self::RightEye,
        Self::LeftEar,
        Self::RightEar,
        Self::LeftClavicle,
        Self::RightClavicle,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftBigToe,
        Self::RightBigToe,
        Self::LeftSmallToe,
        Self::RightSmallToe,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftHandThumb4,
        Self::RightHandThumb4,
        Self::LeftHandIndex1,
        Self::RightHandIndex1,
        Self::LeftHandMiddle4,
        Self::RightHandMiddle4,
        Self::LeftHandPinky1,
        Self::RightHandPinky1,
    ];

    /// Mirror image across the body's sagittal plane.
    pub fn mirrored(self) -> Self {
        let index = self as usize;
        // Paired parts sit next to each other, left first.
        if index < Self::LeftEye as usize {
            self
        } else if (index - Self::LeftEye as usize) % 2 == 0 {
            Self::ALL[index + 1]
        } else {
            Self::ALL[index - 1]
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrackingState {
    /// Identity is not tracked (tracking disabled).
    #[default]
    Off,
    Ok,
    Searching,
    Terminate,
}

/// One detected person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyData {
    /// Stable across frames when tracking is enabled, -1 otherwise.
    pub id: i32,
    pub tracking_state: TrackingState,
    /// Detection confidence, 0..100.
    pub confidence: f32,
    pub position: [f32; 3],
    pub velocity: [f32; 3],
    /// 3D keypoints in the session's unit and coordinate system. NaN when
    /// the keypoint was not observed.
    pub keypoint: Vec<[f32; 3]>,
    /// Keypoints projected onto the left image, in pixels.
    pub keypoint_2d: Vec<[f32; 2]>,
    pub keypoint_confidence: Vec<f32>,
}

impl BodyData {
    /// Keypoints that were observed (not NaN).
    pub fn visible_keypoints(&self) -> usize {
        self.keypoint
            .iter()
            .filter(|k| k.iter().all(|v| v.is_finite()))
            .count()
    }
}

/// Detection buffer refilled by every retrieve call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bodies {
    /// Capture time of the frame the bodies were detected in.
    pub timestamp_ns: u64,
    /// False when the buffer still holds the previous frame's result.
    pub is_new: bool,
    pub is_tracked: bool,
    pub body_format: BodyFormat,
    pub body_list: Vec<BodyData>,
}

impl Bodies {
    pub fn clear(&mut self) {
        self.body_list.clear();
        self.is_new = false;
    }

    pub fn len(&self) -> usize {
        self.body_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body_list.is_empty()
    }
}
