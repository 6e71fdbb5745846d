//! Walking-body model for the simulated camera.
//!
//! Everything here is in meters, right handed Y-up, relative to the camera.
//! The camera looks down -Z and sits `CAMERA_HEIGHT` above the floor.

use std::f32::consts::TAU;

use crate::sdk::{Body38Part, BodyFormat};

pub const CAMERA_HEIGHT: f32 = 1.15;
const PELVIS_HEIGHT: f32 = 0.95;
const WALK_CENTER: [f32; 2] = [0.0, -3.0];
const WALK_RADIUS: f32 = 0.8;
/// rad/s around the walk circle.
const ANGULAR_SPEED: f32 = 0.3;
const STEPS_PER_RADIAN: f32 = 9.0;
const LEG_SWING: f32 = 0.18;
const ARM_SWING: f32 = 0.14;
const HORIZONTAL_FOV_DEG: f32 = 110.0;

/// Keypoints below this confidence are not observed unless the skeleton is
/// fitted.
pub const VISIBLE_KEYPOINT_CONFIDENCE: f32 = 60.0;

const BODY_18_PARTS: [Body38Part; 18] = [
    Body38Part::Nose,
    Body38Part::Neck,
    Body38Part::RightShoulder,
    Body38Part::RightElbow,
    Body38Part::RightWrist,
    Body38Part::LeftShoulder,
    Body38Part::LeftElbow,
    Body38Part::LeftWrist,
    Body38Part::RightHip,
    Body38Part::RightKnee,
    Body38Part::RightAnkle,
    Body38Part::LeftHip,
    Body38Part::LeftKnee,
    Body38Part::LeftAnkle,
    Body38Part::RightEye,
    Body38Part::LeftEye,
    Body38Part::RightEar,
    Body38Part::LeftEar,
];

// BODY_34 joints without a BODY_38 counterpart use the closest part
// (hand -> index base, hand tip -> middle tip, foot -> big toe, head -> nose).
const BODY_34_PARTS: [Body38Part; 34] = [
    Body38Part::Pelvis,
    Body38Part::Spine1,
    Body38Part::Spine2,
    Body38Part::Neck,
    Body38Part::LeftClavicle,
    Body38Part::LeftShoulder,
    Body38Part::LeftElbow,
    Body38Part::LeftWrist,
    Body38Part::LeftHandIndex1,
    Body38Part::LeftHandMiddle4,
    Body38Part::LeftHandThumb4,
    Body38Part::RightClavicle,
    Body38Part::RightShoulder,
    Body38Part::RightElbow,
    Body38Part::RightWrist,
    Body38Part::RightHandIndex1,
    Body38Part::RightHandMiddle4,
    Body38Part::RightHandThumb4,
    Body38Part::LeftHip,
    Body38Part::LeftKnee,
    Body38Part::LeftAnkle,
    Body38Part::LeftBigToe,
    Body38Part::RightHip,
    Body38Part::RightKnee,
    Body38Part::RightAnkle,
    Body38Part::RightBigToe,
    Body38Part::Nose,
    Body38Part::Nose,
    Body38Part::LeftEye,
    Body38Part::LeftEar,
    Body38Part::RightEye,
    Body38Part::RightEar,
    Body38Part::LeftHeel,
    Body38Part::RightHeel,
];

/// Keypoint layout of `format`, as BODY_38 parts.
pub fn format_parts(format: BodyFormat) -> &'static [Body38Part] {
    match format {
        BodyFormat::Body18 => &BODY_18_PARTS,
        BodyFormat::Body34 => &BODY_34_PARTS,
        BodyFormat::Body38 => &Body38Part::ALL,
    }
}

fn is_right(part: Body38Part) -> bool {
    part.mirrored() != part && (part as usize) % 2 == 1
}

/// Standing pose, relative to the pelvis, facing the camera.
pub fn rest_offset(part: Body38Part) -> [f32; 3] {
    if is_right(part) {
        let [x, y, z] = rest_offset(part.mirrored());
        return [-x, y, z];
    }
    match part {
        Body38Part::Pelvis => [0.0, 0.0, 0.0],
        Body38Part::Spine1 => [0.0, 0.10, 0.0],
        Body38Part::Spine2 => [0.0, 0.25, 0.0],
        Body38Part::Spine3 => [0.0, 0.40, 0.0],
        Body38Part::Neck => [0.0, 0.55, 0.0],
        Body38Part::Nose => [0.0, 0.68, 0.09],
        Body38Part::LeftEye => [0.03, 0.72, 0.07],
        Body38Part::LeftEar => [0.07, 0.70, 0.0],
        Body38Part::LeftClavicle => [0.05, 0.52, 0.01],
        Body38Part::LeftShoulder => [0.18, 0.50, 0.0],
        Body38Part::LeftElbow => [0.22, 0.22, 0.0],
        Body38Part::LeftWrist => [0.24, -0.02, 0.02],
        Body38Part::LeftHip => [0.10, -0.02, 0.0],
        Body38Part::LeftKnee => [0.11, -0.45, 0.02],
        Body38Part::LeftAnkle => [0.11, -0.85, 0.0],
        Body38Part::LeftBigToe => [0.12, -0.90, 0.16],
        Body38Part::LeftSmallToe => [0.16, -0.90, 0.12],
        Body38Part::LeftHeel => [0.11, -0.90, -0.05],
        Body38Part::LeftHandThumb4 => [0.22, -0.10, 0.07],
        Body38Part::LeftHandIndex1 => [0.25, -0.08, 0.04],
        Body38Part::LeftHandMiddle4 => [0.25, -0.19, 0.02],
        Body38Part::LeftHandPinky1 => [0.27, -0.07, -0.01],
        _ => [0.0, 0.0, 0.0],
    }
}

/// Forward displacement per unit of stride. Legs and arms swing in
/// opposition, and the right side mirrors the left.
fn swing_weight(part: Body38Part) -> f32 {
    if is_right(part) {
        return -swing_weight(part.mirrored());
    }
    match part {
        Body38Part::LeftKnee => 0.5 * LEG_SWING,
        Body38Part::LeftAnkle
        | Body38Part::LeftBigToe
        | Body38Part::LeftSmallToe
        | Body38Part::LeftHeel => LEG_SWING,
        Body38Part::LeftElbow => -0.5 * ARM_SWING,
        Body38Part::LeftWrist
        | Body38Part::LeftHandThumb4
        | Body38Part::LeftHandIndex1
        | Body38Part::LeftHandMiddle4
        | Body38Part::LeftHandPinky1 => -ARM_SWING,
        _ => 0.0,
    }
}

/// One body of the scene at a given instant.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticBody {
    pub pelvis: [f32; 3],
    pub confidence: f32,
    pub keypoints: Vec<[f32; 3]>,
    pub keypoint_confidence: Vec<f32>,
}

/// Body `index` at time `t` seconds. Bodies are spread evenly around the
/// walk circle.
pub fn synthesize(index: usize, body_count: usize, t: f32, format: BodyFormat) -> SyntheticBody {
    let phase = TAU * index as f32 / body_count.max(1) as f32;
    let angle = phase + ANGULAR_SPEED * t;
    let pelvis = [
        WALK_CENTER[0] + WALK_RADIUS * angle.cos(),
        PELVIS_HEIGHT - CAMERA_HEIGHT,
        WALK_CENTER[1] + WALK_RADIUS * angle.sin(),
    ];
    let stride = (angle * STEPS_PER_RADIAN).sin();
    let seed = index as f32;

    let parts = format_parts(format);
    let mut keypoints = Vec::with_capacity(parts.len());
    let mut keypoint_confidence = Vec::with_capacity(parts.len());
    for (k, part) in parts.iter().enumerate() {
        let offset = rest_offset(*part);
        keypoints.push([
            pelvis[0] + offset[0],
            pelvis[1] + offset[1],
            pelvis[2] + offset[2] + swing_weight(*part) * stride,
        ]);
        keypoint_confidence.push(50.0 + 49.0 * (0.8 * t + 0.37 * k as f32 + seed).cos().abs());
    }

    SyntheticBody {
        pelvis,
        confidence: 30.0 + 65.0 * (0.35 * t + 1.3 * seed).sin().abs(),
        keypoints,
        keypoint_confidence,
    }
}

/// Pinhole projection onto an image of `width` x `height` pixels.
/// Unobserved or behind-camera points map to NaN.
pub fn project(p: [f32; 3], width: u32, height: u32) -> [f32; 2] {
    let depth = -p[2];
    if !p.iter().all(|v| v.is_finite()) || depth <= f32::EPSILON {
        return [f32::NAN; 2];
    }
    let focal = width as f32 / (2.0 * (HORIZONTAL_FOV_DEG.to_radians() / 2.0).tan());
    [
        width as f32 / 2.0 + focal * p[0] / depth,
        height as f32 / 2.0 - focal * p[1] / depth,
    ]
}
