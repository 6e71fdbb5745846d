//! Simulated body-tracking camera.
//!
//! Stands in for the vendor SDK: it follows the same call contract as a real
//! session (open before enable, positional tracking before body tracking,
//! end-of-file on SVO input until rewound) and produces bodies from the
//! walking model in [`skeleton`].

pub mod skeleton;
pub mod smooth;

use std::collections::HashMap;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::config::SimulationConfig;
use crate::publisher::BodyPublisher;
use crate::sdk::{
    Bodies, BodyData, BodyTrackingParameters, BodyTrackingRuntimeParameters, Camera,
    CommunicationParameters, DepthMode, ErrorCode, InitParameters, InputType,
    PositionalTrackingParameters, Status, TrackingState,
};

use self::skeleton::{project, synthesize, CAMERA_HEIGHT, VISIBLE_KEYPOINT_CONFIDENCE};
use self::smooth::SkeletonSmoother;

/// Frame rate used for the scene clock when pacing is disabled.
const NOMINAL_FPS: f32 = 30.0;

pub struct SimCamera {
    settings: SimulationConfig,
    session: Option<Session>,
}

struct Session {
    init: InitParameters,
    /// Index of the next frame to grab.
    position: u64,
    /// Index of the last grabbed frame, until its bodies are retrieved.
    pending_frame: Option<u64>,
    grabbed: u64,
    next_frame_at: Option<Instant>,
    positional_tracking: Option<PositionalTrackingParameters>,
    body_tracking: Option<BodyTrackingParameters>,
    publisher: Option<BodyPublisher>,
    publish_failed: bool,
    smoothers: HashMap<usize, SkeletonSmoother>,
    last_pelvis: HashMap<usize, [f32; 3]>,
}

impl Session {
    fn new(init: InitParameters) -> Self {
        Self {
            init,
            position: 0,
            pending_frame: None,
            grabbed: 0,
            next_frame_at: None,
            positional_tracking: None,
            body_tracking: None,
            publisher: None,
            publish_failed: false,
            smoothers: HashMap::new(),
            last_pelvis: HashMap::new(),
        }
    }

    fn reset_filters(&mut self) {
        for smoother in self.smoothers.values_mut() {
            smoother.reset();
        }
        self.last_pelvis.clear();
    }
}

impl SimCamera {
    pub fn new(settings: SimulationConfig) -> Self {
        Self {
            settings,
            session: None,
        }
    }

    pub fn is_opened(&self) -> bool {
        self.session.is_some()
    }

    /// Position of the next frame in the input.
    pub fn svo_position(&self) -> Option<u64> {
        self.session.as_ref().map(|s| s.position)
    }

    /// Configured rate, or `None` when it is zero, negative or not a number.
    fn paced_fps(&self) -> Option<f32> {
        let fps = self.settings.fps;
        (fps.is_finite() && fps > 0.0).then_some(fps)
    }

    fn scene_fps(&self) -> f32 {
        self.paced_fps().unwrap_or(NOMINAL_FPS)
    }

    fn svo_length(&self, session: &Session) -> Option<u64> {
        match session.init.input {
            InputType::Svo(_) => Some(self.settings.svo_frames),
            _ => None,
        }
    }

    fn pace(&self, session: &mut Session) {
        let Some(interval) = self
            .paced_fps()
            .and_then(|fps| Duration::try_from_secs_f32(1.0 / fps).ok())
        else {
            return;
        };
        let now = Instant::now();
        let due = session.next_frame_at.unwrap_or(now);
        if due > now {
            thread::sleep(due - now);
        }
        session.next_frame_at = Some(due.max(now) + interval);
    }

    fn build_body(
        &self,
        session: &mut Session,
        index: usize,
        t: f32,
        tracking: &BodyTrackingParameters,
        runtime: &BodyTrackingRuntimeParameters,
    ) -> Option<BodyData> {
        let synthetic = synthesize(index, self.settings.body_count, t, tracking.body_format);
        if synthetic.confidence < runtime.detection_confidence_threshold {
            return None;
        }

        let mut observed = synthetic.keypoints;
        let mut keypoint_confidence = synthetic.keypoint_confidence;
        if !tracking.enable_body_fitting {
            for (kp, conf) in observed.iter_mut().zip(keypoint_confidence.iter_mut()) {
                if *conf < VISIBLE_KEYPOINT_CONFIDENCE {
                    *kp = [f32::NAN; 3];
                    *conf = 0.0;
                }
            }
        }

        let smoother = session
            .smoothers
            .entry(index)
            .or_insert_with(|| SkeletonSmoother::from_smoothing(runtime.skeleton_smoothing));
        smoother.set_smoothing(runtime.skeleton_smoothing);
        let keypoints = smoother.apply(&observed);

        let dt = 1.0 / self.scene_fps();
        let velocity = match session.last_pelvis.insert(index, synthetic.pelvis) {
            Some(prev) => [
                (synthetic.pelvis[0] - prev[0]) / dt,
                (synthetic.pelvis[1] - prev[1]) / dt,
                (synthetic.pelvis[2] - prev[2]) / dt,
            ],
            None => [0.0; 3],
        };

        let (width, height) = session.init.camera_resolution.dimensions();
        let keypoint_2d = keypoints.iter().map(|p| project(*p, width, height)).collect();

        let floor_offset = match session.positional_tracking {
            Some(pt) if pt.set_floor_as_origin => CAMERA_HEIGHT,
            _ => 0.0,
        };
        let scale = session.init.coordinate_units.per_meter();
        let system = session.init.coordinate_system;
        let convert = |p: [f32; 3]| {
            system.from_right_handed_y_up([p[0] * scale, (p[1] + floor_offset) * scale, p[2] * scale])
        };
        let to_output = |v: [f32; 3]| system.from_right_handed_y_up([v[0] * scale, v[1] * scale, v[2] * scale]);

        Some(BodyData {
            id: if tracking.enable_tracking { index as i32 } else { -1 },
            tracking_state: if tracking.enable_tracking {
                TrackingState::Ok
            } else {
                TrackingState::Off
            },
            confidence: synthetic.confidence,
            position: convert(synthetic.pelvis),
            velocity: to_output(velocity),
            keypoint: keypoints.into_iter().map(convert).collect(),
            keypoint_2d,
            keypoint_confidence,
        })
    }
}

impl Camera for SimCamera {
    fn open(&mut self, params: &InitParameters) -> Status {
        if self.session.is_some() {
            return Err(ErrorCode::InvalidFunctionCall);
        }
        match &params.input {
            InputType::Live if !self.settings.device_available => {
                return Err(ErrorCode::CameraNotDetected);
            }
            InputType::Svo(path) if !path.is_file() => {
                log::error!("SVO file not found: {}", path.display());
                return Err(ErrorCode::InvalidSvoFile);
            }
            InputType::Svo(path) if self.settings.svo_frames == 0 => {
                log::error!("SVO file has no frames: {}", path.display());
                return Err(ErrorCode::InvalidSvoFile);
            }
            _ => {}
        }

        let (width, height) = params.camera_resolution.dimensions();
        log::info!(
            "simulated camera opened: {} at {}x{} ({:?}, {:?})",
            params.input,
            width,
            height,
            params.depth_mode,
            params.coordinate_system
        );
        self.session = Some(Session::new(params.clone()));
        Ok(())
    }

    fn enable_positional_tracking(&mut self, params: &PositionalTrackingParameters) -> Status {
        let session = self.session.as_mut().ok_or(ErrorCode::CameraNotInitialized)?;
        if params.set_as_static {
            log::debug!("positional tracking: camera is static");
        }
        session.positional_tracking = Some(*params);
        Ok(())
    }

    fn enable_body_tracking(&mut self, params: &BodyTrackingParameters) -> Status {
        let session = self.session.as_mut().ok_or(ErrorCode::CameraNotInitialized)?;
        if session.positional_tracking.is_none() {
            return Err(ErrorCode::InvalidFunctionCall);
        }
        if session.init.depth_mode == DepthMode::None {
            return Err(ErrorCode::InvalidFunctionParameters);
        }
        log::info!(
            "body tracking enabled: {} with {:?} (tracking: {}, fitting: {})",
            params.body_format.as_str(),
            params.detection_model,
            params.enable_tracking,
            params.enable_body_fitting
        );
        if params.allow_reduced_precision_inference {
            log::debug!("body tracking: reduced precision inference allowed");
        }
        session.body_tracking = Some(*params);
        session.reset_filters();
        Ok(())
    }

    fn start_publishing(&mut self, params: &CommunicationParameters) -> Status {
        let session = self.session.as_mut().ok_or(ErrorCode::CameraNotInitialized)?;
        match BodyPublisher::new(params) {
            Ok(publisher) => {
                log::info!("publishing detections to {}", publisher.target_addr());
                session.publisher = Some(publisher);
                session.publish_failed = false;
                Ok(())
            }
            Err(e) => {
                log::warn!("failed to start publishing: {e}");
                Err(ErrorCode::Failure)
            }
        }
    }

    fn grab(&mut self) -> Status {
        let mut session = self.session.take().ok_or(ErrorCode::CameraNotInitialized)?;
        let result = self.grab_frame(&mut session);
        self.session = Some(session);
        result
    }

    fn retrieve_bodies(
        &mut self,
        bodies: &mut Bodies,
        params: &BodyTrackingRuntimeParameters,
    ) -> Status {
        let mut session = self.session.take().ok_or(ErrorCode::CameraNotInitialized)?;
        let result = self.retrieve_frame(&mut session, bodies, params);
        self.session = Some(session);
        result
    }

    fn set_svo_position(&mut self, frame: u64) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        match self.svo_length(&session) {
            Some(length) => {
                session.position = frame.min(length);
                session.pending_frame = None;
                session.reset_filters();
                log::debug!("SVO position set to {}", session.position);
            }
            None => log::debug!("ignoring SVO seek on {}", session.init.input),
        }
        self.session = Some(session);
    }

    fn disable_body_tracking(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.body_tracking = None;
            session.reset_filters();
        }
    }

    fn disable_positional_tracking(&mut self) {
        if let Some(session) = self.session.as_mut() {
            // Body tracking depends on it.
            session.body_tracking = None;
            session.positional_tracking = None;
        }
    }

    fn close(&mut self) {
        if let Some(session) = self.session.take() {
            log::info!(
                "simulated camera closed after {} frames ({} published)",
                session.grabbed,
                session.publisher.as_ref().map_or(0, |p| p.sequence())
            );
        }
    }
}

impl SimCamera {
    fn grab_frame(&self, session: &mut Session) -> Status {
        if let Some(limit) = self.settings.disconnect_after {
            if session.grabbed >= limit {
                return Err(ErrorCode::CameraNotDetected);
            }
        }
        if let Some(length) = self.svo_length(session) {
            if session.position >= length {
                return Err(ErrorCode::EndOfSvoFileReached);
            }
        }

        self.pace(session);
        session.pending_frame = Some(session.position);
        session.position += 1;
        session.grabbed += 1;
        Ok(())
    }

    fn retrieve_frame(
        &self,
        session: &mut Session,
        bodies: &mut Bodies,
        params: &BodyTrackingRuntimeParameters,
    ) -> Status {
        let tracking = session.body_tracking.ok_or(ErrorCode::InvalidFunctionCall)?;
        let Some(frame) = session.pending_frame.take() else {
            // Nothing grabbed since the last retrieve: keep the previous result.
            bodies.is_new = false;
            return Ok(());
        };

        let t = frame as f32 / self.scene_fps();
        bodies.body_list.clear();
        for index in 0..self.settings.body_count {
            if let Some(body) = self.build_body(session, index, t, &tracking, params) {
                bodies.body_list.push(body);
            }
        }
        bodies.body_format = tracking.body_format;
        bodies.is_tracked = tracking.enable_tracking;
        bodies.is_new = true;
        bodies.timestamp_ns = match session.init.input {
            InputType::Svo(_) => (frame as f64 * 1e9 / self.scene_fps() as f64) as u64,
            _ => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or_default(),
        };

        if let Some(publisher) = session.publisher.as_mut() {
            match publisher.publish(bodies) {
                Ok(()) => session.publish_failed = false,
                Err(e) if !session.publish_failed => {
                    log::warn!("failed to publish frame {}: {e}", frame);
                    session.publish_failed = true;
                }
                Err(_) => {}
            }
        }
        Ok(())
    }
}
