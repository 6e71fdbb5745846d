//! Session driver: opens the camera, enables the tracking modules, publishes
//! detections from a blocking grab loop and tears everything down again.

use thiserror::Error;

use crate::config::Config;
use crate::sdk::{
    Bodies, BodyTrackingParameters, BodyTrackingRuntimeParameters, Camera,
    CommunicationParameters, ErrorCode, InitParameters, PositionalTrackingParameters, Status,
};

const TAG: &str = "[Publisher]";

/// A setup call that did not succeed. Always fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{operation} | {code} : {}", .code.verbose())]
pub struct SessionError {
    pub operation: &'static str,
    pub code: ErrorCode,
}

/// Everything the driver hands to the camera, filled before opening.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPlan {
    pub init: InitParameters,
    pub positional_tracking: PositionalTrackingParameters,
    pub body_tracking: BodyTrackingParameters,
    pub runtime: BodyTrackingRuntimeParameters,
    pub communication: CommunicationParameters,
}

impl SessionPlan {
    pub fn from_config(config: &Config) -> Self {
        Self {
            init: config.init_parameters(),
            positional_tracking: config.positional_tracking_parameters(),
            body_tracking: config.body_tracking_parameters(),
            runtime: config.runtime_parameters(),
            communication: config.communication_parameters(),
        }
    }
}

/// What one grab means for the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabOutcome {
    Frame,
    Rewind,
    Stop(ErrorCode),
}

impl GrabOutcome {
    pub fn classify(status: Status) -> Self {
        match status {
            Ok(()) => GrabOutcome::Frame,
            Err(ErrorCode::EndOfSvoFileReached) => GrabOutcome::Rewind,
            Err(code) => GrabOutcome::Stop(code),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSummary {
    pub frames: u64,
    pub rewinds: u64,
    /// Status that ended the loop.
    pub stopped_by: ErrorCode,
}

/// Formats a console status line. With an error code the line is tagged as
/// an error and carries the code name and its explanation.
pub fn status_line(prefix: &str, code: Option<ErrorCode>, suffix: &str) -> String {
    let mut line = String::from(TAG);
    if code.is_some() {
        line.push_str("[Error]");
    }
    line.push(' ');
    line.push_str(prefix);
    if let Some(code) = code {
        line.push_str(&format!(" | {} : {}", code, code.verbose()));
    }
    if !suffix.is_empty() {
        line.push(' ');
        line.push_str(suffix);
    }
    line
}

fn fail<C: Camera>(camera: &mut C, operation: &'static str, code: ErrorCode) -> SessionError {
    println!("{}", status_line(operation, Some(code), "\nExit program."));
    camera.close();
    SessionError { operation, code }
}

/// Opens the session and enables positional then body tracking.
///
/// On failure the session is closed before the error is returned.
pub fn setup<C: Camera>(camera: &mut C, plan: &SessionPlan) -> Result<(), SessionError> {
    camera
        .open(&plan.init)
        .map_err(|code| fail(camera, "Open Camera", code))?;

    camera
        .enable_positional_tracking(&plan.positional_tracking)
        .map_err(|code| fail(camera, "Enable Positional Tracking", code))?;

    camera
        .enable_body_tracking(&plan.body_tracking)
        .map_err(|code| fail(camera, "Enable Body Tracking", code))?;

    Ok(())
}

/// Starts publishing. A failure here does not stop the session.
pub fn start_publishing<C: Camera>(camera: &mut C, communication: &CommunicationParameters) {
    println!("Communication parameters: {}", communication.endpoint());
    if let Err(code) = camera.start_publishing(communication) {
        log::warn!("publishing unavailable, continuing without it: {code}");
    }
}

/// Grabs until a status other than success or end-of-file is returned.
///
/// End-of-file rewinds the input to its first frame.
pub fn grab_loop<C: Camera>(
    camera: &mut C,
    runtime: &BodyTrackingRuntimeParameters,
    bodies: &mut Bodies,
) -> LoopSummary {
    let mut frames = 0u64;
    let mut rewinds = 0u64;

    loop {
        match GrabOutcome::classify(camera.grab()) {
            GrabOutcome::Frame => {
                if let Err(code) = camera.retrieve_bodies(bodies, runtime) {
                    log::warn!("retrieve bodies failed: {code}");
                }
                frames += 1;
                if frames % 300 == 0 {
                    log::debug!("{} frames, {} bodies in last frame", frames, bodies.len());
                }
            }
            GrabOutcome::Rewind => {
                log::info!("end of SVO file reached, rewinding");
                camera.set_svo_position(0);
                rewinds += 1;
            }
            GrabOutcome::Stop(code) => {
                return LoopSummary {
                    frames,
                    rewinds,
                    stopped_by: code,
                };
            }
        }
    }
}

/// Releases the detection buffer and the session, in reverse setup order.
pub fn shutdown<C: Camera>(camera: &mut C, bodies: &mut Bodies) {
    bodies.clear();
    camera.disable_body_tracking();
    camera.disable_positional_tracking();
    camera.close();
}

/// Full session: setup, publishing, grab loop, shutdown.
pub fn run<C: Camera>(camera: &mut C, plan: &SessionPlan) -> Result<LoopSummary, SessionError> {
    setup(camera, plan)?;
    start_publishing(camera, &plan.communication);

    let mut bodies = Bodies::default();
    let summary = grab_loop(camera, &plan.runtime, &mut bodies);
    log::info!(
        "grab loop stopped by {} after {} frames ({} rewinds)",
        summary.stopped_by,
        summary.frames,
        summary.rewinds
    );

    shutdown(camera, &mut bodies);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::{BodyData, TrackingState};
    use std::collections::VecDeque;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Open,
        EnablePositionalTracking,
        EnableBodyTracking,
        StartPublishing,
        Grab,
        Retrieve,
        SetSvoPosition(u64),
        DisableBodyTracking,
        DisablePositionalTracking,
        Close,
    }

    /// Scripted camera that records every call.
    struct MockCamera {
        calls: Vec<Call>,
        open: Status,
        positional_tracking: Status,
        body_tracking: Status,
        publishing: Status,
        grabs: VecDeque<Status>,
    }

    impl Default for MockCamera {
        fn default() -> Self {
            Self {
                calls: Vec::new(),
                open: Ok(()),
                positional_tracking: Ok(()),
                body_tracking: Ok(()),
                publishing: Ok(()),
                grabs: VecDeque::new(),
            }
        }
    }

    impl MockCamera {
        fn with_grabs(grabs: Vec<Status>) -> Self {
            Self {
                grabs: grabs.into(),
                ..Default::default()
            }
        }

        fn count(&self, call: &Call) -> usize {
            self.calls.iter().filter(|c| *c == call).count()
        }
    }

    impl Camera for MockCamera {
        fn open(&mut self, _: &InitParameters) -> Status {
            self.calls.push(Call::Open);
            self.open
        }

        fn enable_positional_tracking(&mut self, _: &PositionalTrackingParameters) -> Status {
            self.calls.push(Call::EnablePositionalTracking);
            self.positional_tracking
        }

        fn enable_body_tracking(&mut self, _: &BodyTrackingParameters) -> Status {
            self.calls.push(Call::EnableBodyTracking);
            self.body_tracking
        }

        fn start_publishing(&mut self, _: &CommunicationParameters) -> Status {
            self.calls.push(Call::StartPublishing);
            self.publishing
        }

        fn grab(&mut self) -> Status {
            self.calls.push(Call::Grab);
            self.grabs
                .pop_front()
                .unwrap_or(Err(ErrorCode::CameraNotDetected))
        }

        fn retrieve_bodies(&mut self, bodies: &mut Bodies, _: &BodyTrackingRuntimeParameters) -> Status {
            self.calls.push(Call::Retrieve);
            bodies.body_list = vec![BodyData {
                id: -1,
                tracking_state: TrackingState::Off,
                confidence: 90.0,
                position: [0.0; 3],
                velocity: [0.0; 3],
                keypoint: Vec::new(),
                keypoint_2d: Vec::new(),
                keypoint_confidence: Vec::new(),
            }];
            bodies.is_new = true;
            Ok(())
        }

        fn set_svo_position(&mut self, frame: u64) {
            self.calls.push(Call::SetSvoPosition(frame));
        }

        fn disable_body_tracking(&mut self) {
            self.calls.push(Call::DisableBodyTracking);
        }

        fn disable_positional_tracking(&mut self) {
            self.calls.push(Call::DisablePositionalTracking);
        }

        fn close(&mut self) {
            self.calls.push(Call::Close);
        }
    }

    fn plan() -> SessionPlan {
        SessionPlan::from_config(&Config::default())
    }

    #[test]
    fn test_classify() {
        assert_eq!(GrabOutcome::classify(Ok(())), GrabOutcome::Frame);
        assert_eq!(
            GrabOutcome::classify(Err(ErrorCode::EndOfSvoFileReached)),
            GrabOutcome::Rewind
        );
        assert_eq!(
            GrabOutcome::classify(Err(ErrorCode::CorruptedFrame)),
            GrabOutcome::Stop(ErrorCode::CorruptedFrame)
        );
    }

    #[test]
    fn test_end_of_file_rewinds_once_and_continues() {
        let mut camera = MockCamera::with_grabs(vec![
            Ok(()),
            Err(ErrorCode::EndOfSvoFileReached),
            Ok(()),
            Ok(()),
            Err(ErrorCode::CameraNotDetected),
        ]);
        let mut bodies = Bodies::default();
        let summary = grab_loop(&mut camera, &plan().runtime, &mut bodies);

        assert_eq!(camera.count(&Call::SetSvoPosition(0)), 1);
        assert_eq!(camera.count(&Call::Retrieve), 3);
        assert_eq!(camera.count(&Call::Grab), 5);
        assert_eq!(
            summary,
            LoopSummary {
                frames: 3,
                rewinds: 1,
                stopped_by: ErrorCode::CameraNotDetected
            }
        );
        // The rewind happens right after the end-of-file grab.
        let eof = camera.calls.iter().position(|c| *c == Call::SetSvoPosition(0)).unwrap();
        assert_eq!(camera.calls[eof - 1], Call::Grab);
        assert_eq!(camera.calls[eof + 1], Call::Grab);
    }

    #[test]
    fn test_other_errors_stop_immediately() {
        let mut camera = MockCamera::with_grabs(vec![Err(ErrorCode::CorruptedFrame), Ok(())]);
        let mut bodies = Bodies::default();
        let summary = grab_loop(&mut camera, &plan().runtime, &mut bodies);
        assert_eq!(summary.frames, 0);
        assert_eq!(summary.stopped_by, ErrorCode::CorruptedFrame);
        assert_eq!(camera.calls, vec![Call::Grab]);
    }

    #[test]
    fn test_run_sequence() {
        let mut camera = MockCamera::with_grabs(vec![Ok(()), Ok(())]);
        let summary = run(&mut camera, &plan()).unwrap();
        assert_eq!(summary.frames, 2);
        assert_eq!(
            camera.calls,
            vec![
                Call::Open,
                Call::EnablePositionalTracking,
                Call::EnableBodyTracking,
                Call::StartPublishing,
                Call::Grab,
                Call::Retrieve,
                Call::Grab,
                Call::Retrieve,
                Call::Grab,
                Call::DisableBodyTracking,
                Call::DisablePositionalTracking,
                Call::Close,
            ]
        );
    }

    #[test]
    fn test_open_failure_closes_and_stops() {
        let mut camera = MockCamera {
            open: Err(ErrorCode::CameraNotDetected),
            ..Default::default()
        };
        let err = run(&mut camera, &plan()).unwrap_err();
        assert_eq!(err.operation, "Open Camera");
        assert_eq!(err.code, ErrorCode::CameraNotDetected);
        assert_eq!(camera.calls, vec![Call::Open, Call::Close]);
    }

    #[test]
    fn test_positional_tracking_failure_skips_body_tracking() {
        let mut camera = MockCamera {
            positional_tracking: Err(ErrorCode::MotionSensorsRequired),
            ..Default::default()
        };
        let err = run(&mut camera, &plan()).unwrap_err();
        assert_eq!(err.code, ErrorCode::MotionSensorsRequired);
        assert_eq!(
            camera.calls,
            vec![Call::Open, Call::EnablePositionalTracking, Call::Close]
        );
    }

    #[test]
    fn test_body_tracking_failure() {
        let mut camera = MockCamera {
            body_tracking: Err(ErrorCode::NotEnoughGpuMemory),
            ..Default::default()
        };
        let err = run(&mut camera, &plan()).unwrap_err();
        assert_eq!(err.operation, "Enable Body Tracking");
        assert_eq!(camera.calls.last(), Some(&Call::Close));
        assert_eq!(camera.count(&Call::Grab), 0);
    }

    #[test]
    fn test_publishing_failure_is_not_fatal() {
        let mut camera = MockCamera {
            publishing: Err(ErrorCode::Failure),
            grabs: VecDeque::from(vec![Ok(())]),
            ..Default::default()
        };
        let summary = run(&mut camera, &plan()).unwrap();
        assert_eq!(summary.frames, 1);
        assert_eq!(camera.calls.last(), Some(&Call::Close));
    }

    #[test]
    fn test_shutdown_clears_bodies() {
        let mut camera = MockCamera::default();
        let mut bodies = Bodies::default();
        camera.retrieve_bodies(&mut bodies, &plan().runtime).unwrap();
        assert_eq!(bodies.len(), 1);
        shutdown(&mut camera, &mut bodies);
        assert!(bodies.is_empty());
    }

    #[test]
    fn test_status_line() {
        assert_eq!(status_line("Ready", None, ""), "[Publisher] Ready");
        assert_eq!(
            status_line("Open Camera", Some(ErrorCode::CameraNotDetected), "Exit program."),
            "[Publisher][Error] Open Camera | CAMERA NOT DETECTED : The camera is not detected. Exit program."
        );
    }

    #[test]
    fn test_session_error_display() {
        let err = SessionError {
            operation: "Open Camera",
            code: ErrorCode::InvalidSvoFile,
        };
        assert_eq!(
            err.to_string(),
            "Open Camera | INVALID SVO FILE : The provided SVO file is not valid."
        );
    }
}
