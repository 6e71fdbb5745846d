//! Surface of the depth camera SDK used by the session driver.
//!
//! The driver only talks to a [`Camera`]; backends decide where frames and
//! detections actually come from.

pub mod body;
pub mod error;
pub mod params;

pub use body::{Bodies, Body38Part, BodyData, TrackingState};
pub use error::ErrorCode;
pub use params::{
    BodyFormat, BodyTrackingModel, BodyTrackingParameters, BodyTrackingRuntimeParameters,
    CommunicationParameters, CoordinateSystem, DepthMode, InitParameters,
    InputType, PositionalTrackingParameters, Resolution, Unit, DEFAULT_STREAM_PORT,
    LOCAL_NETWORK_BROADCAST,
};

/// Result of an SDK call. `Ok` is the SDK's SUCCESS status.
pub type Status = std::result::Result<(), ErrorCode>;

/// Lifecycle of a body-tracking camera session.
///
/// Calls are blocking. The expected order is `open`, the `enable_*` calls,
/// `start_publishing`, then `grab`/`retrieve_bodies` in a loop, and finally
/// the `disable_*` calls and `close`.
pub trait Camera {
    fn open(&mut self, params: &InitParameters) -> Status;

    fn enable_positional_tracking(&mut self, params: &PositionalTrackingParameters) -> Status;

    fn enable_body_tracking(&mut self, params: &BodyTrackingParameters) -> Status;

    fn start_publishing(&mut self, params: &CommunicationParameters) -> Status;

    /// Captures and processes one frame.
    fn grab(&mut self) -> Status;

    /// Overwrites `bodies` with the detections of the last grabbed frame.
    fn retrieve_bodies(
        &mut self,
        bodies: &mut Bodies,
        params: &BodyTrackingRuntimeParameters,
    ) -> Status;

    /// Seeks an SVO input to `frame`. No effect on other inputs.
    fn set_svo_position(&mut self, frame: u64);

    fn disable_body_tracking(&mut self);

    fn disable_positional_tracking(&mut self);

    /// Releases the session. Safe to call on a session that never opened.
    fn close(&mut self);
}
