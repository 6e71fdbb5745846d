use thiserror::Error;

/// Status codes reported by the depth camera SDK.
///
/// `Display` gives the short upper-case name; [`ErrorCode::verbose`] gives a
/// sentence suitable for the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ErrorCode {
    #[error("FAILURE")]
    Failure,

    #[error("NO GPU COMPATIBLE")]
    NoGpuCompatible,

    #[error("NOT ENOUGH GPU MEMORY")]
    NotEnoughGpuMemory,

    #[error("CAMERA NOT DETECTED")]
    CameraNotDetected,

    #[error("SENSORS NOT INITIALIZED")]
    SensorsNotInitialized,

    #[error("INVALID RESOLUTION")]
    InvalidResolution,

    #[error("LOW USB BANDWIDTH")]
    LowUsbBandwidth,

    #[error("CALIBRATION FILE NOT AVAILABLE")]
    CalibrationFileNotAvailable,

    #[error("INVALID SVO FILE")]
    InvalidSvoFile,

    #[error("END OF SVOFILE REACHED")]
    EndOfSvoFileReached,

    #[error("INVALID COORDINATE SYSTEM")]
    InvalidCoordinateSystem,

    #[error("INVALID FUNCTION PARAMETERS")]
    InvalidFunctionParameters,

    #[error("INVALID FUNCTION CALL")]
    InvalidFunctionCall,

    #[error("CAMERA NOT INITIALIZED")]
    CameraNotInitialized,

    #[error("CORRUPTED FRAME")]
    CorruptedFrame,

    #[error("CONNECTION TIMED OUT")]
    ConnectionTimedOut,

    #[error("MODULE NOT COMPATIBLE WITH CAMERA")]
    ModuleNotCompatibleWithCamera,

    #[error("MOTION SENSORS REQUIRED")]
    MotionSensorsRequired,
}

impl ErrorCode {
    /// Human readable explanation of the status.
    pub fn verbose(&self) -> &'static str {
        match self {
            ErrorCode::Failure => "Standard code for unsuccessful behavior.",
            ErrorCode::NoGpuCompatible => "No GPU found or CUDA capability of the device is not supported.",
            ErrorCode::NotEnoughGpuMemory => {
                "Not enough GPU memory for this depth mode, try a different mode (such as PERFORMANCE)."
            }
            ErrorCode::CameraNotDetected => "The camera is not detected.",
            ErrorCode::SensorsNotInitialized => {
                "The motion sensors could not be initialized, the camera may need a restart."
            }
            ErrorCode::InvalidResolution => "The requested resolution is not available for this camera.",
            ErrorCode::LowUsbBandwidth => {
                "The USB bandwidth is not sufficient to support the requested resolution and frame rate."
            }
            ErrorCode::CalibrationFileNotAvailable => {
                "The calibration file of the camera could not be found or downloaded."
            }
            ErrorCode::InvalidSvoFile => "The provided SVO file is not valid.",
            ErrorCode::EndOfSvoFileReached => "The end of the SVO file has been reached.",
            ErrorCode::InvalidCoordinateSystem => "The requested coordinate system is not available.",
            ErrorCode::InvalidFunctionParameters => "Invalid value for one of the function parameters.",
            ErrorCode::InvalidFunctionCall => {
                "The function cannot be called in the current state, a prerequisite module is not enabled."
            }
            ErrorCode::CameraNotInitialized => "The camera session has not been opened.",
            ErrorCode::CorruptedFrame => "The grabbed frame is corrupted and was dropped.",
            ErrorCode::ConnectionTimedOut => "The connection to the stream source timed out.",
            ErrorCode::ModuleNotCompatibleWithCamera => "The module is not compatible with this camera model.",
            ErrorCode::MotionSensorsRequired => "The module requires the camera motion sensors.",
        }
    }
}
