/// Capture session module
///
/// Camera stream lifecycle, placeholder face/gesture detection, snapshots,
/// and the shopper's current try-on selection.

pub mod controller;
pub mod detection;
pub mod engine;
pub mod frame_sink;
pub mod media;
pub mod selection;

pub use controller::{
    Capabilities, CapturePermissions, CaptureSession, DetectionLoop, SessionSettings,
    SessionSnapshot, SessionStatus, DEFAULT_DETECTION_INTERVAL, ENGINE_FAILED_MESSAGE,
    PERMISSION_DENIED_MESSAGE,
};
pub use detection::{
    CannedFaceDetector, Confidence, Direction, FaceDetection, FaceDetector, FaceShape,
    GestureDetector, GestureEvent, GestureKind, Point, RandomGestureDetector, SkinTone,
};
pub use engine::{InferenceEngine, PlaceholderEngine};
pub use frame_sink::{FrameSink, PngFrameSink};
pub use media::{
    FacingMode, Frame, MediaConstraints, MediaError, MediaSource, MediaStream, MediaTrack,
    SyntheticMediaSource, TrackKind,
};
pub use selection::{GestureCommand, TryOnSelection, MAX_SELECTED};
