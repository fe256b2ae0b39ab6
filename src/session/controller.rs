/// Capture session controller
///
/// Owns the camera stream and the periodic detection loop, and publishes the
/// latest detection results for the UI to watch.
///
/// State machine: Idle -> Requesting -> Streaming -> Idle (stop).
/// A refused request lands in Error; asking again can still succeed.

use crate::error::{Result, TryOnError};
use crate::session::detection::{
    CannedFaceDetector, FaceDetection, FaceDetector, GestureDetector, GestureEvent,
    RandomGestureDetector,
};
use crate::session::engine::{InferenceEngine, PlaceholderEngine};
use crate::session::frame_sink::{FrameSink, PngFrameSink};
use crate::session::media::{Frame, MediaConstraints, MediaSource, MediaStream, SyntheticMediaSource};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Shown when the host refuses camera access
pub const PERMISSION_DENIED_MESSAGE: &str =
    "Camera access denied. Please enable camera permissions.";

/// Shown when the detection engine fails to come up
pub const ENGINE_FAILED_MESSAGE: &str = "Failed to initialize AR engine";

/// Default detection period, roughly 10 evaluations per second
pub const DEFAULT_DETECTION_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Requesting,
    Streaming,
    Error,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Requesting => "requesting",
            SessionStatus::Streaming => "streaming",
            SessionStatus::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// Granted together, never revoked by us
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturePermissions {
    pub camera: bool,
    pub microphone: bool,
}

/// Knobs for a capture session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub detection_interval: Duration,
    pub constraints: MediaConstraints,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            detection_interval: DEFAULT_DETECTION_INTERVAL,
            constraints: MediaConstraints::default(),
        }
    }
}

/// Everything the controller needs from the outside world
pub struct Capabilities {
    pub media: Arc<dyn MediaSource>,
    pub sink: Arc<dyn FrameSink>,
    pub engine: Arc<dyn InferenceEngine>,
    pub face_detector: Arc<dyn FaceDetector>,
    pub gesture_detector: Arc<dyn GestureDetector>,
}

impl Capabilities {
    /// Placeholder detectors, PNG snapshots, and the given media source
    pub fn with_media(media: Arc<dyn MediaSource>) -> Self {
        Self {
            media,
            sink: Arc::new(PngFrameSink),
            engine: Arc::new(PlaceholderEngine::default()),
            face_detector: Arc::new(CannedFaceDetector),
            gesture_detector: Arc::new(RandomGestureDetector::default()),
        }
    }

    /// No hardware involved at all
    pub fn synthetic() -> Self {
        Self::with_media(Arc::new(SyntheticMediaSource::granting()))
    }
}

/// Point-in-time view of the session, for display
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub is_initialized: bool,
    pub is_streaming: bool,
    pub is_detecting: bool,
    pub permissions: CapturePermissions,
    pub error: Option<String>,
    pub face_detection: Option<FaceDetection>,
    pub gesture_detection: Option<GestureEvent>,
}

#[derive(Default)]
struct SessionState {
    stream: Option<MediaStream>,
    permissions: CapturePermissions,
    error: Option<String>,
}

struct Shared {
    caps: Capabilities,
    settings: SessionSettings,
    state: Mutex<SessionState>,
    detecting: AtomicBool,
    status_tx: watch::Sender<SessionStatus>,
    ready_tx: watch::Sender<bool>,
    face_tx: watch::Sender<Option<FaceDetection>>,
    gesture_tx: watch::Sender<Option<GestureEvent>>,
}

impl Drop for Shared {
    fn drop(&mut self) {
        // Last handle gone: don't leave the camera light on
        let state = self.state.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Some(mut stream) = state.stream.take() {
            stream.stop_all();
        }
    }
}

/// Handle to a try-on capture session
///
/// Cheap to clone; all clones drive the same session.
#[derive(Clone)]
pub struct CaptureSession {
    shared: Arc<Shared>,
}

impl CaptureSession {
    pub fn new(caps: Capabilities, settings: SessionSettings) -> Self {
        let (status_tx, _) = watch::channel(SessionStatus::Idle);
        let (ready_tx, _) = watch::channel(false);
        let (face_tx, _) = watch::channel(None);
        let (gesture_tx, _) = watch::channel(None);

        Self {
            shared: Arc::new(Shared {
                caps,
                settings,
                state: Mutex::new(SessionState::default()),
                detecting: AtomicBool::new(false),
                status_tx,
                ready_tx,
                face_tx,
                gesture_tx,
            }),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    fn set_status(&self, status: SessionStatus) {
        let previous = self.shared.status_tx.send_replace(status);
        if previous != status {
            log::debug!("capture session {} -> {}", previous, status);
        }
    }

    /// Bring up the detection engine
    ///
    /// Detection stays silent until this succeeds. On failure the error message is set
    /// and detection never produces anything, but the session keeps working otherwise.
    pub async fn initialize_engine(&self) -> Result<()> {
        let engine = &self.shared.caps.engine;

        match engine.initialize().await {
            Ok(()) => {
                log::info!("{} detection engine ready", engine.name());
                self.shared.ready_tx.send_replace(true);
                Ok(())
            }
            Err(err) => {
                log::error!("failed to initialize {} engine: {}", engine.name(), err);
                self.lock_state().error = Some(ENGINE_FAILED_MESSAGE.to_string());
                match err {
                    TryOnError::EngineInit(_) => Err(err),
                    other => Err(TryOnError::EngineInit(other.to_string())),
                }
            }
        }
    }

    /// Ask the host for camera + microphone and attach the stream
    ///
    /// Only one stream is ever attached. If one already is, this succeeds
    /// without asking again.
    ///
    /// # Returns
    /// * `Ok(())` - Streaming, both permission flags set
    /// * `Err(TryOnError::PermissionDenied)` - Status is Error and the message is set
    pub async fn request_permissions(&self) -> Result<()> {
        if self.lock_state().stream.is_some() {
            log::debug!("stream already attached, not requesting another");
            return Ok(());
        }

        self.set_status(SessionStatus::Requesting);

        let constraints = &self.shared.settings.constraints;
        match self.shared.caps.media.acquire(constraints).await {
            Ok(mut stream) => {
                let mut state = self.lock_state();
                if state.stream.is_some() {
                    // Someone else won the race; keep theirs
                    stream.stop_all();
                    return Ok(());
                }

                log::info!(
                    "camera stream {} attached ({}x{})",
                    stream.id(),
                    constraints.width,
                    constraints.height
                );
                state.permissions = CapturePermissions {
                    camera: true,
                    microphone: true,
                };
                // an engine failure outlives a later camera grant
                if state.error.as_deref() == Some(PERMISSION_DENIED_MESSAGE) {
                    state.error = None;
                }
                state.stream = Some(stream);
                drop(state);

                self.set_status(SessionStatus::Streaming);
                Ok(())
            }
            Err(err) => {
                log::warn!("failed to get camera permissions: {}", err);
                self.lock_state().error = Some(PERMISSION_DENIED_MESSAGE.to_string());
                self.set_status(SessionStatus::Error);
                Err(TryOnError::PermissionDenied(err.to_string()))
            }
        }
    }

    /// Stop every track and drop the stream. Calling it again does nothing.
    pub fn stop_stream(&self) {
        let stream = self.lock_state().stream.take();

        if let Some(mut stream) = stream {
            let stopped = stream.stop_all();
            log::info!("camera stream {} stopped ({} tracks)", stream.id(), stopped);
            self.set_status(SessionStatus::Idle);
        }
    }

    /// Request permissions, then start the detection loop
    ///
    /// The returned handle only controls the loop. Cancelling it leaves the camera
    /// running; call `stop_stream` for that.
    ///
    /// # Returns
    /// * `Ok(DetectionLoop)` - Loop running
    /// * `Err(TryOnError::SessionAlreadyActive)` - A loop is already running
    /// * `Err(TryOnError::PermissionDenied)` - No stream, no loop
    pub async fn start_session(&self) -> Result<DetectionLoop> {
        if self
            .shared
            .detecting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(TryOnError::SessionAlreadyActive);
        }

        if let Err(err) = self.request_permissions().await {
            self.shared.detecting.store(false, Ordering::SeqCst);
            return Err(err);
        }

        let (stop_tx, stop_rx) = oneshot::channel();
        let period = self.shared.settings.detection_interval;
        let session = self.clone();
        let task = tokio::spawn(async move { session.run_detection_loop(period, stop_rx).await });

        log::info!("detection loop started ({}ms period)", period.as_millis());

        Ok(DetectionLoop {
            stop: Some(stop_tx),
            task: Some(task),
        })
    }

    async fn run_detection_loop(self, period: Duration, mut stop: oneshot::Receiver<()>) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut ticks: u64 = 0;

        loop {
            tokio::select! {
                biased;
                _ = &mut stop => break,
                _ = ticker.tick() => {
                    self.detect_face();
                    self.detect_gesture();
                    ticks += 1;
                }
            }
        }

        self.shared.detecting.store(false, Ordering::SeqCst);
        log::info!("detection loop stopped after {} ticks", ticks);
    }

    fn current_frame(&self) -> Option<Frame> {
        self.lock_state().stream.as_mut()?.current_frame()
    }

    /// Run the face detector once and publish what it finds
    ///
    /// Leaves the previous result alone if the engine isn't ready or no frame is available.
    pub fn detect_face(&self) {
        if !self.is_initialized() {
            return;
        }
        let Some(frame) = self.current_frame() else {
            return;
        };

        if let Some(face) = self.shared.caps.face_detector.detect(&frame) {
            self.shared.face_tx.send_replace(Some(face));
        }
    }

    /// Run the gesture detector once and publish what it finds
    pub fn detect_gesture(&self) {
        if !self.is_initialized() {
            return;
        }
        let Some(frame) = self.current_frame() else {
            return;
        };

        if let Some(gesture) = self.shared.caps.gesture_detector.detect(&frame) {
            log::trace!("gesture {:?}", gesture.kind);
            self.shared.gesture_tx.send_replace(Some(gesture));
        }
    }

    /// Snapshot the current video frame as a PNG data URI
    ///
    /// `None` when nothing is attached or the frame can't be encoded. Never errors.
    pub fn capture_frame(&self) -> Option<String> {
        let frame = self.current_frame()?;

        match self.shared.caps.sink.encode(&frame) {
            Ok(uri) => Some(uri),
            Err(err) => {
                log::warn!("snapshot failed: {}", err);
                None
            }
        }
    }

    pub fn status(&self) -> SessionStatus {
        *self.shared.status_tx.borrow()
    }

    pub fn permissions(&self) -> CapturePermissions {
        self.lock_state().permissions
    }

    pub fn error(&self) -> Option<String> {
        self.lock_state().error.clone()
    }

    pub fn is_streaming(&self) -> bool {
        self.lock_state().stream.is_some()
    }

    pub fn is_initialized(&self) -> bool {
        *self.shared.ready_tx.borrow()
    }

    /// A detection loop is running
    pub fn is_detecting(&self) -> bool {
        self.shared.detecting.load(Ordering::SeqCst)
    }

    pub fn face_detection(&self) -> Option<FaceDetection> {
        self.shared.face_tx.borrow().clone()
    }

    pub fn gesture_detection(&self) -> Option<GestureEvent> {
        *self.shared.gesture_tx.borrow()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SessionStatus> {
        self.shared.status_tx.subscribe()
    }

    pub fn subscribe_ready(&self) -> watch::Receiver<bool> {
        self.shared.ready_tx.subscribe()
    }

    pub fn subscribe_face(&self) -> watch::Receiver<Option<FaceDetection>> {
        self.shared.face_tx.subscribe()
    }

    pub fn subscribe_gesture(&self) -> watch::Receiver<Option<GestureEvent>> {
        self.shared.gesture_tx.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let (permissions, error, is_streaming) = {
            let state = self.lock_state();
            (state.permissions, state.error.clone(), state.stream.is_some())
        };

        SessionSnapshot {
            status: self.status(),
            is_initialized: self.is_initialized(),
            is_streaming,
            is_detecting: self.is_detecting(),
            permissions,
            error,
            face_detection: self.face_detection(),
            gesture_detection: self.gesture_detection(),
        }
    }
}

/// Running detection loop
///
/// Dropping the handle stops the loop too.
pub struct DetectionLoop {
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl DetectionLoop {
    /// Stop future ticks and wait for the loop to exit
    ///
    /// A tick already running finishes first.
    pub async fn cancel(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                log::warn!("detection loop ended abnormally: {}", err);
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |t| t.is_finished())
    }
}

impl Drop for DetectionLoop {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}
