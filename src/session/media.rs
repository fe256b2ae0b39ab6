/// Media capture capabilities
///
/// A `MediaSource` hands out `MediaStream`s made of tracks. The session controller
/// is the only thing that holds a stream; nobody else reaches into it.
/// The synthetic source at the bottom lets demos and tests run without a camera.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Which way the camera faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    User,
    Environment,
}

/// What to ask the host for. Width and height are ideals, not hard limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaConstraints {
    pub width: u32,
    pub height: u32,
    pub facing_mode: FacingMode,
    pub audio: bool,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            facing_mode: FacingMode::User,
            audio: true,
        }
    }
}

/// A single RGBA8 video frame at native resolution
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Frame {
    /// All-black frame
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgba: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    /// Buffer length agrees with the dimensions
    pub fn is_consistent(&self) -> bool {
        self.rgba.len() == (self.width as usize) * (self.height as usize) * 4
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Video,
    Audio,
}

/// One track of a media stream
pub trait MediaTrack: Send {
    fn kind(&self) -> TrackKind;

    fn label(&self) -> &str;

    fn is_live(&self) -> bool;

    /// Stop the track for good. Stopping twice is harmless.
    fn stop(&mut self);

    /// Latest frame, video tracks only
    fn current_frame(&mut self) -> Option<Frame> {
        None
    }
}

/// Bundle of tracks handed out by a `MediaSource`
pub struct MediaStream {
    id: String,
    tracks: Vec<Box<dyn MediaTrack>>,
}

impl MediaStream {
    pub fn new(id: impl Into<String>, tracks: Vec<Box<dyn MediaTrack>>) -> Self {
        Self {
            id: id.into(),
            tracks,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn has_kind(&self, kind: TrackKind) -> bool {
        self.tracks.iter().any(|t| t.kind() == kind)
    }

    /// Any track still running
    pub fn is_active(&self) -> bool {
        self.tracks.iter().any(|t| t.is_live())
    }

    /// Frame from the first live video track
    pub fn current_frame(&mut self) -> Option<Frame> {
        self.tracks
            .iter_mut()
            .filter(|t| t.kind() == TrackKind::Video && t.is_live())
            .find_map(|t| t.current_frame())
    }

    /// Stop every track, returns how many were still live
    pub fn stop_all(&mut self) -> usize {
        let mut stopped = 0;
        for track in self.tracks.iter_mut() {
            if track.is_live() {
                stopped += 1;
            }
            track.stop();
        }
        stopped
    }
}

impl fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.tracks.iter().map(|t| t.label()).collect();
        f.debug_struct("MediaStream")
            .field("id", &self.id)
            .field("tracks", &labels)
            .finish()
    }
}

/// Why the host refused to hand out a stream
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("no capture device: {0}")]
    NoDevice(String),

    #[error("device error: {0}")]
    Device(String),
}

/// Host device access (camera + microphone)
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Ask for a stream. May wait on a user prompt for as long as the host likes.
    async fn acquire(&self, constraints: &MediaConstraints) -> Result<MediaStream, MediaError>;
}

/// Fake camera that paints a moving gradient
pub struct SyntheticVideoTrack {
    width: u32,
    height: u32,
    frame_index: u64,
    live: Arc<AtomicBool>,
}

impl SyntheticVideoTrack {
    fn render(&self) -> Frame {
        let (w, h) = (self.width.max(1), self.height.max(1));
        let shift = (self.frame_index % 256) as u8;
        let mut rgba = Vec::with_capacity((w as usize) * (h as usize) * 4);

        for y in 0..h {
            for x in 0..w {
                rgba.push(((x * 255) / w) as u8);
                rgba.push(((y * 255) / h) as u8);
                rgba.push(shift);
                rgba.push(255);
            }
        }

        Frame {
            width: w,
            height: h,
            rgba,
        }
    }
}

impl MediaTrack for SyntheticVideoTrack {
    fn kind(&self) -> TrackKind {
        TrackKind::Video
    }

    fn label(&self) -> &str {
        "synthetic camera"
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    fn stop(&mut self) {
        self.live.store(false, Ordering::SeqCst);
    }

    fn current_frame(&mut self) -> Option<Frame> {
        if !self.is_live() {
            return None;
        }
        self.frame_index = self.frame_index.wrapping_add(1);
        Some(self.render())
    }
}

/// Silent microphone
pub struct SyntheticAudioTrack {
    live: Arc<AtomicBool>,
}

impl MediaTrack for SyntheticAudioTrack {
    fn kind(&self) -> TrackKind {
        TrackKind::Audio
    }

    fn label(&self) -> &str {
        "synthetic microphone"
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    fn stop(&mut self) {
        self.live.store(false, Ordering::SeqCst);
    }
}

/// In-process media source. Grants or denies every request, nothing in between.
pub struct SyntheticMediaSource {
    grant: bool,
    acquisitions: AtomicUsize,
    next_id: AtomicU64,
    handed_out: Mutex<Vec<Arc<AtomicBool>>>,
}

impl SyntheticMediaSource {
    /// Source that always grants access
    pub fn granting() -> Self {
        Self::new(true)
    }

    /// Source that behaves like a user clicking "Block"
    pub fn denying() -> Self {
        Self::new(false)
    }

    fn new(grant: bool) -> Self {
        Self {
            grant,
            acquisitions: AtomicUsize::new(0),
            next_id: AtomicU64::new(1),
            handed_out: Mutex::new(Vec::new()),
        }
    }

    /// Successful acquisitions so far
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    /// Tracks handed out that nobody has stopped yet
    pub fn live_tracks(&self) -> usize {
        self.handed_out
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|live| live.load(Ordering::SeqCst))
            .count()
    }

    fn register(&self) -> Arc<AtomicBool> {
        let live = Arc::new(AtomicBool::new(true));
        self.handed_out
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::clone(&live));
        live
    }
}

#[async_trait]
impl MediaSource for SyntheticMediaSource {
    async fn acquire(&self, constraints: &MediaConstraints) -> Result<MediaStream, MediaError> {
        // Let the "prompt" yield like a real one would
        tokio::task::yield_now().await;

        if !self.grant {
            return Err(MediaError::PermissionDenied(
                "user dismissed the camera prompt".to_string(),
            ));
        }

        let mut tracks: Vec<Box<dyn MediaTrack>> = vec![Box::new(SyntheticVideoTrack {
            width: constraints.width,
            height: constraints.height,
            frame_index: 0,
            live: self.register(),
        })];

        if constraints.audio {
            tracks.push(Box::new(SyntheticAudioTrack {
                live: self.register(),
            }));
        }

        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        Ok(MediaStream::new(format!("synthetic-{}", id), tracks))
    }
}
