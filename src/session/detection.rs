/// Face and gesture detection
///
/// The detectors here are placeholders. They return canned or random results
/// instead of running a model, but sit behind the same traits a real backend would.

use crate::session::media::Frame;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Detection confidence, always within 0.0..=1.0
///
/// Out-of-range input is clamped, NaN becomes 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct Confidence(f32);

impl Confidence {
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            Self(0.0)
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl From<f32> for Confidence {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl From<Confidence> for f32 {
    fn from(confidence: Confidence) -> Self {
        confidence.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaceShape {
    Round,
    Oval,
    Square,
    Heart,
    Diamond,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkinTone {
    Fair,
    Light,
    Medium,
    Tan,
    Deep,
}

/// Landmark position in frame pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceDetection {
    pub face_shape: FaceShape,
    pub skin_tone: SkinTone,
    pub confidence: Confidence,
    pub landmarks: Vec<Point>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureKind {
    Swipe,
    Pinch,
    Tap,
    Hold,
    Wave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// One recognised hand gesture. Only swipes carry a direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureEvent {
    #[serde(rename = "type")]
    pub kind: GestureKind,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub direction: Option<Direction>,
    pub confidence: Confidence,
}

impl GestureEvent {
    pub fn new(kind: GestureKind, confidence: f32) -> Self {
        Self {
            kind,
            direction: None,
            confidence: Confidence::new(confidence),
        }
    }

    pub fn swipe(direction: Direction, confidence: f32) -> Self {
        Self {
            direction: Some(direction),
            ..Self::new(GestureKind::Swipe, confidence)
        }
    }
}

/// Finds a face in a frame
pub trait FaceDetector: Send + Sync {
    fn name(&self) -> &'static str;

    /// `None` means no face this frame; the previous result stays published.
    fn detect(&self, frame: &Frame) -> Option<FaceDetection>;
}

/// Recognises a hand gesture in a frame
pub trait GestureDetector: Send + Sync {
    fn name(&self) -> &'static str;

    fn detect(&self, frame: &Frame) -> Option<GestureEvent>;
}

/// Always sees the same oval, medium-toned face
pub struct CannedFaceDetector;

impl FaceDetector for CannedFaceDetector {
    fn name(&self) -> &'static str {
        "canned-face"
    }

    fn detect(&self, _frame: &Frame) -> Option<FaceDetection> {
        Some(FaceDetection {
            face_shape: FaceShape::Oval,
            skin_tone: SkinTone::Medium,
            confidence: Confidence::new(0.85),
            landmarks: vec![
                Point { x: 100.0, y: 120.0 }, // left eye
                Point { x: 180.0, y: 120.0 }, // right eye
                Point { x: 140.0, y: 160.0 }, // nose
                Point { x: 140.0, y: 200.0 }, // mouth
            ],
        })
    }
}

/// Picks one of a fixed set of gestures at random every frame
pub struct RandomGestureDetector {
    candidates: Vec<GestureEvent>,
}

impl RandomGestureDetector {
    pub fn new(candidates: Vec<GestureEvent>) -> Self {
        Self { candidates }
    }
}

impl Default for RandomGestureDetector {
    fn default() -> Self {
        Self::new(vec![
            GestureEvent::new(GestureKind::Wave, 0.9),
            GestureEvent::swipe(Direction::Left, 0.8),
            GestureEvent::new(GestureKind::Pinch, 0.7),
        ])
    }
}

impl GestureDetector for RandomGestureDetector {
    fn name(&self) -> &'static str {
        "random-gesture"
    }

    fn detect(&self, _frame: &Frame) -> Option<GestureEvent> {
        self.candidates.choose(&mut rand::thread_rng()).copied()
    }
}
