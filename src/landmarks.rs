//! Landmark types and the tracker stream boundary
//!
//! The tracker itself lives outside this crate. Whatever produces landmark
//! frames (MediaPipe in the browser, a recorded script in tests) implements
//! [`LandmarkStream`] and the session polls it.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{ControlError, TrackerError};

// Hand landmark indices
pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

pub const HAND_LANDMARK_COUNT: usize = 21;

/// Middle-finger knuckle, the most stable point on the palm
pub const PALM_CENTER: usize = MIDDLE_MCP;

/// Face mesh landmark used for head position
pub const FACE_NOSE: usize = 1;

/// A normalized tracker point. x and y are in [0, 1] image space,
/// z is depth relative to the wrist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl LandmarkPoint {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Image-plane position (depth dropped)
    #[inline]
    pub fn xy(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Image-plane distance to another point
    #[inline]
    pub fn distance(&self, other: &LandmarkPoint) -> f32 {
        self.xy().distance(other.xy())
    }
}

/// Which hand the tracker says this is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandLabel {
    Left,
    Right,
}

impl HandLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandLabel::Left => "left",
            HandLabel::Right => "right",
        }
    }
}

/// One tracked hand for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandFrame {
    pub label: HandLabel,
    pub points: [LandmarkPoint; HAND_LANDMARK_COUNT],
}

impl HandFrame {
    pub fn from_points(label: HandLabel, points: [LandmarkPoint; HAND_LANDMARK_COUNT]) -> Self {
        Self { label, points }
    }

    /// Build from a tracker slice, rejecting anything that isn't a full hand
    pub fn new(label: HandLabel, points: &[LandmarkPoint]) -> Result<Self, ControlError> {
        let points: [LandmarkPoint; HAND_LANDMARK_COUNT] =
            points.try_into().map_err(|_| ControlError::LandmarkCount {
                expected: HAND_LANDMARK_COUNT,
                actual: points.len(),
            })?;
        Ok(Self { label, points })
    }

    #[inline]
    pub fn point(&self, index: usize) -> &LandmarkPoint {
        &self.points[index]
    }

    /// Palm center in normalized image space
    #[inline]
    pub fn palm_center(&self) -> Vec2 {
        self.points[PALM_CENTER].xy()
    }
}

/// Face mesh for one frame (variable point count)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FaceFrame {
    pub points: Vec<LandmarkPoint>,
}

impl FaceFrame {
    pub fn nose(&self) -> Option<Vec2> {
        self.points.get(FACE_NOSE).map(LandmarkPoint::xy)
    }
}

/// Everything the tracker produced for one captured video frame
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LandmarkFrame {
    #[serde(default)]
    pub hands: Vec<HandFrame>,
    #[serde(default)]
    pub face: Option<FaceFrame>,
}

impl LandmarkFrame {
    pub fn new(hands: Vec<HandFrame>) -> Self {
        Self { hands, face: None }
    }

    pub fn with_face(mut self, face: FaceFrame) -> Self {
        self.face = Some(face);
        self
    }

    /// First hand carrying the given label. A tracker that reports the same
    /// label twice gets its later duplicate ignored.
    pub fn hand(&self, label: HandLabel) -> Option<&HandFrame> {
        self.hands.iter().find(|h| h.label == label)
    }

    pub fn left(&self) -> Option<&HandFrame> {
        self.hand(HandLabel::Left)
    }

    pub fn right(&self) -> Option<&HandFrame> {
        self.hand(HandLabel::Right)
    }
}

/// Result of polling a landmark stream
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A new frame captured at `now_ms`
    Frame { now_ms: f64, frame: LandmarkFrame },
    /// Nothing new yet
    Pending,
    /// The stream finished normally
    Ended,
    /// The tracker gave up
    Failed(TrackerError),
}

/// Anything that can supply landmark frames
pub trait LandmarkStream {
    fn poll(&mut self) -> StreamEvent;
}

/// A pre-recorded stream, used for replay and tests
#[derive(Debug, Clone, Default)]
pub struct ScriptedStream {
    events: VecDeque<StreamEvent>,
}

impl ScriptedStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_frame(&mut self, now_ms: f64, frame: LandmarkFrame) -> &mut Self {
        self.events.push_back(StreamEvent::Frame { now_ms, frame });
        self
    }

    pub fn push_pending(&mut self) -> &mut Self {
        self.events.push_back(StreamEvent::Pending);
        self
    }

    pub fn push_failure(&mut self, error: TrackerError) -> &mut Self {
        self.events.push_back(StreamEvent::Failed(error));
        self
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl LandmarkStream for ScriptedStream {
    fn poll(&mut self) -> StreamEvent {
        self.events.pop_front().unwrap_or(StreamEvent::Ended)
    }
}
