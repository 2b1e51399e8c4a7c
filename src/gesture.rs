//! Per-frame gesture classification
//!
//! A hand is classified from finger extension alone. No state is carried
//! between frames; hysteresis belongs to the dispatcher.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::PINCH_THRESHOLD;
use crate::landmarks::*;

/// Discrete hand gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gesture {
    #[default]
    Idle,
    Pinch,
    Grab,
    PalmOpen,
    Point,
    Victory,
}

impl Gesture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gesture::Idle => "IDLE",
            Gesture::Pinch => "PINCH",
            Gesture::Grab => "GRAB",
            Gesture::PalmOpen => "PALM_OPEN",
            Gesture::Point => "POINT",
            Gesture::Victory => "VICTORY",
        }
    }
}

/// (tip, pip) pairs for index, middle, ring, pinky
const FINGERS: [(usize, usize); 4] = [
    (INDEX_TIP, INDEX_PIP),
    (MIDDLE_TIP, MIDDLE_PIP),
    (RING_TIP, RING_PIP),
    (PINKY_TIP, PINKY_PIP),
];

/// A finger is extended when its tip is further from the wrist than its PIP joint
#[inline]
fn is_extended(hand: &HandFrame, tip: usize, pip: usize) -> bool {
    let wrist = hand.point(WRIST);
    hand.point(tip).distance(wrist) > hand.point(pip).distance(wrist)
}

/// Classify one hand. Pinch is tested first, so a fist with thumb and index
/// touching is always a pinch.
pub fn classify(hand: &HandFrame) -> Gesture {
    let [index, middle, ring, pinky] = FINGERS.map(|(tip, pip)| is_extended(hand, tip, pip));

    let pinch_dist = hand.point(THUMB_TIP).distance(hand.point(INDEX_TIP));

    if pinch_dist < PINCH_THRESHOLD {
        return Gesture::Pinch;
    }

    match (index, middle, ring, pinky) {
        (true, true, true, true) => Gesture::PalmOpen,
        (false, false, false, false) => Gesture::Grab,
        (true, false, false, false) => Gesture::Point,
        (true, true, false, false) => Gesture::Victory,
        _ => Gesture::Idle,
    }
}

/// Horizontal finger offsets from the palm center (index..pinky).
/// Middle sits at zero so the palm center lands exactly on `center`.
const FINGER_X: [f32; 4] = [-0.03, 0.0, 0.03, 0.06];

/// Build a plausible hand whose palm center is `center` and which
/// classifies as `gesture`. Used by replay scripts and tests.
pub fn synthesize(label: HandLabel, gesture: Gesture, center: Vec2) -> HandFrame {
    let extended = match gesture {
        Gesture::PalmOpen => [true; 4],
        Gesture::Grab | Gesture::Pinch => [false; 4],
        Gesture::Point => [true, false, false, false],
        Gesture::Victory => [true, true, false, false],
        Gesture::Idle => [false, true, true, true],
    };

    let at = |offset: Vec2| {
        let p = center + offset;
        LandmarkPoint::new(p.x, p.y, 0.0)
    };

    let mut points = [LandmarkPoint::default(); HAND_LANDMARK_COUNT];
    points[WRIST] = at(Vec2::new(0.0, 0.15));

    let fingers = [
        (INDEX_MCP, INDEX_PIP, INDEX_DIP, INDEX_TIP),
        (MIDDLE_MCP, MIDDLE_PIP, MIDDLE_DIP, MIDDLE_TIP),
        (RING_MCP, RING_PIP, RING_DIP, RING_TIP),
        (PINKY_MCP, PINKY_PIP, PINKY_DIP, PINKY_TIP),
    ];
    for (i, (mcp, pip, dip, tip)) in fingers.into_iter().enumerate() {
        let fx = FINGER_X[i];
        let tip_y = if extended[i] { -0.12 } else { 0.02 };
        points[mcp] = at(Vec2::new(fx, 0.0));
        points[pip] = at(Vec2::new(fx, -0.05));
        points[dip] = at(Vec2::new(fx, (tip_y - 0.05) / 2.0));
        points[tip] = at(Vec2::new(fx, tip_y));
    }

    let thumb_tip = if gesture == Gesture::Pinch {
        points[INDEX_TIP].xy() - center + Vec2::new(-0.01, 0.0)
    } else {
        Vec2::new(-0.10, 0.0)
    };
    points[THUMB_CMC] = at(Vec2::new(-0.04, 0.11));
    points[THUMB_MCP] = at(Vec2::new(-0.07, 0.07));
    points[THUMB_IP] = at(Vec2::new(-0.09, 0.03));
    points[THUMB_TIP] = at(thumb_tip);

    HandFrame::from_points(label, points)
}
