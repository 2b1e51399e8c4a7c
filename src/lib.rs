//! Hand Control - camera-driven gesture control surface
//!
//! Core modules:
//! - `landmarks`: Tracker-facing landmark types and the stream interface
//! - `gesture`: Per-frame gesture classification (pure)
//! - `control`: Interaction dispatch, shared state and feedback events
//! - `physics`: Hand-driven 2D physics of floating objects
//! - `session`: Wires the above together with a teardown guard
//! - `settings`: Data-driven tuning

pub mod control;
pub mod error;
pub mod gesture;
pub mod landmarks;
pub mod physics;
pub mod session;
pub mod settings;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use control::{
    Command, FeedbackEvent, FeedbackSink, HandUi, InteractionDispatcher, RecordingSink, SharedState,
};
pub use error::{ControlError, TrackerError};
pub use gesture::{Gesture, classify};
pub use landmarks::{
    FaceFrame, HandFrame, HandLabel, LandmarkFrame, LandmarkPoint, LandmarkStream, ScriptedStream,
    StreamEvent,
};
pub use physics::{ObjectSnapshot, PhysicsObject, PhysicsWorld};
pub use session::{PumpStatus, Session};
pub use settings::{DispatchTuning, PhysicsTuning, Sensitivity, Settings};

/// Interaction constants
pub mod consts {
    /// Thumb-to-index distance below which a hand is pinching
    pub const PINCH_THRESHOLD: f32 = 0.05;

    /// Scale bounds
    pub const SCALE_MIN: f32 = 0.5;
    pub const SCALE_MAX: f32 = 3.0;
    pub const DEFAULT_SCALE: f32 = 1.5;
    /// Two-hand distance change ignored below this
    pub const SCALE_DEAD_ZONE: f32 = 0.01;
    pub const SCALE_GAIN: f32 = 2.0;

    /// Palm delta to rotation (radians per normalized unit)
    pub const ROTATION_GAIN: f32 = 8.0;

    /// Horizontal palm delta that counts as a swipe
    pub const SWIPE_THRESHOLD: f32 = 0.15;
    pub const SWIPE_COOLDOWN_MS: f64 = 1000.0;

    /// Open palm must be still this long after a swipe before pulsing
    pub const PULSE_QUIET_MS: f64 = 500.0;
    pub const PULSE_PROBABILITY: f64 = 0.10;

    pub const SCENE_COUNT: usize = 3;
    pub const THEME_COUNT: usize = 4;

    /// Physics runs in 60 Hz frame units
    pub const FRAME_RATE: f32 = 60.0;
    pub const FRAME_DT: f32 = 1.0 / FRAME_RATE;
    /// Largest frame multiple a single tick may integrate
    pub const MAX_STEP_SCALE: f32 = 4.0;

    pub const GRAVITY: f32 = 0.5;
    pub const FRICTION: f32 = 0.98;
    pub const BOUNCE: f32 = 0.7;
    pub const FLOOR_FRICTION: f32 = 0.9;
    pub const SPIN_DECAY: f32 = 0.99;
    /// Wall bounce converts horizontal speed to spin by this factor
    pub const SPIN_FROM_VX: f32 = 0.02;
    pub const COLLISION_SPIN: f32 = 0.1;

    /// Palms push free objects within this radius (pixels)
    pub const HAND_INFLUENCE_RADIUS: f32 = 100.0;
    pub const HAND_PUSH: f32 = 2.0;
    pub const THROW_MULTIPLIER: f32 = 1.5;

    pub const OBJECT_COUNT: usize = 10;

    /// HUD parallax from face position
    pub const PARALLAX_RANGE: f32 = 30.0;
    pub const PARALLAX_SMOOTHING: f32 = 0.1;
}

/// Wrap `index + step` into `[0, count)`
#[inline]
pub fn wrap_index(index: usize, step: isize, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    (index as isize + step).rem_euclid(count as isize) as usize
}
