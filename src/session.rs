//! Session wiring
//!
//! Owns the dispatcher, the shared state, the physics world, the feedback
//! sink and the pulse RNG. Two entry points are driven on the caller's
//! schedule: `on_landmarks` whenever the tracker delivers a frame and
//! `on_frame` once per render frame. The physics tick reads the palm
//! positions cached by the latest landmark frame, so it can lag the
//! dispatcher by at most one tracker frame.
//!
//! Commands applied by `pump` stay in the state's log until `drain_commands`
//! (or the next `on_landmarks`) takes them.
//!
//! After `shutdown` both entry points return `None` and nothing is emitted.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::control::{
    Command, DispatchInput, FeedbackEvent, FeedbackSink, HandUi, InteractionDispatcher, LogSink,
    SharedState,
};
use crate::error::ControlError;
use crate::landmarks::{HandFrame, HandLabel, LandmarkFrame, LandmarkStream, StreamEvent};
use crate::physics::{ObjectSnapshot, PhysicsWorld};
use crate::settings::Settings;

/// Outcome of draining a landmark stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpStatus {
    /// Processed this many frames; more may come later
    Waiting { frames: usize },
    /// The stream is over (ended or failed); the session runs on without hands
    Closed { frames: usize },
    /// The session has been shut down
    Inactive,
}

pub struct Session<F: FeedbackSink = LogSink> {
    settings: Settings,
    dispatcher: InteractionDispatcher,
    state: SharedState,
    world: PhysicsWorld,
    feedback: F,
    rng: Pcg32,
    /// Canvas size in pixels
    bounds: Vec2,
    /// Latest palm anchors in normalized space
    left_palm: Option<Vec2>,
    right_palm: Option<Vec2>,
    /// A landmark frame arrived since the last physics tick
    palms_fresh: bool,
    stream_closed: bool,
    active: bool,
}

impl Session<LogSink> {
    pub fn with_defaults(bounds: Vec2) -> Self {
        let settings = Settings::default();
        Self::build(settings, bounds, LogSink)
    }
}

impl<F: FeedbackSink> Session<F> {
    /// Validates the settings, then seeds the world and the pulse RNG
    pub fn new(settings: Settings, bounds: Vec2, feedback: F) -> Result<Self, ControlError> {
        settings.validate()?;
        Ok(Self::build(settings, bounds, feedback))
    }

    fn build(settings: Settings, bounds: Vec2, feedback: F) -> Self {
        let state = SharedState::new(settings.dispatch.scene_count, settings.dispatch.theme_count);
        let world = PhysicsWorld::seeded(settings.seed, bounds, settings.physics.clone());
        // Separate stream from the world layout so tuning object_count doesn't shift pulses
        let rng = Pcg32::seed_from_u64(settings.seed.wrapping_add(1));
        log::info!(
            "Session started (seed {}, sensitivity {})",
            settings.seed,
            settings.sensitivity.as_str()
        );
        Self {
            dispatcher: InteractionDispatcher::new(settings.dispatch.clone()),
            settings,
            state,
            world,
            feedback,
            rng,
            bounds,
            left_palm: None,
            right_palm: None,
            palms_fresh: false,
            stream_closed: false,
            active: true,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn dispatcher(&self) -> &InteractionDispatcher {
        &self.dispatcher
    }

    pub fn feedback(&self) -> &F {
        &self.feedback
    }

    pub fn feedback_mut(&mut self) -> &mut F {
        &mut self.feedback
    }

    /// Palm anchors in canvas pixels, as the physics tick will see them
    pub fn palms_px(&self) -> (Option<Vec2>, Option<Vec2>) {
        (
            self.left_palm.map(|p| p * self.bounds),
            self.right_palm.map(|p| p * self.bounds),
        )
    }

    /// Classify and dispatch one tracker frame. Returns every command applied
    /// since the last drain, this frame's last.
    pub fn on_landmarks(&mut self, now_ms: f64, frame: &LandmarkFrame) -> Option<Vec<Command>> {
        if !self.active {
            return None;
        }
        self.apply_landmarks(now_ms, frame);
        Some(self.state.drain_commands())
    }

    /// Take the commands applied since the last drain
    pub fn drain_commands(&mut self) -> Option<Vec<Command>> {
        if !self.active {
            return None;
        }
        Some(self.state.drain_commands())
    }

    fn apply_landmarks(&mut self, now_ms: f64, frame: &LandmarkFrame) {
        let input = DispatchInput::from_frame(now_ms, frame);
        self.dispatcher
            .tick(&input, &mut self.state, &mut self.feedback, &mut self.rng);

        let anchor = self.settings.physics.anchor_landmark;
        let palm = |hand: Option<&HandFrame>| hand.map(|h| h.point(anchor).xy());
        self.left_palm = palm(frame.left());
        self.right_palm = palm(frame.right());
        self.palms_fresh = true;

        if let Some(nose) = frame.face.as_ref().and_then(|f| f.nose()) {
            self.state.track_face(nose);
        }
    }

    /// Advance physics by `dt` seconds on the latest palm positions. Render
    /// frames that reuse an already-seen landmark frame hold the throw
    /// baseline, so a release still carries the hand's last real motion.
    pub fn on_frame(&mut self, dt: f32) -> Option<Vec<ObjectSnapshot>> {
        if !self.active {
            return None;
        }
        let (left, right) = self.palms_px();
        let fresh = std::mem::take(&mut self.palms_fresh);
        Some(self.world.step(dt, self.bounds, left, right, fresh))
    }

    /// Canvas resized: re-seed bounds, keep objects
    pub fn resize(&mut self, bounds: Vec2) {
        self.bounds = bounds;
        self.world.resize(bounds);
    }

    /// Process every frame the stream has ready
    pub fn pump(&mut self, stream: &mut dyn LandmarkStream) -> PumpStatus {
        let mut frames = 0;
        loop {
            if !self.active {
                return PumpStatus::Inactive;
            }
            if self.stream_closed {
                return PumpStatus::Closed { frames };
            }
            match stream.poll() {
                StreamEvent::Frame { now_ms, frame } => {
                    self.apply_landmarks(now_ms, &frame);
                    frames += 1;
                }
                StreamEvent::Pending => return PumpStatus::Waiting { frames },
                StreamEvent::Ended => {
                    log::info!("Landmark stream ended");
                    self.close_stream();
                }
                StreamEvent::Failed(e) => {
                    log::warn!("Landmark stream failed: {}", e);
                    self.feedback.notify(FeedbackEvent::Error);
                    self.close_stream();
                }
            }
        }
    }

    /// Hands vanish for good; everything else keeps running
    fn close_stream(&mut self) {
        self.stream_closed = true;
        self.left_palm = None;
        self.right_palm = None;
        self.palms_fresh = true;
        self.dispatcher.reset();
        self.world.clear_hands();
        for hand in [HandLabel::Left, HandLabel::Right] {
            let ui = HandUi {
                visible: false,
                ..*self.state.hand_ui(hand)
            };
            self.state.set_hand_ui(hand, ui);
        }
    }

    /// Stop accepting frames and ticks. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.active {
            self.active = false;
            self.state.drain_commands();
            log::info!("Session shut down");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::RecordingSink;
    use crate::error::TrackerError;
    use crate::gesture::{Gesture, synthesize};
    use crate::landmarks::{FaceFrame, LandmarkPoint, ScriptedStream};

    const BOUNDS: Vec2 = Vec2::new(1280.0, 720.0);

    fn session() -> Session<RecordingSink> {
        Session::new(Settings::default(), BOUNDS, RecordingSink::new()).unwrap()
    }

    fn frame(hands: Vec<HandFrame>) -> LandmarkFrame {
        LandmarkFrame::new(hands)
    }

    #[test]
    fn test_rejects_invalid_settings() {
        let mut settings = Settings::default();
        settings.dispatch.scene_count = 0;
        assert!(Session::new(settings, BOUNDS, RecordingSink::new()).is_err());
    }

    #[test]
    fn test_landmarks_drive_commands() {
        let mut s = session();
        let grab = |x| synthesize(HandLabel::Right, Gesture::Grab, Vec2::new(x, 0.5));
        s.on_landmarks(0.0, &frame(vec![grab(0.4)])).unwrap();
        let cmds = s.on_landmarks(33.0, &frame(vec![grab(0.5)])).unwrap();
        assert!(cmds.iter().any(|c| matches!(c, Command::SetRotation { .. })));
        assert!((s.state().rotation().y - 0.8).abs() < 1e-4);
        assert_eq!(s.feedback().events, vec![FeedbackEvent::Engage]);
    }

    #[test]
    fn test_palm_anchor_scaled_to_canvas() {
        let mut s = session();
        let hand = synthesize(HandLabel::Left, Gesture::PalmOpen, Vec2::new(0.5, 0.5));
        s.on_landmarks(0.0, &frame(vec![hand.clone()])).unwrap();
        let (left, right) = s.palms_px();
        let wrist = hand.point(crate::landmarks::WRIST).xy();
        assert_eq!(left, Some(wrist * BOUNDS));
        assert!(right.is_none());
    }

    #[test]
    fn test_face_moves_hud() {
        let mut s = session();
        let mut points = vec![LandmarkPoint::default(); 5];
        points[1] = LandmarkPoint::new(0.0, 0.5, 0.0);
        let face = FaceFrame { points };
        s.on_landmarks(0.0, &frame(vec![]).with_face(face)).unwrap();
        assert!(s.state().hud_offset().x > 0.0);
    }

    #[test]
    fn test_shutdown_silences_everything() {
        let mut s = session();
        s.shutdown();
        s.shutdown();
        assert!(!s.is_active());
        let hand = synthesize(HandLabel::Left, Gesture::Victory, Vec2::new(0.5, 0.5));
        assert!(s.on_landmarks(0.0, &frame(vec![hand])).is_none());
        assert!(s.on_frame(1.0 / 60.0).is_none());
        assert!(s.feedback().events.is_empty());
        assert_eq!(s.state().theme(), 0);

        let mut stream = ScriptedStream::new();
        stream.push_failure(TrackerError::PermissionDenied);
        assert_eq!(s.pump(&mut stream), PumpStatus::Inactive);
        assert_eq!(stream.remaining(), 1);
    }

    #[test]
    fn test_pump_until_pending() {
        let mut s = session();
        let mut stream = ScriptedStream::new();
        let palm = synthesize(HandLabel::Right, Gesture::Point, Vec2::new(0.5, 0.5));
        stream
            .push_frame(0.0, frame(vec![palm.clone()]))
            .push_frame(33.0, frame(vec![palm]))
            .push_pending()
            .push_frame(66.0, frame(vec![]));
        assert_eq!(s.pump(&mut stream), PumpStatus::Waiting { frames: 2 });
        assert_eq!(s.pump(&mut stream), PumpStatus::Closed { frames: 1 });
        // Closed streams are not polled again
        assert_eq!(s.pump(&mut stream), PumpStatus::Closed { frames: 0 });
    }

    #[test]
    fn test_pump_leaves_commands_for_the_caller() {
        let mut s = session();
        let mut stream = ScriptedStream::new();
        let victory = synthesize(HandLabel::Left, Gesture::Victory, Vec2::new(0.3, 0.5));
        stream
            .push_frame(0.0, frame(vec![victory]))
            .push_failure(TrackerError::PermissionDenied);
        assert_eq!(s.pump(&mut stream), PumpStatus::Closed { frames: 1 });

        let cmds = s.drain_commands().unwrap();
        assert!(cmds.contains(&Command::CycleTheme));
        let last_left = cmds.iter().rev().find_map(|c| match c {
            Command::SetHandUi {
                hand: HandLabel::Left,
                ui,
            } => Some(*ui),
            _ => None,
        });
        assert_eq!(last_left.map(|ui| ui.visible), Some(false));
        assert_eq!(s.drain_commands(), Some(vec![]));
    }

    #[test]
    fn test_pumped_commands_reach_next_landmark_drain() {
        let mut s = session();
        let mut stream = ScriptedStream::new();
        let victory = synthesize(HandLabel::Left, Gesture::Victory, Vec2::new(0.3, 0.5));
        stream.push_frame(0.0, frame(vec![victory])).push_pending();
        s.pump(&mut stream);
        let cmds = s.on_landmarks(33.0, &frame(vec![])).unwrap();
        assert_eq!(cmds.first(), Some(&Command::SetHandUi {
            hand: HandLabel::Left,
            ui: HandUi {
                visible: true,
                ..*s.state().hand_ui(HandLabel::Left)
            },
        }));
        assert!(cmds.contains(&Command::CycleTheme));
    }

    #[test]
    fn test_shutdown_discards_pending_commands() {
        let mut s = session();
        let mut stream = ScriptedStream::new();
        let victory = synthesize(HandLabel::Left, Gesture::Victory, Vec2::new(0.3, 0.5));
        stream.push_frame(0.0, frame(vec![victory])).push_pending();
        s.pump(&mut stream);
        s.shutdown();
        assert!(s.drain_commands().is_none());
    }

    #[test]
    fn test_tracker_failure_degrades_gracefully() {
        let mut s = session();
        let mut stream = ScriptedStream::new();
        let hand = synthesize(HandLabel::Right, Gesture::Grab, Vec2::new(0.5, 0.5));
        stream
            .push_frame(0.0, frame(vec![hand]))
            .push_failure(TrackerError::Unavailable("camera unplugged".into()));
        assert_eq!(s.pump(&mut stream), PumpStatus::Closed { frames: 1 });
        assert_eq!(
            s.feedback().events,
            vec![FeedbackEvent::Engage, FeedbackEvent::Error]
        );
        assert!(!s.state().hand_ui(HandLabel::Right).visible);
        assert_eq!(s.palms_px(), (None, None));

        // Physics keeps running with no hands
        for _ in 0..10 {
            let snap = s.on_frame(1.0 / 60.0).unwrap();
            assert!(snap.iter().all(|o| !o.grabbed));
        }
    }

    #[test]
    fn test_pulses_are_deterministic_per_seed() {
        let run = || {
            let mut s = session();
            let palm = synthesize(HandLabel::Right, Gesture::PalmOpen, Vec2::new(0.5, 0.5));
            for i in 0..200 {
                s.on_landmarks(i as f64 * 33.0, &frame(vec![palm.clone()]));
            }
            s.state().pulse_count()
        };
        let first = run();
        assert_eq!(first, run());
        // 10% of 200 draws; loose bounds
        assert!((5..=40).contains(&first), "pulses: {first}");
    }

    #[test]
    fn test_resize_keeps_objects() {
        let mut s = session();
        s.resize(Vec2::new(640.0, 480.0));
        assert_eq!(s.world().objects().len(), 10);
        assert_eq!(s.world().bounds(), Vec2::new(640.0, 480.0));
    }
}
