//! Gesture-to-command dispatch
//!
//! Turns per-frame gestures and palm motion into commands on [`SharedState`].
//! Everything that needs memory across frames (previous gestures, the
//! tracked palm baseline, the two-hand distance, the swipe cooldown) lives
//! here and nowhere else.
//!
//! Rotation and swipe deliberately share one baseline register: whichever of
//! the two is active this tick writes the palm position the next tick diffs
//! against. The swipe rule runs first, and the register is only cleared when
//! neither rule is tracking a hand.

use glam::Vec2;
use rand::Rng;

use super::feedback::{FeedbackEvent, FeedbackSink};
use super::state::{HandUi, SharedState};
use crate::gesture::{Gesture, classify};
use crate::landmarks::{HandFrame, HandLabel, INDEX_TIP, LandmarkFrame};
use crate::settings::DispatchTuning;

/// One tick of dispatcher input. An absent hand always counts as idle.
#[derive(Debug, Clone, Copy)]
pub struct DispatchInput<'a> {
    pub now_ms: f64,
    pub left: Option<&'a HandFrame>,
    pub left_gesture: Gesture,
    pub right: Option<&'a HandFrame>,
    pub right_gesture: Gesture,
}

impl<'a> DispatchInput<'a> {
    /// Classify whatever hands the frame carries
    pub fn from_frame(now_ms: f64, frame: &'a LandmarkFrame) -> Self {
        let left = frame.left();
        let right = frame.right();
        Self {
            now_ms,
            left,
            left_gesture: left.map_or(Gesture::Idle, classify),
            right,
            right_gesture: right.map_or(Gesture::Idle, classify),
        }
    }

    /// Both hands missing
    pub fn empty(now_ms: f64) -> Self {
        Self {
            now_ms,
            left: None,
            left_gesture: Gesture::Idle,
            right: None,
            right_gesture: Gesture::Idle,
        }
    }

    fn gesture(&self, hand: HandLabel) -> Gesture {
        match hand {
            HandLabel::Left => self.left.map_or(Gesture::Idle, |_| self.left_gesture),
            HandLabel::Right => self.right.map_or(Gesture::Idle, |_| self.right_gesture),
        }
    }

    fn frame(&self, hand: HandLabel) -> Option<&'a HandFrame> {
        match hand {
            HandLabel::Left => self.left,
            HandLabel::Right => self.right,
        }
    }
}

/// Per-hand memory for edge detection
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HandDispatchState {
    pub prev_gesture: Gesture,
}

#[derive(Debug, Clone)]
pub struct InteractionDispatcher {
    tuning: DispatchTuning,
    left: HandDispatchState,
    right: HandDispatchState,
    /// Palm position from the last tick that tracked one (rotation or swipe)
    tracked_centroid: Option<Vec2>,
    /// Index-tip distance from the last two-hand tick
    prev_pinch_dist: Option<f32>,
    last_swipe_ms: Option<f64>,
}

impl Default for InteractionDispatcher {
    fn default() -> Self {
        Self::new(DispatchTuning::default())
    }
}

impl InteractionDispatcher {
    pub fn new(tuning: DispatchTuning) -> Self {
        Self {
            tuning,
            left: HandDispatchState::default(),
            right: HandDispatchState::default(),
            tracked_centroid: None,
            prev_pinch_dist: None,
            last_swipe_ms: None,
        }
    }

    pub fn tuning(&self) -> &DispatchTuning {
        &self.tuning
    }

    pub fn hand_state(&self, hand: HandLabel) -> &HandDispatchState {
        match hand {
            HandLabel::Left => &self.left,
            HandLabel::Right => &self.right,
        }
    }

    pub fn tracked_centroid(&self) -> Option<Vec2> {
        self.tracked_centroid
    }

    /// Forget all hysteresis (as if every hand had just left)
    pub fn reset(&mut self) {
        self.left = HandDispatchState::default();
        self.right = HandDispatchState::default();
        self.tracked_centroid = None;
        self.prev_pinch_dist = None;
        self.last_swipe_ms = None;
    }

    /// Process one landmark frame's worth of hands
    pub fn tick<R: Rng>(
        &mut self,
        input: &DispatchInput<'_>,
        state: &mut SharedState,
        feedback: &mut dyn FeedbackSink,
        rng: &mut R,
    ) {
        let left_gesture = input.gesture(HandLabel::Left);
        let right_gesture = input.gesture(HandLabel::Right);

        self.update_hand_ui(input, state);
        state.set_gestures(left_gesture, right_gesture);

        for (prev, gesture) in [
            (self.left.prev_gesture, left_gesture),
            (self.right.prev_gesture, right_gesture),
        ] {
            if gesture != prev && gesture != Gesture::Idle {
                feedback.notify(if gesture == Gesture::Grab {
                    FeedbackEvent::Engage
                } else {
                    FeedbackEvent::Select
                });
            }
        }

        self.apply_scale(input, state);
        let swiping = self.apply_swipe(input, state, feedback);
        self.apply_rotation(input, state, swiping);

        if left_gesture == Gesture::Victory && self.left.prev_gesture != Gesture::Victory {
            state.cycle_theme();
            feedback.notify(FeedbackEvent::Select);
        }

        let palm_open = left_gesture == Gesture::PalmOpen || right_gesture == Gesture::PalmOpen;
        if palm_open && self.swipe_quiet_for(input.now_ms, self.tuning.pulse_quiet_ms) {
            // One draw per qualifying tick
            let roll: f64 = rng.random();
            if roll < self.tuning.pulse_probability {
                state.trigger_pulse();
            }
        }

        self.left.prev_gesture = left_gesture;
        self.right.prev_gesture = right_gesture;
    }

    fn update_hand_ui(&self, input: &DispatchInput<'_>, state: &mut SharedState) {
        for hand in [HandLabel::Left, HandLabel::Right] {
            let ui = match input.frame(hand) {
                Some(frame) => {
                    let palm = frame.palm_center();
                    HandUi {
                        visible: true,
                        x: palm.x,
                        y: palm.y,
                        gesture: input.gesture(hand),
                    }
                }
                // Keep the last position so the overlay can fade out in place
                None => HandUi {
                    visible: false,
                    ..*state.hand_ui(hand)
                },
            };
            state.set_hand_ui(hand, ui);
        }
    }

    /// Two-hand spread scales the scene
    fn apply_scale(&mut self, input: &DispatchInput<'_>, state: &mut SharedState) {
        let (Some(left), Some(right)) = (input.left, input.right) else {
            self.prev_pinch_dist = None;
            return;
        };

        let dist = left.point(INDEX_TIP).distance(right.point(INDEX_TIP));
        if let Some(prev) = self.prev_pinch_dist {
            let delta = dist - prev;
            if delta.abs() > self.tuning.scale_dead_zone {
                state.set_scale(state.scale() + delta * self.tuning.scale_gain);
            }
        }
        self.prev_pinch_dist = Some(dist);
    }

    /// Open-palm horizontal flick changes scene. Returns whether the swipe
    /// hand is tracking this tick.
    fn apply_swipe(
        &mut self,
        input: &DispatchInput<'_>,
        state: &mut SharedState,
        feedback: &mut dyn FeedbackSink,
    ) -> bool {
        let swipe_hand = if input.right.is_some() {
            HandLabel::Right
        } else {
            HandLabel::Left
        };
        let Some(frame) = input.frame(swipe_hand) else {
            return false;
        };
        if input.gesture(swipe_hand) != Gesture::PalmOpen {
            return false;
        }

        let centroid = frame.palm_center();
        if let Some(prev) = self.tracked_centroid {
            let dx = centroid.x - prev.x;
            if dx.abs() > self.tuning.swipe_threshold
                && self.swipe_quiet_for(input.now_ms, self.tuning.swipe_cooldown_ms)
            {
                // Hand moving right-to-left in image space advances
                if dx < 0.0 {
                    state.next_scene();
                } else {
                    state.prev_scene();
                }
                feedback.notify(FeedbackEvent::Hover);
                self.last_swipe_ms = Some(input.now_ms);
            }
        }
        self.tracked_centroid = Some(centroid);
        true
    }

    /// A closed fist drags rotation, right hand first
    fn apply_rotation(&mut self, input: &DispatchInput<'_>, state: &mut SharedState, swiping: bool) {
        let active = [HandLabel::Right, HandLabel::Left]
            .into_iter()
            .find(|&hand| input.gesture(hand) == Gesture::Grab)
            .and_then(|hand| input.frame(hand));

        let Some(frame) = active else {
            if !swiping {
                self.tracked_centroid = None;
            }
            return;
        };

        let centroid = frame.palm_center();
        if let Some(prev) = self.tracked_centroid {
            let delta = centroid - prev;
            let gain = self.tuning.rotation_gain;
            let rotation = state.rotation();
            state.set_rotation(rotation.x + delta.y * gain, rotation.y + delta.x * gain);
        }
        self.tracked_centroid = Some(centroid);
    }

    fn swipe_quiet_for(&self, now_ms: f64, window_ms: f64) -> bool {
        self.last_swipe_ms.is_none_or(|last| now_ms - last > window_ms)
    }
}
