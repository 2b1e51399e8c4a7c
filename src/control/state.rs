//! Shared control state
//!
//! The one place rendering and the HUD read from. It is owned by the session
//! and handed to the dispatcher each tick; every change goes through a setter
//! so the scale, scene and theme ranges can't be broken from outside.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ControlError;
use crate::gesture::Gesture;
use crate::landmarks::HandLabel;
use crate::wrap_index;

/// Per-hand overlay data (the repulsor cursor)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HandUi {
    pub visible: bool,
    pub x: f32,
    pub y: f32,
    pub gesture: Gesture,
}

/// A state change, recorded in the order it was applied
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    SetRotation { x: f32, y: f32 },
    SetScale { value: f32 },
    NextScene,
    PrevScene,
    CycleTheme,
    TriggerPulse,
    SetHandUi { hand: HandLabel, ui: HandUi },
}

/// Deserialization goes through `SharedStateRepr` so out-of-range values are rejected
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SharedStateRepr")]
pub struct SharedState {
    rotation: Vec2,
    scale: f32,
    scene: usize,
    scene_count: usize,
    theme: usize,
    theme_count: usize,
    /// Total pulses fired this session
    pulse_count: u64,
    left_ui: HandUi,
    right_ui: HandUi,
    left_gesture: Gesture,
    right_gesture: Gesture,
    /// HUD parallax offset driven by head position (pixels)
    hud_offset: Vec2,
    /// Commands applied since the last drain
    #[serde(skip)]
    commands: Vec<Command>,
}

/// Wire form of `SharedState`, checked before it becomes one
#[derive(Deserialize)]
struct SharedStateRepr {
    rotation: Vec2,
    scale: f32,
    scene: usize,
    scene_count: usize,
    theme: usize,
    theme_count: usize,
    pulse_count: u64,
    left_ui: HandUi,
    right_ui: HandUi,
    left_gesture: Gesture,
    right_gesture: Gesture,
    hud_offset: Vec2,
}

impl TryFrom<SharedStateRepr> for SharedState {
    type Error = ControlError;

    fn try_from(repr: SharedStateRepr) -> Result<Self, Self::Error> {
        if !(SCALE_MIN..=SCALE_MAX).contains(&repr.scale) {
            return Err(ControlError::State(format!(
                "scale {} outside [{SCALE_MIN}, {SCALE_MAX}]",
                repr.scale
            )));
        }
        if repr.scene >= repr.scene_count || repr.theme >= repr.theme_count {
            return Err(ControlError::State(format!(
                "scene {}/{} or theme {}/{} out of range",
                repr.scene, repr.scene_count, repr.theme, repr.theme_count
            )));
        }
        if !repr.rotation.is_finite() || !repr.hud_offset.is_finite() {
            return Err(ControlError::State("rotation and HUD offset must be finite".into()));
        }
        Ok(Self {
            rotation: repr.rotation,
            scale: repr.scale,
            scene: repr.scene,
            scene_count: repr.scene_count,
            theme: repr.theme,
            theme_count: repr.theme_count,
            pulse_count: repr.pulse_count,
            left_ui: repr.left_ui,
            right_ui: repr.right_ui,
            left_gesture: repr.left_gesture,
            right_gesture: repr.right_gesture,
            hud_offset: repr.hud_offset,
            commands: Vec::new(),
        })
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new(SCENE_COUNT, THEME_COUNT)
    }
}

impl SharedState {
    /// Counts below one are raised to one so the index ranges stay non-empty
    pub fn new(scene_count: usize, theme_count: usize) -> Self {
        Self {
            rotation: Vec2::ZERO,
            scale: DEFAULT_SCALE,
            scene: 0,
            scene_count: scene_count.max(1),
            theme: 0,
            theme_count: theme_count.max(1),
            pulse_count: 0,
            left_ui: HandUi::default(),
            right_ui: HandUi::default(),
            left_gesture: Gesture::Idle,
            right_gesture: Gesture::Idle,
            hud_offset: Vec2::ZERO,
            commands: Vec::new(),
        }
    }

    pub fn rotation(&self) -> Vec2 {
        self.rotation
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn scene(&self) -> usize {
        self.scene
    }

    pub fn scene_count(&self) -> usize {
        self.scene_count
    }

    pub fn theme(&self) -> usize {
        self.theme
    }

    pub fn theme_count(&self) -> usize {
        self.theme_count
    }

    pub fn pulse_count(&self) -> u64 {
        self.pulse_count
    }

    pub fn hand_ui(&self, hand: HandLabel) -> &HandUi {
        match hand {
            HandLabel::Left => &self.left_ui,
            HandLabel::Right => &self.right_ui,
        }
    }

    pub fn gestures(&self) -> (Gesture, Gesture) {
        (self.left_gesture, self.right_gesture)
    }

    pub fn hud_offset(&self) -> Vec2 {
        self.hud_offset
    }

    pub fn set_rotation(&mut self, x: f32, y: f32) {
        self.rotation = Vec2::new(x, y);
        self.commands.push(Command::SetRotation { x, y });
    }

    /// Clamped to [SCALE_MIN, SCALE_MAX] before it is stored
    pub fn set_scale(&mut self, value: f32) {
        let value = value.clamp(SCALE_MIN, SCALE_MAX);
        self.scale = value;
        self.commands.push(Command::SetScale { value });
    }

    pub fn next_scene(&mut self) {
        self.scene = wrap_index(self.scene, 1, self.scene_count);
        log::debug!("Scene -> {}", self.scene);
        self.commands.push(Command::NextScene);
    }

    pub fn prev_scene(&mut self) {
        self.scene = wrap_index(self.scene, -1, self.scene_count);
        log::debug!("Scene -> {}", self.scene);
        self.commands.push(Command::PrevScene);
    }

    pub fn cycle_theme(&mut self) {
        self.theme = wrap_index(self.theme, 1, self.theme_count);
        log::debug!("Theme -> {}", self.theme);
        self.commands.push(Command::CycleTheme);
    }

    pub fn trigger_pulse(&mut self) {
        self.pulse_count += 1;
        log::debug!("Pulse #{}", self.pulse_count);
        self.commands.push(Command::TriggerPulse);
    }

    /// Only records a command when the overlay actually changes
    pub fn set_hand_ui(&mut self, hand: HandLabel, ui: HandUi) {
        let slot = match hand {
            HandLabel::Left => &mut self.left_ui,
            HandLabel::Right => &mut self.right_ui,
        };
        if *slot != ui {
            *slot = ui;
            self.commands.push(Command::SetHandUi { hand, ui });
        }
    }

    pub fn set_gestures(&mut self, left: Gesture, right: Gesture) {
        self.left_gesture = left;
        self.right_gesture = right;
    }

    /// Ease the HUD offset toward the head position (nose in normalized space)
    pub fn track_face(&mut self, nose: Vec2) {
        let target = (nose - Vec2::splat(0.5)) * -PARALLAX_RANGE;
        self.hud_offset += (target - self.hud_offset) * PARALLAX_SMOOTHING;
    }

    /// Take every command applied since the last call
    pub fn drain_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }
}
