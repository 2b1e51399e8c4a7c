//! Interaction settings and tuning
//!
//! Loaded from JSON; any field left out takes its default.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ControlError;
use crate::landmarks::{HAND_LANDMARK_COUNT, WRIST};

/// Gesture sensitivity presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Sensitivity {
    Low,
    #[default]
    Medium,
    High,
}

impl Sensitivity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sensitivity::Low => "Low",
            Sensitivity::Medium => "Medium",
            Sensitivity::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Sensitivity::Low),
            "medium" | "med" => Some(Sensitivity::Medium),
            "high" => Some(Sensitivity::High),
            _ => None,
        }
    }

    /// Multiplier on palm-to-rotation gain
    pub fn rotation_factor(&self) -> f32 {
        match self {
            Sensitivity::Low => 0.5,
            Sensitivity::Medium => 1.0,
            Sensitivity::High => 1.5,
        }
    }

    /// Horizontal palm travel needed for a swipe
    pub fn swipe_threshold(&self) -> f32 {
        match self {
            Sensitivity::Low => 0.2,
            Sensitivity::Medium => SWIPE_THRESHOLD,
            Sensitivity::High => 0.1,
        }
    }
}

/// Dispatcher thresholds and gains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchTuning {
    pub scale_dead_zone: f32,
    pub scale_gain: f32,
    pub rotation_gain: f32,
    pub swipe_threshold: f32,
    pub swipe_cooldown_ms: f64,
    pub pulse_quiet_ms: f64,
    /// Chance per qualifying tick (0.0 - 1.0)
    pub pulse_probability: f64,
    pub scene_count: usize,
    pub theme_count: usize,
}

impl Default for DispatchTuning {
    fn default() -> Self {
        Self {
            scale_dead_zone: SCALE_DEAD_ZONE,
            scale_gain: SCALE_GAIN,
            rotation_gain: ROTATION_GAIN,
            swipe_threshold: SWIPE_THRESHOLD,
            swipe_cooldown_ms: SWIPE_COOLDOWN_MS,
            pulse_quiet_ms: PULSE_QUIET_MS,
            pulse_probability: PULSE_PROBABILITY,
            scene_count: SCENE_COUNT,
            theme_count: THEME_COUNT,
        }
    }
}

/// Physics constants, all in 60 Hz frame units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    pub object_count: usize,
    pub gravity: f32,
    pub friction: f32,
    pub bounce: f32,
    pub floor_friction: f32,
    pub spin_decay: f32,
    pub hand_influence_radius: f32,
    pub hand_push: f32,
    pub throw_multiplier: f32,
    /// Landmark that stands for the palm when grabbing objects
    pub anchor_landmark: usize,
    pub min_size: f32,
    pub max_size: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            object_count: OBJECT_COUNT,
            gravity: GRAVITY,
            friction: FRICTION,
            bounce: BOUNCE,
            floor_friction: FLOOR_FRICTION,
            spin_decay: SPIN_DECAY,
            hand_influence_radius: HAND_INFLUENCE_RADIUS,
            hand_push: HAND_PUSH,
            throw_multiplier: THROW_MULTIPLIER,
            anchor_landmark: WRIST,
            min_size: 40.0,
            max_size: 60.0,
        }
    }
}

/// Top-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sensitivity: Sensitivity,
    /// Seed for object layout and pulse draws
    pub seed: u64,
    pub dispatch: DispatchTuning,
    pub physics: PhysicsTuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sensitivity: Sensitivity::Medium,
            seed: 0x5eed,
            dispatch: DispatchTuning::default(),
            physics: PhysicsTuning::default(),
        }
    }
}

impl Settings {
    /// Create settings from a sensitivity preset (applies preset defaults)
    pub fn from_preset(sensitivity: Sensitivity) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(sensitivity);
        settings
    }

    /// Apply a sensitivity preset (updates the gains it controls)
    pub fn apply_preset(&mut self, sensitivity: Sensitivity) {
        self.sensitivity = sensitivity;
        self.dispatch.rotation_gain = ROTATION_GAIN * sensitivity.rotation_factor();
        self.dispatch.swipe_threshold = sensitivity.swipe_threshold();
    }

    /// Parse and validate
    pub fn from_json(json: &str) -> Result<Self, ControlError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, ControlError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the dispatcher or physics can't run with
    pub fn validate(&self) -> Result<(), ControlError> {
        let d = &self.dispatch;
        let p = &self.physics;

        if !(0.0..=1.0).contains(&d.pulse_probability) {
            return Err(invalid(format!(
                "pulse_probability {} outside [0, 1]",
                d.pulse_probability
            )));
        }
        if d.scene_count == 0 || d.theme_count == 0 {
            return Err(invalid("scene_count and theme_count must be at least 1"));
        }
        let gains = [
            d.scale_dead_zone,
            d.scale_gain,
            d.rotation_gain,
            d.swipe_threshold,
            p.gravity,
            p.hand_influence_radius,
            p.hand_push,
            p.throw_multiplier,
        ];
        if gains.iter().any(|g| !g.is_finite() || *g < 0.0) {
            return Err(invalid("gains and thresholds must be finite and non-negative"));
        }
        for (name, window) in [
            ("swipe_cooldown_ms", d.swipe_cooldown_ms),
            ("pulse_quiet_ms", d.pulse_quiet_ms),
        ] {
            if !window.is_finite() || window < 0.0 {
                return Err(invalid(format!("{name} {window} must be finite and non-negative")));
            }
        }
        for (name, factor) in [
            ("friction", p.friction),
            ("bounce", p.bounce),
            ("floor_friction", p.floor_friction),
            ("spin_decay", p.spin_decay),
        ] {
            if !(0.0..=1.0).contains(&factor) {
                return Err(invalid(format!("{name} {factor} outside [0, 1]")));
            }
        }
        if p.anchor_landmark >= HAND_LANDMARK_COUNT {
            return Err(invalid(format!(
                "anchor_landmark {} is not a hand landmark",
                p.anchor_landmark
            )));
        }
        if !(p.min_size > 0.0 && p.min_size <= p.max_size) {
            return Err(invalid(format!(
                "object size range [{}, {}] is empty",
                p.min_size, p.max_size
            )));
        }
        Ok(())
    }

    /// Load settings from a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ControlError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load settings, falling back to defaults on any problem
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_or_default(path: impl AsRef<std::path::Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Using default settings ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }
}

fn invalid(msg: impl Into<String>) -> ControlError {
    ControlError::Settings(msg.into())
}
