//! Error types
//!
//! Absence of a hand or face is never an error; these cover construction,
//! configuration and the tracker boundary only.

use thiserror::Error;

/// Errors raised while building inputs or loading settings
#[derive(Error, Debug)]
pub enum ControlError {
    #[error("Wrong landmark count: expected {expected}, got {actual}")]
    LandmarkCount { expected: usize, actual: usize },

    #[error("Invalid settings: {0}")]
    Settings(String),

    #[error("Invalid control state: {0}")]
    State(String),

    #[error("Settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings file: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures reported by the external landmark tracker
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("Tracker unavailable: {0}")]
    Unavailable(String),
}
