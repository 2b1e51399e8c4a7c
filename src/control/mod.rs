//! Interaction control
//!
//! Gestures in, commands and feedback out:
//! - `dispatcher`: hysteresis and the gesture rules
//! - `state`: the shared store rendering and the HUD read
//! - `feedback`: audio/visual cue events

pub mod dispatcher;
pub mod feedback;
pub mod state;

pub use dispatcher::{DispatchInput, HandDispatchState, InteractionDispatcher};
pub use feedback::{FeedbackEvent, FeedbackSink, LogSink, RecordingSink};
pub use state::{Command, HandUi, SharedState};
