//! Browser facade
//!
//! JS owns the camera, the tracker and the renderer. It feeds tracker output
//! in as JSON and reads state, commands and object snapshots back as JSON.

use glam::Vec2;
use wasm_bindgen::prelude::*;

use crate::control::RecordingSink;
use crate::landmarks::LandmarkFrame;
use crate::session::Session;
use crate::settings::Settings;

fn js_err(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

#[wasm_bindgen]
pub struct HandControl {
    session: Session<RecordingSink>,
}

#[wasm_bindgen]
impl HandControl {
    /// `settings_json` may be empty for defaults
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32, settings_json: &str) -> Result<HandControl, JsError> {
        console_error_panic_hook::set_once();
        // Already initialized when a second instance is created
        let _ = console_log::init_with_level(log::Level::Info);

        let settings = if settings_json.trim().is_empty() {
            Settings::default()
        } else {
            Settings::from_json(settings_json).map_err(js_err)?
        };
        let session = Session::new(settings, Vec2::new(width, height), RecordingSink::new())
            .map_err(js_err)?;
        Ok(HandControl { session })
    }

    /// Feed one tracker frame. Returns the applied commands as a JSON array,
    /// or `null` after shutdown.
    #[wasm_bindgen(js_name = onLandmarks)]
    pub fn on_landmarks(&mut self, frame_json: &str) -> Result<Option<String>, JsError> {
        let frame: LandmarkFrame = serde_json::from_str(frame_json).map_err(js_err)?;
        let now_ms = js_sys::Date::now();
        match self.session.on_landmarks(now_ms, &frame) {
            Some(commands) => Ok(Some(serde_json::to_string(&commands).map_err(js_err)?)),
            None => Ok(None),
        }
    }

    /// Advance physics by `dt` seconds. Returns object snapshots as JSON,
    /// or `null` once shut down so the render loop can stop rescheduling.
    #[wasm_bindgen(js_name = onFrame)]
    pub fn on_frame(&mut self, dt: f32) -> Result<Option<String>, JsError> {
        match self.session.on_frame(dt) {
            Some(snapshot) => Ok(Some(serde_json::to_string(&snapshot).map_err(js_err)?)),
            None => Ok(None),
        }
    }

    /// The tracker could not start or died. Returns the commands that hid the
    /// hand overlays, or `null` after shutdown.
    #[wasm_bindgen(js_name = trackerFailed)]
    pub fn tracker_failed(&mut self, reason: &str) -> Result<Option<String>, JsError> {
        let mut stream = crate::landmarks::ScriptedStream::new();
        stream.push_failure(crate::error::TrackerError::Unavailable(reason.to_string()));
        self.session.pump(&mut stream);
        match self.session.drain_commands() {
            Some(commands) => Ok(Some(serde_json::to_string(&commands).map_err(js_err)?)),
            None => Ok(None),
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.session.resize(Vec2::new(width, height));
    }

    /// Shared state (rotation, scale, scene, theme, overlays) as JSON
    pub fn state(&self) -> Result<String, JsError> {
        serde_json::to_string(self.session.state()).map_err(js_err)
    }

    /// Feedback cues since the last call, as a JSON array of names
    #[wasm_bindgen(js_name = takeFeedback)]
    pub fn take_feedback(&mut self) -> Result<String, JsError> {
        let events = self.session.feedback_mut().take();
        serde_json::to_string(&events).map_err(js_err)
    }

    pub fn shutdown(&mut self) {
        self.session.shutdown();
    }

    #[wasm_bindgen(js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.session.is_active()
    }
}
