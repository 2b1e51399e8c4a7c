//! Hand Control entry point
//!
//! The browser build is driven from JS through the library's `HandControl`
//! facade. Natively this runs a scripted, headless session and logs what it
//! did, which is handy for tuning settings files.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Hand Control (native) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => hand_control::Settings::load_or_default(path),
        None => hand_control::Settings::default(),
    };
    demo::run(settings);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is the HandControl facade, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use glam::Vec2;
    use hand_control::gesture::synthesize;
    use hand_control::{
        Gesture, HandFrame, HandLabel, LandmarkFrame, ScriptedStream, Session, Settings,
    };

    const CANVAS: Vec2 = Vec2::new(1280.0, 720.0);
    /// Tracker runs at ~30 Hz, rendering at 60
    const TRACKER_MS: f64 = 33.0;

    fn hand(label: HandLabel, gesture: Gesture, x: f32, y: f32) -> HandFrame {
        synthesize(label, gesture, Vec2::new(x, y))
    }

    /// A short performance: drag-rotate, spread to zoom, swipe, theme, rest
    fn script() -> Vec<LandmarkFrame> {
        let mut frames = Vec::new();

        for i in 0..10 {
            let x = 0.4 + i as f32 * 0.01;
            frames.push(LandmarkFrame::new(vec![hand(
                HandLabel::Right,
                Gesture::Grab,
                x,
                0.5,
            )]));
        }
        for i in 0..10 {
            let spread = i as f32 * 0.02;
            frames.push(LandmarkFrame::new(vec![
                hand(HandLabel::Left, Gesture::Point, 0.4 - spread, 0.5),
                hand(HandLabel::Right, Gesture::Point, 0.6 + spread, 0.5),
            ]));
        }
        frames.push(LandmarkFrame::default());
        for x in [0.7, 0.5, 0.3] {
            frames.push(LandmarkFrame::new(vec![hand(
                HandLabel::Right,
                Gesture::PalmOpen,
                x,
                0.5,
            )]));
        }
        frames.push(LandmarkFrame::new(vec![hand(
            HandLabel::Left,
            Gesture::Victory,
            0.3,
            0.4,
        )]));
        for _ in 0..30 {
            frames.push(LandmarkFrame::new(vec![hand(
                HandLabel::Right,
                Gesture::PalmOpen,
                0.5,
                0.5,
            )]));
        }
        frames
    }

    pub fn run(settings: Settings) {
        let mut session = match Session::new(settings, CANVAS, hand_control::control::LogSink) {
            Ok(session) => session,
            Err(e) => {
                log::error!("Cannot start session: {}", e);
                return;
            }
        };

        let mut stream = ScriptedStream::new();
        for (i, frame) in script().into_iter().enumerate() {
            stream.push_frame(i as f64 * TRACKER_MS, frame).push_pending();
        }

        let mut frames = 0;
        let mut commands = 0;
        loop {
            let status = session.pump(&mut stream);
            if let hand_control::session::PumpStatus::Waiting { frames: n } = status {
                frames += n;
            }
            commands += session.drain_commands().map_or(0, |c| c.len());
            // Two render frames per tracker frame. The second reuses the cached
            // palms, so the session holds the throw baseline from the first.
            for _ in 0..2 {
                session.on_frame(hand_control::consts::FRAME_DT);
            }
            if !matches!(status, hand_control::session::PumpStatus::Waiting { .. }) {
                break;
            }
        }

        let state = session.state();
        log::info!(
            "Rotation ({:.2}, {:.2}), scale {:.2}, scene {}/{}, theme {}/{}, pulses {}",
            state.rotation().x,
            state.rotation().y,
            state.scale(),
            state.scene(),
            state.scene_count(),
            state.theme(),
            state.theme_count(),
            state.pulse_count()
        );
        let resting = session
            .world()
            .objects()
            .iter()
            .filter(|o| o.vel.length() < 0.5)
            .count();
        log::info!(
            "{} tracker frames, {} commands, {} of {} objects nearly at rest",
            frames,
            commands,
            resting,
            session.world().objects().len()
        );

        session.shutdown();
    }
}
