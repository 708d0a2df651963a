//! Rep Counter Web - pose-driven repetition counting
//!
//! Turns per-frame body keypoints into repetition counts for squats,
//! push-ups, biceps curls, jumping jacks and vertical jumps. The core
//! (`pose`, `kinematics`, `counter`) is plain Rust; `bridge` exposes it
//! to the page through wasm_bindgen.

pub mod bridge;
pub mod counter;
pub mod kinematics;
pub mod pose;

use wasm_bindgen::prelude::*;

pub use counter::{
    step, DetectorState, Exercise, ExerciseConfig, Phase, RepCounter, RepRecord, RepSink,
    RepetitionEvent, Workout,
};
pub use pose::{Keypoint, KeypointName, Pose};

// ============================================================================
// WASM ENTRY POINTS
// ============================================================================

/// Called automatically when WASM module loads
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Route `log` output to the browser console.
///
/// Level is one of "trace", "debug", "info", "warn", "error"; anything else
/// means "info". Only the first call installs the logger.
#[wasm_bindgen]
pub fn init_logging(level: &str) {
    let log_level = match level.to_lowercase().as_str() {
        "trace" => log::Level::Trace,
        "debug" => log::Level::Debug,
        "info" => log::Level::Info,
        "warn" => log::Level::Warn,
        "error" => log::Level::Error,
        _ => log::Level::Info,
    };

    wasm_logger::init(wasm_logger::Config::new(log_level));
    log::info!("Rep counter initialized with log level: {}", level);
}

#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
