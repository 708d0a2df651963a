//! Counter module - per-exercise hysteresis machines and their plumbing
//!
//! Re-exports only. All logic in submodules.

mod config;
mod detector;
mod event;
mod signal;
mod sink;
mod state;
mod workout;

pub use config::{
    ConfigError, Exercise, ExerciseConfig, Limb, Side, SidePolicy, Signal, UnknownExercise,
};
pub use detector::{step, RepCounter};
pub use event::{CounterSnapshot, RepetitionEvent};
pub use signal::{angle_zone, height_zone, measure, Measurement, Zone};
pub use sink::{MemorySink, RepRecord, RepSink};
pub use state::{DetectorState, Phase};
pub use workout::Workout;
