//! Events emitted by a counter per frame
//!
//! Only `RepCompleted` is authoritative. The rest feed the overlay and may be
//! dropped without affecting the count.

use serde::Serialize;

use super::config::Exercise;
use super::state::Phase;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RepetitionEvent {
    /// Ground baseline fixed; measuring starts with the next frame
    CalibrationCompleted { baseline: f32 },
    /// Raw and smoothed signal for this frame (degrees, spread ratio or pixels)
    SignalUpdated { value: f32, smoothed: f32 },
    PhaseChanged {
        from: Phase,
        to: Phase,
        label: &'static str,
    },
    #[serde(rename_all = "camelCase")]
    RepCompleted { count: u32, timestamp_ms: f64 },
}

impl RepetitionEvent {
    pub fn is_rep(&self) -> bool {
        matches!(self, RepetitionEvent::RepCompleted { .. })
    }
}

/// Values the overlay shows for one counter
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterSnapshot {
    pub exercise: Exercise,
    pub phase: Phase,
    pub phase_label: &'static str,
    pub count: u32,
    pub smoothed_signal: Option<f32>,
    pub calibrating: bool,
    pub ground_baseline: Option<f32>,
}
