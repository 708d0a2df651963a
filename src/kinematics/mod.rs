//! Kinematics module - joint geometry, confidence gating, smoothing, calibration
//!
//! Re-exports only. All logic in submodules.

mod angles;
mod calibration;
mod confidence_gate;
mod smoothing;

pub use angles::{distance, joint_angle, midpoint};
pub use calibration::{BaselineCalibrator, DEFAULT_CALIBRATION_FRAMES};
pub use confidence_gate::{ConfidenceGate, KeypointGate};
pub use smoothing::{MovingAverage, MAX_SMOOTHING_WINDOW};
