//! Detector state - everything a counter carries from one frame to the next

use serde::{Deserialize, Serialize};

use super::config::{ExerciseConfig, Signal};
use crate::kinematics::{BaselineCalibrator, MovingAverage};

/// Two-valued phase of the hysteresis machine
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Rest,
    Active,
}

/// Mutable state of one counter, owned exclusively by it
#[derive(Clone, Debug, PartialEq)]
pub struct DetectorState {
    pub(crate) phase: Phase,
    pub(crate) angle_history: MovingAverage,
    pub(crate) last_rep_ms: Option<f64>,
    pub(crate) repetition_count: u32,
    /// Consecutive frames in the enter zone
    pub(crate) enter_streak: u32,
    /// Consecutive frames in the exit zone
    pub(crate) exit_streak: u32,
    pub(crate) calibration: Option<BaselineCalibrator>,
}

impl DetectorState {
    /// Fresh state sized for the given config
    pub fn new(config: &ExerciseConfig) -> Self {
        let calibration = match config.signal {
            Signal::AnkleHeight {
                calibration_frames, ..
            } => Some(BaselineCalibrator::new(calibration_frames)),
            _ => None,
        };

        Self {
            phase: Phase::Rest,
            angle_history: MovingAverage::new(config.smoothing_window),
            last_rep_ms: None,
            repetition_count: 0,
            enter_streak: 0,
            exit_streak: 0,
            calibration,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn repetition_count(&self) -> u32 {
        self.repetition_count
    }

    pub fn last_rep_ms(&self) -> Option<f64> {
        self.last_rep_ms
    }

    /// Current moving-average value of the signal
    pub fn smoothed_signal(&self) -> Option<f32> {
        self.angle_history.mean()
    }

    pub fn angle_history(&self) -> &MovingAverage {
        &self.angle_history
    }

    /// Ground baseline, for calibrated detectors that have finished calibrating
    pub fn ground_baseline(&self) -> Option<f32> {
        self.calibration.as_ref().and_then(BaselineCalibrator::baseline)
    }

    pub fn is_calibrating(&self) -> bool {
        self.calibration
            .as_ref()
            .is_some_and(|cal| !cal.is_calibrated())
    }

    pub fn calibration_progress(&self) -> Option<(usize, usize)> {
        self.calibration.as_ref().map(BaselineCalibrator::progress)
    }

    /// Back to the initial state: rest, zero reps, empty history, uncalibrated
    pub fn reset(&mut self) {
        self.phase = Phase::Rest;
        self.angle_history.clear();
        self.last_rep_ms = None;
        self.repetition_count = 0;
        self.enter_streak = 0;
        self.exit_streak = 0;
        if let Some(cal) = self.calibration.as_mut() {
            cal.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = DetectorState::new(&ExerciseConfig::biceps());
        assert_eq!(state.phase(), Phase::Rest);
        assert_eq!(state.repetition_count(), 0);
        assert_eq!(state.angle_history().window(), 5);
        assert!(!state.is_calibrating());
        assert_eq!(state.ground_baseline(), None);
    }

    #[test]
    fn test_vertical_jump_starts_calibrating() {
        let state = DetectorState::new(&ExerciseConfig::vertical_jump());
        assert!(state.is_calibrating());
        assert_eq!(state.calibration_progress(), Some((0, 60)));
    }
}
