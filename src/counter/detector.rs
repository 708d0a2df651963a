//! Repetition counter - one generic hysteresis machine for every exercise
//!
//! `step` is the whole algorithm: gate and measure the pose, smooth the
//! signal, classify it into a zone, then advance the REST → ACTIVE → REST
//! machine. A rep is counted only on the way back into REST.

use log::{debug, info, trace};

use super::config::{ConfigError, Exercise, ExerciseConfig, Signal};
use super::event::{CounterSnapshot, RepetitionEvent};
use super::signal::{angle_zone, height_zone, measure, Measurement, Zone};
use super::state::{DetectorState, Phase};
use crate::pose::Pose;

/// Advance `state` by one frame.
///
/// Frames without a usable sample, or with a timestamp that is not finite,
/// leave the state untouched and return no events. `timestamp_ms` must not
/// decrease between calls; it is only read for the minimum interval between
/// reps.
pub fn step(
    config: &ExerciseConfig,
    state: &mut DetectorState,
    pose: &Pose,
    timestamp_ms: f64,
) -> Vec<RepetitionEvent> {
    if !timestamp_ms.is_finite() {
        trace!("{}: frame skipped, timestamp {} not finite", config.exercise, timestamp_ms);
        return Vec::new();
    }

    let Some(measurement) = measure(&config.signal, &config.gate, pose) else {
        trace!("{}: frame skipped, no usable sample", config.exercise);
        return Vec::new();
    };

    let mut events = Vec::new();

    let zone = match (measurement, &config.signal) {
        (
            Measurement::Angle(angle),
            Signal::JointAngle {
                enter_below,
                exit_above,
                ..
            },
        ) => {
            let smoothed = state.angle_history.push(angle);
            events.push(RepetitionEvent::SignalUpdated {
                value: angle,
                smoothed,
            });
            angle_zone(smoothed, *enter_below, *exit_above)
        }
        (Measurement::Spread { ratio, zone }, _) => {
            let smoothed = state.angle_history.push(ratio);
            events.push(RepetitionEvent::SignalUpdated {
                value: ratio,
                smoothed,
            });
            zone
        }
        (
            Measurement::AnkleHeight(ankle_y),
            Signal::AnkleHeight {
                airborne_margin,
                ground_margin,
                ..
            },
        ) => {
            let Some(calibration) = state.calibration.as_mut() else {
                return events;
            };

            let Some(baseline) = calibration.baseline() else {
                if let Some(baseline) = calibration.push(ankle_y) {
                    info!("{}: calibration complete, ground at {:.1}px", config.exercise, baseline);
                    events.push(RepetitionEvent::CalibrationCompleted { baseline });
                }
                return events;
            };

            let smoothed = state.angle_history.push(ankle_y);
            events.push(RepetitionEvent::SignalUpdated {
                value: ankle_y,
                smoothed,
            });
            height_zone(smoothed, baseline, *airborne_margin, *ground_margin)
        }
        // measure() always answers in the shape of the configured signal
        _ => return events,
    };

    advance(config, state, zone, timestamp_ms, &mut events);
    events
}

/// Update streaks and fire at most one transition
fn advance(
    config: &ExerciseConfig,
    state: &mut DetectorState,
    zone: Zone,
    timestamp_ms: f64,
    events: &mut Vec<RepetitionEvent>,
) {
    match zone {
        Zone::Enter => {
            state.enter_streak = state.enter_streak.saturating_add(1);
            state.exit_streak = 0;
        }
        Zone::Exit => {
            state.exit_streak = state.exit_streak.saturating_add(1);
            state.enter_streak = 0;
        }
        Zone::Neutral => {
            state.enter_streak = 0;
            state.exit_streak = 0;
        }
    }

    let (rest_label, active_label) = config.exercise.phase_labels();

    match (state.phase, zone) {
        (Phase::Rest, Zone::Enter) if state.enter_streak >= config.confirm_frames => {
            state.phase = Phase::Active;
            debug!("{}: {} -> {}", config.exercise, rest_label, active_label);
            events.push(RepetitionEvent::PhaseChanged {
                from: Phase::Rest,
                to: Phase::Active,
                label: active_label,
            });
        }
        (Phase::Active, Zone::Exit) if state.exit_streak >= config.confirm_frames => {
            if !interval_elapsed(config.min_interval_ms, state.last_rep_ms, timestamp_ms) {
                trace!("{}: return to rest held back by minimum interval", config.exercise);
                return;
            }

            state.phase = Phase::Rest;
            state.repetition_count = state.repetition_count.saturating_add(1);
            state.last_rep_ms = Some(timestamp_ms);

            debug!("{}: {} -> {}", config.exercise, active_label, rest_label);
            info!("{}: rep {} completed", config.exercise, state.repetition_count);

            events.push(RepetitionEvent::PhaseChanged {
                from: Phase::Active,
                to: Phase::Rest,
                label: rest_label,
            });
            events.push(RepetitionEvent::RepCompleted {
                count: state.repetition_count,
                timestamp_ms,
            });
        }
        _ => {}
    }
}

fn interval_elapsed(min_interval_ms: Option<f64>, last_rep_ms: Option<f64>, now_ms: f64) -> bool {
    match (min_interval_ms, last_rep_ms) {
        (Some(min), Some(last)) => (now_ms - last).max(0.0) >= min,
        _ => true,
    }
}

/// Counter for one exercise: a validated config plus the state it drives
#[derive(Clone, Debug)]
pub struct RepCounter {
    config: ExerciseConfig,
    state: DetectorState,
}

impl RepCounter {
    pub fn new(config: ExerciseConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = DetectorState::new(&config);
        Ok(Self { config, state })
    }

    /// Counter with the tuned preset for `exercise`
    pub fn for_exercise(exercise: Exercise) -> Self {
        let config = exercise.preset();
        let state = DetectorState::new(&config);
        Self { config, state }
    }

    /// Process one frame, returns the events it produced
    pub fn process(&mut self, pose: &Pose, timestamp_ms: f64) -> Vec<RepetitionEvent> {
        step(&self.config, &mut self.state, pose, timestamp_ms)
    }

    pub fn exercise(&self) -> Exercise {
        self.config.exercise
    }

    pub fn config(&self) -> &ExerciseConfig {
        &self.config
    }

    pub fn state(&self) -> &DetectorState {
        &self.state
    }

    pub fn count(&self) -> u32 {
        self.state.repetition_count
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        let (rest, active) = self.config.exercise.phase_labels();
        CounterSnapshot {
            exercise: self.config.exercise,
            phase: self.state.phase,
            phase_label: match self.state.phase {
                Phase::Rest => rest,
                Phase::Active => active,
            },
            count: self.state.repetition_count,
            smoothed_signal: self.state.smoothed_signal(),
            calibrating: self.state.is_calibrating(),
            ground_baseline: self.state.ground_baseline(),
        }
    }

    /// Explicit reset: zero reps, back to rest, recalibrate if needed
    pub fn reset(&mut self) {
        self.state.reset();
        info!("{}: counter reset", self.config.exercise);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{Keypoint, KeypointName};

    /// Both legs with the given knee angle, all joints confident
    fn squat_pose(angle_deg: f32, score: f32) -> Pose {
        let mut keypoints = Vec::new();
        for (hip, knee, ankle, x) in [
            (KeypointName::LeftHip, KeypointName::LeftKnee, KeypointName::LeftAnkle, 250.0),
            (KeypointName::RightHip, KeypointName::RightKnee, KeypointName::RightAnkle, 390.0),
        ] {
            let (sin, cos) = angle_deg.to_radians().sin_cos();
            keypoints.push(Keypoint::new(hip, x, 200.0, score));
            keypoints.push(Keypoint::new(knee, x, 300.0, score));
            keypoints.push(Keypoint::new(ankle, x + 100.0 * sin, 300.0 - 100.0 * cos, score));
        }
        Pose::from_keypoints(keypoints)
    }

    fn run(counter: &mut RepCounter, angles: &[f32]) -> Vec<RepetitionEvent> {
        angles
            .iter()
            .enumerate()
            .flat_map(|(i, &a)| counter.process(&squat_pose(a, 0.9), i as f64 * 33.0))
            .collect()
    }

    #[test]
    fn test_squat_counts_on_return_to_rest() {
        let mut counter = RepCounter::for_exercise(Exercise::Squat);
        let angles = [170.0, 170.0, 95.0, 95.0, 170.0];

        let mut rep_frames = Vec::new();
        for (i, &a) in angles.iter().enumerate() {
            let events = counter.process(&squat_pose(a, 0.9), i as f64 * 33.0);
            if events.iter().any(RepetitionEvent::is_rep) {
                rep_frames.push(i);
            }
        }

        assert_eq!(rep_frames, vec![4]);
        assert_eq!(counter.count(), 1);
        assert_eq!(counter.phase(), Phase::Rest);
    }

    #[test]
    fn test_entering_active_never_counts() {
        let mut counter = RepCounter::for_exercise(Exercise::Squat);
        let events = run(&mut counter, &[170.0, 95.0, 90.0, 85.0]);
        assert!(!events.iter().any(RepetitionEvent::is_rep));
        assert_eq!(counter.phase(), Phase::Active);

        let phase_changes = events
            .iter()
            .filter(|e| matches!(e, RepetitionEvent::PhaseChanged { .. }))
            .count();
        assert_eq!(phase_changes, 1);
    }

    #[test]
    fn test_band_does_not_oscillate() {
        let mut counter = RepCounter::for_exercise(Exercise::Squat);
        run(&mut counter, &[95.0, 120.0, 99.0, 150.0, 101.0, 159.0]);
        assert_eq!(counter.count(), 0);
        assert_eq!(counter.phase(), Phase::Active);
    }

    #[test]
    fn test_low_confidence_frame_is_idempotent() {
        let mut counter = RepCounter::for_exercise(Exercise::Squat);
        run(&mut counter, &[170.0, 95.0]);
        let before = counter.state().clone();

        let events = counter.process(&squat_pose(170.0, 0.2), 1000.0);

        assert!(events.is_empty());
        assert_eq!(counter.state(), &before);
    }

    #[test]
    fn test_non_finite_timestamp_is_skipped() {
        let mut config = ExerciseConfig::squat();
        config.min_interval_ms = Some(800.0);
        let mut counter = RepCounter::new(config).unwrap();

        counter.process(&squat_pose(95.0, 0.9), 0.0);
        let before = counter.state().clone();
        for t in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(counter.process(&squat_pose(170.0, 0.9), t).is_empty());
        }
        assert_eq!(counter.state(), &before);

        counter.process(&squat_pose(170.0, 0.9), 100.0);
        assert_eq!(counter.state().last_rep_ms(), Some(100.0));

        // The interval still applies after the skipped frames
        counter.process(&squat_pose(95.0, 0.9), 500.0);
        counter.process(&squat_pose(170.0, 0.9), 700.0);
        assert_eq!(counter.count(), 1);
        counter.process(&squat_pose(170.0, 0.9), 900.0);
        assert_eq!(counter.count(), 2);
    }

    #[test]
    fn test_event_order_within_frame() {
        let mut counter = RepCounter::for_exercise(Exercise::Squat);
        run(&mut counter, &[95.0]);
        let events = counter.process(&squat_pose(170.0, 0.9), 500.0);

        assert!(matches!(events[0], RepetitionEvent::SignalUpdated { .. }));
        assert!(matches!(
            events[1],
            RepetitionEvent::PhaseChanged { to: Phase::Rest, label: "up", .. }
        ));
        assert_eq!(
            events[2],
            RepetitionEvent::RepCompleted {
                count: 1,
                timestamp_ms: 500.0
            }
        );
    }

    #[test]
    fn test_interval_elapsed() {
        assert!(interval_elapsed(None, Some(100.0), 101.0));
        assert!(interval_elapsed(Some(800.0), None, 0.0));
        assert!(!interval_elapsed(Some(800.0), Some(0.0), 799.0));
        assert!(interval_elapsed(Some(800.0), Some(0.0), 800.0));
        assert!(!interval_elapsed(Some(800.0), Some(1000.0), 900.0));
    }

    #[test]
    fn test_reset() {
        let mut counter = RepCounter::for_exercise(Exercise::Squat);
        run(&mut counter, &[95.0, 170.0, 95.0]);
        assert_eq!(counter.count(), 1);

        counter.reset();
        assert_eq!(counter.count(), 0);
        assert_eq!(counter.phase(), Phase::Rest);
        assert!(counter.state().angle_history().is_empty());
        assert_eq!(counter.state().last_rep_ms(), None);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = ExerciseConfig::squat();
        config.confirm_frames = 0;
        assert!(RepCounter::new(config).is_err());
    }

    #[test]
    fn test_snapshot_labels() {
        let mut counter = RepCounter::for_exercise(Exercise::Squat);
        assert_eq!(counter.snapshot().phase_label, "up");
        run(&mut counter, &[95.0]);
        let snapshot = counter.snapshot();
        assert_eq!(snapshot.phase_label, "down");
        assert_eq!(snapshot.count, 0);
        assert!(!snapshot.calibrating);
    }
}
