//! Exercise configuration records
//!
//! Every exercise is the same hysteresis machine with a different record:
//! which signal to read, where the band sits, how many frames confirm a
//! transition and how long to wait between reps. Presets hold the tuned
//! defaults; any field can be overridden from JSON.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::kinematics::{ConfidenceGate, DEFAULT_CALIBRATION_FRAMES, MAX_SMOOTHING_WINDOW};
use crate::pose::KeypointName;

// ============================================================================
// EXERCISES
// ============================================================================

/// Supported exercises
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exercise {
    Squat,
    PushUp,
    Biceps,
    JumpingJack,
    VerticalJump,
}

impl Exercise {
    pub const ALL: [Exercise; 5] = [
        Exercise::Squat,
        Exercise::PushUp,
        Exercise::Biceps,
        Exercise::JumpingJack,
        Exercise::VerticalJump,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Exercise::Squat => "squat",
            Exercise::PushUp => "push_up",
            Exercise::Biceps => "biceps",
            Exercise::JumpingJack => "jumping_jack",
            Exercise::VerticalJump => "vertical_jump",
        }
    }

    /// Name used when recording reps
    pub fn record_name(&self) -> &'static str {
        match self {
            Exercise::Squat => "SQUATS",
            Exercise::PushUp => "PUSH UP",
            Exercise::Biceps => "BICEPS",
            Exercise::JumpingJack => "JUMPING JACKS",
            Exercise::VerticalJump => "VERTICAL JUMP",
        }
    }

    /// Display labels for (rest, active)
    pub fn phase_labels(&self) -> (&'static str, &'static str) {
        match self {
            Exercise::Squat | Exercise::PushUp | Exercise::Biceps => ("up", "down"),
            Exercise::JumpingJack => ("closed", "open"),
            Exercise::VerticalJump => ("grounded", "airborne"),
        }
    }

    /// Tuned default configuration
    pub fn preset(&self) -> ExerciseConfig {
        match self {
            Exercise::Squat => ExerciseConfig::squat(),
            Exercise::PushUp => ExerciseConfig::push_up(),
            Exercise::Biceps => ExerciseConfig::biceps(),
            Exercise::JumpingJack => ExerciseConfig::jumping_jack(),
            Exercise::VerticalJump => ExerciseConfig::vertical_jump(),
        }
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown exercise: {0}")]
pub struct UnknownExercise(pub String);

impl FromStr for Exercise {
    type Err = UnknownExercise;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "squat" | "squats" => Ok(Exercise::Squat),
            "push_up" | "pushup" | "push_ups" => Ok(Exercise::PushUp),
            "biceps" | "dip" | "bench_dip" => Ok(Exercise::Biceps),
            "jumping_jack" | "jumping_jacks" => Ok(Exercise::JumpingJack),
            "vertical_jump" | "jump" => Ok(Exercise::VerticalJump),
            _ => Err(UnknownExercise(s.to_string())),
        }
    }
}

// ============================================================================
// SIGNALS
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn hip(self) -> KeypointName {
        match self {
            Side::Left => KeypointName::LeftHip,
            Side::Right => KeypointName::RightHip,
        }
    }
}

/// Three-joint chain whose middle joint carries the angle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Limb {
    /// hip → knee → ankle
    Leg,
    /// shoulder → elbow → wrist
    Arm,
}

impl Limb {
    pub fn keypoints(self, side: Side) -> [KeypointName; 3] {
        use KeypointName::*;
        match (self, side) {
            (Limb::Leg, Side::Left) => [LeftHip, LeftKnee, LeftAnkle],
            (Limb::Leg, Side::Right) => [RightHip, RightKnee, RightAnkle],
            (Limb::Arm, Side::Left) => [LeftShoulder, LeftElbow, LeftWrist],
            (Limb::Arm, Side::Right) => [RightShoulder, RightElbow, RightWrist],
        }
    }
}

/// Which limbs feed a joint-angle signal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SidePolicy {
    /// Average both sides when both pass the gate, else whichever one does
    BestAvailable,
    LeftOnly,
    RightOnly,
}

impl SidePolicy {
    pub fn candidates(self) -> &'static [Side] {
        match self {
            SidePolicy::BestAvailable => &[Side::Left, Side::Right],
            SidePolicy::LeftOnly => &[Side::Left],
            SidePolicy::RightOnly => &[Side::Right],
        }
    }
}

/// What the machine measures each frame and where its band sits
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Signal {
    /// Joint angle in degrees. Active below `enter_below`, rest above `exit_above`.
    #[serde(rename_all = "camelCase")]
    JointAngle {
        limb: Limb,
        sides: SidePolicy,
        enter_below: f32,
        exit_above: f32,
        /// Max |nose.y − hip.y| in pixels; frames with an upright torso are skipped
        #[serde(default)]
        torso_guard: Option<f32>,
    },
    /// Arms and legs spread. Ratios are against shoulder height and hip width.
    #[serde(rename_all = "camelCase")]
    LimbSpread {
        arms_up_ratio: f32,
        arms_down_ratio: f32,
        legs_open_ratio: f32,
        legs_closed_ratio: f32,
    },
    /// Mean ankle height against a baseline calibrated at session start
    #[serde(rename_all = "camelCase")]
    AnkleHeight {
        airborne_margin: f32,
        ground_margin: f32,
        calibration_frames: usize,
    },
}

// ============================================================================
// CONFIG RECORD
// ============================================================================

/// Errors from building or loading an exercise configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f32 },

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("inverted band: enter below {enter_below} must be less than exit above {exit_above}")]
    InvertedBand { enter_below: f32, exit_above: f32 },

    #[error("airborne margin {airborne}px must exceed ground margin {ground}px")]
    InvertedMargins { airborne: f32, ground: f32 },

    #[error("legs open ratio {open} must exceed legs closed ratio {closed}")]
    InvertedSpread { open: f32, closed: f32 },

    #[error("smoothing window must be between 1 and {max}, got {window}")]
    SmoothingWindow { window: usize, max: usize },

    #[error("confirmation needs at least one frame")]
    ZeroConfirmFrames,

    #[error("calibration needs at least one frame")]
    ZeroCalibrationFrames,

    #[error("minimum interval must be a non-negative number of milliseconds, got {0}")]
    InvalidInterval(f64),

    #[error("score threshold for {keypoint} must be within [0, 1], got {score}")]
    ScoreOutOfRange { keypoint: String, score: f32 },

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Full configuration for one repetition counter
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseConfig {
    pub exercise: Exercise,
    pub signal: Signal,
    pub gate: ConfidenceGate,
    /// Samples in the moving average (1 = raw)
    #[serde(default = "default_window")]
    pub smoothing_window: usize,
    /// Minimum wall-clock gap between counted reps
    #[serde(default)]
    pub min_interval_ms: Option<f64>,
    /// Consecutive frames needed before a transition fires
    #[serde(default = "default_confirm")]
    pub confirm_frames: u32,
}

fn default_window() -> usize {
    1
}

fn default_confirm() -> u32 {
    1
}

impl ExerciseConfig {
    /// Average knee angle; down below 100°, up above 160°
    pub fn squat() -> Self {
        Self {
            exercise: Exercise::Squat,
            signal: Signal::JointAngle {
                limb: Limb::Leg,
                sides: SidePolicy::BestAvailable,
                enter_below: 100.0,
                exit_above: 160.0,
                torso_guard: None,
            },
            gate: ConfidenceGate::new(0.5),
            smoothing_window: 1,
            min_interval_ms: None,
            confirm_frames: 1,
        }
    }

    /// Left elbow angle while the torso is horizontal; down below 90°, up above 150°
    pub fn push_up() -> Self {
        Self {
            exercise: Exercise::PushUp,
            signal: Signal::JointAngle {
                limb: Limb::Arm,
                sides: SidePolicy::LeftOnly,
                enter_below: 90.0,
                exit_above: 150.0,
                torso_guard: Some(100.0),
            },
            gate: ConfidenceGate::new(0.3).with(KeypointName::Nose, 0.4),
            smoothing_window: 1,
            min_interval_ms: None,
            confirm_frames: 1,
        }
    }

    /// Smoothed elbow angle with an 800 ms gap between reps
    pub fn biceps() -> Self {
        Self {
            exercise: Exercise::Biceps,
            signal: Signal::JointAngle {
                limb: Limb::Arm,
                sides: SidePolicy::BestAvailable,
                enter_below: 90.0,
                exit_above: 160.0,
                torso_guard: None,
            },
            gate: ConfidenceGate::new(0.4),
            smoothing_window: 5,
            min_interval_ms: Some(800.0),
            confirm_frames: 1,
        }
    }

    /// Open/closed shape held for 5 frames
    pub fn jumping_jack() -> Self {
        Self {
            exercise: Exercise::JumpingJack,
            signal: Signal::LimbSpread {
                arms_up_ratio: 0.95,
                arms_down_ratio: 1.05,
                legs_open_ratio: 1.5,
                legs_closed_ratio: 1.1,
            },
            gate: ConfidenceGate::new(0.6),
            smoothing_window: 1,
            min_interval_ms: None,
            confirm_frames: 5,
        }
    }

    /// Ankles 30px above the calibrated ground for 3 frames, then back within 10px
    pub fn vertical_jump() -> Self {
        Self {
            exercise: Exercise::VerticalJump,
            signal: Signal::AnkleHeight {
                airborne_margin: 30.0,
                ground_margin: 10.0,
                calibration_frames: DEFAULT_CALIBRATION_FRAMES,
            },
            gate: ConfidenceGate::new(0.5),
            smoothing_window: 1,
            min_interval_ms: None,
            confirm_frames: 3,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every field; a config that passes cannot put NaN or an
    /// inverted band into the machine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.signal {
            Signal::JointAngle {
                enter_below,
                exit_above,
                torso_guard,
                ..
            } => {
                finite("enterBelow", *enter_below)?;
                finite("exitAbove", *exit_above)?;
                if enter_below >= exit_above {
                    return Err(ConfigError::InvertedBand {
                        enter_below: *enter_below,
                        exit_above: *exit_above,
                    });
                }
                if let Some(guard) = torso_guard {
                    positive("torsoGuard", *guard)?;
                }
            }
            Signal::LimbSpread {
                arms_up_ratio,
                arms_down_ratio,
                legs_open_ratio,
                legs_closed_ratio,
            } => {
                positive("armsUpRatio", *arms_up_ratio)?;
                positive("armsDownRatio", *arms_down_ratio)?;
                positive("legsOpenRatio", *legs_open_ratio)?;
                positive("legsClosedRatio", *legs_closed_ratio)?;
                if legs_open_ratio <= legs_closed_ratio {
                    return Err(ConfigError::InvertedSpread {
                        open: *legs_open_ratio,
                        closed: *legs_closed_ratio,
                    });
                }
            }
            Signal::AnkleHeight {
                airborne_margin,
                ground_margin,
                calibration_frames,
            } => {
                finite("airborneMargin", *airborne_margin)?;
                finite("groundMargin", *ground_margin)?;
                if airborne_margin <= ground_margin {
                    return Err(ConfigError::InvertedMargins {
                        airborne: *airborne_margin,
                        ground: *ground_margin,
                    });
                }
                if *calibration_frames == 0 {
                    return Err(ConfigError::ZeroCalibrationFrames);
                }
            }
        }

        if self.smoothing_window == 0 || self.smoothing_window > MAX_SMOOTHING_WINDOW {
            return Err(ConfigError::SmoothingWindow {
                window: self.smoothing_window,
                max: MAX_SMOOTHING_WINDOW,
            });
        }
        if self.confirm_frames == 0 {
            return Err(ConfigError::ZeroConfirmFrames);
        }
        if let Some(interval) = self.min_interval_ms {
            if !interval.is_finite() || interval < 0.0 {
                return Err(ConfigError::InvalidInterval(interval));
            }
        }

        let default = self.gate.default_min_score;
        if !(0.0..=1.0).contains(&default) {
            return Err(ConfigError::ScoreOutOfRange {
                keypoint: "default".to_string(),
                score: default,
            });
        }
        for g in &self.gate.overrides {
            if !(0.0..=1.0).contains(&g.min_score) {
                return Err(ConfigError::ScoreOutOfRange {
                    keypoint: g.keypoint.to_string(),
                    score: g.min_score,
                });
            }
        }

        Ok(())
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}
