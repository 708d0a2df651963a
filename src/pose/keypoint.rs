//! Keypoint and pose types
//!
//! A pose is the set of named, scored landmarks the estimator produced for
//! one video frame. Coordinates are frame pixels with y growing downward.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of landmarks in a MoveNet pose
pub const KEYPOINT_COUNT: usize = 17;

/// Floats per keypoint in the flat wire layout: x, y, score
pub const FLOATS_PER_KEYPOINT: usize = 3;

/// Length of a flat pose array (17 × 3)
pub const FLAT_POSE_LEN: usize = KEYPOINT_COUNT * FLOATS_PER_KEYPOINT;

// ============================================================================
// KEYPOINT NAMES (MoveNet order)
// ============================================================================

/// Anatomical landmark names, in model output order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeypointName {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl KeypointName {
    pub const ALL: [KeypointName; KEYPOINT_COUNT] = [
        KeypointName::Nose,
        KeypointName::LeftEye,
        KeypointName::RightEye,
        KeypointName::LeftEar,
        KeypointName::RightEar,
        KeypointName::LeftShoulder,
        KeypointName::RightShoulder,
        KeypointName::LeftElbow,
        KeypointName::RightElbow,
        KeypointName::LeftWrist,
        KeypointName::RightWrist,
        KeypointName::LeftHip,
        KeypointName::RightHip,
        KeypointName::LeftKnee,
        KeypointName::RightKnee,
        KeypointName::LeftAnkle,
        KeypointName::RightAnkle,
    ];

    /// Position in the model output
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeypointName::Nose => "nose",
            KeypointName::LeftEye => "left_eye",
            KeypointName::RightEye => "right_eye",
            KeypointName::LeftEar => "left_ear",
            KeypointName::RightEar => "right_ear",
            KeypointName::LeftShoulder => "left_shoulder",
            KeypointName::RightShoulder => "right_shoulder",
            KeypointName::LeftElbow => "left_elbow",
            KeypointName::RightElbow => "right_elbow",
            KeypointName::LeftWrist => "left_wrist",
            KeypointName::RightWrist => "right_wrist",
            KeypointName::LeftHip => "left_hip",
            KeypointName::RightHip => "right_hip",
            KeypointName::LeftKnee => "left_knee",
            KeypointName::RightKnee => "right_knee",
            KeypointName::LeftAnkle => "left_ankle",
            KeypointName::RightAnkle => "right_ankle",
        }
    }
}

impl fmt::Display for KeypointName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a landmark name is not one of the 17 MoveNet names
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown keypoint name: {0}")]
pub struct UnknownKeypoint(pub String);

impl FromStr for KeypointName {
    type Err = UnknownKeypoint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|name| name.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownKeypoint(s.to_string()))
    }
}

// ============================================================================
// KEYPOINT / POSE
// ============================================================================

/// A single scored 2D landmark
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub name: KeypointName,
    pub x: f32,
    pub y: f32,
    /// Estimator confidence in [0, 1]
    pub score: f32,
}

impl Keypoint {
    pub fn new(name: KeypointName, x: f32, y: f32, score: f32) -> Self {
        Self { name, x, y, score }
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

/// All keypoints found in one frame, at most one per name
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pose {
    slots: [Option<Keypoint>; KEYPOINT_COUNT],
}

impl Pose {
    /// Pose with no landmarks (no subject in frame)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from keypoints in any order. A repeated name replaces the earlier one.
    pub fn from_keypoints<I>(keypoints: I) -> Self
    where
        I: IntoIterator<Item = Keypoint>,
    {
        let mut pose = Self::empty();
        for kp in keypoints {
            pose.insert(kp);
        }
        pose
    }

    /// Parse the flat `[x, y, score] × 17` layout in model order.
    ///
    /// Returns None on a length mismatch. Entries with a non-finite x or y
    /// are treated as landmarks the estimator could not locate.
    pub fn from_flat(data: &[f32]) -> Option<Self> {
        if data.len() != FLAT_POSE_LEN {
            return None;
        }

        let mut pose = Self::empty();
        for (name, chunk) in KeypointName::ALL
            .iter()
            .zip(data.chunks_exact(FLOATS_PER_KEYPOINT))
        {
            let (x, y, score) = (chunk[0], chunk[1], chunk[2]);
            if !x.is_finite() || !y.is_finite() {
                continue;
            }
            let score = if score.is_finite() { score.clamp(0.0, 1.0) } else { 0.0 };
            pose.insert(Keypoint::new(*name, x, y, score));
        }
        Some(pose)
    }

    pub fn insert(&mut self, keypoint: Keypoint) {
        self.slots[keypoint.name.index()] = Some(keypoint);
    }

    pub fn get(&self, name: KeypointName) -> Option<&Keypoint> {
        self.slots[name.index()].as_ref()
    }

    pub fn keypoints(&self) -> impl Iterator<Item = &Keypoint> {
        self.slots.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.keypoints().count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

/// Keypoints confident enough to draw on the overlay
pub fn visible_keypoints(pose: &Pose, min_score: f32) -> Vec<Keypoint> {
    pose.keypoints()
        .filter(|kp| kp.score > min_score)
        .copied()
        .collect()
}
