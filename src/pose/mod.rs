//! Pose module - keypoint names, keypoints and per-frame poses
//!
//! Re-exports only. All logic in submodules.

mod keypoint;

pub use keypoint::{
    visible_keypoints, Keypoint, KeypointName, Pose, UnknownKeypoint, FLAT_POSE_LEN,
    FLOATS_PER_KEYPOINT, KEYPOINT_COUNT,
};
