//! Confidence Gate - per-keypoint minimum scores
//!
//! A keypoint is usable only when the estimator found it at a finite
//! position and its score reaches the threshold for that joint. Elbows are typically gated harder
//! than wrists, so thresholds are per keypoint with a shared default.

use serde::{Deserialize, Serialize};

use crate::pose::{KeypointName, Pose};

/// Minimum score for one keypoint
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeypointGate {
    pub keypoint: KeypointName,
    pub min_score: f32,
}

/// Confidence gate for the keypoints one exercise reads
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceGate {
    /// Threshold for keypoints without an override
    pub default_min_score: f32,
    /// Per-keypoint thresholds
    #[serde(default)]
    pub overrides: Vec<KeypointGate>,
}

impl ConfidenceGate {
    pub fn new(default_min_score: f32) -> Self {
        Self {
            default_min_score,
            overrides: Vec::new(),
        }
    }

    /// Set the threshold for one keypoint, replacing any earlier override
    pub fn with(mut self, keypoint: KeypointName, min_score: f32) -> Self {
        self.overrides.retain(|g| g.keypoint != keypoint);
        self.overrides.push(KeypointGate { keypoint, min_score });
        self
    }

    pub fn threshold(&self, keypoint: KeypointName) -> f32 {
        self.overrides
            .iter()
            .find(|g| g.keypoint == keypoint)
            .map(|g| g.min_score)
            .unwrap_or(self.default_min_score)
    }

    /// Position of the keypoint if it is present, located and confident enough
    pub fn point(&self, pose: &Pose, keypoint: KeypointName) -> Option<(f32, f32)> {
        let kp = pose.get(keypoint)?;
        if !kp.x.is_finite() || !kp.y.is_finite() {
            return None;
        }
        if kp.score >= self.threshold(keypoint) {
            Some(kp.position())
        } else {
            None
        }
    }

    /// Positions of every listed keypoint, or None if any one fails the gate
    pub fn points<const N: usize>(
        &self,
        pose: &Pose,
        keypoints: [KeypointName; N],
    ) -> Option<[(f32, f32); N]> {
        let mut out = [(0.0, 0.0); N];
        for (slot, name) in out.iter_mut().zip(keypoints) {
            *slot = self.point(pose, name)?;
        }
        Some(out)
    }
}

impl Default for ConfidenceGate {
    fn default() -> Self {
        Self::new(0.5)
    }
}
