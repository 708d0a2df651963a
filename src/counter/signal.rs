//! Per-frame signal extraction
//!
//! Reads the configured signal out of a pose after confidence gating. A None
//! result means the frame carries no usable sample and must be skipped.

use super::config::{Limb, SidePolicy, Signal};
use crate::kinematics::{joint_angle, ConfidenceGate};
use crate::pose::{KeypointName, Pose};

/// Hip widths below this many pixels cannot normalize the leg spread
const MIN_HIP_WIDTH: f32 = 1.0;

/// Where the signal sits relative to the hysteresis band
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Zone {
    /// Drives rest → active
    Enter,
    /// Drives active → rest
    Exit,
    /// Inside the band
    Neutral,
}

/// Raw measurement taken from one pose
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Measurement {
    /// Joint angle in degrees, not yet smoothed
    Angle(f32),
    /// Leg spread over hip width, with the shape already classified
    Spread { ratio: f32, zone: Zone },
    /// Mean ankle y in pixels
    AnkleHeight(f32),
}

pub fn measure(signal: &Signal, gate: &ConfidenceGate, pose: &Pose) -> Option<Measurement> {
    match signal {
        Signal::JointAngle {
            limb,
            sides,
            torso_guard,
            ..
        } => limb_angle(gate, pose, *limb, *sides, *torso_guard).map(Measurement::Angle),
        Signal::LimbSpread {
            arms_up_ratio,
            arms_down_ratio,
            legs_open_ratio,
            legs_closed_ratio,
        } => {
            let shape = SpreadShape {
                arms_up_ratio: *arms_up_ratio,
                arms_down_ratio: *arms_down_ratio,
                legs_open_ratio: *legs_open_ratio,
                legs_closed_ratio: *legs_closed_ratio,
            };
            shape.measure(gate, pose)
        }
        Signal::AnkleHeight { .. } => {
            let [left, right] =
                gate.points(pose, [KeypointName::LeftAnkle, KeypointName::RightAnkle])?;
            let ankle_y = (left.1 + right.1) / 2.0;
            ankle_y.is_finite().then_some(Measurement::AnkleHeight(ankle_y))
        }
    }
}

/// Classify an angle against an enter/exit band
pub fn angle_zone(angle: f32, enter_below: f32, exit_above: f32) -> Zone {
    if angle < enter_below {
        Zone::Enter
    } else if angle > exit_above {
        Zone::Exit
    } else {
        Zone::Neutral
    }
}

/// Classify ankle height against the calibrated ground
pub fn height_zone(ankle_y: f32, baseline: f32, airborne_margin: f32, ground_margin: f32) -> Zone {
    if ankle_y < baseline - airborne_margin {
        Zone::Enter
    } else if ankle_y > baseline - ground_margin {
        Zone::Exit
    } else {
        Zone::Neutral
    }
}

/// Angle of the limb on every usable side, averaged.
///
/// A side is usable when all three joints pass the gate, the angle is
/// defined and, with a torso guard, the body is horizontal on that side.
fn limb_angle(
    gate: &ConfidenceGate,
    pose: &Pose,
    limb: Limb,
    sides: SidePolicy,
    torso_guard: Option<f32>,
) -> Option<f32> {
    let nose_y = match torso_guard {
        Some(_) => Some(gate.point(pose, KeypointName::Nose)?.1),
        None => None,
    };

    let mut total = 0.0;
    let mut used = 0;

    for &side in sides.candidates() {
        let Some([a, b, c]) = gate.points(pose, limb.keypoints(side)) else {
            continue;
        };

        if let (Some(max_offset), Some(nose_y)) = (torso_guard, nose_y) {
            let Some(hip) = gate.point(pose, side.hip()) else {
                continue;
            };
            let offset = (nose_y - hip.1).abs();
            if !offset.is_finite() || offset > max_offset {
                continue;
            }
        }

        if let Some(angle) = joint_angle(a, b, c) {
            total += angle;
            used += 1;
        }
    }

    if used == 0 {
        return None;
    }
    let angle = total / used as f32;
    angle.is_finite().then_some(angle)
}

struct SpreadShape {
    arms_up_ratio: f32,
    arms_down_ratio: f32,
    legs_open_ratio: f32,
    legs_closed_ratio: f32,
}

impl SpreadShape {
    /// Open: both wrists above the shoulders, ankles wide.
    /// Closed: both wrists below the shoulders, ankles together.
    fn measure(&self, gate: &ConfidenceGate, pose: &Pose) -> Option<Measurement> {
        use KeypointName::*;

        let [lw, rw, ls, rs, lh, rh, la, ra] = gate.points(
            pose,
            [
                LeftWrist,
                RightWrist,
                LeftShoulder,
                RightShoulder,
                LeftHip,
                RightHip,
                LeftAnkle,
                RightAnkle,
            ],
        )?;

        let hip_width = (lh.0 - rh.0).abs();
        if !hip_width.is_finite() || hip_width < MIN_HIP_WIDTH {
            return None;
        }

        let shoulder_y = (ls.1 + rs.1) / 2.0;
        let ratio = (la.0 - ra.0).abs() / hip_width;
        if !shoulder_y.is_finite() || !ratio.is_finite() {
            return None;
        }

        let up_line = shoulder_y * self.arms_up_ratio;
        let down_line = shoulder_y * self.arms_down_ratio;
        let arms_up = lw.1 < up_line && rw.1 < up_line;
        let arms_down = lw.1 > down_line && rw.1 > down_line;

        let zone = if arms_up && ratio > self.legs_open_ratio {
            Zone::Enter
        } else if arms_down && ratio < self.legs_closed_ratio {
            Zone::Exit
        } else {
            Zone::Neutral
        };

        Some(Measurement::Spread { ratio, zone })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::config::ExerciseConfig;
    use crate::pose::Keypoint;
    use approx::assert_abs_diff_eq;

    fn kp(name: KeypointName, x: f32, y: f32) -> Keypoint {
        Keypoint::new(name, x, y, 0.9)
    }

    #[test]
    fn test_angle_zones() {
        assert_eq!(angle_zone(95.0, 100.0, 160.0), Zone::Enter);
        assert_eq!(angle_zone(130.0, 100.0, 160.0), Zone::Neutral);
        assert_eq!(angle_zone(100.0, 100.0, 160.0), Zone::Neutral);
        assert_eq!(angle_zone(165.0, 100.0, 160.0), Zone::Exit);
    }

    #[test]
    fn test_height_zones() {
        assert_eq!(height_zone(360.0, 400.0, 30.0, 10.0), Zone::Enter);
        assert_eq!(height_zone(380.0, 400.0, 30.0, 10.0), Zone::Neutral);
        assert_eq!(height_zone(395.0, 400.0, 30.0, 10.0), Zone::Exit);
    }

    #[test]
    fn test_best_available_uses_single_side() {
        let config = ExerciseConfig::biceps();
        // Left arm bent at 90°, right arm missing
        let pose = Pose::from_keypoints([
            kp(KeypointName::LeftShoulder, 100.0, 100.0),
            kp(KeypointName::LeftElbow, 100.0, 200.0),
            kp(KeypointName::LeftWrist, 200.0, 200.0),
        ]);
        match measure(&config.signal, &config.gate, &pose) {
            Some(Measurement::Angle(angle)) => assert_abs_diff_eq!(angle, 90.0, epsilon = 0.01),
            other => panic!("unexpected measurement {:?}", other),
        }
    }

    #[test]
    fn test_best_available_averages_both_sides() {
        let config = ExerciseConfig::biceps();
        // Left arm straight (180°), right arm at 90°
        let pose = Pose::from_keypoints([
            kp(KeypointName::LeftShoulder, 100.0, 100.0),
            kp(KeypointName::LeftElbow, 100.0, 200.0),
            kp(KeypointName::LeftWrist, 100.0, 300.0),
            kp(KeypointName::RightShoulder, 400.0, 100.0),
            kp(KeypointName::RightElbow, 400.0, 200.0),
            kp(KeypointName::RightWrist, 300.0, 200.0),
        ]);
        match measure(&config.signal, &config.gate, &pose) {
            Some(Measurement::Angle(angle)) => assert_abs_diff_eq!(angle, 135.0, epsilon = 0.01),
            other => panic!("unexpected measurement {:?}", other),
        }
    }

    #[test]
    fn test_degenerate_side_falls_back_to_other() {
        let config = ExerciseConfig::biceps();
        // Left elbow sits on the left wrist, right arm at 90°
        let pose = Pose::from_keypoints([
            kp(KeypointName::LeftShoulder, 100.0, 100.0),
            kp(KeypointName::LeftElbow, 100.0, 200.0),
            kp(KeypointName::LeftWrist, 100.0, 200.0),
            kp(KeypointName::RightShoulder, 400.0, 100.0),
            kp(KeypointName::RightElbow, 400.0, 200.0),
            kp(KeypointName::RightWrist, 300.0, 200.0),
        ]);
        match measure(&config.signal, &config.gate, &pose) {
            Some(Measurement::Angle(angle)) => assert_abs_diff_eq!(angle, 90.0, epsilon = 0.01),
            other => panic!("unexpected measurement {:?}", other),
        }
    }

    #[test]
    fn test_torso_guard_skips_upright_body() {
        let config = ExerciseConfig::push_up();
        let arm = [
            kp(KeypointName::LeftShoulder, 100.0, 100.0),
            kp(KeypointName::LeftElbow, 100.0, 200.0),
            kp(KeypointName::LeftWrist, 200.0, 200.0),
        ];

        let upright = Pose::from_keypoints(arm.into_iter().chain([
            kp(KeypointName::Nose, 100.0, 50.0),
            kp(KeypointName::LeftHip, 100.0, 350.0),
        ]));
        assert_eq!(measure(&config.signal, &config.gate, &upright), None);

        let horizontal = Pose::from_keypoints(arm.into_iter().chain([
            kp(KeypointName::Nose, 0.0, 120.0),
            kp(KeypointName::LeftHip, 350.0, 140.0),
        ]));
        assert!(matches!(
            measure(&config.signal, &config.gate, &horizontal),
            Some(Measurement::Angle(_))
        ));
    }

    #[test]
    fn test_spread_classification() {
        let config = ExerciseConfig::jumping_jack();
        let open = Pose::from_keypoints([
            kp(KeypointName::LeftShoulder, 280.0, 200.0),
            kp(KeypointName::RightShoulder, 360.0, 200.0),
            kp(KeypointName::LeftWrist, 240.0, 100.0),
            kp(KeypointName::RightWrist, 400.0, 100.0),
            kp(KeypointName::LeftHip, 300.0, 350.0),
            kp(KeypointName::RightHip, 340.0, 350.0),
            kp(KeypointName::LeftAnkle, 260.0, 470.0),
            kp(KeypointName::RightAnkle, 380.0, 470.0),
        ]);
        match measure(&config.signal, &config.gate, &open) {
            Some(Measurement::Spread { ratio, zone }) => {
                assert_abs_diff_eq!(ratio, 3.0, epsilon = 1e-4);
                assert_eq!(zone, Zone::Enter);
            }
            other => panic!("unexpected measurement {:?}", other),
        }
    }

    #[test]
    fn test_zero_hip_width_is_skipped() {
        let config = ExerciseConfig::jumping_jack();
        let pose = Pose::from_keypoints([
            kp(KeypointName::LeftShoulder, 280.0, 200.0),
            kp(KeypointName::RightShoulder, 360.0, 200.0),
            kp(KeypointName::LeftWrist, 240.0, 100.0),
            kp(KeypointName::RightWrist, 400.0, 100.0),
            kp(KeypointName::LeftHip, 320.0, 350.0),
            kp(KeypointName::RightHip, 320.0, 350.0),
            kp(KeypointName::LeftAnkle, 260.0, 470.0),
            kp(KeypointName::RightAnkle, 380.0, 470.0),
        ]);
        assert_eq!(measure(&config.signal, &config.gate, &pose), None);
    }

    #[test]
    fn test_ankle_height_needs_both_ankles() {
        let config = ExerciseConfig::vertical_jump();
        let one = Pose::from_keypoints([kp(KeypointName::LeftAnkle, 300.0, 400.0)]);
        assert_eq!(measure(&config.signal, &config.gate, &one), None);

        let both = Pose::from_keypoints([
            kp(KeypointName::LeftAnkle, 300.0, 400.0),
            kp(KeypointName::RightAnkle, 340.0, 410.0),
        ]);
        assert_eq!(
            measure(&config.signal, &config.gate, &both),
            Some(Measurement::AnkleHeight(405.0))
        );
    }

    #[test]
    fn test_non_finite_ankle_is_skipped() {
        let config = ExerciseConfig::vertical_jump();
        let pose = Pose::from_keypoints([
            kp(KeypointName::LeftAnkle, 300.0, f32::NAN),
            kp(KeypointName::RightAnkle, 340.0, 410.0),
        ]);
        assert_eq!(measure(&config.signal, &config.gate, &pose), None);

        // Finite ankles whose mean overflows
        let pose = Pose::from_keypoints([
            kp(KeypointName::LeftAnkle, 300.0, f32::MAX),
            kp(KeypointName::RightAnkle, 340.0, f32::MAX),
        ]);
        assert_eq!(measure(&config.signal, &config.gate, &pose), None);
    }

    #[test]
    fn test_non_finite_hip_skips_spread() {
        let config = ExerciseConfig::jumping_jack();
        let pose = Pose::from_keypoints([
            kp(KeypointName::LeftShoulder, 280.0, 200.0),
            kp(KeypointName::RightShoulder, 360.0, 200.0),
            kp(KeypointName::LeftWrist, 240.0, 100.0),
            kp(KeypointName::RightWrist, 400.0, 100.0),
            kp(KeypointName::LeftHip, f32::NAN, 350.0),
            kp(KeypointName::RightHip, 340.0, 350.0),
            kp(KeypointName::LeftAnkle, 260.0, 470.0),
            kp(KeypointName::RightAnkle, 380.0, 470.0),
        ]);
        assert_eq!(measure(&config.signal, &config.gate, &pose), None);
    }

    #[test]
    fn test_non_finite_nose_fails_torso_guard() {
        let config = ExerciseConfig::push_up();
        let pose = Pose::from_keypoints([
            kp(KeypointName::LeftShoulder, 100.0, 100.0),
            kp(KeypointName::LeftElbow, 100.0, 200.0),
            kp(KeypointName::LeftWrist, 200.0, 200.0),
            kp(KeypointName::Nose, 0.0, f32::NAN),
            kp(KeypointName::LeftHip, 350.0, 140.0),
        ]);
        assert_eq!(measure(&config.signal, &config.gate, &pose), None);
    }
}
