//! Joint angle calculation using dot product
//!
//! Angle at vertex B between the segments B→A and B→C, e.g. the knee angle
//! from hip→knee→ankle or the elbow angle from shoulder→elbow→wrist.

use nalgebra::Vector2;

/// Vectors shorter than this are treated as coincident points
const MIN_SEGMENT_LENGTH: f32 = 1e-4;

/// Calculate angle ABC in degrees
///
/// Uses dot product formula: cos(θ) = (BA · BC) / (|BA| × |BC|)
///
/// Returns angle in [0, 180]:
/// - 90° = joint bent at a right angle
/// - 180° = limb fully straight
///
/// Returns None when A or C coincides with B, or any coordinate is not finite.
pub fn joint_angle(a: (f32, f32), b: (f32, f32), c: (f32, f32)) -> Option<f32> {
    let vertex = Vector2::new(b.0, b.1);
    let ba = Vector2::new(a.0, a.1) - vertex;
    let bc = Vector2::new(c.0, c.1) - vertex;

    let mag_ba = ba.norm();
    let mag_bc = bc.norm();

    if !mag_ba.is_finite() || !mag_bc.is_finite() {
        return None;
    }
    if mag_ba < MIN_SEGMENT_LENGTH || mag_bc < MIN_SEGMENT_LENGTH {
        return None;
    }

    let cos_angle = (ba.dot(&bc) / (mag_ba * mag_bc)).clamp(-1.0, 1.0);
    Some(cos_angle.acos().to_degrees())
}

/// Euclidean distance between two points
pub fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    (Vector2::new(a.0, a.1) - Vector2::new(b.0, b.1)).norm()
}

pub fn midpoint(a: (f32, f32), b: (f32, f32)) -> (f32, f32) {
    ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)
}
