//! Value types exchanged with the kinematics core.
//!
//! Angles cross the API boundary in **degrees**; everything inside the
//! solver works in radians. Orientation uses the intrinsic Z-Y-X Euler
//! sequence: `R = Rz(theta_z) * Ry(theta_y) * Rx(theta_x)`.

use std::ops::{Index, IndexMut};

use nalgebra::{Isometry3, Matrix3, Rotation3, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Number of actuated joints on the arm.
pub const JOINT_COUNT: usize = 6;

// ---------------------------------------------------------------------------
// JointVector
// ---------------------------------------------------------------------------

/// Six joint angles in degrees, ordered joint 1..6.
///
/// Values are not range-checked or wrapped: `370.0` and `10.0` are distinct
/// values that describe the same physical joint position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JointVector(pub [f64; JOINT_COUNT]);

impl JointVector {
    /// All joints at zero.
    pub const fn zeros() -> Self {
        Self([0.0; JOINT_COUNT])
    }

    /// Build from angles in degrees.
    pub const fn from_degrees(degrees: [f64; JOINT_COUNT]) -> Self {
        Self(degrees)
    }

    /// Build from angles in radians.
    pub fn from_radians(radians: [f64; JOINT_COUNT]) -> Self {
        Self(radians.map(f64::to_degrees))
    }

    /// Angles in degrees.
    pub const fn degrees(&self) -> &[f64; JOINT_COUNT] {
        &self.0
    }

    /// Angles converted to radians.
    pub fn to_radians(&self) -> [f64; JOINT_COUNT] {
        self.0.map(f64::to_radians)
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.0.iter()
    }

    /// Copy with every angle rounded to `decimals` decimal places.
    #[must_use]
    pub fn rounded(&self, decimals: i32) -> Self {
        Self(self.0.map(|a| round_to(a, decimals)))
    }
}

impl Index<usize> for JointVector {
    type Output = f64;
    fn index(&self, i: usize) -> &f64 {
        &self.0[i]
    }
}

impl IndexMut<usize> for JointVector {
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        &mut self.0[i]
    }
}

impl From<[f64; JOINT_COUNT]> for JointVector {
    fn from(degrees: [f64; JOINT_COUNT]) -> Self {
        Self(degrees)
    }
}

// ---------------------------------------------------------------------------
// Pose
// ---------------------------------------------------------------------------

/// End-effector pose: position in meters, orientation as Z-Y-X Euler angles
/// in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(rename = "thetaX")]
    pub theta_x: f64,
    #[serde(rename = "thetaY")]
    pub theta_y: f64,
    #[serde(rename = "thetaZ")]
    pub theta_z: f64,
}

impl Pose {
    pub const fn new(x: f64, y: f64, z: f64, theta_x: f64, theta_y: f64, theta_z: f64) -> Self {
        Self {
            x,
            y,
            z,
            theta_x,
            theta_y,
            theta_z,
        }
    }

    /// Position vector `[x, y, z]`.
    pub const fn position(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Orientation angles `[theta_x, theta_y, theta_z]` in degrees.
    pub const fn orientation(&self) -> [f64; 3] {
        [self.theta_x, self.theta_y, self.theta_z]
    }

    /// Rotation matrix `Rz * Ry * Rx` built from the Euler angles.
    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        matrix_from_euler_zyx(
            self.theta_x.to_radians(),
            self.theta_y.to_radians(),
            self.theta_z.to_radians(),
        )
    }

    /// Rigid transform equivalent to this pose.
    pub fn to_isometry(&self) -> Isometry3<f64> {
        let rotation = UnitQuaternion::from_rotation_matrix(
            &Rotation3::from_matrix_unchecked(self.rotation_matrix()),
        );
        Isometry3::from_parts(Translation3::new(self.x, self.y, self.z), rotation)
    }

    /// Decompose a rigid transform into a pose.
    ///
    /// Inverse of [`Pose::to_isometry`] up to Euler-angle equivalence: the
    /// returned `theta_y` lies in `[-90, 90]`, the others in `(-180, 180]`.
    pub fn from_isometry(iso: &Isometry3<f64>) -> Self {
        let t = iso.translation.vector;
        let m = iso.rotation.to_rotation_matrix().into_inner();
        let [roll, pitch, yaw] = euler_zyx_from_matrix(&m);
        Self::new(
            t.x,
            t.y,
            t.z,
            roll.to_degrees(),
            pitch.to_degrees(),
            yaw.to_degrees(),
        )
    }
}

// ---------------------------------------------------------------------------
// Euler helpers
// ---------------------------------------------------------------------------

/// Below this value of `cos(pitch)` the decomposition treats the rotation as
/// gimbal-locked and folds all roll into yaw.
const GIMBAL_EPSILON: f64 = 1e-10;

/// Rotation matrix `Rz(yaw) * Ry(pitch) * Rx(roll)` (angles in radians).
pub fn matrix_from_euler_zyx(roll: f64, pitch: f64, yaw: f64) -> Matrix3<f64> {
    let (sr, cr) = roll.sin_cos();
    let (sp, cp) = pitch.sin_cos();
    let (sy, cy) = yaw.sin_cos();

    Matrix3::new(
        cy * cp,
        cy * sp * sr - sy * cr,
        cy * sp * cr + sy * sr,
        sy * cp,
        sy * sp * sr + cy * cr,
        sy * sp * cr - cy * sr,
        -sp,
        cp * sr,
        cp * cr,
    )
}

/// `[roll, pitch, yaw]` (radians) such that
/// `matrix_from_euler_zyx(roll, pitch, yaw) == m`.
pub fn euler_zyx_from_matrix(m: &Matrix3<f64>) -> [f64; 3] {
    let cos_pitch = m[(0, 0)].hypot(m[(1, 0)]);
    let pitch = (-m[(2, 0)]).atan2(cos_pitch);

    if cos_pitch > GIMBAL_EPSILON {
        let roll = m[(2, 1)].atan2(m[(2, 2)]);
        let yaw = m[(1, 0)].atan2(m[(0, 0)]);
        [roll, pitch, yaw]
    } else {
        let yaw = (-m[(0, 1)]).atan2(m[(1, 1)]);
        [0.0, pitch, yaw]
    }
}

/// Round `value` to `decimals` decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn joint_vector_radians_roundtrip() {
        let j = JointVector::from_degrees([0.0, 344.0, 75.0, 0.0, 300.0, 0.0]);
        let back = JointVector::from_radians(j.to_radians());
        for i in 0..JOINT_COUNT {
            assert_relative_eq!(back[i], j[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn joint_vector_rounded() {
        let j = JointVector::from_degrees([1.234, -5.678, 0.005, 10.0, 359.999, -0.001]);
        assert_eq!(j.rounded(2).0, [1.23, -5.68, 0.01, 10.0, 360.0, -0.0]);
    }

    #[test]
    fn joint_vector_serializes_as_array() {
        let j = JointVector::from_degrees([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let json = serde_json::to_string(&j).unwrap();
        assert_eq!(json, "[1.0,2.0,3.0,4.0,5.0,6.0]");
    }

    #[test]
    fn pose_uses_camel_case_angle_names() {
        let pose = Pose::new(0.1, 0.2, 0.3, 10.0, 20.0, 30.0);
        let json = serde_json::to_string(&pose).unwrap();
        assert!(json.contains("\"thetaX\":10.0"));
        assert!(json.contains("\"thetaZ\":30.0"));
        let back: Pose = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pose);
    }

    #[test]
    fn euler_matrix_matches_nalgebra_convention() {
        let (roll, pitch, yaw) = (0.3, -0.7, 2.1);
        let ours = matrix_from_euler_zyx(roll, pitch, yaw);
        let theirs = Rotation3::from_euler_angles(roll, pitch, yaw).into_inner();
        assert_relative_eq!(ours, theirs, epsilon = 1e-12);
    }

    #[test]
    fn euler_decomposition_inverts_construction() {
        let angles = [0.4, 1.2, -2.9];
        let m = matrix_from_euler_zyx(angles[0], angles[1], angles[2]);
        let back = euler_zyx_from_matrix(&m);
        for (a, b) in angles.iter().zip(back.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn euler_decomposition_gimbal_lock_preserves_rotation() {
        let m = matrix_from_euler_zyx(0.5, std::f64::consts::FRAC_PI_2, 0.25);
        let [roll, pitch, yaw] = euler_zyx_from_matrix(&m);
        assert_relative_eq!(roll, 0.0);
        let rebuilt = matrix_from_euler_zyx(roll, pitch, yaw);
        assert_relative_eq!(rebuilt, m, epsilon = 1e-9);
    }

    #[test]
    fn pose_isometry_roundtrip() {
        let pose = Pose::new(0.44, 0.19, 0.45, -90.5, -0.87, 150.0);
        let back = Pose::from_isometry(&pose.to_isometry());
        assert_relative_eq!(back.x, pose.x, epsilon = 1e-12);
        assert_relative_eq!(back.y, pose.y, epsilon = 1e-12);
        assert_relative_eq!(back.z, pose.z, epsilon = 1e-12);
        assert_relative_eq!(back.theta_x, pose.theta_x, epsilon = 1e-9);
        assert_relative_eq!(back.theta_y, pose.theta_y, epsilon = 1e-9);
        assert_relative_eq!(back.theta_z, pose.theta_z, epsilon = 1e-9);
    }

    #[test]
    fn pose_rotation_is_z_then_y_then_x() {
        // Pure 90 deg yaw maps +X onto +Y.
        let pose = Pose::new(0.0, 0.0, 0.0, 0.0, 0.0, 90.0);
        let v = pose.to_isometry().rotation * Vector3::x();
        assert_relative_eq!(v, Vector3::y(), epsilon = 1e-12);
    }

    #[test]
    fn round_to_two_places() {
        assert_relative_eq!(round_to(1.005_1, 2), 1.01);
        assert_relative_eq!(round_to(-2.344, 2), -2.34);
        assert_relative_eq!(round_to(0.0, 2), 0.0);
    }
}
