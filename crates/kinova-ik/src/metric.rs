//! Wraparound-aware distances between joint vectors and poses.
//!
//! All angles here are in degrees.

use kinova_core::{JointVector, Pose};

/// Weight applied to the orientation RMSE (degrees) when combining it with
/// the Euclidean position distance (meters).
pub const ORIENTATION_WEIGHT: f64 = 0.1;

/// Smallest absolute difference between two angles, in `[0, 180]`.
pub fn angular_difference(a: f64, b: f64) -> f64 {
    let diff = (a.rem_euclid(360.0) - b.rem_euclid(360.0)).abs();
    if diff > 180.0 { 360.0 - diff } else { diff }
}

/// Root mean square of the pairwise angular differences.
pub fn joint_vector_rmse(a: &JointVector, b: &JointVector) -> f64 {
    rms(a.iter().zip(b.iter()).map(|(&x, &y)| angular_difference(x, y)))
}

/// `sqrt(d² + (k · angleRMSE)²)` where `d` is the Euclidean distance between
/// the positions and `angleRMSE` the RMS of the three orientation
/// differences.
pub fn pose_distance(a: &Pose, b: &Pose) -> f64 {
    let d = (a.position() - b.position()).norm();
    let angle_rmse = rms(
        a.orientation()
            .into_iter()
            .zip(b.orientation())
            .map(|(x, y)| angular_difference(x, y)),
    );
    d.hypot(ORIENTATION_WEIGHT * angle_rmse)
}

#[allow(clippy::cast_precision_loss)]
fn rms(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v * v, count + 1));
    if count == 0 {
        0.0
    } else {
        (sum / count as f64).sqrt()
    }
}
