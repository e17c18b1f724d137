//! Gen3 Lite chain fixtures and reference poses.

use std::sync::Arc;

use kinova_core::{ChainSpec, JointVector, Pose};
use kinova_ik::{ChainModel, Kinematics, LmSolver};

/// Documented tool pose near the zero configuration.
///
/// Lies about 5e-5 m beyond full extension, so it is reached only within the
/// solver's acceptance tolerance.
pub const ZERO_POSE: Pose = Pose::new(0.057, -0.01, 1.0033, 0.0, 0.0, 90.0);

/// Documented home configuration, degrees.
pub const HOME_JOINTS: JointVector = JointVector::from_degrees([0.0, 344.0, 75.0, 0.0, 300.0, 0.0]);

/// A target hundreds of meters away from the base.
pub const IMPOSSIBLE_POSE: Pose = Pose::new(238.72, 281.58, 834.21, 0.0, 315.0, 225.0);

/// The built-in Gen3 Lite chain from base to tool frame.
///
/// # Panics
///
/// Panics if the built-in description fails to parse or validate.
pub fn gen3_lite_chain() -> ChainModel {
    let model = kinova_urdf::gen3_lite().expect("built-in Gen3 Lite URDF parses");
    ChainModel::build(&model, &ChainSpec::default()).expect("built-in Gen3 Lite chain is valid")
}

/// Solver with default settings.
pub fn default_solver() -> LmSolver {
    LmSolver::with_defaults()
}

/// Gen3 Lite chain and default solver bundled for request handling.
pub fn kinematics() -> Arc<Kinematics> {
    Arc::new(Kinematics::new(gen3_lite_chain(), default_solver()))
}
