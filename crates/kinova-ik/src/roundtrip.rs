//! Round-trip validation.
//!
//! Each answer is checked by running the complementary transform on it and
//! then the first transform again; the drift between the first and third
//! results is reported as the error score. FK is single-valued while IK may
//! return any of several branches, so each direction compares in the space
//! where the comparison is well defined.

use std::sync::Arc;

use tracing::{debug, info};

use kinova_core::{ConfigError, JointVector, KinovaConfig, Pose, SolveError};
use kinova_urdf::{gen3_lite, parse_file};

use crate::chain::ChainModel;
use crate::fk::forward_joints;
use crate::metric::{joint_vector_rmse, pose_distance};
use crate::solver::{IkTarget, LmSolver};

/// A primary result plus its round-trip error score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundTrip<T> {
    pub value: T,
    /// Non-negative; zero is perfect consistency.
    pub error: f64,
}

/// IK from a zero initial guess.
pub fn inverse_kinematics(
    chain: &ChainModel,
    solver: &LmSolver,
    target: &Pose,
) -> Result<JointVector, SolveError> {
    let guess = vec![0.0; chain.link_count()];
    solver.solve(chain, &IkTarget::from(target), &guess)
}

/// IK from a zero initial guess, keeping the final estimate even when the
/// solve does not converge.
pub fn best_effort_inverse(
    chain: &ChainModel,
    solver: &LmSolver,
    target: &Pose,
) -> JointVector {
    let guess = vec![0.0; chain.link_count()];
    let report = solver.solve_report(chain, &IkTarget::from(target), &guess);
    if !report.converged {
        debug!(
            iterations = report.iterations,
            residual = report.residual,
            "round-trip solve stalled, scoring its last estimate"
        );
    }
    chain.extract(&report.link_angles)
}

/// IK(target) → `trip`, FK(trip) → `back`, IK(back) → `round`; scored by the
/// joint RMSE between `trip` and `round`.
///
/// Fails only when `trip` cannot be solved. A stalled second solve yields a
/// large score instead.
pub fn pose_to_joints(
    chain: &ChainModel,
    solver: &LmSolver,
    target: &Pose,
) -> Result<RoundTrip<JointVector>, SolveError> {
    let trip = inverse_kinematics(chain, solver, target)?;
    let back = forward_joints(chain, &trip);
    let round = best_effort_inverse(chain, solver, &back);
    let error = joint_vector_rmse(&trip, &round);
    debug!(error, "pose -> joints round trip");
    Ok(RoundTrip { value: trip, error })
}

/// FK(angles) → `trip`, IK(trip) → `back`, FK(back) → `round`; scored by the
/// pose distance between `trip` and `round`.
///
/// Always yields the forward pose; an IK stall only raises the score.
pub fn joints_to_pose(
    chain: &ChainModel,
    solver: &LmSolver,
    angles: &JointVector,
) -> RoundTrip<Pose> {
    let trip = forward_joints(chain, angles);
    let back = best_effort_inverse(chain, solver, &trip);
    let round = forward_joints(chain, &back);
    let error = pose_distance(&trip, &round);
    debug!(error, "joints -> pose round trip");
    RoundTrip { value: trip, error }
}

/// A shared chain plus a solver: everything a request handler needs.
#[derive(Debug, Clone)]
pub struct Kinematics {
    chain: Arc<ChainModel>,
    solver: LmSolver,
}

impl Kinematics {
    pub fn new(chain: impl Into<Arc<ChainModel>>, solver: LmSolver) -> Self {
        Self {
            chain: chain.into(),
            solver,
        }
    }

    /// Load the robot description named by `config` (the built-in Gen3 Lite
    /// when no URDF path is set) and build the chain and solver.
    pub fn from_config(config: &KinovaConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let model = match &config.robot.urdf_path {
            Some(path) => {
                info!(path = %path.display(), "loading robot description");
                parse_file(path)?
            }
            None => gen3_lite()?,
        };
        let chain = ChainModel::build(&model, &config.robot.chain)?;
        Ok(Self::new(chain, LmSolver::new(config.solver.clone())))
    }

    /// Stock Gen3 Lite chain with default solver settings.
    pub fn gen3_lite() -> Result<Self, ConfigError> {
        Self::from_config(&KinovaConfig::default())
    }

    pub fn chain(&self) -> &ChainModel {
        &self.chain
    }

    pub const fn solver(&self) -> &LmSolver {
        &self.solver
    }

    /// Forward kinematics for six joint angles (degrees).
    pub fn forward(&self, angles: &JointVector) -> Pose {
        forward_joints(&self.chain, angles)
    }

    /// Inverse kinematics from a zero initial guess.
    pub fn inverse(&self, target: &Pose) -> Result<JointVector, SolveError> {
        inverse_kinematics(&self.chain, &self.solver, target)
    }

    pub fn pose_to_joints(&self, target: &Pose) -> Result<RoundTrip<JointVector>, SolveError> {
        pose_to_joints(&self.chain, &self.solver, target)
    }

    pub fn joints_to_pose(&self, angles: &JointVector) -> RoundTrip<Pose> {
        joints_to_pose(&self.chain, &self.solver, angles)
    }
}
