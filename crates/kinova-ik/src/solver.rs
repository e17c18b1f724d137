//! Levenberg-Marquardt inverse-kinematics solver.
//!
//! Minimizes the 6D pose residual (position difference plus the log map of
//! the rotation difference) over the active link angles. Steps solve
//! `(JᵀJ + λI) δ = −Jᵀr`; the damping λ shrinks after an accepted step and
//! grows after a rejected one.

use nalgebra::{DMatrix, DVector, Isometry3, UnitQuaternion, Vector3};
use tracing::{debug, trace};

use kinova_core::{JacobianMethod, JointVector, Pose, SolveError, SolverConfig};

use crate::chain::ChainModel;
use crate::fk::{end_effector_transform, link_frames};

/// What the solver should target.
#[derive(Debug, Clone, PartialEq)]
pub enum IkTarget {
    /// Target position only (3 residual rows).
    Position(Vector3<f64>),
    /// Target full pose: position + orientation (6 residual rows).
    Pose(Isometry3<f64>),
}

impl IkTarget {
    const fn residual_dim(&self) -> usize {
        match self {
            Self::Position(_) => 3,
            Self::Pose(_) => 6,
        }
    }
}

impl From<&Pose> for IkTarget {
    fn from(pose: &Pose) -> Self {
        Self::Pose(pose.to_isometry())
    }
}

/// Why the iteration stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Residual norm fell below `tolerance`.
    Converged,
    /// The damped step became shorter than `step_tolerance`.
    SmallStep,
    /// The gradient `Jᵀr` vanished.
    SmallGradient,
    /// λ exceeded `max_damping` without finding a descent step.
    DampingLimit,
    /// The iteration budget ran out.
    MaxIterations,
}

/// Full outcome of a solve, for diagnostics.
#[derive(Debug, Clone)]
pub struct IkReport {
    /// Final full link-angle vector in radians.
    pub link_angles: Vec<f64>,
    /// Whether the final residual is within `accept_tolerance`.
    pub converged: bool,
    pub termination: Termination,
    pub iterations: u32,
    /// Final residual norm.
    pub residual: f64,
    /// Final position error (meters).
    pub position_error: f64,
    /// Final orientation error (radians). Zero for position-only targets.
    pub orientation_error: f64,
}

/// Levenberg-Marquardt IK solver.
#[derive(Debug, Clone, Default)]
pub struct LmSolver {
    config: SolverConfig,
}

impl LmSolver {
    pub const fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::default()
    }

    pub const fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve for the six active joint angles (degrees).
    ///
    /// `initial_guess` is a full link-angle vector in radians; inactive
    /// entries are carried through untouched.
    pub fn solve(
        &self,
        chain: &ChainModel,
        target: &IkTarget,
        initial_guess: &[f64],
    ) -> Result<JointVector, SolveError> {
        let report = self.solve_report(chain, target, initial_guess);
        if report.converged {
            Ok(chain.extract(&report.link_angles))
        } else {
            Err(SolveError::NoConvergence {
                iterations: report.iterations,
                residual: report.residual,
            })
        }
    }

    /// Run the solver and return the full report.
    ///
    /// # Panics
    ///
    /// Panics if `initial_guess.len() != chain.link_count()`.
    pub fn solve_report(
        &self,
        chain: &ChainModel,
        target: &IkTarget,
        initial_guess: &[f64],
    ) -> IkReport {
        assert_eq!(
            initial_guess.len(),
            chain.link_count(),
            "initial_guess.len() must equal chain link count"
        );

        let config = &self.config;
        let active = chain.active_indices();
        let n = active.len();

        let mut angles = initial_guess.to_vec();
        let mut r = residual(chain, &angles, target);
        let mut cost = r.norm_squared();
        let mut lambda = config.initial_damping;
        let mut iterations = 0u32;

        let termination = loop {
            if cost.sqrt() <= config.tolerance {
                break Termination::Converged;
            }
            if iterations >= config.max_iterations {
                break Termination::MaxIterations;
            }
            iterations += 1;

            let jacobian = self.jacobian(chain, &angles, target);
            let gradient = jacobian.transpose() * &r;
            if gradient.amax() < config.gradient_tolerance {
                break Termination::SmallGradient;
            }

            let damped = jacobian.transpose() * &jacobian + DMatrix::identity(n, n) * lambda;
            let Some(cholesky) = damped.cholesky() else {
                lambda *= config.damping_factor;
                if lambda > config.max_damping {
                    break Termination::DampingLimit;
                }
                continue;
            };
            let step = cholesky.solve(&(-gradient));
            if step.norm() < config.step_tolerance {
                break Termination::SmallStep;
            }

            let mut candidate = angles.clone();
            for (&index, delta) in active.iter().zip(step.iter()) {
                candidate[index] += delta;
            }
            let candidate_r = residual(chain, &candidate, target);
            let candidate_cost = candidate_r.norm_squared();

            if candidate_cost < cost {
                angles = candidate;
                r = candidate_r;
                cost = candidate_cost;
                lambda = (lambda / config.damping_factor).max(config.min_damping);
            } else {
                lambda *= config.damping_factor;
                if lambda > config.max_damping {
                    break Termination::DampingLimit;
                }
            }
            trace!(iteration = iterations, residual = cost.sqrt(), lambda, "lm step");
        };

        let residual_norm = cost.sqrt();
        let position_error = r.rows(0, 3).norm();
        let orientation_error = if r.len() == 6 {
            r.rows(3, 3).norm()
        } else {
            0.0
        };
        let converged = residual_norm <= config.accept_tolerance;

        debug!(
            iterations,
            residual = residual_norm,
            position_error,
            orientation_error,
            ?termination,
            converged,
            "ik solve finished"
        );

        IkReport {
            link_angles: angles,
            converged,
            termination,
            iterations,
            residual: residual_norm,
            position_error,
            orientation_error,
        }
    }

    fn jacobian(&self, chain: &ChainModel, angles: &[f64], target: &IkTarget) -> DMatrix<f64> {
        match self.config.jacobian {
            JacobianMethod::Numeric => {
                numeric_jacobian(chain, angles, target, self.config.finite_difference_step)
            }
            JacobianMethod::Geometric => geometric_jacobian(chain, angles, target),
        }
    }
}

/// Residual of the tool frame at `angles` against `target`.
fn residual(chain: &ChainModel, angles: &[f64], target: &IkTarget) -> DVector<f64> {
    pose_residual(&end_effector_transform(chain, angles), target)
}

/// `[p_cur - p_tgt; log(R_cur · R_tgtᵀ)]`, truncated to position rows for
/// position-only targets.
fn pose_residual(ee: &Isometry3<f64>, target: &IkTarget) -> DVector<f64> {
    match target {
        IkTarget::Position(position) => {
            let d = ee.translation.vector - position;
            DVector::from_column_slice(&[d.x, d.y, d.z])
        }
        IkTarget::Pose(pose) => {
            let d = ee.translation.vector - pose.translation.vector;
            let w = orientation_error(&(ee.rotation * pose.rotation.inverse()));
            DVector::from_column_slice(&[d.x, d.y, d.z, w.x, w.y, w.z])
        }
    }
}

/// Orientation error as a 3-vector (axis * angle) from a unit quaternion.
///
/// Uses `atan2` rather than `acos` so small rotations keep full precision.
fn orientation_error(q: &UnitQuaternion<f64>) -> Vector3<f64> {
    let w = q.scalar();
    let v = if w < 0.0 { -q.imag() } else { q.imag() };
    let s = v.norm();
    if s == 0.0 {
        return Vector3::zeros();
    }
    v * (2.0 * s.atan2(w.abs()) / s)
}

/// Central finite differences of the residual w.r.t. each active angle.
fn numeric_jacobian(
    chain: &ChainModel,
    angles: &[f64],
    target: &IkTarget,
    h: f64,
) -> DMatrix<f64> {
    let active = chain.active_indices();
    let mut jacobian = DMatrix::zeros(target.residual_dim(), active.len());
    let mut probe = angles.to_vec();

    for (col, &index) in active.iter().enumerate() {
        let original = probe[index];
        probe[index] = original + h;
        let plus = residual(chain, &probe, target);
        probe[index] = original - h;
        let minus = residual(chain, &probe, target);
        probe[index] = original;

        jacobian.set_column(col, &((plus - minus) / (2.0 * h)));
    }
    jacobian
}

/// Geometric Jacobian: `z_i × (p_ee − o_i)` for the position rows and `z_i`
/// for the orientation rows.
///
/// The orientation rows are exact only at zero orientation error.
fn geometric_jacobian(chain: &ChainModel, angles: &[f64], target: &IkTarget) -> DMatrix<f64> {
    let frames = link_frames(chain, angles);
    let ee_pos = frames.end_effector.translation.vector;
    let rows = target.residual_dim();
    let mut jacobian = DMatrix::zeros(rows, frames.axes.len());

    for (i, (z_i, o_i)) in frames.axes.iter().zip(&frames.origins).enumerate() {
        let linear = z_i.cross(&(ee_pos - o_i));
        jacobian[(0, i)] = linear.x;
        jacobian[(1, i)] = linear.y;
        jacobian[(2, i)] = linear.z;

        if rows == 6 {
            jacobian[(3, i)] = z_i.x;
            jacobian[(4, i)] = z_i.y;
            jacobian[(5, i)] = z_i.z;
        }
    }
    jacobian
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
