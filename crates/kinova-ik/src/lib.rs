//! Forward and inverse kinematics for a six-joint revolute arm.
//!
//! # Architecture
//!
//! ```text
//! RobotModel ──► ChainModel ──► forward_kinematics ──► Pose
//!                    │
//!                    └──► LmSolver ──► JointVector
//! ```
//!
//! The [`ChainModel`] is extracted from a [`RobotModel`](kinova_urdf::RobotModel)
//! once at startup and shared read-only afterwards. [`Kinematics`] bundles it
//! with a solver and exposes the round-trip validated entry points
//! [`Kinematics::pose_to_joints`] and [`Kinematics::joints_to_pose`].

pub mod chain;
pub mod fk;
pub mod metric;
pub mod roundtrip;
pub mod solver;

pub use chain::{ChainModel, Link, LinkKind};
pub use fk::{LinkFrames, end_effector_transform, forward_joints, forward_kinematics, link_frames};
pub use metric::{ORIENTATION_WEIGHT, angular_difference, joint_vector_rmse, pose_distance};
pub use roundtrip::{
    Kinematics, RoundTrip, best_effort_inverse, inverse_kinematics, joints_to_pose, pose_to_joints,
};
pub use solver::{IkReport, IkTarget, LmSolver, Termination};
