//! URDF parsing into a kinematic robot model.
//!
//! Keeps the part of a URDF description that forward and inverse kinematics
//! need (joint origins, axes, types and limits) and ships the Kinova Gen3
//! Lite description as a built-in model.

pub mod error;
pub mod parser;
pub mod robots;
pub mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use error::UrdfError;
pub use parser::{parse_file, parse_string};
pub use robots::{GEN3_LITE_URDF, gen3_lite};
pub use types::{JointData, JointLimits, JointType, LinkData, Origin, RobotModel};
