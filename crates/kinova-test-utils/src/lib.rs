//! Shared test fixtures and utilities for kinova crates.
//!
//! Provides the stock Gen3 Lite chain, documented reference poses and
//! deterministic RNG setup.

pub mod fixtures;
pub mod rng;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use fixtures::{
    HOME_JOINTS, IMPOSSIBLE_POSE, ZERO_POSE, default_solver, gen3_lite_chain, kinematics,
};
pub use rng::{random_joint_vector, seeded_rng};
