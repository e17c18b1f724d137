use thiserror::Error;

/// Top-level error type for the kinematics calculator.
#[derive(Debug, Error)]
pub enum KinovaError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Solve error: {0}")]
    Solve(#[from] SolveError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration and robot-description errors.
///
/// Fatal at startup: a chain that fails validation is never usable.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("URDF error: {0}")]
    Urdf(String),

    #[error("Tip link '{tip}' is not reachable from base link '{base}'")]
    ChainDisconnected { base: String, tip: String },

    #[error("Active link mask has {got} entries but the chain has {expected} links")]
    MaskLengthMismatch { expected: usize, got: usize },

    #[error("Expected {expected} active revolute joints, found {got}")]
    ActiveJointCount { expected: usize, got: usize },

    #[error("Link '{link}' cannot be active: unsupported joint type {joint_type}")]
    UnsupportedJoint { link: String, joint_type: String },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Inverse-kinematics outcomes that are not a solution.
///
/// Copy + small payload: returned on every unreachable target, which is a
/// routine outcome rather than a fault.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SolveError {
    #[error("Inverse kinematics did not converge after {iterations} iterations (residual {residual:.3e})")]
    NoConvergence { iterations: u32, residual: f64 },
}
