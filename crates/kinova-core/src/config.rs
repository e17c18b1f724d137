//! Calculator configuration loaded from TOML.
//!
//! Every field has a serde default, so an empty file yields the stock
//! Gen3 Lite setup. [`KinovaConfig::validate`] rejects unusable solver and
//! chain settings before any chain is built.
//!
//! ```
//! use kinova_core::KinovaConfig;
//!
//! let config = KinovaConfig::from_toml("[solver]\nmax_iterations = 200\n").unwrap();
//! assert_eq!(config.solver.max_iterations, 200);
//! assert_eq!(config.robot.chain.tip_link, "tool_frame");
//! assert!(config.validate().is_ok());
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

fn default_tip_link() -> String {
    "tool_frame".into()
}
const fn default_max_iterations() -> u32 {
    500
}
const fn default_tolerance() -> f64 {
    1e-10
}
const fn default_accept_tolerance() -> f64 {
    1e-3
}
const fn default_initial_damping() -> f64 {
    1e-2
}
const fn default_damping_factor() -> f64 {
    10.0
}
const fn default_min_damping() -> f64 {
    1e-4
}
const fn default_max_damping() -> f64 {
    1e8
}
const fn default_step_tolerance() -> f64 {
    1e-12
}
const fn default_gradient_tolerance() -> f64 {
    1e-14
}
const fn default_finite_difference_step() -> f64 {
    1e-6
}
fn default_address() -> String {
    "127.0.0.1:5000".into()
}

// ---------------------------------------------------------------------------
// KinovaConfig
// ---------------------------------------------------------------------------

/// Complete calculator configuration, usually loaded from a TOML file.
///
/// Every field has a default; an empty file yields the stock Gen3 Lite setup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KinovaConfig {
    #[serde(default)]
    pub robot: RobotConfig,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub server: ServerSettings,
}

impl KinovaConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.robot.validate()?;
        self.solver.validate()?;
        Ok(())
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// RobotConfig / ChainSpec
// ---------------------------------------------------------------------------

/// Which links of a robot description form the kinematic chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSpec {
    /// First link of the chain. `None` means the description's root link.
    #[serde(default)]
    pub base_link: Option<String>,
    /// Last link of the chain (the tool frame).
    #[serde(default = "default_tip_link")]
    pub tip_link: String,
    /// One flag per chain link (origin link included) marking the actuated
    /// joints. `None` marks every revolute joint on the path as active.
    #[serde(default)]
    pub active_links_mask: Option<Vec<bool>>,
}

impl Default for ChainSpec {
    fn default() -> Self {
        Self {
            base_link: None,
            tip_link: default_tip_link(),
            active_links_mask: None,
        }
    }
}

/// Robot description source plus chain selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotConfig {
    /// URDF file to load. `None` uses the built-in Gen3 Lite description.
    #[serde(default)]
    pub urdf_path: Option<PathBuf>,
    #[serde(flatten)]
    pub chain: ChainSpec,
}

impl RobotConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chain.tip_link.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "robot.tip_link".into(),
                message: "must not be empty".into(),
            });
        }
        if matches!(&self.chain.active_links_mask, Some(mask) if mask.is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "robot.active_links_mask".into(),
                message: "must not be empty".into(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SolverConfig
// ---------------------------------------------------------------------------

/// How the inverse-kinematics solver obtains its Jacobian.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JacobianMethod {
    /// Central finite differences of the full pose residual.
    #[default]
    Numeric,
    /// Analytic geometric Jacobian (joint axes and lever arms).
    Geometric,
}

/// Levenberg-Marquardt solver settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Iteration budget (accepted and rejected steps both count).
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Residual norm at which the solve stops early.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Largest final residual norm still reported as a solution.
    #[serde(default = "default_accept_tolerance")]
    pub accept_tolerance: f64,
    /// Starting damping factor (lambda).
    #[serde(default = "default_initial_damping")]
    pub initial_damping: f64,
    /// Multiplier applied to lambda on rejected steps (divisor on accepted).
    #[serde(default = "default_damping_factor")]
    pub damping_factor: f64,
    /// Lower bound for lambda. Keeps steps along near-singular directions
    /// (stretched arm, collinear wrist axes) from growing without bound.
    #[serde(default = "default_min_damping")]
    pub min_damping: f64,
    /// Lambda above which the solve is considered stagnant.
    #[serde(default = "default_max_damping")]
    pub max_damping: f64,
    /// Step norm (rad) below which the solve is considered stagnant.
    #[serde(default = "default_step_tolerance")]
    pub step_tolerance: f64,
    /// Gradient magnitude below which the solve is considered stagnant.
    #[serde(default = "default_gradient_tolerance")]
    pub gradient_tolerance: f64,
    /// Perturbation (rad) for finite-difference Jacobians.
    #[serde(default = "default_finite_difference_step")]
    pub finite_difference_step: f64,
    #[serde(default)]
    pub jacobian: JacobianMethod,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            accept_tolerance: default_accept_tolerance(),
            initial_damping: default_initial_damping(),
            damping_factor: default_damping_factor(),
            min_damping: default_min_damping(),
            max_damping: default_max_damping(),
            step_tolerance: default_step_tolerance(),
            gradient_tolerance: default_gradient_tolerance(),
            finite_difference_step: default_finite_difference_step(),
            jacobian: JacobianMethod::default(),
        }
    }
}

impl SolverConfig {
    /// Validate solver settings. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations == 0 {
            return Err(invalid("solver.max_iterations", "must be > 0"));
        }
        let positive = [
            ("solver.tolerance", self.tolerance),
            ("solver.accept_tolerance", self.accept_tolerance),
            ("solver.initial_damping", self.initial_damping),
            ("solver.min_damping", self.min_damping),
            ("solver.max_damping", self.max_damping),
            ("solver.step_tolerance", self.step_tolerance),
            ("solver.gradient_tolerance", self.gradient_tolerance),
            ("solver.finite_difference_step", self.finite_difference_step),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(field, "must be a finite value > 0"));
            }
        }
        if !(self.damping_factor.is_finite() && self.damping_factor > 1.0) {
            return Err(invalid("solver.damping_factor", "must be > 1"));
        }
        if self.min_damping > self.max_damping {
            return Err(invalid("solver.min_damping", "must be <= max_damping"));
        }
        if self.accept_tolerance < self.tolerance {
            return Err(invalid("solver.accept_tolerance", "must be >= tolerance"));
        }
        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// ServerSettings
// ---------------------------------------------------------------------------

/// Network settings for the request server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Address to bind (e.g. `127.0.0.1:5000`).
    #[serde(default = "default_address")]
    pub address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            address: default_address(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = KinovaConfig::from_toml("").unwrap();
        assert_eq!(config, KinovaConfig::default());
        assert_eq!(config.robot.chain.tip_link, "tool_frame");
        assert!(config.robot.urdf_path.is_none());
        assert_eq!(config.server.address, "127.0.0.1:5000");
    }

    #[test]
    fn default_solver_config_is_valid() {
        assert!(SolverConfig::default().validate().is_ok());
    }

    #[test]
    fn parses_full_config() {
        let text = r#"
            [robot]
            urdf_path = "robots/gen3_lite.urdf"
            base_link = "base_link"
            tip_link = "end_effector_link"
            active_links_mask = [false, true, true, true, true, true, true, false]

            [solver]
            max_iterations = 200
            jacobian = "geometric"

            [server]
            address = "0.0.0.0:7000"
        "#;
        let config = KinovaConfig::from_toml(text).unwrap();
        assert_eq!(
            config.robot.urdf_path.as_deref(),
            Some(Path::new("robots/gen3_lite.urdf"))
        );
        assert_eq!(config.robot.chain.base_link.as_deref(), Some("base_link"));
        assert_eq!(config.robot.chain.tip_link, "end_effector_link");
        assert_eq!(
            config.robot.chain.active_links_mask.as_ref().map(Vec::len),
            Some(8)
        );
        assert_eq!(config.solver.max_iterations, 200);
        assert_eq!(config.solver.jacobian, JacobianMethod::Geometric);
        assert!((config.solver.tolerance - 1e-10).abs() < f64::EPSILON);
        assert_eq!(config.server.address, "0.0.0.0:7000");
    }

    #[test]
    fn rejects_zero_iterations() {
        let err = KinovaConfig::from_toml("[solver]\nmax_iterations = 0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "solver.max_iterations"));
    }

    #[test]
    fn rejects_non_positive_tolerance() {
        let config = SolverConfig {
            tolerance: 0.0,
            ..SolverConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_damping_factor_at_most_one() {
        let config = SolverConfig {
            damping_factor: 1.0,
            ..SolverConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_inverted_damping_bounds() {
        let config = SolverConfig {
            min_damping: 10.0,
            max_damping: 1.0,
            ..SolverConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_mask() {
        let err = KinovaConfig::from_toml("[robot]\nactive_links_mask = []").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = KinovaConfig::from_toml("[solver\nmax_iterations = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn from_file_missing_is_io_error() {
        let err = KinovaConfig::from_file("/nonexistent/kinova.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
