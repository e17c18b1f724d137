//! kinova-core: pose and joint types, error taxonomy and configuration for
//! the Kinova kinematics calculator.

pub mod config;
pub mod error;
pub mod types;

pub use config::{ChainSpec, JacobianMethod, KinovaConfig, RobotConfig, ServerSettings, SolverConfig};
pub use error::{ConfigError, KinovaError, SolveError};
pub use types::{JOINT_COUNT, JointVector, Pose};

pub mod prelude {
    pub use crate::{
        ChainSpec, ConfigError, JOINT_COUNT, JacobianMethod, JointVector, KinovaConfig,
        KinovaError, Pose, RobotConfig, ServerSettings, SolveError, SolverConfig,
    };
}
