//! Robot descriptions compiled into the binary.

use crate::error::UrdfError;
use crate::parser::parse_string;
use crate::types::RobotModel;

/// URDF of the Kinova Gen3 Lite arm, from `base_link` to `tool_frame`.
pub const GEN3_LITE_URDF: &str = include_str!("../urdf/gen3_lite.urdf");

/// Parse the built-in Gen3 Lite description.
pub fn gen3_lite() -> Result<RobotModel, UrdfError> {
    parse_string(GEN3_LITE_URDF)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn gen3_lite_parses() {
        let model = gen3_lite().unwrap();
        assert_eq!(model.name, "gen3_lite");
        assert_eq!(model.root_link, "base_link");
        assert_eq!(model.dof(), 6);
        assert_eq!(model.joints.len(), 8);
    }

    #[test]
    fn gen3_lite_path_to_tool_frame() {
        let model = gen3_lite().unwrap();
        let path = model.path_between("base_link", "tool_frame").unwrap();
        let names: Vec<&str> = path.iter().map(|j| j.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "joint_1",
                "joint_2",
                "joint_3",
                "joint_4",
                "joint_5",
                "joint_6",
                "end_effector",
                "tool_frame_joint",
            ]
        );
    }

    #[test]
    fn gen3_lite_joint_limits() {
        let model = gen3_lite().unwrap();
        let lim = model.joint("joint_1").unwrap().limits;
        assert_relative_eq!(lim.lower.unwrap(), -2.68);
        assert_relative_eq!(lim.upper.unwrap(), 2.68);
    }
}
