//! Request handling: coerce loose fields, run a round trip, build the
//! response envelope.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use kinova_core::types::round_to;
use kinova_core::{JointVector, Pose};
use kinova_ik::Kinematics;

use crate::protocol::{Operation, Request, Response, coerce_fields};

/// Pose fields read by [`compute_inverse`], in order.
pub const POSE_FIELDS: [&str; 6] = ["x", "y", "z", "thetaX", "thetaY", "thetaZ"];

/// Joint fields read by [`compute_forward`], in order.
pub const ANGLE_FIELDS: [&str; 6] = ["angle1", "angle2", "angle3", "angle4", "angle5", "angle6"];

/// Decimal places kept in reported joint angles and error scores.
const REPORT_DECIMALS: i32 = 2;

/// Pose fields -> joint angles plus round-trip error.
pub fn compute_inverse(kin: &Kinematics, fields: &Map<String, Value>) -> Response {
    let [x, y, z, theta_x, theta_y, theta_z] = match coerce_fields(fields, POSE_FIELDS) {
        Ok(values) => values,
        Err(err) => return invalid_input(&err),
    };
    let target = Pose::new(x, y, z, theta_x, theta_y, theta_z);

    match kin.pose_to_joints(&target) {
        Ok(result) => {
            debug!(error = result.error, "inverse kinematics solved");
            Response::inverse(
                result.value.rounded(REPORT_DECIMALS),
                round_to(result.error, REPORT_DECIMALS),
            )
        }
        Err(err) => {
            warn!(%err, ?target, "inverse kinematics failed");
            Response::failure("Failed to solve inverse kinematics")
        }
    }
}

/// Joint angle fields -> tool pose plus round-trip error.
pub fn compute_forward(kin: &Kinematics, fields: &Map<String, Value>) -> Response {
    let angles = match coerce_fields(fields, ANGLE_FIELDS) {
        Ok(values) => JointVector::from_degrees(values),
        Err(err) => return invalid_input(&err),
    };

    let result = kin.joints_to_pose(&angles);
    debug!(error = result.error, "forward kinematics validated");
    Response::forward(result.value, round_to(result.error, REPORT_DECIMALS))
}

/// Robot name, active joint names and link count.
pub fn robot_info(kin: &Kinematics) -> Response {
    let chain = kin.chain();
    Response::Info {
        success: true,
        robot: chain.robot_name().to_owned(),
        joints: chain.joint_names().into_iter().map(str::to_owned).collect(),
        links: chain.link_count(),
    }
}

/// Dispatch one request.
pub fn handle_request(kin: &Kinematics, request: &Request) -> Response {
    match request.op {
        Operation::Cartesian2Angular => compute_inverse(kin, &request.data),
        Operation::Angular2Cartesian => compute_forward(kin, &request.data),
        Operation::Info => robot_info(kin),
        Operation::Close => Response::ack(),
    }
}

fn invalid_input(err: &impl std::fmt::Display) -> Response {
    debug!(%err, "rejecting request");
    Response::failure(format!("Invalid input: {err}"))
}
