//! Kinematic chain extracted from a URDF [`RobotModel`].
//!
//! A [`ChainModel`] is an ordered list of links from the base link to the
//! tool frame. Index 0 is an identity origin link named after the base; every
//! following link corresponds to one URDF joint on the path and stores that
//! joint's static origin plus, for revolute joints, its rotation axis. A
//! boolean mask marks the six actuated links whose order defines the
//! canonical joint-angle vector.

use nalgebra::{Isometry3, Rotation3, Translation3, UnitQuaternion, UnitVector3, Vector3};
use tracing::{debug, info};

use kinova_core::types::matrix_from_euler_zyx;
use kinova_core::{ChainSpec, ConfigError, JOINT_COUNT, JointVector};
use kinova_urdf::{JointLimits, JointType, Origin, RobotModel};

/// Axis norms below this are treated as degenerate.
const AXIS_EPSILON: f64 = 1e-12;

/// Motion type of a chain link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinkKind {
    /// Rigid offset only.
    Fixed,
    /// Rotation about `axis`, expressed in the link's local frame.
    Revolute { axis: UnitVector3<f64> },
}

/// A single link in the chain.
#[derive(Debug, Clone)]
pub struct Link {
    /// Joint name from URDF (the origin link carries the base link name).
    pub name: String,
    /// Static transform from the previous link frame to this link's joint frame.
    pub origin: Isometry3<f64>,
    pub kind: LinkKind,
    /// Whether the link's angle is driven by the joint vector.
    pub active: bool,
    /// Mechanical limits from URDF. Informational only.
    pub limits: JointLimits,
}

impl Link {
    /// Transform contributed by this link at `angle` (radians).
    ///
    /// Inactive and fixed links ignore the angle.
    pub fn transform(&self, angle: f64) -> Isometry3<f64> {
        match self.kind {
            LinkKind::Revolute { axis } if self.active => {
                self.origin * joint_rotation(&axis, angle)
            }
            _ => self.origin,
        }
    }
}

/// An immutable, validated kinematic chain with exactly
/// [`JOINT_COUNT`] active revolute links.
#[derive(Debug, Clone)]
pub struct ChainModel {
    robot_name: String,
    base_link: String,
    tip_link: String,
    links: Vec<Link>,
    /// Indices of active links, in canonical joint order.
    active: Vec<usize>,
}

impl ChainModel {
    /// Build a chain from a [`RobotModel`].
    ///
    /// Traces the unique joint path from the base link to the tip link. When
    /// `spec.active_links_mask` is absent, every revolute or continuous joint
    /// on the path is active.
    pub fn build(model: &RobotModel, spec: &ChainSpec) -> Result<Self, ConfigError> {
        let base = spec.base_link.as_deref().unwrap_or(&model.root_link);
        let tip = spec.tip_link.as_str();
        model.link(base)?;
        model.link(tip)?;

        let path = model
            .path_between(base, tip)
            .ok_or_else(|| ConfigError::ChainDisconnected {
                base: base.into(),
                tip: tip.into(),
            })?;

        let mut links = Vec::with_capacity(path.len() + 1);
        links.push(Link {
            name: base.to_owned(),
            origin: Isometry3::identity(),
            kind: LinkKind::Fixed,
            active: false,
            limits: JointLimits::default(),
        });

        for joint in path {
            let kind = match joint.joint_type {
                JointType::Fixed => LinkKind::Fixed,
                jt if jt.is_rotational() => {
                    let axis = Vector3::new(joint.axis[0], joint.axis[1], joint.axis[2]);
                    let axis = UnitVector3::try_new(axis, AXIS_EPSILON).ok_or_else(|| {
                        ConfigError::InvalidValue {
                            field: format!("joint '{}' axis", joint.name),
                            message: "must be a non-zero vector".into(),
                        }
                    })?;
                    LinkKind::Revolute { axis }
                }
                other => {
                    return Err(ConfigError::UnsupportedJoint {
                        link: joint.name.clone(),
                        joint_type: other.name().into(),
                    });
                }
            };
            links.push(Link {
                name: joint.name.clone(),
                origin: origin_to_isometry(&joint.origin),
                kind,
                active: false,
                limits: joint.limits,
            });
        }

        apply_mask(&mut links, spec.active_links_mask.as_deref())?;

        let active: Vec<usize> = links
            .iter()
            .enumerate()
            .filter_map(|(i, l)| l.active.then_some(i))
            .collect();
        if active.len() != JOINT_COUNT {
            return Err(ConfigError::ActiveJointCount {
                expected: JOINT_COUNT,
                got: active.len(),
            });
        }

        let chain = Self {
            robot_name: model.name.clone(),
            base_link: base.to_owned(),
            tip_link: tip.to_owned(),
            links,
            active,
        };
        info!(
            robot = %chain.robot_name,
            base = %chain.base_link,
            tip = %chain.tip_link,
            links = chain.link_count(),
            "kinematic chain built"
        );
        debug!(joints = ?chain.joint_names(), "active joints");
        Ok(chain)
    }

    pub fn robot_name(&self) -> &str {
        &self.robot_name
    }

    pub fn base_link(&self) -> &str {
        &self.base_link
    }

    pub fn tip_link(&self) -> &str {
        &self.tip_link
    }

    /// Total number of links, origin link included.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Indices of the active links in canonical joint order.
    pub fn active_indices(&self) -> &[usize] {
        &self.active
    }

    /// The active-link mask, one flag per link.
    pub fn active_mask(&self) -> Vec<bool> {
        self.links.iter().map(|l| l.active).collect()
    }

    /// Names of the active joints in canonical order.
    pub fn joint_names(&self) -> Vec<&str> {
        self.active
            .iter()
            .map(|&i| self.links[i].name.as_str())
            .collect()
    }

    /// Full link-angle vector (radians) with `joints` placed at the active
    /// indices and zero elsewhere.
    pub fn expand(&self, joints: &JointVector) -> Vec<f64> {
        let mut angles = vec![0.0; self.links.len()];
        for (&index, radians) in self.active.iter().zip(joints.to_radians()) {
            angles[index] = radians;
        }
        angles
    }

    /// Joint vector (degrees) read from the active indices of a full
    /// link-angle vector (radians).
    ///
    /// # Panics
    ///
    /// Panics if `angles.len() != self.link_count()`.
    pub fn extract(&self, angles: &[f64]) -> JointVector {
        assert_eq!(
            angles.len(),
            self.link_count(),
            "angles.len() must equal chain link count"
        );
        let mut radians = [0.0; JOINT_COUNT];
        for (slot, &index) in radians.iter_mut().zip(&self.active) {
            *slot = angles[index];
        }
        JointVector::from_radians(radians)
    }
}

fn apply_mask(links: &mut [Link], mask: Option<&[bool]>) -> Result<(), ConfigError> {
    let Some(mask) = mask else {
        for link in links.iter_mut() {
            link.active = matches!(link.kind, LinkKind::Revolute { .. });
        }
        return Ok(());
    };

    if mask.len() != links.len() {
        return Err(ConfigError::MaskLengthMismatch {
            expected: links.len(),
            got: mask.len(),
        });
    }
    for (link, &active) in links.iter_mut().zip(mask) {
        if active && link.kind == LinkKind::Fixed {
            return Err(ConfigError::UnsupportedJoint {
                link: link.name.clone(),
                joint_type: JointType::Fixed.name().into(),
            });
        }
        link.active = active;
    }
    Ok(())
}

/// Convert a URDF [`Origin`] (xyz + rpy) to an [`Isometry3`].
pub(crate) fn origin_to_isometry(origin: &Origin) -> Isometry3<f64> {
    let translation = Translation3::new(origin.xyz[0], origin.xyz[1], origin.xyz[2]);
    let rotation = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(
        matrix_from_euler_zyx(origin.rpy[0], origin.rpy[1], origin.rpy[2]),
    ));
    Isometry3::from_parts(translation, rotation)
}

fn joint_rotation(axis: &UnitVector3<f64>, angle: f64) -> Isometry3<f64> {
    Isometry3::from_parts(
        Translation3::identity(),
        UnitQuaternion::from_axis_angle(axis, angle),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use kinova_urdf::parse_string;

    const SIX_DOF_ARM: &str = r#"
        <robot name="six_dof_arm">
            <link name="base"/>
            <link name="shoulder_link"/>
            <link name="upper_arm"/>
            <link name="elbow_link"/>
            <link name="forearm"/>
            <link name="wrist_link"/>
            <link name="end_effector"/>
            <link name="tool"/>
            <link name="camera"/>
            <joint name="j1_base_yaw" type="revolute">
                <parent link="base"/><child link="shoulder_link"/>
                <origin xyz="0 0 0.05"/><axis xyz="0 0 1"/>
                <limit lower="-3.14159" upper="3.14159" effort="80" velocity="2"/>
            </joint>
            <joint name="j2_shoulder_pitch" type="revolute">
                <parent link="shoulder_link"/><child link="upper_arm"/>
                <origin xyz="0 0 0.2"/><axis xyz="0 1 0"/>
                <limit lower="-1.5708" upper="2.356" effort="60" velocity="2"/>
            </joint>
            <joint name="j3_elbow_pitch" type="revolute">
                <parent link="upper_arm"/><child link="elbow_link"/>
                <origin xyz="0 0 0.3"/><axis xyz="0 1 0"/>
                <limit lower="-2.356" upper="2.356" effort="40" velocity="3"/>
            </joint>
            <joint name="j4_forearm_roll" type="continuous">
                <parent link="elbow_link"/><child link="forearm"/>
                <origin xyz="0 0 0.1"/><axis xyz="0 0 2"/>
            </joint>
            <joint name="j5_wrist_pitch" type="revolute">
                <parent link="forearm"/><child link="wrist_link"/>
                <origin xyz="0 0 0.2"/><axis xyz="0 1 0"/>
                <limit lower="-2.094" upper="2.094" effort="10" velocity="5"/>
            </joint>
            <joint name="j6_wrist_roll" type="revolute">
                <parent link="wrist_link"/><child link="end_effector"/>
                <origin xyz="0 0 0.06"/><axis xyz="0 0 1"/>
                <limit lower="-3.14159" upper="3.14159" effort="5" velocity="8"/>
            </joint>
            <joint name="tool_mount" type="fixed">
                <parent link="end_effector"/><child link="tool"/>
                <origin xyz="0 0 0.1"/>
            </joint>
            <joint name="camera_mount" type="fixed">
                <parent link="base"/><child link="camera"/>
            </joint>
        </robot>
    "#;

    const SLIDER_ARM: &str = r#"
        <robot name="slider">
            <link name="base"/>
            <link name="carriage"/>
            <joint name="rail" type="prismatic">
                <parent link="base"/><child link="carriage"/>
                <axis xyz="1 0 0"/>
                <limit lower="0" upper="1" effort="10" velocity="1"/>
            </joint>
        </robot>
    "#;

    fn spec(tip: &str, mask: Option<Vec<bool>>) -> ChainSpec {
        ChainSpec {
            base_link: None,
            tip_link: tip.into(),
            active_links_mask: mask,
        }
    }

    fn six_dof_chain() -> ChainModel {
        let model = parse_string(SIX_DOF_ARM).unwrap();
        ChainModel::build(&model, &spec("tool", None)).unwrap()
    }

    #[test]
    fn chain_follows_path_to_tip() {
        let chain = six_dof_chain();
        assert_eq!(chain.robot_name(), "six_dof_arm");
        assert_eq!(chain.base_link(), "base");
        assert_eq!(chain.tip_link(), "tool");
        // Origin link + 6 revolute + tool mount; the camera branch is skipped.
        assert_eq!(chain.link_count(), 8);
        assert_eq!(chain.links()[0].name, "base");
        assert_eq!(chain.links()[7].name, "tool_mount");
    }

    #[test]
    fn default_mask_activates_revolute_links() {
        let chain = six_dof_chain();
        assert_eq!(chain.active_indices(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(
            chain.active_mask(),
            vec![false, true, true, true, true, true, true, false]
        );
        assert_eq!(
            chain.joint_names(),
            vec![
                "j1_base_yaw",
                "j2_shoulder_pitch",
                "j3_elbow_pitch",
                "j4_forearm_roll",
                "j5_wrist_pitch",
                "j6_wrist_roll",
            ]
        );
    }

    #[test]
    fn explicit_mask_is_honoured() {
        let model = parse_string(SIX_DOF_ARM).unwrap();
        let mask = vec![false, true, true, true, true, true, true, false];
        let chain = ChainModel::build(&model, &spec("tool", Some(mask.clone()))).unwrap();
        assert_eq!(chain.active_mask(), mask);
    }

    #[test]
    fn axis_is_normalized() {
        let chain = six_dof_chain();
        match chain.links()[4].kind {
            LinkKind::Revolute { axis } => assert_relative_eq!(axis.z, 1.0),
            LinkKind::Fixed => panic!("expected revolute link"),
        }
    }

    #[test]
    fn limits_are_carried() {
        let chain = six_dof_chain();
        assert_relative_eq!(chain.links()[2].limits.lower.unwrap(), -1.5708);
        assert!(chain.links()[4].limits.upper.is_none());
    }

    #[test]
    fn mask_length_mismatch_rejected() {
        let model = parse_string(SIX_DOF_ARM).unwrap();
        let err = ChainModel::build(&model, &spec("tool", Some(vec![true; 3]))).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MaskLengthMismatch {
                expected: 8,
                got: 3
            }
        ));
    }

    #[test]
    fn wrong_active_count_rejected() {
        let model = parse_string(SIX_DOF_ARM).unwrap();
        let mask = vec![false, true, true, true, true, true, false, false];
        let err = ChainModel::build(&model, &spec("tool", Some(mask))).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ActiveJointCount {
                expected: 6,
                got: 5
            }
        ));
    }

    #[test]
    fn short_chain_has_too_few_joints() {
        let model = parse_string(SIX_DOF_ARM).unwrap();
        let err = ChainModel::build(&model, &spec("elbow_link", None)).unwrap_err();
        assert!(matches!(err, ConfigError::ActiveJointCount { got: 3, .. }));
    }

    #[test]
    fn fixed_link_cannot_be_active() {
        let model = parse_string(SIX_DOF_ARM).unwrap();
        let mask = vec![true, true, true, true, true, true, false, false];
        let err = ChainModel::build(&model, &spec("tool", Some(mask))).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedJoint { ref link, .. } if link == "base"));
    }

    #[test]
    fn disconnected_tip_rejected() {
        let model = parse_string(SIX_DOF_ARM).unwrap();
        let spec = ChainSpec {
            base_link: Some("camera".into()),
            tip_link: "tool".into(),
            active_links_mask: None,
        };
        let err = ChainModel::build(&model, &spec).unwrap_err();
        assert!(matches!(err, ConfigError::ChainDisconnected { .. }));
    }

    #[test]
    fn unknown_tip_is_urdf_error() {
        let model = parse_string(SIX_DOF_ARM).unwrap();
        let err = ChainModel::build(&model, &spec("gripper", None)).unwrap_err();
        assert!(matches!(err, ConfigError::Urdf(_)));
    }

    #[test]
    fn prismatic_joint_rejected() {
        let model = parse_string(SLIDER_ARM).unwrap();
        let err = ChainModel::build(&model, &spec("carriage", None)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnsupportedJoint { ref joint_type, .. } if joint_type == "Prismatic"
        ));
    }

    #[test]
    fn expand_and_extract_are_inverse() {
        let chain = six_dof_chain();
        let joints = JointVector::from_degrees([10.0, -20.0, 30.0, 400.0, 5.5, -90.0]);
        let angles = chain.expand(&joints);
        assert_eq!(angles.len(), 8);
        assert_relative_eq!(angles[0], 0.0);
        assert_relative_eq!(angles[7], 0.0);
        assert_relative_eq!(angles[1], 10f64.to_radians());
        assert_relative_eq!(angles[4], 400f64.to_radians());

        let back = chain.extract(&angles);
        for i in 0..JOINT_COUNT {
            assert_relative_eq!(back[i], joints[i], epsilon = 1e-12);
        }
    }

    #[test]
    #[should_panic(expected = "link count")]
    fn extract_wrong_length_panics() {
        let chain = six_dof_chain();
        let _ = chain.extract(&[0.0; 6]);
    }

    #[test]
    fn inactive_link_ignores_angle() {
        let chain = six_dof_chain();
        let fixed = &chain.links()[7];
        assert_relative_eq!(
            fixed.transform(1.0).to_homogeneous(),
            fixed.origin.to_homogeneous()
        );
    }

    #[test]
    fn origin_to_isometry_translation_and_rotation() {
        let origin = Origin {
            xyz: [1.0, 2.0, 3.0],
            rpy: [0.0, 0.0, std::f64::consts::FRAC_PI_2],
        };
        let iso = origin_to_isometry(&origin);
        assert_relative_eq!(iso.translation.vector, Vector3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(iso.rotation * Vector3::x(), Vector3::y(), epsilon = 1e-12);
    }
}
