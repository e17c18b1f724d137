//! In-memory robot description.
//!
//! Only the kinematic part of URDF is kept: link names, joint origins,
//! axes, types and position limits. Geometry and inertia play no role in
//! forward or inverse kinematics.

use std::collections::HashMap;

use crate::error::UrdfError;

// ---------------------------------------------------------------------------
// JointType
// ---------------------------------------------------------------------------

/// URDF joint type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointType {
    /// Rotation about a single axis, with position limits.
    Revolute,
    /// Unlimited rotation about a single axis.
    Continuous,
    /// Translation along an axis, with position limits.
    Prismatic,
    /// No relative motion between parent and child.
    Fixed,
    /// Unconstrained 6-DOF joint (rarely used).
    Floating,
    /// Translation in a plane (rarely used).
    Planar,
    /// Ball joint.
    Spherical,
}

impl JointType {
    /// Whether this joint type has actuatable degrees of freedom.
    pub const fn is_actuated(self) -> bool {
        matches!(self, Self::Revolute | Self::Continuous | Self::Prismatic)
    }

    /// Whether the joint rotates about a single axis.
    pub const fn is_rotational(self) -> bool {
        matches!(self, Self::Revolute | Self::Continuous)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Revolute => "Revolute",
            Self::Continuous => "Continuous",
            Self::Prismatic => "Prismatic",
            Self::Fixed => "Fixed",
            Self::Floating => "Floating",
            Self::Planar => "Planar",
            Self::Spherical => "Spherical",
        }
    }
}

// ---------------------------------------------------------------------------
// JointLimits
// ---------------------------------------------------------------------------

/// Position limits of a joint (radians for rotational joints).
///
/// Carried for reporting only; the solvers never clamp to them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JointLimits {
    /// Lower position limit. `None` means unbounded.
    pub lower: Option<f64>,
    /// Upper position limit. `None` means unbounded.
    pub upper: Option<f64>,
}

// ---------------------------------------------------------------------------
// Origin
// ---------------------------------------------------------------------------

/// A 3D pose specified as position + roll-pitch-yaw.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Origin {
    /// Translation `[x, y, z]` in meters.
    pub xyz: [f64; 3],
    /// Rotation `[roll, pitch, yaw]` in radians.
    pub rpy: [f64; 3],
}

// ---------------------------------------------------------------------------
// LinkData / JointData
// ---------------------------------------------------------------------------

/// A URDF link. Kinematics only needs its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkData {
    pub name: String,
}

impl LinkData {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// In-memory representation of a URDF joint.
#[derive(Debug, Clone, PartialEq)]
pub struct JointData {
    /// Joint name.
    pub name: String,
    /// Joint type.
    pub joint_type: JointType,
    /// Parent link name.
    pub parent: String,
    /// Child link name.
    pub child: String,
    /// Joint origin relative to parent link.
    pub origin: Origin,
    /// Joint axis (default `[1, 0, 0]` as in URDF).
    pub axis: [f64; 3],
    /// Position limits.
    pub limits: JointLimits,
}

// ---------------------------------------------------------------------------
// RobotModel
// ---------------------------------------------------------------------------

/// Complete kinematic tree of a URDF robot.
#[derive(Debug, Clone)]
pub struct RobotModel {
    /// Robot name.
    pub name: String,
    /// All links, keyed by name.
    pub links: HashMap<String, LinkData>,
    /// All joints, keyed by name.
    pub joints: HashMap<String, JointData>,
    /// Name of the root link (the one never referenced as a child).
    pub root_link: String,
}

impl RobotModel {
    /// Get a link by name.
    pub fn link(&self, name: &str) -> Result<&LinkData, UrdfError> {
        self.links
            .get(name)
            .ok_or_else(|| UrdfError::MissingLink(name.into()))
    }

    /// Get a joint by name.
    pub fn joint(&self, name: &str) -> Result<&JointData, UrdfError> {
        self.joints
            .get(name)
            .ok_or_else(|| UrdfError::MissingJoint(name.into()))
    }

    /// The joint whose child is `link`, if any.
    pub fn parent_joint(&self, link: &str) -> Option<&JointData> {
        self.joints.values().find(|j| j.child == link)
    }

    /// Joints ordered from `base` down to `tip`, or `None` if `tip` is not
    /// a descendant of `base`.
    ///
    /// Walks parent joints upward from the tip, so the result is unique even
    /// in branched trees.
    pub fn path_between(&self, base: &str, tip: &str) -> Option<Vec<&JointData>> {
        if !self.links.contains_key(base) || !self.links.contains_key(tip) {
            return None;
        }
        let mut path = Vec::new();
        let mut current = tip;
        while current != base {
            let joint = self.parent_joint(current)?;
            // A cycle can never reach the base.
            if path.len() > self.joints.len() {
                return None;
            }
            path.push(joint);
            current = joint.parent.as_str();
        }
        path.reverse();
        Some(path)
    }

    /// Iterate over actuatable joints (revolute, continuous, prismatic).
    pub fn actuated_joints(&self) -> impl Iterator<Item = &JointData> {
        self.joints.values().filter(|j| j.joint_type.is_actuated())
    }

    /// Number of actuatable degrees of freedom.
    pub fn dof(&self) -> usize {
        self.actuated_joints().count()
    }

    /// Names of all joints, sorted alphabetically.
    pub fn joint_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.joints.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
