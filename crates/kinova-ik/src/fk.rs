//! Forward kinematics: link angles -> tool-frame pose.

use nalgebra::{Isometry3, Vector3};

use kinova_core::{JointVector, Pose};

use crate::chain::{ChainModel, LinkKind};

/// World-frame joint origins and axes of the active links, in canonical
/// joint order, plus the tool-frame transform.
#[derive(Debug, Clone)]
pub struct LinkFrames {
    pub origins: Vec<Vector3<f64>>,
    pub axes: Vec<Vector3<f64>>,
    pub end_effector: Isometry3<f64>,
}

/// Tool-frame transform in the base frame for a full link-angle vector
/// (radians, one entry per link).
///
/// # Panics
///
/// Panics if `angles.len() != chain.link_count()`.
pub fn end_effector_transform(chain: &ChainModel, angles: &[f64]) -> Isometry3<f64> {
    assert_eq!(
        angles.len(),
        chain.link_count(),
        "angles.len() must equal chain link count"
    );
    chain
        .links()
        .iter()
        .zip(angles)
        .fold(Isometry3::identity(), |acc, (link, &angle)| {
            acc * link.transform(angle)
        })
}

/// Tool-frame pose for a full link-angle vector (radians).
pub fn forward_kinematics(chain: &ChainModel, angles: &[f64]) -> Pose {
    Pose::from_isometry(&end_effector_transform(chain, angles))
}

/// Tool-frame pose for six joint angles in degrees.
pub fn forward_joints(chain: &ChainModel, joints: &JointVector) -> Pose {
    forward_kinematics(chain, &chain.expand(joints))
}

/// Per-joint frames for Jacobian computation.
///
/// Joint origins and axes are recorded before the joint's own rotation is
/// applied.
///
/// # Panics
///
/// Panics if `angles.len() != chain.link_count()`.
pub fn link_frames(chain: &ChainModel, angles: &[f64]) -> LinkFrames {
    assert_eq!(
        angles.len(),
        chain.link_count(),
        "angles.len() must equal chain link count"
    );

    let mut transform = Isometry3::identity();
    let mut origins = Vec::with_capacity(chain.active_indices().len());
    let mut axes = Vec::with_capacity(chain.active_indices().len());

    for (link, &angle) in chain.links().iter().zip(angles) {
        if let (LinkKind::Revolute { axis }, true) = (link.kind, link.active) {
            let joint_frame = transform * link.origin;
            origins.push(joint_frame.translation.vector);
            axes.push(joint_frame.rotation * axis.into_inner());
        }
        transform *= link.transform(angle);
    }

    LinkFrames {
        origins,
        axes,
        end_effector: transform,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
