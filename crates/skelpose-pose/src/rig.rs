//! Rig model: the posing-state write surface the applicator drives.

use std::collections::BTreeMap;

use log::debug;
use nalgebra::UnitQuaternion;
use serde::{Deserialize, Serialize};
use skelpose_core::JointHierarchy;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RigStateError {
    #[error("rig `{rig}` has no valid armature handle")]
    InvalidHandle { rig: String },
    #[error("rig `{rig}` cannot switch from {from:?} to {to:?} mode: {reason}")]
    ModeSwitch {
        rig: String,
        from: RigMode,
        to: RigMode,
        reason: String,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RigMode {
    #[default]
    Object,
    Pose,
}

/// A posable skeleton owned by the caller.
///
/// Rotations are local, relative to each joint's rest orientation; identity
/// means "at rest".
pub trait PoseRig {
    fn hierarchy(&self) -> &JointHierarchy;

    fn enter_pose_mode(&mut self) -> Result<(), RigStateError>;

    fn exit_pose_mode(&mut self) -> Result<(), RigStateError>;

    fn joint_rotation(&self, name: &str) -> Option<UnitQuaternion<f64>>;

    /// Returns `false` when the rig has no joint called `name`.
    fn set_joint_rotation(&mut self, name: &str, rotation: UnitQuaternion<f64>) -> bool;
}

/// In-memory armature.
#[derive(Clone, Debug)]
pub struct ArmatureRig {
    name: String,
    hierarchy: JointHierarchy,
    pose: BTreeMap<String, UnitQuaternion<f64>>,
    mode: RigMode,
    valid: bool,
}

impl ArmatureRig {
    pub fn new(name: impl Into<String>, hierarchy: JointHierarchy) -> Self {
        let pose = hierarchy
            .joints()
            .iter()
            .map(|j| (j.name.clone(), UnitQuaternion::identity()))
            .collect();
        Self {
            name: name.into(),
            hierarchy,
            pose,
            mode: RigMode::Object,
            valid: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> RigMode {
        self.mode
    }

    /// Drop the underlying handle; every later mode switch fails.
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Current local rotation of every joint, by name.
    pub fn pose_snapshot(&self) -> BTreeMap<String, UnitQuaternion<f64>> {
        self.pose.clone()
    }

    pub fn is_at_rest(&self) -> bool {
        self.pose.values().all(|q| *q == UnitQuaternion::identity())
    }

    pub fn reset_pose(&mut self) {
        for q in self.pose.values_mut() {
            *q = UnitQuaternion::identity();
        }
    }

    fn check_handle(&self) -> Result<(), RigStateError> {
        if self.valid {
            Ok(())
        } else {
            Err(RigStateError::InvalidHandle {
                rig: self.name.clone(),
            })
        }
    }
}

impl PoseRig for ArmatureRig {
    fn hierarchy(&self) -> &JointHierarchy {
        &self.hierarchy
    }

    fn enter_pose_mode(&mut self) -> Result<(), RigStateError> {
        self.check_handle()?;
        debug!("rig `{}`: {:?} -> pose mode", self.name, self.mode);
        self.mode = RigMode::Pose;
        Ok(())
    }

    fn exit_pose_mode(&mut self) -> Result<(), RigStateError> {
        self.check_handle()?;
        self.mode = RigMode::Object;
        Ok(())
    }

    fn joint_rotation(&self, name: &str) -> Option<UnitQuaternion<f64>> {
        self.pose.get(name).copied()
    }

    fn set_joint_rotation(&mut self, name: &str, rotation: UnitQuaternion<f64>) -> bool {
        if self.mode != RigMode::Pose {
            debug!("rig `{}`: write to `{name}` outside pose mode ignored", self.name);
            return false;
        }
        match self.pose.get_mut(name) {
            Some(slot) => {
                *slot = rotation;
                true
            }
            None => false,
        }
    }
}
