//! Pose application: writes solved rotations onto a rig in one step.

use log::{debug, warn};
use nalgebra::UnitQuaternion;
use serde::{Deserialize, Serialize};

use crate::rig::{PoseRig, RigStateError};
use crate::solve::RotationMap;

/// What an application wrote.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyReport {
    /// Joints whose rotation was written.
    pub written: Vec<String>,
    /// Rotations skipped because the rig has no joint of that name.
    pub missing: Vec<String>,
}

/// Write every resolvable rotation in `rotations` onto `rig`.
///
/// Unmatched entries are skipped, so those joints keep their current pose.
/// Either all writes stay visible and the rig is back out of pose mode, or
/// the call fails and the rig's pose is unchanged: a failed exit restores
/// every overwritten rotation.
pub fn apply_rotations<R: PoseRig + ?Sized>(
    rig: &mut R,
    rotations: &RotationMap,
) -> Result<ApplyReport, RigStateError> {
    rig.enter_pose_mode()?;

    let mut report = ApplyReport::default();
    let mut previous: Vec<(String, UnitQuaternion<f64>)> = Vec::new();

    for (name, rot) in rotations {
        if !rot.source.is_written() {
            continue;
        }
        let Some(old) = rig.joint_rotation(name) else {
            warn!("joint `{name}` not present in rig, skipped");
            report.missing.push(name.clone());
            continue;
        };
        if rig.set_joint_rotation(name, rot.rotation) {
            previous.push((name.clone(), old));
            report.written.push(name.clone());
        } else {
            report.missing.push(name.clone());
        }
    }

    if let Err(err) = rig.exit_pose_mode() {
        warn!("leaving pose mode failed ({err}), rolling back {} joints", previous.len());
        for (name, old) in previous.iter().rev() {
            rig.set_joint_rotation(name, *old);
        }
        return Err(err);
    }

    debug!(
        "applied {} rotations, {} missing",
        report.written.len(),
        report.missing.len()
    );
    Ok(report)
}
