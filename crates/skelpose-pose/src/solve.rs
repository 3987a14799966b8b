//! Per-joint rotation from rest and target bone directions.

use std::collections::BTreeMap;

use log::debug;
use nalgebra::{Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use skelpose_core::JointPositionPair;

/// Parameters of the rotation solver.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveParams {
    /// Blend between no change (0) and the full rotation (1). Clamped.
    pub influence: f64,
    /// Bones shorter than this carry no orientation.
    pub min_bone_length: f64,
}

impl Default for SolveParams {
    fn default() -> Self {
        Self {
            influence: 1.0,
            min_bone_length: 1e-6,
        }
    }
}

impl SolveParams {
    pub fn with_influence(mut self, influence: f64) -> Self {
        self.influence = influence;
        self
    }

    /// Influence clamped to `[0, 1]`; NaN counts as 0.
    pub fn clamped_influence(&self) -> f64 {
        if self.influence.is_nan() {
            0.0
        } else {
            self.influence.clamp(0.0, 1.0)
        }
    }
}

/// Where a reported rotation came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationSource {
    Solved,
    /// Zero-length rest or target bone; identity, still written.
    Degenerate,
    /// No head/tail pair in one of the configurations; identity, not written.
    Unmatched,
}

impl RotationSource {
    /// Whether the applicator writes this rotation onto the rig.
    pub fn is_written(self) -> bool {
        !matches!(self, RotationSource::Unmatched)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointRotation {
    pub joint: String,
    pub rotation: UnitQuaternion<f64>,
    pub source: RotationSource,
}

impl JointRotation {
    pub fn identity(joint: impl Into<String>, source: RotationSource) -> Self {
        Self {
            joint: joint.into(),
            rotation: UnitQuaternion::identity(),
            source,
        }
    }
}

/// Joint name to rotation. Ordered so reports are stable.
pub type RotationMap = BTreeMap<String, JointRotation>;

/// Outcome of solving one joint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Solved {
    pub rotation: UnitQuaternion<f64>,
    pub degenerate: bool,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RotationSolver {
    params: SolveParams,
}

impl RotationSolver {
    pub fn new(params: SolveParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SolveParams {
        &self.params
    }

    pub fn solve(&self, rest: &JointPositionPair, target: &JointPositionPair) -> Solved {
        let min_len = self.params.min_bone_length.max(0.0);
        let (Some(from), Some(to)) = (
            Unit::try_new(rest.vector(), min_len),
            Unit::try_new(target.vector(), min_len),
        ) else {
            return Solved {
                rotation: UnitQuaternion::identity(),
                degenerate: true,
            };
        };

        let full = minimal_rotation(&from, &to);
        Solved {
            rotation: blend_from_identity(&full, self.params.clamped_influence()),
            degenerate: false,
        }
    }
}

/// Rotation from `rest` to `target` bone direction, blended by `influence`.
///
/// Returns identity for degenerate (zero-length) bones.
pub fn solve(
    rest: &JointPositionPair,
    target: &JointPositionPair,
    influence: f64,
) -> UnitQuaternion<f64> {
    RotationSolver::new(SolveParams::default().with_influence(influence))
        .solve(rest, target)
        .rotation
}

const PARALLEL_EPS: f64 = 1e-9;

/// Shortest-arc rotation mapping `from` onto `to`.
///
/// Antiparallel inputs rotate by pi about an axis perpendicular to `from`,
/// picked from the coordinate axis where `from` is smallest.
pub fn minimal_rotation(from: &Unit<Vector3<f64>>, to: &Unit<Vector3<f64>>) -> UnitQuaternion<f64> {
    let (f, t) = (from.as_ref(), to.as_ref());
    let dot = f.dot(t).clamp(-1.0, 1.0);
    let cross = f.cross(t);

    if let Some(axis) = Unit::try_new(cross, PARALLEL_EPS) {
        return UnitQuaternion::from_axis_angle(&axis, dot.acos());
    }
    if dot > 0.0 {
        return UnitQuaternion::identity();
    }

    let helper = smallest_component_axis(f);
    match Unit::try_new(f.cross(&helper), PARALLEL_EPS) {
        Some(axis) => UnitQuaternion::from_axis_angle(&axis, std::f64::consts::PI),
        None => {
            debug!("no perpendicular axis for {f:?}");
            UnitQuaternion::identity()
        }
    }
}

fn smallest_component_axis(v: &Vector3<f64>) -> Vector3<f64> {
    let a = v.abs();
    if a.x <= a.y && a.x <= a.z {
        Vector3::x()
    } else if a.y <= a.z {
        Vector3::y()
    } else {
        Vector3::z()
    }
}

/// Spherical blend between identity and `q`.
fn blend_from_identity(q: &UnitQuaternion<f64>, t: f64) -> UnitQuaternion<f64> {
    if t <= 0.0 {
        UnitQuaternion::identity()
    } else if t >= 1.0 {
        *q
    } else {
        q.powf(t)
    }
}
