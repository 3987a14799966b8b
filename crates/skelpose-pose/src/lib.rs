//! Two-view skeleton pose recovery.
//!
//! Starting from four renders (front and side, rest and target pose) this
//! crate reconstructs normalized 3D points, assigns them to the rig's joints,
//! solves one local rotation per joint and writes the result onto a rig:
//!
//! 1. [`reconstruct`]: pair front/side detections into [`NormalizedPoint3`]s.
//! 2. [`CorrespondenceStrategy`]: head/tail pairs per joint
//!    ([`PositionalCorrespondence`] by default, [`NearestRestCorrespondence`]
//!    as an alternative).
//! 3. [`RotationSolver`]: shortest-arc rotation, blended by influence.
//! 4. [`apply_rotations`]: atomic write onto a [`PoseRig`].
//!
//! [`PoseExtractor`] runs the whole chain, including detection.
//!
//! [`NormalizedPoint3`]: skelpose_core::NormalizedPoint3

mod apply;
mod correspondence;
pub mod io;
mod pipeline;
mod reconstruct;
mod rig;
mod solve;

pub use apply::{apply_rotations, ApplyReport};
pub use correspondence::{
    CorrespondenceKind, CorrespondenceStrategy, JointAssignment, MatchedJoint,
    NearestRestCorrespondence, PositionalCorrespondence,
};
pub use pipeline::{
    Degradation, Diagnostics, PoseDetections, PoseError, PoseExtractor, PoseParams, PoseSolution,
    PoseViews, ProcessingResult, ViewCounts, ViewKind,
};
pub use reconstruct::{reconstruct, ReconstructParams, Reconstruction};
pub use rig::{ArmatureRig, PoseRig, RigMode, RigStateError};
pub use solve::{
    minimal_rotation, solve, JointRotation, RotationMap, RotationSolver, RotationSource,
    SolveParams, Solved,
};
