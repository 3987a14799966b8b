use serde::{Deserialize, Serialize};

use crate::solve::RotationMap;

/// One of the four input renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    FrontRest,
    SideRest,
    FrontTarget,
    SideTarget,
}

impl ViewKind {
    pub const ALL: [ViewKind; 4] = [
        ViewKind::FrontRest,
        ViewKind::SideRest,
        ViewKind::FrontTarget,
        ViewKind::SideTarget,
    ];
}

/// A non-fatal condition that degraded the result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degradation {
    /// No segment found in one image.
    DetectionEmpty { view: ViewKind },
    /// Front and side detections of one configuration differ in length.
    CorrespondenceMismatch {
        configuration: String,
        front: usize,
        side: usize,
    },
    /// Fewer points than needed to supply every joint.
    InsufficientPoints {
        configuration: String,
        available: usize,
        required: usize,
    },
    /// Zero-length rest or target bone; rotation forced to identity.
    DegenerateBone { joint: String },
    /// A solved rotation names a joint the rig does not have.
    JointMissingInRig { joint: String },
}

/// Per-image detection counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewCounts {
    pub front_rest: usize,
    pub side_rest: usize,
    pub front_target: usize,
    pub side_target: usize,
}

impl ViewCounts {
    pub fn get(&self, view: ViewKind) -> usize {
        match view {
            ViewKind::FrontRest => self.front_rest,
            ViewKind::SideRest => self.side_rest,
            ViewKind::FrontTarget => self.front_target,
            ViewKind::SideTarget => self.side_target,
        }
    }
}

/// Everything worth knowing about one run, inspectable on success too.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Detection backend in use.
    pub backend: String,
    pub correspondence: String,
    pub detections: ViewCounts,
    /// Reconstructed points per configuration.
    pub rest_points: usize,
    pub target_points: usize,
    /// Reconstructed points left over after every joint was supplied.
    pub rest_surplus: usize,
    pub target_surplus: usize,
    /// Joints with both a rest and a target pair, traversal order.
    pub matched: Vec<String>,
    pub unmatched: Vec<String>,
    /// Joints excluded by the joint filter.
    pub filtered_out: Vec<String>,
    pub degenerate: Vec<String>,
    pub degradations: Vec<Degradation>,
}

impl Diagnostics {
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }

    pub fn summary(&self) -> String {
        let d = &self.detections;
        format!(
            "detections {}/{}/{}/{} (front/side rest, front/side target), {} matched, {} unmatched, {} degenerate, {} degradations",
            d.front_rest,
            d.side_rest,
            d.front_target,
            d.side_target,
            self.matched.len(),
            self.unmatched.len(),
            self.degenerate.len(),
            self.degradations.len()
        )
    }
}

/// Outcome of [`PoseExtractor::process`](super::PoseExtractor::process).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub success: bool,
    /// Present on success: every joint that passed the filter.
    pub rotations: Option<RotationMap>,
    pub diagnostics: Diagnostics,
    /// Fatal error message on failure.
    pub error: Option<String>,
}

impl ProcessingResult {
    pub fn succeeded(rotations: RotationMap, diagnostics: Diagnostics) -> Self {
        Self {
            success: true,
            rotations: Some(rotations),
            diagnostics,
            error: None,
        }
    }

    pub fn failed(error: impl ToString, diagnostics: Diagnostics) -> Self {
        Self {
            success: false,
            rotations: None,
            diagnostics,
            error: Some(error.to_string()),
        }
    }
}
