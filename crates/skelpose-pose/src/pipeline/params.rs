use serde::{Deserialize, Serialize};
use skelpose_detect::DetectParams;

use crate::correspondence::CorrespondenceKind;
use crate::reconstruct::ReconstructParams;
use crate::solve::SolveParams;

/// Configuration for the whole pose extraction pipeline.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseParams {
    /// Detection parameters, shared by all four images.
    pub detect: DetectParams,
    pub reconstruct: ReconstructParams,
    pub solve: SolveParams,
    /// How reconstructed points are assigned to joints.
    pub correspondence: CorrespondenceKind,
    /// When set, only joints named here are posed. Every other joint is
    /// left out of the result entirely rather than given zero influence.
    pub joint_filter: Option<Vec<String>>,
}

impl PoseParams {
    pub fn with_influence(mut self, influence: f64) -> Self {
        self.solve.influence = influence;
        self
    }

    pub fn with_joint_filter<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.joint_filter = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Whether `name` passes the joint filter.
    pub fn accepts_joint(&self, name: &str) -> bool {
        self.joint_filter
            .as_ref()
            .is_none_or(|names| names.iter().any(|n| n == name))
    }
}
