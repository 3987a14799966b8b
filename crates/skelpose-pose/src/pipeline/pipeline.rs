use log::{info, warn};
use serde::{Deserialize, Serialize};
use skelpose_core::{Detection, JointHierarchy, RgbImageView};
use skelpose_detect::BoneDetector;

use super::{
    Degradation, Diagnostics, PoseError, PoseParams, ProcessingResult, ViewCounts, ViewKind,
};
use crate::apply::apply_rotations;
use crate::correspondence::{CorrespondenceStrategy, JointAssignment};
use crate::reconstruct::{reconstruct, Reconstruction};
use crate::rig::PoseRig;
use crate::solve::{JointRotation, RotationMap, RotationSolver, RotationSource};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// The four renders of one request.
#[derive(Clone, Copy, Debug)]
pub struct PoseViews<'a> {
    pub front_rest: RgbImageView<'a>,
    pub side_rest: RgbImageView<'a>,
    pub front_target: RgbImageView<'a>,
    pub side_target: RgbImageView<'a>,
}

impl<'a> PoseViews<'a> {
    pub fn get(&self, view: ViewKind) -> &RgbImageView<'a> {
        match view {
            ViewKind::FrontRest => &self.front_rest,
            ViewKind::SideRest => &self.side_rest,
            ViewKind::FrontTarget => &self.front_target,
            ViewKind::SideTarget => &self.side_target,
        }
    }
}

/// Detections of the four renders.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseDetections {
    pub front_rest: Detection,
    pub side_rest: Detection,
    pub front_target: Detection,
    pub side_target: Detection,
}

impl PoseDetections {
    pub fn get(&self, view: ViewKind) -> &Detection {
        match view {
            ViewKind::FrontRest => &self.front_rest,
            ViewKind::SideRest => &self.side_rest,
            ViewKind::FrontTarget => &self.front_target,
            ViewKind::SideTarget => &self.side_target,
        }
    }

    pub fn counts(&self) -> ViewCounts {
        ViewCounts {
            front_rest: self.front_rest.len(),
            side_rest: self.side_rest.len(),
            front_target: self.front_target.len(),
            side_target: self.side_target.len(),
        }
    }
}

/// Rotations solved for one hierarchy, before anything touches a rig.
#[derive(Clone, Debug, PartialEq)]
pub struct PoseSolution {
    pub rotations: RotationMap,
    pub rest: JointAssignment,
    pub target: JointAssignment,
    pub diagnostics: Diagnostics,
}

/// Recovers a rig pose from rest/target front/side renders.
///
/// Holds no state across calls; one extractor can serve any number of
/// requests.
pub struct PoseExtractor {
    params: PoseParams,
    detector: BoneDetector,
    correspondence: Box<dyn CorrespondenceStrategy>,
    solver: RotationSolver,
}

impl PoseExtractor {
    pub fn new(params: PoseParams) -> Self {
        let detector = BoneDetector::new(params.detect.clone());
        let correspondence = params.correspondence.build(params.reconstruct.bounds);
        let solver = RotationSolver::new(params.solve);
        Self {
            params,
            detector,
            correspondence,
            solver,
        }
    }

    /// Replace the correspondence strategy chosen by the params.
    pub fn with_correspondence(mut self, strategy: Box<dyn CorrespondenceStrategy>) -> Self {
        self.correspondence = strategy;
        self
    }

    #[inline]
    pub fn params(&self) -> &PoseParams {
        &self.params
    }

    #[inline]
    pub fn detector(&self) -> &BoneDetector {
        &self.detector
    }

    pub fn detect_views(&self, views: &PoseViews<'_>) -> PoseDetections {
        PoseDetections {
            front_rest: self.detector.detect(&views.front_rest),
            side_rest: self.detector.detect(&views.side_rest),
            front_target: self.detector.detect(&views.front_target),
            side_target: self.detector.detect(&views.side_target),
        }
    }

    pub fn solve_views(&self, views: &PoseViews<'_>, hierarchy: &JointHierarchy) -> PoseSolution {
        self.solve_detections(&self.detect_views(views), hierarchy)
    }

    /// Reconstruct, match and solve from already-detected points.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip_all, fields(joints = hierarchy.len()))
    )]
    pub fn solve_detections(
        &self,
        detections: &PoseDetections,
        hierarchy: &JointHierarchy,
    ) -> PoseSolution {
        let mut diag = Diagnostics {
            backend: self.detector.backend().name().to_string(),
            correspondence: self.correspondence.name().to_string(),
            detections: detections.counts(),
            ..Diagnostics::default()
        };

        for view in ViewKind::ALL {
            if detections.get(view).is_empty() {
                warn!("no segments detected in {view:?} image");
                diag.degradations.push(Degradation::DetectionEmpty { view });
            }
        }

        let rest_rec = reconstruct(
            &detections.front_rest,
            &detections.side_rest,
            &self.params.reconstruct,
        );
        let target_rec = reconstruct(
            &detections.front_target,
            &detections.side_target,
            &self.params.reconstruct,
        );
        diag.rest_points = rest_rec.len();
        diag.target_points = target_rec.len();

        let rest = self.assign("rest", &rest_rec, hierarchy, &mut diag);
        let target = self.assign("target", &target_rec, hierarchy, &mut diag);
        diag.rest_surplus = rest.points_available - rest.points_used;
        diag.target_surplus = target.points_available - target.points_used;

        let mut rotations = RotationMap::new();
        for joint in hierarchy.traversal() {
            let name = &joint.name;
            if !self.params.accepts_joint(name) {
                diag.filtered_out.push(name.clone());
                continue;
            }

            let rotation = match (rest.get(name), target.get(name)) {
                (Some(r), Some(t)) => {
                    diag.matched.push(name.clone());
                    let solved = self.solver.solve(r, t);
                    if solved.degenerate {
                        warn!("joint `{name}` has a zero-length bone, kept at identity");
                        diag.degenerate.push(name.clone());
                        diag.degradations
                            .push(Degradation::DegenerateBone { joint: name.clone() });
                        JointRotation::identity(name.clone(), RotationSource::Degenerate)
                    } else {
                        JointRotation {
                            joint: name.clone(),
                            rotation: solved.rotation,
                            source: RotationSource::Solved,
                        }
                    }
                }
                _ => {
                    diag.unmatched.push(name.clone());
                    JointRotation::identity(name.clone(), RotationSource::Unmatched)
                }
            };
            rotations.insert(name.clone(), rotation);
        }

        info!("{}", diag.summary());
        PoseSolution {
            rotations,
            rest,
            target,
            diagnostics: diag,
        }
    }

    fn assign(
        &self,
        configuration: &str,
        rec: &Reconstruction,
        hierarchy: &JointHierarchy,
        diag: &mut Diagnostics,
    ) -> JointAssignment {
        if rec.truncated() {
            diag.degradations.push(Degradation::CorrespondenceMismatch {
                configuration: configuration.to_string(),
                front: rec.front_count,
                side: rec.side_count,
            });
        }

        let assignment = self.correspondence.assign(hierarchy, &rec.points);
        if !assignment.is_complete() {
            warn!(
                "{configuration}: {} points for {} joints, {} left unmatched",
                rec.len(),
                hierarchy.len(),
                assignment.unmatched.len()
            );
            diag.degradations.push(Degradation::InsufficientPoints {
                configuration: configuration.to_string(),
                available: assignment.points_available,
                required: assignment.points_required(),
            });
        }
        assignment
    }

    /// Full request: detect, reconstruct, match, solve and apply.
    ///
    /// Never panics on degraded input; the result carries diagnostics
    /// either way.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip_all))]
    pub fn process<R: PoseRig + ?Sized>(
        &self,
        views: &PoseViews<'_>,
        rig: &mut R,
    ) -> ProcessingResult {
        let solution = self.solve_views(views, rig.hierarchy());
        self.finish(solution, rig)
    }

    /// Like [`process`](Self::process) but from detections.
    pub fn process_detections<R: PoseRig + ?Sized>(
        &self,
        detections: &PoseDetections,
        rig: &mut R,
    ) -> ProcessingResult {
        let solution = self.solve_detections(detections, rig.hierarchy());
        self.finish(solution, rig)
    }

    fn finish<R: PoseRig + ?Sized>(&self, solution: PoseSolution, rig: &mut R) -> ProcessingResult {
        let PoseSolution {
            rotations,
            mut diagnostics,
            ..
        } = solution;
        match apply_rotations(rig, &rotations) {
            Ok(report) => {
                for joint in report.missing {
                    diagnostics
                        .degradations
                        .push(Degradation::JointMissingInRig { joint });
                }
                ProcessingResult::succeeded(rotations, diagnostics)
            }
            Err(err) => {
                let err = PoseError::from(err);
                log::error!("pose application failed: {err}");
                ProcessingResult::failed(err, diagnostics)
            }
        }
    }
}
