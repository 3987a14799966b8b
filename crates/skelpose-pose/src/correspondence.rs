//! Assigning reconstructed points to named joints.
//!
//! The strategies here are heuristics, not geometric correspondence: they
//! only promise a deterministic, partial-but-consistent assignment.

use std::collections::HashMap;

use kiddo::{KdTree, SquaredEuclidean};
use log::debug;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use skelpose_core::{JointHierarchy, JointPositionPair, NormalizationBounds, NormalizedPoint3};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// One joint with its assigned head/tail.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchedJoint {
    pub name: String,
    pub pair: JointPositionPair,
}

/// Result of assigning one configuration's points to the hierarchy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JointAssignment {
    /// Matched joints in traversal order; each joint at most once.
    pub matched: Vec<MatchedJoint>,
    /// Joints that could not be fully supplied, in traversal order.
    pub unmatched: Vec<String>,
    pub points_available: usize,
    pub points_used: usize,
}

impl JointAssignment {
    pub fn get(&self, name: &str) -> Option<&JointPositionPair> {
        self.matched.iter().find(|m| m.name == name).map(|m| &m.pair)
    }

    /// Points needed to supply every joint (two per joint).
    pub fn points_required(&self) -> usize {
        2 * (self.matched.len() + self.unmatched.len())
    }

    pub fn is_complete(&self) -> bool {
        self.unmatched.is_empty()
    }
}

/// Pluggable point-to-joint correspondence.
pub trait CorrespondenceStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn assign(&self, hierarchy: &JointHierarchy, points: &[NormalizedPoint3]) -> JointAssignment;
}

/// Selectable strategy, for configuration files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CorrespondenceKind {
    #[default]
    Positional,
    NearestRest {
        #[serde(default = "default_frame_margin")]
        margin: f64,
    },
}

fn default_frame_margin() -> f64 {
    1.2
}

impl CorrespondenceKind {
    /// Switch to nearest-rest matching; an existing nearest-rest margin is
    /// kept.
    pub fn nearest_rest(self) -> Self {
        match self {
            CorrespondenceKind::NearestRest { .. } => self,
            CorrespondenceKind::Positional => CorrespondenceKind::NearestRest {
                margin: default_frame_margin(),
            },
        }
    }

    pub fn build(&self, bounds: NormalizationBounds) -> Box<dyn CorrespondenceStrategy> {
        match *self {
            CorrespondenceKind::Positional => Box::new(PositionalCorrespondence),
            CorrespondenceKind::NearestRest { margin } => {
                Box::new(NearestRestCorrespondence { bounds, margin })
            }
        }
    }
}

/// The i-th joint in traversal order takes `(points[2i], points[2i+1])` as
/// `(head, tail)`. Assumes detection order mirrors hierarchy order.
#[derive(Clone, Copy, Debug, Default)]
pub struct PositionalCorrespondence;

impl CorrespondenceStrategy for PositionalCorrespondence {
    fn name(&self) -> &'static str {
        "positional"
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip_all, fields(joints = hierarchy.len(), points = points.len()))
    )]
    fn assign(&self, hierarchy: &JointHierarchy, points: &[NormalizedPoint3]) -> JointAssignment {
        let mut out = JointAssignment {
            points_available: points.len(),
            ..JointAssignment::default()
        };

        for (i, joint) in hierarchy.traversal().enumerate() {
            match (points.get(2 * i), points.get(2 * i + 1)) {
                (Some(&head), Some(&tail)) => {
                    out.matched.push(MatchedJoint {
                        name: joint.name.clone(),
                        pair: JointPositionPair::new(head, tail),
                    });
                    out.points_used += 2;
                }
                _ => out.unmatched.push(joint.name.clone()),
            }
        }

        debug!(
            "positional: {} matched, {} unmatched, {}/{} points used",
            out.matched.len(),
            out.unmatched.len(),
            out.points_used,
            out.points_available
        );
        out
    }
}

/// Frames the rig's rest pose into the normalization bounds and gives each
/// joint (traversal order) the nearest unused point for its head, then for
/// its tail.
///
/// Rig axes map straight onto scene axes; the rig is centred on its bounding
/// box and scaled uniformly by its largest extent times `margin`.
#[derive(Clone, Copy, Debug)]
pub struct NearestRestCorrespondence {
    pub bounds: NormalizationBounds,
    pub margin: f64,
}

impl Default for NearestRestCorrespondence {
    fn default() -> Self {
        Self {
            bounds: NormalizationBounds::default(),
            margin: default_frame_margin(),
        }
    }
}

impl NearestRestCorrespondence {
    /// Rest head/tail of every joint mapped into normalized space, in
    /// declaration order.
    pub fn framed_rest(&self, hierarchy: &JointHierarchy) -> Vec<JointPositionPair> {
        let joints = hierarchy.joints();
        let mut lo = Vector3::repeat(f64::INFINITY);
        let mut hi = Vector3::repeat(f64::NEG_INFINITY);
        for j in joints {
            for p in [j.head, j.tail] {
                lo = lo.inf(&p.coords);
                hi = hi.sup(&p.coords);
            }
        }
        if joints.is_empty() {
            return Vec::new();
        }

        let center = 0.5 * (lo + hi);
        let extent = (hi - lo).max() * self.margin;
        let scale = if extent > f64::EPSILON {
            self.bounds.span() / extent
        } else {
            1.0
        };
        let c = self.bounds.center();
        let frame =
            |p: Point3<f64>| NormalizedPoint3::from((p.coords - center) * scale + Vector3::repeat(c));

        joints
            .iter()
            .map(|j| JointPositionPair::new(frame(j.head), frame(j.tail)))
            .collect()
    }
}

/// Bit pattern of a point, with `-0.0` folded onto `0.0`.
fn coord_key(p: &NormalizedPoint3) -> [u64; 3] {
    [p.x, p.y, p.z].map(|v| (v + 0.0).to_bits())
}

impl CorrespondenceStrategy for NearestRestCorrespondence {
    fn name(&self) -> &'static str {
        "nearest-rest"
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip_all, fields(joints = hierarchy.len(), points = points.len()))
    )]
    fn assign(&self, hierarchy: &JointHierarchy, points: &[NormalizedPoint3]) -> JointAssignment {
        let mut out = JointAssignment {
            points_available: points.len(),
            ..JointAssignment::default()
        };

        // Coincident points share one tree entry; kiddo buckets cannot hold
        // more than their capacity at a single coordinate.
        let mut tree: KdTree<f64, 3> = KdTree::new();
        let mut sites: Vec<Vec<usize>> = Vec::new();
        let mut site_of: HashMap<[u64; 3], usize> = HashMap::new();
        for (i, p) in points.iter().enumerate() {
            let site = *site_of.entry(coord_key(p)).or_insert_with(|| {
                tree.add(&[p.x, p.y, p.z], sites.len() as u64);
                sites.push(Vec::new());
                sites.len() - 1
            });
            sites[site].push(i);
        }
        // Pop from the back to hand out the lowest index first.
        for site in &mut sites {
            site.reverse();
        }
        let mut remaining = points.len();

        let framed = self.framed_rest(hierarchy);
        for idx in hierarchy.traversal_order() {
            let joint = &hierarchy.joints()[idx];
            if remaining < 2 {
                out.unmatched.push(joint.name.clone());
                continue;
            }

            let rest = framed[idx];
            let mut take = |q: &NormalizedPoint3| {
                let nearest = tree.nearest_one::<SquaredEuclidean>(&[q.x, q.y, q.z]);
                let site = &mut sites[nearest.item as usize];
                let i = site.pop()?;
                let p = points[i];
                if site.is_empty() {
                    tree.remove(&[p.x, p.y, p.z], nearest.item);
                }
                remaining -= 1;
                Some(p)
            };
            match (take(&rest.head), take(&rest.tail)) {
                (Some(head), Some(tail)) => {
                    out.matched.push(MatchedJoint {
                        name: joint.name.clone(),
                        pair: JointPositionPair::new(head, tail),
                    });
                    out.points_used += 2;
                }
                _ => out.unmatched.push(joint.name.clone()),
            }
        }

        debug!(
            "nearest-rest: {} matched, {} unmatched, {}/{} points used",
            out.matched.len(),
            out.unmatched.len(),
            out.points_used,
            out.points_available
        );
        out
    }
}
