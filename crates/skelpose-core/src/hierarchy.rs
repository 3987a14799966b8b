//! Rest-pose joint hierarchy of a rig.
//!
//! Joints form a rooted forest. The hierarchy is validated once on
//! construction (unique names, known parents, no cycles) and is read-only
//! afterwards.

use std::collections::HashMap;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("duplicate joint name `{0}`")]
    DuplicateName(String),
    #[error("joint `{joint}` references unknown parent `{parent}`")]
    UnknownParent { joint: String, parent: String },
    #[error("parent chain of joint `{0}` contains a cycle")]
    Cycle(String),
}

/// Serializable description of one joint, as supplied by the host rig.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointSpec {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    pub head: Point3<f64>,
    pub tail: Point3<f64>,
}

/// Serialized form of a hierarchy: `{ "joints": [...] }`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HierarchySpec {
    pub joints: Vec<JointSpec>,
}

/// A validated joint.
#[derive(Clone, Debug, PartialEq)]
pub struct Joint {
    pub name: String,
    /// Index of the parent joint in the hierarchy, `None` for roots.
    pub parent: Option<usize>,
    /// Number of ancestors (0 for roots).
    pub depth: usize,
    pub head: Point3<f64>,
    pub tail: Point3<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HierarchySpec", into = "HierarchySpec")]
pub struct JointHierarchy {
    joints: Vec<Joint>,
    by_name: HashMap<String, usize>,
}

impl JointHierarchy {
    pub fn new(specs: Vec<JointSpec>) -> Result<Self, HierarchyError> {
        let mut by_name = HashMap::with_capacity(specs.len());
        for (idx, spec) in specs.iter().enumerate() {
            if by_name.insert(spec.name.clone(), idx).is_some() {
                return Err(HierarchyError::DuplicateName(spec.name.clone()));
            }
        }

        let mut parents = Vec::with_capacity(specs.len());
        for spec in &specs {
            let parent = match &spec.parent {
                Some(p) => Some(*by_name.get(p).ok_or_else(|| HierarchyError::UnknownParent {
                    joint: spec.name.clone(),
                    parent: p.clone(),
                })?),
                None => None,
            };
            parents.push(parent);
        }

        let n = specs.len();
        let mut joints = Vec::with_capacity(n);
        for (idx, spec) in specs.into_iter().enumerate() {
            let mut depth = 0usize;
            let mut cursor = parents[idx];
            while let Some(p) = cursor {
                depth += 1;
                if depth > n {
                    return Err(HierarchyError::Cycle(spec.name));
                }
                cursor = parents[p];
            }
            joints.push(Joint {
                name: spec.name,
                parent: parents[idx],
                depth,
                head: spec.head,
                tail: spec.tail,
            });
        }

        Ok(Self { joints, by_name })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Joints in declaration order.
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&Joint> {
        self.index_of(name).map(|idx| &self.joints[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn parent_of(&self, name: &str) -> Option<&Joint> {
        let joint = self.get(name)?;
        joint.parent.map(|p| &self.joints[p])
    }

    pub fn roots(&self) -> impl Iterator<Item = &Joint> {
        self.joints.iter().filter(|j| j.parent.is_none())
    }

    /// Root-to-leaf joint order: depth-major, declaration order within one
    /// depth. Every implementation of a level-order walk over all roots that
    /// keeps declaration order stable yields this same sequence.
    pub fn traversal_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.joints.len()).collect();
        order.sort_by_key(|&idx| self.joints[idx].depth);
        order
    }

    /// Joints in [`traversal_order`](Self::traversal_order).
    pub fn traversal(&self) -> impl Iterator<Item = &Joint> {
        self.traversal_order()
            .into_iter()
            .map(move |idx| &self.joints[idx])
    }

    pub fn to_specs(&self) -> Vec<JointSpec> {
        self.joints
            .iter()
            .map(|j| JointSpec {
                name: j.name.clone(),
                parent: j.parent.map(|p| self.joints[p].name.clone()),
                head: j.head,
                tail: j.tail,
            })
            .collect()
    }
}

impl TryFrom<HierarchySpec> for JointHierarchy {
    type Error = HierarchyError;

    fn try_from(spec: HierarchySpec) -> Result<Self, Self::Error> {
        JointHierarchy::new(spec.joints)
    }
}

impl From<JointHierarchy> for HierarchySpec {
    fn from(h: JointHierarchy) -> Self {
        HierarchySpec {
            joints: h.to_specs(),
        }
    }
}
