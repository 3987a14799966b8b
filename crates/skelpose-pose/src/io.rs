//! JSON configuration, rig and report helpers.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use nalgebra::UnitQuaternion;
use serde::{Deserialize, Serialize};
use skelpose_core::{ColorChannel, JointHierarchy};
use skelpose_detect::ThresholdMode;

use crate::pipeline::{PoseParams, ProcessingResult};
use crate::rig::ArmatureRig;

#[derive(thiserror::Error, Debug)]
pub enum PoseIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Load a rig hierarchy (`{ "joints": [...] }`) from disk.
pub fn load_hierarchy(path: impl AsRef<Path>) -> Result<JointHierarchy, PoseIoError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Load a rig file into an in-memory armature named after the file stem.
pub fn load_rig(path: impl AsRef<Path>) -> Result<ArmatureRig, PoseIoError> {
    let path = path.as_ref();
    let hierarchy = load_hierarchy(path)?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Armature".to_string());
    Ok(ArmatureRig::new(name, hierarchy))
}

/// Write a rig hierarchy to disk as pretty JSON.
pub fn write_hierarchy(hierarchy: &JointHierarchy, path: impl AsRef<Path>) -> Result<(), PoseIoError> {
    let json = serde_json::to_string_pretty(hierarchy)?;
    fs::write(path, json)?;
    Ok(())
}

/// Configuration for one pose-extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseConfig {
    pub front_rest: String,
    pub side_rest: String,
    pub front_target: String,
    pub side_target: String,
    pub rig_path: String,
    #[serde(default)]
    pub output_path: Option<String>,
    /// Full parameter set; the scalar overrides below win over it.
    #[serde(default)]
    pub params: Option<PoseParams>,
    #[serde(default)]
    pub influence: Option<f64>,
    #[serde(default)]
    pub threshold: Option<u8>,
    #[serde(default)]
    pub channel: Option<ColorChannel>,
    #[serde(default)]
    pub joint_filter: Option<Vec<String>>,
}

impl PoseConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, PoseIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), PoseIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("skelpose_report.json"))
    }

    /// Image paths in front-rest, side-rest, front-target, side-target order.
    pub fn image_paths(&self) -> [&str; 4] {
        [
            self.front_rest.as_str(),
            self.side_rest.as_str(),
            self.front_target.as_str(),
            self.side_target.as_str(),
        ]
    }

    /// Build pipeline parameters, applying overrides from the config.
    pub fn build_params(&self) -> PoseParams {
        let mut params = self.params.clone().unwrap_or_default();
        if let Some(influence) = self.influence {
            params.solve.influence = influence;
        }
        if let Some(threshold) = self.threshold {
            params.detect.threshold = ThresholdMode::Fixed(threshold);
        }
        if let Some(channel) = self.channel {
            params.detect.channel = channel;
        }
        if let Some(filter) = self.joint_filter.clone() {
            params.joint_filter = Some(filter);
        }
        params
    }

    pub fn load_rig(&self) -> Result<ArmatureRig, PoseIoError> {
        load_rig(&self.rig_path)
    }
}

/// Run report: inputs, the processing result and the rig's final pose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseReport {
    pub config_path: Option<String>,
    pub rig_path: String,
    pub images: [String; 4],
    pub params: PoseParams,
    #[serde(default)]
    pub result: Option<ProcessingResult>,
    /// Local rotation of every rig joint after the run.
    #[serde(default)]
    pub pose: BTreeMap<String, UnitQuaternion<f64>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl PoseReport {
    pub fn new(cfg: &PoseConfig, config_path: Option<&Path>, params: PoseParams) -> Self {
        Self {
            config_path: config_path.map(|p| p.to_string_lossy().into_owned()),
            rig_path: cfg.rig_path.clone(),
            images: cfg.image_paths().map(str::to_string),
            params,
            result: None,
            pose: BTreeMap::new(),
            error: None,
        }
    }

    /// Record the outcome of a run against `rig`.
    pub fn set_result(&mut self, result: ProcessingResult, rig: &ArmatureRig) {
        self.error = result.error.clone();
        self.pose = rig.pose_snapshot();
        self.result = Some(result);
    }

    /// Record an error that prevented the run.
    pub fn set_error(&mut self, err: impl ToString) {
        self.error = Some(err.to_string());
    }

    pub fn succeeded(&self) -> bool {
        self.result.as_ref().is_some_and(|r| r.success)
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, PoseIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), PoseIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
