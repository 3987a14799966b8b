use serde::{Deserialize, Serialize};
use skelpose_core::ColorChannel;

/// How the binary mask threshold is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMode {
    /// Pixels whose channel intensity is strictly greater than the value.
    Fixed(u8),
    /// Otsu threshold of the selected channel's histogram.
    Otsu,
}

impl Default for ThresholdMode {
    fn default() -> Self {
        ThresholdMode::Fixed(100)
    }
}

/// Which detection backend to run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendChoice {
    /// Connected components when compiled in, grid subsampling otherwise.
    #[default]
    Auto,
    Components,
    Subsample,
}

/// Parameters for the bone pixel detector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectParams {
    /// Channel carrying the highlight colour.
    pub channel: ColorChannel,
    pub threshold: ThresholdMode,
    pub backend: BackendChoice,
    /// Cell size of the subsampling grid, in pixels.
    pub grid_cell_px: u32,
    /// Components smaller than this many pixels are dropped as noise.
    pub min_component_px: usize,
}

impl Default for DetectParams {
    fn default() -> Self {
        Self {
            channel: ColorChannel::R,
            threshold: ThresholdMode::default(),
            backend: BackendChoice::Auto,
            grid_cell_px: 10,
            min_component_px: 1,
        }
    }
}

impl DetectParams {
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = ThresholdMode::Fixed(threshold);
        self
    }

    pub fn with_channel(mut self, channel: ColorChannel) -> Self {
        self.channel = channel;
        self
    }
}
