use skelpose_core::{ColorChannel, RgbImageView};

/// Binary foreground mask of one image, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryMask {
    pub width: usize,
    pub height: usize,
    pub data: Vec<bool>,
}

impl BinaryMask {
    /// Mark every pixel whose `channel` intensity is strictly above `threshold`.
    pub fn from_channel(img: &RgbImageView<'_>, channel: ColorChannel, threshold: u8) -> Self {
        let data = img.channel_values(channel).map(|v| v > threshold).collect();
        Self {
            width: img.width,
            height: img.height,
            data,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.data[y * self.width + x]
    }

    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.data.iter().any(|&v| v)
    }

    /// True when every foreground pixel of `self` is also set in `other`.
    pub fn is_subset_of(&self, other: &BinaryMask) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.data.iter().zip(&other.data).all(|(&a, &b)| !a || b)
    }
}
