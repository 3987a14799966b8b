//! Threshold selection.

use skelpose_core::{ColorChannel, RgbImageView};

use crate::ThresholdMode;

/// Resolve the effective threshold for one image.
pub(crate) fn resolve_threshold(
    img: &RgbImageView<'_>,
    channel: ColorChannel,
    mode: ThresholdMode,
) -> u8 {
    match mode {
        ThresholdMode::Fixed(t) => t,
        ThresholdMode::Otsu => {
            let mut hist = [0u32; 256];
            for v in img.channel_values(channel) {
                hist[v as usize] += 1;
            }
            otsu_threshold(&hist)
        }
    }
}

/// Otsu threshold of a 256-bin histogram.
///
/// Returns the last intensity of the background class, so `value > t`
/// selects the foreground. Flat histograms return their single value.
pub(crate) fn otsu_threshold(hist: &[u32; 256]) -> u8 {
    let total: f64 = hist.iter().map(|&h| h as f64).sum();
    if total < 1.0 {
        return 127;
    }

    let min_v = hist.iter().position(|&h| h > 0).unwrap_or(0);
    let max_v = hist.iter().rposition(|&h| h > 0).unwrap_or(255);
    if min_v == max_v {
        return min_v as u8;
    }

    let nonzero_bins = hist.iter().filter(|&&h| h > 0).count();
    if nonzero_bins <= 2 {
        return ((min_v + max_v) / 2) as u8;
    }

    let sum_total: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &h)| i as f64 * h as f64)
        .sum();

    let mut sum_b = 0f64;
    let mut w_b = 0f64;
    let mut best_var = -1f64;
    let mut best_t = 127u8;

    for (t, &h) in hist.iter().enumerate() {
        w_b += h as f64;
        if w_b < 1.0 {
            continue;
        }
        let w_f = total - w_b;
        if w_f < 1.0 {
            break;
        }

        sum_b += t as f64 * h as f64;
        let m_b = sum_b / w_b;
        let m_f = (sum_total - sum_b) / w_f;

        let var_between = w_b * w_f * (m_b - m_f) * (m_b - m_f);
        if var_between > best_var {
            best_var = var_between;
            best_t = t as u8;
        }
    }

    best_t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_level_histogram_splits_between_levels() {
        let mut hist = [0u32; 256];
        hist[20] = 900;
        hist[230] = 100;
        assert_eq!(otsu_threshold(&hist), 125);
    }

    #[test]
    fn bimodal_histogram_threshold_separates_modes() {
        let mut hist = [0u32; 256];
        for v in 10..30 {
            hist[v] = 40;
        }
        for v in 200..240 {
            hist[v] = 10;
        }
        let t = otsu_threshold(&hist);
        assert!((29..200).contains(&t), "threshold {t} not between modes");
    }

    #[test]
    fn flat_histogram_returns_its_value() {
        let mut hist = [0u32; 256];
        hist[77] = 5;
        assert_eq!(otsu_threshold(&hist), 77);
    }
}
