//! Similarity histogram behind the adaptive threshold slider.
//!
//! Bins split [0, 1) into `num_bins` half-open buckets `[i/n, (i+1)/n)`.
//! Values outside that range (negative similarities, or exactly 1.0) land in
//! no bucket, so counts need not add up to the number of scored instances.

/// Raw bucket counts for `values`. Zero bins yields an empty histogram.
pub fn histogram_counts(values: impl IntoIterator<Item = f32>, num_bins: usize) -> Vec<usize> {
    let mut counts = vec![0usize; num_bins];
    if num_bins == 0 {
        return counts;
    }

    for value in values {
        if !(0.0..1.0).contains(&value) {
            continue;
        }
        let bin = ((value * num_bins as f32) as usize).min(num_bins - 1);
        counts[bin] += 1;
    }
    counts
}

/// Scale counts by the largest bucket so the tallest bar is 1.0.
pub fn normalize_counts(counts: &[usize]) -> Vec<f32> {
    let max = counts.iter().copied().max().unwrap_or(0);
    if max == 0 {
        return vec![0.0; counts.len()];
    }
    counts.iter().map(|&c| c as f32 / max as f32).collect()
}

/// Absolute similarity threshold at the lower edge of `bin`.
/// Converts a slider position counted in bins into a value for `matching_ids`.
pub fn threshold_for_bin(bin: usize, num_bins: usize) -> f32 {
    if num_bins == 0 {
        return 0.0;
    }
    bin.min(num_bins) as f32 / num_bins as f32
}
