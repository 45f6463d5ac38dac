/// Similarity threshold applied before the user adjusts anything
pub const DEFAULT_QUERY_THRESHOLD: f32 = 0.7;

/// Number of histogram bins drawn behind the threshold slider
pub const DEFAULT_HISTOGRAM_BINS: usize = 20;

/// Fraction of instances cut off in top-fraction selection mode.
/// 0.7 keeps the best 30% of scored instances.
pub const DEFAULT_TOP_FRACTION: f32 = 0.7;

/// Minimum table size before similarities are computed with rayon
pub const PARALLEL_SIMILARITY_THRESHOLD: usize = 256;
