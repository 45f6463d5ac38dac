/// Minimum number of active chunks before merge transforms chunks in parallel
pub const PARALLEL_CHUNK_THRESHOLD: usize = 4;

/// Vertex batch size for the parallel bounds reduction
pub const BOUNDS_BATCH_SIZE: usize = 25_000;
