//! Environment mesh aggregation.
//!
//! Scene reconstruction delivers the environment as many independently posed
//! triangle-mesh chunks that keep refining over time. [`MeshAggregator`] tracks
//! them by identity and merges the active ones into a single world-space
//! [`MergedMesh`] on demand.
//!
//! ```text
//! chunk provider ──ChunkEvent──> MeshAggregator ──merge()──> MergedMesh ──> obj / instances
//! ```
//!
//! Each chunk keeps its own shared vertices; nothing is welded across chunk
//! seams, so vertices on a shared border appear once per chunk.

/// Chunk registry, locking and the merge itself.
pub mod aggregator;
/// Axis-aligned bounds over merged vertices.
pub mod bounds;
/// Chunk records and validation.
pub mod chunk;
/// Serde-tagged chunk provider events.
pub mod events;
/// Per-instance submesh extraction.
pub mod instances;
/// Merge output and statistics.
pub mod merged;
/// OBJ text encoding and decoding.
pub mod obj;

pub use aggregator::{MeshAggregator, to_world};
pub use bounds::MeshBounds;
pub use chunk::{ChunkId, InvalidChunkError, MeshChunk};
pub use events::{ChunkEvent, parse_events};
pub use instances::{TriangleIdsError, extract_submesh, parse_triangle_ids};
pub use merged::{MergeReport, MergedMesh};
pub use obj::{ObjError, encode_obj, parse_obj, write_obj};
