//! Semantic instance queries over per-object embeddings.
//!
//! A scan provides one embedding per object instance. A query embedding is
//! compared against all of them by cosine similarity; the highlighter then
//! picks instances either by absolute threshold or by top fraction, with a
//! similarity histogram to guide where the threshold should sit.
//!
//! ```text
//! scan JSON ──parse_scan──> load_scan ─┐
//!                                      ├─> QueryEngine ──> matching_ids / top_fraction / histogram
//! embedding reply ──────────> set_query┘
//! ```

pub mod engine;
pub mod histogram;
pub mod scan;
pub mod session;
pub mod table;
pub mod vector;

pub use engine::{QueryEngine, Selection};
pub use histogram::{histogram_counts, normalize_counts, threshold_for_bin};
pub use scan::{ScanError, embedding_request_body, parse_embedding_response, parse_scan};
pub use session::{QueryOutcome, QueryState, QueryStatus};
pub use table::{DimensionMismatch, EmbeddingTable, InstanceId};
