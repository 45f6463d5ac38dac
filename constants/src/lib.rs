//! Shared defaults for the mesh aggregation and embedding query crates
pub mod export;
pub mod mesh;
pub mod query;
