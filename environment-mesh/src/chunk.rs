//! Posed mesh chunks delivered by scene reconstruction.
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stable identity of one reconstruction unit.
/// Only equality matters; the value carries no geometric meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkId(pub u64);

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for ChunkId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Rejected chunk update: a triangle points past the end of the vertex list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "chunk {chunk} triangle {triangle} references vertex {index} but the chunk has {vertex_count} vertices"
)]
pub struct InvalidChunkError {
    pub chunk: ChunkId,
    pub triangle: usize,
    pub index: u32,
    pub vertex_count: usize,
}

/// One locally coherent piece of the environment mesh.
/// Geometry lives in chunk-local space; `transform` maps it to world space.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshChunk {
    pub id: ChunkId,
    pub transform: Mat4,
    pub vertices: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
}

impl MeshChunk {
    /// Build a chunk, rejecting it if any index is out of range.
    pub fn new(
        id: ChunkId,
        transform: Mat4,
        vertices: Vec<Vec3>,
        triangles: Vec<[u32; 3]>,
    ) -> Result<Self, InvalidChunkError> {
        let chunk = Self {
            id,
            transform,
            vertices,
            triangles,
        };
        chunk.validate()?;
        Ok(chunk)
    }

    /// Check that every triangle index addresses an existing vertex
    pub fn validate(&self) -> Result<(), InvalidChunkError> {
        let vertex_count = self.vertices.len();
        for (triangle, corners) in self.triangles.iter().enumerate() {
            if let Some(&index) = corners.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(InvalidChunkError {
                    chunk: self.id,
                    triangle,
                    index,
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    /// Scanning produces partial chunks. Only a chunk without vertices is
    /// skipped; vertices without faces still land in the merged mesh.
    pub fn has_geometry(&self) -> bool {
        !self.vertices.is_empty()
    }

    pub fn index_count(&self) -> usize {
        self.triangles.len() * 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> (Vec<Vec3>, Vec<[u32; 3]>) {
        (
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn accepts_in_range_indices() {
        let (vertices, triangles) = quad();
        let chunk = MeshChunk::new(ChunkId(1), Mat4::IDENTITY, vertices, triangles).unwrap();
        assert!(chunk.has_geometry());
        assert_eq!(chunk.index_count(), 6);
    }

    #[test]
    fn reports_first_out_of_range_index() {
        let (vertices, _) = quad();
        let err = MeshChunk::new(
            ChunkId(7),
            Mat4::IDENTITY,
            vertices,
            vec![[0, 1, 2], [2, 4, 3]],
        )
        .unwrap_err();

        assert_eq!(
            err,
            InvalidChunkError {
                chunk: ChunkId(7),
                triangle: 1,
                index: 4,
                vertex_count: 4,
            }
        );
        assert!(err.to_string().contains("chunk #7"));
    }

    #[test]
    fn empty_chunk_is_valid_but_has_no_geometry() {
        let chunk = MeshChunk::new(ChunkId(2), Mat4::IDENTITY, vec![], vec![]).unwrap();
        assert!(!chunk.has_geometry());
    }

    #[test]
    fn vertices_without_triangles_count_as_geometry() {
        let chunk =
            MeshChunk::new(ChunkId(3), Mat4::IDENTITY, vec![Vec3::ZERO, Vec3::X], vec![]).unwrap();
        assert!(chunk.has_geometry());
        assert_eq!(chunk.index_count(), 0);
    }
}
