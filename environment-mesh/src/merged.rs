//! World-space mesh assembled from every active chunk.
use crate::bounds::MeshBounds;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Single indexed triangle mesh in world space.
/// Vertices are not welded across chunk seams.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergedMesh {
    pub vertices: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
}

impl MergedMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Flat index count, three per triangle
    pub fn index_count(&self) -> usize {
        self.triangles.len() * 3
    }

    /// No vertices and no faces. A point-only mesh is not empty.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.triangles.is_empty()
    }

    /// Triangle indices flattened for index-buffer style consumers
    pub fn flat_indices(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }

    pub fn bounds(&self) -> MeshBounds {
        MeshBounds::from_vertices(&self.vertices)
    }
}

/// Counters gathered while merging, for logging and export summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    /// Active chunks that contributed geometry.
    pub chunks_merged: usize,
    /// Chunks kept in the registry but switched off.
    pub inactive_skipped: usize,
    /// Active chunks without any vertices.
    pub empty_skipped: usize,
    /// Vertices whose homogeneous w was zero or whose result was not finite.
    pub degenerate_vertices: usize,
    /// Triangles dropped because they touched a degenerate vertex.
    pub dropped_triangles: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertices_alone_make_a_mesh_non_empty() {
        let points = MergedMesh {
            vertices: vec![Vec3::ZERO, Vec3::Y],
            triangles: vec![],
        };
        assert!(!points.is_empty());
        assert_eq!(points.triangle_count(), 0);
        assert!(MergedMesh::default().is_empty());
    }
}
