//! Axis-aligned bounds of merged mesh geometry
use constants::mesh::BOUNDS_BATCH_SIZE;
use glam::Vec3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for MeshBounds {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshBounds {
    /// Create new bounds initialised to infinity values
    pub fn new() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    /// Update bounds with a new vertex
    pub fn update(&mut self, position: Vec3) {
        self.min = self.min.min(position);
        self.max = self.max.max(position);
    }

    /// Grow these bounds to also enclose `other`
    pub fn merge(mut self, other: MeshBounds) -> Self {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self
    }

    /// True until at least one vertex was added
    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    /// World space extent along each axis
    pub fn dimensions(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::ZERO;
        }
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::ZERO;
        }
        (self.min + self.max) * 0.5
    }

    /// Calculate bounds over all vertices, reducing parallel batches.
    pub fn from_vertices(vertices: &[Vec3]) -> Self {
        vertices
            .par_chunks(BOUNDS_BATCH_SIZE)
            .map(|batch| {
                let mut local_bounds = MeshBounds::new();
                for &vertex in batch {
                    local_bounds.update(vertex);
                }
                local_bounds
            })
            .reduce_with(MeshBounds::merge)
            .unwrap_or_else(MeshBounds::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bounds_have_no_extent() {
        let bounds = MeshBounds::from_vertices(&[]);
        assert!(bounds.is_empty());
        assert_eq!(bounds.dimensions(), Vec3::ZERO);
        assert_eq!(bounds.center(), Vec3::ZERO);
    }

    #[test]
    fn encloses_every_vertex() {
        let bounds = MeshBounds::from_vertices(&[
            Vec3::new(-1.0, 2.0, 0.5),
            Vec3::new(3.0, -4.0, 0.0),
            Vec3::new(0.0, 0.0, 6.0),
        ]);
        assert_eq!(bounds.min, Vec3::new(-1.0, -4.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(3.0, 2.0, 6.0));
        assert_eq!(bounds.dimensions(), Vec3::new(4.0, 6.0, 6.0));
        assert_eq!(bounds.center(), Vec3::new(1.0, -1.0, 3.0));
    }

    #[test]
    fn parallel_batches_agree_with_sequential_update() {
        let vertices: Vec<Vec3> = (0..(BOUNDS_BATCH_SIZE * 3 + 17))
            .map(|i| {
                let t = i as f32;
                Vec3::new(t.sin() * 10.0, t * 0.001, -t.cos())
            })
            .collect();

        let mut sequential = MeshBounds::new();
        for &v in &vertices {
            sequential.update(v);
        }

        assert_eq!(MeshBounds::from_vertices(&vertices), sequential);
    }
}
