//! Chunk registry and world-space merge.
//!
//! Registry mutation and the merge snapshot share one lock. `merge` only holds
//! it long enough to clone `Arc` handles of the active chunks; transforming and
//! concatenating happens afterwards, so upserts are never blocked by a merge in
//! progress and a merge never sees half of an update.
use crate::chunk::{ChunkId, InvalidChunkError, MeshChunk};
use crate::events::ChunkEvent;
use crate::merged::{MergeReport, MergedMesh};
use constants::mesh::PARALLEL_CHUNK_THRESHOLD;
use glam::{Mat4, Vec3};
use parking_lot::Mutex;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

struct RegistryEntry {
    chunk: Arc<MeshChunk>,
    active: bool,
}

/// Chunks keyed by id, iterated in first-insertion order.
#[derive(Default)]
struct ChunkRegistry {
    order: Vec<ChunkId>,
    entries: HashMap<ChunkId, RegistryEntry>,
}

/// Consistent view of the registry taken under the lock.
struct Snapshot {
    active: Vec<Arc<MeshChunk>>,
    inactive: usize,
}

impl ChunkRegistry {
    fn snapshot(&self) -> Snapshot {
        let mut active = Vec::with_capacity(self.order.len());
        let mut inactive = 0;
        for id in &self.order {
            let Some(entry) = self.entries.get(id) else {
                continue;
            };
            if entry.active {
                active.push(Arc::clone(&entry.chunk));
            } else {
                inactive += 1;
            }
        }
        Snapshot { active, inactive }
    }
}

/// Collects posed chunks over time and merges them into one world-space mesh.
#[derive(Default)]
pub struct MeshAggregator {
    registry: Mutex<ChunkRegistry>,
}

impl MeshAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or wholesale replace the chunk for `id`.
    /// A rejected update leaves any previous record for `id` untouched.
    pub fn upsert_chunk(
        &self,
        id: ChunkId,
        transform: Mat4,
        vertices: Vec<Vec3>,
        triangles: Vec<[u32; 3]>,
        active: bool,
    ) -> Result<(), InvalidChunkError> {
        let chunk = match MeshChunk::new(id, transform, vertices, triangles) {
            Ok(chunk) => Arc::new(chunk),
            Err(err) => {
                warn!("Rejected chunk update: {}", err);
                return Err(err);
            }
        };

        let mut registry = self.registry.lock();
        let entry = RegistryEntry { chunk, active };
        if registry.entries.insert(id, entry).is_none() {
            registry.order.push(id);
            info!("Discovered new reconstruction chunk {}", id);
        } else {
            debug!("Updated reconstruction chunk {}", id);
        }
        Ok(())
    }

    /// Toggle visibility without touching geometry.
    /// Returns false when `id` is unknown.
    pub fn set_active(&self, id: ChunkId, active: bool) -> bool {
        let mut registry = self.registry.lock();
        match registry.entries.get_mut(&id) {
            Some(entry) => {
                entry.active = active;
                true
            }
            None => {
                warn!("Cannot set activity of unknown chunk {}", id);
                false
            }
        }
    }

    /// Delete the chunk record. Returns false when `id` is unknown.
    pub fn remove_chunk(&self, id: ChunkId) -> bool {
        let mut registry = self.registry.lock();
        if registry.entries.remove(&id).is_none() {
            return false;
        }
        registry.order.retain(|known| *known != id);
        debug!("Removed reconstruction chunk {}", id);
        true
    }

    /// Apply one event from the chunk provider.
    pub fn apply(&self, event: ChunkEvent) -> Result<(), InvalidChunkError> {
        match event {
            ChunkEvent::Upsert {
                id,
                transform,
                vertices,
                triangles,
                active,
            } => self.upsert_chunk(id, transform, vertices, triangles, active),
            ChunkEvent::SetActive { id, active } => {
                self.set_active(id, active);
                Ok(())
            }
            ChunkEvent::Remove { id } => {
                self.remove_chunk(id);
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.registry.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: ChunkId) -> bool {
        self.registry.lock().entries.contains_key(&id)
    }

    pub fn is_active(&self, id: ChunkId) -> Option<bool> {
        self.registry.lock().entries.get(&id).map(|entry| entry.active)
    }

    /// Known chunk ids in merge order
    pub fn ids(&self) -> Vec<ChunkId> {
        self.registry.lock().order.clone()
    }

    /// Current record for `id`, sharing its geometry
    pub fn chunk(&self, id: ChunkId) -> Option<Arc<MeshChunk>> {
        self.registry
            .lock()
            .entries
            .get(&id)
            .map(|entry| Arc::clone(&entry.chunk))
    }

    /// Merge all active chunks into one world-space mesh.
    pub fn merge(&self) -> MergedMesh {
        self.merge_with_report().0
    }

    /// Merge and also report what was skipped along the way.
    pub fn merge_with_report(&self) -> (MergedMesh, MergeReport) {
        let snapshot = self.registry.lock().snapshot();

        let mut report = MergeReport {
            inactive_skipped: snapshot.inactive,
            ..MergeReport::default()
        };

        let with_geometry: Vec<&MeshChunk> = snapshot
            .active
            .iter()
            .map(Arc::as_ref)
            .filter(|chunk| {
                if chunk.has_geometry() {
                    true
                } else {
                    debug!("Ignoring reconstruction chunk {} without vertices", chunk.id);
                    report.empty_skipped += 1;
                    false
                }
            })
            .collect();

        let transformed: Vec<TransformedChunk> = if with_geometry.len() >= PARALLEL_CHUNK_THRESHOLD
        {
            with_geometry.par_iter().map(|c| transform_chunk(c)).collect()
        } else {
            with_geometry.iter().map(|c| transform_chunk(c)).collect()
        };

        let vertex_total = transformed.iter().map(|t| t.vertices.len()).sum();
        let triangle_total = transformed.iter().map(|t| t.triangles.len()).sum();
        let mut mesh = MergedMesh {
            vertices: Vec::with_capacity(vertex_total),
            triangles: Vec::with_capacity(triangle_total),
        };

        for chunk in transformed {
            // Offset by the running vertex count before appending this chunk's vertices.
            let offset = mesh.vertices.len() as u32;
            mesh.triangles.extend(
                chunk
                    .triangles
                    .iter()
                    .map(|t| [t[0] + offset, t[1] + offset, t[2] + offset]),
            );
            mesh.vertices.extend(chunk.vertices);

            report.chunks_merged += 1;
            report.degenerate_vertices += chunk.degenerate_vertices;
            report.dropped_triangles += chunk.dropped_triangles;
        }

        debug!(
            "Merged {} chunks into {} vertices and {} triangles",
            report.chunks_merged,
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        (mesh, report)
    }
}

/// One chunk's contribution in world space, indices still chunk-local.
struct TransformedChunk {
    vertices: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
    degenerate_vertices: usize,
    dropped_triangles: usize,
}

/// Map a local position to world space with homogeneous divide.
/// Returns `None` for w == 0 and for non-finite results.
pub fn to_world(transform: &Mat4, local: Vec3) -> Option<Vec3> {
    let p = *transform * local.extend(1.0);
    if p.w == 0.0 {
        return None;
    }
    let world = p.truncate() / p.w;
    world.is_finite().then_some(world)
}

fn transform_chunk(chunk: &MeshChunk) -> TransformedChunk {
    let mut vertices = Vec::with_capacity(chunk.vertices.len());
    let mut remap: Vec<Option<u32>> = Vec::with_capacity(chunk.vertices.len());

    for &local in &chunk.vertices {
        match to_world(&chunk.transform, local) {
            Some(world) => {
                remap.push(Some(vertices.len() as u32));
                vertices.push(world);
            }
            None => remap.push(None),
        }
    }

    let degenerate_vertices = chunk.vertices.len() - vertices.len();
    if degenerate_vertices == 0 {
        return TransformedChunk {
            vertices,
            triangles: chunk.triangles.clone(),
            degenerate_vertices: 0,
            dropped_triangles: 0,
        };
    }

    // Indices shift once vertices are skipped, so rebuild them through the remap.
    let triangles: Vec<[u32; 3]> = chunk
        .triangles
        .iter()
        .filter_map(|t| {
            Some([
                remap[t[0] as usize]?,
                remap[t[1] as usize]?,
                remap[t[2] as usize]?,
            ])
        })
        .collect();
    let dropped_triangles = chunk.triangles.len() - triangles.len();

    warn!(
        "Chunk {} has {} degenerate vertices (w = 0); dropped {} triangles",
        chunk.id, degenerate_vertices, dropped_triangles
    );

    TransformedChunk {
        vertices,
        triangles,
        degenerate_vertices,
        dropped_triangles,
    }
}
