//! Per-instance submeshes cut out of a merged mesh by triangle id.
use crate::merged::MergedMesh;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum TriangleIdsError {
    #[error("triangle id file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("instance key '{0}' is not an integer")]
    InvalidInstanceId(String),
}

/// Decode `{"<instance id>": [triangle ids...]}` into an ordered mapping.
pub fn parse_triangle_ids(json: &str) -> Result<BTreeMap<u32, Vec<usize>>, TriangleIdsError> {
    let raw: HashMap<String, Vec<usize>> = serde_json::from_str(json)?;
    raw.into_iter()
        .map(|(key, ids)| {
            key.trim()
                .parse::<u32>()
                .map(|instance| (instance, ids))
                .map_err(|_| TriangleIdsError::InvalidInstanceId(key))
        })
        .collect()
}

/// Build a compact mesh holding only the listed triangles.
///
/// Vertices are renumbered in order of first use. Triangle ids past the end of
/// `mesh` are skipped with a warning.
pub fn extract_submesh(mesh: &MergedMesh, triangle_ids: &[usize]) -> MergedMesh {
    let mut submesh = MergedMesh::default();
    let mut vertex_map: HashMap<u32, u32> = HashMap::new();
    let mut out_of_bounds = 0usize;

    for &triangle_id in triangle_ids {
        let Some(triangle) = mesh.triangles.get(triangle_id) else {
            out_of_bounds += 1;
            continue;
        };
        if triangle.iter().any(|&i| i as usize >= mesh.vertices.len()) {
            out_of_bounds += 1;
            continue;
        }

        let mut remapped = [0u32; 3];
        for (slot, &original) in remapped.iter_mut().zip(triangle) {
            *slot = *vertex_map.entry(original).or_insert_with(|| {
                submesh.vertices.push(mesh.vertices[original as usize]);
                (submesh.vertices.len() - 1) as u32
            });
        }
        submesh.triangles.push(remapped);
    }

    if out_of_bounds > 0 {
        warn!(
            "Skipped {} triangle ids beyond the {} triangles of the mesh",
            out_of_bounds,
            mesh.triangle_count()
        );
    }
    submesh
}
