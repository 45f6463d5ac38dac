//! Chunk updates as delivered by an external reconstruction event pump.
use crate::chunk::ChunkId;
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// One observation from the chunk provider.
///
/// A provider that only knows "chunk discovered / updated" emits `Upsert`
/// with the default `active = true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ChunkEvent {
    Upsert {
        id: ChunkId,
        #[serde(default)]
        transform: Mat4,
        vertices: Vec<Vec3>,
        triangles: Vec<[u32; 3]>,
        #[serde(default = "default_active")]
        active: bool,
    },
    SetActive {
        id: ChunkId,
        active: bool,
    },
    Remove {
        id: ChunkId,
    },
}

fn default_active() -> bool {
    true
}

impl ChunkEvent {
    pub fn id(&self) -> ChunkId {
        match self {
            ChunkEvent::Upsert { id, .. }
            | ChunkEvent::SetActive { id, .. }
            | ChunkEvent::Remove { id } => *id,
        }
    }
}

/// Decode a JSON array of chunk events.
pub fn parse_events(json: &str) -> Result<Vec<ChunkEvent>, serde_json::Error> {
    serde_json::from_str(json)
}
