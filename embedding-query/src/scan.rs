//! JSON decoding for scan embedding files and embedding service responses.
//!
//! Neither format is read by the engine itself; loaders call these helpers and
//! hand the decoded data to [`QueryEngine`](crate::QueryEngine).
use crate::table::InstanceId;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("instance key '{0}' is not an integer")]
    InvalidInstanceId(String),
}

/// Decode a scan file: `{"<instance id>": [f32, ...], ...}`.
pub fn parse_scan(json: &str) -> Result<BTreeMap<InstanceId, Vec<f32>>, ScanError> {
    let raw: HashMap<String, Vec<f32>> = serde_json::from_str(json)?;
    raw.into_iter()
        .map(|(key, vector)| match key.trim().parse::<InstanceId>() {
            Ok(id) => Ok((id, vector)),
            Err(_) => Err(ScanError::InvalidInstanceId(key)),
        })
        .collect()
}

/// Body of a text-to-embedding service reply.
#[derive(Deserialize)]
#[serde(untagged)]
enum EmbeddingResponse {
    Wrapped {
        #[serde(rename = "CLIP_embedding")]
        embedding: Vec<f32>,
    },
    Bare(Vec<f32>),
}

/// Decode the embedding from a service reply, or from a bare JSON array.
pub fn parse_embedding_response(json: &str) -> Result<Vec<f32>, ScanError> {
    let response: EmbeddingResponse = serde_json::from_str(json)?;
    Ok(match response {
        EmbeddingResponse::Wrapped { embedding } => embedding,
        EmbeddingResponse::Bare(embedding) => embedding,
    })
}

/// Request body expected by the text-to-embedding service.
pub fn embedding_request_body(text: &str) -> String {
    serde_json::json!({ "text": text }).to_string()
}
