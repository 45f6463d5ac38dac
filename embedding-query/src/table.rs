//! Per-instance embedding table for one loaded scan.
use crate::vector::{dot, normalized};
use constants::query::PARALLEL_SIMILARITY_THRESHOLD;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Integer id of one semantically identified object in a scan.
pub type InstanceId = u32;

/// Stored vector length differs from the query's; the entry is left unscored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionMismatch {
    pub instance_id: InstanceId,
    pub expected: usize,
    pub found: usize,
}

/// Result of scoring one query vector against the whole table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scores {
    pub similarities: BTreeMap<InstanceId, f32>,
    pub mismatches: Vec<DimensionMismatch>,
}

/// Normalized embeddings keyed by instance id, iterated in ascending id order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddingTable {
    records: BTreeMap<InstanceId, Vec<f32>>,
}

impl EmbeddingTable {
    /// Build a table from raw vectors, L2-normalizing each one.
    /// A later duplicate id replaces the earlier entry.
    pub fn from_raw(entries: impl IntoIterator<Item = (InstanceId, Vec<f32>)>) -> Self {
        let records = entries
            .into_iter()
            .map(|(id, vector)| (id, normalized(vector)))
            .collect();
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: InstanceId) -> Option<&[f32]> {
        self.records.get(&id).map(Vec::as_slice)
    }

    pub fn ids(&self) -> impl Iterator<Item = InstanceId> + '_ {
        self.records.keys().copied()
    }

    /// Cosine similarity of `query` (already normalized) against every entry
    /// of matching length.
    pub fn score(&self, query: &[f32]) -> Scores {
        let score_one = |(&id, vector): (&InstanceId, &Vec<f32>)| {
            if vector.len() == query.len() {
                Ok((id, dot(query, vector)))
            } else {
                Err(DimensionMismatch {
                    instance_id: id,
                    expected: query.len(),
                    found: vector.len(),
                })
            }
        };

        let results: Vec<Result<(InstanceId, f32), DimensionMismatch>> =
            if self.records.len() >= PARALLEL_SIMILARITY_THRESHOLD {
                self.records.par_iter().map(score_one).collect()
            } else {
                self.records.iter().map(score_one).collect()
            };

        let mut scores = Scores::default();
        for result in results {
            match result {
                Ok((id, similarity)) => {
                    scores.similarities.insert(id, similarity);
                }
                Err(mismatch) => scores.mismatches.push(mismatch),
            }
        }
        scores.mismatches.sort_by_key(|m| m.instance_id);
        scores
    }
}
