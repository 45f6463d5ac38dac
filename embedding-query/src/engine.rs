//! Thread-safe query engine over one scan's embedding table.
//!
//! Table and session sit behind one `RwLock`. `set_query` scores under the
//! write lock, so a reader sees either the previous vector with its
//! similarities or the new vector with its similarities, never a mix.
use crate::histogram::{histogram_counts, normalize_counts};
use crate::session::{QueryOutcome, QuerySession, QueryState, QueryStatus};
use crate::table::{DimensionMismatch, EmbeddingTable, InstanceId};
use crate::vector::normalized;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// How the highlighter picks instances from the cached similarities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// Every instance scoring at least this similarity.
    Threshold(f32),
    /// Best `1 - fraction` share of scored instances.
    TopFraction(f32),
}

#[derive(Default)]
struct EngineState {
    table: EmbeddingTable,
    session: QuerySession,
}

#[derive(Default)]
pub struct QueryEngine {
    state: RwLock<EngineState>,
}

impl QueryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole table with a new scan. Returns the number of entries.
    ///
    /// A query vector already in place is re-scored against the new table in
    /// the same critical section.
    pub fn load_scan(&self, entries: impl IntoIterator<Item = (InstanceId, Vec<f32>)>) -> usize {
        let table = EmbeddingTable::from_raw(entries);
        let count = table.len();
        if count == 0 {
            info!("Loaded empty scan; queries will match nothing");
        } else {
            info!("Loaded embeddings for {} instances", count);
        }

        let mut state = self.state.write();
        state.table = table;
        let EngineState { table, session } = &mut *state;
        if let Some(outcome) = session.rescore(table) {
            debug!("Re-scored current query against new scan: {:?}", outcome);
            log_mismatches(outcome);
        }
        count
    }

    /// Announce the text of the next query.
    ///
    /// Repeating the current text keeps the cached similarities; new text
    /// invalidates them until the matching vector arrives via `set_query`.
    pub fn begin_query(&self, text: &str) -> QueryStatus {
        let status = self.state.write().session.begin(text);
        match status {
            QueryStatus::NeedsVector => info!("Requesting embedding for query '{}'", text),
            QueryStatus::StillWaiting => warn!("Still waiting for embedding of query '{}'", text),
            QueryStatus::Ready => debug!("Re-filtering cached similarities for '{}'", text),
        }
        status
    }

    /// Install a raw query embedding and recompute every similarity.
    /// The latest call wins.
    pub fn set_query(&self, vector: Vec<f32>) -> QueryOutcome {
        let vector = normalized(vector);

        let mut state = self.state.write();
        let EngineState { table, session } = &mut *state;
        let outcome = session.set_vector(vector, table);
        drop(state);

        log_mismatches(outcome);
        debug!("Scored query against {} instances", outcome.scored);
        outcome
    }

    /// Forget the current query and return to `Idle`.
    pub fn clear_query(&self) {
        self.state.write().session.clear();
    }

    /// Normalized histogram of cached similarities.
    pub fn histogram(&self, num_bins: usize) -> Vec<f32> {
        normalize_counts(&self.histogram_counts(num_bins))
    }

    /// Raw bucket counts of cached similarities.
    pub fn histogram_counts(&self, num_bins: usize) -> Vec<usize> {
        let state = self.state.read();
        histogram_counts(state.session.similarities().values().copied(), num_bins)
    }

    /// Ids whose cached similarity is at least `threshold`.
    pub fn matching_ids(&self, threshold: f32) -> BTreeSet<InstanceId> {
        let state = self.state.read();
        state
            .session
            .similarities()
            .iter()
            .filter(|(_, similarity)| **similarity >= threshold)
            .map(|(&id, _)| id)
            .collect()
    }

    /// The best `floor(N * (1 - fraction))` ids, highest similarity first,
    /// ties broken by ascending id.
    pub fn top_fraction(&self, fraction: f32) -> Vec<InstanceId> {
        let state = self.state.read();
        let similarities = state.session.similarities();

        let total = similarities.len();
        let keep = (total as f32 * (1.0 - fraction)).floor();
        let keep = if keep.is_nan() || keep <= 0.0 {
            0
        } else {
            (keep as usize).min(total)
        };

        let mut ranked: Vec<(InstanceId, f32)> =
            similarities.iter().map(|(&id, &s)| (id, s)).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(keep);
        ranked.into_iter().map(|(id, _)| id).collect()
    }

    /// Apply either selection mode. Threshold results come back in ascending id order.
    pub fn select(&self, selection: Selection) -> Vec<InstanceId> {
        match selection {
            Selection::Threshold(threshold) => self.matching_ids(threshold).into_iter().collect(),
            Selection::TopFraction(fraction) => self.top_fraction(fraction),
        }
    }

    pub fn state(&self) -> QueryState {
        self.state.read().session.state()
    }

    pub fn query_text(&self) -> Option<String> {
        self.state.read().session.query_text().map(str::to_owned)
    }

    pub fn query_vector(&self) -> Option<Vec<f32>> {
        self.state.read().session.query_vector().map(<[f32]>::to_vec)
    }

    pub fn similarity(&self, id: InstanceId) -> Option<f32> {
        self.state.read().session.similarities().get(&id).copied()
    }

    /// Copy of every cached similarity.
    pub fn similarities(&self) -> BTreeMap<InstanceId, f32> {
        self.state.read().session.similarities().clone()
    }

    /// Entries left out of the last scoring pass.
    pub fn mismatches(&self) -> Vec<DimensionMismatch> {
        self.state.read().session.mismatches().to_vec()
    }

    /// Number of instances in the loaded scan.
    pub fn instance_count(&self) -> usize {
        self.state.read().table.len()
    }
}

fn log_mismatches(outcome: QueryOutcome) {
    if outcome.mismatched > 0 {
        warn!(
            "Vector size mismatch for {} instances; they were left out of the query",
            outcome.mismatched
        );
    }
}
