//! Query lifecycle: which text is being asked and whether its vector arrived.
use crate::table::{DimensionMismatch, EmbeddingTable, InstanceId, Scores};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `Idle → AwaitingVector → Ready`; a new query text drops back to `AwaitingVector`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryState {
    #[default]
    Idle,
    AwaitingVector,
    Ready,
}

/// What the caller must do after announcing a query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// New text: fetch its embedding and pass it to `set_query`.
    NeedsVector,
    /// Same text, embedding still in flight.
    StillWaiting,
    /// Same text, similarities cached: re-filter only.
    Ready,
}

/// Summary of one `set_query` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOutcome {
    pub scored: usize,
    pub mismatched: usize,
}

/// Current query vector together with the similarities derived from it.
/// Both are only ever replaced together.
#[derive(Debug, Clone, Default)]
pub struct QuerySession {
    query_text: Option<String>,
    query_vector: Option<Vec<f32>>,
    scores: Scores,
    state: QueryState,
}

impl QuerySession {
    pub fn state(&self) -> QueryState {
        self.state
    }

    pub fn query_text(&self) -> Option<&str> {
        self.query_text.as_deref()
    }

    pub fn query_vector(&self) -> Option<&[f32]> {
        self.query_vector.as_deref()
    }

    pub fn similarities(&self) -> &BTreeMap<InstanceId, f32> {
        &self.scores.similarities
    }

    pub fn mismatches(&self) -> &[DimensionMismatch] {
        &self.scores.mismatches
    }

    /// Announce the text of the next query.
    pub(crate) fn begin(&mut self, text: &str) -> QueryStatus {
        if self.query_text.as_deref() == Some(text) {
            match self.state {
                QueryState::Ready => return QueryStatus::Ready,
                QueryState::AwaitingVector => return QueryStatus::StillWaiting,
                QueryState::Idle => {}
            }
        }

        self.query_text = Some(text.to_owned());
        self.query_vector = None;
        self.scores = Scores::default();
        self.state = QueryState::AwaitingVector;
        QueryStatus::NeedsVector
    }

    /// Store a normalized query vector and score it against `table`.
    pub(crate) fn set_vector(&mut self, vector: Vec<f32>, table: &EmbeddingTable) -> QueryOutcome {
        self.scores = table.score(&vector);
        self.query_vector = Some(vector);
        self.state = QueryState::Ready;
        self.outcome()
    }

    /// Re-score the current vector after the table was replaced.
    pub(crate) fn rescore(&mut self, table: &EmbeddingTable) -> Option<QueryOutcome> {
        let vector = self.query_vector.as_deref()?;
        self.scores = table.score(vector);
        Some(self.outcome())
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }

    fn outcome(&self) -> QueryOutcome {
        QueryOutcome {
            scored: self.scores.similarities.len(),
            mismatched: self.scores.mismatches.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_text_while_waiting_reports_still_waiting() {
        let mut session = QuerySession::default();
        assert_eq!(session.begin("chair"), QueryStatus::NeedsVector);
        assert_eq!(session.begin("chair"), QueryStatus::StillWaiting);
        assert_eq!(session.state(), QueryState::AwaitingVector);
    }

    #[test]
    fn new_text_invalidates_similarities() {
        let table = EmbeddingTable::from_raw([(1, vec![1.0, 0.0])]);
        let mut session = QuerySession::default();
        session.begin("chair");
        session.set_vector(vec![1.0, 0.0], &table);
        assert_eq!(session.begin("chair"), QueryStatus::Ready);

        assert_eq!(session.begin("table"), QueryStatus::NeedsVector);
        assert!(session.similarities().is_empty());
        assert!(session.query_vector().is_none());
        assert_eq!(session.query_text(), Some("table"));
    }

    #[test]
    fn rescore_without_vector_does_nothing() {
        let table = EmbeddingTable::from_raw([(1, vec![1.0])]);
        let mut session = QuerySession::default();
        assert_eq!(session.rescore(&table), None);
        assert_eq!(session.state(), QueryState::Idle);
    }
}
