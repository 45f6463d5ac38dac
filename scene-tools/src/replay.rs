//! Replays a recorded chunk event stream into a fresh aggregator.
use anyhow::{Context, Result};
use environment_mesh::{MeshAggregator, parse_events};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Aggregator state after replay plus the number of rejected updates.
pub struct Replay {
    pub aggregator: MeshAggregator,
    pub applied: usize,
    pub rejected: usize,
}

/// Load a JSON array of chunk events and apply them in order.
/// Malformed chunks are logged and skipped; the rest still apply.
pub fn replay_events(events_path: &Path) -> Result<Replay> {
    let text = fs::read_to_string(events_path)
        .with_context(|| format!("reading chunk events {}", events_path.display()))?;
    let events = parse_events(&text)
        .with_context(|| format!("parsing chunk events {}", events_path.display()))?;

    let pb = ProgressBar::new(events.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} events ({percent}%) {msg}")?
            .progress_chars("▉▊▋▌▍▎▏ "),
    );
    pb.set_message("Replaying chunk events");

    let aggregator = MeshAggregator::new();
    let mut applied = 0;
    let mut rejected = 0;
    for event in events {
        match aggregator.apply(event) {
            Ok(()) => applied += 1,
            Err(err) => {
                warn!("Skipping malformed chunk: {}", err);
                rejected += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("Chunk events replayed");

    Ok(Replay {
        aggregator,
        applied,
        rejected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use environment_mesh::ChunkId;
    use std::io::Write;

    #[test]
    fn bad_chunks_do_not_stop_the_replay() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"event": "upsert", "id": 1, "vertices": [[0,0,0],[1,0,0],[0,1,0]], "triangles": [[0,1,2]]}},
                {{"event": "upsert", "id": 2, "vertices": [[0,0,0]], "triangles": [[0,1,2]]}},
                {{"event": "upsert", "id": 3, "vertices": [[0,0,1],[1,0,1],[0,1,1]], "triangles": [[2,1,0]]}},
                {{"event": "set_active", "id": 3, "active": false}}
            ]"#
        )
        .unwrap();

        let replay = replay_events(file.path()).unwrap();
        assert_eq!(replay.applied, 3);
        assert_eq!(replay.rejected, 1);
        assert_eq!(replay.aggregator.ids(), vec![ChunkId(1), ChunkId(3)]);
        assert_eq!(replay.aggregator.merge().triangle_count(), 1);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(replay_events(Path::new("/nonexistent/events.json")).is_err());
    }
}
