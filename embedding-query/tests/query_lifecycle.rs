use embedding_query::{
    QueryEngine, QueryState, QueryStatus, Selection, parse_embedding_response, parse_scan,
    threshold_for_bin,
};
use std::collections::BTreeSet;
use std::thread;

const SCAN: &str = r#"{
    "1": [1.0, 0.0, 0.0],
    "2": [0.9, 0.1, 0.0],
    "3": [0.0, 1.0, 0.0],
    "4": [0.0, 0.8, 0.2],
    "5": [0.0, 0.0, 1.0],
    "6": [0.0, 0.0]
}"#;

#[test]
fn text_query_round_trip() {
    let engine = QueryEngine::new();
    let count = engine.load_scan(parse_scan(SCAN).unwrap());
    assert_eq!(count, 6);
    assert_eq!(engine.state(), QueryState::Idle);

    assert_eq!(engine.begin_query("chair"), QueryStatus::NeedsVector);
    assert_eq!(engine.state(), QueryState::AwaitingVector);
    assert_eq!(engine.begin_query("chair"), QueryStatus::StillWaiting);
    assert!(engine.matching_ids(0.0).is_empty());

    let reply = parse_embedding_response(r#"{"CLIP_embedding": [2.0, 0.0, 0.0]}"#).unwrap();
    let outcome = engine.set_query(reply);
    assert_eq!(outcome.scored, 5);
    assert_eq!(outcome.mismatched, 1);
    assert_eq!(engine.state(), QueryState::Ready);

    // Threshold changes re-filter the cached similarities.
    assert_eq!(engine.begin_query("chair"), QueryStatus::Ready);
    assert_eq!(engine.matching_ids(0.99), BTreeSet::from([1, 2]));
    assert_eq!(engine.matching_ids(threshold_for_bin(19, 20)), BTreeSet::from([1, 2]));
    assert_eq!(engine.select(Selection::TopFraction(0.75)), vec![1]);

    let histogram = engine.histogram(10);
    assert_eq!(histogram.len(), 10);
    assert_eq!(histogram[0], 1.0);
    assert_eq!(histogram[9], 1.0 / 3.0);

    assert_eq!(engine.begin_query("lamp"), QueryStatus::NeedsVector);
    assert!(engine.similarities().is_empty());
    assert_eq!(engine.query_text().as_deref(), Some("lamp"));
}

#[test]
fn readers_never_see_a_mixed_query() {
    let engine = QueryEngine::new();
    engine.load_scan(parse_scan(SCAN).unwrap());

    let along_x = BTreeSet::from([1, 2]);
    let along_y = BTreeSet::from([3, 4]);

    thread::scope(|scope| {
        scope.spawn(|| {
            for round in 0..2_000 {
                if round % 2 == 0 {
                    engine.set_query(vec![1.0, 0.0, 0.0]);
                } else {
                    engine.set_query(vec![0.0, 1.0, 0.0]);
                }
            }
        });

        for _ in 0..2 {
            scope.spawn(|| {
                for _ in 0..2_000 {
                    let matches = engine.matching_ids(0.9);
                    assert!(
                        matches.is_empty() || matches == along_x || matches == along_y,
                        "mixed result {matches:?}"
                    );
                }
            });
        }
    });

    let last = engine.matching_ids(0.9);
    assert_eq!(last, along_y);
}
