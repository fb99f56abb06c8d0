use super::*;
use crate::vectordb::Chunk;

fn chunk(id: &str, score: f32) -> Chunk {
    Chunk::new("d1", "a.txt", id, format!("chunk {id}"), score).expect("valid chunk")
}

#[test]
fn test_distance_to_score_known_points() {
    assert_eq!(distance_to_score(0.0).unwrap(), 1.0);
    assert_eq!(distance_to_score(1.0).unwrap(), 0.5);
    assert_eq!(distance_to_score(3.0).unwrap(), 0.25);
}

#[test]
fn test_distance_to_score_strictly_decreasing() {
    let scores: Vec<f32> = [0.0, 0.1, 0.5, 2.0, 10.0]
        .iter()
        .map(|&d| distance_to_score(d).unwrap())
        .collect();

    for pair in scores.windows(2) {
        assert!(pair[0] > pair[1], "{} should exceed {}", pair[0], pair[1]);
    }
}

#[test]
fn test_distance_to_score_rejects_negative() {
    assert_eq!(
        distance_to_score(-0.1),
        Err(RelevanceError::InvalidDistance { distance: -0.1 })
    );
    assert!(distance_to_score(f32::NAN).is_err());
}

#[test]
fn test_filter_drops_weak_results() {
    let filtered = filter_by_relevance(vec![chunk("0", 0.91), chunk("1", 0.42)], 0.6).unwrap();

    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].score(), 0.91);
}

#[test]
fn test_filter_keeps_scores_equal_to_threshold() {
    let filtered = filter_by_relevance(vec![chunk("0", 0.6)], 0.6).unwrap();
    assert_eq!(filtered.len(), 1);
}

#[test]
fn test_filter_preserves_order() {
    let results = vec![
        chunk("a", 0.7),
        chunk("b", 0.2),
        chunk("c", 0.95),
        chunk("d", 0.8),
    ];

    let ids: Vec<String> = filter_by_relevance(results, 0.5)
        .unwrap()
        .iter()
        .map(|c| c.chunk_id().to_string())
        .collect();

    assert_eq!(ids, vec!["a", "c", "d"]);
}

#[test]
fn test_filter_empty_results() {
    for threshold in [0.0, 0.5, 1.0] {
        assert_eq!(
            filter_by_relevance(vec![], threshold),
            Err(RelevanceError::EmptyResultSet)
        );
    }
}

#[test]
fn test_filter_no_matches() {
    let err = filter_by_relevance(vec![chunk("0", 0.12)], 0.6).unwrap_err();
    assert_eq!(err, RelevanceError::NoRelevantResults);
    assert!(err.is_no_evidence());
}

#[test]
fn test_filter_matches_threshold_definition_across_grid() {
    let results: Vec<Chunk> = (0..=10).map(|i| chunk(&i.to_string(), i as f32 / 10.0)).collect();

    for step in 0..=10 {
        let threshold = step as f32 / 10.0;
        let expected: Vec<f32> = results
            .iter()
            .map(|c| c.score())
            .filter(|&s| s >= threshold)
            .collect();

        let actual: Vec<f32> = filter_by_relevance(results.clone(), threshold)
            .unwrap()
            .iter()
            .map(|c| c.score())
            .collect();

        assert_eq!(actual, expected, "threshold {threshold}");
    }
}

#[test]
fn test_gate_rejects_out_of_range_threshold() {
    assert!(RelevanceGate::new(0.0).is_ok());
    assert!(RelevanceGate::new(1.0).is_ok());
    assert_eq!(
        RelevanceGate::new(1.5),
        Err(RelevanceError::InvalidThreshold { threshold: 1.5 })
    );
    assert!(RelevanceGate::new(-0.01).is_err());
    assert!(RelevanceGate::new(f32::NAN).is_err());
}

#[test]
fn test_gate_filters_with_configured_threshold() {
    let gate = RelevanceGate::new(0.5).unwrap();
    assert_eq!(gate.min_score(), 0.5);

    let kept = gate.filter(vec![chunk("0", 0.9), chunk("1", 0.2)]).unwrap();
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].chunk_id(), "0");
}

#[test]
fn test_invalid_distance_is_not_no_evidence() {
    assert!(!RelevanceError::InvalidDistance { distance: -1.0 }.is_no_evidence());
}
