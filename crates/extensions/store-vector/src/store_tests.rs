use super::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use tempfile::TempDir;

fn emb(values: &[f32]) -> Embedding {
    Embedding::new(values.to_vec())
}

#[test]
fn test_query_before_load_is_not_ready() {
    let store = VectorStore::in_memory(3);
    assert!(!store.is_ready());
    assert!(matches!(
        store.top_k(&[1.0, 0.0, 0.0], 5).unwrap_err(),
        RetrievalError::NotReady
    ));
}

#[test]
fn test_replace_and_query() {
    let store = VectorStore::in_memory(3);
    let generation = store
        .replace_all(
            vec![1, 2, 3],
            vec![emb(&[1.0, 0.0, 0.0]), emb(&[0.9, 0.1, 0.0]), emb(&[0.0, 1.0, 0.0])],
        )
        .unwrap();
    assert_eq!(generation, 1);

    let results = store.top_k(&[1.0, 0.0, 0.0], 2).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].entity_id, 1);
    assert!((results[0].similarity - 1.0).abs() < 1e-4);
    assert_eq!(results[1].entity_id, 2);
}

#[test]
fn test_loaded_vectors_are_normalized() {
    let store = VectorStore::in_memory(2);
    store
        .replace_all(vec![1, 2], vec![emb(&[3.0, 4.0]), emb(&[0.0, 0.5])])
        .unwrap();

    let snapshot = store.snapshot().unwrap();
    for i in 0..snapshot.len() {
        let row = snapshot.row(i).unwrap();
        let norm: f32 = row.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }
}

#[test]
fn test_generation_increments() {
    let store = VectorStore::in_memory(2);
    assert_eq!(store.generation(), None);
    store.replace_all(vec![1], vec![emb(&[1.0, 0.0])]).unwrap();
    assert_eq!(store.replace_all(vec![2], vec![emb(&[0.0, 1.0])]).unwrap(), 2);
    assert_eq!(store.generation(), Some(2));
}

#[test]
fn test_pinned_snapshot_survives_swap() {
    let store = VectorStore::in_memory(2);
    store
        .replace_all(vec![1, 2], vec![emb(&[1.0, 0.0]), emb(&[0.0, 1.0])])
        .unwrap();
    let pinned = store.snapshot().unwrap();

    store.replace_all(vec![9], vec![emb(&[1.0, 1.0])]).unwrap();

    assert_eq!(pinned.ids(), &[1, 2]);
    assert_eq!(store.snapshot().unwrap().ids(), &[9]);
}

#[test]
fn test_replace_rejects_length_mismatch() {
    let store = VectorStore::in_memory(2);
    let err = store
        .replace_all(vec![1, 2], vec![emb(&[1.0, 0.0])])
        .unwrap_err();
    assert!(matches!(err, RetrievalError::LengthMismatch { ids: 2, rows: 1 }));
    assert!(!store.is_ready());
}

#[test]
fn test_replace_rejects_wrong_width() {
    let store = VectorStore::in_memory(768);
    let err = store
        .replace_all(vec![1], vec![emb(&vec![0.1; 512])])
        .unwrap_err();
    assert!(matches!(
        err,
        RetrievalError::DimensionMismatch {
            expected: 768,
            actual: 512
        }
    ));
}

#[test]
fn test_replace_rejects_zero_vector() {
    let store = VectorStore::in_memory(2);
    let err = store
        .replace_all(vec![4], vec![emb(&[0.0, 0.0])])
        .unwrap_err();
    assert!(matches!(err, RetrievalError::InvalidVector { entity_id: 4, .. }));
}

#[test]
fn test_replace_rejects_duplicate_ids() {
    let store = VectorStore::in_memory(2);
    let err = store
        .replace_all(vec![4, 4], vec![emb(&[1.0, 0.0]), emb(&[0.0, 1.0])])
        .unwrap_err();
    assert!(matches!(err, RetrievalError::InvalidVector { entity_id: 4, .. }));
}

#[test]
fn test_failed_replace_keeps_previous_generation() {
    let store = VectorStore::in_memory(2);
    store.replace_all(vec![1], vec![emb(&[1.0, 0.0])]).unwrap();
    assert!(store.replace_all(vec![2], vec![emb(&[0.0, 0.0])]).is_err());

    assert_eq!(store.generation(), Some(1));
    assert_eq!(store.snapshot().unwrap().ids(), &[1]);
}

#[test]
fn test_query_dimension_guard() {
    let store = VectorStore::in_memory(768);
    store.replace_all(vec![1], vec![emb(&vec![0.5; 768])]).unwrap();
    let err = store.top_k(&vec![0.5; 512], 3).unwrap_err();
    assert!(matches!(err, RetrievalError::DimensionMismatch { .. }));
}

#[test]
fn test_persist_and_reopen() {
    let dir = TempDir::new().unwrap();
    let prefix = dir.path().join("stars");

    {
        let store = VectorStore::open(VectorArtifact::from_prefix(&prefix), 2).unwrap();
        assert!(!store.is_ready());
        store
            .replace_all(vec![10, 20], vec![emb(&[1.0, 0.0]), emb(&[0.0, 2.0])])
            .unwrap();
    }

    let reopened = VectorStore::open(VectorArtifact::from_prefix(&prefix), 2).unwrap();
    assert!(reopened.is_ready());
    assert_eq!(reopened.len(), 2);
    let top = reopened.top_k(&[0.0, 1.0], 1).unwrap();
    assert_eq!(top[0].entity_id, 20);
    assert!((top[0].similarity - 1.0).abs() < 1e-4);
}

#[test]
fn test_reopen_with_other_dimension_fails() {
    let dir = TempDir::new().unwrap();
    let prefix = dir.path().join("stars");
    let store = VectorStore::open(VectorArtifact::from_prefix(&prefix), 2).unwrap();
    store.replace_all(vec![1], vec![emb(&[1.0, 0.0])]).unwrap();

    let result = VectorStore::open(VectorArtifact::from_prefix(&prefix), 4);
    assert!(matches!(
        result,
        Err(RetrievalError::DimensionMismatch { expected: 4, actual: 2 })
    ));
}

#[test]
fn test_open_rejects_non_unit_rows() {
    let dir = TempDir::new().unwrap();
    let prefix = dir.path().join("stars");
    VectorArtifact::from_prefix(&prefix)
        .write(&[1, 2], &[3.0, 4.0, 0.0, 1.0])
        .unwrap();

    let result = VectorStore::open(VectorArtifact::from_prefix(&prefix), 2);
    match result {
        Err(RetrievalError::CorruptArtifact(msg)) => assert!(msg.contains("entity 1")),
        other => panic!("expected corrupt artifact, got {:?}", other.map(|s| s.len())),
    }
}

#[test]
fn test_open_rejects_nan_rows() {
    let dir = TempDir::new().unwrap();
    let prefix = dir.path().join("stars");
    VectorArtifact::from_prefix(&prefix)
        .write(&[1, 2], &[1.0, 0.0, f32::NAN, 0.0])
        .unwrap();

    let result = VectorStore::open(VectorArtifact::from_prefix(&prefix), 2);
    assert!(matches!(result, Err(RetrievalError::CorruptArtifact(_))));
}

#[test]
fn test_top_k_with_unbounded_k() {
    let store = VectorStore::in_memory(2);
    store
        .replace_all(vec![1, 2], vec![emb(&[1.0, 0.0]), emb(&[0.0, 1.0])])
        .unwrap();

    let results = store.top_k(&[1.0, 0.0], usize::MAX).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].entity_id, 1);
    assert_eq!(store.top_k(&[1.0, 0.0], 1 << 60).unwrap().len(), 2);
}

#[test]
fn test_concurrent_readers_never_see_torn_arrays() {
    let dim = 4;
    let store = Arc::new(VectorStore::in_memory(dim));
    let big: Vec<Embedding> = (0..64).map(|i| emb(&[1.0, i as f32, 0.5, 0.25])).collect();
    store.replace_all((0..64).collect(), big).unwrap();

    let stop = Arc::new(AtomicBool::new(false));
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            let stop = stop.clone();
            thread::spawn(move || {
                let mut checks = 0usize;
                while !stop.load(Ordering::Relaxed) || checks == 0 {
                    let snapshot = store.snapshot().unwrap();
                    assert_eq!(snapshot.ids().len() * dim, snapshot.vectors().len());
                    let top = snapshot.top_k(&[1.0, 0.0, 0.0, 0.0], 100).unwrap();
                    assert_eq!(top.len(), snapshot.len());
                    checks += 1;
                }
                checks
            })
        })
        .collect();

    for round in 0..50 {
        let n = if round % 2 == 0 { 3 } else { 64 };
        let vectors: Vec<Embedding> = (0..n).map(|i| emb(&[0.5, 1.0, i as f32, 1.0])).collect();
        store.replace_all((0..n as i64).collect(), vectors).unwrap();
    }
    stop.store(true, Ordering::Relaxed);

    for reader in readers {
        assert!(reader.join().unwrap() > 0);
    }
    assert_eq!(store.generation(), Some(51));
}
