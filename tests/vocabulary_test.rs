mod common;

use common::{forest_index, FOREST_ORDER};
use ndarray::arr1;
use word_morph::error::MorphError;
use word_morph::vocabulary::VocabularyIndex;

fn words(neighbors: &[word_morph::vocabulary::NeighborCandidate]) -> Vec<&str> {
    neighbors.iter().map(|n| n.word.as_str()).collect()
}

#[test]
fn test_nearest_neighbors_ranked_and_exclude_query() {
    let index = forest_index();
    let neighbors = index.nearest_neighbors("медведь", 5, true).unwrap();

    assert_eq!(words(&neighbors), FOREST_ORDER[..5].to_vec());
    assert!(neighbors.iter().all(|n| n.word != "медведь"));
    for pair in neighbors.windows(2) {
        assert!(pair[0].score >= pair[1].score, "scores must not increase");
    }
    assert!(neighbors.iter().all(|n| (-1.0..=1.0).contains(&n.score)));
}

#[test]
fn test_query_is_case_folded_and_trimmed() {
    let index = forest_index();
    let upper = index.nearest_neighbors("  МЕДВЕДЬ ", 3, true).unwrap();
    let lower = index.nearest_neighbors("медведь", 3, true).unwrap();
    assert_eq!(upper, lower);
}

#[test]
fn test_query_included_when_not_excluded() {
    let index = forest_index();
    let neighbors = index.nearest_neighbors("медведь", 2, false).unwrap();
    assert_eq!(neighbors[0].word, "медведь");
    assert!((neighbors[0].score - 1.0).abs() < 1e-5);
    assert_eq!(neighbors[1].word, "волк");
}

#[test]
fn test_unknown_word_is_not_found() {
    let index = forest_index();
    let err = index.nearest_neighbors("дракон", 5, true).unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err, MorphError::NotFound(ref w) if w == "дракон"));

    assert!(index.similarity("медведь", "дракон").unwrap_err().is_not_found());
}

#[test]
fn test_reserved_tokens_never_ranked() {
    let index = forest_index();
    assert_eq!(index.reserved_rows().len(), 1);

    // k larger than the vocabulary returns everything but the query and "<unk>"
    let neighbors = index.nearest_neighbors("медведь", 100, true).unwrap();
    assert_eq!(neighbors.len(), index.len() - 2);
    assert_eq!(words(&neighbors), FOREST_ORDER.to_vec());
}

#[test]
fn test_custom_reserved_tokens_replace_defaults() {
    let index = forest_index().with_reserved_tokens(&["волк"]);
    let neighbors = index.nearest_neighbors("медведь", 2, true).unwrap();
    // "<unk>" is an ordinary word again and matches the query exactly
    assert_eq!(words(&neighbors), vec!["<unk>", "лиса"]);
}

#[test]
fn test_similarity_is_symmetric_and_bounded() {
    let index = forest_index();
    let vocabulary: Vec<String> = index.words().map(|w| w.to_string()).collect();
    for a in &vocabulary {
        for b in &vocabulary {
            let ab = index.similarity(a, b).unwrap();
            let ba = index.similarity(b, a).unwrap();
            assert_eq!(ab, ba, "similarity({}, {})", a, b);
            assert!((-1.0..=1.0).contains(&ab));
        }
    }
    assert!(index.similarity("медведь", "волк").unwrap() > index.similarity("медведь", "утюг").unwrap());
}

#[test]
fn test_zero_vector_scores_zero() {
    let index = VocabularyIndex::from_rows(vec![
        ("ноль".to_string(), vec![0.0, 0.0]),
        ("икс".to_string(), vec![1.0, 0.0]),
        ("игрек".to_string(), vec![0.0, 1.0]),
    ])
    .unwrap();

    let neighbors = index.nearest_neighbors("ноль", 5, true).unwrap();
    assert_eq!(words(&neighbors), vec!["икс", "игрек"]);
    assert!(neighbors.iter().all(|n| n.score == 0.0));
    assert_eq!(index.similarity("икс", "ноль").unwrap(), 0.0);
}

#[test]
fn test_ties_keep_vocabulary_order() {
    let index = VocabularyIndex::from_rows(vec![
        ("запрос".to_string(), vec![1.0, 0.0]),
        ("альфа".to_string(), vec![0.0, 1.0]),
        ("бета".to_string(), vec![0.0, 2.0]),
        ("гамма".to_string(), vec![0.0, 3.0]),
    ])
    .unwrap();

    let all = index.nearest_neighbors("запрос", 3, true).unwrap();
    assert_eq!(words(&all), vec!["альфа", "бета", "гамма"]);

    let top = index.nearest_neighbors("запрос", 2, true).unwrap();
    assert_eq!(words(&top), vec!["альфа", "бета"]);
}

#[test]
fn test_zero_k_returns_nothing() {
    let index = forest_index();
    assert!(index.nearest_neighbors("медведь", 0, true).unwrap().is_empty());
}

#[test]
fn test_nearest_to_vector() {
    let index = forest_index();

    // Unnormalized query; "<unk>" is reserved so the bear comes first
    let neighbors = index
        .nearest_to_vector(arr1(&[2.0, 0.0, 0.0]).view(), 2, &[])
        .unwrap();
    assert_eq!(words(&neighbors), vec!["медведь", "волк"]);
    assert!((neighbors[0].score - 1.0).abs() < 1e-5);

    let bear = index.row_of("медведь").unwrap();
    let neighbors = index
        .nearest_to_vector(arr1(&[2.0, 0.0, 0.0]).view(), 1, &[bear])
        .unwrap();
    assert_eq!(words(&neighbors), vec!["волк"]);

    let err = index
        .nearest_to_vector(arr1(&[1.0, 0.0]).view(), 2, &[])
        .unwrap_err();
    assert!(matches!(err, MorphError::InvalidArgument(_)));
}

#[test]
fn test_rows_are_unit_length() {
    let index = forest_index();
    for word in index.words() {
        let v = index.embedding(word).unwrap();
        let norm = v.dot(&v).sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "{} has norm {}", word, norm);
    }
}

#[test]
fn test_invalid_tables_rejected() {
    assert!(matches!(
        VocabularyIndex::from_rows(Vec::new()),
        Err(MorphError::Load(_))
    ));
    assert!(matches!(
        VocabularyIndex::from_rows(vec![
            ("а".to_string(), vec![1.0, 0.0]),
            ("б".to_string(), vec![1.0]),
        ]),
        Err(MorphError::Load(_))
    ));
    assert!(matches!(
        VocabularyIndex::from_rows(vec![
            ("а".to_string(), vec![1.0, 0.0]),
            ("а".to_string(), vec![0.0, 1.0]),
        ]),
        Err(MorphError::Load(_))
    ));
}

#[test]
fn test_shared_across_threads() {
    let index = std::sync::Arc::new(forest_index());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let index = index.clone();
            std::thread::spawn(move || index.nearest_neighbors("медведь", 3, true).unwrap())
        })
        .collect();
    for handle in handles {
        let neighbors = handle.join().unwrap();
        assert_eq!(words(&neighbors), FOREST_ORDER[..3].to_vec());
    }
}

#[test]
fn test_table_words_are_case_folded() {
    let index = VocabularyIndex::from_rows(vec![
        ("Москва".to_string(), vec![1.0, 0.0]),
        ("Питер".to_string(), vec![0.9, 0.1]),
        ("москва".to_string(), vec![0.0, 1.0]),
    ])
    .unwrap();

    // The later lowercase row collides with "Москва" and is dropped
    assert_eq!(index.len(), 2);
    assert_eq!(index.word(0), Some("москва"));
    assert!(index.contains("МОСКВА"));
    assert_eq!(index.embedding("москва").unwrap().to_vec(), vec![1.0, 0.0]);

    let neighbors = index.nearest_neighbors("Москва", 1, true).unwrap();
    assert_eq!(words(&neighbors), vec!["питер"]);
}

#[test]
fn test_reserving_rows_per_call() {
    let index = forest_index();
    let wolf = index.rows_of(&["волк", "дракон"]);
    assert_eq!(wolf.len(), 1);

    let neighbors = index
        .nearest_neighbors_reserving("медведь", 2, true, &wolf)
        .unwrap();
    assert_eq!(words(&neighbors), vec!["<unk>", "лиса"]);
}
