#![allow(dead_code)]

use word_morph::oracle::{LexiconMorphology, PartOfSpeech};
use word_morph::vocabulary::VocabularyIndex;

/// Forest vocabulary around "медведь" = [1, 0, 0]. "<unk>" shares the query
/// vector but is a reserved row, so it must never be ranked.
pub fn forest_rows() -> Vec<(String, Vec<f32>)> {
    vec![
        ("<unk>", vec![1.0, 0.0, 0.0]),
        ("медведь", vec![1.0, 0.0, 0.0]),
        ("волк", vec![0.95, 0.1, 0.0]),
        ("лиса", vec![0.9, 0.2, 0.0]),
        ("заяц", vec![0.85, 0.3, 0.0]),
        ("барсук", vec![0.8, 0.4, 0.0]),
        ("лось", vec![0.7, 0.5, 0.0]),
        ("кабан", vec![0.6, 0.6, 0.0]),
        ("бурый", vec![0.55, 0.0, 0.5]),
        ("косолапый", vec![0.5, 0.1, 0.6]),
        ("лесной", vec![0.4, 0.3, 0.5]),
        ("утюг", vec![0.0, 0.0, 1.0]),
        ("чайник", vec![-0.2, 0.1, 0.9]),
    ]
    .into_iter()
    .map(|(w, v)| (w.to_string(), v))
    .collect()
}

pub fn forest_index() -> VocabularyIndex {
    VocabularyIndex::from_rows(forest_rows()).expect("fixture vocabulary")
}

/// Neighbors of "медведь", best first.
pub const FOREST_ORDER: &[&str] = &[
    "волк",
    "лиса",
    "заяц",
    "барсук",
    "лось",
    "бурый",
    "кабан",
    "косолапый",
    "лесной",
    "утюг",
    "чайник",
];

pub const FOREST_NOUNS: &[&str] = &[
    "медведь", "волк", "лиса", "заяц", "барсук", "лось", "кабан", "утюг", "чайник",
];

pub const FOREST_ADJECTIVES: &[&str] = &["бурый", "косолапый", "лесной"];

pub fn forest_morphology() -> LexiconMorphology {
    let mut lexicon = LexiconMorphology::new();
    for noun in FOREST_NOUNS {
        lexicon.insert(noun, noun, Some(PartOfSpeech::Noun));
    }
    for adjective in FOREST_ADJECTIVES {
        lexicon.insert(adjective, adjective, Some(PartOfSpeech::AdjectiveFull));
    }
    lexicon
}

/// `size` distinct words over a 4-dimensional space, no reserved rows.
pub fn numbered_index(size: usize) -> VocabularyIndex {
    let rows = (0..size)
        .map(|i| {
            let x = i as f32;
            (
                format!("слово{}", i),
                vec![1.0 + x.sin(), x.cos(), (x * 0.5).sin(), 0.1 * x],
            )
        })
        .collect();
    VocabularyIndex::from_rows(rows).expect("numbered vocabulary")
}
