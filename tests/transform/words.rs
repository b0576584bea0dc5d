use super::{letters_only, placeholders, rng, sorted_chars, transformer};
use word_morph::error::MorphError;
use word_morph::transform::{is_consonant, is_vowel, LetterClass, TransformConfig};

fn differing_positions(a: &str, b: &str) -> Vec<usize> {
    a.chars()
        .zip(b.chars())
        .enumerate()
        .filter(|(_, (x, y))| x != y)
        .map(|(i, _)| i)
        .collect()
}

#[test]
fn test_letter_classes() {
    assert!(is_vowel('ё') && is_vowel('Я'));
    assert!(is_consonant('ь') && is_consonant('Щ'));
    assert!(!is_vowel('-') && !is_consonant('1') && !is_vowel('a'));

    assert_eq!(LetterClass::parse("VOWELS").unwrap(), LetterClass::Vowels);
    assert_eq!(LetterClass::parse(" all ").unwrap(), LetterClass::All);
    assert!(matches!(
        LetterClass::parse("гласные"),
        Err(MorphError::InvalidArgument(_))
    ));
}

#[test]
fn test_eligible_indices() {
    let chars: Vec<char> = "медведь".chars().collect();

    let all = transformer(TransformConfig::default());
    assert_eq!(all.eligible_indices(&chars), vec![0, 1, 2, 3, 4, 5, 6]);

    let inner = transformer(TransformConfig {
        preserve_first: true,
        preserve_last: true,
        ..Default::default()
    });
    assert_eq!(inner.eligible_indices(&chars), vec![1, 2, 3, 4, 5]);

    let vowels = transformer(letters_only(LetterClass::Vowels));
    assert_eq!(vowels.eligible_indices(&chars), vec![1, 4]);

    let consonants = transformer(letters_only(LetterClass::Consonants));
    assert_eq!(consonants.eligible_indices(&chars), vec![0, 2, 3, 5, 6]);

    let mixed: Vec<char> = "ёж-1".chars().collect();
    assert_eq!(all.eligible_indices(&mixed), vec![0, 1]);
}

#[test]
fn test_shuffle_is_permutation_of_eligible_letters() {
    let shuffler = transformer(TransformConfig {
        shuffle: true,
        preserve_first: true,
        ..Default::default()
    });
    for seed in 0..50 {
        let out = shuffler.shuffle("медведь", &mut rng(seed));
        assert_eq!(out.chars().count(), 7);
        assert_eq!(sorted_chars(&out), sorted_chars("медведь"));
        assert!(out.starts_with('м'));
    }
}

#[test]
fn test_shuffle_keeps_ineligible_positions() {
    let shuffler = transformer(TransformConfig {
        shuffle: true,
        letter_class: LetterClass::Vowels,
        ..Default::default()
    });
    for seed in 0..20 {
        let out = shuffler.shuffle("молоко", &mut rng(seed));
        let consonants: Vec<(usize, char)> = out
            .chars()
            .enumerate()
            .filter(|(_, c)| !is_vowel(*c))
            .collect();
        assert_eq!(consonants, vec![(0, 'м'), (2, 'л'), (4, 'к')]);
    }

    let all = transformer(TransformConfig {
        shuffle: true,
        ..Default::default()
    });
    let out = all.shuffle("ёж-1", &mut rng(3));
    assert!(out.ends_with("-1"));
}

#[test]
fn test_shuffle_phrase_word_by_word() {
    let shuffler = transformer(TransformConfig {
        shuffle: true,
        ..Default::default()
    });
    for seed in 0..20 {
        let out = shuffler.shuffle("бурый медведь", &mut rng(seed));
        let parts: Vec<&str> = out.split(' ').collect();
        assert_eq!(parts.len(), 2);
        assert_eq!(sorted_chars(parts[0]), sorted_chars("бурый"));
        assert_eq!(sorted_chars(parts[1]), sorted_chars("медведь"));
    }
}

#[test]
fn test_short_words_untouched() {
    let everything = transformer(TransformConfig {
        shuffle: true,
        skip_count: 2,
        show_skipped: true,
        inject_errors: true,
        ..Default::default()
    });
    assert_eq!(everything.apply("да", &mut rng(1)), "да");
    assert_eq!(everything.apply("", &mut rng(1)), "");

    // One vowel is not enough to shuffle
    let vowels = transformer(TransformConfig {
        shuffle: true,
        letter_class: LetterClass::Vowels,
        ..Default::default()
    });
    assert_eq!(vowels.shuffle("кот", &mut rng(1)), "кот");
}

#[test]
fn test_skip_with_placeholders() {
    let skipper = transformer(TransformConfig {
        skip_count: 3,
        show_skipped: true,
        ..Default::default()
    });
    for seed in 0..30 {
        let out = skipper.skip("медведь", &mut rng(seed));
        assert_eq!(out.chars().count(), 7);
        assert_eq!(placeholders(&out), 3);
        for (got, want) in out.chars().zip("медведь".chars()) {
            assert!(got == '_' || got == want);
        }
    }
}

#[test]
fn test_skip_removes_letters() {
    let skipper = transformer(TransformConfig {
        skip_count: 3,
        ..Default::default()
    });
    let out = skipper.skip("медведь", &mut rng(5));
    assert_eq!(out.chars().count(), 4);
    assert_eq!(placeholders(&out), 0);

    // Skip count above the eligible set removes only the eligible letters
    let vowels = transformer(TransformConfig {
        skip_count: 5,
        letter_class: LetterClass::Vowels,
        ..Default::default()
    });
    assert_eq!(vowels.skip("медведь", &mut rng(5)), "мдвдь");
}

#[test]
fn test_typo_count_and_case() {
    let typo = transformer(TransformConfig {
        inject_errors: true,
        ..Default::default()
    });
    for seed in 0..50 {
        let out = typo.inject_errors("Медведь", &mut rng(seed));
        assert_eq!(out.chars().count(), 7);
        assert_eq!(differing_positions("Медведь", &out).len(), 2);
        for (got, want) in out.chars().zip("Медведь".chars()) {
            assert_eq!(got.is_uppercase(), want.is_uppercase());
        }

        let out = typo.inject_errors("кот", &mut rng(seed));
        assert_eq!(differing_positions("кот", &out).len(), 1);
    }
}

#[test]
fn test_typo_respects_letter_class() {
    let typo = transformer(TransformConfig {
        inject_errors: true,
        letter_class: LetterClass::Vowels,
        ..Default::default()
    });
    for seed in 0..30 {
        let out = typo.inject_errors("медведь", &mut rng(seed));
        let changed = differing_positions("медведь", &out);
        assert_eq!(changed.len(), 1);
        assert!(changed[0] == 1 || changed[0] == 4);
        let replacement = out.chars().nth(changed[0]).unwrap();
        assert!(replacement == 'ё' || replacement == 'э');
    }
}

#[test]
fn test_pipeline_order() {
    let config = TransformConfig {
        shuffle: true,
        skip_count: 2,
        inject_errors: true,
        ..Default::default()
    };
    assert!(!config.is_noop());
    assert!(TransformConfig::default().is_noop());

    let all = transformer(config);
    for seed in 0..20 {
        let out = all.apply("медведь", &mut rng(seed));
        assert_eq!(out.chars().count(), 5);
    }

    let noop = transformer(TransformConfig::default());
    assert_eq!(noop.apply("бурый медведь", &mut rng(0)), "бурый медведь");
}

#[test]
fn test_same_seed_same_output() {
    let config = TransformConfig {
        shuffle: true,
        skip_count: 1,
        show_skipped: true,
        inject_errors: true,
        ..Default::default()
    };
    let a = transformer(config.clone()).apply("косолапый медведь", &mut rng(11));
    let b = transformer(config).apply("косолапый медведь", &mut rng(11));
    assert_eq!(a, b);
}
