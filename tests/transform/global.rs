use super::{placeholders, rng};
use word_morph::global_skip::{apply_global_skip, GlobalSkipMode};

#[test]
fn test_global_skip_marks_whole_phrase() {
    for seed in 0..30 {
        let out = apply_global_skip("бурый медведь", 3, true, &mut rng(seed));
        assert_eq!(out.chars().count(), 13);
        assert_eq!(placeholders(&out), 3);
        assert_eq!(out.chars().nth(5), Some(' '));
    }
}

#[test]
fn test_global_skip_crosses_word_boundaries() {
    let spans_both = (0..50).any(|seed| {
        let out = apply_global_skip("бурый медведь", 3, true, &mut rng(seed));
        let parts: Vec<&str> = out.split(' ').collect();
        placeholders(parts[0]) > 0 && placeholders(parts[1]) > 0
    });
    assert!(spans_both);
}

#[test]
fn test_global_skip_removes_letters_but_not_spaces() {
    let out = apply_global_skip("бурый медведь", 3, false, &mut rng(4));
    assert_eq!(out.chars().count(), 10);
    assert_eq!(out.matches(' ').count(), 1);
}

#[test]
fn test_global_skip_budget_limits() {
    assert_eq!(apply_global_skip("кот пёс", 100, true, &mut rng(0)), "___ ___");
    assert_eq!(apply_global_skip("кот пёс", 0, true, &mut rng(0)), "кот пёс");
    assert_eq!(apply_global_skip("   ", 2, true, &mut rng(0)), "   ");
}

#[test]
fn test_global_skip_mode_budget() {
    assert_eq!(GlobalSkipMode::default(), GlobalSkipMode::Total);
    assert_eq!(GlobalSkipMode::Total.budget(3, "бурый косолапый медведь"), 3);
    assert_eq!(GlobalSkipMode::PerWord.budget(3, "бурый косолапый медведь"), 9);
    assert_eq!(GlobalSkipMode::PerWord.budget(2, "медведь"), 2);
}
