use crate::transform::mask_selected;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How a per-request `skip_count` becomes a budget for the whole phrase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum GlobalSkipMode {
    /// `skip_count` letters in total, wherever they fall in the phrase
    #[default]
    Total,
    /// `skip_count` letters per word, drawn from the phrase as a whole
    #[value(name = "per_word")]
    PerWord,
}

impl GlobalSkipMode {
    pub fn budget(&self, skip_count: usize, phrase: &str) -> usize {
        match self {
            GlobalSkipMode::Total => skip_count,
            GlobalSkipMode::PerWord => skip_count * phrase.split_whitespace().count(),
        }
    }
}

/// Omit (or mask) `total_skips` characters across the whole phrase.
///
/// Every non-whitespace character is a candidate; word boundaries play no role.
/// Run this last, on the fully composed and otherwise transformed phrase.
pub fn apply_global_skip<R: Rng + ?Sized>(
    phrase: &str,
    total_skips: usize,
    show_skipped: bool,
    rng: &mut R,
) -> String {
    if total_skips == 0 {
        return phrase.to_string();
    }

    let chars: Vec<char> = phrase.chars().collect();
    let eligible: Vec<usize> = chars
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.is_whitespace())
        .map(|(i, _)| i)
        .collect();
    if eligible.is_empty() {
        return phrase.to_string();
    }

    let amount = total_skips.min(eligible.len());
    let mut selected = vec![false; chars.len()];
    for pick in rand::seq::index::sample(rng, eligible.len(), amount) {
        selected[eligible[pick]] = true;
    }
    mask_selected(&chars, &selected, show_skipped)
}
