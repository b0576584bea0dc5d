use crate::config::MAX_RESULT_COUNT;
use crate::error::{MorphError, Result};
use crate::vocabulary::{NeighborCandidate, VocabularyIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    pub count: usize,
    pub stride: usize,
    pub diversity_threshold: f32,
}

impl SelectionConfig {
    /// Validated constructor for request-facing values.
    pub fn new(count: usize, stride: usize, diversity_threshold: f32) -> Result<Self> {
        if count == 0 || count > MAX_RESULT_COUNT {
            return Err(MorphError::invalid_argument(format!(
                "count must be within 1..={}, got {}",
                MAX_RESULT_COUNT, count
            )));
        }
        if !diversity_threshold.is_finite() || !(0.0..=1.0).contains(&diversity_threshold) {
            return Err(MorphError::invalid_argument(format!(
                "diversity threshold must be within 0.0..=1.0, got {}",
                diversity_threshold
            )));
        }
        Ok(Self {
            count,
            stride,
            diversity_threshold,
        })
    }
}

/// Lowercase character set of a word.
pub fn char_set(word: &str) -> HashSet<char> {
    word.chars().flat_map(|c| c.to_lowercase()).collect()
}

/// Intersection-over-union of the two words' lowercase character sets.
pub fn char_jaccard(a: &str, b: &str) -> f32 {
    jaccard(&char_set(a), &char_set(b))
}

fn jaccard(a: &HashSet<char>, b: &HashSet<char>) -> f32 {
    let union = a.union(b).count();
    if union == 0 {
        // Two empty words are the same surface form
        return 1.0;
    }
    a.intersection(b).count() as f32 / union as f32
}

/// Accepted words plus their character sets, so each candidate is compared once per accepted word.
struct Accepted {
    picked: Vec<NeighborCandidate>,
    sets: Vec<HashSet<char>>,
    words: HashSet<String>,
    threshold: f32,
}

impl Accepted {
    fn new(capacity: usize, threshold: f32) -> Self {
        Self {
            picked: Vec::with_capacity(capacity),
            sets: Vec::with_capacity(capacity),
            words: HashSet::with_capacity(capacity),
            threshold,
        }
    }

    fn try_accept(&mut self, candidate: &NeighborCandidate) -> bool {
        if self.words.contains(&candidate.word) {
            return false;
        }
        let set = char_set(&candidate.word);
        if self.threshold > 0.0 && self.sets.iter().any(|s| jaccard(s, &set) >= self.threshold) {
            return false;
        }
        self.words.insert(candidate.word.clone());
        self.sets.push(set);
        self.picked.push(candidate.clone());
        true
    }
}

/// Pick up to `config.count` unique, mutually diverse words from a ranked list.
///
/// The first pass visits every `stride + 1`-th candidate. If that leaves the
/// result short, a second pass rescans from the top without the stride. Running
/// out of candidates returns a shorter list, not an error.
pub fn select(ranked: &[NeighborCandidate], config: &SelectionConfig) -> Vec<NeighborCandidate> {
    let count = config.count;
    let mut accepted = Accepted::new(count, config.diversity_threshold);
    if count == 0 {
        return accepted.picked;
    }

    for candidate in ranked.iter().step_by(config.stride.saturating_add(1)) {
        if accepted.picked.len() >= count {
            break;
        }
        accepted.try_accept(candidate);
    }

    if accepted.picked.len() < count {
        for candidate in ranked {
            if accepted.picked.len() >= count {
                break;
            }
            accepted.try_accept(candidate);
        }
    }

    accepted.picked.truncate(count);
    accepted.picked
}

/// `count` distinct words drawn uniformly from the vocabulary, each scored 0.0.
/// Reserved technical tokens are never drawn.
pub fn random_sample<R: Rng + ?Sized>(
    index: &VocabularyIndex,
    count: usize,
    rng: &mut R,
) -> Vec<NeighborCandidate> {
    random_sample_reserving(index, count, index.reserved_rows(), rng)
}

/// [`random_sample`] with a caller-chosen set of reserved rows.
pub fn random_sample_reserving<R: Rng + ?Sized>(
    index: &VocabularyIndex,
    count: usize,
    reserved: &[usize],
    rng: &mut R,
) -> Vec<NeighborCandidate> {
    let amount = count.saturating_add(reserved.len()).min(index.len());

    rand::seq::index::sample(rng, index.len(), amount)
        .into_iter()
        .filter(|row| !reserved.contains(row))
        .take(count)
        .filter_map(|row| index.word(row).map(|w| NeighborCandidate::new(w, 0.0)))
        .collect()
}
