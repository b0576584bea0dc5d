use crate::config::{
    DEFAULT_ADJECTIVES_PER_HEAD, DEFAULT_COMPATIBILITY_THRESHOLD, MAX_PHRASE_LENGTH,
    MODIFIER_OVERSAMPLE,
};
use crate::error::{MorphError, Result};
use crate::oracle::Morphology;
use crate::selector::{char_jaccard, select, SelectionConfig};
use crate::vocabulary::{NeighborCandidate, VocabularyIndex};
use rayon::prelude::*;
use tracing::debug;

/// Builds "<modifier> <head>" and "<modifier> <modifier> <head>" phrases from
/// adjectives that sit close to each head word in the embedding space.
pub struct PhraseComposer<'a> {
    index: &'a VocabularyIndex,
    morphology: &'a dyn Morphology,
    adjectives_per_head: usize,
    compatibility_threshold: f32,
    reserved: &'a [usize],
}

impl<'a> PhraseComposer<'a> {
    pub fn new(index: &'a VocabularyIndex, morphology: &'a dyn Morphology) -> Self {
        Self {
            index,
            morphology,
            adjectives_per_head: DEFAULT_ADJECTIVES_PER_HEAD,
            compatibility_threshold: DEFAULT_COMPATIBILITY_THRESHOLD,
            reserved: index.reserved_rows(),
        }
    }

    /// Rows never offered as modifiers, replacing the table's own reserved rows.
    pub fn with_reserved(mut self, reserved: &'a [usize]) -> Self {
        self.reserved = reserved;
        self
    }

    pub fn with_adjectives_per_head(mut self, adjectives_per_head: usize) -> Self {
        self.adjectives_per_head = adjectives_per_head.max(1);
        self
    }

    pub fn with_compatibility_threshold(mut self, threshold: f32) -> Self {
        self.compatibility_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Best-scoring adjectives for `head`, mutually diverse and lexically distinct
    /// from the head itself (so "медвежий" does not modify "медведь").
    pub fn modifiers_for(&self, head: &str) -> Result<Vec<NeighborCandidate>> {
        let pool = self.adjectives_per_head.saturating_mul(MODIFIER_OVERSAMPLE);
        let neighbors = self
            .index
            .nearest_neighbors_reserving(head, pool, true, self.reserved)?;
        let threshold = self.compatibility_threshold;

        let adjectives: Vec<NeighborCandidate> = neighbors
            .into_iter()
            .filter(|c| {
                self.morphology
                    .pos_of(&c.word)
                    .map_or(false, |pos| pos.is_adjective())
            })
            .filter(|c| threshold <= 0.0 || char_jaccard(head, &c.word) < threshold)
            .collect();

        let config = SelectionConfig {
            count: self.adjectives_per_head,
            stride: 0,
            diversity_threshold: threshold,
        };
        Ok(select(&adjectives, &config))
    }

    /// Up to `target` phrases of `phrase_length` words (2 or 3), one per head, in
    /// head order. Heads without a usable modifier are skipped. A three-word
    /// request falls back to two words when a head has a single modifier. Heads
    /// missing from the vocabulary are skipped the same way.
    pub fn compose(
        &self,
        heads: &[String],
        phrase_length: usize,
        target: usize,
    ) -> Result<Vec<String>> {
        if !(2..=MAX_PHRASE_LENGTH).contains(&phrase_length) {
            return Err(MorphError::invalid_argument(format!(
                "phrase length must be 2 or 3 for composition, got {}",
                phrase_length
            )));
        }

        let mut phrases = Vec::with_capacity(target);
        let chunk = rayon::current_num_threads().max(1);

        for heads_chunk in heads.chunks(chunk) {
            if phrases.len() >= target {
                break;
            }

            // Neighbor scans are the expensive part; run one chunk of heads at a time
            let modifiers: Vec<Result<Vec<NeighborCandidate>>> = heads_chunk
                .par_iter()
                .map(|head| self.modifiers_for(head))
                .collect();

            for (head, found) in heads_chunk.iter().zip(modifiers) {
                if phrases.len() >= target {
                    break;
                }
                let found = match found {
                    Ok(found) => found,
                    // A normalized head may have no row of its own
                    Err(MorphError::NotFound(_)) => {
                        debug!("Head '{}' is not in the vocabulary, skipping", head);
                        continue;
                    }
                    Err(e) => return Err(e),
                };
                let phrase = match (phrase_length, found.as_slice()) {
                    (_, []) => {
                        debug!("No modifier for '{}', skipping head", head);
                        continue;
                    }
                    (3, [first, second, ..]) => {
                        format!("{} {} {}", first.word, second.word, head)
                    }
                    (_, [first, ..]) => format!("{} {}", first.word, head),
                };
                phrases.push(phrase);
            }
        }

        Ok(phrases)
    }
}
