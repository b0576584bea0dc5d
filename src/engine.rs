use crate::config::{EngineConfig, DEFAULT_RESULT_COUNT, MAX_PHRASE_LENGTH};
use crate::error::{MorphError, Result};
use crate::global_skip::{apply_global_skip, GlobalSkipMode};
use crate::oracle::{AgeFilter, FrequencyOracle, IdentityMorphology, Morphology, PosFilter};
use crate::phrase::PhraseComposer;
use crate::selector::{random_sample_reserving, select, SelectionConfig};
use crate::transform::{TransformConfig, WordTransformer};
use crate::vocabulary::{NeighborCandidate, VocabularyIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordRequest {
    pub word: String,
    pub count: usize,
    pub stride: usize,
    pub diversity_threshold: f32,
    pub random_mode: bool,
    pub pos_filter: PosFilter,
    pub normalize: bool,
    pub age: Option<u8>,
    pub phrase_length: usize,
    pub transform: TransformConfig,
    /// Replace per-word skipping with one skip budget over the whole phrase
    pub global_skip: bool,
    pub global_skip_mode: GlobalSkipMode,
    pub return_source: bool,
}

impl Default for WordRequest {
    fn default() -> Self {
        Self {
            word: String::new(),
            count: DEFAULT_RESULT_COUNT,
            stride: 0,
            diversity_threshold: 0.0,
            random_mode: false,
            pos_filter: PosFilter::All,
            normalize: false,
            age: None,
            phrase_length: 1,
            transform: TransformConfig::default(),
            global_skip: false,
            global_skip_mode: GlobalSkipMode::Total,
            return_source: false,
        }
    }
}

impl WordRequest {
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.word.trim().is_empty() {
            return Err(MorphError::invalid_argument("word must not be empty"));
        }
        SelectionConfig::new(self.count, self.stride, self.diversity_threshold)?;
        if !(1..=MAX_PHRASE_LENGTH).contains(&self.phrase_length) {
            return Err(MorphError::invalid_argument(format!(
                "phrase length must be within 1..={}, got {}",
                MAX_PHRASE_LENGTH, self.phrase_length
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SourcePair {
    pub original: String,
    pub transformed: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct WordResponse {
    pub status: &'static str,
    pub query: WordRequest,
    pub results: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<SourcePair>>,
    pub latency_ms: f64,
}

/// Request orchestration over a shared, read-only vocabulary table.
///
/// All collaborators are injected; nothing here is process-global, so tests
/// can run several engines over tiny vocabularies side by side.
#[derive(Clone)]
pub struct WordMorphEngine {
    index: Arc<VocabularyIndex>,
    morphology: Arc<dyn Morphology>,
    frequency: Option<Arc<dyn FrequencyOracle>>,
    age_filter: AgeFilter,
    /// Rows of `config.reserved_tokens`, excluded from every lookup
    reserved: Vec<usize>,
    config: EngineConfig,
}

impl WordMorphEngine {
    pub fn new(index: Arc<VocabularyIndex>) -> Self {
        Self::with_config(index, EngineConfig::default())
    }

    pub fn with_config(index: Arc<VocabularyIndex>, config: EngineConfig) -> Self {
        Self {
            morphology: Arc::new(IdentityMorphology),
            frequency: None,
            age_filter: AgeFilter::new(config.age_bands.clone()),
            reserved: index.rows_of(config.reserved_tokens.as_slice()),
            index,
            config,
        }
    }

    pub fn with_morphology(mut self, morphology: Arc<dyn Morphology>) -> Self {
        self.morphology = morphology;
        self
    }

    pub fn with_frequency(mut self, frequency: Arc<dyn FrequencyOracle>) -> Self {
        self.frequency = Some(frequency);
        self
    }

    pub fn index(&self) -> &VocabularyIndex {
        &self.index
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn search<R: Rng + ?Sized>(&self, request: &WordRequest, rng: &mut R) -> Result<WordResponse> {
        let start = Instant::now();
        request.validate()?;
        if request.age.is_some() && self.frequency.is_none() {
            return Err(MorphError::invalid_argument(
                "age filtering needs a frequency table",
            ));
        }

        // Phrase mode drops heads without modifiers, so fetch extra heads
        let heads_wanted = if request.phrase_length > 1 {
            request.count.saturating_mul(self.config.oversample)
        } else {
            request.count
        };

        let step_start = Instant::now();
        let heads: Vec<String> = if request.random_mode {
            random_sample_reserving(&self.index, heads_wanted, &self.reserved, rng)
                .into_iter()
                .map(|c| c.word)
                .collect()
        } else {
            self.similar_words(request, heads_wanted)?
        };
        let t_collect = step_start.elapsed().as_secs_f64() * 1000.0;

        let step_start = Instant::now();
        let words = if request.phrase_length > 1 {
            PhraseComposer::new(&self.index, self.morphology.as_ref())
                .with_adjectives_per_head(self.config.adjectives_per_head)
                .with_compatibility_threshold(self.config.compatibility_threshold)
                .with_reserved(&self.reserved)
                .compose(&heads, request.phrase_length, request.count)?
        } else {
            heads
        };
        let t_compose = step_start.elapsed().as_secs_f64() * 1000.0;

        let step_start = Instant::now();
        let results = self.transform_all(&words, request, rng);
        let t_transform = step_start.elapsed().as_secs_f64() * 1000.0;

        let sources: Option<Vec<SourcePair>> = request.return_source.then(|| {
            words
                .iter()
                .zip(&results)
                .map(|(original, transformed)| SourcePair {
                    original: original.clone(),
                    transformed: transformed.clone(),
                })
                .collect()
        });

        debug!(
            "search word={} count={} results={} timings: collect={:.2}ms compose={:.2}ms transform={:.2}ms",
            request.word,
            request.count,
            results.len(),
            t_collect,
            t_compose,
            t_transform
        );

        Ok(WordResponse {
            status: "success",
            query: request.clone(),
            results,
            sources,
            latency_ms: start.elapsed().as_secs_f64() * 1000.0,
        })
    }

    /// Ranked neighbors of the query after normalization, POS, age and diversity
    /// filtering. The neighbor pool doubles while the result is short, up to
    /// `max_fill_attempts` scans; a short result after that is returned as is.
    fn similar_words(&self, request: &WordRequest, wanted: usize) -> Result<Vec<String>> {
        let query = request.word.trim().to_lowercase();
        let query_lemma = self.morphology.normalize(&query);
        let selection = SelectionConfig {
            count: wanted,
            stride: request.stride,
            diversity_threshold: request.diversity_threshold,
        };

        let vocab_len = self.index.len();
        let mut k = wanted
            .saturating_mul(request.stride.saturating_add(1))
            .saturating_mul(self.config.oversample)
            .min(vocab_len);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let neighbors = self
                .index
                .nearest_neighbors_reserving(&query, k, true, &self.reserved)?;
            let candidates = self.filter_candidates(neighbors, request, &query, &query_lemma);
            let selected = select(&candidates, &selection);

            let exhausted = k >= vocab_len;
            if selected.len() >= wanted || exhausted || attempt >= self.config.max_fill_attempts {
                return Ok(selected.into_iter().map(|c| c.word).collect());
            }

            debug!(
                "Only {} of {} words survived filtering (k={}), widening pool",
                selected.len(),
                wanted,
                k
            );
            k = k.saturating_mul(2).min(vocab_len);
        }
    }

    fn filter_candidates(
        &self,
        neighbors: Vec<NeighborCandidate>,
        request: &WordRequest,
        query: &str,
        query_lemma: &str,
    ) -> Vec<NeighborCandidate> {
        let mut seen = HashSet::new();
        let frequency = self.frequency.as_deref();

        neighbors
            .into_iter()
            .filter_map(|candidate| {
                if !request.pos_filter.accepts(self.morphology.pos_of(&candidate.word)) {
                    return None;
                }

                let word = if request.normalize {
                    self.morphology.normalize(&candidate.word)
                } else {
                    candidate.word
                };
                if word == query || (request.normalize && word == query_lemma) {
                    return None;
                }

                if let (Some(age), Some(oracle)) = (request.age, frequency) {
                    if !self.age_filter.appropriate(&word, age, oracle) {
                        return None;
                    }
                }

                if !seen.insert(word.clone()) {
                    return None;
                }
                Some(NeighborCandidate::new(word, candidate.score))
            })
            .collect()
    }

    fn transform_all<R: Rng + ?Sized>(
        &self,
        words: &[String],
        request: &WordRequest,
        rng: &mut R,
    ) -> Vec<String> {
        if !request.global_skip {
            let transformer = WordTransformer::new(request.transform.clone());
            return words.iter().map(|w| transformer.apply(w, rng)).collect();
        }

        // Everything but skipping runs per word, then one skip pass over the phrase
        let per_word = TransformConfig {
            skip_count: 0,
            ..request.transform.clone()
        };
        let transformer = WordTransformer::new(per_word);
        let skip_count = request.transform.skip_count;
        let show_skipped = request.transform.show_skipped;

        words
            .iter()
            .map(|w| {
                let staged = transformer.apply(w, rng);
                let budget = request.global_skip_mode.budget(skip_count, &staged);
                apply_global_skip(&staged, budget, show_skipped, rng)
            })
            .collect()
    }
}
