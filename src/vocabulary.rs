use crate::config::RESERVED_TOKENS;
use crate::error::{MorphError, Result};
use ahash::RandomState;
use indexmap::IndexSet;
use ndarray::{Array2, ArrayView1, Axis};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Score forced onto rows that must never be returned (query row, reserved tokens)
const EXCLUDED_SCORE: f32 = f32::MIN;
const NORM_EPSILON: f32 = 1e-12;

/// A vocabulary word and its cosine similarity to the query vector.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NeighborCandidate {
    pub word: String,
    pub score: f32,
}

impl NeighborCandidate {
    pub fn new(word: impl Into<String>, score: f32) -> Self {
        Self {
            word: word.into(),
            score,
        }
    }
}

/// Immutable word table: row `i` of `matrix` is the unit-length embedding of
/// the `i`-th word. Built once, then shared read-only across requests.
#[derive(Debug)]
pub struct VocabularyIndex {
    words: IndexSet<String, RandomState>,
    matrix: Array2<f32>,
    reserved: Vec<usize>,
}

impl VocabularyIndex {
    pub fn new(words: Vec<String>, mut matrix: Array2<f32>) -> Result<Self> {
        if words.is_empty() {
            return Err(MorphError::load("embedding table has no words"));
        }
        if matrix.nrows() != words.len() {
            return Err(MorphError::load(format!(
                "embedding table has {} rows for {} words",
                matrix.nrows(),
                words.len()
            )));
        }

        // Lookups are case-folded, so rows are stored folded too. On a case
        // collision the earlier (usually more frequent) row wins.
        let total = words.len();
        let mut set = IndexSet::with_capacity_and_hasher(total, RandomState::new());
        let mut kept = Vec::with_capacity(total);
        let mut seen_raw = HashSet::with_capacity(total);
        for (row, word) in words.into_iter().enumerate() {
            let folded = fold(&word);
            if !seen_raw.insert(word) {
                return Err(MorphError::load("embedding table contains duplicate words"));
            }
            if set.insert(folded) {
                kept.push(row);
            }
        }
        if kept.len() < total {
            warn!(
                "Dropped {} rows whose words collide with earlier rows after case folding",
                total - kept.len()
            );
            matrix = matrix.select(Axis(0), &kept);
        }

        for mut row in matrix.rows_mut() {
            let norm = row.dot(&row).sqrt();
            if norm > NORM_EPSILON {
                row.mapv_inplace(|v| v / norm);
            }
        }

        let index = Self {
            words: set,
            matrix,
            reserved: Vec::new(),
        };
        Ok(index.with_reserved_tokens(RESERVED_TOKENS))
    }

    /// Build a table from `(word, vector)` pairs. All vectors must share one length.
    pub fn from_rows(rows: Vec<(String, Vec<f32>)>) -> Result<Self> {
        let dim = match rows.first() {
            Some((_, v)) => v.len(),
            None => return Err(MorphError::load("embedding table has no words")),
        };

        let mut words = Vec::with_capacity(rows.len());
        let mut flat = Vec::with_capacity(rows.len() * dim);
        for (word, vector) in rows {
            if vector.len() != dim {
                return Err(MorphError::load(format!(
                    "vector for '{}' has {} dimensions, expected {}",
                    word,
                    vector.len(),
                    dim
                )));
            }
            words.push(word);
            flat.extend(vector);
        }

        let matrix = Array2::from_shape_vec((words.len(), dim), flat)
            .map_err(|e| MorphError::load(e.to_string()))?;
        Self::new(words, matrix)
    }

    /// Replace the set of technical tokens excluded from every ranking.
    pub fn with_reserved_tokens<S: AsRef<str>>(mut self, tokens: &[S]) -> Self {
        self.reserved = self.rows_of(tokens);
        self
    }

    /// Rows of those `tokens` that are present in the table.
    pub fn rows_of<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<usize> {
        tokens
            .iter()
            .filter_map(|t| self.row_of(t.as_ref()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn word(&self, row: usize) -> Option<&str> {
        self.words.get_index(row).map(|w| w.as_str())
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(|w| w.as_str())
    }

    pub fn is_reserved(&self, row: usize) -> bool {
        self.reserved.contains(&row)
    }

    pub fn reserved_rows(&self) -> &[usize] {
        &self.reserved
    }

    /// Row of `word` after trimming and lowercasing.
    pub fn row_of(&self, word: &str) -> Option<usize> {
        let folded = fold(word);
        self.words.get_index_of(folded.as_str())
    }

    pub fn contains(&self, word: &str) -> bool {
        self.row_of(word).is_some()
    }

    pub fn embedding(&self, word: &str) -> Option<ArrayView1<'_, f32>> {
        self.row_of(word).map(|row| self.matrix.row(row))
    }

    /// Cosine similarity between two vocabulary words.
    pub fn similarity(&self, a: &str, b: &str) -> Result<f32> {
        let va = self
            .embedding(a)
            .ok_or_else(|| MorphError::not_found(fold(a)))?;
        let vb = self
            .embedding(b)
            .ok_or_else(|| MorphError::not_found(fold(b)))?;
        Ok(cosine_similarity(va, vb))
    }

    /// Up to `k` vocabulary words most similar to `word`, best first.
    pub fn nearest_neighbors(
        &self,
        word: &str,
        k: usize,
        exclude_self: bool,
    ) -> Result<Vec<NeighborCandidate>> {
        self.nearest_neighbors_reserving(word, k, exclude_self, &self.reserved)
    }

    /// [`nearest_neighbors`](Self::nearest_neighbors) with a caller-chosen set of
    /// reserved rows in place of the table's own.
    pub fn nearest_neighbors_reserving(
        &self,
        word: &str,
        k: usize,
        exclude_self: bool,
        reserved: &[usize],
    ) -> Result<Vec<NeighborCandidate>> {
        let row = self
            .row_of(word)
            .ok_or_else(|| MorphError::not_found(fold(word)))?;
        let self_row = [row];
        let exclude: &[usize] = if exclude_self { &self_row } else { &[] };
        Ok(self.rank(self.matrix.row(row), k, reserved, exclude))
    }

    /// Same ranking as [`nearest_neighbors`](Self::nearest_neighbors) for an
    /// arbitrary vector. The vector is normalized here; a zero vector scores 0 everywhere.
    pub fn nearest_to_vector(
        &self,
        query: ArrayView1<f32>,
        k: usize,
        exclude: &[usize],
    ) -> Result<Vec<NeighborCandidate>> {
        if query.len() != self.dim() {
            return Err(MorphError::invalid_argument(format!(
                "query vector has {} dimensions, table has {}",
                query.len(),
                self.dim()
            )));
        }
        let norm = query.dot(&query).sqrt();
        let unit = if norm > NORM_EPSILON {
            query.mapv(|v| v / norm)
        } else {
            query.to_owned()
        };
        Ok(self.rank(unit.view(), k, &self.reserved, exclude))
    }

    fn rank(
        &self,
        query: ArrayView1<f32>,
        k: usize,
        reserved: &[usize],
        exclude: &[usize],
    ) -> Vec<NeighborCandidate> {
        if k == 0 {
            return Vec::new();
        }

        // Rows and query are unit length, so the product is the cosine similarity
        let mut scores: Vec<f32> = self
            .matrix
            .dot(&query)
            .iter()
            .map(|s| s.clamp(-1.0, 1.0))
            .collect();

        let mut excluded = 0;
        for &row in reserved.iter().chain(exclude) {
            if let Some(score) = scores.get_mut(row) {
                if *score != EXCLUDED_SCORE {
                    *score = EXCLUDED_SCORE;
                    excluded += 1;
                }
            }
        }

        // Descending score, ties by vocabulary order
        let by_score = |a: &usize, b: &usize| {
            scores[*b]
                .partial_cmp(&scores[*a])
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.cmp(b))
        };

        let pool = (k + excluded).min(scores.len());
        let mut order: Vec<usize> = (0..scores.len()).collect();
        if pool < order.len() {
            order.select_nth_unstable_by(pool - 1, by_score);
            order.truncate(pool);
        }
        order.sort_unstable_by(by_score);

        let neighbors: Vec<NeighborCandidate> = order
            .into_iter()
            .filter(|&i| scores[i] > EXCLUDED_SCORE)
            .take(k)
            .filter_map(|i| self.word(i).map(|w| NeighborCandidate::new(w, scores[i])))
            .collect();

        debug!("Ranked {} rows, pool={} returned={}", scores.len(), pool, neighbors.len());
        neighbors
    }
}

/// Cosine similarity of two vectors; 0.0 when either one is a zero vector.
pub fn cosine_similarity(a: ArrayView1<f32>, b: ArrayView1<f32>) -> f32 {
    let norm_a = a.dot(&a).sqrt();
    let norm_b = b.dot(&b).sqrt();
    if norm_a < NORM_EPSILON || norm_b < NORM_EPSILON {
        return 0.0;
    }
    (a.dot(&b) / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

fn fold(word: &str) -> String {
    word.trim().to_lowercase()
}
