//! Letter-level word transformations for spelling and guessing exercises.
//!
//! Every transformation works on `char` positions, never bytes, and treats a
//! multi-word phrase as independent space-separated words. Randomness always
//! comes from the caller's generator.

use crate::config::{MIN_TRANSFORM_LEN, SKIP_PLACEHOLDER};
use crate::error::{MorphError, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const VOWELS: &[char] = &['а', 'е', 'ё', 'и', 'о', 'у', 'ы', 'э', 'ю', 'я'];
pub const CONSONANTS: &[char] = &[
    'б', 'в', 'г', 'д', 'ж', 'з', 'й', 'к', 'л', 'м', 'н', 'п', 'р', 'с', 'т', 'ф', 'х', 'ц',
    'ч', 'ш', 'щ', 'ъ', 'ь',
];

/// Letters a child is likely to confuse with the key letter.
const CONFUSABLE_LETTERS: &[(char, &[char])] = &[
    ('а', &['о', 'я']),
    ('о', &['а', 'ё']),
    ('е', &['ё', 'э']),
    ('и', &['ы', 'й']),
    ('у', &['ю']),
    ('б', &['п', 'в']),
    ('п', &['б']),
    ('д', &['т']),
    ('т', &['д']),
    ('г', &['к']),
    ('к', &['г']),
    ('з', &['с']),
    ('с', &['з']),
    ('ж', &['ш']),
    ('ш', &['щ', 'ж']),
    ('в', &['ф', 'б']),
    ('ф', &['в']),
];

fn lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn upper(c: char) -> char {
    c.to_uppercase().next().unwrap_or(c)
}

pub fn is_vowel(c: char) -> bool {
    VOWELS.contains(&lower(c))
}

pub fn is_consonant(c: char) -> bool {
    CONSONANTS.contains(&lower(c))
}

pub fn confusables(c: char) -> Option<&'static [char]> {
    let key = lower(c);
    CONFUSABLE_LETTERS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, similar)| *similar)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LetterClass {
    #[default]
    All,
    Vowels,
    Consonants,
}

impl LetterClass {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(LetterClass::All),
            "vowels" => Ok(LetterClass::Vowels),
            "consonants" => Ok(LetterClass::Consonants),
            other => Err(MorphError::invalid_argument(format!(
                "letter class must be one of: all, vowels, consonants (got '{}')",
                other
            ))),
        }
    }

    pub fn contains(&self, c: char) -> bool {
        match self {
            LetterClass::All => is_vowel(c) || is_consonant(c),
            LetterClass::Vowels => is_vowel(c),
            LetterClass::Consonants => is_consonant(c),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    pub letter_class: LetterClass,
    pub preserve_first: bool,
    pub preserve_last: bool,
    pub shuffle: bool,
    pub skip_count: usize,
    pub show_skipped: bool,
    pub inject_errors: bool,
}

impl TransformConfig {
    pub fn is_noop(&self) -> bool {
        !self.shuffle && self.skip_count == 0 && !self.inject_errors
    }
}

/// Applies a fixed [`TransformConfig`] to words and phrases.
#[derive(Clone, Debug, Default)]
pub struct WordTransformer {
    config: TransformConfig,
}

impl WordTransformer {
    pub fn new(config: TransformConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Positions that may be mutated under the current letter class and preserve flags.
    pub fn eligible_indices(&self, chars: &[char]) -> Vec<usize> {
        let last = chars.len().saturating_sub(1);
        chars
            .iter()
            .enumerate()
            .filter(|&(i, _)| !(self.config.preserve_first && i == 0))
            .filter(|&(i, _)| !(self.config.preserve_last && i == last))
            .filter(|&(_, &c)| self.config.letter_class.contains(c))
            .map(|(i, _)| i)
            .collect()
    }

    /// Shuffle, then skip, then inject typos, each stage seeing the previous output.
    pub fn apply<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> String {
        let mut current = text.to_string();
        if self.config.shuffle {
            current = self.shuffle(&current, rng);
        }
        if self.config.skip_count > 0 {
            current = self.skip(&current, rng);
        }
        if self.config.inject_errors {
            current = self.inject_errors(&current, rng);
        }
        current
    }

    pub fn shuffle<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> String {
        per_word(text, |word| self.shuffle_word(word, rng))
    }

    pub fn skip<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> String {
        per_word(text, |word| self.skip_word(word, rng))
    }

    pub fn inject_errors<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> String {
        per_word(text, |word| self.typo_word(word, rng))
    }

    fn shuffle_word<R: Rng + ?Sized>(&self, word: &str, rng: &mut R) -> String {
        let mut chars: Vec<char> = word.chars().collect();
        if chars.len() < MIN_TRANSFORM_LEN {
            return word.to_string();
        }
        let indices = self.eligible_indices(&chars);
        if indices.len() < 2 {
            return word.to_string();
        }

        let mut letters: Vec<char> = indices.iter().map(|&i| chars[i]).collect();
        letters.shuffle(rng);
        for (&pos, letter) in indices.iter().zip(letters) {
            chars[pos] = letter;
        }
        chars.into_iter().collect()
    }

    fn skip_word<R: Rng + ?Sized>(&self, word: &str, rng: &mut R) -> String {
        let chars: Vec<char> = word.chars().collect();
        if chars.len() < MIN_TRANSFORM_LEN || self.config.skip_count == 0 {
            return word.to_string();
        }
        let indices = self.eligible_indices(&chars);
        if indices.is_empty() {
            return word.to_string();
        }

        let amount = self.config.skip_count.min(indices.len());
        let mut selected = vec![false; chars.len()];
        for pick in rand::seq::index::sample(rng, indices.len(), amount) {
            selected[indices[pick]] = true;
        }
        mask_selected(&chars, &selected, self.config.show_skipped)
    }

    fn typo_word<R: Rng + ?Sized>(&self, word: &str, rng: &mut R) -> String {
        let mut chars: Vec<char> = word.chars().collect();
        if chars.len() < MIN_TRANSFORM_LEN {
            return word.to_string();
        }
        let indices = self.eligible_indices(&chars);
        if indices.is_empty() {
            return word.to_string();
        }

        let errors = if indices.len() <= 4 { 1 } else { 2 };
        let amount = errors.min(indices.len());
        for pick in rand::seq::index::sample(rng, indices.len(), amount) {
            let pos = indices[pick];
            if let Some(replacement) = confuse(chars[pos], rng) {
                chars[pos] = replacement;
            }
        }
        chars.into_iter().collect()
    }
}

/// Replacement letter for `original`, keeping its case. Letters without a
/// confusable entry fall back to a different letter of the same class.
fn confuse<R: Rng + ?Sized>(original: char, rng: &mut R) -> Option<char> {
    let key = lower(original);
    let replacement = match confusables(key) {
        Some(similar) => *similar.choose(rng)?,
        None => {
            let pool = if is_vowel(key) {
                VOWELS
            } else if is_consonant(key) {
                CONSONANTS
            } else {
                return None;
            };
            let others: Vec<char> = pool.iter().copied().filter(|&c| c != key).collect();
            *others.choose(rng)?
        }
    };

    if original.is_uppercase() {
        Some(upper(replacement))
    } else {
        Some(replacement)
    }
}

/// Drop (or mark) every selected position, copying the rest through.
pub(crate) fn mask_selected(chars: &[char], selected: &[bool], show_skipped: bool) -> String {
    let mut out = String::with_capacity(chars.len() * 2);
    for (&c, &skip) in chars.iter().zip(selected) {
        if !skip {
            out.push(c);
        } else if show_skipped {
            out.push(SKIP_PLACEHOLDER);
        }
    }
    out
}

fn per_word<F: FnMut(&str) -> String>(text: &str, mut f: F) -> String {
    text.split(' ').map(|word| f(word)).collect::<Vec<_>>().join(" ")
}
