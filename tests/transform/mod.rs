use rand::rngs::StdRng;
use rand::SeedableRng;
use word_morph::transform::{LetterClass, TransformConfig, WordTransformer};

pub mod global;
pub mod words;

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn transformer(config: TransformConfig) -> WordTransformer {
    WordTransformer::new(config)
}

pub fn letters_only(letter_class: LetterClass) -> TransformConfig {
    TransformConfig {
        letter_class,
        ..Default::default()
    }
}

pub fn sorted_chars(text: &str) -> Vec<char> {
    let mut chars: Vec<char> = text.chars().collect();
    chars.sort_unstable();
    chars
}

pub fn placeholders(text: &str) -> usize {
    text.chars().filter(|&c| c == '_').count()
}
