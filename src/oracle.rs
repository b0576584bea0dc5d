//! Contracts for the external linguistic collaborators.
//!
//! The engine never lemmatizes or tags words itself. It asks a [`Morphology`]
//! for base forms and part-of-speech tags, and a [`FrequencyOracle`] for Zipf
//! frequencies used by the age filter. File-backed implementations are provided
//! for the command-line tool and tests.

use crate::error::{MorphError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

/// OpenCorpora part-of-speech tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartOfSpeech {
    Noun,
    AdjectiveFull,
    AdjectiveShort,
    Comparative,
    Verb,
    Infinitive,
    ParticipleFull,
    ParticipleShort,
    Gerund,
    Numeral,
    Adverb,
    Pronoun,
    Predicative,
    Preposition,
    Conjunction,
    Particle,
    Interjection,
}

impl PartOfSpeech {
    pub fn from_tag(tag: &str) -> Option<Self> {
        let pos = match tag.trim().to_ascii_uppercase().as_str() {
            "NOUN" => PartOfSpeech::Noun,
            "ADJF" => PartOfSpeech::AdjectiveFull,
            "ADJS" => PartOfSpeech::AdjectiveShort,
            "COMP" => PartOfSpeech::Comparative,
            "VERB" => PartOfSpeech::Verb,
            "INFN" => PartOfSpeech::Infinitive,
            "PRTF" => PartOfSpeech::ParticipleFull,
            "PRTS" => PartOfSpeech::ParticipleShort,
            "GRND" => PartOfSpeech::Gerund,
            "NUMR" => PartOfSpeech::Numeral,
            "ADVB" => PartOfSpeech::Adverb,
            "NPRO" => PartOfSpeech::Pronoun,
            "PRED" => PartOfSpeech::Predicative,
            "PREP" => PartOfSpeech::Preposition,
            "CONJ" => PartOfSpeech::Conjunction,
            "PRCL" => PartOfSpeech::Particle,
            "INTJ" => PartOfSpeech::Interjection,
            _ => return None,
        };
        Some(pos)
    }

    pub fn tag(&self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "NOUN",
            PartOfSpeech::AdjectiveFull => "ADJF",
            PartOfSpeech::AdjectiveShort => "ADJS",
            PartOfSpeech::Comparative => "COMP",
            PartOfSpeech::Verb => "VERB",
            PartOfSpeech::Infinitive => "INFN",
            PartOfSpeech::ParticipleFull => "PRTF",
            PartOfSpeech::ParticipleShort => "PRTS",
            PartOfSpeech::Gerund => "GRND",
            PartOfSpeech::Numeral => "NUMR",
            PartOfSpeech::Adverb => "ADVB",
            PartOfSpeech::Pronoun => "NPRO",
            PartOfSpeech::Predicative => "PRED",
            PartOfSpeech::Preposition => "PREP",
            PartOfSpeech::Conjunction => "CONJ",
            PartOfSpeech::Particle => "PRCL",
            PartOfSpeech::Interjection => "INTJ",
        }
    }

    /// Modifier class used by phrase composition.
    pub fn is_adjective(&self) -> bool {
        matches!(
            self,
            PartOfSpeech::AdjectiveFull | PartOfSpeech::AdjectiveShort | PartOfSpeech::Comparative
        )
    }
}

/// Request-level part-of-speech filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PosFilter {
    Noun,
    Verb,
    Adjective,
    Adjf,
    Adjs,
    Infn,
    Prtf,
    Prts,
    Grnd,
    Numr,
    Advb,
    Npro,
    Pred,
    Prep,
    Conj,
    Prcl,
    Intj,
    #[value(name = "verb_all")]
    VerbAll,
    Participle,
    #[default]
    All,
}

impl PosFilter {
    pub fn parse(raw: &str) -> Result<Self> {
        let filter = match raw.trim().to_ascii_lowercase().as_str() {
            "noun" => PosFilter::Noun,
            "verb" => PosFilter::Verb,
            "adjective" => PosFilter::Adjective,
            "adjf" => PosFilter::Adjf,
            "adjs" => PosFilter::Adjs,
            "infn" => PosFilter::Infn,
            "prtf" => PosFilter::Prtf,
            "prts" => PosFilter::Prts,
            "grnd" => PosFilter::Grnd,
            "numr" => PosFilter::Numr,
            "advb" => PosFilter::Advb,
            "npro" => PosFilter::Npro,
            "pred" => PosFilter::Pred,
            "prep" => PosFilter::Prep,
            "conj" => PosFilter::Conj,
            "prcl" => PosFilter::Prcl,
            "intj" => PosFilter::Intj,
            "verb_all" => PosFilter::VerbAll,
            "participle" => PosFilter::Participle,
            "all" => PosFilter::All,
            other => {
                return Err(MorphError::invalid_argument(format!(
                    "unknown part-of-speech filter '{}'",
                    other
                )))
            }
        };
        Ok(filter)
    }

    pub fn accepts(&self, pos: Option<PartOfSpeech>) -> bool {
        use PartOfSpeech::*;

        let pos = match (self, pos) {
            (PosFilter::All, _) => return true,
            (_, None) => return false,
            (_, Some(p)) => p,
        };

        match self {
            PosFilter::Noun => pos == Noun,
            PosFilter::Verb => pos == Verb,
            PosFilter::Adjective => pos.is_adjective(),
            PosFilter::Adjf => pos == AdjectiveFull,
            PosFilter::Adjs => pos == AdjectiveShort,
            PosFilter::Infn => pos == Infinitive,
            PosFilter::Prtf => pos == ParticipleFull,
            PosFilter::Prts => pos == ParticipleShort,
            PosFilter::Grnd => pos == Gerund,
            PosFilter::Numr => pos == Numeral,
            PosFilter::Advb => pos == Adverb,
            PosFilter::Npro => pos == Pronoun,
            PosFilter::Pred => pos == Predicative,
            PosFilter::Prep => pos == Preposition,
            PosFilter::Conj => pos == Conjunction,
            PosFilter::Prcl => pos == Particle,
            PosFilter::Intj => pos == Interjection,
            PosFilter::VerbAll => matches!(
                pos,
                Verb | Infinitive | ParticipleFull | ParticipleShort | Gerund
            ),
            PosFilter::Participle => matches!(pos, ParticipleFull | ParticipleShort),
            PosFilter::All => true,
        }
    }
}

/// Lemmatizer + part-of-speech tagger.
pub trait Morphology: Send + Sync {
    fn normalize(&self, word: &str) -> String;
    fn pos_of(&self, word: &str) -> Option<PartOfSpeech>;
}

/// Zipf-scale corpus frequency, 0.0 (unseen) to 8.0.
pub trait FrequencyOracle: Send + Sync {
    fn zipf_frequency(&self, word: &str) -> f32;
}

/// Fallback morphology: lowercases, knows no tags.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityMorphology;

impl Morphology for IdentityMorphology {
    fn normalize(&self, word: &str) -> String {
        word.trim().to_lowercase()
    }

    fn pos_of(&self, _word: &str) -> Option<PartOfSpeech> {
        None
    }
}

/// Dictionary-backed morphology read from `word<TAB>lemma<TAB>TAG` lines.
#[derive(Clone, Debug, Default)]
pub struct LexiconMorphology {
    entries: HashMap<String, (String, Option<PartOfSpeech>)>,
}

impl LexiconMorphology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, word: &str, lemma: &str, pos: Option<PartOfSpeech>) {
        self.entries
            .insert(word.to_lowercase(), (lemma.to_lowercase(), pos));
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| MorphError::load(format!("{}: {}", path.display(), e)))?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut lexicon = Self::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| MorphError::load(e.to_string()))?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let parts: Vec<&str> = line.split('\t').collect();
            if parts.len() < 2 {
                warn!("Skipping malformed lexicon line {}: {:?}", line_no + 1, line);
                continue;
            }
            let pos = parts.get(2).and_then(|t| PartOfSpeech::from_tag(t));
            lexicon.insert(parts[0], parts[1], pos);
        }
        debug!("Loaded {} lexicon entries", lexicon.len());
        Ok(lexicon)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Morphology for LexiconMorphology {
    fn normalize(&self, word: &str) -> String {
        let key = word.trim().to_lowercase();
        match self.entries.get(&key) {
            Some((lemma, _)) => lemma.clone(),
            None => key,
        }
    }

    fn pos_of(&self, word: &str) -> Option<PartOfSpeech> {
        self.entries
            .get(&word.trim().to_lowercase())
            .and_then(|(_, pos)| *pos)
    }
}

/// Frequency table read from `word<TAB>zipf` lines; unknown words score 0.0.
#[derive(Clone, Debug, Default)]
pub struct FrequencyTable {
    zipf: HashMap<String, f32>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, word: &str, zipf: f32) {
        self.zipf.insert(word.to_lowercase(), zipf.clamp(0.0, 8.0));
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| MorphError::load(format!("{}: {}", path.display(), e)))?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut table = Self::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| MorphError::load(e.to_string()))?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.split_once('\t') {
                Some((word, value)) => match value.trim().parse::<f32>() {
                    Ok(zipf) => table.insert(word, zipf),
                    Err(_) => warn!("Skipping bad frequency on line {}: {:?}", line_no + 1, line),
                },
                None => warn!("Skipping malformed frequency line {}: {:?}", line_no + 1, line),
            }
        }
        debug!("Loaded {} frequency entries", table.zipf.len());
        Ok(table)
    }
}

impl FrequencyOracle for FrequencyTable {
    fn zipf_frequency(&self, word: &str) -> f32 {
        self.zipf
            .get(&word.trim().to_lowercase())
            .copied()
            .unwrap_or(0.0)
    }
}

/// Words for readers up to `max_age` need a Zipf frequency of at least `min_zipf`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgeBand {
    pub max_age: u8,
    pub min_zipf: f32,
}

impl AgeBand {
    pub fn defaults() -> Vec<AgeBand> {
        vec![
            AgeBand { max_age: 7, min_zipf: 4.5 },
            AgeBand { max_age: 10, min_zipf: 4.0 },
            AgeBand { max_age: 14, min_zipf: 3.5 },
            AgeBand { max_age: 17, min_zipf: 3.0 },
        ]
    }
}

#[derive(Clone, Debug)]
pub struct AgeFilter {
    bands: Vec<AgeBand>,
}

impl Default for AgeFilter {
    fn default() -> Self {
        Self::new(AgeBand::defaults())
    }
}

impl AgeFilter {
    pub fn new(mut bands: Vec<AgeBand>) -> Self {
        bands.sort_by_key(|b| b.max_age);
        Self { bands }
    }

    /// Minimum Zipf frequency for `age`; `None` once the reader is past every band.
    pub fn min_zipf(&self, age: u8) -> Option<f32> {
        self.bands
            .iter()
            .find(|b| age <= b.max_age)
            .map(|b| b.min_zipf)
    }

    pub fn appropriate(&self, word: &str, age: u8, oracle: &dyn FrequencyOracle) -> bool {
        match self.min_zipf(age) {
            Some(min) => oracle.zipf_frequency(word) >= min,
            None => true,
        }
    }
}
