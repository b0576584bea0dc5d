use crate::error::{MorphError, Result};
use crate::vocabulary::VocabularyIndex;
use finalfusion::compat::text::{ReadText, ReadTextDims};
use finalfusion::compat::word2vec::ReadWord2Vec;
use finalfusion::embeddings::Embeddings;
use finalfusion::io::ReadEmbeddings;
use finalfusion::storage::{Storage, StorageWrap};
use finalfusion::vocab::{Vocab, VocabWrap};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Source of the vocabulary table. Loading happens once, before any request is served.
pub trait EmbeddingProvider {
    fn load(&self) -> Result<VocabularyIndex>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EmbeddingFormat {
    #[default]
    Auto,
    Finalfusion, // .fifu binary
    Glove,       // text, no header
    Word2vecText,
    Word2vecBinary,
}

/// Reads embedding files through `finalfusion`.
#[derive(Clone, Debug)]
pub struct FinalfusionProvider {
    path: PathBuf,
    format: EmbeddingFormat,
}

impl FinalfusionProvider {
    pub fn new(path: impl Into<PathBuf>, format: EmbeddingFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve `Auto` from the file extension, then from the first byte:
    /// word2vec text files open with a `<rows> <dims>` header, GloVe files with a word.
    pub fn detect_format(&self) -> Result<EmbeddingFormat> {
        if self.format != EmbeddingFormat::Auto {
            return Ok(self.format);
        }

        match self.path.extension().and_then(|e| e.to_str()) {
            Some("fifu") => return Ok(EmbeddingFormat::Finalfusion),
            Some("bin") => return Ok(EmbeddingFormat::Word2vecBinary),
            _ => {}
        }

        let mut file = self.open()?;
        let mut first = [0u8; 1];
        let has_header = match file.read_exact(&mut first) {
            Ok(()) => first[0].is_ascii_digit(),
            Err(_) => false,
        };

        Ok(if has_header {
            EmbeddingFormat::Word2vecText
        } else {
            EmbeddingFormat::Glove
        })
    }

    fn open(&self) -> Result<File> {
        File::open(&self.path)
            .map_err(|e| MorphError::load(format!("{}: {}", self.path.display(), e)))
    }

    fn parse_error(&self, e: impl std::fmt::Display) -> MorphError {
        MorphError::load(format!("{}: {}", self.path.display(), e))
    }
}

impl EmbeddingProvider for FinalfusionProvider {
    fn load(&self) -> Result<VocabularyIndex> {
        let start = Instant::now();
        let format = self.detect_format()?;
        info!("Loading embeddings from {:?} ({:?})", self.path, format);

        let mut reader = BufReader::new(self.open()?);
        let index = match format {
            EmbeddingFormat::Finalfusion => {
                let embeddings: Embeddings<VocabWrap, StorageWrap> =
                    Embeddings::read_embeddings(&mut reader).map_err(|e| self.parse_error(e))?;
                to_index(&embeddings)?
            }
            EmbeddingFormat::Word2vecText => {
                let embeddings =
                    Embeddings::read_text_dims(&mut reader).map_err(|e| self.parse_error(e))?;
                to_index(&embeddings)?
            }
            EmbeddingFormat::Word2vecBinary => {
                let embeddings = Embeddings::read_word2vec_binary(&mut reader)
                    .map_err(|e| self.parse_error(e))?;
                to_index(&embeddings)?
            }
            EmbeddingFormat::Glove | EmbeddingFormat::Auto => {
                let embeddings =
                    Embeddings::read_text(&mut reader).map_err(|e| self.parse_error(e))?;
                to_index(&embeddings)?
            }
        };

        info!(
            "Loaded {} word vectors ({} dims) in {:.1}ms",
            index.len(),
            index.dim(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(index)
    }
}

/// Copy the known-word rows out of a finalfusion table (subword buckets are skipped).
fn to_index<V: Vocab, S: Storage>(embeddings: &Embeddings<V, S>) -> Result<VocabularyIndex> {
    let words = embeddings.vocab().words().to_vec();
    let (rows, dims) = embeddings.storage().shape();
    if rows < words.len() {
        return Err(MorphError::load(format!(
            "storage has {} rows for {} words",
            rows,
            words.len()
        )));
    }
    debug!("Copying {} x {} embedding matrix", words.len(), dims);

    let mut matrix = Array2::<f32>::zeros((words.len(), dims));
    for (i, mut row) in matrix.rows_mut().into_iter().enumerate() {
        row.assign(&embeddings.storage().embedding(i));
    }
    VocabularyIndex::new(words, matrix)
}
