use clap::{Args as ClapArgs, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use word_morph::config::EngineConfig;
use word_morph::engine::{WordMorphEngine, WordRequest};
use word_morph::error::Result;
use word_morph::global_skip::GlobalSkipMode;
use word_morph::loader::{EmbeddingFormat, EmbeddingProvider, FinalfusionProvider};
use word_morph::oracle::{FrequencyTable, LexiconMorphology, PosFilter};
use word_morph::transform::{LetterClass, TransformConfig};

#[derive(Parser, Debug)]
#[command(name = "word-morph")]
#[command(about = "Semantically related Russian words with letter games")]
struct Args {
    /// Embedding table (.fifu, GloVe text, word2vec text or binary)
    #[arg(short, long)]
    embeddings: PathBuf,

    #[arg(long, value_enum, default_value = "auto")]
    format: EmbeddingFormat,

    /// Morphology dictionary: word<TAB>lemma<TAB>TAG per line
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// Frequency table: word<TAB>zipf per line (enables --age)
    #[arg(long)]
    frequencies: Option<PathBuf>,

    /// TOML tuning file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Seed for reproducible shuffles and samples
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Related words (or phrases), optionally transformed
    Words(WordsArgs),
    /// Cosine similarity of two vocabulary words
    Similarity { a: String, b: String },
}

#[derive(ClapArgs, Debug)]
struct WordsArgs {
    word: String,

    #[arg(short, long, default_value = "10")]
    count: usize,

    /// Sampling step: 0 takes every neighbor, 1 every other one
    #[arg(long, default_value = "0")]
    stride: usize,

    /// Maximum letter-set overlap between returned words (0 disables)
    #[arg(long, default_value = "0.0")]
    similarity_threshold: f32,

    #[arg(long)]
    random_mode: bool,

    #[arg(long, value_enum, default_value = "all")]
    pos_filter: PosFilter,

    #[arg(long)]
    normalize: bool,

    #[arg(long)]
    age: Option<u8>,

    #[arg(long, default_value = "1")]
    phrase_length: usize,

    #[arg(long)]
    shuffle_letters: bool,

    #[arg(long, default_value = "0")]
    skip_letters: usize,

    #[arg(long)]
    show_skipped: bool,

    #[arg(long)]
    add_errors: bool,

    #[arg(long, value_enum, default_value = "all")]
    letter_type: LetterClass,

    #[arg(long)]
    preserve_first: bool,

    #[arg(long)]
    preserve_last: bool,

    #[arg(long)]
    global_skip: bool,

    #[arg(long, value_enum, default_value = "total")]
    global_skip_mode: GlobalSkipMode,

    #[arg(long)]
    return_source: bool,
}

impl WordsArgs {
    fn into_request(self) -> WordRequest {
        WordRequest {
            word: self.word,
            count: self.count,
            stride: self.stride,
            diversity_threshold: self.similarity_threshold,
            random_mode: self.random_mode,
            pos_filter: self.pos_filter,
            normalize: self.normalize,
            age: self.age,
            phrase_length: self.phrase_length,
            transform: TransformConfig {
                letter_class: self.letter_type,
                preserve_first: self.preserve_first,
                preserve_last: self.preserve_last,
                shuffle: self.shuffle_letters,
                skip_count: self.skip_letters,
                show_skipped: self.show_skipped,
                inject_errors: self.add_errors,
            },
            global_skip: self.global_skip,
            global_skip_mode: self.global_skip_mode,
            return_source: self.return_source,
        }
    }
}

fn main() {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args) {
        let body = serde_json::json!({
            "status": "error",
            "error": e.code(),
            "message": e.to_string(),
        });
        println!("{}", body);
        std::process::exit(if e.is_not_found() { 2 } else { 1 });
    }
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => EngineConfig::from_toml_file(path)?,
        None => EngineConfig::default(),
    };

    // Readiness gate: nothing is served until the table is in memory
    let index = FinalfusionProvider::new(&args.embeddings, args.format).load()?;
    let mut engine = WordMorphEngine::with_config(Arc::new(index), config);

    if let Some(path) = &args.lexicon {
        let lexicon = LexiconMorphology::from_path(path)?;
        info!("Morphology lexicon: {} entries", lexicon.len());
        engine = engine.with_morphology(Arc::new(lexicon));
    }
    if let Some(path) = &args.frequencies {
        engine = engine.with_frequency(Arc::new(FrequencyTable::from_path(path)?));
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let output = match args.command {
        Command::Words(words) => {
            let request = words.into_request();
            let response = engine.search(&request, &mut rng)?;
            serde_json::to_string_pretty(&response)
        }
        Command::Similarity { a, b } => {
            let score = engine.index().similarity(&a, &b)?;
            serde_json::to_string_pretty(&serde_json::json!({
                "status": "success",
                "a": a,
                "b": b,
                "similarity": score,
            }))
        }
    }?;

    println!("{}", output);
    Ok(())
}
