use std::env;
use word_morph::loader::{EmbeddingFormat, EmbeddingProvider, FinalfusionProvider};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: inspect_embeddings <path_to_embeddings> [probe_word...]");
        return;
    }

    let provider = FinalfusionProvider::new(&args[1], EmbeddingFormat::Auto);
    let format = match provider.detect_format() {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error reading embeddings: {}", e);
            return;
        }
    };

    match provider.load() {
        Ok(index) => {
            println!("Embedding Summary for {:?}", provider.path());
            println!("----------------------------------------");
            println!("Format:        {:?}", format);
            println!("Total Words:   {}", index.len());
            println!("Dimensions:    {}", index.dim());
            println!("Reserved Rows: {:?}", index.reserved_rows());
            println!("----------------------------------------\n");

            let preview: Vec<&str> = index.words().take(10).collect();
            println!("First words: {:?}\n", preview);

            for probe in &args[2..] {
                match index.nearest_neighbors(probe, 10, true) {
                    Ok(neighbors) => {
                        println!("Neighbors of '{}':", probe);
                        for n in neighbors {
                            println!("  {:<24} {:.4}", n.word, n.score);
                        }
                    }
                    Err(e) => println!("'{}': {}", probe, e),
                }
                println!();
            }
        }
        Err(e) => eprintln!("Error loading embeddings: {}", e),
    }
}
