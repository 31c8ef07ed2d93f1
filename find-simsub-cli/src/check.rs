use std::error::Error;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;

use find_simsub::{CheckConfig, Document, HashFamily, SimilarityChecker};

#[derive(Parser, Debug)]
#[clap(
    name = "find-simsub-check",
    about = "A program to check text submissions for near-duplicate content."
)]
struct Args {
    /// File path to a corpus file, one JSON submission per line:
    /// {"id": ..., "authorId": ..., "text": ...}.
    #[clap(short = 'i', long)]
    document_path: PathBuf,

    /// Shingle width in words (must be more than 0).
    #[clap(short = 'w', long, default_value = "3")]
    window_size: usize,

    /// Number of hash permutations forming a signature.
    #[clap(short = 'p', long, default_value = "128")]
    num_perms: usize,

    /// Number of LSH bands. bands*rows must equal the number of
    /// permutations. Fewer rows per band raise recall at higher cost.
    #[clap(short = 'b', long, default_value = "32")]
    num_bands: usize,

    /// Number of signature rows per band.
    #[clap(short = 'r', long, default_value = "4")]
    num_rows: usize,

    /// Number of top matches retained with excerpts per document.
    #[clap(short = 'k', long, default_value = "3")]
    top_k: usize,

    /// Seed of the versioned hash family.
    #[clap(short = 's', long, default_value = "53")]
    seed: u64,

    /// Version of the hash family.
    #[clap(long, default_value = "1")]
    family_version: u32,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let documents = load_documents(&args.document_path)?;
    eprintln!("Loaded {} documents", documents.len());

    let config = CheckConfig {
        window_size: args.window_size,
        num_perms: args.num_perms,
        num_bands: args.num_bands,
        num_rows: args.num_rows,
        family: HashFamily::new(args.family_version, args.seed),
        top_k: args.top_k,
    };
    let checker = SimilarityChecker::new(config)?.shows_progress(true);

    let start = Instant::now();
    let mut reports = checker.check(&documents)?;
    eprintln!(
        "Checked {} documents in {} sec",
        documents.len(),
        start.elapsed().as_secs_f64()
    );

    let mut ids: Vec<_> = reports.keys().cloned().collect();
    ids.sort_unstable();
    for id in ids {
        if let Some(report) = reports.remove(&id) {
            println!("{}", serde_json::to_string(&report)?);
        }
    }
    Ok(())
}

fn load_documents(path: &Path) -> Result<Vec<Document>, Box<dyn Error>> {
    let mut documents = vec![];
    for line in BufReader::new(File::open(path)?).lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        documents.push(serde_json::from_str(&line)?);
    }
    Ok(documents)
}
