use std::error::Error;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use clap::Parser;

use find_simsub::shingling::ShingleExtractor;
use find_simsub::HashFamily;
use lsh::minhash::MinHasher;

const NUM_PERMS: [usize; 3] = [64, 128, 256];
const MAX_DOCUMENTS: usize = 200;

#[derive(Parser, Debug)]
#[clap(
    name = "find-simsub-minhash_acc",
    about = "A program to test accuracy of MinHash signature estimation."
)]
struct Args {
    /// File path to a document file, one plain-text document per line.
    #[clap(short = 'i', long)]
    document_path: PathBuf,

    /// Shingle width in words (must be more than 0).
    #[clap(short = 'w', long, default_value = "3")]
    window_size: usize,

    /// Seed of the versioned hash family.
    #[clap(short = 's', long, default_value = "53")]
    seed: u64,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let extractor = ShingleExtractor::new(args.window_size)?;
    let mut shingle_sets = vec![];
    for line in BufReader::new(File::open(&args.document_path)?).lines() {
        let shingles = extractor.extract(&line?);
        // Degenerate documents have no defined Jaccard similarity.
        if !shingles.is_empty() {
            shingle_sets.push(shingles);
        }
        if shingle_sets.len() == MAX_DOCUMENTS {
            break;
        }
    }
    if shingle_sets.len() < 2 {
        return Err("At least 2 non-degenerate documents are required.".into());
    }
    eprintln!("Testing on {} documents...", shingle_sets.len());

    println!("num_perms,mean_absolute_error");
    for &num_perms in &NUM_PERMS {
        let hasher = MinHasher::new(num_perms, HashFamily::new(1, args.seed));
        let signatures: Vec<_> = shingle_sets
            .iter()
            .map(|shingles| hasher.signature(shingles.iter()))
            .collect();

        let mut sum_error = 0.;
        let mut num_pairs = 0usize;
        for i in 0..shingle_sets.len() {
            for j in i + 1..shingle_sets.len() {
                let truth =
                    1. - lsh::jaccard_distance(shingle_sets[i].iter(), shingle_sets[j].iter());
                if let Some(estimated) = signatures[i].estimate_jaccard(&signatures[j]) {
                    sum_error += (estimated - truth).abs();
                    num_pairs += 1;
                }
            }
        }
        println!("{num_perms},{}", sum_error / num_pairs as f64);
    }
    Ok(())
}
