//! Near-duplicate detection across text submissions.
//!
//! A checking run turns each document into a set of word shingles, hashes
//! the set into a fixed-length MinHash signature, discovers candidate
//! pairs by banded LSH over the whole corpus, refines candidates with the
//! exact maximum-normalized overlap of the documents' word sets, and
//! aggregates the results into one report per document.
#![deny(missing_docs)]

pub mod errors;
pub mod refine;
pub mod report;
pub mod runner;
pub mod shingling;

pub use report::{DocumentReport, MatchResult};
pub use runner::{CheckRun, RunState};

pub use lsh::minhash::{HashFamily, FAMILY_V1};

use std::sync::atomic::{AtomicBool, Ordering};

use hashbrown::{HashMap, HashSet};
use rayon::prelude::*;

use crate::errors::{FindSimsubError, Result};
use crate::refine::overlap_coefficient;
use crate::shingling::{word_set, ShingleExtractor};
use lsh::banding::BandedJoiner;
use lsh::minhash::{MinHasher, Signature};

// Cancellation is observed between chunks of this many candidate pairs.
const REFINE_CHUNK: usize = 4096;

/// A text submission to be checked against the rest of the corpus.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Opaque identifier of the submission.
    pub id: String,
    /// Opaque identifier of the submitting author.
    pub author_id: String,
    /// Extracted plain text of the submission.
    pub text: String,
}

/// Configuration of a checking run, injected at construction.
#[derive(Clone, Copy, Debug)]
pub struct CheckConfig {
    /// Shingle width in words.
    pub window_size: usize,
    /// Number of hash permutations forming a signature.
    pub num_perms: usize,
    /// Number of LSH bands; `num_bands * num_rows` must equal `num_perms`.
    pub num_bands: usize,
    /// Number of signature rows per band.
    pub num_rows: usize,
    /// Versioned seed of the permutation family.
    pub family: HashFamily,
    /// Number of top matches retained with excerpts per document.
    pub top_k: usize,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            window_size: 3,
            num_perms: 128,
            num_bands: 32,
            num_rows: 4,
            family: FAMILY_V1,
            top_k: 3,
        }
    }
}

/// Near-duplicate checker over a corpus of submissions.
#[derive(Clone, Debug)]
pub struct SimilarityChecker {
    config: CheckConfig,
    extractor: ShingleExtractor,
    hasher: MinHasher,
    shows_progress: bool,
}

struct DocFeatures {
    words: HashSet<String>,
    signature: Signature,
}

impl SimilarityChecker {
    /// Creates a checker, validating the configuration up front.
    ///
    /// # Errors
    ///
    /// `Input` when the window size or the permutation count is 0;
    /// `ConfigMismatch` when the banding split does not cover the
    /// permutation count exactly.
    pub fn new(config: CheckConfig) -> Result<Self> {
        if config.num_perms == 0 {
            return Err(FindSimsubError::input(
                "The number of permutations must not be 0.",
            ));
        }
        if config.num_bands * config.num_rows != config.num_perms {
            return Err(FindSimsubError::config_mismatch(format!(
                "The banding split {}x{} does not cover {} permutations.",
                config.num_bands, config.num_rows, config.num_perms
            )));
        }
        let extractor = ShingleExtractor::new(config.window_size)?;
        let hasher = MinHasher::new(config.num_perms, config.family);
        Ok(Self {
            config,
            extractor,
            hasher,
            shows_progress: false,
        })
    }

    /// Shows the progress via the standard error output?
    pub const fn shows_progress(mut self, yes: bool) -> Self {
        self.shows_progress = yes;
        self
    }

    /// Gets the injected configuration.
    pub const fn config(&self) -> CheckConfig {
        self.config
    }

    /// Runs a full check over `documents` and returns one report per
    /// document, keyed by document id.
    ///
    /// The run recomputes everything from scratch and is idempotent:
    /// unchanged inputs reproduce identical reports.
    ///
    /// # Errors
    ///
    /// `InsufficientData` for fewer than two documents; `Input` for
    /// duplicate document ids. Empty or under-length texts are not
    /// errors; they flow through as degenerate signatures.
    pub fn check(&self, documents: &[Document]) -> Result<HashMap<String, DocumentReport>> {
        self.run(documents, None)
    }

    pub(crate) fn run(
        &self,
        documents: &[Document],
        cancel: Option<&AtomicBool>,
    ) -> Result<HashMap<String, DocumentReport>> {
        if documents.len() < 2 {
            return Err(FindSimsubError::insufficient_data(documents.len()));
        }
        let mut ids = HashSet::with_capacity(documents.len());
        for document in documents {
            if !ids.insert(document.id.as_str()) {
                return Err(FindSimsubError::input(format!(
                    "Duplicate document id: {}",
                    document.id
                )));
            }
        }
        check_cancelled(cancel)?;

        // Signature generation is a pure map, parallel per document.
        let features: Vec<DocFeatures> = documents
            .par_iter()
            .map(|document| {
                let shingles = self.extractor.extract(&document.text);
                let signature = self.hasher.signature(shingles.iter());
                DocFeatures {
                    words: word_set(&document.text),
                    signature,
                }
            })
            .collect();
        if self.shows_progress {
            let degenerate = features
                .iter()
                .filter(|f| f.signature.is_degenerate())
                .count();
            eprintln!(
                "[SimilarityChecker::check] #documents={}, #degenerate={degenerate}",
                documents.len()
            );
        }
        check_cancelled(cancel)?;

        // Banding is a sequential reduce over the mapped signatures.
        let mut joiner = BandedJoiner::new(self.config.num_bands, self.config.num_rows)
            .map_err(|e| FindSimsubError::config_mismatch(e.to_string()))?;
        for feature in &features {
            joiner
                .add(&feature.signature)
                .map_err(|e| FindSimsubError::config_mismatch(e.to_string()))?;
        }
        let candidates = joiner.candidate_pairs();
        if self.shows_progress {
            eprintln!(
                "[SimilarityChecker::check] #candidate-pairs={}",
                candidates.len()
            );
        }
        check_cancelled(cancel)?;

        // Exact refinement touches candidate pairs only.
        let mut resolved = Vec::with_capacity(candidates.len());
        for chunk in candidates.chunks(REFINE_CHUNK) {
            check_cancelled(cancel)?;
            resolved.par_extend(chunk.par_iter().map(|&(i, j)| {
                (
                    i,
                    j,
                    overlap_coefficient(&features[i].words, &features[j].words),
                )
            }));
        }
        check_cancelled(cancel)?;

        Ok(report::aggregate(documents, &resolved, self.config.top_k))
    }
}

fn check_cancelled(cancel: Option<&AtomicBool>) -> Result<()> {
    match cancel {
        Some(flag) if flag.load(Ordering::Relaxed) => Err(FindSimsubError::cancelled()),
        _ => Ok(()),
    }
}
