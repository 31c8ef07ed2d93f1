use std::hash::Hasher;

use anyhow::{anyhow, Result};
use fasthash::{CityHasher, FastHasher};
use hashbrown::HashMap;

use crate::minhash::Signature;

/// Banded LSH joiner over MinHash signatures.
///
/// Signatures are sliced into contiguous bands; documents sharing a band
/// fingerprint land in the same bucket and become candidate pairs.
pub struct BandedJoiner {
    num_rows: usize,
    buckets: Vec<HashMap<u64, Vec<usize>>>,
    family_id: Option<u64>,
    num_docs: usize,
}

impl BandedJoiner {
    pub fn new(num_bands: usize, num_rows: usize) -> Result<Self> {
        if num_bands == 0 || num_rows == 0 {
            return Err(anyhow!("The numbers of bands and rows must not be 0."));
        }
        Ok(Self {
            num_rows,
            buckets: vec![HashMap::new(); num_bands],
            family_id: None,
            num_docs: 0,
        })
    }

    pub fn num_bands(&self) -> usize {
        self.buckets.len()
    }

    pub const fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub const fn num_docs(&self) -> usize {
        self.num_docs
    }

    /// Registers a signature, returning the document index it was assigned.
    ///
    /// All added signatures must share the length `num_bands * num_rows`
    /// and the hash family of the first one; mixing configurations would
    /// make bucket collisions meaningless.
    pub fn add(&mut self, signature: &Signature) -> Result<usize> {
        let num_slots = self.num_bands() * self.num_rows;
        if signature.len() != num_slots {
            return Err(anyhow!(
                "The input signature must include {num_slots} slots, but got {}.",
                signature.len()
            ));
        }
        match self.family_id {
            Some(id) if id != signature.family_id() => {
                return Err(anyhow!(
                    "The input signature was produced under a different hash family."
                ));
            }
            None => self.family_id = Some(signature.family_id()),
            _ => {}
        }
        let doc_id = self.num_docs;
        for (band_index, (rows, bucket)) in signature
            .values()
            .chunks(self.num_rows)
            .zip(self.buckets.iter_mut())
            .enumerate()
        {
            let fingerprint = band_fingerprint(band_index as u64, rows);
            bucket.entry(fingerprint).or_default().push(doc_id);
        }
        self.num_docs += 1;
        Ok(doc_id)
    }

    /// Flattens every bucket with two or more members into unordered pairs,
    /// deduplicated across bands.
    pub fn candidate_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = vec![];
        for bucket in &self.buckets {
            for members in bucket.values() {
                // Members are in insertion order, so i < j holds.
                for (k, &i) in members.iter().enumerate() {
                    for &j in &members[k + 1..] {
                        pairs.push((i, j));
                    }
                }
            }
        }
        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }
}

fn band_fingerprint(band_index: u64, rows: &[u32]) -> u64 {
    let mut s = CityHasher::with_seed(band_index);
    for &v in rows {
        s.write_u32(v);
    }
    s.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minhash::{MinHasher, FAMILY_V1, HashFamily};

    fn shingles(range: std::ops::Range<usize>) -> Vec<String> {
        range.map(|i| format!("s{i}")).collect()
    }

    #[test]
    fn test_zero_split_rejected() {
        assert!(BandedJoiner::new(0, 4).is_err());
        assert!(BandedJoiner::new(32, 0).is_err());
    }

    #[test]
    fn test_wrong_signature_length_rejected() {
        let mut joiner = BandedJoiner::new(32, 4).unwrap();
        let sig = MinHasher::new(64, FAMILY_V1).signature(&shingles(0..10));
        assert!(joiner.add(&sig).is_err());
    }

    #[test]
    fn test_mixed_families_rejected() {
        let mut joiner = BandedJoiner::new(32, 4).unwrap();
        let items = shingles(0..10);
        let x = MinHasher::new(128, FAMILY_V1).signature(&items);
        let y = MinHasher::new(128, HashFamily::new(1, 99)).signature(&items);
        joiner.add(&x).unwrap();
        assert!(joiner.add(&y).is_err());
    }

    #[test]
    fn test_identical_signatures_pair_once() {
        let mut joiner = BandedJoiner::new(32, 4).unwrap();
        let sig = MinHasher::new(128, FAMILY_V1).signature(&shingles(0..20));
        joiner.add(&sig).unwrap();
        joiner.add(&sig).unwrap();
        // The pair collides in all 32 bands but must be reported once.
        assert_eq!(joiner.candidate_pairs(), vec![(0, 1)]);
    }

    #[test]
    fn test_all_pairs_of_identical_signatures() {
        let mut joiner = BandedJoiner::new(32, 4).unwrap();
        let sig = MinHasher::new(128, FAMILY_V1).signature(&shingles(0..20));
        for _ in 0..3 {
            joiner.add(&sig).unwrap();
        }
        assert_eq!(joiner.candidate_pairs(), vec![(0, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn test_disjoint_sets_produce_no_candidates() {
        let mut joiner = BandedJoiner::new(32, 4).unwrap();
        let hasher = MinHasher::new(128, FAMILY_V1);
        joiner.add(&hasher.signature(&shingles(0..100))).unwrap();
        joiner.add(&hasher.signature(&shingles(100..200))).unwrap();
        joiner.add(&hasher.signature(&shingles(200..300))).unwrap();
        assert!(joiner.candidate_pairs().is_empty());
    }

    #[test]
    fn test_highly_similar_sets_become_candidates() {
        let mut joiner = BandedJoiner::new(32, 4).unwrap();
        let hasher = MinHasher::new(128, FAMILY_V1);
        joiner.add(&hasher.signature(&shingles(0..100))).unwrap();
        joiner.add(&hasher.signature(&shingles(0..97))).unwrap();
        // At Jaccard 0.97 the candidate probability 1-(1-s^4)^32 is
        // overwhelming; missing this pair would be a banding bug.
        assert_eq!(joiner.candidate_pairs(), vec![(0, 1)]);
    }

    #[test]
    fn test_doc_ids_are_sequential() {
        let mut joiner = BandedJoiner::new(32, 4).unwrap();
        let hasher = MinHasher::new(128, FAMILY_V1);
        assert_eq!(joiner.add(&hasher.signature(&shingles(0..10))).unwrap(), 0);
        assert_eq!(joiner.add(&hasher.signature(&shingles(5..15))).unwrap(), 1);
        assert_eq!(joiner.num_docs(), 2);
    }
}
