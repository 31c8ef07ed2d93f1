use rand_xoshiro::rand_core::{RngCore, SeedableRng};

/// Largest prime below 2^32. Permuted values are always smaller than this,
/// keeping `SENTINEL` out of the reachable range.
pub const MODULUS: u64 = 4_294_967_291;

/// Slot value filling the signature of an empty shingle set.
pub const SENTINEL: u32 = u32::MAX;

/// Versioned seed of a permutation family. Two signatures are comparable
/// only if they were produced under the same family and signature length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashFamily {
    pub version: u32,
    pub seed: u64,
}

impl HashFamily {
    pub const fn new(version: u32, seed: u64) -> Self {
        Self { version, seed }
    }
}

/// The version-1 family used when the caller does not inject its own.
pub const FAMILY_V1: HashFamily = HashFamily::new(1, 53);

/// Generator of fixed-length MinHash signatures over string shingles.
///
/// The base-hash seed and the permutation coefficients are drawn once from
/// the injected family, so signatures produced by different instances, or
/// in different processes, stay comparable.
#[derive(Clone, Debug)]
pub struct MinHasher {
    base_seed: u64,
    coeffs: Vec<(u64, u64)>,
    family_id: u64,
}

impl MinHasher {
    pub fn new(num_perms: usize, family: HashFamily) -> Self {
        let mut seeder = rand_xoshiro::SplitMix64::seed_from_u64(
            family.seed ^ u64::from(family.version).rotate_left(32),
        );
        let base_seed = seeder.next_u64();
        let mut coeffs = Vec::with_capacity(num_perms);
        for _ in 0..num_perms {
            let a = 1 + seeder.next_u64() % (MODULUS - 1);
            let b = seeder.next_u64() % MODULUS;
            coeffs.push((a, b));
        }
        let family_id =
            seeder.next_u64() ^ (num_perms as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        Self {
            base_seed,
            coeffs,
            family_id,
        }
    }

    pub fn num_perms(&self) -> usize {
        self.coeffs.len()
    }

    /// Fingerprint of (family version, family seed, signature length).
    pub const fn family_id(&self) -> u64 {
        self.family_id
    }

    /// Computes the signature of a shingle set.
    ///
    /// An empty input yields the degenerate all-`SENTINEL` signature; it is
    /// a regular value, not an error.
    pub fn signature<I, S>(&self, shingles: I) -> Signature
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values = vec![SENTINEL; self.coeffs.len()];
        for shingle in shingles {
            let h = u64::from(
                fasthash::city::hash64_with_seed(shingle.as_ref().as_bytes(), self.base_seed)
                    as u32,
            );
            for (value, &(a, b)) in values.iter_mut().zip(&self.coeffs) {
                // a < MODULUS and h < 2^32, so a*h + b fits in a u64.
                let v = ((a * h + b) % MODULUS) as u32;
                if v < *value {
                    *value = v;
                }
            }
        }
        Signature {
            values,
            family_id: self.family_id,
        }
    }
}

/// A fixed-length MinHash signature, one `u32` per permutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    values: Vec<u32>,
    family_id: u64,
}

impl Signature {
    pub fn values(&self) -> &[u32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub const fn family_id(&self) -> u64 {
        self.family_id
    }

    /// Whether this is the sentinel signature of an empty shingle set.
    /// Hashed slots are always below `MODULUS`, so checking one slot suffices.
    pub fn is_degenerate(&self) -> bool {
        self.values.first() == Some(&SENTINEL)
    }

    /// Estimates the Jaccard similarity of the underlying sets as the
    /// fraction of matching slots. Returns `None` for signatures that are
    /// not comparable (different family or length).
    pub fn estimate_jaccard(&self, other: &Self) -> Option<f64> {
        if self.family_id != other.family_id
            || self.values.len() != other.values.len()
            || self.values.is_empty()
        {
            return None;
        }
        let matching = self
            .values
            .iter()
            .zip(&other.values)
            .filter(|(x, y)| x == y)
            .count();
        Some(matching as f64 / self.values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shingles(range: std::ops::Range<usize>) -> Vec<String> {
        range.map(|i| format!("s{i}")).collect()
    }

    #[test]
    fn test_deterministic_across_instances() {
        let items = shingles(0..50);
        let x = MinHasher::new(128, FAMILY_V1).signature(&items);
        let y = MinHasher::new(128, FAMILY_V1).signature(&items);
        assert_eq!(x, y);
    }

    #[test]
    fn test_different_seeds_diverge() {
        let items = shingles(0..50);
        let x = MinHasher::new(128, HashFamily::new(1, 53)).signature(&items);
        let y = MinHasher::new(128, HashFamily::new(1, 54)).signature(&items);
        assert_ne!(x.values(), y.values());
    }

    #[test]
    fn test_empty_input_is_degenerate() {
        let sig = MinHasher::new(128, FAMILY_V1).signature(Vec::<String>::new());
        assert!(sig.is_degenerate());
        assert!(sig.values().iter().all(|&v| v == SENTINEL));
    }

    #[test]
    fn test_hashed_slots_stay_below_sentinel() {
        let sig = MinHasher::new(128, FAMILY_V1).signature(&shingles(0..100));
        assert!(!sig.is_degenerate());
        assert!(sig.values().iter().all(|&v| v < SENTINEL));
    }

    #[test]
    fn test_estimate_identical_sets() {
        let hasher = MinHasher::new(128, FAMILY_V1);
        let x = hasher.signature(&shingles(0..100));
        let y = hasher.signature(&shingles(0..100));
        assert_eq!(x.estimate_jaccard(&y), Some(1.));
    }

    #[test]
    fn test_estimate_tracks_true_jaccard() {
        let hasher = MinHasher::new(128, FAMILY_V1);
        let x = hasher.signature(&shingles(0..100));
        let y = hasher.signature(&shingles(50..150));
        // True Jaccard similarity is 50/150.
        let estimated = x.estimate_jaccard(&y).unwrap();
        assert!((estimated - 1. / 3.).abs() < 0.2);
    }

    #[test]
    fn test_degenerate_pair_estimates_as_identical() {
        let hasher = MinHasher::new(128, FAMILY_V1);
        let x = hasher.signature(Vec::<String>::new());
        let y = hasher.signature(Vec::<String>::new());
        assert_eq!(x.estimate_jaccard(&y), Some(1.));
    }

    #[test]
    fn test_incomparable_signatures() {
        let items = shingles(0..50);
        let x = MinHasher::new(128, FAMILY_V1).signature(&items);
        let shorter = MinHasher::new(64, FAMILY_V1).signature(&items);
        let reseeded = MinHasher::new(128, HashFamily::new(2, 53)).signature(&items);
        assert_eq!(x.estimate_jaccard(&shorter), None);
        assert_eq!(x.estimate_jaccard(&reseeded), None);
    }
}
