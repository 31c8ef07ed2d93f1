//! Shingle extraction over normalized word tokens.

use hashbrown::HashSet;

use crate::errors::{FindSimsubError, Result};

/// Normalizes text into word tokens: lowercase, every non-alphanumeric
/// character replaced by a space, split on whitespace.
///
/// Normalization is pure; identical input always yields identical tokens.
pub fn normalize_words(text: &str) -> Vec<String> {
    let mut normalized = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_alphanumeric() {
            normalized.extend(c.to_lowercase());
        } else {
            normalized.push(' ');
        }
    }
    normalized
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

/// The set of unique normalized words of a document, as compared by the
/// exact similarity refiner.
pub fn word_set(text: &str) -> HashSet<String> {
    normalize_words(text).into_iter().collect()
}

/// Set of unique k-word shingles drawn from one document.
///
/// Ephemeral per checking run; constructed only by [`ShingleExtractor`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShingleSet {
    shingles: HashSet<String>,
}

impl ShingleSet {
    /// Number of unique shingles.
    pub fn len(&self) -> usize {
        self.shingles.len()
    }

    /// Checks if no shingle was extracted (text shorter than the window).
    pub fn is_empty(&self) -> bool {
        self.shingles.is_empty()
    }

    /// Checks membership of a shingle in its joined `"w1 w2 ... wk"` form.
    pub fn contains(&self, shingle: &str) -> bool {
        self.shingles.contains(shingle)
    }

    /// Iterates over the shingles in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.shingles.iter().map(String::as_str)
    }
}

/// Extracts fixed-width word shingles from raw text.
#[derive(Clone, Debug)]
pub struct ShingleExtractor {
    window_size: usize,
}

impl ShingleExtractor {
    /// Creates an extractor for `window_size`-word shingles
    /// (must be more than 0).
    pub fn new(window_size: usize) -> Result<Self> {
        if window_size == 0 {
            return Err(FindSimsubError::input("Window size must not be 0."));
        }
        Ok(Self { window_size })
    }

    /// Configured shingle width in words.
    pub const fn window_size(&self) -> usize {
        self.window_size
    }

    /// Produces the set of all contiguous windows of normalized words,
    /// each joined by a single space. Fewer words than the window size
    /// yields an empty set.
    pub fn extract(&self, text: &str) -> ShingleSet {
        let tokens = normalize_words(text);
        let mut shingles = HashSet::new();
        for window in tokens.windows(self.window_size) {
            shingles.insert(window.join(" "));
        }
        ShingleSet { shingles }
    }
}
