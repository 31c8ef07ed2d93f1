//! Exact similarity refinement for candidate pairs.

use hashbrown::HashSet;

/// Maximum-normalized overlap coefficient between two unique-word sets:
/// `|lhs ∩ rhs| / max(|lhs|, |rhs|)`.
///
/// Unlike the union-normalized Jaccard index, a short document fully
/// contained in a longer one scores maximally similar, which is the
/// wanted behavior for copied excerpts. Two empty sets score 1.0 by
/// convention; exactly one empty set scores 0.0.
pub fn overlap_coefficient(lhs: &HashSet<String>, rhs: &HashSet<String>) -> f64 {
    if lhs.is_empty() && rhs.is_empty() {
        // Two blank submissions are declared identical.
        return 1.;
    }
    if lhs.is_empty() || rhs.is_empty() {
        return 0.;
    }
    let intersection = lhs.intersection(rhs).count();
    intersection as f64 / lhs.len().max(rhs.len()) as f64
}
