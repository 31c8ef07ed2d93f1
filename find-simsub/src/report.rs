//! Per-document match aggregation and reports.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::Document;

const EXCERPT_CHARS: usize = 160;

/// A single pairwise match from the viewpoint of one document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    /// Identifier of the matched document.
    pub matched_id: String,
    /// Exact similarity of the pair in `[0,1]`.
    pub similarity: f64,
    /// Representative excerpt of the matched document's text;
    /// only populated for top matches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
}

/// Aggregated matches of one document over a full checking run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentReport {
    /// Identifier of the reported document.
    pub document_id: String,
    /// Highest pairwise similarity, or 0.0 without any match.
    pub overall_score: f64,
    /// The strongest matches, bounded by the configured top-K,
    /// each carrying an excerpt.
    pub top_matches: Vec<MatchResult>,
    /// Every resolved match, strongest first.
    pub all_matches: Vec<MatchResult>,
}

/// Merges resolved candidate pairs into one report per document.
///
/// A single symmetric pass fills per-document buffers, which are then
/// sorted descending by similarity with ties broken on the matched index
/// so that re-runs reproduce identical reports.
pub(crate) fn aggregate(
    documents: &[Document],
    resolved: &[(usize, usize, f64)],
    top_k: usize,
) -> HashMap<String, DocumentReport> {
    let mut buffers: Vec<Vec<(usize, f64)>> = vec![vec![]; documents.len()];
    for &(i, j, similarity) in resolved {
        buffers[i].push((j, similarity));
        buffers[j].push((i, similarity));
    }

    let mut reports = HashMap::with_capacity(documents.len());
    for (index, mut matches) in buffers.into_iter().enumerate() {
        matches.sort_unstable_by(|x, y| y.1.total_cmp(&x.1).then(x.0.cmp(&y.0)));
        let overall_score = matches.first().map_or(0., |&(_, s)| s);
        let top_matches = matches
            .iter()
            .take(top_k)
            .map(|&(m, s)| MatchResult {
                matched_id: documents[m].id.clone(),
                similarity: s,
                excerpt: Some(excerpt_of(&documents[m].text)),
            })
            .collect();
        let all_matches = matches
            .iter()
            .map(|&(m, s)| MatchResult {
                matched_id: documents[m].id.clone(),
                similarity: s,
                excerpt: None,
            })
            .collect();
        let document = &documents[index];
        reports.insert(
            document.id.clone(),
            DocumentReport {
                document_id: document.id.clone(),
                overall_score,
                top_matches,
                all_matches,
            },
        );
    }
    reports
}

fn excerpt_of(text: &str) -> String {
    let trimmed = text.trim();
    let mut chars = trimmed.chars();
    let mut excerpt: String = chars.by_ref().take(EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        excerpt.push('…');
    }
    excerpt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn documents() -> Vec<Document> {
        ["a", "b", "c", "d"]
            .iter()
            .map(|id| Document {
                id: id.to_string(),
                author_id: format!("author-{id}"),
                text: format!("text of {id}"),
            })
            .collect()
    }

    #[test]
    fn test_symmetric_entries() {
        let reports = aggregate(&documents(), &[(0, 1, 0.8)], 3);
        assert_eq!(reports["a"].all_matches[0].matched_id, "b");
        assert_eq!(reports["b"].all_matches[0].matched_id, "a");
        assert_eq!(reports["a"].overall_score, 0.8);
        assert_eq!(reports["b"].overall_score, 0.8);
    }

    #[test]
    fn test_matches_sorted_descending() {
        let resolved = vec![(0, 1, 0.3), (0, 2, 0.9), (0, 3, 0.6)];
        let reports = aggregate(&documents(), &resolved, 3);
        let ids: Vec<_> = reports["a"]
            .all_matches
            .iter()
            .map(|m| m.matched_id.as_str())
            .collect();
        assert_eq!(ids, vec!["c", "d", "b"]);
    }

    #[test]
    fn test_top_matches_are_bounded_and_carry_excerpts() {
        let resolved = vec![(0, 1, 0.3), (0, 2, 0.9), (0, 3, 0.6)];
        let reports = aggregate(&documents(), &resolved, 2);
        let report = &reports["a"];
        assert_eq!(report.top_matches.len(), 2);
        assert_eq!(report.all_matches.len(), 3);
        assert_eq!(report.top_matches[0].excerpt.as_deref(), Some("text of c"));
        assert!(report.all_matches.iter().all(|m| m.excerpt.is_none()));
    }

    #[test]
    fn test_unmatched_document_gets_empty_report() {
        let reports = aggregate(&documents(), &[(0, 1, 0.5)], 3);
        let report = &reports["c"];
        assert_eq!(report.overall_score, 0.);
        assert!(report.top_matches.is_empty());
        assert!(report.all_matches.is_empty());
    }

    #[test]
    fn test_tie_break_is_deterministic() {
        let resolved = vec![(0, 3, 0.5), (0, 1, 0.5), (0, 2, 0.5)];
        let reports = aggregate(&documents(), &resolved, 3);
        let ids: Vec<_> = reports["a"]
            .all_matches
            .iter()
            .map(|m| m.matched_id.as_str())
            .collect();
        assert_eq!(ids, vec!["b", "c", "d"]);
    }

    #[test]
    fn test_excerpt_truncation() {
        let long = "word ".repeat(100);
        let excerpt = excerpt_of(&long);
        assert_eq!(excerpt.chars().count(), EXCERPT_CHARS + 1);
        assert!(excerpt.ends_with('…'));
        assert_eq!(excerpt_of("short text"), "short text");
    }
}
