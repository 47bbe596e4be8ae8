//! Duplicate complaint detection.
//!
//! Jaccard similarity over word sets, plus a flat bonus when both
//! complaints name the same location.

use crate::types::{Category, ComplaintId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_DUPLICATE_THRESHOLD: f64 = 0.4;
pub const LOCATION_BONUS: f64 = 0.15;

/// An existing complaint from the same category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateCandidate {
    pub id: ComplaintId,
    pub description: String,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DuplicateCheckResult {
    pub is_duplicate: bool,
    pub similar_complaint_id: Option<ComplaintId>,
    /// Best combined score as a percentage, one decimal.
    pub similarity_score: f64,
    pub message: String,
}

const UNIQUE_MESSAGE: &str = "No similar complaints found. Your grievance is unique.";

/// Lower-case, non-alphanumerics to spaces, split, drop tokens of ≤2 chars.
pub fn tokenize(text: &str) -> HashSet<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned
        .split_whitespace()
        .filter(|w| w.chars().count() > 2)
        .map(str::to_string)
        .collect()
}

pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let set_a = tokenize(a);
    let set_b = tokenize(b);
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    intersection as f64 / union as f64
}

fn same_location(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && a.to_lowercase() == b.to_lowercase()
}

/// Compare a new complaint against existing ones of the same category.
///
/// The category is carried for the caller's bookkeeping; candidates must
/// already be filtered to it. Ties keep the earliest candidate.
pub fn check_duplicate(
    description: &str,
    _category: Category,
    candidates: &[DuplicateCandidate],
    location: &str,
    threshold: f64,
) -> DuplicateCheckResult {
    if candidates.is_empty() {
        return DuplicateCheckResult {
            is_duplicate: false,
            similar_complaint_id: None,
            similarity_score: 0.0,
            message: UNIQUE_MESSAGE.to_string(),
        };
    }

    let mut best = 0.0_f64;
    let mut best_id: Option<&str> = None;
    for candidate in candidates {
        let text = jaccard_similarity(description, &candidate.description);
        let bonus = if same_location(location, &candidate.location) {
            LOCATION_BONUS
        } else {
            0.0
        };
        let combined = (text + bonus).min(1.0);
        if combined > best {
            best = combined;
            best_id = Some(candidate.id.as_str());
        }
    }

    let score = round1(best * 100.0);
    if best >= threshold {
        let id = best_id.unwrap_or("unknown");
        DuplicateCheckResult {
            is_duplicate: true,
            message: format!(
                "A similar grievance already exists (ID: {id}). Similarity: {score}%. \
                 You may track the existing complaint instead of submitting a new one."
            ),
            similar_complaint_id: best_id.map(String::from),
            similarity_score: score,
        }
    } else {
        DuplicateCheckResult {
            is_duplicate: false,
            similar_complaint_id: None,
            similarity_score: score,
            message: UNIQUE_MESSAGE.to_string(),
        }
    }
}

pub(crate) fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, description: &str, location: &str) -> DuplicateCandidate {
        DuplicateCandidate {
            id: id.into(),
            description: description.into(),
            location: location.into(),
        }
    }

    #[test]
    fn tokenize_drops_short_words_and_punctuation() {
        let tokens = tokenize("A pipe, IS leaking!! on 5th-street");
        let expected: HashSet<String> = ["pipe", "leaking", "5th", "street"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(tokens, expected);
    }

    #[test]
    fn word_order_does_not_change_similarity() {
        let a = jaccard_similarity("water pipe leakage near market", "market pipe broken");
        let b = jaccard_similarity("market near leakage pipe water", "broken pipe market");
        assert_eq!(a, b);
    }

    #[test]
    fn empty_token_set_scores_zero() {
        assert_eq!(jaccard_similarity("a an of", "water pipe"), 0.0);
    }

    #[test]
    fn no_candidates_is_never_duplicate() {
        let r = check_duplicate("water pipe leakage", Category::Water, &[], "Sector 5", 0.4);
        assert!(!r.is_duplicate);
        assert_eq!(r.similarity_score, 0.0);
        assert!(r.similar_complaint_id.is_none());
    }

    #[test]
    fn same_location_pushes_over_threshold() {
        let existing = vec![candidate("CSP-1", "water pipe leakage near market", "Sector 5")];
        let r = check_duplicate(
            "pipe leaking water close to market area",
            Category::Water,
            &existing,
            "sector 5",
            DEFAULT_DUPLICATE_THRESHOLD,
        );
        // 3 shared / 8 total = 0.375, + 0.15 location bonus.
        assert!(r.is_duplicate);
        assert_eq!(r.similar_complaint_id.as_deref(), Some("CSP-1"));
        assert_eq!(r.similarity_score, 52.5);
    }

    #[test]
    fn different_location_stays_below_threshold() {
        let existing = vec![candidate("CSP-1", "water pipe leakage near market", "Sector 9")];
        let r = check_duplicate(
            "pipe leaking water close to market area",
            Category::Water,
            &existing,
            "Sector 5",
            DEFAULT_DUPLICATE_THRESHOLD,
        );
        assert!(!r.is_duplicate);
        assert_eq!(r.similarity_score, 37.5);
    }

    #[test]
    fn ties_keep_first_candidate() {
        let existing = vec![
            candidate("CSP-A", "garbage dump behind school", ""),
            candidate("CSP-B", "garbage dump behind school", ""),
        ];
        let r = check_duplicate("garbage dump behind school", Category::Sanitation, &existing, "", 0.4);
        assert_eq!(r.similar_complaint_id.as_deref(), Some("CSP-A"));
        assert_eq!(r.similarity_score, 100.0);
    }

    #[test]
    fn combined_score_is_capped() {
        let existing = vec![candidate("CSP-A", "garbage dump behind school", "Ward 3")];
        let r = check_duplicate("garbage dump behind school", Category::Sanitation, &existing, "WARD 3", 0.4);
        assert_eq!(r.similarity_score, 100.0);
    }
}
