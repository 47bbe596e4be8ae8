//! Rule-based grievance classifier.
//!
//! Maps free text to a category, a priority and a department using the
//! keyword tables in `keywords.rs`. Pure: identical input, identical output.

use crate::{
    keywords::{default_department, matches_in, CATEGORY_KEYWORDS, PRIORITY_KEYWORDS},
    types::{Category, Priority},
};
use serde::{Deserialize, Serialize};

/// A detection below this many category-keyword hits is discarded in favour
/// of the category the citizen selected.
pub const MIN_CATEGORY_MATCHES: usize = 2;

/// How many keywords the explanation names at most.
const EXPLANATION_KEYWORD_LIMIT: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassificationResult {
    pub detected_category: Category,
    pub priority: Priority,
    pub department: String,
    pub explanation: String,
    pub keywords_found: Vec<String>,
}

pub fn classify(description: &str, selected: Category) -> ClassificationResult {
    let text = description.to_lowercase();

    // Strict `>` keeps the first category in table order on ties.
    let mut detected = selected;
    let mut best_count = 0usize;
    let mut category_hits: Vec<&str> = Vec::new();
    for (category, keywords) in CATEGORY_KEYWORDS {
        let hits = matches_in(&text, keywords);
        if hits.len() > best_count {
            best_count = hits.len();
            detected = *category;
            category_hits = hits;
        }
    }
    if best_count < MIN_CATEGORY_MATCHES {
        detected = selected;
    }

    let (priority, priority_hits) = detect_priority(&text);

    let mut keywords_found: Vec<String> = Vec::new();
    for kw in category_hits.into_iter().chain(priority_hits) {
        if !keywords_found.iter().any(|k| k == kw) {
            keywords_found.push(kw.to_string());
        }
    }

    let explanation = explain(detected, priority, &keywords_found);

    ClassificationResult {
        detected_category: detected,
        priority,
        department: default_department(detected).to_string(),
        explanation,
        keywords_found,
    }
}

/// HIGH beats MEDIUM beats the LOW default. LOW matches are still reported.
fn detect_priority(text: &str) -> (Priority, Vec<&'static str>) {
    let mut low_hits = Vec::new();
    for (tier, keywords) in PRIORITY_KEYWORDS {
        let hits = matches_in(text, keywords);
        match tier {
            Priority::Low => low_hits = hits,
            _ if !hits.is_empty() => return (*tier, hits),
            _ => {}
        }
    }
    (Priority::Low, low_hits)
}

fn explain(category: Category, priority: Priority, keywords: &[String]) -> String {
    if keywords.is_empty() {
        return format!(
            "Classified as {} with {} priority based on general content analysis.",
            category.title(),
            priority.as_str().to_uppercase(),
        );
    }

    let named = keywords
        .iter()
        .take(EXPLANATION_KEYWORD_LIMIT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    let reason = match priority {
        Priority::High => {
            "This is marked HIGH priority due to safety-related or emergency keywords detected."
        }
        Priority::Medium => {
            "This is marked MEDIUM priority as it involves utility or service-related issues."
        }
        Priority::Low => {
            "This is marked LOW priority as it appears to be a general request or feedback."
        }
    };

    format!("AI Analysis: Keywords detected - [{named}]. {reason}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::{DEPT_GENERAL_ADMIN, DEPT_PUBLIC_WORKS};

    #[test]
    fn pothole_report_overrides_selected_category() {
        let r = classify(
            "Large pothole on Main Street causing accidents, urgent repair needed",
            Category::Others,
        );
        assert_eq!(r.detected_category, Category::Road);
        assert_eq!(r.priority, Priority::High);
        assert_eq!(r.department, DEPT_PUBLIC_WORKS);
        assert!(r.keywords_found.contains(&"pothole".to_string()));
        assert!(r.keywords_found.contains(&"urgent".to_string()));
    }

    #[test]
    fn single_keyword_falls_back_to_selection() {
        let r = classify("The bridge near my house looks odd", Category::Sanitation);
        assert_eq!(r.detected_category, Category::Sanitation);
    }

    #[test]
    fn medium_tier_when_no_high_keyword() {
        let r = classify("Garbage pickup has had a delay of several days", Category::Sanitation);
        assert_eq!(r.priority, Priority::Medium);
    }

    #[test]
    fn low_matches_recorded_but_priority_defaults_low() {
        let r = classify("A suggestion for the community notice board", Category::Others);
        assert_eq!(r.priority, Priority::Low);
        assert_eq!(r.keywords_found, vec!["suggestion".to_string()]);
        assert!(r.explanation.contains("LOW priority"));
    }

    #[test]
    fn no_keywords_gives_generic_explanation() {
        let r = classify("Something odd is happening around here", Category::HealthSafety);
        assert!(r.keywords_found.is_empty());
        assert_eq!(
            r.explanation,
            "Classified as Health Safety with LOW priority based on general content analysis."
        );
        let r = classify("Something odd is happening around here", Category::Others);
        assert_eq!(r.department, DEPT_GENERAL_ADMIN);
    }

    #[test]
    fn explanation_names_at_most_five_keywords() {
        let r = classify(
            "road pothole street highway footpath pavement traffic bridge",
            Category::Road,
        );
        assert!(r.keywords_found.len() > 5);
        let inside = r
            .explanation
            .split('[')
            .nth(1)
            .and_then(|s| s.split(']').next())
            .unwrap_or_default();
        assert_eq!(inside.split(", ").count(), 5);
    }

    #[test]
    fn keywords_are_deduplicated() {
        // "hospital" is both a category and a HIGH priority keyword.
        let r = classify("hospital clinic doctor unavailable", Category::Others);
        let count = r.keywords_found.iter().filter(|k| *k == "hospital").count();
        assert_eq!(count, 1);
    }

    #[test]
    fn classification_is_reproducible() {
        let text = "Water pipe leakage near the school, children at risk";
        assert_eq!(classify(text, Category::Water), classify(text, Category::Water));
    }
}
