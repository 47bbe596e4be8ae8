//! Auto-categorizer: department scoring for the auto-assignment queue.
//!
//! Finer-grained than the classifier: seven departments, each with its own
//! keyword list and the grievance categories it expects.
//!
//!   score      = 10 × matches + 5 × multi-word matches + 15 if category expected
//!   confidence = clamp(score × 2, 10, 100)
//!
//! A winning score under 10 means no signal: the category's default
//! department is suggested at a fixed confidence of 40.

use crate::{
    keywords::{default_department, matches_in, DEPARTMENT_PROFILES, REFINEMENT_KEYWORDS},
    types::Category,
};
use serde::{Deserialize, Serialize};

const MATCH_POINTS: u32 = 10;
const PHRASE_POINTS: u32 = 5;
const CATEGORY_POINTS: u32 = 15;
const MIN_SIGNAL_SCORE: u32 = 10;
const FALLBACK_CONFIDENCE: f64 = 40.0;
const REFINEMENT_MIN_MATCHES: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssignmentAnalysis {
    pub detected_category: Category,
    pub suggested_department: String,
    /// 0–100.
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentScore {
    pub department: &'static str,
    pub score: u32,
    pub matches: Vec<&'static str>,
}

/// Score every department in definition order.
pub fn score_departments(text_lower: &str, category: Category) -> Vec<DepartmentScore> {
    DEPARTMENT_PROFILES
        .iter()
        .map(|profile| {
            let matches = matches_in(text_lower, profile.keywords);
            let phrases = matches.iter().filter(|kw| kw.contains(' ')).count() as u32;
            let category_bonus = if profile.categories.contains(&category) {
                CATEGORY_POINTS
            } else {
                0
            };
            DepartmentScore {
                department: profile.name,
                score: matches.len() as u32 * MATCH_POINTS + phrases * PHRASE_POINTS + category_bonus,
                matches,
            }
        })
        .collect()
}

pub fn analyze_for_assignment(description: &str, category: Category) -> AssignmentAnalysis {
    let text = description.to_lowercase();
    let scores = score_departments(&text, category);
    let (department, confidence) = choose_department(&scores, category);

    AssignmentAnalysis {
        detected_category: refine_category(&text, category),
        suggested_department: department.to_string(),
        confidence,
    }
}

/// First maximum in definition order wins. Below the signal floor the
/// category's default department is used instead.
pub(crate) fn choose_department(scores: &[DepartmentScore], category: Category) -> (&'static str, f64) {
    let mut best: Option<&DepartmentScore> = None;
    for s in scores {
        if best.map_or(true, |b| s.score > b.score) {
            best = Some(s);
        }
    }
    match best {
        Some(b) if b.score >= MIN_SIGNAL_SCORE => {
            (b.department, f64::from((b.score * 2).clamp(10, 100)))
        }
        _ => (default_department(category), FALLBACK_CONFIDENCE),
    }
}

/// Override the user's category only when a different one has at least two
/// hits in the refinement table. Ties keep the first category in table order.
pub fn refine_category(text_lower: &str, user_category: Category) -> Category {
    let mut best_category = user_category;
    let mut best_count = 0usize;
    for (category, keywords) in REFINEMENT_KEYWORDS {
        let count = matches_in(text_lower, keywords).len();
        if count > best_count {
            best_count = count;
            best_category = *category;
        }
    }
    if best_count >= REFINEMENT_MIN_MATCHES && best_category != user_category {
        best_category
    } else {
        user_category
    }
}
