//! Complaint records and the grievance-store contract.
//!
//! The grievance store owns complaints. The auto-assignment subsystem only
//! reads them and patches `department`, `status`, `updated_at` and `timeline`.

use crate::{
    duplicate::DuplicateCandidate,
    error::DeskResult,
    types::{Category, ComplaintId, ComplaintStatus, Priority},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineEntry {
    pub status: ComplaintStatus,
    pub timestamp: DateTime<Utc>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Complaint {
    pub id: ComplaintId,
    pub category: Category,
    pub description: String,
    pub location: String,
    pub submitter_name: String,
    pub status: ComplaintStatus,
    pub priority: Priority,
    pub department: String,
    pub ai_explanation: String,
    pub keywords_found: Vec<String>,
    pub is_duplicate: bool,
    pub similar_to: Option<ComplaintId>,
    /// Similarity percentage against `similar_to`.
    pub duplicate_score: f64,
    pub timeline: Vec<TimelineEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Complaint {
    /// First 200 characters, with an ellipsis when truncated.
    pub fn summary(&self) -> String {
        const SUMMARY_CHARS: usize = 200;
        if self.description.chars().count() > SUMMARY_CHARS {
            let head: String = self.description.chars().take(SUMMARY_CHARS).collect();
            format!("{head}...")
        } else {
            self.description.clone()
        }
    }
}

/// What the auto-assignment core needs from whoever owns complaints.
///
/// RULE: Implementations must make each method atomic for a single id.
/// A failed write leaves the complaint exactly as it was.
pub trait GrievanceStore: Send + Sync {
    fn insert_complaint(&self, complaint: &Complaint) -> DeskResult<()>;

    fn get_complaint(&self, id: &str) -> DeskResult<Option<Complaint>>;

    /// Every complaint, oldest first.
    fn all_complaints(&self) -> DeskResult<Vec<Complaint>>;

    /// Route the complaint to `department`. With `advance`, also move it to
    /// that status and append a timeline entry carrying the remark. Both
    /// changes land together or not at all. `None` if the id is unknown.
    fn assign(
        &self,
        id: &str,
        department: &str,
        advance: Option<(ComplaintStatus, &str)>,
        at: DateTime<Utc>,
    ) -> DeskResult<Option<Complaint>>;

    /// Set the status and append a timeline entry. `None` if the id is unknown.
    fn update_status(
        &self,
        id: &str,
        status: ComplaintStatus,
        remarks: Option<&str>,
        at: DateTime<Utc>,
    ) -> DeskResult<Option<Complaint>>;

    /// Duplicate-check candidates: every complaint filed under `category`.
    fn descriptions_for_category(&self, category: Category) -> DeskResult<Vec<DuplicateCandidate>> {
        Ok(self
            .all_complaints()?
            .into_iter()
            .filter(|c| c.category == category)
            .map(|c| DuplicateCandidate {
                id: c.id,
                description: c.description,
                location: c.location,
            })
            .collect())
    }
}
