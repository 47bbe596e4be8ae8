//! Complaint analytics for the admin dashboard.
//!
//! Pure counts over the complaint set:
//!   1. dashboard totals by status, priority and category
//!   2. the resolved / pending summary
//!   3. complaint volume per department

use crate::{
    complaint::Complaint,
    types::{Category, ComplaintStatus, Priority},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Department label for complaints with no department set.
pub const UNASSIGNED: &str = "Unassigned";

// ── Public types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct StatusCounts {
    pub submitted: usize,
    pub assigned: usize,
    pub in_progress: usize,
    pub resolved: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PriorityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DashboardStats {
    pub total: usize,
    pub by_status: StatusCounts,
    pub by_priority: PriorityCounts,
    /// Only categories with at least one complaint appear.
    pub by_category: BTreeMap<Category, usize>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AnalyticsSummary {
    pub total_complaints: usize,
    /// Everything not yet resolved, in-progress included.
    pub pending: usize,
    pub resolved: usize,
    pub in_progress: usize,
}

// ── Counting ─────────────────────────────────────────────────────────────────

pub fn dashboard_stats(complaints: &[Complaint]) -> DashboardStats {
    let mut stats = DashboardStats {
        total: complaints.len(),
        ..DashboardStats::default()
    };
    for c in complaints {
        match c.status {
            ComplaintStatus::Submitted  => stats.by_status.submitted += 1,
            ComplaintStatus::Assigned   => stats.by_status.assigned += 1,
            ComplaintStatus::InProgress => stats.by_status.in_progress += 1,
            ComplaintStatus::Resolved   => stats.by_status.resolved += 1,
        }
        match c.priority {
            Priority::High   => stats.by_priority.high += 1,
            Priority::Medium => stats.by_priority.medium += 1,
            Priority::Low    => stats.by_priority.low += 1,
        }
        *stats.by_category.entry(c.category).or_default() += 1;
    }
    stats
}

pub fn summary(complaints: &[Complaint]) -> AnalyticsSummary {
    let resolved = count_status(complaints, ComplaintStatus::Resolved);
    AnalyticsSummary {
        total_complaints: complaints.len(),
        pending: complaints.len() - resolved,
        resolved,
        in_progress: count_status(complaints, ComplaintStatus::InProgress),
    }
}

/// Complaint count per current department. Blank departments count as
/// [`UNASSIGNED`].
pub fn by_department(complaints: &[Complaint]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for c in complaints {
        let department = if c.department.trim().is_empty() {
            UNASSIGNED
        } else {
            c.department.as_str()
        };
        *counts.entry(department.to_string()).or_default() += 1;
    }
    counts
}

fn count_status(complaints: &[Complaint], status: ComplaintStatus) -> usize {
    complaints.iter().filter(|c| c.status == status).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn complaint(id: &str, category: Category, status: ComplaintStatus, priority: Priority, dept: &str) -> Complaint {
        let at = Utc.with_ymd_and_hms(2026, 2, 1, 10, 0, 0).unwrap();
        Complaint {
            id: id.into(),
            category,
            description: "Streetlight flickering all night near the park".into(),
            location: "Park Lane".into(),
            submitter_name: "Anonymous".into(),
            status,
            priority,
            department: dept.into(),
            ai_explanation: String::new(),
            keywords_found: vec![],
            is_duplicate: false,
            similar_to: None,
            duplicate_score: 0.0,
            timeline: vec![],
            created_at: at,
            updated_at: at,
        }
    }

    fn sample() -> Vec<Complaint> {
        vec![
            complaint("A", Category::Road, ComplaintStatus::Submitted, Priority::High, "Public Works Department (PWD)"),
            complaint("B", Category::Road, ComplaintStatus::Resolved, Priority::Medium, "Public Works Department (PWD)"),
            complaint("C", Category::Water, ComplaintStatus::InProgress, Priority::Low, "Water Supply & Sewerage Board"),
            complaint("D", Category::Others, ComplaintStatus::Assigned, Priority::Medium, "  "),
        ]
    }

    #[test]
    fn dashboard_counts_each_dimension() {
        let s = dashboard_stats(&sample());
        assert_eq!(s.total, 4);
        assert_eq!(
            s.by_status,
            StatusCounts { submitted: 1, assigned: 1, in_progress: 1, resolved: 1 }
        );
        assert_eq!(s.by_priority, PriorityCounts { high: 1, medium: 2, low: 1 });
        assert_eq!(s.by_category.get(&Category::Road), Some(&2));
        assert_eq!(s.by_category.get(&Category::Water), Some(&1));
        assert!(!s.by_category.contains_key(&Category::Sanitation));
    }

    #[test]
    fn pending_includes_in_progress() {
        let s = summary(&sample());
        assert_eq!(
            s,
            AnalyticsSummary { total_complaints: 4, pending: 3, resolved: 1, in_progress: 1 }
        );
        assert_eq!(summary(&[]), AnalyticsSummary::default());
    }

    #[test]
    fn blank_department_counts_as_unassigned() {
        let counts = by_department(&sample());
        assert_eq!(counts.get("Public Works Department (PWD)"), Some(&2));
        assert_eq!(counts.get("Water Supply & Sewerage Board"), Some(&1));
        assert_eq!(counts.get(UNASSIGNED), Some(&1));
    }

    #[test]
    fn dashboard_serializes_category_keys() {
        let json = serde_json::to_value(dashboard_stats(&sample())).unwrap();
        assert_eq!(json["by_category"]["road"], 2);
        assert_eq!(json["by_status"]["in_progress"], 1);
    }
}
