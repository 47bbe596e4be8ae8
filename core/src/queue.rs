//! Queue builder: sync and the filtered, sorted auto-assignment queue.
//!
//! Sync analyses every SUBMITTED complaint that has no record yet.
//! Listing joins complaints with their records and applies, in order:
//!   1. status filter
//!   2. age filter (older than the review window is dropped)
//!   3. confidence lower / upper bounds
//!   4. department filter
//! then sorts oldest first, most confident first within a day.

use crate::{
    assignment::{AutoAssignmentRecord, AutoStatus},
    categorizer::analyze_for_assignment,
    complaint::Complaint,
    error::{DeskError, DeskResult},
    store::AssignmentStore,
    types::{Category, ComplaintId, ComplaintStatus, Priority},
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QueueFilter {
    pub status: Option<AutoStatus>,
    /// Overrides the configured review window for this query.
    pub days: Option<u32>,
    pub min_confidence: Option<f64>,
    pub max_confidence: Option<f64>,
    pub department: Option<String>,
}

impl QueueFilter {
    pub fn validate(&self) -> DeskResult<()> {
        for (name, bound) in [("min_confidence", self.min_confidence), ("max_confidence", self.max_confidence)] {
            if let Some(v) = bound {
                if !(0.0..=100.0).contains(&v) {
                    return Err(DeskError::Validation(format!(
                        "{name} must be between 0 and 100, got {v}"
                    )));
                }
            }
        }
        if let (Some(lo), Some(hi)) = (self.min_confidence, self.max_confidence) {
            if lo > hi {
                return Err(DeskError::Validation(format!(
                    "min_confidence ({lo}) exceeds max_confidence ({hi})"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueueItem {
    pub complaint_id: ComplaintId,
    pub complaint_summary: String,
    pub location: String,
    pub nlp_category: Category,
    pub suggested_department: String,
    pub confidence_score: f64,
    pub days_since_submission: i64,
    pub current_status: AutoStatus,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub keywords_found: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct QueueResult {
    pub items: Vec<QueueItem>,
    pub total: usize,
    pub pending_count: usize,
    pub approved_count: usize,
    /// Counts REJECTED only; REVIEW_REQUIRED items are not included.
    pub rejected_count: usize,
}

/// Records that a sync would create: one per SUBMITTED complaint without
/// an existing record, in complaint order.
pub fn plan_sync(
    complaints: &[Complaint],
    existing: &HashSet<ComplaintId>,
    now: DateTime<Utc>,
) -> Vec<AutoAssignmentRecord> {
    complaints
        .iter()
        .filter(|c| c.status == ComplaintStatus::Submitted && !existing.contains(&c.id))
        .map(|c| {
            let analysis = analyze_for_assignment(&c.description, c.category);
            log::debug!(
                "sync: {} -> {} ({}%)",
                c.id,
                analysis.suggested_department,
                analysis.confidence
            );
            AutoAssignmentRecord::pending(
                c.id.clone(),
                analysis.detected_category,
                analysis.suggested_department,
                analysis.confidence,
                now,
                c.keywords_found.clone(),
            )
        })
        .collect()
}

/// Analyse and record every SUBMITTED complaint without a record.
/// Returns how many records this call created. Safe to repeat.
pub fn sync_queue(
    store: &AssignmentStore,
    complaints: &[Complaint],
    now: DateTime<Utc>,
) -> usize {
    let existing = store.record_ids();
    let created = plan_sync(complaints, &existing, now)
        .into_iter()
        .filter(|record| store.create_if_absent(record.clone()))
        .count();
    if created > 0 {
        log::info!("sync: {created} complaint(s) added to the auto-assignment queue");
    }
    created
}

/// Build the queue view. `review_window_days` is the configured default,
/// used when the filter carries no `days` override.
pub fn list_queue(
    complaints: &[Complaint],
    records: &[AutoAssignmentRecord],
    filter: &QueueFilter,
    review_window_days: u32,
    now: DateTime<Utc>,
) -> DeskResult<QueueResult> {
    filter.validate()?;

    let by_id: HashMap<&str, &AutoAssignmentRecord> =
        records.iter().map(|r| (r.complaint_id.as_str(), r)).collect();
    let window = filter.days.unwrap_or(review_window_days);
    let cutoff = Duration::try_days(i64::from(window))
        .and_then(|span| now.checked_sub_signed(span))
        .ok_or_else(|| DeskError::Validation(format!("days out of range: {window}")))?;

    let mut result = QueueResult::default();
    for complaint in complaints {
        let Some(record) = by_id.get(complaint.id.as_str()) else {
            continue;
        };
        if filter.status.is_some_and(|s| s != record.auto_status) {
            continue;
        }
        if complaint.created_at < cutoff {
            continue;
        }
        if filter.min_confidence.is_some_and(|lo| record.confidence_score < lo) {
            continue;
        }
        if filter.max_confidence.is_some_and(|hi| record.confidence_score > hi) {
            continue;
        }
        if filter
            .department
            .as_deref()
            .is_some_and(|d| !d.is_empty() && d != record.suggested_department)
        {
            continue;
        }

        match record.auto_status {
            AutoStatus::PendingApproval => result.pending_count += 1,
            AutoStatus::Approved        => result.approved_count += 1,
            AutoStatus::Rejected        => result.rejected_count += 1,
            AutoStatus::ReviewRequired  => {}
        }

        result.items.push(QueueItem {
            complaint_id: complaint.id.clone(),
            complaint_summary: complaint.summary(),
            location: complaint.location.clone(),
            nlp_category: record.auto_category,
            suggested_department: record.suggested_department.clone(),
            confidence_score: record.confidence_score,
            days_since_submission: (now - complaint.created_at).num_days(),
            current_status: record.auto_status,
            priority: complaint.priority,
            created_at: complaint.created_at,
            keywords_found: record.keywords_matched.clone(),
        });
    }

    result.items.sort_by(|a, b| {
        b.days_since_submission
            .cmp(&a.days_since_submission)
            .then(b.confidence_score.total_cmp(&a.confidence_score))
    });
    result.total = result.items.len();
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 30, 12, 0, 0).unwrap()
    }

    fn complaint(id: &str, days_old: i64, status: ComplaintStatus) -> Complaint {
        let created = now() - Duration::days(days_old);
        Complaint {
            id: id.into(),
            category: Category::Road,
            description: "Pothole on the main road near the bridge".into(),
            location: "Ward 4".into(),
            submitter_name: "Anonymous".into(),
            status,
            priority: Priority::Medium,
            department: "Public Works Department (PWD)".into(),
            ai_explanation: String::new(),
            keywords_found: vec!["pothole".into()],
            is_duplicate: false,
            similar_to: None,
            duplicate_score: 0.0,
            timeline: vec![],
            created_at: created,
            updated_at: created,
        }
    }

    fn record(id: &str, confidence: f64, status: AutoStatus) -> AutoAssignmentRecord {
        AutoAssignmentRecord {
            complaint_id: id.into(),
            auto_category: Category::Road,
            suggested_department: "Public Works Department (PWD)".into(),
            confidence_score: confidence,
            auto_status: status,
            analyzed_at: now(),
            keywords_matched: vec![],
        }
    }

    #[test]
    fn plan_skips_non_submitted_and_existing() {
        let complaints = vec![
            complaint("A", 1, ComplaintStatus::Submitted),
            complaint("B", 1, ComplaintStatus::Assigned),
            complaint("C", 1, ComplaintStatus::Submitted),
        ];
        let existing: HashSet<ComplaintId> = ["C".to_string()].into();
        let plan = plan_sync(&complaints, &existing, now());
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].complaint_id, "A");
        assert_eq!(plan[0].auto_status, AutoStatus::PendingApproval);
        assert_eq!(plan[0].keywords_matched, vec!["pothole".to_string()]);
    }

    #[test]
    fn min_confidence_excludes_lower_scores() {
        let complaints = vec![complaint("A", 1, ComplaintStatus::Submitted)];
        let records = vec![record("A", 85.0, AutoStatus::PendingApproval)];
        let filter = QueueFilter { min_confidence: Some(90.0), ..Default::default() };
        let q = list_queue(&complaints, &records, &filter, 20, now()).unwrap();
        assert_eq!(q.total, 0);
        assert!(q.items.is_empty());
    }

    #[test]
    fn sorted_oldest_then_most_confident() {
        let complaints = vec![
            complaint("A", 2, ComplaintStatus::Submitted),
            complaint("B", 5, ComplaintStatus::Submitted),
            complaint("C", 2, ComplaintStatus::Submitted),
        ];
        let records = vec![
            record("A", 50.0, AutoStatus::PendingApproval),
            record("B", 30.0, AutoStatus::PendingApproval),
            record("C", 90.0, AutoStatus::PendingApproval),
        ];
        let q = list_queue(&complaints, &records, &QueueFilter::default(), 20, now()).unwrap();
        let order: Vec<&str> = q.items.iter().map(|i| i.complaint_id.as_str()).collect();
        assert_eq!(order, vec!["B", "C", "A"]);
        assert_eq!(q.items[0].days_since_submission, 5);
    }

    #[test]
    fn review_window_drops_old_items_and_override_widens_it() {
        let complaints = vec![
            complaint("OLD", 30, ComplaintStatus::Submitted),
            complaint("NEW", 3, ComplaintStatus::Submitted),
        ];
        let records = vec![
            record("OLD", 70.0, AutoStatus::PendingApproval),
            record("NEW", 70.0, AutoStatus::PendingApproval),
        ];
        let q = list_queue(&complaints, &records, &QueueFilter::default(), 20, now()).unwrap();
        assert_eq!(q.total, 1);
        assert_eq!(q.items[0].complaint_id, "NEW");

        let wide = QueueFilter { days: Some(45), ..Default::default() };
        let q = list_queue(&complaints, &records, &wide, 20, now()).unwrap();
        assert_eq!(q.total, 2);
    }

    #[test]
    fn counts_cover_filtered_set() {
        let complaints = vec![
            complaint("A", 1, ComplaintStatus::Submitted),
            complaint("B", 1, ComplaintStatus::Assigned),
            complaint("C", 1, ComplaintStatus::Submitted),
            complaint("D", 1, ComplaintStatus::Submitted),
        ];
        let records = vec![
            record("A", 70.0, AutoStatus::PendingApproval),
            record("B", 70.0, AutoStatus::Approved),
            record("C", 70.0, AutoStatus::ReviewRequired),
            record("D", 70.0, AutoStatus::Rejected),
        ];
        let q = list_queue(&complaints, &records, &QueueFilter::default(), 20, now()).unwrap();
        assert_eq!((q.total, q.pending_count, q.approved_count, q.rejected_count), (4, 1, 1, 1));

        let only_pending = QueueFilter { status: Some(AutoStatus::PendingApproval), ..Default::default() };
        let q = list_queue(&complaints, &records, &only_pending, 20, now()).unwrap();
        assert_eq!((q.total, q.pending_count, q.approved_count), (1, 1, 0));
    }

    #[test]
    fn department_filter_matches_suggestion() {
        let complaints = vec![complaint("A", 1, ComplaintStatus::Submitted)];
        let records = vec![record("A", 70.0, AutoStatus::PendingApproval)];
        let other = QueueFilter { department: Some("Electricity Board".into()), ..Default::default() };
        assert_eq!(list_queue(&complaints, &records, &other, 20, now()).unwrap().total, 0);
        let same = QueueFilter {
            department: Some("Public Works Department (PWD)".into()),
            ..Default::default()
        };
        assert_eq!(list_queue(&complaints, &records, &same, 20, now()).unwrap().total, 1);
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let filter = QueueFilter {
            min_confidence: Some(80.0),
            max_confidence: Some(20.0),
            ..Default::default()
        };
        let err = list_queue(&[], &[], &filter, 20, now()).unwrap_err();
        assert!(matches!(err, DeskError::Validation(_)));

        let filter = QueueFilter { max_confidence: Some(150.0), ..Default::default() };
        assert!(list_queue(&[], &[], &filter, 20, now()).is_err());
    }

    #[test]
    fn oversized_days_override_is_rejected() {
        let complaints = vec![complaint("A", 1, ComplaintStatus::Submitted)];
        let records = vec![record("A", 70.0, AutoStatus::PendingApproval)];
        let filter = QueueFilter { days: Some(200_000_000), ..Default::default() };
        let err = list_queue(&complaints, &records, &filter, 20, now()).unwrap_err();
        assert!(matches!(err, DeskError::Validation(_)));

        let filter = QueueFilter { days: Some(u32::MAX), ..Default::default() };
        assert!(list_queue(&complaints, &records, &filter, 20, now()).is_err());

        let filter = QueueFilter { days: Some(36_500), ..Default::default() };
        assert_eq!(list_queue(&complaints, &records, &filter, 20, now()).unwrap().total, 1);
    }

    #[test]
    fn long_descriptions_are_truncated() {
        let mut c = complaint("A", 1, ComplaintStatus::Submitted);
        c.description = "x".repeat(250);
        let q = list_queue(&[c], &[record("A", 70.0, AutoStatus::PendingApproval)], &QueueFilter::default(), 20, now())
            .unwrap();
        let summary = &q.items[0].complaint_summary;
        assert_eq!(summary.len(), 203);
        assert!(summary.ends_with("..."));
    }
}
