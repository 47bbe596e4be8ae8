//! Approval workflow: approve, reject and bulk over the auto-assignment queue.
//!
//! Every transition goes through `AssignmentStore::transition_with`, so the
//! status check, the complaint patch, the status change and the audit append
//! happen under one lock. Lock order is always assignment store first, then
//! the grievance store.

use crate::{
    assignment::{AuditAction, AuditLogEntry, AutoAssignmentRecord, AutoStatus},
    complaint::{Complaint, GrievanceStore},
    error::{DeskError, DeskResult},
    store::AssignmentStore,
    types::{ComplaintId, ComplaintStatus, Principal},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const BULK_APPROVE_REMARKS: &str = "Bulk approved";
pub const BULK_REJECT_REMARKS: &str = "Bulk rejected";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApprovalOutcome {
    pub complaint: Complaint,
    pub record: AutoAssignmentRecord,
    pub audit: AuditLogEntry,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RejectionOutcome {
    pub record: AutoAssignmentRecord,
    pub audit: AuditLogEntry,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    Approve,
    Reject,
}

impl BulkAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject  => "reject",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "approve" => Some(Self::Approve),
            "reject"  => Some(Self::Reject),
            _         => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BulkFailure {
    pub complaint_id: ComplaintId,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BulkResult {
    pub action: BulkAction,
    pub success_count: usize,
    pub failed_count: usize,
    pub failures: Vec<BulkFailure>,
}

fn timeline_remark(department: &str, confidence: f64, remarks: Option<&str>) -> String {
    let mut text = format!("Auto-assigned to {department} (AI confidence: {confidence:.1}%)");
    if let Some(notes) = remarks.filter(|r| !r.trim().is_empty()) {
        text.push_str(&format!(". Admin notes: {notes}"));
    }
    text
}

fn audit_entry(
    record: &AutoAssignmentRecord,
    action: AuditAction,
    final_department: Option<String>,
    remarks: Option<&str>,
    actor: &Principal,
    now: DateTime<Utc>,
) -> AuditLogEntry {
    AuditLogEntry {
        complaint_id: record.complaint_id.clone(),
        action,
        admin_id: actor.id.clone(),
        admin_name: actor.display_name(),
        timestamp: now,
        nlp_suggestion: record.suggested_department.clone(),
        final_department,
        confidence_score: record.confidence_score,
        remarks: remarks.map(String::from),
    }
}

/// Confirm (or override) the suggested department.
///
/// The complaint's department is always set to `department`. Its status moves
/// to ASSIGNED only while it is still SUBMITTED.
pub fn approve(
    grievances: &dyn GrievanceStore,
    assignments: &AssignmentStore,
    complaint_id: &str,
    department: &str,
    remarks: Option<&str>,
    actor: &Principal,
    now: DateTime<Utc>,
) -> DeskResult<ApprovalOutcome> {
    if department.trim().is_empty() {
        return Err(DeskError::Validation("department is required to approve".into()));
    }
    if grievances.get_complaint(complaint_id)?.is_none() {
        return Err(DeskError::complaint_not_found(complaint_id));
    }

    let (record, audit, complaint) =
        assignments.transition_with(complaint_id, "approve", AutoStatus::Approved, |record| {
            let current = grievances
                .get_complaint(complaint_id)?
                .ok_or_else(|| DeskError::complaint_not_found(complaint_id))?;
            let remark = (current.status == ComplaintStatus::Submitted)
                .then(|| timeline_remark(department, record.confidence_score, remarks));
            let advance = remark.as_deref().map(|r| (ComplaintStatus::Assigned, r));
            let complaint = grievances
                .assign(complaint_id, department, advance, now)?
                .ok_or_else(|| DeskError::complaint_not_found(complaint_id))?;

            let entry = audit_entry(
                record,
                AuditAction::Approved,
                Some(department.to_string()),
                remarks,
                actor,
                now,
            );
            Ok((complaint, entry))
        })?;

    log::info!(
        "approve: {complaint_id} -> {department} by {} (suggested {})",
        audit.admin_name,
        audit.nlp_suggestion
    );
    Ok(ApprovalOutcome { complaint, record, audit })
}

/// Park the record for manual handling. The complaint itself is not touched.
pub fn reject(
    grievances: &dyn GrievanceStore,
    assignments: &AssignmentStore,
    complaint_id: &str,
    reason: Option<&str>,
    actor: &Principal,
    now: DateTime<Utc>,
) -> DeskResult<RejectionOutcome> {
    if grievances.get_complaint(complaint_id)?.is_none() {
        return Err(DeskError::complaint_not_found(complaint_id));
    }

    let (record, audit, ()) =
        assignments.transition_with(complaint_id, "reject", AutoStatus::ReviewRequired, |record| {
            Ok(((), audit_entry(record, AuditAction::Rejected, None, reason, actor, now)))
        })?;

    log::info!("reject: {complaint_id} parked for review by {}", audit.admin_name);
    Ok(RejectionOutcome { record, audit })
}

/// Apply one action to many ids. Each id succeeds or fails on its own.
///
/// Approve needs `department`, shared by every id in the batch. Missing
/// remarks default to "Bulk approved" / "Bulk rejected".
#[allow(clippy::too_many_arguments)]
pub fn bulk(
    grievances: &dyn GrievanceStore,
    assignments: &AssignmentStore,
    complaint_ids: &[ComplaintId],
    action: BulkAction,
    department: Option<&str>,
    remarks: Option<&str>,
    actor: &Principal,
    now: DateTime<Utc>,
) -> DeskResult<BulkResult> {
    // Some(department) for approve, None for reject.
    let approve_to = match action {
        BulkAction::Approve => Some(
            department
                .filter(|d| !d.trim().is_empty())
                .ok_or_else(|| DeskError::Validation("department is required for bulk approve".into()))?,
        ),
        BulkAction::Reject => None,
    };

    let mut result = BulkResult {
        action,
        success_count: 0,
        failed_count: 0,
        failures: Vec::new(),
    };

    for id in complaint_ids {
        let outcome = match approve_to {
            Some(dept) => approve(
                grievances,
                assignments,
                id,
                dept,
                Some(remarks.unwrap_or(BULK_APPROVE_REMARKS)),
                actor,
                now,
            )
            .map(|_| ()),
            None => reject(
                grievances,
                assignments,
                id,
                Some(remarks.unwrap_or(BULK_REJECT_REMARKS)),
                actor,
                now,
            )
            .map(|_| ()),
        };
        match outcome {
            Ok(()) => result.success_count += 1,
            Err(e) => {
                log::warn!("bulk {}: {id} failed: {e}", action.as_str());
                result.failed_count += 1;
                result.failures.push(BulkFailure {
                    complaint_id: id.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    log::info!(
        "bulk {}: {} succeeded, {} failed",
        action.as_str(),
        result.success_count,
        result.failed_count
    );
    Ok(result)
}
