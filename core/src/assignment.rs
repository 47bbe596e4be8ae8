//! Auto-assignment records, their status machine and the audit trail.
//!
//! STATE MACHINE:
//!   PENDING_APPROVAL ──approve──▶ APPROVED
//!   PENDING_APPROVAL ──reject───▶ REVIEW_REQUIRED
//!
//! REJECTED is a declared state that no current transition produces.
//! It is kept so persisted data and stats stay faithful to the schema.

use crate::types::{Category, ComplaintId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AutoStatus {
    PendingApproval,
    Approved,
    Rejected,
    ReviewRequired,
}

impl AutoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingApproval => "pending_approval",
            Self::Approved        => "approved",
            Self::Rejected        => "rejected",
            Self::ReviewRequired  => "review_required",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending_approval" => Some(Self::PendingApproval),
            "approved"         => Some(Self::Approved),
            "rejected"         => Some(Self::Rejected),
            "review_required"  => Some(Self::ReviewRequired),
            _                  => None,
        }
    }

    /// Whether the workflow may move a record from `self` to `to`.
    pub fn can_transition_to(&self, to: AutoStatus) -> bool {
        matches!(
            (self, to),
            (Self::PendingApproval, Self::Approved) | (Self::PendingApproval, Self::ReviewRequired)
        )
    }
}

impl fmt::Display for AutoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One per analysed complaint, created once and never duplicated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AutoAssignmentRecord {
    pub complaint_id: ComplaintId,
    pub auto_category: Category,
    pub suggested_department: String,
    /// Always within 0–100.
    pub confidence_score: f64,
    pub auto_status: AutoStatus,
    pub analyzed_at: DateTime<Utc>,
    pub keywords_matched: Vec<String>,
}

impl AutoAssignmentRecord {
    pub fn pending(
        complaint_id: ComplaintId,
        auto_category: Category,
        suggested_department: String,
        confidence_score: f64,
        analyzed_at: DateTime<Utc>,
        keywords_matched: Vec<String>,
    ) -> Self {
        Self {
            complaint_id,
            auto_category,
            suggested_department,
            confidence_score: confidence_score.clamp(0.0, 100.0),
            auto_status: AutoStatus::PendingApproval,
            analyzed_at,
            keywords_matched,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Approved,
    Rejected,
    Modified,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Modified => "modified",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "modified" => Some(Self::Modified),
            _          => None,
        }
    }
}

/// Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditLogEntry {
    pub complaint_id: ComplaintId,
    pub action: AuditAction,
    pub admin_id: String,
    pub admin_name: String,
    pub timestamp: DateTime<Utc>,
    /// The department the categorizer originally suggested.
    pub nlp_suggestion: String,
    pub final_department: Option<String>,
    pub confidence_score: f64,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AssignmentStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub review_required: usize,
    pub average_confidence: f64,
}
