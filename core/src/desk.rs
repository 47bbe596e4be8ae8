//! The grievance desk: one handle over both stores, the clock and config.
//!
//! Built once at process start and passed by reference into every request.
//! Queue listing and stats run a sync first so freshly submitted
//! complaints always show up.

use crate::{
    analytics::{self, AnalyticsSummary, DashboardStats},
    assignment::{AssignmentStats, AuditLogEntry, AutoAssignmentRecord},
    categorizer::{self, AssignmentAnalysis},
    classifier::{self, ClassificationResult},
    clock::Clock,
    complaint::{Complaint, GrievanceStore},
    config::{AssignmentConfig, DeskConfig},
    duplicate::{self, DuplicateCheckResult},
    error::{DeskError, DeskResult},
    intake::{self, Submission, SubmissionReceipt},
    keywords::all_departments,
    queue::{self, QueueFilter, QueueResult},
    store::{AssignmentStore, ComplaintStore},
    types::{Category, ComplaintId, ComplaintStatus, Principal},
    workflow::{self, ApprovalOutcome, BulkAction, BulkResult, RejectionOutcome},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssignmentDetail {
    pub complaint: Complaint,
    pub record: AutoAssignmentRecord,
    pub audit_logs: Vec<AuditLogEntry>,
}

pub struct GrievanceDesk {
    grievances:  Box<dyn GrievanceStore>,
    assignments: AssignmentStore,
    clock:       Clock,
    config:      DeskConfig,
}

impl GrievanceDesk {
    pub fn new(
        grievances: Box<dyn GrievanceStore>,
        assignments: AssignmentStore,
        clock: Clock,
        config: DeskConfig,
    ) -> Self {
        Self { grievances, assignments, clock, config }
    }

    /// Open both stores on `config.database_path` with the system clock.
    pub fn open(config: DeskConfig) -> DeskResult<Self> {
        Self::open_with_clock(config, Clock::system())
    }

    pub fn open_with_clock(config: DeskConfig, clock: Clock) -> DeskResult<Self> {
        let grievances = ComplaintStore::open(&config.database_path)?;
        let assignments =
            AssignmentStore::open(&config.database_path, config.default_assignment.clone());
        log::info!(
            "desk opened on {} (assignment store durable={})",
            config.database_path,
            assignments.is_durable()
        );
        Ok(Self::new(Box::new(grievances), assignments, clock, config))
    }

    /// In-memory stores and the given clock. Use in tests.
    pub fn build_test(clock: Clock) -> DeskResult<Self> {
        let config = DeskConfig::default_test();
        let grievances = ComplaintStore::in_memory()?;
        let assignments = AssignmentStore::in_memory(config.default_assignment.clone());
        Ok(Self::new(Box::new(grievances), assignments, clock, config))
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn desk_config(&self) -> &DeskConfig {
        &self.config
    }

    pub fn grievances(&self) -> &dyn GrievanceStore {
        self.grievances.as_ref()
    }

    pub fn assignments(&self) -> &AssignmentStore {
        &self.assignments
    }

    // ── Analysis ───────────────────────────────────────────────────────

    pub fn classify(&self, description: &str, category: Category) -> DeskResult<ClassificationResult> {
        self.require_description(description)?;
        Ok(classifier::classify(description, category))
    }

    /// Check `description` against every stored complaint of `category`.
    pub fn check_duplicate(
        &self,
        description: &str,
        category: Category,
        location: &str,
    ) -> DeskResult<DuplicateCheckResult> {
        self.require_description(description)?;
        let candidates = self.grievances.descriptions_for_category(category)?;
        Ok(duplicate::check_duplicate(
            description,
            category,
            &candidates,
            location,
            self.config.duplicate_threshold,
        ))
    }

    pub fn analyze_for_assignment(&self, description: &str, category: Category) -> AssignmentAnalysis {
        categorizer::analyze_for_assignment(description, category)
    }

    pub fn departments(&self) -> Vec<&'static str> {
        all_departments()
    }

    pub fn submit_grievance(&self, submission: &Submission) -> DeskResult<SubmissionReceipt> {
        intake::submit_grievance(self.grievances.as_ref(), submission, &self.config, self.clock.now())
    }

    // ── Complaints ─────────────────────────────────────────────────────

    /// Look up a complaint by the id a citizen typed: surrounding
    /// whitespace is ignored and the id is upper-cased.
    pub fn get_complaint(&self, complaint_id: &str) -> DeskResult<Complaint> {
        let id = complaint_id.trim().to_uppercase();
        if id.is_empty() {
            return Err(DeskError::Validation("complaint id is required".into()));
        }
        self.grievances
            .get_complaint(&id)?
            .ok_or_else(|| DeskError::complaint_not_found(&id))
    }

    /// Every complaint, newest first.
    pub fn list_complaints(&self) -> DeskResult<Vec<Complaint>> {
        let mut complaints = self.grievances.all_complaints()?;
        complaints.reverse();
        Ok(complaints)
    }

    /// Admin status change. Appends a timeline entry with `remarks`.
    pub fn update_complaint_status(
        &self,
        complaint_id: &str,
        status: ComplaintStatus,
        remarks: Option<&str>,
    ) -> DeskResult<Complaint> {
        let updated = self
            .grievances
            .update_status(complaint_id, status, remarks, self.clock.now())?
            .ok_or_else(|| DeskError::complaint_not_found(complaint_id))?;
        log::info!("complaint {complaint_id} moved to {status}");
        Ok(updated)
    }

    // ── Analytics ──────────────────────────────────────────────────────

    pub fn dashboard_stats(&self) -> DeskResult<DashboardStats> {
        Ok(analytics::dashboard_stats(&self.grievances.all_complaints()?))
    }

    pub fn analytics_summary(&self) -> DeskResult<AnalyticsSummary> {
        Ok(analytics::summary(&self.grievances.all_complaints()?))
    }

    pub fn complaints_by_department(&self) -> DeskResult<BTreeMap<String, usize>> {
        Ok(analytics::by_department(&self.grievances.all_complaints()?))
    }

    // ── Queue ──────────────────────────────────────────────────────────

    /// Returns how many complaints were newly added to the queue.
    pub fn sync_queue(&self) -> DeskResult<usize> {
        let complaints = self.grievances.all_complaints()?;
        Ok(queue::sync_queue(&self.assignments, &complaints, self.clock.now()))
    }

    pub fn list_queue(&self, filter: &QueueFilter) -> DeskResult<QueueResult> {
        filter.validate()?;
        self.sync_queue()?;
        let complaints = self.grievances.all_complaints()?;
        let records = self.assignments.all_records();
        let window = self.assignments.config().review_window_days;
        queue::list_queue(&complaints, &records, filter, window, self.clock.now())
    }

    pub fn stats(&self) -> DeskResult<AssignmentStats> {
        self.sync_queue()?;
        Ok(self.assignments.stats())
    }

    // ── Workflow ───────────────────────────────────────────────────────

    pub fn approve(
        &self,
        complaint_id: &str,
        department: &str,
        remarks: Option<&str>,
        actor: &Principal,
    ) -> DeskResult<ApprovalOutcome> {
        workflow::approve(
            self.grievances.as_ref(),
            &self.assignments,
            complaint_id,
            department,
            remarks,
            actor,
            self.clock.now(),
        )
    }

    pub fn reject(
        &self,
        complaint_id: &str,
        reason: Option<&str>,
        actor: &Principal,
    ) -> DeskResult<RejectionOutcome> {
        workflow::reject(
            self.grievances.as_ref(),
            &self.assignments,
            complaint_id,
            reason,
            actor,
            self.clock.now(),
        )
    }

    pub fn bulk(
        &self,
        complaint_ids: &[ComplaintId],
        action: BulkAction,
        department: Option<&str>,
        remarks: Option<&str>,
        actor: &Principal,
    ) -> DeskResult<BulkResult> {
        workflow::bulk(
            self.grievances.as_ref(),
            &self.assignments,
            complaint_ids,
            action,
            department,
            remarks,
            actor,
            self.clock.now(),
        )
    }

    // ── Admin ──────────────────────────────────────────────────────────

    pub fn config(&self) -> AssignmentConfig {
        self.assignments.config()
    }

    pub fn update_config(&self, config: AssignmentConfig) -> DeskResult<AssignmentConfig> {
        let updated = self.assignments.update_config(config)?;
        log::info!(
            "assignment config updated: window={}d threshold={} enabled={}",
            updated.review_window_days,
            updated.auto_assign_threshold,
            updated.enabled
        );
        Ok(updated)
    }

    /// Newest first. `limit` defaults to the configured default and is
    /// capped at the configured maximum.
    pub fn audit_logs(&self, complaint_id: Option<&str>, limit: Option<usize>) -> Vec<AuditLogEntry> {
        let limit = limit
            .unwrap_or(self.config.audit_log_default_limit)
            .min(self.config.audit_log_max_limit);
        self.assignments.audit_logs(complaint_id, limit)
    }

    pub fn assignment_detail(&self, complaint_id: &str) -> DeskResult<AssignmentDetail> {
        let complaint = self
            .grievances
            .get_complaint(complaint_id)?
            .ok_or_else(|| DeskError::complaint_not_found(complaint_id))?;
        let record = self
            .assignments
            .get(complaint_id)
            .ok_or_else(|| DeskError::assignment_not_found(complaint_id))?;
        let audit_logs = self.audit_logs(Some(complaint_id), None);
        Ok(AssignmentDetail { complaint, record, audit_logs })
    }

    fn require_description(&self, description: &str) -> DeskResult<()> {
        let length = description.trim().chars().count();
        if length < self.config.min_description_length {
            return Err(DeskError::Validation(format!(
                "description must be at least {} characters, got {length}",
                self.config.min_description_length
            )));
        }
        Ok(())
    }
}
