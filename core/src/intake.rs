//! Grievance intake: validate, classify, duplicate-check and store.

use crate::{
    classifier::{classify, ClassificationResult},
    complaint::{Complaint, GrievanceStore, TimelineEntry},
    config::DeskConfig,
    duplicate::{check_duplicate, DuplicateCheckResult},
    error::{DeskError, DeskResult},
    types::{Category, ComplaintId, ComplaintStatus},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const SUBMITTED_REMARK: &str = "Grievance submitted successfully";
const ANONYMOUS: &str = "Anonymous";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Submission {
    pub category: Category,
    pub description: String,
    pub location: String,
    #[serde(default)]
    pub submitter_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmissionReceipt {
    pub complaint_id: ComplaintId,
    pub message: String,
    pub classification: ClassificationResult,
    pub duplicate: DuplicateCheckResult,
}

/// `CSP-YYYYMMDD-XXXXXX`, the suffix being six upper-case hex digits.
pub fn generate_complaint_id(now: DateTime<Utc>) -> ComplaintId {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(6).collect();
    format!("CSP-{}-{}", now.format("%Y%m%d"), suffix.to_uppercase())
}

pub fn validate_submission(submission: &Submission, config: &DeskConfig) -> DeskResult<()> {
    let length = submission.description.trim().chars().count();
    if length < config.min_description_length {
        return Err(DeskError::Validation(format!(
            "description must be at least {} characters, got {length}",
            config.min_description_length
        )));
    }
    if submission.location.trim().is_empty() {
        return Err(DeskError::Validation("location is required".into()));
    }
    Ok(())
}

/// Store a new complaint as SUBMITTED under its detected category.
///
/// A likely duplicate is still stored, flagged with `is_duplicate` and
/// `similar_to`.
pub fn submit_grievance(
    store: &dyn GrievanceStore,
    submission: &Submission,
    config: &DeskConfig,
    now: DateTime<Utc>,
) -> DeskResult<SubmissionReceipt> {
    validate_submission(submission, config)?;

    let description = submission.description.trim();
    let location = submission.location.trim();
    let classification = classify(description, submission.category);
    let category = classification.detected_category;

    // Candidates come from the category the citizen selected, not the
    // detected one.
    let candidates = store.descriptions_for_category(submission.category)?;
    let duplicate = check_duplicate(
        description,
        submission.category,
        &candidates,
        location,
        config.duplicate_threshold,
    );

    let complaint = Complaint {
        id: generate_complaint_id(now),
        category,
        description: description.to_string(),
        location: location.to_string(),
        submitter_name: submission
            .submitter_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(ANONYMOUS)
            .to_string(),
        status: ComplaintStatus::Submitted,
        priority: classification.priority,
        department: classification.department.clone(),
        ai_explanation: classification.explanation.clone(),
        keywords_found: classification.keywords_found.clone(),
        is_duplicate: duplicate.is_duplicate,
        similar_to: duplicate.similar_complaint_id.clone(),
        duplicate_score: duplicate.similarity_score,
        timeline: vec![TimelineEntry {
            status: ComplaintStatus::Submitted,
            timestamp: now,
            remarks: Some(SUBMITTED_REMARK.to_string()),
        }],
        created_at: now,
        updated_at: now,
    };
    store.insert_complaint(&complaint)?;

    log::info!(
        "intake: {} filed as {} / {} -> {}{}",
        complaint.id,
        category,
        complaint.priority,
        complaint.department,
        if duplicate.is_duplicate { " (possible duplicate)" } else { "" }
    );

    let message = format!(
        "Your grievance has been registered successfully. Complaint ID: {}. \
         Please save this ID for future reference.",
        complaint.id
    );

    Ok(SubmissionReceipt {
        complaint_id: complaint.id,
        message,
        classification,
        duplicate,
    })
}
