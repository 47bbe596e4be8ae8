//! Grievance intake through the desk.

use chrono::{TimeZone, Utc};
use grievance_core::{
    clock::Clock,
    complaint::GrievanceStore,
    intake::Submission,
    keywords::DEPT_PUBLIC_WORKS,
    types::{Category, ComplaintStatus, Priority},
    DeskError, GrievanceDesk,
};

fn desk() -> GrievanceDesk {
    let _ = env_logger::builder().is_test(true).try_init();
    let now = Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap();
    GrievanceDesk::build_test(Clock::fixed(now)).unwrap()
}

fn submission(category: Category, description: &str, location: &str) -> Submission {
    Submission {
        category,
        description: description.into(),
        location: location.into(),
        submitter_name: None,
    }
}

#[test]
fn submitted_complaint_carries_classification() {
    let desk = desk();
    let receipt = desk
        .submit_grievance(&submission(
            Category::Others,
            "Large pothole on Main Street causing accidents, urgent repair needed",
            "Main Street, Ward 4",
        ))
        .unwrap();

    assert!(receipt.complaint_id.starts_with("CSP-20260501-"));
    assert!(receipt.message.contains(&receipt.complaint_id));
    assert_eq!(receipt.classification.detected_category, Category::Road);

    let stored = desk
        .grievances()
        .get_complaint(&receipt.complaint_id)
        .unwrap()
        .unwrap();
    assert_eq!(stored.category, Category::Road);
    assert_eq!(stored.status, ComplaintStatus::Submitted);
    assert_eq!(stored.priority, Priority::High);
    assert_eq!(stored.department, DEPT_PUBLIC_WORKS);
    assert_eq!(stored.submitter_name, "Anonymous");
    assert_eq!(stored.keywords_found, receipt.classification.keywords_found);
    assert!(!stored.is_duplicate);
    assert_eq!(stored.timeline.len(), 1);
    assert_eq!(
        stored.timeline[0].remarks.as_deref(),
        Some("Grievance submitted successfully")
    );
    assert_eq!(stored.created_at, desk.clock().now());
}

#[test]
fn second_similar_report_is_stored_as_duplicate() {
    let desk = desk();
    let first = desk
        .submit_grievance(&submission(Category::Water, "water pipe leakage near market", "Sector 5"))
        .unwrap();
    let second = desk
        .submit_grievance(&submission(
            Category::Water,
            "pipe leaking water close to market area",
            "Sector 5",
        ))
        .unwrap();

    assert!(second.duplicate.is_duplicate);
    let stored = desk
        .grievances()
        .get_complaint(&second.complaint_id)
        .unwrap()
        .unwrap();
    assert!(stored.is_duplicate);
    assert_eq!(stored.similar_to.as_deref(), Some(first.complaint_id.as_str()));
    assert_eq!(stored.duplicate_score, 52.5);
}

#[test]
fn invalid_submissions_are_not_stored() {
    let desk = desk();
    let short = desk.submit_grievance(&submission(Category::Road, "pothole", "Ward 1"));
    assert!(matches!(short, Err(DeskError::Validation(_))));

    let nowhere = desk.submit_grievance(&submission(
        Category::Road,
        "Large pothole near the school gate",
        "   ",
    ));
    assert!(matches!(nowhere, Err(DeskError::Validation(_))));

    assert!(desk.grievances().all_complaints().unwrap().is_empty());
}

#[test]
fn named_submitter_is_kept() {
    let desk = desk();
    let receipt = desk
        .submit_grievance(&Submission {
            submitter_name: Some("Meena K".into()),
            ..submission(Category::Sanitation, "Garbage dump overflowing behind the market", "Ward 2")
        })
        .unwrap();
    let stored = desk
        .grievances()
        .get_complaint(&receipt.complaint_id)
        .unwrap()
        .unwrap();
    assert_eq!(stored.submitter_name, "Meena K");
}
