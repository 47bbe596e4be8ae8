//! Durability: records, audit entries and config survive a reopen.

use chrono::{TimeZone, Utc};
use grievance_core::{
    assignment::{AutoAssignmentRecord, AutoStatus},
    clock::Clock,
    complaint::GrievanceStore,
    config::{AssignmentConfig, DeskConfig},
    intake::Submission,
    keywords::DEPT_PUBLIC_WORKS,
    store::AssignmentStore,
    types::{Category, ComplaintStatus, Principal},
    GrievanceDesk,
};
use std::path::PathBuf;

struct TempDb(PathBuf);

impl TempDb {
    fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Self(std::env::temp_dir().join(format!("grievance-desk-{}.db", uuid::Uuid::new_v4())))
    }

    fn config(&self) -> DeskConfig {
        DeskConfig {
            database_path: self.0.to_string_lossy().into_owned(),
            ..DeskConfig::default_test()
        }
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut path = self.0.clone().into_os_string();
            path.push(suffix);
            let _ = std::fs::remove_file(path);
        }
    }
}

fn clock() -> Clock {
    Clock::fixed(Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap())
}

fn admin() -> Principal {
    Principal {
        id: "admin-3".into(),
        email: "desk@city.gov".into(),
        role: "admin".into(),
        name: Some("Desk Lead".into()),
    }
}

#[test]
fn state_survives_reopen() {
    let db = TempDb::new();
    let (approved_id, pending_id) = {
        let desk = GrievanceDesk::open_with_clock(db.config(), clock()).unwrap();
        let mut ids = Vec::new();
        for description in [
            "Large pothole on Main Street causing accidents, urgent repair needed",
            "Garbage dump overflowing behind the market for a week",
        ] {
            let receipt = desk
                .submit_grievance(&Submission {
                    category: Category::Others,
                    description: description.into(),
                    location: "Ward 6".into(),
                    submitter_name: None,
                })
                .unwrap();
            ids.push(receipt.complaint_id);
        }
        assert_eq!(desk.sync_queue().unwrap(), 2);
        desk.approve(&ids[0], DEPT_PUBLIC_WORKS, Some("Confirmed"), &admin()).unwrap();
        desk.update_config(AssignmentConfig { review_window_days: 30, ..Default::default() })
            .unwrap();
        (ids[0].clone(), ids[1].clone())
    };

    let desk = GrievanceDesk::open_with_clock(db.config(), clock()).unwrap();
    assert!(desk.assignments().is_durable());
    assert_eq!(desk.sync_queue().unwrap(), 0);

    let stats = desk.stats().unwrap();
    assert_eq!((stats.total, stats.pending, stats.approved), (2, 1, 1));
    assert_eq!(desk.config().review_window_days, 30);

    let logs = desk.audit_logs(None, None);
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].complaint_id, approved_id);
    assert_eq!(logs[0].remarks.as_deref(), Some("Confirmed"));

    let approved = desk.grievances().get_complaint(&approved_id).unwrap().unwrap();
    assert_eq!(approved.status, ComplaintStatus::Assigned);
    assert_eq!(approved.timeline.len(), 2);

    let pending = desk.assignments().get(&pending_id).unwrap();
    assert_eq!(pending.auto_status, AutoStatus::PendingApproval);
}

#[test]
fn unopenable_database_degrades_to_memory() {
    let store = AssignmentStore::open(
        "/nonexistent-grievance-dir/desk.db",
        AssignmentConfig::default(),
    );
    assert!(!store.is_durable());

    let record = AutoAssignmentRecord::pending(
        "CSP-20260501-0A0A0A".into(),
        Category::Road,
        DEPT_PUBLIC_WORKS.into(),
        70.0,
        Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap(),
        vec![],
    );
    assert!(store.create_if_absent(record));
    assert_eq!(store.stats().pending, 1);
}

#[test]
fn stored_config_wins_over_seed() {
    let db = TempDb::new();
    {
        let store = AssignmentStore::open(&db.config().database_path, AssignmentConfig::default());
        store
            .update_config(AssignmentConfig { auto_assign_threshold: 60.0, ..Default::default() })
            .unwrap();
    }
    let seed = AssignmentConfig { auto_assign_threshold: 95.0, ..Default::default() };
    let store = AssignmentStore::open(&db.config().database_path, seed);
    assert_eq!(store.config().auto_assign_threshold, 60.0);
}
