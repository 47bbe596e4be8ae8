//! desk-runner: headless driver for the grievance desk.
//!
//! Usage:
//!   desk-runner --db desk.db
//!   desk-runner --config desk.json --ipc-mode
//!   desk-runner --db :memory: --now 2026-05-01T09:00:00Z --ipc-mode
//!
//! In IPC mode every stdin line is one JSON command and every stdout line
//! is one JSON reply.

use anyhow::Result;
use chrono::{DateTime, Utc};
use grievance_core::{
    clock::Clock,
    config::{AssignmentConfig, DeskConfig},
    intake::Submission,
    queue::QueueFilter,
    types::{Category, ComplaintId, ComplaintStatus, Principal},
    workflow::BulkAction,
    DeskResult, GrievanceDesk,
};
use serde_json::{json, Value};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Classify {
        description: String,
        category: Category,
    },
    CheckDuplicate {
        description: String,
        category: Category,
        #[serde(default)]
        location: String,
    },
    Analyze {
        description: String,
        category: Category,
    },
    Submit(Submission),
    Sync,
    Queue {
        #[serde(default)]
        filter: QueueFilter,
    },
    Approve {
        complaint_id: ComplaintId,
        department: String,
        remarks: Option<String>,
        actor: Option<Principal>,
    },
    Reject {
        complaint_id: ComplaintId,
        reason: Option<String>,
        actor: Option<Principal>,
    },
    Bulk {
        complaint_ids: Vec<ComplaintId>,
        action: BulkAction,
        department: Option<String>,
        remarks: Option<String>,
        actor: Option<Principal>,
    },
    Stats,
    GetConfig,
    UpdateConfig {
        config: AssignmentConfig,
    },
    AuditLogs {
        complaint_id: Option<ComplaintId>,
        limit: Option<usize>,
    },
    Detail {
        complaint_id: ComplaintId,
    },
    Departments,
    GetComplaint {
        complaint_id: String,
    },
    ListComplaints,
    UpdateStatus {
        complaint_id: ComplaintId,
        status: ComplaintStatus,
        remarks: Option<String>,
    },
    DashboardStats,
    AnalyticsSummary,
    ByDepartment,
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");

    let mut config = match flag_value(&args, "--config") {
        Some(path) => DeskConfig::load(path)?,
        None => DeskConfig::default(),
    };
    if let Some(db) = flag_value(&args, "--db") {
        config.database_path = db.to_string();
    }
    let clock = match flag_value(&args, "--now") {
        Some(at) => Clock::fixed(DateTime::parse_from_rfc3339(at)?.with_timezone(&Utc)),
        None => Clock::system(),
    };

    if !ipc_mode {
        println!("Grievance Desk: desk-runner");
        println!("  db:            {}", config.database_path);
        println!("  review window: {} days", config.default_assignment.review_window_days);
        println!();
    }

    let desk = GrievanceDesk::open_with_clock(config, clock)?;

    if ipc_mode {
        run_ipc_loop(&desk)?;
    } else {
        let synced = desk.sync_queue()?;
        print_summary(&desk, synced)?;
    }
    Ok(())
}

fn run_ipc_loop(desk: &GrievanceDesk) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                writeln!(stdout, "{}", json!({ "error": e.to_string() }))?;
                stdout.flush()?;
                continue;
            }
        };
        if matches!(cmd, IpcCommand::Quit) {
            break;
        }

        let reply = match handle_command(desk, cmd) {
            Ok(data) => json!({ "success": true, "data": data }),
            Err(e) => {
                log::warn!("command failed: {e}");
                json!({ "success": false, "error": e.to_string() })
            }
        };
        writeln!(stdout, "{reply}")?;
        stdout.flush()?;
    }
    Ok(())
}

fn handle_command(desk: &GrievanceDesk, cmd: IpcCommand) -> DeskResult<Value> {
    let value = match cmd {
        IpcCommand::Classify { description, category } => {
            to_value(desk.classify(&description, category)?)?
        }
        IpcCommand::CheckDuplicate { description, category, location } => {
            to_value(desk.check_duplicate(&description, category, &location)?)?
        }
        IpcCommand::Analyze { description, category } => {
            to_value(desk.analyze_for_assignment(&description, category))?
        }
        IpcCommand::Submit(submission) => to_value(desk.submit_grievance(&submission)?)?,
        IpcCommand::Sync => {
            let synced = desk.sync_queue()?;
            json!({
                "synced_count": synced,
                "message": format!("Synchronized {synced} new complaints to the auto-assignment queue"),
            })
        }
        IpcCommand::Queue { filter } => to_value(desk.list_queue(&filter)?)?,
        IpcCommand::Approve { complaint_id, department, remarks, actor } => {
            let actor = actor.unwrap_or_else(runner_principal);
            to_value(desk.approve(&complaint_id, &department, remarks.as_deref(), &actor)?)?
        }
        IpcCommand::Reject { complaint_id, reason, actor } => {
            let actor = actor.unwrap_or_else(runner_principal);
            to_value(desk.reject(&complaint_id, reason.as_deref(), &actor)?)?
        }
        IpcCommand::Bulk { complaint_ids, action, department, remarks, actor } => {
            let actor = actor.unwrap_or_else(runner_principal);
            to_value(desk.bulk(
                &complaint_ids,
                action,
                department.as_deref(),
                remarks.as_deref(),
                &actor,
            )?)?
        }
        IpcCommand::Stats => to_value(desk.stats()?)?,
        IpcCommand::GetConfig => to_value(desk.config())?,
        IpcCommand::UpdateConfig { config } => to_value(desk.update_config(config)?)?,
        IpcCommand::AuditLogs { complaint_id, limit } => {
            let logs = desk.audit_logs(complaint_id.as_deref(), limit);
            json!({ "total": logs.len(), "logs": logs })
        }
        IpcCommand::Detail { complaint_id } => to_value(desk.assignment_detail(&complaint_id)?)?,
        IpcCommand::Departments => json!({ "departments": desk.departments() }),
        IpcCommand::GetComplaint { complaint_id } => to_value(desk.get_complaint(&complaint_id)?)?,
        IpcCommand::ListComplaints => to_value(desk.list_complaints()?)?,
        IpcCommand::UpdateStatus { complaint_id, status, remarks } => {
            to_value(desk.update_complaint_status(&complaint_id, status, remarks.as_deref())?)?
        }
        IpcCommand::DashboardStats => to_value(desk.dashboard_stats()?)?,
        IpcCommand::AnalyticsSummary => to_value(desk.analytics_summary()?)?,
        IpcCommand::ByDepartment => to_value(desk.complaints_by_department()?)?,
        IpcCommand::Quit => Value::Null,
    };
    Ok(value)
}

fn to_value<T: serde::Serialize>(v: T) -> DeskResult<Value> {
    Ok(serde_json::to_value(v)?)
}

/// Acting admin when a command carries none.
fn runner_principal() -> Principal {
    Principal {
        id: "desk-runner".into(),
        email: String::new(),
        role: "admin".into(),
        name: Some("Desk Runner".into()),
    }
}

fn print_summary(desk: &GrievanceDesk, synced: usize) -> Result<()> {
    let stats = desk.stats()?;
    let config = desk.config();

    println!("=== QUEUE SUMMARY ===");
    println!("  newly synced:    {synced}");
    println!("  total records:   {}", stats.total);
    println!("  pending:         {}", stats.pending);
    println!("  approved:        {}", stats.approved);
    println!("  rejected:        {}", stats.rejected);
    println!("  review required: {}", stats.review_required);
    println!("  avg confidence:  {:.1}%", stats.average_confidence);

    println!();
    println!("=== PENDING (last {} days) ===", config.review_window_days);
    let pending = desk.list_queue(&QueueFilter {
        status: Some(grievance_core::assignment::AutoStatus::PendingApproval),
        ..QueueFilter::default()
    })?;
    if pending.items.is_empty() {
        println!("  (queue is empty)");
    } else {
        for item in pending.items.iter().take(10) {
            println!(
                "  {} | {:>3}d | {:>5.1}% | {}",
                item.complaint_id,
                item.days_since_submission,
                item.confidence_score,
                item.suggested_department
            );
        }
    }
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}
