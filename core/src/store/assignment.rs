//! Auto-assignment store: records, audit log and admin config.
//!
//! The in-memory state is authoritative; SQLite is a write-through copy.
//! A failed read or write is logged and the process carries on with the
//! in-memory state, so a broken disk never corrupts the state machine.
//!
//! RULE: Every read-modify-write happens under the single state mutex.
//! That serialises create-if-absent and status transitions per complaint id.

use super::{json_column, open_connection, parse_column};
use crate::{
    assignment::{AssignmentStats, AuditAction, AuditLogEntry, AutoAssignmentRecord, AutoStatus},
    config::AssignmentConfig,
    duplicate::round1,
    error::{DeskError, DeskResult},
    types::{Category, ComplaintId},
};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

struct AssignmentState {
    records: BTreeMap<ComplaintId, AutoAssignmentRecord>,
    audit: Vec<AuditLogEntry>,
    config: AssignmentConfig,
    /// None when running memory-only.
    conn: Option<Connection>,
}

pub struct AssignmentStore {
    state: Mutex<AssignmentState>,
}

impl AssignmentStore {
    /// Open the store backed by the database at `path` and load its state.
    /// If the database cannot be opened the store runs memory-only.
    pub fn open(path: &str, default_config: AssignmentConfig) -> Self {
        let conn = match open_connection(path) {
            Ok(c) => Some(c),
            Err(e) => {
                log::warn!("auto-assignment store: cannot open {path}, running in memory only: {e}");
                None
            }
        };
        Self::from_connection(conn, default_config)
    }

    /// Backed by a private in-memory database (used in tests).
    pub fn in_memory(default_config: AssignmentConfig) -> Self {
        Self::open(":memory:", default_config)
    }

    /// No database at all.
    pub fn detached(default_config: AssignmentConfig) -> Self {
        Self::from_connection(None, default_config)
    }

    fn from_connection(conn: Option<Connection>, default_config: AssignmentConfig) -> Self {
        let mut state = AssignmentState {
            records: BTreeMap::new(),
            audit: Vec::new(),
            config: default_config,
            conn,
        };
        if let Some(conn) = &state.conn {
            match load_records(conn) {
                Ok(records) => state.records = records,
                Err(e) => log::warn!("auto-assignment store: could not load records: {e}"),
            }
            match load_audit(conn) {
                Ok(audit) => state.audit = audit,
                Err(e) => log::warn!("auto-assignment store: could not load audit log: {e}"),
            }
            match load_config(conn) {
                Ok(Some(config)) => state.config = config,
                Ok(None) => {}
                Err(e) => log::warn!("auto-assignment store: could not load config: {e}"),
            }
        }
        log::debug!(
            "auto-assignment store ready: {} records, {} audit entries, durable={}",
            state.records.len(),
            state.audit.len(),
            state.conn.is_some(),
        );
        Self {
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AssignmentState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_durable(&self) -> bool {
        self.lock().conn.is_some()
    }

    // ── Records ────────────────────────────────────────────────────────

    /// Insert `record` unless one already exists for its complaint id.
    /// Returns true when this call created it.
    pub fn create_if_absent(&self, record: AutoAssignmentRecord) -> bool {
        let mut state = self.lock();
        if state.records.contains_key(&record.complaint_id) {
            return false;
        }
        if let Some(conn) = &state.conn {
            warn_on_failure("insert record", insert_record(conn, &record));
        }
        state.records.insert(record.complaint_id.clone(), record);
        true
    }

    pub fn get(&self, complaint_id: &str) -> Option<AutoAssignmentRecord> {
        self.lock().records.get(complaint_id).cloned()
    }

    pub fn contains(&self, complaint_id: &str) -> bool {
        self.lock().records.contains_key(complaint_id)
    }

    pub fn record_ids(&self) -> HashSet<ComplaintId> {
        self.lock().records.keys().cloned().collect()
    }

    /// Every record, ordered by complaint id.
    pub fn all_records(&self) -> Vec<AutoAssignmentRecord> {
        self.lock().records.values().cloned().collect()
    }

    pub fn list_by_status(&self, status: AutoStatus) -> Vec<AutoAssignmentRecord> {
        self.lock()
            .records
            .values()
            .filter(|r| r.auto_status == status)
            .cloned()
            .collect()
    }

    /// Unconditional status write. Workflow code goes through
    /// `transition_with`, which enforces the state machine.
    pub fn update_status(&self, complaint_id: &str, status: AutoStatus) -> Option<AutoAssignmentRecord> {
        let mut state = self.lock();
        let AssignmentState { records, conn, .. } = &mut *state;
        let record = records.get_mut(complaint_id)?;
        record.auto_status = status;
        if let Some(conn) = conn {
            warn_on_failure("update status", persist_status(conn, complaint_id, status));
        }
        Some(record.clone())
    }

    /// Move a record from PENDING_APPROVAL to `to` as one unit.
    ///
    /// `effect` runs under the store lock with the record as it was before
    /// the move, and returns the audit entry to append. If it fails, the
    /// record is left untouched and the error is returned.
    pub fn transition_with<T>(
        &self,
        complaint_id: &str,
        action: &'static str,
        to: AutoStatus,
        effect: impl FnOnce(&AutoAssignmentRecord) -> DeskResult<(T, AuditLogEntry)>,
    ) -> DeskResult<(AutoAssignmentRecord, AuditLogEntry, T)> {
        let mut state = self.lock();
        let AssignmentState { records, audit, conn, .. } = &mut *state;

        let record = records
            .get_mut(complaint_id)
            .ok_or_else(|| DeskError::assignment_not_found(complaint_id))?;
        if !record.auto_status.can_transition_to(to) {
            return Err(DeskError::InvalidState {
                action,
                current: record.auto_status,
            });
        }

        let (output, entry) = effect(record)?;

        record.auto_status = to;
        audit.push(entry.clone());
        if let Some(conn) = conn {
            warn_on_failure("transition", persist_transition(conn, complaint_id, to, &entry));
        }
        Ok((record.clone(), entry, output))
    }

    // ── Audit log ──────────────────────────────────────────────────────

    pub fn append_audit(&self, entry: AuditLogEntry) {
        let mut state = self.lock();
        if let Some(conn) = &state.conn {
            warn_on_failure("append audit entry", insert_audit(conn, &entry));
        }
        state.audit.push(entry);
    }

    /// Newest first, optionally for one complaint, at most `limit` entries.
    /// Entries sharing a timestamp keep their append order.
    pub fn audit_logs(&self, complaint_id: Option<&str>, limit: usize) -> Vec<AuditLogEntry> {
        let state = self.lock();
        let mut logs: Vec<AuditLogEntry> = state
            .audit
            .iter()
            .filter(|e| complaint_id.map_or(true, |id| e.complaint_id == id))
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        logs.truncate(limit);
        logs
    }

    pub fn audit_len(&self) -> usize {
        self.lock().audit.len()
    }

    // ── Config ─────────────────────────────────────────────────────────

    pub fn config(&self) -> AssignmentConfig {
        self.lock().config.clone()
    }

    pub fn update_config(&self, config: AssignmentConfig) -> DeskResult<AssignmentConfig> {
        config.validate()?;
        let mut state = self.lock();
        if let Some(conn) = &state.conn {
            warn_on_failure("save config", save_config(conn, &config));
        }
        state.config = config.clone();
        Ok(config)
    }

    // ── Stats ──────────────────────────────────────────────────────────

    pub fn stats(&self) -> AssignmentStats {
        let state = self.lock();
        let mut stats = AssignmentStats {
            total: state.records.len(),
            ..AssignmentStats::default()
        };
        let mut confidence_sum = 0.0;
        for record in state.records.values() {
            confidence_sum += record.confidence_score;
            match record.auto_status {
                AutoStatus::PendingApproval => stats.pending += 1,
                AutoStatus::Approved        => stats.approved += 1,
                AutoStatus::Rejected        => stats.rejected += 1,
                AutoStatus::ReviewRequired  => stats.review_required += 1,
            }
        }
        if stats.total > 0 {
            stats.average_confidence = round1(confidence_sum / stats.total as f64);
        }
        stats
    }
}

fn warn_on_failure(what: &str, result: DeskResult<()>) {
    if let Err(e) = result {
        log::warn!("auto-assignment store: {what} not persisted, keeping in-memory state: {e}");
    }
}

// ── SQL ──────────────────────────────────────────────────────────────────────

fn insert_record(conn: &Connection, r: &AutoAssignmentRecord) -> DeskResult<()> {
    conn.execute(
        "INSERT INTO auto_assignment (
            complaint_id, auto_category, suggested_department, confidence_score,
            auto_status, analyzed_at, keywords_json
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(complaint_id) DO NOTHING",
        params![
            &r.complaint_id,
            r.auto_category.as_str(),
            &r.suggested_department,
            r.confidence_score,
            r.auto_status.as_str(),
            r.analyzed_at,
            serde_json::to_string(&r.keywords_matched)?,
        ],
    )?;
    Ok(())
}

fn persist_status(conn: &Connection, complaint_id: &str, status: AutoStatus) -> DeskResult<()> {
    conn.execute(
        "UPDATE auto_assignment SET auto_status = ?1 WHERE complaint_id = ?2",
        params![status.as_str(), complaint_id],
    )?;
    Ok(())
}

/// Status change and its audit row commit together.
fn persist_transition(
    conn: &mut Connection,
    complaint_id: &str,
    status: AutoStatus,
    entry: &AuditLogEntry,
) -> DeskResult<()> {
    let tx = conn.transaction()?;
    persist_status(&tx, complaint_id, status)?;
    insert_audit(&tx, entry)?;
    tx.commit()?;
    Ok(())
}

fn insert_audit(conn: &Connection, e: &AuditLogEntry) -> DeskResult<()> {
    conn.execute(
        "INSERT INTO auto_assignment_audit (
            complaint_id, action, admin_id, admin_name, timestamp,
            nlp_suggestion, final_department, confidence_score, remarks
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            &e.complaint_id,
            e.action.as_str(),
            &e.admin_id,
            &e.admin_name,
            e.timestamp,
            &e.nlp_suggestion,
            e.final_department.as_deref(),
            e.confidence_score,
            e.remarks.as_deref(),
        ],
    )?;
    Ok(())
}

fn save_config(conn: &Connection, c: &AssignmentConfig) -> DeskResult<()> {
    conn.execute(
        "INSERT INTO auto_assignment_config (id, review_window_days, auto_assign_threshold, enabled)
         VALUES (1, ?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET
            review_window_days = excluded.review_window_days,
            auto_assign_threshold = excluded.auto_assign_threshold,
            enabled = excluded.enabled",
        params![
            c.review_window_days,
            c.auto_assign_threshold,
            if c.enabled { 1i32 } else { 0i32 }
        ],
    )?;
    Ok(())
}

fn load_records(conn: &Connection) -> DeskResult<BTreeMap<ComplaintId, AutoAssignmentRecord>> {
    let mut stmt = conn.prepare(
        "SELECT complaint_id, auto_category, suggested_department, confidence_score,
                auto_status, analyzed_at, keywords_json
         FROM auto_assignment",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(AutoAssignmentRecord {
            complaint_id: row.get(0)?,
            auto_category: parse_column(row, 1, Category::parse)?,
            suggested_department: row.get(2)?,
            confidence_score: row.get(3)?,
            auto_status: parse_column(row, 4, AutoStatus::parse)?,
            analyzed_at: row.get(5)?,
            keywords_matched: json_column(row, 6)?,
        })
    })?;
    let mut records = BTreeMap::new();
    for row in rows {
        match row {
            Ok(r) => {
                records.insert(r.complaint_id.clone(), r);
            }
            Err(e) => log::warn!("auto-assignment store: skipping unreadable record: {e}"),
        }
    }
    Ok(records)
}

fn load_audit(conn: &Connection) -> DeskResult<Vec<AuditLogEntry>> {
    let mut stmt = conn.prepare(
        "SELECT complaint_id, action, admin_id, admin_name, timestamp,
                nlp_suggestion, final_department, confidence_score, remarks
         FROM auto_assignment_audit ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(AuditLogEntry {
            complaint_id: row.get(0)?,
            action: parse_column(row, 1, AuditAction::parse)?,
            admin_id: row.get(2)?,
            admin_name: row.get(3)?,
            timestamp: row.get(4)?,
            nlp_suggestion: row.get(5)?,
            final_department: row.get(6)?,
            confidence_score: row.get(7)?,
            remarks: row.get(8)?,
        })
    })?;
    let mut entries = Vec::new();
    for row in rows {
        match row {
            Ok(e) => entries.push(e),
            Err(e) => log::warn!("auto-assignment store: skipping unreadable audit entry: {e}"),
        }
    }
    Ok(entries)
}

fn load_config(conn: &Connection) -> DeskResult<Option<AssignmentConfig>> {
    let config = conn
        .query_row(
            "SELECT review_window_days, auto_assign_threshold, enabled
             FROM auto_assignment_config WHERE id = 1",
            [],
            |row| {
                Ok(AssignmentConfig {
                    review_window_days: row.get(0)?,
                    auto_assign_threshold: row.get(1)?,
                    enabled: row.get::<_, i32>(2)? != 0,
                })
            },
        )
        .optional()?;
    Ok(config)
}
