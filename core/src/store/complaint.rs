use super::{json_column, open_connection, parse_column};
use crate::{
    complaint::{Complaint, GrievanceStore, TimelineEntry},
    error::DeskResult,
    types::{Category, ComplaintStatus, Priority},
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Mutex, MutexGuard};

const COMPLAINT_COLUMNS: &str = "complaint_id, category, description, location, submitter_name,
    status, priority, department, ai_explanation, keywords_json, is_duplicate,
    similar_to, duplicate_score, timeline_json, created_at, updated_at";

fn complaint_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<Complaint> {
    Ok(Complaint {
        id: row.get(0)?,
        category: parse_column(row, 1, Category::parse)?,
        description: row.get(2)?,
        location: row.get(3)?,
        submitter_name: row.get(4)?,
        status: parse_column(row, 5, ComplaintStatus::parse)?,
        priority: parse_column(row, 6, Priority::parse)?,
        department: row.get(7)?,
        ai_explanation: row.get(8)?,
        keywords_found: json_column(row, 9)?,
        is_duplicate: row.get::<_, i32>(10)? != 0,
        similar_to: row.get(11)?,
        duplicate_score: row.get(12)?,
        timeline: json_column(row, 13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

/// SQLite-backed grievance store. One connection, serialised by a mutex.
pub struct ComplaintStore {
    conn: Mutex<Connection>,
}

impl ComplaintStore {
    pub fn open(path: &str) -> DeskResult<Self> {
        Ok(Self {
            conn: Mutex::new(open_connection(path)?),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> DeskResult<Self> {
        Self::open(":memory:")
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn complaint_count(&self) -> DeskResult<i64> {
        let n = self
            .conn()
            .query_row("SELECT COUNT(*) FROM complaint", [], |row| row.get(0))?;
        Ok(n)
    }

    pub fn count_by_status(&self, status: ComplaintStatus) -> DeskResult<i64> {
        let n = self.conn().query_row(
            "SELECT COUNT(*) FROM complaint WHERE status = ?1",
            params![status.as_str()],
            |row| row.get(0),
        )?;
        Ok(n)
    }

    fn fetch(conn: &Connection, id: &str) -> DeskResult<Option<Complaint>> {
        let sql = format!("SELECT {COMPLAINT_COLUMNS} FROM complaint WHERE complaint_id = ?1");
        let complaint = conn
            .query_row(&sql, params![id], complaint_row_mapper)
            .optional()?;
        Ok(complaint)
    }
}

impl GrievanceStore for ComplaintStore {
    fn insert_complaint(&self, c: &Complaint) -> DeskResult<()> {
        let keywords = serde_json::to_string(&c.keywords_found)?;
        let timeline = serde_json::to_string(&c.timeline)?;
        self.conn().execute(
            &format!(
                "INSERT INTO complaint ({COMPLAINT_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
            ),
            params![
                &c.id,
                c.category.as_str(),
                &c.description,
                &c.location,
                &c.submitter_name,
                c.status.as_str(),
                c.priority.as_str(),
                &c.department,
                &c.ai_explanation,
                keywords,
                if c.is_duplicate { 1i32 } else { 0i32 },
                c.similar_to.as_deref(),
                c.duplicate_score,
                timeline,
                c.created_at,
                c.updated_at,
            ],
        )?;
        Ok(())
    }

    fn get_complaint(&self, id: &str) -> DeskResult<Option<Complaint>> {
        Self::fetch(&self.conn(), id)
    }

    fn all_complaints(&self) -> DeskResult<Vec<Complaint>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {COMPLAINT_COLUMNS} FROM complaint ORDER BY created_at ASC, complaint_id ASC"
        ))?;
        let rows = stmt.query_map([], complaint_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn assign(
        &self,
        id: &str,
        department: &str,
        advance: Option<(ComplaintStatus, &str)>,
        at: DateTime<Utc>,
    ) -> DeskResult<Option<Complaint>> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let Some(mut complaint) = Self::fetch(&tx, id)? else {
            return Ok(None);
        };
        complaint.department = department.to_string();
        complaint.updated_at = at;
        if let Some((status, remark)) = advance {
            complaint.status = status;
            complaint.timeline.push(TimelineEntry {
                status,
                timestamp: at,
                remarks: Some(remark.to_string()),
            });
        }
        tx.execute(
            "UPDATE complaint SET department = ?1, status = ?2, updated_at = ?3, timeline_json = ?4
             WHERE complaint_id = ?5",
            params![
                department,
                complaint.status.as_str(),
                at,
                serde_json::to_string(&complaint.timeline)?,
                id
            ],
        )?;
        tx.commit()?;
        Ok(Some(complaint))
    }

    fn update_status(
        &self,
        id: &str,
        status: ComplaintStatus,
        remarks: Option<&str>,
        at: DateTime<Utc>,
    ) -> DeskResult<Option<Complaint>> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let Some(mut complaint) = Self::fetch(&tx, id)? else {
            return Ok(None);
        };
        complaint.status = status;
        complaint.updated_at = at;
        complaint.timeline.push(TimelineEntry {
            status,
            timestamp: at,
            remarks: remarks.map(String::from),
        });
        tx.execute(
            "UPDATE complaint SET status = ?1, updated_at = ?2, timeline_json = ?3
             WHERE complaint_id = ?4",
            params![
                status.as_str(),
                at,
                serde_json::to_string(&complaint.timeline)?,
                id
            ],
        )?;
        tx.commit()?;
        Ok(Some(complaint))
    }

    fn descriptions_for_category(
        &self,
        category: Category,
    ) -> DeskResult<Vec<crate::duplicate::DuplicateCandidate>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT complaint_id, description, location FROM complaint
             WHERE category = ?1 ORDER BY created_at ASC, complaint_id ASC",
        )?;
        let rows = stmt.query_map(params![category.as_str()], |row| {
            Ok(crate::duplicate::DuplicateCandidate {
                id: row.get(0)?,
                description: row.get(1)?,
                location: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
