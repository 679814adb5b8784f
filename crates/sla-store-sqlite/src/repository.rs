use std::path::Path;
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection};
use sla_core::{HistoryEvent, IncidentId, IncidentStatus, Urgency, WireIncident};
use sla_store::IncidentRepository;

/// Durable incident repository for the CLI deployment. History rides in a
/// JSON column so manual events written by other tools round-trip intact.
pub struct SqliteRepository {
    conn: Mutex<Connection>,
}

impl SqliteRepository {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn = Connection::open(db_path)
            .with_context(|| format!("open sqlite db {}", db_path.display()))?;
        let init_sql = include_str!("../migrations/0001_init.sql");
        conn.execute_batch(init_sql)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn row_to_wire(r: &rusqlite::Row<'_>) -> rusqlite::Result<WireIncident> {
        let history_json: String = r.get(7)?;
        let history: Vec<HistoryEvent> = serde_json::from_str(&history_json).unwrap_or_default();
        Ok(WireIncident {
            id: r.get(0)?,
            created_at: r.get(1)?,
            urgency: r.get(2)?,
            status: r.get(3)?,
            area: r.get(4)?,
            kind: r.get(5)?,
            location: r.get(6)?,
            history,
        })
    }
}

const WIRE_COLUMNS: &str = "id, created_at, urgency, status, area, kind, location, history";

impl IncidentRepository for SqliteRepository {
    fn list_open(&self) -> Result<Vec<WireIncident>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {WIRE_COLUMNS} FROM incidents WHERE status NOT IN ('resolved', 'cancelled')"
        ))?;
        let rows = stmt.query_map([], Self::row_to_wire)?;
        let mut out = vec![];
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn get(&self, id: &IncidentId) -> Result<Option<WireIncident>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare(&format!("SELECT {WIRE_COLUMNS} FROM incidents WHERE id = ?1"))?;
        let mut rows = stmt.query_map(params![id.as_str()], Self::row_to_wire)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    fn update_escalation(
        &self,
        id: &IncidentId,
        urgency: Urgency,
        history: &[HistoryEvent],
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let history_json = serde_json::to_string(history)?;
        let changed = conn.execute(
            "UPDATE incidents SET urgency = ?1, history = ?2 WHERE id = ?3",
            params![urgency.as_str(), history_json, id.as_str()],
        )?;
        if changed == 0 {
            bail!("incident {} not found", id.as_str());
        }
        Ok(())
    }

    fn insert(&self, incident: WireIncident) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let history_json = serde_json::to_string(&incident.history)?;
        conn.execute(
            "INSERT INTO incidents(id, created_at, urgency, status, area, kind, location, history)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                incident.id,
                incident.created_at,
                incident.urgency,
                incident.status,
                incident.area,
                incident.kind,
                incident.location,
                history_json
            ],
        )?;
        Ok(())
    }

    fn set_status(&self, id: &IncidentId, status: IncidentStatus) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE incidents SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id.as_str()],
        )?;
        if changed == 0 {
            bail!("incident {} not found", id.as_str());
        }
        Ok(())
    }
}
