use crate::util::{decode_enum, decode_json, encode_enum, from_rfc3339, to_rfc3339};
use rusqlite::Connection;
use sf_core::error::SkillForgeError;
use sf_core::events::EventRepository;
use sf_events::types::EventRecord;
use ulid::Ulid;

pub struct EventRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> EventRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl<'a> EventRepository for EventRepo<'a> {
    fn append(&self, mut event: EventRecord) -> Result<EventRecord, SkillForgeError> {
        event.seq = next_seq(self.conn)?;
        event.id = format!("evt_{}", Ulid::new());
        let sql = "INSERT INTO events (id, seq, at, correlation_id, source, body_json) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
        let params = (
            event.id.clone(),
            event.seq,
            to_rfc3339(&event.at),
            event.correlation_id.clone(),
            encode_enum(&event.source).map_err(internal)?,
            event.body.to_string(),
        );
        self.conn.execute(sql, params).map_err(internal)?;
        Ok(event)
    }

    fn list(
        &self,
        after: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<EventRecord>, SkillForgeError> {
        let mut sql =
            "SELECT id, seq, at, correlation_id, source, body_json FROM events".to_string();
        let mut params: Vec<rusqlite::types::Value> = Vec::new();
        if let Some(after) = after {
            sql.push_str(&format!(" WHERE seq > ?{}", params.len() + 1));
            params.push(after.into());
        }
        sql.push_str(" ORDER BY seq ASC");
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT ?{}", params.len() + 1));
            params.push(i64::from(limit).into());
        }

        let mut stmt = self.conn.prepare(&sql).map_err(internal)?;
        let mut rows = stmt
            .query(rusqlite::params_from_iter(params))
            .map_err(internal)?;
        let mut events = Vec::new();
        while let Some(row) = rows.next().map_err(internal)? {
            events.push(map_event_row(row)?);
        }
        Ok(events)
    }
}

fn internal<E: std::fmt::Display>(err: E) -> SkillForgeError {
    SkillForgeError::Internal {
        message: err.to_string(),
    }
}

fn next_seq(conn: &Connection) -> Result<i64, SkillForgeError> {
    let seq: i64 = conn
        .query_row("SELECT COALESCE(MAX(seq), 0) FROM events", [], |row| {
            row.get(0)
        })
        .map_err(internal)?;
    Ok(seq + 1)
}

fn map_event_row(row: &rusqlite::Row<'_>) -> Result<EventRecord, SkillForgeError> {
    let id: String = row.get(0).map_err(internal)?;
    let seq: i64 = row.get(1).map_err(internal)?;
    let at: String = row.get(2).map_err(internal)?;
    let correlation_id: Option<String> = row.get(3).map_err(internal)?;
    let source: String = row.get(4).map_err(internal)?;
    let body_json: String = row.get(5).map_err(internal)?;

    Ok(EventRecord {
        id,
        seq,
        at: from_rfc3339(&at).map_err(internal)?,
        correlation_id,
        source: decode_enum(&source).map_err(internal)?,
        body: decode_json(&body_json).map_err(internal)?,
    })
}
