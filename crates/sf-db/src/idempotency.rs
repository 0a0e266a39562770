use crate::util::{from_rfc3339, to_rfc3339, DbError};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

/// Cached response for a replayed mutating request, keyed by the client's
/// idempotency key and the request scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdempotencyRecord {
    pub key: String,
    pub method: String,
    pub path: String,
    pub scope_hash: String,
    pub request_hash: String,
    pub response_status: i32,
    pub response_body: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

pub struct IdempotencyStore<'a> {
    pub conn: &'a Connection,
}

impl<'a> IdempotencyStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn find(&self, key: &str, scope_hash: &str) -> Result<Option<IdempotencyRecord>, DbError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT key, method, path, scope_hash, request_hash, response_status, \
                 response_body, created_at, expires_at FROM idempotency_keys \
                 WHERE key = ?1 AND scope_hash = ?2",
            )
            .map_err(db_err)?;
        let mut rows = stmt.query([key, scope_hash]).map_err(db_err)?;
        let Some(row) = rows.next().map_err(db_err)? else {
            return Ok(None);
        };
        map_record_row(row).map(Some)
    }

    pub fn put(&self, record: IdempotencyRecord) -> Result<(), DbError> {
        let sql = "INSERT INTO idempotency_keys (key, method, path, scope_hash, request_hash, \
             response_status, response_body, created_at, expires_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";
        let params = (
            record.key,
            record.method,
            record.path,
            record.scope_hash,
            record.request_hash,
            record.response_status,
            record.response_body,
            to_rfc3339(&record.created_at),
            to_rfc3339(&record.expires_at),
        );
        self.conn.execute(sql, params).map_err(db_err)?;
        Ok(())
    }

    pub fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, DbError> {
        let affected = self
            .conn
            .execute(
                "DELETE FROM idempotency_keys WHERE expires_at < ?1",
                [to_rfc3339(&now)],
            )
            .map_err(db_err)?;
        Ok(affected as u64)
    }
}

fn db_err(err: rusqlite::Error) -> DbError {
    DbError::Sqlite {
        message: err.to_string(),
    }
}

fn map_record_row(row: &rusqlite::Row<'_>) -> Result<IdempotencyRecord, DbError> {
    let key: String = row.get(0).map_err(db_err)?;
    let method: String = row.get(1).map_err(db_err)?;
    let path: String = row.get(2).map_err(db_err)?;
    let scope_hash: String = row.get(3).map_err(db_err)?;
    let request_hash: String = row.get(4).map_err(db_err)?;
    let response_status: i32 = row.get(5).map_err(db_err)?;
    let response_body: String = row.get(6).map_err(db_err)?;
    let created_at: String = row.get(7).map_err(db_err)?;
    let expires_at: String = row.get(8).map_err(db_err)?;
    Ok(IdempotencyRecord {
        key,
        method,
        path,
        scope_hash,
        request_hash,
        response_status,
        response_body,
        created_at: from_rfc3339(&created_at)?,
        expires_at: from_rfc3339(&expires_at)?,
    })
}
