use rusqlite::{Connection, Result};

pub fn open(path: &str) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "busy_timeout", 5000)?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    let sql = include_str!("../migrations/0001_init.sql");
    conn.execute_batch(sql)?;
    Ok(())
}

pub fn open_and_migrate(path: &str) -> Result<Connection> {
    let conn = open(path)?;
    migrate(&conn)?;
    Ok(conn)
}

pub fn with_test_db() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    migrate(&conn)?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_is_idempotent_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("skillforge.db");
        let path = path.to_str().expect("utf-8 path");
        {
            let conn = open_and_migrate(path).expect("first open");
            conn.execute_batch("INSERT INTO players (id, display_name, diamonds, xp, created_at, updated_at) VALUES ('usr_00000000000000000000000000', 'ada', 0, 0, '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')")
                .expect("insert");
        }
        let conn = open_and_migrate(path).expect("second open");
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM players", [], |row| row.get(0))
            .expect("count");
        assert_eq!(count, 1);
    }
}
