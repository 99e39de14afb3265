//! Database schema management.

use rusqlite::Connection;
use tokio_rusqlite::Error;

/// Initialize the database schema.
pub fn init_schema(conn: &Connection) -> Result<(), Error> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

const SCHEMA: &str = r#"
-- Job definitions; status and last_result hold their integer codes
CREATE TABLE IF NOT EXISTS jobs (
    job_id TEXT PRIMARY KEY,
    job_name TEXT NOT NULL,
    job_desc TEXT,
    job_group TEXT NOT NULL,
    job_strategy TEXT NOT NULL DEFAULT '',
    status INTEGER NOT NULL DEFAULT 0,
    cron_expression TEXT NOT NULL,
    last_fire_time TEXT,
    last_complete_time TEXT,
    last_result INTEGER NOT NULL DEFAULT 0,
    next_fire_time TEXT,
    refire_max_count INTEGER NOT NULL DEFAULT 0,
    refire_interval INTEGER NOT NULL DEFAULT 60,
    error_accumulation INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_jobs_group ON jobs(job_group);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_creation() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name='jobs'")
            .unwrap();
        assert!(stmt.exists([]).unwrap());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
    }
}
