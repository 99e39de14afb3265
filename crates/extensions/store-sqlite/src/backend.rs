//! SQLite job store implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Row, params};
use std::path::Path;
use tokio_rusqlite::Connection;
use tracing::{debug, warn};

use cronsync_protocols::{JobDefinition, JobResult, JobStatus, JobStore, StoreError};

use crate::schema::init_schema;

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;

const SELECT_JOB: &str = "SELECT job_id, job_name, job_desc, job_group, job_strategy, status,
        cron_expression, last_fire_time, last_complete_time, last_result, next_fire_time,
        refire_max_count, refire_interval, error_accumulation
     FROM jobs";

/// SQLite-backed [`JobStore`].
pub struct SqliteJobStore {
    conn: Connection,
}

impl SqliteJobStore {
    /// Create a new in-memory database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Self::init(conn).await
    }

    /// Open (creating if needed) a file-backed database.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Connection(e.to_string()))?;
        }
        debug!("Opening job store at {}", path.display());
        let conn = Connection::open(path)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.call(|conn| Ok(init_schema(conn)?))
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(Self { conn })
    }
}

fn to_text(time: Option<DateTime<Utc>>) -> Option<String> {
    time.map(|t| t.to_rfc3339())
}

fn from_text(column: &str, text: Option<String>) -> Option<DateTime<Utc>> {
    let text = text?;
    match DateTime::parse_from_rfc3339(&text) {
        Ok(time) => Some(time.with_timezone(&Utc)),
        Err(e) => {
            warn!("Ignoring unreadable {} '{}': {}", column, text, e);
            None
        }
    }
}

fn row_to_job(row: &Row<'_>) -> rusqlite::Result<JobDefinition> {
    let refire_interval: i64 = row.get(12)?;
    Ok(JobDefinition {
        job_id: row.get(0)?,
        job_name: row.get(1)?,
        job_desc: row.get(2)?,
        job_group: row.get(3)?,
        job_strategy: row.get(4)?,
        status: JobStatus::from_code(row.get(5)?),
        cron_expression: row.get(6)?,
        last_fire_time: from_text("last_fire_time", row.get(7)?),
        last_complete_time: from_text("last_complete_time", row.get(8)?),
        last_result: JobResult::from_code(row.get(9)?),
        next_fire_time: from_text("next_fire_time", row.get(10)?),
        refire_max_count: row.get(11)?,
        refire_interval: u64::try_from(refire_interval).unwrap_or_default(),
        error_accumulation: row.get(13)?,
    })
}

#[async_trait]
impl JobStore for SqliteJobStore {
    async fn find_by_job_id(&self, job_id: &str) -> Result<Option<JobDefinition>, StoreError> {
        let job_id = job_id.to_string();
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!("{SELECT_JOB} WHERE job_id = ?1"))?;
                match stmt.query_row([&job_id], row_to_job) {
                    Ok(job) => Ok(Some(job)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }

    async fn find_by_job_group(&self, group: &str) -> Result<Vec<JobDefinition>, StoreError> {
        let group = group.to_string();
        self.conn
            .call(move |conn| {
                let mut stmt =
                    conn.prepare(&format!("{SELECT_JOB} WHERE job_group = ?1 ORDER BY job_id"))?;
                let jobs = stmt
                    .query_map([&group], row_to_job)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(jobs)
            })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }

    async fn find_all(&self) -> Result<Vec<JobDefinition>, StoreError> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare(&format!("{SELECT_JOB} ORDER BY job_id"))?;
                let jobs = stmt
                    .query_map([], row_to_job)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(jobs)
            })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }

    async fn save(&self, job: &JobDefinition) -> Result<(), StoreError> {
        let job = job.clone();
        let refire_interval = i64::try_from(job.refire_interval)
            .map_err(|_| StoreError::Serialization(format!("refire_interval {} too large", job.refire_interval)))?;

        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO jobs (job_id, job_name, job_desc, job_group, job_strategy, status,
                        cron_expression, last_fire_time, last_complete_time, last_result,
                        next_fire_time, refire_max_count, refire_interval, error_accumulation)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                     ON CONFLICT(job_id) DO UPDATE SET
                        job_name = excluded.job_name,
                        job_desc = excluded.job_desc,
                        job_group = excluded.job_group,
                        job_strategy = excluded.job_strategy,
                        status = excluded.status,
                        cron_expression = excluded.cron_expression,
                        last_fire_time = excluded.last_fire_time,
                        last_complete_time = excluded.last_complete_time,
                        last_result = excluded.last_result,
                        next_fire_time = excluded.next_fire_time,
                        refire_max_count = excluded.refire_max_count,
                        refire_interval = excluded.refire_interval,
                        error_accumulation = excluded.error_accumulation",
                    params![
                        job.job_id,
                        job.job_name,
                        job.job_desc,
                        job.job_group,
                        job.job_strategy,
                        job.status.code(),
                        job.cron_expression,
                        to_text(job.last_fire_time),
                        to_text(job.last_complete_time),
                        job.last_result.code(),
                        to_text(job.next_fire_time),
                        job.refire_max_count,
                        refire_interval,
                        job.error_accumulation,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }

    async fn delete(&self, job_id: &str) -> Result<bool, StoreError> {
        let job_id = job_id.to_string();
        self.conn
            .call(move |conn| {
                let removed = conn.execute("DELETE FROM jobs WHERE job_id = ?1", [&job_id])?;
                Ok(removed > 0)
            })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }
}
