use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use sqlx::MySqlPool;
use tracing::debug;

use crate::model::{
    attendance::RawPunch,
    employee::{EmployeeIdentity, EmployeeRow},
};

/// Read access to the clocking device store.
#[async_trait]
pub trait PunchEventSource: Send + Sync {
    /// Punches with `start <= punch_time < end`.
    async fn query_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RawPunch>>;
}

/// Read access to the employee roster, inactive employees included.
#[async_trait]
pub trait RosterSource: Send + Sync {
    async fn list_employees(&self) -> Result<Vec<EmployeeIdentity>>;
}

/// Both collaborators the attendance report reads from.
#[derive(Clone)]
pub struct AttendanceSources {
    pub punches: Arc<dyn PunchEventSource>,
    pub roster: Arc<dyn RosterSource>,
}

impl AttendanceSources {
    pub fn new(punches: Arc<dyn PunchEventSource>, roster: Arc<dyn RosterSource>) -> Self {
        Self { punches, roster }
    }

    pub fn mysql(attendance_pool: MySqlPool, roster_pool: MySqlPool) -> Self {
        Self::new(
            Arc::new(MySqlPunchSource::new(attendance_pool)),
            Arc::new(MySqlRosterSource::new(roster_pool)),
        )
    }
}

pub struct MySqlPunchSource {
    pool: MySqlPool,
}

impl MySqlPunchSource {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PunchEventSource for MySqlPunchSource {
    async fn query_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RawPunch>> {
        // punch_time is a UTC DATETIME; returned as text so bad rows are skipped, not fatal
        let mut stream = sqlx::query_as::<_, RawPunch>(
            r#"
            SELECT device_id, COALESCE(CAST(punch_time AS CHAR), '') AS punch_time
            FROM punch_events
            WHERE punch_time >= ? AND punch_time < ?
            ORDER BY punch_time
            "#,
        )
        .bind(start.naive_utc())
        .bind(end.naive_utc())
        .fetch(&self.pool);

        let mut punches = Vec::new();
        while let Some(punch) = stream
            .try_next()
            .await
            .context("failed to read punch events")?
        {
            punches.push(punch);
        }

        debug!(count = punches.len(), %start, %end, "Loaded punch events");
        Ok(punches)
    }
}

pub struct MySqlRosterSource {
    pool: MySqlPool,
}

impl MySqlRosterSource {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RosterSource for MySqlRosterSource {
    async fn list_employees(&self) -> Result<Vec<EmployeeIdentity>> {
        let rows = sqlx::query_as::<_, EmployeeRow>(
            r#"
            SELECT id, COALESCE(employee_code, '') AS employee_code, first_name, last_name
            FROM employees
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to read employee roster")?;

        debug!(count = rows.len(), "Loaded employee roster");
        Ok(rows.into_iter().map(EmployeeIdentity::from).collect())
    }
}
