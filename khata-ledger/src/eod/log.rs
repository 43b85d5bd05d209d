use std::{fmt, str::FromStr};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row, SqlitePool};

use super::error::EodError;
use crate::{db, primitives::InvalidEnumValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EodStatus {
    Running,
    Success,
    Failed,
}

impl EodStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EodStatus::Running => "Running",
            EodStatus::Success => "Success",
            EodStatus::Failed => "Failed",
        }
    }
}

impl fmt::Display for EodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EodStatus {
    type Err = InvalidEnumValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Running" => Ok(EodStatus::Running),
            "Success" => Ok(EodStatus::Success),
            "Failed" => Ok(EodStatus::Failed),
            other => Err(InvalidEnumValue {
                field: "status",
                value: other.to_string(),
            }),
        }
    }
}

/// Audit row for one job execution. The start row and the completion row
/// are committed in independent units so the trail survives a rollback of
/// the job's own work.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EodLogEntry {
    pub log_id: i64,
    pub eod_date: NaiveDate,
    pub job_number: i64,
    pub job_name: String,
    pub system_date: NaiveDate,
    pub user_id: String,
    pub start_timestamp: NaiveDateTime,
    pub end_timestamp: Option<NaiveDateTime>,
    pub records_processed: i64,
    pub status: EodStatus,
    pub error_message: Option<String>,
    pub failed_at_step: Option<String>,
}

impl FromRow<'_, SqliteRow> for EodLogEntry {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            log_id: row.try_get("log_id")?,
            eod_date: db::date_column(row, "eod_date")?,
            job_number: row.try_get("job_number")?,
            job_name: row.try_get("job_name")?,
            system_date: db::date_column(row, "system_date")?,
            user_id: row.try_get("user_id")?,
            start_timestamp: row.try_get("start_timestamp")?,
            end_timestamp: row.try_get("end_timestamp")?,
            records_processed: row.try_get("records_processed")?,
            status: db::parsed_column(row, "status")?,
            error_message: row.try_get("error_message")?,
            failed_at_step: row.try_get("failed_at_step")?,
        })
    }
}

#[derive(Debug, Clone)]
pub(super) struct EodLogRepo {
    pool: SqlitePool,
}

impl EodLogRepo {
    pub fn new(pool: &SqlitePool) -> Self {
        Self { pool: pool.clone() }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn log(
        &self,
        eod_date: NaiveDate,
        job_number: u8,
        job_name: &str,
        system_date: NaiveDate,
        user_id: &str,
        start_timestamp: NaiveDateTime,
        end_timestamp: Option<NaiveDateTime>,
        records_processed: i64,
        status: EodStatus,
        error_message: Option<&str>,
        failed_at_step: Option<&str>,
    ) -> Result<(), EodError> {
        sqlx::query(
            r#"
            INSERT INTO eod_log_table
                (eod_date, job_number, job_name, system_date, user_id, start_timestamp,
                 end_timestamp, records_processed, status, error_message, failed_at_step)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(eod_date)
        .bind(job_number as i64)
        .bind(job_name)
        .bind(system_date)
        .bind(user_id)
        .bind(start_timestamp)
        .bind(end_timestamp)
        .bind(records_processed)
        .bind(status.as_str())
        .bind(error_message)
        .bind(failed_at_step)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn has_success(&self, eod_date: NaiveDate, job_number: u8) -> Result<bool, EodError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM eod_log_table \
             WHERE eod_date = ? AND job_number = ? AND status = 'Success'",
        )
        .bind(eod_date)
        .bind(job_number as i64)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    pub async fn for_date(&self, eod_date: NaiveDate) -> Result<Vec<EodLogEntry>, EodError> {
        let rows = sqlx::query_as::<_, EodLogEntry>(
            "SELECT log_id, eod_date, job_number, job_name, system_date, user_id, \
                    start_timestamp, end_timestamp, records_processed, status, error_message, \
                    failed_at_step \
             FROM eod_log_table WHERE eod_date = ? ORDER BY log_id",
        )
        .bind(eod_date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
