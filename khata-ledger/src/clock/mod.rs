//! The system clock. The ledger never reads the wall clock: the open
//! business date lives in `parameter_table` under `System_Date` and only
//! moves forward when EOD Job 8 advances it (or an administrator sets it).

pub mod error;
mod repo;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::SqlitePool;
use tracing::instrument;

use crate::operation::AtomicOperation;
use error::ClockError;
use repo::ParameterRepo;

pub const SYSTEM_DATE: &str = "System_Date";
pub const LAST_EOD_DATE: &str = "Last_EOD_Date";
pub const LAST_EOD_TIMESTAMP: &str = "Last_EOD_Timestamp";
pub const LAST_EOD_USER: &str = "Last_EOD_User";

#[derive(Clone)]
pub struct SystemClock {
    repo: ParameterRepo,
    default_date: Option<NaiveDate>,
}

impl SystemClock {
    pub(crate) fn new(pool: &SqlitePool, default_date: Option<NaiveDate>) -> Self {
        Self {
            repo: ParameterRepo::new(pool),
            default_date,
        }
    }

    /// Writes the configured default into the parameter table when no
    /// `System_Date` row exists yet. Called once at ledger init.
    pub(crate) async fn seed_default(&self) -> Result<(), ClockError> {
        if self.repo.find(SYSTEM_DATE).await?.is_none() {
            if let Some(date) = self.default_date {
                self.set(date, "SYSTEM").await?;
            }
        }
        Ok(())
    }

    /// The open business date.
    pub async fn now(&self) -> Result<NaiveDate, ClockError> {
        match self.repo.find(SYSTEM_DATE).await? {
            Some(raw) => raw.parse().map_err(|_| ClockError::Corrupt(raw)),
            None => self.default_date.ok_or(ClockError::NotConfigured),
        }
    }

    /// The business timestamp: `System_Date` at start of day. Used wherever
    /// a record wants a datetime, so replays are deterministic.
    pub async fn now_timestamp(&self) -> Result<NaiveDateTime, ClockError> {
        Ok(self.now().await?.and_time(NaiveTime::MIN))
    }

    #[instrument(name = "khata.clock.set", skip(self))]
    pub async fn set(&self, date: NaiveDate, user_id: &str) -> Result<(), ClockError> {
        self.repo
            .upsert(
                SYSTEM_DATE,
                &date.to_string(),
                user_id,
                date.and_time(NaiveTime::MIN),
            )
            .await
    }

    pub(crate) async fn advance_in_op(
        &self,
        op: &mut AtomicOperation,
        closed_date: NaiveDate,
        user_id: &str,
    ) -> Result<NaiveDate, ClockError> {
        let next = closed_date.succ_opt().expect("date overflow");
        let stamp = closed_date.and_time(NaiveTime::MIN);
        let tx = op.tx();
        self.repo
            .upsert_in_executor(&mut **tx, SYSTEM_DATE, &next.to_string(), user_id, stamp)
            .await?;
        self.repo
            .upsert_in_executor(
                &mut **tx,
                LAST_EOD_DATE,
                &closed_date.to_string(),
                user_id,
                stamp,
            )
            .await?;
        self.repo
            .upsert_in_executor(
                &mut **tx,
                LAST_EOD_TIMESTAMP,
                &stamp.to_string(),
                user_id,
                stamp,
            )
            .await?;
        self.repo
            .upsert_in_executor(&mut **tx, LAST_EOD_USER, user_id, user_id, stamp)
            .await?;
        Ok(next)
    }

    /// Raw parameter lookup for operator status views.
    pub async fn parameter(&self, name: &str) -> Result<Option<String>, ClockError> {
        self.repo.find(name).await
    }
}
