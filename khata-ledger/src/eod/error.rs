use chrono::NaiveDate;
use thiserror::Error;

use super::EodJob;

#[derive(Error, Debug)]
pub enum EodError {
    #[error("EodError - Sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("EodError - UnknownJob: {0} is not a batch job number")]
    UnknownJob(u8),
    #[error("EodError - AlreadyExecuted: job {job} already succeeded on {eod_date}")]
    AlreadyExecuted { job: EodJob, eod_date: NaiveDate },
    #[error("EodError - PreviousJobIncomplete: job {job} needs its predecessor to succeed on {eod_date}")]
    PreviousJobIncomplete { job: EodJob, eod_date: NaiveDate },
    #[error("EodError - Clock: {0}")]
    Clock(#[from] crate::clock::error::ClockError),
    #[error("EodError - Account: {0}")]
    Account(#[from] crate::account::error::AccountError),
    #[error("EodError - Balance: {0}")]
    Balance(#[from] crate::balance::error::BalanceError),
    #[error("EodError - Interest: {0}")]
    Interest(#[from] crate::interest::error::InterestError),
    #[error("EodError - Movement: {0}")]
    Movement(#[from] crate::movement::error::MovementError),
    #[error("EodError - Report: {0}")]
    Report(#[from] crate::reports::error::ReportError),
}
