use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClockError {
    #[error("ClockError - Sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("ClockError - NotConfigured: System_Date parameter is not set")]
    NotConfigured,
    #[error("ClockError - Corrupt: System_Date parameter holds '{0}'")]
    Corrupt(String),
}
