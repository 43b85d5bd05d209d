use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("HistoryError - Sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
}
