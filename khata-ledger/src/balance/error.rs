use thiserror::Error;

#[derive(Error, Debug)]
pub enum BalanceError {
    #[error("BalanceError - Sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("BalanceError - RowMissing: no balance row for account '{0}'")]
    RowMissing(String),
    #[error("BalanceError - GlRowMissing: no balance row for GL '{0}'")]
    GlRowMissing(String),
}
