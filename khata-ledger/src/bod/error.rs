use thiserror::Error;

#[derive(Error, Debug)]
pub enum BodError {
    #[error("BodError - Sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("BodError - Clock: {0}")]
    Clock(#[from] crate::clock::error::ClockError),
    #[error("BodError - Transaction: {0}")]
    Transaction(#[from] crate::transaction::error::TransactionError),
}
