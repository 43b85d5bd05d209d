use thiserror::Error;

#[derive(Error, Debug)]
pub enum MovementError {
    #[error("MovementError - Sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
}
