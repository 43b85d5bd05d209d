use thiserror::Error;

#[derive(Error, Debug)]
pub enum InterestError {
    #[error("InterestError - Sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("InterestError - NoRateConfigured: no rate effective for account '{0}'")]
    NoRateConfigured(String),
    #[error("InterestError - BalanceRowMissing: no balance row for account '{0}'")]
    BalanceRowMissing(String),
    #[error("InterestError - GlNotConfigured: sub-product of account '{0}' maps no interest GL")]
    GlNotConfigured(String),
    #[error("InterestError - InvalidSequence: {0} is outside 1..=999999999")]
    InvalidSequence(i64),
    #[error("InterestError - InvalidRowSuffix: {0} is neither 1 nor 2")]
    InvalidRowSuffix(u8),
    #[error("InterestError - InvalidId: '{0}' is not a 20-character accrual id")]
    InvalidId(String),
    #[error("InterestError - Product: {0}")]
    Product(#[from] crate::product::error::ProductError),
    #[error("InterestError - Balance: {0}")]
    Balance(#[from] crate::balance::error::BalanceError),
    #[error("InterestError - Account: {0}")]
    Account(#[from] crate::account::error::AccountError),
    #[error("InterestError - Clock: {0}")]
    Clock(#[from] crate::clock::error::ClockError),
}
