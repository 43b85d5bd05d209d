use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("TransactionError - Sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("TransactionError - NotFound: transaction '{0}' not found")]
    NotFound(String),
    #[error("TransactionError - OriginalNotFound: transaction '{0}' not found")]
    OriginalNotFound(String),
    #[error("TransactionError - TooFewLegs: a transaction needs at least two legs")]
    TooFewLegs,
    #[error("TransactionError - NonPositiveAmount: leg on account '{0}' must carry a positive amount")]
    NonPositiveAmount(String),
    #[error("TransactionError - Unbalanced: debits {debits} do not equal credits {credits}")]
    Unbalanced { debits: Decimal, credits: Decimal },
    #[error("TransactionError - NotEntry: transaction '{0}' has no legs awaiting posting")]
    NotEntry(String),
    #[error("TransactionError - AlreadyVerified: transaction '{0}' is already verified")]
    AlreadyVerified(String),
    #[error("TransactionError - AccountInactive: account '{account_no}' is {status}")]
    AccountInactive {
        account_no: String,
        status: crate::primitives::AccountStatus,
    },
    #[error(
        "TransactionError - InsufficientBalance: account '{account_no}' has {available} available, debit is {amount}"
    )]
    InsufficientBalance {
        account_no: String,
        available: Decimal,
        amount: Decimal,
    },
    #[error("TransactionError - Account: {0}")]
    Account(#[from] crate::account::error::AccountError),
    #[error("TransactionError - Balance: {0}")]
    Balance(#[from] crate::balance::error::BalanceError),
    #[error("TransactionError - Clock: {0}")]
    Clock(#[from] crate::clock::error::ClockError),
    #[error("TransactionError - Movement: {0}")]
    Movement(#[from] crate::movement::error::MovementError),
    #[error("TransactionError - History: {0}")]
    History(#[from] crate::history::error::HistoryError),
    #[error("TransactionError - Gl: {0}")]
    Gl(#[from] crate::gl::error::GlError),
}
