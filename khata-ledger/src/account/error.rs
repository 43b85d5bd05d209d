use thiserror::Error;

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("AccountError - Sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("AccountError - NotFound: account '{0}' not found")]
    NotFound(String),
    #[error("AccountError - DuplicateAccountNo: '{0}' already exists")]
    DuplicateAccountNo(String),
    #[error("AccountError - SequenceExhausted: GL '{gl_num}' reached its account sequence limit of {limit}")]
    SequenceExhausted { gl_num: String, limit: i64 },
    #[error("AccountError - NonAssetLoanLimit: loan limit requires an asset GL, got '{0}'")]
    NonAssetLoanLimit(String),
    #[error("AccountError - GlNotLeaf: accounts may only reference leaf GLs, got '{0}'")]
    GlNotLeaf(String),
    #[error("AccountError - CloseNonZeroBalance: account '{account_no}' still holds {balance}")]
    CloseNonZeroBalance {
        account_no: String,
        balance: rust_decimal::Decimal,
    },
    #[error("AccountError - Product: {0}")]
    Product(#[from] crate::product::error::ProductError),
    #[error("AccountError - Balance: {0}")]
    Balance(#[from] crate::balance::error::BalanceError),
    #[error("AccountError - Clock: {0}")]
    Clock(#[from] crate::clock::error::ClockError),
}
