use thiserror::Error;

use crate::{
    account::error::AccountError, balance::error::BalanceError, bod::error::BodError,
    clock::error::ClockError, eod::error::EodError, gl::error::GlError,
    history::error::HistoryError, interest::error::InterestError, movement::error::MovementError,
    product::error::ProductError, reports::error::ReportError, transaction::error::TransactionError,
};

/// Coarse classification used at the system boundary: operator endpoints
/// map these onto HTTP statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    BusinessRule,
    Conflict,
    InvariantViolation,
    Transient,
    Configuration,
    Io,
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("ConfigError: {0}")]
    Config(String),
    #[error("Sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("DbMigrationError: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error(transparent)]
    Clock(#[from] ClockError),
    #[error(transparent)]
    Gl(#[from] GlError),
    #[error(transparent)]
    Product(#[from] ProductError),
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error(transparent)]
    Balance(#[from] BalanceError),
    #[error(transparent)]
    Transaction(#[from] TransactionError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Movement(#[from] MovementError),
    #[error(transparent)]
    Interest(#[from] InterestError),
    #[error(transparent)]
    Eod(#[from] EodError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Bod(#[from] BodError),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::Config(_) => ErrorKind::Configuration,
            LedgerError::Sqlx(_) | LedgerError::Migrate(_) => ErrorKind::Transient,
            LedgerError::Clock(e) => clock_kind(e),
            LedgerError::Gl(e) => gl_kind(e),
            LedgerError::Product(e) => product_kind(e),
            LedgerError::Account(e) => account_kind(e),
            LedgerError::Balance(e) => balance_kind(e),
            LedgerError::Transaction(e) => transaction_kind(e),
            LedgerError::History(_) | LedgerError::Movement(_) => ErrorKind::Transient,
            LedgerError::Interest(e) => interest_kind(e),
            LedgerError::Eod(e) => eod_kind(e),
            LedgerError::Report(e) => report_kind(e),
            LedgerError::Bod(e) => match e {
                BodError::Sqlx(_) => ErrorKind::Transient,
                BodError::Clock(e) => clock_kind(e),
                BodError::Transaction(e) => transaction_kind(e),
            },
        }
    }
}

fn clock_kind(e: &ClockError) -> ErrorKind {
    match e {
        ClockError::Sqlx(_) => ErrorKind::Transient,
        ClockError::NotConfigured | ClockError::Corrupt(_) => ErrorKind::Configuration,
    }
}

fn gl_kind(e: &GlError) -> ErrorKind {
    match e {
        GlError::Sqlx(_) => ErrorKind::Transient,
        GlError::NotFound(_) => ErrorKind::NotFound,
        GlError::DuplicateGl(_) => ErrorKind::Conflict,
        GlError::InvalidLayer(_) | GlError::ParentNotFound { .. } | GlError::Builder(_) => {
            ErrorKind::BusinessRule
        }
    }
}

fn product_kind(e: &ProductError) -> ErrorKind {
    match e {
        ProductError::Sqlx(_) => ErrorKind::Transient,
        ProductError::NotFound(_) | ProductError::CustomerNotFound(_) => ErrorKind::NotFound,
        ProductError::DuplicateCode(_) => ErrorKind::Conflict,
        ProductError::GlNotLeaf(_) => ErrorKind::BusinessRule,
        ProductError::Gl(e) => gl_kind(e),
    }
}

fn account_kind(e: &AccountError) -> ErrorKind {
    match e {
        AccountError::Sqlx(_) => ErrorKind::Transient,
        AccountError::NotFound(_) => ErrorKind::NotFound,
        AccountError::DuplicateAccountNo(_) => ErrorKind::Conflict,
        AccountError::SequenceExhausted { .. }
        | AccountError::NonAssetLoanLimit(_)
        | AccountError::GlNotLeaf(_)
        | AccountError::CloseNonZeroBalance { .. } => ErrorKind::BusinessRule,
        AccountError::Product(e) => product_kind(e),
        AccountError::Balance(e) => balance_kind(e),
        AccountError::Clock(e) => clock_kind(e),
    }
}

fn balance_kind(e: &BalanceError) -> ErrorKind {
    match e {
        BalanceError::Sqlx(_) => ErrorKind::Transient,
        BalanceError::RowMissing(_) | BalanceError::GlRowMissing(_) => ErrorKind::BusinessRule,
    }
}

fn transaction_kind(e: &TransactionError) -> ErrorKind {
    match e {
        TransactionError::Sqlx(_) => ErrorKind::Transient,
        TransactionError::NotFound(_) | TransactionError::OriginalNotFound(_) => {
            ErrorKind::NotFound
        }
        TransactionError::NotEntry(_) | TransactionError::AlreadyVerified(_) => ErrorKind::Conflict,
        TransactionError::TooFewLegs
        | TransactionError::NonPositiveAmount(_)
        | TransactionError::Unbalanced { .. }
        | TransactionError::AccountInactive { .. }
        | TransactionError::InsufficientBalance { .. } => ErrorKind::BusinessRule,
        TransactionError::Account(e) => account_kind(e),
        TransactionError::Balance(e) => balance_kind(e),
        TransactionError::Clock(e) => clock_kind(e),
        TransactionError::Movement(_) | TransactionError::History(_) => ErrorKind::Transient,
        TransactionError::Gl(e) => gl_kind(e),
    }
}

fn interest_kind(e: &InterestError) -> ErrorKind {
    match e {
        InterestError::Sqlx(_) => ErrorKind::Transient,
        InterestError::NoRateConfigured(_) | InterestError::GlNotConfigured(_) => {
            ErrorKind::Configuration
        }
        InterestError::BalanceRowMissing(_)
        | InterestError::InvalidSequence(_)
        | InterestError::InvalidRowSuffix(_)
        | InterestError::InvalidId(_) => ErrorKind::BusinessRule,
        InterestError::Product(e) => product_kind(e),
        InterestError::Balance(e) => balance_kind(e),
        InterestError::Account(e) => account_kind(e),
        InterestError::Clock(e) => clock_kind(e),
    }
}

fn eod_kind(e: &EodError) -> ErrorKind {
    match e {
        EodError::Sqlx(_) => ErrorKind::Transient,
        EodError::UnknownJob(_) => ErrorKind::BusinessRule,
        EodError::AlreadyExecuted { .. } | EodError::PreviousJobIncomplete { .. } => {
            ErrorKind::Conflict
        }
        EodError::Clock(e) => clock_kind(e),
        EodError::Account(e) => account_kind(e),
        EodError::Balance(e) => balance_kind(e),
        EodError::Interest(e) => interest_kind(e),
        EodError::Movement(_) => ErrorKind::Transient,
        EodError::Report(e) => report_kind(e),
    }
}

fn report_kind(e: &ReportError) -> ErrorKind {
    match e {
        ReportError::Io(_) | ReportError::Csv(_) | ReportError::Xlsx(_) => ErrorKind::Io,
        ReportError::TrialBalanceImbalanced { .. } => ErrorKind::InvariantViolation,
        ReportError::InvalidReportDate(_) => ErrorKind::BusinessRule,
        ReportError::NotGenerated(_) => ErrorKind::NotFound,
        ReportError::Balance(e) => balance_kind(e),
        ReportError::Gl(e) => gl_kind(e),
    }
}
