use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("ReportError - Io: {0}")]
    Io(#[from] std::io::Error),
    #[error("ReportError - Csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("ReportError - Xlsx: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error(
        "ReportError - TrialBalanceImbalanced: total DR {total_dr} does not equal total CR {total_cr}"
    )]
    TrialBalanceImbalanced {
        total_dr: Decimal,
        total_cr: Decimal,
    },
    #[error("ReportError - InvalidReportDate: '{0}' is not a yyyymmdd date")]
    InvalidReportDate(String),
    #[error("ReportError - NotGenerated: report file '{0}' does not exist")]
    NotGenerated(String),
    #[error("ReportError - Balance: {0}")]
    Balance(#[from] crate::balance::error::BalanceError),
    #[error("ReportError - Gl: {0}")]
    Gl(#[from] crate::gl::error::GlError),
}
