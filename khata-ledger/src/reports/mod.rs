//! Financial reports (EOD Job 7): Trial Balance CSV and Balance Sheet XLSX
//! written under `reports/<yyyymmdd>/`, generated from the day's closed GL
//! balances.

pub mod error;

mod balance_sheet;
mod trial_balance;

use chrono::NaiveDate;
use serde::Serialize;
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};
use tracing::instrument;

use crate::{balance::Balances, gl::ChartOfAccounts};
pub use balance_sheet::BalanceSheetLine;
use error::ReportError;
pub use trial_balance::{TrialBalanceLine, TrialBalanceTotals};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    TrialBalance,
    BalanceSheet,
}

impl ReportKind {
    pub fn file_name(&self, report_date: &str) -> String {
        match self {
            ReportKind::TrialBalance => format!("TrialBalance_{report_date}.csv"),
            ReportKind::BalanceSheet => format!("BalanceSheet_{report_date}.xlsx"),
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ReportKind::TrialBalance => "text/csv",
            ReportKind::BalanceSheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPaths {
    pub report_date: String,
    pub trial_balance: PathBuf,
    pub balance_sheet: PathBuf,
}

#[derive(Clone)]
pub struct FinancialReports {
    balances: Balances,
    chart: ChartOfAccounts,
    reports_dir: PathBuf,
}

impl FinancialReports {
    pub(crate) fn new(balances: &Balances, chart: &ChartOfAccounts, reports_dir: PathBuf) -> Self {
        Self {
            balances: balances.clone(),
            chart: chart.clone(),
            reports_dir,
        }
    }

    /// Generates both reports for the date. The trial balance proves total
    /// debits equal total credits and fails the whole job when they do not.
    #[instrument(name = "khata.reports.generate", skip(self))]
    pub async fn generate(&self, date: NaiveDate) -> Result<ReportPaths, ReportError> {
        let report_date = date.format("%Y%m%d").to_string();
        let dir = self.reports_dir.join(&report_date);
        fs::create_dir_all(&dir)?;

        let balances = self.balances.gl_rows_for_date(date).await?;
        // Strictly the active-GL set: GLs referenced by a sub-product with at
        // least one open account. An empty set yields an empty trial balance.
        let active: HashSet<String> = self.chart.active_gl_nums().await?.into_iter().collect();
        let mut trial_rows = Vec::new();
        for row in &balances {
            if active.contains(&row.gl_num) {
                let gl_name = self.chart.gl_name(&row.gl_num).await?;
                trial_rows.push((row.clone(), gl_name));
            }
        }

        let trial_balance_path = dir.join(ReportKind::TrialBalance.file_name(&report_date));
        let (lines, totals) = trial_balance::build_lines(trial_rows);
        let file = fs::File::create(&trial_balance_path)?;
        trial_balance::write_csv(file, &lines, &totals)?;
        if totals.dr_summation != totals.cr_summation {
            return Err(ReportError::TrialBalanceImbalanced {
                total_dr: totals.dr_summation,
                total_cr: totals.cr_summation,
            });
        }

        let sheet_set: HashSet<String> = self
            .chart
            .balance_sheet_gl_nums()
            .await?
            .into_iter()
            .collect();
        let mut sheet_rows = Vec::new();
        for row in &balances {
            if sheet_set.contains(&row.gl_num) {
                let gl_name = self.chart.gl_name(&row.gl_num).await?;
                sheet_rows.push((row.clone(), gl_name));
            }
        }
        let (liabilities, assets) = balance_sheet::split_sides(sheet_rows);
        let balance_sheet_path = dir.join(ReportKind::BalanceSheet.file_name(&report_date));
        balance_sheet::write_xlsx(&balance_sheet_path, &report_date, &liabilities, &assets)?;

        tracing::info!(
            trial_balance = %trial_balance_path.display(),
            balance_sheet = %balance_sheet_path.display(),
            "reports generated"
        );
        Ok(ReportPaths {
            report_date,
            trial_balance: trial_balance_path,
            balance_sheet: balance_sheet_path,
        })
    }

    /// Raw bytes of a previously generated report, for download endpoints.
    pub async fn read_report(
        &self,
        kind: ReportKind,
        report_date: &str,
    ) -> Result<Vec<u8>, ReportError> {
        validate_report_date(report_date)?;
        let path = self
            .reports_dir
            .join(report_date)
            .join(kind.file_name(report_date));
        if !path.exists() {
            return Err(ReportError::NotGenerated(path.display().to_string()));
        }
        Ok(fs::read(path)?)
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }
}

fn validate_report_date(report_date: &str) -> Result<(), ReportError> {
    if report_date.len() != 8 || !report_date.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ReportError::InvalidReportDate(report_date.to_string()));
    }
    NaiveDate::parse_from_str(report_date, "%Y%m%d")
        .map_err(|_| ReportError::InvalidReportDate(report_date.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_dates_must_be_eight_digits() {
        assert!(validate_report_date("20240115").is_ok());
        assert!(validate_report_date("2024-01-15").is_err());
        assert!(validate_report_date("20241315").is_err());
        assert!(validate_report_date("../../etc").is_err());
    }

    #[test]
    fn file_names_follow_the_date() {
        assert_eq!(
            ReportKind::TrialBalance.file_name("20240115"),
            "TrialBalance_20240115.csv"
        );
        assert_eq!(
            ReportKind::BalanceSheet.file_name("20240115"),
            "BalanceSheet_20240115.xlsx"
        );
    }
}
