//! Daily interest accrual (EOD Job 2). For every active interest-bearing
//! customer account the day's simple interest on the closing balance is
//! computed and written as a balanced pair of accrual legs, which Job 3
//! turns into GL movements.

pub mod error;

mod entity;
mod repo;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::instrument;

use crate::{
    account::Accounts,
    balance::Balances,
    operation::AtomicOperation,
    primitives::{
        round_money, AccrualStatus, DrCrFlag, TranStatus, INTEREST_DIVISOR,
    },
    product::{Products, SubProduct},
};
pub use entity::*;
use error::InterestError;
use repo::AccrualRepo;

/// Deal accounts (term products) carry their leaf GL under these prefixes;
/// everything else is a running account.
const DEAL_GL_PREFIXES: [&str; 2] = ["1102", "2102"];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccrualRunSummary {
    pub accrual_date: NaiveDate,
    pub accounts_processed: usize,
    pub entries_created: usize,
    pub errors: Vec<AccrualAccountError>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccrualAccountError {
    pub account_no: String,
    pub message: String,
}

#[derive(Clone)]
pub struct InterestAccruals {
    repo: AccrualRepo,
    accounts: Accounts,
    products: Products,
    balances: Balances,
    default_currency: String,
}

impl InterestAccruals {
    pub(crate) fn new(
        pool: &SqlitePool,
        accounts: &Accounts,
        products: &Products,
        balances: &Balances,
        default_currency: String,
    ) -> Self {
        Self {
            repo: AccrualRepo::new(pool),
            accounts: accounts.clone(),
            products: products.clone(),
            balances: balances.clone(),
            default_currency,
        }
    }

    /// Runs the accrual sweep for the date. Per-account failures are
    /// collected into the summary; they never abort the batch.
    #[instrument(name = "khata.interest.run_accruals", skip(self))]
    pub async fn run_accruals(&self, date: NaiveDate) -> Result<AccrualRunSummary, InterestError> {
        let candidates = self.accounts.active_customer_accounts().await?;
        let mut sequential = self.repo.max_sequence_for_date(date).await? + 1;
        let mut summary = AccrualRunSummary {
            accrual_date: date,
            accounts_processed: 0,
            entries_created: 0,
            errors: Vec::new(),
        };

        for account in candidates {
            if !crate::gl::is_liability(&account.gl_num) && !crate::gl::is_asset(&account.gl_num) {
                continue;
            }
            match self
                .accrue_account(&account.account_no, &account.gl_num, account.sub_product_id, date, sequential)
                .await
            {
                Ok(0) => {}
                Ok(entries) => {
                    summary.entries_created += entries;
                    summary.accounts_processed += 1;
                    sequential += 1;
                }
                Err(e) => {
                    tracing::warn!(account_no = %account.account_no, error = %e, "accrual skipped");
                    summary.errors.push(AccrualAccountError {
                        account_no: account.account_no.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            accounts = summary.accounts_processed,
            entries = summary.entries_created,
            errors = summary.errors.len(),
            "interest accrual run complete"
        );
        Ok(summary)
    }

    async fn accrue_account(
        &self,
        account_no: &str,
        gl_num: &str,
        sub_product_id: i64,
        date: NaiveDate,
        sequential: i64,
    ) -> Result<usize, InterestError> {
        let sub_product = self.products.find_sub_product(sub_product_id).await?;

        let rate = match self
            .effective_rate(account_no, gl_num, &sub_product, date)
            .await?
        {
            Some(rate) if !rate.is_zero() => rate,
            _ => return Ok(0),
        };

        let balance = self
            .balances
            .latest_for_account(account_no, date)
            .await
            .map_err(|_| InterestError::BalanceRowMissing(account_no.to_string()))?;
        let closing = balance.closing_bal;
        if closing.is_zero() {
            return Ok(0);
        }

        let accrued = round_money(closing * rate / Decimal::from(INTEREST_DIVISOR));
        if accrued.is_zero() {
            return Ok(0);
        }

        let is_liability = crate::gl::is_liability(gl_num);
        let income_expenditure = sub_product
            .interest_income_expenditure_gl_num
            .as_deref()
            .filter(|gl| !gl.trim().is_empty());
        let receivable_payable = sub_product
            .interest_receivable_payable_gl_num
            .as_deref()
            .filter(|gl| !gl.trim().is_empty());

        // Liability: debit expenditure, credit payable; asset: debit
        // receivable, credit income. Either GL falls back to the other when
        // only one is configured.
        let (debit_gl, credit_gl, debit_narration, credit_narration) = if is_liability {
            let debit = income_expenditure.or(receivable_payable);
            let credit = receivable_payable.or(income_expenditure);
            (
                debit,
                credit,
                format!("Interest Expenditure Accrual - {account_no}"),
                format!("Interest Payable Accrual - {account_no}"),
            )
        } else {
            let debit = receivable_payable.or(income_expenditure);
            let credit = income_expenditure.or(receivable_payable);
            (
                debit,
                credit,
                format!("Interest Receivable Accrual - {account_no}"),
                format!("Interest Income Accrual - {account_no}"),
            )
        };
        let (debit_gl, credit_gl) = match (debit_gl, credit_gl) {
            (Some(d), Some(c)) => (d.to_string(), c.to_string()),
            _ => return Err(InterestError::GlNotConfigured(account_no.to_string())),
        };

        let debit_id = generate_accr_tran_id(date, sequential, 1)?;
        let credit_id = generate_accr_tran_id(date, sequential, 2)?;

        let mut op = AtomicOperation::init(self.repo.pool()).await?;
        for (accr_tran_id, flag, gl_account_no, narration) in [
            (debit_id, DrCrFlag::Debit, debit_gl, debit_narration),
            (credit_id, DrCrFlag::Credit, credit_gl, credit_narration),
        ] {
            let leg = AccrualLeg {
                accr_tran_id,
                account_no: account_no.to_string(),
                accrual_date: date,
                tran_date: date,
                value_date: date,
                interest_rate: rate,
                amount: accrued,
                dr_cr_flag: flag,
                gl_account_no,
                tran_ccy: self.default_currency.clone(),
                fcy_amt: accrued,
                exchange_rate: Decimal::ONE,
                lcy_amt: accrued,
                narration: Some(narration),
                status: AccrualStatus::Pending,
                tran_status: TranStatus::Verified,
            };
            self.repo.insert_leg(&mut **op.tx(), &leg).await?;
        }
        op.commit().await?;
        Ok(2)
    }

    /// Liability deal accounts use the rate fixed on the sub-product at
    /// opening; everything else reads the rate master as of the accrual
    /// date and adds the sub-product's increment. `None` means the product
    /// bears no interest at all.
    async fn effective_rate(
        &self,
        account_no: &str,
        gl_num: &str,
        sub_product: &SubProduct,
        as_of: NaiveDate,
    ) -> Result<Option<Decimal>, InterestError> {
        let is_deal = DEAL_GL_PREFIXES
            .iter()
            .any(|prefix| gl_num.starts_with(prefix));
        if is_deal && crate::gl::is_liability(gl_num) {
            if let Some(fixed) = sub_product.effective_interest_rate {
                return Ok(Some(fixed));
            }
        }
        let Some(intt_code) = sub_product
            .intt_code
            .as_deref()
            .filter(|code| !code.trim().is_empty())
        else {
            return Ok(None);
        };
        let rate = self
            .products
            .latest_rate(intt_code, as_of)
            .await?
            .ok_or_else(|| InterestError::NoRateConfigured(account_no.to_string()))?;
        let increment = sub_product.interest_increment.unwrap_or(Decimal::ZERO);
        Ok(Some(rate.rate + increment))
    }

    pub async fn legs_for_date(&self, date: NaiveDate) -> Result<Vec<AccrualLeg>, InterestError> {
        self.repo.for_date(date).await
    }

    pub(crate) async fn pending_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<AccrualLeg>, InterestError> {
        self.repo.for_date_and_status(date, AccrualStatus::Pending).await
    }

    pub(crate) async fn mark_processed_in_op(
        &self,
        op: &mut AtomicOperation,
        accr_tran_id: &str,
    ) -> Result<(), InterestError> {
        self.repo
            .set_status(&mut **op.tx(), accr_tran_id, AccrualStatus::Processed)
            .await
    }

    pub(crate) async fn distinct_accounts_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<String>, InterestError> {
        self.repo.distinct_accounts_for_date(date).await
    }

    #[cfg(test)]
    pub(crate) fn daily_interest(balance: Decimal, rate: Decimal) -> Decimal {
        round_money(balance * rate / Decimal::from(INTEREST_DIVISOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_interest_matches_the_running_liability_example() {
        // 1,000,000.00 at 7.00% + 0.25% increment over 365 days.
        let balance: Decimal = "1000000.00".parse().unwrap();
        let rate: Decimal = "7.25".parse().unwrap();
        assert_eq!(
            InterestAccruals::daily_interest(balance, rate),
            "198.63".parse::<Decimal>().unwrap()
        );
    }

    #[test]
    fn daily_interest_rounds_half_up() {
        let balance: Decimal = "100.00".parse().unwrap();
        let rate: Decimal = "1.00".parse().unwrap();
        // 100 * 1 / 36500 = 0.00273... -> 0.00
        assert_eq!(
            InterestAccruals::daily_interest(balance, rate),
            Decimal::ZERO
        );
        let balance: Decimal = "10000.00".parse().unwrap();
        // 10000 * 1 / 36500 = 0.27397 -> 0.27
        assert_eq!(
            InterestAccruals::daily_interest(balance, rate),
            "0.27".parse::<Decimal>().unwrap()
        );
    }
}
