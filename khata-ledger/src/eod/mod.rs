//! End-of-Day pipeline: eight sequential batch jobs that close the open
//! business day and advance the system date. Job N+1 only starts once job N
//! has a Success log row on the same date; a job that already succeeded is
//! a no-op reporting `AlreadyExecuted`. Jobs 1, 3, 5 and 6 overwrite their
//! day rows on re-run, Job 4 deletes its copies before re-inserting.

pub mod error;

mod log;

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::instrument;

use crate::{
    account::Accounts,
    balance::{AccountBalanceRow, AccountBalanceTable, Balances, GlBalanceRow},
    clock::SystemClock,
    gl,
    interest::InterestAccruals,
    movement::GlMovements,
    operation::AtomicOperation,
    primitives::{AccountKind, DrCrFlag},
    reports::FinancialReports,
};
use error::EodError;
pub use log::{EodLogEntry, EodStatus};
use log::EodLogRepo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EodJob {
    AccountBalanceUpdate,
    InterestAccrual,
    InterestAccrualGlMovements,
    GlMovementUpdate,
    GlBalanceUpdate,
    InterestAccrualAccountBalance,
    FinancialReports,
    SystemDateIncrement,
}

impl EodJob {
    pub const ALL: [EodJob; 8] = [
        EodJob::AccountBalanceUpdate,
        EodJob::InterestAccrual,
        EodJob::InterestAccrualGlMovements,
        EodJob::GlMovementUpdate,
        EodJob::GlBalanceUpdate,
        EodJob::InterestAccrualAccountBalance,
        EodJob::FinancialReports,
        EodJob::SystemDateIncrement,
    ];

    pub fn number(&self) -> u8 {
        match self {
            EodJob::AccountBalanceUpdate => 1,
            EodJob::InterestAccrual => 2,
            EodJob::InterestAccrualGlMovements => 3,
            EodJob::GlMovementUpdate => 4,
            EodJob::GlBalanceUpdate => 5,
            EodJob::InterestAccrualAccountBalance => 6,
            EodJob::FinancialReports => 7,
            EodJob::SystemDateIncrement => 8,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EodJob::AccountBalanceUpdate => "Account Balance Update",
            EodJob::InterestAccrual => "Interest Accrual Transaction Update",
            EodJob::InterestAccrualGlMovements => "Interest Accrual GL Movement Update",
            EodJob::GlMovementUpdate => "GL Movement Update",
            EodJob::GlBalanceUpdate => "GL Balance Update",
            EodJob::InterestAccrualAccountBalance => "Interest Accrual Account Balance Update",
            EodJob::FinancialReports => "Financial Reports Generation",
            EodJob::SystemDateIncrement => "System Date Increment",
        }
    }

    pub fn from_number(number: u8) -> Option<EodJob> {
        EodJob::ALL.into_iter().find(|job| job.number() == number)
    }
}

impl fmt::Display for EodJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.number(), self.name())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EodJobOutcome {
    pub job_number: u8,
    pub job_name: String,
    pub records_processed: u64,
    pub skipped: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EodRunSummary {
    pub eod_date: NaiveDate,
    pub accounts_processed: u64,
    pub interest_entries_processed: u64,
    pub accrual_movements_processed: u64,
    pub gl_movements_updated: u64,
    pub gl_balances_updated: u64,
    pub accrual_balances_updated: u64,
    pub jobs: Vec<EodJobOutcome>,
}

#[derive(Clone)]
pub struct EodPipeline {
    pool: SqlitePool,
    log: EodLogRepo,
    clock: SystemClock,
    accounts: Accounts,
    balances: Balances,
    accruals: InterestAccruals,
    movements: GlMovements,
    reports: FinancialReports,
}

impl EodPipeline {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        pool: &SqlitePool,
        clock: &SystemClock,
        accounts: &Accounts,
        balances: &Balances,
        accruals: &InterestAccruals,
        movements: &GlMovements,
        reports: &FinancialReports,
    ) -> Self {
        Self {
            pool: pool.clone(),
            log: EodLogRepo::new(pool),
            clock: clock.clone(),
            accounts: accounts.clone(),
            balances: balances.clone(),
            accruals: accruals.clone(),
            movements: movements.clone(),
            reports: reports.clone(),
        }
    }

    /// Runs the full pipeline for the open day. Jobs that already succeeded
    /// are skipped; the first failure stops the run, leaving the completed
    /// jobs durably in place.
    #[instrument(name = "khata.eod.run", skip(self))]
    pub async fn run_eod(&self, user_id: &str) -> Result<EodRunSummary, EodError> {
        let eod_date = self.clock.now().await?;
        let mut summary = EodRunSummary {
            eod_date,
            accounts_processed: 0,
            interest_entries_processed: 0,
            accrual_movements_processed: 0,
            gl_movements_updated: 0,
            gl_balances_updated: 0,
            accrual_balances_updated: 0,
            jobs: Vec::with_capacity(EodJob::ALL.len()),
        };
        for job in EodJob::ALL {
            let (records, skipped) = match self.run_job_for_date(job, eod_date, user_id).await {
                Ok(records) => (records, false),
                Err(EodError::AlreadyExecuted { .. }) => (0, true),
                Err(e) => return Err(e),
            };
            match job {
                EodJob::AccountBalanceUpdate => summary.accounts_processed = records,
                EodJob::InterestAccrual => summary.interest_entries_processed = records,
                EodJob::InterestAccrualGlMovements => {
                    summary.accrual_movements_processed = records
                }
                EodJob::GlMovementUpdate => summary.gl_movements_updated = records,
                EodJob::GlBalanceUpdate => summary.gl_balances_updated = records,
                EodJob::InterestAccrualAccountBalance => {
                    summary.accrual_balances_updated = records
                }
                _ => {}
            }
            summary.jobs.push(EodJobOutcome {
                job_number: job.number(),
                job_name: job.name().to_string(),
                records_processed: records,
                skipped,
            });
        }
        tracing::info!(eod_date = %eod_date, "EOD pipeline complete");
        Ok(summary)
    }

    /// Runs a single job, optionally for an explicit (already closed) date.
    pub async fn run_job(
        &self,
        job_number: u8,
        date: Option<NaiveDate>,
        user_id: &str,
    ) -> Result<u64, EodError> {
        let job = EodJob::from_number(job_number).ok_or(EodError::UnknownJob(job_number))?;
        let eod_date = match date {
            Some(date) => date,
            None => self.clock.now().await?,
        };
        self.run_job_for_date(job, eod_date, user_id).await
    }

    pub async fn logs_for_date(&self, eod_date: NaiveDate) -> Result<Vec<EodLogEntry>, EodError> {
        self.log.for_date(eod_date).await
    }

    #[instrument(name = "khata.eod.run_job", skip(self, user_id), fields(job = %job))]
    async fn run_job_for_date(
        &self,
        job: EodJob,
        eod_date: NaiveDate,
        user_id: &str,
    ) -> Result<u64, EodError> {
        if self.log.has_success(eod_date, job.number()).await? {
            return Err(EodError::AlreadyExecuted { job, eod_date });
        }
        if job.number() > 1 && !self.log.has_success(eod_date, job.number() - 1).await? {
            return Err(EodError::PreviousJobIncomplete { job, eod_date });
        }

        let start = self.clock.now_timestamp().await?;
        self.log
            .log(
                eod_date,
                job.number(),
                job.name(),
                eod_date,
                user_id,
                start,
                None,
                0,
                EodStatus::Running,
                None,
                None,
            )
            .await?;

        match self.execute(job, eod_date, user_id).await {
            Ok(records) => {
                self.log
                    .log(
                        eod_date,
                        job.number(),
                        job.name(),
                        eod_date,
                        user_id,
                        start,
                        Some(start),
                        records as i64,
                        EodStatus::Success,
                        None,
                        None,
                    )
                    .await?;
                tracing::info!(records, "job succeeded");
                Ok(records)
            }
            Err(e) => {
                if let Err(log_err) = self
                    .log
                    .log(
                        eod_date,
                        job.number(),
                        job.name(),
                        eod_date,
                        user_id,
                        start,
                        Some(start),
                        0,
                        EodStatus::Failed,
                        Some(&e.to_string()),
                        Some(job.name()),
                    )
                    .await
                {
                    tracing::error!(error = %log_err, "failed to write EOD failure log");
                }
                tracing::error!(error = %e, "job failed");
                Err(e)
            }
        }
    }

    async fn execute(&self, job: EodJob, date: NaiveDate, user_id: &str) -> Result<u64, EodError> {
        match job {
            EodJob::AccountBalanceUpdate => self.job_account_balance_update(date).await,
            EodJob::InterestAccrual => {
                let summary = self.accruals.run_accruals(date).await?;
                Ok(summary.entries_created as u64)
            }
            EodJob::InterestAccrualGlMovements => self.job_accrual_gl_movements(date).await,
            EodJob::GlMovementUpdate => self.job_gl_movement_update(date).await,
            EodJob::GlBalanceUpdate => self.job_gl_balance_update(date).await,
            EodJob::InterestAccrualAccountBalance => self.job_accrual_account_balances(date).await,
            EodJob::FinancialReports => {
                self.reports.generate(date).await?;
                Ok(2)
            }
            EodJob::SystemDateIncrement => {
                let mut op = AtomicOperation::init(&self.pool).await?;
                let next = self.clock.advance_in_op(&mut op, date, user_id).await?;
                op.commit().await?;
                tracing::info!(from = %date, to = %next, "system date advanced");
                Ok(1)
            }
        }
    }

    /// Job 1: one closed balance row per active account for the day,
    /// derived from the previous closing and the day's posted legs.
    async fn job_account_balance_update(&self, date: NaiveDate) -> Result<u64, EodError> {
        let sweep = self.accounts.active_accounts().await?;
        let mut loan_limits = BTreeMap::new();
        for account in &sweep {
            if account.kind == AccountKind::Customer && gl::is_asset(&account.gl_num) {
                loan_limits.insert(
                    account.account_no.clone(),
                    self.accounts.loan_limit(&account.account_no).await?,
                );
            }
        }

        let mut op = AtomicOperation::init(&self.pool).await?;
        let mut processed = 0u64;
        for account in sweep {
            let opening = self
                .balances
                .previous_closing_in_op(
                    &mut op,
                    AccountBalanceTable::Daily,
                    &account.account_no,
                    date,
                )
                .await?;
            let (debits, credits) = self
                .balances
                .posted_day_leg_sums_in_op(&mut op, &account.account_no, date)
                .await?;
            let closing = opening + credits - debits;
            let loan_limit = loan_limits
                .get(&account.account_no)
                .copied()
                .unwrap_or(Decimal::ZERO);
            let row = AccountBalanceRow {
                account_no: account.account_no.clone(),
                tran_date: date,
                opening_bal: opening,
                dr_summation: debits,
                cr_summation: credits,
                closing_bal: closing,
                current_balance: closing,
                available_balance: closing + loan_limit,
                last_updated: Some(date.and_time(NaiveTime::MIN)),
            };
            self.balances
                .upsert_account_row_in_op(&mut op, AccountBalanceTable::Daily, &row)
                .await?;
            processed += 1;
        }
        op.commit().await?;
        Ok(processed)
    }

    /// Job 3: turn pending accrual legs into GL movements against their
    /// interest GLs and flip them to Processed.
    async fn job_accrual_gl_movements(&self, date: NaiveDate) -> Result<u64, EodError> {
        let pending = self.accruals.pending_for_date(date).await?;
        let mut op = AtomicOperation::init(&self.pool).await?;
        let mut processed = 0u64;
        for leg in pending {
            let balance_after = self
                .balances
                .update_gl_for_posting_in_op(
                    &mut op,
                    &leg.gl_account_no,
                    leg.dr_cr_flag,
                    leg.amount,
                    date,
                )
                .await?;
            self.movements
                .record_accrual_in_op(
                    &mut op,
                    &leg.accr_tran_id,
                    &leg.account_no,
                    &leg.gl_account_no,
                    leg.dr_cr_flag,
                    date,
                    leg.amount,
                    balance_after,
                )
                .await?;
            self.accruals
                .mark_processed_in_op(&mut op, &leg.accr_tran_id)
                .await?;
            processed += 1;
        }
        op.commit().await?;
        Ok(processed)
    }

    /// Job 4: fold the day's accrual movements into the unified GL movement
    /// stream. Re-runs delete the previous copies first.
    async fn job_gl_movement_update(&self, date: NaiveDate) -> Result<u64, EodError> {
        let accrual_movements = self.movements.accruals_for_date(date).await?;
        let mut op = AtomicOperation::init(&self.pool).await?;
        self.movements
            .delete_accrual_copies_in_op(&mut op, date)
            .await?;
        for movement in &accrual_movements {
            self.movements
                .record_in_op(
                    &mut op,
                    &movement.accr_tran_id,
                    &movement.gl_num,
                    movement.dr_cr_flag,
                    movement.tran_date,
                    movement.value_date,
                    movement.amount,
                    movement.balance_after,
                )
                .await?;
        }
        op.commit().await?;
        Ok(accrual_movements.len() as u64)
    }

    /// Job 5: one GL balance row per distinct GL in the day's movements.
    /// The DR/CR totals across all GLs must agree; a mismatch is reported
    /// here and turns into a hard failure when Job 7 proves the books.
    async fn job_gl_balance_update(&self, date: NaiveDate) -> Result<u64, EodError> {
        let movements = self.movements.for_date(date).await?;
        let mut groups: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
        for movement in movements {
            let entry = groups
                .entry(movement.gl_num.clone())
                .or_insert((Decimal::ZERO, Decimal::ZERO));
            match movement.dr_cr_flag {
                DrCrFlag::Debit => entry.0 += movement.amount,
                DrCrFlag::Credit => entry.1 += movement.amount,
            }
        }

        let mut total_dr = Decimal::ZERO;
        let mut total_cr = Decimal::ZERO;
        let mut op = AtomicOperation::init(&self.pool).await?;
        let mut processed = 0u64;
        for (gl_num, (debits, credits)) in groups {
            let opening = self
                .balances
                .previous_gl_closing_in_op(&mut op, &gl_num, date)
                .await?;
            let closing = opening + credits - debits;
            let row = GlBalanceRow {
                gl_num,
                tran_date: date,
                opening_bal: opening,
                dr_summation: debits,
                cr_summation: credits,
                closing_bal: closing,
                current_balance: closing,
                last_updated: Some(date.and_time(NaiveTime::MIN)),
            };
            self.balances.upsert_gl_row_in_op(&mut op, &row).await?;
            total_dr += debits;
            total_cr += credits;
            processed += 1;
        }
        op.commit().await?;

        if total_dr != total_cr {
            tracing::warn!(%total_dr, %total_cr, "GL movements do not balance for the day");
        }
        Ok(processed)
    }

    /// Job 6: per-account accrual balance rows from the day's accrual legs.
    async fn job_accrual_account_balances(&self, date: NaiveDate) -> Result<u64, EodError> {
        let accounts = self.accruals.distinct_accounts_for_date(date).await?;
        let legs = self.accruals.legs_for_date(date).await?;
        let mut op = AtomicOperation::init(&self.pool).await?;
        let mut processed = 0u64;
        for account_no in accounts {
            let mut debits = Decimal::ZERO;
            let mut credits = Decimal::ZERO;
            for leg in legs.iter().filter(|leg| leg.account_no == account_no) {
                match leg.dr_cr_flag {
                    DrCrFlag::Debit => debits += leg.amount,
                    DrCrFlag::Credit => credits += leg.amount,
                }
            }
            let opening = self
                .balances
                .previous_closing_in_op(&mut op, AccountBalanceTable::Accrual, &account_no, date)
                .await?;
            let closing = opening + credits - debits;
            let row = AccountBalanceRow {
                account_no,
                tran_date: date,
                opening_bal: opening,
                dr_summation: debits,
                cr_summation: credits,
                closing_bal: closing,
                current_balance: closing,
                available_balance: closing,
                last_updated: Some(date.and_time(NaiveTime::MIN)),
            };
            self.balances
                .upsert_account_row_in_op(&mut op, AccountBalanceTable::Accrual, &row)
                .await?;
            processed += 1;
        }
        op.commit().await?;
        Ok(processed)
    }
}
