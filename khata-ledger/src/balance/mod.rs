//! Balance store: per-account and per-GL daily balance rows, plus the
//! real-time available-balance query every validation runs through.

pub mod error;

mod repo;
mod snapshot;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use tracing::instrument;

use crate::{
    account::AccountInfo,
    operation::AtomicOperation,
    primitives::DrCrFlag,
};
use error::BalanceError;
pub(crate) use repo::AccountBalanceTable;
use repo::BalanceRepo;
pub use snapshot::*;

#[derive(Clone)]
pub struct Balances {
    repo: BalanceRepo,
}

impl Balances {
    pub(crate) fn new(pool: &SqlitePool) -> Self {
        Self {
            repo: BalanceRepo::new(pool),
        }
    }

    /// The balance row with the greatest `tran_date <= as_of`.
    pub async fn latest_for_account(
        &self,
        account_no: &str,
        as_of: NaiveDate,
    ) -> Result<AccountBalanceRow, BalanceError> {
        self.repo
            .latest_account_row(self.repo.pool(), AccountBalanceTable::Daily, account_no, as_of)
            .await?
            .ok_or_else(|| BalanceError::RowMissing(account_no.to_string()))
    }

    pub async fn latest_accrual_for_account(
        &self,
        account_no: &str,
        as_of: NaiveDate,
    ) -> Result<Option<AccountBalanceRow>, BalanceError> {
        self.repo
            .latest_account_row(
                self.repo.pool(),
                AccountBalanceTable::Accrual,
                account_no,
                as_of,
            )
            .await
    }

    /// Zero row written when an account is opened.
    pub(crate) async fn create_opening_row_in_op(
        &self,
        op: &mut AtomicOperation,
        account_no: &str,
        date: NaiveDate,
    ) -> Result<(), BalanceError> {
        let mut row = AccountBalanceRow::zeroed(account_no, date);
        row.last_updated = Some(date.and_time(NaiveTime::MIN));
        self.repo
            .upsert_account_row(&mut **op.tx(), AccountBalanceTable::Daily, &row)
            .await
    }

    /// Applies one posted leg to today's account row, creating the row from
    /// the previous closing balance on first touch.
    pub(crate) async fn update_account_for_posting_in_op(
        &self,
        op: &mut AtomicOperation,
        info: &AccountInfo,
        flag: DrCrFlag,
        amount: Decimal,
        date: NaiveDate,
    ) -> Result<AccountBalanceRow, BalanceError> {
        let existing = self
            .repo
            .latest_account_row(
                &mut **op.tx(),
                AccountBalanceTable::Daily,
                &info.account_no,
                date,
            )
            .await?;
        let mut row = match existing {
            Some(row) if row.tran_date == date => row,
            Some(prev) => {
                let mut row = AccountBalanceRow::zeroed(&info.account_no, date);
                row.opening_bal = prev.closing_bal;
                row
            }
            None => AccountBalanceRow::zeroed(&info.account_no, date),
        };
        match flag {
            DrCrFlag::Debit => row.dr_summation += amount,
            DrCrFlag::Credit => row.cr_summation += amount,
        }
        row.closing_bal = row.opening_bal + row.cr_summation - row.dr_summation;
        row.current_balance = row.closing_bal;
        row.available_balance = available_of(info, row.closing_bal);
        row.last_updated = Some(date.and_time(NaiveTime::MIN));
        self.repo
            .upsert_account_row(&mut **op.tx(), AccountBalanceTable::Daily, &row)
            .await?;
        Ok(row)
    }

    /// Same as the account variant, for the owning GL. Returns the new GL
    /// closing balance, which the caller records as `balance_after` on the
    /// GL movement.
    pub(crate) async fn update_gl_for_posting_in_op(
        &self,
        op: &mut AtomicOperation,
        gl_num: &str,
        flag: DrCrFlag,
        amount: Decimal,
        date: NaiveDate,
    ) -> Result<Decimal, BalanceError> {
        let existing = self.repo.latest_gl_row(&mut **op.tx(), gl_num, date).await?;
        let mut row = match existing {
            Some(row) if row.tran_date == date => row,
            Some(prev) => {
                let mut row = GlBalanceRow::zeroed(gl_num, date);
                row.opening_bal = prev.closing_bal;
                row
            }
            None => GlBalanceRow::zeroed(gl_num, date),
        };
        match flag {
            DrCrFlag::Debit => row.dr_summation += amount,
            DrCrFlag::Credit => row.cr_summation += amount,
        }
        row.closing_bal = row.opening_bal + row.cr_summation - row.dr_summation;
        row.current_balance = row.closing_bal;
        row.last_updated = Some(date.and_time(NaiveTime::MIN));
        self.repo.upsert_gl_row(&mut **op.tx(), &row).await?;
        Ok(row.closing_bal)
    }

    /// Real-time available balance: previous closing plus today's credits
    /// minus today's debits, plus the loan limit on asset accounts.
    #[instrument(name = "khata.balances.available", skip(self, info), fields(account_no = %info.account_no))]
    pub async fn available_balance(
        &self,
        info: &AccountInfo,
        as_of: NaiveDate,
    ) -> Result<Decimal, BalanceError> {
        let opening = self
            .repo
            .previous_closing(
                self.repo.pool(),
                AccountBalanceTable::Daily,
                &info.account_no,
                as_of,
            )
            .await?;
        let (debits, credits) = self
            .repo
            .day_leg_sums(self.repo.pool(), &info.account_no, as_of)
            .await?;
        Ok(available_of(info, opening + credits - debits))
    }

    pub(crate) async fn available_balance_in_op(
        &self,
        op: &mut AtomicOperation,
        info: &AccountInfo,
        as_of: NaiveDate,
    ) -> Result<Decimal, BalanceError> {
        let opening = self
            .repo
            .previous_closing(
                &mut **op.tx(),
                AccountBalanceTable::Daily,
                &info.account_no,
                as_of,
            )
            .await?;
        let (debits, credits) = self
            .repo
            .day_leg_sums(&mut **op.tx(), &info.account_no, as_of)
            .await?;
        Ok(available_of(info, opening + credits - debits))
    }

    pub async fn current_balance(
        &self,
        account_no: &str,
        as_of: NaiveDate,
    ) -> Result<Decimal, BalanceError> {
        Ok(self.latest_for_account(account_no, as_of).await?.current_balance)
    }

    pub(crate) async fn current_balance_in_op(
        &self,
        op: &mut AtomicOperation,
        account_no: &str,
        as_of: NaiveDate,
    ) -> Result<Decimal, BalanceError> {
        self.repo
            .latest_account_row(&mut **op.tx(), AccountBalanceTable::Daily, account_no, as_of)
            .await?
            .map(|row| row.current_balance)
            .ok_or_else(|| BalanceError::RowMissing(account_no.to_string()))
    }

    // EOD plumbing.

    pub(crate) async fn previous_closing_in_op(
        &self,
        op: &mut AtomicOperation,
        table: AccountBalanceTable,
        account_no: &str,
        date: NaiveDate,
    ) -> Result<Decimal, BalanceError> {
        self.repo
            .previous_closing(&mut **op.tx(), table, account_no, date)
            .await
    }

    pub(crate) async fn posted_day_leg_sums_in_op(
        &self,
        op: &mut AtomicOperation,
        account_no: &str,
        date: NaiveDate,
    ) -> Result<(Decimal, Decimal), BalanceError> {
        self.repo
            .posted_day_leg_sums(&mut **op.tx(), account_no, date)
            .await
    }

    pub(crate) async fn upsert_account_row_in_op(
        &self,
        op: &mut AtomicOperation,
        table: AccountBalanceTable,
        row: &AccountBalanceRow,
    ) -> Result<(), BalanceError> {
        self.repo
            .upsert_account_row(&mut **op.tx(), table, row)
            .await
    }

    pub(crate) async fn previous_gl_closing_in_op(
        &self,
        op: &mut AtomicOperation,
        gl_num: &str,
        date: NaiveDate,
    ) -> Result<Decimal, BalanceError> {
        self.repo.previous_gl_closing(&mut **op.tx(), gl_num, date).await
    }

    pub(crate) async fn upsert_gl_row_in_op(
        &self,
        op: &mut AtomicOperation,
        row: &GlBalanceRow,
    ) -> Result<(), BalanceError> {
        self.repo.upsert_gl_row(&mut **op.tx(), row).await
    }

    pub async fn gl_rows_for_date(&self, date: NaiveDate) -> Result<Vec<GlBalanceRow>, BalanceError> {
        self.repo.gl_rows_for_date(date).await
    }
}

fn available_of(info: &AccountInfo, computed: Decimal) -> Decimal {
    if info.is_asset() {
        computed + info.loan_limit
    } else {
        computed
    }
}
