use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, Row, Sqlite, SqlitePool};
use std::str::FromStr;

use super::{error::BalanceError, snapshot::*};
use crate::primitives::DrCrFlag;

#[derive(Debug, Clone)]
pub(super) struct BalanceRepo {
    pool: SqlitePool,
}

const ACCT_COLUMNS: &str = "account_no, tran_date, opening_bal, dr_summation, cr_summation, \
     closing_bal, current_balance, available_balance, last_updated";

const GL_COLUMNS: &str = "gl_num, tran_date, opening_bal, dr_summation, cr_summation, \
     closing_bal, current_balance, last_updated";

impl BalanceRepo {
    pub fn new(pool: &SqlitePool) -> Self {
        Self { pool: pool.clone() }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Row with the greatest `tran_date <= as_of`.
    pub async fn latest_account_row(
        &self,
        executor: impl Executor<'_, Database = Sqlite>,
        table: AccountBalanceTable,
        account_no: &str,
        as_of: NaiveDate,
    ) -> Result<Option<AccountBalanceRow>, BalanceError> {
        let row = sqlx::query_as::<_, AccountBalanceRow>(&format!(
            "SELECT {ACCT_COLUMNS} FROM {} WHERE account_no = ? AND tran_date <= ? \
             ORDER BY tran_date DESC LIMIT 1",
            table.name()
        ))
        .bind(account_no)
        .bind(as_of)
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }

    /// Closing balance of the most recent row strictly before `date`;
    /// zero for a brand-new account. This collapses the 3-tier fallback
    /// (yesterday's row, last row before, nothing) into one lookup.
    pub async fn previous_closing(
        &self,
        executor: impl Executor<'_, Database = Sqlite>,
        table: AccountBalanceTable,
        account_no: &str,
        date: NaiveDate,
    ) -> Result<Decimal, BalanceError> {
        let closing: Option<String> = sqlx::query_scalar(&format!(
            "SELECT closing_bal FROM {} WHERE account_no = ? AND tran_date < ? \
             ORDER BY tran_date DESC LIMIT 1",
            table.name()
        ))
        .bind(account_no)
        .bind(date)
        .fetch_optional(executor)
        .await?;
        decode_decimal(closing, "closing_bal")
    }

    pub async fn upsert_account_row(
        &self,
        executor: impl Executor<'_, Database = Sqlite>,
        table: AccountBalanceTable,
        row: &AccountBalanceRow,
    ) -> Result<(), BalanceError> {
        sqlx::query(&format!(
            r#"
            INSERT INTO {} (account_no, tran_date, opening_bal, dr_summation, cr_summation,
                            closing_bal, current_balance, available_balance, last_updated)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (account_no, tran_date)
            DO UPDATE SET opening_bal = excluded.opening_bal,
                          dr_summation = excluded.dr_summation,
                          cr_summation = excluded.cr_summation,
                          closing_bal = excluded.closing_bal,
                          current_balance = excluded.current_balance,
                          available_balance = excluded.available_balance,
                          last_updated = excluded.last_updated
            "#,
            table.name()
        ))
        .bind(&row.account_no)
        .bind(row.tran_date)
        .bind(row.opening_bal.to_string())
        .bind(row.dr_summation.to_string())
        .bind(row.cr_summation.to_string())
        .bind(row.closing_bal.to_string())
        .bind(row.current_balance.to_string())
        .bind(row.available_balance.to_string())
        .bind(row.last_updated)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn latest_gl_row(
        &self,
        executor: impl Executor<'_, Database = Sqlite>,
        gl_num: &str,
        as_of: NaiveDate,
    ) -> Result<Option<GlBalanceRow>, BalanceError> {
        let row = sqlx::query_as::<_, GlBalanceRow>(&format!(
            "SELECT {GL_COLUMNS} FROM gl_balance WHERE gl_num = ? AND tran_date <= ? \
             ORDER BY tran_date DESC LIMIT 1"
        ))
        .bind(gl_num)
        .bind(as_of)
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }

    pub async fn previous_gl_closing(
        &self,
        executor: impl Executor<'_, Database = Sqlite>,
        gl_num: &str,
        date: NaiveDate,
    ) -> Result<Decimal, BalanceError> {
        let closing: Option<String> = sqlx::query_scalar(
            "SELECT closing_bal FROM gl_balance WHERE gl_num = ? AND tran_date < ? \
             ORDER BY tran_date DESC LIMIT 1",
        )
        .bind(gl_num)
        .bind(date)
        .fetch_optional(executor)
        .await?;
        decode_decimal(closing, "closing_bal")
    }

    pub async fn upsert_gl_row(
        &self,
        executor: impl Executor<'_, Database = Sqlite>,
        row: &GlBalanceRow,
    ) -> Result<(), BalanceError> {
        sqlx::query(
            r#"
            INSERT INTO gl_balance (gl_num, tran_date, opening_bal, dr_summation, cr_summation,
                                    closing_bal, current_balance, last_updated)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (gl_num, tran_date)
            DO UPDATE SET opening_bal = excluded.opening_bal,
                          dr_summation = excluded.dr_summation,
                          cr_summation = excluded.cr_summation,
                          closing_bal = excluded.closing_bal,
                          current_balance = excluded.current_balance,
                          last_updated = excluded.last_updated
            "#,
        )
        .bind(&row.gl_num)
        .bind(row.tran_date)
        .bind(row.opening_bal.to_string())
        .bind(row.dr_summation.to_string())
        .bind(row.cr_summation.to_string())
        .bind(row.closing_bal.to_string())
        .bind(row.current_balance.to_string())
        .bind(row.last_updated)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn gl_rows_for_date(&self, date: NaiveDate) -> Result<Vec<GlBalanceRow>, BalanceError> {
        let rows = sqlx::query_as::<_, GlBalanceRow>(&format!(
            "SELECT {GL_COLUMNS} FROM gl_balance WHERE tran_date = ? ORDER BY gl_num"
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// DR and CR magnitudes of the account's legs on `date`, excluding
    /// future-dated legs that BOD has not yet brought into the day.
    pub async fn day_leg_sums(
        &self,
        executor: impl Executor<'_, Database = Sqlite>,
        account_no: &str,
        date: NaiveDate,
    ) -> Result<(Decimal, Decimal), BalanceError> {
        self.leg_sums(
            executor,
            account_no,
            date,
            "tran_status != 'Future'",
        )
        .await
    }

    /// Same as [`Self::day_leg_sums`] but restricted to legs that have
    /// actually moved balances. EOD Job 1 closes the day from these.
    pub async fn posted_day_leg_sums(
        &self,
        executor: impl Executor<'_, Database = Sqlite>,
        account_no: &str,
        date: NaiveDate,
    ) -> Result<(Decimal, Decimal), BalanceError> {
        self.leg_sums(
            executor,
            account_no,
            date,
            "tran_status IN ('Posted', 'Verified')",
        )
        .await
    }

    async fn leg_sums(
        &self,
        executor: impl Executor<'_, Database = Sqlite>,
        account_no: &str,
        date: NaiveDate,
        status_filter: &str,
    ) -> Result<(Decimal, Decimal), BalanceError> {
        let rows = sqlx::query(&format!(
            "SELECT dr_cr_flag, lcy_amt FROM tran_table \
             WHERE account_no = ? AND tran_date = ? AND {status_filter}",
        ))
        .bind(account_no)
        .bind(date)
        .fetch_all(executor)
        .await?;
        let mut debits = Decimal::ZERO;
        let mut credits = Decimal::ZERO;
        for row in rows {
            let flag: String = row.try_get("dr_cr_flag")?;
            let amount = decode_decimal(Some(row.try_get("lcy_amt")?), "lcy_amt")?;
            match flag.parse::<DrCrFlag>() {
                Ok(DrCrFlag::Debit) => debits += amount,
                Ok(DrCrFlag::Credit) => credits += amount,
                Err(e) => {
                    return Err(BalanceError::Sqlx(sqlx::Error::ColumnDecode {
                        index: "dr_cr_flag".to_string(),
                        source: Box::new(e),
                    }))
                }
            }
        }
        Ok((debits, credits))
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum AccountBalanceTable {
    Daily,
    Accrual,
}

impl AccountBalanceTable {
    fn name(&self) -> &'static str {
        match self {
            AccountBalanceTable::Daily => "acct_bal",
            AccountBalanceTable::Accrual => "acct_bal_accrual",
        }
    }
}

fn decode_decimal(raw: Option<String>, column: &str) -> Result<Decimal, BalanceError> {
    match raw {
        None => Ok(Decimal::ZERO),
        Some(raw) => Decimal::from_str(&raw).map_err(|e| {
            BalanceError::Sqlx(sqlx::Error::ColumnDecode {
                index: column.to_string(),
                source: Box::new(e),
            })
        }),
    }
}
