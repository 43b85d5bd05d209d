use chrono::NaiveDate;
use sqlx::{Executor, Sqlite, SqlitePool};

use super::{
    entity::{accr_id_sequence, AccrualLeg},
    error::InterestError,
};
use crate::primitives::AccrualStatus;

#[derive(Debug, Clone)]
pub(super) struct AccrualRepo {
    pool: SqlitePool,
}

const ACCRUAL_COLUMNS: &str = "accr_tran_id, account_no, accrual_date, tran_date, value_date, \
     interest_rate, amount, dr_cr_flag, gl_account_no, tran_ccy, fcy_amt, exchange_rate, \
     lcy_amt, narration, status, tran_status";

impl AccrualRepo {
    pub fn new(pool: &SqlitePool) -> Self {
        Self { pool: pool.clone() }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Highest sequence already minted for the date, derived from the fixed
    /// offsets of the stored ids.
    pub async fn max_sequence_for_date(&self, date: NaiveDate) -> Result<i64, InterestError> {
        let ids: Vec<String> =
            sqlx::query_scalar("SELECT accr_tran_id FROM intt_accr_tran WHERE accrual_date = ?")
                .bind(date)
                .fetch_all(&self.pool)
                .await?;
        let mut max = 0;
        for id in ids {
            let seq = accr_id_sequence(&id)?;
            if seq > max {
                max = seq;
            }
        }
        Ok(max)
    }

    pub async fn insert_leg(
        &self,
        executor: impl Executor<'_, Database = Sqlite>,
        leg: &AccrualLeg,
    ) -> Result<(), InterestError> {
        sqlx::query(
            r#"
            INSERT INTO intt_accr_tran
                (accr_tran_id, account_no, accrual_date, tran_date, value_date, interest_rate,
                 amount, dr_cr_flag, gl_account_no, tran_ccy, fcy_amt, exchange_rate, lcy_amt,
                 narration, status, tran_status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&leg.accr_tran_id)
        .bind(&leg.account_no)
        .bind(leg.accrual_date)
        .bind(leg.tran_date)
        .bind(leg.value_date)
        .bind(leg.interest_rate.to_string())
        .bind(leg.amount.to_string())
        .bind(leg.dr_cr_flag.as_str())
        .bind(&leg.gl_account_no)
        .bind(&leg.tran_ccy)
        .bind(leg.fcy_amt.to_string())
        .bind(leg.exchange_rate.to_string())
        .bind(leg.lcy_amt.to_string())
        .bind(&leg.narration)
        .bind(leg.status.as_str())
        .bind(leg.tran_status.as_str())
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn for_date(&self, date: NaiveDate) -> Result<Vec<AccrualLeg>, InterestError> {
        let rows = sqlx::query_as::<_, AccrualLeg>(&format!(
            "SELECT {ACCRUAL_COLUMNS} FROM intt_accr_tran WHERE accrual_date = ? ORDER BY accr_tran_id"
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn for_date_and_status(
        &self,
        date: NaiveDate,
        status: AccrualStatus,
    ) -> Result<Vec<AccrualLeg>, InterestError> {
        let rows = sqlx::query_as::<_, AccrualLeg>(&format!(
            "SELECT {ACCRUAL_COLUMNS} FROM intt_accr_tran WHERE accrual_date = ? AND status = ? \
             ORDER BY accr_tran_id"
        ))
        .bind(date)
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn set_status(
        &self,
        executor: impl Executor<'_, Database = Sqlite>,
        accr_tran_id: &str,
        status: AccrualStatus,
    ) -> Result<(), InterestError> {
        sqlx::query("UPDATE intt_accr_tran SET status = ? WHERE accr_tran_id = ?")
            .bind(status.as_str())
            .bind(accr_tran_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn distinct_accounts_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<String>, InterestError> {
        let accounts: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT account_no FROM intt_accr_tran WHERE accrual_date = ? ORDER BY account_no",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(accounts)
    }
}
