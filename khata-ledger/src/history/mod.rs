pub mod error;

mod entity;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sqlx::SqlitePool;

use crate::operation::AtomicOperation;
pub use entity::HistoryRow;
use error::HistoryError;

#[derive(Clone)]
pub struct TransactionHistories {
    pool: SqlitePool,
}

impl TransactionHistories {
    pub(crate) fn new(pool: &SqlitePool) -> Self {
        Self { pool: pool.clone() }
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) async fn record_in_op(
        &self,
        op: &mut AtomicOperation,
        tran_id: &str,
        account_no: &str,
        tran_date: NaiveDate,
        value_date: NaiveDate,
        flag: crate::primitives::DrCrFlag,
        tran_ccy: &str,
        lcy_amt: Decimal,
        narration: Option<&str>,
        balance_after: Decimal,
        verified_by: &str,
        verified_at: NaiveDateTime,
    ) -> Result<(), HistoryError> {
        sqlx::query(
            r#"
            INSERT INTO txn_hist_acct
                (tran_id, account_no, tran_date, value_date, dr_cr_flag, tran_ccy, lcy_amt,
                 narration, balance_after, verified_by, verified_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(tran_id)
        .bind(account_no)
        .bind(tran_date)
        .bind(value_date)
        .bind(flag.as_str())
        .bind(tran_ccy)
        .bind(lcy_amt.to_string())
        .bind(narration)
        .bind(balance_after.to_string())
        .bind(verified_by)
        .bind(verified_at)
        .execute(&mut **op.tx())
        .await?;
        Ok(())
    }

    pub async fn for_account(
        &self,
        account_no: &str,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<HistoryRow>, HistoryError> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT hist_id, tran_id, account_no, tran_date, value_date, dr_cr_flag, tran_ccy,
                   lcy_amt, narration, balance_after, verified_by, verified_at
            FROM txn_hist_acct
            WHERE account_no = ? AND tran_date BETWEEN ? AND ?
            ORDER BY tran_date, hist_id
            "#,
        )
        .bind(account_no)
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn count_for_account(&self, account_no: &str) -> Result<i64, HistoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM txn_hist_acct WHERE account_no = ?")
                .bind(account_no)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
