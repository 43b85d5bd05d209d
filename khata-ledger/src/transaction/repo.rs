use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, Row, Sqlite, SqlitePool};
use std::str::FromStr;

use super::{entity::*, error::TransactionError};
use crate::primitives::TranStatus;

#[derive(Debug, Clone)]
pub(super) struct TranRepo {
    pool: SqlitePool,
}

const LEG_COLUMNS: &str = "tran_id, tran_date, value_date, dr_cr_flag, tran_status, account_no, \
     tran_ccy, fcy_amt, exchange_rate, lcy_amt, narration, pointing_id";

impl TranRepo {
    pub fn new(pool: &SqlitePool) -> Self {
        Self { pool: pool.clone() }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn insert_leg(
        &self,
        executor: impl Executor<'_, Database = Sqlite>,
        leg: &TranLeg,
    ) -> Result<(), TransactionError> {
        sqlx::query(
            r#"
            INSERT INTO tran_table
                (tran_id, tran_date, value_date, dr_cr_flag, tran_status, account_no,
                 tran_ccy, fcy_amt, exchange_rate, lcy_amt, narration, pointing_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&leg.tran_id)
        .bind(leg.tran_date)
        .bind(leg.value_date)
        .bind(leg.dr_cr_flag.as_str())
        .bind(leg.tran_status.as_str())
        .bind(&leg.account_no)
        .bind(&leg.tran_ccy)
        .bind(leg.fcy_amt.to_string())
        .bind(leg.exchange_rate.to_string())
        .bind(leg.lcy_amt.to_string())
        .bind(&leg.narration)
        .bind(&leg.pointing_id)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// All legs of one transaction in stable insertion order (`-1`, `-2`, …).
    pub async fn legs_by_prefix(
        &self,
        executor: impl Executor<'_, Database = Sqlite>,
        base_tran_id: &str,
    ) -> Result<Vec<TranLeg>, TransactionError> {
        let rows = sqlx::query_as::<_, TranLeg>(&format!(
            "SELECT {LEG_COLUMNS} FROM tran_table WHERE tran_id LIKE ? \
             ORDER BY LENGTH(tran_id), tran_id"
        ))
        .bind(format!("{base_tran_id}-%"))
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn legs_by_prefix_and_status(
        &self,
        executor: impl Executor<'_, Database = Sqlite>,
        base_tran_id: &str,
        status: TranStatus,
    ) -> Result<Vec<TranLeg>, TransactionError> {
        let rows = sqlx::query_as::<_, TranLeg>(&format!(
            "SELECT {LEG_COLUMNS} FROM tran_table WHERE tran_id LIKE ? AND tran_status = ? \
             ORDER BY LENGTH(tran_id), tran_id"
        ))
        .bind(format!("{base_tran_id}-%"))
        .bind(status.as_str())
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn update_status(
        &self,
        executor: impl Executor<'_, Database = Sqlite>,
        leg_tran_id: &str,
        status: TranStatus,
    ) -> Result<(), TransactionError> {
        sqlx::query("UPDATE tran_table SET tran_status = ? WHERE tran_id = ?")
            .bind(status.as_str())
            .bind(leg_tran_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Legs already recorded for the date; the next transaction id's
    /// sequence component is this count plus one.
    pub async fn count_legs_on(
        &self,
        executor: impl Executor<'_, Database = Sqlite>,
        date: NaiveDate,
    ) -> Result<i64, TransactionError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tran_table WHERE tran_date = ?")
            .bind(date)
            .fetch_one(executor)
            .await?;
        Ok(count)
    }

    /// Day DR/CR sums for an account, leaving out the legs of the
    /// transaction currently being posted and future-dated legs.
    pub async fn day_leg_sums_excluding(
        &self,
        executor: impl Executor<'_, Database = Sqlite>,
        account_no: &str,
        date: NaiveDate,
        excluded_base: &str,
    ) -> Result<(Decimal, Decimal), TransactionError> {
        let rows = sqlx::query(
            "SELECT dr_cr_flag, lcy_amt FROM tran_table \
             WHERE account_no = ? AND tran_date = ? AND tran_status != 'Future' \
             AND tran_id NOT LIKE ?",
        )
        .bind(account_no)
        .bind(date)
        .bind(format!("{excluded_base}-%"))
        .fetch_all(executor)
        .await?;
        let mut debits = Decimal::ZERO;
        let mut credits = Decimal::ZERO;
        for row in rows {
            let flag: String = row.try_get("dr_cr_flag")?;
            let raw: String = row.try_get("lcy_amt")?;
            let amount = Decimal::from_str(&raw).map_err(|e| {
                TransactionError::Sqlx(sqlx::Error::ColumnDecode {
                    index: "lcy_amt".to_string(),
                    source: Box::new(e),
                })
            })?;
            match flag.as_str() {
                "D" => debits += amount,
                _ => credits += amount,
            }
        }
        Ok((debits, credits))
    }

    pub async fn all_legs(&self) -> Result<Vec<TranLeg>, TransactionError> {
        let rows = sqlx::query_as::<_, TranLeg>(&format!(
            "SELECT {LEG_COLUMNS} FROM tran_table ORDER BY tran_date DESC, LENGTH(tran_id), tran_id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn count_by_status(&self, status: TranStatus) -> Result<i64, TransactionError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM tran_table WHERE tran_status = ?")
                .bind(status.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Distinct base ids of future-dated legs whose value date has arrived.
    pub async fn future_bases_due(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<String>, TransactionError> {
        let legs = sqlx::query_as::<_, TranLeg>(&format!(
            "SELECT {LEG_COLUMNS} FROM tran_table \
             WHERE tran_status = 'Future' AND value_date <= ? \
             ORDER BY LENGTH(tran_id), tran_id"
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        let mut bases: Vec<String> = Vec::new();
        for leg in legs {
            let base = leg.base_tran_id().to_string();
            if bases.last() != Some(&base) && !bases.contains(&base) {
                bases.push(base);
            }
        }
        Ok(bases)
    }
}
