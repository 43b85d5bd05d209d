use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, Sqlite, SqlitePool};

use super::{entity::*, error::MovementError};
use crate::primitives::DrCrFlag;

#[derive(Debug, Clone)]
pub(super) struct MovementRepo {
    pool: SqlitePool,
}

const MOVEMENT_COLUMNS: &str =
    "movement_id, tran_id, gl_num, dr_cr_flag, tran_date, value_date, amount, balance_after";

const ACCRUAL_COLUMNS: &str = "movement_id, accr_tran_id, account_no, gl_num, dr_cr_flag, \
     tran_date, value_date, amount, balance_after";

impl MovementRepo {
    pub fn new(pool: &SqlitePool) -> Self {
        Self { pool: pool.clone() }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_movement(
        &self,
        executor: impl Executor<'_, Database = Sqlite>,
        tran_id: &str,
        gl_num: &str,
        flag: DrCrFlag,
        tran_date: NaiveDate,
        value_date: NaiveDate,
        amount: Decimal,
        balance_after: Decimal,
    ) -> Result<(), MovementError> {
        sqlx::query(
            r#"
            INSERT INTO gl_movement (tran_id, gl_num, dr_cr_flag, tran_date, value_date, amount, balance_after)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(tran_id)
        .bind(gl_num)
        .bind(flag.as_str())
        .bind(tran_date)
        .bind(value_date)
        .bind(amount.to_string())
        .bind(balance_after.to_string())
        .execute(executor)
        .await?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_accrual_movement(
        &self,
        executor: impl Executor<'_, Database = Sqlite>,
        accr_tran_id: &str,
        account_no: &str,
        gl_num: &str,
        flag: DrCrFlag,
        date: NaiveDate,
        amount: Decimal,
        balance_after: Decimal,
    ) -> Result<(), MovementError> {
        sqlx::query(
            r#"
            INSERT INTO gl_movement_accrual
                (accr_tran_id, account_no, gl_num, dr_cr_flag, tran_date, value_date, amount, balance_after)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(accr_tran_id)
        .bind(account_no)
        .bind(gl_num)
        .bind(flag.as_str())
        .bind(date)
        .bind(date)
        .bind(amount.to_string())
        .bind(balance_after.to_string())
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn for_tran_id(&self, tran_id: &str) -> Result<Vec<GlMovement>, MovementError> {
        let rows = sqlx::query_as::<_, GlMovement>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM gl_movement WHERE tran_id LIKE ? ORDER BY movement_id"
        ))
        .bind(format!("{tran_id}-%"))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn for_date(&self, date: NaiveDate) -> Result<Vec<GlMovement>, MovementError> {
        let rows = sqlx::query_as::<_, GlMovement>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM gl_movement WHERE tran_date = ? ORDER BY movement_id"
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn accruals_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<GlMovementAccrual>, MovementError> {
        let rows = sqlx::query_as::<_, GlMovementAccrual>(&format!(
            "SELECT {ACCRUAL_COLUMNS} FROM gl_movement_accrual WHERE tran_date = ? ORDER BY movement_id"
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Removes the day's accrual copies from the unified stream. Accrual
    /// ids start with `S`, posting ids with `T`, so the prefix is the
    /// discriminator.
    pub async fn delete_accrual_copies(
        &self,
        executor: impl Executor<'_, Database = Sqlite>,
        date: NaiveDate,
    ) -> Result<u64, MovementError> {
        let result =
            sqlx::query("DELETE FROM gl_movement WHERE tran_date = ? AND tran_id LIKE 'S%'")
                .bind(date)
                .execute(executor)
                .await?;
        Ok(result.rows_affected())
    }
}
