use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};

use crate::{db, primitives::DrCrFlag};

/// One GL movement per posted leg, carrying the GL balance observed
/// immediately after the leg was applied. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlMovement {
    pub movement_id: i64,
    pub tran_id: String,
    pub gl_num: String,
    pub dr_cr_flag: DrCrFlag,
    pub tran_date: NaiveDate,
    pub value_date: NaiveDate,
    pub amount: Decimal,
    pub balance_after: Decimal,
}

impl FromRow<'_, SqliteRow> for GlMovement {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            movement_id: row.try_get("movement_id")?,
            tran_id: row.try_get("tran_id")?,
            gl_num: row.try_get("gl_num")?,
            dr_cr_flag: db::parsed_column(row, "dr_cr_flag")?,
            tran_date: db::date_column(row, "tran_date")?,
            value_date: db::date_column(row, "value_date")?,
            amount: db::decimal_column(row, "amount")?,
            balance_after: db::decimal_column(row, "balance_after")?,
        })
    }
}

/// Movement emitted for an interest-accrual leg by EOD Job 3; Job 4 folds
/// these into the unified stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlMovementAccrual {
    pub movement_id: i64,
    pub accr_tran_id: String,
    pub account_no: String,
    pub gl_num: String,
    pub dr_cr_flag: DrCrFlag,
    pub tran_date: NaiveDate,
    pub value_date: NaiveDate,
    pub amount: Decimal,
    pub balance_after: Decimal,
}

impl FromRow<'_, SqliteRow> for GlMovementAccrual {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            movement_id: row.try_get("movement_id")?,
            accr_tran_id: row.try_get("accr_tran_id")?,
            account_no: row.try_get("account_no")?,
            gl_num: row.try_get("gl_num")?,
            dr_cr_flag: db::parsed_column(row, "dr_cr_flag")?,
            tran_date: db::date_column(row, "tran_date")?,
            value_date: db::date_column(row, "value_date")?,
            amount: db::decimal_column(row, "amount")?,
            balance_after: db::decimal_column(row, "balance_after")?,
        })
    }
}
