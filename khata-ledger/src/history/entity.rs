use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};

use crate::{db, primitives::DrCrFlag};

/// Statement-of-accounts row: one per verified leg, immutable, carrying the
/// account balance after the transaction took effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRow {
    pub hist_id: i64,
    pub tran_id: String,
    pub account_no: String,
    pub tran_date: NaiveDate,
    pub value_date: NaiveDate,
    pub dr_cr_flag: DrCrFlag,
    pub tran_ccy: String,
    pub lcy_amt: Decimal,
    pub narration: Option<String>,
    pub balance_after: Decimal,
    pub verified_by: String,
    pub verified_at: NaiveDateTime,
}

impl FromRow<'_, SqliteRow> for HistoryRow {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            hist_id: row.try_get("hist_id")?,
            tran_id: row.try_get("tran_id")?,
            account_no: row.try_get("account_no")?,
            tran_date: db::date_column(row, "tran_date")?,
            value_date: db::date_column(row, "value_date")?,
            dr_cr_flag: db::parsed_column(row, "dr_cr_flag")?,
            tran_ccy: row.try_get("tran_ccy")?,
            lcy_amt: db::decimal_column(row, "lcy_amt")?,
            narration: row.try_get("narration")?,
            balance_after: db::decimal_column(row, "balance_after")?,
            verified_by: row.try_get("verified_by")?,
            verified_at: row.try_get("verified_at")?,
        })
    }
}
