use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};

use crate::db;

/// One account-day of balances. DR and CR summations are non-negative
/// magnitudes; `closing_bal = opening_bal + cr_summation - dr_summation`,
/// and callers interpret the sign according to the account's GL class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountBalanceRow {
    pub account_no: String,
    pub tran_date: NaiveDate,
    pub opening_bal: Decimal,
    pub dr_summation: Decimal,
    pub cr_summation: Decimal,
    pub closing_bal: Decimal,
    pub current_balance: Decimal,
    pub available_balance: Decimal,
    pub last_updated: Option<NaiveDateTime>,
}

impl AccountBalanceRow {
    pub(crate) fn zeroed(account_no: &str, tran_date: NaiveDate) -> Self {
        Self {
            account_no: account_no.to_string(),
            tran_date,
            opening_bal: Decimal::ZERO,
            dr_summation: Decimal::ZERO,
            cr_summation: Decimal::ZERO,
            closing_bal: Decimal::ZERO,
            current_balance: Decimal::ZERO,
            available_balance: Decimal::ZERO,
            last_updated: None,
        }
    }
}

impl FromRow<'_, SqliteRow> for AccountBalanceRow {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            account_no: row.try_get("account_no")?,
            tran_date: db::date_column(row, "tran_date")?,
            opening_bal: db::decimal_column(row, "opening_bal")?,
            dr_summation: db::decimal_column(row, "dr_summation")?,
            cr_summation: db::decimal_column(row, "cr_summation")?,
            closing_bal: db::decimal_column(row, "closing_bal")?,
            current_balance: db::decimal_column(row, "current_balance")?,
            available_balance: db::decimal_column(row, "available_balance")?,
            last_updated: row.try_get("last_updated")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlBalanceRow {
    pub gl_num: String,
    pub tran_date: NaiveDate,
    pub opening_bal: Decimal,
    pub dr_summation: Decimal,
    pub cr_summation: Decimal,
    pub closing_bal: Decimal,
    pub current_balance: Decimal,
    pub last_updated: Option<NaiveDateTime>,
}

impl GlBalanceRow {
    pub(crate) fn zeroed(gl_num: &str, tran_date: NaiveDate) -> Self {
        Self {
            gl_num: gl_num.to_string(),
            tran_date,
            opening_bal: Decimal::ZERO,
            dr_summation: Decimal::ZERO,
            cr_summation: Decimal::ZERO,
            closing_bal: Decimal::ZERO,
            current_balance: Decimal::ZERO,
            last_updated: None,
        }
    }
}

impl FromRow<'_, SqliteRow> for GlBalanceRow {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            gl_num: row.try_get("gl_num")?,
            tran_date: db::date_column(row, "tran_date")?,
            opening_bal: db::decimal_column(row, "opening_bal")?,
            dr_summation: db::decimal_column(row, "dr_summation")?,
            cr_summation: db::decimal_column(row, "cr_summation")?,
            closing_bal: db::decimal_column(row, "closing_bal")?,
            current_balance: db::decimal_column(row, "current_balance")?,
            last_updated: row.try_get("last_updated")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_rows_satisfy_the_closing_invariant() {
        let row = AccountBalanceRow::zeroed("0000000110001", NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(
            row.closing_bal,
            row.opening_bal + row.cr_summation - row.dr_summation
        );
    }
}
