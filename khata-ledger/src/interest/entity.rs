use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};

use super::error::InterestError;
use crate::{
    db,
    primitives::{AccrualStatus, DrCrFlag, TranStatus},
};

pub(super) const MAX_ACCRUAL_SEQUENCE: i64 = 999_999_999;

/// One interest-accrual leg. Each accrual run produces exactly two legs per
/// account, `S…-1` (debit) and `S…-2` (credit), with equal amounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccrualLeg {
    pub accr_tran_id: String,
    pub account_no: String,
    pub accrual_date: NaiveDate,
    pub tran_date: NaiveDate,
    pub value_date: NaiveDate,
    pub interest_rate: Decimal,
    pub amount: Decimal,
    pub dr_cr_flag: DrCrFlag,
    pub gl_account_no: String,
    pub tran_ccy: String,
    pub fcy_amt: Decimal,
    pub exchange_rate: Decimal,
    pub lcy_amt: Decimal,
    pub narration: Option<String>,
    pub status: AccrualStatus,
    pub tran_status: TranStatus,
}

impl FromRow<'_, SqliteRow> for AccrualLeg {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            accr_tran_id: row.try_get("accr_tran_id")?,
            account_no: row.try_get("account_no")?,
            accrual_date: db::date_column(row, "accrual_date")?,
            tran_date: db::date_column(row, "tran_date")?,
            value_date: db::date_column(row, "value_date")?,
            interest_rate: db::decimal_column(row, "interest_rate")?,
            amount: db::decimal_column(row, "amount")?,
            dr_cr_flag: db::parsed_column(row, "dr_cr_flag")?,
            gl_account_no: row.try_get("gl_account_no")?,
            tran_ccy: row.try_get("tran_ccy")?,
            fcy_amt: db::decimal_column(row, "fcy_amt")?,
            exchange_rate: db::decimal_column(row, "exchange_rate")?,
            lcy_amt: db::decimal_column(row, "lcy_amt")?,
            narration: row.try_get("narration")?,
            status: db::parsed_column(row, "status")?,
            tran_status: db::parsed_column(row, "tran_status")?,
        })
    }
}

/// `S` + yyyymmdd + 9-digit sequence + `-` + row, exactly 20 characters.
/// There is no delimiter between date and sequence; parsers rely on the
/// fixed offsets.
pub fn generate_accr_tran_id(
    date: NaiveDate,
    sequential: i64,
    row_suffix: u8,
) -> Result<String, InterestError> {
    if !(1..=MAX_ACCRUAL_SEQUENCE).contains(&sequential) {
        return Err(InterestError::InvalidSequence(sequential));
    }
    if row_suffix != 1 && row_suffix != 2 {
        return Err(InterestError::InvalidRowSuffix(row_suffix));
    }
    let id = format!("S{}{:09}-{}", date.format("%Y%m%d"), sequential, row_suffix);
    debug_assert_eq!(id.len(), 20);
    Ok(id)
}

/// Sequence component at fixed offsets 9..18 of a 20-character accrual id.
pub fn accr_id_sequence(accr_tran_id: &str) -> Result<i64, InterestError> {
    if accr_tran_id.len() != 20 || !accr_tran_id.starts_with('S') {
        return Err(InterestError::InvalidId(accr_tran_id.to_string()));
    }
    accr_tran_id[9..18]
        .parse()
        .map_err(|_| InterestError::InvalidId(accr_tran_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn accrual_ids_are_exactly_twenty_chars() {
        let id = generate_accr_tran_id(date(), 1, 1).unwrap();
        assert_eq!(id, "S20240115000000001-1");
        assert_eq!(id.len(), 20);
        let id = generate_accr_tran_id(date(), MAX_ACCRUAL_SEQUENCE, 2).unwrap();
        assert_eq!(id, "S20240115999999999-2");
        assert_eq!(id.len(), 20);
    }

    #[test]
    fn sequence_bounds_are_enforced() {
        assert!(matches!(
            generate_accr_tran_id(date(), 0, 1),
            Err(InterestError::InvalidSequence(0))
        ));
        assert!(matches!(
            generate_accr_tran_id(date(), MAX_ACCRUAL_SEQUENCE + 1, 1),
            Err(InterestError::InvalidSequence(_))
        ));
        assert!(matches!(
            generate_accr_tran_id(date(), 1, 3),
            Err(InterestError::InvalidRowSuffix(3))
        ));
    }

    #[test]
    fn sequence_parses_back_from_fixed_offsets() {
        let id = generate_accr_tran_id(date(), 4711, 2).unwrap();
        assert_eq!(accr_id_sequence(&id).unwrap(), 4711);
        assert!(accr_id_sequence("T20240115000001-1").is_err());
    }
}
