use chrono::NaiveDate;
use derive_builder::Builder;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};

use crate::{
    db,
    primitives::{DrCrFlag, TranStatus},
};

/// One leg of a transaction as persisted. Legs sharing the id prefix before
/// the final `-` form one transaction; a leg is immutable apart from its
/// status transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranLeg {
    pub tran_id: String,
    pub tran_date: NaiveDate,
    pub value_date: NaiveDate,
    pub dr_cr_flag: DrCrFlag,
    pub tran_status: TranStatus,
    pub account_no: String,
    pub tran_ccy: String,
    pub fcy_amt: Decimal,
    pub exchange_rate: Decimal,
    pub lcy_amt: Decimal,
    pub narration: Option<String>,
    pub pointing_id: Option<String>,
}

impl TranLeg {
    pub fn base_tran_id(&self) -> &str {
        base_tran_id(&self.tran_id)
    }
}

/// Strips the `-<lineNo>` suffix from a leg id.
pub fn base_tran_id(full_tran_id: &str) -> &str {
    match full_tran_id.rfind('-') {
        Some(idx) if idx > 0 => &full_tran_id[..idx],
        _ => full_tran_id,
    }
}

impl FromRow<'_, SqliteRow> for TranLeg {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            tran_id: row.try_get("tran_id")?,
            tran_date: db::date_column(row, "tran_date")?,
            value_date: db::date_column(row, "value_date")?,
            dr_cr_flag: db::parsed_column(row, "dr_cr_flag")?,
            tran_status: db::parsed_column(row, "tran_status")?,
            account_no: row.try_get("account_no")?,
            tran_ccy: row.try_get("tran_ccy")?,
            fcy_amt: db::decimal_column(row, "fcy_amt")?,
            exchange_rate: db::decimal_column(row, "exchange_rate")?,
            lcy_amt: db::decimal_column(row, "lcy_amt")?,
            narration: row.try_get("narration")?,
            pointing_id: row.try_get("pointing_id")?,
        })
    }
}

#[derive(Builder, Debug)]
pub struct NewTransaction {
    pub(super) value_date: NaiveDate,
    #[builder(setter(into))]
    pub(super) narration: String,
    pub(super) legs: Vec<NewTranLeg>,
}

impl NewTransaction {
    pub fn builder() -> NewTransactionBuilder {
        NewTransactionBuilder::default()
    }
}

#[derive(Builder, Debug, Clone)]
pub struct NewTranLeg {
    #[builder(setter(into))]
    pub(super) account_no: String,
    pub(super) dr_cr_flag: DrCrFlag,
    /// Local-currency amount; authoritative for all bookkeeping.
    pub(super) lcy_amt: Decimal,
    #[builder(setter(strip_option, into), default)]
    pub(super) tran_ccy: Option<String>,
    #[builder(setter(strip_option), default)]
    pub(super) fcy_amt: Option<Decimal>,
    #[builder(default = "Decimal::ONE")]
    pub(super) exchange_rate: Decimal,
    #[builder(setter(strip_option, into), default)]
    pub(super) narration: Option<String>,
}

impl NewTranLeg {
    pub fn builder() -> NewTranLegBuilder {
        NewTranLegBuilder::default()
    }
}

/// A transaction as presented to callers: the shared head plus its legs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    pub tran_id: String,
    pub tran_date: NaiveDate,
    pub value_date: NaiveDate,
    pub narration: Option<String>,
    pub status: TranStatus,
    pub lines: Vec<TranLeg>,
}

impl TransactionSummary {
    pub(super) fn from_legs(base_tran_id: &str, legs: Vec<TranLeg>) -> Self {
        let first = legs.first().expect("summary needs at least one leg");
        Self {
            tran_id: base_tran_id.to_string(),
            tran_date: first.tran_date,
            value_date: first.value_date,
            narration: first.narration.clone(),
            status: first.tran_status,
            lines: legs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_id_strips_line_suffix() {
        assert_eq!(base_tran_id("T20240115000001123-1"), "T20240115000001123");
        assert_eq!(base_tran_id("T20240115000001123-12"), "T20240115000001123");
        assert_eq!(base_tran_id("NOSUFFIX"), "NOSUFFIX");
    }
}
