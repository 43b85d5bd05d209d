use chrono::NaiveDate;
use derive_builder::Builder;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};

use crate::db;

/// A sub-product carries everything the ledger needs to know about the
/// accounts opened under it: the leaf GL they roll up to, the product
/// category digit used in account numbers, and the interest configuration
/// consumed by the accrual job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubProduct {
    pub sub_product_id: i64,
    pub sub_product_code: String,
    pub sub_product_name: String,
    pub product_category: String,
    pub cum_gl_num: String,
    pub intt_code: Option<String>,
    pub interest_increment: Option<Decimal>,
    pub effective_interest_rate: Option<Decimal>,
    pub interest_income_expenditure_gl_num: Option<String>,
    pub interest_receivable_payable_gl_num: Option<String>,
}

impl FromRow<'_, SqliteRow> for SubProduct {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            sub_product_id: row.try_get("sub_product_id")?,
            sub_product_code: row.try_get("sub_product_code")?,
            sub_product_name: row.try_get("sub_product_name")?,
            product_category: row.try_get("product_category")?,
            cum_gl_num: row.try_get("cum_gl_num")?,
            intt_code: row.try_get("intt_code")?,
            interest_increment: db::opt_decimal_column(row, "interest_increment")?,
            effective_interest_rate: db::opt_decimal_column(row, "effective_interest_rate")?,
            interest_income_expenditure_gl_num: row
                .try_get("interest_income_expenditure_gl_num")?,
            interest_receivable_payable_gl_num: row
                .try_get("interest_receivable_payable_gl_num")?,
        })
    }
}

#[derive(Builder, Debug)]
pub struct NewSubProduct {
    #[builder(setter(into))]
    pub(super) sub_product_code: String,
    #[builder(setter(into))]
    pub(super) sub_product_name: String,
    #[builder(setter(into))]
    pub(super) product_category: String,
    #[builder(setter(into))]
    pub(super) cum_gl_num: String,
    #[builder(setter(strip_option, into), default)]
    pub(super) intt_code: Option<String>,
    #[builder(setter(strip_option), default)]
    pub(super) interest_increment: Option<Decimal>,
    #[builder(setter(strip_option), default)]
    pub(super) effective_interest_rate: Option<Decimal>,
    #[builder(setter(strip_option, into), default)]
    pub(super) interest_income_expenditure_gl_num: Option<String>,
    #[builder(setter(strip_option, into), default)]
    pub(super) interest_receivable_payable_gl_num: Option<String>,
}

impl NewSubProduct {
    pub fn builder() -> NewSubProductBuilder {
        NewSubProductBuilder::default()
    }
}

#[derive(Debug, Clone)]
pub struct InterestRate {
    pub intt_code: String,
    pub effective_date: NaiveDate,
    pub rate: Decimal,
}

impl FromRow<'_, SqliteRow> for InterestRate {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            intt_code: row.try_get("intt_code")?,
            effective_date: db::date_column(row, "intt_effctv_date")?,
            rate: db::decimal_column(row, "intt_rate")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Customer {
    pub cust_id: i64,
    pub cust_name: String,
}
