use chrono::NaiveDate;
use derive_builder::Builder;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    gl,
    primitives::{AccountKind, AccountStatus, GlClass},
};

/// Value snapshot of an account as the rest of the ledger sees it. Callers
/// never mutate the underlying master record through this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountInfo {
    pub account_no: String,
    pub acct_name: String,
    pub gl_num: String,
    pub kind: AccountKind,
    pub status: AccountStatus,
    pub loan_limit: Decimal,
    pub sub_product_id: i64,
}

impl AccountInfo {
    pub fn is_customer(&self) -> bool {
        self.kind == AccountKind::Customer
    }

    pub fn is_asset(&self) -> bool {
        gl::is_asset(&self.gl_num)
    }

    pub fn is_liability(&self) -> bool {
        gl::is_liability(&self.gl_num)
    }

    pub fn class(&self) -> Option<GlClass> {
        gl::classify(&self.gl_num)
    }
}

#[derive(Builder, Debug)]
pub struct NewCustomerAccount {
    pub(super) cust_id: i64,
    pub(super) sub_product_id: i64,
    #[builder(setter(into))]
    pub(super) acct_name: String,
    #[builder(setter(strip_option), default)]
    pub(super) tenor: Option<i64>,
    #[builder(setter(strip_option), default)]
    pub(super) date_maturity: Option<NaiveDate>,
    #[builder(default = "Decimal::ZERO")]
    pub(super) loan_limit: Decimal,
}

impl NewCustomerAccount {
    pub fn builder() -> NewCustomerAccountBuilder {
        NewCustomerAccountBuilder::default()
    }
}

#[derive(Builder, Debug)]
pub struct NewOfficeAccount {
    pub(super) sub_product_id: i64,
    #[builder(setter(into))]
    pub(super) acct_name: String,
}

impl NewOfficeAccount {
    pub fn builder() -> NewOfficeAccountBuilder {
        NewOfficeAccountBuilder::default()
    }
}

/// Slim row used by batch jobs that sweep the account base.
#[derive(Debug, Clone)]
pub struct AccountSweepRow {
    pub account_no: String,
    pub gl_num: String,
    pub sub_product_id: i64,
    pub kind: AccountKind,
}
