//! Unified account registry over customer and office accounts. Resolution
//! returns a value snapshot; a small in-process cache keeps lookups O(1)
//! and is invalidated whenever an account is opened or its status changes.

pub mod error;

mod entity;
mod repo;

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use sqlx::SqlitePool;
use tracing::instrument;

use crate::{
    balance::Balances,
    clock::SystemClock,
    gl,
    operation::AtomicOperation,
    primitives::{AccountKind, AccountStatus},
    product::Products,
};
pub use entity::*;
use error::AccountError;
use repo::AccountRepo;

const CUSTOMER_SEQ_LIMIT: i64 = 999;
const OFFICE_SEQ_LIMIT: i64 = 99;

#[derive(Clone)]
pub struct Accounts {
    repo: AccountRepo,
    products: Products,
    balances: Balances,
    clock: SystemClock,
    cache: Arc<RwLock<HashMap<String, AccountInfo>>>,
}

impl Accounts {
    pub(crate) fn new(
        pool: &SqlitePool,
        products: &Products,
        balances: &Balances,
        clock: &SystemClock,
    ) -> Self {
        Self {
            repo: AccountRepo::new(pool),
            products: products.clone(),
            balances: balances.clone(),
            clock: clock.clone(),
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Opens a customer account under the sub-product's leaf GL. The number
    /// is the 8-digit customer id, the product-category digit, and a 3-digit
    /// per-GL sequence.
    #[instrument(name = "khata.accounts.open_customer", skip(self, new), fields(cust_id = new.cust_id))]
    pub async fn open_customer_account(
        &self,
        new: NewCustomerAccount,
    ) -> Result<AccountInfo, AccountError> {
        let sub_product = self.products.find_sub_product(new.sub_product_id).await?;
        let gl_num = sub_product.cum_gl_num.clone();
        if !new.loan_limit.is_zero() && !gl::is_asset(&gl_num) {
            return Err(AccountError::NonAssetLoanLimit(gl_num));
        }
        self.products.find_customer(new.cust_id).await?;
        let date_opening = self.clock.now().await?;

        let mut op = AtomicOperation::init(self.repo.pool()).await?;
        let seq = self.repo.next_seq(&mut **op.tx(), &gl_num).await?;
        if seq > CUSTOMER_SEQ_LIMIT {
            return Err(AccountError::SequenceExhausted {
                gl_num,
                limit: CUSTOMER_SEQ_LIMIT,
            });
        }
        let account_no = format!(
            "{:08}{}{:03}",
            new.cust_id, sub_product.product_category, seq
        );
        if self
            .repo
            .find_info(&mut **op.tx(), &account_no)
            .await?
            .is_some()
        {
            return Err(AccountError::DuplicateAccountNo(account_no));
        }
        self.repo
            .insert_customer_account(&mut **op.tx(), &account_no, &new, &gl_num, date_opening)
            .await?;
        self.balances
            .create_opening_row_in_op(&mut op, &account_no, date_opening)
            .await?;
        op.commit().await?;

        self.invalidate(&account_no);
        self.resolve(&account_no).await
    }

    /// Opens an office account: `9` + GL + 2-digit sequence, at most 99
    /// office accounts per GL.
    #[instrument(name = "khata.accounts.open_office", skip(self, new))]
    pub async fn open_office_account(
        &self,
        new: NewOfficeAccount,
    ) -> Result<AccountInfo, AccountError> {
        let sub_product = self.products.find_sub_product(new.sub_product_id).await?;
        let gl_num = sub_product.cum_gl_num.clone();
        let date_opening = self.clock.now().await?;

        let mut op = AtomicOperation::init(self.repo.pool()).await?;
        let seq = self.repo.next_seq(&mut **op.tx(), &gl_num).await?;
        if seq > OFFICE_SEQ_LIMIT {
            return Err(AccountError::SequenceExhausted {
                gl_num,
                limit: OFFICE_SEQ_LIMIT,
            });
        }
        let account_no = format!("9{}{:02}", gl_num, seq);
        if self
            .repo
            .find_info(&mut **op.tx(), &account_no)
            .await?
            .is_some()
        {
            return Err(AccountError::DuplicateAccountNo(account_no));
        }
        self.repo
            .insert_office_account(&mut **op.tx(), &account_no, &new, &gl_num, date_opening)
            .await?;
        self.balances
            .create_opening_row_in_op(&mut op, &account_no, date_opening)
            .await?;
        op.commit().await?;

        self.invalidate(&account_no);
        self.resolve(&account_no).await
    }

    /// Resolves an account number to its snapshot, customer table first.
    pub async fn resolve(&self, account_no: &str) -> Result<AccountInfo, AccountError> {
        if let Some(info) = self
            .cache
            .read()
            .expect("account cache poisoned")
            .get(account_no)
        {
            return Ok(info.clone());
        }
        let info = self
            .repo
            .find_info(self.repo.pool(), account_no)
            .await?
            .ok_or_else(|| AccountError::NotFound(account_no.to_string()))?;
        self.cache
            .write()
            .expect("account cache poisoned")
            .insert(account_no.to_string(), info.clone());
        Ok(info)
    }

    pub(crate) async fn resolve_in_op(
        &self,
        op: &mut AtomicOperation,
        account_no: &str,
    ) -> Result<AccountInfo, AccountError> {
        self.repo
            .find_info(&mut **op.tx(), account_no)
            .await?
            .ok_or_else(|| AccountError::NotFound(account_no.to_string()))
    }

    pub async fn exists(&self, account_no: &str) -> Result<bool, AccountError> {
        match self.resolve(account_no).await {
            Ok(_) => Ok(true),
            Err(AccountError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Status transition. Closure additionally requires a zero balance and
    /// stamps the closure date.
    #[instrument(name = "khata.accounts.set_status", skip(self))]
    pub async fn set_status(
        &self,
        account_no: &str,
        status: AccountStatus,
    ) -> Result<AccountInfo, AccountError> {
        let info = self.resolve(account_no).await?;
        let today = self.clock.now().await?;
        let date_closure = if status == AccountStatus::Closed {
            let balance = self.balances.current_balance(account_no, today).await?;
            if !balance.is_zero() {
                return Err(AccountError::CloseNonZeroBalance {
                    account_no: account_no.to_string(),
                    balance,
                });
            }
            Some(today)
        } else {
            None
        };
        self.repo
            .update_status(account_no, info.kind, status, date_closure)
            .await?;
        self.invalidate(account_no);
        self.resolve(account_no).await
    }

    pub(crate) async fn active_customer_accounts(
        &self,
    ) -> Result<Vec<AccountSweepRow>, AccountError> {
        self.repo.active_customer_accounts().await
    }

    pub(crate) async fn active_accounts(&self) -> Result<Vec<AccountSweepRow>, AccountError> {
        self.repo.active_accounts().await
    }

    pub(crate) async fn loan_limit(&self, account_no: &str) -> Result<rust_decimal::Decimal, AccountError> {
        Ok(self
            .repo
            .customer_loan_limit(account_no)
            .await?
            .unwrap_or(rust_decimal::Decimal::ZERO))
    }

    fn invalidate(&self, account_no: &str) {
        self.cache
            .write()
            .expect("account cache poisoned")
            .remove(account_no);
    }
}
