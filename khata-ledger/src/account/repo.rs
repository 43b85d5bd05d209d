use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, Row, Sqlite, SqlitePool};

use super::{entity::*, error::AccountError};
use crate::{
    db,
    primitives::{AccountKind, AccountStatus},
};

#[derive(Debug, Clone)]
pub(super) struct AccountRepo {
    pool: SqlitePool,
}

impl AccountRepo {
    pub fn new(pool: &SqlitePool) -> Self {
        Self { pool: pool.clone() }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn find_info(
        &self,
        executor: impl Executor<'_, Database = Sqlite>,
        account_no: &str,
    ) -> Result<Option<AccountInfo>, AccountError> {
        let row = sqlx::query(
            r#"
            SELECT account_no, acct_name, gl_num, account_status, loan_limit, sub_product_id,
                   1 AS is_customer
            FROM cust_acct_master WHERE account_no = ?
            UNION ALL
            SELECT account_no, acct_name, gl_num, account_status, '0.00' AS loan_limit,
                   sub_product_id, 0 AS is_customer
            FROM of_acct_master WHERE account_no = ?
            "#,
        )
        .bind(account_no)
        .bind(account_no)
        .fetch_optional(executor)
        .await?;
        row.map(|row| {
            let is_customer: i64 = row.try_get("is_customer")?;
            Ok(AccountInfo {
                account_no: row.try_get("account_no")?,
                acct_name: row.try_get("acct_name")?,
                gl_num: row.try_get("gl_num")?,
                kind: if is_customer == 1 {
                    AccountKind::Customer
                } else {
                    AccountKind::Office
                },
                status: db::parsed_column(&row, "account_status")?,
                loan_limit: db::decimal_column(&row, "loan_limit")?,
                sub_product_id: row.try_get("sub_product_id")?,
            })
        })
        .transpose()
        .map_err(AccountError::Sqlx)
    }

    pub async fn insert_customer_account(
        &self,
        executor: impl Executor<'_, Database = Sqlite>,
        account_no: &str,
        new: &NewCustomerAccount,
        gl_num: &str,
        date_opening: NaiveDate,
    ) -> Result<(), AccountError> {
        sqlx::query(
            r#"
            INSERT INTO cust_acct_master
                (account_no, cust_id, sub_product_id, gl_num, acct_name, date_opening,
                 tenor, date_maturity, account_status, loan_limit)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(account_no)
        .bind(new.cust_id)
        .bind(new.sub_product_id)
        .bind(gl_num)
        .bind(&new.acct_name)
        .bind(date_opening)
        .bind(new.tenor)
        .bind(new.date_maturity)
        .bind(AccountStatus::Active.as_str())
        .bind(new.loan_limit.to_string())
        .execute(executor)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AccountError::DuplicateAccountNo(account_no.to_string())
            }
            e => AccountError::Sqlx(e),
        })?;
        Ok(())
    }

    pub async fn insert_office_account(
        &self,
        executor: impl Executor<'_, Database = Sqlite>,
        account_no: &str,
        new: &NewOfficeAccount,
        gl_num: &str,
        date_opening: NaiveDate,
    ) -> Result<(), AccountError> {
        sqlx::query(
            r#"
            INSERT INTO of_acct_master
                (account_no, sub_product_id, gl_num, acct_name, date_opening, account_status)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(account_no)
        .bind(new.sub_product_id)
        .bind(gl_num)
        .bind(&new.acct_name)
        .bind(date_opening)
        .bind(AccountStatus::Active.as_str())
        .execute(executor)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AccountError::DuplicateAccountNo(account_no.to_string())
            }
            e => AccountError::Sqlx(e),
        })?;
        Ok(())
    }

    /// Bumps and returns the per-GL account sequence. Runs inside the
    /// opening operation so two concurrent opens cannot share a number.
    pub async fn next_seq(
        &self,
        executor: impl Executor<'_, Database = Sqlite>,
        gl_num: &str,
    ) -> Result<i64, AccountError> {
        let seq: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO account_seq (gl_num, last_seq) VALUES (?, 1)
            ON CONFLICT (gl_num) DO UPDATE SET last_seq = last_seq + 1
            RETURNING last_seq
            "#,
        )
        .bind(gl_num)
        .fetch_one(executor)
        .await?;
        Ok(seq)
    }

    pub async fn update_status(
        &self,
        account_no: &str,
        kind: AccountKind,
        status: AccountStatus,
        date_closure: Option<NaiveDate>,
    ) -> Result<(), AccountError> {
        let table = match kind {
            AccountKind::Customer => "cust_acct_master",
            AccountKind::Office => "of_acct_master",
        };
        sqlx::query(&format!(
            "UPDATE {table} SET account_status = ?, date_closure = ? WHERE account_no = ?"
        ))
        .bind(status.as_str())
        .bind(date_closure)
        .bind(account_no)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn active_customer_accounts(&self) -> Result<Vec<AccountSweepRow>, AccountError> {
        let rows = sqlx::query(
            "SELECT account_no, gl_num, sub_product_id FROM cust_acct_master \
             WHERE account_status = 'Active' ORDER BY account_no",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|row| {
                Ok(AccountSweepRow {
                    account_no: row.try_get("account_no")?,
                    gl_num: row.try_get("gl_num")?,
                    sub_product_id: row.try_get("sub_product_id")?,
                    kind: AccountKind::Customer,
                })
            })
            .collect::<Result<_, sqlx::Error>>()
            .map_err(AccountError::Sqlx)
    }

    pub async fn active_accounts(&self) -> Result<Vec<AccountSweepRow>, AccountError> {
        let mut accounts = self.active_customer_accounts().await?;
        let rows = sqlx::query(
            "SELECT account_no, gl_num, sub_product_id FROM of_acct_master \
             WHERE account_status = 'Active' ORDER BY account_no",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in rows {
            accounts.push(AccountSweepRow {
                account_no: row.try_get("account_no")?,
                gl_num: row.try_get("gl_num")?,
                sub_product_id: row.try_get("sub_product_id")?,
                kind: AccountKind::Office,
            });
        }
        Ok(accounts)
    }

    pub async fn customer_loan_limit(
        &self,
        account_no: &str,
    ) -> Result<Option<Decimal>, AccountError> {
        let raw: Option<String> =
            sqlx::query_scalar("SELECT loan_limit FROM cust_acct_master WHERE account_no = ?")
                .bind(account_no)
                .fetch_optional(&self.pool)
                .await?;
        raw.map(|r| {
            r.parse().map_err(|e: rust_decimal::Error| {
                AccountError::Sqlx(sqlx::Error::ColumnDecode {
                    index: "loan_limit".to_string(),
                    source: Box::new(e),
                })
            })
        })
        .transpose()
    }
}
