use chrono::NaiveDate;
use sqlx::{Row, SqlitePool};

use super::{entity::*, error::ProductError};

#[derive(Debug, Clone)]
pub(super) struct ProductRepo {
    pool: SqlitePool,
}

const SUB_PRODUCT_COLUMNS: &str = "sub_product_id, sub_product_code, sub_product_name, \
     product_category, cum_gl_num, intt_code, interest_increment, effective_interest_rate, \
     interest_income_expenditure_gl_num, interest_receivable_payable_gl_num";

impl ProductRepo {
    pub fn new(pool: &SqlitePool) -> Self {
        Self { pool: pool.clone() }
    }

    pub async fn insert_sub_product(&self, new: &NewSubProduct) -> Result<i64, ProductError> {
        let result = sqlx::query(
            r#"
            INSERT INTO sub_prod_master
                (sub_product_code, sub_product_name, product_category, cum_gl_num, intt_code,
                 interest_increment, effective_interest_rate,
                 interest_income_expenditure_gl_num, interest_receivable_payable_gl_num)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.sub_product_code)
        .bind(&new.sub_product_name)
        .bind(&new.product_category)
        .bind(&new.cum_gl_num)
        .bind(&new.intt_code)
        .bind(new.interest_increment.map(|d| d.to_string()))
        .bind(new.effective_interest_rate.map(|d| d.to_string()))
        .bind(&new.interest_income_expenditure_gl_num)
        .bind(&new.interest_receivable_payable_gl_num)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                ProductError::DuplicateCode(new.sub_product_code.clone())
            }
            e => ProductError::Sqlx(e),
        })?;
        Ok(result.last_insert_rowid())
    }

    pub async fn find_sub_product(&self, sub_product_id: i64) -> Result<Option<SubProduct>, ProductError> {
        let row = sqlx::query_as::<_, SubProduct>(&format!(
            "SELECT {SUB_PRODUCT_COLUMNS} FROM sub_prod_master WHERE sub_product_id = ?"
        ))
        .bind(sub_product_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn find_sub_product_by_code(&self, code: &str) -> Result<Option<SubProduct>, ProductError> {
        let row = sqlx::query_as::<_, SubProduct>(&format!(
            "SELECT {SUB_PRODUCT_COLUMNS} FROM sub_prod_master WHERE sub_product_code = ?"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Latest rate for the interest code with effective date on or before
    /// `as_of`.
    pub async fn latest_rate(
        &self,
        intt_code: &str,
        as_of: NaiveDate,
    ) -> Result<Option<InterestRate>, ProductError> {
        let row = sqlx::query_as::<_, InterestRate>(
            r#"
            SELECT intt_code, intt_effctv_date, intt_rate
            FROM intt_rate_master
            WHERE intt_code = ? AND intt_effctv_date <= ?
            ORDER BY intt_effctv_date DESC
            LIMIT 1
            "#,
        )
        .bind(intt_code)
        .bind(as_of)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn insert_rate(&self, rate: &InterestRate) -> Result<(), ProductError> {
        sqlx::query(
            "INSERT INTO intt_rate_master (intt_code, intt_effctv_date, intt_rate) VALUES (?, ?, ?)",
        )
        .bind(&rate.intt_code)
        .bind(rate.effective_date)
        .bind(rate.rate.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_customer(&self, cust_name: &str) -> Result<i64, ProductError> {
        let result = sqlx::query("INSERT INTO cust_master (cust_name) VALUES (?)")
            .bind(cust_name)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn find_customer(&self, cust_id: i64) -> Result<Option<Customer>, ProductError> {
        let row = sqlx::query("SELECT cust_id, cust_name FROM cust_master WHERE cust_id = ?")
            .bind(cust_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| Customer {
            cust_id: r.get("cust_id"),
            cust_name: r.get("cust_name"),
        }))
    }

    pub async fn gl_layer(&self, gl_num: &str) -> Result<Option<i64>, ProductError> {
        let layer: Option<i64> =
            sqlx::query_scalar("SELECT layer_id FROM gl_setup WHERE gl_num = ?")
                .bind(gl_num)
                .fetch_optional(&self.pool)
                .await?;
        Ok(layer)
    }
}
