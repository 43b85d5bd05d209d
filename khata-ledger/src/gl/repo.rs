use sqlx::SqlitePool;

use super::{entity::*, error::GlError};

#[derive(Debug, Clone)]
pub(super) struct GlRepo {
    pool: SqlitePool,
}

impl GlRepo {
    pub fn new(pool: &SqlitePool) -> Self {
        Self { pool: pool.clone() }
    }

    pub async fn find(&self, gl_num: &str) -> Result<Option<GlSetup>, GlError> {
        let row = sqlx::query_as::<_, GlSetup>(
            "SELECT gl_num, gl_name, layer_id, layer_gl_num, parent_gl_num FROM gl_setup WHERE gl_num = ?",
        )
        .bind(gl_num)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn find_at_layer(&self, gl_num: &str, layer_id: i64) -> Result<Option<GlSetup>, GlError> {
        let row = sqlx::query_as::<_, GlSetup>(
            "SELECT gl_num, gl_name, layer_id, layer_gl_num, parent_gl_num FROM gl_setup WHERE gl_num = ? AND layer_id = ?",
        )
        .bind(gl_num)
        .bind(layer_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn insert(&self, new_gl: &NewGlSetup) -> Result<(), GlError> {
        sqlx::query(
            r#"
            INSERT INTO gl_setup (gl_num, gl_name, layer_id, layer_gl_num, parent_gl_num)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new_gl.gl_num)
        .bind(&new_gl.gl_name)
        .bind(new_gl.layer_id)
        .bind(&new_gl.layer_gl_num)
        .bind(&new_gl.parent_gl_num)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                GlError::DuplicateGl(new_gl.gl_num.clone())
            }
            e => GlError::Sqlx(e),
        })?;
        Ok(())
    }

    pub async fn list_by_layer(&self, layer_id: i64) -> Result<Vec<GlSetup>, GlError> {
        let rows = sqlx::query_as::<_, GlSetup>(
            "SELECT gl_num, gl_name, layer_id, layer_gl_num, parent_gl_num FROM gl_setup WHERE layer_id = ? ORDER BY gl_num",
        )
        .bind(layer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// GL numbers referenced by at least one sub-product that has at least
    /// one open account, including the sub-products' interest GLs.
    pub async fn active_gl_nums(&self) -> Result<Vec<String>, GlError> {
        let rows: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT gl.gl_num
            FROM gl_setup gl
            WHERE gl.gl_num IN (
                SELECT sp.cum_gl_num
                FROM sub_prod_master sp
                JOIN cust_acct_master ca ON ca.sub_product_id = sp.sub_product_id
                UNION
                SELECT sp.cum_gl_num
                FROM sub_prod_master sp
                JOIN of_acct_master oa ON oa.sub_product_id = sp.sub_product_id
                UNION
                SELECT sp.interest_income_expenditure_gl_num
                FROM sub_prod_master sp
                JOIN cust_acct_master ca ON ca.sub_product_id = sp.sub_product_id
                WHERE sp.interest_income_expenditure_gl_num IS NOT NULL
                UNION
                SELECT sp.interest_receivable_payable_gl_num
                FROM sub_prod_master sp
                JOIN cust_acct_master ca ON ca.sub_product_id = sp.sub_product_id
                WHERE sp.interest_receivable_payable_gl_num IS NOT NULL
                UNION
                SELECT sp.interest_income_expenditure_gl_num
                FROM sub_prod_master sp
                JOIN of_acct_master oa ON oa.sub_product_id = sp.sub_product_id
                WHERE sp.interest_income_expenditure_gl_num IS NOT NULL
                UNION
                SELECT sp.interest_receivable_payable_gl_num
                FROM sub_prod_master sp
                JOIN of_acct_master oa ON oa.sub_product_id = sp.sub_product_id
                WHERE sp.interest_receivable_payable_gl_num IS NOT NULL
            )
            ORDER BY gl.gl_num
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
