//! Minimal product master data. The wider master-data CRUD (maker-checker,
//! editing, dashboards) lives outside the core; the ledger only needs to
//! create and read the records that postings and accruals depend on.

pub mod error;

mod entity;
mod repo;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use tracing::instrument;

pub use entity::*;
use error::ProductError;
use repo::ProductRepo;

use crate::gl::LEAF_LAYER;

#[derive(Clone)]
pub struct Products {
    repo: ProductRepo,
}

impl Products {
    pub(crate) fn new(pool: &SqlitePool) -> Self {
        Self {
            repo: ProductRepo::new(pool),
        }
    }

    #[instrument(name = "khata.products.create_sub_product", skip(self, new), fields(code = %new.sub_product_code))]
    pub async fn create_sub_product(&self, new: NewSubProduct) -> Result<SubProduct, ProductError> {
        match self.repo.gl_layer(&new.cum_gl_num).await? {
            Some(layer) if layer == LEAF_LAYER => {}
            _ => return Err(ProductError::GlNotLeaf(new.cum_gl_num.clone())),
        }
        let id = self.repo.insert_sub_product(&new).await?;
        self.find_sub_product(id).await
    }

    pub async fn find_sub_product(&self, sub_product_id: i64) -> Result<SubProduct, ProductError> {
        self.repo
            .find_sub_product(sub_product_id)
            .await?
            .ok_or_else(|| ProductError::NotFound(sub_product_id.to_string()))
    }

    pub async fn find_sub_product_by_code(&self, code: &str) -> Result<SubProduct, ProductError> {
        self.repo
            .find_sub_product_by_code(code)
            .await?
            .ok_or_else(|| ProductError::NotFound(code.to_string()))
    }

    pub async fn add_rate(
        &self,
        intt_code: &str,
        effective_date: NaiveDate,
        rate: Decimal,
    ) -> Result<(), ProductError> {
        self.repo
            .insert_rate(&InterestRate {
                intt_code: intt_code.to_string(),
                effective_date,
                rate,
            })
            .await
    }

    /// Base rate in force for the interest code on `as_of`, if any.
    pub async fn latest_rate(
        &self,
        intt_code: &str,
        as_of: NaiveDate,
    ) -> Result<Option<InterestRate>, ProductError> {
        self.repo.latest_rate(intt_code, as_of).await
    }

    pub async fn create_customer(&self, cust_name: &str) -> Result<Customer, ProductError> {
        let id = self.repo.insert_customer(cust_name).await?;
        self.find_customer(id).await
    }

    pub async fn find_customer(&self, cust_id: i64) -> Result<Customer, ProductError> {
        self.repo
            .find_customer(cust_id)
            .await?
            .ok_or(ProductError::CustomerNotFound(cust_id))
    }
}
