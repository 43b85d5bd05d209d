pub mod error;

mod entity;
mod repo;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::SqlitePool;

use crate::{operation::AtomicOperation, primitives::DrCrFlag};
pub use entity::*;
use error::MovementError;
use repo::MovementRepo;

#[derive(Clone)]
pub struct GlMovements {
    repo: MovementRepo,
}

impl GlMovements {
    pub(crate) fn new(pool: &SqlitePool) -> Self {
        Self {
            repo: MovementRepo::new(pool),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) async fn record_in_op(
        &self,
        op: &mut AtomicOperation,
        tran_id: &str,
        gl_num: &str,
        flag: DrCrFlag,
        tran_date: NaiveDate,
        value_date: NaiveDate,
        amount: Decimal,
        balance_after: Decimal,
    ) -> Result<(), MovementError> {
        self.repo
            .insert_movement(
                &mut **op.tx(),
                tran_id,
                gl_num,
                flag,
                tran_date,
                value_date,
                amount,
                balance_after,
            )
            .await
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) async fn record_accrual_in_op(
        &self,
        op: &mut AtomicOperation,
        accr_tran_id: &str,
        account_no: &str,
        gl_num: &str,
        flag: DrCrFlag,
        date: NaiveDate,
        amount: Decimal,
        balance_after: Decimal,
    ) -> Result<(), MovementError> {
        self.repo
            .insert_accrual_movement(
                &mut **op.tx(),
                accr_tran_id,
                account_no,
                gl_num,
                flag,
                date,
                amount,
                balance_after,
            )
            .await
    }

    pub async fn for_tran_id(&self, tran_id: &str) -> Result<Vec<GlMovement>, MovementError> {
        self.repo.for_tran_id(tran_id).await
    }

    pub async fn for_date(&self, date: NaiveDate) -> Result<Vec<GlMovement>, MovementError> {
        self.repo.for_date(date).await
    }

    pub async fn accruals_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<GlMovementAccrual>, MovementError> {
        self.repo.accruals_for_date(date).await
    }

    pub(crate) async fn delete_accrual_copies_in_op(
        &self,
        op: &mut AtomicOperation,
        date: NaiveDate,
    ) -> Result<u64, MovementError> {
        self.repo.delete_accrual_copies(&mut **op.tx(), date).await
    }
}
