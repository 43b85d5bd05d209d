//! Beginning-of-Day processing: future-dated transactions whose value date
//! has arrived are promoted into the open day with full posting semantics.
//! Each transaction promotes in its own unit of work, so one failure leaves
//! the earlier promotions in place.

pub mod error;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::instrument;

use crate::{clock::SystemClock, transaction::Transactions};
use error::BodError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BodSummary {
    pub system_date: NaiveDate,
    pub pending_before: i64,
    pub processed: u64,
    pub pending_after: i64,
    pub failures: Vec<BodFailure>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BodFailure {
    pub tran_id: String,
    pub message: String,
}

#[derive(Clone)]
pub struct BodProcessor {
    transactions: Transactions,
    clock: SystemClock,
}

impl BodProcessor {
    pub(crate) fn new(transactions: &Transactions, clock: &SystemClock) -> Self {
        Self {
            transactions: transactions.clone(),
            clock: clock.clone(),
        }
    }

    #[instrument(name = "khata.bod.run", skip(self))]
    pub async fn run(&self) -> Result<BodSummary, BodError> {
        let system_date = self.clock.now().await?;
        let pending_before = self.transactions.count_future_legs().await?;
        let due = self.transactions.future_bases_due(system_date).await?;

        let mut processed = 0u64;
        let mut failures = Vec::new();
        for base_tran_id in due {
            match self.transactions.post_future(&base_tran_id).await {
                Ok(summary) => processed += summary.lines.len() as u64,
                Err(e) => {
                    tracing::warn!(tran_id = %base_tran_id, error = %e, "BOD promotion failed");
                    failures.push(BodFailure {
                        tran_id: base_tran_id,
                        message: e.to_string(),
                    });
                }
            }
        }

        let pending_after = self.transactions.count_future_legs().await?;
        tracing::info!(
            pending_before,
            processed,
            pending_after,
            "BOD run complete"
        );
        Ok(BodSummary {
            system_date,
            pending_before,
            processed,
            pending_after,
            failures,
        })
    }
}
