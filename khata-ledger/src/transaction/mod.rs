//! The transaction engine: multi-leg double-entry transactions moving
//! through `Entry → Posted → Verified`, with future-dated legs parked in
//! `Future` until BOD promotes them, and reversal by inverse transaction.

pub mod error;

mod entity;
mod repo;
mod validation;

use std::collections::HashMap;

use chrono::NaiveDate;
use rand::Rng;
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use tracing::instrument;

use crate::{
    account::{AccountInfo, Accounts},
    balance::Balances,
    clock::SystemClock,
    gl::ChartOfAccounts,
    history::TransactionHistories,
    movement::GlMovements,
    operation::AtomicOperation,
    primitives::{round_money, DrCrFlag, TranStatus},
};
pub use entity::*;
use error::TransactionError;
use repo::TranRepo;
use validation::LegContext;

#[derive(Clone)]
pub struct Transactions {
    repo: TranRepo,
    accounts: Accounts,
    balances: Balances,
    movements: GlMovements,
    histories: TransactionHistories,
    chart: ChartOfAccounts,
    clock: SystemClock,
    default_currency: String,
}

impl Transactions {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        pool: &SqlitePool,
        accounts: &Accounts,
        balances: &Balances,
        movements: &GlMovements,
        histories: &TransactionHistories,
        chart: &ChartOfAccounts,
        clock: &SystemClock,
        default_currency: String,
    ) -> Self {
        Self {
            repo: TranRepo::new(pool),
            accounts: accounts.clone(),
            balances: balances.clone(),
            movements: movements.clone(),
            histories: histories.clone(),
            chart: chart.clone(),
            clock: clock.clone(),
            default_currency,
        }
    }

    /// Creates a transaction in `Entry` status (or `Future` when the value
    /// date lies beyond the open day). Nothing but the legs themselves is
    /// written; balances move at posting.
    #[instrument(name = "khata.transactions.create", skip(self, new_transaction))]
    pub async fn create(
        &self,
        new_transaction: NewTransaction,
    ) -> Result<TransactionSummary, TransactionError> {
        if new_transaction.legs.len() < 2 {
            return Err(TransactionError::TooFewLegs);
        }
        let today = self.clock.now().await?;
        let legs: Vec<(NewTranLeg, Decimal)> = new_transaction
            .legs
            .iter()
            .map(|leg| (leg.clone(), round_money(leg.lcy_amt)))
            .collect();
        for (leg, amount) in &legs {
            if *amount <= Decimal::ZERO {
                return Err(TransactionError::NonPositiveAmount(leg.account_no.clone()));
            }
        }
        check_balanced(legs.iter().map(|(leg, amount)| (leg.dr_cr_flag, *amount)))?;

        // Validate every leg against the hypothetical resulting balance
        // before anything is committed. Earlier legs of this transaction
        // count against later ones on the same account.
        let mut deltas: HashMap<String, Decimal> = HashMap::new();
        for (leg, amount) in &legs {
            let info = self.accounts.resolve(&leg.account_no).await?;
            let delta = deltas.get(&leg.account_no).copied().unwrap_or(Decimal::ZERO);
            let ctx = LegContext {
                current_balance: self
                    .balances
                    .current_balance(&leg.account_no, today)
                    .await?
                    + delta,
                available_balance: self.balances.available_balance(&info, today).await? + delta,
            };
            validation::check_leg(&info, leg.dr_cr_flag, *amount, &ctx)?;
            let signed = match leg.dr_cr_flag {
                DrCrFlag::Debit => -*amount,
                DrCrFlag::Credit => *amount,
            };
            *deltas.entry(leg.account_no.clone()).or_insert(Decimal::ZERO) += signed;
        }

        let status = if new_transaction.value_date > today {
            TranStatus::Future
        } else {
            TranStatus::Entry
        };

        let mut op = AtomicOperation::init(self.repo.pool()).await?;
        let base_tran_id = self.generate_tran_id(&mut op, today).await?;
        let mut stored = Vec::with_capacity(legs.len());
        for (line_no, (leg, amount)) in legs.into_iter().enumerate() {
            let row = TranLeg {
                tran_id: format!("{}-{}", base_tran_id, line_no + 1),
                tran_date: today,
                value_date: new_transaction.value_date,
                dr_cr_flag: leg.dr_cr_flag,
                tran_status: status,
                account_no: leg.account_no,
                tran_ccy: leg.tran_ccy.unwrap_or_else(|| self.default_currency.clone()),
                fcy_amt: leg.fcy_amt.map(round_money).unwrap_or(amount),
                exchange_rate: leg.exchange_rate,
                lcy_amt: amount,
                narration: leg
                    .narration
                    .or_else(|| Some(new_transaction.narration.clone())),
                pointing_id: None,
            };
            self.repo.insert_leg(&mut **op.tx(), &row).await?;
            stored.push(row);
        }
        op.commit().await?;

        tracing::info!(tran_id = %base_tran_id, status = %status, "transaction created");
        Ok(TransactionSummary::from_legs(&base_tran_id, stored))
    }

    /// Posts a transaction: every leg's balance and GL effects are applied
    /// inside one unit of work, or none are.
    #[instrument(name = "khata.transactions.post", skip(self))]
    pub async fn post(&self, tran_id: &str) -> Result<TransactionSummary, TransactionError> {
        self.post_legs(tran_id, TranStatus::Entry).await
    }

    /// Full posting semantics for a future-dated transaction whose value
    /// date has arrived. Used by the BOD processor.
    pub(crate) async fn post_future(
        &self,
        tran_id: &str,
    ) -> Result<TransactionSummary, TransactionError> {
        self.post_legs(tran_id, TranStatus::Future).await
    }

    async fn post_legs(
        &self,
        base_tran_id: &str,
        from_status: TranStatus,
    ) -> Result<TransactionSummary, TransactionError> {
        let posting_date = self.clock.now().await?;

        // Resolve collaborating records outside the unit of work, then
        // re-read and re-validate inside it.
        let preview = self
            .repo
            .legs_by_prefix_and_status(self.repo.pool(), base_tran_id, from_status)
            .await?;
        if preview.is_empty() {
            let any = self
                .repo
                .legs_by_prefix(self.repo.pool(), base_tran_id)
                .await?;
            return Err(if any.is_empty() {
                TransactionError::NotFound(base_tran_id.to_string())
            } else {
                TransactionError::NotEntry(base_tran_id.to_string())
            });
        }
        for leg in &preview {
            let info = self.accounts.resolve(&leg.account_no).await?;
            self.chart.find(&info.gl_num).await?;
        }

        let mut op = AtomicOperation::init(self.repo.pool()).await?;
        let legs = self
            .repo
            .legs_by_prefix_and_status(&mut **op.tx(), base_tran_id, from_status)
            .await?;
        if legs.is_empty() {
            return Err(TransactionError::NotEntry(base_tran_id.to_string()));
        }
        check_balanced(legs.iter().map(|leg| (leg.dr_cr_flag, leg.lcy_amt)))?;

        let mut posted = Vec::with_capacity(legs.len());
        let mut deltas: HashMap<String, Decimal> = HashMap::new();
        for leg in legs {
            let info = self.accounts.resolve_in_op(&mut op, &leg.account_no).await?;
            // The day sums exclude this transaction's own legs; earlier legs
            // already posted in this loop enter through the running delta.
            let delta = deltas.get(&leg.account_no).copied().unwrap_or(Decimal::ZERO);
            let mut ctx = self
                .leg_context_in_op(&mut op, &info, posting_date, base_tran_id)
                .await?;
            ctx.available_balance += delta;
            validation::check_leg(&info, leg.dr_cr_flag, leg.lcy_amt, &ctx)?;
            let signed = match leg.dr_cr_flag {
                DrCrFlag::Debit => -leg.lcy_amt,
                DrCrFlag::Credit => leg.lcy_amt,
            };
            *deltas.entry(leg.account_no.clone()).or_insert(Decimal::ZERO) += signed;

            self.repo
                .update_status(&mut **op.tx(), &leg.tran_id, TranStatus::Posted)
                .await?;
            // A leg posted after its creation day (or promoted from Future)
            // enters the ledger on the posting day: its date moves with it so
            // daily summations and balance rows stay consistent.
            if leg.tran_date != posting_date {
                sqlx::query("UPDATE tran_table SET tran_date = ? WHERE tran_id = ?")
                    .bind(posting_date)
                    .bind(&leg.tran_id)
                    .execute(&mut **op.tx())
                    .await?;
            }
            self.balances
                .update_account_for_posting_in_op(
                    &mut op,
                    &info,
                    leg.dr_cr_flag,
                    leg.lcy_amt,
                    posting_date,
                )
                .await?;
            let gl_balance_after = self
                .balances
                .update_gl_for_posting_in_op(
                    &mut op,
                    &info.gl_num,
                    leg.dr_cr_flag,
                    leg.lcy_amt,
                    posting_date,
                )
                .await?;
            self.movements
                .record_in_op(
                    &mut op,
                    &leg.tran_id,
                    &info.gl_num,
                    leg.dr_cr_flag,
                    posting_date,
                    leg.value_date,
                    leg.lcy_amt,
                    gl_balance_after,
                )
                .await?;
            posted.push(TranLeg {
                tran_status: TranStatus::Posted,
                tran_date: posting_date,
                ..leg
            });
        }
        op.commit().await?;

        tracing::info!(tran_id = %base_tran_id, "transaction posted");
        Ok(TransactionSummary::from_legs(base_tran_id, posted))
    }

    /// Marks all legs verified and writes the statement history rows.
    /// Verifying an already-verified transaction reports `AlreadyVerified`.
    #[instrument(name = "khata.transactions.verify", skip(self))]
    pub async fn verify(&self, tran_id: &str) -> Result<TransactionSummary, TransactionError> {
        let today = self.clock.now().await?;
        let stamp = self.clock.now_timestamp().await?;

        let all = self.repo.legs_by_prefix(self.repo.pool(), tran_id).await?;
        if all.is_empty() {
            return Err(TransactionError::NotFound(tran_id.to_string()));
        }
        if all
            .iter()
            .all(|leg| leg.tran_status == TranStatus::Verified)
        {
            return Err(TransactionError::AlreadyVerified(tran_id.to_string()));
        }

        let mut op = AtomicOperation::init(self.repo.pool()).await?;
        let mut verified = Vec::with_capacity(all.len());
        for leg in all {
            if leg.tran_status != TranStatus::Verified {
                self.repo
                    .update_status(&mut **op.tx(), &leg.tran_id, TranStatus::Verified)
                    .await?;
            }
            let balance_after = self
                .balances
                .current_balance_in_op(&mut op, &leg.account_no, today)
                .await?;
            self.histories
                .record_in_op(
                    &mut op,
                    &leg.tran_id,
                    &leg.account_no,
                    leg.tran_date,
                    leg.value_date,
                    leg.dr_cr_flag,
                    &leg.tran_ccy,
                    leg.lcy_amt,
                    leg.narration.as_deref(),
                    balance_after,
                    "SYSTEM",
                    stamp,
                )
                .await?;
            verified.push(TranLeg {
                tran_status: TranStatus::Verified,
                ..leg
            });
        }
        op.commit().await?;

        tracing::info!(tran_id = %tran_id, "transaction verified");
        Ok(TransactionSummary::from_legs(tran_id, verified))
    }

    /// Reverses a transaction by minting an inverse one. The original is
    /// never mutated; the reversal is verified immediately and its legs
    /// point back via `pointing_id`.
    #[instrument(name = "khata.transactions.reverse", skip(self, reason))]
    pub async fn reverse(
        &self,
        tran_id: &str,
        reason: &str,
    ) -> Result<TransactionSummary, TransactionError> {
        let today = self.clock.now().await?;
        let stamp = self.clock.now_timestamp().await?;

        let originals = self.repo.legs_by_prefix(self.repo.pool(), tran_id).await?;
        if originals.is_empty() {
            return Err(TransactionError::OriginalNotFound(tran_id.to_string()));
        }
        let mut infos = Vec::with_capacity(originals.len());
        for leg in &originals {
            let info = self.accounts.resolve(&leg.account_no).await?;
            self.chart.find(&info.gl_num).await?;
            infos.push(info);
        }

        let mut op = AtomicOperation::init(self.repo.pool()).await?;
        let reversal_id = self.generate_tran_id(&mut op, today).await?;
        let mut reversal_legs = Vec::with_capacity(originals.len());
        for (line_no, (original, info)) in originals.iter().zip(infos.iter()).enumerate() {
            let flipped = original.dr_cr_flag.flipped();
            let row = TranLeg {
                tran_id: format!("{}-{}", reversal_id, line_no + 1),
                tran_date: today,
                value_date: original.value_date,
                dr_cr_flag: flipped,
                tran_status: TranStatus::Verified,
                account_no: original.account_no.clone(),
                tran_ccy: original.tran_ccy.clone(),
                fcy_amt: original.fcy_amt,
                exchange_rate: original.exchange_rate,
                lcy_amt: original.lcy_amt,
                narration: Some(format!(
                    "REVERSAL: {} (Original: {})",
                    reason, original.tran_id
                )),
                pointing_id: Some(tran_id.to_string()),
            };
            self.repo.insert_leg(&mut **op.tx(), &row).await?;

            let balance_row = self
                .balances
                .update_account_for_posting_in_op(&mut op, info, flipped, original.lcy_amt, today)
                .await?;
            let gl_balance_after = self
                .balances
                .update_gl_for_posting_in_op(&mut op, &info.gl_num, flipped, original.lcy_amt, today)
                .await?;
            self.movements
                .record_in_op(
                    &mut op,
                    &row.tran_id,
                    &info.gl_num,
                    flipped,
                    today,
                    row.value_date,
                    row.lcy_amt,
                    gl_balance_after,
                )
                .await?;
            self.histories
                .record_in_op(
                    &mut op,
                    &row.tran_id,
                    &row.account_no,
                    today,
                    row.value_date,
                    flipped,
                    &row.tran_ccy,
                    row.lcy_amt,
                    row.narration.as_deref(),
                    balance_row.current_balance,
                    "SYSTEM",
                    stamp,
                )
                .await?;
            reversal_legs.push(row);
        }
        op.commit().await?;

        tracing::info!(original = %tran_id, reversal = %reversal_id, "transaction reversed");
        Ok(TransactionSummary::from_legs(&reversal_id, reversal_legs))
    }

    pub async fn find(&self, tran_id: &str) -> Result<TransactionSummary, TransactionError> {
        let legs = self.repo.legs_by_prefix(self.repo.pool(), tran_id).await?;
        if legs.is_empty() {
            return Err(TransactionError::NotFound(tran_id.to_string()));
        }
        Ok(TransactionSummary::from_legs(tran_id, legs))
    }

    /// Paged listing grouped by base transaction id, newest day first.
    pub async fn list(
        &self,
        page: usize,
        size: usize,
    ) -> Result<(Vec<TransactionSummary>, usize), TransactionError> {
        let legs = self.repo.all_legs().await?;
        let mut summaries: Vec<TransactionSummary> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for leg in legs {
            let base = leg.base_tran_id().to_string();
            match index.get(&base) {
                Some(&position) => summaries[position].lines.push(leg),
                None => {
                    index.insert(base.clone(), summaries.len());
                    summaries.push(TransactionSummary::from_legs(&base, vec![leg]));
                }
            }
        }
        let total = summaries.len();
        let size = size.max(1);
        let start = page.saturating_mul(size);
        let page_items = if start >= summaries.len() {
            Vec::new()
        } else {
            let end = (start + size).min(summaries.len());
            summaries[start..end].to_vec()
        };
        Ok((page_items, total))
    }

    pub(crate) async fn future_bases_due(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<String>, TransactionError> {
        self.repo.future_bases_due(date).await
    }

    pub(crate) async fn count_future_legs(&self) -> Result<i64, TransactionError> {
        self.repo.count_by_status(TranStatus::Future).await
    }

    async fn leg_context_in_op(
        &self,
        op: &mut AtomicOperation,
        info: &AccountInfo,
        date: NaiveDate,
        excluded_base: &str,
    ) -> Result<LegContext, TransactionError> {
        let current_balance = self
            .balances
            .current_balance_in_op(op, &info.account_no, date)
            .await?;
        let opening = self
            .balances
            .previous_closing_in_op(
                op,
                crate::balance::AccountBalanceTable::Daily,
                &info.account_no,
                date,
            )
            .await?;
        let (debits, credits) = self
            .repo
            .day_leg_sums_excluding(&mut **op.tx(), &info.account_no, date, excluded_base)
            .await?;
        let mut available = opening + credits - debits;
        if info.is_asset() {
            available += info.loan_limit;
        }
        Ok(LegContext {
            current_balance,
            available_balance: available,
        })
    }

    /// `T` + yyyymmdd + 6-digit day sequence + 3 random digits. The
    /// sequence derives from the day's leg count inside the insert unit;
    /// the random digits are a tie-break carried over from the id format.
    async fn generate_tran_id(
        &self,
        op: &mut AtomicOperation,
        date: NaiveDate,
    ) -> Result<String, TransactionError> {
        let sequence = self.repo.count_legs_on(&mut **op.tx(), date).await? + 1;
        let random: u32 = rand::rng().random_range(0..1000);
        Ok(format!(
            "T{}{:06}{:03}",
            date.format("%Y%m%d"),
            sequence,
            random
        ))
    }
}

fn check_balanced(
    legs: impl Iterator<Item = (DrCrFlag, Decimal)>,
) -> Result<(), TransactionError> {
    let mut debits = Decimal::ZERO;
    let mut credits = Decimal::ZERO;
    for (flag, amount) in legs {
        match flag {
            DrCrFlag::Debit => debits += amount,
            DrCrFlag::Credit => credits += amount,
        }
    }
    if debits != credits {
        return Err(TransactionError::Unbalanced { debits, credits });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_check_compares_rounded_sums() {
        let legs = vec![
            (DrCrFlag::Debit, "1000.00".parse().unwrap()),
            (DrCrFlag::Credit, "999.99".parse().unwrap()),
        ];
        assert!(matches!(
            check_balanced(legs.into_iter()),
            Err(TransactionError::Unbalanced { .. })
        ));
        let legs = vec![
            (DrCrFlag::Debit, "1000.00".parse().unwrap()),
            (DrCrFlag::Credit, "600.00".parse().unwrap()),
            (DrCrFlag::Credit, "400.00".parse().unwrap()),
        ];
        assert!(check_balanced(legs.into_iter()).is_ok());
    }
}
