mod helpers;

use helpers::*;
use khata_ledger::primitives::TranStatus;

#[tokio::test]
async fn future_dated_transactions_wait_for_their_value_date() -> anyhow::Result<()> {
    let pool = init_pool().await?;
    let ledger = init_ledger(&pool).await?;
    let bank = setup_bank(&ledger).await?;

    let tx = two_leg(
        &ledger,
        day(2024, 1, 16),
        "Standing instruction",
        &bank.customer_account,
        &bank.office_payable,
        dec("500.00"),
    )
    .await?;
    assert_eq!(tx.status, TranStatus::Future);

    // Future legs neither move balances nor earmark available funds.
    assert_eq!(
        ledger.available_balance(&bank.customer_account).await?,
        dec("5000.00")
    );

    // Value date not reached: BOD leaves the legs pending.
    let early = ledger.bod().run().await?;
    assert_eq!(early.pending_before, 2);
    assert_eq!(early.processed, 0);
    assert_eq!(early.pending_after, 2);

    // Open the next day and promote.
    ledger.clock().set(day(2024, 1, 16), "ADMIN").await?;
    let run = ledger.bod().run().await?;
    assert_eq!(run.processed, 2);
    assert_eq!(run.pending_after, 0);
    assert!(run.failures.is_empty());

    let promoted = ledger.transactions().find(&tx.tran_id).await?;
    assert_eq!(promoted.status, TranStatus::Posted);

    let balance = ledger
        .balances()
        .latest_for_account(&bank.customer_account, day(2024, 1, 16))
        .await?;
    assert_eq!(balance.tran_date, day(2024, 1, 16));
    assert_eq!(balance.opening_bal, dec("5000.00"));
    assert_eq!(balance.closing_bal, dec("4500.00"));
    Ok(())
}

#[tokio::test]
async fn promotion_failure_leaves_earlier_promotions_posted() -> anyhow::Result<()> {
    let pool = init_pool().await?;
    let ledger = init_ledger(&pool).await?;
    let bank = setup_bank(&ledger).await?;

    let good = two_leg(
        &ledger,
        day(2024, 1, 16),
        "Affordable",
        &bank.customer_account,
        &bank.office_payable,
        dec("100.00"),
    )
    .await?;
    // Passes creation-time validation against today's balance, but will no
    // longer fit once the first promotion has drawn the account down.
    let too_big = two_leg(
        &ledger,
        day(2024, 1, 16),
        "Beyond the balance",
        &bank.customer_account,
        &bank.office_payable,
        dec("4950.00"),
    )
    .await?;

    ledger.clock().set(day(2024, 1, 16), "ADMIN").await?;
    let run = ledger.bod().run().await?;
    assert_eq!(run.processed, 2);
    assert_eq!(run.failures.len(), 1);
    assert_eq!(run.failures[0].tran_id, too_big.tran_id);

    let promoted = ledger.transactions().find(&good.tran_id).await?;
    assert_eq!(promoted.status, TranStatus::Posted);
    let still_future = ledger.transactions().find(&too_big.tran_id).await?;
    assert_eq!(still_future.status, TranStatus::Future);
    Ok(())
}
