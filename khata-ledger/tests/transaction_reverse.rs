mod helpers;

use helpers::*;
use khata_ledger::primitives::TranStatus;

#[tokio::test]
async fn reversal_restores_balances_and_keeps_the_original() -> anyhow::Result<()> {
    let pool = init_pool().await?;
    let ledger = init_ledger(&pool).await?;
    let bank = setup_bank(&ledger).await?;
    let today = day(2024, 1, 15);

    let tx = two_leg(
        &ledger,
        today,
        "Duplicate payment",
        &bank.customer_account,
        &bank.office_payable,
        dec("1000.00"),
    )
    .await?;
    ledger.transactions().post(&tx.tran_id).await?;
    ledger.transactions().verify(&tx.tran_id).await?;

    let reversal = ledger.transactions().reverse(&tx.tran_id, "duplicate").await?;
    assert_ne!(reversal.tran_id, tx.tran_id);
    assert_eq!(reversal.status, TranStatus::Verified);
    assert_eq!(reversal.lines.len(), 2);
    for line in &reversal.lines {
        assert_eq!(line.pointing_id.as_deref(), Some(tx.tran_id.as_str()));
        assert!(line
            .narration
            .as_deref()
            .unwrap_or_default()
            .starts_with("REVERSAL: duplicate"));
    }

    let customer = ledger
        .balances()
        .latest_for_account(&bank.customer_account, today)
        .await?;
    assert_eq!(customer.closing_bal, dec("5000.00"));
    let office = ledger
        .balances()
        .latest_for_account(&bank.office_payable, today)
        .await?;
    assert_eq!(office.closing_bal, dec("0.00"));

    // Original stays verified, untouched.
    let original = ledger.transactions().find(&tx.tran_id).await?;
    assert_eq!(original.status, TranStatus::Verified);

    // Two history rows per account for the day: verification and reversal.
    let customer_history = ledger
        .histories()
        .for_account(&bank.customer_account, today, today)
        .await?;
    let office_history = ledger
        .histories()
        .for_account(&bank.office_payable, today, today)
        .await?;
    assert_eq!(customer_history.len() + office_history.len(), 4);
    Ok(())
}

#[tokio::test]
async fn reversing_a_reversal_round_trips_without_drift() -> anyhow::Result<()> {
    let pool = init_pool().await?;
    let ledger = init_ledger(&pool).await?;
    let bank = setup_bank(&ledger).await?;
    let today = day(2024, 1, 15);

    let tx = two_leg(
        &ledger,
        today,
        "To and fro",
        &bank.customer_account,
        &bank.office_payable,
        dec("123.45"),
    )
    .await?;
    ledger.transactions().post(&tx.tran_id).await?;
    ledger.transactions().verify(&tx.tran_id).await?;
    let after_post = ledger
        .balances()
        .latest_for_account(&bank.customer_account, today)
        .await?
        .closing_bal;

    let reversal = ledger.transactions().reverse(&tx.tran_id, "undo").await?;
    let restored = ledger
        .balances()
        .latest_for_account(&bank.customer_account, today)
        .await?
        .closing_bal;
    assert_eq!(restored, dec("5000.00"));

    ledger
        .transactions()
        .reverse(&reversal.tran_id, "redo")
        .await?;
    let re_applied = ledger
        .balances()
        .latest_for_account(&bank.customer_account, today)
        .await?
        .closing_bal;
    assert_eq!(re_applied, after_post);
    Ok(())
}

#[tokio::test]
async fn reversing_an_unknown_transaction_fails() -> anyhow::Result<()> {
    let pool = init_pool().await?;
    let ledger = init_ledger(&pool).await?;
    setup_bank(&ledger).await?;

    let result = ledger
        .transactions()
        .reverse("T20240115000099000", "nothing there")
        .await;
    assert!(matches!(
        result,
        Err(khata_ledger::transaction::error::TransactionError::OriginalNotFound(_))
    ));
    Ok(())
}
