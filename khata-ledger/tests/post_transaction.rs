mod helpers;

use helpers::*;
use khata_ledger::{
    primitives::{AccountStatus, DrCrFlag, TranStatus},
    transaction::{error::TransactionError, NewTranLeg, NewTransaction},
};

#[tokio::test]
async fn balanced_two_leg_post_moves_balances() -> anyhow::Result<()> {
    let pool = init_pool().await?;
    let ledger = init_ledger(&pool).await?;
    let bank = setup_bank(&ledger).await?;
    let today = day(2024, 1, 15);
    assert_eq!(ledger.clock().now().await?, today);

    let tx = two_leg(
        &ledger,
        today,
        "Cash withdrawal",
        &bank.customer_account,
        &bank.office_payable,
        dec("1000.00"),
    )
    .await?;
    assert_eq!(tx.status, TranStatus::Entry);

    let posted = ledger.transactions().post(&tx.tran_id).await?;
    assert_eq!(posted.status, TranStatus::Posted);
    assert_eq!(posted.lines.len(), 2);

    let customer = ledger
        .balances()
        .latest_for_account(&bank.customer_account, today)
        .await?;
    assert_eq!(customer.closing_bal, dec("4000.00"));
    assert_eq!(
        customer.closing_bal,
        customer.opening_bal + customer.cr_summation - customer.dr_summation
    );

    let office = ledger
        .balances()
        .latest_for_account(&bank.office_payable, today)
        .await?;
    assert_eq!(office.closing_bal, dec("1000.00"));

    // Two GL movements carrying the running GL balance in posting order.
    let movements = ledger.movements().for_tran_id(&tx.tran_id).await?;
    assert_eq!(movements.len(), 2);
    assert_eq!(movements[0].gl_num, "110101000");
    assert_eq!(movements[0].dr_cr_flag, DrCrFlag::Debit);
    assert_eq!(movements[0].balance_after, dec("4000.00"));
    assert_eq!(movements[1].gl_num, "110102000");
    assert_eq!(movements[1].balance_after, dec("1000.00"));
    Ok(())
}

#[tokio::test]
async fn entry_status_mutates_nothing_but_the_legs() -> anyhow::Result<()> {
    let pool = init_pool().await?;
    let ledger = init_ledger(&pool).await?;
    let bank = setup_bank(&ledger).await?;
    let today = day(2024, 1, 15);

    two_leg(
        &ledger,
        today,
        "Pending entry",
        &bank.customer_account,
        &bank.office_payable,
        dec("250.00"),
    )
    .await?;

    let customer = ledger
        .balances()
        .latest_for_account(&bank.customer_account, today)
        .await?;
    assert_eq!(customer.current_balance, dec("5000.00"));
    assert!(ledger.movements().for_date(today).await?.is_empty());
    // The entry already earmarks funds in the available balance.
    assert_eq!(
        ledger.available_balance(&bank.customer_account).await?,
        dec("4750.00")
    );
    Ok(())
}

#[tokio::test]
async fn unbalanced_transaction_is_rejected_and_nothing_persists() -> anyhow::Result<()> {
    let pool = init_pool().await?;
    let ledger = init_ledger(&pool).await?;
    let bank = setup_bank(&ledger).await?;
    let (before, _) = ledger.transactions().list(0, 100).await?;

    let result = ledger
        .transactions()
        .create(
            NewTransaction::builder()
                .value_date(day(2024, 1, 15))
                .narration("Does not balance")
                .legs(vec![
                    NewTranLeg::builder()
                        .account_no(bank.customer_account.as_str())
                        .dr_cr_flag(DrCrFlag::Debit)
                        .lcy_amt(dec("1000.00"))
                        .build()?,
                    NewTranLeg::builder()
                        .account_no(bank.office_payable.as_str())
                        .dr_cr_flag(DrCrFlag::Credit)
                        .lcy_amt(dec("999.99"))
                        .build()?,
                ])
                .build()?,
        )
        .await;
    assert!(matches!(result, Err(TransactionError::Unbalanced { .. })));

    let (after, _) = ledger.transactions().list(0, 100).await?;
    assert_eq!(before.len(), after.len());
    Ok(())
}

#[tokio::test]
async fn customer_debit_boundary_sits_exactly_at_available() -> anyhow::Result<()> {
    let pool = init_pool().await?;
    let ledger = init_ledger(&pool).await?;
    let bank = setup_bank(&ledger).await?;
    let today = day(2024, 1, 15);
    assert_eq!(
        ledger.available_balance(&bank.customer_account).await?,
        dec("5000.00")
    );

    let over = two_leg(
        &ledger,
        today,
        "One paisa too much",
        &bank.customer_account,
        &bank.office_payable,
        dec("5000.01"),
    )
    .await;
    assert!(matches!(
        over,
        Err(TransactionError::InsufficientBalance { .. })
    ));

    let exact = two_leg(
        &ledger,
        today,
        "Full withdrawal",
        &bank.customer_account,
        &bank.office_payable,
        dec("5000.00"),
    )
    .await?;
    ledger.transactions().post(&exact.tran_id).await?;
    let balance = ledger
        .balances()
        .latest_for_account(&bank.customer_account, today)
        .await?;
    assert_eq!(balance.closing_bal, dec("0.00"));
    Ok(())
}

#[tokio::test]
async fn office_asset_account_may_run_negative() -> anyhow::Result<()> {
    let pool = init_pool().await?;
    let ledger = init_ledger(&pool).await?;
    let bank = setup_bank(&ledger).await?;
    let today = day(2024, 1, 15);

    // Office cash already carries the funding debit from setup; push it
    // further negative.
    let tx = two_leg(
        &ledger,
        today,
        "More cash out",
        &bank.office_cash,
        &bank.customer_account,
        dec("100.00"),
    )
    .await?;
    ledger.transactions().post(&tx.tran_id).await?;
    let cash = ledger
        .balances()
        .latest_for_account(&bank.office_cash, today)
        .await?;
    assert_eq!(cash.closing_bal, dec("-5100.00"));
    Ok(())
}

#[tokio::test]
async fn office_liability_account_cannot_go_negative() -> anyhow::Result<()> {
    let pool = init_pool().await?;
    let ledger = init_ledger(&pool).await?;
    let bank = setup_bank(&ledger).await?;

    let result = two_leg(
        &ledger,
        day(2024, 1, 15),
        "Nothing to pay out",
        &bank.office_payable,
        &bank.customer_account,
        dec("0.01"),
    )
    .await;
    assert!(matches!(
        result,
        Err(TransactionError::InsufficientBalance { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn inactive_account_rejects_transactions() -> anyhow::Result<()> {
    let pool = init_pool().await?;
    let ledger = init_ledger(&pool).await?;
    let bank = setup_bank(&ledger).await?;

    ledger
        .accounts()
        .set_status(&bank.customer_account, AccountStatus::Dormant)
        .await?;
    let result = two_leg(
        &ledger,
        day(2024, 1, 15),
        "Dormant account",
        &bank.customer_account,
        &bank.office_payable,
        dec("10.00"),
    )
    .await;
    assert!(matches!(
        result,
        Err(TransactionError::AccountInactive { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn posting_twice_reports_not_entry() -> anyhow::Result<()> {
    let pool = init_pool().await?;
    let ledger = init_ledger(&pool).await?;
    let bank = setup_bank(&ledger).await?;

    let tx = two_leg(
        &ledger,
        day(2024, 1, 15),
        "Post once",
        &bank.customer_account,
        &bank.office_payable,
        dec("10.00"),
    )
    .await?;
    ledger.transactions().post(&tx.tran_id).await?;
    let again = ledger.transactions().post(&tx.tran_id).await;
    assert!(matches!(again, Err(TransactionError::NotEntry(_))));
    Ok(())
}

#[tokio::test]
async fn verify_is_idempotent_and_reports_already_verified() -> anyhow::Result<()> {
    let pool = init_pool().await?;
    let ledger = init_ledger(&pool).await?;
    let bank = setup_bank(&ledger).await?;

    let tx = two_leg(
        &ledger,
        day(2024, 1, 15),
        "Verify once",
        &bank.customer_account,
        &bank.office_payable,
        dec("10.00"),
    )
    .await?;
    ledger.transactions().post(&tx.tran_id).await?;
    let verified = ledger.transactions().verify(&tx.tran_id).await?;
    assert_eq!(verified.status, TranStatus::Verified);
    let again = ledger.transactions().verify(&tx.tran_id).await;
    assert!(matches!(again, Err(TransactionError::AlreadyVerified(_))));
    Ok(())
}

#[tokio::test]
async fn unknown_transaction_is_not_found() -> anyhow::Result<()> {
    let pool = init_pool().await?;
    let ledger = init_ledger(&pool).await?;
    setup_bank(&ledger).await?;

    let result = ledger.transactions().post("T20240115000042000").await;
    assert!(matches!(result, Err(TransactionError::NotFound(_))));
    Ok(())
}
