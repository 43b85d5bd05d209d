mod helpers;

use helpers::*;
use khata_ledger::{
    account::{error::AccountError, NewCustomerAccount, NewOfficeAccount},
    primitives::{AccountKind, AccountStatus},
};

#[tokio::test]
async fn account_numbers_follow_the_documented_shapes() -> anyhow::Result<()> {
    let pool = init_pool().await?;
    let ledger = init_ledger(&pool).await?;
    seed_chart(&ledger).await?;
    let (sub_savings, _, sub_office_cash) = seed_products(&ledger).await?;

    let customer = ledger.products().create_customer("Rahim Uddin").await?;
    let account = ledger
        .accounts()
        .open_customer_account(
            NewCustomerAccount::builder()
                .cust_id(customer.cust_id)
                .sub_product_id(sub_savings)
                .acct_name("Rahim Uddin Savings")
                .build()?,
        )
        .await?;
    // 8-digit customer id, product-category digit, 3-digit sequence.
    assert_eq!(
        account.account_no,
        format!("{:08}1001", customer.cust_id)
    );
    assert_eq!(account.kind, AccountKind::Customer);
    assert_eq!(account.status, AccountStatus::Active);

    let office = ledger
        .accounts()
        .open_office_account(
            NewOfficeAccount::builder()
                .sub_product_id(sub_office_cash)
                .acct_name("Office Cash")
                .build()?,
        )
        .await?;
    // '9' + owning GL + 2-digit sequence.
    assert_eq!(office.account_no, "921010100001");
    assert_eq!(office.kind, AccountKind::Office);

    // Opening writes the zero balance row for the day.
    let row = ledger
        .balances()
        .latest_for_account(&account.account_no, day(2024, 1, 14))
        .await?;
    assert_eq!(row.closing_bal, dec("0"));
    Ok(())
}

#[tokio::test]
async fn office_sequence_refuses_the_hundredth_account() -> anyhow::Result<()> {
    let pool = init_pool().await?;
    let ledger = init_ledger(&pool).await?;
    seed_chart(&ledger).await?;
    let (_, _, sub_office_cash) = seed_products(&ledger).await?;

    sqlx::query("INSERT INTO account_seq (gl_num, last_seq) VALUES ('210101000', 99)")
        .execute(&pool)
        .await?;
    let result = ledger
        .accounts()
        .open_office_account(
            NewOfficeAccount::builder()
                .sub_product_id(sub_office_cash)
                .acct_name("One Too Many")
                .build()?,
        )
        .await;
    assert!(matches!(
        result,
        Err(AccountError::SequenceExhausted { limit: 99, .. })
    ));
    Ok(())
}

#[tokio::test]
async fn loan_limit_requires_an_asset_gl() -> anyhow::Result<()> {
    let pool = init_pool().await?;
    let ledger = init_ledger(&pool).await?;
    seed_chart(&ledger).await?;
    let (sub_savings, _, _) = seed_products(&ledger).await?;

    let customer = ledger.products().create_customer("Karim Mia").await?;
    let result = ledger
        .accounts()
        .open_customer_account(
            NewCustomerAccount::builder()
                .cust_id(customer.cust_id)
                .sub_product_id(sub_savings)
                .acct_name("Savings With Limit")
                .loan_limit(dec("10000.00"))
                .build()?,
        )
        .await;
    assert!(matches!(result, Err(AccountError::NonAssetLoanLimit(_))));
    Ok(())
}

#[tokio::test]
async fn closure_requires_a_zero_balance() -> anyhow::Result<()> {
    let pool = init_pool().await?;
    let ledger = init_ledger(&pool).await?;
    let bank = setup_bank(&ledger).await?;

    let result = ledger
        .accounts()
        .set_status(&bank.customer_account, AccountStatus::Closed)
        .await;
    assert!(matches!(
        result,
        Err(AccountError::CloseNonZeroBalance { .. })
    ));

    // Drain the account, then closure goes through.
    let tx = two_leg(
        &ledger,
        day(2024, 1, 15),
        "Close-out",
        &bank.customer_account,
        &bank.office_payable,
        dec("5000.00"),
    )
    .await?;
    ledger.transactions().post(&tx.tran_id).await?;
    let closed = ledger
        .accounts()
        .set_status(&bank.customer_account, AccountStatus::Closed)
        .await?;
    assert_eq!(closed.status, AccountStatus::Closed);
    Ok(())
}

#[tokio::test]
async fn unknown_accounts_do_not_resolve() -> anyhow::Result<()> {
    let pool = init_pool().await?;
    let ledger = init_ledger(&pool).await?;
    seed_chart(&ledger).await?;

    assert!(!ledger.accounts().exists("000000000000").await?);
    let result = ledger.accounts().resolve("000000000000").await;
    assert!(matches!(result, Err(AccountError::NotFound(_))));
    Ok(())
}
