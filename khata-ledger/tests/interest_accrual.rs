mod helpers;

use helpers::*;
use khata_ledger::{
    account::NewCustomerAccount,
    primitives::{AccrualStatus, DrCrFlag},
    product::NewSubProduct,
};

/// Chart plus a term-deposit sub-product carrying an interest code with a
/// 7.00% base rate effective 2024-01-01 and a 0.25% increment.
async fn seed_deposit_bank(
    ledger: &khata_ledger::KhataLedger,
) -> anyhow::Result<(String, String)> {
    seed_chart(ledger).await?;
    let (_, _, sub_office_cash) = seed_products(ledger).await?;

    let deposit = ledger
        .products()
        .create_sub_product(
            NewSubProduct::builder()
                .sub_product_code("TD-CUM")
                .sub_product_name("Term Deposit Cumulative")
                .product_category("2")
                .cum_gl_num("110201000")
                .intt_code("TD01")
                .interest_increment(dec("0.25"))
                .interest_income_expenditure_gl_num("140101000")
                .interest_receivable_payable_gl_num("130101000")
                .build()?,
        )
        .await?;
    ledger
        .products()
        .add_rate("TD01", day(2024, 1, 1), dec("7.00"))
        .await?;

    let customer = ledger.products().create_customer("Shahana Akter").await?;
    let deposit_account = ledger
        .accounts()
        .open_customer_account(
            NewCustomerAccount::builder()
                .cust_id(customer.cust_id)
                .sub_product_id(deposit.sub_product_id)
                .acct_name("Shahana Akter TD")
                .build()?,
        )
        .await?;
    let office_cash = ledger
        .accounts()
        .open_office_account(
            khata_ledger::account::NewOfficeAccount::builder()
                .sub_product_id(sub_office_cash)
                .acct_name("Office Cash")
                .build()?,
        )
        .await?;

    let funding = two_leg(
        ledger,
        day(2024, 1, 14),
        "Deposit placement",
        &office_cash.account_no,
        &deposit_account.account_no,
        dec("1000000.00"),
    )
    .await?;
    ledger.transactions().post(&funding.tran_id).await?;
    ledger.transactions().verify(&funding.tran_id).await?;
    Ok((deposit_account.account_no, office_cash.account_no))
}

#[tokio::test]
async fn daily_accrual_emits_a_balanced_pair_with_sequential_ids() -> anyhow::Result<()> {
    let pool = init_pool().await?;
    let ledger = init_ledger(&pool).await?;
    let (deposit_account, _) = seed_deposit_bank(&ledger).await?;

    // Move to the 15th without closing the 14th, then run jobs 1 and 2.
    let accrual_day = day(2024, 1, 15);
    ledger.clock().set(accrual_day, "TEST").await?;
    ledger.eod().run_job(1, None, "TEST").await?;
    let entries = ledger.eod().run_job(2, None, "TEST").await?;
    assert_eq!(entries, 2);

    let legs = ledger.accruals().legs_for_date(accrual_day).await?;
    assert_eq!(legs.len(), 2);
    let debit = &legs[0];
    let credit = &legs[1];
    assert_eq!(debit.accr_tran_id, "S20240115000000001-1");
    assert_eq!(credit.accr_tran_id, "S20240115000000001-2");
    assert_eq!(debit.accr_tran_id.len(), 20);
    assert_eq!(debit.dr_cr_flag, DrCrFlag::Debit);
    assert_eq!(credit.dr_cr_flag, DrCrFlag::Credit);

    // round(1,000,000.00 x 7.25 / 36500, 2) = 198.63
    assert_eq!(debit.amount, dec("198.63"));
    assert_eq!(credit.amount, dec("198.63"));
    assert_eq!(debit.interest_rate, dec("7.25"));
    assert_eq!(debit.account_no, deposit_account);
    assert_eq!(credit.account_no, deposit_account);

    // Liability: debit the expenditure GL, credit the payable GL.
    assert_eq!(debit.gl_account_no, "140101000");
    assert_eq!(credit.gl_account_no, "130101000");
    assert_eq!(debit.status, AccrualStatus::Pending);
    Ok(())
}

#[tokio::test]
async fn accounts_without_an_interest_code_are_skipped() -> anyhow::Result<()> {
    let pool = init_pool().await?;
    let ledger = init_ledger(&pool).await?;
    let _bank = setup_bank(&ledger).await?;

    let summary = ledger.accruals().run_accruals(day(2024, 1, 15)).await?;
    assert_eq!(summary.entries_created, 0);
    assert_eq!(summary.accounts_processed, 0);
    assert!(summary.errors.is_empty());
    Ok(())
}

#[tokio::test]
async fn missing_rate_row_is_reported_per_account_without_aborting() -> anyhow::Result<()> {
    let pool = init_pool().await?;
    let ledger = init_ledger(&pool).await?;
    seed_chart(&ledger).await?;
    seed_products(&ledger).await?;

    // Interest code configured, but no rate row exists for it.
    let deposit = ledger
        .products()
        .create_sub_product(
            NewSubProduct::builder()
                .sub_product_code("TD-NORATE")
                .sub_product_name("Term Deposit Unconfigured")
                .product_category("2")
                .cum_gl_num("110201000")
                .intt_code("TD99")
                .interest_income_expenditure_gl_num("140101000")
                .build()?,
        )
        .await?;
    let customer = ledger.products().create_customer("Karim Mia").await?;
    let account = ledger
        .accounts()
        .open_customer_account(
            NewCustomerAccount::builder()
                .cust_id(customer.cust_id)
                .sub_product_id(deposit.sub_product_id)
                .acct_name("Karim Mia TD")
                .build()?,
        )
        .await?;
    // Give the account a balance so the missing rate is the only gap.
    sqlx::query(
        "UPDATE acct_bal SET closing_bal = '1000.00', current_balance = '1000.00' \
         WHERE account_no = ?",
    )
    .bind(&account.account_no)
    .execute(&pool)
    .await?;

    let summary = ledger.accruals().run_accruals(day(2024, 1, 14)).await?;
    assert_eq!(summary.entries_created, 0);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].account_no, account.account_no);
    assert!(summary.errors[0].message.contains("NoRateConfigured"));
    Ok(())
}

#[tokio::test]
async fn fixed_rate_applies_to_liability_deal_accounts() -> anyhow::Result<()> {
    let pool = init_pool().await?;
    let ledger = init_ledger(&pool).await?;
    seed_chart(&ledger).await?;
    let (_, _, sub_office_cash) = seed_products(&ledger).await?;

    let deal = ledger
        .products()
        .create_sub_product(
            NewSubProduct::builder()
                .sub_product_code("TD-FIX")
                .sub_product_name("Term Deposit Fixed")
                .product_category("2")
                .cum_gl_num("110201000")
                .intt_code("TD01")
                .effective_interest_rate(dec("5.00"))
                .interest_increment(dec("0.25"))
                .interest_income_expenditure_gl_num("140101000")
                .interest_receivable_payable_gl_num("130101000")
                .build()?,
        )
        .await?;
    // A rate master row exists too, but the deal keeps its opening rate.
    ledger
        .products()
        .add_rate("TD01", day(2024, 1, 1), dec("7.00"))
        .await?;

    let customer = ledger.products().create_customer("Nazma Begum").await?;
    let deposit_account = ledger
        .accounts()
        .open_customer_account(
            NewCustomerAccount::builder()
                .cust_id(customer.cust_id)
                .sub_product_id(deal.sub_product_id)
                .acct_name("Nazma Begum TD")
                .build()?,
        )
        .await?;
    let office_cash = ledger
        .accounts()
        .open_office_account(
            khata_ledger::account::NewOfficeAccount::builder()
                .sub_product_id(sub_office_cash)
                .acct_name("Office Cash")
                .build()?,
        )
        .await?;
    let funding = two_leg(
        &ledger,
        day(2024, 1, 14),
        "Deposit placement",
        &office_cash.account_no,
        &deposit_account.account_no,
        dec("1000000.00"),
    )
    .await?;
    ledger.transactions().post(&funding.tran_id).await?;

    let summary = ledger.accruals().run_accruals(day(2024, 1, 14)).await?;
    assert_eq!(summary.entries_created, 2);
    let legs = ledger.accruals().legs_for_date(day(2024, 1, 14)).await?;
    // round(1,000,000.00 x 5.00 / 36500, 2) = 136.99
    assert_eq!(legs[0].amount, dec("136.99"));
    assert_eq!(legs[0].interest_rate, dec("5.00"));
    Ok(())
}
