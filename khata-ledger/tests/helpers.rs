#![allow(dead_code)]

use chrono::NaiveDate;
use rand::distr::{Alphanumeric, SampleString};
use rust_decimal::Decimal;

use khata_ledger::{
    account::{AccountInfo, NewCustomerAccount, NewOfficeAccount},
    gl::NewGlSetup,
    primitives::DrCrFlag,
    product::NewSubProduct,
    transaction::{NewTranLeg, NewTransaction},
    KhataLedger, KhataLedgerConfig,
};

pub const OPENING_DAY: (i32, u32, u32) = (2024, 1, 14);

pub fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn dec(value: &str) -> Decimal {
    value.parse().expect("valid decimal")
}

pub async fn init_pool() -> anyhow::Result<sqlx::SqlitePool> {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    Ok(pool)
}

pub fn scratch_reports_dir() -> std::path::PathBuf {
    let suffix = Alphanumeric.sample_string(&mut rand::rng(), 8);
    std::env::temp_dir().join(format!("khata-reports-{suffix}"))
}

/// Ledger over an injected in-memory pool, migrated, with the business day
/// opened at 2024-01-14.
pub async fn init_ledger(pool: &sqlx::SqlitePool) -> anyhow::Result<KhataLedger> {
    let ledger = KhataLedger::init(
        KhataLedgerConfig::builder()
            .pool(pool.clone())
            .exec_migrations(true)
            .reports_dir(scratch_reports_dir())
            .default_system_date(day(OPENING_DAY.0, OPENING_DAY.1, OPENING_DAY.2))
            .build()?,
    )
    .await?;
    Ok(ledger)
}

/// Four-layer chart: liability and asset roots down to the leaves the tests
/// post against, including the interest and overdraft leaves.
pub async fn seed_chart(ledger: &KhataLedger) -> anyhow::Result<()> {
    let layers: [(&str, &str, i64, Option<&str>); 25] = [
        ("1", "Liabilities", 1, None),
        ("2", "Assets", 2, None),
        ("11", "Deposits", 1, Some("1")),
        ("13", "Interest Payable", 3, Some("1")),
        ("14", "Interest Expenditure", 4, Some("1")),
        ("21", "Cash And Bank", 1, Some("2")),
        ("22", "Loans", 2, Some("2")),
        ("23", "Interest Receivable", 3, Some("2")),
        ("24", "Interest Income", 4, Some("2")),
        ("1101", "Demand Deposits", 1, Some("11")),
        ("1102", "Term Deposits", 2, Some("11")),
        ("1301", "Interest Payable Deposits", 1, Some("13")),
        ("1401", "Interest Expenditure Deposits", 1, Some("14")),
        ("2101", "Cash Accounts", 1, Some("21")),
        ("2102", "Term Loans", 2, Some("21")),
        ("2301", "Interest Receivable Loans", 1, Some("23")),
        ("2401", "Interest Income Loans", 1, Some("24")),
        ("110101000", "Savings Bank Regular", 1, Some("1101")),
        ("110102000", "Office Payable", 2, Some("1101")),
        ("110201000", "Term Deposit Cumulative", 1, Some("1102")),
        ("130101000", "Interest Payable Savings", 1, Some("1301")),
        ("140101000", "Interest Expenditure Savings", 1, Some("1401")),
        ("210101000", "Office Cash", 1, Some("2101")),
        ("210201000", "Secured Overdraft", 1, Some("2102")),
        ("230101000", "Interest Receivable Overdraft", 1, Some("2301")),
    ];
    for (gl_num, gl_name, layer_gl_num, parent) in layers {
        let layer_id = match gl_num.len() {
            1 => 1,
            2 => 2,
            4 => 3,
            _ => 4,
        };
        let mut builder = NewGlSetup::builder();
        builder
            .gl_num(gl_num)
            .gl_name(gl_name)
            .layer_id(layer_id)
            .layer_gl_num(layer_gl_num.to_string());
        if let Some(parent) = parent {
            builder.parent_gl_num(parent);
        }
        ledger.chart().create(builder.build()?).await?;
    }
    // Interest income leaf used by asset-side accruals.
    ledger
        .chart()
        .create(
            NewGlSetup::builder()
                .gl_num("240101000")
                .gl_name("Interest Income Overdraft")
                .layer_id(4)
                .layer_gl_num("1")
                .parent_gl_num("2401")
                .build()?,
        )
        .await?;
    Ok(())
}

pub struct TestBank {
    pub cust_id: i64,
    pub sub_savings: i64,
    pub sub_office_payable: i64,
    pub sub_office_cash: i64,
    pub customer_account: String,
    pub office_payable: String,
    pub office_cash: String,
}

pub async fn seed_products(ledger: &KhataLedger) -> anyhow::Result<(i64, i64, i64)> {
    let savings = ledger
        .products()
        .create_sub_product(
            NewSubProduct::builder()
                .sub_product_code("SAV-REG")
                .sub_product_name("Savings Bank Regular")
                .product_category("1")
                .cum_gl_num("110101000")
                .interest_income_expenditure_gl_num("140101000")
                .interest_receivable_payable_gl_num("130101000")
                .build()?,
        )
        .await?;
    let office_payable = ledger
        .products()
        .create_sub_product(
            NewSubProduct::builder()
                .sub_product_code("OFF-PAY")
                .sub_product_name("Office Payable")
                .product_category("5")
                .cum_gl_num("110102000")
                .build()?,
        )
        .await?;
    let office_cash = ledger
        .products()
        .create_sub_product(
            NewSubProduct::builder()
                .sub_product_code("OFF-CASH")
                .sub_product_name("Office Cash")
                .product_category("5")
                .cum_gl_num("210101000")
                .build()?,
        )
        .await?;
    Ok((
        savings.sub_product_id,
        office_payable.sub_product_id,
        office_cash.sub_product_id,
    ))
}

pub async fn two_leg(
    ledger: &KhataLedger,
    value_date: NaiveDate,
    narration: &str,
    debit_account: &str,
    credit_account: &str,
    amount: Decimal,
) -> Result<khata_ledger::transaction::TransactionSummary, khata_ledger::transaction::error::TransactionError>
{
    let summary = ledger
        .transactions()
        .create(
            NewTransaction::builder()
                .value_date(value_date)
                .narration(narration)
                .legs(vec![
                    NewTranLeg::builder()
                        .account_no(debit_account)
                        .dr_cr_flag(DrCrFlag::Debit)
                        .lcy_amt(amount)
                        .build()
                        .expect("valid leg"),
                    NewTranLeg::builder()
                        .account_no(credit_account)
                        .dr_cr_flag(DrCrFlag::Credit)
                        .lcy_amt(amount)
                        .build()
                        .expect("valid leg"),
                ])
                .build()
                .expect("valid transaction"),
        )
        .await?;
    Ok(summary)
}

/// Seeds the chart, products and three accounts, funds the customer with
/// 5,000.00 out of office cash, then closes 2024-01-14 so the suite starts
/// on 2024-01-15 with a 5,000.00 opening balance.
pub async fn setup_bank(ledger: &KhataLedger) -> anyhow::Result<TestBank> {
    seed_chart(ledger).await?;
    let (sub_savings, sub_office_payable, sub_office_cash) = seed_products(ledger).await?;

    let customer = ledger.products().create_customer("Rahim Uddin").await?;
    let customer_account = ledger
        .accounts()
        .open_customer_account(
            NewCustomerAccount::builder()
                .cust_id(customer.cust_id)
                .sub_product_id(sub_savings)
                .acct_name("Rahim Uddin Savings")
                .build()?,
        )
        .await?;
    let office_payable = ledger
        .accounts()
        .open_office_account(
            NewOfficeAccount::builder()
                .sub_product_id(sub_office_payable)
                .acct_name("Office Payable")
                .build()?,
        )
        .await?;
    let office_cash = ledger
        .accounts()
        .open_office_account(
            NewOfficeAccount::builder()
                .sub_product_id(sub_office_cash)
                .acct_name("Office Cash")
                .build()?,
        )
        .await?;

    let opening_day = day(OPENING_DAY.0, OPENING_DAY.1, OPENING_DAY.2);
    let funding = two_leg(
        ledger,
        opening_day,
        "Initial funding",
        &office_cash.account_no,
        &customer_account.account_no,
        dec("5000.00"),
    )
    .await?;
    ledger.transactions().post(&funding.tran_id).await?;
    ledger.transactions().verify(&funding.tran_id).await?;

    ledger.eod().run_eod("EODTEST").await?;

    Ok(TestBank {
        cust_id: customer.cust_id,
        sub_savings,
        sub_office_payable,
        sub_office_cash,
        customer_account: customer_account.account_no,
        office_payable: office_payable.account_no,
        office_cash: office_cash.account_no,
    })
}

pub async fn resolve(ledger: &KhataLedger, account_no: &str) -> anyhow::Result<AccountInfo> {
    Ok(ledger.accounts().resolve(account_no).await?)
}
