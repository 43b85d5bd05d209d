pub mod config;
pub mod error;

use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tracing::instrument;

pub use config::*;
pub use error::*;

use crate::{
    account::Accounts,
    balance::Balances,
    bod::BodProcessor,
    clock::SystemClock,
    eod::EodPipeline,
    gl::ChartOfAccounts,
    history::TransactionHistories,
    interest::InterestAccruals,
    movement::GlMovements,
    product::Products,
    reports::FinancialReports,
    transaction::Transactions,
};

/// The assembled ledger: one connection pool, one system clock, and the
/// services that make up the bookkeeping engine.
#[derive(Clone)]
pub struct KhataLedger {
    _pool: SqlitePool,
    clock: SystemClock,
    chart: ChartOfAccounts,
    products: Products,
    accounts: Accounts,
    balances: Balances,
    movements: GlMovements,
    histories: TransactionHistories,
    transactions: Transactions,
    accruals: InterestAccruals,
    reports: FinancialReports,
    eod: EodPipeline,
    bod: BodProcessor,
}

impl KhataLedger {
    #[instrument(name = "khata.init", skip(config))]
    pub async fn init(config: KhataLedgerConfig) -> Result<Self, LedgerError> {
        let pool = match (config.pool, config.db_url) {
            (Some(pool), None) => pool,
            (None, Some(db_url)) => {
                let connect_opts =
                    SqliteConnectOptions::from_str(&db_url)?.create_if_missing(true);
                let mut pool_opts = SqlitePoolOptions::new();
                if let Some(max_connections) = config.max_connections {
                    pool_opts = pool_opts.max_connections(max_connections);
                }
                pool_opts.connect_with(connect_opts).await?
            }
            _ => {
                return Err(LedgerError::Config(
                    "One of db_url or pool must be set".to_string(),
                ))
            }
        };
        if config.exec_migrations {
            sqlx::migrate!().run(&pool).await?;
        }

        let clock = SystemClock::new(&pool, config.default_system_date);
        clock.seed_default().await?;

        let chart = ChartOfAccounts::new(&pool);
        let products = Products::new(&pool);
        let balances = Balances::new(&pool);
        let accounts = Accounts::new(&pool, &products, &balances, &clock);
        let movements = GlMovements::new(&pool);
        let histories = TransactionHistories::new(&pool);
        let transactions = Transactions::new(
            &pool,
            &accounts,
            &balances,
            &movements,
            &histories,
            &chart,
            &clock,
            config.default_currency.clone(),
        );
        let accruals = InterestAccruals::new(
            &pool,
            &accounts,
            &products,
            &balances,
            config.default_currency,
        );
        let reports = FinancialReports::new(&balances, &chart, config.reports_dir);
        let eod = EodPipeline::new(
            &pool, &clock, &accounts, &balances, &accruals, &movements, &reports,
        );
        let bod = BodProcessor::new(&transactions, &clock);

        Ok(Self {
            _pool: pool,
            clock,
            chart,
            products,
            accounts,
            balances,
            movements,
            histories,
            transactions,
            accruals,
            reports,
            eod,
            bod,
        })
    }

    pub fn clock(&self) -> &SystemClock {
        &self.clock
    }

    pub fn chart(&self) -> &ChartOfAccounts {
        &self.chart
    }

    pub fn products(&self) -> &Products {
        &self.products
    }

    pub fn accounts(&self) -> &Accounts {
        &self.accounts
    }

    pub fn balances(&self) -> &Balances {
        &self.balances
    }

    pub fn movements(&self) -> &GlMovements {
        &self.movements
    }

    pub fn histories(&self) -> &TransactionHistories {
        &self.histories
    }

    pub fn transactions(&self) -> &Transactions {
        &self.transactions
    }

    pub fn accruals(&self) -> &InterestAccruals {
        &self.accruals
    }

    pub fn reports(&self) -> &FinancialReports {
        &self.reports
    }

    pub fn eod(&self) -> &EodPipeline {
        &self.eod
    }

    pub fn bod(&self) -> &BodProcessor {
        &self.bod
    }

    /// Real-time available balance of an account as of the open day.
    pub async fn available_balance(&self, account_no: &str) -> Result<Decimal, LedgerError> {
        let info = self.accounts.resolve(account_no).await?;
        let today = self.clock.now().await?;
        Ok(self.balances.available_balance(&info, today).await?)
    }
}
