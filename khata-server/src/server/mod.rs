mod admin;
mod error;
mod transactions;

use axum::{
    routing::{get, post},
    Router,
};
use khata_ledger::{KhataLedger, KhataLedgerConfig};
use tracing::instrument;

use crate::config::ServerConfig;

pub use error::{ApiError, ErrorBody, ValidationBody};

pub fn app(ledger: KhataLedger) -> Router {
    Router::new()
        .route("/transactions/entry", post(transactions::create_transaction))
        .route("/transactions", get(transactions::list_transactions))
        .route("/transactions/:tran_id", get(transactions::get_transaction))
        .route(
            "/transactions/:tran_id/post",
            post(transactions::post_transaction),
        )
        .route(
            "/transactions/:tran_id/verify",
            post(transactions::verify_transaction),
        )
        .route(
            "/transactions/:tran_id/reverse",
            post(transactions::reverse_transaction),
        )
        .route("/admin/run-eod", post(admin::run_eod))
        .route("/admin/run-bod", post(admin::run_bod))
        .route("/admin/eod/batch/:job", post(admin::run_eod_job))
        .route("/admin/eod/status", get(admin::eod_status))
        .route("/admin/set-system-date", post(admin::set_system_date))
        .route(
            "/admin/eod/batch-job-7/download/:kind/:date",
            get(admin::download_report),
        )
        .with_state(ledger)
}

#[instrument(name = "khata_server.run", skip_all, fields(port = config.port))]
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let mut ledger_config = KhataLedgerConfig::builder();
    ledger_config
        .db_url(config.db_url.clone())
        .exec_migrations(true)
        .reports_dir(config.reports_dir.clone());
    if let Some(date) = config.default_system_date {
        ledger_config.default_system_date(date);
    }
    let ledger = KhataLedger::init(ledger_config.build()?).await?;

    let router = app(ledger);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "starting khata server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router.into_make_service()).await?;
    Ok(())
}
