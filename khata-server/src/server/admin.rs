use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use khata_ledger::{
    bod::BodSummary,
    eod::EodRunSummary,
    reports::ReportKind,
    KhataLedger, LedgerError,
};
use serde::{Deserialize, Serialize};

use super::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EodParams {
    pub user_id: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub success: bool,
    pub job_name: String,
    pub records_processed: u64,
    pub system_date: NaiveDate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EodStatusResponse {
    pub system_date: NaiveDate,
    pub current_date: NaiveDate,
    pub last_eod_date: Option<String>,
    pub last_eod_timestamp: Option<String>,
    pub last_eod_user: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetSystemDateParams {
    pub system_date_str: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetSystemDateResponse {
    pub success: bool,
    pub message: String,
    pub system_date: NaiveDate,
}

pub async fn run_eod(
    State(ledger): State<KhataLedger>,
    Query(params): Query<EodParams>,
) -> Result<Json<EodRunSummary>, ApiError> {
    let user_id = params.user_id.unwrap_or_else(|| "ADMIN".to_string());
    let summary = ledger
        .eod()
        .run_eod(&user_id)
        .await
        .map_err(LedgerError::from)?;
    Ok(Json(summary))
}

pub async fn run_eod_job(
    State(ledger): State<KhataLedger>,
    Path(job_number): Path<u8>,
    Query(params): Query<EodParams>,
) -> Result<Json<JobResponse>, ApiError> {
    let user_id = params.user_id.unwrap_or_else(|| "ADMIN".to_string());
    let records_processed = ledger
        .eod()
        .run_job(job_number, params.date, &user_id)
        .await
        .map_err(LedgerError::from)?;
    let job_name = khata_ledger::eod::EodJob::from_number(job_number)
        .map(|job| job.name().to_string())
        .unwrap_or_default();
    let system_date = ledger.clock().now().await.map_err(LedgerError::from)?;
    Ok(Json(JobResponse {
        success: true,
        job_name,
        records_processed,
        system_date,
    }))
}

pub async fn eod_status(
    State(ledger): State<KhataLedger>,
) -> Result<Json<EodStatusResponse>, ApiError> {
    let system_date = ledger.clock().now().await.map_err(LedgerError::from)?;
    let last_eod_date = ledger
        .clock()
        .parameter(khata_ledger::clock::LAST_EOD_DATE)
        .await
        .map_err(LedgerError::from)?;
    let last_eod_timestamp = ledger
        .clock()
        .parameter(khata_ledger::clock::LAST_EOD_TIMESTAMP)
        .await
        .map_err(LedgerError::from)?;
    let last_eod_user = ledger
        .clock()
        .parameter(khata_ledger::clock::LAST_EOD_USER)
        .await
        .map_err(LedgerError::from)?;
    Ok(Json(EodStatusResponse {
        system_date,
        current_date: chrono::Utc::now().date_naive(),
        last_eod_date,
        last_eod_timestamp,
        last_eod_user,
    }))
}

pub async fn set_system_date(
    State(ledger): State<KhataLedger>,
    Query(params): Query<SetSystemDateParams>,
) -> Result<Json<SetSystemDateResponse>, ApiError> {
    let date: NaiveDate = params
        .system_date_str
        .parse()
        .map_err(|_| ApiError::validation("systemDateStr", "must be a YYYY-MM-DD date"))?;
    ledger
        .clock()
        .set(date, "ADMIN")
        .await
        .map_err(|e| LedgerError::from(e))?;
    Ok(Json(SetSystemDateResponse {
        success: true,
        message: "System date successfully updated".to_string(),
        system_date: date,
    }))
}

pub async fn run_bod(State(ledger): State<KhataLedger>) -> Result<Json<BodSummary>, ApiError> {
    let summary = ledger.bod().run().await.map_err(LedgerError::from)?;
    Ok(Json(summary))
}

pub async fn download_report(
    State(ledger): State<KhataLedger>,
    Path((kind, report_date)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = match kind.as_str() {
        "trial-balance" => ReportKind::TrialBalance,
        "balance-sheet" => ReportKind::BalanceSheet,
        _ => {
            return Err(ApiError::validation(
                "kind",
                "must be trial-balance or balance-sheet",
            ))
        }
    };
    let bytes = ledger
        .reports()
        .read_report(kind, &report_date)
        .await
        .map_err(LedgerError::from)?;
    let file_name = kind.file_name(&report_date);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, kind.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    ))
}
