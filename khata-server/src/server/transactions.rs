use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use khata_ledger::{
    primitives::DrCrFlag,
    transaction::{NewTranLeg, NewTransaction, TransactionSummary},
    KhataLedger,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub value_date: NaiveDate,
    pub narration: String,
    pub lines: Vec<TransactionLineRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionLineRequest {
    pub account_no: String,
    pub dr_cr_flag: DrCrFlag,
    pub lcy_amt: Decimal,
    pub tran_ccy: Option<String>,
    pub fcy_amt: Option<Decimal>,
    pub exchange_rate: Option<Decimal>,
    pub narration: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub page: Option<usize>,
    pub size: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPage {
    pub content: Vec<TransactionSummary>,
    pub page: usize,
    pub size: usize,
    pub total_elements: usize,
}

#[derive(Debug, Deserialize)]
pub struct ReverseRequest {
    pub reason: String,
}

pub async fn create_transaction(
    State(ledger): State<KhataLedger>,
    Json(request): Json<TransactionRequest>,
) -> Result<(StatusCode, Json<TransactionSummary>), ApiError> {
    let mut legs = Vec::with_capacity(request.lines.len());
    for (index, line) in request.lines.into_iter().enumerate() {
        let mut builder = NewTranLeg::builder();
        builder
            .account_no(line.account_no)
            .dr_cr_flag(line.dr_cr_flag)
            .lcy_amt(line.lcy_amt);
        if let Some(tran_ccy) = line.tran_ccy {
            builder.tran_ccy(tran_ccy);
        }
        if let Some(fcy_amt) = line.fcy_amt {
            builder.fcy_amt(fcy_amt);
        }
        if let Some(exchange_rate) = line.exchange_rate {
            builder.exchange_rate(exchange_rate);
        }
        if let Some(narration) = line.narration {
            builder.narration(narration);
        }
        legs.push(
            builder
                .build()
                .map_err(|e| ApiError::validation(format!("lines[{index}]"), e.to_string()))?,
        );
    }
    let new_transaction = NewTransaction::builder()
        .value_date(request.value_date)
        .narration(request.narration)
        .legs(legs)
        .build()
        .map_err(|e| ApiError::validation("request", e.to_string()))?;

    let summary = ledger
        .transactions()
        .create(new_transaction)
        .await
        .map_err(khata_ledger::LedgerError::from)?;
    Ok((StatusCode::CREATED, Json(summary)))
}

pub async fn post_transaction(
    State(ledger): State<KhataLedger>,
    Path(tran_id): Path<String>,
) -> Result<Json<TransactionSummary>, ApiError> {
    let summary = ledger
        .transactions()
        .post(&tran_id)
        .await
        .map_err(khata_ledger::LedgerError::from)?;
    Ok(Json(summary))
}

pub async fn verify_transaction(
    State(ledger): State<KhataLedger>,
    Path(tran_id): Path<String>,
) -> Result<Json<TransactionSummary>, ApiError> {
    let summary = ledger
        .transactions()
        .verify(&tran_id)
        .await
        .map_err(khata_ledger::LedgerError::from)?;
    Ok(Json(summary))
}

pub async fn reverse_transaction(
    State(ledger): State<KhataLedger>,
    Path(tran_id): Path<String>,
    Json(request): Json<ReverseRequest>,
) -> Result<(StatusCode, Json<TransactionSummary>), ApiError> {
    let summary = ledger
        .transactions()
        .reverse(&tran_id, &request.reason)
        .await
        .map_err(khata_ledger::LedgerError::from)?;
    Ok((StatusCode::CREATED, Json(summary)))
}

pub async fn get_transaction(
    State(ledger): State<KhataLedger>,
    Path(tran_id): Path<String>,
) -> Result<Json<TransactionSummary>, ApiError> {
    let summary = ledger
        .transactions()
        .find(&tran_id)
        .await
        .map_err(khata_ledger::LedgerError::from)?;
    Ok(Json(summary))
}

pub async fn list_transactions(
    State(ledger): State<KhataLedger>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<TransactionPage>, ApiError> {
    let page = pagination.page.unwrap_or(0);
    let size = pagination.size.unwrap_or(20);
    let (content, total_elements) = ledger
        .transactions()
        .list(page, size)
        .await
        .map_err(khata_ledger::LedgerError::from)?;
    Ok(Json(TransactionPage {
        content,
        page,
        size,
        total_elements,
    }))
}
