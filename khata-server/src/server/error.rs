use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use khata_ledger::{error::ErrorKind, error::LedgerError};
use serde::Serialize;

/// Operator-facing error envelope.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
}

/// Request-validation envelope: which field broke which constraint.
#[derive(Debug, Serialize)]
pub struct ValidationBody {
    pub error: String,
    pub field: String,
    pub constraint: String,
}

#[derive(Debug)]
pub enum ApiError {
    Operator {
        status: StatusCode,
        message: String,
    },
    Validation {
        field: String,
        constraint: String,
    },
}

impl ApiError {
    pub fn validation(field: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            constraint: constraint.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Operator { status, .. } => *status,
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(error: LedgerError) -> Self {
        let status = match error.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::BusinessRule | ErrorKind::Configuration => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::InvariantViolation | ErrorKind::Transient | ErrorKind::Io => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::Operator {
            status,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Operator { status, message } => {
                let body = ErrorBody {
                    success: false,
                    message,
                    timestamp: chrono::Utc::now().to_rfc3339(),
                };
                (status, Json(body)).into_response()
            }
            ApiError::Validation { field, constraint } => {
                let body = ValidationBody {
                    error: "ValidationError".to_string(),
                    field,
                    constraint,
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use khata_ledger::transaction::error::TransactionError;

    #[test]
    fn kinds_map_onto_http_statuses() {
        let not_found: ApiError =
            LedgerError::from(TransactionError::NotFound("T1".to_string())).into();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let conflict: ApiError =
            LedgerError::from(TransactionError::AlreadyVerified("T1".to_string())).into();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let business: ApiError = LedgerError::from(TransactionError::TooFewLegs).into();
        assert_eq!(business.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn operator_envelope_reports_failure() {
        let body = ErrorBody {
            success: false,
            message: "boom".to_string(),
            timestamp: "2024-01-15T00:00:00Z".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "boom");
    }

    #[test]
    fn validation_envelope_names_field_and_constraint() {
        let error = ApiError::validation("systemDateStr", "must be YYYY-MM-DD");
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        match error {
            ApiError::Validation { field, constraint } => {
                let json = serde_json::to_value(ValidationBody {
                    error: "ValidationError".to_string(),
                    field,
                    constraint,
                })
                .unwrap();
                assert_eq!(json["error"], "ValidationError");
                assert_eq!(json["field"], "systemDateStr");
                assert_eq!(json["constraint"], "must be YYYY-MM-DD");
            }
            ApiError::Operator { .. } => panic!("expected a validation error"),
        }
    }
}
