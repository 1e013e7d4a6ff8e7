use super::AppState;
use super::dto::{
    AckBody, BtnPaymentRequest, BtnPaymentResponse, ErrorBody, StripePaymentRequest,
    StripePaymentResponse,
};
use crate::domain::payment::{BtnTransfer, CardPayment};
use crate::error::PaymentError;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use tracing::{error, warn};

pub const INVALID_REQUEST: &str = "Invalid payment request";
pub const INSUFFICIENT_BTN: &str = "Insufficient BTN balance";
pub const BTN_FAILED: &str = "BTN payment failed";
pub const CARD_FAILED: &str = "Payment processing failed";

/// Client-facing failure: a status and one fixed message, never error detail.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

fn rejected(rejection: JsonRejection) -> PaymentError {
    PaymentError::ValidationError(rejection.body_text())
}

fn btn_error(err: PaymentError) -> ApiError {
    match err {
        PaymentError::ValidationError(reason) => {
            warn!(%reason, "BTN payment request rejected");
            ApiError {
                status: StatusCode::BAD_REQUEST,
                message: INVALID_REQUEST,
            }
        }
        PaymentError::InsufficientFunds { .. } => ApiError {
            status: StatusCode::BAD_REQUEST,
            message: INSUFFICIENT_BTN,
        },
        other => {
            error!(error = %other, "BTN payment failed");
            ApiError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: BTN_FAILED,
            }
        }
    }
}

fn card_error(err: PaymentError) -> ApiError {
    match err {
        PaymentError::ValidationError(reason) => {
            warn!(%reason, "Card payment request rejected");
            ApiError {
                status: StatusCode::BAD_REQUEST,
                message: INVALID_REQUEST,
            }
        }
        other => {
            error!(error = %other, "Card payment failed");
            ApiError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: CARD_FAILED,
            }
        }
    }
}

/// POST /api/payments/btn
pub async fn btn_payment(
    State(state): State<AppState>,
    payload: Result<Json<BtnPaymentRequest>, JsonRejection>,
) -> Result<Json<BtnPaymentResponse>, ApiError> {
    let Json(payload) = payload.map_err(|e| btn_error(rejected(e)))?;
    let transfer = BtnTransfer::try_from(payload).map_err(btn_error)?;
    let outcome = state.transfers.transfer(transfer).await.map_err(btn_error)?;

    Ok(Json(BtnPaymentResponse {
        success: true,
        transaction: outcome.transaction,
        new_balance: outcome.new_balance,
    }))
}

/// POST /api/payments/stripe
pub async fn stripe_payment(
    State(state): State<AppState>,
    payload: Result<Json<StripePaymentRequest>, JsonRejection>,
) -> Result<Json<StripePaymentResponse>, ApiError> {
    let Json(payload) = payload.map_err(|e| card_error(rejected(e)))?;
    let payment = CardPayment::try_from(payload).map_err(card_error)?;
    let outcome = state.cards.pay(payment).await.map_err(card_error)?;

    Ok(Json(StripePaymentResponse {
        success: true,
        payment_intent: outcome.payment_intent,
        transaction: outcome.transaction,
    }))
}

/// POST /api/errors
pub async fn report_error(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> (StatusCode, Json<AckBody>) {
    let result = match payload {
        Ok(Json(report)) => state.errors.report(report).await,
        Err(rejection) => Err(rejected(rejection)),
    };

    match result {
        Ok(()) => (StatusCode::OK, Json(AckBody { success: true })),
        Err(e) => {
            warn!(error = %e, "Failed to accept error report");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AckBody { success: false }),
            )
        }
    }
}

/// GET /health
pub async fn health() -> &'static str {
    "OK"
}
