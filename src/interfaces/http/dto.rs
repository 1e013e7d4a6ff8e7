//! Wire shapes of the payment endpoints.

use crate::domain::money::{Amount, Currency, UserId};
use crate::domain::payment::{BtnTransfer, CardPayment, PaymentIntent};
use crate::domain::transaction::TransactionRecord;
use crate::error::PaymentError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct BtnPaymentRequest {
    pub amount: Decimal,
    pub from_user_id: String,
    pub to_user_id: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl TryFrom<BtnPaymentRequest> for BtnTransfer {
    type Error = PaymentError;

    fn try_from(req: BtnPaymentRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            amount: Amount::new(req.amount)?,
            from_user_id: UserId::new(req.from_user_id)?,
            to_user_id: UserId::new(req.to_user_id)?,
            description: req.description.filter(|d| !d.trim().is_empty()),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripePaymentRequest {
    pub amount: Decimal,
    pub currency: String,
    pub payment_method_id: String,
    pub user_id: String,
}

impl TryFrom<StripePaymentRequest> for CardPayment {
    type Error = PaymentError;

    fn try_from(req: StripePaymentRequest) -> Result<Self, Self::Error> {
        CardPayment::new(
            Amount::new(req.amount)?,
            Currency::parse(&req.currency)?,
            req.payment_method_id,
            UserId::new(req.user_id)?,
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BtnPaymentResponse {
    pub success: bool,
    pub transaction: TransactionRecord,
    #[serde(with = "rust_decimal::serde::float")]
    pub new_balance: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct StripePaymentResponse {
    pub success: bool,
    pub payment_intent: PaymentIntent,
    pub transaction: TransactionRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct AckBody {
    pub success: bool,
}
