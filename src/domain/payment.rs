use super::money::{Amount, Currency, UserId};
use crate::error::PaymentError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A validated request to move BTN between two users.
#[derive(Debug, Clone, PartialEq)]
pub struct BtnTransfer {
    pub amount: Amount,
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    pub description: Option<String>,
}

/// Result of the ledger's atomic transfer operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub id: String,
    /// Sender balance after the movement.
    #[serde(alias = "newBalance", with = "rust_decimal::serde::float")]
    pub new_balance: Decimal,
}

/// A validated card payment request.
#[derive(Debug, Clone, PartialEq)]
pub struct CardPayment {
    pub amount: Amount,
    pub currency: Currency,
    pub payment_method_id: String,
    pub user_id: UserId,
}

impl CardPayment {
    pub fn new(
        amount: Amount,
        currency: Currency,
        payment_method_id: impl Into<String>,
        user_id: UserId,
    ) -> Result<Self, PaymentError> {
        let payment_method_id = payment_method_id.into();
        if payment_method_id.trim().is_empty() {
            return Err(PaymentError::ValidationError(
                "Payment method id must not be blank".to_string(),
            ));
        }
        Ok(Self {
            amount,
            currency,
            payment_method_id,
            user_id,
        })
    }
}

/// Status of a payment intent as reported by the processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
    #[serde(other)]
    Unknown,
}

impl IntentStatus {
    /// Whether the processor considers the charge settled.
    pub fn is_terminal_success(&self) -> bool {
        matches!(self, IntentStatus::Succeeded)
    }
}

/// Parameters for a single create-and-confirm call to the processor.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentRequest {
    pub amount_minor: i64,
    /// Lower-case currency code.
    pub currency: String,
    pub payment_method_id: String,
    pub return_url: String,
    pub metadata: BTreeMap<String, String>,
}

/// Processor-owned payment intent, as seen at call time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub status: IntentStatus,
    /// Amount in minor units.
    pub amount: i64,
    pub currency: String,
}
