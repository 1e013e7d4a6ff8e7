use super::money::{Currency, UserId, card_fee};
use super::payment::{BtnTransfer, CardPayment, IntentStatus, PaymentIntent, TransferReceipt};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Payment,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl From<IntentStatus> for TransactionStatus {
    fn from(status: IntentStatus) -> Self {
        if status.is_terminal_success() {
            TransactionStatus::Completed
        } else {
            TransactionStatus::Pending
        }
    }
}

/// Per-kind metadata attached to a transaction row.
///
/// Closed internally, serialized as a plain JSON object so the ledger only
/// ever sees an opaque key-value map.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(untagged)]
pub enum TransactionMetadata {
    BtnTransfer {
        to_user_id: UserId,
        description: Option<String>,
        transfer_id: String,
    },
    Card {
        payment_method_id: String,
        processor_status: IntentStatus,
    },
}

/// A transaction row before the ledger has stored it.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct NewTransaction {
    pub user_id: UserId,
    pub r#type: TransactionType,
    pub status: TransactionStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: Currency,
    #[serde(with = "rust_decimal::serde::float")]
    pub fee: Decimal,
    pub external_tx_id: Option<String>,
    pub metadata: TransactionMetadata,
}

impl NewTransaction {
    /// Row for a BTN transfer the ledger has already applied.
    pub fn btn_transfer(transfer: &BtnTransfer, receipt: &TransferReceipt) -> Self {
        Self {
            user_id: transfer.from_user_id.clone(),
            r#type: TransactionType::Payment,
            status: TransactionStatus::Completed,
            amount: transfer.amount.value(),
            currency: Currency::btn(),
            fee: Decimal::ZERO,
            external_tx_id: None,
            metadata: TransactionMetadata::BtnTransfer {
                to_user_id: transfer.to_user_id.clone(),
                description: transfer.description.clone(),
                transfer_id: receipt.id.clone(),
            },
        }
    }

    /// Row for a card payment; the status follows the processor's report.
    pub fn card_payment(payment: &CardPayment, intent: &PaymentIntent) -> Self {
        Self {
            user_id: payment.user_id.clone(),
            r#type: TransactionType::Payment,
            status: intent.status.into(),
            amount: payment.amount.value(),
            currency: payment.currency.clone(),
            fee: card_fee(payment.amount),
            external_tx_id: Some(intent.id.clone()),
            metadata: TransactionMetadata::Card {
                payment_method_id: payment.payment_method_id.clone(),
                processor_status: intent.status,
            },
        }
    }
}

/// A transaction row as stored by the ledger.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct TransactionRecord {
    pub id: String,
    pub user_id: UserId,
    pub r#type: TransactionType,
    pub status: TransactionStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: Currency,
    #[serde(with = "rust_decimal::serde::float")]
    pub fee: Decimal,
    pub external_tx_id: Option<String>,
    pub metadata: TransactionMetadata,
    pub created_at: DateTime<Utc>,
}

impl TransactionRecord {
    pub fn from_new(id: String, created_at: DateTime<Utc>, tx: NewTransaction) -> Self {
        Self {
            id,
            user_id: tx.user_id,
            r#type: tx.r#type,
            status: tx.status,
            amount: tx.amount,
            currency: tx.currency,
            fee: tx.fee,
            external_tx_id: tx.external_tx_id,
            metadata: tx.metadata,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Amount;
    use rust_decimal_macros::dec;

    fn transfer() -> BtnTransfer {
        BtnTransfer {
            amount: Amount::new(dec!(100)).unwrap(),
            from_user_id: UserId::new("alice").unwrap(),
            to_user_id: UserId::new("bob").unwrap(),
            description: Some("rent".to_string()),
        }
    }

    #[test]
    fn test_btn_transfer_row() {
        let receipt = TransferReceipt {
            id: "t1".to_string(),
            new_balance: dec!(100),
        };
        let tx = NewTransaction::btn_transfer(&transfer(), &receipt);

        assert_eq!(tx.user_id.as_str(), "alice");
        assert_eq!(tx.status, TransactionStatus::Completed);
        assert_eq!(tx.fee, Decimal::ZERO);
        assert_eq!(tx.currency.as_str(), "BTN");
        assert_eq!(tx.external_tx_id, None);
    }

    #[test]
    fn test_metadata_serializes_as_flat_map() {
        let receipt = TransferReceipt {
            id: "t1".to_string(),
            new_balance: dec!(100),
        };
        let tx = NewTransaction::btn_transfer(&transfer(), &receipt);
        let json = serde_json::to_value(&tx).unwrap();

        assert_eq!(json["type"], "payment");
        assert_eq!(json["status"], "completed");
        assert_eq!(json["metadata"]["transfer_id"], "t1");
        assert_eq!(json["metadata"]["to_user_id"], "bob");
        assert_eq!(json["metadata"]["description"], "rent");
        assert_eq!(json["amount"].as_f64(), Some(100.0));
    }

    #[test]
    fn test_card_row_status_follows_processor() {
        let payment = CardPayment::new(
            Amount::new(dec!(19.99)).unwrap(),
            Currency::parse("USD").unwrap(),
            "pm_card",
            UserId::new("alice").unwrap(),
        )
        .unwrap();

        let mut intent = PaymentIntent {
            id: "pi_1".to_string(),
            status: IntentStatus::Succeeded,
            amount: 1999,
            currency: "usd".to_string(),
        };
        let tx = NewTransaction::card_payment(&payment, &intent);
        assert_eq!(tx.status, TransactionStatus::Completed);
        assert_eq!(tx.fee, dec!(0.88));
        assert_eq!(tx.external_tx_id.as_deref(), Some("pi_1"));

        intent.status = IntentStatus::RequiresAction;
        let tx = NewTransaction::card_payment(&payment, &intent);
        assert_eq!(tx.status, TransactionStatus::Pending);
    }

    #[test]
    fn test_record_round_trips_through_ledger_json() {
        let json = r#"{
            "id": "row-1",
            "user_id": "alice",
            "type": "payment",
            "status": "pending",
            "amount": 19.99,
            "currency": "USD",
            "fee": 0.88,
            "external_tx_id": "pi_1",
            "metadata": {"payment_method_id": "pm_card", "processor_status": "processing"},
            "created_at": "2026-01-01T00:00:00Z"
        }"#;
        let record: TransactionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.amount, dec!(19.99));
        assert_eq!(
            record.metadata,
            TransactionMetadata::Card {
                payment_method_id: "pm_card".to_string(),
                processor_status: IntentStatus::Processing,
            }
        );
    }
}
