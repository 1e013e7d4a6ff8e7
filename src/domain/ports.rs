use super::money::{Amount, UserId};
use super::payment::{IntentRequest, PaymentIntent, TransferReceipt};
use super::transaction::{NewTransaction, TransactionRecord};
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;

/// External system of record for balances, fund movements and transaction rows.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Current BTN balance, `None` when the user has no balance row.
    async fn get_balance(&self, user_id: &UserId) -> Result<Option<Decimal>>;

    /// Moves funds atomically. The ledger's own balance guard is authoritative.
    async fn transfer_atomic(
        &self,
        from: &UserId,
        to: &UserId,
        amount: Amount,
        description: Option<&str>,
    ) -> Result<TransferReceipt>;

    async fn insert_transaction(&self, tx: NewTransaction) -> Result<TransactionRecord>;
}

/// External card processor.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn create_and_confirm_payment_intent(
        &self,
        request: IntentRequest,
    ) -> Result<PaymentIntent>;
}

/// Sink for client-side error reports.
#[async_trait]
pub trait ErrorReporter: Send + Sync {
    async fn report(&self, payload: serde_json::Value) -> Result<()>;
}

pub type LedgerRef = Arc<dyn Ledger>;
pub type PaymentProcessorRef = Arc<dyn PaymentProcessor>;
pub type ErrorReporterRef = Arc<dyn ErrorReporter>;
