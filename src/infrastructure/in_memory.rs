use crate::domain::money::{Amount, UserId};
use crate::domain::payment::{IntentRequest, IntentStatus, PaymentIntent, TransferReceipt};
use crate::domain::ports::{Ledger, PaymentProcessor};
use crate::domain::transaction::{NewTransaction, TransactionRecord};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A thread-safe in-memory ledger.
///
/// Balances and transaction rows live behind `Arc<RwLock<..>>` so clones share
/// state. Transfers take a single write lock and enforce the balance guard
/// themselves, the same way the hosted ledger's RPC does.
#[derive(Default, Clone)]
pub struct InMemoryLedger {
    balances: Arc<RwLock<HashMap<UserId, Decimal>>>,
    transactions: Arc<RwLock<Vec<TransactionRecord>>>,
}

impl InMemoryLedger {
    /// Creates a new, empty in-memory ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ledger seeded with the given balances.
    pub fn with_balances(balances: impl IntoIterator<Item = (UserId, Decimal)>) -> Self {
        Self {
            balances: Arc::new(RwLock::new(balances.into_iter().collect())),
            transactions: Arc::default(),
        }
    }

    pub async fn set_balance(&self, user_id: UserId, balance: Decimal) {
        self.balances.write().await.insert(user_id, balance);
    }

    /// Snapshot of every stored transaction row, in insertion order.
    pub async fn transactions(&self) -> Vec<TransactionRecord> {
        self.transactions.read().await.clone()
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn get_balance(&self, user_id: &UserId) -> Result<Option<Decimal>> {
        let balances = self.balances.read().await;
        Ok(balances.get(user_id).copied())
    }

    async fn transfer_atomic(
        &self,
        from: &UserId,
        to: &UserId,
        amount: Amount,
        _description: Option<&str>,
    ) -> Result<TransferReceipt> {
        let mut balances = self.balances.write().await;
        let available = balances.get(from).copied().unwrap_or(Decimal::ZERO);
        if available < amount.value() {
            return Err(PaymentError::ledger(format!(
                "transfer_btn rejected: balance {available} below {}",
                amount.value()
            )));
        }

        let debited = available - amount.value();
        let receiver = if from == to {
            debited
        } else {
            balances.get(to).copied().unwrap_or(Decimal::ZERO)
        };
        let credited = receiver.checked_add(amount.value()).ok_or_else(|| {
            PaymentError::ledger(format!("transfer_btn rejected: balance of {to} would overflow"))
        })?;

        let new_balance = if from == to {
            credited
        } else {
            balances.insert(from.clone(), debited);
            debited
        };
        balances.insert(to.clone(), credited);

        Ok(TransferReceipt {
            id: Uuid::new_v4().to_string(),
            new_balance,
        })
    }

    async fn insert_transaction(&self, tx: NewTransaction) -> Result<TransactionRecord> {
        let record = TransactionRecord::from_new(Uuid::new_v4().to_string(), Utc::now(), tx);
        self.transactions.write().await.push(record.clone());
        Ok(record)
    }
}

/// A local stand-in for the card processor.
///
/// Every intent is confirmed with the configured status. Requests are kept so
/// callers can inspect what would have been sent.
#[derive(Clone)]
pub struct InMemoryPaymentProcessor {
    status: IntentStatus,
    requests: Arc<RwLock<Vec<IntentRequest>>>,
}

impl Default for InMemoryPaymentProcessor {
    fn default() -> Self {
        Self::with_status(IntentStatus::Succeeded)
    }
}

impl InMemoryPaymentProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(status: IntentStatus) -> Self {
        Self {
            status,
            requests: Arc::default(),
        }
    }

    pub async fn requests(&self) -> Vec<IntentRequest> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl PaymentProcessor for InMemoryPaymentProcessor {
    async fn create_and_confirm_payment_intent(
        &self,
        request: IntentRequest,
    ) -> Result<PaymentIntent> {
        let intent = PaymentIntent {
            id: format!("pi_{}", Uuid::new_v4().simple()),
            status: self.status,
            amount: request.amount_minor,
            currency: request.currency.clone(),
        };
        self.requests.write().await.push(request);
        Ok(intent)
    }
}
