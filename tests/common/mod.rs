#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use bitnun_payments::application::card::CardPaymentService;
use bitnun_payments::application::transfer::BtnTransferService;
use bitnun_payments::domain::money::{Amount, UserId};
use bitnun_payments::domain::payment::{IntentRequest, PaymentIntent, TransferReceipt};
use bitnun_payments::domain::ports::{
    ErrorReporter, Ledger, LedgerRef, PaymentProcessor, PaymentProcessorRef,
};
use bitnun_payments::domain::transaction::{NewTransaction, TransactionRecord};
use bitnun_payments::error::{PaymentError, Result};
use bitnun_payments::infrastructure::in_memory::InMemoryLedger;
use bitnun_payments::interfaces::http::{AppState, router};
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

pub const SITE_URL: &str = "https://bitnun.example";

pub fn user(id: &str) -> UserId {
    UserId::new(id).unwrap()
}

pub fn app(ledger: LedgerRef, processor: PaymentProcessorRef) -> Router {
    app_with_timeout(ledger, processor, Duration::from_secs(5))
}

pub fn app_with_timeout(
    ledger: LedgerRef,
    processor: PaymentProcessorRef,
    call_timeout: Duration,
) -> Router {
    app_with_reporter(ledger, processor, call_timeout, Arc::new(RecordingReporter::default()))
}

pub fn app_with_reporter(
    ledger: LedgerRef,
    processor: PaymentProcessorRef,
    call_timeout: Duration,
    reporter: Arc<dyn ErrorReporter>,
) -> Router {
    router(AppState {
        transfers: Arc::new(BtnTransferService::new(ledger.clone(), call_timeout)),
        cards: Arc::new(CardPaymentService::new(
            processor,
            ledger,
            SITE_URL,
            call_timeout,
        )),
        errors: reporter,
    })
}

pub async fn post_raw(app: Router, path: &str, body: impl Into<Body>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub async fn post_json(app: Router, path: &str, body: Value) -> (StatusCode, Value) {
    post_raw(app, path, body.to_string()).await
}

/// Applies transfers but cannot write transaction rows.
#[derive(Clone, Default)]
pub struct FailingInsertLedger {
    pub inner: InMemoryLedger,
}

#[async_trait]
impl Ledger for FailingInsertLedger {
    async fn get_balance(&self, user_id: &UserId) -> Result<Option<Decimal>> {
        self.inner.get_balance(user_id).await
    }

    async fn transfer_atomic(
        &self,
        from: &UserId,
        to: &UserId,
        amount: Amount,
        description: Option<&str>,
    ) -> Result<TransferReceipt> {
        self.inner.transfer_atomic(from, to, amount, description).await
    }

    async fn insert_transaction(&self, _tx: NewTransaction) -> Result<TransactionRecord> {
        Err(PaymentError::PersistenceError(
            "connection reset by peer".to_string(),
        ))
    }
}

/// Reports a fixed balance on the pre-check, whatever the ledger holds.
#[derive(Clone)]
pub struct StaleBalanceLedger {
    pub inner: InMemoryLedger,
    pub reported: Decimal,
}

#[async_trait]
impl Ledger for StaleBalanceLedger {
    async fn get_balance(&self, _user_id: &UserId) -> Result<Option<Decimal>> {
        Ok(Some(self.reported))
    }

    async fn transfer_atomic(
        &self,
        from: &UserId,
        to: &UserId,
        amount: Amount,
        description: Option<&str>,
    ) -> Result<TransferReceipt> {
        self.inner.transfer_atomic(from, to, amount, description).await
    }

    async fn insert_transaction(&self, tx: NewTransaction) -> Result<TransactionRecord> {
        self.inner.insert_transaction(tx).await
    }
}

/// Every call fails as if the processor were unreachable.
pub struct FailingProcessor;

#[async_trait]
impl PaymentProcessor for FailingProcessor {
    async fn create_and_confirm_payment_intent(
        &self,
        _request: IntentRequest,
    ) -> Result<PaymentIntent> {
        Err(PaymentError::processor("connection refused"))
    }
}

/// Never answers.
pub struct HangingProcessor;

#[async_trait]
impl PaymentProcessor for HangingProcessor {
    async fn create_and_confirm_payment_intent(
        &self,
        _request: IntentRequest,
    ) -> Result<PaymentIntent> {
        std::future::pending().await
    }
}

#[derive(Default, Clone)]
pub struct RecordingReporter {
    pub reports: Arc<Mutex<Vec<Value>>>,
}

#[async_trait]
impl ErrorReporter for RecordingReporter {
    async fn report(&self, payload: Value) -> Result<()> {
        self.reports.lock().unwrap().push(payload);
        Ok(())
    }
}

/// Applies transfers on the inner ledger but reports a fixed transfer id.
#[derive(Clone)]
pub struct ScriptedTransferLedger {
    pub inner: InMemoryLedger,
    pub transfer_id: String,
}

#[async_trait]
impl Ledger for ScriptedTransferLedger {
    async fn get_balance(&self, user_id: &UserId) -> Result<Option<Decimal>> {
        self.inner.get_balance(user_id).await
    }

    async fn transfer_atomic(
        &self,
        from: &UserId,
        to: &UserId,
        amount: Amount,
        description: Option<&str>,
    ) -> Result<TransferReceipt> {
        let receipt = self.inner.transfer_atomic(from, to, amount, description).await?;
        Ok(TransferReceipt {
            id: self.transfer_id.clone(),
            ..receipt
        })
    }

    async fn insert_transaction(&self, tx: NewTransaction) -> Result<TransactionRecord> {
        self.inner.insert_transaction(tx).await
    }
}
