use super::deadline::bounded;
use crate::domain::payment::{CardPayment, IntentRequest, PaymentIntent};
use crate::domain::ports::{LedgerRef, PaymentProcessorRef};
use crate::domain::transaction::{NewTransaction, TransactionRecord};
use crate::error::{ExternalService, PaymentError, Result};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{error, info, instrument};

/// Platform tag attached to every payment intent.
pub const PLATFORM: &str = "bitnun-eco";
/// Path on the public site the processor redirects to after extra steps.
pub const RETURN_PATH: &str = "/payments/complete";

/// Outcome of a card payment the processor accepted (not necessarily settled).
#[derive(Debug, Clone, PartialEq)]
pub struct CardOutcome {
    pub payment_intent: PaymentIntent,
    pub transaction: TransactionRecord,
}

/// Charges cards through the processor and records each attempt.
pub struct CardPaymentService {
    processor: PaymentProcessorRef,
    ledger: LedgerRef,
    return_url: String,
    call_timeout: Duration,
}

impl CardPaymentService {
    /// # Arguments
    ///
    /// * `site_url` - Public base URL of the site, used to build the return URL.
    pub fn new(
        processor: PaymentProcessorRef,
        ledger: LedgerRef,
        site_url: &str,
        call_timeout: Duration,
    ) -> Self {
        Self {
            processor,
            ledger,
            return_url: format!("{}{RETURN_PATH}", site_url.trim_end_matches('/')),
            call_timeout,
        }
    }

    pub fn return_url(&self) -> &str {
        &self.return_url
    }

    #[instrument(
        skip_all,
        fields(
            user = %payment.user_id,
            amount = %payment.amount.value(),
            currency = %payment.currency
        )
    )]
    pub async fn pay(&self, payment: CardPayment) -> Result<CardOutcome> {
        let request = IntentRequest {
            amount_minor: payment.amount.to_minor_units()?,
            currency: payment.currency.to_processor_code(),
            payment_method_id: payment.payment_method_id.clone(),
            return_url: self.return_url.clone(),
            metadata: BTreeMap::from([
                ("userId".to_string(), payment.user_id.to_string()),
                ("platform".to_string(), PLATFORM.to_string()),
            ]),
        };

        let intent = bounded(
            ExternalService::PaymentProcessor,
            self.call_timeout,
            self.processor.create_and_confirm_payment_intent(request),
        )
        .await?;
        info!(intent_id = %intent.id, status = ?intent.status, "Payment intent confirmed");

        let row = NewTransaction::card_payment(&payment, &intent);
        let transaction = bounded(
            ExternalService::Ledger,
            self.call_timeout,
            self.ledger.insert_transaction(row),
        )
        .await
        .map_err(|e| {
            error!(
                intent_id = %intent.id,
                error = %e,
                "Payment intent created but transaction record not written"
            );
            match e {
                PaymentError::PersistenceError(_) => e,
                other => PaymentError::PersistenceError(other.to_string()),
            }
        })?;
        info!(
            transaction_id = %transaction.id,
            status = ?transaction.status,
            "Card payment recorded"
        );

        Ok(CardOutcome {
            payment_intent: intent,
            transaction,
        })
    }
}
