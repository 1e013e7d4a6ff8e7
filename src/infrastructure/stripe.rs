use crate::domain::payment::{IntentRequest, PaymentIntent};
use crate::domain::ports::PaymentProcessor;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

pub const STRIPE_API_BASE: &str = "https://api.stripe.com";

/// Card processor backed by the Stripe REST API.
#[derive(Clone)]
pub struct StripeProcessor {
    base: String,
    secret_key: String,
    client: Client,
}

#[derive(Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
    code: Option<String>,
}

impl StripeProcessor {
    pub fn new(secret_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(STRIPE_API_BASE, secret_key)
    }

    /// Points the client at a different API host (a proxy or a local fake).
    pub fn with_base_url(
        base_url: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| PaymentError::ConfigError(format!("HTTP client: {e}")))?;
        Ok(Self {
            base: base_url.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
            client,
        })
    }
}

/// Form body for a create-and-confirm call.
fn intent_form(request: &IntentRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("amount".to_string(), request.amount_minor.to_string()),
        ("currency".to_string(), request.currency.clone()),
        ("payment_method".to_string(), request.payment_method_id.clone()),
        ("confirm".to_string(), "true".to_string()),
        ("return_url".to_string(), request.return_url.clone()),
    ];
    form.extend(
        request
            .metadata
            .iter()
            .map(|(key, value)| (format!("metadata[{key}]"), value.clone())),
    );
    form
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<StripeErrorBody>(body) {
        Ok(StripeErrorBody { error }) => match (error.message, error.code) {
            (Some(message), Some(code)) => format!("{message} ({code})"),
            (Some(message), None) => message,
            (None, Some(code)) => code,
            (None, None) => "unknown error".to_string(),
        },
        Err(_) => body.to_string(),
    }
}

#[async_trait]
impl PaymentProcessor for StripeProcessor {
    async fn create_and_confirm_payment_intent(
        &self,
        request: IntentRequest,
    ) -> Result<PaymentIntent> {
        debug!(
            amount = request.amount_minor,
            currency = %request.currency,
            "Creating payment intent"
        );
        let resp = self
            .client
            .post(format!("{}/v1/payment_intents", self.base))
            .bearer_auth(&self.secret_key)
            .form(&intent_form(&request))
            .send()
            .await
            .map_err(|e| PaymentError::processor(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PaymentError::processor(format!(
                "{status}: {}",
                error_message(&body)
            )));
        }

        resp.json::<PaymentIntent>()
            .await
            .map_err(|e| PaymentError::processor(format!("unreadable payment intent: {e}")))
    }
}
