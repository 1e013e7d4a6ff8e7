//! Runtime settings and the wiring of adapters into services.

use crate::application::card::CardPaymentService;
use crate::application::transfer::BtnTransferService;
use crate::domain::money::UserId;
use crate::domain::ports::{ErrorReporterRef, LedgerRef, PaymentProcessorRef};
use crate::error::{PaymentError, Result};
use crate::infrastructure::in_memory::{InMemoryLedger, InMemoryPaymentProcessor};
use crate::infrastructure::stripe::StripeProcessor;
use crate::infrastructure::supabase::SupabaseLedger;
use crate::infrastructure::tracing_reporter::TracingErrorReporter;
use crate::interfaces::http::AppState;
use rust_decimal::Decimal;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Which collaborators back the service.
#[derive(Debug, Clone, PartialEq)]
pub enum Backend {
    /// Hosted Supabase ledger and Stripe processor.
    Remote {
        supabase_url: String,
        supabase_key: String,
        stripe_secret_key: String,
    },
    /// Process-local ledger and an always-confirming processor.
    InMemory { balances: Vec<(UserId, Decimal)> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub site_url: String,
    pub call_timeout: Duration,
    pub backend: Backend,
}

/// Raw, possibly incomplete values as collected from flags and environment.
#[derive(Debug, Clone, Default)]
pub struct RawSettings {
    pub bind_addr: String,
    pub site_url: String,
    pub call_timeout_ms: u64,
    pub in_memory: bool,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub stripe_secret_key: Option<String>,
    pub seed_balances: Vec<String>,
}

fn required(value: Option<String>, env: &str) -> Result<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| PaymentError::ConfigError(format!("{env} must be set")))
}

/// Parses a `user=amount` seed entry.
fn parse_seed(entry: &str) -> Result<(UserId, Decimal)> {
    let (user, amount) = entry.split_once('=').ok_or_else(|| {
        PaymentError::ConfigError(format!("seed balance {entry:?} is not user=amount"))
    })?;
    let amount = Decimal::from_str(amount.trim())
        .map_err(|e| PaymentError::ConfigError(format!("seed balance {entry:?}: {e}")))?;
    if amount < Decimal::ZERO {
        return Err(PaymentError::ConfigError(format!(
            "seed balance {entry:?} is negative"
        )));
    }
    let user = UserId::new(user.trim())
        .map_err(|e| PaymentError::ConfigError(format!("seed balance {entry:?}: {e}")))?;
    Ok((user, amount))
}

impl Settings {
    pub fn validate(raw: RawSettings) -> Result<Self> {
        let bind_addr = raw.bind_addr.parse::<SocketAddr>().map_err(|e| {
            PaymentError::ConfigError(format!("BIND_ADDR {:?}: {e}", raw.bind_addr))
        })?;

        if raw.call_timeout_ms == 0 {
            return Err(PaymentError::ConfigError(
                "EXTERNAL_CALL_TIMEOUT_MS must be greater than zero".to_string(),
            ));
        }

        let backend = if raw.in_memory {
            let balances = raw
                .seed_balances
                .iter()
                .map(|entry| parse_seed(entry))
                .collect::<Result<Vec<_>>>()?;
            Backend::InMemory { balances }
        } else {
            if !raw.seed_balances.is_empty() {
                return Err(PaymentError::ConfigError(
                    "seed balances need the in-memory backend".to_string(),
                ));
            }
            Backend::Remote {
                supabase_url: required(raw.supabase_url, "SUPABASE_URL")?,
                supabase_key: required(raw.supabase_key, "SUPABASE_SERVICE_ROLE_KEY")?,
                stripe_secret_key: required(raw.stripe_secret_key, "STRIPE_SECRET_KEY")?,
            }
        };

        Ok(Self {
            bind_addr,
            site_url: raw.site_url,
            call_timeout: Duration::from_millis(raw.call_timeout_ms),
            backend,
        })
    }

    /// Builds the adapters for the configured backend and injects them into
    /// the services.
    pub fn build_state(&self) -> Result<AppState> {
        let (ledger, processor): (LedgerRef, PaymentProcessorRef) = match &self.backend {
            Backend::Remote {
                supabase_url,
                supabase_key,
                stripe_secret_key,
            } => (
                Arc::new(SupabaseLedger::new(supabase_url.clone(), supabase_key.clone())?),
                Arc::new(StripeProcessor::new(stripe_secret_key.clone())?),
            ),
            Backend::InMemory { balances } => (
                Arc::new(InMemoryLedger::with_balances(balances.iter().cloned())),
                Arc::new(InMemoryPaymentProcessor::new()),
            ),
        };
        let reporter: ErrorReporterRef = Arc::new(TracingErrorReporter::new());

        Ok(AppState {
            transfers: Arc::new(BtnTransferService::new(ledger.clone(), self.call_timeout)),
            cards: Arc::new(CardPaymentService::new(
                processor,
                ledger,
                &self.site_url,
                self.call_timeout,
            )),
            errors: reporter,
        })
    }
}
