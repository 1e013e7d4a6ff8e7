use crate::domain::money::{Amount, UserId};
use crate::domain::payment::TransferReceipt;
use crate::domain::ports::Ledger;
use crate::domain::transaction::{NewTransaction, TransactionRecord};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Table holding one BTN balance row per user.
pub const BALANCES_TABLE: &str = "btn_balances";
/// Table receiving transaction rows.
pub const TRANSACTIONS_TABLE: &str = "transactions";
/// Database function that moves BTN atomically.
pub const TRANSFER_RPC: &str = "transfer_btn";

/// Ledger backed by a Supabase project, reached through its PostgREST API.
///
/// Authenticates with the service-role key, so row-level security does not
/// apply to calls made from here.
#[derive(Clone)]
pub struct SupabaseLedger {
    base: String,
    service_key: String,
    client: Client,
}

#[derive(Deserialize)]
struct BalanceRow {
    #[serde(with = "rust_decimal::serde::float")]
    balance: Decimal,
}

#[derive(Serialize)]
struct TransferArgs<'a> {
    from_user_id: &'a str,
    to_user_id: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    description: Option<&'a str>,
}

/// PostgREST answers with a bare object or a one-element array depending on
/// how the function or `Prefer` header is declared.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_first(self) -> Option<T> {
        match self {
            OneOrMany::One(value) => Some(value),
            OneOrMany::Many(values) => values.into_iter().next(),
        }
    }
}

impl SupabaseLedger {
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| PaymentError::ConfigError(format!("HTTP client: {e}")))?;
        Ok(Self {
            base: base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
            client,
        })
    }

    fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.base, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.rest_url(path))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }
}

async fn read_json<T: DeserializeOwned>(
    resp: Response,
    op: &str,
) -> std::result::Result<T, String> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(format!("{op} failed with {status}: {body}"));
    }
    resp.json::<T>()
        .await
        .map_err(|e| format!("{op} returned an unreadable body: {e}"))
}

#[async_trait]
impl Ledger for SupabaseLedger {
    async fn get_balance(&self, user_id: &UserId) -> Result<Option<Decimal>> {
        let resp = self
            .request(Method::GET, BALANCES_TABLE)
            .query(&[
                ("select", "balance".to_string()),
                ("user_id", format!("eq.{user_id}")),
            ])
            .send()
            .await
            .map_err(|e| PaymentError::ledger(e.to_string()))?;

        let rows: Vec<BalanceRow> = read_json(resp, "balance lookup")
            .await
            .map_err(PaymentError::ledger)?;
        Ok(rows.into_iter().next().map(|row| row.balance))
    }

    async fn transfer_atomic(
        &self,
        from: &UserId,
        to: &UserId,
        amount: Amount,
        description: Option<&str>,
    ) -> Result<TransferReceipt> {
        let args = TransferArgs {
            from_user_id: from.as_str(),
            to_user_id: to.as_str(),
            amount: amount.value(),
            description,
        };
        debug!(rpc = TRANSFER_RPC, from = %from, to = %to, "Calling ledger transfer");

        let resp = self
            .request(Method::POST, &format!("rpc/{TRANSFER_RPC}"))
            .json(&args)
            .send()
            .await
            .map_err(|e| PaymentError::ledger(e.to_string()))?;

        read_json::<OneOrMany<TransferReceipt>>(resp, TRANSFER_RPC)
            .await
            .map_err(PaymentError::ledger)?
            .into_first()
            .ok_or_else(|| PaymentError::ledger(format!("{TRANSFER_RPC} returned no receipt")))
    }

    async fn insert_transaction(&self, tx: NewTransaction) -> Result<TransactionRecord> {
        let resp = self
            .request(Method::POST, TRANSACTIONS_TABLE)
            .header("Prefer", "return=representation")
            .json(&tx)
            .send()
            .await
            .map_err(|e| PaymentError::PersistenceError(e.to_string()))?;

        read_json::<OneOrMany<TransactionRecord>>(resp, "transaction insert")
            .await
            .map_err(PaymentError::PersistenceError)?
            .into_first()
            .ok_or_else(|| {
                PaymentError::PersistenceError("transaction insert returned no row".to_string())
            })
    }
}
