use crate::domain::ports::ErrorReporter;
use crate::error::Result;
use async_trait::async_trait;
use tracing::warn;

/// Writes client error reports to the operational log.
#[derive(Default, Clone)]
pub struct TracingErrorReporter;

impl TracingErrorReporter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ErrorReporter for TracingErrorReporter {
    async fn report(&self, payload: serde_json::Value) -> Result<()> {
        let message = payload
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("<no message>");
        warn!(target: "client_errors", message, payload = %payload, "Client error reported");
        Ok(())
    }
}
