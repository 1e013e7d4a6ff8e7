use crate::error::{ExternalService, PaymentError, Result};
use std::future::Future;
use std::time::Duration;

/// Awaits an external call, giving up after `limit`.
///
/// The inner future is dropped on expiry, which cancels the in-flight request.
pub async fn bounded<T, F>(service: ExternalService, limit: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(PaymentError::Timeout {
            service,
            elapsed_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}
