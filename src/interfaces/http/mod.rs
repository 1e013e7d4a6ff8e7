//! HTTP surface of the payment intake service.
//!
//! | Endpoint | Method |
//! |----------|--------|
//! | `/api/payments/btn` | POST |
//! | `/api/payments/stripe` | POST |
//! | `/api/errors` | POST |
//! | `/health` | GET |

pub mod dto;
pub mod handlers;

use crate::application::card::CardPaymentService;
use crate::application::transfer::BtnTransferService;
use crate::domain::ports::ErrorReporterRef;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

const BODY_LIMIT: usize = 64 * 1024;

/// Services shared by every request. Cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub transfers: Arc<BtnTransferService>,
    pub cards: Arc<CardPaymentService>,
    pub errors: ErrorReporterRef,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/payments/btn", post(handlers::btn_payment))
        .route("/api/payments/stripe", post(handlers::stripe_payment))
        .route("/api/errors", post(handlers::report_error))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the router on `listener` until `shutdown` resolves.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    state: AppState,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Payment intake listening");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
