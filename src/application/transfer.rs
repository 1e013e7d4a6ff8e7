use super::deadline::bounded;
use crate::domain::payment::BtnTransfer;
use crate::domain::ports::LedgerRef;
use crate::domain::transaction::{NewTransaction, TransactionRecord};
use crate::error::{ExternalService, PaymentError, Result};
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

/// Outcome of an accepted BTN transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferOutcome {
    pub transaction: TransactionRecord,
    /// Sender balance reported by the ledger after the movement.
    pub new_balance: Decimal,
}

/// Moves BTN between users through the ledger and records the result.
///
/// The balance read before the transfer only fails fast on obviously short
/// balances; the ledger's atomic transfer decides whether funds move.
/// Requests are not idempotent: submitting the same transfer twice moves
/// funds twice and writes two rows.
pub struct BtnTransferService {
    ledger: LedgerRef,
    call_timeout: Duration,
}

impl BtnTransferService {
    pub fn new(ledger: LedgerRef, call_timeout: Duration) -> Self {
        Self {
            ledger,
            call_timeout,
        }
    }

    #[instrument(
        skip_all,
        fields(
            from = %transfer.from_user_id,
            to = %transfer.to_user_id,
            amount = %transfer.amount.value()
        )
    )]
    pub async fn transfer(&self, transfer: BtnTransfer) -> Result<TransferOutcome> {
        let requested = transfer.amount.value();
        let available = bounded(
            ExternalService::Ledger,
            self.call_timeout,
            self.ledger.get_balance(&transfer.from_user_id),
        )
        .await?;

        match available {
            Some(balance) if balance >= requested => {
                debug!(%balance, "Balance pre-check passed");
            }
            other => {
                info!(balance = ?other, "Transfer rejected: insufficient balance");
                return Err(PaymentError::InsufficientFunds {
                    available: other.unwrap_or(Decimal::ZERO),
                    requested,
                });
            }
        }

        let receipt = bounded(
            ExternalService::Ledger,
            self.call_timeout,
            self.ledger.transfer_atomic(
                &transfer.from_user_id,
                &transfer.to_user_id,
                transfer.amount,
                transfer.description.as_deref(),
            ),
        )
        .await?;
        info!(
            transfer_id = %receipt.id,
            new_balance = %receipt.new_balance,
            "Ledger transfer applied"
        );

        let row = NewTransaction::btn_transfer(&transfer, &receipt);
        let transaction = bounded(
            ExternalService::Ledger,
            self.call_timeout,
            self.ledger.insert_transaction(row),
        )
        .await
        .map_err(|e| {
            // Funds have already moved; nothing here undoes that.
            error!(
                transfer_id = %receipt.id,
                error = %e,
                "Transfer applied but transaction record not written"
            );
            match e {
                PaymentError::PersistenceError(_) => e,
                other => PaymentError::PersistenceError(other.to_string()),
            }
        })?;
        info!(transaction_id = %transaction.id, "Transfer recorded");

        Ok(TransferOutcome {
            transaction,
            new_balance: receipt.new_balance,
        })
    }
}
