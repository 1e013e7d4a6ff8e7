//! Application layer containing the payment intake orchestration.
//!
//! `BtnTransferService` and `CardPaymentService` each run one request end to
//! end: validate, call the external collaborator, record the outcome. Every
//! external call is bounded by a timeout.

pub mod card;
pub mod deadline;
pub mod transfer;
