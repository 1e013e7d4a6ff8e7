//! Domain types and the ports the application layer talks to.

pub mod money;
pub mod payment;
pub mod ports;
pub mod transaction;
