//! Domain model: orders, payments, pricing and the storage ports the
//! application layer depends on.

pub mod ids;
pub mod order;
pub mod payment;
pub mod ports;
pub mod pricing;
