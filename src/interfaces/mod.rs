//! Adapters between the lifecycle engine and the outside world.

pub mod csv;
pub mod webhook;
