//! Application layer containing the lifecycle orchestration.
//!
//! This module defines the `LifecycleEngine`, the single entry point through
//! which orders and payments are created and moved through their state
//! machines. It owns the storage backends and serialises every mutation.

pub mod engine;
