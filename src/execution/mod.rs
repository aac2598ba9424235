//! Execution Engine Module
//!
//! Classifies and relocates documents in parallel. Each document is handled
//! by exactly one dispatch; dispatches share no mutable state, so the pool
//! needs no locks beyond the semaphore that bounds concurrency.

pub mod dispatcher;
pub mod pool;
pub mod relocate;

pub use dispatcher::*;
pub use pool::*;
pub use relocate::*;
