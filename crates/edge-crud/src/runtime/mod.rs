//! Runtime module - actor-based services hosted in-process
//!
//! - Actor utilities (command channels with oneshot replies)
//! - In-memory store used for local development and tests

pub mod actor;
pub mod memory;

pub use memory::MemoryStore;
