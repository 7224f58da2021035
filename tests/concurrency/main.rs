//! Concurrency Integration Tests
//!
//! Optimistic writes against both store backends: no lost updates, conflict
//! detection, bounded retry convergence and server-assigned sequence numbers.

#[path = "../common/mod.rs"]
mod common;

mod conflict_detection;
mod interleaving;
mod lost_update;
mod retry_convergence;
mod sequence_numbers;
