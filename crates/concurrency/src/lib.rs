//! Concurrency layer for docsync
//!
//! Writers never lock. Every mutation is a read-mutate-conditional-write
//! cycle, and the store rejects a write whose version token went stale.
//! This crate turns those rejections into bounded, paced re-runs:
//! - RetryConfig: attempt bound and linear backoff with a cap
//! - ConflictRetry: drives an operation until it succeeds, fails
//!   permanently, or runs out of attempts
//! - Sleeper: the pause between attempts, swappable in tests

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod retry;

pub use retry::{ConflictRetry, RetryConfig, Sleeper, TokioSleeper};
