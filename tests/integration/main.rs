//! Integration Tests
//!
//! The full stack: client, HTTP router, engine and both store backends.

#[path = "../common/mod.rs"]
mod common;

mod file_backend;
