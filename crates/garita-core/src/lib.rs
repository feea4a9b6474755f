//! Core types and trait definitions for the Garita visitor registry.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod dashboard;
pub mod error;
pub mod hierarchy;
pub mod store;
pub mod validate;
pub mod visit;
pub mod visitor;

pub use error::{Error, Result};
