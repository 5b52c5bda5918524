//! Core types and trait definitions for the Larder household meal planner.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod feedback;
pub mod generate;
pub mod household;
pub mod pantry;
pub mod plan;
pub mod shopping;
pub mod stats;
pub mod store;

pub use error::{Error, Result};
