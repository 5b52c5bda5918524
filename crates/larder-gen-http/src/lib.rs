//! HTTP client for the external meal-plan generator.
//!
//! Implements [`larder_core::generate::PlanGenerator`] over a single JSON
//! POST. One attempt per call; retry policy belongs to the caller.

mod client;
pub mod error;
mod wire;

pub use client::{GeneratorConfig, HttpPlanGenerator};
pub use error::{Error, Result};
