//! Error types for the generator client.

use thiserror::Error;

/// Everything that can go wrong talking to the generator. To callers each
/// variant means "generation failed"; the split exists so logs can tell
/// transport trouble from a bad payload.
#[derive(Debug, Error)]
pub enum Error {
  /// The request never completed (connect, timeout, TLS).
  #[error("generator request failed: {0}")]
  Http(#[from] reqwest::Error),

  /// The generator answered with a non-success status.
  #[error("generator returned {status}: {body}")]
  Status {
    status: reqwest::StatusCode,
    body:   String,
  },

  /// The response body was not the JSON shape we expect.
  #[error("generator response was not valid JSON: {0}")]
  Json(#[from] serde_json::Error),

  /// The response parsed but carried invalid content.
  #[error("generator response malformed: {0}")]
  Malformed(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
