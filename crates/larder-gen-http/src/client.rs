//! Async HTTP client for the external plan-generation service.

use std::time::Duration;

use larder_core::generate::{GeneratedPlan, GenerationRequest, PlanGenerator};
use reqwest::Client;

use crate::{
  wire::{WireGeneratedPlan, WireRequest},
  Error, Result,
};

/// Connection settings for the generator service.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
  /// Full URL of the generation endpoint.
  pub endpoint:     String,
  /// Bearer token sent on every request when set.
  pub bearer_token: Option<String>,
  /// Per-request timeout. Generation is slow; 30 s by default.
  pub timeout:      Duration,
}

impl GeneratorConfig {
  pub fn new(endpoint: impl Into<String>) -> Self {
    Self {
      endpoint:     endpoint.into(),
      bearer_token: None,
      timeout:      Duration::from_secs(30),
    }
  }
}

/// Plan generator backed by a remote HTTP service.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpPlanGenerator {
  client: Client,
  config: GeneratorConfig,
}

impl HttpPlanGenerator {
  pub fn new(config: GeneratorConfig) -> Result<Self> {
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, config })
  }

  fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    match &self.config.bearer_token {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }
}

impl PlanGenerator for HttpPlanGenerator {
  type Error = Error;

  async fn generate(&self, request: GenerationRequest) -> Result<GeneratedPlan> {
    let wire = WireRequest::from(&request);
    tracing::debug!(
      household_id = %request.household_id,
      week_start = %request.week_start,
      household_size = request.household_size,
      "requesting plan generation"
    );

    let resp = self
      .auth(self.client.post(&self.config.endpoint))
      .json(&wire)
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::Status {
        status,
        body: excerpt(&body),
      });
    }

    let body = resp.bytes().await?;
    let parsed: WireGeneratedPlan = serde_json::from_slice(&body)?;
    let plan = parsed.into_plan()?;
    tracing::debug!(meals = plan.meals.len(), "generator returned a plan");
    Ok(plan)
  }
}

/// Trim an error body down to a log-friendly size.
fn excerpt(body: &str) -> String {
  const MAX: usize = 300;
  let trimmed = body.trim();
  if trimmed.len() <= MAX {
    return trimmed.to_string();
  }
  let mut cut = MAX;
  while !trimmed.is_char_boundary(cut) {
    cut -= 1;
  }
  format!("{}...", &trimmed[..cut])
}
