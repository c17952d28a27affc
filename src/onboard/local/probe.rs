//! Reachability probe against an OpenAI-compatible `GET /models` listing.
//!
//! Every failure mode is folded into a [`PreflightOutcome`]; nothing here
//! returns an error to the caller.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub const PREFLIGHT_TIMEOUT: Duration = Duration::from_millis(3500);

/// Why a preflight attempt did not pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreflightFailure {
    /// Transport error, timeout, non-2xx status, or an unusable base URL.
    EndpointUnreachable,
    /// The server answered with a non-empty model list lacking the expected id.
    ModelNotListed,
}

impl PreflightFailure {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EndpointUnreachable => "endpoint-down",
            Self::ModelNotListed => "model-missing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreflightOutcome {
    Success,
    Failure(PreflightFailure),
}

impl PreflightOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Raw answer of a listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingResponse {
    pub status: u16,
    pub body: String,
}

/// Issues the listing GET. Errors mean "no HTTP response at all".
#[async_trait]
pub trait ModelListTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<ListingResponse>;
}

/// Production transport: plain unauthenticated GET via `reqwest`.
///
/// The client carries no timeout of its own; [`ModelProbe`] bounds every
/// request with its configured deadline.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("failed to build preflight HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ModelListTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<ListingResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("preflight request failed: GET {url}"))?;
        let status = response.status().as_u16();
        // An unreadable body is treated like an unparseable one.
        let body = response.text().await.unwrap_or_default();
        Ok(ListingResponse { status, body })
    }
}

/// `{base_url}/models` with exactly one separating slash.
pub fn models_endpoint(base_url: &str) -> Result<reqwest::Url> {
    let base = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{base_url}/")
    };
    let base =
        reqwest::Url::parse(&base).with_context(|| format!("invalid base URL: {base_url}"))?;
    base.join("models")
        .with_context(|| format!("failed to build models endpoint for {base_url}"))
}

/// Model ids from an OpenAI-style `{"data": [{"id": ...}]}` listing.
///
/// Any shape mismatch contributes nothing instead of failing: a missing or
/// non-array `data`, non-object entries, and missing, non-string or blank ids.
pub fn parse_model_ids(payload: &Value) -> Vec<String> {
    let Some(data) = payload.get("data").and_then(Value::as_array) else {
        return Vec::new();
    };

    data.iter()
        .filter_map(|entry| entry.get("id").and_then(Value::as_str))
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Decision rule on top of the collected ids. An empty list proves nothing,
/// so it passes.
pub fn classify_model_ids(ids: &[String], expected_model_id: &str) -> PreflightOutcome {
    if !ids.is_empty() && !ids.iter().any(|id| id == expected_model_id) {
        PreflightOutcome::Failure(PreflightFailure::ModelNotListed)
    } else {
        PreflightOutcome::Success
    }
}

/// Runs single preflight probes with a bounded timeout.
#[derive(Clone)]
pub struct ModelProbe {
    transport: Arc<dyn ModelListTransport>,
    timeout: Duration,
}

impl ModelProbe {
    pub fn new(transport: Arc<dyn ModelListTransport>) -> Self {
        Self {
            transport,
            timeout: PREFLIGHT_TIMEOUT,
        }
    }

    /// Probe backed by [`ReqwestTransport`].
    pub fn http() -> Result<Self> {
        Ok(Self::new(Arc::new(ReqwestTransport::new()?)))
    }

    /// Deadline for a whole listing exchange, connect through body.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn probe(&self, base_url: &str, expected_model_id: &str) -> PreflightOutcome {
        let unreachable = PreflightOutcome::Failure(PreflightFailure::EndpointUnreachable);

        let endpoint = match models_endpoint(base_url) {
            Ok(endpoint) => endpoint,
            Err(e) => {
                tracing::warn!(
                    base_url,
                    error = %e,
                    "Local preflight skipped: unusable base URL"
                );
                return unreachable;
            }
        };

        tracing::debug!(
            endpoint = %endpoint,
            expected_model_id,
            "Running local preflight probe"
        );

        let request = self.transport.get(endpoint.as_str());
        let response = match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::debug!(
                    endpoint = %endpoint,
                    error = %e,
                    "Local preflight request failed"
                );
                return unreachable;
            }
            Err(_) => {
                tracing::debug!(
                    endpoint = %endpoint,
                    timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                    "Local preflight request timed out"
                );
                return unreachable;
            }
        };

        if !(200..300).contains(&response.status) {
            tracing::debug!(
                endpoint = %endpoint,
                status = response.status,
                "Local preflight got non-success status"
            );
            return unreachable;
        }

        let payload: Value = serde_json::from_str(&response.body).unwrap_or(Value::Null);
        let ids = parse_model_ids(&payload);
        let outcome = classify_model_ids(&ids, expected_model_id);
        tracing::debug!(
            endpoint = %endpoint,
            listed_models = ids.len(),
            success = outcome.is_success(),
            "Local preflight response classified"
        );
        outcome
    }
}
