//! Analysis dispatcher — one bounded, cancellable backend call per selection.

use std::time::Duration;

use insight_core::{Error, Result};
use insight_protocol::{AnalysisError, AnalysisResult, Outcome, Selection};
use serde_json::json;
use tracing::{debug, warn};

/// User-visible failure message. Intentionally generic: connection refused,
/// non-2xx, and timeout are not distinguished.
pub const BACKEND_UNAVAILABLE_MSG: &str = "Backend not running or request timed out";

/// Issues `POST {backend_url}` with `{"text": ...}` for each selection.
///
/// Each dispatch owns its own timeout; cancelling one has no effect on others.
/// Exactly one `Outcome` is produced per dispatch — the timeout is dropped on
/// completion and the in-flight request is dropped on expiry, so neither side
/// can fire after the outcome exists.
pub struct AnalysisDispatcher {
    client: reqwest::Client,
    backend_url: String,
    timeout: Duration,
}

impl AnalysisDispatcher {
    pub fn new(backend_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            backend_url: backend_url.into(),
            timeout,
        }
    }

    /// Dispatch one selection. Never fails — backend trouble of any kind is
    /// normalized into `Outcome::AnalysisError`.
    pub async fn dispatch(&self, selection: &Selection) -> Outcome {
        match tokio::time::timeout(self.timeout, self.request(selection)).await {
            Ok(Ok(result)) => {
                debug!(
                    "Analysis succeeded: {} insight(s) for {} chars",
                    result.insights.len(),
                    selection.text.len()
                );
                Outcome::AnalysisResult(result)
            }
            Ok(Err(e)) => {
                warn!("Analysis request failed: {}", e);
                Outcome::AnalysisError(AnalysisError {
                    message: BACKEND_UNAVAILABLE_MSG.to_string(),
                })
            }
            Err(_) => {
                warn!(
                    "Analysis request timed out after {:?} ({})",
                    self.timeout, self.backend_url
                );
                Outcome::AnalysisError(AnalysisError {
                    message: BACKEND_UNAVAILABLE_MSG.to_string(),
                })
            }
        }
    }

    async fn request(&self, selection: &Selection) -> Result<AnalysisResult> {
        let response = self
            .client
            .post(&self.backend_url)
            .json(&json!({ "text": selection.text }))
            .send()
            .await
            .map_err(|e| Error::Backend(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Backend(format!(
                "backend returned status {}",
                response.status()
            )));
        }

        response
            .json::<AnalysisResult>()
            .await
            .map_err(|e| Error::Backend(format!("malformed analysis body: {}", e)))
    }
}
