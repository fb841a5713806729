//! Insight Analyze — heuristic text analysis with optional model enrichment.
//!
//! Implements the `POST /analyze` contract: always produces a summary and a
//! list of insights, never fails. Heuristics are cheap and synchronous; the
//! optional Ollama pass replaces the summary and appends insights when a local
//! model is reachable.

pub mod heuristics;
pub mod ollama;

pub use heuristics::analyze_text;
pub use ollama::OllamaConfig;

use insight_protocol::AnalysisResult;

/// Full analysis: heuristics first, then best-effort model enrichment.
pub async fn analyze(
    client: &reqwest::Client,
    ollama: &OllamaConfig,
    text: &str,
) -> AnalysisResult {
    let mut result = heuristics::analyze_text(text);
    if !text.trim().is_empty() {
        ollama::enrich(client, ollama, text, &mut result).await;
    }
    result
}
