//! Optional Ollama enrichment for the analyzer.
//!
//! If a local Ollama instance with at least one model is reachable, ask it for
//! a one-sentence summary and extra insights and merge them into the heuristic
//! result. Every failure here is appended as an insight, never surfaced as an
//! error: `/analyze` must always answer.

use std::time::Duration;

use insight_core::{Error, Result};
use insight_protocol::AnalysisResult;
use serde_json::json;
use tracing::{debug, warn};

/// Cap on the model-discovery probe, regardless of the configured timeout.
const TAGS_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Ollama connection settings.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    /// Explicit model; when unset, the first installed tag is used.
    pub model: Option<String>,
    pub timeout: Duration,
}

impl OllamaConfig {
    pub fn from_env() -> Self {
        let model = std::env::var("OLLAMA_MODEL")
            .ok()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());
        let timeout_s = std::env::var("OLLAMA_TIMEOUT_S")
            .ok()
            .and_then(|t| t.parse::<u64>().ok())
            .unwrap_or(60);
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            model,
            timeout: Duration::from_secs(timeout_s),
        }
    }
}

/// Run the enrichment pass. Mutates `result` in place on success; appends a
/// failure insight otherwise.
pub async fn enrich(
    client: &reqwest::Client,
    config: &OllamaConfig,
    text: &str,
    result: &mut AnalysisResult,
) {
    let Some(model) = pick_model(client, config).await else {
        debug!("No Ollama model available, skipping enrichment");
        return;
    };

    let prompt = format!(
        "You are an analyst. Given the text, produce:\n\
         1) One-sentence summary\n\
         2) 3-5 concise, data-driven insights (mention any numbers, entities, claims)\n\
         Return STRICT JSON with keys: summary (string), insights (array of strings).\n\n\
         TEXT:\n{}\n",
        text
    );

    match generate(client, config, &model, &prompt).await {
        Ok(output) => merge_output(&model, &output, result),
        Err(e) => {
            warn!("Ollama call failed: {}", e);
            result.insights.push(format!("Ollama call failed: {}", e));
        }
    }
}

/// Prefer the configured model; otherwise the first installed tag.
async fn pick_model(client: &reqwest::Client, config: &OllamaConfig) -> Option<String> {
    if let Some(model) = &config.model {
        return Some(model.clone());
    }

    let probe = config.timeout.min(TAGS_PROBE_TIMEOUT);
    let url = format!("{}/api/tags", config.base_url);
    let tags: serde_json::Value = client
        .get(&url)
        .timeout(probe)
        .send()
        .await
        .ok()?
        .json()
        .await
        .ok()?;

    tags["models"][0]["name"].as_str().map(String::from)
}

async fn generate(
    client: &reqwest::Client,
    config: &OllamaConfig,
    model: &str,
    prompt: &str,
) -> Result<String> {
    let url = format!("{}/api/generate", config.base_url);
    let response = client
        .post(&url)
        .timeout(config.timeout)
        .json(&json!({ "model": model, "prompt": prompt, "stream": false }))
        .send()
        .await
        .map_err(|e| Error::Backend(e.to_string()))?;

    if !response.status().is_success() {
        return Err(Error::Backend(format!(
            "ollama returned status {}",
            response.status()
        )));
    }

    let body: serde_json::Value = response
        .json()
        .await
        .map_err(|e| Error::Backend(e.to_string()))?;
    Ok(body["response"].as_str().unwrap_or_default().trim().to_string())
}

/// Merge model output into the heuristic result. Falls back to appending the
/// raw output when the model did not return usable JSON.
fn merge_output(model: &str, output: &str, result: &mut AnalysisResult) {
    match extract_json(output) {
        Some(parsed) => {
            if let Some(summary) = parsed["summary"].as_str() {
                let summary = summary.trim();
                if !summary.is_empty() {
                    result.summary = summary.to_string();
                }
            }
            match parsed["insights"].as_array() {
                Some(items) => {
                    for item in items {
                        if let Some(s) = item.as_str() {
                            let s = s.trim();
                            if !s.is_empty() {
                                result.insights.push(s.to_string());
                            }
                        }
                    }
                }
                None => result
                    .insights
                    .push(format!("Ollama ({}) output: {}", model, truncate(output, 400))),
            }
        }
        None => result
            .insights
            .push(format!("Ollama ({}) output: {}", model, truncate(output, 400))),
    }
}

/// Parse model output as JSON. Common failure: the model wraps JSON in prose,
/// so fall back to the first `{...}` block.
fn extract_json(s: &str) -> Option<serde_json::Value> {
    if let Ok(value) = serde_json::from_str(s) {
        return Some(value);
    }

    let start = s.find('{')?;
    let end = s.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&s[start..=end]).ok()
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_direct() {
        let value = extract_json(r#"{"summary": "S", "insights": ["a"]}"#).unwrap();
        assert_eq!(value["summary"], "S");
    }

    #[test]
    fn test_extract_json_wrapped_in_prose() {
        let value =
            extract_json(r#"Here you go: {"summary": "S", "insights": []} hope that helps!"#)
                .unwrap();
        assert_eq!(value["summary"], "S");
    }

    #[test]
    fn test_extract_json_garbage() {
        assert!(extract_json("no json here").is_none());
        assert!(extract_json("} backwards {").is_none());
    }

    #[test]
    fn test_merge_replaces_summary_and_appends_insights() {
        let mut result = AnalysisResult {
            summary: "heuristic".into(),
            insights: vec!["base".into()],
        };
        merge_output(
            "llama3",
            r#"{"summary": "Model summary", "insights": ["m1", "  ", "m2"]}"#,
            &mut result,
        );
        assert_eq!(result.summary, "Model summary");
        assert_eq!(result.insights, vec!["base", "m1", "m2"]);
    }

    #[test]
    fn test_merge_falls_back_to_raw_output() {
        let mut result = AnalysisResult {
            summary: "heuristic".into(),
            insights: vec![],
        };
        merge_output("llama3", "I cannot produce JSON today", &mut result);
        assert_eq!(result.summary, "heuristic");
        assert_eq!(
            result.insights,
            vec!["Ollama (llama3) output: I cannot produce JSON today"]
        );
    }
}
