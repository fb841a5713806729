//! Message types crossing the relay boundary.

use serde::{Deserialize, Serialize};

/// A user-highlighted text fragment plus page context — the unit of work
/// entering the relay. Immutable once constructed; only the latest selection
/// is retained in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Selected text, non-empty and trimmed.
    pub text: String,
    /// Page URL the selection came from.
    pub url: String,
    /// Page title.
    pub title: String,
    /// Capture time, epoch milliseconds.
    pub timestamp: i64,
}

impl Selection {
    /// Build a selection stamped with the current time. Text is trimmed here;
    /// callers are expected to have rejected empty text already.
    pub fn new(text: impl Into<String>, url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            text: text.into().trim().to_string(),
            url: url.into(),
            title: title.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Successful analysis of one selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    pub insights: Vec<String>,
}

/// Failed analysis of one selection. Carries no retry metadata — each
/// selection triggers at most one dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisError {
    pub message: String,
}

/// Inbound capture event, from a selection source to the relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum CaptureMessage {
    #[serde(rename = "TEXT_SELECTED")]
    TextSelected(Selection),
}

/// The tagged result of one selection's lifecycle, broadcast to observers.
/// Serializes directly to the outbound wire shape
/// `{"type": ..., "payload": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Outcome {
    #[serde(rename = "SELECTION_UPDATED")]
    SelectionUpdated(Selection),
    #[serde(rename = "ANALYSIS_RESULT")]
    AnalysisResult(AnalysisResult),
    #[serde(rename = "ANALYSIS_ERROR")]
    AnalysisError(AnalysisError),
}

impl Outcome {
    /// Wire tag for this outcome.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SelectionUpdated(_) => "SELECTION_UPDATED",
            Self::AnalysisResult(_) => "ANALYSIS_RESULT",
            Self::AnalysisError(_) => "ANALYSIS_ERROR",
        }
    }
}
