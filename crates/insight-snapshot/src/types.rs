//! Snapshot types — matching the JSON surface observers hydrate from.

use insight_protocol::{AnalysisError, AnalysisResult, Selection};
use serde::{Deserialize, Serialize};

/// Full durable snapshot. Each field is independently nullable and
/// overwritable; last write wins, no history retained.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "lastSelection", skip_serializing_if = "Option::is_none")]
    pub last_selection: Option<Selection>,
    #[serde(rename = "lastAnalysis", skip_serializing_if = "Option::is_none")]
    pub last_analysis: Option<AnalysisResult>,
    #[serde(rename = "lastAnalysisError", skip_serializing_if = "Option::is_none")]
    pub last_analysis_error: Option<AnalysisError>,
    /// Epoch ms of the most recent analysis outcome (success or failure).
    #[serde(rename = "lastAnalysisAt", skip_serializing_if = "Option::is_none")]
    pub last_analysis_at: Option<i64>,
}
