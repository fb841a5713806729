//! Snapshot key names — matching what observer panels read for hydration.

pub const LAST_SELECTION: &str = "lastSelection";
pub const LAST_ANALYSIS: &str = "lastAnalysis";
pub const LAST_ANALYSIS_ERROR: &str = "lastAnalysisError";
pub const LAST_ANALYSIS_AT: &str = "lastAnalysisAt";

/// Every key an observer may read, write, or clear.
pub const ALL: &[&str] = &[
    LAST_SELECTION,
    LAST_ANALYSIS,
    LAST_ANALYSIS_ERROR,
    LAST_ANALYSIS_AT,
];
