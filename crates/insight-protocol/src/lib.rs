//! Wire protocol — selection payloads, analysis outcomes, channel messages.
//!
//! The tag strings (`TEXT_SELECTED`, `SELECTION_UPDATED`, `ANALYSIS_RESULT`,
//! `ANALYSIS_ERROR`) are contractual: they match what the capture surfaces and
//! observer panels already speak.

pub mod messages;

pub use messages::{AnalysisError, AnalysisResult, CaptureMessage, Outcome, Selection};
