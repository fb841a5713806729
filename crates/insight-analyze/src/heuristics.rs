//! Data-driven text heuristics: counts, keywords, structure signals, and a
//! tiered summary.

use std::collections::{HashMap, HashSet};

use insight_protocol::AnalysisResult;
use once_cell::sync::Lazy;
use regex::Regex;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9']+").unwrap());
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)https?://\S+").unwrap());
static SENTENCE_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+\s+").unwrap());

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "has", "have",
        "he", "her", "his", "i", "if", "in", "into", "is", "it", "its", "me", "my", "not", "of",
        "on", "or", "our", "she", "so", "that", "the", "their", "them", "then", "there", "these",
        "they", "this", "to", "was", "we", "were", "what", "when", "where", "which", "who",
        "will", "with", "you", "your",
    ]
    .into_iter()
    .collect()
});

fn tokenize(text: &str) -> Vec<String> {
    WORD_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Very lightweight sentence splitting; good enough for heuristics.
fn sentences(text: &str) -> Vec<&str> {
    SENTENCE_SPLIT_RE
        .split(text.trim())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Top keywords by frequency: stopwords and tokens shorter than 4 chars are
/// dropped; ties broken by first occurrence.
fn top_keywords(alpha_tokens: &[&String], limit: usize) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();
    for token in alpha_tokens {
        let t = token.as_str();
        if t.len() < 4 || STOPWORDS.contains(t) {
            continue;
        }
        if !counts.contains_key(t) {
            first_seen.push(t);
        }
        *counts.entry(t).or_insert(0) += 1;
    }

    let mut ranked: Vec<&str> = first_seen;
    ranked.sort_by_key(|t| std::cmp::Reverse(counts[t]));
    ranked.into_iter().take(limit).map(String::from).collect()
}

/// Analyze one text fragment. Always returns a result; short input just gets
/// a shallower one.
pub fn analyze_text(text: &str) -> AnalysisResult {
    let text = text.trim();
    let char_count = text.chars().count();

    let tokens = tokenize(text);
    let word_count = tokens.len();

    let sentence_count = sentences(text).len();

    let alpha_tokens: Vec<&String> = tokens
        .iter()
        .filter(|t| t.chars().any(|c| c.is_ascii_lowercase()))
        .collect();
    let unique_alpha: HashSet<&str> = alpha_tokens.iter().map(|t| t.as_str()).collect();

    let avg_word_len = if alpha_tokens.is_empty() {
        0.0
    } else {
        alpha_tokens.iter().map(|t| t.len()).sum::<usize>() as f64 / alpha_tokens.len() as f64
    };
    let lexical_diversity = if alpha_tokens.is_empty() {
        0.0
    } else {
        unique_alpha.len() as f64 / alpha_tokens.len() as f64
    };

    let keywords = top_keywords(&alpha_tokens, 5);

    let digit_token_count = tokens
        .iter()
        .filter(|t| t.chars().any(|c| c.is_ascii_digit()))
        .count();
    let question_count = text.matches('?').count();
    let url_count = URL_RE.find_iter(text).count();

    // ~200 wpm heuristic
    let reading_time_min = word_count as f64 / 200.0;

    let mut insights = vec![
        format!("Word count: {}", word_count),
        format!("Character count: {}", char_count),
    ];

    if sentence_count > 0 {
        insights.push(format!("Sentence count: {}", sentence_count));
        insights.push(format!(
            "Avg words/sentence: {:.1}",
            word_count as f64 / sentence_count as f64
        ));
    }

    if !alpha_tokens.is_empty() {
        insights.push(format!("Avg word length: {:.1} chars", avg_word_len));
        insights.push(format!(
            "Lexical diversity: {:.2} (unique/total)",
            lexical_diversity
        ));
    }

    if !keywords.is_empty() {
        insights.push(format!("Top keywords: {}", keywords.join(", ")));
    }

    if digit_token_count > 0 {
        insights.push(format!(
            "Contains {} token(s) with digits (potential data points).",
            digit_token_count
        ));
    }

    if url_count > 0 {
        insights.push(format!(
            "Contains {} URL(s) (may reference sources).",
            url_count
        ));
    }

    if question_count > 0 {
        insights.push(format!(
            "Contains {} question(s) — likely seeking an answer or decision.",
            question_count
        ));
    }

    if word_count > 0 {
        insights.push(format!(
            "Estimated reading time: {:.1} min (@200 wpm)",
            reading_time_min
        ));
    }

    // Tiered summary plus a next-best-action insight.
    let summary = if word_count <= 8 {
        insights.push(
            "This is short text; include a full paragraph for stronger, more reliable insights."
                .to_string(),
        );
        "Too little context for deep analysis"
    } else if word_count <= 60 {
        insights.push(
            "This is moderate-length text; insights focus on keywords, structure, and signals (numbers/questions/links)."
                .to_string(),
        );
        "Quick, data-driven snapshot"
    } else {
        insights.push(
            "This is longer text; next step is extracting claims, evidence, and a concise structured summary."
                .to_string(),
        );
        "Deeper signals detected"
    };

    AnalysisResult {
        summary: summary.to_string(),
        insights,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_and_char_counts() {
        let result = analyze_text("one two three");
        assert!(result.insights.contains(&"Word count: 3".to_string()));
        assert!(result.insights.contains(&"Character count: 13".to_string()));
    }

    #[test]
    fn test_short_text_tier() {
        let result = analyze_text("just a few words");
        assert_eq!(result.summary, "Too little context for deep analysis");
    }

    #[test]
    fn test_medium_text_tier() {
        let text = "The quarterly report shows revenue grew twelve percent year over year, \
                    driven primarily by subscription renewals and two new enterprise contracts \
                    signed in the final month of the quarter.";
        let result = analyze_text(text);
        assert_eq!(result.summary, "Quick, data-driven snapshot");
    }

    #[test]
    fn test_long_text_tier() {
        let sentence = "This sentence pads the selection with enough words to cross the bound. ";
        let result = analyze_text(&sentence.repeat(8));
        assert_eq!(result.summary, "Deeper signals detected");
    }

    #[test]
    fn test_keywords_drop_stopwords_and_short_tokens() {
        let result = analyze_text(
            "The database migration failed because the database schema changed and the \
             migration tool did not detect the schema change.",
        );
        let keywords = result
            .insights
            .iter()
            .find(|i| i.starts_with("Top keywords:"))
            .unwrap();
        assert!(keywords.contains("database"));
        assert!(keywords.contains("migration"));
        assert!(!keywords.contains("the"));
    }

    #[test]
    fn test_signal_insights() {
        let result =
            analyze_text("Is 42 the answer? See https://example.com for the long-form discussion.");
        assert!(result
            .insights
            .iter()
            .any(|i| i.contains("token(s) with digits")));
        assert!(result.insights.iter().any(|i| i.contains("1 URL(s)")));
        assert!(result.insights.iter().any(|i| i.contains("1 question(s)")));
    }

    #[test]
    fn test_empty_text() {
        let result = analyze_text("   ");
        assert_eq!(result.summary, "Too little context for deep analysis");
        assert!(result.insights.contains(&"Word count: 0".to_string()));
        // No reading time or sentence stats for empty input.
        assert!(!result.insights.iter().any(|i| i.contains("reading time")));
    }

    #[test]
    fn test_sentence_split() {
        assert_eq!(
            sentences("First point. Second point! Third?  "),
            // A trailing terminator without following text does not open a
            // new sentence.
            vec!["First point", "Second point", "Third?"]
        );
    }
}
