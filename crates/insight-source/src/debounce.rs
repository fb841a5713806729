//! Duplicate-capture suppression.

use std::time::{Duration, Instant};

/// Suppresses a capture when its text is byte-identical to the previously
/// sent one and the elapsed time since that send is under the window.
/// Idempotent on the immediate duplicate mouse events browsers produce.
pub struct Debounce {
    window: Duration,
    last_sent: Option<(String, Instant)>,
}

impl Debounce {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_sent: None,
        }
    }

    /// Whether a capture with this text should be forwarded now.
    pub fn admit(&self, text: &str, now: Instant) -> bool {
        match &self.last_sent {
            Some((last_text, sent_at)) => {
                last_text != text || now.duration_since(*sent_at) >= self.window
            }
            None => true,
        }
    }

    /// Record a successful send. Only sent selections participate in
    /// suppression; a failed send leaves the previous record in place.
    pub fn record(&mut self, text: &str, sent_at: Instant) {
        self.last_sent = Some((text.to_string(), sent_at));
    }
}
