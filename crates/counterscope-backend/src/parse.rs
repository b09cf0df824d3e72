//! Lenient reply-to-label parsing
//!
//! The backend is prompted to lead every answer with its label, so the
//! parse is an order-sensitive, case-insensitive prefix match against
//! the fixed vocabulary. Anything else degrades to `Unknown` — never
//! an error — and the raw text is preserved upstream for audit.

use counterscope_core::SpeechLabel;

/// Parse a free-text backend reply into a speech label.
///
/// Leading whitespace is ignored; matching is case-insensitive on the
/// leading tokens only. "counter hate speech" is checked before "hate
/// speech" so the longer phrase wins.
pub fn parse_label(raw: &str) -> SpeechLabel {
    let lowered = raw.trim_start().to_lowercase();

    if lowered.starts_with("counter hate speech") {
        SpeechLabel::CounterHate
    } else if lowered.starts_with("hate speech") {
        SpeechLabel::Hate
    } else if lowered.starts_with("neutral speech") {
        SpeechLabel::Neutral
    } else {
        SpeechLabel::Unknown
    }
}
