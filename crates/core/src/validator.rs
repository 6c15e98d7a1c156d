//! Second gate of the content filter: post-hoc validation of AI output.
//!
//! The generative call is instructed to stay in-domain, but instructions are
//! not guarantees. This pass replaces any reply that refused on its own or
//! leaked an off-topic apology with the single canonical refusal, so model
//! phrasing never reaches the caller.

use crate::vocab::{AI_REFUSAL_MARKERS, CANONICAL_REFUSAL, LEAKAGE_MARKERS, OFF_TOPIC_DOMAINS};

/// Validate AI-generated text. Returns the text unchanged when it passes;
/// returns the canonical refusal when the text is blank, echoes a refusal,
/// or shows signs of answering a non-healthcare topic. Pure; never calls
/// the generative backend.
pub fn validate(ai_text: &str) -> String {
    if ai_text.trim().is_empty() {
        return CANONICAL_REFUSAL.to_string();
    }

    let lower = ai_text.to_lowercase();

    if AI_REFUSAL_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return CANONICAL_REFUSAL.to_string();
    }

    for domain in OFF_TOPIC_DOMAINS {
        if lower.contains(&format!("can't help with {domain}"))
            || lower.contains(&format!("cant help with {domain}"))
        {
            return CANONICAL_REFUSAL.to_string();
        }
    }

    if LEAKAGE_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return CANONICAL_REFUSAL.to_string();
    }

    ai_text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_fails_safe() {
        assert_eq!(validate(""), CANONICAL_REFUSAL);
        assert_eq!(validate("   "), CANONICAL_REFUSAL);
    }

    #[test]
    fn ai_refusal_is_normalized_to_canonical() {
        assert_eq!(
            validate("Sorry, I can only assist with healthcare-related queries."),
            CANONICAL_REFUSAL
        );
        assert_eq!(
            validate("I'm designed to assist with HEALTHCARE topics only."),
            CANONICAL_REFUSAL
        );
    }

    #[test]
    fn topic_leakage_is_replaced() {
        assert_eq!(
            validate("I don't have information about cooking."),
            CANONICAL_REFUSAL
        );
        assert_eq!(
            validate("I can't help with weather forecasts."),
            CANONICAL_REFUSAL
        );
        assert_eq!(
            validate("That's not related to healthcare, sadly."),
            CANONICAL_REFUSAL
        );
    }

    #[test]
    fn healthy_reply_passes_unchanged() {
        let text = "Rest and drink fluids for your fever.";
        assert_eq!(validate(text), text);
    }

    #[test]
    fn validation_is_idempotent_on_the_canonical_refusal() {
        let once = validate(CANONICAL_REFUSAL);
        let twice = validate(&once);
        assert_eq!(once, CANONICAL_REFUSAL);
        assert_eq!(twice, CANONICAL_REFUSAL);
    }
}
