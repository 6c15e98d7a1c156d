//! First gate of the two-layer content filter: keyword admissibility.

use crate::vocab::{admissible_terms, CANONICAL_REFUSAL};

/// Returns true when the text contains at least one healthcare vocabulary
/// term as a case-insensitive substring. Empty or whitespace-only input is
/// rejected rather than raising.
///
/// Substring matching is a deliberate permissive choice: "headaches" matches
/// "headache", and mixed-topic queries are admitted. False positives are
/// acceptable because the generative branch carries its own topic-enforcing
/// instruction and a secondary validator.
pub fn is_admissible(text: &str) -> bool {
    if text.trim().is_empty() {
        return false;
    }

    let lower = text.to_lowercase();
    admissible_terms().any(|term| lower.contains(term))
}

/// The canonical refusal used whenever admissibility is false.
pub fn refusal_text() -> &'static str {
    CANONICAL_REFUSAL
}
