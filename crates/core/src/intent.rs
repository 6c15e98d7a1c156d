//! Facility-intent detection and slot extraction.
//!
//! This is a heuristic, not a parser. It can mis-extract when location words
//! coincide with stop-words or when several prepositions appear; that is an
//! accepted limitation of the keyword approach, and the behavior below is
//! the single deterministic variant we commit to and test.

use crate::models::{FacilityCategory, FacilityIntent};
use crate::vocab::{
    CATEGORY_GROUPS, FACILITY_INTENT_PHRASES, LOCATION_PREPOSITIONS, LOCATION_STOP_WORDS,
    NEAR_ME_PHRASES,
};

/// Detect a "find a healthcare facility" request and extract its category
/// and location slots.
pub fn extract(text: &str) -> FacilityIntent {
    let lower = text.to_lowercase();

    if !contains_any(&lower, FACILITY_INTENT_PHRASES) {
        return FacilityIntent::NotRequested;
    }

    let category = resolve_category(&lower);

    if contains_any(&lower, NEAR_ME_PHRASES) {
        return FacilityIntent::CurrentPosition { category };
    }

    if let Some(location) = location_after_preposition(text) {
        return FacilityIntent::Explicit { location, category };
    }

    if let Some(location) = city_state_pair(text) {
        return FacilityIntent::Explicit { location, category };
    }

    FacilityIntent::NoLocation { category }
}

/// Ordered keyword groups, first match wins. The specific facility types
/// (pharmacy, dentist) are checked before generic doctor terms that would
/// otherwise swallow them; urgent-care terms map to Hospital and specialist
/// terms to Doctor.
fn resolve_category(lower: &str) -> FacilityCategory {
    for (group, terms) in CATEGORY_GROUPS {
        if contains_any(lower, terms) {
            return match *group {
                "pharmacy" => FacilityCategory::Pharmacy,
                "dentist" => FacilityCategory::Dentist,
                "urgent" => FacilityCategory::Hospital,
                _ => FacilityCategory::Doctor,
            };
        }
    }

    FacilityCategory::Hospital
}

/// Scan tokens left to right; at each preposition from the fixed set,
/// collect up to the next three tokens as the location, stopping early at a
/// stop-word. The first preposition that yields at least one token wins.
fn location_after_preposition(text: &str) -> Option<String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();

    for (index, token) in tokens.iter().enumerate() {
        if !LOCATION_PREPOSITIONS
            .iter()
            .any(|prep| token.eq_ignore_ascii_case(prep))
        {
            continue;
        }

        let mut collected = Vec::new();
        for candidate in tokens.iter().skip(index + 1).take(3) {
            let lowered = candidate.to_lowercase();
            if LOCATION_STOP_WORDS.contains(&lowered.as_str()) {
                break;
            }
            collected.push(*candidate);
        }

        if !collected.is_empty() {
            let phrase = collected.join(" ");
            let trimmed = phrase.trim_end_matches(['.', ',', '!', '?']);
            return Some(trimmed.to_string());
        }
    }

    None
}

/// Fallback city/state heuristic over consecutive token pairs: a second
/// token shaped like a US state abbreviation (exactly two alphabetic
/// characters, uppercased in the result) keeps the pair; "city"/"county"
/// keeps the first token alone.
fn city_state_pair(text: &str) -> Option<String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();

    for pair in tokens.windows(2) {
        let next = pair[1].to_uppercase();
        if next.len() == 2 && next.chars().all(|c| c.is_ascii_alphabetic()) {
            return Some(format!("{} {}", pair[0], next));
        }
        if next == "CITY" || next == "COUNTY" {
            return Some(pair[0].to_string());
        }
    }

    None
}

fn contains_any(input: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| input.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_non_facility_queries() {
        assert_eq!(extract("What is diabetes?"), FacilityIntent::NotRequested);
        assert_eq!(
            extract("How much sleep do I need?"),
            FacilityIntent::NotRequested
        );
    }

    #[test]
    fn extracts_pharmacy_with_city() {
        assert_eq!(
            extract("find pharmacies in Chicago"),
            FacilityIntent::Explicit {
                location: "Chicago".to_string(),
                category: FacilityCategory::Pharmacy,
            }
        );
    }

    #[test]
    fn near_me_resolves_to_current_position() {
        assert_eq!(
            extract("I need a doctor near me"),
            FacilityIntent::CurrentPosition {
                category: FacilityCategory::Doctor,
            }
        );
    }

    #[test]
    fn facility_request_without_location() {
        assert_eq!(
            extract("looking for dentist options"),
            FacilityIntent::NoLocation {
                category: FacilityCategory::Dentist,
            }
        );
    }

    #[test]
    fn pharmacy_beats_doctor_when_both_present() {
        assert_eq!(
            extract("which pharmacy does my doctor recommend in Boston"),
            FacilityIntent::Explicit {
                location: "Boston".to_string(),
                category: FacilityCategory::Pharmacy,
            }
        );
    }

    #[test]
    fn urgent_care_maps_to_hospital() {
        assert_eq!(
            extract("urgent care in Austin"),
            FacilityIntent::Explicit {
                location: "Austin".to_string(),
                category: FacilityCategory::Hospital,
            }
        );
    }

    #[test]
    fn location_collection_stops_at_stop_word() {
        assert_eq!(
            extract("find a clinic in Springfield the cheap one"),
            FacilityIntent::Explicit {
                location: "Springfield".to_string(),
                category: FacilityCategory::Hospital,
            }
        );
    }

    #[test]
    fn trailing_punctuation_is_stripped() {
        assert_eq!(
            extract("find hospitals in New York!"),
            FacilityIntent::Explicit {
                location: "New York".to_string(),
                category: FacilityCategory::Hospital,
            }
        );
    }

    #[test]
    fn preposition_yielding_nothing_falls_through_to_the_next() {
        // "at" is immediately followed by a stop-word, so "near" supplies
        // the location instead.
        assert_eq!(
            extract("clinic at the corner near Elm Street"),
            FacilityIntent::Explicit {
                location: "Elm Street".to_string(),
                category: FacilityCategory::Hospital,
            }
        );
    }

    #[test]
    fn city_state_fallback_applies_without_preposition() {
        assert_eq!(
            extract("find hospitals Portland OR please"),
            FacilityIntent::Explicit {
                location: "Portland OR".to_string(),
                category: FacilityCategory::Hospital,
            }
        );
    }

    #[test]
    fn city_keyword_fallback_keeps_first_token() {
        assert_eq!(
            extract("doctors Kansas City"),
            FacilityIntent::Explicit {
                location: "Kansas".to_string(),
                category: FacilityCategory::Doctor,
            }
        );
    }
}
