//! Pure reply builders: facility lookup results, location prompts and the
//! canned fallbacks used when the generative backend has nothing to say.
//! No I/O happens here; same input, same output.

use crate::models::{FacilityCategory, FacilityRecord};

const FACILITY_TAGS_SHOWN: usize = 2;

static SYMPTOM_HINTS: &[&str] = &["symptom", "symptoms", "feel", "pain", "ache", "hurt"];
static MEDICATION_HINTS: &[&str] = &["medication", "medicine", "drug", "prescription"];
static EMERGENCY_HINTS: &[&str] = &["emergency", "urgent", "911", "serious"];

/// Format a facility search outcome into the final reply text. An empty
/// record list (which is also what every lookup failure degrades to)
/// produces the apology-with-alternatives branch.
pub fn format_facility_reply(
    records: &[FacilityRecord],
    location: &str,
    category: FacilityCategory,
) -> String {
    if records.is_empty() {
        return format!(
            "I couldn't find any {}s near {}. You might want to try:\n\
             • Checking a map service such as Google Maps directly\n\
             • Contacting your insurance provider for in-network options\n\
             • Calling 211 for local healthcare resources",
            category.as_code(),
            location
        );
    }

    let mut parts = vec![
        format!(
            "🏥 **{}s near {}**\n",
            category.display_name(),
            title_case(location)
        ),
        format!("I found {} healthcare facilities for you:\n", records.len()),
    ];

    for (index, record) in records.iter().enumerate() {
        parts.push(format_record(index + 1, record));
    }

    parts.push(
        "💡 **Important Tips:**\n\
         • Call ahead to confirm hours and availability\n\
         • Check if they accept your insurance\n\
         • For emergencies, call 911 or go to the nearest ER"
            .to_string(),
    );

    parts.join("\n\n")
}

fn format_record(position: usize, record: &FacilityRecord) -> String {
    let mut lines = vec![format!("**{}. {}**", position, record.name)];

    if let Some(address) = record.address.as_deref() {
        lines.push(format!("   📍 **Address:** {}", address));
    }

    if record.rating > 0.0 {
        let stars = "⭐".repeat((record.rating as usize).min(5));
        let mut rating_line = format!("   {} **Rating:** {}/5.0", stars, record.rating);
        if record.rating_count > 0 {
            rating_line.push_str(&format!(" ({} reviews)", record.rating_count));
        }
        lines.push(rating_line);
    }

    if let Some(open_now) = record.open_now {
        let status = if open_now {
            "🟢 **Open now**"
        } else {
            "🔴 **Closed now**"
        };
        lines.push(format!("   {}", status));
    }

    let relevant_tags: Vec<String> = record
        .tags
        .iter()
        .filter(|tag| {
            matches!(
                tag.as_str(),
                "hospital" | "doctor" | "pharmacy" | "dentist" | "health"
            )
        })
        .take(FACILITY_TAGS_SHOWN)
        .map(|tag| title_case(&tag.replace('_', " ")))
        .collect();
    if !relevant_tags.is_empty() {
        lines.push(format!("   🏷️ **Type:** {}", relevant_tags.join(", ")));
    }

    lines.join("\n")
}

/// Prompt returned when a facility request carried no extractable location.
pub fn location_needed_prompt(category: FacilityCategory) -> String {
    let code = category.as_code();
    format!(
        "I understand you're looking for {code}s! 🏥\n\n\
         To help you find the best options, I need to know where you're \
         located. Please include a location in your request.\n\n\
         **Try asking like this:**\n\
         • 'Find {code}s in [your city]'\n\
         • 'Show me {code}s near [zip code]'\n\
         • 'I need a {code} in [city, state]'\n\n\
         What location would you like me to search?"
    )
}

/// Prompt for "near me" requests. The system has no device-geolocation
/// input, so the caller is asked for an explicit location instead.
pub fn current_location_prompt() -> String {
    "I'd be happy to help you find nearby healthcare facilities! 🏥\n\n\
     However, I need to know your location to provide accurate results. \
     Could you please tell me your city, zip code, or general area?\n\n\
     **Examples:**\n\
     • 'Find hospitals in Chicago'\n\
     • 'Show me clinics in 90210'\n\
     • 'I need a doctor in New York, NY'\n\
     • 'Find pharmacies in Los Angeles'\n\n\
     The more specific you are with the location, the better results I can \
     provide!"
        .to_string()
}

/// Canned reply used when the generative backend is unavailable or returned
/// nothing, chosen by keyword sniffing of the utterance so the turn is
/// always answerable.
pub fn fallback_reply(utterance: &str) -> String {
    let lower = utterance.to_lowercase();

    if contains_any(&lower, SYMPTOM_HINTS) {
        "I understand you're asking about symptoms. While I'd love to help with more \
         detailed information, I'm currently running in limited mode. For any health \
         concerns, please consult with a healthcare professional who can provide proper \
         evaluation and guidance."
            .to_string()
    } else if contains_any(&lower, MEDICATION_HINTS) {
        "I see you're asking about medications. For safety reasons and because I'm in \
         limited mode, please consult with your doctor or pharmacist for accurate \
         information about medications, dosages, and potential interactions."
            .to_string()
    } else if contains_any(&lower, EMERGENCY_HINTS) {
        "If this is a medical emergency, please call 911 or go to your nearest emergency \
         room immediately. For urgent but non-emergency concerns, contact your healthcare \
         provider or an urgent care center."
            .to_string()
    } else {
        "Thank you for your healthcare question. I'm currently running in limited mode \
         and cannot provide detailed medical information. Please consult with a qualified \
         healthcare professional for accurate medical advice and information."
            .to_string()
    }
}

/// Last-resort apology when even the validated generative reply is blank.
pub fn generation_trouble_apology() -> &'static str {
    "I apologize, but I'm having trouble generating a response right now. \
     Please try rephrasing your question or try again in a moment."
}

fn title_case(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn contains_any(input: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| input.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> FacilityRecord {
        FacilityRecord {
            name: "A Clinic".to_string(),
            address: Some("1 Main St".to_string()),
            rating: 4.5,
            rating_count: 10,
            open_now: Some(true),
            tags: vec!["doctor".to_string(), "health".to_string()],
        }
    }

    #[test]
    fn empty_results_name_category_location_and_alternatives() {
        let reply = format_facility_reply(&[], "Paris", FacilityCategory::Dentist);
        assert!(reply.contains("dentist"));
        assert!(reply.contains("Paris"));
        assert_eq!(reply.matches('•').count(), 3);
    }

    #[test]
    fn result_entry_shows_all_present_fields() {
        let reply = format_facility_reply(&[sample_record()], "Paris", FacilityCategory::Dentist);
        assert!(reply.contains("A Clinic"));
        assert!(reply.contains("1 Main St"));
        assert!(reply.contains("⭐⭐⭐⭐ **Rating:** 4.5/5.0"));
        assert!(reply.contains("(10 reviews)"));
        assert!(reply.contains("Open now"));
        assert!(reply.contains("Dentists near Paris"));
    }

    #[test]
    fn zero_rating_suppresses_star_line() {
        let mut record = sample_record();
        record.rating = 0.0;
        let reply = format_facility_reply(&[record], "Paris", FacilityCategory::Doctor);
        assert!(!reply.contains("Rating"));
    }

    #[test]
    fn unknown_open_state_suppresses_status_line() {
        let mut record = sample_record();
        record.open_now = None;
        let reply = format_facility_reply(&[record], "Paris", FacilityCategory::Doctor);
        assert!(!reply.contains("Open now"));
        assert!(!reply.contains("Closed now"));
    }

    #[test]
    fn record_order_is_preserved() {
        let records = vec![
            FacilityRecord::named("First"),
            FacilityRecord::named("Second"),
        ];
        let reply = format_facility_reply(&records, "Lyon", FacilityCategory::Hospital);
        let first = reply.find("First").unwrap();
        let second = reply.find("Second").unwrap();
        assert!(first < second);
        assert!(reply.contains("**1. First**"));
        assert!(reply.contains("**2. Second**"));
    }

    #[test]
    fn formatting_is_deterministic() {
        let records = vec![sample_record()];
        let a = format_facility_reply(&records, "Paris", FacilityCategory::Dentist);
        let b = format_facility_reply(&records, "Paris", FacilityCategory::Dentist);
        assert_eq!(a, b);
    }

    #[test]
    fn location_prompt_is_parameterized_by_category() {
        let prompt = location_needed_prompt(FacilityCategory::Pharmacy);
        assert!(prompt.contains("pharmacys") || prompt.contains("pharmacy"));
        assert!(prompt.contains("[your city]"));
    }

    #[test]
    fn fallback_reply_picks_a_matching_branch() {
        assert!(fallback_reply("my head hurts").contains("symptoms"));
        assert!(fallback_reply("what is this medication").contains("medications"));
        assert!(fallback_reply("this is urgent").contains("911"));
        assert!(fallback_reply("tell me about nutrition").contains("limited mode"));
    }
}
