//! Static keyword vocabularies backing the gate, the intent extractor and
//! the response validator.
//!
//! Everything here is data, not logic: the tables are grouped so that unit
//! tests can check coverage and non-duplication independently of the
//! matching code. Matching is always case-insensitive substring matching,
//! so terms are stored lowercase.

/// The single fixed string returned whenever content is deemed out of scope.
pub const CANONICAL_REFUSAL: &str = "Sorry, I can only assist with healthcare-related queries.";

/// Admissibility vocabulary, grouped by topic area. A query is admissible
/// when at least one term from any group appears in it.
pub static ADMISSIBLE_GROUPS: &[(&str, &[&str])] = &[
    (
        "conditions",
        &[
            "symptom", "symptoms", "disease", "illness", "condition", "disorder", "syndrome",
            "infection", "virus", "bacteria", "cancer", "tumor", "diabetes", "hypertension",
            "asthma", "arthritis", "depression", "anxiety", "migraine", "headache", "fever",
            "pain", "ache", "injury", "wound", "fracture", "sprain", "strain", "allergy",
            "allergic", "rash", "eczema", "psoriasis", "pneumonia", "bronchitis", "flu",
            "cold", "cough", "sore throat", "nausea", "nauseous", "vomiting", "diarrhea",
            "constipation", "dizzy", "dizziness", "fatigue", "tired", "weakness", "weak",
            "swelling", "swollen", "inflammation", "bruise", "bleeding", "discharge",
            "breathe", "breathing", "breath", "shortness of breath", "faint", "fainting",
            "unconscious", "lightheaded", "blackout",
        ],
    ),
    (
        "anatomy",
        &[
            "heart", "lung", "liver", "kidney", "brain", "stomach", "intestine", "bone",
            "muscle", "joint", "skin", "eye", "nose", "throat", "chest", "back",
            "neck", "shoulder", "arm", "leg", "hand", "foot", "head", "abdomen", "pelvis",
        ],
    ),
    (
        "procedures",
        &[
            "treatment", "therapy", "surgery", "operation", "procedure", "examination",
            "diagnosis", "medical test", "screening", "vaccination", "vaccine", "immunization",
            "medication", "medicine", "drug", "prescription", "dosage", "antibiotic",
            "painkiller", "insulin", "chemotherapy", "radiation", "physical therapy",
            "rehabilitation", "recovery", "healing", "cure", "remedy",
        ],
    ),
    (
        "professionals_and_facilities",
        &[
            "doctor", "physician", "nurse", "surgeon", "specialist", "cardiologist",
            "dermatologist", "neurologist", "psychiatrist", "psychologist", "therapist",
            "pharmacist", "dentist", "optometrist", "hospital", "clinic", "emergency room",
            "pharmacy", "medical center", "healthcare", "health care",
        ],
    ),
    (
        "concepts",
        &[
            "medical", "clinical", "health", "healthy", "wellness", "fitness", "nutrition",
            "diet", "exercise", "sleep", "stress", "mental health", "physical health",
            "blood pressure", "heart rate", "body temperature", "weight", "bmi", "cholesterol",
            "glucose", "blood sugar", "immune system", "metabolism", "hormone", "vitamin",
            "mineral", "supplement", "side effect", "adverse reaction", "contraindication",
        ],
    ),
    (
        "emergency",
        &[
            "emergency", "urgent", "911", "ambulance", "first aid", "cpr", "choking",
            "seizure", "stroke", "heart attack", "overdose",
            "poisoning", "burn", "cut", "bite", "sting",
        ],
    ),
    (
        "preventive",
        &[
            "prevention", "preventive", "checkup", "annual exam", "mammogram",
            "colonoscopy", "pap smear", "blood work", "x-ray", "mri", "ct scan", "ultrasound",
            "hygiene", "handwashing", "sanitizer", "mask", "social distancing", "quarantine",
        ],
    ),
    (
        "womens_health",
        &[
            "pregnancy", "pregnant", "prenatal", "postnatal", "labor", "delivery", "birth",
            "contraception", "menstruation", "menopause", "gynecology", "obstetrics",
        ],
    ),
    (
        "mental_health",
        &[
            "counseling", "meditation", "mindfulness", "stress management",
            "mental wellness", "emotional health", "bipolar", "schizophrenia", "ptsd",
            "adhd", "autism", "eating disorder", "substance abuse", "addiction",
        ],
    ),
];

/// Iterator over every admissible term, flattening the groups.
pub fn admissible_terms() -> impl Iterator<Item = &'static str> {
    ADMISSIBLE_GROUPS
        .iter()
        .flat_map(|(_, terms)| terms.iter().copied())
}

/// Phrases that signal a facility-lookup intent.
pub static FACILITY_INTENT_PHRASES: &[&str] = &[
    "clinic", "hospital", "doctor", "physician", "medical center",
    "urgent care", "emergency room", "pharmacy", "pharmacies", "dentist",
    "find doctor", "find clinic", "find hospital", "find a clinic",
    "medical facility", "healthcare provider", "medical practice",
    "specialist", "health center", "walk-in clinic", "family doctor",
    "general practitioner", "gp", "medical office", "healthcare facility",
    "treatment center",
];

/// Ordered category keyword groups. First group with a match wins; the
/// specific facility types come before generic terms that would otherwise
/// swallow them. No match falls back to Hospital.
pub static CATEGORY_GROUPS: &[(&str, &[&str])] = &[
    ("pharmacy", &["pharmacy", "pharmacies", "drug store", "drugstore"]),
    ("dentist", &["dentist", "dental", "orthodontist"]),
    ("urgent", &["urgent care", "walk-in", "emergency"]),
    (
        "doctor",
        &["doctor", "physician", "gp", "general practitioner", "family doctor"],
    ),
    ("specialist", &["specialist", "cardiologist", "dermatologist"]),
];

/// Phrases that mean "at the caller's current position".
pub static NEAR_ME_PHRASES: &[&str] = &["near me", "nearby", "close to me", "in my area"];

/// Tokens that introduce a free-text location.
pub static LOCATION_PREPOSITIONS: &[&str] = &["in", "near", "around", "at"];

/// Tokens that end location collection when encountered.
pub static LOCATION_STOP_WORDS: &[&str] = &["me", "my", "area", "the"];

/// Markers showing the AI refused on its own; the reply is normalized to the
/// canonical refusal so model-specific phrasing never leaks to the caller.
pub static AI_REFUSAL_MARKERS: &[&str] = &[
    "sorry, i can only assist with healthcare-related queries",
    "i can only help with healthcare",
    "i'm designed to assist with healthcare",
    "please ask me about health",
];

/// Non-target domains whose mention in a "can't help with X" shape means the
/// AI slipped off topic.
pub static OFF_TOPIC_DOMAINS: &[&str] = &[
    "cooking", "weather", "entertainment", "technology", "travel", "sports",
    "politics", "finance",
];

/// Generic off-topic leakage markers checked after the per-domain patterns.
pub static LEAKAGE_MARKERS: &[&str] = &[
    "don't have information about",
    "dont have information about",
    "that's not related to healthcare",
    "thats not related to healthcare",
    "that's outside my healthcare expertise",
    "thats outside my healthcare expertise",
    "not a healthcare",
    "not healthcare-related",
    "outside of healthcare",
    "beyond healthcare",
    "unrelated to health",
    "not about health",
    "not medical",
];
