use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of facility categories the lookup branch understands.
/// Hospital doubles as the fallback when no category keyword matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityCategory {
    Hospital,
    Pharmacy,
    Dentist,
    Doctor,
}

impl FacilityCategory {
    pub fn as_code(self) -> &'static str {
        match self {
            Self::Hospital => "hospital",
            Self::Pharmacy => "pharmacy",
            Self::Dentist => "dentist",
            Self::Doctor => "doctor",
        }
    }

    /// Human-facing name used in reply headers.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Hospital => "Hospital/Medical Center",
            Self::Pharmacy => "Pharmacy",
            Self::Dentist => "Dentist",
            Self::Doctor => "Medical Practice",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "hospital" | "clinic" | "er" => Some(Self::Hospital),
            "pharmacy" | "drugstore" => Some(Self::Pharmacy),
            "dentist" | "dental" => Some(Self::Dentist),
            "doctor" | "physician" | "gp" => Some(Self::Doctor),
            _ => None,
        }
    }
}

/// Outcome of the facility-intent stage for one utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FacilityIntent {
    /// The utterance is not asking for a facility at all.
    NotRequested,
    /// Facility request detected but no location could be extracted.
    NoLocation { category: FacilityCategory },
    /// "near me" and friends. The caller's position is unknowable to this
    /// system, so this branch asks for an explicit location instead of
    /// attempting a lookup.
    CurrentPosition { category: FacilityCategory },
    /// Facility request with a concrete free-text location.
    Explicit {
        location: String,
        category: FacilityCategory,
    },
}

/// One result from the place-search collaborator. Sourced externally,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityRecord {
    pub name: String,
    pub address: Option<String>,
    /// 0.0 means "no rating".
    pub rating: f64,
    pub rating_count: u32,
    pub open_now: Option<bool>,
    pub tags: Vec<String>,
}

impl FacilityRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
            rating: 0.0,
            rating_count: 0,
            open_now: None,
            tags: Vec::new(),
        }
    }
}

/// Which terminal branch of the turn state machine produced the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnBranch {
    Refused,
    FacilityResults,
    LocationNeeded,
    CurrentLocationPrompt,
    Generative,
    GenerativeFallback,
}

/// The single reply produced for one turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnReply {
    pub reply_text: String,
    pub branch: TurnBranch,
    /// Facility intent attached to the reply. Refused turns never reach
    /// intent extraction and carry `NotRequested` by convention.
    pub intent: FacilityIntent,
}

/// Raw chat input as delivered by the transport layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatInput {
    pub message: String,
    pub token: Option<String>,
}

/// Hash-only record of one exchange. The plaintext utterance and reply are
/// never retained after the turn completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggedInteraction {
    pub hashed_query: String,
    pub hashed_reply: String,
    pub recorded_at: DateTime<Utc>,
}
