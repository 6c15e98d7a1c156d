pub mod filter;
pub mod formatter;
pub mod intent;
pub mod models;
pub mod validator;
pub mod vocab;

pub use filter::{is_admissible, refusal_text};
pub use formatter::{
    current_location_prompt, fallback_reply, format_facility_reply, generation_trouble_apology,
    location_needed_prompt,
};
pub use intent::extract;
pub use models::*;
pub use validator::validate;
pub use vocab::CANONICAL_REFUSAL;
