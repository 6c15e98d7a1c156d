//! The turn orchestrator: one utterance in, one reply out.
//!
//! Every utterance walks the same ladder: admissibility gate, facility
//! intent, then either a lookup-and-format branch, a location prompt, or
//! the generative branch with its validator and canned fallbacks. The turn
//! never fails outward; collaborator trouble degrades into a canned reply.

pub mod hashing;

use std::sync::Arc;
use std::time::Instant;

use care_core::{
    current_location_prompt, extract, fallback_reply, format_facility_reply,
    generation_trouble_apology, is_admissible, location_needed_prompt, refusal_text, validate,
    ChatInput, FacilityIntent, TurnBranch, TurnReply,
};
use care_genai::ReplyGenerator;
use care_lookup::FacilitySearch;
use care_observability::AppMetrics;
use care_storage::InteractionLogRepository;
use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::hashing::hash_for_logging;

#[derive(Clone)]
pub struct ChatTurnAgent<S, F, G>
where
    S: InteractionLogRepository,
    F: FacilitySearch,
    G: ReplyGenerator,
{
    store: Arc<S>,
    search: Arc<F>,
    generator: Arc<G>,
    metrics: Arc<AppMetrics>,
    log_secret: Option<String>,
}

impl<S, F, G> ChatTurnAgent<S, F, G>
where
    S: InteractionLogRepository,
    F: FacilitySearch,
    G: ReplyGenerator,
{
    pub fn new(
        store: Arc<S>,
        search: Arc<F>,
        generator: Arc<G>,
        metrics: Arc<AppMetrics>,
        log_secret: Option<String>,
    ) -> Self {
        Self {
            store,
            search,
            generator,
            metrics,
            log_secret: log_secret.filter(|value| !value.trim().is_empty()),
        }
    }

    #[instrument(skip(self, input))]
    pub async fn handle_turn(&self, input: ChatInput) -> TurnReply {
        let started = Instant::now();
        self.metrics.inc_turn();

        let message = input.message.trim();
        let reply = if is_admissible(message) {
            self.answer_admissible(message).await
        } else {
            self.metrics.inc_refusal();
            TurnReply {
                reply_text: refusal_text().to_string(),
                branch: TurnBranch::Refused,
                intent: FacilityIntent::NotRequested,
            }
        };

        self.persist_hashes(message, &reply.reply_text).await;

        self.metrics.observe_latency(started.elapsed());
        info!(branch = ?reply.branch, "turn handled");
        reply
    }

    async fn answer_admissible(&self, message: &str) -> TurnReply {
        let intent = extract(message);
        match intent.clone() {
            FacilityIntent::Explicit { location, category } => {
                self.metrics.inc_lookup_call();
                let records = self.search.find_facilities(&location, category).await;
                TurnReply {
                    reply_text: format_facility_reply(&records, &location, category),
                    branch: TurnBranch::FacilityResults,
                    intent,
                }
            }
            FacilityIntent::NoLocation { category } => TurnReply {
                reply_text: location_needed_prompt(category),
                branch: TurnBranch::LocationNeeded,
                intent,
            },
            FacilityIntent::CurrentPosition { .. } => TurnReply {
                reply_text: current_location_prompt(),
                branch: TurnBranch::CurrentLocationPrompt,
                intent,
            },
            FacilityIntent::NotRequested => self.answer_generative(message, intent).await,
        }
    }

    async fn answer_generative(&self, message: &str, intent: FacilityIntent) -> TurnReply {
        self.metrics.inc_generative_call();

        match self.generator.generate(message).await {
            Some(text) => {
                let validated = validate(&text);
                if validated != text {
                    self.metrics.inc_validator_override();
                }
                let reply_text = if validated.trim().is_empty() {
                    generation_trouble_apology().to_string()
                } else {
                    validated
                };
                TurnReply {
                    reply_text,
                    branch: TurnBranch::Generative,
                    intent,
                }
            }
            None => {
                self.metrics.inc_generative_fallback();
                TurnReply {
                    reply_text: fallback_reply(message),
                    branch: TurnBranch::GenerativeFallback,
                    intent,
                }
            }
        }
    }

    /// Best-effort hash-only logging. A failed write is the one fault the
    /// turn survives silently toward the caller; it still leaves a trace in
    /// the service log.
    async fn persist_hashes(&self, utterance: &str, reply_text: &str) {
        let secret = self.log_secret.as_deref();
        let hashed_query = hash_for_logging(utterance, secret);
        let hashed_reply = hash_for_logging(reply_text, secret);

        if let Err(error) = self
            .store
            .record_interaction(&hashed_query, &hashed_reply, Utc::now())
            .await
        {
            warn!(error = %error, "interaction log write failed");
        }
    }
}
