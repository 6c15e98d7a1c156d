use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

/// Counters for the turn pipeline's branch outcomes.
#[derive(Debug, Default)]
pub struct AppMetrics {
    turns_total: AtomicU64,
    refusals_total: AtomicU64,
    lookup_calls_total: AtomicU64,
    generative_calls_total: AtomicU64,
    generative_fallbacks_total: AtomicU64,
    validator_overrides_total: AtomicU64,
    total_latency_millis: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub turns_total: u64,
    pub refusals_total: u64,
    pub lookup_calls_total: u64,
    pub generative_calls_total: u64,
    pub generative_fallbacks_total: u64,
    pub validator_overrides_total: u64,
    pub avg_latency_millis: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_turn(&self) {
        self.turns_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_refusal(&self) {
        self.refusals_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_lookup_call(&self) {
        self.lookup_calls_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_generative_call(&self) {
        self.generative_calls_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_generative_fallback(&self) {
        self.generative_fallbacks_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_validator_override(&self) {
        self.validator_overrides_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let turns = self.turns_total.load(Ordering::Relaxed);
        let latency = self.total_latency_millis.load(Ordering::Relaxed);

        MetricsSnapshot {
            turns_total: turns,
            refusals_total: self.refusals_total.load(Ordering::Relaxed),
            lookup_calls_total: self.lookup_calls_total.load(Ordering::Relaxed),
            generative_calls_total: self.generative_calls_total.load(Ordering::Relaxed),
            generative_fallbacks_total: self.generative_fallbacks_total.load(Ordering::Relaxed),
            validator_overrides_total: self.validator_overrides_total.load(Ordering::Relaxed),
            avg_latency_millis: if turns == 0 {
                0.0
            } else {
                latency as f64 / turns as f64
            },
        }
    }
}

/// Installs the JSON subscriber once per process; later calls are no-ops so
/// the api and cli binaries can share the same entry point.
pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let default_directives = format!("info,{}=debug", service_name);
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directives));

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .init();
    });
}
