//! HTTP surface for the concierge: login/logout with demo credentials, the
//! chat endpoint, and a health probe exposing the metrics snapshot.

pub mod rate_limit;

use std::collections::{HashMap, HashSet};
use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::extract::{Json, State};
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{body::Body, Router};
use care_agents::ChatTurnAgent;
use care_core::ChatInput;
use care_genai::Generator;
use care_lookup::Search;
use care_observability::AppMetrics;
use care_storage::Store;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rand::{thread_rng, RngCore};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::rate_limit::IpRateLimiter;

const MAX_MESSAGE_LEN: usize = 1000;
const MIN_PASSWORD_LEN: usize = 3;
const SESSION_TOKEN_LEN: usize = 32;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

static SUSPICIOUS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"(?is)<script[^>]*>.*?</script>", r"(?i)javascript:", r"(?i)on\w+\s*="]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("valid injection regex"))
        .collect()
});

#[derive(Clone)]
pub struct ApiState {
    pub agent: Arc<ChatTurnAgent<Store, Search, Generator>>,
    pub metrics: Arc<AppMetrics>,
    pub demo_credentials: Arc<HashMap<String, String>>,
    pub active_tokens: Arc<RwLock<HashSet<String>>>,
    pub limiter: IpRateLimiter,
    pub auth_limiter: IpRateLimiter,
    pub allowed_origins: Arc<Vec<String>>,
    pub lookup_enabled: bool,
    pub generative_enabled: bool,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    metrics: care_observability::MetricsSnapshot,
    capabilities: HealthCapabilities,
}

#[derive(Debug, Serialize)]
struct HealthCapabilities {
    facility_lookup: bool,
    generative: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    token: String,
    message: &'static str,
}

#[derive(Debug, Clone, Deserialize)]
struct LogoutRequest {
    token: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatRequest {
    message: String,
    token: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    reply: String,
}

pub async fn build_app() -> Result<Router> {
    let metrics = AppMetrics::shared();

    let store = if let Ok(database_url) = env::var("CARE_DATABASE_URL") {
        Store::sqlite(&database_url).await?
    } else {
        Store::memory()
    };

    let search = Search::from_api_key(env::var("GOOGLE_MAPS_API_KEY").ok())?;
    let generator = Generator::from_api_key(env::var("OPENAI_API_KEY").ok())?;
    let lookup_enabled = matches!(search, Search::Google(_));
    let generative_enabled = matches!(generator, Generator::OpenAi(_));

    let agent = Arc::new(ChatTurnAgent::new(
        Arc::new(store),
        Arc::new(search),
        Arc::new(generator),
        metrics.clone(),
        env::var("CARE_LOG_SECRET").ok(),
    ));

    let api_rate_limit_window = Duration::from_secs(
        env::var("CARE_API_RATE_LIMIT_WINDOW_SECONDS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(60),
    );
    let api_rate_limit_max = env::var("CARE_API_RATE_LIMIT_MAX")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(80);
    let auth_rate_limit_window = Duration::from_secs(
        env::var("CARE_AUTH_RATE_LIMIT_WINDOW_SECONDS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(60),
    );
    let auth_rate_limit_max = env::var("CARE_AUTH_RATE_LIMIT_MAX")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(12);

    let state = ApiState {
        agent,
        metrics,
        demo_credentials: Arc::new(parse_demo_credentials()),
        active_tokens: Arc::new(RwLock::new(HashSet::new())),
        limiter: IpRateLimiter::new(api_rate_limit_window, api_rate_limit_max),
        auth_limiter: IpRateLimiter::new(auth_rate_limit_window, auth_rate_limit_max),
        allowed_origins: Arc::new(parse_allowed_origins()),
        lookup_enabled,
        generative_enabled,
    };

    Ok(build_router(state))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/chat", post(chat))
        .layer(build_cors_layer(&state.allowed_origins))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyLimitLayer::new(64 * 1024))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        metrics: state.metrics.snapshot(),
        capabilities: HealthCapabilities {
            facility_lookup: state.lookup_enabled,
            generative: state.generative_enabled,
        },
    };
    (StatusCode::OK, Json(payload))
}

async fn login(State(state): State<ApiState>, Json(input): Json<LoginRequest>) -> Response {
    let email = input.email.trim().to_lowercase();
    let password = input.password.trim();

    if email.is_empty() {
        return bad_request("email_required", "Email address is required");
    }
    if !EMAIL_PATTERN.is_match(&email) {
        return bad_request("invalid_email", "Please enter a valid email address");
    }
    if password.is_empty() {
        return bad_request("password_required", "Password is required");
    }
    if password.len() < MIN_PASSWORD_LEN {
        return bad_request(
            "password_too_short",
            "Password must be at least 3 characters long",
        );
    }

    if state.demo_credentials.get(&email).map(String::as_str) != Some(password) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "error": "invalid_credentials",
                "message": "Invalid email or password. Please check your credentials and try again."
            })),
        )
            .into_response();
    }

    let token = generate_session_token(&email);
    state.active_tokens.write().insert(token.clone());

    (
        StatusCode::OK,
        Json(LoginResponse {
            token,
            message: "Login successful",
        }),
    )
        .into_response()
}

async fn logout(State(state): State<ApiState>, Json(input): Json<LogoutRequest>) -> Response {
    let removed = state.active_tokens.write().remove(&input.token);
    let message = if removed {
        "Logged out successfully"
    } else {
        "Token was not active"
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({ "message": message })),
    )
        .into_response()
}

async fn chat(State(state): State<ApiState>, Json(input): Json<ChatRequest>) -> Response {
    if let Some(token) = input.token.as_deref() {
        if !state.active_tokens.read().contains(token) {
            return (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({
                    "error": "session_expired",
                    "message": "Your session has expired. Please log in again."
                })),
            )
                .into_response();
        }
    }

    let message = input.message.trim().to_string();
    if message.is_empty() {
        return bad_request("empty_message", "Please enter a message before sending.");
    }
    if message.chars().count() > MAX_MESSAGE_LEN {
        return bad_request(
            "message_too_long",
            "Your message is too long. Please keep it under 1000 characters.",
        );
    }
    if SUSPICIOUS_PATTERNS
        .iter()
        .any(|pattern| pattern.is_match(&message))
    {
        return bad_request("invalid_content", "Message contains invalid content");
    }

    let reply = state
        .agent
        .handle_turn(ChatInput {
            message,
            token: input.token,
        })
        .await;

    (
        StatusCode::OK,
        Json(ChatResponse {
            reply: reply.reply_text,
        }),
    )
        .into_response()
}

fn bad_request(error: &str, message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": error, "message": message })),
    )
        .into_response()
}

/// Demo-mode session token: random salt mixed with the email, digested and
/// truncated. Tokens live in memory only and die with the process.
fn generate_session_token(email: &str) -> String {
    let mut salt = [0_u8; 8];
    thread_rng().fill_bytes(&mut salt);

    let mut hasher = Sha256::new();
    hasher.update(b"demo_");
    hasher.update(email.as_bytes());
    hasher.update(b"_");
    hasher.update(salt);

    let digest = hasher.finalize();
    let mut token = String::with_capacity(digest.len() * 2);
    for byte in digest {
        token.push_str(format!("{:02x}", byte).as_str());
    }
    token.truncate(SESSION_TOKEN_LEN);
    token
}

fn parse_demo_credentials() -> HashMap<String, String> {
    let raw = env::var("CARE_DEMO_CREDENTIALS")
        .unwrap_or_else(|_| "demo@healthcare.com:demo123,user@example.com:password123".to_string());

    raw.split(',')
        .filter_map(|pair| {
            let (email, password) = pair.split_once(':')?;
            let email = email.trim().to_lowercase();
            let password = password.trim().to_string();
            if email.is_empty() || password.is_empty() {
                return None;
            }
            Some((email, password))
        })
        .collect()
}

fn parse_allowed_origins() -> Vec<String> {
    let default_origins = [
        "http://localhost:5500",
        "http://127.0.0.1:5500",
        "http://localhost:3000",
        "http://127.0.0.1:3000",
    ];

    env::var("CARE_ALLOWED_ORIGINS")
        .ok()
        .map(|value| {
            value
                .split(',')
                .map(|origin| origin.trim().trim_end_matches('/').to_string())
                .filter(|origin| !origin.is_empty())
                .collect::<Vec<_>>()
        })
        .unwrap_or_else(|| {
            default_origins
                .iter()
                .map(|value| value.to_string())
                .collect()
        })
}

fn build_cors_layer(allowed_origins: &Arc<Vec<String>>) -> CorsLayer {
    let origins = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();
    let origins = if origins.is_empty() {
        vec![HeaderValue::from_static("http://localhost:5500")]
    } else {
        origins
    };

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

async fn rate_limit_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS {
        return next.run(request).await;
    }

    let path = request.uri().path().to_string();
    let ip = request_ip(&request);

    if path == "/api/login" {
        let auth_key = format!("auth:{}", ip);
        if !state.auth_limiter.allow(&auth_key) {
            return (
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({
                    "error": "auth_rate_limited",
                    "message": "too many login attempts from this IP. wait and retry."
                })),
            )
                .into_response();
        }
    }

    if path == "/health" {
        return next.run(request).await;
    }

    if !state.limiter.allow(&ip) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(serde_json::json!({
                "error": "rate_limited",
                "message": "rate limit exceeded for this IP"
            })),
        )
            .into_response();
    }

    next.run(request).await
}

fn request_ip(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .split(',')
                .next()
                .unwrap_or("unknown")
                .trim()
                .to_string()
        })
        .unwrap_or_else(|| "local".to_string())
}

async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;

    response.headers_mut().insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response.headers_mut().insert(
        header::HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    );
    response.headers_mut().insert(
        header::HeaderName::from_static("referrer-policy"),
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    response.headers_mut().insert(
        header::HeaderName::from_static("content-security-policy"),
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'; base-uri 'none'"),
    );

    response
}
