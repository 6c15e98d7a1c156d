use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use care_core::CANONICAL_REFUSAL;
use serde_json::json;
use tower::ServiceExt;

async fn chat_request(app: Router, message: &str, token: Option<&str>) -> (StatusCode, serde_json::Value) {
    let mut payload = json!({ "message": message });
    if let Some(token) = token {
        payload["token"] = json!(token);
    }

    let request = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    (status, parsed)
}

#[tokio::test]
async fn health_is_public_and_reports_metrics() {
    let app = care_api::build_app().await.expect("app should build");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["status"], "ok");
    assert!(parsed["metrics"].get("turns_total").is_some());
    assert!(parsed["capabilities"].get("facility_lookup").is_some());
}

#[tokio::test]
async fn off_topic_message_gets_canonical_refusal() {
    let app = care_api::build_app().await.expect("app should build");

    let (status, parsed) = chat_request(app, "What's the weather today?", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parsed["reply"], CANONICAL_REFUSAL);
}

#[tokio::test]
async fn facility_request_without_location_prompts_for_one() {
    let app = care_api::build_app().await.expect("app should build");

    let (status, parsed) = chat_request(app, "looking for dentist options", None).await;
    assert_eq!(status, StatusCode::OK);
    let reply = parsed["reply"].as_str().unwrap();
    assert!(reply.contains("dentist"));
    assert!(reply.contains("location"));
}

#[tokio::test]
async fn near_me_request_asks_for_explicit_location() {
    let app = care_api::build_app().await.expect("app should build");

    let (status, parsed) = chat_request(app, "I need a doctor near me", None).await;
    assert_eq!(status, StatusCode::OK);
    let reply = parsed["reply"].as_str().unwrap();
    assert!(reply.contains("city, zip code"));
}

#[tokio::test]
async fn explicit_location_without_search_backend_yields_apology() {
    // No GOOGLE_MAPS_API_KEY is set in the test environment, so the lookup
    // degrades to an empty result list.
    let app = care_api::build_app().await.expect("app should build");

    let (status, parsed) = chat_request(app, "find hospitals in Chicago", None).await;
    assert_eq!(status, StatusCode::OK);
    let reply = parsed["reply"].as_str().unwrap();
    assert!(reply.contains("couldn't find"));
    assert!(reply.contains("Chicago"));
}

#[tokio::test]
async fn health_question_without_generator_uses_canned_fallback() {
    let app = care_api::build_app().await.expect("app should build");

    let (status, parsed) = chat_request(app, "I have a headache", None).await;
    assert_eq!(status, StatusCode::OK);
    let reply = parsed["reply"].as_str().unwrap();
    assert!(reply.contains("limited mode"));
}

#[tokio::test]
async fn empty_message_is_rejected() {
    let app = care_api::build_app().await.expect("app should build");

    let (status, parsed) = chat_request(app, "   ", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parsed["error"], "empty_message");
}

#[tokio::test]
async fn oversized_message_is_rejected() {
    let app = care_api::build_app().await.expect("app should build");

    let long_message = "flu ".repeat(300);
    let (status, parsed) = chat_request(app, &long_message, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parsed["error"], "message_too_long");
}

#[tokio::test]
async fn script_injection_is_rejected() {
    let app = care_api::build_app().await.expect("app should build");

    let (status, parsed) =
        chat_request(app, "<script>alert('flu')</script>", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parsed["error"], "invalid_content");
}

#[tokio::test]
async fn login_rejects_unknown_credentials() {
    let app = care_api::build_app().await.expect("app should build");

    let request = Request::builder()
        .method("POST")
        .uri("/api/login")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "email": "stranger@example.com",
                "password": "whatever"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_rejects_malformed_email() {
    let app = care_api::build_app().await.expect("app should build");

    let request = Request::builder()
        .method("POST")
        .uri("/api/login")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "email": "not-an-email",
                "password": "demo123"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_chat_logout_lifecycle() {
    let app = care_api::build_app().await.expect("app should build");

    let login_request = Request::builder()
        .method("POST")
        .uri("/api/login")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "email": "demo@healthcare.com",
                "password": "demo123"
            })
            .to_string(),
        ))
        .unwrap();

    let login_response = app.clone().oneshot(login_request).await.unwrap();
    assert_eq!(login_response.status(), StatusCode::OK);
    let body = to_bytes(login_response.into_body(), usize::MAX).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let token = parsed["token"].as_str().unwrap().to_string();
    assert_eq!(token.len(), 32);
    assert_eq!(parsed["message"], "Login successful");

    let (status, parsed) = chat_request(app.clone(), "I have a headache", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(parsed["reply"].as_str().unwrap().len() > 0);

    let logout_request = Request::builder()
        .method("POST")
        .uri("/api/logout")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "token": token.as_str() }).to_string()))
        .unwrap();
    let logout_response = app.clone().oneshot(logout_request).await.unwrap();
    assert_eq!(logout_response.status(), StatusCode::OK);

    let (status, parsed) = chat_request(app, "I have a headache", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(parsed["error"], "session_expired");
}

#[test]
fn per_ip_limiter_denies_past_the_cap() {
    let limiter =
        care_api::rate_limit::IpRateLimiter::new(std::time::Duration::from_secs(60), 1);
    assert!(limiter.allow("203.0.113.9"));
    assert!(!limiter.allow("203.0.113.9"));
}

#[tokio::test]
async fn chat_with_unknown_token_is_rejected() {
    let app = care_api::build_app().await.expect("app should build");

    let (status, parsed) =
        chat_request(app, "I have a headache", Some("deadbeefdeadbeefdeadbeefdeadbeef")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(parsed["error"], "session_expired");
}
