use crate::auth::token::TokenService;
use crate::auth::{ AuthError, MemoryUserStore, UserStore };
use crate::cli::Args;
use crate::models::api::{ AuthResponse, ErrorBody, IncomingMessage, LoginRequest, RegisterRequest };
use crate::models::user::User;
use crate::responder;
use crate::stream::{ split_words, StreamEmitter, TypingDelay };
use crate::templates::PROMPT_TEMPLATES;

use std::convert::Infallible;
use std::num::NonZeroU32;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{ header, HeaderMap, StatusCode };
use axum::response::{ IntoResponse, Response };
use axum::routing::{ get, post };
use axum::{ Json, Router };
use futures_util::StreamExt;
use governor::{ RateLimiter, Quota, state::{ InMemoryState, NotKeyed }, clock::DefaultClock };
use lazy_static::lazy_static;
use log::{ info, warn, error };
use serde_json::{ json, Value };
use tower_http::cors::{ Any, CorsLayer };

/// Marker header identifying the streaming wire protocol.
pub const STREAM_PROTOCOL_HEADER: &str = "x-vercel-ai-data-stream";
pub const STREAM_PROTOCOL_VERSION: &str = "v1";

/// Fed to the selector when the request carries no usable message.
const DEFAULT_PROMPT: &str = "Hello";

lazy_static! {
    static ref LOGIN_LIMITER: RateLimiter<NotKeyed, InMemoryState, DefaultClock> =
        RateLimiter::direct(Quota::per_second(NonZeroU32::new(20).unwrap()));
}

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub tokens: Arc<TokenService>,
    pub delay: TypingDelay,
}

impl AppState {
    pub fn from_args(args: &Args) -> Self {
        Self {
            users: Arc::new(MemoryUserStore::new()),
            tokens: Arc::new(TokenService::new(args.jwt_secret.clone(), args.token_ttl_secs)),
            delay: TypingDelay::from_millis(
                args.stream_preroll_ms,
                args.stream_delay_ms,
                args.stream_jitter_ms
            ),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/register", post(register_handler))
        .route("/api/templates", get(templates_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(state)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Last entry of the `messages` array, or the default prompt when the field
/// is missing, not an array, empty, or carries no content.
fn last_user_message(body: &Value) -> String {
    let messages: Vec<IncomingMessage> = body
        .get("messages")
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default();

    messages
        .last()
        .map(|m| m.content.clone())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_PROMPT.to_string())
}

async fn chat_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>
) -> Response {
    let token = match bearer_token(&headers) {
        Some(t) => t,
        None => {
            return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
        }
    };

    let claims = match state.tokens.verify(token) {
        Ok(c) => c,
        Err(e) => {
            warn!("Rejected chat request: {}", e);
            return (StatusCode::UNAUTHORIZED, "Invalid token").into_response();
        }
    };

    let prompt = last_user_message(&body);
    info!("Chat request from {}: {}", claims.email, prompt);

    let reply = responder::select_response(&prompt);
    let prompt_tokens = split_words(&prompt).len() as u32;

    let frames = StreamEmitter::new(state.delay.clone()).start(reply, prompt_tokens);
    let wire = frames.map(|frame| Ok::<_, Infallible>(frame.encode()));

    match
        Response::builder()
            .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .header(STREAM_PROTOCOL_HEADER, STREAM_PROTOCOL_VERSION)
            .body(Body::from_stream(wire))
    {
        Ok(response) => response,
        Err(e) => {
            error!("Chat API error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

fn auth_success(state: &AppState, user: User) -> Response {
    let token = state.tokens.issue(&user);
    Json(AuthResponse {
        success: true,
        user,
        token,
    }).into_response()
}

async fn login_handler(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>
) -> Response {
    if LOGIN_LIMITER.check().is_err() {
        warn!("Login rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorBody::new("Too many requests")),
        ).into_response();
    }

    if req.email.is_empty() || req.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("Email and password are required")),
        ).into_response();
    }

    info!("Login attempt: {}", req.email);
    match state.users.verify_password(&req.email, &req.password).await {
        Ok(user) => {
            info!("Authentication successful for: {}", user.email);
            auth_success(&state, user)
        }
        Err(e) => {
            warn!("Authentication failed for {}: {}", req.email, e);
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorBody::new("Invalid credentials")),
            ).into_response()
        }
    }
}

async fn register_handler(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>
) -> Response {
    if req.email.is_empty() || req.password.is_empty() || req.name.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("Email, password, and name are required")),
        ).into_response();
    }

    let candidate = User::new(req.email.as_str(), req.name.as_str());
    match state.users.insert(candidate, &req.password).await {
        Ok(user) => {
            info!("Registered new user: {}", user.email);
            auth_success(&state, user)
        }
        Err(AuthError::UserExists) => {
            (
                StatusCode::CONFLICT,
                Json(ErrorBody::new("User already exists")),
            ).into_response()
        }
        Err(e @ AuthError::WeakPassword(_)) => {
            (StatusCode::BAD_REQUEST, Json(ErrorBody::new(e.to_string()))).into_response()
        }
        Err(e) => {
            error!("Registration error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("Internal server error")),
            ).into_response()
        }
    }
}

async fn templates_handler() -> Response {
    Json(PROMPT_TEMPLATES).into_response()
}

async fn health_handler() -> Response {
    Json(json!({ "status": "ok" })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responder::{ responses_for, Topic };
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        AppState {
            users: Arc::new(MemoryUserStore::new()),
            tokens: Arc::new(TokenService::new("test-secret", 3600)),
            delay: TypingDelay::none(),
        }
    }

    fn demo_bearer(state: &AppState) -> String {
        let user = User::seeded("demo-user-1", "demo@zerocode.com", "Demo User");
        format!("Bearer {}", state.tokens.issue(&user))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    /// Strips the wire framing and returns (reassembled text, terminal line).
    fn decode_stream(body: &str) -> (String, String) {
        let mut text = String::new();
        let mut terminal = String::new();
        for line in body.lines() {
            if let Some(payload) = line.strip_prefix("0:") {
                let token: String = serde_json::from_str(payload).unwrap();
                text.push_str(&token);
            } else if let Some(payload) = line.strip_prefix("d:") {
                assert!(terminal.is_empty(), "more than one terminal frame");
                terminal = payload.to_string();
            } else {
                panic!("unexpected frame line: {}", line);
            }
        }
        (text, terminal)
    }

    #[tokio::test]
    async fn chat_without_authorization_is_401() {
        let app = router(test_state());
        let response = app
            .oneshot(post_json("/api/chat", json!({ "messages": [] })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(STREAM_PROTOCOL_HEADER).is_none());
        assert_eq!(body_string(response).await, "Unauthorized");
    }

    #[tokio::test]
    async fn chat_with_bad_token_is_401() {
        let app = router(test_state());
        let mut request = post_json("/api/chat", json!({ "messages": [] }));
        request
            .headers_mut()
            .insert(header::AUTHORIZATION, "Bearer not-a-real-token".parse().unwrap());

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn chat_streams_a_framed_response() {
        let state = test_state();
        let bearer = demo_bearer(&state);
        let app = router(state);

        let mut request = post_json(
            "/api/chat",
            json!({ "messages": [{ "role": "user", "content": "hello there" }] })
        );
        request
            .headers_mut()
            .insert(header::AUTHORIZATION, bearer.parse().unwrap());

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
        assert_eq!(
            response.headers().get(STREAM_PROTOCOL_HEADER).unwrap(),
            STREAM_PROTOCOL_VERSION
        );

        let body = body_string(response).await;
        assert!(body.ends_with('\n'));
        let (text, terminal) = decode_stream(&body);
        assert!(responses_for(Topic::Greeting).contains(&text.as_str()));

        let done: Value = serde_json::from_str(&terminal).unwrap();
        assert_eq!(done["finishReason"], "stop");
        assert_eq!(done["usage"]["promptTokens"], 2);
        assert_eq!(
            done["usage"]["completionTokens"].as_u64().unwrap(),
            split_words(&text).len() as u64
        );
    }

    #[tokio::test]
    async fn chat_with_empty_messages_uses_default_prompt() {
        let state = test_state();
        let bearer = demo_bearer(&state);
        let app = router(state);

        // "Hello" fallback classifies as a greeting.
        let mut request = post_json("/api/chat", json!({ "messages": "not-an-array" }));
        request
            .headers_mut()
            .insert(header::AUTHORIZATION, bearer.parse().unwrap());

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        let (text, terminal) = decode_stream(&body);
        assert!(responses_for(Topic::Greeting).contains(&text.as_str()));
        assert!(!terminal.is_empty());
    }

    #[tokio::test]
    async fn login_succeeds_for_seeded_demo_user() {
        let app = router(test_state());
        let response = app
            .oneshot(post_json(
                "/api/auth/login",
                json!({ "email": "demo@zerocode.com", "password": "demo123" })
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["user"]["email"], "demo@zerocode.com");
        assert!(!body["token"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_401() {
        let app = router(test_state());
        let response = app
            .oneshot(post_json(
                "/api/auth/login",
                json!({ "email": "demo@zerocode.com", "password": "wrong" })
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["error"], "Invalid credentials");
    }

    #[tokio::test]
    async fn login_with_missing_fields_is_400() {
        let app = router(test_state());
        let response = app
            .oneshot(post_json("/api/auth/login", json!({ "email": "demo@zerocode.com" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn register_then_login_with_new_account() {
        let app = router(test_state());

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/auth/register",
                json!({ "email": "new@example.com", "password": "secret99", "name": "New User" })
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["user"]["name"], "New User");

        let response = app
            .oneshot(post_json(
                "/api/auth/login",
                json!({ "email": "new@example.com", "password": "secret99" })
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn register_duplicate_email_is_409() {
        let app = router(test_state());
        let response = app
            .oneshot(post_json(
                "/api/auth/register",
                json!({ "email": "demo@zerocode.com", "password": "whatever1", "name": "Impostor" })
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn register_with_short_password_is_400() {
        let app = router(test_state());
        let response = app
            .oneshot(post_json(
                "/api/auth/register",
                json!({ "email": "short@example.com", "password": "tiny", "name": "Shorty" })
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn templates_and_health_respond() {
        let app = router(test_state());

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/api/templates").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body.as_array().unwrap().len(), 6);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
