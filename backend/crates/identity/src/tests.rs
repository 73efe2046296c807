//! Use-case and HTTP pipeline tests

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{Duration, TimeZone, Utc};
use platform::clock::ManualClock;
use platform::password::{CredentialVerifier, HashCost};
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tower::ServiceExt;

use crate::application::{
    CreateAccountInput, CreateAccountUseCase, IdentityConfig, LoginInput, LoginUseCase,
};
use crate::domain::entity::account::Account;
use crate::domain::event::{EventPublisher, PublishError};
use crate::domain::repository::UserRepository;
use crate::domain::token::TokenManager;
use crate::domain::value_object::{
    email::Email,
    user_password::{RawPassword, UserPassword},
    user_role::UserRole,
};
use crate::error::IdentityError;
use crate::infra::{InMemoryUserRepository, JwtTokenManager, NoopEventPublisher};
use crate::presentation::handlers::IdentityState;
use crate::presentation::middleware::{AllowedRoles, authorize};
use crate::presentation::router::identity_router;

const PASSWORD: &str = "Correct-Horse-42";

type TestTokens = JwtTokenManager<Arc<ManualClock>>;

// ============================================================================
// Fixtures
// ============================================================================

#[derive(Clone, Default)]
struct RecordingPublisher {
    events: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

impl EventPublisher for RecordingPublisher {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), PublishError> {
        self.events.lock().await.push((topic.to_string(), payload));
        Ok(())
    }
}

struct FailingPublisher;

impl EventPublisher for FailingPublisher {
    async fn publish(&self, _topic: &str, _payload: Vec<u8>) -> Result<(), PublishError> {
        Err(PublishError("broker unavailable".to_string()))
    }
}

fn verifier() -> Arc<CredentialVerifier> {
    let cost = HashCost {
        iterations: 1,
        memory_kib: 1024,
        parallelism: 1,
    };
    Arc::new(CredentialVerifier::new(cost).unwrap())
}

struct Harness {
    repo: InMemoryUserRepository,
    clock: Arc<ManualClock>,
    tokens: Arc<TestTokens>,
    verifier: Arc<CredentialVerifier>,
}

impl Harness {
    fn new() -> Self {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
        ));
        let config = IdentityConfig::new(b"test-signing-secret-test-signing".to_vec());
        let tokens = JwtTokenManager::with_clock(&config, Arc::clone(&clock)).unwrap();

        Self {
            repo: InMemoryUserRepository::new(),
            clock,
            tokens: Arc::new(tokens),
            verifier: verifier(),
        }
    }

    async fn seed(&self, email: &str, role: UserRole) -> Account {
        let raw = RawPassword::new(PASSWORD.to_string()).unwrap();
        let hash = UserPassword::hash(&self.verifier, &raw).unwrap();
        let account = Account::new(Email::new(email).unwrap(), "Seed".to_string(), role, hash);
        self.repo.create(&account).await.unwrap();
        account
    }

    fn login_use_case(&self) -> LoginUseCase<InMemoryUserRepository, TestTokens> {
        LoginUseCase::new(
            Arc::new(self.repo.clone()),
            Arc::clone(&self.tokens),
            Arc::clone(&self.verifier),
        )
    }

    fn router(&self) -> Router {
        identity_router(IdentityState {
            repo: Arc::new(self.repo.clone()),
            publisher: Arc::new(NoopEventPublisher),
            tokens: Arc::clone(&self.tokens),
            verifier: Arc::clone(&self.verifier),
        })
    }
}

fn login_input(email: &str, password: &str) -> LoginInput {
    LoginInput {
        email: email.to_string(),
        password: password.to_string(),
    }
}

fn create_input(email: &str) -> CreateAccountInput {
    CreateAccountInput {
        email: email.to_string(),
        password: PASSWORD.to_string(),
        name: "New User".to_string(),
        role: UserRole::User,
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn login_issues_token_for_subject_and_role() {
    let h = Harness::new();
    let account = h.seed("x@example.com", UserRole::Admin).await;

    let output = h
        .login_use_case()
        .execute(login_input("X@Example.com", PASSWORD))
        .await
        .unwrap();

    assert_eq!(output.account.account_id, account.account_id);
    let claims = h.tokens.verify(&output.token).unwrap();
    assert_eq!(claims.subject(), account.account_id.to_string());
    assert_eq!(claims.role(), UserRole::Admin);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let h = Harness::new();
    h.seed("x@example.com", UserRole::User).await;
    let use_case = h.login_use_case();

    let wrong_password = use_case
        .execute(login_input("x@example.com", "wrong-password"))
        .await
        .unwrap_err();
    let unknown_email = use_case
        .execute(login_input("missing@example.com", PASSWORD))
        .await
        .unwrap_err();
    let malformed_email = use_case
        .execute(login_input("not-an-email", PASSWORD))
        .await
        .unwrap_err();

    for err in [&wrong_password, &unknown_email, &malformed_email] {
        assert!(matches!(err, IdentityError::InvalidCredentials), "{err:?}");
    }
    assert_eq!(
        wrong_password.to_app_error().to_string(),
        unknown_email.to_app_error().to_string()
    );
}

#[tokio::test]
async fn login_with_corrupt_or_legacy_hash_fails_closed() {
    let h = Harness::new();
    let legacy_sha256 = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";

    for (i, stored) in ["", "not-a-hash", legacy_sha256].into_iter().enumerate() {
        let email = format!("legacy{i}@example.com");
        let account = Account::new(
            Email::new(&email).unwrap(),
            "Legacy".to_string(),
            UserRole::User,
            UserPassword::from_db(stored),
        );
        h.repo.create(&account).await.unwrap();

        let err = h
            .login_use_case()
            .execute(login_input(&email, "test"))
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::InvalidCredentials));
    }
}

#[tokio::test]
async fn login_with_empty_password_fails() {
    let h = Harness::new();
    h.seed("x@example.com", UserRole::User).await;

    let err = h
        .login_use_case()
        .execute(login_input("x@example.com", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::InvalidCredentials));
}

// ============================================================================
// Account creation
// ============================================================================

#[tokio::test]
async fn create_account_persists_and_publishes() {
    let h = Harness::new();
    let publisher = RecordingPublisher::default();
    let use_case = CreateAccountUseCase::new(
        Arc::new(h.repo.clone()),
        Arc::new(publisher.clone()),
        Arc::clone(&h.verifier),
    );

    let account = use_case.execute(create_input("new@example.com")).await.unwrap();

    let stored = h.repo.find_by_id(&account.account_id).await.unwrap().unwrap();
    assert!(stored.password_hash.as_phc_string().starts_with("$argon2id$"));
    assert_ne!(stored.password_hash.as_phc_string(), PASSWORD);

    let events = publisher.events.lock().await;
    assert_eq!(events.len(), 1);
    let (topic, payload) = &events[0];
    assert_eq!(topic, "user.created");
    let payload: Value = serde_json::from_slice(payload).unwrap();
    assert_eq!(
        payload,
        json!({
            "type": "UserCreated",
            "id": account.account_id.to_string(),
            "email": "new@example.com",
        })
    );
}

#[tokio::test]
async fn create_account_survives_publish_failure() {
    let h = Harness::new();
    let use_case = CreateAccountUseCase::new(
        Arc::new(h.repo.clone()),
        Arc::new(FailingPublisher),
        Arc::clone(&h.verifier),
    );

    let account = use_case.execute(create_input("new@example.com")).await.unwrap();

    assert!(h.repo.find_by_id(&account.account_id).await.unwrap().is_some());
}

#[tokio::test]
async fn create_account_rejects_duplicate_and_weak_input() {
    let h = Harness::new();
    let publisher = RecordingPublisher::default();
    h.seed("taken@example.com", UserRole::User).await;
    let use_case = CreateAccountUseCase::new(
        Arc::new(h.repo.clone()),
        Arc::new(publisher.clone()),
        Arc::clone(&h.verifier),
    );

    let err = use_case
        .execute(create_input("TAKEN@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::EmailTaken));

    let mut weak = create_input("weak@example.com");
    weak.password = "password123".to_string();
    let err = use_case.execute(weak).await.unwrap_err();
    assert!(matches!(err, IdentityError::PasswordPolicy(_)));

    let err = use_case.execute(create_input("bad-email")).await.unwrap_err();
    assert!(matches!(err, IdentityError::Validation(_)));

    assert!(publisher.events.lock().await.is_empty());
    assert_eq!(h.repo.len().await, 1);
}

#[tokio::test]
async fn hashes_of_same_password_differ() {
    let h = Harness::new();
    let use_case = CreateAccountUseCase::new(
        Arc::new(h.repo.clone()),
        Arc::new(NoopEventPublisher),
        Arc::clone(&h.verifier),
    );

    let a = use_case.execute(create_input("a@example.com")).await.unwrap();
    let b = use_case.execute(create_input("b@example.com")).await.unwrap();

    assert_ne!(
        a.password_hash.as_phc_string(),
        b.password_hash.as_phc_string()
    );
}

// ============================================================================
// HTTP pipeline
// ============================================================================

async fn login_over_http(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        post_json(
            "/auth/login",
            &json!({"email": email, "password": PASSWORD}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    assert!(body["data"]["user"].get("password_hash").is_none());
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn token_valid_until_fifteen_minutes() {
    let h = Harness::new();
    h.seed("x@example.com", UserRole::User).await;
    let app = h.router();

    let token = login_over_http(&app, "x@example.com").await;

    h.clock.advance(Duration::minutes(14) + Duration::seconds(59));
    let (status, body) = send(&app, get_with_token("/me", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "x@example.com");

    h.clock.advance(Duration::seconds(1));
    let (status, body) = send(&app, get_with_token("/me", &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "ERR_UNAUTHORIZED");
    assert_eq!(body["error"]["message"], "invalid or expired token");
}

#[tokio::test]
async fn missing_or_malformed_header_is_unauthorized() {
    let h = Harness::new();
    let app = h.router();

    let req = Request::builder().uri("/me").body(Body::empty()).unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "missing authorization header");

    for value in ["Basic dXNlcjpwYXNz", "Bearer", "Bearer   "] {
        let req = Request::builder()
            .uri("/me")
            .header(header::AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{value}");
        assert_eq!(body["error"]["message"], "invalid authorization header");
    }

    let (status, body) = send(&app, get_with_token("/me", "not.a.token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "invalid or expired token");
}

#[tokio::test]
async fn lowercase_scheme_accepted() {
    let h = Harness::new();
    h.seed("x@example.com", UserRole::User).await;
    let app = h.router();
    let token = login_over_http(&app, "x@example.com").await;

    let req = Request::builder()
        .uri("/me")
        .header(header::AUTHORIZATION, format!("  bearer {token} "))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_routes_require_admin_role() {
    let h = Harness::new();
    h.seed("user@example.com", UserRole::User).await;
    h.seed("admin@example.com", UserRole::Admin).await;
    let app = h.router();

    let user_token = login_over_http(&app, "user@example.com").await;
    let (status, body) = send(&app, get_with_token("/users", &user_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "ERR_FORBIDDEN");
    assert_eq!(body["error"]["message"], "insufficient permissions");

    let admin_token = login_over_http(&app, "admin@example.com").await;
    let (status, body) = send(&app, get_with_token("/users", &admin_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let req = Request::builder()
        .method("POST")
        .uri("/users")
        .header(header::AUTHORIZATION, format!("Bearer {admin_token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "email": "ops@example.com",
                "password": PASSWORD,
                "name": "Ops",
                "role": "admin",
            })
            .to_string(),
        ))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["role"], "admin");
}

#[tokio::test]
async fn unauthenticated_admin_route_is_401_not_403() {
    let h = Harness::new();
    let app = h.router();

    let req = Request::builder().uri("/users").body(Body::empty()).unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_errors_over_http() {
    let h = Harness::new();
    h.seed("x@example.com", UserRole::User).await;
    let app = h.router();

    let (status, body) = send(
        &app,
        post_json(
            "/auth/login",
            &json!({"email": "x@example.com", "password": "wrong-password"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "ERR_INVALID_CREDENTIALS");

    let (status, body) = send(
        &app,
        post_json("/auth/login", &json!({"email": "x", "password": "123"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "ERR_VALIDATION");

    let req = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "ERR_BAD_REQUEST");
    assert_eq!(body["error"]["message"], "invalid body");
}

#[tokio::test]
async fn register_creates_user_role_account() {
    let h = Harness::new();
    let app = h.router();

    let (status, body) = send(
        &app,
        post_json(
            "/auth/register",
            &json!({
                "email": "new@example.com",
                "password": PASSWORD,
                "name": "New",
                "role": "admin",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["role"], "user");

    let (status, body) = send(
        &app,
        post_json(
            "/auth/register",
            &json!({"email": "new@example.com", "password": PASSWORD, "name": "Again"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "ERR_CONFLICT");
}

#[tokio::test]
async fn authorize_without_authenticate_is_server_error() {
    let app = Router::new()
        .route("/admin", axum::routing::get(|| async { "ok" }))
        .route_layer(axum::middleware::from_fn_with_state(
            AllowedRoles::new([UserRole::Admin]),
            authorize,
        ));

    let req = Request::builder().uri("/admin").body(Body::empty()).unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_code(&body), "ERR_INTERNAL");
}
