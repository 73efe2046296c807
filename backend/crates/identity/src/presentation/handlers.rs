//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use kernel::response::ApiResponse;
use platform::password::CredentialVerifier;

use crate::application::{
    AccountQueryUseCase, CreateAccountInput, CreateAccountUseCase, LoginInput, LoginUseCase,
};
use crate::domain::event::EventPublisher;
use crate::domain::repository::UserRepository;
use crate::domain::token::TokenManager;
use crate::domain::value_object::user_role::UserRole;
use crate::error::{IdentityError, IdentityResult};
use crate::presentation::dto::{
    CreateUserRequest, LoginRequest, LoginResponse, RegisterRequest, UserResponse,
};
use crate::presentation::middleware::CurrentUser;

/// Shared state for identity handlers
pub struct IdentityState<U, P, T> {
    pub repo: Arc<U>,
    pub publisher: Arc<P>,
    pub tokens: Arc<T>,
    pub verifier: Arc<CredentialVerifier>,
}

impl<U, P, T> IdentityState<U, P, T> {
    pub fn new(repo: U, publisher: P, tokens: T, verifier: CredentialVerifier) -> Self {
        Self {
            repo: Arc::new(repo),
            publisher: Arc::new(publisher),
            tokens: Arc::new(tokens),
            verifier: Arc::new(verifier),
        }
    }
}

// Manual impl: derive would require `U: Clone` etc.
impl<U, P, T> Clone for IdentityState<U, P, T> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            publisher: Arc::clone(&self.publisher),
            tokens: Arc::clone(&self.tokens),
            verifier: Arc::clone(&self.verifier),
        }
    }
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/v1/auth/login
pub async fn login<U, P, T>(
    State(state): State<IdentityState<U, P, T>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> IdentityResult<ApiResponse<LoginResponse>>
where
    U: UserRepository + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    T: TokenManager,
{
    let Json(req) = payload.map_err(|_| IdentityError::InvalidBody)?;
    req.validate()?;

    let use_case = LoginUseCase::new(
        state.repo.clone(),
        state.tokens.clone(),
        state.verifier.clone(),
    );

    let output = use_case
        .execute(LoginInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(ApiResponse::ok(LoginResponse {
        user: UserResponse::from(&output.account),
        token: output.token,
    }))
}

// ============================================================================
// Account creation
// ============================================================================

/// POST /api/v1/auth/register
pub async fn register<U, P, T>(
    State(state): State<IdentityState<U, P, T>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> IdentityResult<impl IntoResponse>
where
    U: UserRepository + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    T: TokenManager,
{
    let Json(req) = payload.map_err(|_| IdentityError::InvalidBody)?;

    let input = CreateAccountInput {
        email: req.email,
        password: req.password,
        name: req.name,
        role: UserRole::User,
    };

    create_account(&state, input).await
}

/// POST /api/v1/users (admin)
pub async fn create_user<U, P, T>(
    State(state): State<IdentityState<U, P, T>>,
    CurrentUser(admin): CurrentUser,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> IdentityResult<impl IntoResponse>
where
    U: UserRepository + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    T: TokenManager,
{
    let Json(req) = payload.map_err(|_| IdentityError::InvalidBody)?;

    tracing::info!(created_by = admin.subject(), role = %req.role, "Admin creating account");

    let input = CreateAccountInput {
        email: req.email,
        password: req.password,
        name: req.name,
        role: req.role,
    };

    create_account(&state, input).await
}

async fn create_account<U, P, T>(
    state: &IdentityState<U, P, T>,
    input: CreateAccountInput,
) -> IdentityResult<(StatusCode, ApiResponse<UserResponse>)>
where
    U: UserRepository + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let use_case = CreateAccountUseCase::new(
        state.repo.clone(),
        state.publisher.clone(),
        state.verifier.clone(),
    );

    let account = use_case.execute(input).await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(UserResponse::from(&account)),
    ))
}

// ============================================================================
// Accounts
// ============================================================================

/// GET /api/v1/me
pub async fn me<U, P, T>(
    State(state): State<IdentityState<U, P, T>>,
    CurrentUser(claims): CurrentUser,
) -> IdentityResult<ApiResponse<UserResponse>>
where
    U: UserRepository + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    T: TokenManager,
{
    let use_case = AccountQueryUseCase::new(state.repo.clone());
    let account = use_case.get(claims.subject()).await?;

    Ok(ApiResponse::ok(UserResponse::from(&account)))
}

/// GET /api/v1/users (admin)
pub async fn list_users<U, P, T>(
    State(state): State<IdentityState<U, P, T>>,
) -> IdentityResult<ApiResponse<Vec<UserResponse>>>
where
    U: UserRepository + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    T: TokenManager,
{
    let use_case = AccountQueryUseCase::new(state.repo.clone());
    let accounts = use_case.list().await?;

    Ok(ApiResponse::ok(
        accounts.iter().map(UserResponse::from).collect(),
    ))
}
