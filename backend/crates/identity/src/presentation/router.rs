//! Identity Router

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::domain::event::EventPublisher;
use crate::domain::repository::UserRepository;
use crate::domain::token::TokenManager;
use crate::domain::value_object::user_role::UserRole;
use crate::presentation::handlers::{self, IdentityState};
use crate::presentation::middleware::{AllowedRoles, AuthGate, authenticate, authorize};

/// Identity routes, to be nested under `/api/v1`:
///
/// | Route                 | Gate                   |
/// |-----------------------|------------------------|
/// | `POST /auth/login`    | public                 |
/// | `POST /auth/register` | public                 |
/// | `GET /me`             | authenticated          |
/// | `GET /users`          | authenticated, admin   |
/// | `POST /users`         | authenticated, admin   |
pub fn identity_router<U, P, T>(state: IdentityState<U, P, T>) -> Router
where
    U: UserRepository + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    T: TokenManager,
{
    let gate = AuthGate::new(state.tokens.clone());

    let admin = Router::new()
        .route(
            "/users",
            get(handlers::list_users::<U, P, T>).post(handlers::create_user::<U, P, T>),
        )
        .route_layer(middleware::from_fn_with_state(
            AllowedRoles::new([UserRole::Admin]),
            authorize,
        ));

    // route_layer added last runs first: authenticate wraps authorize
    let protected = Router::new()
        .route("/me", get(handlers::me::<U, P, T>))
        .merge(admin)
        .route_layer(middleware::from_fn_with_state(gate, authenticate::<T>));

    Router::new()
        .route("/auth/login", post(handlers::login::<U, P, T>))
        .route("/auth/register", post(handlers::register::<U, P, T>))
        .merge(protected)
        .with_state(state)
}
