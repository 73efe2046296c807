//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod app;
mod config;

use std::net::SocketAddr;
use std::time::Duration;

use identity::application::{CreateAccountInput, CreateAccountUseCase};
use identity::domain::value_object::email::Email;
use identity::domain::{EventPublisher, TokenManager, UserRepository};
use identity::{
    IdentityError, IdentityState, InMemoryUserRepository, JwtTokenManager, LogEventPublisher,
    PgUserRepository, UserRole,
};
use platform::password::CredentialVerifier;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{ApiConfig, BootstrapAdmin};

/// How long in-flight requests get to finish after a shutdown signal
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,identity=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env()?;

    let verifier = CredentialVerifier::new(config.identity.hash_cost)?;
    let tokens = JwtTokenManager::new(&config.identity)?;

    match config.database_url.clone() {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .connect(&database_url)
                .await?;

            tracing::info!("Connected to database");

            // Run migrations
            sqlx::migrate!("../../../database/migrations")
                .run(&pool)
                .await?;

            tracing::info!("Migrations completed");

            let state = IdentityState::new(
                PgUserRepository::new(pool),
                LogEventPublisher,
                tokens,
                verifier,
            );
            run(config, state).await
        }
        None => {
            tracing::warn!("DATABASE_URL not set, accounts are kept in memory only");

            let state = IdentityState::new(
                InMemoryUserRepository::new(),
                LogEventPublisher,
                tokens,
                verifier,
            );
            run(config, state).await
        }
    }
}

async fn run<U, P, T>(config: ApiConfig, state: IdentityState<U, P, T>) -> anyhow::Result<()>
where
    U: UserRepository + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    T: TokenManager,
{
    if let Some(admin) = &config.bootstrap_admin {
        bootstrap_admin(&state, admin).await?;
    }

    let app = app::build_router(state, &config.frontend_origins);

    // Start server
    let addr = SocketAddr::new(config.host, config.port);
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    let (stop_tx, mut stop_rx) = watch::channel(false);
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.changed().await;
            })
            .await
    });

    tokio::select! {
        result = &mut server => return Ok(result??),
        _ = shutdown_signal() => {}
    }

    tracing::info!("Shutdown signal received, draining connections");
    let _ = stop_tx.send(true);

    match tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut server).await {
        Ok(result) => result??,
        Err(_) => {
            tracing::warn!(
                timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
                "Graceful shutdown timed out, aborting open connections"
            );
            server.abort();
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Create the configured admin account unless the email is already in use.
async fn bootstrap_admin<U, P, T>(
    state: &IdentityState<U, P, T>,
    admin: &BootstrapAdmin,
) -> anyhow::Result<()>
where
    U: UserRepository + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let email = Email::new(admin.email.as_str())?;
    if state.repo.find_by_email(&email).await?.is_some() {
        tracing::info!(email = %email, "Bootstrap admin already exists");
        return Ok(());
    }

    let use_case = CreateAccountUseCase::new(
        state.repo.clone(),
        state.publisher.clone(),
        state.verifier.clone(),
    );

    let input = CreateAccountInput {
        email: admin.email.clone(),
        password: admin.password.clone(),
        name: "Administrator".to_string(),
        role: UserRole::Admin,
    };

    match use_case.execute(input).await {
        Ok(account) => {
            tracing::info!(account_id = %account.account_id, "Bootstrap admin created");
            Ok(())
        }
        // Another instance got there first
        Err(IdentityError::EmailTaken) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
