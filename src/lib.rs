//! User administration API
//!
//! A REST service with CRUD and aggregate statistics over users, plus the
//! admin client that drives it:
//! - In-memory or PostgreSQL user store
//! - HS256 bearer tokens with logout revocation
//! - Headless dashboard and user management views

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use api::state::AppState;
use config::StorageBackend;
use domain::UserRole;
use infrastructure::auth::{JwtConfig, JwtGenerator, JwtService};
use infrastructure::user::{
    Argon2Hasher, CreateUserRequest, InMemoryUserRepository, PostgresUserRepository, UserService,
};

const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

pub const SEED_ADMIN_EMAIL: &str = "admin@example.com";

const SEED_CLIENTS: [(&str, &str); 3] = [
    ("Alice Johnson", "alice@example.com"),
    ("Bob Smith", "bob@example.com"),
    ("Carol White", "carol@example.com"),
];

/// Create application state from the loaded configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::load().unwrap_or_default();
    create_app_state_with_config(&config).await
}

/// Create application state with the given configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let password_hasher = Arc::new(Argon2Hasher::new());

    info!("Storage backend: {:?}", config.storage.backend);

    let user_service: Arc<dyn api::state::UserServiceTrait> = match config.storage.backend {
        StorageBackend::Memory => {
            let repository = Arc::new(InMemoryUserRepository::new());
            Arc::new(UserService::new(repository, password_hasher))
        }
        StorageBackend::Postgres => {
            let database_url = config.storage.database_url().ok_or_else(|| {
                anyhow::anyhow!("storage.database_url or DATABASE_URL is required for postgres")
            })?;

            info!("Connecting to PostgreSQL...");
            let pool = sqlx::PgPool::connect(&database_url)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to PostgreSQL: {}", e))?;
            info!("PostgreSQL connection established");

            let repository = Arc::new(PostgresUserRepository::new(pool));
            repository.migrate().await?;

            Arc::new(UserService::new(repository, password_hasher))
        }
    };

    if config.auth.jwt_secret == DEFAULT_JWT_SECRET {
        warn!("Using the default JWT secret. Set APP__AUTH__JWT_SECRET outside local development.");
    }

    let jwt_service = Arc::new(JwtService::new(JwtConfig::new(
        config.auth.jwt_secret.clone(),
        config.auth.token_ttl_hours,
    )));

    Ok(AppState::new(user_service, jwt_service))
}

/// Create the admin and a few client accounts when the store is empty, and log
/// a bearer token for the admin
pub async fn seed(state: &AppState) -> anyhow::Result<()> {
    if state.user_service.stats().await?.total_users > 0 {
        info!("User store already populated, skipping seed");
        return Ok(());
    }

    let (password, from_env) = match std::env::var("ADMIN_DEFAULT_PASSWORD") {
        Ok(p) if !p.is_empty() => (p, true),
        _ => (Uuid::new_v4().simple().to_string(), false),
    };

    let admin = state
        .user_service
        .create(CreateUserRequest {
            name: "Admin".to_string(),
            email: SEED_ADMIN_EMAIL.to_string(),
            password: password.clone(),
            role: UserRole::Admin,
        })
        .await?;

    for (name, email) in SEED_CLIENTS {
        state
            .user_service
            .create(CreateUserRequest {
                name: name.to_string(),
                email: email.to_string(),
                password: Uuid::new_v4().simple().to_string(),
                role: UserRole::Client,
            })
            .await?;
    }

    let token = state.jwt_service.generate(&admin)?;

    info!("===========================================");
    info!("Seeded admin user: {}", SEED_ADMIN_EMAIL);

    if from_env {
        info!("Password: (set via ADMIN_DEFAULT_PASSWORD)");
    } else {
        info!("Password: {}", password);
    }

    info!("Bearer token: {}", token);
    info!("===========================================");

    Ok(())
}
