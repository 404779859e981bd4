//! Hackzilla check-in service
//!
//! Team registration, QR badges and meal validation for a hackathon venue:
//! - Team aggregates (base record, members, food status) over a record store
//! - Sequential team ids allocated above a configurable offset
//! - Read-through cache of the full team list
//! - Staff accounts with admin and volunteer roles

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::{info, warn};

use api::state::AppState;
use infrastructure::{
    auth::{JwtConfig, JwtService},
    storage::StorageFactory,
    team::{MaxScanAllocator, StoreTeamRepository, TeamService},
    user::{Argon2Hasher, StoreUserRepository, UserService},
};

/// Create application state from the default configuration sources
pub async fn create_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::load()?;
    create_app_state_with_config(&config).await
}

/// Create application state with the given configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    for setting in config.auth.insecure_defaults() {
        warn!(setting, "Using the built-in default value; override it outside development");
    }

    let storage_config = config.storage.to_storage_config()?;
    let store = StorageFactory::create(&storage_config).await?;

    let allocator = Arc::new(MaxScanAllocator::with_offset(
        store.clone(),
        config.teams.id_offset,
    ));
    let team_repository = Arc::new(StoreTeamRepository::new(store.clone(), allocator));
    let team_service = TeamService::new(team_repository);

    let user_repository = Arc::new(StoreUserRepository::new(store));
    let user_service = UserService::new(user_repository, Arc::new(Argon2Hasher::new()));
    user_service
        .ensure_default_admin(&config.auth.admin_username, &config.auth.admin_password)
        .await?;

    let jwt_service = JwtService::new(JwtConfig::new(
        config.auth.jwt_secret.clone(),
        config.auth.jwt_expiration_hours,
    ));

    info!(
        backend = %config.storage.backend,
        id_offset = config.teams.id_offset,
        "Application state ready"
    );

    Ok(AppState::new(
        Arc::new(team_service),
        Arc::new(user_service),
        Arc::new(jwt_service),
    ))
}
