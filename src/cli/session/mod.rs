//! Session commands - login, logout and whoami
//!
//! The signed-in user is cached in a JSON file (`session.path`) so later
//! commands know who is operating the desk.

use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Args;
use tracing::info;

use crate::api::state::AppState;
use crate::config::AppConfig;
use crate::infrastructure::auth::{JwtConfig, JwtGenerator, JwtService};
use crate::infrastructure::logging;
use crate::infrastructure::session::{CurrentUserSession, FileSessionStore, SessionUser};

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Staff username
    #[arg(short, long)]
    pub username: String,

    /// Staff password
    #[arg(short, long)]
    pub password: String,
}

/// Authenticate and cache the user with a fresh token
pub async fn login(args: LoginArgs) -> anyhow::Result<()> {
    let config = load_config()?;
    let state = crate::create_app_state_with_config(&config).await?;
    let session = file_session(&config);

    let user = sign_in(&state, &session, &args.username, &args.password).await?;
    println!("Signed in as {} ({})", user.username, user.role);

    Ok(())
}

pub async fn logout() -> anyhow::Result<()> {
    let config = load_config()?;
    let session = file_session(&config);

    match session.load().await? {
        Some(user) => {
            session.clear().await?;
            info!(username = %user.username, "Signed out");
            println!("Signed out {}", user.username);
        }
        None => println!("Not signed in"),
    }

    Ok(())
}

pub async fn whoami() -> anyhow::Result<()> {
    let config = load_config()?;
    let session = file_session(&config);
    let jwt = JwtService::new(JwtConfig::new(
        config.auth.jwt_secret.clone(),
        config.auth.jwt_expiration_hours,
    ));

    match current_user(&session, &jwt).await? {
        Some(user) => println!("{} ({})", user.username, user.role),
        None => println!("Not signed in"),
    }

    Ok(())
}

pub(crate) async fn sign_in(
    state: &AppState,
    session: &CurrentUserSession,
    username: &str,
    password: &str,
) -> anyhow::Result<SessionUser> {
    let Some(user) = state.user_service.authenticate(username, password).await? else {
        bail!("Invalid username or password");
    };

    let token = state.jwt_service.generate(&user)?;
    let session_user = SessionUser::new(&user, token);
    session
        .save(&session_user)
        .await
        .context("Failed to save session")?;

    info!(username = %session_user.username, "Signed in");
    Ok(session_user)
}

/// The cached user, if its token still validates; stale entries are cleared
pub(crate) async fn current_user(
    session: &CurrentUserSession,
    jwt: &dyn JwtGenerator,
) -> anyhow::Result<Option<SessionUser>> {
    let Some(user) = session.load().await? else {
        return Ok(None);
    };

    if jwt.validate(&user.token).is_err() {
        info!(username = %user.username, "Cached session expired");
        session.clear().await?;
        return Ok(None);
    }

    Ok(Some(user))
}

fn load_config() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let mut config = AppConfig::load()?;
    // One-shot commands log warnings only unless RUST_LOG says otherwise
    if std::env::var_os("RUST_LOG").is_none() {
        config.logging.level = "warn".to_string();
    }
    logging::init_logging(&config.logging);

    Ok(config)
}

fn file_session(config: &AppConfig) -> CurrentUserSession {
    CurrentUserSession::new(Arc::new(FileSessionStore::new(&config.session.path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::state::test_support::{test_app, ADMIN_PASSWORD, VOLUNTEER_PASSWORD};
    use crate::domain::UserRole;
    use crate::infrastructure::session::InMemorySessionStore;

    fn memory_session() -> CurrentUserSession {
        CurrentUserSession::new(Arc::new(InMemorySessionStore::new()))
    }

    #[tokio::test]
    async fn test_sign_in_caches_user() {
        let app = test_app().await;
        let session = memory_session();

        let user = sign_in(&app.state, &session, "desk", VOLUNTEER_PASSWORD)
            .await
            .unwrap();
        assert_eq!(user.role, UserRole::Volunteer);

        let cached = current_user(&session, app.state.jwt_service.as_ref())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cached, user);
    }

    #[tokio::test]
    async fn test_sign_in_wrong_password_leaves_session_empty() {
        let app = test_app().await;
        let session = memory_session();

        assert!(sign_in(&app.state, &session, "desk", "wrong-password")
            .await
            .is_err());
        assert!(session.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_foreign_token_is_cleared() {
        let app = test_app().await;
        let session = memory_session();
        sign_in(&app.state, &session, "desk", VOLUNTEER_PASSWORD)
            .await
            .unwrap();

        let other_secret = JwtService::new(JwtConfig::new("another-secret", 1));
        let current = current_user(&session, &other_secret).await.unwrap();

        assert!(current.is_none());
        assert!(session.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_session_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.session.path = dir
            .path()
            .join("session.json")
            .to_string_lossy()
            .into_owned();

        let app = test_app().await;
        sign_in(&app.state, &file_session(&config), "admin", ADMIN_PASSWORD)
            .await
            .unwrap();

        let reopened = file_session(&config).load().await.unwrap().unwrap();
        assert_eq!(reopened.username, "admin");
        assert_eq!(reopened.role, UserRole::Admin);
    }
}
