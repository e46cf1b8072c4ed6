//! Registration and login handlers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

use crate::auth::password;
use crate::errors::AppError;
use crate::services::user_store::CredentialError;
use crate::state::AppState;

const USERNAME_MIN_LEN: usize = 3;
const USERNAME_MAX_LEN: usize = 32;
const PASSWORD_MIN_LEN: usize = 8;
const PASSWORD_MAX_LEN: usize = 128;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// `POST /register` — create an account from `{username, password}`.
pub async fn register(
    State(state): State<AppState>,
    Json(creds): Json<Credentials>,
) -> Result<impl IntoResponse, AppError> {
    ensure_credentials_valid(&creds)?;

    let password_hash = password::hash(&creds.password).map_err(|err| {
        tracing::error!(error = %err, "password hashing failed");
        AppError::internal("error creating user")
    })?;

    let user = state.users.create(&creds.username, &password_hash).await?;
    tracing::info!(user = %user.username, "account created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "account created" })),
    ))
}

/// `POST /login` — exchange `{username, password}` for a bearer token.
///
/// Unknown usernames and wrong passwords are indistinguishable to the
/// caller.
pub async fn login(
    State(state): State<AppState>,
    Json(creds): Json<Credentials>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .users
        .find_by_username(&creds.username)
        .await?
        .ok_or(CredentialError::InvalidUsernameOrPassword)?;

    let valid = password::verify(&user.password_hash, &creds.password).map_err(|err| {
        tracing::error!(error = %err, "password verification failed");
        AppError::internal("error verifying credentials")
    })?;
    if !valid {
        return Err(CredentialError::InvalidUsernameOrPassword.into());
    }

    let token = state.tokens.issue(&user.username).map_err(|err| {
        tracing::error!(error = %err, "token issuance failed");
        AppError::internal("error generating token")
    })?;

    tracing::info!(user = %user.username, "login succeeded");
    Ok(Json(json!({ "token": token })))
}

/// Basic credential validation so the store only ever sees plausible
/// usernames.
///
/// Usernames are 3–32 characters of lowercase letters, digits, dots,
/// underscores and hyphens, and cannot begin or end with a separator.
fn ensure_credentials_valid(creds: &Credentials) -> Result<(), AppError> {
    let name = &creds.username;
    if name.len() < USERNAME_MIN_LEN || name.len() > USERNAME_MAX_LEN {
        return Err(AppError::bad_request(
            "username must be between 3 and 32 characters",
        ));
    }
    if !name
        .chars()
        .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '.' | '_' | '-'))
    {
        return Err(AppError::bad_request(
            "username may only contain lowercase letters, digits, dots, underscores and hyphens",
        ));
    }
    if name.starts_with(['.', '_', '-']) || name.ends_with(['.', '_', '-']) {
        return Err(AppError::bad_request(
            "username must start and end with a letter or digit",
        ));
    }

    if creds.password.len() < PASSWORD_MIN_LEN || creds.password.len() > PASSWORD_MAX_LEN {
        return Err(AppError::bad_request(
            "password must be between 8 and 128 characters",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }

    #[test]
    fn accepts_reasonable_credentials() {
        assert!(ensure_credentials_valid(&creds("alice", "hunter2hunter2")).is_ok());
        assert!(ensure_credentials_valid(&creds("a.b-c_9", "longenough")).is_ok());
    }

    #[test]
    fn rejects_bad_usernames() {
        assert!(ensure_credentials_valid(&creds("ab", "longenough")).is_err());
        assert!(ensure_credentials_valid(&creds("Alice", "longenough")).is_err());
        assert!(ensure_credentials_valid(&creds(".alice", "longenough")).is_err());
        assert!(ensure_credentials_valid(&creds("alice..", "longenough")).is_err());
        assert!(ensure_credentials_valid(&creds("al ice", "longenough")).is_err());
    }

    #[test]
    fn rejects_short_passwords() {
        assert!(ensure_credentials_valid(&creds("alice", "short")).is_err());
    }
}
