//! Bearer-token request authentication.
//!
//! `AuthenticatedUser` is extracted from request parts rather than applied as
//! middleware so it composes with `Multipart` body extraction on the upload
//! route.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};

use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

/// The account resolved from a verified `Authorization: Bearer` header.
///
/// Extraction fails with 401 when the header is absent or malformed, when
/// the token does not verify, and when the embedded username no longer
/// resolves to an existing account. There is no fallback auth.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("authorization header required"))?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("invalid authorization header format"))?;

        let claims = state.tokens.verify(token)?;

        let user = state
            .users
            .find_by_username(&claims.sub)
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "failed to resolve session user");
                AppError::internal("error resolving session")
            })?
            .ok_or_else(|| AppError::unauthorized("invalid username or password"))?;

        Ok(AuthenticatedUser(user))
    }
}
