use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::{auth::jwt::JwtKeys, auth::repo::User, error::ApiError, state::AppState};

/// Identity resolved once per request and stashed in request extensions.
/// `None` means the call is anonymous.
#[derive(Debug, Clone)]
pub struct RequestIdentity(pub Option<User>);

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
}

/// Resolver middleware. Extracts the bearer credential, verifies it and
/// loads the user, then attaches the result to the request. A missing
/// credential is anonymous, never an error. An unverifiable credential
/// follows the configured policy: reject with 401, or log and continue
/// anonymously. A store failure during lookup is surfaced, not downgraded.
pub async fn resolve_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = match bearer_token(request.headers()) {
        None => None,
        Some(token) => {
            let keys = JwtKeys::from_ref(&state);
            match keys.verify(token) {
                Err(err) => {
                    if state.config.auth.reject_invalid_token {
                        return ApiError::invalid_token("Invalid token").into_response();
                    }
                    warn!(error = %err, "unverifiable bearer token, continuing as anonymous");
                    None
                }
                Ok(claims) => match User::find_by_id(&state.db, claims.sub).await {
                    Ok(user) => user,
                    Err(err) => return ApiError::from(err).into_response(),
                },
            }
        }
    };
    request.extensions_mut().insert(RequestIdentity(identity));
    next.run(request).await
}

/// The gate shared by every protected operation.
pub fn require_user(identity: Option<User>) -> Result<User, ApiError> {
    identity.ok_or_else(|| ApiError::unauthorized("You need to login first"))
}

fn resolved_identity(parts: &Parts) -> Result<Option<User>, ApiError> {
    parts
        .extensions
        .get::<RequestIdentity>()
        .cloned()
        .map(|RequestIdentity(identity)| identity)
        .ok_or_else(|| ApiError::internal("identity resolver not installed"))
}

/// Open procedures: the resolved identity, possibly absent.
pub struct Identity(pub Option<User>);

#[async_trait]
impl FromRequestParts<AppState> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolved_identity(parts).map(Identity)
    }
}

/// Gated procedures: a guaranteed non-null identity.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_user(resolved_identity(parts)?).map(CurrentUser)
    }
}
