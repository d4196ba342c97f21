use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
    Extension,
};

use crate::{
    identity::{CallerIdentity, IdentityVerifier},
    types::{AppError, Environment},
};

/// Axum extractor for the authenticated caller
///
/// Only available on routes behind [`auth_middleware`]:
/// ```ignore
/// async fn protected_handler(caller: CallerIdentity) -> Result<impl IntoResponse, AppError> {
///     Ok(caller.username)
/// }
/// ```
impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or(AppError::MissingCaller)
    }
}

/// Token of a `Bearer` authorization value; the scheme is matched case-insensitively
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim_start().split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Identity token authentication middleware
///
/// This middleware:
/// 1. Extracts Bearer token from Authorization header
/// 2. Verifies it against the identity provider using `IdentityVerifier`
/// 3. Adds `CallerIdentity` to request extensions
/// 4. Returns 401 for invalid/missing tokens
///
/// In development, set `DISABLE_AUTH=true` to use the bearer token as the username.
///
/// # Errors
///
/// - `AppError` - Invalid/missing token with 401 status code
pub async fn auth_middleware(
    Extension(environment): Extension<Environment>,
    verifier: Option<Extension<Arc<IdentityVerifier>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(bearer_token)
        .ok_or(AppError::MissingToken)?;

    let caller = if environment.disable_auth() {
        CallerIdentity::new(token)
    } else {
        let Some(Extension(verifier)) = verifier else {
            return Err(AppError::AuthNotConfigured);
        };

        verifier.verify(token).await.map_err(|err| {
            tracing::debug!("Rejected identity token: {err}");
            AppError::InvalidToken
        })?
    };

    request.extensions_mut().insert(caller);

    Ok(next.run(request).await)
}
