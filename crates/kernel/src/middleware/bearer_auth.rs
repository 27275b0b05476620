//! Bearer token authentication middleware.
//!
//! Checks `Authorization: Bearer <token>` headers, resolves the token with
//! the identity provider, and sets the user in request extensions.

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::error::DeleteError;
use crate::state::AppState;

/// Middleware requiring a bearer token the identity provider accepts.
///
/// A missing or empty header and a rejected token both return 401, with
/// different messages. On success the resolved [`AuthenticatedUser`] is available to
/// handlers as an extension.
///
/// [`AuthenticatedUser`]: crate::services::AuthenticatedUser
pub async fn authenticate_bearer_token(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(&state, &mut request).await {
        Ok(()) => next.run(request).await,
        Err(err) => {
            state.metrics().record_deletion(err.outcome());
            err.into_response()
        }
    }
}

async fn authenticate(state: &AppState, request: &mut Request<Body>) -> Result<(), DeleteError> {
    let Some(auth_header) = request.headers().get(header::AUTHORIZATION) else {
        return Err(DeleteError::no_authorization_header());
    };

    let Ok(auth_header) = auth_header.to_str() else {
        debug!("authorization header is not valid UTF-8");
        return Err(DeleteError::unauthorized());
    };

    if auth_header.is_empty() {
        return Err(DeleteError::no_authorization_header());
    }

    let token = bearer_token(auth_header).to_owned();
    if token.is_empty() {
        return Err(DeleteError::unauthorized());
    }

    let user = match state.identity().resolve_user(&token).await {
        Ok(user) => user,
        Err(e) => {
            debug!(error = %e, "invalid bearer token");
            return Err(DeleteError::unauthorized());
        }
    };

    request.extensions_mut().insert(user);
    Ok(())
}

/// Token part of an `Authorization` header value. A value without the
/// `Bearer ` scheme is taken as the token itself.
fn bearer_token(header_value: &str) -> &str {
    header_value
        .strip_prefix("Bearer ")
        .unwrap_or(header_value)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), "abc.def.ghi");
        assert_eq!(bearer_token("abc.def.ghi"), "abc.def.ghi");
        assert_eq!(bearer_token("Bearer "), "");
        assert_eq!(bearer_token("Bearer    "), "");
    }
}
