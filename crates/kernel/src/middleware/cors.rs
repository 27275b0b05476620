//! Origin allow-list and CORS headers.
//!
//! Preflight requests are answered here. Requests from origins outside
//! the allow-list are rejected before reaching any route.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Method, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::error::DeleteError;
use crate::routes::image::{DELETE_IMAGE_PATH, FUNCTIONS_DELETE_IMAGE_PATH};
use crate::state::AppState;

const ALLOW_METHODS: &str = "POST, OPTIONS";
const ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

/// Fixed list of origins permitted to receive their own origin back in
/// `Access-Control-Allow-Origin`.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed: Vec<String>,
}

impl CorsPolicy {
    /// Create a policy. The first origin is the default.
    pub fn new(allowed: Vec<String>) -> anyhow::Result<Self> {
        if allowed.is_empty() {
            anyhow::bail!("CORS allow-list must contain at least one origin");
        }
        Ok(Self { allowed })
    }

    /// Origin echoed to callers that are not on the list.
    pub fn default_origin(&self) -> &str {
        &self.allowed[0]
    }

    /// Check whether `origin` is on the allow-list.
    pub fn is_allowed(&self, origin: &str) -> bool {
        self.allowed.iter().any(|o| o == origin)
    }

    /// Effective origin of a request. A missing or empty `Origin` header
    /// counts as the default origin.
    pub fn resolve<'a>(&'a self, origin: Option<&'a str>) -> &'a str {
        origin
            .filter(|o| !o.is_empty())
            .unwrap_or_else(|| self.default_origin())
    }

    /// Value for `Access-Control-Allow-Origin`.
    pub fn allow_origin_for<'a>(&'a self, origin: &'a str) -> &'a str {
        if self.is_allowed(origin) {
            origin
        } else {
            self.default_origin()
        }
    }

    /// Write the CORS headers for `origin` into `headers`.
    pub fn apply(&self, headers: &mut HeaderMap, origin: &str) {
        let allow_origin = self.allow_origin_for(origin);
        // A configured origin that is not a valid header value is skipped.
        if let Ok(value) = HeaderValue::from_str(allow_origin) {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
        }
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        );
        headers.insert(header::VARY, HeaderValue::from_static("Origin"));
    }
}

/// Middleware enforcing the origin allow-list.
///
/// - `OPTIONS` returns 204 with CORS headers only.
/// - A disallowed origin returns 403 with the default origin in the CORS
///   headers.
/// - Every other response gets CORS headers for the request origin.
pub async fn enforce_origin(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let policy = state.cors();
    // `None` when the header is present but not UTF-8; such an origin
    // matches nothing on the allow-list.
    let origin = match request.headers().get(header::ORIGIN) {
        Some(value) => value
            .to_str()
            .ok()
            .map(|o| policy.resolve(Some(o)).to_owned()),
        None => Some(policy.default_origin().to_owned()),
    };

    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        policy.apply(
            response.headers_mut(),
            origin.as_deref().unwrap_or_else(|| policy.default_origin()),
        );
        return response;
    }

    let origin = match origin {
        Some(origin) if policy.is_allowed(&origin) => origin,
        rejected => {
            debug!(origin = ?rejected, "origin not allowed");
            if is_image_route(request.uri().path()) {
                state
                    .metrics()
                    .record_deletion(DeleteError::OriginRejected.outcome());
            }
            let mut response = DeleteError::OriginRejected.into_response();
            policy.apply(response.headers_mut(), policy.default_origin());
            return response;
        }
    };

    let mut response = next.run(request).await;
    policy.apply(response.headers_mut(), &origin);
    response
}

/// Whether `path` is served by the deletion handler.
fn is_image_route(path: &str) -> bool {
    path == DELETE_IMAGE_PATH || path == FUNCTIONS_DELETE_IMAGE_PATH
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn policy() -> CorsPolicy {
        CorsPolicy::new(vec![
            "http://localhost:5173".to_string(),
            "https://fprints.xyz".to_string(),
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_policy_rejected() {
        assert!(CorsPolicy::new(Vec::new()).is_err());
    }

    #[test]
    fn test_allow_origin() {
        let policy = policy();
        assert_eq!(
            policy.allow_origin_for("https://fprints.xyz"),
            "https://fprints.xyz"
        );
        assert_eq!(
            policy.allow_origin_for("https://evil.example"),
            "http://localhost:5173"
        );
    }

    #[test]
    fn test_origin_match_is_exact() {
        let policy = policy();
        assert!(!policy.is_allowed("https://fprints.xyz/"));
        assert!(!policy.is_allowed("http://fprints.xyz"));
        assert!(!policy.is_allowed("https://sub.fprints.xyz"));
    }

    #[test]
    fn test_missing_origin_resolves_to_default() {
        let policy = policy();
        assert_eq!(policy.resolve(None), "http://localhost:5173");
        assert!(policy.is_allowed(policy.resolve(None)));
    }

    #[test]
    fn test_empty_origin_resolves_to_default() {
        let policy = policy();
        assert_eq!(policy.resolve(Some("")), "http://localhost:5173");
        assert_eq!(
            policy.resolve(Some("https://evil.example")),
            "https://evil.example"
        );
    }

    #[test]
    fn test_is_image_route() {
        assert!(is_image_route("/fprints-delete-image"));
        assert!(is_image_route("/functions/v1/fprints-delete-image"));
        assert!(!is_image_route("/health"));
        assert!(!is_image_route("/metrics"));
    }

    #[test]
    fn test_apply_headers() {
        let policy = policy();
        let mut headers = HeaderMap::new();
        policy.apply(&mut headers, "https://fprints.xyz");

        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://fprints.xyz"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_METHODS).unwrap(),
            "POST, OPTIONS"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_HEADERS).unwrap(),
            "authorization, x-client-info, apikey, content-type"
        );
        assert_eq!(headers.get(header::VARY).unwrap(), "Origin");
    }
}
