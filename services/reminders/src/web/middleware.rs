//! services/reminders/src/web/middleware.rs
//!
//! Owner resolution middleware for protecting reminder routes.

use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use practice_reminders_core::domain::Owner;
use tracing::debug;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const SESSION_ID_HEADER: &str = "x-session-id";

/// Middleware that resolves the reminder owner from the request headers.
///
/// A user id wins over a session id. The resolved `Owner` is inserted into the
/// request extensions; requests carrying neither header get 401 Unauthorized.
pub async fn require_owner(mut req: Request, next: Next) -> Result<Response, StatusCode> {
    let owner = owner_from_headers(req.headers()).ok_or_else(|| {
        debug!("Rejected request without owner headers");
        StatusCode::UNAUTHORIZED
    })?;

    req.extensions_mut().insert(owner);
    Ok(next.run(req).await)
}

pub fn owner_from_headers(headers: &HeaderMap) -> Option<Owner> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    header(USER_ID_HEADER)
        .map(Owner::User)
        .or_else(|| header(SESSION_ID_HEADER).map(Owner::Session))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_user_header_takes_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("u-7"));
        headers.insert(SESSION_ID_HEADER, HeaderValue::from_static("s-9"));
        assert_eq!(owner_from_headers(&headers), Some(Owner::User("u-7".to_string())));
    }

    #[test]
    fn test_falls_back_to_session() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("  "));
        headers.insert(SESSION_ID_HEADER, HeaderValue::from_static("s-9"));
        assert_eq!(
            owner_from_headers(&headers),
            Some(Owner::Session("s-9".to_string()))
        );
    }

    #[test]
    fn test_missing_headers() {
        assert_eq!(owner_from_headers(&HeaderMap::new()), None);
    }
}
