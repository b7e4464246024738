use axum::http::HeaderMap;

/// Header carrying the authenticated user id, set by the identity provider in front of us.
pub const USER_HEADER: &str = "x-user-id";

pub fn user_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
