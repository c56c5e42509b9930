//! Role gating.
//!
//! Authentication itself is delegated to the upstream identity provider,
//! which terminates the session and injects the verified role claim as the
//! `x-auth-role` header before the request reaches this service. This module
//! only reads that claim: reads are open, writes require a staff role, and
//! destructive or bulk operations require admin.

use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::ApiError;

/// Header carrying the verified role claim.
pub const ROLE_HEADER: &str = "x-auth-role";

/// Role claim values the identity provider issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    ClusterLeader,
}

/// Read the role claim from request headers. Absent or unknown values mean
/// no role.
pub fn role_from_headers(headers: &HeaderMap) -> Option<Role> {
    match headers.get(ROLE_HEADER)?.to_str().ok()? {
        "admin" => Some(Role::Admin),
        "cluster_leader" => Some(Role::ClusterLeader),
        _ => None,
    }
}

fn forbidden(message: &str) -> Response {
    ApiError::Forbidden(message.to_string()).into_response()
}

/// Require any staff role (admin or cluster leader).
pub async fn require_staff(request: Request, next: Next) -> Response {
    match role_from_headers(request.headers()) {
        Some(_) => next.run(request).await,
        None => forbidden("This operation requires a staff role"),
    }
}

/// Require the admin role.
pub async fn require_admin(request: Request, next: Next) -> Response {
    match role_from_headers(request.headers()) {
        Some(Role::Admin) => next.run(request).await,
        _ => forbidden("This operation requires the admin role"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_role_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(role_from_headers(&headers), None);

        headers.insert(ROLE_HEADER, HeaderValue::from_static("admin"));
        assert_eq!(role_from_headers(&headers), Some(Role::Admin));

        headers.insert(ROLE_HEADER, HeaderValue::from_static("cluster_leader"));
        assert_eq!(role_from_headers(&headers), Some(Role::ClusterLeader));

        headers.insert(ROLE_HEADER, HeaderValue::from_static("member"));
        assert_eq!(role_from_headers(&headers), None);
    }

    #[test]
    fn test_forbidden_is_403() {
        let response = forbidden("This operation requires the admin role");
        assert_eq!(response.status(), axum::http::StatusCode::FORBIDDEN);
    }
}
