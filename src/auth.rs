//! Caller identity and the access policy.
//!
//! Authentication itself happens upstream; by the time a request reaches this
//! service the caller has been resolved to `{id, role?, email?}` and forwarded
//! in trusted headers. This module only decides what that identity may do.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;

pub const ADMIN_ROLE: &str = "admin";

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";
pub const USER_EMAIL_HEADER: &str = "x-user-email";

#[derive(Debug, Clone)]
pub struct Identity {
    pub id: String,
    pub role: Option<String>,
    pub email: Option<String>,
}

impl Identity {
    /// Admin predicate: explicit role wins, an email under the administrative
    /// domain is the legacy fallback.
    pub fn is_admin(&self, admin_domain: &str) -> bool {
        if self.role.as_deref() == Some(ADMIN_ROLE) {
            return true;
        }

        self.email
            .as_deref()
            .is_some_and(|email| email.ends_with(admin_domain))
    }
}

fn header_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header_value(parts, USER_ID_HEADER).ok_or(AppError::Unauthorized)?;

        Ok(Identity {
            id,
            role: header_value(parts, USER_ROLE_HEADER),
            email: header_value(parts, USER_EMAIL_HEADER),
        })
    }
}
