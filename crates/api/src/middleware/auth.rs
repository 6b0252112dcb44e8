//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use reforma_core::error::CoreError;
use reforma_core::roles;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated principal extracted from a JWT Bearer token in the
/// `Authorization` header.
///
/// Capability checks happen per operation via [`AuthUser::can_review`];
/// nothing is cached between requests.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Tax-id-equivalent identifier from `claims.sub`.
    pub tax_id: String,
    /// Display name used for authorship of messages and inspections.
    pub display_name: String,
    /// Role name from the identity provider.
    pub role: String,
    /// Master/non-resident account flag.
    pub is_master: bool,
    /// Unit apartment number, when the principal is a resident.
    pub apartment: Option<String>,
    /// Unit tower identifier, when the principal is a resident.
    pub tower: Option<String>,
}

impl AuthUser {
    /// Whether this principal holds the `ReviewRequests` capability.
    pub fn can_review(&self) -> bool {
        roles::can_review_requests(&self.role, self.is_master)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            tax_id: claims.sub,
            display_name: claims.name,
            role: claims.role,
            is_master: claims.master,
            apartment: claims.apartment,
            tower: claims.tower,
        })
    }
}
