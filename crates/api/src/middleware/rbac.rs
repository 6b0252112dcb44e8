//! Capability extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose principal
//! does not hold the required capability. Authorization is evaluated fresh
//! on every request.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use reforma_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `ReviewRequests` capability (administrator, engineering,
/// developer, or a master-flagged account).
///
/// ```ignore
/// async fn staff_only(RequireReviewer(user): RequireReviewer) -> AppResult<Json<()>> {
///     // user is guaranteed to hold ReviewRequests here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireReviewer(pub AuthUser);

impl FromRequestParts<AppState> for RequireReviewer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.can_review() {
            return Err(AppError::Core(CoreError::Unauthorized(
                "The ReviewRequests capability is required".into(),
            )));
        }
        Ok(RequireReviewer(user))
    }
}
