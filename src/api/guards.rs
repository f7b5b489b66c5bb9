//! Identity guards. Credential verification happens upstream: the
//! gateway authenticates the caller and forwards the verified user id
//! in `x-user-id`. This service resolves the id against the user
//! directory and only compares ownership and roles.

use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::db::models::User;
use crate::db::types::UserRole;
use crate::repositories;

pub(crate) const USER_ID_HEADER: &str = "x-user-id";

pub(crate) struct CurrentUser(pub(crate) User);
pub(crate) struct CurrentAdmin(pub(crate) User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state) = State::<AppState>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to access application state"))?;

        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(ApiError::Unauthorized("Missing caller identity"))?;

        let user = repositories::users::find_by_id(app_state.db(), user_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load user"))?;

        let Some(user) = user else {
            return Err(ApiError::Unauthorized("Unknown caller identity"));
        };

        if !user.is_active {
            return Err(ApiError::Unauthorized("Unknown caller identity"));
        }

        Ok(CurrentUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if user.role == UserRole::Admin {
            Ok(CurrentAdmin(user))
        } else {
            Err(ApiError::Forbidden("Admin access required"))
        }
    }
}

/// Owner-scoped reads and writes: the attempt's owner or an admin.
pub(crate) fn require_owner_or_admin(user: &User, owner_id: &str) -> Result<(), ApiError> {
    if user.id == owner_id || user.role == UserRole::Admin {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Not authorized to access this attempt"))
    }
}
