//! Role-based authorization guards.
//!
//! These guards extract the authenticated user and verify the role exactly.
//! Roles are not hierarchical: an admin is not an employee, so an admin cannot
//! create purchase requests on someone's behalf.

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::FromRequestParts, http::request::Parts};

fn authenticated(parts: &Parts) -> Result<&AuthenticatedUser, AppError> {
    parts
        .extensions
        .get::<AuthenticatedUser>()
        .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))
}

/// Guard for admin-only endpoints.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireAdmin(user): RequireAdmin) { ... }
/// ```
pub struct RequireAdmin(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated(parts)?;

        if !user.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        Ok(RequireAdmin(user.clone()))
    }
}

/// Guard for endpoints reserved to employees (request authors).
pub struct RequireEmployee(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireEmployee
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated(parts)?;

        if !user.is_employee() {
            return Err(AppError::Forbidden("Employee access required".to_string()));
        }

        Ok(RequireEmployee(user.clone()))
    }
}

/// Guard for approvers: managers and admins.
///
/// Whether a manager may act on a specific request is decided later by the
/// request policy, since it depends on the request's assigned manager.
pub struct RequireApprover(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireApprover
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated(parts)?;

        if !(user.is_manager() || user.is_admin()) {
            return Err(AppError::Forbidden(
                "Manager or admin access required".to_string(),
            ));
        }

        Ok(RequireApprover(user.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::models::Role;
    use crate::shared::test_helpers::create_user;
    use axum::http::Request;

    fn parts_with(user: Option<AuthenticatedUser>) -> Parts {
        let (mut parts, _) = Request::builder().uri("/").body(()).unwrap().into_parts();
        if let Some(user) = user {
            parts.extensions.insert(user);
        }
        parts
    }

    #[tokio::test]
    async fn test_missing_identity_is_unauthenticated() {
        let mut parts = parts_with(None);
        let result = RequireAdmin::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_wrong_role_is_forbidden() {
        let mut parts = parts_with(Some(create_user(Role::Manager)));
        let result = RequireEmployee::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_approver_accepts_manager_and_admin() {
        for role in [Role::Manager, Role::Admin] {
            let mut parts = parts_with(Some(create_user(role)));
            assert!(RequireApprover::from_request_parts(&mut parts, &())
                .await
                .is_ok());
        }

        let mut parts = parts_with(Some(create_user(Role::Employee)));
        assert!(matches!(
            RequireApprover::from_request_parts(&mut parts, &()).await,
            Err(AppError::Forbidden(_))
        ));
    }
}
