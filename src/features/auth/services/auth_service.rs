use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{ChangePasswordDto, LoginRequestDto};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::password::{ensure_strong_password, hash_password, verify_password};
use crate::features::auth::rate_limiter::{AttemptLimiter, InMemoryAttemptLimiter};
use crate::features::auth::services::token_service::{IssuedToken, TokenService};
use crate::features::users::models::User;
use crate::features::users::UserService;

/// Service for authentication operations (login, password change)
pub struct AuthService {
    user_service: Arc<UserService>,
    token_service: Arc<TokenService>,
    password_change_limiter: Arc<dyn AttemptLimiter>,
}

impl AuthService {
    pub fn new(
        user_service: Arc<UserService>,
        token_service: Arc<TokenService>,
        password_change_limiter: Arc<dyn AttemptLimiter>,
    ) -> Self {
        Self {
            user_service,
            token_service,
            password_change_limiter,
        }
    }

    pub fn token_service(&self) -> &TokenService {
        &self.token_service
    }

    /// Login with email and password
    ///
    /// Unknown emails, wrong passwords and deleted accounts all fail the same way.
    pub async fn login(&self, dto: &LoginRequestDto) -> Result<(User, IssuedToken)> {
        let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

        let user = self
            .user_service
            .find_by_email(&dto.email)
            .await?
            .ok_or_else(invalid)?;

        if user.is_deleted || !verify_password(&dto.password, &user.password_hash) {
            tracing::info!("Failed login attempt for {}", dto.email);
            return Err(invalid());
        }

        let token = self.token_service.issue(&user)?;
        tracing::info!("User logged in: id={}, role={}", user.id, user.role);

        Ok((user, token))
    }

    /// Change the caller's password.
    ///
    /// The attempt is counted before any credential check, so a full window
    /// rejects even a correct request.
    pub async fn change_password(
        &self,
        caller: &AuthenticatedUser,
        origin: &str,
        dto: &ChangePasswordDto,
    ) -> Result<()> {
        let key = InMemoryAttemptLimiter::key(origin, &caller.id.to_string());
        self.password_change_limiter.check_and_record(&key).await?;

        let user = self
            .user_service
            .find_by_id(caller.id)
            .await?
            .filter(|u| !u.is_deleted)
            .ok_or_else(|| AppError::Unauthorized("Account is no longer active".to_string()))?;

        let current_ok = verify_password(&dto.current_password, &user.password_hash);
        check_password_change(current_ok, dto)?;

        let new_hash = hash_password(&dto.new_password)?;
        self.user_service
            .update_password_hash(user.id, &new_hash)
            .await?;

        tracing::info!("Password changed for user {}", user.id);
        Ok(())
    }
}

/// Password change rules, checked in order: current password, confirmation,
/// reuse, strength
pub fn check_password_change(current_ok: bool, dto: &ChangePasswordDto) -> Result<()> {
    if !current_ok {
        return Err(AppError::Validation(
            "Current password is incorrect".to_string(),
        ));
    }

    if dto.new_password != dto.confirm_password {
        return Err(AppError::Validation(
            "New password and confirmation do not match".to_string(),
        ));
    }

    if dto.new_password == dto.current_password {
        return Err(AppError::Validation(
            "New password must differ from the current password".to_string(),
        ));
    }

    ensure_strong_password(&dto.new_password)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(current: &str, new: &str, confirm: &str) -> ChangePasswordDto {
        ChangePasswordDto {
            current_password: current.to_string(),
            new_password: new.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    fn message(result: Result<()>) -> String {
        match result {
            Err(AppError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_current_password() {
        let msg = message(check_password_change(false, &dto("Old1!a", "New1!a", "New1!a")));
        assert!(msg.contains("Current password"));
    }

    #[test]
    fn test_confirmation_mismatch() {
        let msg = message(check_password_change(true, &dto("Old1!a", "New1!a", "New1!b")));
        assert!(msg.contains("do not match"));
    }

    #[test]
    fn test_same_password() {
        let msg = message(check_password_change(true, &dto("Old1!a", "Old1!a", "Old1!a")));
        assert!(msg.contains("differ"));
    }

    #[test]
    fn test_weak_password() {
        let msg = message(check_password_change(true, &dto("Old1!a", "weak", "weak")));
        assert!(msg.contains("at least 6"));
    }

    #[test]
    fn test_valid_change() {
        assert!(check_password_change(true, &dto("Old1!a", "N3w-Pass", "N3w-Pass")).is_ok());
    }
}
