use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap},
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, ClientOrigin};
use crate::features::auth::dtos::{
    ChangePasswordDto, LoginRequestDto, LoginResponseDto, SessionUserDto,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::AuthService;
use crate::features::users::dtos::UserResponseDto;
use crate::features::users::UserService;
use crate::shared::types::ApiResponse;

/// Login with email and password
///
/// On success the session token is set as an HTTP-only cookie.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Login successful, session cookie set", body = ApiResponse<LoginResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<LoginRequestDto>,
) -> Result<(HeaderMap, Json<ApiResponse<LoginResponseDto>>)> {
    dto.validate()?;

    let (user, issued) = service.login(&dto).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        service.token_service().session_cookie(&issued.token)?,
    );

    let body = LoginResponseDto {
        expires_in: issued.expires_in,
        user: SessionUserDto::from(&user),
    };

    Ok((headers, Json(ApiResponse::success(Some(body), None, None))))
}

/// Logout: clears the session cookie. Always succeeds.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Session cookie cleared")
    ),
    tag = "auth"
)]
pub async fn logout(
    State(service): State<Arc<AuthService>>,
) -> Result<(HeaderMap, Json<ApiResponse<()>>)> {
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, service.token_service().clear_cookie()?);

    Ok((
        headers,
        Json(ApiResponse::success(
            None,
            Some("Logged out".to_string()),
            None,
        )),
    ))
}

/// Change the caller's password
#[utoipa::path(
    patch,
    path = "/auth/change-password",
    request_body = ChangePasswordDto,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 429, description = "Too many attempts")
    ),
    tag = "auth",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn change_password(
    user: AuthenticatedUser,
    ClientOrigin(origin): ClientOrigin,
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<ChangePasswordDto>,
) -> Result<Json<ApiResponse<()>>> {
    dto.validate()?;

    service.change_password(&user, &origin, &dto).await?;

    Ok(Json(ApiResponse::success(
        None,
        Some("Password changed successfully".to_string()),
        None,
    )))
}

/// Get the current user's account
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn get_me(
    user: AuthenticatedUser,
    State(users): State<Arc<UserService>>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let account = users
        .find_by_id(user.id)
        .await?
        .filter(|u| !u.is_deleted)
        .ok_or_else(|| AppError::Unauthorized("Account is no longer active".to_string()))?;

    Ok(Json(ApiResponse::success(Some(account.into()), None, None)))
}
